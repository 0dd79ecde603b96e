//! Query descriptions: filters, ignored columns and ordering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::{Prop, PropertyRef};
use crate::translate::Predicate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One ORDER BY term, by property name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub property: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(property: impl PropertyRef) -> Self {
        Self {
            property: property.property_name().to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(property: impl PropertyRef) -> Self {
        Self {
            property: property.property_name().to_string(),
            direction: SortDirection::Desc,
        }
    }
}

/// Filters, ignored properties and ordering for a list or page query.
///
/// ```
/// use tablemap::{entity, EntityQuery};
///
/// entity! {
///     #[derive(Debug, Clone, Default)]
///     pub struct Ticket {
///         pub id: i64,
///         pub title: String,
///         pub body: String,
///         pub priority: i32,
///     }
/// }
///
/// let query = EntityQuery::new()
///     .filter(Ticket::priority.gte(2))
///     .filter(Ticket::title.contains("crash"))
///     .ignore(Ticket::body)
///     .order_by_desc(Ticket::priority);
///
/// assert_eq!(query.filters().len(), 2);
/// assert!(query.predicate().is_some());
/// ```
pub struct EntityQuery<E> {
    filters: Vec<Predicate<E>>,
    ignore: Vec<Prop<E>>,
    order_by: Vec<OrderBy>,
}

impl<E> EntityQuery<E> {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            ignore: Vec::new(),
            order_by: Vec::new(),
        }
    }

    /// Add a filter; filters are AND-ed in the order added.
    pub fn filter(mut self, predicate: Predicate<E>) -> Self {
        self.filters.push(predicate);
        self
    }

    /// Leave a property out of the select list.
    pub fn ignore(mut self, prop: Prop<E>) -> Self {
        self.ignore.push(prop);
        self
    }

    pub fn order_by_asc(mut self, prop: Prop<E>) -> Self {
        self.order_by.push(OrderBy::asc(prop));
        self
    }

    pub fn order_by_desc(mut self, prop: Prop<E>) -> Self {
        self.order_by.push(OrderBy::desc(prop));
        self
    }

    pub fn filters(&self) -> &[Predicate<E>] {
        &self.filters
    }

    pub fn ignored(&self) -> &[Prop<E>] {
        &self.ignore
    }

    pub fn order(&self) -> &[OrderBy] {
        &self.order_by
    }

    /// All filters AND-ed together, or `None` without filters.
    pub fn predicate(&self) -> Option<Predicate<E>> {
        Predicate::all(self.filters.iter().cloned())
    }
}

impl<E> Default for EntityQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EntityQuery<E> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            ignore: self.ignore.clone(),
            order_by: self.order_by.clone(),
        }
    }
}

impl<E> fmt::Debug for EntityQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityQuery")
            .field("filters", &self.filters)
            .field("ignore", &self.ignore)
            .field("order_by", &self.order_by)
            .finish()
    }
}
