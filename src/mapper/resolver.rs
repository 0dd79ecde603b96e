//! Case-insensitive property lookup.
//!
//! Each [`EntityMapping`](super::EntityMapping) builds its index once, so
//! resolving a name against a cached mapping never rescans the property list.

use std::collections::HashMap;

use crate::entity::PropertyRef;

use super::property::PropertyMapping;
use super::LookupError;

/// Lowercased property name -> position in the mapping's property list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyIndex {
    positions: HashMap<String, usize>,
}

impl PropertyIndex {
    pub fn build(properties: &[PropertyMapping]) -> Self {
        let positions = properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name().to_ascii_lowercase(), i))
            .collect();
        Self { positions }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Resolve a list of property references against a mapping's properties.
pub fn resolve_all<'m, P: PropertyRef>(
    entity: &'static str,
    properties: &'m [PropertyMapping],
    index: &PropertyIndex,
    refs: &[P],
) -> Result<Vec<&'m PropertyMapping>, LookupError> {
    refs.iter()
        .map(|r| {
            let name = r.property_name();
            index
                .position(name)
                .map(|i| &properties[i])
                .ok_or_else(|| LookupError::PropertyNotFound {
                    entity,
                    property: name.to_string(),
                })
        })
        .collect()
}
