//! CRUD statement construction.
//!
//! A [`StatementBuilder`] turns entity values, keys and predicates into
//! [`Statement`]s: SQL text plus ordered named parameters. Nothing here
//! touches a database.
//!
//! Every SELECT and COUNT for an entity with a delete flag carries an extra
//! `<flag column> <> <flag value>` condition after the caller's predicate.
//! INSERT, UPDATE and DELETE never do.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::entity::{Entity, Prop};
use crate::generator::{PropertyFilter, SqlGenerator};
use crate::key::Key;
use crate::mapper::{EntityMapping, KeyType, LookupError, MapResult, MappingRegistry, PropertyMapping};
use crate::query::{OrderBy, SortDirection};
use crate::sql::{Dialect, ParamList, Parameter, SqlDialect, Token, TokenStream};
use crate::translate::{Expr, Predicate, TranslateError, Translator};
use crate::value::Value;

/// Parameter name of the soft-delete flag value.
pub const DELETE_FLAG_PARAM: &str = "p_delete_flag";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatementKind {
    Select,
    Count,
    Insert,
    Update,
    Delete,
}

/// SQL text and its bindings, ready for an executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub parameters: Vec<Parameter>,
    pub kind: StatementKind,
    /// INSERT into a table whose key is generated by the database.
    pub returns_identity: bool,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatementError {
    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("{operation} for {entity} has no columns to write")]
    EmptyColumnSet {
        entity: &'static str,
        operation: &'static str,
    },

    #[error("Property '{property}' of {entity} cannot be assigned")]
    NotAssignable {
        entity: &'static str,
        property: String,
    },

    #[error("{entity} has no value for property '{property}'")]
    MissingFieldValue {
        entity: &'static str,
        property: String,
    },

    #[error("Page size must be greater than zero")]
    InvalidPageSize,
}

pub type StatementResult<T> = Result<T, StatementError>;

/// Builds statements for entity `E` in one dialect.
pub struct StatementBuilder<E> {
    generator: SqlGenerator,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for StatementBuilder<E> {
    fn clone(&self) -> Self {
        Self {
            generator: self.generator.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for StatementBuilder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementBuilder")
            .field("generator", &self.generator)
            .finish()
    }
}

impl<E: Entity> StatementBuilder<E> {
    pub fn new(mapping: Arc<EntityMapping>, dialect: Dialect) -> Self {
        Self {
            generator: SqlGenerator::new(mapping, dialect),
            _entity: PhantomData,
        }
    }

    /// Builder over the registry's cached mapping for `E`.
    pub fn from_registry(registry: &MappingRegistry, dialect: Dialect) -> MapResult<Self> {
        Ok(Self::new(registry.get_mapping::<E>()?, dialect))
    }

    pub fn generator(&self) -> &SqlGenerator {
        &self.generator
    }

    pub fn dialect(&self) -> Dialect {
        self.generator.dialect()
    }

    // =========================================================================
    // SELECT
    // =========================================================================

    pub fn select_by_key(&self, key: &Key, exclude: &[Prop<E>]) -> StatementResult<Statement> {
        let mut params = self.params();
        let mut ts = self.select_head(exclude)?;
        let key_condition = self.key_condition(key, &mut params)?;
        self.push_where(&mut ts, vec![key_condition], true, &mut params);
        Ok(self.finish(ts, params, StatementKind::Select))
    }

    pub fn select_by_where(
        &self,
        predicate: Option<&Predicate<E>>,
        exclude: &[Prop<E>],
    ) -> StatementResult<Statement> {
        let mut params = self.params();
        let mut ts = self.select_head(exclude)?;
        let conditions = self.predicate_conditions(predicate, &mut params)?;
        self.push_where(&mut ts, conditions, true, &mut params);
        Ok(self.finish(ts, params, StatementKind::Select))
    }

    /// `SELECT <select_list> FROM <table>` followed by the generated WHERE.
    ///
    /// `select_list` is emitted verbatim, e.g. `MAX(views)`, and must never
    /// contain user input.
    pub fn select_where(
        &self,
        select_list: &str,
        predicate: Option<&Predicate<E>>,
    ) -> StatementResult<Statement> {
        let mut params = self.params();
        let mut ts = TokenStream::new();
        ts.push(Token::Select)
            .space()
            .push(Token::Raw(select_list.trim().to_string()))
            .space()
            .push(Token::From)
            .space()
            .append(&self.generator.table_tokens(None));
        let conditions = self.predicate_conditions(predicate, &mut params)?;
        self.push_where(&mut ts, conditions, true, &mut params);
        Ok(self.finish(ts, params, StatementKind::Select))
    }

    pub fn count_where(&self, predicate: Option<&Predicate<E>>) -> StatementResult<Statement> {
        let mut params = self.params();
        let mut ts = TokenStream::new();
        ts.push(Token::Select)
            .space()
            .push(Token::Count)
            .lparen()
            .push(Token::Star)
            .rparen()
            .space()
            .push(Token::From)
            .space()
            .append(&self.generator.table_tokens(None));
        let conditions = self.predicate_conditions(predicate, &mut params)?;
        self.push_where(&mut ts, conditions, true, &mut params);
        Ok(self.finish(ts, params, StatementKind::Count))
    }

    /// SELECT with an ORDER BY built from `order_by`.
    pub fn select_ordered(
        &self,
        predicate: Option<&Predicate<E>>,
        exclude: &[Prop<E>],
        order_by: &[OrderBy],
    ) -> StatementResult<Statement> {
        let mut params = self.params();
        let mut ts = self.select_head(exclude)?;
        let conditions = self.predicate_conditions(predicate, &mut params)?;
        self.push_where(&mut ts, conditions, true, &mut params);
        self.push_order_by(&mut ts, order_by, false)?;
        Ok(self.finish(ts, params, StatementKind::Select))
    }

    /// One page of rows; `page_index` starts at 1.
    ///
    /// Without explicit ordering, dialects that need ORDER BY for OFFSET
    /// are ordered by the key columns.
    pub fn select_page(
        &self,
        predicate: Option<&Predicate<E>>,
        exclude: &[Prop<E>],
        order_by: &[OrderBy],
        page_index: u64,
        page_size: u64,
    ) -> StatementResult<Statement> {
        if page_size == 0 {
            return Err(StatementError::InvalidPageSize);
        }
        let mut params = self.params();
        let mut ts = self.select_head(exclude)?;
        let conditions = self.predicate_conditions(predicate, &mut params)?;
        self.push_where(&mut ts, conditions, true, &mut params);
        self.push_order_by(&mut ts, order_by, self.dialect().requires_order_by_for_offset())?;

        let offset = page_index.saturating_sub(1).saturating_mul(page_size);
        ts.space()
            .append(&self.dialect().emit_limit_offset(Some(page_size), Some(offset)));
        Ok(self.finish(ts, params, StatementKind::Select))
    }

    fn push_order_by(
        &self,
        ts: &mut TokenStream,
        order_by: &[OrderBy],
        default_to_key: bool,
    ) -> StatementResult<()> {
        let mut terms = Vec::new();
        for order in order_by {
            let property = self.generator.property(order.property.as_str())?;
            let mut term = self.generator.column_tokens(property, false, false);
            term.space().push(match order.direction {
                SortDirection::Asc => Token::Asc,
                SortDirection::Desc => Token::Desc,
            });
            terms.push(term);
        }
        if terms.is_empty() && default_to_key {
            for key in self.generator.key_properties()? {
                terms.push(self.generator.column_tokens(key, false, false));
            }
        }
        if !terms.is_empty() {
            ts.space().push(Token::OrderBy).space().join_comma(terms);
        }
        Ok(())
    }

    // =========================================================================
    // INSERT
    // =========================================================================

    pub fn insert(&self, entity: &E, exclude: &[Prop<E>]) -> StatementResult<Statement> {
        let columns = self.generator.insert_properties(exclude)?;
        if columns.is_empty() {
            return Err(self.empty_columns("INSERT"));
        }

        let mut params = self.params();
        let mut names = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len());
        for property in columns {
            names.push(self.generator.column_tokens(property, false, false));
            let mut value = TokenStream::new();
            value.push(params.bind(self.field_value(entity, property)?));
            values.push(value);
        }

        let mut ts = TokenStream::new();
        ts.push(Token::Insert)
            .space()
            .push(Token::Into)
            .space()
            .append(&self.generator.table_tokens(None))
            .space()
            .lparen()
            .join_comma(names)
            .rparen()
            .space()
            .push(Token::Values)
            .space()
            .lparen()
            .join_comma(values)
            .rparen();

        let mut statement = self.finish(ts, params, StatementKind::Insert);
        statement.returns_identity = self
            .generator
            .mapping()
            .key_properties()
            .any(|p| p.key_type() == KeyType::Identity);
        Ok(statement)
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    /// Update the row identified by the entity's own key values.
    pub fn update(&self, entity: &E, filter: &PropertyFilter) -> StatementResult<Statement> {
        let key = self.entity_key(entity)?;
        self.update_by_key(&key, entity, filter)
    }

    pub fn update_by_key(
        &self,
        key: &Key,
        entity: &E,
        filter: &PropertyFilter,
    ) -> StatementResult<Statement> {
        let properties = self.generator.update_properties(filter)?;
        let mut assignments = Vec::with_capacity(properties.len());
        for property in properties {
            assignments.push((property, self.field_value(entity, property)?));
        }
        let mut params = self.params();
        let mut ts = self.update_head(assignments, &mut params)?;
        let key_condition = self.key_condition(key, &mut params)?;
        self.push_where(&mut ts, vec![key_condition], false, &mut params);
        Ok(self.finish(ts, params, StatementKind::Update))
    }

    /// Set explicit values on the row identified by `key`.
    pub fn update_by_key_values(
        &self,
        key: &Key,
        values: &[(Prop<E>, Value)],
    ) -> StatementResult<Statement> {
        let assignments = self.assignments(values)?;
        let mut params = self.params();
        let mut ts = self.update_head(assignments, &mut params)?;
        let key_condition = self.key_condition(key, &mut params)?;
        self.push_where(&mut ts, vec![key_condition], false, &mut params);
        Ok(self.finish(ts, params, StatementKind::Update))
    }

    /// Set explicit values on every row matching `predicate`.
    pub fn update_by_where(
        &self,
        predicate: &Predicate<E>,
        values: &[(Prop<E>, Value)],
    ) -> StatementResult<Statement> {
        let assignments = self.assignments(values)?;
        let mut params = self.params();
        let mut ts = self.update_head(assignments, &mut params)?;
        let conditions = self.predicate_conditions(Some(predicate), &mut params)?;
        self.push_where(&mut ts, conditions, false, &mut params);
        Ok(self.finish(ts, params, StatementKind::Update))
    }

    /// Explicit assignments: any updatable property, plus the delete flag so
    /// callers can soft-delete rows.
    fn assignments(
        &self,
        values: &[(Prop<E>, Value)],
    ) -> StatementResult<Vec<(&PropertyMapping, Value)>> {
        let updatable = self.generator.update_properties(&PropertyFilter::All)?;
        let mut assignments = Vec::with_capacity(values.len());
        for (prop, value) in values {
            let property = self.generator.property(prop)?;
            let assignable = property.is_delete_flag()
                || updatable.iter().any(|p| p.name() == property.name());
            if !assignable {
                return Err(StatementError::NotAssignable {
                    entity: self.entity_name(),
                    property: property.name().to_string(),
                });
            }
            assignments.push((property, value.clone()));
        }
        Ok(assignments)
    }

    fn update_head(
        &self,
        assignments: Vec<(&PropertyMapping, Value)>,
        params: &mut ParamList,
    ) -> StatementResult<TokenStream> {
        if assignments.is_empty() {
            return Err(self.empty_columns("UPDATE"));
        }
        let sets: Vec<_> = assignments
            .into_iter()
            .map(|(property, value)| {
                let mut set = self.generator.column_tokens(property, false, false);
                set.space().push(Token::Eq).space().push(params.bind(value));
                set
            })
            .collect();

        let mut ts = TokenStream::new();
        ts.push(Token::Update)
            .space()
            .append(&self.generator.table_tokens(None))
            .space()
            .push(Token::Set)
            .space()
            .join_comma(sets);
        Ok(ts)
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    pub fn delete_by_key(&self, key: &Key) -> StatementResult<Statement> {
        let mut params = self.params();
        let mut ts = self.delete_head();
        let key_condition = self.key_condition(key, &mut params)?;
        self.push_where(&mut ts, vec![key_condition], false, &mut params);
        Ok(self.finish(ts, params, StatementKind::Delete))
    }

    /// Delete the row identified by the entity's own key values.
    pub fn delete_entity(&self, entity: &E) -> StatementResult<Statement> {
        let key = self.entity_key(entity)?;
        self.delete_by_key(&key)
    }

    pub fn delete_by_where(&self, predicate: &Predicate<E>) -> StatementResult<Statement> {
        let mut params = self.params();
        let mut ts = self.delete_head();
        let conditions = self.predicate_conditions(Some(predicate), &mut params)?;
        self.push_where(&mut ts, conditions, false, &mut params);
        Ok(self.finish(ts, params, StatementKind::Delete))
    }

    fn delete_head(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Delete)
            .space()
            .push(Token::From)
            .space()
            .append(&self.generator.table_tokens(None));
        ts
    }

    // =========================================================================
    // Keys
    // =========================================================================

    /// Key of an entity instance, as a composite of its key property values.
    pub fn entity_key(&self, entity: &E) -> StatementResult<Key> {
        let mut values = Vec::new();
        for property in self.generator.key_properties()? {
            values.push((property.name().to_string(), self.field_value(entity, property)?));
        }
        Ok(Key::Composite(values))
    }

    /// `key1 = @p AND key2 = @p ...` in key declaration order.
    fn key_condition(&self, key: &Key, params: &mut ParamList) -> StatementResult<Condition> {
        let mut ts = TokenStream::new();
        for (i, property) in self.generator.key_properties()?.into_iter().enumerate() {
            let value = key
                .value_for(property.name())
                .ok_or_else(|| LookupError::MissingKeyValue {
                    entity: self.entity_name(),
                    property: property.name().to_string(),
                })?;
            if i > 0 {
                ts.space().push(Token::And).space();
            }
            ts.append(&self.generator.column_tokens(property, false, false))
                .space()
                .push(Token::Eq)
                .space()
                .push(params.bind(value.clone()));
        }
        Ok(Condition { ts, is_or: false })
    }

    // =========================================================================
    // Shared assembly
    // =========================================================================

    fn params(&self) -> ParamList {
        ParamList::new(self.dialect())
    }

    fn entity_name(&self) -> &'static str {
        self.generator.mapping().entity_name()
    }

    fn empty_columns(&self, operation: &'static str) -> StatementError {
        StatementError::EmptyColumnSet {
            entity: self.entity_name(),
            operation,
        }
    }

    fn field_value(&self, entity: &E, property: &PropertyMapping) -> StatementResult<Value> {
        entity
            .field_value(property.name())
            .ok_or_else(|| StatementError::MissingFieldValue {
                entity: self.entity_name(),
                property: property.name().to_string(),
            })
    }

    fn select_head(&self, exclude: &[Prop<E>]) -> StatementResult<TokenStream> {
        let mut ts = TokenStream::new();
        ts.push(Token::Select)
            .space()
            .append(&self.generator.select_list(exclude)?)
            .space()
            .push(Token::From)
            .space()
            .append(&self.generator.table_tokens(None));
        Ok(ts)
    }

    fn predicate_conditions(
        &self,
        predicate: Option<&Predicate<E>>,
        params: &mut ParamList,
    ) -> StatementResult<Vec<Condition>> {
        let Some(predicate) = predicate else {
            return Ok(Vec::new());
        };
        let ts = Translator::new(&self.generator).translate_into(predicate.expr(), params)?;
        Ok(vec![Condition {
            ts,
            is_or: matches!(predicate.expr(), Expr::Or(..)),
        }])
    }

    /// Append ` WHERE a AND b ...`, adding the soft-delete condition when asked.
    fn push_where(
        &self,
        ts: &mut TokenStream,
        mut conditions: Vec<Condition>,
        soft_delete: bool,
        params: &mut ParamList,
    ) {
        if soft_delete {
            if let Some(flag) = self.generator.delete_flag_property() {
                if let Some(true_value) = flag.delete_flag_true_value() {
                    let mut flag_ts = self.generator.column_tokens(flag, false, false);
                    flag_ts
                        .space()
                        .push(Token::Ne)
                        .space()
                        .push(params.bind_named(DELETE_FLAG_PARAM, true_value.clone()));
                    conditions.push(Condition {
                        ts: flag_ts,
                        is_or: false,
                    });
                }
            }
        }
        if conditions.is_empty() {
            return;
        }

        let wrap = conditions.len() > 1;
        ts.space().push(Token::Where).space();
        for (i, condition) in conditions.iter().enumerate() {
            if i > 0 {
                ts.space().push(Token::And).space();
            }
            if wrap && condition.is_or {
                ts.lparen().append(&condition.ts).rparen();
            } else {
                ts.append(&condition.ts);
            }
        }
    }

    fn finish(&self, ts: TokenStream, params: ParamList, kind: StatementKind) -> Statement {
        let sql = ts.serialize(self.dialect());
        debug!(
            entity = self.entity_name(),
            kind = ?kind,
            parameters = params.len(),
            sql = %sql,
            "Built statement"
        );
        Statement {
            sql,
            parameters: params.into_vec(),
            kind,
            returns_identity: false,
        }
    }
}

/// One WHERE conjunct.
struct Condition {
    ts: TokenStream,
    is_or: bool,
}
