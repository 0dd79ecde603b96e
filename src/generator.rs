//! Table, column and property-set rendering for one entity mapping.
//!
//! The generator never sees values: it turns an [`EntityMapping`] into
//! quoted identifiers and decides which properties take part in each kind
//! of statement.

use std::sync::Arc;

use crate::entity::PropertyRef;
use crate::mapper::{EntityMapping, KeyType, LookupError, PropertyMapping};
use crate::sql::{Dialect, SqlDialect, Token, TokenStream};

/// Include/exclude list applied to UPDATE column sets and validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PropertyFilter {
    #[default]
    All,
    /// Only these properties. An empty list means all.
    Include(Vec<String>),
    /// Every property except these.
    Exclude(Vec<String>),
}

impl PropertyFilter {
    pub fn include<P: PropertyRef>(props: &[P]) -> Self {
        PropertyFilter::Include(crate::entity::property_names(props))
    }

    pub fn exclude<P: PropertyRef>(props: &[P]) -> Self {
        PropertyFilter::Exclude(crate::entity::property_names(props))
    }

    /// Whether a property passes the filter (case-insensitive).
    pub fn allows(&self, name: &str) -> bool {
        match self {
            PropertyFilter::All => true,
            PropertyFilter::Include(names) => {
                names.is_empty() || names.iter().any(|n| n.eq_ignore_ascii_case(name))
            }
            PropertyFilter::Exclude(names) => !names.iter().any(|n| n.eq_ignore_ascii_case(name)),
        }
    }

    fn names(&self) -> &[String] {
        match self {
            PropertyFilter::All => &[],
            PropertyFilter::Include(names) | PropertyFilter::Exclude(names) => names,
        }
    }
}

/// SQL fragments for one entity in one dialect.
#[derive(Debug, Clone)]
pub struct SqlGenerator {
    mapping: Arc<EntityMapping>,
    dialect: Dialect,
}

impl SqlGenerator {
    pub fn new(mapping: Arc<EntityMapping>, dialect: Dialect) -> Self {
        Self { mapping, dialect }
    }

    pub fn mapping(&self) -> &EntityMapping {
        &self.mapping
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Quoted `schema.table`, with an optional alias.
    pub fn table_tokens(&self, alias: Option<&str>) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(self.table_ident());
        if let Some(alias) = alias.filter(|a| !a.is_empty()) {
            ts.space();
            if self.dialect.table_alias_uses_as() {
                ts.push(Token::As).space();
            }
            ts.push(Token::Ident(alias.to_string()));
        }
        ts
    }

    pub fn table_name(&self, alias: Option<&str>) -> String {
        self.table_tokens(alias).serialize(self.dialect)
    }

    /// Quoted column, optionally table-qualified and aliased back to the
    /// property name when the two differ.
    pub fn column_tokens(
        &self,
        property: &PropertyMapping,
        include_table: bool,
        include_alias: bool,
    ) -> TokenStream {
        let mut ts = TokenStream::new();
        if include_table {
            ts.push(self.table_ident()).push(Token::Dot);
        }
        ts.push(Token::Ident(property.column_name().to_string()));
        if include_alias && property.column_name() != property.name() {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(property.name().to_string()));
        }
        ts
    }

    /// Rendered column for a property name.
    pub fn column_name(
        &self,
        property: &(impl PropertyRef + ?Sized),
        include_table: bool,
        include_alias: bool,
    ) -> Result<String, LookupError> {
        let property = self.mapping.resolve(property)?;
        Ok(self.column_name_of(property, include_table, include_alias))
    }

    pub fn column_name_of(
        &self,
        property: &PropertyMapping,
        include_table: bool,
        include_alias: bool,
    ) -> String {
        self.column_tokens(property, include_table, include_alias)
            .serialize(self.dialect)
    }

    fn table_ident(&self) -> Token {
        Token::QualifiedIdent {
            schema: self
                .mapping
                .schema_name()
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            name: self.mapping.table_name().to_string(),
        }
    }

    // =========================================================================
    // Property sets
    // =========================================================================

    pub fn property(&self, name: &(impl PropertyRef + ?Sized)) -> Result<&PropertyMapping, LookupError> {
        self.mapping.resolve(name)
    }

    /// Key properties in declaration order; an entity without one is an error.
    pub fn key_properties(&self) -> Result<Vec<&PropertyMapping>, LookupError> {
        let keys: Vec<_> = self.mapping.key_properties().collect();
        if keys.is_empty() {
            return Err(LookupError::NoKey(self.mapping.entity_name()));
        }
        Ok(keys)
    }

    pub fn delete_flag_property(&self) -> Option<&PropertyMapping> {
        self.mapping.delete_flag_property()
    }

    /// Non-ignored properties minus `excluding`.
    pub fn select_properties<P: PropertyRef>(
        &self,
        excluding: &[P],
    ) -> Result<Vec<&PropertyMapping>, LookupError> {
        let excluded = PropertyFilter::exclude(excluding);
        self.check_names(excluded.names())?;
        Ok(self
            .mapping
            .properties()
            .iter()
            .filter(|p| !p.is_ignored() && excluded.allows(p.name()))
            .collect())
    }

    /// Properties eligible for an UPDATE SET list: no ignored, read-only or
    /// key properties, then `filter`.
    pub fn update_properties(
        &self,
        filter: &PropertyFilter,
    ) -> Result<Vec<&PropertyMapping>, LookupError> {
        self.check_names(filter.names())?;
        Ok(self
            .mapping
            .properties()
            .iter()
            .filter(|p| !p.is_ignored() && !p.is_read_only() && !p.is_key())
            .filter(|p| filter.allows(p.name()))
            .collect())
    }

    /// Properties eligible for an INSERT column list: no ignored, read-only
    /// or identity-keyed properties, minus `excluding`.
    pub fn insert_properties<P: PropertyRef>(
        &self,
        excluding: &[P],
    ) -> Result<Vec<&PropertyMapping>, LookupError> {
        let excluded = PropertyFilter::exclude(excluding);
        self.check_names(excluded.names())?;
        Ok(self
            .mapping
            .properties()
            .iter()
            .filter(|p| !p.is_ignored() && !p.is_read_only() && p.key_type() != KeyType::Identity)
            .filter(|p| excluded.allows(p.name()))
            .collect())
    }

    /// Comma-joined aliased columns for a SELECT list.
    pub fn select_list<P: PropertyRef>(&self, excluding: &[P]) -> Result<TokenStream, LookupError> {
        let columns = self
            .select_properties(excluding)?
            .into_iter()
            .map(|p| self.column_tokens(p, false, true));
        let mut ts = TokenStream::new();
        ts.join_comma(columns);
        Ok(ts)
    }

    fn check_names(&self, names: &[String]) -> Result<(), LookupError> {
        for name in names {
            self.mapping.resolve(name.as_str())?;
        }
        Ok(())
    }
}
