//! Provider name to dialect lookup.

use std::collections::HashMap;

use tracing::debug;

use crate::sql::Dialect;

const BUILT_IN: &[(&str, Dialect)] = &[
    ("sqlserver", Dialect::TSql),
    ("mssql", Dialect::TSql),
    ("system.data.sqlclient", Dialect::TSql),
    ("sqlite", Dialect::Sqlite),
    ("system.data.sqlite", Dialect::Sqlite),
    ("mysql", Dialect::MySql),
    ("mysql.data.mysqlclient", Dialect::MySql),
    ("oracle", Dialect::Oracle),
    ("oracle.dataaccess.client", Dialect::Oracle),
    ("postgres", Dialect::Postgres),
    ("postgresql", Dialect::Postgres),
    ("npgsql", Dialect::Postgres),
];

/// Case-insensitive provider name to [`Dialect`] table.
///
/// Unknown providers fall back to [`Dialect::Ansi`].
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Dialect>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self {
            providers: BUILT_IN
                .iter()
                .map(|(name, dialect)| (name.to_string(), *dialect))
                .collect(),
        }
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a provider entry.
    pub fn register(&mut self, provider: &str, dialect: Dialect) -> &mut Self {
        self.providers.insert(provider.to_ascii_lowercase(), dialect);
        self
    }

    pub fn get(&self, provider: &str) -> Option<Dialect> {
        self.providers.get(&provider.to_ascii_lowercase()).copied()
    }

    pub fn dialect_for(&self, provider: &str) -> Dialect {
        self.get(provider).unwrap_or_else(|| {
            debug!(provider, "Unknown provider, using ANSI dialect");
            Dialect::Ansi
        })
    }
}
