//! TOML-based configuration for tablemap.
//!
//! Supports a config file (tablemap.toml). Environment variables are
//! expanded in the database connection string only, when it is resolved.
//!
//! Example configuration:
//! ```toml
//! [mapping]
//! delete_flag_property = "is_deleted"
//! delete_flag_string_value = "Y"
//! table_naming = "plural_snake_case"
//!
//! [providers]
//! "Microsoft.Data.Sqlite" = "sqlite"
//!
//! [database]
//! provider = "sqlite"
//! connection_string = "${APP_DATA}/app.db"
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::mapper::{MappingConventions, TableNaming};
use crate::sql::Dialect;
use crate::translate::ProviderRegistry;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z0-9_]+)").expect("valid env var pattern")
});

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unknown dialect '{dialect}' for provider '{provider}'")]
    UnknownDialect { provider: String, dialect: String },
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Auto-mapping conventions.
    pub mapping: MappingSettings,

    /// Extra provider name -> dialect name entries.
    pub providers: HashMap<String, String>,

    /// Database the application connects to.
    pub database: DatabaseSettings,
}

/// Auto-mapping conventions.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MappingSettings {
    /// Property treated as the soft-delete flag.
    pub delete_flag_property: String,

    /// "Deleted" value for string-typed delete flags.
    pub delete_flag_string_value: String,

    /// How default table names are derived.
    pub table_naming: TableNaming,
}

impl Default for MappingSettings {
    fn default() -> Self {
        let conventions = MappingConventions::default();
        Self {
            delete_flag_property: conventions.delete_flag_property,
            delete_flag_string_value: conventions.delete_flag_string_value,
            table_naming: conventions.table_naming,
        }
    }
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Provider name, resolved to a dialect through the provider table.
    pub provider: String,

    /// Connection string (supports ${ENV_VAR} expansion).
    pub connection_string: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

impl DatabaseSettings {
    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection_string)
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse settings from TOML text. Values are kept as written.
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `TABLEMAP_CONFIG`
    /// 2. `./tablemap.toml`
    /// 3. `~/.config/tablemap/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("TABLEMAP_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("tablemap.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tablemap").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Mapping conventions for a [`MappingRegistry`](crate::MappingRegistry).
    pub fn conventions(&self) -> MappingConventions {
        MappingConventions {
            delete_flag_property: self.mapping.delete_flag_property.clone(),
            delete_flag_string_value: self.mapping.delete_flag_string_value.clone(),
            table_naming: self.mapping.table_naming,
        }
    }

    /// Built-in providers plus the `[providers]` entries.
    pub fn provider_registry(&self) -> Result<ProviderRegistry, SettingsError> {
        let mut registry = ProviderRegistry::new();
        for (provider, dialect) in &self.providers {
            let resolved =
                Dialect::from_name(dialect).ok_or_else(|| SettingsError::UnknownDialect {
                    provider: provider.clone(),
                    dialect: dialect.clone(),
                })?;
            registry.register(provider, resolved);
        }
        Ok(registry)
    }

    /// Dialect of the configured database provider.
    pub fn dialect(&self) -> Result<Dialect, SettingsError> {
        Ok(self.provider_registry()?.dialect_for(&self.database.provider))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax; a lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut missing = None;
    let expanded = ENV_VAR.replace_all(s, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        match env::var(name) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(SettingsError::MissingEnvVar(name)),
        None => Ok(expanded.into_owned()),
    }
}
