//! Configuration for tablemap.
//!
//! Handles the settings file, environment variable expansion and the
//! mapping conventions and dialect choice derived from it.

mod settings;

pub use settings::{expand_env_vars, DatabaseSettings, MappingSettings, Settings, SettingsError};
