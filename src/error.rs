//! Crate-level error type.

use crate::config::SettingsError;
use crate::executor::ExecError;
use crate::mapper::{LookupError, MappingError};
use crate::statement::StatementError;
use crate::translate::TranslateError;
use crate::value::ValueError;

/// Any error raised by the repository and service layers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Statement(#[from] StatementError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

pub type Result<T> = std::result::Result<T, Error>;
