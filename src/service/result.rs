//! Service call outcomes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::validate::ValidationFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DoResultType {
    Success,
    Fail,
    ValidFail,
    NotFound,
    Unauthorized,
}

/// Outcome of a service operation, with optional data and validation messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoResult<T> {
    #[serde(rename = "type")]
    pub kind: DoResultType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Property name -> validation message.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub valid_fail_results: BTreeMap<String, String>,
}

impl<T> DoResult<T> {
    fn with_kind(kind: DoResultType, message: Option<String>, data: Option<T>) -> Self {
        Self {
            kind,
            message,
            data,
            valid_fail_results: BTreeMap::new(),
        }
    }

    pub fn success(data: T) -> Self {
        Self::with_kind(DoResultType::Success, None, Some(data))
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self::with_kind(DoResultType::Success, Some(message.into()), Some(data))
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::with_kind(DoResultType::Fail, Some(message.into()), None)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_kind(DoResultType::NotFound, Some(message.into()), None)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_kind(DoResultType::Unauthorized, Some(message.into()), None)
    }

    /// `ValidFail` carrying every failure, or a data-less `Success` when there are none.
    ///
    /// Messages are joined by newlines; the per-property map keeps the
    /// first message reported for each property.
    pub fn validate(failures: Vec<ValidationFailure>) -> Self {
        if failures.is_empty() {
            return Self::with_kind(DoResultType::Success, None, None);
        }
        let message = failures
            .iter()
            .map(|f| f.message.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let mut valid_fail_results = BTreeMap::new();
        for failure in failures {
            valid_fail_results
                .entry(failure.property)
                .or_insert(failure.message);
        }
        Self {
            kind: DoResultType::ValidFail,
            message: Some(message),
            data: None,
            valid_fail_results,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == DoResultType::Success
    }

    pub fn is_valid_fail(&self) -> bool {
        self.kind == DoResultType::ValidFail
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DoResult<U> {
        DoResult {
            kind: self.kind,
            message: self.message,
            data: self.data.map(f),
            valid_fail_results: self.valid_fail_results,
        }
    }
}
