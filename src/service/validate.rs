//! Entity validation collaborators.

use serde::Serialize;

use crate::generator::PropertyFilter;

/// One failed rule on one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub property: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }
}

/// Validates entities before they are written.
pub trait EntityValidator<E>: Send + Sync {
    fn validate(&self, entity: &E) -> Vec<ValidationFailure>;

    /// Failures limited to the properties `filter` allows.
    fn validate_filtered(&self, entity: &E, filter: &PropertyFilter) -> Vec<ValidationFailure> {
        self.validate(entity)
            .into_iter()
            .filter(|f| filter.allows(&f.property))
            .collect()
    }
}

/// Accepts every entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopValidator;

impl<E> EntityValidator<E> for NoopValidator {
    fn validate(&self, _entity: &E) -> Vec<ValidationFailure> {
        Vec::new()
    }
}

/// Runs the rules an entity declares with `#[derive(validator::Validate)]`.
///
/// Failures are ordered by property name; a rule without a message reports
/// its code.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeriveValidator;

impl<E: validator::Validate> EntityValidator<E> for DeriveValidator {
    fn validate(&self, entity: &E) -> Vec<ValidationFailure> {
        let Err(errors) = entity.validate() else {
            return Vec::new();
        };
        let mut failures: Vec<ValidationFailure> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    ValidationFailure::new(field.to_string(), message)
                })
            })
            .collect();
        failures.sort_by(|a, b| a.property.cmp(&b.property));
        failures
    }
}

/// Any closure over the entity is a validator.
impl<E, F> EntityValidator<E> for F
where
    F: Fn(&E) -> Vec<ValidationFailure> + Send + Sync,
{
    fn validate(&self, entity: &E) -> Vec<ValidationFailure> {
        self(entity)
    }
}
