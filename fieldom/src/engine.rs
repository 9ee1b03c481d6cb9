//! The validation engine: catalog × validators → structured outcome.
//!
//! No side effects; safe to call repeatedly, e.g. from a "validate"
//! endpoint before the actual submission.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    catalog::CatalogSource,
    errors::EngineError,
    types::{FieldDefinition, FieldScope},
    validators,
};

/// Result of validating one submission against one scope's catalog.
///
/// Validation failure is an expected outcome, so it travels as data: a
/// `{field_id: reason}` map, never an `Err`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: BTreeMap<String, String>,
}

impl ValidationOutcome {
    pub fn from_errors(errors: BTreeMap<String, String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validates `submitted` against the definitions already fetched for a
/// scope. Pure: the workhorse behind [`validate`] and the submission
/// handler.
///
/// Submitted keys with no matching definition are ignored; the engine is
/// tolerant of stale client payloads.
pub fn validate_fields(
    fields: &[FieldDefinition],
    submitted: &BTreeMap<String, String>,
) -> ValidationOutcome {
    let mut errors = BTreeMap::new();
    for field in fields {
        let raw = submitted.get(&field.id).map(String::as_str);
        if let Err(reason) = validators::check_value(field, raw) {
            errors.insert(field.id.clone(), reason.to_string());
        }
    }
    ValidationOutcome::from_errors(errors)
}

/// Fetches the catalog for `scope` and validates `submitted` against it.
pub async fn validate<C: CatalogSource>(
    catalog: &mut C,
    scope: &FieldScope,
    submitted: &BTreeMap<String, String>,
) -> Result<ValidationOutcome, EngineError> {
    let fields = catalog.fields(scope).await?;
    Ok(validate_fields(&fields, submitted))
}
