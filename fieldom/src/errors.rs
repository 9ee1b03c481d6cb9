use std::borrow::Cow;

use thiserror::Error;

use crate::types::EntityType;

/// Top-level error type returned by the field engine.
///
/// Validation failures are deliberately *not* represented here: they are an
/// expected, frequent outcome and travel as data inside
/// [`crate::engine::ValidationOutcome`] / [`crate::submission::SubmissionOutcome`].
/// This enum covers the conditions a caller cannot correct by fixing field
/// values: bad requests, missing scopes, and storage failures.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The `entityType` string is not a member of the closed set. Rejected
    /// before the catalog is touched.
    #[error("unknown entity type: {value}")]
    UnknownEntityType { value: String },

    /// Malformed input supplied to an engine or admin operation.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// The scope entity (the group, the event, …) the fields would be
    /// defined for does not exist. Distinct from an empty catalog, which is
    /// the normal "no custom form" case.
    #[error("scope not found: {entity_type}/{entity_id}")]
    ScopeNotFound {
        entity_type: EntityType,
        entity_id: String,
    },

    /// The submission target does not exist upstream. The host domain owns
    /// instance records and raises this from its own lookup.
    #[error("entity instance not found: {instance_id}")]
    InstanceNotFound { instance_id: String },

    /// Underlying Redis command or script failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored record could not be decoded, or another non-retryable
    /// internal condition.
    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

impl EngineError {
    pub(crate) fn other(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}
