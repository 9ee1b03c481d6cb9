//! Fieldom: the dynamic custom-field engine of the membership backend.
//!
//! Administrators define typed fields (optionally grouped into tabs) against
//! a scope such as one group's membership application or one event's
//! registration. End users submit string answers; the engine validates them
//! against the definitions and upserts the accepted values atomically, keyed
//! by `(custom_field_id, entity_instance_id)`.
//!
//! The engine is request-scoped and stateless between calls: all state lives
//! in the injected catalog and value stores. Redis-backed stores are the
//! production path; in-memory stores implement the same traits for tests and
//! embedded hosts.

pub mod admin;
pub mod catalog;
pub mod client;
pub mod compose;
pub mod engine;
pub mod errors;
pub mod id;
pub mod keys;
pub mod runtime;
pub mod submission;
pub mod types;
pub mod validators;

pub use admin::CatalogAdmin;
pub use catalog::{CatalogSource, MemoryCatalog, RedisCatalog, require_scope};
pub use client::FormsClient;
pub use compose::{
    FieldWithValue, FormStructure, SubmittedForm, TabFields, TabValues, form_structure,
    submitted_values,
};
pub use engine::{ValidationOutcome, validate, validate_fields};
pub use errors::EngineError;
pub use submission::{
    MemoryValueStore, RedisValueStore, SubmissionOutcome, ValueStore, ValueWrite, submit,
};
pub use types::{
    EntityType, FieldDefinition, FieldScope, FieldTab, FieldType, FieldValue, SELECTION_SEPARATOR,
    join_selections, split_selections,
};

// Re-export redis types so users don't need to depend on a specific redis version
pub use redis;
pub use redis::aio::ConnectionManager;
