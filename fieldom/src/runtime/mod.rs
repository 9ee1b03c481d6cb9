//! Atomic write plumbing: a submission's accepted values are serialized into
//! one command and applied by a single Lua script execution, so concurrent
//! submissions for the same instance never interleave partial writes.

pub mod commands;
pub mod executor;
pub mod scripts;

pub use commands::{ValueMutation, ValueRowWrite};
pub use executor::execute_value_mutation;
