//! Core type definitions for formstack.
//!
//! This crate defines the small, schema-agnostic types every other crate
//! depends on:
//! - Record identifiers (UUID v7)
//! - The form type discriminator that selects a record's field list
//!
//! Field definitions and values live in `formstack-model`, not here.

mod form_type;
mod ids;

pub use form_type::FormType;
pub use ids::RecordId;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid record id {input:?}: {source}")]
    InvalidRecordId {
        input: String,
        #[source]
        source: uuid::Error,
    },

    #[error("invalid form type: {0:?}")]
    InvalidFormType(String),
}
