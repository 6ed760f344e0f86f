//! # Error Types
//!
//! Errors raised while constructing or combining CbsdData records. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations and carry the offending value.

use thiserror::Error;

/// Top-level error type for CbsdData records.
#[derive(Error, Debug)]
pub enum CbsdError {
    /// The identifier does not match `cbsd/.+/.+`.
    #[error("invalid CBSD id '{value}': expected cbsd/<fcc_id>/<serial_hash>")]
    InvalidId {
        /// The rejected identifier.
        value: String,
    },

    /// The JSON value does not have the CbsdData shape.
    #[error("invalid CbsdData record: {0}")]
    InvalidRecord(String),

    /// The same CBSD appears more than once in a dump.
    #[error("duplicate CbsdData record for '{id}'")]
    DuplicateRecord {
        /// Identifier that appeared twice.
        id: String,
    },

    /// A dump file ends before it starts.
    #[error("dump window ends at {end} before it starts at {start}")]
    InvalidDumpWindow {
        /// Start of the dump window (RFC 3339).
        start: String,
        /// End of the dump window (RFC 3339).
        end: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
