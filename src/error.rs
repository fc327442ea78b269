//! Error types for focuspresso.
//!
//! Expected conditions are not errors: a missing partition loads as an empty
//! list and a missing task id surfaces as [`Mutation::NotFound`]. The error
//! enum is reserved for rejected input and for storage failures the caller
//! must be able to observe, so that "no data yet" and "read failed" are
//! never conflated.

use serde::Serialize;
use thiserror::Error;

use crate::kv::KvError;

/// Main error type for focuspresso operations
#[derive(Error, Debug)]
pub enum Error {
    // Rejected input
    #[error("task title must not be empty")]
    EmptyTitle,

    // Storage failures
    #[error("storage read failed for key '{key}': {source}")]
    StorageRead {
        key: String,
        #[source]
        source: KvError,
    },

    #[error("storage write failed for key '{key}': {source}")]
    StorageWrite {
        key: String,
        #[source]
        source: KvError,
    },

    #[error("corrupt record under key '{key}': {source}")]
    CorruptRecord {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode record for key '{key}': {source}")]
    EncodeRecord {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for focuspresso operations
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a mutation that may target an absent task.
///
/// Updating or deleting an id that is not present is a clean no-op by
/// contract, reported as [`Mutation::NotFound`] rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    Applied,
    NotFound,
}

impl Mutation {
    pub fn applied(self) -> bool {
        matches!(self, Mutation::Applied)
    }
}
