use std::io;

use thiserror::Error;

use crate::model::todo::TodoId;

/// Failures at the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stored value under '{key}' is not a valid todo list")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize todo list")]
    Serialization(#[source] serde_json::Error),

    #[error("storage rejected access to '{key}'")]
    Persistence {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("save writer stopped before reporting a result")]
    WriterClosed,
}

/// Caller errors against the in-memory list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TodoError {
    #[error("index {index} is out of range for a list of {len} items")]
    InvalidIndex { index: usize, len: usize },

    #[error("no todo with id {0}")]
    UnknownTodo(TodoId),
}
