//! Error types for txfeed-mock

use thiserror::Error;

/// Failure while loading or validating a fixture
#[derive(Error, Debug)]
pub enum MockError {
    #[error("Cannot read fixture {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fixture JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Duplicate transaction id: {id}")]
    DuplicateTransaction { id: String },

    #[error("Transaction {id} has an invalid date: {date}")]
    InvalidDate { id: String, date: String },

    #[error("Invalid employee: {message}")]
    InvalidEmployee { message: String },

    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),
}
