//! Error types for txfeed-core
//!
//! Data sources report failures as [`SourceError`]; the feed wraps them in
//! [`FeedError::FetchFailed`] together with the endpoint that failed, so the
//! action that triggered the fetch can surface it and be retried.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Endpoints exposed by a transaction data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Endpoint {
    Employees,
    PaginatedTransactions,
    TransactionsByEmployee,
    SetTransactionApproval,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Employees => write!(f, "employees"),
            Endpoint::PaginatedTransactions => write!(f, "paginatedTransactions"),
            Endpoint::TransactionsByEmployee => write!(f, "transactionsByEmployee"),
            Endpoint::SetTransactionApproval => write!(f, "setTransactionApproval"),
        }
    }
}

/// Failure reported by a data source
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Request failed: {message}")]
    RequestFailed { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },
}

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A data source request failed
    FetchFailed,
    /// Another feed action is still in flight
    Busy,
    /// Transaction is not in the accumulated feed
    UnknownTransaction,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::FetchFailed => write!(f, "FETCH_FAILED"),
            ErrorCode::Busy => write!(f, "BUSY"),
            ErrorCode::UnknownTransaction => write!(f, "UNKNOWN_TRANSACTION"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Detailed error information for the rendering layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Main error type for txfeed-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    #[error("Fetch from {endpoint} failed: {source}")]
    FetchFailed {
        endpoint: Endpoint,
        #[source]
        source: SourceError,
    },

    #[error("Another feed action is still loading")]
    Busy,

    #[error("Transaction not found in feed: {id}")]
    UnknownTransaction { id: String },
}

impl FeedError {
    pub fn fetch_failed(endpoint: Endpoint, source: SourceError) -> Self {
        FeedError::FetchFailed { endpoint, source }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            FeedError::FetchFailed { .. } => ErrorCode::FetchFailed,
            FeedError::Busy => ErrorCode::Busy,
            FeedError::UnknownTransaction { .. } => ErrorCode::UnknownTransaction,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FeedError::FetchFailed { .. } => ErrorSeverity::Error,
            FeedError::Busy => ErrorSeverity::Info,
            FeedError::UnknownTransaction { .. } => ErrorSeverity::Warning,
        }
    }

    /// Whether repeating the same action can succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FeedError::UnknownTransaction { .. })
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            FeedError::FetchFailed { endpoint, source } => {
                details = details.with_detail(serde_json::json!({
                    "endpoint": endpoint.to_string(),
                    "reason": source.to_string(),
                }));
                details = details.with_suggestion(
                    "Nothing was merged; retry the same action.".to_string()
                );
            }
            FeedError::Busy => {
                details = details.with_suggestion(
                    "Wait for the current load to finish.".to_string()
                );
            }
            FeedError::UnknownTransaction { id } => {
                details = details.with_suggestion(format!(
                    "Transaction '{}' has not been loaded into the feed yet.", id
                ));
            }
        }

        details
    }
}

/// Result type with FeedError
pub type FeedResult<T> = Result<T, FeedError>;

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FetchFailed.to_string(), "FETCH_FAILED");
        assert_eq!(ErrorCode::Busy.to_string(), "BUSY");
        assert_eq!(ErrorCode::UnknownTransaction.to_string(), "UNKNOWN_TRANSACTION");
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(Endpoint::Employees.to_string(), "employees");
        assert_eq!(Endpoint::PaginatedTransactions.to_string(), "paginatedTransactions");
        assert_eq!(Endpoint::TransactionsByEmployee.to_string(), "transactionsByEmployee");
    }

    #[test]
    fn test_feed_error_code_and_severity() {
        let error = FeedError::fetch_failed(
            Endpoint::Employees,
            SourceError::RequestFailed { message: "timeout".to_string() },
        );
        assert_eq!(error.code(), ErrorCode::FetchFailed);
        assert_eq!(error.severity(), ErrorSeverity::Error);
        assert!(error.is_retryable());

        assert_eq!(FeedError::Busy.severity(), ErrorSeverity::Info);
        assert!(!FeedError::UnknownTransaction { id: "t9".to_string() }.is_retryable());
    }

    #[test]
    fn test_fetch_failed_details() {
        let error = FeedError::fetch_failed(
            Endpoint::PaginatedTransactions,
            SourceError::RequestFailed { message: "timeout".to_string() },
        );
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::FetchFailed);
        assert!(details.message.contains("paginatedTransactions"));
        assert_eq!(details.details.unwrap()["endpoint"], "paginatedTransactions");
        assert_eq!(details.suggestions.len(), 1);
    }

    #[test]
    fn test_error_details_display() {
        let details = ErrorDetails::new(ErrorCode::Busy, "busy".to_string())
            .with_suggestion("Wait".to_string());
        let text = details.to_string();
        assert!(text.starts_with("[BUSY] busy"));
        assert!(text.contains("  - Wait"));
    }
}
