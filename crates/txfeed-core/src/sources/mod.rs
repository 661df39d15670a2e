//! Source caches: the employee directory and the two transaction sources
//!
//! Each cache fetches in two steps. `begin` decides what to request and marks
//! the cache as loading, then `complete` records the response. The feed can
//! release its lock while the request is in flight and drop the response if
//! the selection moved on. Each source also has a one-shot async `fetch_*`
//! for callers that own it outright.

pub mod by_employee;
pub mod directory;
pub mod paginated;

pub use by_employee::{EmployeeScopedSource, ScopedResult};
pub use directory::EmployeeDirectory;
pub use paginated::PaginatedSource;

use crate::error::{Endpoint, FeedError, FeedResult, SourceError};

/// Last successful result of one source plus its in-flight flag
#[derive(Debug, Clone)]
pub struct FetchCache<T> {
    last_result: Option<T>,
    loading: bool,
}

impl<T> Default for FetchCache<T> {
    fn default() -> Self {
        Self {
            last_result: None,
            loading: false,
        }
    }
}

impl<T> FetchCache<T> {
    pub fn last_result(&self) -> Option<&T> {
        self.last_result.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub(crate) fn start(&mut self) {
        self.loading = true;
    }

    /// Record a response. A failure leaves the previous result in place.
    pub(crate) fn settle(&mut self, endpoint: Endpoint, result: Result<T, SourceError>) -> FeedResult<&T> {
        self.loading = false;
        match result {
            Ok(value) => Ok(&*self.last_result.insert(value)),
            Err(source) => {
                log::warn!(target: "txfeed::source", "{} request failed: {}", endpoint, source);
                Err(FeedError::fetch_failed(endpoint, source))
            }
        }
    }

    /// Forget an in-flight request whose response will never arrive
    pub(crate) fn abandon(&mut self) {
        self.loading = false;
    }

    pub(crate) fn clear(&mut self) {
        self.last_result = None;
        self.loading = false;
    }
}
