//! Transaction feed aggregation and fetch coordination
//!
//! A [`Feed`] shows either every transaction, one page at a time, or the
//! complete history of a single employee. Everything fetched for the current
//! selection is merged into one deduplicated, insertion-ordered list.
//!
//! Modules:
//! - types: employees, transactions, pages, selection
//! - api: the async data source the feed reads from
//! - sources: employee directory, paginated and employee-scoped caches
//! - accumulator: the deduplicated running list
//! - selection: selection state machine and fetch plans
//! - feed: the aggregator tying it together

pub mod accumulator;
pub mod api;
pub mod error;
pub mod feed;
pub mod selection;
pub mod sources;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use accumulator::Accumulator;
pub use api::{ApiRef, TransactionApi};
pub use error::{Endpoint, ErrorCode, ErrorDetails, ErrorSeverity, FeedError, FeedResult, SourceError};
pub use feed::{active_batch, Feed, FeedSnapshot, LoadOutcome};
pub use selection::{FetchPlan, SelectionController, Transition};
pub use sources::{EmployeeDirectory, EmployeeScopedSource, FetchCache, PaginatedSource, ScopedResult};
pub use types::{Employee, PageResult, Selection, Transaction, ALL_EMPLOYEES_ID, FIRST_PAGE};
