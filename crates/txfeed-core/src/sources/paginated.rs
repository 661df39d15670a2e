//! "All transactions" source, fetched one page at a time
//!
//! The cache holds only the most recent page. A page whose `next_page` is
//! `None` ends the feed: later fetches are no-ops until `invalidate_data`,
//! they never start over at the first page.

use crate::api::TransactionApi;
use crate::error::{Endpoint, FeedResult, SourceError};
use crate::sources::FetchCache;
use crate::types::{PageResult, FIRST_PAGE};

#[derive(Debug, Clone, Default)]
pub struct PaginatedSource {
    cache: FetchCache<PageResult>,
}

impl PaginatedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently fetched page
    pub fn result(&self) -> Option<&PageResult> {
        self.cache.last_result()
    }

    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }

    /// Page the next fetch would request, `None` once the last page was seen
    pub fn next_page(&self) -> Option<u32> {
        match self.result() {
            None => Some(FIRST_PAGE),
            Some(page) => page.next_page,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.result().is_some_and(PageResult::is_last)
    }

    /// Fetch the next page. Once exhausted this returns the cached last page
    /// without a request.
    pub async fn fetch_all(&mut self, api: &dyn TransactionApi) -> FeedResult<Option<&PageResult>> {
        if let Some(page) = self.begin() {
            let result = api.get_transaction_page(page).await;
            self.complete(page, result)?;
        }
        Ok(self.result())
    }

    /// Drop the cached page so the next fetch starts at the first page
    pub fn invalidate_data(&mut self) {
        if self.result().is_some() || self.is_loading() {
            log::debug!(target: "txfeed::source", "Paginated transactions invalidated");
        }
        self.cache.clear();
    }

    /// Returns the page to request, or `None` when the feed is exhausted
    pub(crate) fn begin(&mut self) -> Option<u32> {
        let page = self.next_page()?;
        self.cache.start();
        Some(page)
    }

    pub(crate) fn complete(&mut self, page: u32, result: Result<PageResult, SourceError>) -> FeedResult<&PageResult> {
        let recorded = self.cache.settle(Endpoint::PaginatedTransactions, result)?;
        log::debug!(
            target: "txfeed::source",
            "Page {} loaded: {} transactions, next page {:?}",
            page,
            recorded.data.len(),
            recorded.next_page
        );
        Ok(recorded)
    }
}
