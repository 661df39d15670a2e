//! Feed aggregator
//!
//! Owns the employee directory, both transaction sources, the selection
//! controller and the accumulator. All of it lives behind one mutex that is
//! never held across a request, so the feed can be shared through an `Arc`
//! while its actions run.
//!
//! Every action runs invalidate -> fetch -> merge -> clear busy. A response
//! tagged with an outdated selection generation is dropped before it reaches
//! a source cache or the accumulator.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::accumulator::Accumulator;
use crate::api::ApiRef;
use crate::error::{Endpoint, FeedError, FeedResult};
use crate::selection::{FetchPlan, SelectionController};
use crate::sources::{EmployeeDirectory, EmployeeScopedSource, PaginatedSource};
use crate::types::{Employee, PageResult, Selection, Transaction};

/// Batch the accumulator should currently reflect: the paginated page when
/// there is one, else the employee-scoped result. `None` means nothing has
/// been fetched for the current mode; `Some(&[])` means fetched but empty.
pub fn active_batch<'a>(
    paged: Option<&'a PageResult>,
    scoped: Option<&'a [Transaction]>,
) -> Option<&'a [Transaction]> {
    paged.map(|page| page.data.as_slice()).or(scoped)
}

/// What a feed action did to the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// A batch was fetched and merged
    Merged { added: usize },
    /// Nothing to fetch: the live source is complete
    Unchanged,
    /// The selection changed while the request was in flight; the response
    /// was dropped
    Superseded,
}

/// Everything the rendering layer reads
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub selection: Selection,
    pub transactions: Vec<Transaction>,
    /// Picker entries, "All Employees" first; empty until the directory loads
    pub employees: Vec<Employee>,
    pub employees_loading: bool,
    pub is_loading: bool,
    /// The load-more control is shown
    pub show_load_more: bool,
    /// The load-more control is shown and enabled
    pub can_load_more: bool,
    /// A further load-more would issue a request
    pub has_more_data: bool,
}

#[derive(Debug, Default)]
struct FeedState {
    directory: EmployeeDirectory,
    paginated: PaginatedSource,
    scoped: EmployeeScopedSource,
    accumulator: Accumulator,
    selection: SelectionController,
    in_flight: usize,
}

impl FeedState {
    fn active_batch(&self) -> Option<&[Transaction]> {
        active_batch(self.paginated.result(), self.scoped.transactions())
    }

    fn merge_active(&mut self) -> LoadOutcome {
        let batch = active_batch(self.paginated.result(), self.scoped.transactions());
        match batch {
            Some(batch) => {
                let added = self.accumulator.merge(batch);
                log::debug!(
                    target: "txfeed::feed",
                    "Merged {} of {} transactions ({} accumulated)",
                    added,
                    batch.len(),
                    self.accumulator.len()
                );
                LoadOutcome::Merged { added }
            }
            None => LoadOutcome::Unchanged,
        }
    }

    fn has_more_data(&self) -> bool {
        match self.selection.current() {
            Selection::AllEmployees => !self.paginated.is_exhausted(),
            Selection::Employee(id) => self.scoped.result_for(id).is_none(),
        }
    }
}

/// Clears one unit of the busy counter when dropped, so a failed or
/// abandoned action never leaves the feed stuck in the loading state
struct BusyGuard<'a> {
    feed: &'a Feed,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.feed.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

/// Owns the directory's loading mark while its request is awaited. Dropped
/// before `settled` is set, the request is treated as never sent.
struct DirectoryFetch<'a> {
    feed: &'a Feed,
    settled: bool,
}

impl Drop for DirectoryFetch<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.feed.lock().directory.abandon();
        }
    }
}

/// Paginated, employee-filterable transaction feed
pub struct Feed {
    api: ApiRef,
    state: Mutex<FeedState>,
}

impl Feed {
    pub fn new(api: ApiRef) -> Self {
        Self {
            api,
            state: Mutex::new(FeedState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks an action as in flight; must be called with the state locked
    fn enter(&self, state: &mut FeedState) -> BusyGuard<'_> {
        state.in_flight += 1;
        BusyGuard { feed: self }
    }

    // ==================== Commands ====================

    /// Start-up load. Runs the "all transactions" path unless it already
    /// succeeded or is in flight; after a failed attempt it runs again.
    pub async fn initialize(&self) -> FeedResult<LoadOutcome> {
        let (generation, _busy) = {
            let mut state = self.lock();
            let first_page_missing = state.in_flight == 0
                && state.selection.current().is_all()
                && state.paginated.result().is_none();
            if !state.directory.needs_fetch() && !first_page_missing {
                return Ok(LoadOutcome::Unchanged);
            }
            let generation = state.selection.generation();
            (generation, self.enter(&mut state))
        };
        log::info!(target: "txfeed::feed", "Initial load");
        self.execute(FetchPlan::LoadAll, generation).await
    }

    /// Switch the filter. `None` and the "All Employees" sentinel select
    /// every transaction. The accumulator is cleared and both source caches
    /// are invalidated before the new source is fetched.
    pub async fn select_employee(&self, employee: Option<&Employee>) -> FeedResult<LoadOutcome> {
        self.select(Selection::from_employee(employee)).await
    }

    pub async fn select(&self, selection: Selection) -> FeedResult<LoadOutcome> {
        let (plan, generation, _busy) = {
            let mut state = self.lock();
            let transition = state.selection.select(selection);
            if transition.changes_mode() {
                log::info!(target: "txfeed::feed", "Showing {}", transition.to);
            }
            state.accumulator.clear();
            state.paginated.invalidate_data();
            state.scoped.invalidate_data();
            (transition.plan(), transition.generation, self.enter(&mut state))
        };
        self.execute(plan, generation).await
    }

    /// Extend the current mode without clearing the accumulator. Rejected
    /// with [`FeedError::Busy`] while another action is in flight; a no-op
    /// once the live source has nothing more to give.
    pub async fn load_more(&self) -> FeedResult<LoadOutcome> {
        let (plan, generation, _busy) = {
            let mut state = self.lock();
            if state.in_flight > 0 {
                return Err(FeedError::Busy);
            }
            if !state.has_more_data() {
                log::debug!(target: "txfeed::feed", "Load more: nothing left for {}", state.selection.current());
                return Ok(LoadOutcome::Unchanged);
            }
            let plan = match state.selection.current() {
                Selection::AllEmployees => FetchPlan::NextPage,
                Selection::Employee(id) => FetchPlan::LoadEmployee(id.clone()),
            };
            let generation = state.selection.generation();
            (plan, generation, self.enter(&mut state))
        };
        self.execute(plan, generation).await
    }

    /// Set a transaction's approval flag through the data source, then
    /// update the accumulated copy in place
    pub async fn set_transaction_approval(&self, transaction_id: &str, value: bool) -> FeedResult<()> {
        if !self.lock().accumulator.contains(transaction_id) {
            return Err(FeedError::UnknownTransaction {
                id: transaction_id.to_string(),
            });
        }

        if let Err(e) = self.api.set_transaction_approval(transaction_id, value).await {
            log::warn!(target: "txfeed::feed", "Approval of {} failed: {}", transaction_id, e);
            return Err(FeedError::fetch_failed(Endpoint::SetTransactionApproval, e));
        }

        if let Some(transaction) = self.lock().accumulator.get_mut(transaction_id) {
            transaction.approved = value;
        }
        log::debug!(target: "txfeed::feed", "Transaction {} approved={}", transaction_id, value);
        Ok(())
    }

    // ==================== Fetch execution ====================

    async fn execute(&self, plan: FetchPlan, generation: u64) -> FeedResult<LoadOutcome> {
        match plan {
            FetchPlan::LoadAll => {
                self.ensure_directory().await?;
                let outcome = self.fetch_next_page(generation).await?;
                // The directory may have been in flight for another action
                // that has since failed or been dropped
                self.ensure_directory().await?;
                Ok(outcome)
            }
            FetchPlan::NextPage => self.fetch_next_page(generation).await,
            FetchPlan::LoadEmployee(id) => self.fetch_employee(&id, generation).await,
        }
    }

    /// Fetch the directory when it is neither cached nor being fetched
    async fn ensure_directory(&self) -> FeedResult<()> {
        if !self.lock().directory.begin() {
            return Ok(());
        }
        let mut pending = DirectoryFetch {
            feed: self,
            settled: false,
        };
        let result = self.api.get_employees().await;
        pending.settled = true;
        self.lock().directory.complete(result)?;
        Ok(())
    }

    async fn fetch_next_page(&self, generation: u64) -> FeedResult<LoadOutcome> {
        let page = {
            let mut state = self.lock();
            if !state.selection.is_current(generation) {
                return Ok(LoadOutcome::Superseded);
            }
            match state.paginated.begin() {
                Some(page) => page,
                None => return Ok(LoadOutcome::Unchanged),
            }
        };

        let result = self.api.get_transaction_page(page).await;

        let mut state = self.lock();
        if !state.selection.is_current(generation) {
            log::debug!(target: "txfeed::feed", "Dropping stale page {} (generation {})", page, generation);
            return Ok(LoadOutcome::Superseded);
        }
        state.paginated.complete(page, result)?;
        Ok(state.merge_active())
    }

    async fn fetch_employee(&self, employee_id: &str, generation: u64) -> FeedResult<LoadOutcome> {
        {
            let mut state = self.lock();
            if !state.selection.is_current(generation) {
                return Ok(LoadOutcome::Superseded);
            }
            state.scoped.begin();
        }

        let result = self.api.get_transactions_by_employee(employee_id).await;

        let mut state = self.lock();
        if !state.selection.is_current(generation) {
            log::debug!(
                target: "txfeed::feed",
                "Dropping stale transactions of employee {} (generation {})",
                employee_id,
                generation
            );
            return Ok(LoadOutcome::Superseded);
        }
        state.scoped.complete(employee_id, result)?;
        Ok(state.merge_active())
    }

    // ==================== Queries ====================

    pub fn selection(&self) -> Selection {
        self.lock().selection.current().clone()
    }

    /// Accumulated transactions in first-seen order
    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock().accumulator.transactions().to_vec()
    }

    pub fn transaction_count(&self) -> usize {
        self.lock().accumulator.len()
    }

    /// The active batch, recomputed from the two source caches
    pub fn active_transactions(&self) -> Option<Vec<Transaction>> {
        self.lock().active_batch().map(<[Transaction]>::to_vec)
    }

    /// Cached employee directory, `None` until loaded
    pub fn employees(&self) -> Option<Vec<Employee>> {
        self.lock().directory.employees().map(<[Employee]>::to_vec)
    }

    pub fn employee_options(&self) -> Vec<Employee> {
        self.lock().directory.options()
    }

    pub fn find_employee(&self, id: &str) -> Option<Employee> {
        self.lock().directory.find(id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    pub fn show_load_more(&self) -> bool {
        self.lock().active_batch().is_some()
    }

    pub fn can_load_more(&self) -> bool {
        let state = self.lock();
        state.active_batch().is_some() && state.in_flight == 0
    }

    pub fn has_more_data(&self) -> bool {
        self.lock().has_more_data()
    }

    /// Page the paginated source would request next, `None` once exhausted
    pub fn next_page(&self) -> Option<u32> {
        self.lock().paginated.next_page()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.lock();
        let show_load_more = state.active_batch().is_some();
        FeedSnapshot {
            selection: state.selection.current().clone(),
            transactions: state.accumulator.transactions().to_vec(),
            employees: state.directory.options(),
            employees_loading: state.directory.is_loading(),
            is_loading: state.in_flight > 0,
            show_load_more,
            can_load_more: show_load_more && state.in_flight == 0,
            has_more_data: state.has_more_data(),
        }
    }
}
