//! Employee-scoped source: one request returns an employee's whole history

use serde::Serialize;

use crate::api::TransactionApi;
use crate::error::{Endpoint, FeedResult, SourceError};
use crate::sources::FetchCache;
use crate::types::Transaction;

/// Complete transaction set of one employee
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedResult {
    pub employee_id: String,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeScopedSource {
    cache: FetchCache<ScopedResult>,
}

impl EmployeeScopedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn result(&self) -> Option<&ScopedResult> {
        self.cache.last_result()
    }

    /// Cached transactions, whichever employee they belong to
    pub fn transactions(&self) -> Option<&[Transaction]> {
        self.result().map(|r| r.transactions.as_slice())
    }

    /// Cached transactions if they were fetched for `employee_id`
    pub fn result_for(&self, employee_id: &str) -> Option<&[Transaction]> {
        self.result()
            .filter(|r| r.employee_id == employee_id)
            .map(|r| r.transactions.as_slice())
    }

    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }

    /// Fetch every transaction of `employee_id`, replacing any cached result
    pub async fn fetch_by_id(&mut self, api: &dyn TransactionApi, employee_id: &str) -> FeedResult<&[Transaction]> {
        self.begin();
        let result = api.get_transactions_by_employee(employee_id).await;
        self.complete(employee_id, result)
    }

    pub fn invalidate_data(&mut self) {
        if self.result().is_some() || self.is_loading() {
            log::debug!(target: "txfeed::source", "Employee transactions invalidated");
        }
        self.cache.clear();
    }

    pub(crate) fn begin(&mut self) {
        self.cache.start();
    }

    pub(crate) fn complete(
        &mut self,
        employee_id: &str,
        result: Result<Vec<Transaction>, SourceError>,
    ) -> FeedResult<&[Transaction]> {
        let result = result.map(|transactions| ScopedResult {
            employee_id: employee_id.to_string(),
            transactions,
        });
        let recorded = self.cache.settle(Endpoint::TransactionsByEmployee, result)?;
        log::debug!(
            target: "txfeed::source",
            "Employee {} loaded: {} transactions",
            employee_id,
            recorded.transactions.len()
        );
        Ok(recorded.transactions.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ids, tx, ScriptedApi};

    fn api() -> ScriptedApi {
        ScriptedApi::new()
            .with_employee_transactions("a", vec![tx("t1", "a"), tx("t2", "a")])
            .with_employee_transactions("b", vec![tx("t4", "b")])
    }

    #[tokio::test]
    async fn test_fetch_replaces_previous_employee() {
        let api = api();
        let mut source = EmployeeScopedSource::new();

        assert_eq!(ids(source.fetch_by_id(&api, "a").await.unwrap()), vec!["t1", "t2"]);
        assert_eq!(ids(source.fetch_by_id(&api, "b").await.unwrap()), vec!["t4"]);

        assert!(source.result_for("a").is_none());
        assert_eq!(source.result_for("b").map(|t| t.len()), Some(1));
        assert_eq!(source.result().unwrap().employee_id, "b");
    }

    #[tokio::test]
    async fn test_empty_result_is_still_a_result() {
        let api = api();
        let mut source = EmployeeScopedSource::new();

        assert!(source.fetch_by_id(&api, "nobody").await.unwrap().is_empty());
        assert_eq!(source.transactions(), Some(&[][..]));
    }

    #[tokio::test]
    async fn test_invalidate_and_failure() {
        let api = api();
        let mut source = EmployeeScopedSource::new();
        source.fetch_by_id(&api, "a").await.unwrap();

        api.fail_next(Endpoint::TransactionsByEmployee);
        assert!(source.fetch_by_id(&api, "b").await.is_err());
        assert!(source.result_for("a").is_some());
        assert!(!source.is_loading());

        source.invalidate_data();
        assert!(source.transactions().is_none());
    }
}
