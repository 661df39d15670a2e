//! Employee directory, fetched once and never invalidated

use crate::api::TransactionApi;
use crate::error::{Endpoint, FeedResult, SourceError};
use crate::sources::FetchCache;
use crate::types::Employee;

#[derive(Debug, Clone, Default)]
pub struct EmployeeDirectory {
    cache: FetchCache<Vec<Employee>>,
}

impl EmployeeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached employees, `None` until the first successful fetch
    pub fn employees(&self) -> Option<&[Employee]> {
        self.cache.last_result().map(Vec::as_slice)
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.last_result().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }

    /// Neither loaded nor currently loading
    pub fn needs_fetch(&self) -> bool {
        !self.is_loaded() && !self.is_loading()
    }

    /// Picker entries: the "All Employees" sentinel followed by the
    /// directory. Empty until the directory is loaded.
    pub fn options(&self) -> Vec<Employee> {
        match self.employees() {
            Some(employees) => std::iter::once(Employee::all_employees())
                .chain(employees.iter().cloned())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&Employee> {
        self.employees()?.iter().find(|e| e.id == id)
    }

    /// Fetch the directory unless it is already cached
    pub async fn fetch_all(&mut self, api: &dyn TransactionApi) -> FeedResult<&[Employee]> {
        if self.begin() {
            let result = api.get_employees().await;
            self.complete(result)?;
        }
        Ok(self.employees().unwrap_or_default())
    }

    /// Returns `true` when a request should be issued
    pub(crate) fn begin(&mut self) -> bool {
        if !self.needs_fetch() {
            return false;
        }
        self.cache.start();
        true
    }

    /// Drop the loading mark of a request that was cancelled before it
    /// completed, so the next caller can fetch again
    pub(crate) fn abandon(&mut self) {
        if self.is_loading() {
            log::debug!(target: "txfeed::source", "Employee directory request abandoned");
        }
        self.cache.abandon();
    }

    pub(crate) fn complete(&mut self, result: Result<Vec<Employee>, SourceError>) -> FeedResult<&[Employee]> {
        let employees = self.cache.settle(Endpoint::Employees, result)?;
        log::debug!(target: "txfeed::source", "Employee directory loaded: {} employees", employees.len());
        Ok(employees.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{employee, ScriptedApi};

    #[tokio::test]
    async fn test_fetch_all_is_cached() {
        let api = ScriptedApi::new().with_employees(vec![employee("a"), employee("b")]);
        let mut directory = EmployeeDirectory::new();
        assert!(directory.options().is_empty());

        assert_eq!(directory.fetch_all(&api).await.unwrap().len(), 2);
        assert_eq!(directory.fetch_all(&api).await.unwrap().len(), 2);
        assert_eq!(api.call_count("employees"), 1);

        let options = directory.options();
        assert_eq!(options.len(), 3);
        assert!(options[0].is_all_employees());
        assert_eq!(directory.find("b").map(|e| e.id.as_str()), Some("b"));
        assert!(directory.find("zz").is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_can_be_retried() {
        let api = ScriptedApi::new().with_employees(vec![employee("a")]);
        api.fail_next(Endpoint::Employees);
        let mut directory = EmployeeDirectory::new();

        assert!(directory.fetch_all(&api).await.is_err());
        assert!(!directory.is_loaded());
        assert!(directory.needs_fetch());

        assert_eq!(directory.fetch_all(&api).await.unwrap().len(), 1);
        assert_eq!(api.call_count("employees"), 2);
    }

    #[test]
    fn test_begin_skips_while_loading() {
        let mut directory = EmployeeDirectory::new();
        assert!(directory.begin());
        assert!(directory.is_loading());
        assert!(!directory.begin());
    }

    #[test]
    fn test_abandoned_request_allows_new_begin() {
        let mut directory = EmployeeDirectory::new();
        assert!(directory.begin());
        directory.abandon();
        assert!(directory.needs_fetch());
        assert!(directory.begin());
    }
}
