//! In-memory fixture data source for the transaction feed
//!
//! Serves a fixed set of employees and transactions through
//! [`TransactionApi`], paging the transaction list in fixed-size pages
//! numbered from 1. Requests can be delayed to mimic a network and made to
//! fail on demand, and every request is counted.

pub mod error;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use txfeed_config::MockConfig;
use txfeed_core::{Employee, Endpoint, PageResult, SourceError, Transaction, TransactionApi, FIRST_PAGE};

pub use error::MockError;

/// Raw fixture content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Fixture {
    pub fn from_json(content: &str) -> Result<Self, MockError> {
        let fixture: Fixture = serde_json::from_str(content)?;
        fixture.validate()?;
        Ok(fixture)
    }

    /// Load a fixture file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, MockError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|source| MockError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        let fixture = Self::from_json(&content)?;
        log::info!(
            target: "txfeed::mock",
            "Fixture {} loaded: {} employees, {} transactions",
            path.display(),
            fixture.employees.len(),
            fixture.transactions.len()
        );
        Ok(fixture)
    }

    /// Check that transaction ids are unique, dates parse, and employee ids
    /// are neither empty nor unknown
    pub fn validate(&self) -> Result<(), MockError> {
        let mut employee_ids = HashSet::new();
        for employee in &self.employees {
            if employee.is_all_employees() {
                return Err(MockError::InvalidEmployee {
                    message: format!("{} has an empty id", employee.display_name()),
                });
            }
            if !employee_ids.insert(employee.id.as_str()) {
                return Err(MockError::InvalidEmployee {
                    message: format!("duplicate employee id {}", employee.id),
                });
            }
        }

        let mut transaction_ids = HashSet::new();
        for transaction in &self.transactions {
            if !transaction_ids.insert(transaction.id.as_str()) {
                return Err(MockError::DuplicateTransaction { id: transaction.id.clone() });
            }
            if transaction.date_naive().is_none() {
                return Err(MockError::InvalidDate {
                    id: transaction.id.clone(),
                    date: transaction.date.clone(),
                });
            }
            if !employee_ids.contains(transaction.employee.id.as_str()) {
                return Err(MockError::InvalidEmployee {
                    message: format!(
                        "transaction {} references unknown employee {}",
                        transaction.id, transaction.employee.id
                    ),
                });
            }
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fixture-backed implementation of [`TransactionApi`]
#[derive(Debug)]
pub struct MockApi {
    employees: Vec<Employee>,
    transactions: Mutex<Vec<Transaction>>,
    page_size: usize,
    latency: Duration,
    failures: Mutex<HashSet<Endpoint>>,
    calls: Mutex<HashMap<Endpoint, usize>>,
}

impl MockApi {
    pub fn new(fixture: Fixture, page_size: usize) -> Result<Self, MockError> {
        if page_size == 0 {
            return Err(MockError::InvalidPageSize(page_size));
        }
        Ok(Self {
            employees: fixture.employees,
            transactions: Mutex::new(fixture.transactions),
            page_size,
            latency: Duration::ZERO,
            failures: Mutex::new(HashSet::new()),
            calls: Mutex::new(HashMap::new()),
        })
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn from_config(fixture: Fixture, config: &MockConfig) -> Result<Self, MockError> {
        Ok(Self::new(fixture, config.page_size)?.with_latency(config.latency()))
    }

    /// Load the fixture at `path` and apply the mock settings
    pub async fn load(path: impl AsRef<Path>, config: &MockConfig) -> Result<Self, MockError> {
        let fixture = Fixture::load(path).await?;
        Self::from_config(fixture, config)
    }

    /// Make the next request to `endpoint` fail once
    pub fn fail_next(&self, endpoint: Endpoint) {
        lock(&self.failures).insert(endpoint);
    }

    /// Requests received by `endpoint`, failed ones included
    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        lock(&self.calls).get(&endpoint).copied().unwrap_or(0)
    }

    /// Number of pages the transaction list spans; an empty list still has one
    pub fn page_count(&self) -> usize {
        let total = lock(&self.transactions).len();
        total.div_ceil(self.page_size).max(1)
    }

    /// Current server-side copy of a transaction
    pub fn transaction(&self, id: &str) -> Option<Transaction> {
        lock(&self.transactions).iter().find(|t| t.id == id).cloned()
    }

    async fn request(&self, endpoint: Endpoint) -> Result<(), SourceError> {
        *lock(&self.calls).entry(endpoint).or_insert(0) += 1;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if lock(&self.failures).remove(&endpoint) {
            log::debug!(target: "txfeed::mock", "Injected failure on {}", endpoint);
            return Err(SourceError::RequestFailed {
                message: format!("injected failure on {}", endpoint),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionApi for MockApi {
    async fn get_employees(&self) -> Result<Vec<Employee>, SourceError> {
        self.request(Endpoint::Employees).await?;
        Ok(self.employees.clone())
    }

    async fn get_transaction_page(&self, page: u32) -> Result<PageResult, SourceError> {
        self.request(Endpoint::PaginatedTransactions).await?;
        if page < FIRST_PAGE {
            return Err(SourceError::InvalidRequest {
                message: format!("page numbers start at {}, got {}", FIRST_PAGE, page),
            });
        }

        let page_count = self.page_count();
        let index = (page - FIRST_PAGE) as usize;
        if index >= page_count {
            return Err(SourceError::NotFound {
                resource: format!("page {} of {}", page, page_count),
            });
        }

        let transactions = lock(&self.transactions);
        let start = index * self.page_size;
        let end = (start + self.page_size).min(transactions.len());
        let data = transactions[start..end].to_vec();
        let next_page = (index + 1 < page_count).then(|| page + 1);
        log::debug!(target: "txfeed::mock", "Serving page {} ({} transactions)", page, data.len());
        Ok(PageResult::new(data, next_page))
    }

    async fn get_transactions_by_employee(&self, employee_id: &str) -> Result<Vec<Transaction>, SourceError> {
        self.request(Endpoint::TransactionsByEmployee).await?;
        if employee_id.is_empty() {
            return Err(SourceError::InvalidRequest {
                message: "employee id cannot be empty".to_string(),
            });
        }
        Ok(lock(&self.transactions)
            .iter()
            .filter(|t| t.belongs_to(employee_id))
            .cloned()
            .collect())
    }

    async fn set_transaction_approval(&self, transaction_id: &str, value: bool) -> Result<(), SourceError> {
        self.request(Endpoint::SetTransactionApproval).await?;
        let mut transactions = lock(&self.transactions);
        match transactions.iter_mut().find(|t| t.id == transaction_id) {
            Some(transaction) => {
                transaction.approved = value;
                Ok(())
            }
            None => Err(SourceError::NotFound {
                resource: format!("transaction {}", transaction_id),
            }),
        }
    }
}
