//! Scripted data source shared by the unit tests of this crate

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::api::TransactionApi;
use crate::error::{Endpoint, SourceError};
use crate::types::{Employee, PageResult, Transaction};

pub(crate) fn employee(id: &str) -> Employee {
    Employee::new(id, format!("First-{}", id), format!("Last-{}", id))
}

pub(crate) fn tx(id: &str, employee_id: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        amount: 10.0,
        employee: employee(employee_id),
        merchant: format!("Merchant {}", id),
        date: "2024-06-15".to_string(),
        approved: false,
    }
}

pub(crate) fn ids(transactions: &[Transaction]) -> Vec<&str> {
    transactions.iter().map(|t| t.id.as_str()).collect()
}

/// Answers from fixed tables, records every request, and can fail or hold
/// individual requests on demand
#[derive(Default)]
pub(crate) struct ScriptedApi {
    employees: Vec<Employee>,
    pages: HashMap<u32, PageResult>,
    by_employee: HashMap<String, Vec<Transaction>>,
    failures: Mutex<HashSet<Endpoint>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_employees(mut self, employees: Vec<Employee>) -> Self {
        self.employees = employees;
        self
    }

    pub(crate) fn with_page(mut self, page: u32, data: Vec<Transaction>, next_page: Option<u32>) -> Self {
        self.pages.insert(page, PageResult::new(data, next_page));
        self
    }

    pub(crate) fn with_employee_transactions(mut self, employee_id: &str, data: Vec<Transaction>) -> Self {
        self.by_employee.insert(employee_id.to_string(), data);
        self
    }

    /// Fail the next request to `endpoint`
    pub(crate) fn fail_next(&self, endpoint: Endpoint) {
        self.failures.lock().unwrap().insert(endpoint);
    }

    /// Hold the request identified by `key` (`"page:N"` or an employee id)
    /// until the returned sender fires
    pub(crate) fn hold(&self, key: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(key.to_string(), rx);
        tx
    }

    /// Requests seen so far, e.g. `["employees", "page:1", "employee:e1"]`
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, prefix: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.starts_with(prefix)).count()
    }

    async fn enter(&self, endpoint: Endpoint, call: String, gate_key: &str) -> Result<(), SourceError> {
        self.calls.lock().unwrap().push(call);
        let gate = self.gates.lock().unwrap().remove(gate_key);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.failures.lock().unwrap().remove(&endpoint) {
            return Err(SourceError::RequestFailed { message: format!("scripted {} failure", endpoint) });
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionApi for ScriptedApi {
    async fn get_employees(&self) -> Result<Vec<Employee>, SourceError> {
        self.enter(Endpoint::Employees, "employees".to_string(), "employees").await?;
        Ok(self.employees.clone())
    }

    async fn get_transaction_page(&self, page: u32) -> Result<PageResult, SourceError> {
        let key = format!("page:{}", page);
        self.enter(Endpoint::PaginatedTransactions, key.clone(), &key).await?;
        self.pages
            .get(&page)
            .cloned()
            .ok_or(SourceError::NotFound { resource: key })
    }

    async fn get_transactions_by_employee(&self, employee_id: &str) -> Result<Vec<Transaction>, SourceError> {
        self.enter(Endpoint::TransactionsByEmployee, format!("employee:{}", employee_id), employee_id).await?;
        Ok(self.by_employee.get(employee_id).cloned().unwrap_or_default())
    }

    async fn set_transaction_approval(&self, transaction_id: &str, value: bool) -> Result<(), SourceError> {
        let call = format!("approval:{}={}", transaction_id, value);
        self.enter(Endpoint::SetTransactionApproval, call, transaction_id).await
    }
}
