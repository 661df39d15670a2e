//! Data source capability consumed by the feed
//!
//! The transport behind it is out of scope here; implementations only need to
//! answer the four requests below.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::SourceError;
use crate::types::{Employee, PageResult, Transaction};

/// Data source reference type
pub type ApiRef = Arc<dyn TransactionApi>;

/// Async data source for employees and transactions
#[async_trait]
pub trait TransactionApi: Send + Sync {
    /// Fetch the full employee list
    async fn get_employees(&self) -> Result<Vec<Employee>, SourceError>;

    /// Fetch one page of the "all transactions" feed
    async fn get_transaction_page(&self, page: u32) -> Result<PageResult, SourceError>;

    /// Fetch every transaction of one employee
    async fn get_transactions_by_employee(&self, employee_id: &str) -> Result<Vec<Transaction>, SourceError>;

    /// Set the approval flag of one transaction
    async fn set_transaction_approval(&self, transaction_id: &str, value: bool) -> Result<(), SourceError>;
}
