//! Deduplicated, insertion-ordered list of every transaction seen in the
//! current selection

use std::collections::HashSet;

use crate::types::Transaction;

#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    transactions: Vec<Transaction>,
    ids: HashSet<String>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the transactions of `batch` whose id has not been seen, in
    /// batch order. Entries already present are left as they are, even when
    /// the incoming copy differs. Returns the number of appended entries.
    pub fn merge(&mut self, batch: &[Transaction]) -> usize {
        let before = self.transactions.len();
        for transaction in batch {
            if self.ids.insert(transaction.id.clone()) {
                self.transactions.push(transaction.clone());
            }
        }
        self.transactions.len() - before
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
        self.ids.clear();
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// In-place edit of an accumulated entry, for local changes such as approvals
    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|t| t.id == id)
    }
}
