//! Selection controller
//!
//! Tracks whether the feed shows every transaction or one employee's, and
//! turns each change into a [`Transition`]. Every change bumps a generation
//! counter. Fetches are tagged with the generation they were issued under,
//! so a response that arrives after the user moved on can be recognised and
//! dropped.

use crate::types::Selection;

/// Fetch work that brings the live source up to date
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPlan {
    /// Employee directory (when not cached) followed by the next page
    LoadAll,
    /// Next page of the paginated source only
    NextPage,
    /// Complete transaction set of one employee
    LoadEmployee(String),
}

/// Outcome of a selection change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Selection,
    pub to: Selection,
    /// Generation the follow-up fetches belong to
    pub generation: u64,
}

impl Transition {
    /// Fetches that populate the newly selected source
    pub fn plan(&self) -> FetchPlan {
        match &self.to {
            Selection::AllEmployees => FetchPlan::LoadAll,
            Selection::Employee(id) => FetchPlan::LoadEmployee(id.clone()),
        }
    }

    pub fn changes_mode(&self) -> bool {
        self.from.is_all() != self.to.is_all()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    current: Selection,
    generation: u64,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Selection {
        &self.current
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether work tagged with `generation` still matches the selection
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Switch to `to`. Re-selecting the current value also counts as a change:
    /// the caller starts that mode over from scratch.
    pub fn select(&mut self, to: Selection) -> Transition {
        let to = match to {
            Selection::Employee(id) if id.is_empty() => Selection::AllEmployees,
            other => other,
        };
        let from = std::mem::replace(&mut self.current, to.clone());
        self.generation += 1;
        log::debug!(target: "txfeed::feed", "Selection {} -> {} (generation {})", from, to, self.generation);
        Transition {
            from,
            to,
            generation: self.generation,
        }
    }
}
