//! Persistence gateway contract for habit stacks.
//!
//! The aggregate in [`crate::stacks`] only talks to storage through
//! [`DocumentStore`]. Every filter is an exact match on the stack id; the
//! store's own row identifiers never leave the implementation.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::{Habit, HabitStack};

/// A stack as stored: the full document, written and read as a unit.
pub type StackDocument = HabitStack;

/// Fields to set in a single `update_one` call.
///
/// `None` leaves the stored field untouched. `updated_at` is always written
/// and `version` is always incremented by the store.
#[derive(Debug, Clone)]
pub struct StackChanges {
    pub name: Option<String>,
    pub habits: Option<Vec<Habit>>,
    pub updated_at: DateTime<Utc>,
}

impl StackChanges {
    pub fn touch(updated_at: DateTime<Utc>) -> Self {
        Self {
            name: None,
            habits: None,
            updated_at,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_habits(mut self, habits: Option<Vec<Habit>>) -> Self {
        self.habits = habits;
        self
    }

    /// The document that results from applying these changes to `doc`
    /// under the store's versioning rule.
    pub fn applied_to(&self, doc: &StackDocument) -> StackDocument {
        StackDocument {
            id: doc.id.clone(),
            name: self.name.clone().unwrap_or_else(|| doc.name.clone()),
            habits: self.habits.clone().unwrap_or_else(|| doc.habits.clone()),
            version: doc.version + 1,
            created_at: doc.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Document store keyed by stack id.
///
/// Implementations must make each call atomic with respect to the single
/// document it touches. No multi-call transactions are required.
pub trait DocumentStore: Send + Sync {
    /// All stored documents in storage-native order.
    fn find_all(&self) -> Result<Vec<StackDocument>>;

    fn find_one(&self, id: &str) -> Result<Option<StackDocument>>;

    /// Returns `false` if the store accepted the call but did not write.
    fn insert_one(&self, doc: &StackDocument) -> Result<bool>;

    /// Compare-and-swap update. Modifies the document only when its stored
    /// version equals `expected_version`; returns the number of documents
    /// modified (0 or 1).
    fn update_one(&self, id: &str, expected_version: u64, changes: &StackChanges) -> Result<u64>;

    /// Returns the number of documents deleted (0 or 1).
    fn delete_one(&self, id: &str) -> Result<u64>;
}
