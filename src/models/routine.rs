use serde::{Deserialize, Serialize};

use super::Habit;

/// A read-only routine template. Never persisted as user data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub description: String,
    pub habits: Vec<Habit>,
}
