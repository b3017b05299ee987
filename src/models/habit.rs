use serde::{Deserialize, Serialize};

use super::{new_id, Patch};

/// A single actionable item within a habit stack.
///
/// `order` is a sort hint carried alongside the habit, not its index in the
/// stack: duplicate and gapped values are legal and are stored as given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub order: u32,
}

impl Habit {
    /// Creates a habit with a freshly generated id.
    pub fn new(name: impl Into<String>, order: u32) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            order,
        }
    }
}

/// A habit supplied when creating a stack.
///
/// The habit id is always generated; an `id` key in the request body is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHabitInput {
    pub name: String,
    #[serde(default)]
    pub order: u32,
}

impl CreateHabitInput {
    pub fn into_habit(self) -> Habit {
        Habit::new(self.name, self.order)
    }
}

impl From<&Habit> for CreateHabitInput {
    /// Copies name and order only; the copy gets its own id on creation.
    fn from(habit: &Habit) -> Self {
        Self {
            name: habit.name.clone(),
            order: habit.order,
        }
    }
}

/// Input for appending a habit to an existing stack. The id is always generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddHabitInput {
    pub name: String,
    #[serde(default)]
    pub order: u32,
}

/// Partial update of a single habit. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHabitInput {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub order: Patch<u32>,
}
