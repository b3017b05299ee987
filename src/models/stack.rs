use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CreateHabitInput, Habit, Patch, Routine};

/// A named, ordered collection of habits.
///
/// The stack owns its habits: they are stored and written back as one
/// document, so the habit sequence always changes atomically with
/// `updated_at` and `version`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitStack {
    pub id: String,
    pub name: String,
    /// Habits in insertion order as stored.
    pub habits: Vec<Habit>,
    /// Incremented on every successful write. Used for optimistic concurrency.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HabitStack {
    pub fn habit(&self, habit_id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == habit_id)
    }
}

/// Input for creating a new habit stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStackInput {
    pub name: String,
    #[serde(default)]
    pub habits: Vec<CreateHabitInput>,
}

impl CreateStackInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            habits: Vec::new(),
        }
    }

    /// Seeds the input with a routine's habits (name and order only).
    /// `name` defaults to the routine's name.
    pub fn from_routine(routine: &Routine, name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| routine.name.clone()),
            habits: routine.habits.iter().map(CreateHabitInput::from).collect(),
        }
    }

    /// Appends habits after the existing ones, ordered from one past the
    /// highest `order` already present.
    pub fn append_habits(mut self, names: impl IntoIterator<Item = String>) -> Self {
        let next_order = self.habits.iter().map(|h| h.order + 1).max().unwrap_or(0);
        self.habits.extend(
            names
                .into_iter()
                .zip(next_order..)
                .map(|(name, order)| CreateHabitInput { name, order }),
        );
        self
    }
}

/// Input for updating an existing stack.
///
/// `habits`, when present, replaces the whole sequence and must carry every
/// habit's id. `version`, when present, must match the stored version or the
/// update is rejected as a conflict.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStackInput {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub habits: Patch<Vec<Habit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

/// Confirmation body returned by delete-style operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routine() -> Routine {
        Routine {
            id: "workout-routine".to_string(),
            name: "Workout Routine".to_string(),
            description: "Build physical strength".to_string(),
            habits: vec![
                Habit {
                    id: "warm-up".to_string(),
                    name: "Warm up for 5 minutes".to_string(),
                    order: 0,
                },
                Habit {
                    id: "cardio".to_string(),
                    name: "Cardio for 20 minutes".to_string(),
                    order: 4,
                },
            ],
        }
    }

    #[test]
    fn append_habits_orders_from_zero_on_an_empty_input() {
        let input = CreateStackInput::new("Morning")
            .append_habits(vec!["Wake".to_string(), "Stretch".to_string()]);

        let shape: Vec<_> = input.habits.iter().map(|h| (h.name.as_str(), h.order)).collect();
        assert_eq!(shape, vec![("Wake", 0), ("Stretch", 1)]);
    }

    #[test]
    fn append_habits_continues_after_the_highest_order() {
        let input = CreateStackInput::from_routine(&routine(), None)
            .append_habits(vec!["Cool down".to_string()]);

        assert_eq!(input.name, "Workout Routine");
        assert_eq!(input.habits.len(), 3);
        assert_eq!(input.habits[2].name, "Cool down");
        assert_eq!(input.habits[2].order, 5);
    }

    #[test]
    fn from_routine_keeps_a_custom_name_and_drops_template_ids() {
        let input = CreateStackInput::from_routine(&routine(), Some("Gym".to_string()));
        let json = serde_json::to_value(&input).unwrap();

        assert_eq!(json["name"], "Gym");
        assert!(json["habits"][0].get("id").is_none());
    }
}
