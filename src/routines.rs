//! Built-in routine templates.
//!
//! The catalog is built once at startup and shared by reference. It is never
//! written to the store and never mutated, so concurrent reads need no
//! synchronization.

use std::sync::Arc;

use crate::models::{Habit, Routine};

/// (id, name, description, [(habit id, habit name)]). Habit order is the
/// position in the list.
const BUILTIN_ROUTINES: &[(&str, &str, &str, &[(&str, &str)])] = &[
    (
        "morning-routine",
        "Morning Routine",
        "Start your day with purpose",
        &[
            ("wake-up", "Wake up at 6 AM"),
            ("drink-water", "Drink a glass of water"),
            ("brush-teeth", "Brush teeth"),
        ],
    ),
    (
        "workout-routine",
        "Workout Routine",
        "Build physical strength",
        &[
            ("warm-up", "Warm up for 5 minutes"),
            ("cardio", "Cardio for 20 minutes"),
            ("strength", "Strength training"),
        ],
    ),
    (
        "evening-routine",
        "Evening Routine",
        "Wind down and prepare for tomorrow",
        &[
            ("dinner", "Eat dinner"),
            ("plan-tomorrow", "Plan tomorrow"),
            ("read", "Read for 30 minutes"),
        ],
    ),
    (
        "study-routine",
        "Study Routine",
        "Focus on learning and growth",
        &[
            ("review-notes", "Review previous notes"),
            ("new-material", "Study new material"),
            ("practice", "Practice problems"),
        ],
    ),
];

/// Immutable, cheaply cloneable set of routine templates.
#[derive(Debug, Clone)]
pub struct RoutineCatalog {
    routines: Arc<[Routine]>,
}

impl RoutineCatalog {
    pub fn builtin() -> Self {
        let routines = BUILTIN_ROUTINES
            .iter()
            .map(|(id, name, description, habits)| Routine {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                habits: habits
                    .iter()
                    .zip(0u32..)
                    .map(|((habit_id, habit_name), order)| Habit {
                        id: habit_id.to_string(),
                        name: habit_name.to_string(),
                        order,
                    })
                    .collect(),
            })
            .collect();
        Self { routines }
    }

    /// All routines, in the same order on every call.
    pub fn list(&self) -> &[Routine] {
        &self.routines
    }
}

impl Default for RoutineCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
