//! Domain models for habit stacks.
//!
//! # Core Concepts
//!
//! - [`HabitStack`]: aggregate root. A named, timestamped, versioned collection
//!   that owns an ordered sequence of habits.
//! - [`Habit`]: leaf item within a stack, identified by an opaque string id.
//! - [`Routine`]: read-only template shaped like a stack, served from the
//!   built-in catalog.
//!
//! Identifiers are opaque strings. Catalog entries use fixed slugs
//! (`"morning-routine"`), runtime records use UUID v4 strings; both share
//! the same field and type.

mod habit;
mod patch;
mod routine;
mod stack;

pub use habit::*;
pub use patch::*;
pub use routine::*;
pub use stack::*;

/// Generates a fresh identifier for a stack or habit.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
