//! The habit stack aggregate.
//!
//! All nested habit mutations are whole-document read-modify-write cycles:
//! read the stack, change it in memory, write the full document back with a
//! compare-and-swap on `version`. A concurrent writer on the same stack makes
//! the swap miss; the cycle is then retried on a fresh read, so appended or
//! removed habits are never silently lost.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::error::{StackError, StackResult};
use crate::models::*;
use crate::store::{DocumentStore, StackChanges, StackDocument};

/// Retries after a version conflict before giving up with [`StackError::Conflict`].
const MAX_CONFLICT_RETRIES: usize = 3;

/// CRUD over habit stacks and their nested habits.
#[derive(Debug, Clone)]
pub struct HabitStacks<S> {
    store: S,
}

impl<S: DocumentStore> HabitStacks<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn list(&self) -> StackResult<Vec<HabitStack>> {
        self.store.find_all().map_err(StackError::persistence)
    }

    pub fn create(&self, input: CreateStackInput) -> StackResult<HabitStack> {
        validate_name("Stack", &input.name)?;
        let habits: Vec<Habit> = input
            .habits
            .into_iter()
            .map(CreateHabitInput::into_habit)
            .collect();
        validate_habits(&habits)?;

        let now = Utc::now();
        let stack = HabitStack {
            id: new_id(),
            name: input.name,
            habits,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        let inserted = self
            .store
            .insert_one(&stack)
            .map_err(StackError::persistence)?;
        if !inserted {
            return Err(StackError::Persistence(anyhow::anyhow!(
                "Failed to create habit stack"
            )));
        }

        tracing::info!(stack_id = %stack.id, habits = stack.habits.len(), "Created habit stack");
        Ok(stack)
    }

    pub fn get(&self, id: &str) -> StackResult<HabitStack> {
        self.store
            .find_one(id)
            .map_err(StackError::persistence)?
            .ok_or_else(|| StackError::NotFound(id.to_string()))
    }

    /// Partial update. A supplied habit list replaces the stored one wholesale.
    pub fn update(&self, id: &str, input: UpdateStackInput) -> StackResult<HabitStack> {
        if let Patch::Set(name) = &input.name {
            validate_name("Stack", name)?;
        }
        if let Patch::Set(habits) = &input.habits {
            validate_habits(habits)?;
        }

        let stack = self.modify(id, |current| {
            if let Some(expected) = input.version {
                if expected != current.version {
                    return Err(StackError::Conflict {
                        id: id.to_string(),
                        expected,
                    });
                }
            }
            Ok(StackChanges::touch(next_timestamp(current.updated_at))
                .with_name(input.name.clone().into_option())
                .with_habits(input.habits.clone().into_option()))
        })?;

        tracing::info!(stack_id = %id, version = stack.version, "Updated habit stack");
        Ok(stack)
    }

    pub fn delete(&self, id: &str) -> StackResult<()> {
        let deleted = self.store.delete_one(id).map_err(StackError::persistence)?;
        if deleted == 0 {
            tracing::warn!(stack_id = %id, "Delete of unknown habit stack");
            return Err(StackError::NotFound(id.to_string()));
        }
        tracing::info!(stack_id = %id, "Deleted habit stack");
        Ok(())
    }

    /// Appends a new habit. Position is the end of the sequence regardless of `order`.
    pub fn add_habit(&self, stack_id: &str, input: AddHabitInput) -> StackResult<HabitStack> {
        validate_name("Habit", &input.name)?;
        let habit = Habit::new(input.name, input.order);
        let habit_id = habit.id.clone();

        let stack = self.modify(stack_id, |current| {
            let mut habits = current.habits.clone();
            habits.push(habit.clone());
            Ok(StackChanges::touch(next_timestamp(current.updated_at)).with_habits(Some(habits)))
        })?;

        tracing::info!(stack_id = %stack_id, habit_id = %habit_id, "Added habit");
        Ok(stack)
    }

    /// Updates one habit in place, keeping its id and position.
    pub fn update_habit(
        &self,
        stack_id: &str,
        habit_id: &str,
        input: UpdateHabitInput,
    ) -> StackResult<HabitStack> {
        if let Patch::Set(name) = &input.name {
            validate_name("Habit", name)?;
        }

        let stack = self.modify(stack_id, |current| {
            let mut habits = current.habits.clone();
            let habit = habits
                .iter_mut()
                .find(|h| h.id == habit_id)
                .ok_or_else(|| StackError::HabitNotFound {
                    stack_id: stack_id.to_string(),
                    habit_id: habit_id.to_string(),
                })?;
            habit.name = input.name.clone().apply(std::mem::take(&mut habit.name));
            habit.order = input.order.clone().apply(habit.order);
            Ok(StackChanges::touch(next_timestamp(current.updated_at)).with_habits(Some(habits)))
        })?;

        tracing::info!(stack_id = %stack_id, habit_id = %habit_id, "Updated habit");
        Ok(stack)
    }

    /// Removes the habit with `habit_id`. Removing an id that is not in the
    /// stack leaves the sequence unchanged and still succeeds.
    pub fn remove_habit(&self, stack_id: &str, habit_id: &str) -> StackResult<HabitStack> {
        let stack = self.modify(stack_id, |current| {
            let habits: Vec<Habit> = current
                .habits
                .iter()
                .filter(|h| h.id != habit_id)
                .cloned()
                .collect();
            if habits.len() == current.habits.len() {
                tracing::debug!(stack_id = %stack_id, habit_id = %habit_id, "Habit not present, nothing removed");
            }
            Ok(StackChanges::touch(next_timestamp(current.updated_at)).with_habits(Some(habits)))
        })?;

        tracing::info!(stack_id = %stack_id, habit_id = %habit_id, "Removed habit");
        Ok(stack)
    }

    /// Read-modify-write with compare-and-swap on `version`.
    fn modify<F>(&self, id: &str, mut change: F) -> StackResult<HabitStack>
    where
        F: FnMut(&StackDocument) -> StackResult<StackChanges>,
    {
        let mut current = self.get(id)?;

        for attempt in 0..=MAX_CONFLICT_RETRIES {
            let changes = change(&current)?;
            let modified = self
                .store
                .update_one(id, current.version, &changes)
                .map_err(StackError::persistence)?;

            if modified > 0 {
                return Ok(changes.applied_to(&current));
            }

            // Nothing written: the stack is gone, someone else wrote first,
            // or the store silently refused the write.
            let latest = self.get(id)?;
            if latest.version == current.version {
                tracing::error!(stack_id = %id, "Write reported no modification");
                return Err(StackError::Persistence(anyhow::anyhow!(
                    "Failed to update habit stack {id}: write reported no modification"
                )));
            }

            tracing::debug!(
                stack_id = %id,
                attempt,
                stale = current.version,
                latest = latest.version,
                "Version conflict, retrying"
            );
            current = latest;
        }

        Err(StackError::Conflict {
            id: id.to_string(),
            expected: current.version,
        })
    }
}

/// A timestamp strictly after `previous`, so every write advances `updated_at`
/// even when the clock has not moved.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

fn validate_name(kind: &str, name: &str) -> StackResult<()> {
    if name.trim().is_empty() {
        return Err(StackError::Validation(format!("{kind} name must not be empty")));
    }
    Ok(())
}

fn validate_habits(habits: &[Habit]) -> StackResult<()> {
    let mut seen = HashSet::new();
    for habit in habits {
        validate_name("Habit", &habit.name)?;
        if habit.id.trim().is_empty() {
            return Err(StackError::Validation("Habit id must not be empty".to_string()));
        }
        if !seen.insert(habit.id.as_str()) {
            return Err(StackError::Validation(format!(
                "Duplicate habit id in stack: {}",
                habit.id
            )));
        }
    }
    Ok(())
}
