mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::Habit;
use crate::store::{DocumentStore, StackChanges, StackDocument};

const STACK_COLUMNS: &str = "id, name, habits, version, created_at, updated_at";

/// SQLite-backed document store for habit stacks.
///
/// Each stack is one row; its habit sequence lives in a JSON column so the
/// whole document is replaced in a single statement.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "habit-stacks")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("habit-stacks.db"))
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }
}

impl DocumentStore for Database {
    fn find_all(&self) -> Result<Vec<StackDocument>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {STACK_COLUMNS} FROM habit_stacks ORDER BY rowid"
        ))?;

        let stacks = stmt
            .query_map([], row_to_stack)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(stacks)
    }

    fn find_one(&self, id: &str) -> Result<Option<StackDocument>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let stack = conn
            .query_row(
                &format!("SELECT {STACK_COLUMNS} FROM habit_stacks WHERE id = ?"),
                [id],
                row_to_stack,
            )
            .optional()?;
        Ok(stack)
    }

    fn insert_one(&self, doc: &StackDocument) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "INSERT INTO habit_stacks (id, name, habits, version, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                &doc.id,
                &doc.name,
                serde_json::to_string(&doc.habits)?,
                doc.version as i64,
                doc.created_at.to_rfc3339(),
                doc.updated_at.to_rfc3339(),
            ),
        )?;
        Ok(rows > 0)
    }

    fn update_one(&self, id: &str, expected_version: u64, changes: &StackChanges) -> Result<u64> {
        let habits_json = changes
            .habits
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "UPDATE habit_stacks
             SET name = COALESCE(?, name),
                 habits = COALESCE(?, habits),
                 updated_at = ?,
                 version = version + 1
             WHERE id = ? AND version = ?",
            (
                &changes.name,
                habits_json,
                changes.updated_at.to_rfc3339(),
                id,
                expected_version as i64,
            ),
        )?;
        Ok(rows as u64)
    }

    fn delete_one(&self, id: &str) -> Result<u64> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM habit_stacks WHERE id = ?", [id])?;
        Ok(rows as u64)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn row_to_stack(row: &Row<'_>) -> rusqlite::Result<StackDocument> {
    let habits_json: String = row.get(2)?;
    let habits: Vec<Habit> = serde_json::from_str(&habits_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(StackDocument {
        id: row.get(0)?,
        name: row.get(1)?,
        habits,
        version: row.get::<_, i64>(3)? as u64,
        created_at: parse_datetime(4, row.get(4)?)?,
        updated_at: parse_datetime(5, row.get(5)?)?,
    })
}

fn parse_datetime(idx: usize, s: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(id: &str) -> StackDocument {
        let now = Utc::now();
        StackDocument {
            id: id.to_string(),
            name: "Morning".to_string(),
            habits: vec![Habit::new("Wake", 0)],
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn corrupt_habits_json_surfaces_as_an_error() {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        db.insert_one(&stack("s1")).unwrap();
        {
            let conn = db.conn.lock().unwrap();
            conn.execute("UPDATE habit_stacks SET habits = 'not json' WHERE id = 's1'", [])
                .unwrap();
        }

        assert!(db.find_one("s1").is_err());
    }

    #[test]
    fn timestamps_round_trip_at_full_precision() {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        let doc = stack("s1");
        db.insert_one(&doc).unwrap();

        let found = db.find_one("s1").unwrap().unwrap();
        assert_eq!(found.created_at, doc.created_at);
        assert_eq!(found.updated_at, doc.updated_at);
    }
}
