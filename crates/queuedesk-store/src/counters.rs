//! CRUD operations for [`Counter`] records.

use chrono::Utc;
use rusqlite::params;

use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::models::{Counter, CounterPatch, NewCounter};
use crate::tickets::timestamp;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new counter and return its id.
    pub fn create_counter(&self, counter: &NewCounter) -> Result<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn().execute(
            "INSERT INTO counters (counter_name, queues_number, status, remarks, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                counter.counter_name,
                counter.queues_number,
                counter.status,
                counter.remarks,
                now,
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_counter(&self, id: i64) -> Result<Counter> {
        self.conn()
            .query_row(
                "SELECT id, counter_name, queues_number, status, remarks, created_at, updated_at
                 FROM counters
                 WHERE id = ?1",
                params![id],
                row_to_counter,
            )
            .map_err(not_found)
    }

    pub fn list_counters(&self) -> Result<Vec<Counter>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, counter_name, queues_number, status, remarks, created_at, updated_at
             FROM counters
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], row_to_counter)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Apply `patch` to a counter. Fields left as `None` are untouched.
    pub fn update_counter(&self, id: i64, patch: &CounterPatch) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE counters
             SET counter_name  = COALESCE(?2, counter_name),
                 queues_number = COALESCE(?3, queues_number),
                 status        = COALESCE(?4, status),
                 remarks       = COALESCE(?5, remarks),
                 updated_at    = ?6
             WHERE id = ?1",
            params![
                id,
                patch.counter_name,
                patch.queues_number,
                patch.status,
                patch.remarks,
                Utc::now().to_rfc3339(),
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    pub fn set_counter_status(&self, id: i64, status: &str) -> Result<()> {
        self.update_counter(
            id,
            &CounterPatch {
                status: Some(status.to_string()),
                ..CounterPatch::default()
            },
        )
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a counter. Returns `true` if a row was deleted.
    pub fn delete_counter(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM counters WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

fn row_to_counter(row: &rusqlite::Row<'_>) -> rusqlite::Result<Counter> {
    Ok(Counter {
        id: row.get(0)?,
        counter_name: row.get(1)?,
        queues_number: row.get(2)?,
        status: row.get(3)?,
        remarks: row.get(4)?,
        created_at: timestamp(row, 5)?,
        updated_at: timestamp(row, 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(name: &str) -> NewCounter {
        NewCounter {
            counter_name: name.to_string(),
            queues_number: 0,
            status: "inactive".to_string(),
            remarks: None,
        }
    }

    #[test]
    fn create_edit_delete() {
        let db = Database::open_in_memory().unwrap();
        let id = db.create_counter(&counter("Counter 1")).unwrap();

        db.update_counter(
            id,
            &CounterPatch {
                queues_number: Some(4),
                remarks: Some("window seat".into()),
                ..CounterPatch::default()
            },
        )
        .unwrap();
        db.set_counter_status(id, "active").unwrap();

        let stored = db.get_counter(id).unwrap();
        assert_eq!(stored.counter_name, "Counter 1");
        assert_eq!(stored.queues_number, 4);
        assert_eq!(stored.status, "active");
        assert_eq!(stored.remarks.as_deref(), Some("window seat"));
        assert!(stored.updated_at >= stored.created_at);

        assert!(db.delete_counter(id).unwrap());
        assert!(!db.delete_counter(id).unwrap());
        assert!(matches!(db.get_counter(id), Err(StoreError::NotFound)));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.set_counter_status(99, "active"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn negative_queue_count_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let mut bad = counter("Counter 2");
        bad.queues_number = -1;
        assert!(matches!(db.create_counter(&bad), Err(StoreError::Sqlite(_))));
        assert!(db.list_counters().unwrap().is_empty());
    }
}
