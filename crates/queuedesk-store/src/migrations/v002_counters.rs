use rusqlite::Connection;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS counters (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    counter_name  TEXT NOT NULL,
    queues_number INTEGER NOT NULL DEFAULT 0 CHECK (queues_number >= 0),
    status        TEXT NOT NULL DEFAULT 'inactive',
    remarks       TEXT,
    created_at    TEXT NOT NULL,              -- RFC-3339
    updated_at    TEXT NOT NULL               -- RFC-3339
);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
