//! v001 -- Initial schema creation.
//!
//! Creates the `tickets` table holding registrants and their queue numbers.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Tickets (registrants)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS tickets (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    unique_id     TEXT NOT NULL UNIQUE,         -- UUID v4 unless imported
    code          TEXT NOT NULL,                -- scan token
    qr_code       TEXT,                         -- invitation payload
    product_type  TEXT NOT NULL,
    queue_number  TEXT NOT NULL DEFAULT ' ',    -- ' ' = unassigned
    status        TEXT NOT NULL DEFAULT 'invited',
    customer_name TEXT NOT NULL,
    email         TEXT,
    phone         TEXT,
    product       TEXT NOT NULL,
    city          TEXT,
    invoice       TEXT,
    start_serving TEXT,                         -- RFC-3339
    end_serving   TEXT,                         -- RFC-3339
    created_at    TEXT NOT NULL                 -- RFC-3339
);

CREATE INDEX IF NOT EXISTS idx_tickets_code ON tickets(code);
CREATE INDEX IF NOT EXISTS idx_tickets_qr_code ON tickets(qr_code);
CREATE INDEX IF NOT EXISTS idx_tickets_queue_number ON tickets(queue_number);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
