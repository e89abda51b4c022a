//! CRUD operations for [`Ticket`] records.
//!
//! Queries are written against a plain `&Connection` so the same helpers
//! serve both the [`Database`] handle and an open [`Allocation`]
//! transaction.
//!
//! [`Allocation`]: crate::allocation::Allocation

use chrono::{DateTime, Utc};
use queuedesk_shared::{Prefix, TicketStatus};
use rusqlite::{params, params_from_iter, Connection, ToSql};

use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::models::{NewTicket, Ticket};

const TICKET_COLUMNS: &str = "id, unique_id, code, qr_code, product_type, queue_number, status, \
     customer_name, email, phone, product, city, invoice, start_serving, end_serving, created_at";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a single registrant and return the stored row.
    pub fn insert_ticket(&self, ticket: &NewTicket) -> Result<Ticket> {
        let id = insert_row(self.conn(), ticket, Utc::now())?;
        get_by(self.conn(), "id = ?1", &id)
    }

    /// Insert many registrants atomically. Either every row lands or none.
    pub fn import_tickets(&mut self, rows: &[NewTicket]) -> Result<Vec<Ticket>> {
        let tx = self.conn_mut().transaction()?;
        let now = Utc::now();

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(insert_row(&tx, row, now)?);
        }
        let tickets = ids
            .iter()
            .map(|id| get_by(&tx, "id = ?1", id))
            .collect::<Result<Vec<_>>>()?;

        tx.commit()?;
        tracing::info!(count = tickets.len(), "imported tickets");
        Ok(tickets)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_ticket(&self, id: i64) -> Result<Ticket> {
        get_by(self.conn(), "id = ?1", &id)
    }

    pub fn find_ticket_by_unique_id(&self, unique_id: &str) -> Result<Ticket> {
        get_by(self.conn(), "unique_id = ?1", &unique_id)
    }

    pub fn find_ticket_by_code(&self, code: &str) -> Result<Ticket> {
        get_by(self.conn(), "code = ?1", &code)
    }

    pub fn find_ticket_by_qr_code(&self, qr_code: &str) -> Result<Ticket> {
        get_by(self.conn(), "qr_code = ?1", &qr_code)
    }

    /// List all tickets in insertion order.
    pub fn list_tickets(&self) -> Result<Vec<Ticket>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("SELECT {TICKET_COLUMNS} FROM tickets ORDER BY id ASC"))?;
        let rows = stmt.query_map([], row_to_ticket)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// List the tickets whose ids appear in `ids`. Unknown ids are skipped.
    pub fn list_tickets_by_ids(&self, ids: &[i64]) -> Result<Vec<Ticket>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE id IN ({placeholders}) ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), row_to_ticket)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Latest ticket under `prefix`, read outside of an allocation.
    pub fn latest_for_prefix(&self, prefix: Prefix) -> Result<Option<Ticket>> {
        latest_for_prefix(self.conn(), prefix)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    pub fn set_qr_code(&self, id: i64, qr_code: &str) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE tickets SET qr_code = ?2 WHERE id = ?1",
            params![id, qr_code],
        )?;
        expect_one(affected)
    }

    /// Store a batch of `(id, qr_code)` payloads atomically. An unknown id
    /// rolls back the whole batch.
    pub fn set_qr_codes(&mut self, codes: &[(i64, String)]) -> Result<()> {
        let tx = self.conn_mut().transaction()?;
        for (id, qr_code) in codes {
            let affected = tx.execute(
                "UPDATE tickets SET qr_code = ?2 WHERE id = ?1",
                params![id, qr_code],
            )?;
            expect_one(affected)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn set_ticket_status(&self, id: i64, status: &TicketStatus) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE tickets SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        expect_one(affected)
    }

    /// Mark a ticket served at `at`. `start_serving` is filled in when it
    /// was never recorded.
    pub fn mark_served(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        let at = at.to_rfc3339();
        let affected = self.conn().execute(
            "UPDATE tickets
             SET status = ?2,
                 start_serving = COALESCE(start_serving, ?3),
                 end_serving = ?3
             WHERE id = ?1",
            params![id, TicketStatus::Served.as_str(), at],
        )?;
        expect_one(affected)
    }
}

// ---------------------------------------------------------------------------
// Connection-level helpers
// ---------------------------------------------------------------------------

fn insert_row(conn: &Connection, ticket: &NewTicket, now: DateTime<Utc>) -> Result<i64> {
    conn.execute(
        "INSERT INTO tickets (unique_id, code, product_type, queue_number, status,
                              customer_name, email, phone, product, city, invoice, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            ticket.unique_id,
            ticket.code,
            ticket.product_type,
            ticket.queue_number,
            ticket.status.as_str(),
            ticket.customer_name,
            ticket.email,
            ticket.phone,
            ticket.product,
            ticket.city,
            ticket.invoice,
            now.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// First ticket (lowest id) matching `clause`.
pub(crate) fn get_by(conn: &Connection, clause: &str, value: &dyn ToSql) -> Result<Ticket> {
    conn.query_row(
        &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE {clause} ORDER BY id ASC LIMIT 1"),
        &[value],
        row_to_ticket,
    )
    .map_err(not_found)
}

/// The ticket holding the numerically greatest number under `prefix`,
/// ties going to the highest id.
///
/// Suffixes are compared as integers, so `A-1000` beats `A-999`. A row
/// whose suffix does not parse fails the whole lookup.
pub(crate) fn latest_for_prefix(conn: &Connection, prefix: Prefix) -> Result<Option<Ticket>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets
         WHERE substr(queue_number, 1, length(?1)) = ?1
         ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map(params![prefix.as_str()], row_to_ticket)?;

    let mut latest: Option<(u32, Ticket)> = None;
    for row in rows {
        let ticket = row?;
        let sequence = prefix.sequence_of(&ticket.queue_number)?;
        // Rows arrive in id order, so `>=` lets a later id win a tie.
        if latest.as_ref().map_or(true, |(best, _)| sequence >= *best) {
            latest = Some((sequence, ticket));
        }
    }
    Ok(latest.map(|(_, ticket)| ticket))
}

pub(crate) fn set_queue_number(conn: &Connection, id: i64, value: &str) -> Result<()> {
    let affected = conn.execute(
        "UPDATE tickets SET queue_number = ?2 WHERE id = ?1",
        params![id, value],
    )?;
    expect_one(affected)
}

fn expect_one(affected: usize) -> Result<()> {
    if affected == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn row_to_ticket(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
    let status: String = row.get(6)?;
    Ok(Ticket {
        id: row.get(0)?,
        unique_id: row.get(1)?,
        code: row.get(2)?,
        qr_code: row.get(3)?,
        product_type: row.get(4)?,
        queue_number: row.get(5)?,
        status: TicketStatus::from(status),
        customer_name: row.get(7)?,
        email: row.get(8)?,
        phone: row.get(9)?,
        product: row.get(10)?,
        city: row.get(11)?,
        invoice: row.get(12)?,
        start_serving: opt_timestamp(row, 13)?,
        end_serving: opt_timestamp(row, 14)?,
        created_at: timestamp(row, 15)?,
    })
}

pub(crate) fn timestamp(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn opt_timestamp(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
    })
    .transpose()
}
