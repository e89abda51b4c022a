//! Queue control: number assignment on scan and admin overrides.
//!
//! Both allocation paths run "read latest, compute, write" inside a single
//! store [`Allocation`], while holding the shared connection lock, so two
//! concurrent scans of the same prefix can never compute the same number.
//!
//! [`Allocation`]: queuedesk_store::Allocation

use std::sync::Arc;

use chrono::Utc;
use queuedesk_shared::invite::parse_qr_payload;
use queuedesk_shared::{
    is_unassigned, ControlAction, Prefix, QueueError, QueueResult, TicketProjection, TicketStatus,
};
use queuedesk_store::{Database, StoreError, Ticket};
use tokio::sync::Mutex;
use tracing::{error, info};

/// The single authoritative connection, shared by every handler.
pub type SharedDb = Arc<Mutex<Database>>;

#[derive(Clone)]
pub struct QueueService {
    db: SharedDb,
}

impl QueueService {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    /// Give the ticket matching `code` the next number of its prefix.
    ///
    /// A ticket that already holds a number is rejected, never renumbered.
    pub async fn assign_on_scan(&self, code: &str) -> QueueResult<TicketProjection> {
        if code.trim().is_empty() {
            return Err(QueueError::BadRequest("code is required".to_string()));
        }

        let mut db = self.db.lock().await;
        let projection = assign_in(&mut db, code).map_err(log_integrity_fault)?;

        info!(
            unique_id = %projection.unique_id,
            queue_number = %projection.queue_number,
            "Added ticket to queue"
        );
        Ok(projection)
    }

    /// Rewrite the latest number under `prefix`.
    ///
    /// Only the one row currently holding the latest number is touched.
    pub async fn admin_control(
        &self,
        prefix: Option<&str>,
        action: Option<&str>,
    ) -> QueueResult<String> {
        let (Some(prefix), Some(action)) = (
            prefix.filter(|p| !p.is_empty()),
            action.filter(|a| !a.is_empty()),
        ) else {
            return Err(QueueError::BadRequest(
                "Prefix and action are required".to_string(),
            ));
        };
        let prefix: Prefix = prefix.parse()?;
        let action: ControlAction = action.parse()?;

        let mut db = self.db.lock().await;
        let number = control_in(&mut db, prefix, action).map_err(log_integrity_fault)?;

        info!(%prefix, %action, queue_number = %number, "Queue number updated");
        Ok(number)
    }

    /// Move the invited registrant holding `qr_code` to `queued`.
    pub async fn confirm(&self, qr_code: &str) -> QueueResult<()> {
        if qr_code.trim().is_empty() {
            return Err(QueueError::BadRequest("qr_code is required".to_string()));
        }

        let db = self.db.lock().await;
        let ticket = db
            .find_ticket_by_qr_code(qr_code)
            .map_err(|e| not_found(e, "Invalid QR code"))?;
        db.set_ticket_status(ticket.id, &TicketStatus::Queued)?;

        match parse_qr_payload(qr_code) {
            Some((unique_id, issued_at)) => {
                info!(%unique_id, %issued_at, "Ticket confirmed and queued")
            }
            None => info!(unique_id = %ticket.unique_id, "Ticket confirmed and queued"),
        }
        Ok(())
    }

    /// Close out a registrant's visit.
    pub async fn serve(&self, unique_id: &str) -> QueueResult<Ticket> {
        let db = self.db.lock().await;
        let ticket = db
            .find_ticket_by_unique_id(unique_id)
            .map_err(|e| not_found(e, "User not found"))?;
        db.mark_served(ticket.id, Utc::now())?;

        info!(%unique_id, queue_number = %ticket.queue_number, "Ticket served");
        Ok(db.get_ticket(ticket.id)?)
    }
}

fn assign_in(db: &mut Database, code: &str) -> QueueResult<TicketProjection> {
    let alloc = db.begin_allocation()?;

    let ticket = alloc
        .find_by_code(code)
        .map_err(|e| not_found(e, "User not found"))?;
    if !is_unassigned(&ticket.queue_number) {
        return Err(QueueError::AlreadyAssigned(ticket.queue_number));
    }

    let prefix = Prefix::classify(&ticket.product_type)?;
    let latest = alloc.latest_for_prefix(prefix)?;
    let number = prefix.next_number(latest.as_ref().map(|t| t.queue_number.as_str()))?;

    alloc.set_queue_number(ticket.id, &number)?;
    alloc.commit()?;

    Ok(TicketProjection {
        unique_id: ticket.unique_id,
        customer_name: ticket.customer_name,
        product: ticket.product,
        queue_number: number,
    })
}

fn control_in(db: &mut Database, prefix: Prefix, action: ControlAction) -> QueueResult<String> {
    let alloc = db.begin_allocation()?;

    let latest = alloc.latest_for_prefix(prefix)?.ok_or_else(|| {
        QueueError::NotFound("No users found with the specified prefix".to_string())
    })?;
    let number = prefix.apply(action, &latest.queue_number)?;

    alloc.set_queue_number(latest.id, &number)?;
    alloc.commit()?;
    Ok(number)
}

fn not_found(err: StoreError, message: &str) -> QueueError {
    match err {
        StoreError::NotFound => QueueError::NotFound(message.to_string()),
        other => other.into(),
    }
}

fn log_integrity_fault(err: QueueError) -> QueueError {
    if let QueueError::CorruptQueueNumber { prefix, value } = &err {
        error!(%prefix, %value, "Stored queue number does not parse");
    }
    err
}
