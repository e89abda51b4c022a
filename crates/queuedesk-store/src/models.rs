//! Rows persisted in the QueueDesk database.
//!
//! Every struct derives `Serialize` so it can be handed straight to the HTTP
//! layer. Descriptive registrant fields are opaque to the queue logic.

use chrono::{DateTime, Utc};
use queuedesk_shared::TicketStatus;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// One registrant and the queue number they hold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    /// Store-assigned row id.
    pub id: i64,
    /// External stable identifier used for QR lookup.
    #[serde(rename = "uniqueId")]
    pub unique_id: String,
    /// Token printed on the registrant's pass; what the counter scans.
    pub code: String,
    /// Invitation payload, set once the registrant has been invited.
    pub qr_code: Option<String>,
    /// Registrant category; drives prefix classification.
    #[serde(rename = "type")]
    pub product_type: String,
    /// `" "` while unassigned, otherwise e.g. `A-001`.
    pub queue_number: String,
    pub status: TicketStatus,
    pub customer_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub product: String,
    pub city: Option<String>,
    pub invoice: Option<String>,
    pub start_serving: Option<DateTime<Utc>>,
    pub end_serving: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a registrant. Defaults are applied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub unique_id: String,
    pub code: String,
    pub product_type: String,
    pub queue_number: String,
    pub status: TicketStatus,
    pub customer_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub product: String,
    pub city: Option<String>,
    pub invoice: Option<String>,
}

// ---------------------------------------------------------------------------
// Counter
// ---------------------------------------------------------------------------

/// A service station.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Counter {
    pub id: i64,
    pub counter_name: String,
    pub queues_number: i64,
    pub status: String,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCounter {
    pub counter_name: String,
    pub queues_number: i64,
    pub status: String,
    pub remarks: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterPatch {
    pub counter_name: Option<String>,
    pub queues_number: Option<i64>,
    pub status: Option<String>,
    pub remarks: Option<String>,
}
