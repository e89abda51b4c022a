/// Application name
pub const APP_NAME: &str = "QueueDesk";

/// Value written to `queue_number` when a ticket holds no number.
pub const UNASSIGNED_SENTINEL: &str = " ";

/// Minimum rendered width of a queue sequence (`A-001`).
pub const SEQUENCE_WIDTH: usize = 3;

/// First sequence handed out under a fresh prefix.
pub const FIRST_SEQUENCE: u32 = 1;

/// Decrement never goes below this sequence.
pub const SEQUENCE_FLOOR: u32 = 1;

/// Default status of a freshly imported or invited registrant
pub const DEFAULT_TICKET_STATUS: &str = "invited";

/// Default status of a freshly created counter
pub const DEFAULT_COUNTER_STATUS: &str = "inactive";

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Scheme prefix of invitation QR payloads (`user:<unique_id>-<millis>`)
pub const QR_PAYLOAD_SCHEME: &str = "user:";
