//! # queuedesk-shared
//!
//! Types and pure logic shared by the QueueDesk store and server: prefix
//! classification and queue-number arithmetic, the error taxonomy, and the
//! counter push-channel protocol.

pub mod constants;
pub mod error;
pub mod invite;
pub mod prefix;
pub mod protocol;
pub mod types;

pub use error::{ProtocolError, QueueError, QueueResult};
pub use prefix::{delete_sentinel, is_unassigned, Prefix};
pub use types::{ControlAction, TicketProjection, TicketStatus};
