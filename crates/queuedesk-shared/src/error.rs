use thiserror::Error;

/// Failures surfaced by the queue core.
///
/// Every variant reaches the caller with a distinct status; the core never
/// retries on its own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ticket already has queue number {0}")]
    AlreadyAssigned(String),

    #[error("Invalid registrant type: {0}")]
    InvalidType(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Corrupt queue number {value:?} under prefix {prefix}")]
    CorruptQueueNumber { prefix: String, value: String },

    #[error("Store failure: {0}")]
    StoreFailure(String),
}

impl QueueError {
    /// Short machine-readable code, used in push-channel replies.
    pub fn code(&self) -> &'static str {
        match self {
            QueueError::NotFound(_) => "NOT_FOUND",
            QueueError::AlreadyAssigned(_) => "ALREADY_ASSIGNED",
            QueueError::InvalidType(_) => "INVALID_TYPE",
            QueueError::BadRequest(_) => "BAD_REQUEST",
            QueueError::CorruptQueueNumber { .. } => "CORRUPT_QUEUE_NUMBER",
            QueueError::StoreFailure(_) => "STORE_FAILURE",
        }
    }
}

pub type QueueResult<T> = std::result::Result<T, QueueError>;

/// Push-channel frames that cannot be turned into a command.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Unknown action")]
    UnknownAction(Option<String>),

    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}
