use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueueError;

/// Admin operation on the latest queue number of a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Increment,
    Decrement,
    Reset,
    Delete,
}

impl ControlAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlAction::Increment => "increment",
            ControlAction::Decrement => "decrement",
            ControlAction::Reset => "reset",
            ControlAction::Delete => "delete",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlAction {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increment" => Ok(ControlAction::Increment),
            "decrement" => Ok(ControlAction::Decrement),
            "reset" => Ok(ControlAction::Reset),
            "delete" => Ok(ControlAction::Delete),
            other => Err(QueueError::BadRequest(format!("invalid action {other:?}"))),
        }
    }
}

/// Lifecycle tag of a registrant.
///
/// Statuses written by other tools are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketStatus {
    Invited,
    Queued,
    Served,
    Other(String),
}

impl TicketStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::Invited => "invited",
            TicketStatus::Queued => "queued",
            TicketStatus::Served => "served",
            TicketStatus::Other(s) => s,
        }
    }
}

impl From<String> for TicketStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "invited" => TicketStatus::Invited,
            "queued" => TicketStatus::Queued,
            "served" => TicketStatus::Served,
            _ => TicketStatus::Other(value),
        }
    }
}

impl From<TicketStatus> for String {
    fn from(status: TicketStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful scan hands back to the counter screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketProjection {
    #[serde(rename = "uniqueId")]
    pub unique_id: String,
    pub customer_name: String,
    pub product: String,
    pub queue_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_action_parsing() {
        assert_eq!("reset".parse::<ControlAction>().unwrap(), ControlAction::Reset);
        assert!(matches!(
            "Reset".parse::<ControlAction>(),
            Err(QueueError::BadRequest(_))
        ));
        let action: ControlAction = serde_json::from_str("\"decrement\"").unwrap();
        assert_eq!(action, ControlAction::Decrement);
    }

    #[test]
    fn status_keeps_unknown_values() {
        assert_eq!(TicketStatus::from("queued".to_string()), TicketStatus::Queued);
        let other = TicketStatus::from("no-show".to_string());
        assert_eq!(other.as_str(), "no-show");
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"no-show\"");
    }

    #[test]
    fn projection_uses_original_field_names() {
        let projection = TicketProjection {
            unique_id: "u-1".into(),
            customer_name: "Ana".into(),
            product: "Phone".into(),
            queue_number: "A-001".into(),
        };
        let json = serde_json::to_value(&projection).unwrap();
        assert_eq!(json["uniqueId"], "u-1");
        assert_eq!(json["queue_number"], "A-001");
    }
}
