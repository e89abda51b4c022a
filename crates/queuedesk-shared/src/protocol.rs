//! Messages exchanged with admin clients over the counter push channel.
//!
//! Clients send JSON objects tagged by `action`; every command gets exactly
//! one [`CounterReply`] on the same socket.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Inbound counter command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CounterCommand {
    AddCounter {
        counter_name: String,
        #[serde(default)]
        queues_number: Option<i64>,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        remarks: Option<String>,
    },

    /// Fields left out keep their stored value.
    EditCounter {
        id: i64,
        #[serde(default)]
        counter_name: Option<String>,
        #[serde(default)]
        queues_number: Option<i64>,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        remarks: Option<String>,
    },

    DeleteCounter {
        id: i64,
    },

    ChangeStatus {
        id: i64,
        status: String,
    },
}

const KNOWN_ACTIONS: [&str; 4] = ["ADD_COUNTER", "EDIT_COUNTER", "DELETE_COUNTER", "CHANGE_STATUS"];

impl CounterCommand {
    /// Decode a text frame, telling an unknown `action` apart from a known
    /// action with a bad payload.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let action = value.get("action").and_then(|a| a.as_str());

        match action {
            Some(a) if KNOWN_ACTIONS.contains(&a) => Ok(serde_json::from_value(value)?),
            other => Err(ProtocolError::UnknownAction(other.map(str::to_string))),
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            CounterCommand::AddCounter { .. } => "ADD_COUNTER",
            CounterCommand::EditCounter { .. } => "EDIT_COUNTER",
            CounterCommand::DeleteCounter { .. } => "DELETE_COUNTER",
            CounterCommand::ChangeStatus { .. } => "CHANGE_STATUS",
        }
    }

    /// Reply text sent back when this command fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            CounterCommand::AddCounter { .. } => "Error adding counter",
            CounterCommand::EditCounter { .. } => "Error editing counter",
            CounterCommand::DeleteCounter { .. } => "Error deleting counter",
            CounterCommand::ChangeStatus { .. } => "Error changing status",
        }
    }
}

/// Outbound reply to a single client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CounterReply {
    Ok {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<i64>,
    },
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
}

impl CounterReply {
    pub fn ok(message: impl Into<String>) -> Self {
        CounterReply::Ok {
            message: message.into(),
            id: None,
        }
    }

    pub fn created(id: i64) -> Self {
        CounterReply::Ok {
            message: "Counter added successfully".to_string(),
            id: Some(id),
        }
    }

    pub fn error(error: impl Into<String>, code: Option<&str>) -> Self {
        CounterReply::Error {
            error: error.into(),
            code: code.map(str::to_string),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CounterReply::Error { .. })
    }

    pub fn to_json(&self) -> String {
        // Both variants are plain strings and integers.
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"error":"encoding failed"}"#.into())
    }
}
