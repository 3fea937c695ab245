use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::services::discord::message_body;
use crate::services::presentation::StatusMessage;

// Inbound interaction types
pub const PING: u8 = 1;
pub const APPLICATION_COMMAND: u8 = 2;

// Response callback types
pub const PONG: u8 = 1;
pub const CHANNEL_MESSAGE: u8 = 4;
pub const DEFERRED_CHANNEL_MESSAGE: u8 = 5;

const EPHEMERAL_FLAG: u64 = 1 << 6;

#[derive(Debug, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub token: String,
    pub data: Option<CommandData>,
    pub member: Option<Member>,
    pub user: Option<User>,
}

impl Interaction {
    pub fn command_name(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.name.as_str())
    }

    /// Guild invocations carry the user under `member`, DMs at the top level
    pub fn requester(&self) -> String {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
            .map(|u| u.username.clone())
            .unwrap_or_else(|| "unknown user".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct CommandData {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Member {
    pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self { kind: PONG, data: None }
    }

    pub fn deferred() -> Self {
        Self {
            kind: DEFERRED_CHANNEL_MESSAGE,
            data: None,
        }
    }

    pub fn message(message: &StatusMessage) -> Self {
        Self {
            kind: CHANNEL_MESSAGE,
            data: Some(message_body(message)),
        }
    }

    /// Plain text visible only to the invoking user
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            kind: CHANNEL_MESSAGE,
            data: Some(json!({ "content": content.into(), "flags": EPHEMERAL_FLAG })),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
