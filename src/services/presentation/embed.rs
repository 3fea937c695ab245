use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{EmbedColors, ServerTarget};
use crate::services::status::{OfflineReason, OnlineStatus, OfflineStatus, ServerStatus};

/// Discord caps embed field values at 1024 characters
pub const MAX_FIELD_CHARS: usize = 1024;
pub const MAX_LISTED_PLAYERS: usize = 10;
pub const ICON_FILE_NAME: &str = "favicon.png";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Online,
    Offline,
    Restarting,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Rendering-agnostic message handed to an output sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub attachment: Option<Attachment>,
}

impl StatusMessage {
    pub fn field(&self, name: &str) -> Option<&EmbedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Maps a normalized status to a display payload
#[derive(Debug, Clone)]
pub struct Presenter {
    target: ServerTarget,
    colors: EmbedColors,
}

impl Presenter {
    pub fn new(target: ServerTarget, colors: EmbedColors) -> Self {
        Self { target, colors }
    }

    pub fn render(&self, status: &ServerStatus, checked_at: DateTime<Utc>) -> StatusMessage {
        match status {
            ServerStatus::Online(online) => self.render_online(online, checked_at),
            ServerStatus::Offline(offline) => self.render_offline(offline, checked_at),
        }
    }

    pub fn severity(status: &ServerStatus) -> Severity {
        match status {
            ServerStatus::Online(_) => Severity::Online,
            ServerStatus::Offline(s) if s.reason == OfflineReason::Restarting => Severity::Restarting,
            ServerStatus::Offline(_) => Severity::Offline,
        }
    }

    fn color(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Online => self.colors.online,
            Severity::Offline => self.colors.offline,
            Severity::Restarting => self.colors.restarting,
        }
    }

    fn render_online(&self, status: &OnlineStatus, checked_at: DateTime<Utc>) -> StatusMessage {
        let mut fields = vec![
            EmbedField::new("🌐 Server IP", format!("`{}`", self.target.address()), true),
            EmbedField::new(
                "👥 Players Online",
                format!("{}/{}", status.players.online, status.players.max),
                true,
            ),
            EmbedField::new("📶 Ping", format!("{}ms", status.latency_ms), true),
            EmbedField::new("🏷️ Minecraft Version", non_empty(&status.version.name), true),
            EmbedField::new("⚙️ Server Type", status.software.as_str(), true),
            EmbedField::new("🔢 Protocol", status.version.protocol.to_string(), true),
        ];

        if !status.motd.trim().is_empty() {
            fields.push(EmbedField::new("📋 MOTD", truncate(&status.motd, MAX_FIELD_CHARS), false));
        }

        let names: Vec<&str> = status.players.sample.iter().map(|p| p.name.as_str()).collect();
        if let Some(list) = player_list(&names) {
            fields.push(EmbedField::new("👤 Online Players", list, false));
        }

        if let Some(mods) = status.mod_info {
            fields.push(EmbedField::new("🔧 Mods", format!("{} mods detected", mods.count), true));
        }

        let attachment = status.icon.as_ref().map(|bytes| Attachment {
            file_name: ICON_FILE_NAME.to_string(),
            bytes: bytes.clone(),
        });

        StatusMessage {
            title: format!("🖥️ {}", self.target.name),
            description: "✅ **Server is ONLINE**".to_string(),
            severity: Severity::Online,
            color: self.color(Severity::Online),
            fields,
            footer: Some("Last checked".to_string()),
            timestamp: Some(checked_at),
            attachment,
        }
    }

    fn render_offline(&self, status: &OfflineStatus, checked_at: DateTime<Utc>) -> StatusMessage {
        let severity = if status.reason == OfflineReason::Restarting {
            Severity::Restarting
        } else {
            Severity::Offline
        };
        let label = status.reason.label();

        let error = if status.raw_error.is_empty() {
            "Unknown error"
        } else {
            status.raw_error.as_str()
        };

        StatusMessage {
            title: format!("🖥️ {}", self.target.name),
            description: format!("{} **Server is {}**", reason_emoji(status.reason), label.to_uppercase()),
            severity,
            color: self.color(severity),
            fields: vec![
                EmbedField::new("🌐 Server IP", format!("`{}`", self.target.address()), true),
                EmbedField::new("❗ Status", label, true),
                EmbedField::new(
                    "📝 Error Details",
                    format!("`{}`", truncate(error, MAX_FIELD_CHARS - 2)),
                    false,
                ),
            ],
            footer: Some("Last checked".to_string()),
            timestamp: Some(checked_at),
            attachment: None,
        }
    }
}

fn reason_emoji(reason: OfflineReason) -> &'static str {
    match reason {
        OfflineReason::Restarting => "🔄",
        OfflineReason::NetworkError => "🌐",
        OfflineReason::InvalidHost => "🚫",
        OfflineReason::Unreachable | OfflineReason::Unknown => "❌",
    }
}

fn non_empty(value: &str) -> &str {
    if value.trim().is_empty() {
        "Unknown"
    } else {
        value
    }
}

/// Up to ten names, then a "+N more" suffix
pub fn player_list(names: &[&str]) -> Option<String> {
    if names.is_empty() {
        return None;
    }

    let shown = names.iter().take(MAX_LISTED_PLAYERS).copied().collect::<Vec<_>>().join(", ");
    let list = if names.len() > MAX_LISTED_PLAYERS {
        format!("{} (+{} more)", shown, names.len() - MAX_LISTED_PLAYERS)
    } else {
        shown
    };

    Some(truncate(&list, MAX_FIELD_CHARS))
}

/// Truncate on a char boundary, marking the cut with an ellipsis
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}
