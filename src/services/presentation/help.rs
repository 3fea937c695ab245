use crate::config::{EmbedColors, MonitorConfig};
use crate::services::presentation::{EmbedField, Severity, StatusMessage};
use crate::services::status::ServerSoftware;

fn toggle(enabled: bool) -> &'static str {
    if enabled {
        "✅ Enabled"
    } else {
        "❌ Disabled"
    }
}

/// Static `/help` reply describing the monitor and its settings
pub fn help_message(config: &MonitorConfig, colors: &EmbedColors) -> StatusMessage {
    let channel = config
        .channel_id
        .as_deref()
        .map(|id| format!("<#{}>", id))
        .unwrap_or_else(|| "not configured".to_string());

    let monitoring = format!(
        "• **Server:** `{}`\n\
         • **Updates Channel:** {}\n\
         • **Check Interval:** Every {} minutes\n\
         • **Auto Updates:** {}\n\
         • **Status Change Updates:** {}\n\
         • **Player Change Updates:** {}",
        config.target.address(),
        channel,
        (config.poll_interval.as_secs() / 60).max(1),
        toggle(config.enabled),
        toggle(config.triggers.on_status_change),
        toggle(config.triggers.on_player_count_change),
    );

    let rate_limit = format!(
        "• Maximum {} messages per minute\n\
         • {}s cooldown between updates\n\
         • Updates are only sent when the status changes",
        config.rate_limit.max_messages_per_minute,
        config.rate_limit.min_spacing.as_secs(),
    );

    let software = ServerSoftware::KNOWN
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    StatusMessage {
        title: "🤖 Minecraft Server Monitor Help".to_string(),
        description: format!(
            "This bot monitors **{}** and provides real-time status updates.",
            config.target.name
        ),
        severity: Severity::Online,
        color: colors.online,
        fields: vec![
            EmbedField::new(
                "📊 `/status`",
                "Check the current status of the monitored server: address, players, \
                 version, server type, ping, MOTD, icon and mods.",
                false,
            ),
            EmbedField::new("❓ `/help`", "Show this help message", false),
            EmbedField::new("📡 Monitoring Configuration", monitoring, false),
            EmbedField::new(
                "🚦 Status Detection",
                "• ✅ **Online** - running and accessible\n\
                 • ❌ **Offline** - connection refused or no answer\n\
                 • 🔄 **Restarting/Loading** - query timed out\n\
                 • 🌐 **Network Error** - network unreachable\n\
                 • 🚫 **Invalid Host** - address not found",
                false,
            ),
            EmbedField::new("⚡ Rate Limiting", rate_limit, false),
            EmbedField::new("🛠️ Supported Server Types", software, false),
        ],
        footer: Some(format!("Bot Version {}", env!("CARGO_PKG_VERSION"))),
        timestamp: None,
        attachment: None,
    }
}
