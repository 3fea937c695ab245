use std::fmt;
use std::time::Duration;

/// The single Minecraft server being watched
#[derive(Debug, Clone)]
pub struct ServerTarget {
    /// Display name used as the embed title
    pub name: String,

    /// Hostname or IP address
    pub host: String,

    /// Server List Ping port
    pub port: u16,
}

impl Default for ServerTarget {
    fn default() -> Self {
        Self {
            name: "Minecraft Server".to_string(),
            host: "localhost".to_string(),
            port: 25565,
        }
    }
}

impl ServerTarget {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Outbound message budget for the monitoring channel
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Messages allowed inside one fixed 60 second window
    pub max_messages_per_minute: u32,

    /// Minimum gap between two messages of the same window
    pub min_spacing: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_messages_per_minute: 5,
            min_spacing: Duration::from_secs(30),
        }
    }
}

/// Which status differences warrant a broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeTriggers {
    pub on_status_change: bool,
    pub on_player_count_change: bool,
}

impl Default for ChangeTriggers {
    fn default() -> Self {
        Self {
            on_status_change: true,
            on_player_count_change: true,
        }
    }
}

/// Monitoring pipeline configuration, read-only after startup
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub target: ServerTarget,

    /// Cadence of scheduled polls, truncated to whole minutes
    pub poll_interval: Duration,

    /// Upper bound for one status query
    pub query_timeout: Duration,

    pub rate_limit: RateLimitConfig,

    pub triggers: ChangeTriggers,

    /// Disables scheduled polls and broadcasts; commands keep working
    pub enabled: bool,

    /// Delay before the forced startup poll
    pub startup_delay: Duration,

    /// Monitoring channel; broadcasts abort with a configuration error when absent
    pub channel_id: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            target: ServerTarget::default(),
            poll_interval: Duration::from_secs(300),
            query_timeout: Duration::from_secs(10),
            rate_limit: RateLimitConfig::default(),
            triggers: ChangeTriggers::default(),
            enabled: true,
            startup_delay: Duration::from_secs(5),
            channel_id: None,
        }
    }
}

/// Embed colors per severity, as 24-bit RGB
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedColors {
    pub online: u32,
    pub offline: u32,
    pub restarting: u32,
}

impl Default for EmbedColors {
    fn default() -> Self {
        Self {
            online: 0x00FF00,
            offline: 0xFF0000,
            restarting: 0xFFAA00,
        }
    }
}

/// Discord application credentials
#[derive(Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub application_id: String,

    /// Hex-encoded Ed25519 key used to verify interaction requests
    pub public_key: String,

    pub api_base: String,
}

impl DiscordConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://discord.com/api/v10";
}

impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"<redacted>")
            .field("application_id", &self.application_id)
            .field("public_key", &self.public_key)
            .field("api_base", &self.api_base)
            .finish()
    }
}
