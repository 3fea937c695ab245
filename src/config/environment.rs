use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::monitor_config::{
    ChangeTriggers, DiscordConfig, EmbedColors, MonitorConfig, RateLimitConfig, ServerTarget,
};

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub discord: DiscordConfig,
    pub colors: EmbedColors,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup (the process environment in production)
    pub fn from_source<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| format!("{} must be set", key))
        };

        let target_defaults = ServerTarget::default();
        let monitor_defaults = MonitorConfig::default();
        let rate_defaults = RateLimitConfig::default();
        let trigger_defaults = ChangeTriggers::default();
        let color_defaults = EmbedColors::default();

        let target = ServerTarget {
            name: lookup("MC_SERVER_NAME").unwrap_or(target_defaults.name),
            host: lookup("MC_HOST").unwrap_or(target_defaults.host),
            port: parse_or(&lookup, "MC_PORT", target_defaults.port)?,
        };

        let rate_limit = RateLimitConfig {
            max_messages_per_minute: parse_or(
                &lookup,
                "MAX_MESSAGES_PER_MINUTE",
                rate_defaults.max_messages_per_minute,
            )?,
            min_spacing: millis_or(&lookup, "MIN_SPACING_MS", rate_defaults.min_spacing)?,
        };

        let triggers = ChangeTriggers {
            on_status_change: flag_or(
                &lookup,
                "UPDATE_ON_STATUS_CHANGE",
                trigger_defaults.on_status_change,
            ),
            on_player_count_change: flag_or(
                &lookup,
                "UPDATE_ON_PLAYER_CHANGE",
                trigger_defaults.on_player_count_change,
            ),
        };

        let monitor = MonitorConfig {
            target,
            poll_interval: millis_or(&lookup, "POLL_INTERVAL_MS", monitor_defaults.poll_interval)?,
            query_timeout: millis_or(&lookup, "QUERY_TIMEOUT_MS", monitor_defaults.query_timeout)?,
            rate_limit,
            triggers,
            enabled: flag_or(&lookup, "MONITORING_ENABLED", monitor_defaults.enabled),
            startup_delay: millis_or(&lookup, "STARTUP_DELAY_MS", monitor_defaults.startup_delay)?,
            channel_id: lookup("MONITOR_CHANNEL_ID").filter(|v| !v.trim().is_empty()),
        };

        let discord = DiscordConfig {
            token: required("DISCORD_TOKEN")?,
            application_id: required("CLIENT_ID")?,
            public_key: required("DISCORD_PUBLIC_KEY")?,
            api_base: lookup("DISCORD_API_BASE")
                .unwrap_or_else(|| DiscordConfig::DEFAULT_API_BASE.to_string()),
        };

        let colors = EmbedColors {
            online: color_or(&lookup, "COLOR_ONLINE", color_defaults.online)?,
            offline: color_or(&lookup, "COLOR_OFFLINE", color_defaults.offline)?,
            restarting: color_or(&lookup, "COLOR_RESTARTING", color_defaults.restarting)?,
        };

        let config = Self {
            monitor,
            discord,
            colors,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.monitor.target.host.trim().is_empty() {
            return Err("MC_HOST cannot be empty".to_string());
        }

        if self.monitor.target.port == 0 {
            return Err("MC_PORT must be greater than 0".to_string());
        }

        if self.monitor.query_timeout.is_zero() {
            return Err("QUERY_TIMEOUT_MS must be greater than 0".to_string());
        }

        if self.monitor.rate_limit.max_messages_per_minute == 0 {
            return Err("MAX_MESSAGES_PER_MINUTE must be greater than 0".to_string());
        }

        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

fn millis_or<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, String>
where
    F: Fn(&str) -> Option<String>,
{
    let ms: u64 = parse_or(lookup, key, default.as_millis() as u64)?;
    Ok(Duration::from_millis(ms))
}

fn flag_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_lowercase() == "true")
        .unwrap_or(default)
}

fn color_or<F>(lookup: &F, key: &str, default: u32) -> Result<u32, String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse_color(&raw).ok_or_else(|| format!("{} is not a valid color: {}", key, raw)),
        None => Ok(default),
    }
}

/// Accepts `#RRGGBB`, `0xRRGGBB` or a bare hex string
pub fn parse_color(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if hex.is_empty() || hex.len() > 6 {
        return None;
    }

    u32::from_str_radix(hex, 16).ok()
}
