pub mod environment;
pub mod monitor_config;

pub use environment::Config;
pub use monitor_config::{
    ChangeTriggers, DiscordConfig, EmbedColors, MonitorConfig, RateLimitConfig, ServerTarget,
};
