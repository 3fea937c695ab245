use serde::{Deserialize, Serialize};

/// Server software detected from the version string
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServerSoftware {
    Paper,
    Spigot,
    Bukkit,
    Fabric,
    Forge,
    Quilt,
    Vanilla,
    Purpur,
    Mohist,
    CatServer,
    Arclight,
    Magma,
    Sponge,
    Unknown,
}

impl ServerSoftware {
    /// Match order matters: the first token found in the version string wins
    pub const KNOWN: [ServerSoftware; 13] = [
        Self::Paper,
        Self::Spigot,
        Self::Bukkit,
        Self::Fabric,
        Self::Forge,
        Self::Quilt,
        Self::Vanilla,
        Self::Purpur,
        Self::Mohist,
        Self::CatServer,
        Self::Arclight,
        Self::Magma,
        Self::Sponge,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Paper => "Paper",
            Self::Spigot => "Spigot",
            Self::Bukkit => "Bukkit",
            Self::Fabric => "Fabric",
            Self::Forge => "Forge",
            Self::Quilt => "Quilt",
            Self::Vanilla => "Vanilla",
            Self::Purpur => "Purpur",
            Self::Mohist => "Mohist",
            Self::CatServer => "CatServer",
            Self::Arclight => "Arclight",
            Self::Magma => "Magma",
            Self::Sponge => "Sponge",
            Self::Unknown => "Unknown",
        }
    }

    /// Lowercase token searched for in the version string
    pub fn token(&self) -> String {
        self.as_str().to_lowercase()
    }
}

/// Why the server did not answer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OfflineReason {
    Restarting,
    Unreachable,
    InvalidHost,
    NetworkError,
    Unknown,
}

impl OfflineReason {
    /// Human label shown in status messages
    pub fn label(&self) -> &str {
        match self {
            Self::Restarting => "Restarting/Loading",
            Self::Unreachable => "Offline",
            Self::InvalidHost => "Invalid Host",
            Self::NetworkError => "Network Error",
            Self::Unknown => "Offline",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSample {
    pub name: String,
}

/// Player counts as reported; `online <= max` is not guaranteed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Players {
    pub online: i64,
    pub max: i64,
    pub sample: Vec<PlayerSample>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionInfo {
    pub name: String,
    pub protocol: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModInfo {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OnlineStatus {
    pub players: Players,
    pub version: VersionInfo,
    pub software: ServerSoftware,
    pub motd: String,
    pub latency_ms: u64,
    #[serde(skip)]
    pub icon: Option<Vec<u8>>,
    pub mod_info: Option<ModInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OfflineStatus {
    pub reason: OfflineReason,
    pub raw_error: String,
}

/// Canonical result of one poll
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ServerStatus {
    Online(OnlineStatus),
    Offline(OfflineStatus),
}

impl ServerStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online(_))
    }

    pub fn as_online(&self) -> Option<&OnlineStatus> {
        match self {
            Self::Online(online) => Some(online),
            Self::Offline(_) => None,
        }
    }

    pub fn players_online(&self) -> Option<i64> {
        self.as_online().map(|s| s.players.online)
    }

    /// Short label for logs
    pub fn summary(&self) -> String {
        match self {
            Self::Online(s) => format!("Online ({}/{})", s.players.online, s.players.max),
            Self::Offline(s) => s.reason.label().to_string(),
        }
    }
}

/// Raw Server List Ping response, as returned by the query collaborator
#[derive(Debug, Clone, Deserialize)]
pub struct RawStatus {
    pub players: RawPlayers,
    pub version: RawVersion,
    /// Description with formatting codes already stripped
    pub motd: String,
    pub round_trip_latency: u64,
    /// `data:image/png;base64,...` URI or bare base64
    pub favicon: Option<String>,
    pub mod_info: Option<RawModInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayers {
    pub online: i64,
    pub max: i64,
    pub sample: Option<Vec<RawPlayer>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayer {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawVersion {
    pub name: String,
    pub protocol: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawModInfo {
    pub mod_list: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Connection timed out after {0}ms")]
    Timeout(u64),
    /// Socket-level timeout reported by the OS, not our own deadline
    #[error("Connection timed out")]
    TimedOut,
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Host not found: {0}")]
    HostNotFound(String),
    #[error("I/O error: {0}")]
    Io(std::io::Error),
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Invalid status JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<std::io::Error> for QueryError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::ConnectionRefused => Self::ConnectionRefused,
            std::io::ErrorKind::TimedOut => Self::TimedOut,
            std::io::ErrorKind::UnexpectedEof => {
                Self::Protocol("connection closed before the response completed".to_string())
            }
            _ => Self::Io(err),
        }
    }
}
