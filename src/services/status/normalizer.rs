use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt::Display;

use crate::services::status::{
    ModInfo, OfflineReason, OfflineStatus, OnlineStatus, PlayerSample, Players, RawStatus,
    ServerSoftware, ServerStatus, VersionInfo,
};

/// Ordered substring rules for offline classification; first hit wins
const OFFLINE_RULES: [(&[&str], OfflineReason); 4] = [
    (&["timeout", "timed out"], OfflineReason::Restarting),
    (&["connection refused", "econnrefused"], OfflineReason::Unreachable),
    (&["host not found", "enotfound"], OfflineReason::InvalidHost),
    (&["network is unreachable"], OfflineReason::NetworkError),
];

/// Turn one query outcome into a canonical status. Never fails.
pub fn normalize<E: Display>(outcome: Result<RawStatus, E>) -> ServerStatus {
    match outcome {
        Ok(raw) => ServerStatus::Online(normalize_online(raw)),
        Err(err) => {
            let raw_error = err.to_string();
            ServerStatus::Offline(OfflineStatus {
                reason: classify_offline(&raw_error),
                raw_error,
            })
        }
    }
}

fn normalize_online(raw: RawStatus) -> OnlineStatus {
    let software = classify_software(&raw.version.name);

    let sample = raw
        .players
        .sample
        .unwrap_or_default()
        .into_iter()
        .map(|p| PlayerSample { name: p.name })
        .collect();

    let icon = raw.favicon.as_deref().and_then(decode_favicon);

    OnlineStatus {
        players: Players {
            online: raw.players.online,
            max: raw.players.max,
            sample,
        },
        version: VersionInfo {
            name: raw.version.name,
            protocol: raw.version.protocol,
        },
        software,
        motd: raw.motd,
        latency_ms: raw.round_trip_latency,
        icon,
        mod_info: raw.mod_info.map(|m| ModInfo {
            count: m.mod_list.len(),
        }),
    }
}

pub fn classify_software(version_name: &str) -> ServerSoftware {
    let version = version_name.to_lowercase();

    ServerSoftware::KNOWN
        .into_iter()
        .find(|software| version.contains(&software.token()))
        .unwrap_or(ServerSoftware::Unknown)
}

pub fn classify_offline(message: &str) -> OfflineReason {
    let message = message.to_lowercase();

    OFFLINE_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| message.contains(needle)))
        .map(|(_, reason)| *reason)
        .unwrap_or(OfflineReason::Unknown)
}

/// Decode a favicon given as a data URI or bare base64
pub fn decode_favicon(favicon: &str) -> Option<Vec<u8>> {
    let encoded = match favicon.split_once(',') {
        Some((_, data)) => data,
        None => favicon,
    };

    // Some servers wrap the base64 payload across lines
    let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }

    match STANDARD.decode(cleaned.as_bytes()) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::debug!("Discarding undecodable favicon: {}", e);
            None
        }
    }
}
