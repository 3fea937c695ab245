use crate::config::ChangeTriggers;
use crate::services::status::ServerStatus;

/// Why a status is worth broadcasting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    Forced,
    FirstStatus,
    StatusFlip,
    PlayerCount { from: i64, to: i64 },
}

/// Pure decision: which trigger (if any) fires for this poll
pub fn detect_change(
    previous: Option<&ServerStatus>,
    current: &ServerStatus,
    triggers: &ChangeTriggers,
    forced: bool,
) -> Option<ChangeReason> {
    if forced {
        return Some(ChangeReason::Forced);
    }

    let Some(previous) = previous else {
        return Some(ChangeReason::FirstStatus);
    };

    if triggers.on_status_change && previous.is_online() != current.is_online() {
        return Some(ChangeReason::StatusFlip);
    }

    if triggers.on_player_count_change {
        if let (Some(from), Some(to)) = (previous.players_online(), current.players_online()) {
            if from != to {
                return Some(ChangeReason::PlayerCount { from, to });
            }
        }
    }

    None
}

pub fn should_deliver(
    previous: Option<&ServerStatus>,
    current: &ServerStatus,
    triggers: &ChangeTriggers,
    forced: bool,
) -> bool {
    detect_change(previous, current, triggers, forced).is_some()
}
