use chrono::{DateTime, Utc};

use crate::config::RateLimitConfig;
use crate::services::delivery::RateWindow;

pub const WINDOW_MS: i64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    BudgetExhausted,
    TooSoon { wait_ms: i64 },
}

/// Result of a gate check: the verdict plus the window after any rollover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub allowed: bool,
    pub denial: Option<Denial>,
    pub window: RateWindow,
}

/// Fixed 60s window with a per-window cap and a spacing floor.
///
/// Checks never count a message; the caller calls [`RateWindow::record_send`]
/// once the send is confirmed.
#[derive(Debug, Clone)]
pub struct WindowRateLimiter {
    config: RateLimitConfig,
}

impl WindowRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self { config }
    }

    pub fn try_acquire(&self, window: &RateWindow, now: DateTime<Utc>) -> Acquisition {
        let mut next = window.clone();

        let rolled_over = match next.window_start {
            Some(start) => (now - start).num_milliseconds() >= WINDOW_MS,
            None => true,
        };
        if rolled_over {
            next.messages_sent_in_window = 0;
            next.window_start = Some(now);
        }

        if next.messages_sent_in_window >= self.config.max_messages_per_minute {
            return Self::deny(next, Denial::BudgetExhausted);
        }

        // Spacing only applies once this window has seen a message
        if next.messages_sent_in_window > 0 {
            if let Some(last) = next.last_send_time {
                let spacing_ms = self.config.min_spacing.as_millis() as i64;
                let since_ms = (now - last).num_milliseconds();
                if since_ms < spacing_ms {
                    return Self::deny(next, Denial::TooSoon { wait_ms: spacing_ms - since_ms });
                }
            }
        }

        Acquisition {
            allowed: true,
            denial: None,
            window: next,
        }
    }

    fn deny(window: RateWindow, denial: Denial) -> Acquisition {
        Acquisition {
            allowed: false,
            denial: Some(denial),
            window,
        }
    }
}

impl Default for WindowRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
