use std::time::Duration;

use universe_types::config::{BackoffKind, ChatConfig};

const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// How long to wait before each reconnection attempt, and when to give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
    pub backoff: BackoffKind,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from(&ChatConfig::default())
    }
}

impl From<&ChatConfig> for ReconnectPolicy {
    fn from(config: &ChatConfig) -> Self {
        Self {
            max_attempts: config.reconnect_attempts,
            interval: Duration::from_millis(config.reconnect_interval_ms),
            backoff: config.backoff,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnection attempt `attempt` (1-based), or `None` once
    /// the attempts are used up.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt > self.max_attempts {
            return None;
        }
        let delay = match self.backoff {
            BackoffKind::Fixed => self.interval,
            BackoffKind::Exponential => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.interval.saturating_mul(factor).min(MAX_BACKOFF)
            }
        };
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ten_attempts_every_three_seconds() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(1), Some(Duration::from_secs(3)));
        assert_eq!(policy.delay_for(10), Some(Duration::from_secs(3)));
        assert_eq!(policy.delay_for(11), None);
    }

    #[test]
    fn exponential_doubles_and_caps() {
        let policy = ReconnectPolicy {
            max_attempts: 20,
            interval: Duration::from_secs(1),
            backoff: BackoffKind::Exponential,
        };
        assert_eq!(policy.delay_for(1), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay_for(2), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay_for(4), Some(Duration::from_secs(8)));
        assert_eq!(policy.delay_for(20), Some(MAX_BACKOFF));
    }

    #[test]
    fn zero_attempts_never_retries() {
        let policy = ReconnectPolicy {
            max_attempts: 0,
            ..ReconnectPolicy::default()
        };
        assert_eq!(policy.delay_for(1), None);
    }
}
