//! Connection timing.

use std::time::Duration;

/// Timers driving a deck connection's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionTiming {
    /// How often a heartbeat ping is sent.
    pub heartbeat_interval: Duration,
    /// How long a ping waits for its pong.
    pub liveness_timeout: Duration,
    /// Age at which a connection is replaced regardless of health.
    pub rotation_interval: Duration,
    /// How long a dial may take before it counts as failed.
    pub dial_timeout: Duration,
    /// First delay after a failed dial.
    pub reconnect_min_delay: Duration,
    /// Cap of the dial backoff.
    pub reconnect_max_delay: Duration,
}

impl Default for ConnectionTiming {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(60),
            liveness_timeout: Duration::from_secs(3),
            rotation_interval: Duration::from_secs(10 * 60),
            dial_timeout: Duration::from_secs(30),
            reconnect_min_delay: Duration::from_secs(1),
            reconnect_max_delay: Duration::from_secs(30),
        }
    }
}

impl ConnectionTiming {
    /// Backoff before dial attempt number `failures + 1`.
    ///
    /// Doubles from `reconnect_min_delay` and is capped at
    /// `reconnect_max_delay`. Jitter is added by the caller.
    pub fn reconnect_delay(&self, failures: u32) -> Duration {
        let factor = 2u32.saturating_pow(failures.saturating_sub(1).min(16));
        self.reconnect_min_delay
            .saturating_mul(factor)
            .min(self.reconnect_max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnect_delay_calculation() {
        let timing = ConnectionTiming::default();
        assert_eq!(timing.reconnect_delay(1), Duration::from_secs(1));
        assert_eq!(timing.reconnect_delay(2), Duration::from_secs(2));
        assert_eq!(timing.reconnect_delay(3), Duration::from_secs(4));
        assert_eq!(timing.reconnect_delay(5), Duration::from_secs(16));
        // Capped at the max delay
        assert_eq!(timing.reconnect_delay(6), Duration::from_secs(30));
        assert_eq!(timing.reconnect_delay(100), Duration::from_secs(30));
    }
}
