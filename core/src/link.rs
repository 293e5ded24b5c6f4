//! Bounded wait for a network link to come up.
//!
//! Firmware hosts have to wait for Wi-Fi association before the first
//! request. The wait is capped by `LinkPolicy`; an unreachable access point
//! ends in `ApiError::LinkTimeout` instead of a hung device.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::ApiError;

/// Attempt budget for `wait_for_link`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_millis(1000),
        }
    }
}

impl LinkPolicy {
    /// Upper bound on the time spent sleeping between probes.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Call `probe` until it reports the link as up, sleeping `policy.interval`
/// between failed probes.
///
/// Returns the 1-based attempt on which the link came up.
pub fn wait_for_link<P, S>(policy: &LinkPolicy, mut probe: P, mut sleep: S) -> Result<u32, ApiError>
where
    P: FnMut() -> bool,
    S: FnMut(Duration),
{
    for attempt in 1..=policy.max_attempts {
        if probe() {
            info!(attempt, "network link up");
            return Ok(attempt);
        }
        debug!(attempt, max = policy.max_attempts, "network link not ready");
        if attempt < policy.max_attempts {
            sleep(policy.interval);
        }
    }
    Err(ApiError::LinkTimeout {
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32) -> LinkPolicy {
        LinkPolicy {
            max_attempts,
            interval: Duration::from_millis(250),
        }
    }

    #[test]
    fn returns_first_successful_attempt() {
        let mut calls = 0;
        let mut slept = Vec::new();
        let attempt = wait_for_link(
            &policy(5),
            || {
                calls += 1;
                calls == 3
            },
            |d| slept.push(d),
        )
        .unwrap();
        assert_eq!(attempt, 3);
        assert_eq!(slept, vec![Duration::from_millis(250); 2]);
    }

    #[test]
    fn immediate_link_does_not_sleep() {
        let mut slept = 0;
        let attempt = wait_for_link(&policy(5), || true, |_| slept += 1).unwrap();
        assert_eq!(attempt, 1);
        assert_eq!(slept, 0);
    }

    #[test]
    fn gives_up_after_budget_without_trailing_sleep() {
        let mut calls = 0;
        let mut slept = 0;
        let err = wait_for_link(
            &policy(4),
            || {
                calls += 1;
                false
            },
            |_| slept += 1,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::LinkTimeout { attempts: 4 }));
        assert_eq!(calls, 4);
        assert_eq!(slept, 3);
    }

    #[test]
    fn zero_attempts_fails_without_probing() {
        let mut calls = 0;
        let err = wait_for_link(
            &policy(0),
            || {
                calls += 1;
                true
            },
            |_| {},
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::LinkTimeout { attempts: 0 }));
        assert_eq!(calls, 0);
    }

    #[test]
    fn default_budget_matches_one_second_polling() {
        let p = LinkPolicy::default();
        assert_eq!(p.interval, Duration::from_secs(1));
        assert_eq!(p.budget(), Duration::from_secs(19));
        assert_eq!(policy(0).budget(), Duration::ZERO);
    }
}
