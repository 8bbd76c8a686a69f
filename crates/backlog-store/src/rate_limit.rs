//! Fixed-window rate limiters.
//!
//! [`FixedWindowLimiter`] keeps its counters in process memory and suits a
//! long-running server. [`FileRateLimiter`] keeps them in a JSON state file so
//! that limits hold across short-lived processes such as CLI invocations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use backlog_core::traits::{RateDecision, RateLimitPolicy, RateLimiter};

use crate::state_file;

/// Expired windows are swept once the map grows past this many keys.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Window {
    count: u32,
    reset_at: DateTime<Utc>,
}

fn window_end(policy: RateLimitPolicy, now: DateTime<Utc>) -> DateTime<Utc> {
    let length = i64::try_from(policy.window_ms)
        .ok()
        .and_then(Duration::try_milliseconds)
        .unwrap_or(Duration::MAX);
    now.checked_add_signed(length)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Count one request for `key` against `windows`.
///
/// A window starts with the first request after the previous one expired.
fn decide(
    windows: &mut HashMap<String, Window>,
    policy: RateLimitPolicy,
    key: &str,
    now: DateTime<Utc>,
) -> RateDecision {
    let max = policy.max_requests;

    if let Some(window) = windows.get_mut(key).filter(|w| w.reset_at > now) {
        if window.count >= max {
            return RateDecision {
                allowed: false,
                remaining: 0,
                reset_at: window.reset_at,
            };
        }
        window.count += 1;
        return RateDecision {
            allowed: true,
            remaining: max - window.count,
            reset_at: window.reset_at,
        };
    }

    let reset_at = window_end(policy, now);
    if max == 0 {
        return RateDecision {
            allowed: false,
            remaining: 0,
            reset_at,
        };
    }
    windows.insert(key.to_string(), Window { count: 1, reset_at });
    RateDecision {
        allowed: true,
        remaining: max - 1,
        reset_at,
    }
}

/// Allows `max_requests` per key per window, counted in memory.
pub struct FixedWindowLimiter {
    policy: RateLimitPolicy,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            windows: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateDecision {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        if windows.len() >= SWEEP_THRESHOLD {
            windows.retain(|_, w| w.reset_at > now);
        }
        decide(&mut windows, self.policy, key, now)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LimiterState {
    #[serde(default)]
    windows: HashMap<String, Window>,
}

/// Allows `max_requests` per key per window, counted in a JSON state file.
///
/// Several limiters (and processes) may share one file as long as their keys
/// differ. Each check holds the file's cross-process lock while it reads,
/// counts and writes back. If the file cannot be used the request is allowed
/// and the failure is logged; an unreadable document is replaced.
pub struct FileRateLimiter {
    path: PathBuf,
    policy: RateLimitPolicy,
}

impl FileRateLimiter {
    pub fn new(path: impl Into<PathBuf>, policy: RateLimitPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<LimiterState> {
        let Some(content) = state_file::read_optional(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?
        else {
            return Ok(LimiterState::default());
        };
        match serde_json::from_str(&content) {
            Ok(state) => Ok(state),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "discarding unreadable rate-limit state"
                );
                Ok(LimiterState::default())
            }
        }
    }

    fn try_check(&self, key: &str, now: DateTime<Utc>) -> Result<RateDecision> {
        let mut lock = state_file::open_lock(&self.path)
            .with_context(|| format!("failed to lock {}", self.path.display()))?;
        let _held = lock
            .write()
            .with_context(|| format!("failed to lock {}", self.path.display()))?;

        let mut state = self.load()?;
        state.windows.retain(|_, w| w.reset_at > now);
        let decision = decide(&mut state.windows, self.policy, key, now);

        let json = serde_json::to_string_pretty(&state)?;
        state_file::write_atomic(&self.path, json.as_bytes())
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(decision)
    }
}

impl RateLimiter for FileRateLimiter {
    fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateDecision {
        match self.try_check(key, now) {
            Ok(decision) => decision,
            Err(e) => {
                tracing::error!(
                    key,
                    error = %format!("{e:#}"),
                    "rate-limit state unavailable, allowing request"
                );
                RateDecision {
                    allowed: true,
                    remaining: self.policy.max_requests,
                    reset_at: window_end(self.policy, now),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_requests: u32) -> RateLimitPolicy {
        RateLimitPolicy {
            window_ms: 60_000,
            max_requests,
        }
    }

    fn limiter(max_requests: u32) -> FixedWindowLimiter {
        FixedWindowLimiter::new(policy(max_requests))
    }

    #[test]
    fn allows_up_to_max_then_denies() {
        let limiter = limiter(3);
        let now = Utc::now();

        let remaining: Vec<u32> = (0..3)
            .map(|_| {
                let d = limiter.check_at("ip", now);
                assert!(d.allowed);
                d.remaining
            })
            .collect();
        assert_eq!(remaining, vec![2, 1, 0]);

        let denied = limiter.check_at("ip", now + Duration::seconds(1));
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.reset_at, now + Duration::seconds(60));
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = limiter(1);
        let now = Utc::now();
        assert!(limiter.check_at("ip", now).allowed);
        assert!(!limiter.check_at("ip", now + Duration::seconds(59)).allowed);
        assert!(limiter.check_at("ip", now + Duration::seconds(60)).allowed);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = limiter(1);
        let now = Utc::now();
        assert!(limiter.check_at("a", now).allowed);
        assert!(limiter.check_at("b", now).allowed);
        assert!(!limiter.check_at("a", now).allowed);
        assert_eq!(limiter.tracked_keys(), 2);
    }

    #[test]
    fn zero_budget_denies_everything() {
        let limiter = limiter(0);
        let decision = limiter.check_at("ip", Utc::now());
        assert!(!decision.allowed);
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn huge_window_does_not_overflow() {
        let limiter = FixedWindowLimiter::new(RateLimitPolicy {
            window_ms: u64::MAX,
            max_requests: 1,
        });
        let decision = limiter.check_at("ip", Utc::now());
        assert!(decision.allowed);
        assert!(decision.reset_at > Utc::now());
    }

    #[test]
    fn file_counters_survive_new_limiter_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rate-limits.json");
        let now = Utc::now();

        assert!(FileRateLimiter::new(&path, policy(2)).check_at("write:a", now).allowed);
        let second = FileRateLimiter::new(&path, policy(2)).check_at("write:a", now);
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        let third = FileRateLimiter::new(&path, policy(2)).check_at("write:a", now);
        assert!(!third.allowed);
        assert_eq!(third.reset_at, now + Duration::seconds(60));

        let other = FileRateLimiter::new(&path, policy(2)).check_at("write:b", now);
        assert!(other.allowed);
    }

    #[test]
    fn file_state_uses_camel_case_and_drops_expired_windows() {
        let dir = tempfile::tempdir().unwrap();
        let limiter = FileRateLimiter::new(dir.path().join("rate-limits.json"), policy(5));
        let now = Utc::now();

        limiter.check_at("old", now);
        limiter.check_at("fresh", now + Duration::seconds(30));
        limiter.check_at("fresh", now + Duration::seconds(61));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(limiter.path()).unwrap()).unwrap();
        let windows = raw["windows"].as_object().unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows["fresh"]["count"], 2);
        assert!(windows["fresh"]["resetAt"].is_string());
    }

    #[test]
    fn unreadable_state_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rate-limits.json");
        std::fs::write(&path, "{ not json").unwrap();

        let limiter = FileRateLimiter::new(&path, policy(1));
        let now = Utc::now();
        assert!(limiter.check_at("k", now).allowed);
        assert!(!limiter.check_at("k", now).allowed);
    }

    #[test]
    fn unusable_state_path_allows_requests() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the state directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let limiter = FileRateLimiter::new(blocker.join("rate-limits.json"), policy(0));
        assert!(limiter.check_at("k", Utc::now()).allowed);
    }
}
