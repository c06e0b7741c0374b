// Per-user concurrent-device admission control

use super::types::{DeviceSession, TrackerConfig};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};

/// Outcome of a registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Under the device limit, or an idempotent refresh of an existing slot
    Allowed,
    /// Every slot for this user is occupied by another device
    LimitReached,
}

impl Admission {
    pub fn is_allowed(self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Tracks the active device sessions of each user and decides, at login
/// time, whether a new device may be admitted.
///
/// State is in-memory only: a process restart clears every slot and all
/// devices must re-authenticate, subject again to the limit. The map is
/// sharded, so operations on different users do not contend; all mutation
/// for one user happens under that user's shard lock, so two concurrent
/// registrations can never both observe the same free slot.
pub struct DeviceSessionTracker {
    sessions: DashMap<String, Vec<DeviceSession>>,
    config: TrackerConfig,
}

impl DeviceSessionTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Try to register a login for `user_id` under `session_token`.
    ///
    /// Expired sessions are purged first (lazy expiry). Re-registering a
    /// token that is already present refreshes its timestamp instead of
    /// consuming another slot, so retrying the same login is idempotent.
    /// At the limit the attempt is rejected and stored state is left as
    /// it was: an existing device is never signed out to make room.
    pub fn register(
        &self,
        user_id: &str,
        session_token: &str,
        user_agent: Option<&str>,
    ) -> Admission {
        self.register_at(user_id, session_token, user_agent, Utc::now())
    }

    /// `register` with an explicit clock
    pub fn register_at(
        &self,
        user_id: &str,
        session_token: &str,
        user_agent: Option<&str>,
        now: DateTime<Utc>,
    ) -> Admission {
        // The entry guard holds the shard lock for the whole
        // read-filter-decide-write sequence.
        let mut entry = self.sessions.entry(user_id.to_string()).or_default();

        entry.retain(|s| s.is_fresh(now, self.config.session_ttl));

        // Same device re-authenticating: refresh its slot
        if let Some(existing) = entry
            .iter_mut()
            .find(|s| s.session_token == session_token)
        {
            existing.created_at = now;
            debug!("Refreshed session {} for user {}", session_token, user_id);
            return Admission::Allowed;
        }

        if entry.len() >= self.config.max_devices {
            warn!(
                "User {} is at the device limit ({}); rejecting login",
                user_id, self.config.max_devices
            );
            return Admission::LimitReached;
        }

        entry.push(DeviceSession {
            session_token: session_token.to_string(),
            created_at: now,
            user_agent: user_agent.map(|s| s.to_string()),
        });
        debug!(
            "Registered session {} for user {} ({} active)",
            session_token,
            user_id,
            entry.len()
        );
        Admission::Allowed
    }

    /// Free the slot held by `session_token`, e.g. on sign-out.
    ///
    /// Silent no-op when the user or token is unknown, so callers can
    /// invoke it defensively. Removal is precise: other entries are left
    /// untouched, expired or not.
    pub fn remove(&self, user_id: &str, session_token: &str) {
        if let Some(mut entry) = self.sessions.get_mut(user_id) {
            let before = entry.len();
            entry.retain(|s| s.session_token != session_token);
            if entry.len() < before {
                debug!("Removed session {} for user {}", session_token, user_id);
            }
        }
    }

    /// Number of non-expired sessions for `user_id`.
    ///
    /// Read-only: expired entries are counted out but not purged here.
    pub fn active_count(&self, user_id: &str) -> usize {
        self.active_count_at(user_id, Utc::now())
    }

    /// `active_count` with an explicit clock
    pub fn active_count_at(&self, user_id: &str, now: DateTime<Utc>) -> usize {
        self.sessions
            .get(user_id)
            .map(|entry| {
                entry
                    .iter()
                    .filter(|s| s.is_fresh(now, self.config.session_ttl))
                    .count()
            })
            .unwrap_or(0)
    }
}

impl Default for DeviceSessionTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tracker() -> DeviceSessionTracker {
        DeviceSessionTracker::new(TrackerConfig {
            max_devices: 2,
            session_ttl: Duration::hours(9),
        })
    }

    #[test]
    fn test_register_until_limit() {
        let tracker = tracker();

        assert!(tracker.register("u1", "a", None).is_allowed());
        assert!(tracker.register("u1", "b", None).is_allowed());
        assert_eq!(tracker.register("u1", "c", None), Admission::LimitReached);
        assert_eq!(tracker.active_count("u1"), 2);
    }

    #[test]
    fn test_remove_frees_slot() {
        let tracker = tracker();

        assert!(tracker.register("u1", "a", None).is_allowed());
        assert!(tracker.register("u1", "b", None).is_allowed());
        assert_eq!(tracker.register("u1", "c", None), Admission::LimitReached);

        tracker.remove("u1", "a");
        assert!(tracker.register("u1", "c", None).is_allowed());
        assert_eq!(tracker.active_count("u1"), 2);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let tracker = tracker();

        assert!(tracker.register("u1", "a", None).is_allowed());
        assert!(tracker.register("u1", "a", None).is_allowed());
        assert_eq!(tracker.active_count("u1"), 1);

        // A refreshed slot still blocks a third distinct device
        assert!(tracker.register("u1", "b", None).is_allowed());
        assert!(tracker.register("u1", "a", None).is_allowed());
        assert_eq!(tracker.register("u1", "c", None), Admission::LimitReached);
    }

    #[test]
    fn test_refresh_updates_timestamp() {
        let tracker = tracker();
        let t0 = Utc::now();

        tracker.register_at("u1", "a", None, t0);
        tracker.register_at("u1", "b", None, t0);

        // Refresh "a" eight hours in; at t0 + 9h it must still be fresh
        // while "b" has aged out.
        let t8 = t0 + Duration::hours(8);
        assert!(tracker.register_at("u1", "a", None, t8).is_allowed());

        let t9 = t0 + Duration::hours(9);
        assert_eq!(tracker.active_count_at("u1", t9), 1);
    }

    #[test]
    fn test_rejection_does_not_evict() {
        let tracker = tracker();
        let t0 = Utc::now();

        tracker.register_at("u1", "a", None, t0);
        tracker.register_at("u1", "b", None, t0);
        assert_eq!(
            tracker.register_at("u1", "c", None, t0 + Duration::minutes(5)),
            Admission::LimitReached
        );

        // Both original sessions survive the rejected attempt untouched:
        // still present, timestamps not refreshed.
        assert_eq!(tracker.active_count_at("u1", t0), 2);
        assert_eq!(tracker.active_count_at("u1", t0 + Duration::hours(9)), 0);
    }

    #[test]
    fn test_expiry_frees_slots() {
        let tracker = tracker();
        let t0 = Utc::now();

        tracker.register_at("u1", "a", None, t0);
        tracker.register_at("u1", "b", None, t0);
        assert_eq!(
            tracker.register_at("u1", "c", None, t0),
            Admission::LimitReached
        );

        // Just past the TTL both sessions have aged out
        let later = t0 + Duration::hours(9) + Duration::seconds(1);
        assert_eq!(tracker.active_count_at("u1", later), 0);

        assert!(tracker.register_at("u1", "c", None, later).is_allowed());
        assert_eq!(tracker.active_count_at("u1", later), 1);
    }

    #[test]
    fn test_users_are_independent() {
        let tracker = tracker();

        tracker.register("u1", "a", None);
        tracker.register("u1", "b", None);
        assert_eq!(tracker.register("u1", "c", None), Admission::LimitReached);

        assert!(tracker.register("u2", "x", None).is_allowed());
        assert!(tracker.register("u2", "y", None).is_allowed());
        assert_eq!(tracker.active_count("u2"), 2);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let tracker = tracker();

        tracker.remove("nobody", "tok");

        tracker.register("u1", "a", None);
        tracker.remove("u1", "not-a-token");
        assert_eq!(tracker.active_count("u1"), 1);
    }

    #[test]
    fn test_active_count_does_not_purge() {
        let tracker = tracker();
        let t0 = Utc::now();

        tracker.register_at("u1", "a", None, t0);

        // Counting past the TTL reports zero but leaves the entry stored;
        // a later remove by token still finds it.
        let later = t0 + Duration::hours(10);
        assert_eq!(tracker.active_count_at("u1", later), 0);
        tracker.remove("u1", "a");
        assert_eq!(tracker.active_count_at("u1", t0), 0);
    }

    #[test]
    fn test_user_agent_is_informational() {
        let tracker = tracker();

        assert!(tracker
            .register("u1", "a", Some("Mozilla/5.0"))
            .is_allowed());
        assert!(tracker.register("u1", "b", None).is_allowed());
        assert_eq!(
            tracker.register("u1", "c", Some("Mozilla/5.0")),
            Admission::LimitReached
        );
    }

    #[test]
    fn test_concurrent_registers_never_overshoot() {
        use std::sync::Arc;

        let tracker = Arc::new(tracker());
        let mut handles = Vec::new();

        for i in 0..16 {
            let tracker = Arc::clone(&tracker);
            handles.push(std::thread::spawn(move || {
                tracker.register("u1", &format!("tok-{}", i), None).is_allowed()
            }));
        }

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|allowed| *allowed)
            .count();

        assert_eq!(admitted, 2);
        assert_eq!(tracker.active_count("u1"), 2);
    }
}
