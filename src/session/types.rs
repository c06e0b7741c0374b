// Device session types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tracker configuration
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Maximum concurrent devices per user
    pub max_devices: usize,
    /// Age after which a session stops counting against the limit
    pub session_ttl: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_devices: 2,
            // Slightly longer than the token lifetime, so the bearer token
            // always expires before its slot does.
            session_ttl: Duration::hours(9),
        }
    }
}

/// One admitted login slot for a device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSession {
    /// Opaque per-login identifier, generated by the caller per attempt
    pub session_token: String,
    /// When the session was created or last refreshed
    pub created_at: DateTime<Utc>,
    /// Client description, informational only
    pub user_agent: Option<String>,
}

impl DeviceSession {
    /// Whether the session still counts against the device limit at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at < ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_freshness() {
        let ttl = Duration::hours(9);
        let created = Utc::now();
        let session = DeviceSession {
            session_token: "tok-1".to_string(),
            created_at: created,
            user_agent: None,
        };

        assert!(session.is_fresh(created, ttl));
        assert!(session.is_fresh(created + Duration::hours(8), ttl));
        // Exactly at the TTL boundary the session is expired
        assert!(!session.is_fresh(created + Duration::hours(9), ttl));
        assert!(!session.is_fresh(created + Duration::hours(10), ttl));
    }

    #[test]
    fn test_default_config() {
        let config = TrackerConfig::default();
        assert_eq!(config.max_devices, 2);
        assert_eq!(config.session_ttl, Duration::hours(9));
    }
}
