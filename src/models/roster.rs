// Application configuration types: the student roster plus tracker tuning

use super::user::Student;
use crate::session::TrackerConfig;
use chrono::Duration;
use serde::Deserialize;
use std::collections::HashSet;

fn default_max_devices() -> usize {
    2
}

fn default_session_ttl_secs() -> i64 {
    9 * 60 * 60
}

fn default_token_lifetime_secs() -> i64 {
    8 * 60 * 60
}

/// Device-limit tuning
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerSettings {
    /// Maximum concurrent devices per student
    #[serde(default = "default_max_devices")]
    pub max_devices: usize,
    /// Session time-to-live in seconds. Keep this slightly longer than
    /// `token_lifetime_secs` so tokens expire before their slots do.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: i64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            max_devices: default_max_devices(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl TrackerSettings {
    pub fn to_tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            max_devices: self.max_devices,
            session_ttl: Duration::seconds(self.session_ttl_secs),
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Students allowed to sign in
    pub students: Vec<Student>,
    #[serde(default)]
    pub tracker: TrackerSettings,
    /// Bearer token lifetime in seconds
    #[serde(default = "default_token_lifetime_secs")]
    pub token_lifetime_secs: i64,
}

impl AppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.students.is_empty() {
            return Err("Configuration must define at least one student".to_string());
        }

        let mut seen_emails = HashSet::new();
        let mut seen_ids = HashSet::new();

        for student in &self.students {
            if student.id.trim().is_empty() {
                return Err("Student entries must have a non-empty id".to_string());
            }
            if student.email.trim().is_empty() {
                return Err(format!("Student '{}' must have a non-empty email", student.id));
            }
            if student.password.is_empty() {
                return Err(format!(
                    "Student '{}' must have a non-empty password",
                    student.id
                ));
            }
            if !seen_ids.insert(student.id.clone()) {
                return Err(format!("Duplicate student id: '{}'", student.id));
            }
            if !seen_emails.insert(student.email.to_lowercase()) {
                return Err(format!("Duplicate student email: '{}'", student.email));
            }
        }

        if self.tracker.max_devices == 0 {
            return Err("tracker.max_devices must be at least 1".to_string());
        }
        if self.tracker.session_ttl_secs <= 0 {
            return Err("tracker.session_ttl_secs must be positive".to_string());
        }
        if self.token_lifetime_secs <= 0 {
            return Err("token_lifetime_secs must be positive".to_string());
        }

        Ok(())
    }

    /// Look up a student by id
    pub fn get_student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }
}
