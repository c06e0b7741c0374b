// Device session tracking module
// Admission control and bookkeeping for concurrent device logins per user

pub mod tracker;
pub mod types;

pub use tracker::{Admission, DeviceSessionTracker};
pub use types::{DeviceSession, TrackerConfig};
