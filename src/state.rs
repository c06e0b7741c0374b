// Shared application state, assembled once at startup

use crate::models::AppConfig;
use crate::session::DeviceSessionTracker;
use std::sync::Arc;

/// State handed to every request handler.
///
/// The tracker is an explicitly constructed instance owned here, not a
/// module-level global, so tests can build isolated copies and the
/// backing store can later be swapped without changing the handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tracker: Arc<DeviceSessionTracker>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let tracker = DeviceSessionTracker::new(config.tracker.to_tracker_config());
        Self {
            config,
            tracker: Arc::new(tracker),
        }
    }
}
