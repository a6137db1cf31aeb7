use chrono::{DateTime, Utc};
use shared::domain::SystemInfo;

/// State that outlives a single orchestrator call. Created on page load and
/// torn down on unload.
#[derive(Debug, Default)]
pub struct AppState {
    pub last_system_info: Option<SystemInfo>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl AppState {
    pub fn initialize() -> Self {
        Self {
            last_system_info: None,
            loaded_at: Some(Utc::now()),
        }
    }

    pub fn teardown(&mut self) {
        self.last_system_info = None;
        self.loaded_at = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }
}
