// Settings module
// Server connection and gantt defaults, stored as TOML

use serde::{Deserialize, Serialize};

use super::gantt_config::GanttConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Scheme and host of the back-office, without the store prefix.
    pub base_url: String,
    /// Tenant path segment, the `{store}` in `/{store}/dashboard/...`.
    pub store: String,
    /// Per-request timeout; 0 disables it.
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            store: "main".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub gantt: GanttConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        let base_url = self.server.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err("Server base URL must start with http:// or https://".to_string());
        }

        if self.server.store.trim().is_empty() {
            return Err("Store cannot be empty".to_string());
        }

        self.gantt.validate()
    }
}
