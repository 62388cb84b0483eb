use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Per-collection staleness windows, in seconds.
///
/// One coherent policy: the registration index turns over quickly and
/// refreshes every couple of minutes, client profiles once a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_registrations_window")]
    pub registrations_window_secs: u64,
    #[serde(default = "default_clients_window")]
    pub clients_window_secs: u64,
}

fn default_registrations_window() -> u64 {
    120
}

fn default_clients_window() -> u64 {
    86_400
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            registrations_window_secs: default_registrations_window(),
            clients_window_secs: default_clients_window(),
        }
    }
}
