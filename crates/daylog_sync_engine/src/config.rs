//! Configuration for the sync engine.

use std::time::Duration;

/// Default remote entries service.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Default bound on every remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default period of the background reconciliation loop.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(10);

/// Configuration for sync operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Base URL of the remote entries service.
    pub server_url: String,
    /// Request timeout applied to every remote call.
    pub timeout: Duration,
    /// Period of the background reconciliation loop.
    pub sync_interval: Duration,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            timeout: DEFAULT_TIMEOUT,
            sync_interval: DEFAULT_SYNC_INTERVAL,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the background sync interval.
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}
