use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for page analysis and link probing.
///
/// The page fetch and each link probe run on separate budgets so one slow
/// link cannot eat the whole request's time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Upper bound on concurrent link-check workers.
    pub max_workers: usize,
    /// Timeout for fetching the page under analysis, in seconds.
    pub request_timeout_secs: u64,
    /// Timeout for each individual link probe, in seconds.
    pub link_timeout_secs: u64,
    /// Redirect ceiling for the page fetch and for every probe.
    pub max_redirects: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_workers: 10,
            request_timeout_secs: 30,
            link_timeout_secs: 10,
            max_redirects: 5,
        }
    }
}

impl AnalyzerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn link_timeout(&self) -> Duration {
        Duration::from_secs(self.link_timeout_secs)
    }
}
