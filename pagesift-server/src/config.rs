use anyhow::Context;
use pagesift_analyzer::AnalyzerConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default locations probed when no config file is given explicitly.
const CONFIG_CANDIDATES: &[&str] = &["pagesift.toml", "config/pagesift.toml"];

/// Service configuration: built-in defaults, overlaid by an optional TOML
/// file, overlaid by `PAGESIFT_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_address: String,
    /// Log verbosity: trace, debug, info, warn or error.
    pub log_level: String,
    /// Log output format: text or json.
    pub log_format: String,
    /// Outer budget for one analyze request, fetch and probes included.
    pub request_timeout_secs: u64,
    pub analyzer: AnalyzerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            request_timeout_secs: 60,
            analyzer: AnalyzerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration. An explicitly given file must exist and parse;
    /// the default candidate files are optional.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match Self::config_file(explicit) {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                let config = toml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))?;
                debug!(path = %path.display(), "loaded config file");
                config
            }
            None => Self::default(),
        };

        config.apply_env();
        Ok(config)
    }

    fn config_file(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Ok(path) = env::var("PAGESIFT_CONFIG") {
            return Some(PathBuf::from(path));
        }

        CONFIG_CANDIDATES
            .iter()
            .copied()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    fn apply_env(&mut self) {
        if let Ok(bind) = env::var("PAGESIFT_BIND_ADDRESS") {
            self.bind_address = bind;
        }
        if let Ok(level) = env::var("PAGESIFT_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Ok(format) = env::var("PAGESIFT_LOG_FORMAT") {
            self.log_format = format;
        }
        if let Ok(value) = env::var("PAGESIFT_REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = value.parse()
        {
            self.request_timeout_secs = secs;
        }
        if let Ok(value) = env::var("PAGESIFT_MAX_WORKERS")
            && let Ok(workers) = value.parse()
        {
            self.analyzer.max_workers = workers;
        }
        if let Ok(value) = env::var("PAGESIFT_FETCH_TIMEOUT_SECS")
            && let Ok(secs) = value.parse()
        {
            self.analyzer.request_timeout_secs = secs;
        }
        if let Ok(value) = env::var("PAGESIFT_LINK_TIMEOUT_SECS")
            && let Ok(secs) = value.parse()
        {
            self.analyzer.link_timeout_secs = secs;
        }
        if let Ok(value) = env::var("PAGESIFT_MAX_REDIRECTS")
            && let Ok(redirects) = value.parse()
        {
            self.analyzer.max_redirects = redirects;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
