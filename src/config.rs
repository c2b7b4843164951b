//! Application configuration.
//!
//! Layered via figment: built-in defaults, then `busdash.toml`, then
//! `BUSDASH_`-prefixed environment variables, then CLI overrides.

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Default config file looked up in the working directory.
pub const CONFIG_FILE: &str = "busdash.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the crawl backend, e.g. `http://127.0.0.1:5002`.
    pub server_url: String,
    /// WebSocket push-channel URL. Derived from `server_url` when unset.
    pub events_url: Option<String>,
    /// Platform the dashboard controls (`redbus`, `traveloka`, ...).
    pub platform: String,
    /// Seconds between `/api/status` polls.
    pub status_poll_secs: u64,
    /// Seconds between `/api/data` listing refreshes.
    pub files_poll_secs: u64,
    /// Seconds between `/api/train/status` polls while training runs.
    pub train_poll_secs: u64,
    /// Maximum entries retained by the log console.
    pub log_capacity: usize,
    /// Directory downloaded data files are written to.
    pub download_dir: String,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5002".to_string(),
            events_url: None,
            platform: "redbus".to_string(),
            status_poll_secs: 2,
            files_poll_secs: 5,
            train_poll_secs: 1,
            log_capacity: 500,
            download_dir: ".".to_string(),
            verbose: false,
        }
    }
}

impl AppConfig {
    /// Load configuration, optionally merging serializable CLI overrides
    /// on top. `None` fields in the override struct are skipped.
    pub fn new<A: Serialize>(overrides: Option<&A>) -> Result<Self> {
        Self::from_file(CONFIG_FILE, overrides)
    }

    /// Same as [`AppConfig::new`] but with an explicit config file path.
    pub fn from_file<A: Serialize>(path: &str, overrides: Option<&A>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("BUSDASH_"));

        if let Some(args) = overrides {
            figment = figment.merge(Serialized::defaults(args));
        }

        figment
            .extract()
            .context("Failed to load busdash configuration")
    }

    /// Push-channel URL: explicit `events_url`, or `server_url` with the
    /// scheme swapped to ws(s) and `/events` appended.
    pub fn resolved_events_url(&self) -> String {
        if let Some(url) = &self.events_url {
            return url.clone();
        }
        let ws_base = if let Some(rest) = self.server_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.server_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            format!("ws://{}", self.server_url)
        };
        format!("{}/events", ws_base.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_config_file() {
        let config =
            AppConfig::from_file("does-not-exist.toml", None::<&AppConfig>).unwrap();
        assert_eq!(config.server_url, "http://127.0.0.1:5002");
        assert_eq!(config.status_poll_secs, 2);
        assert_eq!(config.files_poll_secs, 5);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("busdash.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "server_url = \"http://crawler.local:8080\"\nplatform = \"traveloka\""
        )
        .unwrap();

        let config =
            AppConfig::from_file(path.to_str().unwrap(), None::<&AppConfig>).unwrap();
        assert_eq!(config.server_url, "http://crawler.local:8080");
        assert_eq!(config.platform, "traveloka");
        // Untouched keys keep their defaults
        assert_eq!(config.log_capacity, 500);
    }

    #[test]
    fn events_url_derived_from_server_url() {
        let config = AppConfig {
            server_url: "http://127.0.0.1:5002".into(),
            ..Default::default()
        };
        assert_eq!(config.resolved_events_url(), "ws://127.0.0.1:5002/events");

        let tls = AppConfig {
            server_url: "https://crawler.example.com/".into(),
            ..Default::default()
        };
        assert_eq!(
            tls.resolved_events_url(),
            "wss://crawler.example.com/events"
        );
    }

    #[test]
    fn explicit_events_url_wins() {
        let config = AppConfig {
            events_url: Some("ws://10.0.0.2:9000/push".into()),
            ..Default::default()
        };
        assert_eq!(config.resolved_events_url(), "ws://10.0.0.2:9000/push");
    }
}
