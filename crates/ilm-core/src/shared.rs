//! Shared types and helpers used across the Ilm crates.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User ID used when a request carries none (or an empty one).
pub const DEFAULT_USER_ID: &str = "anonymous";

/// Number of characters of a user message kept in log lines.
const LOG_PREFIX_CHARS: usize = 48;

/// Resolves an optional inbound user identifier to a non-empty one.
pub fn resolve_user_id(user_id: Option<&str>) -> &str {
    user_id
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_USER_ID)
}

/// Unix timestamp in milliseconds.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// First few characters of a message, for structured log fields.
pub fn message_prefix(message: &str) -> String {
    let mut prefix: String = message.chars().take(LOG_PREFIX_CHARS).collect();
    if message.chars().count() > LOG_PREFIX_CHARS {
        prefix.push('…');
    }
    prefix
}

/// Application configuration (gateway identity, storage, capabilities, retention).
/// Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Application identity shown on the status endpoint.
    pub app_name: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Base directory for the sled learning DB.
    pub storage_path: String,
    /// Optional JSON knowledge file. When absent the built-in seed is used.
    #[serde(default)]
    pub knowledge_path: Option<String>,
    #[serde(default = "default_true")]
    pub sentiment_enabled: bool,
    #[serde(default = "default_true")]
    pub semantic_enabled: bool,
    /// Turns of per-user history handed to the context.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Sessions idle longer than this are evicted by the monitor.
    #[serde(default = "default_session_idle_ttl_secs")]
    pub session_idle_ttl_secs: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Interaction log retention bound; oldest rows are pruned beyond it.
    #[serde(default = "default_max_interactions")]
    pub max_interactions: usize,
    #[serde(default = "default_monitor_interval_secs")]
    pub monitor_interval_secs: u64,
    /// Consecutive failed probes before the monitor reinitializes storage.
    #[serde(default = "default_monitor_failure_threshold")]
    pub monitor_failure_threshold: u32,
}

fn default_true() -> bool {
    true
}

fn default_history_limit() -> usize {
    5
}

fn default_session_idle_ttl_secs() -> u64 {
    3600
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_max_interactions() -> usize {
    50_000
}

fn default_monitor_interval_secs() -> u64 {
    60
}

fn default_monitor_failure_threshold() -> u32 {
    3
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            app_name: "Ilm Assistant".to_string(),
            port: 8001,
            storage_path: "./data".to_string(),
            knowledge_path: None,
            sentiment_enabled: true,
            semantic_enabled: true,
            history_limit: default_history_limit(),
            session_idle_ttl_secs: default_session_idle_ttl_secs(),
            max_sessions: default_max_sessions(),
            max_interactions: default_max_interactions(),
            monitor_interval_secs: default_monitor_interval_secs(),
            monitor_failure_threshold: default_monitor_failure_threshold(),
        }
    }
}

impl CoreConfig {
    /// Path of the sled learning database.
    pub fn learning_db_path(&self) -> PathBuf {
        Path::new(&self.storage_path).join("ilm_learning")
    }

    /// Load config from file and environment. Precedence: env `ILM__*` > file
    /// (`ILM_CONFIG` path, else `config/gateway`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path = std::env::var("ILM_CONFIG").unwrap_or_else(|_| "config/gateway".to_string());
        let builder = config::Config::builder()
            .set_default("app_name", "Ilm Assistant")?
            .set_default("port", 8001_i64)?
            .set_default("storage_path", "./data")?
            .set_default("sentiment_enabled", true)?
            .set_default("semantic_enabled", true)?;

        let path = Path::new(&config_path);
        let with_ext = path.with_extension("toml");
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else if with_ext.exists() {
            builder.add_source(config::File::from(with_ext.as_path()))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("ILM").separator("__"))
            .build()?;

        built.try_deserialize()
    }
}
