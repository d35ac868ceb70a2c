//! Server Configuration
//!
//! Read from the environment after `.env` has been loaded.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};

/// Which decision engine drives the conversation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineKind {
    Rules,
    Ollama,
}

impl FromStr for EngineKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rules" | "rule" | "mock" => Ok(Self::Rules),
            "ollama" | "model" => Ok(Self::Ollama),
            other => bail!("DECISION_ENGINE must be 'rules' or 'ollama', got '{other}'"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,

    /// JSON file backing the catalog; `None` serves the sample catalog
    pub catalog_file: Option<PathBuf>,

    /// SQLite database for the catalog. Takes precedence over
    /// `catalog_file`, which then only seeds an empty database.
    pub database_url: Option<String>,

    pub engine: EngineKind,

    /// Remote tool server; `None` invokes tools in-process
    pub tool_server_url: Option<String>,

    pub tool_timeout: Duration,

    pub max_iterations: usize,

    /// Directory of the chat page
    pub static_dir: PathBuf,

    /// Conversations idle this long are forgotten
    pub session_idle_timeout: Duration,

    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            catalog_file: None,
            database_url: None,
            engine: EngineKind::Rules,
            tool_server_url: None,
            tool_timeout: Duration::from_secs(30),
            max_iterations: 10,
            static_dir: PathBuf::from("static"),
            session_idle_timeout: Duration::from_secs(30 * 60),
            max_sessions: 1000,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let seconds = |key: &str, default: Duration| -> anyhow::Result<Duration> {
            match get(key) {
                Some(raw) => Ok(Duration::from_secs(
                    raw.parse()
                        .with_context(|| format!("{key} is not a number of seconds: {raw}"))?,
                )),
                None => Ok(default),
            }
        };
        let tool_timeout = seconds("TOOL_TIMEOUT_SECS", defaults.tool_timeout)?;
        let session_idle_timeout = seconds("SESSION_IDLE_SECS", defaults.session_idle_timeout)?;

        let max_sessions = match get("MAX_SESSIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("MAX_SESSIONS is not a positive integer: {raw}"))?,
            None => defaults.max_sessions,
        };
        if max_sessions == 0 {
            bail!("MAX_SESSIONS must be at least 1");
        }

        let max_iterations = match get("MAX_ITERATIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("MAX_ITERATIONS is not a positive integer: {raw}"))?,
            None => defaults.max_iterations,
        };
        if max_iterations == 0 {
            bail!("MAX_ITERATIONS must be at least 1");
        }

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            catalog_file: get("CATALOG_FILE").map(PathBuf::from),
            database_url: get("DATABASE_URL"),
            engine: get("DECISION_ENGINE")
                .map(|raw| raw.parse())
                .transpose()?
                .unwrap_or(defaults.engine),
            tool_server_url: get("TOOL_SERVER_URL"),
            tool_timeout,
            max_iterations,
            static_dir: get("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
            session_idle_timeout,
            max_sessions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.engine, EngineKind::Rules);
        assert!(config.catalog_file.is_none());
        assert!(config.database_url.is_none());
        assert!(config.tool_server_url.is_none());
        assert_eq!(config.tool_timeout, Duration::from_secs(30));
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.session_idle_timeout, Duration::from_secs(1800));
        assert_eq!(config.max_sessions, 1000);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("CATALOG_FILE", "products.json"),
            ("DATABASE_URL", "sqlite://products.db"),
            ("DECISION_ENGINE", "Ollama"),
            ("TOOL_SERVER_URL", "http://tools:3000"),
            ("TOOL_TIMEOUT_SECS", "5"),
            ("MAX_ITERATIONS", "3"),
            ("SESSION_IDLE_SECS", "60"),
            ("MAX_SESSIONS", "50"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.catalog_file, Some(PathBuf::from("products.json")));
        assert_eq!(config.database_url.as_deref(), Some("sqlite://products.db"));
        assert_eq!(config.engine, EngineKind::Ollama);
        assert_eq!(config.tool_server_url.as_deref(), Some("http://tools:3000"));
        assert_eq!(config.tool_timeout, Duration::from_secs(5));
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.session_idle_timeout, Duration::from_secs(60));
        assert_eq!(config.max_sessions, 50);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config_from(&[("CATALOG_FILE", "  "), ("TOOL_SERVER_URL", "")]).unwrap();
        assert!(config.catalog_file.is_none());
        assert!(config.tool_server_url.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("DECISION_ENGINE", "gpt")]).is_err());
        assert!(config_from(&[("TOOL_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_from(&[("MAX_ITERATIONS", "0")]).is_err());
        assert!(config_from(&[("SESSION_IDLE_SECS", "-1")]).is_err());
        assert!(config_from(&[("MAX_SESSIONS", "0")]).is_err());
    }
}
