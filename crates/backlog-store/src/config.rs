//! Configuration loading and collaborator factories.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use backlog_core::model::Questionnaire;
use backlog_core::parser::parse_questionnaire;
use backlog_core::service::RateLimits;
use backlog_core::traits::{RateLimitPolicy, RateLimiter, RequestStore};

use crate::json_file::JsonFileStore;
use crate::memory::MemoryStore;
use crate::rate_limit::{FileRateLimiter, FixedWindowLimiter};

/// Which backend persists requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Memory,
    Json {
        #[serde(default = "default_store_path")]
        path: PathBuf,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Json {
            path: default_store_path(),
        }
    }
}

/// Counter file placed beside a JSON store when no `state_path` is set.
const RATE_LIMIT_STATE_FILE: &str = "rate-limits.json";

fn default_store_path() -> PathBuf {
    PathBuf::from("./backlog-data/requests.json")
}

/// Optional rate-limit rules; an absent rule means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Applies to every operation.
    #[serde(default)]
    pub general: Option<RateLimitPolicy>,
    /// Applies to create, update and delete.
    #[serde(default)]
    pub write: Option<RateLimitPolicy>,
    /// JSON file holding the counters. Defaults to `rate-limits.json` next to
    /// a JSON store; without one, counters live in process memory.
    #[serde(default)]
    pub state_path: Option<PathBuf>,
}

/// Top-level backlog configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogConfig {
    /// Questionnaire TOML file; the built-in questionnaire when absent.
    #[serde(default)]
    pub questionnaire: Option<PathBuf>,
    /// Request persistence.
    #[serde(default)]
    pub store: StoreConfig,
    /// Rate-limit rules.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Expand env vars in `path` and anchor it at `base` if it is relative.
fn resolve_path(path: &Path, base: Option<&Path>) -> PathBuf {
    let expanded = PathBuf::from(resolve_env_vars(&path.to_string_lossy()));
    match base {
        Some(base) if expanded.is_relative() => base.join(expanded),
        _ => expanded,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `backlog.toml` in the current directory
/// 2. `~/.config/backlog/config.toml`
///
/// Environment variable override: `BACKLOG_STORE_PATH` switches to a JSON
/// store at that path.
pub fn load_config() -> Result<BacklogConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
///
/// Relative paths inside a config file are resolved against the file's
/// directory.
pub fn load_config_from(path: Option<&Path>) -> Result<BacklogConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("backlog.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<BacklogConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => BacklogConfig::default(),
    };

    let base = config_path
        .as_deref()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty());

    config.questionnaire = config
        .questionnaire
        .as_deref()
        .map(|p| resolve_path(p, base));
    if let StoreConfig::Json { path } = &mut config.store {
        *path = resolve_path(path, base);
    }

    config.rate_limit.state_path = config
        .rate_limit
        .state_path
        .as_deref()
        .map(|p| resolve_path(p, base));

    // Apply env var overrides
    if let Ok(store_path) = std::env::var("BACKLOG_STORE_PATH") {
        config.store = StoreConfig::Json {
            path: PathBuf::from(store_path),
        };
    }

    if config.rate_limit.state_path.is_none() {
        if let StoreConfig::Json { path } = &config.store {
            config.rate_limit.state_path = Some(path.with_file_name(RATE_LIMIT_STATE_FILE));
        }
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("backlog"))
}

/// Create a store instance from its configuration.
pub fn create_store(config: &StoreConfig) -> Arc<dyn RequestStore> {
    match config {
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
        StoreConfig::Json { path } => Arc::new(JsonFileStore::new(path)),
    }
}

/// Create an in-memory limiter for one policy.
pub fn create_rate_limiter(policy: RateLimitPolicy) -> Arc<dyn RateLimiter> {
    Arc::new(FixedWindowLimiter::new(policy))
}

/// Create the service's rate-limit rules from configuration.
///
/// With a `state_path` every rule counts in that file, so limits hold
/// across processes.
pub fn create_rate_limits(config: &RateLimitConfig) -> RateLimits {
    let build = |policy: RateLimitPolicy| -> Arc<dyn RateLimiter> {
        match &config.state_path {
            Some(path) => Arc::new(FileRateLimiter::new(path, policy)),
            None => create_rate_limiter(policy),
        }
    };
    RateLimits {
        general: config.general.map(build),
        write: config.write.map(build),
    }
}

/// The configured questionnaire, or the built-in one.
pub fn load_questionnaire(config: &BacklogConfig) -> Result<Questionnaire> {
    match &config.questionnaire {
        Some(path) => parse_questionnaire(path),
        None => Ok(Questionnaire::builtin()),
    }
}
