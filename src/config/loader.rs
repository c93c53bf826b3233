//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/todo-list/)
    Project = 1,
    /// User-level config (~/.todo-list/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Where configuration files are looked up.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Single config file that replaces the project and user tiers.
    pub explicit: Option<PathBuf>,
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        let explicit = std::env::var("TODO_LIST_CONFIG_PATH").ok().map(PathBuf::from);

        // User dir: TODO_LIST_USER_DIR or ~/.todo-list
        let user_dir = std::env::var("TODO_LIST_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".todo-list")));

        // Project dir: TODO_LIST_PROJECT_DIR or $CWD/todo-list
        let project_dir = std::env::var("TODO_LIST_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("todo-list")));

        Self {
            explicit,
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            explicit: None,
            project_dir,
            user_dir,
        }
    }

    /// Use a single config file instead of the tiered lookup.
    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }
}

/// Read a tier's `config.yaml`, skipping it with a warning if it is malformed.
fn read_tier(dir: &Path, tier: ConfigTier) -> Option<(Value, PathBuf)> {
    let config_file = dir.join("config.yaml");
    if !config_file.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(&config_file) {
        Ok(content) => content,
        Err(e) => {
            warn!(tier = %tier, path = %config_file.display(), "Failed to read config: {}", e);
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => {
            debug!(tier = %tier, path = %config_file.display(), "Loaded config");
            Some((value, config_file))
        }
        Err(e) => {
            warn!(tier = %tier, path = %config_file.display(), "Ignoring invalid config: {}", e);
            None
        }
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Paths for each tier
    pub paths: ConfigPaths,
    /// Loaded configuration
    config: Config,
    /// Config files that contributed, lowest tier first
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration with explicit paths, reading overrides from the process environment.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with_env(paths, |key| std::env::var(key).ok())
    }

    /// Load configuration with explicit paths and a custom environment lookup.
    pub fn load_with_env<F>(paths: ConfigPaths, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // An explicit file replaces the project and user tiers
        if let Some(ref explicit_path) = paths.explicit {
            let mut config = Config::load(explicit_path)
                .with_context(|| format!("loading config from {}", explicit_path.display()))?;
            apply_env_overrides(&mut config, &env);
            let sources = vec![explicit_path.clone()];
            return Ok(Self {
                paths,
                config,
                sources,
            });
        }

        let mut configs: Vec<Value> = Vec::new();
        let mut sources = Vec::new();

        // Tier 1: Defaults
        configs.push(serde_json::to_value(Config::default())?);

        // Tier 2: Project config
        if let Some((value, path)) = paths
            .project_dir
            .as_deref()
            .and_then(|dir| read_tier(dir, ConfigTier::Project))
        {
            configs.push(value);
            sources.push(path);
        }

        // Tier 3: User config
        if let Some((value, path)) = paths
            .user_dir
            .as_deref()
            .and_then(|dir| read_tier(dir, ConfigTier::User))
        {
            configs.push(value);
            sources.push(path);
        }

        let merged = deep_merge_all(configs);
        let mut config: Config = serde_json::from_value(merged)?;

        // Tier 4: Environment variable overrides
        apply_env_overrides(&mut config, &env);

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were merged, lowest tier first.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

/// Apply environment variable overrides to config.
fn apply_env_overrides<F>(config: &mut Config, env: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = env("PORT") {
        match port.trim().parse() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(tier = %ConfigTier::Environment, "Ignoring invalid PORT value: {}", port),
        }
    }

    if let Some(host) = env("TODO_LIST_HOST") {
        config.server.host = host;
    }

    if let Some(static_dir) = env("TODO_LIST_STATIC_DIR") {
        config.server.static_dir = PathBuf::from(static_dir);
    }

    if let Some(url) = env("TODO_LIST_URL") {
        config.client.base_url = url;
    }
}
