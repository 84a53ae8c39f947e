//! Configuration management for um32.
//!
//! Configuration is loaded from multiple sources in priority order:
//! 1. Environment variables (`UM32_TRACE`, `UM32_MAX_INSTRUCTIONS`, `UM32_ALLOCATION`)
//! 2. Project-local config file (`./um32.toml`)
//! 3. User config file (`~/.config/um32/config.toml`)
//! 4. Built-in defaults
//!
//! Command-line flags take precedence over all of these; that layering
//! happens in the binary.
//!
//! # Config File Format
//!
//! ```toml
//! # um32.toml
//!
//! # Write an instruction trace to stderr
//! trace = false
//!
//! # Stop after this many instructions
//! max_instructions = 1000000000
//!
//! # Array id reuse: "reuse" or "monotonic"
//! allocation = "reuse"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::device::AllocationPolicy;

/// Global cached configuration.
static CONFIG: OnceLock<Config> = OnceLock::new();

/// um32 configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Write an instruction trace to stderr.
    pub trace: Option<bool>,

    /// Instruction budget. Unlimited when unset.
    pub max_instructions: Option<u64>,

    /// How abandoned array ids are handed out again.
    pub allocation: Option<AllocationPolicy>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Project-local `um32.toml`
    /// 3. User config `~/.config/um32/config.toml`
    /// 4. Defaults
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(user_config) = Self::user_config_path().and_then(|p| Self::load_from_file(&p)) {
            config.merge(user_config);
        }

        if let Some(local_config) = Self::load_from_file(Path::new("um32.toml")) {
            config.merge(local_config);
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());

        config
    }

    /// Get the cached global configuration.
    ///
    /// Loads configuration on first call and caches it.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(|| {
            let config = Self::load();
            log::debug!("Loaded configuration: {:?}", config);
            config
        })
    }

    /// Whether tracing is enabled (default off).
    pub fn trace(&self) -> bool {
        self.trace.unwrap_or(false)
    }

    /// Instruction budget, if any.
    pub fn max_instructions(&self) -> Option<u64> {
        self.max_instructions
    }

    /// Allocation policy, defaulting to id reuse.
    pub fn allocation(&self) -> AllocationPolicy {
        self.allocation.unwrap_or_default()
    }

    /// Load configuration from a specific file.
    ///
    /// A missing file is silently skipped; an unreadable or malformed one is
    /// skipped with a warning.
    pub fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Merge another config into this one.
    /// Only overrides fields that are Some in the other config.
    pub fn merge(&mut self, other: Self) {
        if other.trace.is_some() {
            self.trace = other.trace;
        }
        if other.max_instructions.is_some() {
            self.max_instructions = other.max_instructions;
        }
        if other.allocation.is_some() {
            self.allocation = other.allocation;
        }
    }

    /// Apply environment variable overrides read through `lookup`.
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("UM32_TRACE") {
            match parse_flag(&value) {
                Some(trace) => self.trace = Some(trace),
                None => log::warn!("Ignoring UM32_TRACE={}: expected a boolean", value),
            }
        }
        if let Some(value) = lookup("UM32_MAX_INSTRUCTIONS") {
            match value.trim().parse::<u64>() {
                Ok(limit) => {
                    log::info!("Using UM32_MAX_INSTRUCTIONS from environment: {}", limit);
                    self.max_instructions = Some(limit);
                }
                Err(e) => log::warn!("Ignoring UM32_MAX_INSTRUCTIONS={}: {}", value, e),
            }
        }
        if let Some(value) = lookup("UM32_ALLOCATION") {
            match value.parse::<AllocationPolicy>() {
                Ok(policy) => {
                    log::info!("Using UM32_ALLOCATION from environment: {:?}", policy);
                    self.allocation = Some(policy);
                }
                Err(e) => log::warn!("Ignoring UM32_ALLOCATION: {}", e),
            }
        }
    }

    /// Get the path to the user config file (for display/creation).
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("um32").join("config.toml"))
    }

    /// Generate a sample config file content.
    pub fn sample_config() -> String {
        r#"# um32 configuration
# Place this file at ~/.config/um32/config.toml or ./um32.toml

# Write a per-instruction trace to stderr
# trace = true

# Stop after this many instructions (exit status 3)
# max_instructions = 1000000000

# Array id reuse: "reuse" hands abandoned ids out again, "monotonic" never does
allocation = "reuse"
"#
        .to_string()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
