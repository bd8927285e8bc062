//! src/config.rs
//! ============================================================================
//! # Config: Application Configuration Loader and Saver (directories only)
//!
//! Loads and saves settings as TOML from the platform config path using the
//! [`directories`](https://docs.rs/directories) crate. A missing file is
//! created with defaults on first load.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load()?;
//! config.save()?;
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use compact_str::CompactString;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Largest text file the session loads into its buffer (5 MiB).
pub const DEFAULT_MAX_TEXT_BYTES: u64 = 5 * 1024 * 1024;

/// Logging settings consumed by [`crate::logging::Logger`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: CompactString,

    /// Directory for the daily rolling log files
    pub dir: PathBuf,

    pub file_prefix: CompactString,

    /// Mirror events to stderr
    pub stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: CompactString::const_new("info"),
            dir: PathBuf::from("logs"),
            file_prefix: CompactString::const_new("fex"),
            stderr: false,
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ceiling for loading a text file into the edit buffer
    pub max_text_bytes: u64,

    pub show_hidden: bool,

    /// Where the session goes after its current directory is deleted.
    /// Falls back to the process working directory when unset.
    pub fallback_directory: Option<PathBuf>,

    /// Directory opened at startup; none means "no folder opened"
    pub start_directory: Option<PathBuf>,

    pub logging: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
            show_hidden: true,
            fallback_directory: None,
            start_directory: None,
            logging: LogConfig::default(),
        }
    }
}

impl Config {
    /// Loads config from the platform config dir, creating it with defaults
    /// when absent.
    ///
    /// The config is expected at `$XDG_CONFIG_HOME/fex/config.toml`
    /// (Linux), or equivalent on Windows/macOS.
    pub fn load() -> anyhow::Result<Self> {
        let path: PathBuf = Self::config_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save_to(&path)?;

            Ok(default_config)
        }
    }

    /// Loads config from an explicit TOML file.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        info!("Loading config from {}", path.display());

        let text: String = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let cfg: Self = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(cfg)
    }

    /// Saves config to the platform config dir.
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_str: String = toml::to_string_pretty(self)?;
        fs::write(path, toml_str)?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "fex", "fex")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;

        Ok(proj_dirs.config_dir().to_path_buf())
    }
}
