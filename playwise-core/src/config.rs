//! Configuration loading and data folder resolution
//!
//! Config file lookup follows the priority order:
//! 1. Command-line argument (highest priority)
//! 2. `PLAYWISE_CONFIG` environment variable
//! 3. `<config dir>/playwise/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is not an error: a warning is logged and the compiled
//! defaults are used. A file that exists but does not parse is an error.

use crate::error::{Error, Result};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::playlist::DEFAULT_PLAYLIST_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "PLAYWISE_CONFIG";

/// Environment variable naming the data folder
pub const DATA_DIR_ENV_VAR: &str = "PLAYWISE_DATA_DIR";

const APP_DIR: &str = "playwise";
const CONFIG_FILE: &str = "config.toml";

/// Settings read from `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Maximum plays kept for undo
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Name given to the playlist at startup
    #[serde(default = "default_playlist_name")]
    pub playlist_name: String,

    /// Folder for catalog and history snapshots (optional)
    ///
    /// If not specified: environment, then OS default
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_playlist_name() -> String {
    DEFAULT_PLAYLIST_NAME.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            playlist_name: default_playlist_name(),
            data_dir: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(Error::Config("history_capacity must be at least 1".to_string()));
        }
        if self.playlist_name.trim().is_empty() {
            return Err(Error::Config("playlist_name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Where the config came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine,
    Environment,
    UserConfigDir,
    Defaults,
}

/// Platform defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub config_path: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            config_path: dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE)),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// OS-dependent default data folder
fn default_data_dir() -> PathBuf {
    // ~/.local/share/playwise, ~/Library/Application Support/playwise, %LOCALAPPDATA%\playwise
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./playwise_data"))
}

/// Locates and loads the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit path from the command line
    pub fn with_cli_path(mut self, path: Option<PathBuf>) -> Self {
        self.cli_path = path;
        self
    }

    /// Pick the config file to read, without reading it
    pub fn locate(&self) -> Option<(PathBuf, ConfigSource)> {
        if let Some(path) = &self.cli_path {
            return Some((path.clone(), ConfigSource::CommandLine));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some((PathBuf::from(path), ConfigSource::Environment));
            }
        }

        CompiledDefaults::for_current_platform()
            .config_path
            .map(|path| (path, ConfigSource::UserConfigDir))
    }

    /// Load the config, falling back to defaults when the file is missing
    pub fn resolve(&self) -> Result<(TomlConfig, ConfigSource)> {
        let Some((path, source)) = self.locate() else {
            debug!("No config directory on this platform, using defaults");
            return Ok((TomlConfig::default(), ConfigSource::Defaults));
        };

        if !path.exists() {
            // The per-user file is optional; only warn when one was asked for
            if source == ConfigSource::UserConfigDir {
                debug!(path = %path.display(), "No user config file, using defaults");
            } else {
                warn!(path = %path.display(), source = ?source, "Config file not found, using defaults");
            }
            return Ok((TomlConfig::default(), ConfigSource::Defaults));
        }

        let config = TomlConfig::load(&path)?;
        info!(path = %path.display(), source = ?source, "Loaded config file");
        Ok((config, source))
    }
}

/// Data folder: config value, then `PLAYWISE_DATA_DIR`, then the OS default
pub fn resolve_data_dir(config: &TomlConfig) -> PathBuf {
    if let Some(dir) = &config.data_dir {
        return dir.clone();
    }
    if let Ok(dir) = std::env::var(DATA_DIR_ENV_VAR) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    default_data_dir()
}

/// File layout inside the data folder
#[derive(Debug, Clone)]
pub struct DataDirInitializer {
    root: PathBuf,
}

impl DataDirInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join("catalog.txt")
    }

    pub fn history_path(&self) -> PathBuf {
        self.root.join("history.txt")
    }

    /// Text dashboard written alongside the snapshots
    pub fn report_path(&self) -> PathBuf {
        self.root.join("report.txt")
    }

    pub fn catalog_exists(&self) -> bool {
        self.catalog_path().exists()
    }

    pub fn history_exists(&self) -> bool {
        self.history_path().exists()
    }

    /// Create the folder if needed; safe to call repeatedly
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root)?;
            info!(path = %self.root.display(), "Created data folder");
        }
        Ok(())
    }
}
