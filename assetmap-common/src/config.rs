//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration only; nothing here changes while a service runs.
//!
//! # Priority order
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`ASSETMAP_ROOT_FOLDER`, then `ASSETMAP_ROOT`)
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is never fatal: services start with compiled defaults
//! and log where their configuration came from.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Primary root folder environment variable
pub const ROOT_FOLDER_ENV: &str = "ASSETMAP_ROOT_FOLDER";

/// Alternative root folder environment variable
pub const ROOT_ENV: &str = "ASSETMAP_ROOT";

/// Where the asset ledger lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Ledger held in process memory only
    Memory,
    /// Ledger mirrored to a JSON file in the root folder
    File,
}

impl FromStr for StorageMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageMode::Memory),
            "file" => Ok(StorageMode::File),
            other => Err(Error::InvalidInput(format!(
                "Unknown storage mode '{}' (expected 'memory' or 'file')",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMode::Memory => write!(f, "memory"),
            StorageMode::File => write!(f, "file"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; unset values fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the ledger file
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// HTTP bind address (IP only)
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Storage backend
    #[serde(default)]
    pub storage: Option<StorageMode>,

    /// Ledger file, absolute or relative to the root folder
    #[serde(default)]
    pub ledger_file: Option<PathBuf>,

    /// Upload request body limit in bytes
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Built-in defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub storage: StorageMode,
    pub ledger_file_name: &'static str,
    pub max_upload_bytes: usize,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            port: 5780,
            bind_address: "127.0.0.1".to_string(),
            storage: StorageMode::File,
            ledger_file_name: "assets.json",
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/assetmap (or /var/lib/assetmap for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("assetmap"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/assetmap"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/assetmap
        dirs::data_dir()
            .map(|d| d.join("assetmap"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/assetmap"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\assetmap
        dirs::data_local_dir()
            .map(|d| d.join("assetmap"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\assetmap"))
    } else {
        PathBuf::from("./assetmap_data")
    }
}

/// Locate the platform config file, if one exists
///
/// Linux checks `~/.config/assetmap/config.toml` then
/// `/etc/assetmap/config.toml`; other platforms only the user config dir.
pub fn discover_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("assetmap").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/assetmap/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
    })?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

/// Where the bootstrap configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// File named on the command line or in the environment
    Explicit(PathBuf),
    /// Platform config file found by [`discover_config_file`]
    Discovered(PathBuf),
    /// Discovered file could not be used
    Ignored { path: PathBuf, reason: String },
    /// No file, compiled defaults only
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit(path) => write!(f, "config file {}", path.display()),
            ConfigSource::Discovered(path) => write!(f, "config file {}", path.display()),
            ConfigSource::Ignored { path, reason } => {
                write!(f, "compiled defaults (ignored {}: {})", path.display(), reason)
            }
            ConfigSource::Defaults => write!(f, "compiled defaults (no config file found)"),
        }
    }
}

/// Bootstrap configuration plus its origin
///
/// Loading happens before the tracing subscriber exists, so the origin is
/// returned for the caller to log instead of being logged here.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    pub source: ConfigSource,
}

/// Load bootstrap configuration
///
/// An explicitly named file must exist and parse. Without one, the platform
/// config file is used when present; a missing or unreadable discovered
/// file degrades to defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        return Ok(LoadedConfig {
            config: read_toml_config(path)?,
            source: ConfigSource::Explicit(path.to_path_buf()),
        });
    }

    let loaded = match discover_config_file() {
        Some(path) => match read_toml_config(&path) {
            Ok(config) => LoadedConfig {
                config,
                source: ConfigSource::Discovered(path),
            },
            Err(e) => LoadedConfig {
                config: TomlConfig::default(),
                source: ConfigSource::Ignored {
                    path,
                    reason: e.to_string(),
                },
            },
        },
        None => LoadedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Defaults,
        },
    };
    Ok(loaded)
}

/// Resolves the root folder following the priority order in the module docs
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            cli_arg: None,
            toml_root: None,
        }
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml_root(mut self, path: Option<PathBuf>) -> Self {
        self.toml_root = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            debug!("{}: root folder from command line", self.module_name);
            return path.clone();
        }

        // Priority 2: Environment variables
        for var in [ROOT_FOLDER_ENV, ROOT_ENV] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    debug!("{}: root folder from {}", self.module_name, var);
                    return PathBuf::from(path);
                }
            }
        }

        // Priority 3: TOML config file
        if let Some(path) = &self.toml_root {
            debug!("{}: root folder from config file", self.module_name);
            return path.clone();
        }

        // Priority 4: OS-dependent compiled default
        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares the resolved root folder for use
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder (and parents) if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            info!("Creating root folder {}", self.root_folder.display());
            std::fs::create_dir_all(&self.root_folder)?;
        } else if !self.root_folder.is_dir() {
            return Err(Error::Config(format!(
                "Root folder is not a directory: {}",
                self.root_folder.display()
            )));
        }
        Ok(())
    }

    /// Ledger file path
    ///
    /// Absolute `configured` paths are used as is; relative ones are taken
    /// from the root folder.
    pub fn ledger_path(&self, configured: Option<&Path>) -> PathBuf {
        match configured {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.root_folder.join(path),
            None => self
                .root_folder
                .join(CompiledDefaults::for_current_platform().ledger_file_name),
        }
    }
}
