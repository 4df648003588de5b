//! Configuration loading and root folder resolution
//!
//! Root folder priority:
//! 1. Command-line argument (highest priority)
//! 2. `RDESK_ROOT_FOLDER` environment variable
//! 3. `root_folder` in the TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal: a warning is logged and
//! compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "RDESK_ROOT_FOLDER";
/// Environment variable pointing at an explicit TOML file
pub const CONFIG_FILE_ENV: &str = "RDESK_CONFIG";
/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "rdesk.db";
/// Upload directory name inside the root folder
pub const UPLOADS_DIR: &str = "uploads";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5780";
pub const DEFAULT_MUSICBRAINZ_URL: &str = "https://musicbrainz.org/ws/2";
pub const DEFAULT_USER_AGENT: &str = "ReleaseDesk/0.1.0 (support@releasedesk.example)";
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 2000;
pub const DEFAULT_LOOKUP_DEBOUNCE_MS: u64 = 1000;

/// What happens to a release submitted for review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalMode {
    /// Stays `pending_review` until an admin acts
    #[default]
    Manual,
    /// Promoted straight to `published`
    Auto,
}

impl std::str::FromStr for ApprovalMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(ApprovalMode::Manual),
            "auto" | "automatic" => Ok(ApprovalMode::Auto),
            other => Err(Error::Config(format!("unknown approval mode: {other}"))),
        }
    }
}

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Lookup (MusicBrainz) section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Requests per second allowed against the lookup service
    pub rate_per_second: u32,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MUSICBRAINZ_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            rate_per_second: 1,
        }
    }
}

/// Contents of `rdesk.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_addr: String,
    pub approval_mode: ApprovalMode,
    /// Public URL prefix uploaded files are served under
    pub uploads_url_prefix: String,
    pub autosave_debounce_ms: u64,
    pub lookup_debounce_ms: u64,
    pub logging: LoggingConfig,
    pub lookup: LookupConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            approval_mode: ApprovalMode::Manual,
            uploads_url_prefix: "/uploads".to_string(),
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            lookup_debounce_ms: DEFAULT_LOOKUP_DEBOUNCE_MS,
            logging: LoggingConfig::default(),
            lookup: LookupConfig::default(),
        }
    }
}

/// Platform defaults compiled into the binary
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("rdesk"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\rdesk"))
        } else if cfg!(target_os = "macos") {
            dirs::data_dir()
                .map(|d| d.join("rdesk"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/rdesk"))
        } else {
            dirs::data_local_dir()
                .map(|d| d.join("rdesk"))
                .unwrap_or_else(|| PathBuf::from("/var/lib/rdesk"))
        };

        Self {
            root_folder,
            log_level: "info".to_string(),
        }
    }
}

/// Candidate config file locations, most specific first
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        candidates.push(PathBuf::from(path));
    }
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("rdesk").join("rdesk.toml"));
    }
    if cfg!(unix) {
        candidates.push(PathBuf::from("/etc/rdesk/rdesk.toml"));
    }
    candidates
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// First readable config file, or defaults
pub fn load_config() -> TomlConfig {
    for candidate in config_file_candidates() {
        if !candidate.exists() {
            continue;
        }
        match load_toml_config(&candidate) {
            Ok(config) => {
                info!("Loaded configuration from {}", candidate.display());
                return config;
            }
            Err(e) => warn!("Ignoring config file: {}", e),
        }
    }
    warn!("No configuration file found, using compiled defaults");
    TomlConfig::default()
}

/// Write a config file atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}

/// Resolves the root folder for a component
pub struct RootFolderResolver {
    component: String,
    cli_arg: Option<PathBuf>,
    toml: Option<TomlConfig>,
}

impl RootFolderResolver {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            cli_arg: None,
            toml: None,
        }
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml(mut self, config: TomlConfig) -> Self {
        self.toml = Some(config);
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("[{}] root folder from command line: {}", self.component, path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("[{}] root folder from {}: {}", self.component, ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = self.toml.as_ref().and_then(|c| c.root_folder.clone()) {
            info!("[{}] root folder from config file: {}", self.component, path.display());
            return path;
        }

        let fallback = CompiledDefaults::for_current_platform().root_folder;
        info!("[{}] root folder default: {}", self.component, fallback.display());
        fallback
    }
}

/// Creates the root folder layout on first run
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

    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.uploads_path())?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn uploads_path(&self) -> PathBuf {
        self.root_folder.join(UPLOADS_DIR)
    }
}
