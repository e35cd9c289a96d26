//! Configuration loading and root folder resolution
//!
//! Missing or unreadable config files never stop startup: they produce a
//! warning and the compiled defaults are used instead.

use crate::{Error, Result};
use serde::Deserialize;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::warn;
use url::Url;

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "CERTISTORE_ROOT_FOLDER";

/// Environment variable overriding the config file location
pub const CONFIG_FILE_ENV: &str = "CERTISTORE_CONFIG";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "certistore.db";

/// Object storage directory inside the root folder
pub const STORAGE_DIR: &str = "storage";

/// Path files are served under when no `public_base_url` is configured
pub const DEFAULT_FILES_PATH: &str = "/files";

/// Settings read from `config.toml`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_addr: String,
    pub port: u16,
    /// Base URL under which stored files are publicly served; derived from
    /// the listening address when unset
    pub public_base_url: Option<String>,
    pub bucket: String,
    pub max_upload_bytes: usize,
    /// Offset of the display time zone used for monthly buckets
    pub utc_offset_minutes: i32,
    pub log_level: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_addr: "127.0.0.1".to_string(),
            port: 5780,
            public_base_url: None,
            bucket: crate::storage::DEFAULT_BUCKET.to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            utc_offset_minutes: 0,
            log_level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config.toml: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from `path`, falling back to defaults on any problem
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Config file {} not readable ({}); using defaults", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_toml_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("{} in {}; using defaults", e, path.display());
                Self::default()
            }
        }
    }

    /// Public base URL for stored files when serving on `port`
    ///
    /// An explicit `public_base_url` wins. Otherwise the URL points at this
    /// server itself, with unspecified bind addresses mapped to `localhost`.
    pub fn resolved_public_base_url(&self, port: u16) -> String {
        if let Some(url) = &self.public_base_url {
            return url.trim_end_matches('/').to_string();
        }

        let host = match self.bind_addr.parse::<IpAddr>() {
            Ok(ip) if ip.is_unspecified() => "localhost".to_string(),
            Ok(IpAddr::V6(ip)) => format!("[{}]", ip),
            _ => self.bind_addr.clone(),
        };
        format!("http://{}:{}{}", host, port, DEFAULT_FILES_PATH)
    }

    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.public_base_url {
            let parsed = Url::parse(url)
                .map_err(|e| Error::Config(format!("Invalid public_base_url {:?}: {}", url, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "public_base_url must be http or https: {}",
                    url
                )));
            }
        }
        if self.bucket.is_empty() || self.bucket.contains('/') {
            return Err(Error::Config(format!("Invalid bucket name: {:?}", self.bucket)));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::Config("max_upload_bytes must be positive".to_string()));
        }
        // chrono accepts offsets strictly within one day
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(Error::Config(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }
}

/// Locate the config file: explicit path, then `CERTISTORE_CONFIG`, then the
/// platform config directory (`~/.config/certistore/config.toml` on Linux)
pub fn config_file_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|d| d.join("certistore").join("config.toml"))
        .filter(|p| p.exists())
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("certistore"))
        .unwrap_or_else(|| PathBuf::from("./certistore_data"))
}

/// Creates the root folder layout and derives paths inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder and storage directory if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(self.storage_path())?;
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn storage_path(&self) -> PathBuf {
        self.root_folder.join(STORAGE_DIR)
    }
}
