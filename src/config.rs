//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/degreetree/degreetree.toml`
//! 3. Environment variables: `DEGREETREE_*` prefix (`__` separates sections)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

pub const DEFAULT_BASE_URL: &str = "https://sis-tuni.funidata.fi/kori/api";
pub const DEFAULT_UNIVERSITY_ID: &str = "tuni-university-root-id";
pub const DEFAULT_CURRICULUM_PERIOD: &str = "uta-lvv-2021";

/// Kori catalog connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// University whose catalog is queried
    pub university_id: String,
    /// Curriculum period used when listing degree programmes
    pub curriculum_period: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            university_id: DEFAULT_UNIVERSITY_ID.into(),
            curriculum_period: DEFAULT_CURRICULUM_PERIOD.into(),
            request_timeout_secs: 30,
        }
    }
}

/// Raw catalog config for intermediate parsing (`None` = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCatalogConfig {
    pub base_url: Option<String>,
    pub university_id: Option<String>,
    pub curriculum_period: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl CatalogConfig {
    /// Overlay wins where specified, otherwise keep base.
    pub fn merge(&self, overlay: &RawCatalogConfig) -> Self {
        Self {
            base_url: overlay
                .base_url
                .clone()
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| self.base_url.clone()),
            university_id: overlay
                .university_id
                .clone()
                .unwrap_or_else(|| self.university_id.clone()),
            curriculum_period: overlay
                .curriculum_period
                .clone()
                .unwrap_or_else(|| self.curriculum_period.clone()),
            request_timeout_secs: overlay
                .request_timeout_secs
                .unwrap_or(self.request_timeout_secs),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub students_dir: Option<PathBuf>,
    pub fetch_threads: Option<usize>,
    #[serde(default)]
    pub catalog: RawCatalogConfig,
}

/// Unified configuration for degreetree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding one JSON file per student
    pub students_dir: PathBuf,
    /// Worker threads for tree fetching (0 = one per CPU)
    pub fetch_threads: usize,
    /// Catalog connection settings
    pub catalog: CatalogConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            students_dir: default_students_dir(),
            fetch_threads: 0,
            catalog: CatalogConfig::default(),
        }
    }
}

/// Default student directory (XDG data dir, or ./students).
fn default_students_dir() -> PathBuf {
    ProjectDirs::from("", "", "degreetree")
        .map(|dirs| dirs.data_dir().join("students"))
        .unwrap_or_else(|| PathBuf::from("students"))
}

/// Get the XDG config directory for degreetree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "degreetree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("degreetree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand shell variables and tilde in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.students_dir.to_string_lossy().as_ref());
        self.students_dir = PathBuf::from(expanded);
    }

    /// Merge overlay config onto self (base): overlay wins if specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            students_dir: overlay
                .students_dir
                .clone()
                .unwrap_or_else(|| self.students_dir.clone()),
            fetch_threads: overlay.fetch_threads.unwrap_or(self.fetch_threads),
            catalog: self.catalog.merge(&overlay.catalog),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file replacing the global one
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global (or explicitly given) config file
        let file = config_file
            .map(Path::to_path_buf)
            .or_else(global_config_path);
        if let Some(path) = file {
            if path.exists() {
                let raw = load_raw_settings(&path)?;
                current = current.merge_with(&raw);
            } else if config_file.is_some() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
        }

        // 3. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply DEGREETREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder =
            Config::builder().add_source(Environment::with_prefix("DEGREETREE").separator("__"));

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("students_dir") {
            settings.students_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get::<usize>("fetch_threads") {
            settings.fetch_threads = val;
        }
        if let Ok(val) = config.get_string("catalog.base_url") {
            settings.catalog.base_url = val.trim_end_matches('/').to_string();
        }
        if let Ok(val) = config.get_string("catalog.university_id") {
            settings.catalog.university_id = val;
        }
        if let Ok(val) = config.get_string("catalog.curriculum_period") {
            settings.catalog.curriculum_period = val;
        }
        if let Ok(val) = config.get::<u64>("catalog.request_timeout_secs") {
            settings.catalog.request_timeout_secs = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# degreetree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/degreetree/degreetree.toml
#   Env:    DEGREETREE_* environment variables, e.g.
#           DEGREETREE_STUDENTS_DIR, DEGREETREE_CATALOG__BASE_URL

# Directory with one student_<id>.json file per student
# students_dir = "~/.local/share/degreetree/students"

# Worker threads used when fetching programme trees (0 = one per CPU)
# fetch_threads = 0

[catalog]
# Kori API root
# base_url = "https://sis-tuni.funidata.fi/kori/api"

# University whose catalog is queried
# university_id = "tuni-university-root-id"

# Curriculum period for the degree programme listing
# curriculum_period = "uta-lvv-2021"

# Per-request timeout in seconds
# request_timeout_secs = 30
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
