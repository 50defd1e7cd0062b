use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::context::{Context, TargetInfo, TaskInfo, VirtualAddressRecord, DEFAULT_DOWNLOAD_DIR};
use crate::error::ScriptError;

/// Operation settings, read from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub target_version: String,
    /// Empty means a generated id.
    pub task_id: String,
    pub download_dir: String,
    /// JSON cache of device virtual addresses, relative to the working directory.
    pub virtual_addresses: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_version: "17.1.0".to_string(),
            task_id: String::new(),
            download_dir: DEFAULT_DOWNLOAD_DIR.to_string(),
            virtual_addresses: None,
        }
    }
}

/// Errors returned when loading settings or the address cache.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("failed to parse virtual address cache {path}: {source}")]
    Cache {
        path: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Target(#[from] ScriptError),
}

/// Load settings from a TOML file; missing keys take their defaults.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let raw = read(path)?;
    parse_settings(&raw, path.display().to_string())
}

/// Built-in settings.
pub fn default_settings() -> Settings {
    let embedded = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/settings/default.toml"));
    parse_settings(embedded, "embedded settings".to_string()).unwrap_or_default()
}

fn parse_settings(raw: &str, path: String) -> Result<Settings, SettingsError> {
    toml::from_str(raw).map_err(|source| SettingsError::Parse { path, source })
}

/// Load a JSON array of virtual address records.
pub fn load_virtual_addresses(path: &Path) -> Result<Vec<VirtualAddressRecord>, SettingsError> {
    let raw = read(path)?;
    serde_json::from_str(&raw).map_err(|source| SettingsError::Cache {
        path: path.display().to_string(),
        source,
    })
}

fn read(path: &Path) -> Result<String, SettingsError> {
    fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })
}

impl Settings {
    /// Context for one operation under these settings.
    pub fn build_context(&self) -> Result<Context, SettingsError> {
        let target = TargetInfo::parse(&self.target_version)?;
        let task = if self.task_id.trim().is_empty() {
            TaskInfo::generated()
        } else {
            TaskInfo::new(self.task_id.trim())
        };
        let mut context = Context::new(task, target);
        context.download_dir = self.download_dir.clone();
        if let Some(path) = &self.virtual_addresses {
            context = context.with_virtual_addresses(load_virtual_addresses(path)?);
        }
        Ok(context)
    }
}
