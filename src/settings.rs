use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregate::{BucketPolicy, Granularity};
use crate::derive::RollingWindows;
use crate::error::{Result, SalesError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_path")]
    pub data_path: String,
    /// Stores shown in the store-performance view, in display order.
    #[serde(default = "default_stores")]
    pub stores: Vec<String>,
    #[serde(default)]
    pub rolling_windows: RollingWindows,
    #[serde(default)]
    pub bucket_policy: BucketPolicy,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_granularity")]
    pub default_granularity: Granularity,
}

fn default_data_path() -> String {
    "./CoffeeShopSales.csv".to_string()
}

fn default_stores() -> Vec<String> {
    vec![
        "Lower Manhattan".to_string(),
        "Hell's Kitchen".to_string(),
        "Astoria".to_string(),
    ]
}

fn default_top_n() -> usize {
    5
}

fn default_granularity() -> Granularity {
    Granularity::Monthly
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            stores: default_stores(),
            rolling_windows: RollingWindows::default(),
            bucket_policy: BucketPolicy::default(),
            top_n: default_top_n(),
            default_granularity: default_granularity(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("salesboard")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Name the first top-level field that fails to deserialize on its own.
fn offending_field(content: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(content).ok()?;
    value.as_object()?.iter().find_map(|(key, v)| {
        let mut single = serde_json::Map::new();
        single.insert(key.clone(), v.clone());
        serde_json::from_value::<Settings>(serde_json::Value::Object(single))
            .err()
            .map(|_| key.clone())
    })
}

/// Read settings from `path`. A missing file yields defaults; a file that
/// exists but does not parse or validate is an error.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content).map_err(|e| {
        let field = offending_field(&content)
            .map(|f| format!(" in field '{f}'"))
            .unwrap_or_default();
        SalesError::Settings(format!("{}{field}: {e}", path.display()))
    })?;
    settings
        .rolling_windows
        .validate()
        .map_err(|e| SalesError::Settings(format!("{}: {e}", path.display())))?;
    Ok(settings)
}

pub fn load_settings() -> Result<Settings> {
    load_settings_from(&settings_path())
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    settings.rolling_windows.validate()?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SalesError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
