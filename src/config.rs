use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "COURSED_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_pretty_export")]
    pub pretty_export: bool,
    #[serde(default = "default_max_import_bytes")]
    pub max_import_bytes: u64,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_history_limit() -> usize {
    50
}

fn default_pretty_export() -> bool {
    true
}

fn default_max_import_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            history_limit: default_history_limit(),
            pretty_export: default_pretty_export(),
            max_import_bytes: default_max_import_bytes(),
            log_filter: default_log_filter(),
        }
    }
}

/// `$COURSED_CONFIG`, else `<config dir>/coursed/config.json`.
pub fn get_config_path() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(p));
    }
    dirs::config_dir().map(|mut p| {
        p.push("coursed");
        p.push("config.json");
        p
    })
}

pub fn load_config_from(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.to_string_lossy()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.to_string_lossy()))?;
    if config.max_import_bytes == 0 {
        config.max_import_bytes = default_max_import_bytes();
    }
    if config.log_filter.trim().is_empty() {
        config.log_filter = default_log_filter();
    }
    Ok(config)
}

pub fn load_config() -> anyhow::Result<Config> {
    match get_config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(Config::default()),
    }
}
