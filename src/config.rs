use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:7777/api/v1";
const DEFAULT_CONFIG_FILE: &str = "wrapnav.yaml";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    // Prefix for /wraps and /resources/{name}
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
    // When set, logs are also written (JSON lines) to <file_dir>/<file_prefix>
    #[serde(default)]
    pub file_dir: Option<PathBuf>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            title: default_title(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_dir: None,
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_title() -> String {
    "Wraps".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "wrapnav.log".to_string()
}

/// Resolves the config file (WRAPNAV_CONFIG, else ./wrapnav.yaml when present,
/// else built-in defaults) and applies environment overrides.
pub fn load_config() -> Result<AppConfig> {
    let mut cfg = if let Ok(path) = std::env::var("WRAPNAV_CONFIG") {
        load_config_from_path(Path::new(&path))?
    } else {
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            load_config_from_path(&local)?
        } else {
            AppConfig::default()
        }
    };
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

pub fn load_config_from_path(path: &Path) -> Result<AppConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("reading config: {path:?}"))?;
    parse_config(&s).with_context(|| format!("parsing config: {path:?}"))
}

pub(crate) fn parse_config(s: &str) -> Result<AppConfig> {
    // An empty file deserializes to unit; treat it as all defaults.
    if s.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let cfg: AppConfig = serde_yaml::from_str(s)?;
    Ok(cfg)
}

pub(crate) fn apply_env_overrides(cfg: &mut AppConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(url) = var("WRAPNAV_BASE_URL").filter(|s| !s.trim().is_empty()) {
        cfg.base_url = url;
    }
    if let Some(level) = var("WRAPNAV_LOG_LEVEL").filter(|s| !s.trim().is_empty()) {
        cfg.logging.level = level;
    }
}

pub(crate) fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}
