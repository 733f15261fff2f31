use crate::theme::ThemeId;
use serde::Deserialize;
use std::time::Duration;

/// High-level app configuration; built from the sectioned TOML tables.
#[derive(Debug, Clone, PartialEq, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_theme")]
    pub default_theme: ThemeId,
    #[serde(default = "crate::config::defaults::default_font_size")]
    pub default_font_size: u32,
    #[serde(default = "crate::config::defaults::default_restore_delay_ms")]
    pub restore_delay_ms: u64,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "crate::config::defaults::default_storage_key")]
    pub storage_key: String,
    #[serde(default = "crate::config::defaults::default_save_debounce_ms")]
    pub save_debounce_ms: u64,
    #[serde(default = "crate::config::defaults::default_viewport_lines")]
    pub viewport_lines: usize,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            default_theme: crate::config::defaults::default_theme(),
            default_font_size: crate::config::defaults::default_font_size(),
            restore_delay_ms: crate::config::defaults::default_restore_delay_ms(),
            cache_dir: crate::config::defaults::default_cache_dir(),
            storage_key: crate::config::defaults::default_storage_key(),
            save_debounce_ms: crate::config::defaults::default_save_debounce_ms(),
            viewport_lines: crate::config::defaults::default_viewport_lines(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn restore_delay(&self) -> Duration {
        Duration::from_millis(self.restore_delay_ms)
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
