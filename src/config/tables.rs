use super::defaults;
use super::models::{AppConfig, LogLevel};
use crate::theme::ThemeId;
use serde::Deserialize;

/// On-disk layout of `conf/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    reader: ReaderConfig,
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    terminal: TerminalConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            default_theme: tables.reader.default_theme,
            default_font_size: tables.reader.default_font_size,
            restore_delay_ms: tables.reader.restore_delay_ms,
            cache_dir: tables.storage.cache_dir,
            storage_key: tables.storage.storage_key,
            save_debounce_ms: tables.storage.save_debounce_ms,
            viewport_lines: tables.terminal.viewport_lines,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            reader: ReaderConfig {
                default_theme: config.default_theme,
                default_font_size: config.default_font_size,
                restore_delay_ms: config.restore_delay_ms,
            },
            storage: StorageConfig {
                cache_dir: config.cache_dir.clone(),
                storage_key: config.storage_key.clone(),
                save_debounce_ms: config.save_debounce_ms,
            },
            terminal: TerminalConfig {
                viewport_lines: config.viewport_lines,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ReaderConfig {
    #[serde(default = "defaults::default_theme")]
    default_theme: ThemeId,
    #[serde(default = "defaults::default_font_size")]
    default_font_size: u32,
    #[serde(default = "defaults::default_restore_delay_ms")]
    restore_delay_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            default_theme: defaults::default_theme(),
            default_font_size: defaults::default_font_size(),
            restore_delay_ms: defaults::default_restore_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct StorageConfig {
    #[serde(default = "defaults::default_cache_dir")]
    cache_dir: String,
    #[serde(default = "defaults::default_storage_key")]
    storage_key: String,
    #[serde(default = "defaults::default_save_debounce_ms")]
    save_debounce_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            cache_dir: defaults::default_cache_dir(),
            storage_key: defaults::default_storage_key(),
            save_debounce_ms: defaults::default_save_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct TerminalConfig {
    #[serde(default = "defaults::default_viewport_lines")]
    viewport_lines: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            viewport_lines: defaults::default_viewport_lines(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}
