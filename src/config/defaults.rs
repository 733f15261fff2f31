use crate::theme::ThemeId;

pub(crate) fn default_theme() -> ThemeId {
    ThemeId::Dark
}

pub(crate) fn default_font_size() -> u32 {
    crate::session::DEFAULT_FONT_SIZE
}

pub(crate) fn default_restore_delay_ms() -> u64 {
    100
}

pub(crate) fn default_cache_dir() -> String {
    crate::cache::CACHE_DIR.to_string()
}

pub(crate) fn default_storage_key() -> String {
    crate::cache::DEFAULT_STORAGE_KEY.to_string()
}

pub(crate) fn default_save_debounce_ms() -> u64 {
    500
}

pub(crate) fn default_viewport_lines() -> usize {
    24
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}
