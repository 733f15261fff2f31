//! Entry point for the terminal book reader.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml`.
//! - Load the book content.
//! - Mount the reader over the file-backed session store and hand it to the
//!   terminal loop.

mod terminal;

use anyhow::{Context, Result, anyhow};
use bookreader::cache::FileSessionStore;
use bookreader::config::load_config;
use bookreader::content::load_book;
use bookreader::reader::{ReaderController, ReaderOptions};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let book_path = parse_args()?;
    let config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %book_path.display(),
        level = %config.log_level,
        "Starting book reader"
    );

    let book = load_book(&book_path)?;
    let store = FileSessionStore::new(&config.cache_dir, &config.storage_key);
    info!(
        path = %store.path().display(),
        key = %config.storage_key,
        debounce_ms = config.save_debounce_ms,
        restore_delay_ms = config.restore_delay_ms,
        "Active session storage"
    );

    let reader = ReaderController::mount(
        Arc::new(book),
        store,
        ReaderOptions::from(&config),
        Instant::now(),
    );
    terminal::run(reader, config.viewport_lines).context("Terminal reader failed")?;
    Ok(())
}

fn parse_args() -> Result<PathBuf> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow!("Usage: bookreader <path-to-book.toml>"))?;

    let path = PathBuf::from(path);
    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.as_path().display()));
    }
    Ok(path)
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
