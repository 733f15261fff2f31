//! Persistence of the reading session under a single storage key.
//!
//! The file backend keeps one JSON record per key under `.cache/`, using a
//! hash of the key as the directory name to avoid filesystem issues. Reads are
//! tolerant: anything that is not a JSON object counts as "no saved session",
//! and each field of an object is validated on its own, falling back to its
//! default when missing or out of range.

use crate::session::{DEFAULT_FONT_SIZE, MAX_FONT_SIZE, MIN_FONT_SIZE, sanitize_font_size};
use crate::theme::ThemeId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, warn};

pub const CACHE_DIR: &str = ".cache";
pub const DEFAULT_STORAGE_KEY: &str = "biblicalFinance_progress";
const PROGRESS_FILE: &str = "progress.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to create {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Raw access to the single record behind a storage key.
pub trait SessionStore {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn save(&self, contents: &str) -> Result<(), StorageError>;
}

/// Session record as written to storage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub chapter_index: usize,
    pub scroll_top: f32,
    pub theme: ThemeId,
    pub font_size: u32,
}

impl Default for PersistedSession {
    fn default() -> Self {
        Self {
            chapter_index: 0,
            scroll_top: 0.0,
            theme: ThemeId::default(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl PersistedSession {
    /// Validate a loaded JSON value field by field. Returns `None` only when
    /// the value is not an object at all.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        let raw = RawSession::deserialize(value).ok()?;
        let defaults = Self::default();

        let chapter_index = raw
            .chapter_index
            .and_then(as_whole_number)
            .map(|n| n as usize)
            .unwrap_or(defaults.chapter_index);
        let scroll_top = raw
            .scroll_top
            .filter(|v| v.is_finite() && *v >= 0.0 && *v <= f32::MAX as f64)
            .map(|v| v as f32)
            .unwrap_or(defaults.scroll_top);
        let font_size = raw
            .font_size
            .and_then(as_whole_number)
            .filter(|n| (MIN_FONT_SIZE as u64..=MAX_FONT_SIZE as u64).contains(n))
            .map(|n| sanitize_font_size(n as u32))
            .unwrap_or(defaults.font_size);

        Some(Self {
            chapter_index,
            scroll_top,
            theme: raw.theme.unwrap_or(defaults.theme),
            font_size,
        })
    }

    pub fn parse(contents: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(contents).ok()?;
        Self::from_value(&value)
    }
}

/// Stored record before range checks. A field of the wrong type reads as
/// absent instead of failing the whole record.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSession {
    #[serde(default, deserialize_with = "lenient")]
    chapter_index: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    scroll_top: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    theme: Option<ThemeId>,
    #[serde(default, deserialize_with = "lenient")]
    font_size: Option<f64>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

fn as_whole_number(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64)
        .then_some(value as u64)
}

/// Typed load/save on top of a raw store. Failures are logged and swallowed.
#[derive(Debug)]
pub struct SessionPersistence<S> {
    store: S,
}

impl<S: SessionStore> SessionPersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load(&self) -> Option<PersistedSession> {
        let contents = match self.store.load() {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                debug!("No saved reading session");
                return None;
            }
            Err(err) => {
                warn!("Could not read saved reading session: {err}");
                return None;
            }
        };
        match PersistedSession::parse(&contents) {
            Some(session) => {
                debug!(
                    chapter = session.chapter_index,
                    scroll_top = session.scroll_top,
                    theme = %session.theme,
                    font_size = session.font_size,
                    "Loaded saved reading session"
                );
                Some(session)
            }
            None => {
                warn!(
                    bytes = contents.len(),
                    "Ignoring malformed saved reading session"
                );
                None
            }
        }
    }

    /// Write the session; returns whether the write went through.
    pub fn save(&self, session: &PersistedSession) -> bool {
        let contents = match serde_json::to_string(session) {
            Ok(contents) => contents,
            Err(err) => {
                warn!("Could not serialize reading session: {err}");
                return false;
            }
        };
        match self.store.save(&contents) {
            Ok(()) => {
                debug!(
                    chapter = session.chapter_index,
                    scroll_top = session.scroll_top,
                    "Saved reading session"
                );
                true
            }
            Err(err) => {
                warn!("Dropping reading session write: {err}");
                false
            }
        }
    }
}

/// JSON file under `<cache_dir>/<sha256(key)>/progress.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(cache_dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: hash_dir(cache_dir.as_ref(), key).join(PROGRESS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, contents: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, contents).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

pub fn hash_dir(cache_dir: &Path, key: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    cache_dir.join(hash)
}

#[derive(Debug, Default)]
struct MemoryRecord {
    contents: Option<String>,
    writes: usize,
    unavailable: bool,
}

/// In-process store. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    record: Rc<RefCell<MemoryRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        let store = Self::default();
        store.record.borrow_mut().contents = Some(contents.into());
        store
    }

    pub fn contents(&self) -> Option<String> {
        self.record.borrow().contents.clone()
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.record.borrow().writes
    }

    /// Make every following read and write fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.record.borrow_mut().unavailable = unavailable;
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let record = self.record.borrow();
        if record.unavailable {
            return Err(StorageError::Unavailable("memory store disabled".into()));
        }
        Ok(record.contents.clone())
    }

    fn save(&self, contents: &str) -> Result<(), StorageError> {
        let mut record = self.record.borrow_mut();
        if record.unavailable {
            return Err(StorageError::Unavailable("memory store disabled".into()));
        }
        record.contents = Some(contents.to_string());
        record.writes += 1;
        Ok(())
    }
}
