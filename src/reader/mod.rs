//! Reader controller.
//!
//! Owns the reading session for the lifetime of one reader view. On mount it
//! loads the saved session and stays in `Restoring` until the delayed scroll
//! restore fires; only then may saves happen, so a half-restored state never
//! overwrites good data. In `Active`, every qualifying change pushes the save
//! deadline back, and closing (or dropping) the controller flushes.
//!
//! Time is passed in by the host, which keeps the timers deterministic.

mod messages;
mod update;
mod view;

pub use messages::{Effect, ReaderMessage};
pub use view::{ChapterListEntry, ReaderPhase, ReaderSnapshot};

use crate::cache::{PersistedSession, SessionPersistence, SessionStore};
use crate::cancellation::CancellationToken;
use crate::classifier::Classifier;
use crate::config::AppConfig;
use crate::content::Book;
use crate::debounce::Debouncer;
use crate::session::{DEFAULT_FONT_SIZE, ReadingSession};
use crate::theme::ThemeId;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Reader defaults and timings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReaderOptions {
    pub default_theme: ThemeId,
    pub default_font_size: u32,
    pub save_debounce: Duration,
    pub restore_delay: Duration,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            default_theme: ThemeId::Dark,
            default_font_size: DEFAULT_FONT_SIZE,
            save_debounce: Duration::from_millis(500),
            restore_delay: Duration::from_millis(100),
        }
    }
}

impl From<&AppConfig> for ReaderOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            default_theme: config.default_theme,
            default_font_size: config.default_font_size,
            save_debounce: config.save_debounce(),
            restore_delay: config.restore_delay(),
        }
    }
}

/// Scroll offset waiting for the first layout.
#[derive(Debug, Clone)]
struct PendingRestore {
    scroll_top: f32,
    due: Instant,
    token: CancellationToken,
}

#[derive(Debug, Clone)]
enum Phase {
    Restoring(PendingRestore),
    Active,
    Closed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Overlays {
    chapter_list_open: bool,
    settings_open: bool,
}

pub struct ReaderController<S: SessionStore> {
    book: Arc<Book>,
    classifier: Classifier,
    session: ReadingSession,
    phase: Phase,
    overlays: Overlays,
    persistence: SessionPersistence<S>,
    debouncer: Debouncer,
}

impl<S: SessionStore> ReaderController<S> {
    /// Open the reader: adopt the saved session (if any) and enter
    /// `Restoring`, or go straight to `Active` when there is nothing to
    /// restore.
    pub fn mount(book: Arc<Book>, store: S, options: ReaderOptions, now: Instant) -> Self {
        let persistence = SessionPersistence::new(store);
        let mut session = ReadingSession::new(
            book.len(),
            options.default_theme,
            options.default_font_size,
        );

        let phase = match persistence.load() {
            Some(saved) => {
                session.set_chapter_clamped(saved.chapter_index);
                session.set_theme(saved.theme);
                session.set_font_size(saved.font_size);
                info!(
                    chapter = session.chapter_index(),
                    scroll_top = saved.scroll_top,
                    theme = %session.theme(),
                    font_size = session.font_size(),
                    "Restoring reading session"
                );
                Phase::Restoring(PendingRestore {
                    scroll_top: saved.scroll_top,
                    due: now + options.restore_delay,
                    token: CancellationToken::new(),
                })
            }
            None => {
                info!("Starting a fresh reading session");
                Phase::Active
            }
        };

        Self {
            book,
            classifier: Classifier::default(),
            session,
            phase,
            overlays: Overlays::default(),
            persistence,
            debouncer: Debouncer::new(options.save_debounce),
        }
    }

    /// Swap the paragraph rules used for rendering.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn session(&self) -> &ReadingSession {
        &self.session
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    pub fn phase(&self) -> ReaderPhase {
        match self.phase {
            Phase::Restoring(_) => ReaderPhase::Restoring,
            Phase::Active => ReaderPhase::Active,
            Phase::Closed => ReaderPhase::Closed,
        }
    }

    pub fn is_chapter_list_open(&self) -> bool {
        self.overlays.chapter_list_open
    }

    pub fn is_settings_open(&self) -> bool {
        self.overlays.settings_open
    }

    /// Token guarding the pending restore scroll, for hosts that run their own
    /// layout timer.
    pub fn restore_token(&self) -> Option<CancellationToken> {
        match &self.phase {
            Phase::Restoring(pending) => Some(pending.token.clone()),
            _ => None,
        }
    }

    pub fn has_pending_save(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Earliest instant at which `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let restore = match &self.phase {
            Phase::Restoring(pending) => Some(pending.due),
            _ => None,
        };
        match (restore, self.debouncer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn persisted(&self) -> PersistedSession {
        PersistedSession {
            chapter_index: self.session.chapter_index(),
            scroll_top: self.session.scroll_offset(),
            theme: self.session.theme(),
            font_size: self.session.font_size(),
        }
    }

    fn persist(&self) {
        self.persistence.save(&self.persisted());
    }

    /// Final flush shared by `close` and `Drop`.
    fn teardown(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Closed) {
            Phase::Restoring(pending) => {
                pending.token.cancel();
                debug!("Reader closed before restore finished; keeping saved session");
            }
            Phase::Active => {
                let pending = self.debouncer.take_pending();
                debug!(pending, "Flushing reading session");
                self.persist();
            }
            Phase::Closed => {}
        }
    }
}

impl<S: SessionStore> Drop for ReaderController<S> {
    fn drop(&mut self) {
        if !matches!(self.phase, Phase::Closed) {
            debug!("Reader dropped without close; flushing");
            self.teardown();
        }
    }
}

#[cfg(test)]
mod tests;
