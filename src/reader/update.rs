use super::messages::{Effect, ReaderMessage};
use super::{Phase, ReaderController};
use crate::cache::SessionStore;
use crate::session::ScrollMetrics;
use crate::theme::ThemeId;
use std::time::Instant;
use tracing::{debug, info};

impl<S: SessionStore> ReaderController<S> {
    pub fn update(&mut self, message: ReaderMessage, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();

        if matches!(self.phase, Phase::Closed) {
            debug!(?message, "Ignoring message for closed reader");
            return effects;
        }

        match message {
            ReaderMessage::GoToChapter(index) => self.handle_go_to_chapter(index, now, &mut effects),
            ReaderMessage::NextChapter => {
                if self.session.has_next() {
                    let target = self.session.chapter_index() + 1;
                    self.handle_go_to_chapter(target, now, &mut effects);
                }
            }
            ReaderMessage::PreviousChapter => {
                if self.session.has_previous() {
                    let target = self.session.chapter_index() - 1;
                    self.handle_go_to_chapter(target, now, &mut effects);
                }
            }
            ReaderMessage::Scrolled {
                offset,
                scroll_height,
                client_height,
            } => self.handle_scrolled(
                ScrollMetrics::new(offset, scroll_height, client_height),
                now,
            ),
            ReaderMessage::SetTheme(theme) => self.handle_set_theme(theme, now),
            ReaderMessage::IncreaseFont => {
                self.session.increase_font();
                debug!(font_size = self.session.font_size(), "Font size increased");
                self.schedule_save(now);
            }
            ReaderMessage::DecreaseFont => {
                self.session.decrease_font();
                debug!(font_size = self.session.font_size(), "Font size decreased");
                self.schedule_save(now);
            }
            ReaderMessage::ToggleChapterList => {
                self.overlays.chapter_list_open = !self.overlays.chapter_list_open;
            }
            ReaderMessage::CloseChapterList => self.overlays.chapter_list_open = false,
            ReaderMessage::ToggleSettings => {
                self.overlays.settings_open = !self.overlays.settings_open;
            }
            ReaderMessage::Tick => self.handle_tick(now, &mut effects),
            ReaderMessage::Close => {
                self.teardown();
                info!("Reader closed");
                effects.push(Effect::Close);
            }
        }

        effects
    }

    pub fn go_to_chapter(&mut self, index: usize, now: Instant) -> Vec<Effect> {
        self.update(ReaderMessage::GoToChapter(index), now)
    }

    pub fn set_theme(&mut self, theme: ThemeId, now: Instant) -> Vec<Effect> {
        self.update(ReaderMessage::SetTheme(theme), now)
    }

    pub fn increase_font(&mut self, now: Instant) -> Vec<Effect> {
        self.update(ReaderMessage::IncreaseFont, now)
    }

    pub fn decrease_font(&mut self, now: Instant) -> Vec<Effect> {
        self.update(ReaderMessage::DecreaseFont, now)
    }

    pub fn scrolled(
        &mut self,
        offset: f32,
        scroll_height: f32,
        client_height: f32,
        now: Instant,
    ) -> Vec<Effect> {
        self.update(
            ReaderMessage::Scrolled {
                offset,
                scroll_height,
                client_height,
            },
            now,
        )
    }

    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        self.update(ReaderMessage::Tick, now)
    }

    /// Flush and signal the host to dismiss the reader.
    pub fn close(&mut self) -> Vec<Effect> {
        self.update(ReaderMessage::Close, Instant::now())
    }

    fn handle_go_to_chapter(&mut self, index: usize, now: Instant, effects: &mut Vec<Effect>) {
        if let Phase::Restoring(pending) = &self.phase {
            // the pending offset belongs to the chapter being left
            pending.token.cancel();
            self.phase = Phase::Active;
            debug!("Chapter changed during restore; dropping saved scroll offset");
        }

        self.session.set_chapter_clamped(index);
        self.overlays.chapter_list_open = false;
        effects.push(Effect::ScrollTo(0.0));
        info!(
            chapter = self.session.chapter_index(),
            requested = index,
            "Opened chapter"
        );
        self.schedule_save(now);
    }

    fn handle_scrolled(&mut self, metrics: ScrollMetrics, now: Instant) {
        let progress = self.session.record_scroll(metrics);
        debug!(offset = metrics.offset, progress, "Scrolled");
        self.schedule_save(now);
    }

    fn handle_set_theme(&mut self, theme: ThemeId, now: Instant) {
        self.session.set_theme(theme);
        debug!(%theme, "Theme changed");
        self.schedule_save(now);
    }

    fn handle_tick(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        let due_restore = match &self.phase {
            Phase::Restoring(pending) if now >= pending.due => Some(pending.clone()),
            _ => None,
        };
        if let Some(pending) = due_restore {
            let session = &mut self.session;
            let applied = pending.token.run_unless_cancelled(|| {
                session.set_scroll_offset(pending.scroll_top);
                session.scroll_offset()
            });
            if let Some(offset) = applied {
                effects.push(Effect::ScrollTo(offset));
                info!(offset, "Restored scroll position");
            }
            self.phase = Phase::Active;
            self.schedule_save(now);
        }

        if matches!(self.phase, Phase::Active) && self.debouncer.poll(now) {
            self.persist();
        }
    }

    /// Push the save deadline back; saves never fire while restoring.
    fn schedule_save(&mut self, now: Instant) {
        if matches!(self.phase, Phase::Active) {
            self.debouncer.schedule(now);
        }
    }
}
