//! Reading session state: where the reader is and how the page looks.

use crate::theme::ThemeId;

/// Smallest selectable font size (px).
pub const MIN_FONT_SIZE: u32 = 16;
/// Largest selectable font size (px).
pub const MAX_FONT_SIZE: u32 = 28;
/// Increment used by the A-/A+ controls.
pub const FONT_SIZE_STEP: u32 = 2;
pub const DEFAULT_FONT_SIZE: u32 = 18;

/// Clamp a font size into range and onto the step grid.
pub fn sanitize_font_size(size: u32) -> u32 {
    let clamped = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    clamped - (clamped - MIN_FONT_SIZE) % FONT_SIZE_STEP
}

/// Scroll geometry reported by the host view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub offset: f32,
    pub scroll_height: f32,
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn new(offset: f32, scroll_height: f32, client_height: f32) -> Self {
        Self {
            offset: sanitize(offset),
            scroll_height: sanitize(scroll_height),
            client_height: sanitize(client_height),
        }
    }

    /// Fraction of the scrollable range already passed, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        let scrollable = self.scroll_height - self.client_height;
        if scrollable <= 0.0 {
            return 0.0;
        }
        (self.offset / scrollable.max(1.0)).clamp(0.0, 1.0)
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

/// Mutable state owned by one reader view.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingSession {
    chapter_count: usize,
    chapter_index: usize,
    scroll_offset: f32,
    progress: f32,
    theme: ThemeId,
    font_size: u32,
}

impl ReadingSession {
    /// Fresh session at the start of the book. `chapter_count` must be at
    /// least one.
    pub fn new(chapter_count: usize, theme: ThemeId, font_size: u32) -> Self {
        Self {
            chapter_count: chapter_count.max(1),
            chapter_index: 0,
            scroll_offset: 0.0,
            progress: 0.0,
            theme,
            font_size: sanitize_font_size(font_size),
        }
    }

    pub fn chapter_index(&self) -> usize {
        self.chapter_index
    }

    pub fn chapter_count(&self) -> usize {
        self.chapter_count
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn theme(&self) -> ThemeId {
        self.theme
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn has_previous(&self) -> bool {
        self.chapter_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.chapter_index + 1 < self.chapter_count
    }

    /// Move to a chapter (clamped) and rewind to its top.
    pub fn set_chapter_clamped(&mut self, index: usize) {
        self.chapter_index = index.min(self.chapter_count - 1);
        self.scroll_offset = 0.0;
        self.progress = 0.0;
    }

    pub fn set_theme(&mut self, theme: ThemeId) {
        self.theme = theme;
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = sanitize_font_size(size);
    }

    pub fn increase_font(&mut self) {
        self.set_font_size(self.font_size.saturating_add(FONT_SIZE_STEP));
    }

    pub fn decrease_font(&mut self) {
        self.set_font_size(self.font_size.saturating_sub(FONT_SIZE_STEP));
    }

    /// Record a scroll event and return the new progress.
    pub fn record_scroll(&mut self, metrics: ScrollMetrics) -> f32 {
        self.scroll_offset = metrics.offset;
        self.progress = metrics.progress();
        self.progress
    }

    /// Apply an absolute offset without layout information (restore path).
    pub(crate) fn set_scroll_offset(&mut self, offset: f32) {
        self.scroll_offset = sanitize(offset);
    }
}
