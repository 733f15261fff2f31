use crate::theme::ThemeId;

/// Events a host forwards to the reader.
#[derive(Debug, Clone, PartialEq)]
pub enum ReaderMessage {
    GoToChapter(usize),
    NextChapter,
    PreviousChapter,
    Scrolled {
        offset: f32,
        scroll_height: f32,
        client_height: f32,
    },
    SetTheme(ThemeId),
    IncreaseFont,
    DecreaseFont,
    ToggleChapterList,
    CloseChapterList,
    ToggleSettings,
    /// Timer wake-up; fires due restore and save work.
    Tick,
    Close,
}

/// Work the host must perform after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Move the content view to this absolute offset.
    ScrollTo(f32),
    /// Dismiss the reader view; state has already been flushed.
    Close,
}
