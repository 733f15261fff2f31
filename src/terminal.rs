//! Line-oriented terminal host for the reader controller.
//!
//! Scroll positions are measured in layout rows: the offset is the first
//! visible row, the scroll height is the laid-out chapter height and the
//! client height is the viewport. Input arrives on a channel fed by a stdin
//! thread and the Ctrl-C handler; between inputs the loop sleeps until the
//! controller's next deadline and then ticks it.

use anyhow::{Context, Result};
use bookreader::cache::SessionStore;
use bookreader::layout::ChapterLayout;
use bookreader::reader::{Effect, ReaderController, ReaderMessage, ReaderSnapshot};
use bookreader::theme::ThemeId;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Wake-up interval when no timer is pending.
const IDLE_WAIT: Duration = Duration::from_secs(60);

#[derive(Debug)]
enum HostEvent {
    Line(String),
    Interrupt,
    InputClosed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Previous,
    GoTo(usize),
    ScrollDown(usize),
    ScrollUp(usize),
    PageDown,
    PageUp,
    Theme(ThemeId),
    FontUp,
    FontDown,
    ToggleChapterList,
    ToggleSettings,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or("");
    let arg = parts.next();
    let count = || arg.and_then(|a| a.parse::<usize>().ok()).unwrap_or(1);

    match head {
        "" | "f" => Command::PageDown,
        "b" => Command::PageUp,
        "j" => Command::ScrollDown(count()),
        "k" => Command::ScrollUp(count()),
        "n" | "next" => Command::Next,
        "p" | "prev" => Command::Previous,
        "g" | "goto" => match arg.and_then(|a| a.parse::<usize>().ok()) {
            Some(index) => Command::GoTo(index),
            None => Command::Unknown(line.to_string()),
        },
        "t" | "theme" => match arg.map(str::parse::<ThemeId>) {
            Some(Ok(theme)) => Command::Theme(theme),
            _ => Command::Unknown(line.to_string()),
        },
        "+" => Command::FontUp,
        "-" => Command::FontDown,
        "c" | "toc" => Command::ToggleChapterList,
        "s" | "settings" => Command::ToggleSettings,
        "h" | "?" | "help" => Command::Help,
        "q" | "quit" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

/// Host-side view state: the current row offset and viewport height.
#[derive(Debug, Clone)]
pub struct TerminalHost {
    viewport: usize,
    offset: usize,
    show_help: bool,
}

impl TerminalHost {
    pub fn new(viewport: usize) -> Self {
        Self {
            viewport: viewport.max(1),
            offset: 0,
            show_help: false,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    fn layout(snapshot: &ReaderSnapshot) -> ChapterLayout {
        ChapterLayout::build(
            &snapshot.chapter_label,
            &snapshot.chapter_title,
            &snapshot.blocks,
            snapshot.font_size,
        )
    }

    fn max_offset(&self, layout: &ChapterLayout) -> usize {
        layout.height().saturating_sub(self.viewport)
    }

    /// Translate a command into controller messages.
    pub fn handle<S: SessionStore>(
        &mut self,
        command: Command,
        reader: &mut ReaderController<S>,
        now: Instant,
    ) -> Vec<Effect> {
        self.show_help = false;
        let message = match command {
            Command::Next => ReaderMessage::NextChapter,
            Command::Previous => ReaderMessage::PreviousChapter,
            Command::GoTo(index) => ReaderMessage::GoToChapter(index),
            Command::ScrollDown(rows) => {
                return self.scroll_to(self.offset.saturating_add(rows), reader, now);
            }
            Command::ScrollUp(rows) => {
                return self.scroll_to(self.offset.saturating_sub(rows), reader, now);
            }
            Command::PageDown => {
                return self.scroll_to(self.offset.saturating_add(self.viewport), reader, now);
            }
            Command::PageUp => {
                return self.scroll_to(self.offset.saturating_sub(self.viewport), reader, now);
            }
            Command::Theme(theme) => ReaderMessage::SetTheme(theme),
            Command::FontUp => ReaderMessage::IncreaseFont,
            Command::FontDown => ReaderMessage::DecreaseFont,
            Command::ToggleChapterList => ReaderMessage::ToggleChapterList,
            Command::ToggleSettings => ReaderMessage::ToggleSettings,
            Command::Quit => ReaderMessage::Close,
            Command::Help => {
                self.show_help = true;
                return Vec::new();
            }
            Command::Unknown(input) => {
                debug!(%input, "Unrecognized command");
                self.show_help = true;
                return Vec::new();
            }
        };
        reader.update(message, now)
    }

    fn scroll_to<S: SessionStore>(
        &mut self,
        target: usize,
        reader: &mut ReaderController<S>,
        now: Instant,
    ) -> Vec<Effect> {
        let layout = Self::layout(&reader.snapshot());
        self.offset = target.min(self.max_offset(&layout));
        reader.scrolled(
            self.offset as f32,
            layout.height() as f32,
            self.viewport as f32,
            now,
        )
    }

    /// Apply a host scroll command. The offset is clamped to the current
    /// layout and the resulting row is reported back as a scroll event.
    pub fn apply_scroll<S: SessionStore>(
        &mut self,
        offset: f32,
        reader: &mut ReaderController<S>,
        now: Instant,
    ) -> Vec<Effect> {
        let rows = offset.max(0.0).round() as usize;
        self.scroll_to(rows, reader, now)
    }

    pub fn render<S: SessionStore>(
        &self,
        reader: &ReaderController<S>,
        out: &mut impl Write,
    ) -> io::Result<()> {
        let snapshot = reader.snapshot();
        let layout = Self::layout(&snapshot);
        let colors = &snapshot.theme_attributes;
        let fg = ansi_rgb(colors.text, false).unwrap_or_default();
        let bg = ansi_rgb(colors.background, true).unwrap_or_default();
        let accent = ansi_rgb(colors.accent, false).unwrap_or_default();
        let reset = "\x1b[0m";

        writeln!(
            out,
            "{bg}{accent}{} | {} | {}{reset}",
            snapshot.book_title, snapshot.chapter_label, snapshot.position_label
        )?;
        for line in layout.window(self.offset, self.viewport) {
            writeln!(out, "{bg}{fg}{line}{reset}")?;
        }
        writeln!(
            out,
            "{accent}{:>3.0}% | tema {} | fonte {}px{reset}",
            snapshot.progress_pct, snapshot.theme, snapshot.font_size
        )?;

        if snapshot.chapter_list_open {
            writeln!(out, "Capítulos:")?;
            for entry in &snapshot.chapter_list {
                let current = if entry.current { ">" } else { " " };
                writeln!(out, "{current} {} {}", entry.marker, entry.title)?;
            }
        }
        if snapshot.settings_open {
            let themes: Vec<&str> = ThemeId::ALL.iter().map(|theme| theme.as_str()).collect();
            writeln!(
                out,
                "Tema: {} ({}) | Fonte: {}px (+/-)",
                snapshot.theme,
                themes.join(", "),
                snapshot.font_size
            )?;
        }
        if self.show_help {
            writeln!(
                out,
                "[enter/f] página  [b] voltar  [j/k N] linhas  [n/p] capítulo  [g N] ir  \
                 [t tema] [+/-] fonte  [c] capítulos  [s] ajustes  [q] sair"
            )?;
        }
        out.flush()
    }
}

/// Truecolor escape for a `#rrggbb` token.
fn ansi_rgb(hex: &str, background: bool) -> Option<String> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    let (r, g, b) = (channel(0..2)?, channel(2..4)?, channel(4..6)?);
    let layer = if background { 48 } else { 38 };
    Some(format!("\x1b[{layer};2;{r};{g};{b}m"))
}

/// Drive the reader until the user quits, stdin closes or Ctrl-C arrives.
pub fn run<S: SessionStore>(mut reader: ReaderController<S>, viewport: usize) -> Result<()> {
    let (tx, rx) = mpsc::channel();

    let input_tx = tx.clone();
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if input_tx.send(HostEvent::Line(line)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        warn!("Failed to read stdin: {err}");
                        break;
                    }
                }
            }
            let _ = input_tx.send(HostEvent::InputClosed);
        })
        .context("Failed to spawn stdin reader")?;

    if let Err(err) = ctrlc::set_handler(move || {
        let _ = tx.send(HostEvent::Interrupt);
    }) {
        warn!("Failed to install Ctrl+C signal handler: {err}");
    }

    let mut host = TerminalHost::new(viewport);
    let mut stdout = io::stdout();
    host.render(&reader, &mut stdout).context("Failed to draw reader")?;

    loop {
        let timeout = reader
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_WAIT);
        let event = match rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(HostEvent::InputClosed),
        };

        let now = Instant::now();
        let (effects, redraw) = match event {
            None => (reader.tick(now), false),
            Some(HostEvent::Line(line)) => {
                (host.handle(parse_command(&line), &mut reader, now), true)
            }
            Some(HostEvent::Interrupt) => {
                info!("Received Ctrl+C; closing reader");
                (reader.close(), false)
            }
            Some(HostEvent::InputClosed) => {
                debug!("Input closed; closing reader");
                (reader.close(), false)
            }
        };

        let mut redraw = redraw;
        for effect in effects {
            match effect {
                Effect::ScrollTo(offset) => {
                    host.apply_scroll(offset, &mut reader, now);
                    debug!(offset, row = host.offset(), "Applied host scroll");
                    redraw = true;
                }
                Effect::Close => return Ok(()),
            }
        }
        if redraw {
            host.render(&reader, &mut stdout).context("Failed to draw reader")?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookreader::cache::MemorySessionStore;
    use bookreader::content::{Book, Chapter};
    use bookreader::reader::ReaderOptions;
    use std::sync::Arc;

    fn reader(store: &MemorySessionStore) -> ReaderController<MemorySessionStore> {
        let long = (0..40)
            .map(|i| format!("Parágrafo número {i}, com texto suficiente para ocupar linhas."))
            .collect::<Vec<_>>()
            .join("\n\n");
        let book = Book::new(
            "Finanças",
            vec![
                Chapter {
                    title: "Abertura".into(),
                    content: long.clone(),
                },
                Chapter {
                    title: "Dízimo".into(),
                    content: long,
                },
            ],
        )
        .unwrap();
        ReaderController::mount(
            Arc::new(book),
            store.clone(),
            ReaderOptions::default(),
            Instant::now(),
        )
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command(""), Command::PageDown);
        assert_eq!(parse_command("j 5"), Command::ScrollDown(5));
        assert_eq!(parse_command("k"), Command::ScrollUp(1));
        assert_eq!(parse_command("g 3"), Command::GoTo(3));
        assert_eq!(parse_command("theme sepia"), Command::Theme(ThemeId::Sepia));
        assert_eq!(parse_command(" q "), Command::Quit);
        assert_eq!(
            parse_command("theme neon"),
            Command::Unknown("theme neon".into())
        );
        assert_eq!(parse_command("g"), Command::Unknown("g".into()));
    }

    #[test]
    fn scrolling_reports_row_metrics() {
        let store = MemorySessionStore::new();
        let mut reader = reader(&store);
        let mut host = TerminalHost::new(10);
        let now = Instant::now();

        host.handle(Command::ScrollDown(4), &mut reader, now);
        assert_eq!(host.offset(), 4);
        assert_eq!(reader.session().scroll_offset(), 4.0);
        assert!(reader.session().progress() > 0.0);

        host.handle(Command::ScrollUp(10), &mut reader, now);
        assert_eq!(host.offset(), 0);

        host.handle(Command::ScrollDown(100_000), &mut reader, now);
        assert!(host.offset() > 0);
        assert_eq!(reader.session().progress(), 1.0);
    }

    #[test]
    fn huge_scroll_counts_saturate_at_the_end() {
        let store = MemorySessionStore::new();
        let mut reader = reader(&store);
        let mut host = TerminalHost::new(10);
        let now = Instant::now();

        host.handle(parse_command("j 3"), &mut reader, now);
        assert_eq!(host.offset(), 3);
        assert_eq!(
            parse_command("j 18446744073709551615"),
            Command::ScrollDown(usize::MAX)
        );
        host.handle(parse_command("j 18446744073709551615"), &mut reader, now);
        let bottom = host.offset();
        assert!(bottom > 3);
        assert_eq!(reader.session().progress(), 1.0);

        host.handle(Command::PageDown, &mut reader, now);
        assert_eq!(host.offset(), bottom);
    }

    #[test]
    fn restored_offset_is_clamped_and_reported_back() {
        let store = MemorySessionStore::with_contents(
            r#"{"chapterIndex": 0, "scrollTop": 5000, "theme": "dark", "fontSize": 18}"#,
        );
        let mut reader = reader(&store);
        let mut host = TerminalHost::new(10);
        let due = Instant::now() + ReaderOptions::default().restore_delay;

        let effects = reader.tick(due);
        assert_eq!(effects, vec![Effect::ScrollTo(5000.0)]);
        for effect in effects {
            if let Effect::ScrollTo(offset) = effect {
                host.apply_scroll(offset, &mut reader, due);
            }
        }

        assert!(host.offset() > 0);
        assert_eq!(reader.session().scroll_offset(), host.offset() as f32);
        assert_eq!(reader.snapshot().progress_pct, 100.0);

        reader.close();
        let written: serde_json::Value =
            serde_json::from_str(&store.contents().unwrap()).unwrap();
        assert_eq!(written["scrollTop"], host.offset() as f64);
    }

    #[test]
    fn chapter_change_rewinds_the_view() {
        let store = MemorySessionStore::new();
        let mut reader = reader(&store);
        let mut host = TerminalHost::new(10);
        let now = Instant::now();

        host.handle(Command::PageDown, &mut reader, now);
        let effects = host.handle(Command::Next, &mut reader, now);
        assert_eq!(effects, vec![Effect::ScrollTo(0.0)]);
        host.apply_scroll(0.0, &mut reader, now);
        assert_eq!(host.offset(), 0);
        assert_eq!(reader.session().chapter_index(), 1);
    }

    #[test]
    fn quit_closes_the_reader() {
        let store = MemorySessionStore::new();
        let mut reader = reader(&store);
        let mut host = TerminalHost::new(10);
        let effects = host.handle(Command::Quit, &mut reader, Instant::now());
        assert_eq!(effects, vec![Effect::Close]);
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn render_shows_labels_and_overlays() {
        let store = MemorySessionStore::new();
        let mut reader = reader(&store);
        let mut host = TerminalHost::new(5);
        let now = Instant::now();
        host.handle(Command::ToggleChapterList, &mut reader, now);

        let mut out = Vec::new();
        host.render(&reader, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Introdução | 1 / 2"));
        assert!(text.contains("> • Abertura"));
        assert!(text.contains("  01 Dízimo"));
    }

    #[test]
    fn hex_tokens_become_truecolor_escapes() {
        assert_eq!(
            ansi_rgb("#f8f7f2", true).as_deref(),
            Some("\x1b[48;2;248;247;242m")
        );
        assert_eq!(ansi_rgb("rgba(0,0,0,0.5)", false), None);
    }
}
