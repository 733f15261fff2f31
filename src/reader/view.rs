use super::ReaderController;
use crate::cache::SessionStore;
use crate::classifier::ParagraphBlock;
use crate::theme::{ThemeAttributes, ThemeId};
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ReaderPhase {
    Restoring,
    Active,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ChapterListEntry {
    pub index: usize,
    /// `•` for the introduction, otherwise the zero-padded chapter number.
    pub marker: String,
    pub title: String,
    pub current: bool,
}

/// Everything a host needs to draw the reader.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ReaderSnapshot {
    pub book_title: String,
    pub chapter_index: usize,
    pub chapter_count: usize,
    pub chapter_label: String,
    pub chapter_title: String,
    pub position_label: String,
    pub blocks: Vec<ParagraphBlock>,
    pub font_size: u32,
    pub theme: ThemeId,
    pub theme_attributes: ThemeAttributes,
    pub progress_pct: f32,
    pub scroll_offset: f32,
    pub has_previous: bool,
    pub has_next: bool,
    pub chapter_list: Vec<ChapterListEntry>,
    pub chapter_list_open: bool,
    pub settings_open: bool,
    pub phase: ReaderPhase,
}

fn chapter_label(index: usize) -> String {
    if index == 0 {
        "Introdução".to_string()
    } else {
        format!("Capítulo {index}")
    }
}

fn list_marker(index: usize) -> String {
    if index == 0 {
        "•".to_string()
    } else {
        format!("{index:02}")
    }
}

impl<S: SessionStore> ReaderController<S> {
    pub fn snapshot(&self) -> ReaderSnapshot {
        let index = self.session.chapter_index();
        let chapters = self.book.chapters();
        let (title, blocks) = match self.book.chapter(index) {
            Some(chapter) => (
                chapter.title.clone(),
                self.classifier.classify_chapter(&chapter.content),
            ),
            None => (String::new(), Vec::new()),
        };
        let chapter_list = chapters
            .iter()
            .enumerate()
            .map(|(i, chapter)| ChapterListEntry {
                index: i,
                marker: list_marker(i),
                title: chapter.title.clone(),
                current: i == index,
            })
            .collect();

        ReaderSnapshot {
            book_title: self.book.title().to_string(),
            chapter_index: index,
            chapter_count: chapters.len(),
            chapter_label: chapter_label(index),
            chapter_title: title,
            position_label: format!("{} / {}", index + 1, chapters.len()),
            blocks,
            font_size: self.session.font_size(),
            theme: self.session.theme(),
            theme_attributes: self.session.theme().attributes(),
            progress_pct: self.session.progress() * 100.0,
            scroll_offset: self.session.scroll_offset(),
            has_previous: self.session.has_previous(),
            has_next: self.session.has_next(),
            chapter_list,
            chapter_list_open: self.overlays.chapter_list_open,
            settings_open: self.overlays.settings_open,
            phase: self.phase(),
        }
    }
}
