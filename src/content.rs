//! Book content loading.
//!
//! A book is a TOML file with an optional `title` and an ordered list of
//! `[[chapters]]`, each with a `title` and a raw `content` blob whose
//! paragraphs are separated by blank lines. Text is normalized to NFC and LF
//! line endings on load so the classifier sees one canonical form.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct BookFile {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    chapters: Vec<Chapter>,
}

/// Immutable, non-empty ordered chapter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    title: String,
    chapters: Vec<Chapter>,
}

impl Book {
    pub fn new(title: impl Into<String>, chapters: Vec<Chapter>) -> Result<Self> {
        if chapters.is_empty() {
            bail!("book has no chapters");
        }
        let chapters = chapters
            .into_iter()
            .map(|chapter| Chapter {
                title: normalize_text(&chapter.title).trim().to_string(),
                content: normalize_text(&chapter.content),
            })
            .collect();
        Ok(Self {
            title: title.into(),
            chapters,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }
}

pub fn parse_book(contents: &str, fallback_title: &str) -> Result<Book> {
    let file: BookFile = toml::from_str(contents).context("Invalid book TOML")?;
    let title = file
        .title
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| fallback_title.to_string());
    Book::new(title, file.chapters)
}

pub fn load_book(path: &Path) -> Result<Book> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read book {}", path.display()))?;
    let fallback_title = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("book");
    let book = parse_book(&contents, fallback_title)
        .with_context(|| format!("Failed to load book {}", path.display()))?;
    info!(
        path = %path.display(),
        title = book.title(),
        chapters = book.len(),
        "Loaded book content"
    );
    Ok(book)
}

fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n").nfc().collect()
}
