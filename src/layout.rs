//! Terminal layout for classified chapters.
//!
//! The terminal cannot change its glyph size, so the font size is mapped to a
//! line width instead: larger fonts mean fewer characters per line and a taller
//! chapter, which is what the scroll model needs to see.

use crate::classifier::ParagraphBlock;
use crate::session::{MAX_FONT_SIZE, MIN_FONT_SIZE};

/// Characters per line at the given font size.
pub fn line_width(font_size: u32) -> usize {
    let normalized = font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE) as f32;
    (80.0 * (16.0 / normalized)).round().clamp(30.0, 120.0) as usize
}

/// Fully laid-out chapter; one entry per terminal row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterLayout {
    lines: Vec<String>,
}

impl ChapterLayout {
    pub fn build(label: &str, title: &str, blocks: &[ParagraphBlock], font_size: u32) -> Self {
        let width = line_width(font_size);
        let mut lines = Vec::new();

        lines.push(center(&label.to_uppercase(), width));
        for line in wrap(title, width) {
            lines.push(center(&line, width));
        }
        lines.push(center("───", width));
        lines.push(String::new());

        for block in blocks {
            match block {
                ParagraphBlock::Heading { text } => {
                    lines.push(String::new());
                    let wrapped = wrap(text, width);
                    let rule_len = wrapped.iter().map(|l| l.chars().count()).max().unwrap_or(0);
                    lines.extend(wrapped);
                    lines.push("━".repeat(rule_len));
                }
                ParagraphBlock::ScriptureQuote { text } => {
                    lines.extend(
                        wrap(text, width.saturating_sub(2))
                            .into_iter()
                            .map(|line| format!("│ {line}")),
                    );
                }
                ParagraphBlock::ListItem { text } => {
                    for (i, line) in wrap(text, width.saturating_sub(4)).into_iter().enumerate() {
                        let marker = if i == 0 { "  • " } else { "    " };
                        lines.push(format!("{marker}{line}"));
                    }
                }
                ParagraphBlock::FirstBodyParagraph { drop_cap, rest } => {
                    let joined = format!("[{drop_cap}]{rest}");
                    lines.extend(wrap(&joined, width));
                }
                ParagraphBlock::BodyParagraph { text } => {
                    lines.extend(wrap(text, width));
                }
            }
            lines.push(String::new());
        }

        Self { lines }
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Rows visible from `offset` in a viewport `rows` tall.
    pub fn window(&self, offset: usize, rows: usize) -> &[String] {
        let start = offset.min(self.lines.len());
        let end = start.saturating_add(rows).min(self.lines.len());
        &self.lines[start..end]
    }
}

/// Greedy word wrap. Words longer than the width are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for source_line in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in source_line.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let separator = usize::from(current_len > 0);
            if current_len + separator + word.len() > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current.extend(word);
        }

        if current_len > 0 {
            lines.push(current);
        }
    }

    lines
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let pad = width.saturating_sub(len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}
