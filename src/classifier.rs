//! Paragraph classification for chapter rendering.
//!
//! Each paragraph is matched against a fixed list of shape rules; the first
//! rule that accepts the paragraph decides how it is displayed. The rules
//! overlap (a short quote also looks like a heading), so their order is part
//! of the behavior:
//!
//! 1. heading
//! 2. scripture quote
//! 3. list item
//! 4. first body paragraph (drop-cap)
//! 5. body paragraph
//!
//! Short sentences without punctuation are read as headings. That is a known
//! limit of the heuristic and is not reported anywhere.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use ts_rs::TS;

/// Paragraphs at or above this length are never short-form headings.
pub const HEADING_MAX_CHARS: usize = 80;
/// Short-form headings must be longer than this.
pub const HEADING_MIN_CHARS: usize = 3;
/// Quote-plus-parenthesis paragraphs must be shorter than this to be quotes.
pub const QUOTE_MAX_CHARS: usize = 400;
/// Paragraph delimiter inside chapter content.
pub const PARAGRAPH_DELIMITER: &str = "\n\n";

static RE_SCRIPTURE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((?:[1-3]?\s?[A-Z][a-zá-ú]+\s\d+[:.]\d+(?:-\d+)?|[A-Z]{3,})\)").unwrap()
});
static RE_LIST_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[*\-]\s*").unwrap());
static DEFAULT_CLASSIFIER: Lazy<Classifier> = Lazy::new(Classifier::default);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum ParagraphKind {
    Heading,
    ScriptureQuote,
    ListItem,
    FirstBodyParagraph,
    BodyParagraph,
}

/// A classified paragraph, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export)]
pub enum ParagraphBlock {
    Heading { text: String },
    ScriptureQuote { text: String },
    ListItem { text: String },
    FirstBodyParagraph { drop_cap: String, rest: String },
    BodyParagraph { text: String },
}

impl ParagraphBlock {
    pub fn kind(&self) -> ParagraphKind {
        match self {
            ParagraphBlock::Heading { .. } => ParagraphKind::Heading,
            ParagraphBlock::ScriptureQuote { .. } => ParagraphKind::ScriptureQuote,
            ParagraphBlock::ListItem { .. } => ParagraphKind::ListItem,
            ParagraphBlock::FirstBodyParagraph { .. } => ParagraphKind::FirstBodyParagraph,
            ParagraphBlock::BodyParagraph { .. } => ParagraphKind::BodyParagraph,
        }
    }

    /// Build the display form of an already-trimmed paragraph.
    fn render(kind: ParagraphKind, trimmed: &str) -> Self {
        match kind {
            ParagraphKind::Heading => ParagraphBlock::Heading {
                text: heading_case(trimmed),
            },
            ParagraphKind::ScriptureQuote => ParagraphBlock::ScriptureQuote {
                text: trimmed.to_string(),
            },
            ParagraphKind::ListItem => ParagraphBlock::ListItem {
                text: RE_LIST_MARKER.replace(trimmed, "").into_owned(),
            },
            ParagraphKind::FirstBodyParagraph => {
                let mut chars = trimmed.chars();
                let drop_cap = chars.next().map(String::from).unwrap_or_default();
                ParagraphBlock::FirstBodyParagraph {
                    drop_cap,
                    rest: chars.as_str().to_string(),
                }
            }
            ParagraphKind::BodyParagraph => ParagraphBlock::BodyParagraph {
                text: trimmed.to_string(),
            },
        }
    }
}

/// The facts a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct Paragraph<'a> {
    /// Trimmed, non-empty paragraph text.
    pub text: &'a str,
    /// Position of the paragraph inside its chapter.
    pub index: usize,
    /// Length in characters.
    pub len: usize,
}

impl<'a> Paragraph<'a> {
    fn new(text: &'a str, index: usize) -> Self {
        Self {
            text,
            index,
            len: text.chars().count(),
        }
    }
}

/// One stateless classification rule.
pub trait ParagraphRule: Send + Sync {
    fn kind(&self) -> ParagraphKind;
    fn matches(&self, paragraph: &Paragraph<'_>) -> bool;
}

/// All upper-case, or short with no `.` and no `,`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingRule;

impl ParagraphRule for HeadingRule {
    fn kind(&self) -> ParagraphKind {
        ParagraphKind::Heading
    }

    fn matches(&self, p: &Paragraph<'_>) -> bool {
        let all_upper = p.text == p.text.to_uppercase();
        let short_unpunctuated = p.len < HEADING_MAX_CHARS
            && !p.text.contains('.')
            && !p.text.contains(',')
            && p.len > HEADING_MIN_CHARS;
        (all_upper || short_unpunctuated) && p.len > 1
    }
}

/// Parenthesized citation such as `(Lucas 6:38)` or `(ARA)`, or a short
/// paragraph holding both a quotation mark and a parenthesis.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptureQuoteRule;

impl ParagraphRule for ScriptureQuoteRule {
    fn kind(&self) -> ParagraphKind {
        ParagraphKind::ScriptureQuote
    }

    fn matches(&self, p: &Paragraph<'_>) -> bool {
        RE_SCRIPTURE_REF.is_match(p.text)
            || (p.text.contains('"') && p.text.contains('(') && p.len < QUOTE_MAX_CHARS)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListItemRule;

impl ParagraphRule for ListItemRule {
    fn kind(&self) -> ParagraphKind {
        ParagraphKind::ListItem
    }

    fn matches(&self, p: &Paragraph<'_>) -> bool {
        p.text.starts_with('*') || p.text.starts_with('-')
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FirstBodyRule;

impl ParagraphRule for FirstBodyRule {
    fn kind(&self) -> ParagraphKind {
        ParagraphKind::FirstBodyParagraph
    }

    fn matches(&self, p: &Paragraph<'_>) -> bool {
        p.index == 0
    }
}

/// Ordered rule list. Paragraphs no rule accepts are body paragraphs.
pub struct Classifier {
    rules: Vec<Box<dyn ParagraphRule>>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_rules(vec![
            Box::new(HeadingRule),
            Box::new(ScriptureQuoteRule),
            Box::new(ListItemRule),
            Box::new(FirstBodyRule),
        ])
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<ParagraphKind> = self.rules.iter().map(|rule| rule.kind()).collect();
        f.debug_struct("Classifier").field("rules", &kinds).finish()
    }
}

impl Classifier {
    pub fn with_rules(rules: Vec<Box<dyn ParagraphRule>>) -> Self {
        Self { rules }
    }

    /// Kind of a paragraph, or `None` when it is blank.
    pub fn kind_of(&self, text: &str, index: usize) -> Option<ParagraphKind> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let paragraph = Paragraph::new(trimmed, index);
        let kind = self
            .rules
            .iter()
            .find(|rule| rule.matches(&paragraph))
            .map(|rule| rule.kind())
            .unwrap_or(ParagraphKind::BodyParagraph);
        Some(kind)
    }

    pub fn classify(&self, text: &str, index: usize) -> Option<ParagraphBlock> {
        let kind = self.kind_of(text, index)?;
        Some(ParagraphBlock::render(kind, text.trim()))
    }

    /// Split chapter content on blank lines and classify every paragraph.
    /// Indices count blank segments too, so only the very first segment can
    /// get a drop-cap.
    pub fn classify_chapter(&self, content: &str) -> Vec<ParagraphBlock> {
        content
            .split(PARAGRAPH_DELIMITER)
            .enumerate()
            .filter_map(|(index, paragraph)| self.classify(paragraph, index))
            .collect()
    }
}

/// Classify with the default rule order.
pub fn classify(text: &str, index: usize) -> Option<ParagraphBlock> {
    DEFAULT_CLASSIFIER.classify(text, index)
}

pub fn classify_chapter(content: &str) -> Vec<ParagraphBlock> {
    DEFAULT_CLASSIFIER.classify_chapter(content)
}

fn heading_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}
