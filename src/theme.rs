//! Closed set of reader themes and their style bundles.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

/// Reader theme identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ThemeId {
    #[default]
    Dark,
    Light,
    Sepia,
}

/// Style tokens for one theme. Values are opaque to the core; hosts map them
/// onto whatever their renderer understands.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct ThemeAttributes {
    pub background: &'static str,
    pub text: &'static str,
    pub secondary_text: &'static str,
    pub panel_background: &'static str,
    pub header_background: &'static str,
    pub border: &'static str,
    pub hover: &'static str,
    pub accent: &'static str,
    pub highlight_border: &'static str,
    pub quote_background: &'static str,
    pub drop_cap: &'static str,
}

const DARK: ThemeAttributes = ThemeAttributes {
    background: "#121212",
    text: "#d4d4d4",
    secondary_text: "#737373",
    panel_background: "#1a1a1a",
    header_background: "#121212e6",
    border: "#262626",
    hover: "#262626",
    accent: "#c8a86b",
    highlight_border: "#c8a86b",
    quote_background: "#ffffff0d",
    drop_cap: "#ffffff",
};

const LIGHT: ThemeAttributes = ThemeAttributes {
    background: "#f8f7f2",
    text: "#333333",
    secondary_text: "#737373",
    panel_background: "#ffffff",
    header_background: "#f8f7f2e6",
    border: "#e5e5e5",
    hover: "#0000000d",
    accent: "#2e4034",
    highlight_border: "#2e4034",
    quote_background: "#0000000d",
    drop_cap: "#2e4034",
};

const SEPIA: ThemeAttributes = ThemeAttributes {
    background: "#fbf5e9",
    text: "#5b4636",
    secondary_text: "#8d7966",
    panel_background: "#f4ecd8",
    header_background: "#fbf5e9e6",
    border: "#e0d5b5",
    hover: "#e9dfc6",
    accent: "#704214",
    highlight_border: "#704214",
    quote_background: "#e9dfc699",
    drop_cap: "#704214",
};

impl ThemeId {
    /// Picker order used by the settings panel.
    pub const ALL: [ThemeId; 3] = [ThemeId::Light, ThemeId::Sepia, ThemeId::Dark];

    pub fn attributes(self) -> ThemeAttributes {
        match self {
            ThemeId::Dark => DARK,
            ThemeId::Light => LIGHT,
            ThemeId::Sepia => SEPIA,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeId::Dark => "dark",
            ThemeId::Light => "light",
            ThemeId::Sepia => "sepia",
        }
    }
}

impl std::fmt::Display for ThemeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ThemeId::Dark => "Dark",
            ThemeId::Light => "Light",
            ThemeId::Sepia => "Sepia",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme `{0}` (expected dark, light or sepia)")]
pub struct ThemeParseError(pub String);

impl FromStr for ThemeId {
    type Err = ThemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dark" => Ok(ThemeId::Dark),
            "light" => Ok(ThemeId::Light),
            "sepia" => Ok(ThemeId::Sepia),
            other => Err(ThemeParseError(other.to_string())),
        }
    }
}
