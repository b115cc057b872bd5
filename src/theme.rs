//! Visual theme identifiers.
//!
//! The core never renders anything; it only carries which of the eight themes a
//! session uses and how each one is squeezed into a single character inside a
//! link token.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the eight fixed visual themes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeId {
    #[default]
    DreamyPink,
    DarkRomance,
    Retro,
    Neon,
    GoldenHour,
    MidnightBlue,
    LavenderDreams,
    SunsetKiss,
}

/// Returned when a string names no known theme.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown theme '{0}'")]
pub struct UnknownTheme(pub String);

// (theme, identifier, short code, display name)
const THEME_TABLE: [(ThemeId, &str, char, &str); 8] = [
    (ThemeId::DreamyPink, "dreamy-pink", 'p', "Dreamy Pink"),
    (ThemeId::DarkRomance, "dark-romance", 'd', "Dark Romance"),
    (ThemeId::Retro, "retro", 'r', "Retro"),
    (ThemeId::Neon, "neon", 'n', "Neon"),
    (ThemeId::GoldenHour, "golden-hour", 'g', "Golden Hour"),
    (ThemeId::MidnightBlue, "midnight-blue", 'b', "Midnight Blue"),
    (ThemeId::LavenderDreams, "lavender-dreams", 'l', "Lavender Dreams"),
    (ThemeId::SunsetKiss, "sunset-kiss", 's', "Sunset Kiss"),
];

impl ThemeId {
    /// All themes in picker order.
    pub const ALL: [ThemeId; 8] = [
        ThemeId::DreamyPink,
        ThemeId::DarkRomance,
        ThemeId::Retro,
        ThemeId::Neon,
        ThemeId::GoldenHour,
        ThemeId::MidnightBlue,
        ThemeId::LavenderDreams,
        ThemeId::SunsetKiss,
    ];

    fn row(self) -> &'static (ThemeId, &'static str, char, &'static str) {
        // Every variant has exactly one row; index by declaration order.
        &THEME_TABLE[self as usize]
    }

    /// Kebab-case identifier used in URLs and legacy records.
    pub fn as_str(self) -> &'static str {
        self.row().1
    }

    /// Single-character code used inside link tokens.
    pub fn code(self) -> char {
        self.row().2
    }

    /// Human readable name for pickers.
    pub fn display_name(self) -> &'static str {
        self.row().3
    }

    /// Reverse lookup of a short code.
    pub fn from_code(code: &str) -> Option<ThemeId> {
        let mut chars = code.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        THEME_TABLE.iter().find(|row| row.2 == c).map(|row| row.0)
    }

    /// Resolve a token's theme field: short code first, then a full
    /// identifier, then the default theme.
    pub fn resolve_lenient(field: &str) -> ThemeId {
        ThemeId::from_code(field)
            .or_else(|| field.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for ThemeId {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        THEME_TABLE
            .iter()
            .find(|row| row.1 == s)
            .map(|row| row.0)
            .ok_or_else(|| UnknownTheme(s.to_owned()))
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
