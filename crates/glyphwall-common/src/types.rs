//! Core types shared across Glyphwall components.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    DEFAULT_CHARACTERS, DEFAULT_MAX_DOTS, DEFAULT_MAX_LINES, DEFAULT_MIN_DOTS, DEFAULT_MIN_LINES,
};

/// An opaque RGB color.
///
/// Displays as `#RRGGBB` with uppercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Brightest channel; the HSV "value" of this color scaled to 0-255
    pub fn max_channel(self) -> u8 {
        self.r.max(self.g).max(self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// An unordered pair of count bounds.
///
/// Bounds are not validated; they are order-corrected when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountRange {
    pub a: f64,
    pub b: f64,
}

impl CountRange {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    /// Returns `(min, max)` regardless of construction order
    pub fn ordered(&self) -> (f64, f64) {
        (self.a.min(self.b), self.a.max(self.b))
    }
}

/// Per-call generator configuration.
///
/// Field names match the view-layer configuration surface; every field is
/// optional in serialized form and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptchaOptions {
    /// Draw colored noise dots
    #[serde(default = "default_true")]
    pub need_dots: bool,

    /// Draw curved noise lines
    #[serde(default = "default_true")]
    pub need_lines: bool,

    #[serde(default = "default_min_dots")]
    pub min_dots: f64,

    #[serde(default = "default_max_dots")]
    pub max_dots: f64,

    #[serde(default = "default_min_lines")]
    pub min_lines: f64,

    #[serde(default = "default_max_lines")]
    pub max_lines: f64,

    /// Alphabet the answer is drawn from
    #[serde(default = "default_characters")]
    pub characters: String,
}

impl CaptchaOptions {
    pub fn dot_range(&self) -> CountRange {
        CountRange::new(self.min_dots, self.max_dots)
    }

    pub fn line_range(&self) -> CountRange {
        CountRange::new(self.min_lines, self.max_lines)
    }

    /// Options that draw only the background and glyphs
    pub fn plain(characters: impl Into<String>) -> Self {
        Self {
            need_dots: false,
            need_lines: false,
            characters: characters.into(),
            ..Self::default()
        }
    }
}

impl Default for CaptchaOptions {
    fn default() -> Self {
        Self {
            need_dots: true,
            need_lines: true,
            min_dots: default_min_dots(),
            max_dots: default_max_dots(),
            min_lines: default_min_lines(),
            max_lines: default_max_lines(),
            characters: default_characters(),
        }
    }
}

fn default_true() -> bool { true }
fn default_min_dots() -> f64 { DEFAULT_MIN_DOTS }
fn default_max_dots() -> f64 { DEFAULT_MAX_DOTS }
fn default_min_lines() -> f64 { DEFAULT_MIN_LINES }
fn default_max_lines() -> f64 { DEFAULT_MAX_LINES }
fn default_characters() -> String { DEFAULT_CHARACTERS.to_string() }

/// A rendered challenge as handed to a presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedChallenge {
    /// Unique challenge identifier
    pub challenge_id: String,

    /// `data:image/png;base64,...` URI
    pub image_data: String,

    pub width: u32,
    pub height: u32,

    /// The expected answer (omitted unless explicitly revealed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    /// Creation timestamp (Unix epoch seconds)
    pub generated_at: i64,
}

impl RenderedChallenge {
    pub fn new(challenge_id: String, image_data: String, width: u32, height: u32) -> Self {
        Self {
            challenge_id,
            image_data,
            width,
            height,
            answer: None,
            generated_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_answer(mut self, answer: String) -> Self {
        self.answer = Some(answer);
        self
    }
}
