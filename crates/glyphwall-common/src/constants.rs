//! Shared constants for Glyphwall components.

/// Fixed surface width in logical units
pub const SURFACE_WIDTH: u32 = 250;

/// Fixed surface height in logical units
pub const SURFACE_HEIGHT: u32 = 50;

/// Number of characters in every challenge answer
pub const ANSWER_LENGTH: usize = 5;

/// Default CAPTCHA alphabet (62 characters)
pub const DEFAULT_CHARACTERS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789abcdefghijklmnopqrstuvwxyz";

/// Alphabet used when minting element identifiers
pub const ID_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Default identifier length
pub const DEFAULT_ID_LENGTH: usize = 64;

/// Default noise dot count range
pub const DEFAULT_MIN_DOTS: f64 = 400.0;
pub const DEFAULT_MAX_DOTS: f64 = 500.0;

/// Default noise line count range
pub const DEFAULT_MIN_LINES: f64 = 10.0;
pub const DEFAULT_MAX_LINES: f64 = 100.0;

/// Default font file used by the raster surface
pub const DEFAULT_FONT_PATH: &str = "assets/fonts/DejaVuSans.ttf";

/// Glyph layout along the baseline
pub mod layout {
    /// X offset of the first glyph origin
    pub const GLYPH_ORIGIN_X: f64 = 25.0;

    /// Horizontal advance between glyph origins
    pub const GLYPH_ADVANCE: f64 = 45.0;

    /// Baseline Y position
    pub const BASELINE_Y: f64 = 35.0;

    /// Font size range in pixels: [MIN, MIN + SPAN]
    pub const FONT_SIZE_MIN: f64 = 20.0;
    pub const FONT_SIZE_SPAN: f64 = 15.0;

    /// Shear factor range: [OFFSET, OFFSET + SPAN]
    pub const SHEAR_OFFSET: f64 = -0.25;
    pub const SHEAR_SPAN: f64 = 0.75;
}

/// Noise geometry
pub mod noise {
    /// Maximum dot radius
    pub const MAX_DOT_RADIUS: f64 = 2.0;

    /// Line stroke width range
    pub const MIN_LINE_WIDTH: f64 = 1.0;
    pub const MAX_LINE_WIDTH: f64 = 2.0;

    /// How far past the surface edge line points may reach: [MIN, MAX]
    pub const MIN_OVERSHOOT: f64 = 10.0;
    pub const MAX_OVERSHOOT: f64 = 50.0;
}
