//! CAPTCHA image generation.
//!
//! Paints a white background, optional noise (dots, then curves), and five
//! individually sheared glyphs, returning the text that was drawn. Noise is
//! painted first so the glyphs stay on top.

use glyphwall_common::constants::layout::{
    BASELINE_Y, FONT_SIZE_MIN, FONT_SIZE_SPAN, GLYPH_ADVANCE, GLYPH_ORIGIN_X, SHEAR_OFFSET,
    SHEAR_SPAN,
};
use glyphwall_common::constants::noise::{
    MAX_DOT_RADIUS, MAX_LINE_WIDTH, MAX_OVERSHOOT, MIN_LINE_WIDTH, MIN_OVERSHOOT,
};
use glyphwall_common::constants::{ANSWER_LENGTH, SURFACE_HEIGHT, SURFACE_WIDTH};
use glyphwall_common::{CaptchaOptions, Color, CountRange, GlyphwallError, Result};

use crate::random::{RandomSource, deep_color, pick_index, random_color, uniform};
use crate::surface::{Affine, CubicBezier, GlyphPaint, Point, Stroke, Surface, with_transform};

/// CAPTCHA generator
#[derive(Debug, Clone)]
pub struct CaptchaGenerator {
    options: CaptchaOptions,
    alphabet: Vec<char>,
}

impl CaptchaGenerator {
    pub fn new(options: CaptchaOptions) -> Self {
        let alphabet = options.characters.chars().collect();
        Self { options, alphabet }
    }

    /// True if `c` can appear in an answer
    pub fn accepts(&self, c: char) -> bool {
        self.alphabet.contains(&c)
    }

    /// Paint a fresh challenge onto `surface` and return its answer.
    ///
    /// The surface is reset first, so nothing from a previous challenge
    /// survives. On error the surface may be left partially painted.
    pub fn generate<S, R>(&self, surface: &mut S, rng: &mut R) -> Result<String>
    where
        S: Surface + ?Sized,
        R: RandomSource + ?Sized,
    {
        if self.alphabet.is_empty() {
            return Err(GlyphwallError::EmptyAlphabet);
        }

        surface.reset(SURFACE_WIDTH, SURFACE_HEIGHT)?;
        let (width, height) = surface.dimensions();
        let (width, height) = (f64::from(width), f64::from(height));
        surface.fill_rect(Point::ORIGIN, width, height, Color::WHITE)?;

        let dots = if self.options.need_dots {
            draw_dots(surface, rng, self.options.dot_range(), width, height)?
        } else {
            0
        };

        let lines = if self.options.need_lines {
            draw_lines(surface, rng, self.options.line_range(), width, height)?
        } else {
            0
        };

        let mut answer = String::with_capacity(ANSWER_LENGTH);
        for slot in 0..ANSWER_LENGTH {
            let glyph = self.alphabet[pick_index(rng, self.alphabet.len())];
            paint_glyph(surface, rng, slot, glyph)?;
            answer.push(glyph);
        }

        tracing::debug!(dots, lines, alphabet = self.alphabet.len(), "Generated CAPTCHA image");

        Ok(answer)
    }
}

impl Default for CaptchaGenerator {
    fn default() -> Self {
        Self::new(CaptchaOptions::default())
    }
}

/// Sample a loop count from an unordered range.
///
/// The real-valued sample is floor-truncated; negative or NaN samples give 0.
fn sample_count<R: RandomSource + ?Sized>(rng: &mut R, range: CountRange) -> usize {
    let (min, max) = range.ordered();
    let count = uniform(rng, min, max).floor();
    if count > 0.0 { count as usize } else { 0 }
}

fn draw_dots<S, R>(surface: &mut S, rng: &mut R, range: CountRange, width: f64, height: f64) -> Result<usize>
where
    S: Surface + ?Sized,
    R: RandomSource + ?Sized,
{
    let count = sample_count(rng, range);
    for _ in 0..count {
        let color = random_color(rng);
        let center = Point::new(rng.next_f64() * width, rng.next_f64() * height);
        let radius = rng.next_f64() * MAX_DOT_RADIUS;
        surface.fill_circle(center, radius, color)?;
    }
    Ok(count)
}

fn draw_lines<S, R>(surface: &mut S, rng: &mut R, range: CountRange, width: f64, height: f64) -> Result<usize>
where
    S: Surface + ?Sized,
    R: RandomSource + ?Sized,
{
    let count = sample_count(rng, range);
    for _ in 0..count {
        let stroke = Stroke {
            color: random_color(rng),
            width: uniform(rng, MIN_LINE_WIDTH, MAX_LINE_WIDTH),
        };
        let mut point = || {
            let x = overshoot(rng, width);
            let y = overshoot(rng, height);
            Point::new(x, y)
        };
        let start = point();
        let control_a = point();
        let control_b = point();
        let end = point();
        surface.stroke_bezier(
            &CubicBezier {
                start,
                control_a,
                control_b,
                end,
            },
            stroke,
        )?;
    }
    Ok(count)
}

/// Coordinate in `[0, extent + margin)` with a random margin past the edge
fn overshoot<R: RandomSource + ?Sized>(rng: &mut R, extent: f64) -> f64 {
    let scale = rng.next_f64();
    let margin = uniform(rng, MIN_OVERSHOOT, MAX_OVERSHOOT);
    scale * uniform(rng, extent, extent + margin)
}

fn paint_glyph<S, R>(surface: &mut S, rng: &mut R, slot: usize, glyph: char) -> Result<()>
where
    S: Surface + ?Sized,
    R: RandomSource + ?Sized,
{
    let paint = GlyphPaint {
        fill: deep_color(rng),
        stroke: Stroke {
            color: Color::BLACK,
            width: 1.0,
        },
        font_size: uniform(rng, FONT_SIZE_MIN, FONT_SIZE_MIN + FONT_SIZE_SPAN),
    };

    let origin = Affine::translate(GLYPH_ORIGIN_X + slot as f64 * GLYPH_ADVANCE, BASELINE_Y);
    let vertical = rng.next_f64() * SHEAR_SPAN + SHEAR_OFFSET;
    let horizontal = rng.next_f64() * SHEAR_SPAN + SHEAR_OFFSET;
    let transform = origin.then(&Affine::shear(vertical, horizontal));

    with_transform(surface, transform, |s| s.draw_glyph(glyph, &paint))
}
