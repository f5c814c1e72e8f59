//! Randomness utilities.
//!
//! Every sampler takes an explicit [`RandomSource`] so callers decide where
//! entropy comes from: the thread RNG in production, a seeded `StdRng` or a
//! [`ScriptedSource`] when the draw sequence must be reproducible.

use glyphwall_common::Color;
use glyphwall_common::constants::{DEFAULT_ID_LENGTH, ID_ALPHABET};
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// A source of uniform floats in `[0, 1)`
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Adapts any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<ThreadRng> {
    /// Thread-local generator, seeded by the OS
    pub fn thread() -> Self {
        Self::new(rand::rng())
    }
}

impl RngSource<StdRng> {
    /// Deterministic generator for reproducible challenges
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_f64(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed sequence of draws, wrapping around at the end.
///
/// Values are clamped into `[0, 1)`.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    /// An empty script always yields `0.0`
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Number of values handed out so far
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedSource {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// `random * (max - min) + min`; swapped bounds are not rejected
pub fn uniform<R: RandomSource + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    rng.next_f64() * (max - min) + min
}

/// Uniform index into a collection of `len` items. `len` must be non-zero.
pub(crate) fn pick_index<R: RandomSource + ?Sized>(rng: &mut R, len: usize) -> usize {
    ((rng.next_f64() * len as f64) as usize).min(len - 1)
}

/// Uniformly random color; each of the six hex digits is drawn independently
pub fn random_color<R: RandomSource + ?Sized>(rng: &mut R) -> Color {
    let mut digit = || pick_index(rng, 16) as u8;
    let r = digit() << 4 | digit();
    let g = digit() << 4 | digit();
    let b = digit() << 4 | digit();
    Color::new(r, g, b)
}

/// Dark, saturated color for glyph fills.
///
/// Hue in `[0, 1)`, saturation in `[0.8, 1.0]`, value in `[0.1, 0.4]`.
pub fn deep_color<R: RandomSource + ?Sized>(rng: &mut R) -> Color {
    let hue = rng.next_f64();
    let saturation = uniform(rng, 0.8, 1.0);
    let value = uniform(rng, 0.1, 0.4);
    hsv_to_rgb(hue, saturation, value)
}

/// Sector-based HSV to RGB conversion; all inputs in `[0, 1]`
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Color {
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    let channel = |x: f64| (x * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::new(channel(r), channel(g), channel(b))
}

/// Random identifier of `length` alphanumeric characters
pub fn random_id<R: RandomSource + ?Sized>(rng: &mut R, length: usize) -> String {
    let alphabet = ID_ALPHABET.as_bytes();
    (0..length)
        .map(|_| alphabet[pick_index(rng, alphabet.len())] as char)
        .collect()
}

/// [`random_id`] with the default length of 64
pub fn random_id_default<R: RandomSource + ?Sized>(rng: &mut R) -> String {
    random_id(rng, DEFAULT_ID_LENGTH)
}
