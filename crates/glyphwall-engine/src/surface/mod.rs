//! Drawing-surface capability.
//!
//! The generator paints through [`Surface`] and never owns the target.
//! [`RasterSurface`](crate::raster::RasterSurface) paints pixels;
//! [`RecordingSurface`] logs operations for inspection.

mod recording;

pub use recording::{DrawOp, RecordingSurface};

use glyphwall_common::{Color, Result};

/// A point in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Cubic Bézier segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub start: Point,
    pub control_a: Point,
    pub control_b: Point,
    pub end: Point,
}

impl CubicBezier {
    pub fn map(&self, transform: &Affine) -> Self {
        Self {
            start: transform.apply(self.start),
            control_a: transform.apply(self.control_a),
            control_b: transform.apply(self.control_b),
            end: transform.apply(self.end),
        }
    }
}

/// Stroke style for paths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// Paint for a single glyph: filled, then outlined
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPaint {
    pub font_size: f64,
    pub fill: Color,
    pub stroke: Stroke,
}

/// 2D affine matrix in canvas order.
///
/// Maps `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            e: x,
            f: y,
            ..Self::IDENTITY
        }
    }

    /// `vertical` skews y by x, `horizontal` skews x by y
    pub fn shear(vertical: f64, horizontal: f64) -> Self {
        Self {
            b: vertical,
            c: horizontal,
            ..Self::IDENTITY
        }
    }

    /// `self` applied after `inner`: the result maps `p` to `self(inner(p))`
    pub fn then(&self, inner: &Affine) -> Self {
        Self {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// `None` when the matrix collapses the plane
    pub fn invert(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < 1e-12 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A writable 2D raster target
pub trait Surface {
    /// Resize to `width` x `height`, discarding all content and transforms
    fn reset(&mut self, width: u32, height: u32) -> Result<()>;

    fn dimensions(&self) -> (u32, u32);

    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: Color) -> Result<()>;

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<()>;

    fn stroke_bezier(&mut self, curve: &CubicBezier, stroke: Stroke) -> Result<()>;

    /// Compose `transform` onto the current transform
    fn push_transform(&mut self, transform: Affine) -> Result<()>;

    /// Restore the transform in effect before the matching push
    fn pop_transform(&mut self) -> Result<()>;

    /// Fill and outline `glyph` with its baseline origin at the local origin
    fn draw_glyph(&mut self, glyph: char, paint: &GlyphPaint) -> Result<()>;
}

/// Run `draw` with `transform` applied, reverting it afterwards.
///
/// The transform is popped even if `draw` fails; the draw error wins.
pub fn with_transform<S, T, F>(surface: &mut S, transform: Affine, draw: F) -> Result<T>
where
    S: Surface + ?Sized,
    F: FnOnce(&mut S) -> Result<T>,
{
    surface.push_transform(transform)?;
    let drawn = draw(surface);
    let popped = surface.pop_transform();
    let value = drawn?;
    popped?;
    Ok(value)
}
