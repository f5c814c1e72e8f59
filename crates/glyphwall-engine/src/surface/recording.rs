//! Surface that records draw calls instead of painting.

use glyphwall_common::{Color, GlyphwallError, Result};

use super::{Affine, CubicBezier, GlyphPaint, Point, Stroke, Surface};

/// One recorded surface operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Reset { width: u32, height: u32 },
    FillRect { origin: Point, width: f64, height: f64, color: Color },
    FillCircle { center: Point, radius: f64, color: Color },
    StrokeBezier { curve: CubicBezier, stroke: Stroke },
    PushTransform(Affine),
    PopTransform,
    Glyph { glyph: char, paint: GlyphPaint, transform: Affine },
}

/// In-memory operation log.
///
/// Glyph entries capture the composed transform in effect when they were
/// drawn, so layout can be asserted without rasterizing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
    transforms: Vec<Affine>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Number of recorded ops matching `pred`
    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    pub fn dots(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::FillCircle { .. }))
    }

    pub fn curves(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::StrokeBezier { .. }))
    }

    /// Glyph characters in draw order
    pub fn glyphs(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Glyph { glyph, .. } => Some(*glyph),
                _ => None,
            })
            .collect()
    }

    pub fn transform_depth(&self) -> usize {
        self.transforms.len()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.transforms.clear();
    }

    fn current_transform(&self) -> Affine {
        self.transforms.last().copied().unwrap_or(Affine::IDENTITY)
    }
}

impl Surface for RecordingSurface {
    fn reset(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        self.transforms.clear();
        self.ops.push(DrawOp::Reset { width, height });
        Ok(())
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: Color) -> Result<()> {
        self.ops.push(DrawOp::FillRect {
            origin,
            width,
            height,
            color,
        });
        Ok(())
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<()> {
        self.ops.push(DrawOp::FillCircle {
            center,
            radius,
            color,
        });
        Ok(())
    }

    fn stroke_bezier(&mut self, curve: &CubicBezier, stroke: Stroke) -> Result<()> {
        self.ops.push(DrawOp::StrokeBezier {
            curve: *curve,
            stroke,
        });
        Ok(())
    }

    fn push_transform(&mut self, transform: Affine) -> Result<()> {
        let composed = self.current_transform().then(&transform);
        self.transforms.push(composed);
        self.ops.push(DrawOp::PushTransform(transform));
        Ok(())
    }

    fn pop_transform(&mut self) -> Result<()> {
        self.transforms
            .pop()
            .ok_or_else(|| GlyphwallError::Surface("transform stack underflow".into()))?;
        self.ops.push(DrawOp::PopTransform);
        Ok(())
    }

    fn draw_glyph(&mut self, glyph: char, paint: &GlyphPaint) -> Result<()> {
        self.ops.push(DrawOp::Glyph {
            glyph,
            paint: *paint,
            transform: self.current_transform(),
        });
        Ok(())
    }
}
