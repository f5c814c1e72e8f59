//! Pixel-buffer surface.
//!
//! Shapes go through `imageproc::drawing`. Glyphs are rasterized by
//! `rusttype` into an untransformed coverage mask, which is then sampled
//! through the inverse of the current transform so shear is applied per
//! destination pixel without leaving holes.

use std::io::Cursor;
use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};
use glyphwall_common::{Color, GlyphwallError, Result};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_cubic_bezier_curve_mut, draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use rusttype::{Font, Scale, point};

use crate::surface::{Affine, CubicBezier, GlyphPaint, Point, Stroke, Surface};

/// Coverage at or above this counts as inside the glyph
const INSIDE: f32 = 0.5;

/// Surface backed by an RGB image buffer
pub struct RasterSurface {
    canvas: RgbImage,
    font: Font<'static>,
    transforms: Vec<Affine>,
}

impl RasterSurface {
    pub fn new(font: Font<'static>) -> Self {
        Self {
            canvas: RgbImage::new(0, 0),
            font,
            transforms: Vec::new(),
        }
    }

    /// Load font data embedded in the binary
    pub fn from_static_font(data: &'static [u8]) -> Result<Self> {
        let font = Font::try_from_bytes(data)
            .ok_or_else(|| GlyphwallError::Font("unrecognized font data".into()))?;
        Ok(Self::new(font))
    }

    /// Load a TrueType/OpenType font from disk
    pub fn open_font(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| GlyphwallError::Font(format!("{}: {e}", path.display())))?;
        let font = Font::try_from_vec(data).ok_or_else(|| {
            GlyphwallError::Font(format!("{}: unrecognized font data", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "Loaded glyph font");
        Ok(Self::new(font))
    }

    pub fn image(&self) -> &RgbImage {
        &self.canvas
    }

    /// Encode the current contents as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut png = Vec::new();
        self.canvas
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| GlyphwallError::Encode(format!("PNG encode failed: {e}")))?;
        Ok(png)
    }

    /// `data:image/png;base64,...`
    pub fn to_data_uri(&self) -> Result<String> {
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(self.encode_png()?)))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }

    fn current_transform(&self) -> Affine {
        self.transforms.last().copied().unwrap_or(Affine::IDENTITY)
    }

    /// Clamped pixel bounds `[x0, x1) x [y0, y1)` covering `points`
    fn pixel_bounds(&self, points: &[Point]) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = self.canvas.dimensions();
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let (min_x, min_y) = (min_x.floor().max(0.0), min_y.floor().max(0.0));
        let (max_x, max_y) = (max_x.ceil().min(f64::from(w)), max_y.ceil().min(f64::from(h)));
        if !(min_x < max_x && min_y < max_y) {
            return None;
        }
        Some((min_x as u32, min_y as u32, max_x as u32, max_y as u32))
    }
}

fn rgb(color: Color) -> Rgb<u8> {
    Rgb(color.to_rgb())
}

/// Integer radius for imageproc, which paints `r = 0` as one pixel and
/// `r = 1` as a 5-pixel cross. Radii under half a pixel paint nothing.
fn pixel_radius(radius: f64) -> Option<i32> {
    if radius.is_nan() || radius < 0.5 {
        return None;
    }
    Some(radius.floor() as i32)
}

/// Offsets of the one-pixel passes that make up a stroke of `width`.
///
/// Passes are spread along the normal of the start-to-end chord, centred on
/// the curve, so near-vertical curves widen horizontally.
fn pass_offsets(curve: &CubicBezier, width: f64) -> Vec<Point> {
    let passes = width.round().max(1.0) as u32;
    let (dx, dy) = (curve.end.x - curve.start.x, curve.end.y - curve.start.y);
    let length = dx.hypot(dy);
    let normal = if length > f64::EPSILON {
        Point::new(-dy / length, dx / length)
    } else {
        Point::new(0.0, 1.0)
    };
    let centre = f64::from(passes - 1) / 2.0;
    (0..passes)
        .map(|pass| {
            let k = f64::from(pass) - centre;
            Point::new(normal.x * k, normal.y * k)
        })
        .collect()
}

fn to_f32(p: Point) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

fn blend(under: Rgb<u8>, over: Color, alpha: f32) -> Rgb<u8> {
    let mix = |u: u8, o: u8| (f32::from(o) * alpha + f32::from(u) * (1.0 - alpha)).round() as u8;
    let [r, g, b] = over.to_rgb();
    Rgb([mix(under[0], r), mix(under[1], g), mix(under[2], b)])
}

impl Surface for RasterSurface {
    fn reset(&mut self, width: u32, height: u32) -> Result<()> {
        self.canvas = RgbImage::new(width, height);
        self.transforms.clear();
        Ok(())
    }

    fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: Color) -> Result<()> {
        let m = self.current_transform();
        let corners = [
            m.apply(origin),
            m.apply(Point::new(origin.x + width, origin.y)),
            m.apply(Point::new(origin.x, origin.y + height)),
            m.apply(Point::new(origin.x + width, origin.y + height)),
        ];
        if let Some((x0, y0, x1, y1)) = self.pixel_bounds(&corners) {
            let rect = Rect::at(x0 as i32, y0 as i32).of_size(x1 - x0, y1 - y0);
            draw_filled_rect_mut(&mut self.canvas, rect, rgb(color));
        }
        Ok(())
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<()> {
        let m = self.current_transform();
        let center = m.apply(center);
        let Some(radius) = pixel_radius(radius * m.determinant().abs().sqrt()) else {
            return Ok(());
        };
        draw_filled_circle_mut(
            &mut self.canvas,
            (center.x.round() as i32, center.y.round() as i32),
            radius,
            rgb(color),
        );
        Ok(())
    }

    fn stroke_bezier(&mut self, curve: &CubicBezier, stroke: Stroke) -> Result<()> {
        let curve = curve.map(&self.current_transform());
        for offset in pass_offsets(&curve, stroke.width) {
            let shifted = curve.map(&Affine::translate(offset.x, offset.y));
            draw_cubic_bezier_curve_mut(
                &mut self.canvas,
                to_f32(shifted.start),
                to_f32(shifted.end),
                to_f32(shifted.control_a),
                to_f32(shifted.control_b),
                rgb(stroke.color),
            );
        }
        Ok(())
    }

    fn push_transform(&mut self, transform: Affine) -> Result<()> {
        let composed = self.current_transform().then(&transform);
        self.transforms.push(composed);
        Ok(())
    }

    fn pop_transform(&mut self) -> Result<()> {
        self.transforms
            .pop()
            .map(|_| ())
            .ok_or_else(|| GlyphwallError::Surface("transform stack underflow".into()))
    }

    fn draw_glyph(&mut self, glyph: char, paint: &GlyphPaint) -> Result<()> {
        let reach = paint.stroke.width.round().max(1.0) as i64;
        let Some(mask) = GlyphMask::rasterize(&self.font, glyph, paint.font_size as f32, reach)
        else {
            // Whitespace has no outline
            return Ok(());
        };

        let transform = self.current_transform();
        let inverse = transform
            .invert()
            .ok_or_else(|| GlyphwallError::Surface("degenerate glyph transform".into()))?;

        let corners = mask.local_corners().map(|p| transform.apply(p));
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(&corners) else {
            return Ok(());
        };

        for py in y0..y1 {
            for px in x0..x1 {
                let local = inverse.apply(Point::new(f64::from(px) + 0.5, f64::from(py) + 0.5));
                let (cx, cy) = (local.x.floor() as i64, local.y.floor() as i64);
                let pixel = self.canvas.get_pixel_mut(px, py);
                if mask.is_edge(cx, cy) {
                    *pixel = rgb(paint.stroke.color);
                } else {
                    let coverage = mask.coverage(cx, cy);
                    if coverage > 0.0 {
                        *pixel = blend(*pixel, paint.fill, coverage);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Untransformed glyph coverage, indexed in baseline-relative pixels
struct GlyphMask {
    left: i64,
    top: i64,
    width: i64,
    height: i64,
    coverage: Vec<f32>,
    reach: i64,
}

impl GlyphMask {
    fn rasterize(font: &Font<'static>, glyph: char, size: f32, reach: i64) -> Option<Self> {
        let glyph = font
            .glyph(glyph)
            .scaled(Scale::uniform(size))
            .positioned(point(0.0, 0.0));
        let bounds = glyph.pixel_bounding_box()?;

        let (width, height) = (i64::from(bounds.width()), i64::from(bounds.height()));
        let mut coverage = vec![0.0; (width * height) as usize];
        glyph.draw(|x, y, v| {
            coverage[(i64::from(y) * width + i64::from(x)) as usize] = v;
        });

        Some(Self {
            left: i64::from(bounds.min.x),
            top: i64::from(bounds.min.y),
            width,
            height,
            coverage,
            reach,
        })
    }

    /// Local-space box around the mask, padded for the outline
    fn local_corners(&self) -> [Point; 4] {
        let pad = self.reach as f64;
        let (x0, y0) = (self.left as f64 - pad, self.top as f64 - pad);
        let (x1, y1) = (x0 + self.width as f64 + 2.0 * pad, y0 + self.height as f64 + 2.0 * pad);
        [
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x0, y1),
            Point::new(x1, y1),
        ]
    }

    fn coverage(&self, x: i64, y: i64) -> f32 {
        let (col, row) = (x - self.left, y - self.top);
        if col < 0 || row < 0 || col >= self.width || row >= self.height {
            return 0.0;
        }
        self.coverage[(row * self.width + col) as usize]
    }

    /// Inside pixel within `reach` of an outside pixel
    fn is_edge(&self, x: i64, y: i64) -> bool {
        if self.coverage(x, y) < INSIDE {
            return false;
        }
        (1..=self.reach).any(|d| {
            [(d, 0), (-d, 0), (0, d), (0, -d)]
                .iter()
                .any(|(dx, dy)| self.coverage(x + dx, y + dy) < INSIDE)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::CaptchaGenerator;
    use crate::random::RngSource;
    use crate::surface::with_transform;
    use glyphwall_common::CaptchaOptions;

    const FONT: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans.ttf");

    fn surface() -> RasterSurface {
        RasterSurface::from_static_font(FONT).unwrap()
    }

    fn paint(fill: Color) -> GlyphPaint {
        GlyphPaint {
            font_size: 32.0,
            fill,
            stroke: Stroke {
                color: Color::BLACK,
                width: 1.0,
            },
        }
    }

    #[test]
    fn test_reset_and_fill() {
        let mut s = surface();
        s.reset(250, 50).unwrap();
        s.fill_rect(Point::ORIGIN, 250.0, 50.0, Color::WHITE).unwrap();
        assert_eq!(s.dimensions(), (250, 50));
        assert!(s.image().pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn test_glyph_paints_fill_and_outline() {
        let fill = Color::new(0x20, 0x10, 0x60);
        let mut s = surface();
        s.reset(80, 60).unwrap();
        s.fill_rect(Point::ORIGIN, 80.0, 60.0, Color::WHITE).unwrap();
        let big = GlyphPaint {
            font_size: 48.0,
            ..paint(fill)
        };
        with_transform(&mut s, Affine::translate(10.0, 50.0), |s| {
            s.draw_glyph('H', &big)
        })
        .unwrap();

        let pixels: Vec<_> = s.image().pixels().copied().collect();
        assert!(pixels.contains(&Rgb([0, 0, 0])), "missing outline");
        assert!(pixels.contains(&rgb(fill)), "missing solid fill");
    }

    #[test]
    fn test_space_draws_nothing() {
        let mut s = surface();
        s.reset(40, 40).unwrap();
        s.fill_rect(Point::ORIGIN, 40.0, 40.0, Color::WHITE).unwrap();
        with_transform(&mut s, Affine::translate(5.0, 30.0), |s| {
            s.draw_glyph(' ', &paint(Color::BLACK))
        })
        .unwrap();
        assert!(s.image().pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn test_degenerate_transform_fails() {
        let mut s = surface();
        s.reset(40, 40).unwrap();
        let result = with_transform(&mut s, Affine::shear(1.0, 1.0), |s| {
            s.draw_glyph('A', &paint(Color::BLACK))
        });
        assert!(matches!(result, Err(GlyphwallError::Surface(_))));
    }

    #[test]
    fn test_offscreen_shapes_are_clipped() {
        let mut s = surface();
        s.reset(20, 20).unwrap();
        s.fill_rect(Point::new(-50.0, -50.0), 10.0, 10.0, Color::BLACK).unwrap();
        s.fill_circle(Point::new(-10.0, 300.0), 2.0, Color::BLACK).unwrap();
        s.stroke_bezier(
            &CubicBezier {
                start: Point::new(-5.0, -5.0),
                control_a: Point::new(40.0, 10.0),
                control_b: Point::new(-20.0, 30.0),
                end: Point::new(45.0, 45.0),
            },
            Stroke {
                color: Color::new(1, 2, 3),
                width: 2.0,
            },
        )
        .unwrap();
        assert_eq!(s.dimensions(), (20, 20));
    }

    #[test]
    fn test_generated_png_round_trip() {
        let mut s = surface();
        let answer = CaptchaGenerator::new(CaptchaOptions::default())
            .generate(&mut s, &mut RngSource::seeded(2024))
            .unwrap();
        assert_eq!(answer.len(), 5);

        let png = s.encode_png().unwrap();
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (250, 50));
        assert!(s.to_data_uri().unwrap().starts_with("data:image/png;base64,"));
    }

    /// Bounds `(min_x, min_y, max_x, max_y)` of every non-white pixel
    fn ink_bounds(s: &RasterSurface) -> Option<(u32, u32, u32, u32)> {
        let white = Rgb([255, 255, 255]);
        s.image()
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != white)
            .fold(None, |acc, (x, y, _)| match acc {
                None => Some((x, y, x, y)),
                Some((x0, y0, x1, y1)) => Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y))),
            })
    }

    fn render_h(transform: Affine) -> (u32, u32, u32, u32) {
        let mut s = surface();
        s.reset(100, 70).unwrap();
        s.fill_rect(Point::ORIGIN, 100.0, 70.0, Color::WHITE).unwrap();
        with_transform(&mut s, transform, |s| {
            s.draw_glyph('H', &paint(Color::BLACK))
        })
        .unwrap();
        ink_bounds(&s).unwrap()
    }

    fn assert_near(actual: u32, expected: f64, what: &str) {
        assert!(
            (f64::from(actual) - expected).abs() <= 2.0,
            "{what}: got {actual}, expected about {expected}"
        );
    }

    #[test]
    fn test_translation_places_glyph() {
        let (x0, y0, x1, y1) = render_h(Affine::translate(20.0, 40.0));
        let (bx0, by0, bx1, by1) = render_h(Affine::translate(45.0, 50.0));
        assert_eq!((bx0 - x0, bx1 - x1), (25, 25));
        assert_eq!((by0 - y0, by1 - y1), (10, 10));
        // Ink sits above the baseline, starting just right of the origin
        assert!(y1 <= 40 && y0 < 30);
        assert!((20..26).contains(&x0));
    }

    #[test]
    fn test_vertical_shear_skews_glyph() {
        let origin = Point::new(20.0, 40.0);
        let plain = render_h(Affine::translate(origin.x, origin.y));
        let sheared =
            render_h(Affine::translate(origin.x, origin.y).then(&Affine::shear(0.5, 0.0)));

        // y' = y + 0.5 * x: columns stay put, rows drop in proportion to x
        let (x0, y0, x1, y1) = plain;
        assert_near(sheared.0, f64::from(x0), "left");
        assert_near(sheared.2, f64::from(x1), "right");
        assert_near(sheared.1, f64::from(y0) + 0.5 * (f64::from(x0) - origin.x), "top");
        assert_near(sheared.3, f64::from(y1) + 0.5 * (f64::from(x1) - origin.x), "bottom");
        assert!(sheared.3 > y1 + 5);
    }

    #[test]
    fn test_horizontal_shear_leans_glyph() {
        let origin = Point::new(40.0, 50.0);
        let plain = render_h(Affine::translate(origin.x, origin.y));
        let sheared =
            render_h(Affine::translate(origin.x, origin.y).then(&Affine::shear(0.0, 0.5)));

        // x' = x + 0.5 * y: ink above the baseline (y < 0) moves left
        let (x0, y0, x1, y1) = plain;
        assert_near(sheared.1, f64::from(y0), "top");
        assert_near(sheared.3, f64::from(y1), "bottom");
        assert_near(sheared.0, f64::from(x0) + 0.5 * (f64::from(y0) - origin.y), "left");
        assert_near(sheared.2, f64::from(x1) + 0.5 * (f64::from(y1) - origin.y), "right");
        assert!(sheared.0 + 5 < x0);
    }

    #[test]
    fn test_generated_glyphs_land_in_their_slots() {
        let mut s = surface();
        let generator = CaptchaGenerator::new(CaptchaOptions::plain("H"));
        for seed in 0..10 {
            generator.generate(&mut s, &mut RngSource::seeded(seed)).unwrap();
            let inked = |x: u32, y: u32| *s.image().get_pixel(x, y) != Rgb([255, 255, 255]);

            for slot in 0..5u32 {
                let origin = 25 + 45 * slot;
                let hit = (origin..origin + 15).any(|x| (25..45).any(|y| inked(x, y)));
                assert!(hit, "seed {seed}: no ink near slot {slot} at x = {origin}");
            }
            // Nothing left of the first glyph or right of the last
            assert!(!(0..8).any(|x| (0..50).any(|y| inked(x, y))), "seed {seed}");
            assert!(!(243..250).any(|x| (0..50).any(|y| inked(x, y))), "seed {seed}");
        }
    }

    #[test]
    fn test_pixel_radius() {
        assert_eq!(pixel_radius(0.0), None);
        assert_eq!(pixel_radius(0.2), None);
        assert_eq!(pixel_radius(0.7), Some(0));
        assert_eq!(pixel_radius(1.6), Some(1));
        assert_eq!(pixel_radius(f64::NAN), None);
    }

    #[test]
    fn test_small_dots_are_skipped() {
        let mut s = surface();
        s.reset(10, 10).unwrap();
        s.fill_rect(Point::ORIGIN, 10.0, 10.0, Color::WHITE).unwrap();
        s.fill_circle(Point::new(5.0, 5.0), 0.3, Color::BLACK).unwrap();
        assert!(ink_bounds(&s).is_none());

        s.fill_circle(Point::new(5.0, 5.0), 1.6, Color::BLACK).unwrap();
        let dark = s.image().pixels().filter(|p| **p == Rgb([0, 0, 0])).count();
        assert!(dark <= 9, "radius 1.6 painted {dark} pixels");
    }

    #[test]
    fn test_wide_stroke_widens_across_the_curve() {
        let vertical = CubicBezier {
            start: Point::new(10.25, 0.0),
            control_a: Point::new(10.25, 10.0),
            control_b: Point::new(10.25, 20.0),
            end: Point::new(10.25, 30.0),
        };
        let offsets = pass_offsets(&vertical, 2.0);
        assert_eq!(offsets.len(), 2);
        assert!(offsets.iter().all(|o| o.y.abs() < 1e-9));
        assert!((offsets[1].x - offsets[0].x).abs() > 0.99);

        let mut s = surface();
        s.reset(20, 30).unwrap();
        s.fill_rect(Point::ORIGIN, 20.0, 30.0, Color::WHITE).unwrap();
        s.stroke_bezier(
            &vertical,
            Stroke {
                color: Color::BLACK,
                width: 2.0,
            },
        )
        .unwrap();
        let (x0, _, x1, _) = ink_bounds(&s).unwrap();
        assert_eq!(x1 - x0, 1, "two-pixel stroke should span two columns");

        assert_eq!(pass_offsets(&vertical, 1.2), vec![Point::ORIGIN]);
    }
}
