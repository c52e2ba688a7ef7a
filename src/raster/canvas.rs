//! Freehand drawing surface fed by gesture points.

use image::{Rgba, RgbaImage};

use crate::models::{Color, MoodPreset};

use super::RasterSource;

pub const MIN_BRUSH_SIZE: u32 = 5;
pub const MAX_BRUSH_SIZE: u32 = 50;
pub const DEFAULT_BRUSH_SIZE: u32 = 15;

/// Opacity applied to every stroke.
pub const STROKE_OPACITY: f32 = 0.8;

pub struct Canvas {
    image: RgbaImage,
    color: Color,
    brush_size: u32,
    last_point: Option<(f32, f32)>,
}

impl Canvas {
    /// Transparent canvas with the default brush (Love, 15px).
    pub fn new(width: u32, height: u32) -> Self {
        let color = MoodPreset::by_name("Love")
            .map(|preset| preset.color)
            .unwrap_or(Color::rgb(0xFF, 0x6B, 0x9D));
        Self {
            image: RgbaImage::new(width, height),
            color,
            brush_size: DEFAULT_BRUSH_SIZE,
            last_point: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    /// Clamped to `MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE`.
    pub fn set_brush_size(&mut self, size: u32) {
        self.brush_size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    pub fn is_drawing(&self) -> bool {
        self.last_point.is_some()
    }

    pub fn begin_stroke(&mut self, x: f32, y: f32) {
        self.paint_segment((x, y), (x, y));
        self.stamp_glow((x, y));
        self.last_point = Some((x, y));
    }

    /// Extends the active stroke. Ignored when no gesture is active.
    pub fn stroke_to(&mut self, x: f32, y: f32) {
        let Some(from) = self.last_point else {
            return;
        };
        self.paint_segment(from, (x, y));
        self.stamp_glow((x, y));
        self.last_point = Some((x, y));
    }

    pub fn end_stroke(&mut self) {
        self.last_point = None;
    }

    pub fn clear(&mut self) {
        self.image.pixels_mut().for_each(|px| *px = Rgba([0, 0, 0, 0]));
        self.last_point = None;
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// The finalized raster. Any active stroke is left as painted so far.
    pub fn snapshot(&self) -> RasterSource {
        RasterSource::from_image(self.image.clone())
    }

    /// Round-capped segment of `brush_size` width; each covered pixel is
    /// blended once.
    fn paint_segment(&mut self, from: (f32, f32), to: (f32, f32)) {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        let radius = self.brush_size as f32 / 2.0;
        let min_x = (from.0.min(to.0) - radius).floor().max(0.0) as u32;
        let min_y = (from.1.min(to.1) - radius).floor().max(0.0) as u32;
        let max_x = (from.0.max(to.0) + radius).ceil().min(width as f32 - 1.0);
        let max_y = (from.1.max(to.1) + radius).ceil().min(height as f32 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as u32, max_y as u32);

        let src = self.color.to_rgba(255);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let center = (x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(center, from, to) <= radius {
                    let dst = self.image.get_pixel_mut(x, y);
                    dst.0 = blend_over(dst.0, src, STROKE_OPACITY);
                }
            }
        }
    }

    /// Soft radial stamp at a gesture point: full brush color at the center
    /// fading to transparent at `brush_size` away.
    fn stamp_glow(&mut self, center: (f32, f32)) {
        let (width, height) = self.image.dimensions();
        let radius = self.brush_size as f32;
        let min_x = (center.0 - radius).floor().max(0.0) as u32;
        let min_y = (center.1 - radius).floor().max(0.0) as u32;
        let max_x = (center.0 + radius).ceil().min(width as f32 - 1.0);
        let max_y = (center.1 + radius).ceil().min(height as f32 - 1.0);
        if width == 0 || height == 0 || max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as u32, max_y as u32);

        let src = self.color.to_rgba(255);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - center.0;
                let dy = y as f32 + 0.5 - center.1;
                let falloff = 1.0 - (dx * dx + dy * dy).sqrt() / radius;
                if falloff > 0.0 {
                    let dst = self.image.get_pixel_mut(x, y);
                    dst.0 = blend_over(dst.0, src, falloff * STROKE_OPACITY);
                }
            }
        }
    }
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

/// Straight-alpha source-over.
fn blend_over(dst: [u8; 4], src: [u8; 4], opacity: f32) -> [u8; 4] {
    let sa = f32::from(src[3]) / 255.0 * opacity.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (f32::from(src[i]) * sa + f32::from(dst[i]) * da * (1.0 - sa)) / out_a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::SignatureExtractor;

    #[test]
    fn new_canvas_is_transparent_with_default_brush() {
        let canvas = Canvas::new(8, 8);
        assert!(canvas.image().pixels().all(|px| px.0[3] == 0));
        assert_eq!(canvas.brush_size(), DEFAULT_BRUSH_SIZE);
        assert_eq!(canvas.color().to_hex(), "#FF6B9D");
        assert!(!canvas.is_drawing());
    }

    #[test]
    fn brush_size_is_clamped() {
        let mut canvas = Canvas::new(4, 4);
        canvas.set_brush_size(1);
        assert_eq!(canvas.brush_size(), MIN_BRUSH_SIZE);
        canvas.set_brush_size(500);
        assert_eq!(canvas.brush_size(), MAX_BRUSH_SIZE);
    }

    #[test]
    fn stroke_paints_along_the_path_only() {
        let mut canvas = Canvas::new(40, 20);
        canvas.set_brush_size(6);
        canvas.begin_stroke(5.0, 10.0);
        canvas.stroke_to(30.0, 10.0);
        canvas.end_stroke();

        let on_path = canvas.image().get_pixel(18, 10).0;
        assert_eq!(on_path, [0xFF, 0x6B, 0x9D, 204]);
        assert_eq!(canvas.image().get_pixel(18, 0).0[3], 0);
        assert_eq!(canvas.image().get_pixel(39, 10).0[3], 0);
    }

    #[test]
    fn gesture_points_leave_a_fading_glow() {
        let mut canvas = Canvas::new(40, 40);
        canvas.set_brush_size(10);
        canvas.begin_stroke(20.0, 20.0);
        canvas.end_stroke();

        let alpha = |x: u32| canvas.image().get_pixel(x, 20).0[3];
        // Inside the hard dot, then only the glow, then nothing.
        assert!(alpha(20) > 204);
        assert!(alpha(26) > 0 && alpha(26) < alpha(22));
        assert!(alpha(28) < alpha(26));
        assert_eq!(alpha(31), 0);
        assert_eq!(canvas.image().get_pixel(26, 20).0[..3], [0xFF, 0x6B, 0x9D]);
    }

    #[test]
    fn stroke_to_without_gesture_is_ignored() {
        let mut canvas = Canvas::new(10, 10);
        canvas.stroke_to(5.0, 5.0);
        assert!(canvas.image().pixels().all(|px| px.0[3] == 0));
    }

    #[test]
    fn overpainting_one_color_keeps_it_exact() {
        let mut canvas = Canvas::new(30, 30);
        canvas.set_color(Color::rgb(0x4D, 0x96, 0xFF));
        canvas.set_brush_size(50);
        for _ in 0..3 {
            canvas.begin_stroke(0.0, 15.0);
            canvas.stroke_to(30.0, 15.0);
            canvas.end_stroke();
        }
        let signature = SignatureExtractor::new(1, 5).extract(&canvas.snapshot());
        assert_eq!(signature, vec![Color::rgb(0x4D, 0x96, 0xFF)]);
    }

    #[test]
    fn clear_resets_pixels_and_gesture() {
        let mut canvas = Canvas::new(10, 10);
        canvas.begin_stroke(5.0, 5.0);
        canvas.clear();
        assert!(!canvas.is_drawing());
        assert!(canvas.image().pixels().all(|px| px.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn points_outside_the_canvas_do_not_panic() {
        let mut canvas = Canvas::new(10, 10);
        canvas.begin_stroke(-100.0, -100.0);
        canvas.stroke_to(-50.0, -60.0);
        canvas.stroke_to(500.0, 500.0);
        canvas.end_stroke();

        let mut empty = Canvas::new(0, 0);
        empty.begin_stroke(1.0, 1.0);
    }
}
