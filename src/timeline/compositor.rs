//! Journey strip: one equal-width gradient segment per record.
//!
//! Records must arrive oldest first. Segment `i` of `n` covers the columns
//! whose centers fall in `[i * w / n, (i + 1) * w / n)`. Its gradient runs
//! from the segment's top-left corner to its bottom-right corner, with the
//! signature colors as evenly spaced stops. Records without a signature leave
//! their segment untouched.

use image::RgbaImage;

use crate::models::{Color, MoodRecord};

/// Renders onto a transparent `width x height` image.
pub fn composite<'a, I>(records: I, width: u32, height: u32) -> RgbaImage
where
    I: IntoIterator<Item = &'a MoodRecord>,
{
    let mut canvas = RgbaImage::new(width, height);
    composite_onto(records, &mut canvas);
    canvas
}

/// Paints the strip over an existing background. No records, no paint.
pub fn composite_onto<'a, I>(records: I, canvas: &mut RgbaImage)
where
    I: IntoIterator<Item = &'a MoodRecord>,
{
    let signatures: Vec<&[Color]> = records
        .into_iter()
        .map(MoodRecord::color_signature)
        .collect();
    let count = signatures.len();
    let (width, height) = canvas.dimensions();
    if count == 0 || width == 0 || height == 0 {
        return;
    }

    let segment_width = f64::from(width) / count as f64;
    let axis_len_sq = segment_width * segment_width + f64::from(height) * f64::from(height);

    for x in 0..width {
        let index = segment_of_column(x, segment_width, count);
        let stops = signatures[index];
        if stops.is_empty() {
            continue;
        }

        let dx = f64::from(x) + 0.5 - index as f64 * segment_width;
        for y in 0..height {
            let dy = f64::from(y) + 0.5;
            let t = (dx * segment_width + dy * f64::from(height)) / axis_len_sq;
            let color = sample_gradient(stops, t);
            canvas.put_pixel(x, y, image::Rgba(color.to_rgba(255)));
        }
    }
}

/// Column range `[start, end)` painted for segment `index` of `count`.
pub fn segment_span(index: usize, count: usize, width: u32) -> Option<(u32, u32)> {
    if index >= count || width == 0 {
        return None;
    }
    let segment_width = f64::from(width) / count as f64;
    let mut columns = (0..width).filter(|&x| segment_of_column(x, segment_width, count) == index);
    let start = columns.next()?;
    let end = columns.last().unwrap_or(start) + 1;
    Some((start, end))
}

fn segment_of_column(x: u32, segment_width: f64, count: usize) -> usize {
    let index = ((f64::from(x) + 0.5) / segment_width).floor() as usize;
    index.min(count - 1)
}

/// Stop `i` of `n` sits at `i / (n - 1)`; a lone stop fills solid.
fn sample_gradient(stops: &[Color], t: f64) -> Color {
    match stops {
        [] => Color::rgb(0, 0, 0),
        [only] => *only,
        _ => {
            let last = stops.len() - 1;
            let pos = t.clamp(0.0, 1.0) * last as f64;
            let lower = (pos.floor() as usize).min(last - 1);
            let local = (pos - lower as f64) as f32;
            stops[lower].lerp(stops[lower + 1], local)
        }
    }
}
