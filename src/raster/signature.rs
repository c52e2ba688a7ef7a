//! Dominant-color signature of a finished drawing.
//!
//! The buffer is sampled at a fixed pixel stride in row-major order. Samples
//! below the visibility threshold count as unpainted. Colors are bucketed by
//! exact value and ranked by count, ties going to the color seen first.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::models::{Color, MAX_SIGNATURE_COLORS};
use crate::settings::JourneyConfig;

use super::RasterSource;

/// Samples with alpha below this are treated as unpainted.
pub const ALPHA_VISIBILITY_THRESHOLD: u8 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureExtractor {
    sample_stride: usize,
    max_colors: usize,
}

impl Default for SignatureExtractor {
    fn default() -> Self {
        Self::from_config(&JourneyConfig::default())
    }
}

impl SignatureExtractor {
    pub fn new(sample_stride: usize, max_colors: usize) -> Self {
        Self {
            sample_stride: sample_stride.max(1),
            max_colors: max_colors.min(MAX_SIGNATURE_COLORS),
        }
    }

    pub fn from_config(config: &JourneyConfig) -> Self {
        Self::new(config.sample_stride, config.max_signature_colors)
    }

    pub fn sample_stride(&self) -> usize {
        self.sample_stride
    }

    pub fn max_colors(&self) -> usize {
        self.max_colors
    }

    /// Returns up to `max_colors` colors, most frequent first. A blank
    /// (fully transparent) drawing yields an empty signature.
    pub fn extract(&self, raster: &RasterSource) -> Vec<Color> {
        let samples = raster
            .pixels()
            .chunks_exact(4)
            .step_by(self.sample_stride)
            .filter(|px| px[3] >= ALPHA_VISIBILITY_THRESHOLD)
            .map(|px| Color::rgb(px[0], px[1], px[2]));

        rank_by_frequency(samples, self.max_colors)
            .into_iter()
            .map(|(color, _)| color)
            .collect()
    }
}

/// Counts exact color occurrences and returns the `limit` most frequent,
/// descending by count with first-seen order breaking ties.
pub fn rank_by_frequency<I>(colors: I, limit: usize) -> Vec<(Color, usize)>
where
    I: IntoIterator<Item = Color>,
{
    struct Bucket {
        color: Color,
        count: usize,
        first_seen: usize,
    }

    let mut index: HashMap<Color, usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for color in colors {
        match index.get(&color) {
            Some(&slot) => buckets[slot].count += 1,
            None => {
                index.insert(color, buckets.len());
                buckets.push(Bucket {
                    color,
                    count: 1,
                    first_seen: buckets.len(),
                });
            }
        }
    }

    buckets.sort_by_key(|bucket| (Reverse(bucket.count), bucket.first_seen));
    buckets.truncate(limit);
    buckets
        .into_iter()
        .map(|bucket| (bucket.color, bucket.count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster_from_pixels(pixels: &[[u8; 4]]) -> RasterSource {
        let bytes = pixels.iter().flatten().copied().collect();
        RasterSource::from_rgba(pixels.len() as u32, 1, bytes).unwrap()
    }

    #[test]
    fn blank_canvas_has_empty_signature() {
        let raster = RasterSource::from_rgba(64, 48, vec![0; 64 * 48 * 4]).unwrap();
        assert!(SignatureExtractor::default().extract(&raster).is_empty());

        let faint = raster_from_pixels(&[[255, 0, 0, 127]; 40]);
        assert!(SignatureExtractor::new(1, 5).extract(&faint).is_empty());
    }

    #[test]
    fn single_opaque_color_is_the_whole_signature() {
        let raster = raster_from_pixels(&[[10, 20, 30, 255]; 25]);
        let signature = SignatureExtractor::default().extract(&raster);
        assert_eq!(signature, vec![Color::rgb(10, 20, 30)]);
    }

    #[test]
    fn ranks_by_count_then_first_seen() {
        let a = [1, 0, 0, 255];
        let b = [2, 0, 0, 255];
        let c = [3, 0, 0, 255];
        let raster = raster_from_pixels(&[c, a, b, a, b, c, a]);
        let signature = SignatureExtractor::new(1, 5).extract(&raster);
        // a: 3, c: 2 (seen first), b: 2
        assert_eq!(
            signature,
            vec![Color::rgb(1, 0, 0), Color::rgb(3, 0, 0), Color::rgb(2, 0, 0)]
        );
    }

    #[test]
    fn near_colors_are_distinct_buckets() {
        let raster = raster_from_pixels(&[[100, 100, 100, 255], [100, 100, 101, 255]]);
        assert_eq!(SignatureExtractor::new(1, 5).extract(&raster).len(), 2);
    }

    #[test]
    fn stride_skips_unsampled_pixels() {
        // Only indices 0, 3, 6 are sampled.
        let red = [255, 0, 0, 255];
        let blue = [0, 0, 255, 255];
        let raster = raster_from_pixels(&[red, blue, blue, red, blue, blue, red]);
        let signature = SignatureExtractor::new(3, 5).extract(&raster);
        assert_eq!(signature, vec![Color::rgb(255, 0, 0)]);
    }

    #[test]
    fn signature_is_capped() {
        let pixels: Vec<[u8; 4]> = (0..20u8).map(|i| [i, i, i, 255]).collect();
        let raster = raster_from_pixels(&pixels);
        assert_eq!(SignatureExtractor::new(1, 5).extract(&raster).len(), 5);
        assert_eq!(SignatureExtractor::new(1, 3).extract(&raster).len(), 3);
        assert_eq!(SignatureExtractor::new(1, 99).max_colors(), MAX_SIGNATURE_COLORS);
        assert_eq!(SignatureExtractor::new(0, 5).sample_stride(), 1);
    }

    #[test]
    fn rank_by_frequency_limits_output() {
        let red = Color::rgb(255, 0, 0);
        let green = Color::rgb(0, 255, 0);
        let ranked = rank_by_frequency([red, green, red], 8);
        assert_eq!(ranked, vec![(red, 2), (green, 1)]);
        assert_eq!(rank_by_frequency([red, green], 1), vec![(red, 1)]);
        assert!(rank_by_frequency(Vec::new(), 8).is_empty());
    }
}
