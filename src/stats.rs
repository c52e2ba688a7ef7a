//! Cross-record statistics. Everything here is a pure function of the
//! record list it is handed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Color, MoodRecord};
use crate::raster::rank_by_frequency;

/// Longest color-frequency list reported.
pub const TOP_COLORS: usize = 8;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorShare {
    pub color: Color,
    pub count: usize,
    /// `count` relative to the number of records.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyStats {
    pub total_moods: usize,
    pub days_tracked: u64,
    pub unique_colors: usize,
    pub average_signature_size: usize,
    pub color_frequency: Vec<ColorShare>,
}

impl JourneyStats {
    pub fn compute<'a, I>(records: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a MoodRecord>,
        I::IntoIter: Clone,
    {
        let records = records.into_iter();
        let total_moods = records.clone().count();
        let color_frequency: Vec<ColorShare> = color_frequency(records.clone())
            .into_iter()
            .map(|(color, count)| ColorShare {
                color,
                count,
                share: if total_moods == 0 {
                    0.0
                } else {
                    count as f64 / total_moods as f64
                },
            })
            .collect();

        Self {
            total_moods,
            days_tracked: days_tracked(records.clone(), now),
            unique_colors: color_frequency.len(),
            average_signature_size: average_signature_size(records),
            color_frequency,
        }
    }
}

/// Occurrences of each color across every signature, most frequent first,
/// capped at [`TOP_COLORS`]. Ties keep the order colors were first met in.
pub fn color_frequency<'a, I>(records: I) -> Vec<(Color, usize)>
where
    I: IntoIterator<Item = &'a MoodRecord>,
{
    let colors = records
        .into_iter()
        .flat_map(|record| record.color_signature().iter().copied());
    rank_by_frequency(colors, TOP_COLORS)
}

/// Whole days, rounded up, since the oldest record. Records stamped in the
/// future count as zero days.
pub fn days_tracked<'a, I>(records: I, now: DateTime<Utc>) -> u64
where
    I: IntoIterator<Item = &'a MoodRecord>,
{
    let Some(oldest) = records.into_iter().map(MoodRecord::created_at).min() else {
        return 0;
    };
    let elapsed = now.timestamp_millis().saturating_sub(oldest).max(0);
    // Ceiling division on a non-negative value.
    ((elapsed + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY) as u64
}

/// Mean signature length rounded to the nearest integer, halves up.
pub fn average_signature_size<'a, I>(records: I) -> usize
where
    I: IntoIterator<Item = &'a MoodRecord>,
{
    let (count, total) = records
        .into_iter()
        .fold((0usize, 0usize), |(count, total), record| {
            (count + 1, total + record.color_signature().len())
        });
    if count == 0 {
        return 0;
    }
    (total * 2 + count) / (count * 2)
}
