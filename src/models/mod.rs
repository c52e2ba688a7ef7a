pub mod color;
pub mod mood;
pub mod palette;

pub use color::{Color, ParseColorError};
pub use mood::{MoodRecord, MAX_SIGNATURE_COLORS};
pub use palette::{MoodPreset, MOOD_PALETTE};
