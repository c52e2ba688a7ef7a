use super::Color;

/// A named mood color offered to the painter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodPreset {
    pub name: &'static str,
    pub color: Color,
}

pub const MOOD_PALETTE: [MoodPreset; 8] = [
    MoodPreset {
        name: "Joy",
        color: Color::rgb(0xFF, 0xD9, 0x3D),
    },
    MoodPreset {
        name: "Calm",
        color: Color::rgb(0x6B, 0xCB, 0x77),
    },
    MoodPreset {
        name: "Peaceful",
        color: Color::rgb(0x4D, 0x96, 0xFF),
    },
    MoodPreset {
        name: "Love",
        color: Color::rgb(0xFF, 0x6B, 0x9D),
    },
    MoodPreset {
        name: "Energy",
        color: Color::rgb(0xFF, 0x57, 0x22),
    },
    MoodPreset {
        name: "Mystery",
        color: Color::rgb(0x9C, 0x27, 0xB0),
    },
    MoodPreset {
        name: "Melancholy",
        color: Color::rgb(0x60, 0x7D, 0x8B),
    },
    MoodPreset {
        name: "Hope",
        color: Color::rgb(0x00, 0xBC, 0xD4),
    },
];

impl MoodPreset {
    pub fn by_name(name: &str) -> Option<MoodPreset> {
        MOOD_PALETTE
            .iter()
            .copied()
            .find(|preset| preset.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn by_color(color: Color) -> Option<MoodPreset> {
        MOOD_PALETTE.iter().copied().find(|preset| preset.color == color)
    }
}
