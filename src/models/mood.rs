//! The persisted mood record.
//!
//! Records are immutable: they are created once when a drawing is saved and
//! can only be deleted afterwards. The stored text is JSON; field names of the
//! earlier browser build (`timestamp`, `date`, `imageData`, `colors`) are still
//! accepted when reading.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{JourneyError, JourneyResult};

use super::Color;

/// Upper bound on the number of colors a signature may carry.
pub const MAX_SIGNATURE_COLORS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodRecord {
    id: String,
    #[serde(alias = "timestamp")]
    created_at: i64,
    #[serde(alias = "date", default)]
    iso_date: String,
    #[serde(alias = "imageData", with = "image_blob")]
    image: Vec<u8>,
    #[serde(alias = "colors", default)]
    color_signature: Vec<Color>,
    #[serde(default)]
    brush_size: u32,
}

impl MoodRecord {
    /// Builds a new record stamped with `created_at`. The signature is cut to
    /// [`MAX_SIGNATURE_COLORS`] entries.
    pub fn new(
        image: Vec<u8>,
        mut color_signature: Vec<Color>,
        brush_size: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        color_signature.truncate(MAX_SIGNATURE_COLORS);
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: created_at.timestamp_millis(),
            iso_date: iso_date(created_at),
            image,
            color_signature,
            brush_size,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Milliseconds since the Unix epoch.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }

    pub fn iso_date(&self) -> &str {
        &self.iso_date
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn color_signature(&self) -> &[Color] {
        &self.color_signature
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    pub fn to_json(&self) -> JourneyResult<String> {
        serde_json::to_string(self).map_err(|err| JourneyError::Serialization(err.to_string()))
    }

    /// Parses and validates a stored record.
    pub fn from_json(raw: &str) -> JourneyResult<Self> {
        let mut record: MoodRecord = serde_json::from_str(raw)
            .map_err(|err| JourneyError::deserialization(err.to_string()))?;

        if record.id.trim().is_empty() {
            return Err(JourneyError::deserialization("record id is empty"));
        }
        if record.color_signature.len() > MAX_SIGNATURE_COLORS {
            return Err(JourneyError::deserialization(format!(
                "color signature has {} entries (max {MAX_SIGNATURE_COLORS})",
                record.color_signature.len()
            )));
        }
        let created = record.created_at_utc().ok_or_else(|| {
            JourneyError::deserialization(format!(
                "timestamp {} is out of range",
                record.created_at
            ))
        })?;
        if record.iso_date.is_empty() {
            record.iso_date = iso_date(created);
        }

        Ok(record)
    }
}

fn iso_date(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Image bytes travel as a `data:` URL so the stored text stays flat.
mod image_blob {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let mut encoded = String::with_capacity(PNG_DATA_URL_PREFIX.len() + bytes.len() * 4 / 3 + 4);
        encoded.push_str(PNG_DATA_URL_PREFIX);
        BASE64.encode_string(bytes, &mut encoded);
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let payload = match raw.strip_prefix("data:") {
            Some(rest) => rest
                .split_once(";base64,")
                .map(|(_, data)| data)
                .ok_or_else(|| de::Error::custom("image data URL is not base64"))?,
            None => raw.as_str(),
        };
        BASE64.decode(payload).map_err(de::Error::custom)
    }
}
