use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
    time::Duration,
};

use crate::error::{JourneyError, JourneyResult};
use crate::models::MAX_SIGNATURE_COLORS;

const ENABLE_LOGS: bool = true;
use crate::log_warn;

/// Tunables for sampling and playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JourneyConfig {
    /// Pixels skipped per sample when reading a drawing.
    pub sample_stride: usize,
    /// Delay between timeline playback steps.
    pub animation_interval_ms: u64,
    /// Cap on dominant colors retained per drawing.
    pub max_signature_colors: usize,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            sample_stride: 10,
            animation_interval_ms: 1000,
            max_signature_colors: MAX_SIGNATURE_COLORS,
        }
    }
}

impl JourneyConfig {
    pub fn validate(&self) -> JourneyResult<()> {
        if self.sample_stride == 0 {
            return Err(JourneyError::config("sampleStride must be at least 1"));
        }
        if self.animation_interval_ms == 0 {
            return Err(JourneyError::config("animationIntervalMs must be at least 1"));
        }
        if !(1..=MAX_SIGNATURE_COLORS).contains(&self.max_signature_colors) {
            return Err(JourneyError::config(format!(
                "maxSignatureColors must be between 1 and {MAX_SIGNATURE_COLORS}"
            )));
        }
        Ok(())
    }

    pub fn animation_interval(&self) -> Duration {
        Duration::from_millis(self.animation_interval_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSettings {
    #[serde(default)]
    journey: JourneyConfig,
}

/// JSON-file backed settings, written through on every update.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> JourneyResult<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            match serde_json::from_str::<UserSettings>(&contents) {
                Ok(parsed) if parsed.journey.validate().is_ok() => parsed,
                Ok(_) => {
                    log_warn!(
                        "Settings at {} are out of range; using defaults",
                        path.display()
                    );
                    UserSettings::default()
                }
                Err(err) => {
                    log_warn!(
                        "Settings at {} could not be parsed ({err}); using defaults",
                        path.display()
                    );
                    UserSettings::default()
                }
            }
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn journey(&self) -> JourneyConfig {
        match self.data.read() {
            Ok(guard) => guard.journey,
            Err(poisoned) => poisoned.into_inner().journey,
        }
    }

    pub fn update_journey(&self, config: JourneyConfig) -> JourneyResult<()> {
        config.validate()?;
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut next = guard.clone();
        next.journey = config;
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> JourneyResult<()> {
        let serialized = serde_json::to_string_pretty(data)
            .map_err(|err| JourneyError::Serialization(err.to_string()))?;
        fs::write(&self.path, serialized).map_err(|err| {
            log_warn!("Failed to write settings to {}: {err}", self.path.display());
            JourneyError::Io(err)
        })
    }
}
