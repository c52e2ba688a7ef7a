//! Application facade: one data directory holding the settings file and the
//! record database, plus the in-memory journey and its player.

use std::path::{Path, PathBuf};

use chrono::Utc;
use image::RgbaImage;
use tokio::sync::watch;

use crate::db::Database;
use crate::error::JourneyResult;
use crate::export::export_record;
use crate::models::MoodRecord;
use crate::player::{PlayerState, TimelinePlayer};
use crate::raster::{Canvas, SignatureExtractor};
use crate::repository::MoodRepository;
use crate::settings::{JourneyConfig, SettingsStore};
use crate::stats::JourneyStats;
use crate::store::{KeyValueStore, StoreError};
use crate::timeline::composite;

const ENABLE_LOGS: bool = true;
use crate::{log_info, log_warn};

pub const SETTINGS_FILE: &str = "settings.json";
pub const DATABASE_FILE: &str = "journeycanvas.sqlite3";

pub struct JourneyCanvas<S = Database> {
    settings: SettingsStore,
    repository: MoodRepository<S>,
    extractor: SignatureExtractor,
    player: TimelinePlayer,
}

impl JourneyCanvas<Database> {
    /// Opens (or creates) the journey stored under `data_dir`.
    ///
    /// A journey whose records cannot be listed opens empty rather than
    /// failing; the problem is logged.
    pub async fn open(data_dir: impl AsRef<Path>) -> JourneyResult<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;

        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;
        let database = Database::new(data_dir.join(DATABASE_FILE)).map_err(StoreError::from)?;

        let mut journey = Self::with_store(database, settings);
        journey.reload().await;
        Ok(journey)
    }

    pub fn database_path(&self) -> Option<PathBuf> {
        self.repository.store().path().map(Path::to_path_buf)
    }
}

impl<S: KeyValueStore> JourneyCanvas<S> {
    /// Wraps an already opened store. Records are not loaded until
    /// [`JourneyCanvas::reload`] is called.
    pub fn with_store(store: S, settings: SettingsStore) -> Self {
        let config = settings.journey();
        Self {
            settings,
            repository: MoodRepository::new(store),
            extractor: SignatureExtractor::from_config(&config),
            player: TimelinePlayer::new(config.animation_interval()),
        }
    }

    /// Reloads every record from the store. Returns the number loaded.
    pub async fn reload(&mut self) -> usize {
        self.player.reset().await;
        match self.repository.load_all().await {
            Ok(records) => records.len(),
            Err(err) => {
                log_warn!("Journey opened empty: {err}");
                0
            }
        }
    }

    /// Turns the canvas into a stored record and clears it. On failure the
    /// canvas keeps the drawing so the save can be retried.
    pub async fn save_mood(&mut self, canvas: &mut Canvas) -> JourneyResult<MoodRecord> {
        let raster = canvas.snapshot();
        let signature = self.extractor.extract(&raster);
        let record = MoodRecord::new(
            raster.encode_png()?,
            signature,
            canvas.brush_size(),
            Utc::now(),
        );

        self.repository.create(record.clone()).await?;
        self.stop_for_mutation().await;
        canvas.clear();
        Ok(record)
    }

    pub async fn delete_mood(&mut self, id: &str) -> JourneyResult<Option<MoodRecord>> {
        let removed = self.repository.remove(id).await?;
        if removed.is_some() {
            self.stop_for_mutation().await;
        }
        Ok(removed)
    }

    pub fn export_mood(&self, id: &str, dir: &Path) -> JourneyResult<Option<PathBuf>> {
        self.repository
            .get(id)
            .map(|record| export_record(record, dir))
            .transpose()
    }
}

impl<S> JourneyCanvas<S> {
    pub fn repository(&self) -> &MoodRepository<S> {
        &self.repository
    }

    /// Newest first.
    pub fn moods(&self) -> &[MoodRecord] {
        self.repository.records()
    }

    pub fn select(&mut self, id: &str) -> bool {
        self.repository.select(id)
    }

    pub fn clear_selection(&mut self) {
        self.repository.clear_selection();
    }

    pub fn selected(&self) -> Option<&MoodRecord> {
        self.repository.selected()
    }

    /// Timeline strip of the whole journey, oldest record on the left.
    pub fn timeline(&self, width: u32, height: u32) -> RgbaImage {
        composite(self.repository.chronological(), width, height)
    }

    pub fn stats(&self) -> JourneyStats {
        JourneyStats::compute(self.repository.records(), Utc::now())
    }

    pub fn config(&self) -> JourneyConfig {
        self.settings.journey()
    }

    /// Validates and persists `config`. A new animation interval resets any
    /// playback in progress; playback subscribers stay attached.
    pub async fn update_config(&mut self, config: JourneyConfig) -> JourneyResult<()> {
        let previous = self.settings.journey();
        self.settings.update_journey(config)?;
        self.extractor = SignatureExtractor::from_config(&config);
        if previous.animation_interval_ms != config.animation_interval_ms {
            self.player.set_interval(config.animation_interval()).await;
        }
        log_info!("Journey settings updated");
        Ok(())
    }

    pub async fn start_playback(&self) -> JourneyResult<PlayerState> {
        self.player.start(self.repository.len()).await
    }

    pub async fn stop_playback(&self) -> JourneyResult<PlayerState> {
        self.player.stop().await
    }

    pub async fn reset_playback(&self) -> PlayerState {
        self.player.reset().await
    }

    pub async fn playback(&self) -> PlayerState {
        self.player.snapshot().await
    }

    pub fn subscribe_playback(&self) -> watch::Receiver<PlayerState> {
        self.player.subscribe()
    }

    /// The record the player is currently showing, if it is running.
    pub async fn playback_record(&self) -> Option<&MoodRecord> {
        let state = self.player.snapshot().await;
        if !state.is_running() {
            return None;
        }
        self.repository.chronological().nth(state.current_index)
    }

    /// Playback indexes into the record list, so a running player is rewound
    /// whenever that list changes.
    async fn stop_for_mutation(&self) {
        if self.player.snapshot().await.is_running() {
            self.player.reset().await;
        }
    }
}
