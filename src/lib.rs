//! A visual mood journal: freehand drawings are reduced to a small color
//! signature, stored as records, and replayed as a timeline.

pub mod db;
pub mod error;
pub mod export;
pub mod journey;
pub mod models;
pub mod player;
pub mod raster;
pub mod repository;
pub mod settings;
pub mod stats;
pub mod store;
pub mod timeline;
pub mod utils;

pub use db::Database;
pub use error::{JourneyError, JourneyResult};
pub use export::export_record;
pub use journey::JourneyCanvas;
pub use models::{Color, MoodPreset, MoodRecord, MOOD_PALETTE};
pub use player::{PlayerState, PlayerStatus, TimelinePlayer};
pub use raster::{Canvas, RasterSource, SignatureExtractor};
pub use repository::MoodRepository;
pub use settings::{JourneyConfig, SettingsStore};
pub use stats::JourneyStats;
pub use store::{KeyValueStore, MemoryStore, StoreError};
pub use utils::init_logging;
