use crate::store::StoreError;

pub type JourneyResult<T> = Result<T, JourneyError>;

#[derive(thiserror::Error, Debug)]
pub enum JourneyError {
    /// The key-value backend rejected or could not serve a request.
    /// Callers may retry; in-memory state is left untouched.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),

    #[error("deserialization failure: {0}")]
    Deserialization(String),

    #[error("serialization failure: {0}")]
    Serialization(String),

    #[error("invalid raster: {0}")]
    InvalidRaster(String),

    #[error("cannot {action} while {from}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl JourneyError {
    pub fn deserialization(msg: impl Into<String>) -> Self {
        Self::Deserialization(msg.into())
    }

    pub fn invalid_raster(msg: impl Into<String>) -> Self {
        Self::InvalidRaster(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Io(_))
    }
}
