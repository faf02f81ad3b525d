use std::time::Duration;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("connection attempt timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("device {0} not found")]
    DeviceNotFound(String),

    #[error("adapter error: {0}")]
    Adapter(String),

    #[error("failed to read characteristic {uuid}: {reason}")]
    ReadFailure { uuid: String, reason: String },

    #[error("no bluetooth adapter at index {0}")]
    NoAdapter(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<btleplug::Error> for Error {
    fn from(e: btleplug::Error) -> Self {
        Error::Adapter(e.to_string())
    }
}
