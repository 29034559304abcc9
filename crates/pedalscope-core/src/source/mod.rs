mod capture;

pub use capture::{CaptureFileSource, CaptureRecord};

use thiserror::Error;

/// One raw advertisement as seen by a beacon observer.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Unix timestamp in seconds, when the capture recorded one.
    pub ts: Option<f64>,
    /// Transport address of the emitting console.
    pub address: String,
    /// Signal strength; informational only, never validated.
    pub rssi: i16,
    /// Raw manufacturer-specific payload.
    pub payload: Vec<u8>,
}

/// Stream of observations feeding the replay pipeline.
pub trait ObservationSource {
    fn next_observation(&mut self) -> Result<Option<Observation>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid hex payload: {0}")]
    Hex(#[from] hex::FromHexError),
}
