use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlateauError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    #[error("non-numeric or missing value in channel '{channel}' at row {row}")]
    DataQuality { channel: String, row: usize },
    #[error("time sync failed: {0}")]
    Sync(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
