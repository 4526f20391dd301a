use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid routing settings: {0}")]
    InvalidSettings(String),
    #[error("Unknown stop: {0}")]
    UnknownStop(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to encode router state: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("Failed to decode router state: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("Corrupt router state: {0}")]
    CorruptState(String),
}
