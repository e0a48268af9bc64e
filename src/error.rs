use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FanowireError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid block width: {0}. Must be between 1 and 12 bits")]
    InvalidBlockBits(usize),

    #[error("Invalid block length: expected {expected} bits, got {actual}")]
    InvalidBlockLength { expected: usize, actual: usize },

    #[error("Invalid payload length: expected {expected} bits, got {actual}")]
    InvalidPayloadLength { expected: usize, actual: usize },

    #[error("Invalid pad block size: {0}. Must be between 1 and 255")]
    InvalidPadBlockSize(usize),

    #[error("Invalid padding: {0}")]
    InvalidPadding(String),

    #[error("Byte 0x{0:02X} has no entry in the code table")]
    SymbolNotInTable(u8),

    #[error("Invalid bit string: {0}")]
    InvalidBitString(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Parameter mismatch: {0}")]
    ParameterMismatch(String),

    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Not an image file: {0}")]
    NotAnImage(PathBuf),

    #[error("Invalid error percentage: {0}. Must be between 0 and 100")]
    InvalidErrorPercentage(f64),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Server returned status {status}: {body}")]
    ServerStatus { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, FanowireError>;
