use crate::error::{FanowireError, Result};
use crate::pipeline::{CodeTable, EncodingParams};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entropy coder options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionAlgorithm {
    #[default]
    FanoShannon,
}

impl CompressionAlgorithm {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::FanoShannon => "fano-shannon",
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for CompressionAlgorithm {
    type Err = FanowireError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fano-shannon" => Ok(Self::FanoShannon),
            _ => Err(FanowireError::UnsupportedAlgorithm(format!(
                "compression: {}",
                s
            ))),
        }
    }
}

/// Channel code options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Orthogonal,
}

impl Encoding {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Orthogonal => "orthogonal",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for Encoding {
    type Err = FanowireError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "orthogonal" => Ok(Self::Orthogonal),
            _ => Err(FanowireError::UnsupportedAlgorithm(format!("encoding: {}", s))),
        }
    }
}

/// Everything the receiver needs to undo each stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub code_table: CodeTable,
    pub encoding_params: EncodingParams,
    /// Entropy-coded bit count before byte alignment and padding
    pub compressed_length: usize,
}

/// Wire message from sender to receiver.
///
/// Algorithm tags are kept as text so an unknown tag reaches the receiver
/// and is rejected as unsupported rather than as malformed JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Base64 of the packed, FEC-encoded, possibly corrupted bytes
    pub encoded_message: String,
    pub compression_algorithm: String,
    pub encoding: String,
    pub parameters: Parameters,
    /// Bits flipped by the sender's channel simulation
    pub errors: usize,
    #[serde(rename = "SHA256")]
    pub sha256: String,
    /// Shannon entropy of the original bytes, bits per byte
    pub entropy: f64,
}

impl Envelope {
    pub fn compression(&self) -> Result<CompressionAlgorithm> {
        self.compression_algorithm.parse()
    }

    pub fn encoding(&self) -> Result<Encoding> {
        self.encoding.parse()
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parse an envelope; any missing or mistyped field is an error
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| FanowireError::InvalidEnvelope(e.to_string()))
    }
}

/// Receiver report for a successfully decoded envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeReport {
    pub success: bool,
    pub errors_corrected: usize,
    pub original_errors: usize,
    pub sha256_match: bool,
    pub decoded_sha256: String,
    pub original_sha256: String,
    pub final_entropy: f64,
    pub original_entropy: f64,
    pub decompressed_size: usize,
    pub message: String,
}

/// Receiver report when decoding failed; carries no payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeFailure {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl DecodeFailure {
    pub fn new(error: &FanowireError) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            message: format!("Decoding failed: {}", error),
        }
    }
}

/// Response body returned for every envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecodeResponse {
    Success(DecodeReport),
    Failure(DecodeFailure),
}

impl DecodeResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success(report) => &report.message,
            Self::Failure(failure) => &failure.message,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}
