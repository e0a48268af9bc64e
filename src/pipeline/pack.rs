use crate::bits::BitString;
use crate::error::{FanowireError, Result};

/// Byte block size the sender pads to, independent of the FEC block width
pub const DEFAULT_PAD_BLOCK: usize = 16;

/// Result of [`unpack`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unpacked {
    pub bits: BitString,
    /// False when the padding failed validation and the raw bytes were used as-is
    pub padding_intact: bool,
}

/// Append `n` copies of `n` so the length becomes a multiple of `block_size`.
/// Always appends at least one byte.
pub fn pad(data: &[u8], block_size: usize) -> Result<Vec<u8>> {
    if block_size == 0 || block_size > 255 {
        return Err(FanowireError::InvalidPadBlockSize(block_size));
    }
    let padding = block_size - data.len() % block_size;
    let mut padded = Vec::with_capacity(data.len() + padding);
    padded.extend_from_slice(data);
    padded.resize(data.len() + padding, padding as u8);
    Ok(padded)
}

/// Strip padding added by [`pad`]
pub fn unpad(data: &[u8]) -> Result<&[u8]> {
    let Some(&last) = data.last() else {
        return Err(FanowireError::InvalidPadding("cannot unpad empty data".into()));
    };
    let count = last as usize;
    if count == 0 || count > data.len() {
        return Err(FanowireError::InvalidPadding(format!(
            "pad length {} out of range for {} bytes",
            count,
            data.len()
        )));
    }
    let (body, tail) = data.split_at(data.len() - count);
    if tail.iter().any(|&b| b != last) {
        return Err(FanowireError::InvalidPadding(format!(
            "pad bytes do not all equal {}",
            count
        )));
    }
    Ok(body)
}

/// Byte-align `bits` with zero fill, then pad to a multiple of `block_size` bytes
pub fn pack(bits: &BitString, block_size: usize) -> Result<Vec<u8>> {
    pad(&bits.to_bytes(), block_size)
}

/// Reverse [`pack`].
///
/// Corrupt padding usually means the channel left errors the FEC could not
/// fix, so the raw bytes are converted instead of failing the whole message.
pub fn unpack(bytes: &[u8]) -> Unpacked {
    match unpad(bytes) {
        Ok(body) => Unpacked {
            bits: BitString::from_bytes(body),
            padding_intact: true,
        },
        Err(e) => {
            tracing::warn!("Padding error: {}; using {} unpadded bytes", e, bytes.len());
            Unpacked {
                bits: BitString::from_bytes(bytes),
                padding_intact: false,
            }
        }
    }
}
