//! Orthogonal block code built from a Sylvester Hadamard matrix.
//!
//! A payload of `n` bits selects one row of a `2^n x 2^n` Hadamard matrix
//! normalised to {0, 1}. Any two rows differ in exactly `2^(n-1)` positions,
//! so up to `(2^(n-1) - 1) / 2` flipped bits per block are always corrected.
//!
//! Decoding compares the received block against every row, which costs
//! O(4^n) per block. It is cheap at the default `n = 7` but grows fast, and
//! so does the matrix itself, which is why widths stop at [`MAX_BLOCK_BITS`].
//! Rows are packed bit strings, so each comparison is a run of XOR and
//! popcount over `u64` words.

use crate::bits::BitString;
use crate::error::{FanowireError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default payload width: 7 bits per 128-bit codeword
pub const DEFAULT_BLOCK_BITS: usize = 7;

/// Largest accepted payload width: 4096-bit codewords, 2 MiB of matrix
pub const MAX_BLOCK_BITS: usize = 12;

/// Parameters needed to strip block padding after decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingParams {
    /// Payload bits per block
    pub n: usize,
    /// Bit length before block padding
    pub original_length: usize,
    /// Zero bits appended to fill the final block
    pub padding_added: usize,
}

/// Immutable {0,1} Hadamard matrix of order `2^n`
pub struct HadamardMatrix {
    rows: Vec<BitString>,
}

impl HadamardMatrix {
    /// Sylvester matrix `[[H, H], [H, -H]]` doubled `n` times from `[1]`,
    /// with +1 mapped to 1 and -1 to 0.
    ///
    /// Entry `(i, j)` of the doubled matrix is -1 exactly when `i & j` has
    /// odd parity, so each row is generated directly.
    pub fn sylvester(n: usize) -> Self {
        let order = 1usize << n;
        let rows = (0..order)
            .map(|i| (0..order).map(|j| (i & j).count_ones() % 2 == 0).collect())
            .collect();
        Self { rows }
    }

    /// Number of rows (and columns)
    pub fn order(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> &BitString {
        &self.rows[index]
    }

    pub fn rows(&self) -> &[BitString] {
        &self.rows
    }

    /// Row with the highest agreement with `received`; the lowest index wins ties
    fn closest_row(&self, received: &BitString) -> usize {
        let mut best = 0;
        let mut best_agreement = 0;
        for (index, row) in self.rows.iter().enumerate() {
            let agreement = self.order() - row.hamming_distance(received);
            if agreement > best_agreement {
                best = index;
                best_agreement = agreement;
            }
        }
        best
    }
}

impl fmt::Debug for HadamardMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HadamardMatrix")
            .field("order", &self.order())
            .finish()
    }
}

/// Output of [`OrthogonalCodec::decode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub bits: BitString,
    /// Sum over blocks of the distance between the received block and the
    /// codeword it was decoded to
    pub errors_corrected: usize,
    /// Trailing bits dropped because they did not fill a whole block
    pub truncated_bits: usize,
}

/// Hadamard forward error correction over `n`-bit payload blocks.
///
/// The matrix is built once and shared read-only between clones.
#[derive(Debug, Clone)]
pub struct OrthogonalCodec {
    n: usize,
    matrix: Arc<HadamardMatrix>,
}

impl OrthogonalCodec {
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 || n > MAX_BLOCK_BITS {
            return Err(FanowireError::InvalidBlockBits(n));
        }
        Ok(Self {
            n,
            matrix: Arc::new(HadamardMatrix::sylvester(n)),
        })
    }

    /// Payload bits per block
    pub fn block_bits(&self) -> usize {
        self.n
    }

    /// Codeword bits per block (`2^n`)
    pub fn code_length(&self) -> usize {
        self.matrix.order()
    }

    pub fn matrix(&self) -> &HadamardMatrix {
        &self.matrix
    }

    /// Blocks whose corruption is always corrected stay within this many flips
    pub fn correction_radius(&self) -> usize {
        (self.code_length() / 2 - 1) / 2
    }

    /// Codeword for one `n`-bit payload
    pub fn encode_block(&self, payload: &BitString) -> Result<BitString> {
        if payload.len() != self.n {
            return Err(FanowireError::InvalidPayloadLength {
                expected: self.n,
                actual: payload.len(),
            });
        }
        Ok(self.matrix.row(payload.to_value() as usize).clone())
    }

    /// Zero-pad `bits` to a multiple of `n` and concatenate the codewords
    pub fn encode(&self, bits: &BitString) -> (BitString, EncodingParams) {
        let original_length = bits.len();
        let mut padded = bits.clone();
        let padding_added = padded.pad_to_multiple(self.n);

        let blocks = padded.len() / self.n;
        let mut encoded = BitString::with_capacity(blocks * self.code_length());
        for block in padded.chunks_exact(self.n) {
            encoded.append(self.matrix.row(block.to_value() as usize));
        }

        tracing::debug!(
            "Encoded {} bits into {} blocks ({} bits)",
            original_length,
            blocks,
            encoded.len()
        );

        let params = EncodingParams {
            n: self.n,
            original_length,
            padding_added,
        };
        (encoded, params)
    }

    /// Nearest codeword by correlation; returns its `n`-bit payload
    pub fn decode_block(&self, received: &BitString) -> Result<BitString> {
        if received.len() != self.code_length() {
            return Err(FanowireError::InvalidBlockLength {
                expected: self.code_length(),
                actual: received.len(),
            });
        }
        let index = self.matrix.closest_row(received);
        Ok(BitString::from_value(index as u64, self.n))
    }

    /// Decode a stream of codewords and cut the result back to
    /// `params.original_length`.
    ///
    /// A stream that is not a whole number of blocks is truncated to the
    /// last complete block.
    pub fn decode(&self, bits: &BitString, params: &EncodingParams) -> Result<Decoded> {
        if params.n != self.n {
            return Err(FanowireError::ParameterMismatch(format!(
                "stream encoded with n={}, codec uses n={}",
                params.n, self.n
            )));
        }

        let code_length = self.code_length();
        let whole = (bits.len() / code_length) * code_length;
        let truncated_bits = bits.len() - whole;
        if truncated_bits > 0 {
            tracing::warn!(
                "Truncating encoded data from {} to {} bits",
                bits.len(),
                whole
            );
        }

        let mut decoded = BitString::with_capacity(whole / code_length * self.n);
        let mut errors_corrected = 0;
        for block in bits.chunks_exact(code_length) {
            let payload = self.decode_block(&block)?;
            let reencoded = self.encode_block(&payload)?;
            errors_corrected += reencoded.hamming_distance(&block);
            decoded.append(&payload);
        }

        if params.original_length > decoded.len() {
            tracing::warn!(
                "Declared length {} exceeds {} decoded bits",
                params.original_length,
                decoded.len()
            );
        }
        decoded.truncate(params.original_length);

        Ok(Decoded {
            bits: decoded,
            errors_corrected,
            truncated_bits,
        })
    }
}
