use crate::bits::BitString;
use crate::diag::{calculate_entropy, calculate_sha256, to_base64};
use crate::envelope::{CompressionAlgorithm, Encoding, Envelope, Parameters};
use crate::error::{FanowireError, Result};
use crate::pipeline::{
    build_code_table, channel_rng, compress, inject_errors, pack, OrthogonalCodec,
    DEFAULT_BLOCK_BITS, DEFAULT_PAD_BLOCK,
};
use rand::Rng;

/// Sender-side settings
#[derive(Debug, Clone, PartialEq)]
pub struct SenderOptions {
    /// FEC payload bits per block
    pub block_bits: usize,
    /// Byte block size for padding the entropy-coded bytes
    pub pad_block_size: usize,
    /// Share of encoded bits to flip before sending (0-100)
    pub error_percentage: f64,
    /// Seed for the channel simulation
    pub seed: Option<u64>,
}

impl Default for SenderOptions {
    fn default() -> Self {
        Self {
            block_bits: DEFAULT_BLOCK_BITS,
            pad_block_size: DEFAULT_PAD_BLOCK,
            error_percentage: 0.0,
            seed: None,
        }
    }
}

impl SenderOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.error_percentage) {
            return Err(FanowireError::InvalidErrorPercentage(self.error_percentage));
        }
        if self.pad_block_size == 0 || self.pad_block_size > 255 {
            return Err(FanowireError::InvalidPadBlockSize(self.pad_block_size));
        }
        Ok(())
    }

    /// Codec matching `block_bits`
    pub fn codec(&self) -> Result<OrthogonalCodec> {
        OrthogonalCodec::new(self.block_bits)
    }
}

/// Build an envelope, drawing channel noise from the options' seed
pub fn build_envelope(
    data: &[u8],
    codec: &OrthogonalCodec,
    options: &SenderOptions,
) -> Result<Envelope> {
    let mut rng = channel_rng(options.seed);
    build_envelope_with_rng(data, codec, options, &mut rng)
}

/// Run the sending half of the pipeline:
/// Compress → Pack → FEC encode → Channel noise → Base64 envelope
pub fn build_envelope_with_rng<R: Rng + ?Sized>(
    data: &[u8],
    codec: &OrthogonalCodec,
    options: &SenderOptions,
    rng: &mut R,
) -> Result<Envelope> {
    options.validate()?;
    if codec.block_bits() != options.block_bits {
        return Err(FanowireError::ParameterMismatch(format!(
            "options ask for n={}, codec uses n={}",
            options.block_bits,
            codec.block_bits()
        )));
    }

    let original_sha256 = calculate_sha256(data);
    let original_entropy = calculate_entropy(data);
    tracing::info!(
        "Original: {} bytes, SHA256 {}, entropy {:.4}",
        data.len(),
        original_sha256,
        original_entropy
    );

    // Step 1: Entropy code with a table built from this message only
    let code_table = build_code_table(data);
    let compressed = compress(data, &code_table)?;
    tracing::debug!("Compressed to {} bits", compressed.len());

    // Step 2: Byte-align and pad, then back to bits for the channel code
    let padded = pack(&compressed, options.pad_block_size)?;
    let padded_bits = BitString::from_bytes(&padded);

    // Step 3: FEC encode
    let (encoded, encoding_params) = codec.encode(&padded_bits);

    // Step 4: Simulated channel
    let (noisy, errors) = inject_errors(&encoded, options.error_percentage, rng);
    if errors > 0 {
        tracing::info!("Added {} errors ({}%)", errors, options.error_percentage);
    }

    Ok(Envelope {
        encoded_message: to_base64(&noisy.to_bytes()),
        compression_algorithm: CompressionAlgorithm::FanoShannon.to_string(),
        encoding: Encoding::Orthogonal.to_string(),
        parameters: Parameters {
            code_table,
            encoding_params,
            compressed_length: compressed.len(),
        },
        errors,
        sha256: original_sha256,
        entropy: original_entropy,
    })
}
