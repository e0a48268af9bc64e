use crate::bits::BitString;
use crate::diag::{calculate_entropy, calculate_sha256, from_base64};
use crate::envelope::{
    CompressionAlgorithm, DecodeFailure, DecodeReport, DecodeResponse, Encoding, Envelope,
};
use crate::error::Result;
use crate::pipeline::{decompress, unpack, OrthogonalCodec};

/// Decoded payload plus the report sent back to the caller
#[derive(Debug, Clone)]
pub struct Received {
    pub data: Vec<u8>,
    pub report: DecodeReport,
    /// False when byte padding failed validation and was left in place
    pub padding_intact: bool,
}

/// Run the receiving half of the pipeline:
/// Base64 → FEC decode → Byte-align → Unpad → Entropy decode → Verify
pub fn open_envelope(envelope: &Envelope, codec: &OrthogonalCodec) -> Result<Received> {
    let compression = envelope.compression()?;
    let encoding = envelope.encoding()?;
    tracing::info!(
        "Received message with {} errors (compression: {}, encoding: {})",
        envelope.errors,
        compression,
        encoding
    );

    let params = &envelope.parameters;
    let message_bytes = from_base64(&envelope.encoded_message)?;
    let message_bits = BitString::from_bytes(&message_bytes);
    tracing::debug!("Received message bits length: {}", message_bits.len());

    // Step 1: Channel decode
    let decoded = match encoding {
        Encoding::Orthogonal => codec.decode(&message_bits, &params.encoding_params)?,
    };
    tracing::info!("Orthogonal decoder corrected {} errors", decoded.errors_corrected);

    // Step 2: Byte-align and strip padding, falling back to the raw bytes
    let unpacked = unpack(&decoded.bits.to_bytes());
    let mut compressed = unpacked.bits;
    if compressed.len() > params.compressed_length {
        compressed.truncate(params.compressed_length);
    } else if compressed.len() < params.compressed_length {
        tracing::warn!(
            "Declared compressed length {} exceeds {} recovered bits",
            params.compressed_length,
            compressed.len()
        );
    }

    // Step 3: Entropy decode with the transmitted table
    let data = match compression {
        CompressionAlgorithm::FanoShannon => decompress(&compressed, &params.code_table),
    };
    tracing::info!("Decompressed to {} bytes", data.len());

    // Step 4: Verify
    let decoded_sha256 = calculate_sha256(&data);
    let final_entropy = calculate_entropy(&data);
    let sha256_match = decoded_sha256 == envelope.sha256;
    if !sha256_match {
        tracing::warn!(
            "SHA256 mismatch: expected {}, decoded {}",
            envelope.sha256,
            decoded_sha256
        );
    }

    let report = DecodeReport {
        success: true,
        errors_corrected: decoded.errors_corrected,
        original_errors: envelope.errors,
        sha256_match,
        decoded_sha256,
        original_sha256: envelope.sha256.clone(),
        final_entropy,
        original_entropy: envelope.entropy,
        decompressed_size: data.len(),
        message: format!(
            "Successfully decoded. Corrected {} errors. SHA256 {}.",
            decoded.errors_corrected,
            if sha256_match { "matches" } else { "does not match" }
        ),
    };

    Ok(Received {
        data,
        report,
        padding_intact: unpacked.padding_intact,
    })
}

/// Decode a JSON envelope into a response body. Every failure becomes a
/// `success: false` response; nothing here panics on bad input.
pub fn respond(body: &[u8], codec: &OrthogonalCodec) -> DecodeResponse {
    match Envelope::from_json(body).and_then(|envelope| open_envelope(&envelope, codec)) {
        Ok(received) => DecodeResponse::Success(received.report),
        Err(e) => {
            tracing::warn!("Decoding error: {}", e);
            DecodeResponse::Failure(DecodeFailure::new(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FanowireError;
    use crate::sender::{build_envelope, SenderOptions};

    fn codec() -> OrthogonalCodec {
        OrthogonalCodec::new(7).unwrap()
    }

    #[test]
    fn test_literal_roundtrip() {
        let codec = codec();
        let envelope = build_envelope(b"AAAB", &codec, &SenderOptions::default()).unwrap();
        let received = open_envelope(&envelope, &codec).unwrap();

        assert_eq!(received.data, b"AAAB");
        assert!(received.padding_intact);
        assert!(received.report.sha256_match);
        assert_eq!(received.report.errors_corrected, 0);
        assert_eq!(received.report.decompressed_size, 4);
        assert!(received.report.message.contains("matches"));
    }

    #[test]
    fn test_single_symbol_roundtrip() {
        let codec = codec();
        let envelope = build_envelope(&[7u8; 100], &codec, &SenderOptions::default()).unwrap();
        let received = open_envelope(&envelope, &codec).unwrap();
        assert_eq!(received.data, vec![7u8; 100]);
        assert!(received.report.sha256_match);
    }

    #[test]
    fn test_empty_roundtrip() {
        let codec = codec();
        let envelope = build_envelope(b"", &codec, &SenderOptions::default()).unwrap();
        let received = open_envelope(&envelope, &codec).unwrap();
        assert!(received.data.is_empty());
        assert!(received.report.sha256_match);
    }

    #[test]
    fn test_unsupported_tags() {
        let codec = codec();
        let mut envelope = build_envelope(b"abc", &codec, &SenderOptions::default()).unwrap();
        envelope.encoding = "reed-solomon".into();
        assert!(matches!(
            open_envelope(&envelope, &codec),
            Err(FanowireError::UnsupportedAlgorithm(_))
        ));

        envelope.encoding = "orthogonal".into();
        envelope.compression_algorithm = "huffman".into();
        assert!(matches!(
            open_envelope(&envelope, &codec),
            Err(FanowireError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_respond_reports_failures() {
        let codec = codec();
        match respond(b"{\"encoded_message\": \"AAAA\"}", &codec) {
            DecodeResponse::Failure(failure) => {
                assert!(!failure.success);
                assert!(failure.message.starts_with("Decoding failed"));
            }
            other => panic!("expected failure, got {:?}", other),
        }

        let mut envelope = build_envelope(b"abc", &codec, &SenderOptions::default()).unwrap();
        envelope.encoded_message = "@@not base64@@".into();
        let body = envelope.to_json().unwrap();
        assert!(!respond(&body, &codec).is_success());
    }

    #[test]
    fn test_respond_success() {
        let codec = codec();
        let envelope = build_envelope(b"hello hello", &codec, &SenderOptions::default()).unwrap();
        let response = respond(&envelope.to_json().unwrap(), &codec);
        match response {
            DecodeResponse::Success(report) => {
                assert!(report.sha256_match);
                assert_eq!(report.decompressed_size, 11);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }
}
