use crate::cli::encode::{encode_input, EncodeOptions};
use crate::envelope::{DecodeResponse, Envelope};
use crate::error::Result;
use crate::transport::Transport;
use std::path::Path;

/// Encode `input` and deliver it through `transport`
pub fn send_file(
    input: &Path,
    transport: &dyn Transport,
    options: &EncodeOptions,
) -> Result<(Envelope, DecodeResponse)> {
    let envelope = encode_input(input, options)?;
    let response = transport.deliver(&envelope)?;
    Ok((envelope, response))
}

/// Human-readable account of a round trip
pub fn format_summary(envelope: &Envelope, response: &DecodeResponse) -> String {
    let mut output = String::new();
    let params = &envelope.parameters;

    output.push_str("Sender\n");
    output.push_str("------\n");
    output.push_str(&format!("  Original SHA256: {}\n", envelope.sha256));
    output.push_str(&format!("  Original entropy: {:.4}\n", envelope.entropy));
    output.push_str(&format!("  Compressed bits: {}\n", params.compressed_length));
    output.push_str(&format!(
        "  Block width: {} bits -> {} bit codewords\n",
        params.encoding_params.n,
        1usize << params.encoding_params.n
    ));
    output.push_str(&format!("  Errors injected: {}\n\n", envelope.errors));

    output.push_str("Receiver\n");
    output.push_str("--------\n");
    match response {
        DecodeResponse::Success(report) => {
            output.push_str(&format!("  Decoding successful: {}\n", report.success));
            output.push_str(&format!("  Errors corrected: {}\n", report.errors_corrected));
            output.push_str(&format!("  Original errors sent: {}\n", report.original_errors));
            output.push_str(&format!("  SHA256 match: {}\n", report.sha256_match));
            output.push_str(&format!("  Decoded SHA256: {}\n", report.decoded_sha256));
            output.push_str(&format!("  Final entropy: {:.4}\n", report.final_entropy));
            output.push_str(&format!("  Decompressed size: {} bytes\n", report.decompressed_size));
        }
        DecodeResponse::Failure(failure) => {
            output.push_str("  Decoding successful: false\n");
            output.push_str(&format!("  Error: {}\n", failure.error));
        }
    }
    output.push_str(&format!("  Message: {}\n", response.message()));

    output
}
