use crate::diag::from_base64;
use crate::envelope::Envelope;
use crate::error::{FanowireError, Result};
use crate::pipeline::MAX_BLOCK_BITS;
use std::path::Path;

/// Display information about an envelope file
pub fn show_info(path: &Path) -> Result<String> {
    let envelope = Envelope::from_json(&std::fs::read(path)?)?;
    let params = &envelope.parameters;
    let encoding = &params.encoding_params;
    if encoding.n == 0 || encoding.n > MAX_BLOCK_BITS {
        return Err(FanowireError::InvalidBlockBits(encoding.n));
    }
    let payload_bytes = from_base64(&envelope.encoded_message)?.len();
    let code_length = 1usize << encoding.n;
    let blocks = encoding.original_length.saturating_add(encoding.padding_added) / encoding.n;

    let mut output = String::new();

    output.push_str("Fanowire Envelope Information\n");
    output.push_str("=============================\n\n");

    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str("\n");

    output.push_str("Algorithms:\n");
    output.push_str(&format!("  Compression: {}\n", envelope.compression_algorithm));
    output.push_str(&format!("  Encoding: {}\n", envelope.encoding));
    output.push_str("\n");

    output.push_str("Code Table:\n");
    output.push_str(&format!("  Symbols: {}\n", params.code_table.len()));
    let longest = params.code_table.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
    output.push_str(&format!("  Longest code: {} bits\n", longest));
    output.push_str(&format!("  Compressed length: {} bits\n", params.compressed_length));
    output.push_str("\n");

    output.push_str("Channel Code:\n");
    output.push_str(&format!("  Block width: {} bits\n", encoding.n));
    output.push_str(&format!("  Codeword length: {} bits\n", code_length));
    output.push_str(&format!("  Blocks: {}\n", blocks));
    output.push_str(&format!("  Input length: {} bits\n", encoding.original_length));
    output.push_str(&format!("  Block padding: {} bits\n", encoding.padding_added));
    output.push_str(&format!(
        "  Correctable per block: {} bits\n",
        (code_length / 2).saturating_sub(1) / 2
    ));
    output.push_str("\n");

    output.push_str("Payload:\n");
    output.push_str(&format!("  Encoded size: {} bytes\n", payload_bytes));
    output.push_str(&format!("  Injected errors: {}\n", envelope.errors));
    output.push_str(&format!("  SHA256: {}\n", envelope.sha256));
    output.push_str(&format!("  Entropy: {:.4} bits/byte\n", envelope.entropy));

    Ok(output)
}
