use crate::bits::BitString;
use crate::diag::{calculate_entropy, calculate_sha256};
use crate::error::Result;
use crate::pipeline::{build_code_table, frequency_table, pack, OrthogonalCodec, DEFAULT_PAD_BLOCK};
use std::path::Path;

/// How many of the most frequent symbols to list
const TOP_SYMBOLS: usize = 8;

/// Coding statistics for a file: entropy, the Fano table it would get and
/// the size after each pipeline stage
pub fn show_stats(path: &Path, codec: &OrthogonalCodec) -> Result<String> {
    let data = std::fs::read(path)?;

    let mut output = String::new();

    output.push_str("Fanowire Coding Statistics\n");
    output.push_str("==========================\n\n");
    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("Size: {} bytes\n", data.len()));
    output.push_str(&format!("SHA256: {}\n\n", calculate_sha256(&data)));

    let entropy = calculate_entropy(&data);
    output.push_str(&format!("Shannon Entropy: {:.4} bits/byte\n", entropy));
    output.push_str(&format!(
        "  Interpretation: {}\n\n",
        interpret_entropy(entropy)
    ));

    if data.is_empty() {
        output.push_str("Nothing to encode\n");
        return Ok(output);
    }

    let freq = frequency_table(&data);
    let table = build_code_table(&data);
    let average = table.average_code_length(&freq);
    let compressed_bits = if table.len() == 1 {
        data.len()
    } else {
        table
            .iter()
            .map(|(symbol, code)| freq[symbol as usize] as usize * code.len())
            .sum()
    };

    output.push_str("Shannon-Fano Code:\n");
    output.push_str(&format!("  Distinct symbols: {}/256\n", table.len()));
    output.push_str(&format!("  Average code length: {:.4} bits\n", average));
    if average > 0.0 {
        output.push_str(&format!(
            "  Efficiency: {:.1}% of entropy bound\n",
            entropy / average * 100.0
        ));
    }
    output.push_str(&format!(
        "  Compressed: {} bits ({:.1}% of input)\n\n",
        compressed_bits,
        compressed_bits as f64 / (data.len() * 8) as f64 * 100.0
    ));

    let mut ranked: Vec<(u8, u64)> = freq
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .map(|(symbol, &count)| (symbol as u8, count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    output.push_str("Most Frequent Symbols:\n");
    for (symbol, count) in ranked.iter().take(TOP_SYMBOLS) {
        let code = table
            .get(*symbol)
            .map(|c| c.to_string())
            .unwrap_or_default();
        output.push_str(&format!(
            "  0x{:02X} {:>8} ({:>5.1}%)  {}\n",
            symbol,
            count,
            *count as f64 / data.len() as f64 * 100.0,
            code
        ));
    }
    output.push('\n');

    // Channel stage sizes, computed without building the codewords
    let padded_bytes = pack(&BitString::repeat(false, compressed_bits), DEFAULT_PAD_BLOCK)?.len();
    let padded_bits = padded_bytes * 8;
    let blocks = padded_bits.div_ceil(codec.block_bits());
    let encoded_bits = blocks * codec.code_length();

    output.push_str("Channel Code:\n");
    output.push_str(&format!(
        "  Block width: {} bits -> {} bit codewords\n",
        codec.block_bits(),
        codec.code_length()
    ));
    output.push_str(&format!("  Padded payload: {} bytes\n", padded_bytes));
    output.push_str(&format!("  Blocks: {}\n", blocks));
    output.push_str(&format!(
        "  Encoded size: {} bytes ({:.2}x input)\n",
        encoded_bits.div_ceil(8),
        encoded_bits as f64 / (data.len() * 8) as f64
    ));
    output.push_str(&format!(
        "  Correctable per block: {} bits\n",
        codec.correction_radius()
    ));

    Ok(output)
}

fn interpret_entropy(entropy: f64) -> &'static str {
    if entropy >= 7.9 {
        "Near random - little to gain from entropy coding"
    } else if entropy >= 7.0 {
        "High - modest compression expected"
    } else if entropy >= 4.0 {
        "Moderate - noticeable compression expected"
    } else {
        "Low - highly compressible"
    }
}
