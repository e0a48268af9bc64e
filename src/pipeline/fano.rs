use crate::bits::BitString;
use crate::error::{FanowireError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Occurrence count for every byte value
pub type FrequencyTable = [u64; 256];

/// Prefix-free code per byte value, transmitted verbatim to the decoder.
/// Serialized as a JSON object keyed by the decimal byte value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeTable(BTreeMap<u8, BitString>);

impl CodeTable {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, symbol: u8, code: BitString) {
        self.0.insert(symbol, code);
    }

    pub fn get(&self, symbol: u8) -> Option<&BitString> {
        self.0.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitString)> {
        self.0.iter().map(|(&symbol, code)| (symbol, code))
    }

    /// The only symbol of a single-entry table
    fn sole_symbol(&self) -> Option<u8> {
        if self.0.len() == 1 {
            self.0.keys().next().copied()
        } else {
            None
        }
    }

    /// Whether no code is a prefix of another
    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<&BitString> = self.0.values().collect();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j && a.is_prefix_of(b) {
                    return false;
                }
            }
        }
        true
    }

    /// Average code length in bits, weighted by `frequencies`
    pub fn average_code_length(&self, frequencies: &FrequencyTable) -> f64 {
        let total: u64 = frequencies.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: u64 = self
            .iter()
            .map(|(symbol, code)| frequencies[symbol as usize] * code.len() as u64)
            .sum();
        weighted as f64 / total as f64
    }
}

impl FromIterator<(u8, BitString)> for CodeTable {
    fn from_iter<I: IntoIterator<Item = (u8, BitString)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Count byte occurrences
pub fn frequency_table(data: &[u8]) -> FrequencyTable {
    let mut freq = [0u64; 256];
    for &byte in data {
        freq[byte as usize] += 1;
    }
    freq
}

/// Build a Shannon-Fano code table for `data`.
///
/// Symbols are ordered by descending frequency, ties by ascending byte value,
/// and the ordered list is bisected where the two halves carry the most even
/// probability mass. An empty input yields an empty table. A single distinct
/// symbol gets the placeholder code `0`.
pub fn build_code_table(data: &[u8]) -> CodeTable {
    let freq = frequency_table(data);
    let mut symbols: Vec<(u8, u64)> = freq
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .map(|(symbol, &count)| (symbol as u8, count))
        .collect();

    match symbols.len() {
        0 => CodeTable::new(),
        1 => std::iter::once((symbols[0].0, BitString::repeat(false, 1))).collect(),
        _ => {
            symbols.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            split_symbols(&symbols).into_iter().collect()
        }
    }
}

/// Recursive bisection over a frequency-sorted symbol list
fn split_symbols(symbols: &[(u8, u64)]) -> Vec<(u8, BitString)> {
    match symbols {
        [] => Vec::new(),
        [(only, _)] => vec![(*only, BitString::new())],
        [(first, _), (second, _)] => vec![
            (*first, BitString::repeat(false, 1)),
            (*second, BitString::repeat(true, 1)),
        ],
        _ => {
            let split = best_split(symbols);
            let (left, right) = symbols.split_at(split);
            let mut codes = Vec::with_capacity(symbols.len());
            for (prefix, half) in [(false, left), (true, right)] {
                for (symbol, suffix) in split_symbols(half) {
                    let mut code = BitString::with_capacity(suffix.len() + 1);
                    code.push(prefix);
                    code.append(&suffix);
                    codes.push((symbol, code));
                }
            }
            codes
        }
    }
}

/// Split index in `1..len` minimising `|2 * left_mass - total|`; lowest index wins ties
fn best_split(symbols: &[(u8, u64)]) -> usize {
    let total: u64 = symbols.iter().map(|(_, count)| count).sum();
    let mut best = 1;
    let mut best_diff = u64::MAX;
    let mut left = 0u64;
    for (i, (_, count)) in symbols.iter().enumerate().take(symbols.len() - 1) {
        left += count;
        let diff = (2 * left).abs_diff(total);
        if diff < best_diff {
            best_diff = diff;
            best = i + 1;
        }
    }
    best
}

/// Entropy-encode `data` with `table`.
///
/// With a single-entry table every byte becomes one `0` bit; the receiver
/// recovers the run length from the bit count.
pub fn compress(data: &[u8], table: &CodeTable) -> Result<BitString> {
    if let Some(symbol) = table.sole_symbol() {
        if let Some(&stray) = data.iter().find(|&&b| b != symbol) {
            return Err(FanowireError::SymbolNotInTable(stray));
        }
        return Ok(BitString::repeat(false, data.len()));
    }

    let mut bits = BitString::new();
    for &byte in data {
        let code = table.get(byte).ok_or(FanowireError::SymbolNotInTable(byte))?;
        bits.append(code);
    }
    Ok(bits)
}

/// Reverse [`compress`].
///
/// Bits are consumed greedily until the accumulated prefix matches a code.
/// Unmatched tail bits are dropped with a warning; callers bound the input
/// with the declared compressed length first.
pub fn decompress(bits: &BitString, table: &CodeTable) -> Vec<u8> {
    if bits.is_empty() || table.is_empty() {
        return Vec::new();
    }
    if let Some(symbol) = table.sole_symbol() {
        return vec![symbol; bits.len()];
    }

    let decode_table: HashMap<&BitString, u8> =
        table.iter().map(|(symbol, code)| (code, symbol)).collect();

    let mut output = Vec::new();
    let mut current = BitString::new();
    for bit in bits.iter() {
        current.push(bit);
        if let Some(&symbol) = decode_table.get(&current) {
            output.push(symbol);
            current = BitString::new();
        }
    }

    if !current.is_empty() {
        tracing::warn!(
            "Discarding {} trailing bits that do not complete a code: {}",
            current.len(),
            current
        );
    }

    output
}
