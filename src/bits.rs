//! Owned bit sequences.
//!
//! Every stage of the pipeline hands bits to the next one as a [`BitString`].
//! Bits are ordered MSB-first whenever they are converted to or from bytes,
//! and the textual form is a run of `'0'` and `'1'` characters, which is also
//! how code table entries travel inside an envelope.

use crate::error::{FanowireError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A growable sequence of bits, packed MSB-first into `u64` words.
///
/// Bits past `len` in the last word are always zero, so the derived
/// equality and hashing compare contents only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitString {
    words: Vec<u64>,
    len: usize,
}

const WORD_BITS: usize = 64;

/// Mask keeping the first `bits` (1..=64) positions of a word
fn leading_mask(bits: usize) -> u64 {
    !0u64 << (WORD_BITS - bits)
}

impl BitString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(WORD_BITS)),
            len: 0,
        }
    }

    /// `count` copies of `bit`
    pub fn repeat(bit: bool, count: usize) -> Self {
        let fill = if bit { !0u64 } else { 0 };
        let mut bits = Self {
            words: vec![fill; count.div_ceil(WORD_BITS)],
            len: count,
        };
        bits.clear_tail();
        bits
    }

    /// Unpack bytes MSB-first, 8 bits per byte
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let words = bytes
            .chunks(8)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf[..chunk.len()].copy_from_slice(chunk);
                u64::from_be_bytes(buf)
            })
            .collect();
        Self {
            words,
            len: bytes.len() * 8,
        }
    }

    /// Pack MSB-first into bytes. A trailing partial byte is filled with zeros.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words
            .iter()
            .flat_map(|word| word.to_be_bytes())
            .take(self.len.div_ceil(8))
            .collect()
    }

    /// The lowest `width` bits of `value`, most significant first
    pub fn from_value(value: u64, width: usize) -> Self {
        (0..width)
            .rev()
            .map(|shift| shift < 64 && (value >> shift) & 1 == 1)
            .collect()
    }

    /// Interpret the bits as an unsigned integer, most significant first.
    /// Only meaningful for strings of at most 64 bits.
    pub fn to_value(&self) -> u64 {
        self.iter().fold(0u64, |acc, bit| (acc << 1) | bit as u64)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| self.bit(index))
    }

    fn bit(&self, index: usize) -> bool {
        (self.words[index / WORD_BITS] >> (WORD_BITS - 1 - index % WORD_BITS)) & 1 == 1
    }

    /// Invert the bit at `index`.
    ///
    /// # Panics
    /// If `index >= len`.
    pub fn flip(&mut self, index: usize) {
        assert!(index < self.len, "bit index {} out of range {}", index, self.len);
        self.words[index / WORD_BITS] ^= 1u64 << (WORD_BITS - 1 - index % WORD_BITS);
    }

    pub fn push(&mut self, bit: bool) {
        if self.len % WORD_BITS == 0 {
            self.words.push(0);
        }
        if bit {
            self.words[self.len / WORD_BITS] |= 1u64 << (WORD_BITS - 1 - self.len % WORD_BITS);
        }
        self.len += 1;
    }

    pub fn append(&mut self, other: &BitString) {
        let offset = self.len % WORD_BITS;
        if offset == 0 {
            self.words.extend_from_slice(&other.words);
        } else {
            for &word in &other.words {
                if let Some(last) = self.words.last_mut() {
                    *last |= word >> offset;
                }
                self.words.push(word << (WORD_BITS - offset));
            }
        }
        self.len += other.len;
        // spill words past the new length hold only zeros
        self.words.truncate(self.len.div_ceil(WORD_BITS));
    }

    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.len = len;
            self.words.truncate(len.div_ceil(WORD_BITS));
            self.clear_tail();
        }
    }

    /// Append zero bits until the length is a multiple of `multiple`.
    /// Returns the number of bits added.
    pub fn pad_to_multiple(&mut self, multiple: usize) -> usize {
        if multiple == 0 {
            return 0;
        }
        let padding = (multiple - self.len % multiple) % multiple;
        self.len += padding;
        self.words.resize(self.len.div_ceil(WORD_BITS), 0);
        padding
    }

    /// Copy of the bits in `start..end`, clamped to the length
    pub fn slice(&self, start: usize, end: usize) -> BitString {
        let end = end.min(self.len);
        let start = start.min(end);
        let len = end - start;
        let first = start / WORD_BITS;
        let offset = start % WORD_BITS;

        let words = (0..len.div_ceil(WORD_BITS))
            .map(|k| {
                let high = self.words[first + k] << offset;
                let low = match offset {
                    0 => 0,
                    _ => self
                        .words
                        .get(first + k + 1)
                        .map_or(0, |w| w >> (WORD_BITS - offset)),
                };
                high | low
            })
            .collect();

        let mut out = BitString { words, len };
        out.clear_tail();
        out
    }

    /// Consecutive `size`-bit pieces; a shorter remainder is left out
    pub fn chunks_exact(&self, size: usize) -> impl Iterator<Item = BitString> + '_ {
        let count = if size == 0 { 0 } else { self.len / size };
        (0..count).map(move |i| self.slice(i * size, (i + 1) * size))
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bit(i))
    }

    /// Number of positions where `self` and `other` differ, over the shorter length
    pub fn hamming_distance(&self, other: &BitString) -> usize {
        let len = self.len.min(other.len);
        let full = len / WORD_BITS;
        let mut distance: usize = self.words[..full]
            .iter()
            .zip(&other.words[..full])
            .map(|(a, b)| (a ^ b).count_ones() as usize)
            .sum();
        let rest = len % WORD_BITS;
        if rest > 0 {
            let differing = (self.words[full] ^ other.words[full]) & leading_mask(rest);
            distance += differing.count_ones() as usize;
        }
        distance
    }

    /// `true` if `self` is a (non-strict) prefix of `other`
    pub fn is_prefix_of(&self, other: &BitString) -> bool {
        self.len <= other.len && self.hamming_distance(other) == 0
    }

    fn clear_tail(&mut self) {
        let rest = self.len % WORD_BITS;
        if rest > 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= leading_mask(rest);
            }
        }
    }
}

impl From<Vec<bool>> for BitString {
    fn from(bits: Vec<bool>) -> Self {
        bits.into_iter().collect()
    }
}

impl From<&[bool]> for BitString {
    fn from(bits: &[bool]) -> Self {
        bits.iter().copied().collect()
    }
}

impl FromIterator<bool> for BitString {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut bits = BitString::with_capacity(iter.size_hint().0);
        for bit in iter {
            bits.push(bit);
        }
        bits
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for BitString {
    type Err = FanowireError;

    fn from_str(s: &str) -> Result<Self> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(FanowireError::InvalidBitString(format!(
                    "unexpected character {:?} in {:?}",
                    other, s
                ))),
            })
            .collect::<Result<BitString>>()
    }
}

impl Serialize for BitString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BitString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
