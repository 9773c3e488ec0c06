//! Decompression of lz-string (1.4.x) `compressToBase64` output.
//!
//! The stream is a sequence of little-endian bit groups, six bits per base64
//! character. Codes 0 and 1 introduce an 8 or 16 bit literal, code 2 ends the
//! stream and anything else refers to the growing phrase dictionary. Phrases
//! are kept as UTF-16 code units and only turned into a `String` at the end.

use log::trace;

use super::DecodeError;

const BASE64_RESET: u32 = 32;

fn base64_value(byte: u8) -> Option<u32> {
    let value = match byte {
        b'A'..=b'Z' => byte - b'A',
        b'a'..=b'z' => byte - b'a' + 26,
        b'0'..=b'9' => byte - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        b'=' => 64,
        _ => return None,
    };
    Some(u32::from(value))
}

/// Decompress `input`, `None` when it is empty, contains a character outside
/// the base64 alphabet, is truncated or otherwise corrupt.
pub fn decompress_from_base64(input: &str) -> Option<String> {
    if input.is_empty() {
        return None;
    }
    let values = input
        .bytes()
        .map(base64_value)
        .collect::<Option<Vec<u32>>>()?;
    decompress(&values, BASE64_RESET)
}

/// [`decompress_from_base64`] for callers that want an error naming `origin`.
pub fn decode(input: &str, origin: &str) -> Result<String, DecodeError> {
    decompress_from_base64(input).ok_or_else(|| DecodeError::CorruptStream(origin.to_owned()))
}

struct BitReader<'a> {
    data: &'a [u32],
    reset: u32,
    value: u32,
    position: u32,
    index: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u32], reset: u32) -> Self {
        Self {
            data,
            reset,
            value: data.first().copied().unwrap_or_default(),
            position: reset,
            index: 1,
        }
    }

    fn read(&mut self, width: u32) -> u32 {
        let mut bits = 0;
        for power in 0..width {
            let bit = self.value & self.position;
            self.position >>= 1;
            if self.position == 0 {
                self.position = self.reset;
                self.value = self.data.get(self.index).copied().unwrap_or_default();
                self.index += 1;
            }
            if bit > 0 {
                bits |= 1 << power;
            }
        }
        bits
    }

    fn exhausted(&self) -> bool {
        self.index > self.data.len()
    }
}

fn decompress(data: &[u32], reset: u32) -> Option<String> {
    let mut reader = BitReader::new(data, reset);
    // codes 0..=2 are control codes and never looked up
    let mut dictionary: Vec<Vec<u16>> = vec![vec![]; 3];
    let mut enlarge_in: u32 = 4;
    let mut num_bits: u32 = 3;

    let first = match reader.read(2) {
        0 => reader.read(8),
        1 => reader.read(16),
        2 => return Some(String::new()),
        _ => return None,
    };
    let mut phrase = vec![first as u16];
    dictionary.push(phrase.clone());
    let mut result = phrase.clone();

    loop {
        if reader.exhausted() {
            trace!("lz-string stream ended without end marker");
            return None;
        }
        let code = match reader.read(num_bits) {
            literal @ (0 | 1) => {
                let width = if literal == 0 { 8 } else { 16 };
                dictionary.push(vec![reader.read(width) as u16]);
                enlarge_in -= 1;
                dictionary.len() - 1
            }
            2 => return String::from_utf16(&result).ok(),
            code => code as usize,
        };
        if enlarge_in == 0 {
            enlarge_in = 1 << num_bits;
            num_bits += 1;
        }

        let entry = if code < dictionary.len() {
            dictionary[code].clone()
        } else if code == dictionary.len() {
            let mut entry = phrase.clone();
            entry.push(*phrase.first()?);
            entry
        } else {
            trace!("lz-string back reference {} out of range", code);
            return None;
        };
        result.extend_from_slice(&entry);

        let mut next = std::mem::take(&mut phrase);
        next.push(*entry.first()?);
        dictionary.push(next);
        enlarge_in -= 1;
        phrase = entry;

        if enlarge_in == 0 {
            enlarge_in = 1 << num_bits;
            num_bits += 1;
        }
    }
}
