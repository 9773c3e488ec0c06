//! Unpacking of Dean Edwards' `eval(function(p,a,c,k,e,d){...})` scripts.
//!
//! The packed payload `p` refers to words of the symbol table `k` by their
//! index written in base `a`. Unpacking substitutes every whole-word token
//! with its symbol; an empty symbol means the token stands for itself.

use log::{debug, trace};
use regex::Regex;
use serde_json::Value;

use super::{lz_string, DecodeError};
use crate::util;

lazy_static! {
    static ref PACKED_ARGUMENTS: Regex = Regex::new(
        r#"(?s)\}\s*\(\s*'((?:[^'\\]|\\.)*)'\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*'((?:[^'\\]|\\.)*)'\s*(\.split\(\s*'\|'\s*\)|\[\s*'\\x73\\x70\\x6c\\x69\\x63'\s*\]\(\s*'\\x7c'\s*\))"#
    )
    .unwrap();
    static ref PAYLOAD: Regex = Regex::new(r"(?s)\((\{.*\})\)").unwrap();
}

/// The arguments of a packed `eval` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedScript {
    pub payload: String,
    pub radix: usize,
    pub count: usize,
    pub symbols: Vec<String>,
}

impl PackedScript {
    /// Extract the arguments from the script text.
    ///
    /// Some sources hide the symbol table as an lz-string base64 string that is
    /// split with `['\x73\x70\x6c\x69\x63']('\x7c')` (`.split('|')`) after
    /// decompression; such tables are decompressed here.
    pub fn parse(script: &str) -> Result<Self, DecodeError> {
        let captures = PACKED_ARGUMENTS
            .captures(script)
            .ok_or(DecodeError::InvalidPackedScript)?;
        let field = |index: usize| captures.get(index).map_or("", |m| m.as_str());

        let radix = field(2)
            .parse()
            .map_err(|_| DecodeError::InvalidPackedScript)?;
        let count = field(3)
            .parse()
            .map_err(|_| DecodeError::InvalidPackedScript)?;

        let table = util::unescape_js(field(4));
        let table = if field(5).starts_with(".split") {
            table
        } else {
            trace!("symbol table is lz-string compressed");
            lz_string::decode(&table, "packed symbol table")?
        };

        Ok(Self {
            payload: util::unescape_js(field(1)),
            radix,
            count,
            symbols: table.split('|').map(str::to_owned).collect(),
        })
    }

    pub fn unpack(&self) -> Result<String, DecodeError> {
        unpack(&self.payload, self.radix, self.count, &self.symbols)
    }
}

/// Replace every token `encode(i)` of `payload` by `symbols[i]`, highest index
/// first. Tokens only match on ASCII word boundaries.
pub fn unpack(
    payload: &str,
    radix: usize,
    count: usize,
    symbols: &[String],
) -> Result<String, DecodeError> {
    if !(2..=MAX_RADIX).contains(&radix) {
        return Err(DecodeError::InvalidPackedScript);
    }
    let mut unpacked = payload.to_owned();
    for index in (0..count.min(symbols.len())).rev() {
        match symbols.get(index) {
            Some(symbol) if !symbol.is_empty() => {
                unpacked = replace_word(&unpacked, &encode_index(index, radix), symbol);
            }
            _ => {}
        }
    }
    debug!("unpacked {} symbols into {} bytes", count, unpacked.len());
    Ok(unpacked)
}

/// Find the `({...})` object literal in unpacked code and parse it as JSON.
pub fn extract_payload(unpacked: &str, origin: &str) -> Result<Value, DecodeError> {
    let json = PAYLOAD
        .captures(unpacked)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| DecodeError::PayloadNotFound {
            origin: origin.to_owned(),
        })?;

    serde_json::from_str(json.as_str()).map_err(|source| DecodeError::InvalidPayload {
        origin: origin.to_owned(),
        source,
    })
}

/// Highest radix the packer's digit alphabet can express.
const MAX_RADIX: usize = 62;

/// The packer's `e(c)`: digits `0-9a-z` up to 35, `A-Z` above.
fn encode_index(index: usize, radix: usize) -> String {
    let mut digits = vec![];
    let mut rest = index;
    loop {
        let digit = (rest % radix) as u8;
        digits.push(match digit {
            0..=9 => (b'0' + digit) as char,
            10..=35 => (b'a' + digit - 10) as char,
            _ => (digit + 29) as char,
        });
        rest /= radix;
        if rest == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn replace_word(haystack: &str, token: &str, replacement: &str) -> String {
    let bytes = haystack.as_bytes();
    let mut replaced = String::with_capacity(haystack.len());
    let mut last = 0;
    for (start, _) in haystack.match_indices(token) {
        let end = start + token.len();
        let bounded_left = start == 0 || !is_word_byte(bytes[start - 1]);
        let bounded_right = end == bytes.len() || !is_word_byte(bytes[end]);
        if bounded_left && bounded_right {
            replaced.push_str(&haystack[last..start]);
            replaced.push_str(replacement);
            last = end;
        }
    }
    replaced.push_str(&haystack[last..]);
    replaced
}
