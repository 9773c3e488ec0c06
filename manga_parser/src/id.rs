//! Stable 64-bit identifiers.
//!
//! Ids are a 31-multiplier polynomial hash over the UTF-16 code units of the
//! namespace (the source name) followed by the key, so they survive restarts
//! and match ids produced by other clients using the same scheme.

const SEED: u64 = 1125899906842597;

pub fn generate_uid(namespace: &str, key: &str) -> u64 {
    fold(fold(SEED, namespace), key)
}

/// Same as [`generate_uid`] but the numeric key is folded in as a single step.
pub fn generate_uid_from_number(namespace: &str, key: i64) -> u64 {
    fold(SEED, namespace)
        .wrapping_mul(31)
        .wrapping_add(key as u64)
}

fn fold(hash: u64, value: &str) -> u64 {
    value.encode_utf16().fold(hash, |hash, unit| {
        hash.wrapping_mul(31).wrapping_add(u64::from(unit))
    })
}
