//! Decoders for the obfuscation schemes sources wrap their page lists in.
//!
//! - [`lz_string`]: lz-string `compressToBase64` streams
//! - [`packer`]: Dean Edwards' `p,a,c,k,e,d` token substitution
//! - [`crypto_js`]: CryptoJS compatible AES-CBC

pub mod crypto_js;
pub mod lz_string;
pub mod packer;

pub use crate::parse_error::DecodeError;
