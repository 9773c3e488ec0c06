//! AES-CBC decryption compatible with CryptoJS defaults.
//!
//! A passphrase ciphertext is base64 of `"Salted__" || salt[8] || body`; key and
//! IV come from OpenSSL's EVP_BytesToKey with MD5 and one iteration. Raw keys of
//! 16, 24 or 32 bytes select AES-128, AES-192 or AES-256. Padding is PKCS#7.

use aes::{Aes128, Aes192, Aes256};
use base64::{engine::general_purpose, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use log::trace;
use md5::{Digest, Md5};
use serde::Deserialize;

use super::DecodeError;

const SALTED_MAGIC: &[u8; 8] = b"Salted__";
const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

/// CryptoJS' JSON formatter output. `iv` is ignored, it is re-derived.
#[derive(Deserialize)]
struct Envelope {
    ct: String,
    s: String,
}

pub fn decrypt(ciphertext: &str, passphrase: &str) -> Result<String, DecodeError> {
    let raw = general_purpose::STANDARD.decode(ciphertext.trim())?;
    if raw.len() < SALTED_MAGIC.len() + SALT_LEN || !raw.starts_with(SALTED_MAGIC) {
        return Err(DecodeError::MissingSaltHeader);
    }
    let (salt, body) = raw[SALTED_MAGIC.len()..].split_at(SALT_LEN);
    let (key, iv) = evp_bytes_to_key(passphrase.as_bytes(), salt);
    decrypt_bytes(body, &key, &iv)
}

pub fn decrypt_with_key(ciphertext: &str, key: &[u8], iv: &[u8]) -> Result<String, DecodeError> {
    let raw = general_purpose::STANDARD.decode(ciphertext.trim())?;
    decrypt_bytes(&raw, key, iv)
}

/// Decrypt `{"ct": base64, "iv": hex, "s": hex}`.
pub fn decrypt_json_envelope(envelope: &str, passphrase: &str) -> Result<String, DecodeError> {
    let envelope: Envelope = serde_json::from_str(envelope).map_err(DecodeError::InvalidEnvelope)?;
    let salt = hex::decode(envelope.s.trim())?;
    let (key, iv) = evp_bytes_to_key(passphrase.as_bytes(), &salt);
    let raw = general_purpose::STANDARD.decode(envelope.ct.trim())?;
    decrypt_bytes(&raw, &key, &iv)
}

/// `D_i = MD5(D_{i-1} || passphrase || salt)` until 48 bytes are available.
pub fn evp_bytes_to_key(passphrase: &[u8], salt: &[u8]) -> ([u8; KEY_LEN], [u8; IV_LEN]) {
    let mut derived = Vec::with_capacity(KEY_LEN + IV_LEN + 16);
    let mut block: Vec<u8> = vec![];
    while derived.len() < KEY_LEN + IV_LEN {
        let mut hasher = Md5::new();
        hasher.update(&block);
        hasher.update(passphrase);
        hasher.update(salt);
        block = hasher.finalize().to_vec();
        derived.extend_from_slice(&block);
    }

    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&derived[..KEY_LEN]);
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&derived[KEY_LEN..KEY_LEN + IV_LEN]);
    (key, iv)
}

fn decrypt_bytes(body: &[u8], key: &[u8], iv: &[u8]) -> Result<String, DecodeError> {
    if iv.len() != IV_LEN {
        return Err(DecodeError::InvalidIvLength(iv.len()));
    }
    trace!("AES-{} decrypting {} bytes", key.len() * 8, body.len());

    let plaintext = match key.len() {
        16 => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| DecodeError::InvalidKeyLength(key.len()))?
            .decrypt_padded_vec_mut::<Pkcs7>(body),
        24 => cbc::Decryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(|_| DecodeError::InvalidKeyLength(key.len()))?
            .decrypt_padded_vec_mut::<Pkcs7>(body),
        32 => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| DecodeError::InvalidKeyLength(key.len()))?
            .decrypt_padded_vec_mut::<Pkcs7>(body),
        other => return Err(DecodeError::InvalidKeyLength(other)),
    }
    .map_err(|_| DecodeError::Cipher)?;

    Ok(String::from_utf8(plaintext)?)
}
