//! The MPG trade-info codec.
//!
//! Spgateway encrypts trade info with AES-256-CBC, using the merchant's `HashKey` as the key and `HashIV` as the IV.
//! Plaintext is padded PKCS#7-style to a multiple of 32 bytes (not the AES block size), and the ciphertext travels as
//! lowercase hex. The `TradeSha` check value is the uppercase hex SHA-256 of
//! `HashKey={key}&{encrypted}&HashIV={iv}`.
use aes::Aes256;
use cbc::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use log::trace;
use sha2::{Digest, Sha256};

use crate::{
    consts::{HASH_IV_LEN, HASH_KEY_LEN, PADDING_BLOCK_SIZE},
    SpgatewayError,
};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const AES_BLOCK_SIZE: usize = 16;

/// Encrypts `info` (normally a URL-encoded trade info string) and returns the lowercase hex ciphertext.
pub fn encrypt_info(hash_key: &str, hash_iv: &str, info: &str) -> Result<String, SpgatewayError> {
    check_key_material(hash_key, hash_iv)?;
    let cipher = Aes256CbcEnc::new_from_slices(hash_key.as_bytes(), hash_iv.as_bytes())
        .map_err(|e| SpgatewayError::InvalidKeyLength(e.to_string()))?;
    let padded = pad(info.as_bytes());
    let encrypted = cipher.encrypt_padded_vec_mut::<NoPadding>(&padded);
    Ok(hex::encode(encrypted))
}

/// Decrypts a hex ciphertext produced by [`encrypt_info`] (or by the gateway) back into the plaintext string.
pub fn decrypt_info(hash_key: &str, hash_iv: &str, encrypted: &str) -> Result<String, SpgatewayError> {
    check_key_material(hash_key, hash_iv)?;
    let data = hex::decode(encrypted.trim()).map_err(|e| SpgatewayError::InvalidHex(e.to_string()))?;
    if data.is_empty() || data.len() % AES_BLOCK_SIZE != 0 {
        return Err(SpgatewayError::InvalidCiphertext(format!(
            "{} bytes is not a multiple of the block size",
            data.len()
        )));
    }
    let cipher = Aes256CbcDec::new_from_slices(hash_key.as_bytes(), hash_iv.as_bytes())
        .map_err(|e| SpgatewayError::InvalidKeyLength(e.to_string()))?;
    let decrypted = cipher
        .decrypt_padded_vec_mut::<NoPadding>(&data)
        .map_err(|e| SpgatewayError::InvalidCiphertext(e.to_string()))?;
    let plaintext = unpad(decrypted)?;
    String::from_utf8(plaintext).map_err(|_| SpgatewayError::InvalidUtf8)
}

/// Calculates the `TradeSha` check value for the hex ciphertext.
pub fn generate_sha(hash_key: &str, hash_iv: &str, encrypted_info: &str) -> String {
    let raw = format!("HashKey={hash_key}&{encrypted_info}&HashIV={hash_iv}");
    hex::encode_upper(Sha256::digest(raw.as_bytes()))
}

/// Returns true if `trade_sha` is the check value of `encrypted_info` under the given key material.
///
/// The comparison ignores ASCII case and does not short-circuit on the first differing byte.
pub fn validate_info(hash_key: &str, hash_iv: &str, encrypted_info: &str, trade_sha: &str) -> bool {
    let expected = generate_sha(hash_key, hash_iv, encrypted_info);
    let received = trade_sha.trim().to_ascii_uppercase();
    let valid = constant_time_eq(expected.as_bytes(), received.as_bytes());
    trace!("🔐️ TradeSha check: {}", if valid { "valid" } else { "INVALID" });
    valid
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn check_key_material(hash_key: &str, hash_iv: &str) -> Result<(), SpgatewayError> {
    if hash_key.len() != HASH_KEY_LEN {
        return Err(SpgatewayError::InvalidKeyLength(format!(
            "HashKey must be {HASH_KEY_LEN} bytes, but was {}",
            hash_key.len()
        )));
    }
    if hash_iv.len() != HASH_IV_LEN {
        return Err(SpgatewayError::InvalidKeyLength(format!(
            "HashIV must be {HASH_IV_LEN} bytes, but was {}",
            hash_iv.len()
        )));
    }
    Ok(())
}

fn pad(data: &[u8]) -> Vec<u8> {
    let pad_len = PADDING_BLOCK_SIZE - (data.len() % PADDING_BLOCK_SIZE);
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    let pad_byte = pad_len as u8;
    padded.resize(data.len() + pad_len, pad_byte);
    padded
}

fn unpad(mut data: Vec<u8>) -> Result<Vec<u8>, SpgatewayError> {
    let pad_len = *data.last().ok_or(SpgatewayError::InvalidPadding)? as usize;
    if pad_len == 0 || pad_len > PADDING_BLOCK_SIZE || pad_len > data.len() {
        return Err(SpgatewayError::InvalidPadding);
    }
    let body_len = data.len() - pad_len;
    if data[body_len..].iter().any(|&b| b as usize != pad_len) {
        return Err(SpgatewayError::InvalidPadding);
    }
    data.truncate(body_len);
    Ok(data)
}
