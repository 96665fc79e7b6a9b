//! Sealing of secret values inside a source's config payload.
//!
//! Only values under secret-looking keys are encrypted; the rest of the payload stays
//! readable so it can be listed and edited. A sealed value is the string
//! `_encrypted_` followed by base64(12-byte nonce ‖ ciphertext+tag) of the value's JSON.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand_core::{OsRng, RngCore};
use serde_json::Value;

pub const SEALED_PREFIX: &str = "_encrypted_";

const SECRET_KEYS: &[&str] = &[
    "password",
    "secret",
    "token",
    "api_key",
    "access_key",
    "secret_key",
];

#[derive(Debug)]
pub enum CryptoError {
    Encrypt(String),
    Decrypt(String),
    Decode(String),
    Json(serde_json::Error),
}

impl std::fmt::Display for CryptoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CryptoError::Encrypt(e) => write!(f, "Encryption error: {e}"),
            CryptoError::Decrypt(e) => write!(f, "Decryption error: {e}"),
            CryptoError::Decode(e) => write!(f, "Base64 decode error: {e}"),
            CryptoError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for CryptoError {}

pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SECRET_KEYS.contains(&key.as_str())
}

pub fn is_sealed(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.starts_with(SEALED_PREFIX))
}

/// Encrypt a JSON value with AES-256-GCM into its sealed string form.
pub fn seal_value(data: &Value, key: &[u8; 32]) -> Result<String, CryptoError> {
    let plaintext = serde_json::to_vec(data).map_err(CryptoError::Json)?;

    let mut nonce_bytes = [0u8; 12];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = Aes256Gcm::new(key.into());
    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_ref())
        .map_err(|e| CryptoError::Encrypt(e.to_string()))?;

    let mut combined = nonce_bytes.to_vec();
    combined.extend_from_slice(&ciphertext);

    Ok(format!("{SEALED_PREFIX}{}", STANDARD.encode(&combined)))
}

/// Reverse of [`seal_value`]. The prefix is required.
pub fn unseal_value(sealed: &str, key: &[u8; 32]) -> Result<Value, CryptoError> {
    let encoded = sealed
        .strip_prefix(SEALED_PREFIX)
        .ok_or_else(|| CryptoError::Decode("missing sealed prefix".to_string()))?;
    let data = STANDARD
        .decode(encoded)
        .map_err(|e| CryptoError::Decode(e.to_string()))?;

    if data.len() < 12 {
        return Err(CryptoError::Decrypt(
            "Ciphertext too short (< 12 bytes)".to_string(),
        ));
    }

    let (nonce_bytes, ciphertext) = data.split_at(12);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new(key.into());
    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| CryptoError::Decrypt(e.to_string()))?;

    serde_json::from_slice(&plaintext).map_err(CryptoError::Json)
}

/// True when `value` is a sealed string that opens under `key`. A plaintext that merely
/// starts with the prefix is not sealed.
pub fn is_sealed_with(value: &Value, key: &[u8; 32]) -> bool {
    is_sealed(value) && matches!(value, Value::String(s) if unseal_value(s, key).is_ok())
}

/// Seal every secret value in `config`, recursing through objects and arrays.
/// Values already sealed under `key` are left alone.
pub fn seal_secrets(config: &mut Value, key: &[u8; 32]) -> Result<(), CryptoError> {
    match config {
        Value::Object(map) => {
            for (k, v) in map.iter_mut() {
                if is_secret_key(k) {
                    if !v.is_null() && !is_sealed_with(v, key) {
                        *v = Value::String(seal_value(v, key)?);
                    }
                } else {
                    seal_secrets(v, key)?;
                }
            }
        }
        Value::Array(items) => {
            for v in items {
                seal_secrets(v, key)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Restore every sealed secret value in `config` to its plaintext.
pub fn unseal_secrets(config: &mut Value, key: &[u8; 32]) -> Result<(), CryptoError> {
    match config {
        Value::Object(map) => {
            for (k, v) in map.iter_mut() {
                if is_secret_key(k) {
                    if let Value::String(s) = v
                        && s.starts_with(SEALED_PREFIX)
                    {
                        let plain = unseal_value(s, key)?;
                        *v = plain;
                    }
                } else {
                    unseal_secrets(v, key)?;
                }
            }
        }
        Value::Array(items) => {
            for v in items {
                unseal_secrets(v, key)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Blank out secret values so the payload can be returned to clients.
pub fn mask_secrets(config: &mut Value) {
    match config {
        Value::Object(map) => {
            for (k, v) in map.iter_mut() {
                if is_secret_key(k) {
                    if !v.is_null() {
                        *v = Value::String(String::new());
                    }
                } else {
                    mask_secrets(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask_secrets),
        _ => {}
    }
}
