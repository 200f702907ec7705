//! Password-derived encryption for individual config values.
//!
//! Encrypted values are stored as `__crypted__` followed by the base64 of
//! `nonce || ciphertext`, so plain and encrypted strings can live side by side
//! in the same config file. Anything without the marker is passed through
//! untouched on read. A marked value that fails to decode is kept verbatim
//! and only reported when it is read.

use std::fmt;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use argon2::Argon2;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

pub const CRYPTED_PREFIX: &str = "__crypted__";

const APP_SALT: &[u8] = b"punchcard/config-salt";
const NONCE_LEN: usize = 12;

/// 256-bit key derived from the master password. Lives in memory only.
#[derive(Clone)]
pub struct SecretKey([u8; 32]);

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

impl SecretKey {
    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

/// Derive the config key from the master password. Same password, same key.
pub fn derive_key(password: &str) -> Result<SecretKey> {
    let mut key = [0u8; 32];
    Argon2::default()
        .hash_password_into(password.as_bytes(), APP_SALT, &mut key)
        .map_err(|e| Error::KeyDerivation(e.to_string()))?;
    Ok(SecretKey(key))
}

/// Encrypt `plaintext` into its self-describing stored form.
pub fn encrypt(key: &SecretKey, plaintext: &str) -> Result<String> {
    Ok(StoredValue::seal(key, plaintext)?.encode())
}

/// Decrypt a stored string. Values without the marker come back unchanged.
pub fn decrypt(key: &SecretKey, stored: &str) -> Result<String> {
    StoredValue::parse(stored)?.reveal(key)
}

/// A config value as it sits on disk, decoded once at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    Plain(String),
    /// `nonce || ciphertext`, tag included.
    Encrypted(Vec<u8>),
    /// A marked value that did not decode. Written back as found.
    Corrupt { raw: String, reason: String },
}

impl StoredValue {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.strip_prefix(CRYPTED_PREFIX) {
            Some(payload) => {
                let bytes = STANDARD
                    .decode(payload.trim())
                    .map_err(|e| Error::CorruptSecret(e.to_string()))?;
                Ok(Self::Encrypted(bytes))
            }
            None => Ok(Self::Plain(raw.to_string())),
        }
    }

    /// Like `parse`, but an undecodable payload becomes `Corrupt` instead of
    /// an error, so one bad entry never costs the rest of the file.
    pub fn decode(raw: &str) -> Self {
        match Self::parse(raw) {
            Ok(value) => value,
            Err(Error::CorruptSecret(reason)) => Self::Corrupt {
                raw: raw.to_string(),
                reason,
            },
            Err(e) => Self::Corrupt {
                raw: raw.to_string(),
                reason: e.to_string(),
            },
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Plain(s) => s.clone(),
            Self::Corrupt { raw, .. } => raw.clone(),
            Self::Encrypted(bytes) => {
                format!("{}{}", CRYPTED_PREFIX, STANDARD.encode(bytes).trim_end())
            }
        }
    }

    pub fn seal(key: &SecretKey, plaintext: &str) -> Result<Self> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = key
            .cipher()
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| Error::CorruptSecret(format!("encryption failed: {}", e)))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(Self::Encrypted(out))
    }

    pub fn reveal(&self, key: &SecretKey) -> Result<String> {
        let bytes = match self {
            Self::Plain(s) => return Ok(s.clone()),
            Self::Corrupt { reason, .. } => return Err(Error::CorruptSecret(reason.clone())),
            Self::Encrypted(bytes) => bytes,
        };
        if bytes.len() < NONCE_LEN {
            return Err(Error::CorruptSecret("payload too short".to_string()));
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = key
            .cipher()
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| Error::Authentication)?;
        String::from_utf8(plaintext).map_err(|e| Error::CorruptSecret(e.to_string()))
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted(_))
    }
}

impl Serialize for StoredValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

/// Argon2 is slow in debug builds; tests share one derived key.
#[cfg(test)]
pub(crate) fn test_key() -> SecretKey {
    use std::sync::LazyLock;
    static KEY: LazyLock<SecretKey> =
        LazyLock::new(|| derive_key("correct horse").expect("derive test key"));
    KEY.clone()
}
