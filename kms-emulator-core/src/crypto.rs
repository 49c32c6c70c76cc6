//! AES-256-GCM engine for per-version key material
//!
//! Ciphertext layout is `nonce (12) || ciphertext || tag (16)`, no associated
//! data.
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::error::{KmsError, KmsResult};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES-256 key length in bytes
pub const KEY_SIZE: usize = 32;
/// GCM nonce length in bytes
pub const NONCE_SIZE: usize = 12;
/// GCM authentication tag length in bytes
pub const TAG_SIZE: usize = 16;

/// Symmetric key material owned by exactly one CryptoKeyVersion
///
/// The bytes never leave this module: there is no accessor, `Debug` is
/// redacted and the buffer is wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    bytes: [u8; KEY_SIZE],
}

impl KeyMaterial {
    /// Generate fresh key material from the OS CSPRNG
    pub fn generate() -> KmsResult<Self> {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| KmsError::KeyGeneration(format!("Random source failed: {}", e)))?;
        Ok(Self { bytes })
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(&self.bytes.into())
    }

    /// Encrypt with a fresh random nonce
    pub fn encrypt(&self, plaintext: &[u8]) -> KmsResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|e| KmsError::Encryption(format!("Nonce generation failed: {}", e)))?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let sealed = self
            .cipher()
            .encrypt(nonce, plaintext)
            .map_err(|e| KmsError::Encryption(format!("Encryption failed: {}", e)))?;

        // Prepend nonce to ciphertext
        let mut result = Vec::with_capacity(NONCE_SIZE + sealed.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&sealed);
        Ok(result)
    }

    /// Authenticate and decrypt `nonce || ciphertext || tag`
    pub fn decrypt(&self, ciphertext: &[u8]) -> KmsResult<Vec<u8>> {
        if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
            return Err(KmsError::Decryption("Ciphertext too short".to_string()));
        }

        let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_SIZE);
        self.cipher()
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|e| KmsError::Decryption(format!("Decryption failed: {}", e)))
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial([REDACTED])")
    }
}

/// Try each candidate key in order and return the first successful decryption
///
/// Individual failures are folded into one error so callers cannot tell which
/// versions were tried.
pub fn decrypt_with_any<'a, I>(candidates: I, ciphertext: &[u8]) -> KmsResult<Vec<u8>>
where
    I: IntoIterator<Item = &'a KeyMaterial>,
{
    if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
        return Err(KmsError::Decryption("Ciphertext too short".to_string()));
    }

    candidates
        .into_iter()
        .find_map(|key| key.decrypt(ciphertext).ok())
        .ok_or_else(|| {
            KmsError::Decryption("Failed to decrypt with any enabled key version".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let key = KeyMaterial::generate().unwrap();
        let ciphertext = key.encrypt(b"hello").unwrap();
        assert_eq!(ciphertext.len(), NONCE_SIZE + 5 + TAG_SIZE);
        assert_eq!(key.decrypt(&ciphertext).unwrap(), b"hello");
    }

    #[test]
    fn test_empty_plaintext() {
        let key = KeyMaterial::generate().unwrap();
        let ciphertext = key.encrypt(b"").unwrap();
        assert_eq!(ciphertext.len(), NONCE_SIZE + TAG_SIZE);
        assert!(key.decrypt(&ciphertext).unwrap().is_empty());
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let key = KeyMaterial::generate().unwrap();
        let a = key.encrypt(b"same input").unwrap();
        let b = key.encrypt(b"same input").unwrap();
        assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_key_fails() {
        let key = KeyMaterial::from_bytes([1u8; KEY_SIZE]);
        let other = KeyMaterial::from_bytes([2u8; KEY_SIZE]);
        let ciphertext = key.encrypt(b"secret").unwrap();
        assert!(matches!(
            other.decrypt(&ciphertext),
            Err(KmsError::Decryption(_))
        ));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = KeyMaterial::generate().unwrap();
        let mut ciphertext = key.encrypt(b"secret").unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0x01;
        assert!(key.decrypt(&ciphertext).is_err());
    }

    #[test]
    fn test_short_ciphertext_fails() {
        let key = KeyMaterial::generate().unwrap();
        assert!(key.decrypt(&[0u8; NONCE_SIZE + TAG_SIZE - 1]).is_err());
        assert!(decrypt_with_any([&key], &[0u8; 4]).is_err());
    }

    #[test]
    fn test_decrypt_with_any_finds_matching_key() {
        let first = KeyMaterial::from_bytes([7u8; KEY_SIZE]);
        let second = KeyMaterial::from_bytes([9u8; KEY_SIZE]);
        let ciphertext = second.encrypt(b"rotated").unwrap();

        let plaintext = decrypt_with_any([&first, &second], &ciphertext).unwrap();
        assert_eq!(plaintext, b"rotated");

        let err = decrypt_with_any([&first], &ciphertext).unwrap_err();
        assert!(err.to_string().contains("any enabled key version"));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = KeyMaterial::from_bytes([0xAB; KEY_SIZE]);
        let debug = format!("{:?}", key);
        assert_eq!(debug, "KeyMaterial([REDACTED])");
    }
}
