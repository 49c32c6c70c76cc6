//! KMS (Key Management Service) interface
//!
//! The contract every caller programs against. Implementations are
//! synchronous: each call is a bounded computation with no I/O, so async
//! callers invoke it directly.
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


use crate::error::KmsResult;
use crate::resources::{
    CryptoKey, CryptoKeyPurpose, CryptoKeyVersion, KeyRing, Labels, VersionTemplate,
};
use crate::state::VersionState;

/// Trait for Key Management Service backends
pub trait KeyManagementService: Send + Sync {
    /// Create a key ring under its full name
    fn create_key_ring(&self, name: &str) -> KmsResult<KeyRing>;

    /// Get a key ring
    fn get_key_ring(&self, name: &str) -> KmsResult<KeyRing>;

    /// List key rings directly under `parent`, sorted by name
    fn list_key_rings(&self, parent: &str) -> KmsResult<Vec<KeyRing>>;

    /// Create a crypto key together with its first, primary version
    fn create_crypto_key(
        &self,
        key_ring: &str,
        crypto_key_id: &str,
        purpose: CryptoKeyPurpose,
        version_template: Option<VersionTemplate>,
        labels: Labels,
    ) -> KmsResult<CryptoKey>;

    /// Get a crypto key
    fn get_crypto_key(&self, name: &str) -> KmsResult<CryptoKey>;

    /// List crypto keys in a key ring, sorted by name
    fn list_crypto_keys(&self, key_ring: &str) -> KmsResult<Vec<CryptoKey>>;

    /// Replace the labels of a crypto key
    fn update_crypto_key(&self, name: &str, labels: Labels) -> KmsResult<CryptoKey>;

    /// Create a new enabled version (rotation); the primary is untouched
    fn create_crypto_key_version(&self, crypto_key: &str) -> KmsResult<CryptoKeyVersion>;

    /// Get a crypto key version
    fn get_crypto_key_version(&self, name: &str) -> KmsResult<CryptoKeyVersion>;

    /// List versions of a crypto key in ascending id order
    fn list_crypto_key_versions(&self, crypto_key: &str) -> KmsResult<Vec<CryptoKeyVersion>>;

    /// Point the primary at an enabled version
    fn update_crypto_key_primary_version(
        &self,
        crypto_key: &str,
        version_id: &str,
    ) -> KmsResult<CryptoKey>;

    /// Set the state of a version
    fn update_crypto_key_version(
        &self,
        name: &str,
        state: VersionState,
    ) -> KmsResult<CryptoKeyVersion>;

    /// Schedule a version for destruction
    fn destroy_crypto_key_version(&self, name: &str) -> KmsResult<CryptoKeyVersion>;

    /// Encrypt through the primary version
    fn encrypt(&self, crypto_key: &str, plaintext: &[u8]) -> KmsResult<Vec<u8>>;

    /// Decrypt with whichever enabled version authenticates the ciphertext
    fn decrypt(&self, crypto_key: &str, ciphertext: &[u8]) -> KmsResult<Vec<u8>>;
}
