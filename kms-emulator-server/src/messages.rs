//! Request and response messages of the service layer
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


use kms_emulator_core::{
    CryptoKey, CryptoKeyPurpose, CryptoKeyVersion, KeyRing, Labels, VersionState,
    VersionTemplate,
};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct CreateKeyRingRequest {
    pub parent: String,
    pub key_ring_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct GetKeyRingRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListKeyRingsRequest {
    pub parent: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListKeyRingsResponse {
    pub key_rings: Vec<KeyRing>,
    pub next_page_token: String,
    pub total_size: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CreateCryptoKeyRequest {
    pub parent: String,
    pub crypto_key_id: String,
    /// Defaults to `ENCRYPT_DECRYPT`
    pub purpose: Option<CryptoKeyPurpose>,
    pub version_template: Option<VersionTemplate>,
    pub labels: Labels,
}

#[derive(Debug, Clone, Default)]
pub struct GetCryptoKeyRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListCryptoKeysRequest {
    pub parent: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCryptoKeysResponse {
    pub crypto_keys: Vec<CryptoKey>,
    pub next_page_token: String,
    pub total_size: usize,
}

/// Replaces the labels of a crypto key
#[derive(Debug, Clone, Default)]
pub struct UpdateCryptoKeyRequest {
    pub name: String,
    pub labels: Labels,
}

#[derive(Debug, Clone, Default)]
pub struct CreateCryptoKeyVersionRequest {
    pub parent: String,
}

#[derive(Debug, Clone, Default)]
pub struct GetCryptoKeyVersionRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListCryptoKeyVersionsRequest {
    pub parent: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCryptoKeyVersionsResponse {
    pub crypto_key_versions: Vec<CryptoKeyVersion>,
    pub next_page_token: String,
    pub total_size: usize,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCryptoKeyVersionRequest {
    pub name: String,
    pub state: Option<VersionState>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCryptoKeyPrimaryVersionRequest {
    pub name: String,
    pub crypto_key_version_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct DestroyCryptoKeyVersionRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct EncryptRequest {
    pub name: String,
    pub plaintext: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct EncryptResponse {
    pub name: String,
    pub ciphertext: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct DecryptRequest {
    pub name: String,
    pub ciphertext: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct DecryptResponse {
    pub plaintext: Vec<u8>,
}
