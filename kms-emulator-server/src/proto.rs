//! Protobuf messages of `google.cloud.kms.v1`
//!
//! Field numbers and enum values match the published Cloud KMS protos, so
//! stock clients interoperate with the emulator. Only the fields the
//! emulator understands are declared; unknown fields are skipped on decode.
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



use prost_types::{FieldMask, Timestamp};
use std::collections::HashMap;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyRing {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub create_time: Option<Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CryptoKey {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub primary: Option<CryptoKeyVersion>,
    #[prost(enumeration = "CryptoKeyPurpose", tag = "3")]
    pub purpose: i32,
    #[prost(message, optional, tag = "5")]
    pub create_time: Option<Timestamp>,
    #[prost(map = "string, string", tag = "10")]
    pub labels: HashMap<String, String>,
    #[prost(message, optional, tag = "11")]
    pub version_template: Option<CryptoKeyVersionTemplate>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CryptoKeyVersionTemplate {
    #[prost(enumeration = "ProtectionLevel", tag = "1")]
    pub protection_level: i32,
    #[prost(enumeration = "CryptoKeyVersionAlgorithm", tag = "3")]
    pub algorithm: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CryptoKeyVersion {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(enumeration = "CryptoKeyVersionState", tag = "3")]
    pub state: i32,
    #[prost(message, optional, tag = "4")]
    pub create_time: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub destroy_time: Option<Timestamp>,
    #[prost(enumeration = "ProtectionLevel", tag = "7")]
    pub protection_level: i32,
    #[prost(enumeration = "CryptoKeyVersionAlgorithm", tag = "10")]
    pub algorithm: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum CryptoKeyPurpose {
    Unspecified = 0,
    EncryptDecrypt = 1,
    AsymmetricSign = 5,
    AsymmetricDecrypt = 6,
    Mac = 9,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum CryptoKeyVersionState {
    Unspecified = 0,
    Enabled = 1,
    Disabled = 2,
    Destroyed = 3,
    DestroyScheduled = 4,
    PendingGeneration = 5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ProtectionLevel {
    Unspecified = 0,
    Software = 1,
    Hsm = 2,
    External = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum CryptoKeyVersionAlgorithm {
    Unspecified = 0,
    GoogleSymmetricEncryption = 1,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListKeyRingsRequest {
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(int32, tag = "2")]
    pub page_size: i32,
    #[prost(string, tag = "3")]
    pub page_token: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListKeyRingsResponse {
    #[prost(message, repeated, tag = "1")]
    pub key_rings: Vec<KeyRing>,
    #[prost(string, tag = "2")]
    pub next_page_token: String,
    #[prost(int32, tag = "3")]
    pub total_size: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetKeyRingRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateKeyRingRequest {
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(string, tag = "2")]
    pub key_ring_id: String,
    #[prost(message, optional, tag = "3")]
    pub key_ring: Option<KeyRing>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListCryptoKeysRequest {
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(int32, tag = "2")]
    pub page_size: i32,
    #[prost(string, tag = "3")]
    pub page_token: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListCryptoKeysResponse {
    #[prost(message, repeated, tag = "1")]
    pub crypto_keys: Vec<CryptoKey>,
    #[prost(string, tag = "2")]
    pub next_page_token: String,
    #[prost(int32, tag = "3")]
    pub total_size: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetCryptoKeyRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateCryptoKeyRequest {
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(string, tag = "2")]
    pub crypto_key_id: String,
    #[prost(message, optional, tag = "3")]
    pub crypto_key: Option<CryptoKey>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateCryptoKeyRequest {
    #[prost(message, optional, tag = "1")]
    pub crypto_key: Option<CryptoKey>,
    #[prost(message, optional, tag = "2")]
    pub update_mask: Option<FieldMask>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListCryptoKeyVersionsRequest {
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(int32, tag = "2")]
    pub page_size: i32,
    #[prost(string, tag = "3")]
    pub page_token: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListCryptoKeyVersionsResponse {
    #[prost(message, repeated, tag = "1")]
    pub crypto_key_versions: Vec<CryptoKeyVersion>,
    #[prost(string, tag = "2")]
    pub next_page_token: String,
    #[prost(int32, tag = "3")]
    pub total_size: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetCryptoKeyVersionRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateCryptoKeyVersionRequest {
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(message, optional, tag = "2")]
    pub crypto_key_version: Option<CryptoKeyVersion>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateCryptoKeyVersionRequest {
    #[prost(message, optional, tag = "1")]
    pub crypto_key_version: Option<CryptoKeyVersion>,
    #[prost(message, optional, tag = "2")]
    pub update_mask: Option<FieldMask>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateCryptoKeyPrimaryVersionRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub crypto_key_version_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DestroyCryptoKeyVersionRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EncryptRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bytes = "vec", tag = "2")]
    pub plaintext: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EncryptResponse {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bytes = "vec", tag = "2")]
    pub ciphertext: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DecryptRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bytes = "vec", tag = "2")]
    pub ciphertext: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DecryptResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub plaintext: Vec<u8>,
}

// Generated server and client for KeyManagementService
include!(concat!(
    env!("OUT_DIR"),
    "/google.cloud.kms.v1.KeyManagementService.rs"
));
