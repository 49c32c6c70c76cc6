//! Resource definitions returned to callers
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


use crate::state::VersionState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User-supplied labels on a CryptoKey
pub type Labels = HashMap<String, String>;

/// What a CryptoKey may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CryptoKeyPurpose {
    /// Symmetric encrypt / decrypt
    #[default]
    EncryptDecrypt,
    AsymmetricSign,
    AsymmetricDecrypt,
    Mac,
}

/// Algorithm of a CryptoKeyVersion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CryptoKeyVersionAlgorithm {
    /// AES-256-GCM
    #[default]
    GoogleSymmetricEncryption,
}

/// Recorded only; all material lives in process memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtectionLevel {
    #[default]
    Software,
    Hsm,
    External,
}

/// Settings applied to every new version of a CryptoKey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VersionTemplate {
    pub protection_level: ProtectionLevel,
    pub algorithm: CryptoKeyVersionAlgorithm,
}

/// KeyRing view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRing {
    pub name: String,
    pub create_time: DateTime<Utc>,
}

/// CryptoKeyVersion view (never carries key material)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoKeyVersion {
    pub name: String,
    pub state: VersionState,
    pub create_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destroy_time: Option<DateTime<Utc>>,
    pub algorithm: CryptoKeyVersionAlgorithm,
    pub protection_level: ProtectionLevel,
}

impl CryptoKeyVersion {
    /// Numeric id parsed from the trailing name segment
    pub fn version_id(&self) -> Option<u64> {
        crate::names::split_version(&self.name).map(|(_, id)| id)
    }
}

/// CryptoKey view with its primary version populated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoKey {
    pub name: String,
    pub create_time: DateTime<Utc>,
    pub purpose: CryptoKeyPurpose,
    pub primary: CryptoKeyVersion,
    pub version_template: VersionTemplate,
    #[serde(default)]
    pub labels: Labels,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let template = VersionTemplate::default();
        assert_eq!(template.protection_level, ProtectionLevel::Software);
        assert_eq!(
            template.algorithm,
            CryptoKeyVersionAlgorithm::GoogleSymmetricEncryption
        );
        assert_eq!(CryptoKeyPurpose::default(), CryptoKeyPurpose::EncryptDecrypt);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&CryptoKeyPurpose::EncryptDecrypt).unwrap(),
            "\"ENCRYPT_DECRYPT\""
        );
        assert_eq!(
            serde_json::to_string(&CryptoKeyVersionAlgorithm::GoogleSymmetricEncryption).unwrap(),
            "\"GOOGLE_SYMMETRIC_ENCRYPTION\""
        );

        let template: VersionTemplate =
            serde_json::from_str(r#"{"protectionLevel":"HSM"}"#).unwrap();
        assert_eq!(template.protection_level, ProtectionLevel::Hsm);
    }

    #[test]
    fn test_version_view_serializes_camel_case() {
        let version = CryptoKeyVersion {
            name: "projects/p/locations/l/keyRings/r/cryptoKeys/k/cryptoKeyVersions/4".into(),
            state: VersionState::Enabled,
            create_time: Utc::now(),
            destroy_time: None,
            algorithm: CryptoKeyVersionAlgorithm::GoogleSymmetricEncryption,
            protection_level: ProtectionLevel::Software,
        };
        assert_eq!(version.version_id(), Some(4));

        let json = serde_json::to_value(&version).unwrap();
        assert_eq!(json["state"], "ENABLED");
        assert!(json.get("createTime").is_some());
        assert!(json.get("destroyTime").is_none());
    }
}
