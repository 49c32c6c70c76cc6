//! Resource name construction and parsing
//!
//! Names are bit-exact with the cloud API:
//!
//! ```text
//! projects/{p}/locations/{l}/keyRings/{r}/cryptoKeys/{k}/cryptoKeyVersions/{v}
//! ```
//!
//! The store only relies on the `/keyRings/`, `/cryptoKeys/` and
//! `/cryptoKeyVersions/` separators; [`ResourceName::parse`] checks the full
//! canonical form for callers that need it.
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


use std::fmt;

pub const KEY_RINGS: &str = "keyRings";
pub const CRYPTO_KEYS: &str = "cryptoKeys";
pub const CRYPTO_KEY_VERSIONS: &str = "cryptoKeyVersions";

const KEY_RING_SEP: &str = "/keyRings/";
const CRYPTO_KEY_SEP: &str = "/cryptoKeys/";
const VERSION_SEP: &str = "/cryptoKeyVersions/";

pub fn key_ring_name(parent: &str, key_ring_id: &str) -> String {
    format!("{}{}{}", parent, KEY_RING_SEP, key_ring_id)
}

pub fn crypto_key_name(key_ring: &str, crypto_key_id: &str) -> String {
    format!("{}{}{}", key_ring, CRYPTO_KEY_SEP, crypto_key_id)
}

pub fn version_name(crypto_key: &str, version_id: u64) -> String {
    format!("{}{}{}", crypto_key, VERSION_SEP, version_id)
}

fn is_id(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains('/')
}

/// Split `{parent}/keyRings/{id}` into `(parent, id)`
pub fn split_key_ring(name: &str) -> Option<(&str, &str)> {
    let (parent, id) = name.rsplit_once(KEY_RING_SEP)?;
    (!parent.is_empty() && is_id(id)).then_some((parent, id))
}

/// Split `{keyRing}/cryptoKeys/{id}` into `(keyRing, id)`
pub fn split_crypto_key(name: &str) -> Option<(&str, &str)> {
    let (key_ring, id) = name.rsplit_once(CRYPTO_KEY_SEP)?;
    split_key_ring(key_ring)?;
    is_id(id).then_some((key_ring, id))
}

/// Split `{cryptoKey}/cryptoKeyVersions/{v}` into `(cryptoKey, v)`
pub fn split_version(name: &str) -> Option<(&str, u64)> {
    let (crypto_key, id) = name.rsplit_once(VERSION_SEP)?;
    split_crypto_key(crypto_key)?;
    Some((crypto_key, parse_version_id(id)?))
}

/// Parse a canonical decimal version id: digits only, no leading zero, >= 1
pub fn parse_version_id(id: &str) -> Option<u64> {
    if id.is_empty() || id.starts_with('0') || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}

/// A fully qualified resource name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceName {
    Location {
        project: String,
        location: String,
    },
    KeyRing {
        project: String,
        location: String,
        key_ring: String,
    },
    CryptoKey {
        project: String,
        location: String,
        key_ring: String,
        crypto_key: String,
    },
    CryptoKeyVersion {
        project: String,
        location: String,
        key_ring: String,
        crypto_key: String,
        version: u64,
    },
}

impl ResourceName {
    /// Parse a canonical `projects/{p}/locations/{l}/...` name
    pub fn parse(name: &str) -> Option<Self> {
        let parts: Vec<&str> = name.split('/').collect();
        if parts.len() < 4 || parts.len() % 2 != 0 || parts.len() > 10 {
            return None;
        }

        let literals = ["projects", "locations", KEY_RINGS, CRYPTO_KEYS, CRYPTO_KEY_VERSIONS];
        for (pair, literal) in parts.chunks(2).zip(literals) {
            if pair[0] != literal || !is_id(pair[1]) {
                return None;
            }
        }

        let project = parts[1].to_string();
        let location = parts[3].to_string();
        let resource = match parts.len() {
            4 => ResourceName::Location { project, location },
            6 => ResourceName::KeyRing {
                project,
                location,
                key_ring: parts[5].to_string(),
            },
            8 => ResourceName::CryptoKey {
                project,
                location,
                key_ring: parts[5].to_string(),
                crypto_key: parts[7].to_string(),
            },
            _ => ResourceName::CryptoKeyVersion {
                project,
                location,
                key_ring: parts[5].to_string(),
                crypto_key: parts[7].to_string(),
                version: parse_version_id(parts[9])?,
            },
        };
        Some(resource)
    }

    pub fn is_location(&self) -> bool {
        matches!(self, ResourceName::Location { .. })
    }

    pub fn is_key_ring(&self) -> bool {
        matches!(self, ResourceName::KeyRing { .. })
    }

    pub fn is_crypto_key(&self) -> bool {
        matches!(self, ResourceName::CryptoKey { .. })
    }

    pub fn is_crypto_key_version(&self) -> bool {
        matches!(self, ResourceName::CryptoKeyVersion { .. })
    }

    /// Truncate to the enclosing key ring, if this name has one
    pub fn key_ring_name(&self) -> Option<String> {
        match self {
            ResourceName::Location { .. } => None,
            ResourceName::KeyRing {
                project,
                location,
                key_ring,
            }
            | ResourceName::CryptoKey {
                project,
                location,
                key_ring,
                ..
            }
            | ResourceName::CryptoKeyVersion {
                project,
                location,
                key_ring,
                ..
            } => Some(key_ring_name(&location_name(project, location), key_ring)),
        }
    }

    /// Truncate to the enclosing crypto key, if this name has one
    pub fn crypto_key_name(&self) -> Option<String> {
        match self {
            ResourceName::CryptoKey {
                project,
                location,
                key_ring,
                crypto_key,
            }
            | ResourceName::CryptoKeyVersion {
                project,
                location,
                key_ring,
                crypto_key,
                ..
            } => Some(crypto_key_name(
                &key_ring_name(&location_name(project, location), key_ring),
                crypto_key,
            )),
            _ => None,
        }
    }
}

fn location_name(project: &str, location: &str) -> String {
    format!("projects/{}/locations/{}", project, location)
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceName::Location { project, location } => {
                f.write_str(&location_name(project, location))
            }
            ResourceName::KeyRing { .. } => {
                f.write_str(&self.key_ring_name().unwrap_or_default())
            }
            ResourceName::CryptoKey { .. } => {
                f.write_str(&self.crypto_key_name().unwrap_or_default())
            }
            ResourceName::CryptoKeyVersion { version, .. } => {
                let key = self.crypto_key_name().unwrap_or_default();
                f.write_str(&version_name(&key, *version))
            }
        }
    }
}
