//! In-memory key hierarchy
//!
//! One reader/writer lock guards the whole KeyRing -> CryptoKey ->
//! CryptoKeyVersion tree. Mutations hold the write lock for their full
//! duration and either succeed completely or leave the tree untouched;
//! lookups, encrypt and decrypt share the read lock.
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


use crate::crypto::{self, KeyMaterial};
use crate::error::{KmsError, KmsResult};
use crate::kms::KeyManagementService;
use crate::names;
use crate::resources::{
    CryptoKey, CryptoKeyPurpose, CryptoKeyVersion, CryptoKeyVersionAlgorithm, KeyRing, Labels,
    ProtectionLevel, VersionTemplate,
};
use crate::state::{TransitionPolicy, VersionState};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Store construction options
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Validation applied by `update_crypto_key_version`
    pub transition_policy: TransitionPolicy,
}

struct StoredVersion {
    name: String,
    state: VersionState,
    create_time: DateTime<Utc>,
    destroy_time: Option<DateTime<Utc>>,
    algorithm: CryptoKeyVersionAlgorithm,
    protection_level: ProtectionLevel,
    material: KeyMaterial,
}

impl StoredVersion {
    fn generate(
        crypto_key: &str,
        id: u64,
        template: &VersionTemplate,
        create_time: DateTime<Utc>,
    ) -> KmsResult<Self> {
        Ok(Self {
            name: names::version_name(crypto_key, id),
            state: VersionState::Enabled,
            create_time,
            destroy_time: None,
            algorithm: template.algorithm,
            protection_level: template.protection_level,
            material: KeyMaterial::generate()?,
        })
    }

    fn set_state(&mut self, state: VersionState) {
        match state {
            VersionState::DestroyScheduled if self.state != VersionState::DestroyScheduled => {
                self.destroy_time = Some(Utc::now());
            }
            VersionState::DestroyScheduled | VersionState::Destroyed => {}
            _ => self.destroy_time = None,
        }
        self.state = state;
    }

    fn view(&self) -> CryptoKeyVersion {
        CryptoKeyVersion {
            name: self.name.clone(),
            state: self.state,
            create_time: self.create_time,
            destroy_time: self.destroy_time,
            algorithm: self.algorithm,
            protection_level: self.protection_level,
        }
    }
}

struct StoredCryptoKey {
    name: String,
    create_time: DateTime<Utc>,
    purpose: CryptoKeyPurpose,
    primary_version: u64,
    versions: BTreeMap<u64, StoredVersion>,
    next_version_id: u64,
    version_template: VersionTemplate,
    labels: Labels,
}

impl StoredCryptoKey {
    fn primary(&self) -> KmsResult<&StoredVersion> {
        self.versions.get(&self.primary_version).ok_or_else(|| {
            KmsError::VersionNotFound(names::version_name(&self.name, self.primary_version))
        })
    }

    fn ensure_purpose(&self, purpose: CryptoKeyPurpose) -> KmsResult<()> {
        if self.purpose != purpose {
            return Err(KmsError::FailedPrecondition(format!(
                "CryptoKey {} has purpose {:?}, operation requires {:?}",
                self.name, self.purpose, purpose
            )));
        }
        Ok(())
    }

    /// Primary first, then the remaining enabled versions newest to oldest
    fn decrypt_candidates(&self) -> impl Iterator<Item = &KeyMaterial> {
        let primary = self
            .versions
            .get(&self.primary_version)
            .filter(|v| v.state.permits_decrypt());
        let others = self
            .versions
            .iter()
            .rev()
            .filter(move |(id, v)| **id != self.primary_version && v.state.permits_decrypt())
            .map(|(_, v)| v);

        primary.into_iter().chain(others).map(|v| &v.material)
    }

    fn view(&self) -> KmsResult<CryptoKey> {
        Ok(CryptoKey {
            name: self.name.clone(),
            create_time: self.create_time,
            purpose: self.purpose,
            primary: self.primary()?.view(),
            version_template: self.version_template,
            labels: self.labels.clone(),
        })
    }
}

struct StoredKeyRing {
    name: String,
    create_time: DateTime<Utc>,
    /// Keyed by crypto key id
    crypto_keys: BTreeMap<String, StoredCryptoKey>,
}

impl StoredKeyRing {
    fn view(&self) -> KeyRing {
        KeyRing {
            name: self.name.clone(),
            create_time: self.create_time,
        }
    }
}

/// The whole tree; only ever touched through the store's lock
#[derive(Default)]
struct Hierarchy {
    /// Keyed by full key ring name
    key_rings: BTreeMap<String, StoredKeyRing>,
}

impl Hierarchy {
    fn key_ring(&self, name: &str) -> KmsResult<&StoredKeyRing> {
        self.key_rings
            .get(name)
            .ok_or_else(|| KmsError::KeyRingNotFound(name.to_string()))
    }

    fn key_ring_mut(&mut self, name: &str) -> KmsResult<&mut StoredKeyRing> {
        self.key_rings
            .get_mut(name)
            .ok_or_else(|| KmsError::KeyRingNotFound(name.to_string()))
    }

    fn crypto_key(&self, name: &str) -> KmsResult<&StoredCryptoKey> {
        let (key_ring, id) = names::split_crypto_key(name)
            .ok_or_else(|| KmsError::InvalidName(name.to_string()))?;
        self.key_rings
            .get(key_ring)
            .and_then(|ring| ring.crypto_keys.get(id))
            .ok_or_else(|| KmsError::CryptoKeyNotFound(name.to_string()))
    }

    fn crypto_key_mut(&mut self, name: &str) -> KmsResult<&mut StoredCryptoKey> {
        let (key_ring, id) = names::split_crypto_key(name)
            .ok_or_else(|| KmsError::InvalidName(name.to_string()))?;
        self.key_rings
            .get_mut(key_ring)
            .and_then(|ring| ring.crypto_keys.get_mut(id))
            .ok_or_else(|| KmsError::CryptoKeyNotFound(name.to_string()))
    }

    fn version(&self, name: &str) -> KmsResult<&StoredVersion> {
        let (crypto_key, id) =
            names::split_version(name).ok_or_else(|| KmsError::InvalidName(name.to_string()))?;
        self.crypto_key(crypto_key)?
            .versions
            .get(&id)
            .ok_or_else(|| KmsError::VersionNotFound(name.to_string()))
    }

    fn version_mut(&mut self, name: &str) -> KmsResult<&mut StoredVersion> {
        let (crypto_key, id) =
            names::split_version(name).ok_or_else(|| KmsError::InvalidName(name.to_string()))?;
        self.crypto_key_mut(crypto_key)?
            .versions
            .get_mut(&id)
            .ok_or_else(|| KmsError::VersionNotFound(name.to_string()))
    }
}

/// In-memory key store guarded by a single reader/writer lock
pub struct InMemoryKeyStore {
    hierarchy: RwLock<Hierarchy>,
    options: StoreOptions,
}

impl InMemoryKeyStore {
    /// Create an empty store with strict state transitions
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            hierarchy: RwLock::new(Hierarchy::default()),
            options,
        }
    }

    /// Drop every resource
    pub fn clear(&self) {
        self.hierarchy.write().key_rings.clear();
    }
}

impl Default for InMemoryKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyManagementService for InMemoryKeyStore {
    fn create_key_ring(&self, name: &str) -> KmsResult<KeyRing> {
        names::split_key_ring(name).ok_or_else(|| KmsError::InvalidName(name.to_string()))?;

        let mut hierarchy = self.hierarchy.write();
        if hierarchy.key_rings.contains_key(name) {
            return Err(KmsError::KeyRingAlreadyExists(name.to_string()));
        }

        let key_ring = StoredKeyRing {
            name: name.to_string(),
            create_time: Utc::now(),
            crypto_keys: BTreeMap::new(),
        };
        let view = key_ring.view();
        hierarchy.key_rings.insert(name.to_string(), key_ring);
        Ok(view)
    }

    fn get_key_ring(&self, name: &str) -> KmsResult<KeyRing> {
        let hierarchy = self.hierarchy.read();
        hierarchy.key_ring(name).map(StoredKeyRing::view)
    }

    fn list_key_rings(&self, parent: &str) -> KmsResult<Vec<KeyRing>> {
        let hierarchy = self.hierarchy.read();
        Ok(hierarchy
            .key_rings
            .values()
            .filter(|ring| {
                names::split_key_ring(&ring.name).map(|(p, _)| p) == Some(parent)
            })
            .map(StoredKeyRing::view)
            .collect())
    }

    fn create_crypto_key(
        &self,
        key_ring: &str,
        crypto_key_id: &str,
        purpose: CryptoKeyPurpose,
        version_template: Option<VersionTemplate>,
        labels: Labels,
    ) -> KmsResult<CryptoKey> {
        let name = names::crypto_key_name(key_ring, crypto_key_id);
        names::split_crypto_key(&name).ok_or_else(|| KmsError::InvalidName(name.clone()))?;

        let mut hierarchy = self.hierarchy.write();
        let ring = hierarchy.key_ring_mut(key_ring)?;
        if ring.crypto_keys.contains_key(crypto_key_id) {
            return Err(KmsError::CryptoKeyAlreadyExists(name));
        }

        let version_template = version_template.unwrap_or_default();
        let create_time = Utc::now();
        let initial = StoredVersion::generate(&name, 1, &version_template, create_time)?;

        let mut versions = BTreeMap::new();
        versions.insert(1, initial);
        let crypto_key = StoredCryptoKey {
            name,
            create_time,
            purpose,
            primary_version: 1,
            versions,
            next_version_id: 2,
            version_template,
            labels,
        };

        let view = crypto_key.view()?;
        ring.crypto_keys.insert(crypto_key_id.to_string(), crypto_key);
        Ok(view)
    }

    fn get_crypto_key(&self, name: &str) -> KmsResult<CryptoKey> {
        let hierarchy = self.hierarchy.read();
        hierarchy.crypto_key(name)?.view()
    }

    fn list_crypto_keys(&self, key_ring: &str) -> KmsResult<Vec<CryptoKey>> {
        let hierarchy = self.hierarchy.read();
        hierarchy
            .key_ring(key_ring)?
            .crypto_keys
            .values()
            .map(StoredCryptoKey::view)
            .collect()
    }

    fn update_crypto_key(&self, name: &str, labels: Labels) -> KmsResult<CryptoKey> {
        let mut hierarchy = self.hierarchy.write();
        let crypto_key = hierarchy.crypto_key_mut(name)?;
        crypto_key.labels = labels;
        crypto_key.view()
    }

    fn create_crypto_key_version(&self, crypto_key: &str) -> KmsResult<CryptoKeyVersion> {
        let mut hierarchy = self.hierarchy.write();
        let key = hierarchy.crypto_key_mut(crypto_key)?;

        let id = key.next_version_id;
        let version = StoredVersion::generate(&key.name, id, &key.version_template, Utc::now())?;
        let view = version.view();

        key.versions.insert(id, version);
        key.next_version_id += 1;
        Ok(view)
    }

    fn get_crypto_key_version(&self, name: &str) -> KmsResult<CryptoKeyVersion> {
        let hierarchy = self.hierarchy.read();
        hierarchy.version(name).map(StoredVersion::view)
    }

    fn list_crypto_key_versions(&self, crypto_key: &str) -> KmsResult<Vec<CryptoKeyVersion>> {
        let hierarchy = self.hierarchy.read();
        Ok(hierarchy
            .crypto_key(crypto_key)?
            .versions
            .values()
            .map(StoredVersion::view)
            .collect())
    }

    fn update_crypto_key_primary_version(
        &self,
        crypto_key: &str,
        version_id: &str,
    ) -> KmsResult<CryptoKey> {
        let mut hierarchy = self.hierarchy.write();
        let key = hierarchy.crypto_key_mut(crypto_key)?;

        let target = names::parse_version_id(version_id)
            .and_then(|id| key.versions.get(&id).map(|v| (id, v)));
        let (id, version) = target.ok_or_else(|| {
            KmsError::FailedPrecondition(format!(
                "CryptoKeyVersion {}/{}/{} does not exist",
                crypto_key,
                names::CRYPTO_KEY_VERSIONS,
                version_id
            ))
        })?;

        if !version.state.permits_primary() {
            return Err(KmsError::VersionNotEnabled {
                name: version.name.clone(),
                state: version.state,
            });
        }

        key.primary_version = id;
        key.view()
    }

    fn update_crypto_key_version(
        &self,
        name: &str,
        state: VersionState,
    ) -> KmsResult<CryptoKeyVersion> {
        let mut hierarchy = self.hierarchy.write();
        let version = hierarchy.version_mut(name)?;

        if !self.options.transition_policy.allows(version.state, state) {
            return Err(KmsError::IllegalTransition {
                name: name.to_string(),
                from: version.state,
                to: state,
            });
        }

        version.set_state(state);
        Ok(version.view())
    }

    fn destroy_crypto_key_version(&self, name: &str) -> KmsResult<CryptoKeyVersion> {
        let mut hierarchy = self.hierarchy.write();
        let version = hierarchy.version_mut(name)?;

        match version.state {
            VersionState::DestroyScheduled | VersionState::Destroyed => {
                return Err(KmsError::AlreadyDestroyed {
                    name: name.to_string(),
                    state: version.state,
                });
            }
            state if !state.permits_destroy() => {
                return Err(KmsError::IllegalTransition {
                    name: name.to_string(),
                    from: state,
                    to: VersionState::DestroyScheduled,
                });
            }
            _ => {}
        }

        version.set_state(VersionState::DestroyScheduled);
        Ok(version.view())
    }

    fn encrypt(&self, crypto_key: &str, plaintext: &[u8]) -> KmsResult<Vec<u8>> {
        let hierarchy = self.hierarchy.read();
        let key = hierarchy.crypto_key(crypto_key)?;
        key.ensure_purpose(CryptoKeyPurpose::EncryptDecrypt)?;

        let primary = key.primary()?;
        if !primary.state.permits_encrypt() {
            return Err(KmsError::VersionNotEnabled {
                name: primary.name.clone(),
                state: primary.state,
            });
        }

        primary.material.encrypt(plaintext)
    }

    fn decrypt(&self, crypto_key: &str, ciphertext: &[u8]) -> KmsResult<Vec<u8>> {
        let hierarchy = self.hierarchy.read();
        let key = hierarchy.crypto_key(crypto_key)?;
        key.ensure_purpose(CryptoKeyPurpose::EncryptDecrypt)?;

        crypto::decrypt_with_any(key.decrypt_candidates(), ciphertext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const LOCATION: &str = "projects/test/locations/global";
    const RING: &str = "projects/test/locations/global/keyRings/ring1";
    const KEY: &str = "projects/test/locations/global/keyRings/ring1/cryptoKeys/key1";

    fn store_with_key() -> InMemoryKeyStore {
        let store = InMemoryKeyStore::new();
        store.create_key_ring(RING).unwrap();
        store
            .create_crypto_key(
                RING,
                "key1",
                CryptoKeyPurpose::EncryptDecrypt,
                None,
                Labels::new(),
            )
            .unwrap();
        store
    }

    fn version(id: u64) -> String {
        names::version_name(KEY, id)
    }

    #[test]
    fn test_create_key_ring_duplicate() {
        let store = InMemoryKeyStore::new();
        let ring = store.create_key_ring(RING).unwrap();
        assert_eq!(ring.name, RING);

        let err = store.create_key_ring(RING).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_create_key_ring_requires_key_ring_segment() {
        let store = InMemoryKeyStore::new();
        let err = store.create_key_ring(LOCATION).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_get_key_ring_not_found() {
        let store = InMemoryKeyStore::new();
        let err = store.get_key_ring(RING).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_list_key_rings_filters_by_parent() {
        let store = InMemoryKeyStore::new();
        store.create_key_ring(RING).unwrap();
        store
            .create_key_ring("projects/test/locations/global/keyRings/ring2")
            .unwrap();
        store
            .create_key_ring("projects/other/locations/global/keyRings/ring3")
            .unwrap();

        let rings = store.list_key_rings(LOCATION).unwrap();
        let names: Vec<_> = rings.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![RING, "projects/test/locations/global/keyRings/ring2"]
        );
        assert!(store
            .list_key_rings("projects/none/locations/global")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_create_crypto_key_initial_version() {
        let store = InMemoryKeyStore::new();
        store.create_key_ring(RING).unwrap();

        let mut labels = Labels::new();
        labels.insert("env".into(), "test".into());
        let key = store
            .create_crypto_key(
                RING,
                "key1",
                CryptoKeyPurpose::EncryptDecrypt,
                None,
                labels.clone(),
            )
            .unwrap();

        assert_eq!(key.name, KEY);
        assert_eq!(key.primary.name, version(1));
        assert_eq!(key.primary.state, VersionState::Enabled);
        assert_eq!(key.labels, labels);
        assert_eq!(key.version_template, VersionTemplate::default());
    }

    #[test]
    fn test_new_key_and_first_version_share_create_time() {
        let store = store_with_key();
        let key = store.get_crypto_key(KEY).unwrap();
        assert_eq!(key.create_time, key.primary.create_time);

        let v1 = store.get_crypto_key_version(&version(1)).unwrap();
        assert_eq!(v1.create_time, key.create_time);
    }

    #[test]
    fn test_create_crypto_key_errors() {
        let store = InMemoryKeyStore::new();
        let err = store
            .create_crypto_key(
                RING,
                "key1",
                CryptoKeyPurpose::EncryptDecrypt,
                None,
                Labels::new(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let store = store_with_key();
        let err = store
            .create_crypto_key(
                RING,
                "key1",
                CryptoKeyPurpose::EncryptDecrypt,
                None,
                Labels::new(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let err = store
            .create_crypto_key(
                RING,
                "bad/id",
                CryptoKeyPurpose::EncryptDecrypt,
                None,
                Labels::new(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_version_template_is_applied() {
        let store = InMemoryKeyStore::new();
        store.create_key_ring(RING).unwrap();
        let template = VersionTemplate {
            protection_level: ProtectionLevel::Hsm,
            algorithm: CryptoKeyVersionAlgorithm::GoogleSymmetricEncryption,
        };
        store
            .create_crypto_key(
                RING,
                "key1",
                CryptoKeyPurpose::EncryptDecrypt,
                Some(template),
                Labels::new(),
            )
            .unwrap();

        let v2 = store.create_crypto_key_version(KEY).unwrap();
        assert_eq!(v2.protection_level, ProtectionLevel::Hsm);
    }

    #[test]
    fn test_update_crypto_key_replaces_labels() {
        let store = store_with_key();
        let mut labels = Labels::new();
        labels.insert("team".into(), "payments".into());

        let key = store.update_crypto_key(KEY, labels.clone()).unwrap();
        assert_eq!(key.labels, labels);
        assert_eq!(store.get_crypto_key(KEY).unwrap().labels, labels);

        let err = store
            .update_crypto_key(&format!("{}/cryptoKeys/missing", RING), Labels::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_create_version_keeps_primary() {
        let store = store_with_key();
        let v2 = store.create_crypto_key_version(KEY).unwrap();
        assert_eq!(v2.name, version(2));
        assert_eq!(v2.state, VersionState::Enabled);
        assert_eq!(store.get_crypto_key(KEY).unwrap().primary.name, version(1));
    }

    #[test]
    fn test_primary_requires_enabled_existing_version() {
        let store = store_with_key();
        store.create_crypto_key_version(KEY).unwrap();
        store
            .update_crypto_key_version(&version(2), VersionState::Disabled)
            .unwrap();

        let err = store.update_crypto_key_primary_version(KEY, "2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedPrecondition);

        let err = store.update_crypto_key_primary_version(KEY, "9").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedPrecondition);

        let err = store
            .update_crypto_key_primary_version(&format!("{}/cryptoKeys/nope", RING), "1")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // Failed attempts leave the primary alone
        assert_eq!(store.get_crypto_key(KEY).unwrap().primary.name, version(1));
    }

    #[test]
    fn test_strict_policy_rejects_illegal_transition() {
        let store = store_with_key();
        store.destroy_crypto_key_version(&version(1)).unwrap();

        let err = store
            .update_crypto_key_version(&version(1), VersionState::Enabled)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
        assert_eq!(
            store.get_crypto_key_version(&version(1)).unwrap().state,
            VersionState::DestroyScheduled
        );
    }

    #[test]
    fn test_permissive_policy_accepts_any_state() {
        let store = InMemoryKeyStore::with_options(StoreOptions {
            transition_policy: TransitionPolicy::Permissive,
        });
        store.create_key_ring(RING).unwrap();
        store
            .create_crypto_key(
                RING,
                "key1",
                CryptoKeyPurpose::EncryptDecrypt,
                None,
                Labels::new(),
            )
            .unwrap();

        store
            .update_crypto_key_version(&version(1), VersionState::Destroyed)
            .unwrap();
        let v1 = store
            .update_crypto_key_version(&version(1), VersionState::Enabled)
            .unwrap();
        assert_eq!(v1.state, VersionState::Enabled);
    }

    #[test]
    fn test_destroy_records_time_and_guards_repeat() {
        let store = store_with_key();
        let destroyed = store.destroy_crypto_key_version(&version(1)).unwrap();
        assert_eq!(destroyed.state, VersionState::DestroyScheduled);
        assert!(destroyed.destroy_time.is_some());

        let err = store.destroy_crypto_key_version(&version(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedPrecondition);

        // Restoring clears the schedule
        let restored = store
            .update_crypto_key_version(&version(1), VersionState::Disabled)
            .unwrap();
        assert!(restored.destroy_time.is_none());
    }

    #[test]
    fn test_version_lookup_errors() {
        let store = store_with_key();
        let err = store.get_crypto_key_version(&version(5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = store.get_crypto_key_version("not-a-version").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = store
            .update_crypto_key_version(&version(5), VersionState::Disabled)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_encrypt_requires_enabled_primary() {
        let store = store_with_key();
        store
            .update_crypto_key_version(&version(1), VersionState::Disabled)
            .unwrap();

        let err = store.encrypt(KEY, b"data").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
    }

    #[test]
    fn test_encrypt_rejects_non_symmetric_purpose() {
        let store = InMemoryKeyStore::new();
        store.create_key_ring(RING).unwrap();
        store
            .create_crypto_key(RING, "signer", CryptoKeyPurpose::AsymmetricSign, None, Labels::new())
            .unwrap();

        let err = store
            .encrypt(&format!("{}/cryptoKeys/signer", RING), b"data")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
    }

    #[test]
    fn test_decrypt_tries_non_primary_versions() {
        let store = store_with_key();
        let ciphertext = store.encrypt(KEY, b"hello").unwrap();

        store.create_crypto_key_version(KEY).unwrap();
        store.update_crypto_key_primary_version(KEY, "2").unwrap();

        assert_eq!(store.decrypt(KEY, &ciphertext).unwrap(), b"hello");
    }

    #[test]
    fn test_decrypt_of_garbage_is_internal() {
        let store = store_with_key();
        let err = store.decrypt(KEY, &[0u8; 40]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);

        let err = store.decrypt(KEY, b"short").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_clear() {
        let store = store_with_key();
        store.clear();
        assert!(store.list_key_rings(LOCATION).unwrap().is_empty());
    }
}
