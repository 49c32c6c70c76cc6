//! KMS service layer
//!
//! Validates requests, enforces the authorization boundary, calls the key
//! store and translates its errors into [`Status`] values.
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


use crate::authz::{AccessControl, Operation};
use crate::messages::*;
use crate::status::{Code, Status};
use kms_emulator_core::{
    names, CryptoKey, CryptoKeyVersion, KeyManagementService, KeyRing, KmsError, ResourceName,
};
use std::sync::Arc;
use tracing::{debug, error, info};

const MAX_ID_LEN: usize = 63;

/// KMS service: one async method per RPC
pub struct KmsService {
    backend: Arc<dyn KeyManagementService>,
    access: AccessControl,
}

fn require(value: &str, field: &str) -> Result<(), Status> {
    if value.is_empty() {
        return Err(Status::invalid_argument(format!("{} is required", field)));
    }
    Ok(())
}

/// Require `value` to be a canonical name of the kind accepted by `is_kind`
fn require_name(
    value: &str,
    field: &str,
    kind: &str,
    is_kind: fn(&ResourceName) -> bool,
) -> Result<(), Status> {
    require(value, field)?;
    match ResourceName::parse(value) {
        Some(name) if is_kind(&name) => Ok(()),
        _ => Err(Status::invalid_argument(format!(
            "{} must be a {} name, got '{}'",
            field, kind, value
        ))),
    }
}

/// Resource ids: 1-63 characters of `[a-zA-Z0-9_-]`
fn require_id(value: &str, field: &str) -> Result<(), Status> {
    require(value, field)?;
    let valid = value.len() <= MAX_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(Status::invalid_argument(format!(
            "{} must match [a-zA-Z0-9_-]{{1,{}}}, got '{}'",
            field, MAX_ID_LEN, value
        )));
    }
    Ok(())
}

fn call_failed(operation: Operation, err: KmsError) -> Status {
    let status = Status::from(err);
    if status.code == Code::Internal {
        error!(operation = %operation, error = %status.message, "Operation failed");
    } else {
        debug!(operation = %operation, code = %status.code, error = %status.message, "Operation rejected");
    }
    status
}

impl KmsService {
    pub fn new(backend: Arc<dyn KeyManagementService>, access: AccessControl) -> Self {
        Self { backend, access }
    }

    pub async fn create_key_ring(
        &self,
        req: CreateKeyRingRequest,
        principal: Option<&str>,
    ) -> Result<KeyRing, Status> {
        let op = Operation::CreateKeyRing;
        require_name(&req.parent, "parent", "location", ResourceName::is_location)?;
        require_id(&req.key_ring_id, "key_ring_id")?;
        self.access.authorize(op, &req.parent, principal).await?;

        let name = names::key_ring_name(&req.parent, &req.key_ring_id);
        let key_ring = self
            .backend
            .create_key_ring(&name)
            .map_err(|e| call_failed(op, e))?;

        info!(key_ring = %key_ring.name, "KeyRing created");
        Ok(key_ring)
    }

    pub async fn get_key_ring(
        &self,
        req: GetKeyRingRequest,
        principal: Option<&str>,
    ) -> Result<KeyRing, Status> {
        let op = Operation::GetKeyRing;
        require_name(&req.name, "name", "key ring", ResourceName::is_key_ring)?;
        self.access.authorize(op, &req.name, principal).await?;

        self.backend
            .get_key_ring(&req.name)
            .map_err(|e| call_failed(op, e))
    }

    pub async fn list_key_rings(
        &self,
        req: ListKeyRingsRequest,
        principal: Option<&str>,
    ) -> Result<ListKeyRingsResponse, Status> {
        let op = Operation::ListKeyRings;
        require_name(&req.parent, "parent", "location", ResourceName::is_location)?;
        self.access.authorize(op, &req.parent, principal).await?;

        let key_rings = self
            .backend
            .list_key_rings(&req.parent)
            .map_err(|e| call_failed(op, e))?;

        Ok(ListKeyRingsResponse {
            total_size: key_rings.len(),
            key_rings,
            next_page_token: String::new(),
        })
    }

    pub async fn create_crypto_key(
        &self,
        req: CreateCryptoKeyRequest,
        principal: Option<&str>,
    ) -> Result<CryptoKey, Status> {
        let op = Operation::CreateCryptoKey;
        require_name(&req.parent, "parent", "key ring", ResourceName::is_key_ring)?;
        require_id(&req.crypto_key_id, "crypto_key_id")?;
        self.access.authorize(op, &req.parent, principal).await?;

        let crypto_key = self
            .backend
            .create_crypto_key(
                &req.parent,
                &req.crypto_key_id,
                req.purpose.unwrap_or_default(),
                req.version_template,
                req.labels,
            )
            .map_err(|e| call_failed(op, e))?;

        info!(
            crypto_key = %crypto_key.name,
            purpose = ?crypto_key.purpose,
            primary = %crypto_key.primary.name,
            "CryptoKey created"
        );
        Ok(crypto_key)
    }

    pub async fn get_crypto_key(
        &self,
        req: GetCryptoKeyRequest,
        principal: Option<&str>,
    ) -> Result<CryptoKey, Status> {
        let op = Operation::GetCryptoKey;
        require_name(&req.name, "name", "crypto key", ResourceName::is_crypto_key)?;
        self.access.authorize(op, &req.name, principal).await?;

        self.backend
            .get_crypto_key(&req.name)
            .map_err(|e| call_failed(op, e))
    }

    pub async fn list_crypto_keys(
        &self,
        req: ListCryptoKeysRequest,
        principal: Option<&str>,
    ) -> Result<ListCryptoKeysResponse, Status> {
        let op = Operation::ListCryptoKeys;
        require_name(&req.parent, "parent", "key ring", ResourceName::is_key_ring)?;
        self.access.authorize(op, &req.parent, principal).await?;

        let crypto_keys = self
            .backend
            .list_crypto_keys(&req.parent)
            .map_err(|e| call_failed(op, e))?;

        Ok(ListCryptoKeysResponse {
            total_size: crypto_keys.len(),
            crypto_keys,
            next_page_token: String::new(),
        })
    }

    pub async fn update_crypto_key(
        &self,
        req: UpdateCryptoKeyRequest,
        principal: Option<&str>,
    ) -> Result<CryptoKey, Status> {
        let op = Operation::UpdateCryptoKey;
        require_name(&req.name, "crypto_key.name", "crypto key", ResourceName::is_crypto_key)?;
        self.access.authorize(op, &req.name, principal).await?;

        let crypto_key = self
            .backend
            .update_crypto_key(&req.name, req.labels)
            .map_err(|e| call_failed(op, e))?;

        info!(crypto_key = %crypto_key.name, labels = crypto_key.labels.len(), "CryptoKey updated");
        Ok(crypto_key)
    }

    pub async fn create_crypto_key_version(
        &self,
        req: CreateCryptoKeyVersionRequest,
        principal: Option<&str>,
    ) -> Result<CryptoKeyVersion, Status> {
        let op = Operation::CreateCryptoKeyVersion;
        require_name(&req.parent, "parent", "crypto key", ResourceName::is_crypto_key)?;
        self.access.authorize(op, &req.parent, principal).await?;

        let version = self
            .backend
            .create_crypto_key_version(&req.parent)
            .map_err(|e| call_failed(op, e))?;

        info!(version = %version.name, "CryptoKeyVersion created");
        Ok(version)
    }

    pub async fn get_crypto_key_version(
        &self,
        req: GetCryptoKeyVersionRequest,
        principal: Option<&str>,
    ) -> Result<CryptoKeyVersion, Status> {
        let op = Operation::GetCryptoKeyVersion;
        require_name(
            &req.name,
            "name",
            "crypto key version",
            ResourceName::is_crypto_key_version,
        )?;
        self.access.authorize(op, &req.name, principal).await?;

        self.backend
            .get_crypto_key_version(&req.name)
            .map_err(|e| call_failed(op, e))
    }

    pub async fn list_crypto_key_versions(
        &self,
        req: ListCryptoKeyVersionsRequest,
        principal: Option<&str>,
    ) -> Result<ListCryptoKeyVersionsResponse, Status> {
        let op = Operation::ListCryptoKeyVersions;
        require_name(&req.parent, "parent", "crypto key", ResourceName::is_crypto_key)?;
        self.access.authorize(op, &req.parent, principal).await?;

        let crypto_key_versions = self
            .backend
            .list_crypto_key_versions(&req.parent)
            .map_err(|e| call_failed(op, e))?;

        Ok(ListCryptoKeyVersionsResponse {
            total_size: crypto_key_versions.len(),
            crypto_key_versions,
            next_page_token: String::new(),
        })
    }

    pub async fn update_crypto_key_version(
        &self,
        req: UpdateCryptoKeyVersionRequest,
        principal: Option<&str>,
    ) -> Result<CryptoKeyVersion, Status> {
        let op = Operation::UpdateCryptoKeyVersion;
        require_name(
            &req.name,
            "crypto_key_version.name",
            "crypto key version",
            ResourceName::is_crypto_key_version,
        )?;
        let state = req
            .state
            .ok_or_else(|| Status::invalid_argument("crypto_key_version.state is required"))?;
        self.access.authorize(op, &req.name, principal).await?;

        let version = self
            .backend
            .update_crypto_key_version(&req.name, state)
            .map_err(|e| call_failed(op, e))?;

        info!(version = %version.name, state = %version.state, "CryptoKeyVersion updated");
        Ok(version)
    }

    pub async fn update_crypto_key_primary_version(
        &self,
        req: UpdateCryptoKeyPrimaryVersionRequest,
        principal: Option<&str>,
    ) -> Result<CryptoKey, Status> {
        let op = Operation::UpdateCryptoKeyPrimaryVersion;
        require_name(&req.name, "name", "crypto key", ResourceName::is_crypto_key)?;
        require(&req.crypto_key_version_id, "crypto_key_version_id")?;
        self.access.authorize(op, &req.name, principal).await?;

        let crypto_key = self
            .backend
            .update_crypto_key_primary_version(&req.name, &req.crypto_key_version_id)
            .map_err(|e| call_failed(op, e))?;

        info!(
            crypto_key = %crypto_key.name,
            primary = %crypto_key.primary.name,
            "Primary version updated"
        );
        Ok(crypto_key)
    }

    pub async fn destroy_crypto_key_version(
        &self,
        req: DestroyCryptoKeyVersionRequest,
        principal: Option<&str>,
    ) -> Result<CryptoKeyVersion, Status> {
        let op = Operation::DestroyCryptoKeyVersion;
        require_name(
            &req.name,
            "name",
            "crypto key version",
            ResourceName::is_crypto_key_version,
        )?;
        self.access.authorize(op, &req.name, principal).await?;

        let version = self
            .backend
            .destroy_crypto_key_version(&req.name)
            .map_err(|e| call_failed(op, e))?;

        info!(version = %version.name, "CryptoKeyVersion scheduled for destruction");
        Ok(version)
    }

    pub async fn encrypt(
        &self,
        req: EncryptRequest,
        principal: Option<&str>,
    ) -> Result<EncryptResponse, Status> {
        let op = Operation::Encrypt;
        require_name(&req.name, "name", "crypto key", ResourceName::is_crypto_key)?;
        if req.plaintext.is_empty() {
            return Err(Status::invalid_argument("plaintext is required"));
        }
        self.access.authorize(op, &req.name, principal).await?;

        let ciphertext = self
            .backend
            .encrypt(&req.name, &req.plaintext)
            .map_err(|e| call_failed(op, e))?;

        debug!(crypto_key = %req.name, bytes = req.plaintext.len(), "Encrypted");
        Ok(EncryptResponse {
            name: req.name,
            ciphertext,
        })
    }

    pub async fn decrypt(
        &self,
        req: DecryptRequest,
        principal: Option<&str>,
    ) -> Result<DecryptResponse, Status> {
        let op = Operation::Decrypt;
        require_name(&req.name, "name", "crypto key", ResourceName::is_crypto_key)?;
        if req.ciphertext.is_empty() {
            return Err(Status::invalid_argument("ciphertext is required"));
        }
        self.access.authorize(op, &req.name, principal).await?;

        let plaintext = self
            .backend
            .decrypt(&req.name, &req.ciphertext)
            .map_err(|e| call_failed(op, e))?;

        debug!(crypto_key = %req.name, bytes = plaintext.len(), "Decrypted");
        Ok(DecryptResponse { plaintext })
    }
}
