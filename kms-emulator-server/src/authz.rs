//! Authorization boundary
//!
//! Every operation requires one `cloudkms.*` permission, checked either on
//! the resource itself or on its parent (create and list). An [`Authorizer`]
//! answers the check; [`AccessControl`] applies the configured mode around it.
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


use crate::status::Status;
use async_trait::async_trait;
use kms_emulator_config::IamMode;
use kms_emulator_core::ResourceName;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Header carrying the caller identity
pub const PRINCIPAL_HEADER: &str = "x-emulator-principal";

/// Permission that grants everything in [`StaticPolicyAuthorizer`]
pub const WILDCARD_PERMISSION: &str = "*";

/// KMS operations subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateKeyRing,
    GetKeyRing,
    ListKeyRings,
    CreateCryptoKey,
    GetCryptoKey,
    ListCryptoKeys,
    UpdateCryptoKey,
    Encrypt,
    Decrypt,
    CreateCryptoKeyVersion,
    GetCryptoKeyVersion,
    ListCryptoKeyVersions,
    UpdateCryptoKeyVersion,
    UpdateCryptoKeyPrimaryVersion,
    DestroyCryptoKeyVersion,
}

/// Where a permission is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceTarget {
    /// The named resource
    Resource,
    /// The parent of the resource being created or listed
    Parent,
}

/// Permission required by an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionCheck {
    pub permission: &'static str,
    pub target: ResourceTarget,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateKeyRing => "CreateKeyRing",
            Operation::GetKeyRing => "GetKeyRing",
            Operation::ListKeyRings => "ListKeyRings",
            Operation::CreateCryptoKey => "CreateCryptoKey",
            Operation::GetCryptoKey => "GetCryptoKey",
            Operation::ListCryptoKeys => "ListCryptoKeys",
            Operation::UpdateCryptoKey => "UpdateCryptoKey",
            Operation::Encrypt => "Encrypt",
            Operation::Decrypt => "Decrypt",
            Operation::CreateCryptoKeyVersion => "CreateCryptoKeyVersion",
            Operation::GetCryptoKeyVersion => "GetCryptoKeyVersion",
            Operation::ListCryptoKeyVersions => "ListCryptoKeyVersions",
            Operation::UpdateCryptoKeyVersion => "UpdateCryptoKeyVersion",
            Operation::UpdateCryptoKeyPrimaryVersion => "UpdateCryptoKeyPrimaryVersion",
            Operation::DestroyCryptoKeyVersion => "DestroyCryptoKeyVersion",
        }
    }

    pub fn permission_check(&self) -> PermissionCheck {
        use ResourceTarget::{Parent, Resource};

        let (permission, target) = match self {
            Operation::CreateKeyRing => ("cloudkms.keyRings.create", Parent),
            Operation::GetKeyRing => ("cloudkms.keyRings.get", Resource),
            Operation::ListKeyRings => ("cloudkms.keyRings.list", Parent),
            Operation::CreateCryptoKey => ("cloudkms.cryptoKeys.create", Parent),
            Operation::GetCryptoKey => ("cloudkms.cryptoKeys.get", Resource),
            Operation::ListCryptoKeys => ("cloudkms.cryptoKeys.list", Parent),
            Operation::UpdateCryptoKey => ("cloudkms.cryptoKeys.update", Resource),
            Operation::Encrypt => ("cloudkms.cryptoKeys.encrypt", Resource),
            Operation::Decrypt => ("cloudkms.cryptoKeys.decrypt", Resource),
            Operation::CreateCryptoKeyVersion => ("cloudkms.cryptoKeyVersions.create", Parent),
            Operation::GetCryptoKeyVersion => ("cloudkms.cryptoKeyVersions.get", Resource),
            Operation::ListCryptoKeyVersions => ("cloudkms.cryptoKeyVersions.list", Parent),
            Operation::UpdateCryptoKeyVersion => ("cloudkms.cryptoKeyVersions.update", Resource),
            Operation::UpdateCryptoKeyPrimaryVersion => ("cloudkms.cryptoKeys.update", Resource),
            Operation::DestroyCryptoKeyVersion => {
                ("cloudkms.cryptoKeyVersions.destroy", Resource)
            }
        };

        PermissionCheck { permission, target }
    }

    /// Resource the permission is checked against
    ///
    /// Key ring and crypto key operations are truncated to their canonical
    /// prefix; version names and create/list parents pass through unchanged.
    pub fn normalize_resource(&self, resource: &str) -> String {
        if self.permission_check().target == ResourceTarget::Parent {
            return resource.to_string();
        }

        let parsed = ResourceName::parse(resource);
        let normalized = match self {
            Operation::GetKeyRing => parsed.and_then(|n| n.key_ring_name()),
            Operation::GetCryptoKey
            | Operation::UpdateCryptoKey
            | Operation::Encrypt
            | Operation::Decrypt
            | Operation::UpdateCryptoKeyPrimaryVersion => parsed.and_then(|n| n.crypto_key_name()),
            _ => None,
        };

        normalized.unwrap_or_else(|| resource.to_string())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure to obtain an answer from an authorizer
#[derive(Error, Debug)]
pub enum AuthzError {
    #[error("IAM request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IAM service returned {status}: {body}")]
    Unavailable { status: u16, body: String },
}

/// Answers whether a principal holds a permission on a resource
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn check(
        &self,
        permission: &str,
        resource: &str,
        principal: &str,
    ) -> Result<bool, AuthzError>;
}

/// In-memory grants: principal -> permissions, resource-independent
#[derive(Debug, Default, Clone)]
pub struct StaticPolicyAuthorizer {
    grants: HashMap<String, HashSet<String>>,
}

impl StaticPolicyAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `permission` (or [`WILDCARD_PERMISSION`]) to `principal`
    pub fn grant(mut self, principal: impl Into<String>, permission: impl Into<String>) -> Self {
        self.grants
            .entry(principal.into())
            .or_default()
            .insert(permission.into());
        self
    }
}

#[async_trait]
impl Authorizer for StaticPolicyAuthorizer {
    async fn check(
        &self,
        permission: &str,
        _resource: &str,
        principal: &str,
    ) -> Result<bool, AuthzError> {
        Ok(self.grants.get(principal).is_some_and(|granted| {
            granted.contains(permission) || granted.contains(WILDCARD_PERMISSION)
        }))
    }
}

#[derive(Serialize)]
struct TestPermissionsRequest<'a> {
    permissions: [&'a str; 1],
}

#[derive(Deserialize, Default)]
struct TestPermissionsResponse {
    #[serde(default)]
    permissions: Vec<String>,
}

/// Authorizer backed by an IAM service speaking `testIamPermissions`
pub struct HttpIamAuthorizer {
    base_url: String,
    client: reqwest::Client,
}

impl HttpIamAuthorizer {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AuthzError> {
        Self::with_timeout(base_url, Duration::from_secs(5))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthzError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl Authorizer for HttpIamAuthorizer {
    async fn check(
        &self,
        permission: &str,
        resource: &str,
        principal: &str,
    ) -> Result<bool, AuthzError> {
        let url = format!("{}/v1/{}:testIamPermissions", self.base_url, resource);

        let response = self
            .client
            .post(&url)
            .header(PRINCIPAL_HEADER, principal)
            .json(&TestPermissionsRequest {
                permissions: [permission],
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthzError::Unavailable { status, body });
        }

        let granted: TestPermissionsResponse = response.json().await?;
        Ok(granted.permissions.iter().any(|p| p == permission))
    }
}

/// Applies the IAM mode around an [`Authorizer`]
#[derive(Clone)]
pub struct AccessControl {
    mode: IamMode,
    authorizer: Option<Arc<dyn Authorizer>>,
}

impl AccessControl {
    /// No permission checks
    pub fn disabled() -> Self {
        Self {
            mode: IamMode::Off,
            authorizer: None,
        }
    }

    pub fn new(mode: IamMode, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            mode,
            authorizer: Some(authorizer),
        }
    }

    /// Check `operation` on `resource` for `principal`
    pub async fn authorize(
        &self,
        operation: Operation,
        resource: &str,
        principal: Option<&str>,
    ) -> Result<(), Status> {
        let authorizer = match (&self.authorizer, self.mode) {
            (None, _) | (_, IamMode::Off) => return Ok(()),
            (Some(authorizer), _) => authorizer,
        };

        let check = operation.permission_check();
        let resource = operation.normalize_resource(resource);

        let principal = match principal.filter(|p| !p.is_empty()) {
            Some(principal) => principal,
            None if self.mode == IamMode::Permissive => {
                debug!(
                    operation = %operation,
                    resource = %resource,
                    "No principal supplied, allowing in permissive mode"
                );
                return Ok(());
            }
            None => {
                warn!(
                    operation = %operation,
                    resource = %resource,
                    "Denied: no principal supplied"
                );
                return Err(Status::permission_denied(format!(
                    "missing principal: set the {} header",
                    PRINCIPAL_HEADER
                )));
            }
        };

        match authorizer.check(check.permission, &resource, principal).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!(
                    operation = %operation,
                    permission = check.permission,
                    resource = %resource,
                    principal = principal,
                    "Permission denied"
                );
                Err(Status::permission_denied(format!(
                    "Permission '{}' denied on resource '{}'",
                    check.permission, resource
                )))
            }
            Err(e) if self.mode == IamMode::Permissive => {
                warn!(
                    operation = %operation,
                    resource = %resource,
                    error = %e,
                    "Permission check failed, allowing in permissive mode"
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    operation = %operation,
                    resource = %resource,
                    error = %e,
                    "Permission check failed, denying in strict mode"
                );
                Err(Status::permission_denied(format!(
                    "Permission check for '{}' on '{}' failed: {}",
                    check.permission, resource, e
                )))
            }
        }
    }
}

impl Default for AccessControl {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Code;

    const PARENT: &str = "projects/p/locations/l";
    const RING: &str = "projects/p/locations/l/keyRings/r";
    const KEY: &str = "projects/p/locations/l/keyRings/r/cryptoKeys/k";

    struct FailingAuthorizer;

    #[async_trait]
    impl Authorizer for FailingAuthorizer {
        async fn check(&self, _: &str, _: &str, _: &str) -> Result<bool, AuthzError> {
            Err(AuthzError::Unavailable {
                status: 503,
                body: "down".into(),
            })
        }
    }

    fn alice_can_encrypt() -> Arc<dyn Authorizer> {
        Arc::new(
            StaticPolicyAuthorizer::new()
                .grant("alice", "cloudkms.cryptoKeys.encrypt")
                .grant("root", WILDCARD_PERMISSION),
        )
    }

    #[test]
    fn test_permission_table() {
        let check = Operation::CreateKeyRing.permission_check();
        assert_eq!(check.permission, "cloudkms.keyRings.create");
        assert_eq!(check.target, ResourceTarget::Parent);

        let check = Operation::UpdateCryptoKeyPrimaryVersion.permission_check();
        assert_eq!(check.permission, "cloudkms.cryptoKeys.update");
        assert_eq!(check.target, ResourceTarget::Resource);

        assert_eq!(
            Operation::DestroyCryptoKeyVersion.permission_check().permission,
            "cloudkms.cryptoKeyVersions.destroy"
        );
        assert_eq!(
            Operation::ListCryptoKeyVersions.permission_check().target,
            ResourceTarget::Parent
        );
    }

    #[test]
    fn test_normalize_resource() {
        let version = format!("{}/cryptoKeyVersions/2", KEY);

        assert_eq!(Operation::Encrypt.normalize_resource(KEY), KEY);
        assert_eq!(Operation::Encrypt.normalize_resource(&version), KEY);
        assert_eq!(Operation::GetKeyRing.normalize_resource(KEY), RING);
        assert_eq!(
            Operation::DestroyCryptoKeyVersion.normalize_resource(&version),
            version
        );
        assert_eq!(Operation::CreateKeyRing.normalize_resource(PARENT), PARENT);
        // Unparseable names pass through untouched
        assert_eq!(Operation::Encrypt.normalize_resource("bogus"), "bogus");
    }

    #[tokio::test]
    async fn test_static_policy() {
        let authz = alice_can_encrypt();
        assert!(authz.check("cloudkms.cryptoKeys.encrypt", KEY, "alice").await.unwrap());
        assert!(!authz.check("cloudkms.cryptoKeys.decrypt", KEY, "alice").await.unwrap());
        assert!(authz.check("cloudkms.cryptoKeys.decrypt", KEY, "root").await.unwrap());
        assert!(!authz.check("cloudkms.cryptoKeys.encrypt", KEY, "mallory").await.unwrap());
    }

    #[tokio::test]
    async fn test_off_mode_skips_checks() {
        let access = AccessControl::disabled();
        assert!(access.authorize(Operation::Decrypt, KEY, None).await.is_ok());

        let access = AccessControl::new(IamMode::Off, Arc::new(FailingAuthorizer));
        assert!(access
            .authorize(Operation::Decrypt, KEY, Some("mallory"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_strict_mode() {
        let access = AccessControl::new(IamMode::Strict, alice_can_encrypt());

        assert!(access
            .authorize(Operation::Encrypt, KEY, Some("alice"))
            .await
            .is_ok());

        let denied = access
            .authorize(Operation::Decrypt, KEY, Some("alice"))
            .await
            .unwrap_err();
        assert_eq!(denied.code, Code::PermissionDenied);
        assert!(denied.message.contains("cloudkms.cryptoKeys.decrypt"));

        let missing = access.authorize(Operation::Encrypt, KEY, None).await.unwrap_err();
        assert_eq!(missing.code, Code::PermissionDenied);
    }

    #[tokio::test]
    async fn test_permissive_mode_still_denies_explicit_refusals() {
        let access = AccessControl::new(IamMode::Permissive, alice_can_encrypt());

        assert!(access.authorize(Operation::Encrypt, KEY, None).await.is_ok());
        let denied = access
            .authorize(Operation::Decrypt, KEY, Some("alice"))
            .await
            .unwrap_err();
        assert_eq!(denied.code, Code::PermissionDenied);
    }

    #[tokio::test]
    async fn test_authorizer_failure_fails_open_or_closed() {
        let permissive = AccessControl::new(IamMode::Permissive, Arc::new(FailingAuthorizer));
        assert!(permissive
            .authorize(Operation::Encrypt, KEY, Some("alice"))
            .await
            .is_ok());

        let strict = AccessControl::new(IamMode::Strict, Arc::new(FailingAuthorizer));
        let err = strict
            .authorize(Operation::Encrypt, KEY, Some("alice"))
            .await
            .unwrap_err();
        assert_eq!(err.code, Code::PermissionDenied);
        assert!(err.message.contains("503"));
    }
}
