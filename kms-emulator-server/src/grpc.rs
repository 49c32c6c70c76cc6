//! gRPC transport
//!
//! Serves `google.cloud.kms.v1.KeyManagementService` over tonic, translating
//! between the protobuf messages and the service layer. The caller identity
//! travels in the `x-emulator-principal` metadata entry.
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



use crate::authz::PRINCIPAL_HEADER;
use crate::messages;
use crate::proto::{self, key_management_service_server::KeyManagementService};
use crate::service::KmsService;
use crate::status::{Code, Status};
use chrono::{DateTime, Utc};
use kms_emulator_core::{
    CryptoKey, CryptoKeyPurpose, CryptoKeyVersion, CryptoKeyVersionAlgorithm, KeyRing,
    ProtectionLevel, VersionState, VersionTemplate,
};
use prost_types::Timestamp;
use std::sync::Arc;
use tonic::{Request, Response};

pub use crate::proto::key_management_service_server::KeyManagementServiceServer;

impl From<Status> for tonic::Status {
    fn from(status: Status) -> Self {
        let code = match status.code {
            Code::InvalidArgument => tonic::Code::InvalidArgument,
            Code::NotFound => tonic::Code::NotFound,
            Code::AlreadyExists => tonic::Code::AlreadyExists,
            Code::PermissionDenied => tonic::Code::PermissionDenied,
            Code::FailedPrecondition => tonic::Code::FailedPrecondition,
            Code::Internal => tonic::Code::Internal,
        };
        tonic::Status::new(code, status.message)
    }
}

fn timestamp(time: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: time.timestamp(),
        nanos: time.timestamp_subsec_nanos() as i32,
    }
}

fn total_size(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

fn key_ring_to_proto(key_ring: KeyRing) -> proto::KeyRing {
    proto::KeyRing {
        name: key_ring.name,
        create_time: Some(timestamp(key_ring.create_time)),
    }
}

fn version_to_proto(version: CryptoKeyVersion) -> proto::CryptoKeyVersion {
    let state = match version.state {
        VersionState::PendingGeneration => proto::CryptoKeyVersionState::PendingGeneration,
        VersionState::Enabled => proto::CryptoKeyVersionState::Enabled,
        VersionState::Disabled => proto::CryptoKeyVersionState::Disabled,
        VersionState::DestroyScheduled => proto::CryptoKeyVersionState::DestroyScheduled,
        VersionState::Destroyed => proto::CryptoKeyVersionState::Destroyed,
    };

    proto::CryptoKeyVersion {
        name: version.name,
        state: state as i32,
        create_time: Some(timestamp(version.create_time)),
        destroy_time: version.destroy_time.map(timestamp),
        protection_level: protection_level_to_proto(version.protection_level) as i32,
        algorithm: algorithm_to_proto(version.algorithm) as i32,
    }
}

fn crypto_key_to_proto(crypto_key: CryptoKey) -> proto::CryptoKey {
    let purpose = match crypto_key.purpose {
        CryptoKeyPurpose::EncryptDecrypt => proto::CryptoKeyPurpose::EncryptDecrypt,
        CryptoKeyPurpose::AsymmetricSign => proto::CryptoKeyPurpose::AsymmetricSign,
        CryptoKeyPurpose::AsymmetricDecrypt => proto::CryptoKeyPurpose::AsymmetricDecrypt,
        CryptoKeyPurpose::Mac => proto::CryptoKeyPurpose::Mac,
    };
    let template = crypto_key.version_template;

    proto::CryptoKey {
        name: crypto_key.name,
        primary: Some(version_to_proto(crypto_key.primary)),
        purpose: purpose as i32,
        create_time: Some(timestamp(crypto_key.create_time)),
        labels: crypto_key.labels,
        version_template: Some(proto::CryptoKeyVersionTemplate {
            protection_level: protection_level_to_proto(template.protection_level) as i32,
            algorithm: algorithm_to_proto(template.algorithm) as i32,
        }),
    }
}

fn protection_level_to_proto(level: ProtectionLevel) -> proto::ProtectionLevel {
    match level {
        ProtectionLevel::Software => proto::ProtectionLevel::Software,
        ProtectionLevel::Hsm => proto::ProtectionLevel::Hsm,
        ProtectionLevel::External => proto::ProtectionLevel::External,
    }
}

fn algorithm_to_proto(algorithm: CryptoKeyVersionAlgorithm) -> proto::CryptoKeyVersionAlgorithm {
    match algorithm {
        CryptoKeyVersionAlgorithm::GoogleSymmetricEncryption => {
            proto::CryptoKeyVersionAlgorithm::GoogleSymmetricEncryption
        }
    }
}

fn unknown_enum(field: &str, value: i32) -> Status {
    Status::invalid_argument(format!("{} has unknown value {}", field, value))
}

/// `UNSPECIFIED` maps to `None`
fn purpose_from_proto(value: i32) -> Result<Option<CryptoKeyPurpose>, Status> {
    let purpose = proto::CryptoKeyPurpose::try_from(value)
        .map_err(|_| unknown_enum("crypto_key.purpose", value))?;
    Ok(match purpose {
        proto::CryptoKeyPurpose::Unspecified => None,
        proto::CryptoKeyPurpose::EncryptDecrypt => Some(CryptoKeyPurpose::EncryptDecrypt),
        proto::CryptoKeyPurpose::AsymmetricSign => Some(CryptoKeyPurpose::AsymmetricSign),
        proto::CryptoKeyPurpose::AsymmetricDecrypt => Some(CryptoKeyPurpose::AsymmetricDecrypt),
        proto::CryptoKeyPurpose::Mac => Some(CryptoKeyPurpose::Mac),
    })
}

/// `UNSPECIFIED` maps to `None`
fn state_from_proto(value: i32) -> Result<Option<VersionState>, Status> {
    let state = proto::CryptoKeyVersionState::try_from(value)
        .map_err(|_| unknown_enum("crypto_key_version.state", value))?;
    Ok(match state {
        proto::CryptoKeyVersionState::Unspecified => None,
        proto::CryptoKeyVersionState::Enabled => Some(VersionState::Enabled),
        proto::CryptoKeyVersionState::Disabled => Some(VersionState::Disabled),
        proto::CryptoKeyVersionState::Destroyed => Some(VersionState::Destroyed),
        proto::CryptoKeyVersionState::DestroyScheduled => Some(VersionState::DestroyScheduled),
        proto::CryptoKeyVersionState::PendingGeneration => Some(VersionState::PendingGeneration),
    })
}

fn template_from_proto(
    template: proto::CryptoKeyVersionTemplate,
) -> Result<VersionTemplate, Status> {
    let protection_level = match proto::ProtectionLevel::try_from(template.protection_level) {
        Ok(proto::ProtectionLevel::Unspecified) | Ok(proto::ProtectionLevel::Software) => {
            ProtectionLevel::Software
        }
        Ok(proto::ProtectionLevel::Hsm) => ProtectionLevel::Hsm,
        Ok(proto::ProtectionLevel::External) => ProtectionLevel::External,
        Err(_) => {
            return Err(unknown_enum(
                "version_template.protection_level",
                template.protection_level,
            ))
        }
    };
    let algorithm = match proto::CryptoKeyVersionAlgorithm::try_from(template.algorithm) {
        Ok(_) => CryptoKeyVersionAlgorithm::GoogleSymmetricEncryption,
        Err(_) => return Err(unknown_enum("version_template.algorithm", template.algorithm)),
    };

    Ok(VersionTemplate {
        protection_level,
        algorithm,
    })
}

fn principal<T>(request: &Request<T>) -> Option<String> {
    request
        .metadata()
        .get(PRINCIPAL_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// tonic adapter over [`KmsService`]
pub struct KmsGrpcService {
    service: Arc<KmsService>,
}

impl KmsGrpcService {
    pub fn new(service: Arc<KmsService>) -> Self {
        Self { service }
    }

    /// Wrap in the generated tonic server
    pub fn into_server(self) -> KeyManagementServiceServer<Self> {
        KeyManagementServiceServer::new(self)
    }
}

#[tonic::async_trait]
impl KeyManagementService for KmsGrpcService {
    async fn list_key_rings(
        &self,
        request: Request<proto::ListKeyRingsRequest>,
    ) -> Result<Response<proto::ListKeyRingsResponse>, tonic::Status> {
        let principal = principal(&request);
        let req = request.into_inner();
        let resp = self
            .service
            .list_key_rings(
                messages::ListKeyRingsRequest { parent: req.parent },
                principal.as_deref(),
            )
            .await?;

        Ok(Response::new(proto::ListKeyRingsResponse {
            total_size: total_size(resp.total_size),
            key_rings: resp.key_rings.into_iter().map(key_ring_to_proto).collect(),
            next_page_token: resp.next_page_token,
        }))
    }

    async fn get_key_ring(
        &self,
        request: Request<proto::GetKeyRingRequest>,
    ) -> Result<Response<proto::KeyRing>, tonic::Status> {
        let principal = principal(&request);
        let req = request.into_inner();
        let key_ring = self
            .service
            .get_key_ring(
                messages::GetKeyRingRequest { name: req.name },
                principal.as_deref(),
            )
            .await?;
        Ok(Response::new(key_ring_to_proto(key_ring)))
    }

    async fn create_key_ring(
        &self,
        request: Request<proto::CreateKeyRingRequest>,
    ) -> Result<Response<proto::KeyRing>, tonic::Status> {
        let principal = principal(&request);
        let req = request.into_inner();
        let key_ring = self
            .service
            .create_key_ring(
                messages::CreateKeyRingRequest {
                    parent: req.parent,
                    key_ring_id: req.key_ring_id,
                },
                principal.as_deref(),
            )
            .await?;
        Ok(Response::new(key_ring_to_proto(key_ring)))
    }

    async fn list_crypto_keys(
        &self,
        request: Request<proto::ListCryptoKeysRequest>,
    ) -> Result<Response<proto::ListCryptoKeysResponse>, tonic::Status> {
        let principal = principal(&request);
        let req = request.into_inner();
        let resp = self
            .service
            .list_crypto_keys(
                messages::ListCryptoKeysRequest { parent: req.parent },
                principal.as_deref(),
            )
            .await?;

        Ok(Response::new(proto::ListCryptoKeysResponse {
            total_size: total_size(resp.total_size),
            crypto_keys: resp.crypto_keys.into_iter().map(crypto_key_to_proto).collect(),
            next_page_token: resp.next_page_token,
        }))
    }

    async fn get_crypto_key(
        &self,
        request: Request<proto::GetCryptoKeyRequest>,
    ) -> Result<Response<proto::CryptoKey>, tonic::Status> {
        let principal = principal(&request);
        let req = request.into_inner();
        let crypto_key = self
            .service
            .get_crypto_key(
                messages::GetCryptoKeyRequest { name: req.name },
                principal.as_deref(),
            )
            .await?;
        Ok(Response::new(crypto_key_to_proto(crypto_key)))
    }

    async fn create_crypto_key(
        &self,
        request: Request<proto::CreateCryptoKeyRequest>,
    ) -> Result<Response<proto::CryptoKey>, tonic::Status> {
        let principal = principal(&request);
        let req = request.into_inner();
        let body = req.crypto_key.unwrap_or_default();
        let version_template = body
            .version_template
            .map(template_from_proto)
            .transpose()?;

        let crypto_key = self
            .service
            .create_crypto_key(
                messages::CreateCryptoKeyRequest {
                    parent: req.parent,
                    crypto_key_id: req.crypto_key_id,
                    purpose: purpose_from_proto(body.purpose)?,
                    version_template,
                    labels: body.labels,
                },
                principal.as_deref(),
            )
            .await?;
        Ok(Response::new(crypto_key_to_proto(crypto_key)))
    }

    async fn update_crypto_key(
        &self,
        request: Request<proto::UpdateCryptoKeyRequest>,
    ) -> Result<Response<proto::CryptoKey>, tonic::Status> {
        let principal = principal(&request);
        let body = request.into_inner().crypto_key.unwrap_or_default();
        let crypto_key = self
            .service
            .update_crypto_key(
                messages::UpdateCryptoKeyRequest {
                    name: body.name,
                    labels: body.labels,
                },
                principal.as_deref(),
            )
            .await?;
        Ok(Response::new(crypto_key_to_proto(crypto_key)))
    }

    async fn list_crypto_key_versions(
        &self,
        request: Request<proto::ListCryptoKeyVersionsRequest>,
    ) -> Result<Response<proto::ListCryptoKeyVersionsResponse>, tonic::Status> {
        let principal = principal(&request);
        let req = request.into_inner();
        let resp = self
            .service
            .list_crypto_key_versions(
                messages::ListCryptoKeyVersionsRequest { parent: req.parent },
                principal.as_deref(),
            )
            .await?;

        Ok(Response::new(proto::ListCryptoKeyVersionsResponse {
            total_size: total_size(resp.total_size),
            crypto_key_versions: resp
                .crypto_key_versions
                .into_iter()
                .map(version_to_proto)
                .collect(),
            next_page_token: resp.next_page_token,
        }))
    }

    async fn get_crypto_key_version(
        &self,
        request: Request<proto::GetCryptoKeyVersionRequest>,
    ) -> Result<Response<proto::CryptoKeyVersion>, tonic::Status> {
        let principal = principal(&request);
        let req = request.into_inner();
        let version = self
            .service
            .get_crypto_key_version(
                messages::GetCryptoKeyVersionRequest { name: req.name },
                principal.as_deref(),
            )
            .await?;
        Ok(Response::new(version_to_proto(version)))
    }

    async fn create_crypto_key_version(
        &self,
        request: Request<proto::CreateCryptoKeyVersionRequest>,
    ) -> Result<Response<proto::CryptoKeyVersion>, tonic::Status> {
        let principal = principal(&request);
        let req = request.into_inner();
        let version = self
            .service
            .create_crypto_key_version(
                messages::CreateCryptoKeyVersionRequest { parent: req.parent },
                principal.as_deref(),
            )
            .await?;
        Ok(Response::new(version_to_proto(version)))
    }

    async fn update_crypto_key_version(
        &self,
        request: Request<proto::UpdateCryptoKeyVersionRequest>,
    ) -> Result<Response<proto::CryptoKeyVersion>, tonic::Status> {
        let principal = principal(&request);
        let body = request.into_inner().crypto_key_version.unwrap_or_default();
        let version = self
            .service
            .update_crypto_key_version(
                messages::UpdateCryptoKeyVersionRequest {
                    state: state_from_proto(body.state)?,
                    name: body.name,
                },
                principal.as_deref(),
            )
            .await?;
        Ok(Response::new(version_to_proto(version)))
    }

    async fn update_crypto_key_primary_version(
        &self,
        request: Request<proto::UpdateCryptoKeyPrimaryVersionRequest>,
    ) -> Result<Response<proto::CryptoKey>, tonic::Status> {
        let principal = principal(&request);
        let req = request.into_inner();
        let crypto_key = self
            .service
            .update_crypto_key_primary_version(
                messages::UpdateCryptoKeyPrimaryVersionRequest {
                    name: req.name,
                    crypto_key_version_id: req.crypto_key_version_id,
                },
                principal.as_deref(),
            )
            .await?;
        Ok(Response::new(crypto_key_to_proto(crypto_key)))
    }

    async fn destroy_crypto_key_version(
        &self,
        request: Request<proto::DestroyCryptoKeyVersionRequest>,
    ) -> Result<Response<proto::CryptoKeyVersion>, tonic::Status> {
        let principal = principal(&request);
        let req = request.into_inner();
        let version = self
            .service
            .destroy_crypto_key_version(
                messages::DestroyCryptoKeyVersionRequest { name: req.name },
                principal.as_deref(),
            )
            .await?;
        Ok(Response::new(version_to_proto(version)))
    }

    async fn encrypt(
        &self,
        request: Request<proto::EncryptRequest>,
    ) -> Result<Response<proto::EncryptResponse>, tonic::Status> {
        let principal = principal(&request);
        let req = request.into_inner();
        let resp = self
            .service
            .encrypt(
                messages::EncryptRequest {
                    name: req.name,
                    plaintext: req.plaintext,
                },
                principal.as_deref(),
            )
            .await?;

        Ok(Response::new(proto::EncryptResponse {
            name: resp.name,
            ciphertext: resp.ciphertext,
        }))
    }

    async fn decrypt(
        &self,
        request: Request<proto::DecryptRequest>,
    ) -> Result<Response<proto::DecryptResponse>, tonic::Status> {
        let principal = principal(&request);
        let req = request.into_inner();
        let resp = self
            .service
            .decrypt(
                messages::DecryptRequest {
                    name: req.name,
                    ciphertext: req.ciphertext,
                },
                principal.as_deref(),
            )
            .await?;

        Ok(Response::new(proto::DecryptResponse {
            plaintext: resp.plaintext,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_maps_to_grpc_code() {
        let status: tonic::Status = Status::new(Code::FailedPrecondition, "primary disabled").into();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);
        assert_eq!(status.message(), "primary disabled");

        let status: tonic::Status = Status::not_found("gone").into();
        assert_eq!(status.code(), tonic::Code::NotFound);
    }

    #[test]
    fn test_timestamp_keeps_nanos() {
        let time = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let ts = timestamp(time);
        assert_eq!(ts.seconds, 1_700_000_000);
        assert_eq!(ts.nanos, 123_456_789);
    }

    #[test]
    fn test_unspecified_enums_mean_absent() {
        assert_eq!(purpose_from_proto(0).unwrap(), None);
        assert_eq!(
            purpose_from_proto(proto::CryptoKeyPurpose::Mac as i32).unwrap(),
            Some(CryptoKeyPurpose::Mac)
        );
        assert_eq!(state_from_proto(0).unwrap(), None);
        assert_eq!(
            state_from_proto(proto::CryptoKeyVersionState::Disabled as i32).unwrap(),
            Some(VersionState::Disabled)
        );

        let template = template_from_proto(proto::CryptoKeyVersionTemplate::default()).unwrap();
        assert_eq!(template, VersionTemplate::default());
    }

    #[test]
    fn test_unknown_enum_values_are_rejected() {
        let err = purpose_from_proto(2).unwrap_err();
        assert_eq!(err.code, Code::InvalidArgument);

        let err = state_from_proto(99).unwrap_err();
        assert_eq!(err.code, Code::InvalidArgument);

        let err = template_from_proto(proto::CryptoKeyVersionTemplate {
            protection_level: 7,
            algorithm: 0,
        })
        .unwrap_err();
        assert_eq!(err.code, Code::InvalidArgument);
    }
}
