//! gRPC Transport Tests
//!
//! Each test serves the tonic service on an ephemeral port and drives it
//! through the generated client.

use kms_emulator_config::IamMode;
use kms_emulator_core::InMemoryKeyStore;
use kms_emulator_server::proto::{
    self, key_management_service_client::KeyManagementServiceClient,
};
use kms_emulator_server::{AccessControl, KmsGrpcService, KmsService, StaticPolicyAuthorizer};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Channel, Server};
use tonic::{Code, Request};

const LOCATION: &str = "projects/test/locations/global";
const RING: &str = "projects/test/locations/global/keyRings/r";
const KEY: &str = "projects/test/locations/global/keyRings/r/cryptoKeys/k";

type Client = KeyManagementServiceClient<Channel>;

async fn spawn(access: AccessControl) -> Client {
    let service = Arc::new(KmsService::new(Arc::new(InMemoryKeyStore::new()), access));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        Server::builder()
            .add_service(KmsGrpcService::new(service).into_server())
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });
    KeyManagementServiceClient::connect(format!("http://{}", addr))
        .await
        .unwrap()
}

async fn create_key(client: &mut Client) -> proto::CryptoKey {
    client
        .create_key_ring(proto::CreateKeyRingRequest {
            parent: LOCATION.into(),
            key_ring_id: "r".into(),
            key_ring: None,
        })
        .await
        .unwrap();

    let mut labels = HashMap::new();
    labels.insert("env".to_string(), "test".to_string());
    client
        .create_crypto_key(proto::CreateCryptoKeyRequest {
            parent: RING.into(),
            crypto_key_id: "k".into(),
            crypto_key: Some(proto::CryptoKey {
                purpose: proto::CryptoKeyPurpose::EncryptDecrypt as i32,
                labels,
                ..Default::default()
            }),
        })
        .await
        .unwrap()
        .into_inner()
}

fn with_principal<T>(message: T, principal: &str) -> Request<T> {
    let mut request = Request::new(message);
    request
        .metadata_mut()
        .insert("x-emulator-principal", principal.parse().unwrap());
    request
}

#[tokio::test]
async fn test_key_lifecycle_over_grpc() {
    let mut client = spawn(AccessControl::disabled()).await;
    let key = create_key(&mut client).await;

    assert_eq!(key.name, KEY);
    assert_eq!(key.purpose, proto::CryptoKeyPurpose::EncryptDecrypt as i32);
    assert_eq!(key.labels.get("env").map(String::as_str), Some("test"));
    let primary = key.primary.unwrap();
    assert_eq!(primary.name, format!("{}/cryptoKeyVersions/1", KEY));
    assert_eq!(primary.state, proto::CryptoKeyVersionState::Enabled as i32);
    assert!(primary.create_time.is_some());
    assert!(primary.destroy_time.is_none());

    let encrypted = client
        .encrypt(proto::EncryptRequest {
            name: KEY.into(),
            plaintext: b"hello grpc".to_vec(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(encrypted.name, KEY);

    let v2 = client
        .create_crypto_key_version(proto::CreateCryptoKeyVersionRequest {
            parent: KEY.into(),
            crypto_key_version: None,
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(v2.name, format!("{}/cryptoKeyVersions/2", KEY));

    let key = client
        .update_crypto_key_primary_version(proto::UpdateCryptoKeyPrimaryVersionRequest {
            name: KEY.into(),
            crypto_key_version_id: "2".into(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(key.primary.unwrap().name, v2.name);

    let decrypted = client
        .decrypt(proto::DecryptRequest {
            name: KEY.into(),
            ciphertext: encrypted.ciphertext,
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(decrypted.plaintext, b"hello grpc");

    let versions = client
        .list_crypto_key_versions(proto::ListCryptoKeyVersionsRequest {
            parent: KEY.into(),
            ..Default::default()
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(versions.total_size, 2);
    assert_eq!(versions.crypto_key_versions.len(), 2);

    let rings = client
        .list_key_rings(proto::ListKeyRingsRequest {
            parent: LOCATION.into(),
            ..Default::default()
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(rings.key_rings[0].name, RING);
}

#[tokio::test]
async fn test_version_updates_over_grpc() {
    let mut client = spawn(AccessControl::disabled()).await;
    create_key(&mut client).await;
    let v1 = format!("{}/cryptoKeyVersions/1", KEY);

    let version = client
        .update_crypto_key_version(proto::UpdateCryptoKeyVersionRequest {
            crypto_key_version: Some(proto::CryptoKeyVersion {
                name: v1.clone(),
                state: proto::CryptoKeyVersionState::Disabled as i32,
                ..Default::default()
            }),
            update_mask: None,
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(version.state, proto::CryptoKeyVersionState::Disabled as i32);

    let status = client
        .encrypt(proto::EncryptRequest {
            name: KEY.into(),
            plaintext: b"x".to_vec(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::FailedPrecondition);

    let destroyed = client
        .destroy_crypto_key_version(proto::DestroyCryptoKeyVersionRequest { name: v1.clone() })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(
        destroyed.state,
        proto::CryptoKeyVersionState::DestroyScheduled as i32
    );
    assert!(destroyed.destroy_time.is_some());

    let key = client
        .update_crypto_key(proto::UpdateCryptoKeyRequest {
            crypto_key: Some(proto::CryptoKey {
                name: KEY.into(),
                labels: HashMap::from([("team".to_string(), "kms".to_string())]),
                ..Default::default()
            }),
            update_mask: None,
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(key.labels.len(), 1);
    assert_eq!(key.labels.get("team").map(String::as_str), Some("kms"));
}

#[tokio::test]
async fn test_error_codes_over_grpc() {
    let mut client = spawn(AccessControl::disabled()).await;

    let status = client
        .get_key_ring(proto::GetKeyRingRequest { name: RING.into() })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    create_key(&mut client).await;
    let status = client
        .create_key_ring(proto::CreateKeyRingRequest {
            parent: LOCATION.into(),
            key_ring_id: "r".into(),
            key_ring: None,
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::AlreadyExists);

    let status = client
        .encrypt(proto::EncryptRequest {
            name: RING.into(),
            plaintext: b"x".to_vec(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = client
        .update_crypto_key_version(proto::UpdateCryptoKeyVersionRequest {
            crypto_key_version: Some(proto::CryptoKeyVersion {
                name: format!("{}/cryptoKeyVersions/1", KEY),
                ..Default::default()
            }),
            update_mask: None,
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = client
        .decrypt(proto::DecryptRequest {
            name: KEY.into(),
            ciphertext: vec![0u8; 40],
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Internal);
}

#[tokio::test]
async fn test_strict_iam_uses_principal_metadata() {
    let authz = StaticPolicyAuthorizer::new()
        .grant("admin@example.com", "cloudkms.keyRings.create")
        .grant("admin@example.com", "cloudkms.keyRings.get");
    let mut client = spawn(AccessControl::new(IamMode::Strict, Arc::new(authz))).await;
    let create = proto::CreateKeyRingRequest {
        parent: LOCATION.into(),
        key_ring_id: "r".into(),
        key_ring: None,
    };

    let status = client.create_key_ring(create.clone()).await.unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);

    let ring = client
        .create_key_ring(with_principal(create, "admin@example.com"))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(ring.name, RING);

    let status = client
        .get_key_ring(with_principal(
            proto::GetKeyRingRequest { name: RING.into() },
            "guest@example.com",
        ))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
}
