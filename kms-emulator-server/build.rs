//! Generates the KeyManagementService gRPC server and client stubs
//!
//! Messages are declared with prost derives in `src/proto.rs`, so only the
//! service plumbing is generated here and no `protoc` is needed.
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


use tonic_build::manual::{Builder, Method, Service};

const PROTO_PATH: &str = "crate::proto";
const CODEC: &str = "tonic::codec::ProstCodec";

const METHODS: &[(&str, &str, &str, &str)] = &[
    ("list_key_rings", "ListKeyRings", "ListKeyRingsRequest", "ListKeyRingsResponse"),
    ("get_key_ring", "GetKeyRing", "GetKeyRingRequest", "KeyRing"),
    ("create_key_ring", "CreateKeyRing", "CreateKeyRingRequest", "KeyRing"),
    ("list_crypto_keys", "ListCryptoKeys", "ListCryptoKeysRequest", "ListCryptoKeysResponse"),
    ("get_crypto_key", "GetCryptoKey", "GetCryptoKeyRequest", "CryptoKey"),
    ("create_crypto_key", "CreateCryptoKey", "CreateCryptoKeyRequest", "CryptoKey"),
    ("update_crypto_key", "UpdateCryptoKey", "UpdateCryptoKeyRequest", "CryptoKey"),
    (
        "list_crypto_key_versions",
        "ListCryptoKeyVersions",
        "ListCryptoKeyVersionsRequest",
        "ListCryptoKeyVersionsResponse",
    ),
    (
        "get_crypto_key_version",
        "GetCryptoKeyVersion",
        "GetCryptoKeyVersionRequest",
        "CryptoKeyVersion",
    ),
    (
        "create_crypto_key_version",
        "CreateCryptoKeyVersion",
        "CreateCryptoKeyVersionRequest",
        "CryptoKeyVersion",
    ),
    (
        "update_crypto_key_version",
        "UpdateCryptoKeyVersion",
        "UpdateCryptoKeyVersionRequest",
        "CryptoKeyVersion",
    ),
    (
        "update_crypto_key_primary_version",
        "UpdateCryptoKeyPrimaryVersion",
        "UpdateCryptoKeyPrimaryVersionRequest",
        "CryptoKey",
    ),
    (
        "destroy_crypto_key_version",
        "DestroyCryptoKeyVersion",
        "DestroyCryptoKeyVersionRequest",
        "CryptoKeyVersion",
    ),
    ("encrypt", "Encrypt", "EncryptRequest", "EncryptResponse"),
    ("decrypt", "Decrypt", "DecryptRequest", "DecryptResponse"),
];

fn main() {
    let mut service = Service::builder()
        .name("KeyManagementService")
        .package("google.cloud.kms.v1");

    for &(name, route_name, input, output) in METHODS {
        service = service.method(
            Method::builder()
                .name(name)
                .route_name(route_name)
                .input_type(format!("{}::{}", PROTO_PATH, input))
                .output_type(format!("{}::{}", PROTO_PATH, output))
                .codec_path(CODEC)
                .build(),
        );
    }

    Builder::new().compile(&[service.build()]);
    println!("cargo:rerun-if-changed=build.rs");
}
