//! Key management storage engine for the KMS emulator
//!
//! Holds the KeyRing -> CryptoKey -> CryptoKeyVersion hierarchy in memory,
//! drives the per-version lifecycle and performs real AES-256-GCM
//! encryption. Nothing is persisted; all state is lost when the process exits.
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


pub mod crypto;
pub mod error;
pub mod kms;
pub mod names;
pub mod resources;
pub mod state;
pub mod store;

pub use error::{ErrorKind, KmsError, KmsResult};
pub use kms::KeyManagementService;
pub use names::ResourceName;
pub use resources::{
    CryptoKey, CryptoKeyPurpose, CryptoKeyVersion, CryptoKeyVersionAlgorithm, KeyRing, Labels,
    ProtectionLevel, VersionTemplate,
};
pub use state::{TransitionPolicy, VersionState};
pub use store::{InMemoryKeyStore, StoreOptions};
