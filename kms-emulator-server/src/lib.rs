//! KMS emulator server
//!
//! Service layer, authorization boundary, REST gateway and gRPC server over
//! the in-memory key store of `kms-emulator-core`.
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


pub mod authz;
pub mod gateway;
pub mod grpc;
pub mod messages;
pub mod proto;
pub mod service;
pub mod status;

pub use authz::{AccessControl, Authorizer, HttpIamAuthorizer, Operation, StaticPolicyAuthorizer};
pub use gateway::router;
pub use grpc::{KeyManagementServiceServer, KmsGrpcService};
pub use service::KmsService;
pub use status::{Code, Status};

/// Service name used in logs and health responses
pub const SERVICE_NAME: &str = "kms-emulator";
