//! Error types for the key management engine
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
use thiserror::Error;

/// Semantic error category, translated to transport status codes by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    FailedPrecondition,
    InvalidArgument,
    Internal,
}

/// Key management errors
#[derive(Error, Debug)]
pub enum KmsError {
    #[error("KeyRing not found: {0}")]
    KeyRingNotFound(String),

    #[error("CryptoKey not found: {0}")]
    CryptoKeyNotFound(String),

    #[error("CryptoKeyVersion not found: {0}")]
    VersionNotFound(String),

    #[error("KeyRing already exists: {0}")]
    KeyRingAlreadyExists(String),

    #[error("CryptoKey already exists: {0}")]
    CryptoKeyAlreadyExists(String),

    #[error("Invalid resource name: {0}")]
    InvalidName(String),

    #[error("CryptoKeyVersion {name} is not enabled (state: {state})")]
    VersionNotEnabled { name: String, state: VersionState },

    #[error("CryptoKeyVersion {name} cannot move from {from} to {to}")]
    IllegalTransition {
        name: String,
        from: VersionState,
        to: VersionState,
    },

    #[error("CryptoKeyVersion {name} is already {state}")]
    AlreadyDestroyed { name: String, state: VersionState },

    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("Key generation error: {0}")]
    KeyGeneration(String),
}

impl KmsError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            KmsError::KeyRingNotFound(_)
            | KmsError::CryptoKeyNotFound(_)
            | KmsError::VersionNotFound(_) => ErrorKind::NotFound,
            KmsError::KeyRingAlreadyExists(_) | KmsError::CryptoKeyAlreadyExists(_) => {
                ErrorKind::AlreadyExists
            }
            KmsError::InvalidName(_) => ErrorKind::InvalidArgument,
            KmsError::VersionNotEnabled { .. }
            | KmsError::IllegalTransition { .. }
            | KmsError::AlreadyDestroyed { .. }
            | KmsError::FailedPrecondition(_) => ErrorKind::FailedPrecondition,
            KmsError::Encryption(_) | KmsError::Decryption(_) | KmsError::KeyGeneration(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Result type for key management operations
pub type KmsResult<T> = Result<T, KmsError>;
