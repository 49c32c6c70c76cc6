//! Version lifecycle state machine
//!
//! ```text
//! PENDING_GENERATION -> ENABLED <-> DISABLED -> DESTROY_SCHEDULED -> DESTROYED
//! ```
//!
//! Nothing in the engine produces `PENDING_GENERATION` or advances
//! `DESTROY_SCHEDULED` to `DESTROYED` on its own; both need an explicit caller.
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


use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a CryptoKeyVersion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionState {
    PendingGeneration,
    Enabled,
    Disabled,
    DestroyScheduled,
    /// Terminal
    Destroyed,
}

impl VersionState {
    pub const ALL: [VersionState; 5] = [
        VersionState::PendingGeneration,
        VersionState::Enabled,
        VersionState::Disabled,
        VersionState::DestroyScheduled,
        VersionState::Destroyed,
    ];

    /// Wire name, e.g. `DESTROY_SCHEDULED`
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionState::PendingGeneration => "PENDING_GENERATION",
            VersionState::Enabled => "ENABLED",
            VersionState::Disabled => "DISABLED",
            VersionState::DestroyScheduled => "DESTROY_SCHEDULED",
            VersionState::Destroyed => "DESTROYED",
        }
    }

    /// Whether new ciphertext may be produced through a primary in this state
    pub fn permits_encrypt(&self) -> bool {
        matches!(self, VersionState::Enabled)
    }

    /// Whether the version is a decryption candidate
    ///
    /// Disabled and destroy-scheduled versions still hold key material but are
    /// skipped.
    pub fn permits_decrypt(&self) -> bool {
        matches!(self, VersionState::Enabled)
    }

    /// Whether the version may become the primary of its key
    pub fn permits_primary(&self) -> bool {
        matches!(self, VersionState::Enabled)
    }

    /// Whether destruction may be scheduled from this state
    pub fn permits_destroy(&self) -> bool {
        self.can_transition_to(VersionState::DestroyScheduled)
            && *self != VersionState::DestroyScheduled
    }

    /// Pure transition table. Re-asserting the current state is allowed.
    pub fn can_transition_to(&self, next: VersionState) -> bool {
        use VersionState::*;

        if *self == next {
            return true;
        }

        matches!(
            (self, next),
            (PendingGeneration, Enabled)
                | (Enabled, Disabled)
                | (Enabled, DestroyScheduled)
                | (Disabled, Enabled)
                | (Disabled, DestroyScheduled)
                | (DestroyScheduled, Disabled)
                | (DestroyScheduled, Destroyed)
        )
    }
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown state name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown CryptoKeyVersion state: {0}")]
pub struct ParseStateError(pub String);

impl FromStr for VersionState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ParseStateError(s.to_string()))
    }
}

/// How `update_crypto_key_version` treats requested state changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Only transitions allowed by [`VersionState::can_transition_to`]
    #[default]
    Strict,
    /// Any explicit state is accepted
    Permissive,
}

impl TransitionPolicy {
    pub fn allows(&self, from: VersionState, to: VersionState) -> bool {
        match self {
            TransitionPolicy::Strict => from.can_transition_to(to),
            TransitionPolicy::Permissive => true,
        }
    }
}
