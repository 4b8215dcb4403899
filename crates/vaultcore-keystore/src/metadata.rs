//! Key lifecycle metadata.
//!
//! Each stored entry carries a [`KeyMetadata`] record tracking its status,
//! version and timestamps. Status changes go through an explicit transition
//! matrix; the version increases monotonically and only when key material is
//! replaced.
//!
//! # State Machine
//!
//! ```text
//! ┌────────┐──────▶┌─────────────┐
//! │ Active │       │ Compromised │──┐
//! └────────┘──┐    └─────────────┘  │
//!      │      │    ┌─────────┐      │
//!      │      └───▶│ Retired │──────┤
//!      │           └─────────┘      ▼
//!      │           ┌─────────────────────┐  delete   ┌─────────┐
//!      └──────────▶│ PendingDeletion(at) │──────────▶│ removed │
//!                  └─────────────────────┘           └─────────┘
//! ```
//!
//! `Compromised` and `Retired` never return to `Active`.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Lifecycle status of a stored key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyStatus {
    /// In service; usable for new cryptographic operations.
    Active,
    /// Known or suspected to be exposed. Terminal with respect to
    /// re-activation.
    Compromised,
    /// Taken out of service deliberately. Terminal with respect to
    /// re-activation.
    Retired,
    /// Scheduled for removal from the store.
    PendingDeletion {
        /// When the entry should be removed
        delete_at: SystemTime,
    },
}

impl KeyStatus {
    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Any status may be (re)scheduled for deletion. `Compromised` and
    /// `Retired` accept no other change. Self-transitions are permitted so
    /// that repeating a status assignment is not an error.
    pub fn can_transition_to(self, next: KeyStatus) -> bool {
        matches!(
            (self, next),
            (_, KeyStatus::PendingDeletion { .. })
                | (KeyStatus::Active, _)
                | (KeyStatus::Compromised, KeyStatus::Compromised)
                | (KeyStatus::Retired, KeyStatus::Retired)
        )
    }
}

impl std::fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Compromised => write!(f, "compromised"),
            Self::Retired => write!(f, "retired"),
            Self::PendingDeletion { .. } => write!(f, "pending-deletion"),
        }
    }
}

/// Audit metadata for one stored entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    /// Unique identifier of the entry
    pub identifier: String,
    /// Current lifecycle status
    pub status: KeyStatus,
    /// Incremented every time the key material is replaced; starts at 1
    pub version: u64,
    /// When the entry was first stored
    pub created_at: SystemTime,
    /// Refreshed on every status or material change
    pub last_modified: SystemTime,
    /// Which backend holds the material (for audit output)
    pub storage_location: String,
}

impl KeyMetadata {
    /// Fresh metadata for a newly stored entry: version 1, `Active`.
    pub fn new(identifier: impl Into<String>, storage_location: impl Into<String>) -> Self {
        let now = SystemTime::now();
        Self {
            identifier: identifier.into(),
            status: KeyStatus::Active,
            version: 1,
            created_at: now,
            last_modified: now,
            storage_location: storage_location.into(),
        }
    }

    /// Record a key-material replacement: version up, timestamp refreshed.
    pub(crate) fn record_material_change(&mut self) {
        self.version += 1;
        self.last_modified = SystemTime::now();
    }

    /// Apply a status change, enforcing the transition matrix.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidStatusTransition` if the lifecycle forbids it
    pub fn transition(&mut self, next: KeyStatus) -> Result<(), StoreError> {
        if !self.status.can_transition_to(next) {
            return Err(StoreError::InvalidStatusTransition { from: self.status, to: next });
        }
        self.status = next;
        self.last_modified = SystemTime::now();
        Ok(())
    }
}
