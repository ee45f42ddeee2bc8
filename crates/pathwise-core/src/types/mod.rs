//! # Core Type Definitions
//!
//! This module contains all domain types for the Pathwise sequencing engine:
//! - Identifiers (`LearningUnitId`, `NodeId`, `EnrollmentId`, `ModuleId`)
//! - Static course content (`StaticLearningUnit`, `AdaptiveProfile`, `GateConfig`)
//! - Learner state (`NodeProgress`, `GateResult`, `LearnerModuleSession`)
//! - Playlist vocabulary (`PlaylistEntry`, `PlaylistDecision`, `PlaylistContext`)
//! - Error types (`PathwiseError`)
//!
//! ## Determinism Guarantees
//!
//! All maps are `BTreeMap`/`BTreeSet` so iteration order (and therefore
//! serialized bytes) never depends on hashing.

mod decision;
mod playlist;
mod unit;

pub use decision::{PlaylistContext, PlaylistDecision};
pub use playlist::{
    DisplayEntry, EntryKind, InjectedPractice, InjectedReview, LearnerModuleSession,
    PersistedSession, PlaylistEntry,
};
pub use unit::{
    AdaptiveConfig, AdaptiveMode, AdaptiveProfile, FailStrategy, GateConfig, GateResult,
    NodeProgress, StaticLearningUnit, UnitType,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of a static learning unit in the course catalog.
    LearningUnitId
);

string_id!(
    /// Identifier of a knowledge node (an atomic skill or concept).
    NodeId
);

string_id!(
    /// Identifier of a learner's enrollment in a course.
    EnrollmentId
);

string_id!(
    /// Identifier of a course module.
    ModuleId
);

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur around the Pathwise engine.
///
/// The sequencing engine itself is total and never returns these. They
/// cover the fallible edges: snapshot encoding, session stores and manifest
/// loading.
#[derive(Debug, Error)]
pub enum PathwiseError {
    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O or storage error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A course manifest could not be interpreted.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// A caller-supplied argument was rejected at the application boundary.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No session is stored for the given enrollment and module.
    #[error("Session not found: {enrollment_id}/{module_id}")]
    SessionNotFound {
        enrollment_id: EnrollmentId,
        module_id: ModuleId,
    },
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_lexicographically() {
        let mut ids = vec![NodeId::new("node-b"), NodeId::new("node-a")];
        ids.sort();
        assert_eq!(ids, vec![NodeId::from("node-a"), NodeId::from("node-b")]);
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&LearningUnitId::new("gate-1")).expect("serialize");
        assert_eq!(json, "\"gate-1\"");
    }

    #[test]
    fn session_not_found_names_both_ids() {
        let err = PathwiseError::SessionNotFound {
            enrollment_id: EnrollmentId::new("enr-1"),
            module_id: ModuleId::new("mod-1"),
        };
        assert_eq!(err.to_string(), "Session not found: enr-1/mod-1");
    }
}
