//! # Snapshot Format
//!
//! Binary encoding for persisted learner sessions.
//!
//! Format: Header (5 bytes) + postcard-serialized [`PersistedSession`].
//! - 4 bytes: Magic ("PWSN")
//! - 1 byte: Version
//!
//! Size and header are validated before the payload is decoded, so corrupted
//! or oversized blobs fail fast without large allocations.

use crate::primitives::{FORMAT_VERSION, HEADER_LEN, MAGIC_BYTES, MAX_SNAPSHOT_SIZE};
use crate::{PathwiseError, PersistedSession};

// =============================================================================
// HEADER
// =============================================================================

/// The header that precedes every encoded snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PersistenceHeader {
    /// Header for the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), PathwiseError> {
        if &self.magic != MAGIC_BYTES {
            return Err(PathwiseError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(PathwiseError::DeserializationError(format!(
                "Unsupported snapshot version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PathwiseError> {
        let Some(header) = bytes.get(..HEADER_LEN) else {
            return Err(PathwiseError::DeserializationError(
                "Header too short".to_string(),
            ));
        };
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[..4]);
        Ok(Self {
            magic,
            version: header[4],
        })
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ENCODE / DECODE
// =============================================================================

/// Encode a persisted session (header + payload). Pure, no I/O.
pub fn session_to_bytes(persisted: &PersistedSession) -> Result<Vec<u8>, PathwiseError> {
    let payload = postcard::to_stdvec(persisted)
        .map_err(|e| PathwiseError::SerializationError(e.to_string()))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&PersistenceHeader::new().to_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode a persisted session. Pure, no I/O.
///
/// Checks, in order: minimum size, maximum size, header magic and version.
/// Only then is the payload handed to postcard.
pub fn session_from_bytes(bytes: &[u8]) -> Result<PersistedSession, PathwiseError> {
    if bytes.len() < HEADER_LEN {
        return Err(PathwiseError::DeserializationError(format!(
            "Data too short: minimum {} bytes required",
            HEADER_LEN
        )));
    }
    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(PathwiseError::DeserializationError(format!(
            "Snapshot size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_SIZE
        )));
    }

    PersistenceHeader::from_bytes(bytes)?.validate()?;

    let payload = bytes.get(HEADER_LEN..).unwrap_or_default();
    postcard::from_bytes(payload).map_err(|e| {
        PathwiseError::DeserializationError(format!("Failed to decode session snapshot: {}", e))
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AdaptiveProfile, EnrollmentId, FailStrategy, GateConfig, GateResult, InjectedPractice,
        LearnerModuleSession, LearningUnitId, ModuleId, NodeId, NodeProgress, PlaylistEntry,
        StaticLearningUnit, UnitType,
    };

    fn sample() -> PersistedSession {
        let gate = StaticLearningUnit::new("gate-1", "Checkpoint", 2)
            .with_type(UnitType::Gate)
            .with_adaptive(AdaptiveProfile {
                is_gate: true,
                gate_config: Some(GateConfig {
                    mastery_threshold: 0.8,
                    min_questions: 5,
                    max_retries: 1,
                    fail_strategy: FailStrategy::InjectPractice,
                }),
                ..AdaptiveProfile::default()
            });
        let mut session =
            LearnerModuleSession::new(EnrollmentId::new("enr-1"), ModuleId::new("mod-1"));
        session.playlist = vec![
            PlaylistEntry::Static(StaticLearningUnit::new("intro", "Intro", 1)),
            PlaylistEntry::Static(gate),
            PlaylistEntry::InjectedPractice(InjectedPractice::new(
                &LearningUnitId::new("gate-1"),
                1,
                vec![NodeId::new("n1")],
                5,
            )),
        ];
        session.current_index = 2;
        session
            .node_progress
            .insert(NodeId::new("n1"), NodeProgress::new(0.4, 3));
        session.gate_results.insert(
            LearningUnitId::new("gate-1"),
            vec![GateResult::failed("gate-1", 0.4, 1, vec![NodeId::new("n1")])],
        );
        PersistedSession {
            revision: 7,
            ..PersistedSession::new(session)
        }
    }

    #[test]
    fn header_roundtrip() {
        let header = PersistenceHeader::from_bytes(&PersistenceHeader::new().to_bytes())
            .expect("parse header");
        assert_eq!(header, PersistenceHeader::new());
        assert!(header.validate().is_ok());
    }

    #[test]
    fn bytes_roundtrip_bit_exact() {
        let original = sample();
        let bytes1 = session_to_bytes(&original).expect("first encode");
        let restored = session_from_bytes(&bytes1).expect("decode");
        let bytes2 = session_to_bytes(&restored).expect("second encode");

        assert_eq!(restored, original);
        assert_eq!(bytes1, bytes2, "encode -> decode -> encode must be bit-exact");
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = vec![0u8; 10];
        bytes[..4].copy_from_slice(b"XXXX");
        assert!(session_from_bytes(&bytes).is_err());
    }

    #[test]
    fn future_version_rejected() {
        let mut bytes = session_to_bytes(&sample()).expect("encode");
        bytes[4] = FORMAT_VERSION + 1;
        let err = session_from_bytes(&bytes).expect_err("version must be checked");
        assert!(err.to_string().contains("Unsupported snapshot version"));
    }

    #[test]
    fn truncated_data_rejected() {
        assert!(session_from_bytes(b"PW").is_err());
        let bytes = session_to_bytes(&sample()).expect("encode");
        assert!(session_from_bytes(&bytes[..bytes.len() / 2]).is_err());
    }
}
