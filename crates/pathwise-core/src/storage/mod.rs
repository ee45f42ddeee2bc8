//! # Session Storage
//!
//! The persistence boundary for learner sessions.
//!
//! The engine never talks to a store. Callers take a snapshot from the
//! engine, hand it to a [`SessionStore`], and later rebuild an engine with
//! `PlaylistEngine::restore`.
//!
//! Two backends ship with the crate:
//! - [`MemorySessionStore`]: `BTreeMap`, volatile, used by tests
//! - [`RedbSessionStore`]: disk-backed redb table, values in the binary
//!   snapshot format

pub mod memory;
pub mod redb_store;

pub use memory::MemorySessionStore;
pub use redb_store::RedbSessionStore;

use crate::{EnrollmentId, LearnerModuleSession, ModuleId, PathwiseError, PersistedSession};

/// Keyed storage for persisted sessions.
///
/// Sessions are keyed by `(enrollment_id, module_id)`. Every successful
/// `save` bumps the stored revision by one; the first save is revision 1.
pub trait SessionStore {
    /// Store a snapshot, replacing any previous one for the same key.
    fn save(&mut self, session: &LearnerModuleSession) -> Result<PersistedSession, PathwiseError>;

    /// Fetch the stored snapshot, if any.
    fn load(
        &self,
        enrollment_id: &EnrollmentId,
        module_id: &ModuleId,
    ) -> Result<Option<PersistedSession>, PathwiseError>;

    /// Delete a stored snapshot. Returns whether one existed.
    fn remove(
        &mut self,
        enrollment_id: &EnrollmentId,
        module_id: &ModuleId,
    ) -> Result<bool, PathwiseError>;

    /// All stored keys in ascending order.
    fn list(&self) -> Result<Vec<(EnrollmentId, ModuleId)>, PathwiseError>;

    /// Like [`load`](Self::load), but a missing session is an error.
    fn load_required(
        &self,
        enrollment_id: &EnrollmentId,
        module_id: &ModuleId,
    ) -> Result<PersistedSession, PathwiseError> {
        self.load(enrollment_id, module_id)?
            .ok_or_else(|| PathwiseError::SessionNotFound {
                enrollment_id: enrollment_id.clone(),
                module_id: module_id.clone(),
            })
    }
}

/// Wrap `session` with the revision following `previous`.
pub(crate) fn next_revision(
    session: &LearnerModuleSession,
    previous: Option<u64>,
) -> PersistedSession {
    PersistedSession {
        revision: previous.map_or(1, |r| r.saturating_add(1)),
        ..PersistedSession::new(session.clone())
    }
}
