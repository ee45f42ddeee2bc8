//! In-memory session store.

use super::{SessionStore, next_revision};
use crate::{EnrollmentId, LearnerModuleSession, ModuleId, PathwiseError, PersistedSession};
use std::collections::BTreeMap;

/// Volatile [`SessionStore`] backed by a `BTreeMap`.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: BTreeMap<(EnrollmentId, ModuleId), PersistedSession>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&mut self, session: &LearnerModuleSession) -> Result<PersistedSession, PathwiseError> {
        let key = (session.enrollment_id.clone(), session.module_id.clone());
        let previous = self.sessions.get(&key).map(|p| p.revision);
        let persisted = next_revision(session, previous);
        self.sessions.insert(key, persisted.clone());
        Ok(persisted)
    }

    fn load(
        &self,
        enrollment_id: &EnrollmentId,
        module_id: &ModuleId,
    ) -> Result<Option<PersistedSession>, PathwiseError> {
        Ok(self
            .sessions
            .get(&(enrollment_id.clone(), module_id.clone()))
            .cloned())
    }

    fn remove(
        &mut self,
        enrollment_id: &EnrollmentId,
        module_id: &ModuleId,
    ) -> Result<bool, PathwiseError> {
        Ok(self
            .sessions
            .remove(&(enrollment_id.clone(), module_id.clone()))
            .is_some())
    }

    fn list(&self) -> Result<Vec<(EnrollmentId, ModuleId)>, PathwiseError> {
        Ok(self.sessions.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(enrollment: &str, module: &str) -> LearnerModuleSession {
        LearnerModuleSession::new(EnrollmentId::new(enrollment), ModuleId::new(module))
    }

    #[test]
    fn save_bumps_revision() {
        let mut store = MemorySessionStore::new();
        let mut s = session("e", "m");
        assert_eq!(store.save(&s).expect("save").revision, 1);
        s.current_index = 3;
        let second = store.save(&s).expect("save");
        assert_eq!(second.revision, 2);
        assert_eq!(store.len(), 1);

        let loaded = store
            .load(&EnrollmentId::new("e"), &ModuleId::new("m"))
            .expect("load")
            .expect("present");
        assert_eq!(loaded.session.current_index, 3);
    }

    #[test]
    fn missing_session_is_none_or_error() {
        let store = MemorySessionStore::new();
        let (e, m) = (EnrollmentId::new("e"), ModuleId::new("m"));
        assert!(store.load(&e, &m).expect("load").is_none());
        let err = store.load_required(&e, &m).expect_err("missing");
        assert_eq!(err.to_string(), "Session not found: e/m");
    }

    #[test]
    fn list_and_remove() {
        let mut store = MemorySessionStore::new();
        store.save(&session("b", "m1")).expect("save");
        store.save(&session("a", "m2")).expect("save");
        store.save(&session("a", "m1")).expect("save");

        let keys = store.list().expect("list");
        assert_eq!(keys[0], (EnrollmentId::new("a"), ModuleId::new("m1")));
        assert_eq!(keys.len(), 3);

        assert!(store.remove(&EnrollmentId::new("a"), &ModuleId::new("m1")).expect("remove"));
        assert!(!store.remove(&EnrollmentId::new("a"), &ModuleId::new("m1")).expect("remove"));
        assert!(!store.is_empty());
    }
}
