//! # redb-backed Session Storage
//!
//! A disk-backed [`SessionStore`] using the redb embedded database.
//!
//! One table, keyed by `(enrollment_id, module_id)`. Values are encoded with
//! the binary snapshot format, so a stored blob can also be exported and
//! decoded on its own.

use super::{SessionStore, next_revision};
use crate::formats::{session_from_bytes, session_to_bytes};
use crate::{EnrollmentId, LearnerModuleSession, ModuleId, PathwiseError, PersistedSession};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};

/// Table for sessions: (enrollment_id, module_id) -> snapshot bytes
const SESSIONS: TableDefinition<(&str, &str), &[u8]> = TableDefinition::new("sessions");

fn io_err(e: impl std::fmt::Display) -> PathwiseError {
    PathwiseError::IoError(e.to_string())
}

/// Persistent session store backed by redb.
pub struct RedbSessionStore {
    db: Database,
    path: PathBuf,
}

impl std::fmt::Debug for RedbSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbSessionStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RedbSessionStore {
    /// Open or create a session database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PathwiseError> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path).map_err(io_err)?;

        // Initialize the table so readers never see it missing
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            let _ = write_txn.open_table(SESSIONS).map_err(io_err)?;
            write_txn.commit().map_err(io_err)?;
        }

        tracing::debug!(path = %path.display(), "opened session database");
        Ok(Self { db, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), PathwiseError> {
        self.db.compact().map_err(io_err)?;
        Ok(())
    }
}

impl SessionStore for RedbSessionStore {
    fn save(&mut self, session: &LearnerModuleSession) -> Result<PersistedSession, PathwiseError> {
        let key = (session.enrollment_id.as_str(), session.module_id.as_str());

        let write_txn = self.db.begin_write().map_err(io_err)?;
        let persisted = {
            let mut table = write_txn.open_table(SESSIONS).map_err(io_err)?;
            let previous = match table.get(key).map_err(io_err)? {
                Some(bytes) => match session_from_bytes(bytes.value()) {
                    Ok(stored) => Some(stored.revision),
                    Err(e) => {
                        tracing::warn!(
                            enrollment = key.0,
                            module = key.1,
                            error = %e,
                            "overwriting undecodable stored session"
                        );
                        None
                    }
                },
                None => None,
            };

            let persisted = next_revision(session, previous);
            let bytes = session_to_bytes(&persisted)?;
            table.insert(key, bytes.as_slice()).map_err(io_err)?;
            persisted
        };
        write_txn.commit().map_err(io_err)?;

        tracing::debug!(
            enrollment = key.0,
            module = key.1,
            revision = persisted.revision,
            "saved session"
        );
        Ok(persisted)
    }

    fn load(
        &self,
        enrollment_id: &EnrollmentId,
        module_id: &ModuleId,
    ) -> Result<Option<PersistedSession>, PathwiseError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(SESSIONS).map_err(io_err)?;

        match table
            .get((enrollment_id.as_str(), module_id.as_str()))
            .map_err(io_err)?
        {
            Some(bytes) => Ok(Some(session_from_bytes(bytes.value())?)),
            None => Ok(None),
        }
    }

    fn remove(
        &mut self,
        enrollment_id: &EnrollmentId,
        module_id: &ModuleId,
    ) -> Result<bool, PathwiseError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let existed = {
            let mut table = write_txn.open_table(SESSIONS).map_err(io_err)?;
            table
                .remove((enrollment_id.as_str(), module_id.as_str()))
                .map_err(io_err)?
                .is_some()
        };
        write_txn.commit().map_err(io_err)?;
        Ok(existed)
    }

    fn list(&self) -> Result<Vec<(EnrollmentId, ModuleId)>, PathwiseError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(SESSIONS).map_err(io_err)?;

        let mut keys = Vec::new();
        for entry in table.iter().map_err(io_err)? {
            let (key, _) = entry.map_err(io_err)?;
            let (enrollment, module) = key.value();
            keys.push((EnrollmentId::new(enrollment), ModuleId::new(module)));
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GateResult, LearningUnitId, NodeId, NodeProgress, PlaylistEntry, StaticLearningUnit};
    use tempfile::tempdir;

    fn session() -> LearnerModuleSession {
        let mut session =
            LearnerModuleSession::new(EnrollmentId::new("enr-1"), ModuleId::new("mod-1"));
        session.playlist = vec![
            PlaylistEntry::Static(StaticLearningUnit::new("a", "A", 1)),
            PlaylistEntry::Static(StaticLearningUnit::new("b", "B", 2)),
        ];
        session.current_index = 1;
        session
            .node_progress
            .insert(NodeId::new("n1"), NodeProgress::new(0.75, 2));
        session.gate_results.insert(
            LearningUnitId::new("b"),
            vec![GateResult::passed("b", 0.9, 1)],
        );
        session
    }

    #[test]
    fn save_and_load() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbSessionStore::open(temp.path().join("sessions.redb")).expect("open db");

        let saved = store.save(&session()).expect("save");
        assert_eq!(saved.revision, 1);

        let loaded = store
            .load(&EnrollmentId::new("enr-1"), &ModuleId::new("mod-1"))
            .expect("load")
            .expect("present");
        assert_eq!(loaded, saved);
    }

    #[test]
    fn persistence_after_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("sessions.redb");

        {
            let mut store = RedbSessionStore::open(&db_path).expect("open db");
            store.save(&session()).expect("save");
            store.save(&session()).expect("save");
        }

        {
            let mut store = RedbSessionStore::open(&db_path).expect("reopen db");
            let loaded = store
                .load_required(&EnrollmentId::new("enr-1"), &ModuleId::new("mod-1"))
                .expect("load");
            assert_eq!(loaded.revision, 2);
            assert_eq!(loaded.session, session());

            assert_eq!(store.save(&session()).expect("save").revision, 3);
        }
    }

    #[test]
    fn missing_session() {
        let temp = tempdir().expect("temp dir");
        let store = RedbSessionStore::open(temp.path().join("sessions.redb")).expect("open db");
        assert!(
            store
                .load(&EnrollmentId::new("x"), &ModuleId::new("y"))
                .expect("load")
                .is_none()
        );
        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn list_and_remove() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbSessionStore::open(temp.path().join("sessions.redb")).expect("open db");

        let mut other = session();
        other.module_id = ModuleId::new("mod-0");
        store.save(&session()).expect("save");
        store.save(&other).expect("save");

        let keys = store.list().expect("list");
        assert_eq!(
            keys,
            vec![
                (EnrollmentId::new("enr-1"), ModuleId::new("mod-0")),
                (EnrollmentId::new("enr-1"), ModuleId::new("mod-1")),
            ]
        );

        assert!(store.remove(&EnrollmentId::new("enr-1"), &ModuleId::new("mod-0")).expect("remove"));
        assert!(!store.remove(&EnrollmentId::new("enr-1"), &ModuleId::new("mod-0")).expect("remove"));
        assert_eq!(store.list().expect("list").len(), 1);
        store.compact().expect("compact");
        assert!(store.path().ends_with("sessions.redb"));
    }
}
