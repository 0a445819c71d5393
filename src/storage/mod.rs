//! Storage layer for costbook
//!
//! Four JSON-backed repositories (projects, ledgers, events, backstops)
//! behind one [`Storage`] coordinator, plus the audit logger. All writes
//! go through [`write_json_atomic`].

pub mod backstops;
pub mod events;
pub mod file_io;
pub mod init;
pub mod ledgers;
pub mod projects;

pub use backstops::BackstopRepository;
pub use events::EventRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use ledgers::LedgerRepository;
pub use projects::ProjectRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::CostbookPaths;
use crate::error::CostbookError;

/// Owns the repositories and the audit logger
pub struct Storage {
    paths: CostbookPaths,
    audit: AuditLogger,
    pub projects: ProjectRepository,
    pub ledgers: LedgerRepository,
    pub events: EventRepository,
    pub backstops: BackstopRepository,
}

impl Storage {
    /// Open storage rooted at the given paths, creating directories as needed
    pub fn new(paths: CostbookPaths) -> Result<Self, CostbookError> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            projects: ProjectRepository::new(paths.projects_file()),
            ledgers: LedgerRepository::new(paths.ledgers_file()),
            events: EventRepository::new(paths.events_file()),
            backstops: BackstopRepository::new(paths.backstops_file()),
            paths,
        })
    }

    /// Reload every repository from disk
    pub fn load_all(&mut self) -> Result<(), CostbookError> {
        self.projects.load()?;
        self.ledgers.load()?;
        self.events.load()?;
        self.backstops.load()?;
        Ok(())
    }

    /// Check whether `costbook init` has run (settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    /// Record a create operation in the audit log
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), CostbookError> {
        let entry = AuditEntry::create(entity_type, entity_id, entity_name, entity);
        self.audit.log(&entry)
    }

    /// Record an update operation in the audit log
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> Result<(), CostbookError> {
        let entry = AuditEntry::update(entity_type, entity_id, entity_name, before, after, diff_summary);
        self.audit.log(&entry)
    }

    /// Record a delete operation in the audit log
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), CostbookError> {
        let entry = AuditEntry::delete(entity_type, entity_id, entity_name, entity);
        self.audit.log(&entry)
    }

    /// Read the most recent audit entries
    pub fn recent_audit_entries(&self, count: usize) -> Result<Vec<AuditEntry>, CostbookError> {
        self.audit.read_recent(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CostbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
    }

    #[test]
    fn test_audit_helpers_write_entries() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CostbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        storage
            .log_create(
                EntityType::ItemLine,
                "2.1",
                Some("Foundation".to_string()),
                &serde_json::json!({"name": "Foundation"}),
            )
            .unwrap();

        let entries = storage.recent_audit_entries(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity_id, "2.1");
    }
}
