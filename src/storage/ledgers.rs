//! Ledger repository for JSON storage
//!
//! Manages loading and saving each project's cost hierarchy to ledgers.json.
//! The hierarchy is the single mutable aggregate per project, so mutations go
//! through [`LedgerRepository::with_mut`], which holds the write lock for the
//! whole mutate-and-aggregate section and discards the working copy when the
//! closure fails. Readers only ever see a fully-aggregated snapshot.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::CostbookError;
use crate::models::{Hierarchy, ProjectId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable ledger data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct LedgerData {
    ledgers: HashMap<ProjectId, Hierarchy>,
}

/// Repository for per-project cost hierarchies
pub struct LedgerRepository {
    path: PathBuf,
    data: RwLock<HashMap<ProjectId, Hierarchy>>,
}

impl LedgerRepository {
    /// Create a new ledger repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load ledgers from disk
    pub fn load(&self) -> Result<(), CostbookError> {
        let file_data: LedgerData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for (project_id, mut hierarchy) in file_data.ledgers {
            // Data written before allocation marks were persisted
            hierarchy.rebuild_marks();
            data.insert(project_id, hierarchy);
        }

        Ok(())
    }

    /// Save ledgers to disk
    pub fn save(&self) -> Result<(), CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let file_data = LedgerData {
            ledgers: data.clone(),
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// Get a snapshot of a project's hierarchy
    pub fn get(&self, project_id: ProjectId) -> Result<Option<Hierarchy>, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&project_id).cloned())
    }

    /// Get a snapshot, erroring when the project has no ledger
    pub fn get_required(&self, project_id: ProjectId) -> Result<Hierarchy, CostbookError> {
        self.get(project_id)?
            .ok_or_else(|| CostbookError::project_not_found(project_id.to_string()))
    }

    /// Create an empty hierarchy for a new project (no-op if present)
    pub fn ensure(&self, project_id: ProjectId) -> Result<(), CostbookError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.entry(project_id).or_insert_with(Hierarchy::new);
        Ok(())
    }

    /// Check if a project has a ledger
    pub fn exists(&self, project_id: ProjectId) -> Result<bool, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.contains_key(&project_id))
    }

    /// Mutate a project's hierarchy under the write lock
    ///
    /// The closure runs against a working copy; it is swapped in only when
    /// the closure succeeds, so a failed operation leaves the stored
    /// hierarchy exactly as it was. The closure must not call back into this
    /// repository (the lock is not reentrant).
    pub fn with_mut<R>(
        &self,
        project_id: ProjectId,
        f: impl FnOnce(&mut Hierarchy) -> Result<R, CostbookError>,
    ) -> Result<R, CostbookError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let current = data
            .get(&project_id)
            .ok_or_else(|| CostbookError::project_not_found(project_id.to_string()))?;

        let mut working = current.clone();
        let result = f(&mut working)?;
        data.insert(project_id, working);

        Ok(result)
    }
}
