//! Backstop repository for JSON storage
//!
//! Manages loading and saving backstop definitions to backstops.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::CostbookError;
use crate::models::{Backstop, BackstopId, ProjectId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable backstop data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BackstopData {
    backstops: Vec<Backstop>,
}

/// Repository for backstop persistence
pub struct BackstopRepository {
    path: PathBuf,
    data: RwLock<HashMap<BackstopId, Backstop>>,
}

impl BackstopRepository {
    /// Create a new backstop repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load backstops from disk
    pub fn load(&self) -> Result<(), CostbookError> {
        let file_data: BackstopData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for backstop in file_data.backstops {
            data.insert(backstop.id, backstop);
        }

        Ok(())
    }

    /// Save backstops to disk
    pub fn save(&self) -> Result<(), CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let file_data = BackstopData {
            backstops: data.values().cloned().collect(),
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// Get a backstop by ID
    pub fn get(&self, id: BackstopId) -> Result<Option<Backstop>, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// All backstops for a project, worst severity first, then oldest first
    pub fn for_project(&self, project_id: ProjectId) -> Result<Vec<Backstop>, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut backstops: Vec<_> = data
            .values()
            .filter(|b| b.project_id == project_id)
            .cloned()
            .collect();
        backstops.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(backstops)
    }

    /// Insert or update a backstop
    pub fn upsert(&self, backstop: Backstop) -> Result<(), CostbookError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(backstop.id, backstop);
        Ok(())
    }

    /// Delete a backstop
    pub fn delete(&self, id: BackstopId) -> Result<bool, CostbookError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    /// Check if a backstop exists
    pub fn exists(&self, id: BackstopId) -> Result<bool, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.contains_key(&id))
    }

    /// Count backstops
    pub fn count(&self) -> Result<usize, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackstopScope, Money, Severity, Threshold};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, BackstopRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("backstops.json");
        let repo = BackstopRepository::new(path);
        (temp_dir, repo)
    }

    fn backstop(project_id: ProjectId, severity: Severity) -> Backstop {
        Backstop::new(
            project_id,
            BackstopScope::ItemLine {
                code: "2.1".parse().unwrap(),
            },
            Threshold::amount(Money::from_cents(1_000_000)),
            severity,
        )
    }

    #[test]
    fn test_upsert_get_delete() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let b = backstop(ProjectId::new(), Severity::High);
        let id = b.id;

        repo.upsert(b).unwrap();
        assert!(repo.exists(id).unwrap());
        assert_eq!(repo.get(id).unwrap().unwrap().severity, Severity::High);

        assert!(repo.delete(id).unwrap());
        assert!(!repo.exists(id).unwrap());
        assert!(!repo.delete(id).unwrap());
    }

    #[test]
    fn test_for_project_sorted_by_severity() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let project_id = ProjectId::new();
        repo.upsert(backstop(project_id, Severity::Low)).unwrap();
        repo.upsert(backstop(project_id, Severity::High)).unwrap();
        repo.upsert(backstop(project_id, Severity::Medium)).unwrap();
        repo.upsert(backstop(ProjectId::new(), Severity::High))
            .unwrap();

        let listed = repo.for_project(project_id).unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].severity, Severity::High);
        assert_eq!(listed[1].severity, Severity::Medium);
        assert_eq!(listed[2].severity, Severity::Low);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let project_id = ProjectId::new();
        repo.upsert(backstop(project_id, Severity::Medium)).unwrap();
        repo.save().unwrap();

        let repo2 = BackstopRepository::new(temp_dir.path().join("backstops.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.count().unwrap(), 1);
        assert_eq!(repo2.for_project(project_id).unwrap().len(), 1);
    }
}
