//! Project repository for JSON storage
//!
//! Manages loading and saving projects to projects.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::CostbookError;
use crate::models::{Project, ProjectId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable project data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ProjectData {
    projects: Vec<Project>,
}

/// Repository for project persistence
pub struct ProjectRepository {
    path: PathBuf,
    data: RwLock<HashMap<ProjectId, Project>>,
}

impl ProjectRepository {
    /// Create a new project repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load projects from disk
    pub fn load(&self) -> Result<(), CostbookError> {
        let file_data: ProjectData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for project in file_data.projects {
            data.insert(project.id, project);
        }

        Ok(())
    }

    /// Save projects to disk
    pub fn save(&self) -> Result<(), CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let file_data = ProjectData {
            projects: data.values().cloned().collect(),
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// Get a project by ID
    pub fn get(&self, id: ProjectId) -> Result<Option<Project>, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all projects, sorted by name
    pub fn get_all(&self) -> Result<Vec<Project>, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut projects: Vec<_> = data.values().cloned().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    /// Get all active (non-archived) projects
    pub fn get_active(&self) -> Result<Vec<Project>, CostbookError> {
        let all = self.get_all()?;
        Ok(all.into_iter().filter(|p| !p.archived).collect())
    }

    /// Get a project by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Project>, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let name_lower = name.to_lowercase();
        Ok(data
            .values()
            .find(|p| p.name.to_lowercase() == name_lower)
            .cloned())
    }

    /// Resolve a project from user input: exact name (case-insensitive),
    /// full UUID, or the short display form ("prj-1a2b3c4d")
    pub fn find(&self, query: &str) -> Result<Option<Project>, CostbookError> {
        if let Some(project) = self.get_by_name(query)? {
            return Ok(Some(project));
        }

        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        if let Ok(id) = query.parse::<ProjectId>() {
            if let Some(project) = data.get(&id) {
                return Ok(Some(project.clone()));
            }
        }

        Ok(data
            .values()
            .find(|p| p.id.to_string() == query)
            .cloned())
    }

    /// Insert or update a project
    pub fn upsert(&self, project: Project) -> Result<(), CostbookError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(project.id, project);
        Ok(())
    }

    /// Delete a project
    pub fn delete(&self, id: ProjectId) -> Result<bool, CostbookError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    /// Check if a project exists
    pub fn exists(&self, id: ProjectId) -> Result<bool, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.contains_key(&id))
    }

    /// Check if a project name is already taken
    pub fn name_exists(
        &self,
        name: &str,
        exclude_id: Option<ProjectId>,
    ) -> Result<bool, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let name_lower = name.to_lowercase();
        Ok(data
            .values()
            .any(|p| p.name.to_lowercase() == name_lower && Some(p.id) != exclude_id))
    }

    /// Count projects
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
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ProjectRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("projects.json");
        let repo = ProjectRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_upsert_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let project = Project::new("Riverside Office Block");
        let id = project.id;

        repo.upsert(project).unwrap();

        let retrieved = repo.get(id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Riverside Office Block");
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();

        let project = Project::new("Harbor Warehouse");
        let id = project.id;

        repo.load().unwrap();
        repo.upsert(project).unwrap();
        repo.save().unwrap();

        // Create new repo and load
        let path = temp_dir.path().join("projects.json");
        let repo2 = ProjectRepository::new(path);
        repo2.load().unwrap();

        let retrieved = repo2.get(id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Harbor Warehouse");
    }

    #[test]
    fn test_find_by_name_id_and_short_form() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let project = Project::new("Riverside Office Block");
        let id = project.id;
        repo.upsert(project).unwrap();

        // Case-insensitive name
        let by_name = repo.find("riverside office block").unwrap();
        assert_eq!(by_name.unwrap().id, id);

        // Full UUID
        let by_uuid = repo.find(&id.as_uuid().to_string()).unwrap();
        assert_eq!(by_uuid.unwrap().id, id);

        // Short display form
        let by_short = repo.find(&id.to_string()).unwrap();
        assert_eq!(by_short.unwrap().id, id);

        assert!(repo.find("no such project").unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let project = Project::new("Test");
        let id = project.id;

        repo.upsert(project).unwrap();
        assert!(repo.exists(id).unwrap());

        repo.delete(id).unwrap();
        assert!(!repo.exists(id).unwrap());
    }

    #[test]
    fn test_get_active_filters_archived() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let active = Project::new("Active Site");
        let mut archived = Project::new("Old Site");
        archived.archive();

        repo.upsert(active).unwrap();
        repo.upsert(archived).unwrap();

        assert_eq!(repo.get_all().unwrap().len(), 2);

        let remaining = repo.get_active().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Active Site");
    }

    #[test]
    fn test_name_exists() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let project = Project::new("Riverside");
        let id = project.id;
        repo.upsert(project).unwrap();

        assert!(repo.name_exists("riverside", None).unwrap());
        assert!(!repo.name_exists("riverside", Some(id)).unwrap());
        assert!(!repo.name_exists("other", None).unwrap());
    }
}
