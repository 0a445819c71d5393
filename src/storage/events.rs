//! Financial event repository for JSON storage
//!
//! Manages the append-only event log in events.json. Events are never
//! updated or deleted once recorded; corrections are new events with a
//! negative amount.

use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::CostbookError;
use crate::models::{CostCode, EventId, FinancialEvent, ProjectId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable event data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct EventData {
    events: Vec<FinancialEvent>,
}

/// Repository for the append-only financial event log
pub struct EventRepository {
    path: PathBuf,
    data: RwLock<Vec<FinancialEvent>>,
}

impl EventRepository {
    /// Create a new event repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Vec::new()),
        }
    }

    /// Load events from disk
    pub fn load(&self) -> Result<(), CostbookError> {
        let file_data: EventData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        *data = file_data.events;
        Ok(())
    }

    /// Save events to disk
    pub fn save(&self) -> Result<(), CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let file_data = EventData {
            events: data.clone(),
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// Append an event to the log
    pub fn append(&self, event: FinancialEvent) -> Result<(), CostbookError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.push(event);
        Ok(())
    }

    /// Get an event by ID
    pub fn get(&self, id: EventId) -> Result<Option<FinancialEvent>, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.iter().find(|e| e.id == id).cloned())
    }

    /// All events for a project, in the order they were recorded
    pub fn for_project(&self, project_id: ProjectId) -> Result<Vec<FinancialEvent>, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .iter()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect())
    }

    /// All events recorded against one node or its descendants, in recording
    /// order. Events attach to vendor leaves, so querying a category code
    /// returns its subtree's history.
    pub fn for_node(
        &self,
        project_id: ProjectId,
        node: &CostCode,
    ) -> Result<Vec<FinancialEvent>, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .iter()
            .filter(|e| {
                e.project_id == project_id && (e.node == *node || node.is_ancestor_of(&e.node))
            })
            .cloned()
            .collect())
    }

    /// Count events
    pub fn count(&self) -> Result<usize, CostbookError> {
        let data = self
            .data
            .read()
            .map_err(|e| CostbookError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}
