//! Project model
//!
//! The registry entry for one tracked project. Item lines, events, and
//! backstops all hang off a project id; the project itself carries the
//! baseline marker that change-order counting starts from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ProjectId;

/// A tracked project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,

    /// Project name (e.g., "Riverside Office Block")
    pub name: String,

    /// Client or owner, informational
    #[serde(default)]
    pub client: String,

    /// Notes about this project
    #[serde(default)]
    pub notes: String,

    /// When the estimate was frozen; additions after this count as
    /// change orders. None while still estimating.
    pub baselined_at: Option<DateTime<Utc>>,

    /// Root categories added after the baseline
    #[serde(default)]
    pub change_orders: u32,

    /// Whether this project is archived (soft-deleted)
    #[serde(default)]
    pub archived: bool,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last modified
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project, not yet baselined
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            name: name.into(),
            client: String::new(),
            notes: String::new(),
            baselined_at: None,
            change_orders: 0,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// True once the estimate has been frozen
    pub fn is_baselined(&self) -> bool {
        self.baselined_at.is_some()
    }

    /// Freeze the estimate; later additions count as change orders
    pub fn set_baseline(&mut self) {
        self.baselined_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Count a post-baseline root addition against the project
    pub fn record_change_order(&mut self) {
        self.change_orders += 1;
        self.updated_at = Utc::now();
    }

    /// Mark this project as archived
    pub fn archive(&mut self) {
        self.archived = true;
        self.updated_at = Utc::now();
    }

    /// Unarchive this project
    pub fn unarchive(&mut self) {
        self.archived = false;
        self.updated_at = Utc::now();
    }

    /// Validate the project
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProjectValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(ProjectValidationError::NameTooLong(self.name.len()));
        }

        Ok(())
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.client.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.client)
        }
    }
}

/// Validation errors for projects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for ProjectValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Project name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Project name too long ({} chars, max 100)", len)
            }
        }
    }
}

impl std::error::Error for ProjectValidationError {}
