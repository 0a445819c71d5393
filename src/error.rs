//! Error types for costbook
//!
//! One enum covers every failure the crate reports, with thiserror
//! deriving the display texts the CLI prints.

use thiserror::Error;

/// The main error type for costbook operations
#[derive(Error, Debug)]
pub enum CostbookError {
    /// Settings file problems
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O failures
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON encode/decode failures
    #[error("JSON error: {0}")]
    Json(String),

    /// Rejected model or operation input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Broken hierarchy detected during aggregation (dangling parent, cycle)
    #[error("Integrity error in project '{project}': {detail}")]
    Integrity { project: String, detail: String },

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Event application or rollup failures
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// CSV export failures
    #[error("Export error: {0}")]
    Export(String),

    /// Data file failures
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CostbookError {
    pub fn project_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Project",
            identifier: identifier.into(),
        }
    }

    pub fn item_line_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Item line",
            identifier: identifier.into(),
        }
    }

    pub fn backstop_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backstop",
            identifier: identifier.into(),
        }
    }

    pub fn integrity(project: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Integrity {
            project: project.into(),
            detail: detail.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for CostbookError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CostbookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for costbook operations
pub type CostbookResult<T> = Result<T, CostbookError>;
