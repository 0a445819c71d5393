//! Core data models for costbook
//!
//! This module contains all the data structures that represent the cost
//! tracking domain: projects, the cost hierarchy, financial events, and
//! backstop threshold rules.

pub mod backstop;
pub mod cost_code;
pub mod event;
pub mod hierarchy;
pub mod ids;
pub mod item_line;
pub mod money;
pub mod project;
pub mod status;

pub use backstop::{Backstop, BackstopScope, Severity, Threshold, ThresholdDirection};
pub use cost_code::CostCode;
pub use event::{DocumentRecord, EventKind, FinancialEvent};
pub use hierarchy::{Hierarchy, IntegrityIssue};
pub use ids::{BackstopId, DocumentId, EventId, ProjectId};
pub use item_line::{ItemLineNode, MAX_LEVEL};
pub use money::{format_bps, Money};
pub use project::Project;
pub use status::{schedule_status, ItemStatus, ScheduleStatus};
