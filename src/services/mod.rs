//! Service layer for costbook
//!
//! The service layer provides business logic on top of the storage layer:
//! cost code allocation, item line lifecycle, aggregation, event recording,
//! and backstop evaluation.

pub mod aggregation;
pub mod allocation;
pub mod backstop;
pub mod item_line;
pub mod reconciliation;

pub use aggregation::{aggregate, describe_issues, project_totals, ProjectTotals};
pub use allocation::{allocate, Placement, ResolvedPlacement};
pub use backstop::{
    BackstopEvaluation, BackstopReport, BackstopService, NewBackstop, Observation,
};
pub use item_line::{ItemLineService, ItemLineUpdate, NewItemLine};
pub use reconciliation::{DocumentInput, EventInput, ReconciliationService, RecordedEvent};
