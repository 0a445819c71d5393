//! Reports module for costbook
//!
//! Read-only views over the ledger: the estimates-vs-actuals table and
//! the project overview. Reports never mutate storage.

pub mod estimates_vs_actuals;
pub mod overview;

pub use estimates_vs_actuals::{EstimatesVsActualsReport, ReportRow};
pub use overview::{BackstopSummary, ProjectOverview};
