//! Display formatting for terminal output
//!
//! Provides utilities for formatting data models for terminal display,
//! including tables, hierarchies, and report views.

pub mod backstop;
pub mod item_line;
pub mod project;
pub mod report;

pub use backstop::{format_backstop_list, format_backstop_report};
pub use item_line::{format_event_list, format_item_line_details, format_item_line_list};
pub use project::{format_project_details, format_project_list};
pub use report::{format_estimates_vs_actuals, format_overview};
