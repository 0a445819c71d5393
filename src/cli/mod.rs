//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod backstop;
pub mod item;
pub mod project;
pub mod record;
pub mod report;

pub use backstop::{handle_backstop_command, BackstopCommands};
pub use item::{handle_item_command, ItemCommands};
pub use project::{handle_project_command, ProjectCommands};
pub use record::{handle_record_command, RecordCommands};
pub use report::{handle_report_command, ReportCommands};
