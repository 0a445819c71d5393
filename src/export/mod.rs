//! Export module for costbook
//!
//! Writes report and ledger data to CSV for spreadsheet use.

pub mod csv;

pub use csv::{export_estimates_csv, export_events_csv};
