//! costbook - Terminal-based project cost tracking and reconciliation
//!
//! Projects are modeled as a hierarchy of cost codes. Financial events
//! (invoices, bills, payments) are recorded against leaf lines and roll
//! up the hierarchy on read, while backstop rules watch the reconciled
//! totals for threshold breaches.
//!
//! Data flows through the layers in one direction:
//!
//! - `models` defines projects, item lines, financial events, and backstops
//! - `storage` persists them as JSON files and appends to the audit log
//! - `services` holds the business rules (allocation, aggregation,
//!   event recording, backstop evaluation)
//! - `reports` builds read-only view models from the stored data
//! - `display` renders those view models for the terminal, `export` as CSV
//! - `cli` wires the subcommands to all of the above
//!
//! `config` resolves file locations and user settings; `error` and `audit`
//! are shared by every layer.
//!
//! ```rust,ignore
//! use costbook::config::{paths::CostbookPaths, settings::Settings};
//! use costbook::storage::Storage;
//!
//! let paths = CostbookPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{CostbookError, CostbookResult};
