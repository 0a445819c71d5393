//! Configuration for costbook
//!
//! Two concerns live here: where the data files go ([`CostbookPaths`])
//! and what the user has chosen ([`Settings`]).

pub mod paths;
pub mod settings;

pub use paths::CostbookPaths;
pub use settings::Settings;
