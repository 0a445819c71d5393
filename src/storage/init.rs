//! First-run storage setup
//!
//! Seeds the data directory with empty, well-formed JSON files.

use crate::config::paths::CostbookPaths;
use crate::error::CostbookError;

use super::backstops::BackstopRepository;
use super::events::EventRepository;
use super::ledgers::LedgerRepository;
use super::projects::ProjectRepository;

/// Seed the data directory for a first run.
///
/// Creates the directory layout and writes an empty data file wherever
/// one is missing, so later commands always find well-formed JSON on
/// disk. Files that already exist are left alone.
pub fn initialize_storage(paths: &CostbookPaths) -> Result<(), CostbookError> {
    paths.ensure_directories()?;

    if !paths.projects_file().exists() {
        ProjectRepository::new(paths.projects_file()).save()?;
    }
    if !paths.ledgers_file().exists() {
        LedgerRepository::new(paths.ledgers_file()).save()?;
    }
    if !paths.events_file().exists() {
        EventRepository::new(paths.events_file()).save()?;
    }
    if !paths.backstops_file().exists() {
        BackstopRepository::new(paths.backstops_file()).save()?;
    }

    Ok(())
}

/// Whether the data directory still needs first-run setup (keyed on the
/// projects file).
pub fn needs_initialization(paths: &CostbookPaths) -> bool {
    !paths.projects_file().exists()
}
