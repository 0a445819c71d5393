//! Report CLI commands
//!
//! Implements commands for generating reports and exporting them to CSV.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Subcommand;

use crate::display::report::{format_estimates_vs_actuals, format_overview};
use crate::error::{CostbookError, CostbookResult};
use crate::export::{export_estimates_csv, export_events_csv};
use crate::reports::{EstimatesVsActualsReport, ProjectOverview};
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Estimates vs actuals, one row per item line
    #[command(alias = "estimates")]
    Evs {
        /// Project name or ID prefix
        project: String,
        /// Report as of this date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Export to CSV file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Whole-project financial position
    Overview {
        /// Project name or ID prefix
        project: String,
        /// Report as of this date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Export ledger data to CSV
    Export {
        /// Project name or ID prefix
        project: String,
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
        /// Export the event history instead of the estimates table
        #[arg(long)]
        events: bool,
    },
}

/// Handle a report command
pub fn handle_report_command(storage: &Storage, cmd: ReportCommands) -> CostbookResult<()> {
    match cmd {
        ReportCommands::Evs {
            project,
            date,
            output,
        } => {
            let as_of = parse_as_of(date)?;
            let report = EstimatesVsActualsReport::generate(storage, &project, as_of)?;

            match output {
                Some(path) => {
                    let mut writer = create_output(&path)?;
                    export_estimates_csv(&report, &mut writer)?;
                    println!("Report exported to: {}", path.display());
                }
                None => print!("{}", format_estimates_vs_actuals(&report)),
            }
        }

        ReportCommands::Overview { project, date } => {
            let as_of = parse_as_of(date)?;
            let report = ProjectOverview::generate(storage, &project, as_of)?;
            print!("{}", format_overview(&report));
        }

        ReportCommands::Export {
            project,
            output,
            events,
        } => {
            let mut writer = create_output(&output)?;
            if events {
                export_events_csv(storage, &project, &mut writer)?;
                println!("Event history exported to: {}", output.display());
            } else {
                let today = chrono::Local::now().date_naive();
                let report = EstimatesVsActualsReport::generate(storage, &project, today)?;
                export_estimates_csv(&report, &mut writer)?;
                println!("Estimates table exported to: {}", output.display());
            }
        }
    }

    Ok(())
}

fn parse_as_of(date: Option<String>) -> CostbookResult<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
            CostbookError::Validation(format!("Invalid date format: '{}'. Use YYYY-MM-DD", s))
        }),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn create_output(path: &Path) -> CostbookResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        CostbookError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CostbookPaths;
    use crate::models::{ItemLineNode, Money, Project};
    use crate::services::aggregation;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CostbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed_project(storage: &Storage) {
        let project = Project::new("Riverside Office Park");
        storage.projects.upsert(project.clone()).unwrap();
        storage.ledgers.ensure(project.id).unwrap();

        storage
            .ledgers
            .with_mut(project.id, |hierarchy| {
                hierarchy
                    .insert(ItemLineNode::new(
                        "1".parse().unwrap(),
                        "Concrete Works",
                        true,
                        date(2025, 8, 1),
                        date(2025, 9, 30),
                    ))
                    .map_err(|e| CostbookError::Ledger(e.to_string()))?;
                let mut leaf = ItemLineNode::new(
                    "1.1".parse().unwrap(),
                    "Foundation",
                    false,
                    date(2025, 8, 1),
                    date(2025, 8, 15),
                );
                leaf.estimated_cost = Money::from_cents(600_000);
                hierarchy
                    .insert(leaf)
                    .map_err(|e| CostbookError::Ledger(e.to_string()))?;
                aggregation::aggregate(hierarchy)
                    .map_err(|_| CostbookError::Ledger("aggregation failed".into()))?;
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_evs_export_writes_csv() {
        let (temp_dir, storage) = create_test_storage();
        seed_project(&storage);

        let path = temp_dir.path().join("evs.csv");
        handle_report_command(
            &storage,
            ReportCommands::Evs {
                project: "Riverside Office Park".to_string(),
                date: Some("2025-08-20".to_string()),
                output: Some(path.clone()),
            },
        )
        .unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("Code,Name,Type"));
        assert!(contents.contains("Foundation"));
    }

    #[test]
    fn test_export_events() {
        let (temp_dir, storage) = create_test_storage();
        seed_project(&storage);

        let path = temp_dir.path().join("events.csv");
        handle_report_command(
            &storage,
            ReportCommands::Export {
                project: "Riverside Office Park".to_string(),
                output: path.clone(),
                events: true,
            },
        )
        .unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("ID,Date,Kind,Node"));
    }

    #[test]
    fn test_bad_as_of_date() {
        let (_temp_dir, storage) = create_test_storage();
        seed_project(&storage);

        let err = handle_report_command(
            &storage,
            ReportCommands::Overview {
                project: "Riverside Office Park".to_string(),
                date: Some("late August".to_string()),
            },
        )
        .unwrap_err();
        assert!(err.is_validation());
    }
}
