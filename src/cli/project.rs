//! Project CLI commands
//!
//! Implements CLI commands for the project registry: creation, listing,
//! baselining, and archival.

use clap::Subcommand;

use crate::audit::EntityType;
use crate::display::project::{format_project_details, format_project_list};
use crate::error::{CostbookError, CostbookResult};
use crate::models::Project;
use crate::storage::Storage;

/// Project subcommands
#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a new project
    Add {
        /// Project name
        name: String,
        /// Client or owner
        #[arg(short, long)]
        client: Option<String>,
        /// Notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// List all projects
    List {
        /// Include archived projects
        #[arg(short, long)]
        all: bool,
    },
    /// Show project details
    Show {
        /// Project name or ID prefix
        project: String,
    },
    /// Freeze the estimate; later additions count as change orders
    Baseline {
        /// Project name or ID prefix
        project: String,
    },
    /// Archive a project
    Archive {
        /// Project name or ID prefix
        project: String,
    },
    /// Unarchive a project
    Unarchive {
        /// Project name or ID prefix
        project: String,
    },
}

/// Handle a project command
pub fn handle_project_command(storage: &Storage, cmd: ProjectCommands) -> CostbookResult<()> {
    match cmd {
        ProjectCommands::Add {
            name,
            client,
            notes,
        } => {
            let name = name.trim().to_string();
            if storage.projects.name_exists(&name, None)? {
                return Err(CostbookError::Duplicate {
                    entity_type: "Project",
                    identifier: name,
                });
            }

            let mut project = Project::new(name);
            if let Some(client) = client {
                project.client = client.trim().to_string();
            }
            if let Some(notes) = notes {
                project.notes = notes.trim().to_string();
            }
            project
                .validate()
                .map_err(|e| CostbookError::Validation(e.to_string()))?;

            storage.projects.upsert(project.clone())?;
            storage.ledgers.ensure(project.id)?;
            storage.projects.save()?;
            storage.ledgers.save()?;
            storage.log_create(
                EntityType::Project,
                project.id.to_string(),
                Some(project.name.clone()),
                &project,
            )?;

            println!("Created project: {}", project.name);
            println!("  ID: {}", project.id);
            println!();
            println!("Add item lines with 'costbook item add-category'.");
        }

        ProjectCommands::List { all } => {
            let mut projects = if all {
                storage.projects.get_all()?
            } else {
                storage.projects.get_active()?
            };
            projects.sort_by(|a, b| a.name.cmp(&b.name));
            print!("{}", format_project_list(&projects));
        }

        ProjectCommands::Show { project } => {
            let found = find_project(storage, &project)?;
            print!("{}", format_project_details(&found));
        }

        ProjectCommands::Baseline { project } => {
            let found = find_project(storage, &project)?;
            if found.is_baselined() {
                return Err(CostbookError::Validation(format!(
                    "Project '{}' is already baselined",
                    found.name
                )));
            }

            let before = found.clone();
            let mut updated = found;
            updated.set_baseline();
            storage.projects.upsert(updated.clone())?;
            storage.projects.save()?;
            storage.log_update(
                EntityType::Project,
                updated.id.to_string(),
                Some(updated.name.clone()),
                &before,
                &updated,
                Some("baselined".to_string()),
            )?;

            println!("Baselined project: {}", updated.name);
            println!("New item lines will now count as change orders.");
        }

        ProjectCommands::Archive { project } => {
            let found = find_project(storage, &project)?;
            let before = found.clone();
            let mut updated = found;
            updated.archive();
            storage.projects.upsert(updated.clone())?;
            storage.projects.save()?;
            storage.log_update(
                EntityType::Project,
                updated.id.to_string(),
                Some(updated.name.clone()),
                &before,
                &updated,
                Some("archived".to_string()),
            )?;

            println!("Archived project: {}", updated.name);
        }

        ProjectCommands::Unarchive { project } => {
            let found = find_project(storage, &project)?;
            let before = found.clone();
            let mut updated = found;
            updated.unarchive();
            storage.projects.upsert(updated.clone())?;
            storage.projects.save()?;
            storage.log_update(
                EntityType::Project,
                updated.id.to_string(),
                Some(updated.name.clone()),
                &before,
                &updated,
                Some("unarchived".to_string()),
            )?;

            println!("Unarchived project: {}", updated.name);
        }
    }

    Ok(())
}

fn find_project(storage: &Storage, query: &str) -> CostbookResult<Project> {
    storage
        .projects
        .find(query)?
        .ok_or_else(|| CostbookError::project_not_found(query))
}
