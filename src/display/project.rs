//! Project display formatting
//!
//! Formats project registry entries for terminal output.

use crate::models::Project;

/// Format a list of projects as a table
pub fn format_project_list(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects found.\n\nCreate one with 'costbook project add <name>'.".to_string();
    }

    let name_width = projects
        .iter()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<12}  {:>13}  {}\n",
        "Name", "Baselined", "Change Orders", "ID"
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<12}  {:->13}  {:-<12}\n",
        "", "", "", ""
    ));

    for project in projects {
        let baselined = project
            .baselined_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let archived = if project.archived { " (archived)" } else { "" };

        output.push_str(&format!(
            "{:<name_width$}  {:<12}  {:>13}  {}{}\n",
            project.name, baselined, project.change_orders, project.id, archived
        ));
    }

    output
}

/// Format project details
pub fn format_project_details(project: &Project) -> String {
    let mut output = String::new();

    output.push_str(&format!("Project: {}\n", project.name));
    output.push_str(&format!("  ID:            {}\n", project.id));

    if !project.client.is_empty() {
        output.push_str(&format!("  Client:        {}\n", project.client));
    }

    match project.baselined_at {
        Some(t) => {
            output.push_str(&format!(
                "  Baselined:     {}\n",
                t.format("%Y-%m-%d %H:%M UTC")
            ));
            output.push_str(&format!("  Change Orders: {}\n", project.change_orders));
        }
        None => output.push_str("  Baselined:     not yet (still estimating)\n"),
    }

    if project.archived {
        output.push_str("  Archived:      Yes\n");
    }

    if !project.notes.is_empty() {
        output.push_str(&format!("  Notes:         {}\n", project.notes));
    }

    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        project.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        project.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}
