//! CSV export functionality
//!
//! Exports the estimates-vs-actuals table and the event history to CSV
//! for spreadsheet use. Quoting is handled by the csv writer.

use std::collections::HashMap;
use std::io::Write;

use crate::error::{CostbookError, CostbookResult};
use crate::models::Money;
use crate::reports::EstimatesVsActualsReport;
use crate::storage::Storage;

/// Export the estimates-vs-actuals report to CSV, one row per node plus
/// a TOTAL row
pub fn export_estimates_csv<W: Write>(
    report: &EstimatesVsActualsReport,
    writer: &mut W,
) -> CostbookResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "Code",
            "Name",
            "Type",
            "Vendor",
            "Estimated Cost",
            "Actual Cost",
            "Cost Variance",
            "Estimated Revenue",
            "Actual Revenue",
            "Invoiced",
            "Paid",
            "Billed",
            "Payments",
            "Schedule",
        ])
        .map_err(|e| CostbookError::Export(e.to_string()))?;

    for row in &report.rows {
        let node_type = if row.is_category { "Category" } else { "Vendor line" };
        csv_writer
            .write_record([
                row.code.to_string(),
                row.name.clone(),
                node_type.to_string(),
                row.vendor.clone().unwrap_or_default(),
                money_cell(row.estimated_cost),
                money_cell(row.actual_cost),
                money_cell(row.cost_variance),
                money_cell(row.estimated_revenue),
                money_cell(row.actual_revenue),
                money_cell(row.invoiced),
                money_cell(row.paid),
                money_cell(row.billed),
                money_cell(row.payments),
                row.schedule.to_string(),
            ])
            .map_err(|e| CostbookError::Export(e.to_string()))?;
    }

    let totals = &report.totals;
    csv_writer
        .write_record([
            String::new(),
            "TOTAL".to_string(),
            String::new(),
            String::new(),
            money_cell(totals.estimated_cost),
            money_cell(totals.actual_cost),
            money_cell(totals.actual_cost - totals.estimated_cost),
            money_cell(totals.estimated_revenue),
            money_cell(totals.actual_revenue),
            money_cell(totals.invoiced),
            money_cell(totals.paid),
            money_cell(totals.billed),
            money_cell(totals.payments),
            String::new(),
        ])
        .map_err(|e| CostbookError::Export(e.to_string()))?;

    csv_writer
        .flush()
        .map_err(|e| CostbookError::Export(e.to_string()))?;

    Ok(())
}

/// Export a project's event history to CSV, in recording order
pub fn export_events_csv<W: Write>(
    storage: &Storage,
    project: &str,
    writer: &mut W,
) -> CostbookResult<()> {
    let project = storage
        .projects
        .find(project)?
        .ok_or_else(|| CostbookError::project_not_found(project))?;

    let hierarchy = storage.ledgers.get_required(project.id)?;
    let node_names: HashMap<_, _> = hierarchy
        .walk()
        .into_iter()
        .map(|n| (n.code.clone(), n.name.clone()))
        .collect();

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record([
            "ID", "Date", "Kind", "Node", "Node Name", "Amount", "Method", "Memo", "Document",
        ])
        .map_err(|e| CostbookError::Export(e.to_string()))?;

    for event in storage.events.for_project(project.id)? {
        let node_name = node_names
            .get(&event.node)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());
        let document = event
            .document
            .as_ref()
            .map(|d| d.name.clone())
            .unwrap_or_default();

        csv_writer
            .write_record([
                event.id.to_string(),
                event.date.to_string(),
                event.kind.to_string(),
                event.node.to_string(),
                node_name,
                money_cell(event.amount),
                event.method.clone().unwrap_or_default(),
                event.memo.clone(),
                document,
            ])
            .map_err(|e| CostbookError::Export(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| CostbookError::Export(e.to_string()))?;

    Ok(())
}

fn money_cell(amount: Money) -> String {
    format!("{:.2}", amount.cents() as f64 / 100.0)
}
