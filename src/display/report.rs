//! Report display formatting
//!
//! Renders the report view models as terminal tables. The estimates table
//! shows the cost side per node; flow totals and the revenue side live in
//! the footer and the overview.

use crate::models::format_bps;
use crate::reports::{EstimatesVsActualsReport, ProjectOverview};

/// Format the estimates-vs-actuals report as a terminal table
pub fn format_estimates_vs_actuals(report: &EstimatesVsActualsReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Estimates vs Actuals: {}\n",
        report.project.name
    ));
    output.push_str(&"=".repeat(90));
    output.push('\n');
    output.push_str(&format!("As of: {}\n\n", report.as_of));

    if report.rows.is_empty() {
        output.push_str("No item lines found.\n");
        return output;
    }

    let code_width = report
        .rows
        .iter()
        .map(|r| r.code.to_string().len())
        .max()
        .unwrap_or(4)
        .max(4);
    let name_width = report
        .rows
        .iter()
        .map(|r| r.name.len() + (r.level as usize - 1) * 2)
        .max()
        .unwrap_or(4)
        .max(4);

    output.push_str(&format!(
        "{:<code_width$}  {:<name_width$}  {:>12}  {:>12}  {:>12}  {}\n",
        "Code", "Name", "Est. Cost", "Actual", "Variance", "Schedule"
    ));
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for row in &report.rows {
        let indent = "  ".repeat(row.level as usize - 1);
        let name = format!("{}{}", indent, row.name);
        let variance_display = if row.is_over_estimate() {
            format!("{} *", row.cost_variance)
        } else {
            row.cost_variance.to_string()
        };

        output.push_str(&format!(
            "{:<code_width$}  {:<name_width$}  {:>12}  {:>12}  {:>12}  {}\n",
            row.code.to_string(),
            name,
            row.estimated_cost.to_string(),
            row.actual_cost.to_string(),
            variance_display,
            row.schedule
        ));
    }

    output.push_str(&"-".repeat(90));
    output.push('\n');
    output.push_str(&format!(
        "{:<width$}  {:>12}  {:>12}  {:>12}\n",
        "TOTAL",
        report.totals.estimated_cost,
        report.totals.actual_cost,
        (report.totals.actual_cost - report.totals.estimated_cost).to_string(),
        width = code_width + name_width + 2
    ));

    output.push_str(&format!(
        "\nRevenue: {} estimated, {} billed to date\n",
        report.totals.estimated_revenue, report.totals.billed
    ));
    output.push_str(&format!(
        "Cash:    {} received, {} paid out\n",
        report.totals.paid, report.totals.payments
    ));
    output.push_str(&format!(
        "\n{} line(s) over estimate, {} overdue.\n",
        report.over_estimate_count(),
        report.overdue_count()
    ));
    output.push_str("\n* = over estimate\n");

    output
}

/// Format the project overview as a dashboard-style summary
pub fn format_overview(report: &ProjectOverview) -> String {
    let totals = &report.totals;
    let mut output = String::new();

    output.push_str(&format!("Project Overview: {}\n", report.project.name));
    output.push_str(&"=".repeat(70));
    output.push('\n');
    output.push_str(&format!("As of: {}\n\n", report.as_of));

    output.push_str("Costs\n");
    output.push_str(&format!("  Estimated:       {:>15}\n", totals.estimated_cost));
    output.push_str(&format!("  Actual:          {:>15}\n", totals.actual_cost));

    output.push_str("\nRevenue\n");
    output.push_str(&format!(
        "  Estimated:       {:>15}\n",
        totals.estimated_revenue
    ));
    output.push_str(&format!("  Actual:          {:>15}\n", totals.actual_revenue));

    let margin = totals
        .margin_bps()
        .map(|bps| format_bps(bps))
        .unwrap_or_else(|| "-".to_string());
    output.push_str("\nProfit\n");
    output.push_str(&format!(
        "  Estimated:       {:>15}\n",
        totals.estimated_profit()
    ));
    output.push_str(&format!(
        "  Actual:          {:>15}\n",
        totals.actual_profit()
    ));
    output.push_str(&format!("  Margin:          {:>15}\n", margin));

    output.push_str("\nCash\n");
    output.push_str(&format!("  Received:        {:>15}\n", totals.paid));
    output.push_str(&format!("  Paid Out:        {:>15}\n", totals.payments));
    output.push_str(&format!("  Net Position:    {:>15}\n", totals.net_cash()));
    output.push_str(&format!(
        "  Receivable:      {:>15}\n",
        totals.outstanding_receivable()
    ));
    output.push_str(&format!(
        "  Payable:         {:>15}\n",
        totals.outstanding_payable()
    ));

    output.push_str("\nItems\n");
    output.push_str(&format!(
        "  {} categories, {} vendor lines ({} completed, {} overdue)\n",
        report.category_count,
        report.vendor_line_count,
        report.completed_count,
        report.overdue_count
    ));
    output.push_str(&format!("  {} financial event(s) recorded\n", report.event_count));

    output.push_str("\nBackstops\n");
    if report.backstops.total == 0 {
        output.push_str("  none defined\n");
    } else {
        output.push_str(&format!(
            "  {} of {} reached (high: {}, medium: {}, low: {})\n",
            report.backstops.reached,
            report.backstops.total,
            report.backstops.reached_high,
            report.backstops.reached_medium,
            report.backstops.reached_low
        ));
        if report.backstops.stale > 0 {
            output.push_str(&format!(
                "  {} stale rule(s) watching removed nodes\n",
                report.backstops.stale
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CostbookPaths;
    use crate::error::CostbookError;
    use crate::models::{CostCode, ItemLineNode, Money, Project};
    use crate::services::aggregation;
    use crate::storage::Storage;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CostbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn code(s: &str) -> CostCode {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed_project(storage: &Storage) -> Project {
        let project = Project::new("Riverside Office Park");
        storage.projects.upsert(project.clone()).unwrap();
        storage.ledgers.ensure(project.id).unwrap();

        storage
            .ledgers
            .with_mut(project.id, |hierarchy| {
                let start = date(2025, 8, 1);
                let root = ItemLineNode::new(
                    code("2"),
                    "Concrete Works",
                    true,
                    start,
                    date(2025, 9, 30),
                );
                hierarchy
                    .insert(root)
                    .map_err(|e| CostbookError::Ledger(e.to_string()))?;

                let mut foundation =
                    ItemLineNode::new(code("2.1"), "Foundation", false, start, date(2025, 8, 15));
                foundation.estimated_cost = Money::from_cents(600_000);
                foundation.invoiced = Money::from_cents(620_000);
                foundation.actual_cost = Money::from_cents(620_000);
                hierarchy
                    .insert(foundation)
                    .map_err(|e| CostbookError::Ledger(e.to_string()))?;

                aggregation::aggregate(hierarchy)
                    .map_err(|_| CostbookError::Ledger("aggregation failed".into()))?;
                Ok(())
            })
            .unwrap();

        project
    }

    #[test]
    fn test_format_estimates_vs_actuals() {
        let (_temp_dir, storage) = create_test_storage();
        seed_project(&storage);

        let report = crate::reports::EstimatesVsActualsReport::generate(
            &storage,
            "Riverside Office Park",
            date(2025, 8, 20),
        )
        .unwrap();
        let output = format_estimates_vs_actuals(&report);

        assert!(output.contains("Estimates vs Actuals: Riverside Office Park"));
        assert!(output.contains("Concrete Works"));
        assert!(output.contains("  Foundation"));
        // Over-estimate marker on the variance
        assert!(output.contains("$200.00 *"));
        assert!(output.contains("TOTAL"));
        assert!(output.contains("$6200.00"));
        assert!(output.contains("1 line(s) over estimate, 1 overdue."));
    }

    #[test]
    fn test_format_estimates_vs_actuals_empty() {
        let (_temp_dir, storage) = create_test_storage();
        let project = Project::new("Empty Yard");
        storage.projects.upsert(project.clone()).unwrap();
        storage.ledgers.ensure(project.id).unwrap();

        let report = crate::reports::EstimatesVsActualsReport::generate(
            &storage,
            "Empty Yard",
            date(2025, 8, 20),
        )
        .unwrap();
        let output = format_estimates_vs_actuals(&report);
        assert!(output.contains("No item lines found."));
    }

    #[test]
    fn test_format_overview() {
        let (_temp_dir, storage) = create_test_storage();
        seed_project(&storage);

        let report =
            ProjectOverview::generate(&storage, "Riverside Office Park", date(2025, 8, 20))
                .unwrap();
        let output = format_overview(&report);

        assert!(output.contains("Project Overview: Riverside Office Park"));
        assert!(output.contains("Net Position:"));
        assert!(output.contains("1 categories, 1 vendor lines (0 completed, 1 overdue)"));
        assert!(output.contains("none defined"));
    }
}
