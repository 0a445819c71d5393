//! Estimates vs Actuals report
//!
//! Builds the hierarchy-ordered table comparing estimated against reconciled
//! figures for every item line, plus project totals. This is the view model
//! the terminal table and the CSV export consume.

use chrono::NaiveDate;

use crate::error::{CostbookError, CostbookResult};
use crate::models::{CostCode, Money, Project, ScheduleStatus};
use crate::services::aggregation::{self, ProjectTotals};
use crate::storage::Storage;

/// One row of the estimates-vs-actuals table
#[derive(Debug, Clone)]
pub struct ReportRow {
    /// Cost code
    pub code: CostCode,
    /// Item line name
    pub name: String,
    /// Hierarchy depth (1 = root category)
    pub level: u8,
    /// Categories carry aggregated figures; vendor lines their own
    pub is_category: bool,
    /// Vendor, own or inherited at creation
    pub vendor: Option<String>,
    /// Estimated cost
    pub estimated_cost: Money,
    /// Reconciled actual cost
    pub actual_cost: Money,
    /// Estimated revenue
    pub estimated_revenue: Money,
    /// Reconciled actual revenue
    pub actual_revenue: Money,
    /// Total invoiced by vendors
    pub invoiced: Money,
    /// Total received from the client
    pub paid: Money,
    /// Total billed to the client
    pub billed: Money,
    /// Total paid out to vendors
    pub payments: Money,
    /// Actual cost over estimate (positive means over budget)
    pub cost_variance: Money,
    /// Schedule status as of the report date
    pub schedule: ScheduleStatus,
}

impl ReportRow {
    /// Check if this row has spent past its estimate
    pub fn is_over_estimate(&self) -> bool {
        self.cost_variance.is_positive()
    }
}

/// Estimates vs Actuals report for one project
#[derive(Debug, Clone)]
pub struct EstimatesVsActualsReport {
    /// The project reported on
    pub project: Project,
    /// The day schedule statuses were derived for
    pub as_of: NaiveDate,
    /// Rows depth-first in cost code order, parents before children
    pub rows: Vec<ReportRow>,
    /// Whole-project totals over the root categories
    pub totals: ProjectTotals,
}

impl EstimatesVsActualsReport {
    /// Generate the report from the current ledger
    pub fn generate(storage: &Storage, project: &str, today: NaiveDate) -> CostbookResult<Self> {
        let project = storage
            .projects
            .find(project)?
            .ok_or_else(|| CostbookError::project_not_found(project))?;

        let hierarchy = storage.ledgers.get_required(project.id)?;
        let totals = aggregation::project_totals(&hierarchy);

        let rows = hierarchy
            .walk()
            .into_iter()
            .map(|node| ReportRow {
                code: node.code.clone(),
                name: node.name.clone(),
                level: node.level,
                is_category: node.is_category,
                vendor: node.vendor.clone(),
                estimated_cost: node.estimated_cost,
                actual_cost: node.actual_cost,
                estimated_revenue: node.estimated_revenue,
                actual_revenue: node.actual_revenue,
                invoiced: node.invoiced,
                paid: node.paid,
                billed: node.billed,
                payments: node.payments,
                cost_variance: node.cost_variance(),
                schedule: node.schedule_status(today),
            })
            .collect();

        Ok(Self {
            project,
            as_of: today,
            rows,
            totals,
        })
    }

    /// The vendor-line rows only (no aggregated categories)
    pub fn vendor_rows(&self) -> Vec<&ReportRow> {
        self.rows.iter().filter(|r| !r.is_category).collect()
    }

    /// Count of vendor lines that have spent past their estimate
    pub fn over_estimate_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| !r.is_category && r.is_over_estimate())
            .count()
    }

    /// Count of vendor lines already past due
    pub fn overdue_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| !r.is_category && r.schedule == ScheduleStatus::AlreadyDue)
            .count()
    }
}
