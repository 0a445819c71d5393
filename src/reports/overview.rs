//! Project overview report
//!
//! Summarizes one project's financial position: totals, profit, margin,
//! cash position, outstanding balances, schedule counts, and the state of
//! its backstop rules. This is the view model the dashboard cards consume.

use chrono::NaiveDate;

use crate::error::{CostbookError, CostbookResult};
use crate::models::{Project, ScheduleStatus, Severity};
use crate::services::aggregation::{self, ProjectTotals};
use crate::services::BackstopService;
use crate::storage::Storage;

/// Backstop evaluation summary grouped by severity
#[derive(Debug, Clone, Copy, Default)]
pub struct BackstopSummary {
    /// Rules defined on the project
    pub total: usize,
    /// Rules whose threshold has been reached
    pub reached: usize,
    /// Reached rules by severity
    pub reached_high: usize,
    pub reached_medium: usize,
    pub reached_low: usize,
    /// Rules watching a node that no longer exists
    pub stale: usize,
}

/// Project overview report
#[derive(Debug, Clone)]
pub struct ProjectOverview {
    /// The project reported on
    pub project: Project,
    /// The day the overview was taken
    pub as_of: NaiveDate,
    /// Whole-project money totals
    pub totals: ProjectTotals,
    /// Number of vendor lines
    pub vendor_line_count: usize,
    /// Number of category nodes
    pub category_count: usize,
    /// Vendor lines marked complete
    pub completed_count: usize,
    /// Vendor lines past due and incomplete
    pub overdue_count: usize,
    /// Financial events recorded
    pub event_count: usize,
    /// Backstop evaluation summary
    pub backstops: BackstopSummary,
}

impl ProjectOverview {
    /// Generate the overview from the current ledger
    pub fn generate(storage: &Storage, project: &str, today: NaiveDate) -> CostbookResult<Self> {
        let project = storage
            .projects
            .find(project)?
            .ok_or_else(|| CostbookError::project_not_found(project))?;

        let hierarchy = storage.ledgers.get_required(project.id)?;
        let totals = aggregation::project_totals(&hierarchy);

        let mut vendor_line_count = 0;
        let mut category_count = 0;
        let mut completed_count = 0;
        let mut overdue_count = 0;
        for node in hierarchy.walk() {
            if node.is_category {
                category_count += 1;
                continue;
            }
            vendor_line_count += 1;
            if node.is_completed {
                completed_count += 1;
            }
            if node.schedule_status(today) == ScheduleStatus::AlreadyDue {
                overdue_count += 1;
            }
        }

        let event_count = storage.events.for_project(project.id)?.len();

        let report = BackstopService::new(storage).evaluate(&project.name, today)?;
        let backstops = BackstopSummary {
            total: report.evaluations.len() + report.stale.len(),
            reached: report.reached_count(),
            reached_high: report.reached_with(Severity::High),
            reached_medium: report.reached_with(Severity::Medium),
            reached_low: report.reached_with(Severity::Low),
            stale: report.stale.len(),
        };

        Ok(Self {
            project,
            as_of: today,
            totals,
            vendor_line_count,
            category_count,
            completed_count,
            overdue_count,
            event_count,
            backstops,
        })
    }
}
