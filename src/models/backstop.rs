//! Backstop model
//!
//! A backstop is a threshold rule watched against the live ledger: a cost
//! ceiling on a node, a deadline on an unfinished item, a profit or cash-flow
//! floor on the whole project. Evaluation is read-only and reports whether
//! each rule has been reached.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::cost_code::CostCode;
use super::ids::{BackstopId, ProjectId};
use super::money::{format_bps, Money};

/// What part of the project a backstop watches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum BackstopScope {
    /// A single vendor line's own figures
    ItemLine { code: CostCode },
    /// A category node's aggregated figures
    Objective { code: CostCode },
    /// Any node's schedule (used with date thresholds)
    Task { code: CostCode },
    /// Project-wide actual profit
    ProjectProfit,
    /// Project-wide net cash position
    ProjectedCashflow,
}

impl BackstopScope {
    /// The node this scope points at, if any
    pub fn code(&self) -> Option<&CostCode> {
        match self {
            Self::ItemLine { code } | Self::Objective { code } | Self::Task { code } => Some(code),
            Self::ProjectProfit | Self::ProjectedCashflow => None,
        }
    }

    /// True for the project-wide scopes (no node reference)
    pub fn is_project_wide(&self) -> bool {
        self.code().is_none()
    }

    /// Project-wide scopes are floors; node scopes are ceilings
    pub fn is_floor(&self) -> bool {
        self.is_project_wide()
    }

    pub fn description(&self) -> String {
        match self {
            Self::ItemLine { code } => format!("item line {}", code),
            Self::Objective { code } => format!("objective {}", code),
            Self::Task { code } => format!("task {}", code),
            Self::ProjectProfit => "project profit".to_string(),
            Self::ProjectedCashflow => "projected cashflow".to_string(),
        }
    }
}

impl fmt::Display for BackstopScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Which way a percentage threshold triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThresholdDirection {
    /// Reached when the ratio meets or exceeds the limit (cost ceilings)
    RisesAbove,
    /// Reached when the ratio meets or falls below the limit (margin/cash floors)
    FallsBelow,
}

impl fmt::Display for ThresholdDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RisesAbove => write!(f, "rises above"),
            Self::FallsBelow => write!(f, "falls below"),
        }
    }
}

impl FromStr for ThresholdDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rises-above" | "above" | "ceiling" => Ok(Self::RisesAbove),
            "falls-below" | "below" | "floor" => Ok(Self::FallsBelow),
            other => Err(format!(
                "Unknown direction '{}' (expected rises-above or falls-below)",
                other
            )),
        }
    }
}

/// The condition a backstop checks
///
/// Amount thresholds take their direction from the scope (node scopes are
/// ceilings, project scopes are floors); percentage thresholds carry an
/// explicit direction. Percentages are stored as integer basis points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Threshold {
    Amount { amount: Money },
    Date { date: NaiveDate },
    Percentage { limit_bps: i64, direction: ThresholdDirection },
}

impl Threshold {
    pub fn amount(amount: Money) -> Self {
        Self::Amount { amount }
    }

    pub fn date(date: NaiveDate) -> Self {
        Self::Date { date }
    }

    pub fn percentage(limit_bps: i64, direction: ThresholdDirection) -> Self {
        Self::Percentage { limit_bps, direction }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Amount { amount } => format!("amount {}", amount),
            Self::Date { date } => format!("date {}", date.format("%Y-%m-%d")),
            Self::Percentage { limit_bps, direction } => {
                format!("{} {}", direction, format_bps(*limit_bps))
            }
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Severity assigned when a backstop is defined; never derived from how far
/// past the threshold the observed figure is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!(
                "Unknown severity '{}' (expected high, medium, or low)",
                other
            )),
        }
    }
}

/// A threshold rule attached to a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backstop {
    pub id: BackstopId,
    pub project_id: ProjectId,
    pub scope: BackstopScope,
    pub threshold: Threshold,
    pub severity: Severity,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl Backstop {
    pub fn new(
        project_id: ProjectId,
        scope: BackstopScope,
        threshold: Threshold,
        severity: Severity,
    ) -> Self {
        Self {
            id: BackstopId::new(),
            project_id,
            scope,
            threshold,
            severity,
            note: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Validate the scope/threshold combination
    pub fn validate(&self) -> Result<(), BackstopValidationError> {
        // Date thresholds compare against an item's schedule; the project-wide
        // scopes have none.
        if matches!(self.threshold, Threshold::Date { .. }) && self.scope.is_project_wide() {
            return Err(BackstopValidationError::DateOnProjectScope);
        }

        // Node figures are non-negative, so a negative ceiling can never
        // be meaningful. Project floors may go negative (a tolerated loss).
        if !self.scope.is_project_wide() {
            if let Threshold::Amount { amount } = self.threshold {
                if amount.is_negative() {
                    return Err(BackstopValidationError::NegativeCeiling(amount));
                }
            }
            if let Threshold::Percentage { limit_bps, .. } = self.threshold {
                if limit_bps < 0 {
                    return Err(BackstopValidationError::NegativePercentageCeiling(
                        limit_bps,
                    ));
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Backstop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.severity, self.scope, self.threshold
        )
    }
}

/// Validation errors for backstop definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackstopValidationError {
    DateOnProjectScope,
    NegativeCeiling(Money),
    NegativePercentageCeiling(i64),
}

impl fmt::Display for BackstopValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateOnProjectScope => write!(
                f,
                "Date thresholds need an item to watch; use an item-line, objective, or task scope"
            ),
            Self::NegativeCeiling(amount) => {
                write!(f, "Amount ceiling {} cannot be negative on a node scope", amount)
            }
            Self::NegativePercentageCeiling(bps) => write!(
                f,
                "Percentage ceiling {} cannot be negative on a node scope",
                format_bps(*bps)
            ),
        }
    }
}

impl std::error::Error for BackstopValidationError {}
