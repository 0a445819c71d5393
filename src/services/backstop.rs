//! Backstop service
//!
//! Manages threshold rules and evaluates them against the live ledger.
//! Evaluation is read-only: it observes the aggregated hierarchy and the
//! project totals, classifies each rule as reached or not, and never touches
//! ledger or schedule state.

use chrono::NaiveDate;

use crate::audit::EntityType;
use crate::error::{CostbookError, CostbookResult};
use crate::models::{
    Backstop, BackstopScope, CostCode, Hierarchy, ItemLineNode, Money, Project, Severity,
    Threshold, ThresholdDirection,
};
use crate::services::aggregation::{self, ProjectTotals};
use crate::storage::Storage;

/// Service for backstop management and evaluation
pub struct BackstopService<'a> {
    storage: &'a Storage,
}

/// Input for defining a backstop
#[derive(Debug, Clone)]
pub struct NewBackstop {
    pub scope: BackstopScope,
    pub threshold: Threshold,
    pub severity: Severity,
    pub note: Option<String>,
}

/// One rule evaluated against the current ledger
#[derive(Debug, Clone)]
pub struct BackstopEvaluation {
    pub backstop: Backstop,
    pub reached: bool,
    pub observation: Observation,
}

/// The figure a rule was compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Observed money figure against an amount limit
    Amount {
        observed: Money,
        limit: Money,
        floor: bool,
    },
    /// Observed ratio in basis points; None when the denominator is zero
    Percentage {
        observed_bps: Option<i64>,
        limit_bps: i64,
        direction: ThresholdDirection,
    },
    /// A deadline on an item's completion
    Deadline {
        deadline: NaiveDate,
        completed: bool,
    },
}

/// Result of evaluating every backstop on a project
#[derive(Debug, Clone)]
pub struct BackstopReport {
    pub project: Project,
    pub as_of: NaiveDate,
    /// Worst severity first (repository order)
    pub evaluations: Vec<BackstopEvaluation>,
    /// Rules whose watched node no longer exists
    pub stale: Vec<Backstop>,
}

impl BackstopReport {
    /// The evaluations whose threshold has been reached
    pub fn reached(&self) -> Vec<&BackstopEvaluation> {
        self.evaluations.iter().filter(|e| e.reached).collect()
    }

    /// How many rules have been reached
    pub fn reached_count(&self) -> usize {
        self.evaluations.iter().filter(|e| e.reached).count()
    }

    /// How many reached rules carry the given severity
    pub fn reached_with(&self, severity: Severity) -> usize {
        self.evaluations
            .iter()
            .filter(|e| e.reached && e.backstop.severity == severity)
            .count()
    }

    /// Worst severity among the reached rules
    pub fn highest_reached(&self) -> Option<Severity> {
        self.evaluations
            .iter()
            .filter(|e| e.reached)
            .map(|e| e.backstop.severity)
            .min()
    }
}

impl<'a> BackstopService<'a> {
    /// Create a new backstop service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn find_project(&self, project: &str) -> CostbookResult<Project> {
        self.storage
            .projects
            .find(project)?
            .ok_or_else(|| CostbookError::project_not_found(project))
    }

    /// Define a backstop on a project
    pub fn create(&self, project: &str, input: NewBackstop) -> CostbookResult<Backstop> {
        let project = self.find_project(project)?;

        if let Some(code) = input.scope.code() {
            let hierarchy = self.storage.ledgers.get_required(project.id)?;
            let node = hierarchy
                .get(code)
                .ok_or_else(|| CostbookError::item_line_not_found(code.to_string()))?;

            match input.scope {
                BackstopScope::ItemLine { .. } if node.is_category => {
                    return Err(CostbookError::Validation(format!(
                        "{} is a category; an item-line backstop watches a vendor line",
                        code
                    )));
                }
                BackstopScope::Objective { .. } if !node.is_category => {
                    return Err(CostbookError::Validation(format!(
                        "{} is a vendor line; an objective backstop watches a category",
                        code
                    )));
                }
                _ => {}
            }
        }

        let mut backstop = Backstop::new(project.id, input.scope, input.threshold, input.severity);
        if let Some(note) = input.note {
            backstop = backstop.with_note(note.trim());
        }

        backstop
            .validate()
            .map_err(|e| CostbookError::Validation(e.to_string()))?;

        self.storage.backstops.upsert(backstop.clone())?;
        self.storage.backstops.save()?;

        self.storage.log_create(
            EntityType::Backstop,
            backstop.id.to_string(),
            Some(backstop.to_string()),
            &backstop,
        )?;

        Ok(backstop)
    }

    /// All backstops on a project, worst severity first
    pub fn list(&self, project: &str) -> CostbookResult<Vec<Backstop>> {
        let project = self.find_project(project)?;
        self.storage.backstops.for_project(project.id)
    }

    /// Remove a backstop by id or unambiguous id prefix
    pub fn remove(&self, project: &str, id: &str) -> CostbookResult<Backstop> {
        let project = self.find_project(project)?;
        let query = id.trim();
        if query.is_empty() {
            return Err(CostbookError::Validation(
                "Backstop id cannot be empty".into(),
            ));
        }

        let backstops = self.storage.backstops.for_project(project.id)?;
        let mut matches = backstops.into_iter().filter(|b| {
            b.id.to_string().starts_with(query) || b.id.as_uuid().to_string().starts_with(query)
        });

        let backstop = match (matches.next(), matches.next()) {
            (None, _) => return Err(CostbookError::backstop_not_found(query)),
            (Some(found), None) => found,
            (Some(_), Some(_)) => {
                return Err(CostbookError::Validation(format!(
                    "Backstop id '{}' matches more than one rule",
                    query
                )))
            }
        };

        self.storage.backstops.delete(backstop.id)?;
        self.storage.backstops.save()?;

        self.storage.log_delete(
            EntityType::Backstop,
            backstop.id.to_string(),
            Some(backstop.to_string()),
            &backstop,
        )?;

        Ok(backstop)
    }

    /// Evaluate every backstop on a project against the ledger as of a day
    pub fn evaluate(&self, project: &str, today: NaiveDate) -> CostbookResult<BackstopReport> {
        let project = self.find_project(project)?;
        let hierarchy = self.storage.ledgers.get_required(project.id)?;
        let totals = aggregation::project_totals(&hierarchy);
        let backstops = self.storage.backstops.for_project(project.id)?;

        let mut evaluations = Vec::new();
        let mut stale = Vec::new();
        for backstop in backstops {
            match evaluate_one(&backstop, &hierarchy, &totals, today) {
                Some(evaluation) => evaluations.push(evaluation),
                None => stale.push(backstop),
            }
        }

        Ok(BackstopReport {
            project,
            as_of: today,
            evaluations,
            stale,
        })
    }
}

/// Evaluate one rule; None when the rule cannot be evaluated (its node is
/// gone, or a stored definition mixes a date with a project scope)
fn evaluate_one(
    backstop: &Backstop,
    hierarchy: &Hierarchy,
    totals: &ProjectTotals,
    today: NaiveDate,
) -> Option<BackstopEvaluation> {
    match backstop.scope.code() {
        Some(code) => {
            let node = hierarchy.get(code)?;
            Some(evaluate_node(backstop, node, today))
        }
        None => evaluate_project_wide(backstop, totals),
    }
}

/// Node scopes: amount and percentage thresholds are ceilings on the cost
/// side; date thresholds watch the completion flag.
fn evaluate_node(backstop: &Backstop, node: &ItemLineNode, today: NaiveDate) -> BackstopEvaluation {
    let (reached, observation) = match backstop.threshold {
        Threshold::Amount { amount } => {
            let observed = node.actual_cost;
            (
                observed >= amount,
                Observation::Amount {
                    observed,
                    limit: amount,
                    floor: false,
                },
            )
        }
        Threshold::Date { date } => (
            today > date && !node.is_completed,
            Observation::Deadline {
                deadline: date,
                completed: node.is_completed,
            },
        ),
        Threshold::Percentage {
            limit_bps,
            direction,
        } => {
            let observed_bps = node.actual_cost.ratio_bps(node.estimated_cost);
            (
                percentage_reached(observed_bps, limit_bps, direction),
                Observation::Percentage {
                    observed_bps,
                    limit_bps,
                    direction,
                },
            )
        }
    };

    BackstopEvaluation {
        backstop: backstop.clone(),
        reached,
        observation,
    }
}

/// Project scopes: amounts are floors on profit or net cash; percentages
/// compare the margin or cash-flow coverage ratio.
fn evaluate_project_wide(backstop: &Backstop, totals: &ProjectTotals) -> Option<BackstopEvaluation> {
    let (reached, observation) = match (&backstop.scope, backstop.threshold.clone()) {
        (BackstopScope::ProjectProfit, Threshold::Amount { amount }) => {
            let observed = totals.actual_profit();
            (
                observed <= amount,
                Observation::Amount {
                    observed,
                    limit: amount,
                    floor: true,
                },
            )
        }
        (BackstopScope::ProjectedCashflow, Threshold::Amount { amount }) => {
            let observed = totals.net_cash();
            (
                observed <= amount,
                Observation::Amount {
                    observed,
                    limit: amount,
                    floor: true,
                },
            )
        }
        (
            BackstopScope::ProjectProfit,
            Threshold::Percentage {
                limit_bps,
                direction,
            },
        ) => {
            let observed_bps = totals.margin_bps();
            (
                percentage_reached(observed_bps, limit_bps, direction),
                Observation::Percentage {
                    observed_bps,
                    limit_bps,
                    direction,
                },
            )
        }
        (
            BackstopScope::ProjectedCashflow,
            Threshold::Percentage {
                limit_bps,
                direction,
            },
        ) => {
            let observed_bps = totals.cash_coverage_bps();
            (
                percentage_reached(observed_bps, limit_bps, direction),
                Observation::Percentage {
                    observed_bps,
                    limit_bps,
                    direction,
                },
            )
        }
        _ => return None,
    };

    Some(BackstopEvaluation {
        backstop: backstop.clone(),
        reached,
        observation,
    })
}

/// A ratio with no denominator yet cannot breach in either direction
fn percentage_reached(
    observed_bps: Option<i64>,
    limit_bps: i64,
    direction: ThresholdDirection,
) -> bool {
    match observed_bps {
        Some(bps) => match direction {
            ThresholdDirection::RisesAbove => bps >= limit_bps,
            ThresholdDirection::FallsBelow => bps <= limit_bps,
        },
        None => false,
    }
}
