//! Backstop CLI commands
//!
//! Implements CLI commands for defining, listing, removing, and evaluating
//! backstop threshold rules.

use chrono::NaiveDate;
use clap::Subcommand;

use crate::display::backstop::{format_backstop_list, format_backstop_report};
use crate::error::{CostbookError, CostbookResult};
use crate::models::{
    BackstopScope, CostCode, Money, Severity, Threshold, ThresholdDirection,
};
use crate::services::{BackstopService, NewBackstop};
use crate::storage::Storage;

/// Backstop subcommands
#[derive(Subcommand)]
pub enum BackstopCommands {
    /// Define a new backstop rule
    Add {
        /// Project name or ID prefix
        project: String,
        /// What to watch (item-line, objective, task, project-profit, projected-cashflow)
        #[arg(short, long)]
        scope: String,
        /// Cost code, required for the node scopes
        #[arg(short, long)]
        code: Option<String>,
        /// Amount threshold (ceiling on node scopes, floor on project scopes)
        #[arg(short, long)]
        amount: Option<String>,
        /// Date threshold (YYYY-MM-DD); breached once the item is overdue
        #[arg(short, long)]
        date: Option<String>,
        /// Percentage threshold (e.g., "103.33")
        #[arg(short, long)]
        percent: Option<String>,
        /// Percentage direction (rises-above, falls-below); defaults by scope
        #[arg(long)]
        direction: Option<String>,
        /// Severity (high, medium, low)
        #[arg(long, default_value = "medium")]
        severity: String,
        /// Free-form note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// List a project's backstop rules
    List {
        /// Project name or ID prefix
        project: String,
    },
    /// Remove a backstop rule
    Remove {
        /// Project name or ID prefix
        project: String,
        /// Backstop ID or unique prefix
        id: String,
    },
    /// Evaluate every rule against the current ledger
    Eval {
        /// Project name or ID prefix
        project: String,
        /// Evaluate as of this date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
}

/// Handle a backstop command
pub fn handle_backstop_command(storage: &Storage, cmd: BackstopCommands) -> CostbookResult<()> {
    let service = BackstopService::new(storage);

    match cmd {
        BackstopCommands::Add {
            project,
            scope,
            code,
            amount,
            date,
            percent,
            direction,
            severity,
            note,
        } => {
            let scope = parse_scope(&scope, code)?;
            let threshold = parse_threshold(&scope, amount, date, percent, direction)?;
            let severity = severity
                .parse::<Severity>()
                .map_err(CostbookError::Validation)?;

            let backstop = service.create(
                &project,
                NewBackstop {
                    scope,
                    threshold,
                    severity,
                    note,
                },
            )?;

            println!("Created backstop: {}", backstop);
            println!("  ID: {}", backstop.id);
        }

        BackstopCommands::List { project } => {
            let backstops = service.list(&project)?;
            print!("{}", format_backstop_list(&backstops));
        }

        BackstopCommands::Remove { project, id } => {
            let removed = service.remove(&project, &id)?;
            println!("Removed backstop: {}", removed);
        }

        BackstopCommands::Eval { project, date } => {
            let as_of = match date {
                Some(s) => parse_date(&s)?,
                None => chrono::Local::now().date_naive(),
            };
            let report = service.evaluate(&project, as_of)?;
            print!("{}", format_backstop_report(&report));
        }
    }

    Ok(())
}

fn parse_scope(scope: &str, code: Option<String>) -> CostbookResult<BackstopScope> {
    let code = code
        .map(|s| {
            s.parse::<CostCode>()
                .map_err(|e| CostbookError::Validation(format!("{}", e)))
        })
        .transpose()?;

    match scope.to_lowercase().as_str() {
        "item-line" | "line" => Ok(BackstopScope::ItemLine {
            code: require_code(code, scope)?,
        }),
        "objective" | "category" => Ok(BackstopScope::Objective {
            code: require_code(code, scope)?,
        }),
        "task" => Ok(BackstopScope::Task {
            code: require_code(code, scope)?,
        }),
        "project-profit" | "profit" => reject_code(code, BackstopScope::ProjectProfit),
        "projected-cashflow" | "cashflow" => {
            reject_code(code, BackstopScope::ProjectedCashflow)
        }
        other => Err(CostbookError::Validation(format!(
            "Unknown scope '{}'. Valid scopes: item-line, objective, task, project-profit, projected-cashflow",
            other
        ))),
    }
}

fn require_code(code: Option<CostCode>, scope: &str) -> CostbookResult<CostCode> {
    code.ok_or_else(|| {
        CostbookError::Validation(format!("Scope '{}' requires --code", scope))
    })
}

fn reject_code(code: Option<CostCode>, scope: BackstopScope) -> CostbookResult<BackstopScope> {
    if code.is_some() {
        return Err(CostbookError::Validation(format!(
            "--code does not apply to the {} scope",
            scope
        )));
    }
    Ok(scope)
}

fn parse_threshold(
    scope: &BackstopScope,
    amount: Option<String>,
    date: Option<String>,
    percent: Option<String>,
    direction: Option<String>,
) -> CostbookResult<Threshold> {
    match (amount, date, percent) {
        (Some(amount), None, None) => Ok(Threshold::amount(parse_money(&amount)?)),
        (None, Some(date), None) => Ok(Threshold::date(parse_date(&date)?)),
        (None, None, Some(percent)) => {
            let direction = match direction {
                Some(s) => s
                    .parse::<ThresholdDirection>()
                    .map_err(CostbookError::Validation)?,
                // Node ratios are watched as ceilings, project ratios as floors
                None if scope.is_project_wide() => ThresholdDirection::FallsBelow,
                None => ThresholdDirection::RisesAbove,
            };
            Ok(Threshold::percentage(parse_percent_bps(&percent)?, direction))
        }
        _ => Err(CostbookError::Validation(
            "Specify exactly one of --amount, --date, or --percent".to_string(),
        )),
    }
}

fn parse_money(s: &str) -> CostbookResult<Money> {
    Money::parse(s).map_err(|e| {
        CostbookError::Validation(format!(
            "Invalid amount '{}': {}. Use format like '6000.00'",
            s, e
        ))
    })
}

fn parse_date(s: &str) -> CostbookResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        CostbookError::Validation(format!("Invalid date format: '{}'. Use YYYY-MM-DD", s))
    })
}

/// Parse a percentage like "103.33" or "95%" into basis points
fn parse_percent_bps(s: &str) -> CostbookResult<i64> {
    let cleaned = s.trim().trim_end_matches('%');
    let value: f64 = cleaned.parse().map_err(|_| {
        CostbookError::Validation(format!(
            "Invalid percentage '{}'. Use format like '103.33'",
            s
        ))
    })?;
    Ok((value * 100.0).round() as i64)
}
