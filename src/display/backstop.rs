//! Backstop display formatting
//!
//! Formats backstop rules and evaluation results for terminal output.

use crate::models::{format_bps, Backstop, ThresholdDirection};
use crate::services::{BackstopReport, Observation};

/// Format defined backstop rules as a table
pub fn format_backstop_list(backstops: &[Backstop]) -> String {
    if backstops.is_empty() {
        return "No backstops found.\n\nAdd one with 'costbook backstop add'.".to_string();
    }

    let scope_width = backstops
        .iter()
        .map(|b| b.scope.description().len())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<8}  {:<scope_width$}  {}\n",
        "ID", "Severity", "Scope", "Threshold"
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<8}  {:-<scope_width$}  {:-<24}\n",
        "", "", "", ""
    ));

    for backstop in backstops {
        let mut line = format!(
            "{:<12}  {:<8}  {:<scope_width$}  {}",
            backstop.id.to_string(),
            backstop.severity.to_string(),
            backstop.scope.description(),
            backstop.threshold
        );
        if !backstop.note.is_empty() {
            line.push_str(&format!("  ({})", backstop.note));
        }
        line.push('\n');
        output.push_str(&line);
    }

    output
}

/// Format an evaluation run: every live rule with its observation, then
/// the rules whose watched node no longer exists
pub fn format_backstop_report(report: &BackstopReport) -> String {
    if report.evaluations.is_empty() && report.stale.is_empty() {
        return "No backstops defined.\n\nAdd one with 'costbook backstop add'.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "Backstops: {} (as of {})\n",
        report.project.name, report.as_of
    ));
    output.push_str(&"=".repeat(70));
    output.push('\n');

    for eval in &report.evaluations {
        let marker = if eval.reached { "[REACHED]" } else { "[ok]     " };
        output.push_str(&format!("{} {}\n", marker, eval.backstop));
        output.push_str(&format!(
            "          {}\n",
            format_observation(&eval.observation)
        ));
    }

    if !report.stale.is_empty() {
        output.push_str("\nStale rules (watching nodes that no longer exist):\n");
        for backstop in &report.stale {
            output.push_str(&format!("  {}\n", backstop));
        }
    }

    output.push_str(&format!(
        "\n{} rule(s), {} reached.\n",
        report.evaluations.len() + report.stale.len(),
        report.reached_count()
    ));

    output
}

fn format_observation(observation: &Observation) -> String {
    match observation {
        Observation::Amount {
            observed,
            limit,
            floor,
        } => {
            let kind = if *floor { "floor" } else { "ceiling" };
            format!("observed {} against {} {}", observed, kind, limit)
        }
        Observation::Percentage {
            observed_bps,
            limit_bps,
            direction,
        } => match observed_bps {
            Some(bps) => {
                let verb = match direction {
                    ThresholdDirection::RisesAbove => "trips at or above",
                    ThresholdDirection::FallsBelow => "trips at or below",
                };
                format!(
                    "observed {}, {} {}",
                    format_bps(*bps),
                    verb,
                    format_bps(*limit_bps)
                )
            }
            None => "no base figure to measure against".to_string(),
        },
        Observation::Deadline {
            deadline,
            completed,
        } => {
            if *completed {
                format!("due {}, completed", deadline)
            } else {
                format!("due {}, not completed", deadline)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BackstopScope, CostCode, Money, Project, Severity, Threshold,
    };
    use crate::services::BackstopEvaluation;
    use chrono::NaiveDate;

    fn code(s: &str) -> CostCode {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_empty_list() {
        assert!(format_backstop_list(&[]).contains("No backstops found"));
    }

    #[test]
    fn test_format_list() {
        let project = Project::new("Riverside");
        let backstop = Backstop::new(
            project.id,
            BackstopScope::ItemLine { code: code("2.1") },
            Threshold::amount(Money::from_cents(600_000)),
            Severity::High,
        )
        .with_note("watch the slab pour");

        let output = format_backstop_list(&[backstop]);
        assert!(output.contains("high"));
        assert!(output.contains("item line 2.1"));
        assert!(output.contains("$6000.00"));
        assert!(output.contains("watch the slab pour"));
    }

    #[test]
    fn test_format_report_markers() {
        let project = Project::new("Riverside");
        let reached = BackstopEvaluation {
            backstop: Backstop::new(
                project.id,
                BackstopScope::ItemLine { code: code("2.1") },
                Threshold::amount(Money::from_cents(600_000)),
                Severity::High,
            ),
            reached: true,
            observation: Observation::Amount {
                observed: Money::from_cents(620_000),
                limit: Money::from_cents(600_000),
                floor: false,
            },
        };
        let ok = BackstopEvaluation {
            backstop: Backstop::new(
                project.id,
                BackstopScope::ProjectProfit,
                Threshold::amount(Money::from_cents(-100_000)),
                Severity::Low,
            ),
            reached: false,
            observation: Observation::Amount {
                observed: Money::from_cents(80_000),
                limit: Money::from_cents(-100_000),
                floor: true,
            },
        };

        let report = BackstopReport {
            project,
            as_of: date(2025, 8, 20),
            evaluations: vec![reached, ok],
            stale: Vec::new(),
        };

        let output = format_backstop_report(&report);
        assert!(output.contains("[REACHED]"));
        assert!(output.contains("[ok]"));
        assert!(output.contains("observed $6200.00 against ceiling $6000.00"));
        assert!(output.contains("against floor"));
        assert!(output.contains("2 rule(s), 1 reached."));
    }

    #[test]
    fn test_format_report_stale_section() {
        let project = Project::new("Riverside");
        let stale = Backstop::new(
            project.id,
            BackstopScope::ItemLine { code: code("9.9") },
            Threshold::amount(Money::from_cents(100_000)),
            Severity::Medium,
        );

        let report = BackstopReport {
            project,
            as_of: date(2025, 8, 20),
            evaluations: Vec::new(),
            stale: vec![stale],
        };

        let output = format_backstop_report(&report);
        assert!(output.contains("Stale rules"));
        assert!(output.contains("item line 9.9"));
        assert!(output.contains("1 rule(s), 0 reached."));
    }

    #[test]
    fn test_format_percentage_without_base() {
        let observation = Observation::Percentage {
            observed_bps: None,
            limit_bps: 10_000,
            direction: ThresholdDirection::RisesAbove,
        };
        assert_eq!(
            format_observation(&observation),
            "no base figure to measure against"
        );
    }
}
