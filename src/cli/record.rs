//! Financial event CLI commands
//!
//! Implements the recording commands: invoices, bills, and payments in
//! both directions, with optional document attachments.

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::display::item_line::format_event_list;
use crate::error::{CostbookError, CostbookResult};
use crate::models::{CostCode, EventKind, Money};
use crate::services::{
    BackstopService, DocumentInput, EventInput, ReconciliationService, RecordedEvent,
};
use crate::storage::Storage;

/// Flags shared by all four recording commands
#[derive(Args)]
pub struct RecordArgs {
    /// Project name or ID prefix
    pub project: String,
    /// Vendor line cost code
    pub code: String,
    /// Amount (e.g., "300.00"; negative for a correction)
    pub amount: String,
    /// Event date (YYYY-MM-DD, defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,
    /// Payment method ("wire", "check"), payments only
    #[arg(short, long)]
    pub method: Option<String>,
    /// Free-form note
    #[arg(long)]
    pub memo: Option<String>,
    /// Attached document name
    #[arg(long)]
    pub doc_name: Option<String>,
    /// Attached document kind (defaults per event kind)
    #[arg(long)]
    pub doc_kind: Option<String>,
    /// Amount stated on the document (defaults to the event amount)
    #[arg(long)]
    pub doc_amount: Option<String>,
    /// Date on the document (defaults to the event date)
    #[arg(long)]
    pub doc_date: Option<String>,
}

/// Recording subcommands
#[derive(Subcommand)]
pub enum RecordCommands {
    /// Record a vendor invoice (drives the cost side)
    Invoice(RecordArgs),
    /// Record a bill issued to the client (drives the revenue side)
    Bill(RecordArgs),
    /// Record a payment received from the client
    PaymentReceived(RecordArgs),
    /// Record a payment made to a vendor
    PaymentMade(RecordArgs),
    /// List a project's recorded events
    List {
        /// Project name or ID prefix
        project: String,
        /// Narrow to one cost code (a category covers its subtree)
        #[arg(short, long)]
        node: Option<String>,
    },
}

/// Handle a recording command
pub fn handle_record_command(storage: &Storage, cmd: RecordCommands) -> CostbookResult<()> {
    let service = ReconciliationService::new(storage);

    match cmd {
        RecordCommands::Invoice(args) => {
            let project = args.project.clone();
            let recorded = record(&service, EventKind::Invoice, args)?;
            print_recorded(&recorded);
            warn_reached_backstops(storage, &project)?;
        }
        RecordCommands::Bill(args) => {
            let project = args.project.clone();
            let recorded = record(&service, EventKind::Bill, args)?;
            print_recorded(&recorded);
            warn_reached_backstops(storage, &project)?;
        }
        RecordCommands::PaymentReceived(args) => {
            let project = args.project.clone();
            let recorded = record(&service, EventKind::PaymentReceived, args)?;
            print_recorded(&recorded);
            warn_reached_backstops(storage, &project)?;
        }
        RecordCommands::PaymentMade(args) => {
            let project = args.project.clone();
            let recorded = record(&service, EventKind::PaymentMade, args)?;
            print_recorded(&recorded);
            warn_reached_backstops(storage, &project)?;
        }
        RecordCommands::List { project, node } => {
            let node = node
                .map(|s| {
                    s.parse::<CostCode>()
                        .map_err(|e| CostbookError::Validation(format!("{}", e)))
                })
                .transpose()?;
            let events = service.history(&project, node.as_ref())?;
            print!("{}", format_event_list(&events));
        }
    }

    Ok(())
}

fn record(
    service: &ReconciliationService,
    kind: EventKind,
    args: RecordArgs,
) -> CostbookResult<RecordedEvent> {
    let node: CostCode = args
        .code
        .parse()
        .map_err(|e| CostbookError::Validation(format!("{}", e)))?;
    let amount = parse_money(&args.amount)?;
    let date = match args.date {
        Some(s) => parse_date(&s)?,
        None => chrono::Local::now().date_naive(),
    };

    let mut input = EventInput::new(node, kind, amount, date);
    input.method = args.method;
    input.memo = args.memo;
    input.document = build_document(
        kind,
        args.doc_name,
        args.doc_kind,
        args.doc_amount,
        args.doc_date,
    )?;

    service.record(&args.project, input)
}

/// Assemble the document flags; any `--doc-*` flag without a name is an error
fn build_document(
    kind: EventKind,
    name: Option<String>,
    doc_kind: Option<String>,
    amount: Option<String>,
    date: Option<String>,
) -> CostbookResult<Option<DocumentInput>> {
    let name = match name {
        Some(name) => name,
        None => {
            if doc_kind.is_some() || amount.is_some() || date.is_some() {
                return Err(CostbookError::Validation(
                    "Document flags require --doc-name".to_string(),
                ));
            }
            return Ok(None);
        }
    };

    let default_kind = match kind {
        EventKind::Invoice => "invoice",
        EventKind::Bill => "bill",
        EventKind::PaymentReceived | EventKind::PaymentMade => "receipt",
    };

    Ok(Some(DocumentInput {
        name,
        kind: doc_kind.unwrap_or_else(|| default_kind.to_string()),
        amount: amount.map(|s| parse_money(&s)).transpose()?,
        date: date.map(|s| parse_date(&s)).transpose()?,
    }))
}

/// Check the project's backstops against the new ledger state
fn warn_reached_backstops(storage: &Storage, project: &str) -> CostbookResult<()> {
    let service = BackstopService::new(storage);
    let report = service.evaluate(project, chrono::Local::now().date_naive())?;

    if report.reached_count() > 0 {
        println!(
            "\nWarning: {} backstop(s) reached. Run 'costbook backstop eval \"{}\"' for details.",
            report.reached_count(),
            project
        );
    }

    Ok(())
}

fn print_recorded(recorded: &RecordedEvent) {
    let event = &recorded.event;
    println!("Recorded {}: {} on {}", event.kind, event.amount, event.node);

    match event.kind {
        EventKind::Invoice => {
            println!(
                "  Invoiced:    {} -> {}",
                recorded.before.invoiced, recorded.after.invoiced
            );
            println!("  Actual Cost: {}", recorded.after.actual_cost);
        }
        EventKind::Bill => {
            println!(
                "  Billed:         {} -> {}",
                recorded.before.billed, recorded.after.billed
            );
            println!("  Actual Revenue: {}", recorded.after.actual_revenue);
        }
        EventKind::PaymentReceived => {
            println!(
                "  Paid: {} -> {}",
                recorded.before.paid, recorded.after.paid
            );
        }
        EventKind::PaymentMade => {
            println!(
                "  Payments: {} -> {}",
                recorded.before.payments, recorded.after.payments
            );
        }
    }

    if let Some(doc) = &event.document {
        println!("  Document: {} ({})", doc.name, doc.kind);
    }
}

fn parse_money(s: &str) -> CostbookResult<Money> {
    Money::parse(s).map_err(|e| {
        CostbookError::Validation(format!(
            "Invalid amount '{}': {}. Use format like '300.00' or '-300.00'",
            s, e
        ))
    })
}

fn parse_date(s: &str) -> CostbookResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        CostbookError::Validation(format!("Invalid date format: '{}'. Use YYYY-MM-DD", s))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CostbookPaths;
    use crate::models::{ItemLineNode, Project};
    use crate::services::aggregation;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CostbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed_project(storage: &Storage) {
        let project = Project::new("Riverside Office Park");
        storage.projects.upsert(project.clone()).unwrap();
        storage.ledgers.ensure(project.id).unwrap();

        storage
            .ledgers
            .with_mut(project.id, |hierarchy| {
                let start = date(2025, 8, 1);
                hierarchy
                    .insert(ItemLineNode::new(
                        "2".parse().unwrap(),
                        "Concrete Works",
                        true,
                        start,
                        date(2025, 9, 30),
                    ))
                    .map_err(|e| CostbookError::Ledger(e.to_string()))?;
                hierarchy
                    .insert(ItemLineNode::new(
                        "2.1".parse().unwrap(),
                        "Foundation",
                        false,
                        start,
                        date(2025, 8, 15),
                    ))
                    .map_err(|e| CostbookError::Ledger(e.to_string()))?;
                aggregation::aggregate(hierarchy)
                    .map_err(|_| CostbookError::Ledger("aggregation failed".into()))?;
                Ok(())
            })
            .unwrap();
    }

    fn args(amount: &str) -> RecordArgs {
        RecordArgs {
            project: "Riverside Office Park".to_string(),
            code: "2.1".to_string(),
            amount: amount.to_string(),
            date: Some("2025-08-18".to_string()),
            method: None,
            memo: None,
            doc_name: None,
            doc_kind: None,
            doc_amount: None,
            doc_date: None,
        }
    }

    #[test]
    fn test_record_invoice_moves_the_ledger() {
        let (_temp_dir, storage) = create_test_storage();
        seed_project(&storage);

        handle_record_command(&storage, RecordCommands::Invoice(args("300.00"))).unwrap();

        let service = crate::services::ItemLineService::new(&storage);
        let node = service
            .get("Riverside Office Park", &"2.1".parse().unwrap())
            .unwrap();
        assert_eq!(node.invoiced, Money::from_cents(30_000));
        assert_eq!(node.actual_cost, Money::from_cents(30_000));
    }

    #[test]
    fn test_document_flags_require_a_name() {
        let (_temp_dir, storage) = create_test_storage();
        seed_project(&storage);

        let mut invoice_args = args("300.00");
        invoice_args.doc_kind = Some("invoice".to_string());

        let err = handle_record_command(&storage, RecordCommands::Invoice(invoice_args))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_document_kind_defaults_by_event() {
        let document = build_document(
            EventKind::PaymentMade,
            Some("wire-confirmation.pdf".to_string()),
            None,
            None,
            None,
        )
        .unwrap()
        .unwrap();
        assert_eq!(document.kind, "receipt");
    }
}
