//! Reconciliation service
//!
//! Records money movement against vendor lines and keeps the reconciled
//! totals on each node in step with the event log. An event is applied to
//! exactly one vendor line, is append-only once recorded, and triggers a
//! full re-aggregation so every ancestor reflects it immediately.

use chrono::NaiveDate;

use crate::audit::EntityType;
use crate::error::{CostbookError, CostbookResult};
use crate::models::{
    CostCode, DocumentRecord, EventKind, FinancialEvent, ItemLineNode, Money, Project,
};
use crate::services::aggregation;
use crate::storage::Storage;

/// Service for recording financial events
pub struct ReconciliationService<'a> {
    storage: &'a Storage,
}

/// Input for recording an event against a vendor line
#[derive(Debug, Clone)]
pub struct EventInput {
    pub node: CostCode,
    pub kind: EventKind,
    pub amount: Money,
    pub date: NaiveDate,
    pub method: Option<String>,
    pub memo: Option<String>,
    pub document: Option<DocumentInput>,
}

impl EventInput {
    /// A bare event; callers fill in the optional fields
    pub fn new(node: CostCode, kind: EventKind, amount: Money, date: NaiveDate) -> Self {
        Self {
            node,
            kind,
            amount,
            date,
            method: None,
            memo: None,
            document: None,
        }
    }
}

/// Document details attached at recording time
///
/// Amount and date default to the event's own when omitted.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub name: String,
    pub kind: String,
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
}

/// A recorded event plus the vendor line it moved
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub event: FinancialEvent,
    pub before: ItemLineNode,
    pub after: ItemLineNode,
}

impl<'a> ReconciliationService<'a> {
    /// Create a new reconciliation service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn find_project(&self, project: &str) -> CostbookResult<Project> {
        self.storage
            .projects
            .find(project)?
            .ok_or_else(|| CostbookError::project_not_found(project))
    }

    /// Record a money movement against a vendor line
    ///
    /// The event and the node totals commit together: if applying the amount
    /// or re-aggregating fails, nothing is stored and nothing is logged.
    pub fn record(&self, project: &str, input: EventInput) -> CostbookResult<RecordedEvent> {
        let project = self.find_project(project)?;
        let project_name = project.name.clone();

        let mut event = FinancialEvent::new(
            project.id,
            input.node.clone(),
            input.kind,
            input.amount,
            input.date,
        );
        event.method = input
            .method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from);
        if let Some(memo) = &input.memo {
            event.memo = memo.trim().to_string();
        }
        if let Some(doc) = &input.document {
            event.document = Some(DocumentRecord::new(
                doc.name.trim(),
                doc.kind.trim(),
                doc.amount.unwrap_or(input.amount),
                input.node.clone(),
                doc.date.unwrap_or(input.date),
            ));
        }
        event
            .validate()
            .map_err(|e| CostbookError::Validation(e.to_string()))?;

        let kind = event.kind;
        let amount = event.amount;
        let (before, after) = self.storage.ledgers.with_mut(project.id, |hierarchy| {
            let node = hierarchy
                .get_mut(&input.node)
                .ok_or_else(|| CostbookError::item_line_not_found(input.node.to_string()))?;

            if node.is_category {
                return Err(CostbookError::Validation(format!(
                    "{} is a category; events are recorded against vendor lines",
                    node.code
                )));
            }

            let before = node.clone();
            apply_event(node, kind, amount)?;
            node.touch();
            let after = node.clone();

            aggregation::aggregate(hierarchy).map_err(|issues| {
                CostbookError::integrity(
                    project_name.clone(),
                    aggregation::describe_issues(&issues),
                )
            })?;

            Ok((before, after))
        })?;

        self.storage.events.append(event.clone())?;
        self.storage.ledgers.save()?;
        self.storage.events.save()?;

        self.storage.log_create(
            EntityType::FinancialEvent,
            event.id.to_string(),
            Some(format!("{} on {}", event.kind, event.node)),
            &event,
        )?;

        Ok(RecordedEvent {
            event,
            before,
            after,
        })
    }

    /// Event history for a project, optionally narrowed to one node. A
    /// category code covers its subtree.
    pub fn history(
        &self,
        project: &str,
        node: Option<&CostCode>,
    ) -> CostbookResult<Vec<FinancialEvent>> {
        let project = self.find_project(project)?;
        match node {
            Some(code) => self.storage.events.for_node(project.id, code),
            None => self.storage.events.for_project(project.id),
        }
    }
}

/// Apply one event to the vendor line's running totals
///
/// Invoices drive the cost side (invoiced and actual cost move together);
/// bills drive the revenue side the same way. Payments only move their own
/// total. A correction may reduce a total but never below zero.
fn apply_event(node: &mut ItemLineNode, kind: EventKind, amount: Money) -> CostbookResult<()> {
    match kind {
        EventKind::Invoice => {
            let total = node.invoiced + amount;
            if total.is_negative() {
                return Err(correction_error("invoiced", node.invoiced, amount));
            }
            node.invoiced = total;
            node.actual_cost = total;
        }
        EventKind::Bill => {
            let total = node.billed + amount;
            if total.is_negative() {
                return Err(correction_error("billed", node.billed, amount));
            }
            node.billed = total;
            node.actual_revenue = total;
        }
        EventKind::PaymentReceived => {
            let total = node.paid + amount;
            if total.is_negative() {
                return Err(correction_error("paid", node.paid, amount));
            }
            node.paid = total;
        }
        EventKind::PaymentMade => {
            let total = node.payments + amount;
            if total.is_negative() {
                return Err(correction_error("payments", node.payments, amount));
            }
            node.payments = total;
        }
    }
    Ok(())
}

fn correction_error(field: &str, current: Money, amount: Money) -> CostbookError {
    CostbookError::Ledger(format!(
        "Correction of {} would drive {} below zero (current total is {})",
        amount, field, current
    ))
}
