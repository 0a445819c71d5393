//! Financial event model
//!
//! Events are the append-only record of money movement: invoices received,
//! bills issued, payments in either direction. An event is applied to exactly
//! one vendor line and is never edited afterward. Corrections are new events
//! with negative amounts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::cost_code::CostCode;
use super::ids::{DocumentId, EventId, ProjectId};
use super::money::Money;

/// The four kinds of money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// A vendor invoiced us; drives the cost side
    Invoice,
    /// We billed the client; drives the revenue side
    Bill,
    /// The client paid us (against a bill)
    PaymentReceived,
    /// We paid a vendor (against an invoice)
    PaymentMade,
}

impl EventKind {
    /// Payments settle earlier invoices/bills rather than creating new ones
    pub fn is_payment(&self) -> bool {
        matches!(self, Self::PaymentReceived | Self::PaymentMade)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invoice => write!(f, "Invoice"),
            Self::Bill => write!(f, "Bill"),
            Self::PaymentReceived => write!(f, "Payment received"),
            Self::PaymentMade => write!(f, "Payment made"),
        }
    }
}

/// A document attached to an event (scanned invoice, receipt)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique identifier
    pub id: DocumentId,

    /// File or document name
    pub name: String,

    /// Document kind ("invoice", "receipt", "delivery-note", ...)
    pub kind: String,

    /// Amount stated on the document
    pub amount: Money,

    /// The node the document belongs to
    pub node: CostCode,

    /// Date on the document
    pub date: NaiveDate,
}

impl DocumentRecord {
    /// Create a new document record
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        amount: Money,
        node: CostCode,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            kind: kind.into(),
            amount,
            node,
            date,
        }
    }
}

/// One recorded money movement against a vendor line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialEvent {
    /// Unique identifier
    pub id: EventId,

    /// The project whose ledger this event belongs to
    pub project_id: ProjectId,

    /// The vendor line the event applies to
    pub node: CostCode,

    /// Kind of movement
    pub kind: EventKind,

    /// Amount; negative only for compensating corrections
    pub amount: Money,

    /// Date of the movement
    pub date: NaiveDate,

    /// Payment method ("wire", "check"), payments only
    pub method: Option<String>,

    /// Free-form note
    #[serde(default)]
    pub memo: String,

    /// Attached document, if one accompanied the event
    pub document: Option<DocumentRecord>,

    /// When the event was recorded
    pub recorded_at: DateTime<Utc>,
}

impl FinancialEvent {
    /// Create a new event
    pub fn new(
        project_id: ProjectId,
        node: CostCode,
        kind: EventKind,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: EventId::new(),
            project_id,
            node,
            kind,
            amount,
            date,
            method: None,
            memo: String::new(),
            document: None,
            recorded_at: Utc::now(),
        }
    }

    /// True for compensating corrections
    pub fn is_correction(&self) -> bool {
        self.amount.is_negative()
    }

    /// Validate the event before it is recorded
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.amount.is_zero() {
            return Err(EventValidationError::ZeroAmount);
        }
        if self.method.is_some() && !self.kind.is_payment() {
            return Err(EventValidationError::MethodOnNonPayment);
        }
        if let Some(doc) = &self.document {
            if doc.node != self.node {
                return Err(EventValidationError::DocumentNodeMismatch);
            }
        }
        Ok(())
    }
}

impl fmt::Display for FinancialEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} on {} {}",
            self.date.format("%Y-%m-%d"),
            self.kind,
            self.node,
            self.amount
        )
    }
}

/// Validation errors for financial events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    ZeroAmount,
    MethodOnNonPayment,
    DocumentNodeMismatch,
}

impl fmt::Display for EventValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroAmount => write!(f, "Event amount cannot be zero"),
            Self::MethodOnNonPayment => {
                write!(f, "Payment method only applies to payment events")
            }
            Self::DocumentNodeMismatch => {
                write!(f, "Attached document references a different node")
            }
        }
    }
}

impl std::error::Error for EventValidationError {}
