//! Item line model
//!
//! An item line is one node in a project's cost hierarchy: either a category
//! (levels 1-3, money fields derived from children) or a vendor line (a leaf
//! that carries its own estimates and receives financial events).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::cost_code::CostCode;
use super::money::Money;
use super::status::{schedule_status, ItemStatus, ScheduleStatus};

/// Deepest level a cost code may reach (vendor lines under sub-subcategories)
pub const MAX_LEVEL: u8 = 4;

/// One node in the cost hierarchy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemLineNode {
    /// System-assigned cost code, unique within the project
    pub code: CostCode,

    /// Parent cost code (None for root categories)
    pub parent: Option<CostCode>,

    /// Display name ("Concrete Works", "Foundation")
    pub name: String,

    /// Hierarchy level, 1 for roots; always equals the code's segment count
    pub level: u8,

    /// Categories aggregate children; vendor lines carry their own figures
    pub is_category: bool,

    /// Vendor name; inherited from the nearest ancestor at creation when absent
    pub vendor: Option<String>,

    /// Unit of measure ("m3", "hrs"), informational
    #[serde(default)]
    pub unit: String,

    /// Quantity in the given unit
    #[serde(default)]
    pub quantity: i64,

    /// Price per unit
    #[serde(default)]
    pub unit_price: Money,

    /// Estimated cost (budget side)
    #[serde(default)]
    pub estimated_cost: Money,

    /// Actual cost; kept equal to the invoiced total by the recorder
    #[serde(default)]
    pub actual_cost: Money,

    /// Estimated revenue (contract side)
    #[serde(default)]
    pub estimated_revenue: Money,

    /// Actual revenue; kept equal to the billed total by the recorder
    #[serde(default)]
    pub actual_revenue: Money,

    /// Running total of invoices received against this line
    #[serde(default)]
    pub invoiced: Money,

    /// Running total of payments received (against bills we issued)
    #[serde(default)]
    pub paid: Money,

    /// Running total of bills we issued
    #[serde(default)]
    pub billed: Money,

    /// Running total of payments we made (against invoices received)
    #[serde(default)]
    pub payments: Money,

    /// Scheduled start date
    pub start_date: NaiveDate,

    /// Scheduled due date (never before the start date)
    pub due_date: NaiveDate,

    /// Optional scheduling dependency on another node, informational only
    pub depends_on: Option<CostCode>,

    /// Lifecycle status
    #[serde(default)]
    pub status: ItemStatus,

    /// Completion flag, kept in sync with the status
    #[serde(default)]
    pub is_completed: bool,

    /// Additions under this node after the project baseline
    #[serde(default)]
    pub change_orders: u32,

    /// When the node was created
    pub created_at: DateTime<Utc>,

    /// When the node was last modified
    pub updated_at: DateTime<Utc>,
}

impl ItemLineNode {
    /// Create a new node; the level and parent come from the code itself
    pub fn new(
        code: CostCode,
        name: impl Into<String>,
        is_category: bool,
        start_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            parent: code.parent(),
            level: code.level(),
            code,
            name: name.into(),
            is_category,
            vendor: None,
            unit: String::new(),
            quantity: 0,
            unit_price: Money::zero(),
            estimated_cost: Money::zero(),
            actual_cost: Money::zero(),
            estimated_revenue: Money::zero(),
            actual_revenue: Money::zero(),
            invoiced: Money::zero(),
            paid: Money::zero(),
            billed: Money::zero(),
            payments: Money::zero(),
            start_date,
            due_date,
            depends_on: None,
            status: ItemStatus::NotStarted,
            is_completed: false,
            change_orders: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the lifecycle status, keeping the completion flag in sync
    pub fn set_status(&mut self, status: ItemStatus) {
        self.status = status;
        self.is_completed = status.is_complete();
        self.updated_at = Utc::now();
    }

    /// Mark complete
    pub fn complete(&mut self) {
        self.set_status(ItemStatus::Completed);
    }

    /// Reopen a completed item
    pub fn reopen(&mut self) {
        self.set_status(ItemStatus::InProgress);
    }

    /// Derived schedule status for a given day
    pub fn schedule_status(&self, today: NaiveDate) -> ScheduleStatus {
        schedule_status(self.start_date, self.due_date, self.is_completed, today)
    }

    /// Actual cost over estimate (positive means over budget)
    pub fn cost_variance(&self) -> Money {
        self.actual_cost - self.estimated_cost
    }

    /// Bump the modification timestamp after a field edit
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validate internal consistency
    pub fn validate(&self) -> Result<(), ItemLineValidationError> {
        if self.name.trim().is_empty() {
            return Err(ItemLineValidationError::EmptyName);
        }

        if self.level < 1 || self.level > MAX_LEVEL {
            return Err(ItemLineValidationError::LevelOutOfRange(self.level));
        }

        if self.level != self.code.level() {
            return Err(ItemLineValidationError::LevelMismatch {
                level: self.level,
                code_level: self.code.level(),
            });
        }

        if self.parent != self.code.parent() {
            return Err(ItemLineValidationError::ParentMismatch);
        }

        // Roots are always categories; the deepest level is always a leaf
        if self.level == 1 && !self.is_category {
            return Err(ItemLineValidationError::RootMustBeCategory);
        }
        if self.level == MAX_LEVEL && self.is_category {
            return Err(ItemLineValidationError::CategoryTooDeep);
        }

        if self.due_date < self.start_date {
            return Err(ItemLineValidationError::DatesReversed {
                start: self.start_date,
                due: self.due_date,
            });
        }

        for (field, amount) in self.money_fields() {
            if amount.is_negative() {
                return Err(ItemLineValidationError::NegativeAmount { field });
            }
        }

        if self.quantity < 0 {
            return Err(ItemLineValidationError::NegativeQuantity(self.quantity));
        }

        if self.is_completed != self.status.is_complete() {
            return Err(ItemLineValidationError::CompletionOutOfSync);
        }

        if self.depends_on.as_ref() == Some(&self.code) {
            return Err(ItemLineValidationError::SelfDependency);
        }

        Ok(())
    }

    /// All rollup money fields, named for diagnostics and aggregation
    pub fn money_fields(&self) -> [(&'static str, Money); 8] {
        [
            ("estimated_cost", self.estimated_cost),
            ("actual_cost", self.actual_cost),
            ("estimated_revenue", self.estimated_revenue),
            ("actual_revenue", self.actual_revenue),
            ("invoiced", self.invoiced),
            ("paid", self.paid),
            ("billed", self.billed),
            ("payments", self.payments),
        ]
    }
}

impl fmt::Display for ItemLineNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.code, self.name, self.status)
    }
}

/// Validation errors for item lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemLineValidationError {
    EmptyName,
    LevelOutOfRange(u8),
    LevelMismatch { level: u8, code_level: u8 },
    ParentMismatch,
    RootMustBeCategory,
    CategoryTooDeep,
    DatesReversed { start: NaiveDate, due: NaiveDate },
    NegativeAmount { field: &'static str },
    NegativeQuantity(i64),
    CompletionOutOfSync,
    SelfDependency,
}

impl fmt::Display for ItemLineValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Item line name cannot be empty"),
            Self::LevelOutOfRange(level) => {
                write!(f, "Level {} is outside the range 1-{}", level, MAX_LEVEL)
            }
            Self::LevelMismatch { level, code_level } => write!(
                f,
                "Stored level {} does not match cost code depth {}",
                level, code_level
            ),
            Self::ParentMismatch => {
                write!(f, "Stored parent does not match the cost code's parent")
            }
            Self::RootMustBeCategory => write!(f, "Root item lines must be categories"),
            Self::CategoryTooDeep => write!(
                f,
                "Categories cannot sit at level {}; the deepest level is vendor lines only",
                MAX_LEVEL
            ),
            Self::DatesReversed { start, due } => {
                write!(f, "Due date {} is before start date {}", due, start)
            }
            Self::NegativeAmount { field } => {
                write!(f, "Money field '{}' cannot be negative", field)
            }
            Self::NegativeQuantity(q) => write!(f, "Quantity cannot be negative (got {})", q),
            Self::CompletionOutOfSync => {
                write!(f, "Completion flag does not match the lifecycle status")
            }
            Self::SelfDependency => write!(f, "An item line cannot depend on itself"),
        }
    }
}

impl std::error::Error for ItemLineValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CostCode {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn leaf() -> ItemLineNode {
        ItemLineNode::new(
            code("2.1"),
            "Foundation",
            false,
            date(2025, 8, 1),
            date(2025, 8, 20),
        )
    }

    #[test]
    fn test_new_derives_structure_from_code() {
        let node = leaf();
        assert_eq!(node.level, 2);
        assert_eq!(node.parent, Some(code("2")));
        assert!(!node.is_category);
        assert_eq!(node.status, ItemStatus::NotStarted);
        assert!(!node.is_completed);
        assert!(node.validate().is_ok());
    }

    #[test]
    fn test_root_creation() {
        let node = ItemLineNode::new(
            code("2"),
            "Concrete Works",
            true,
            date(2025, 8, 1),
            date(2025, 9, 30),
        );
        assert_eq!(node.level, 1);
        assert_eq!(node.parent, None);
        assert!(node.validate().is_ok());
    }

    #[test]
    fn test_status_sync() {
        let mut node = leaf();
        node.complete();
        assert_eq!(node.status, ItemStatus::Completed);
        assert!(node.is_completed);

        node.reopen();
        assert_eq!(node.status, ItemStatus::InProgress);
        assert!(!node.is_completed);
    }

    #[test]
    fn test_completion_out_of_sync_rejected() {
        let mut node = leaf();
        node.is_completed = true;
        assert_eq!(
            node.validate(),
            Err(ItemLineValidationError::CompletionOutOfSync)
        );
    }

    #[test]
    fn test_dates_reversed_rejected() {
        let node = ItemLineNode::new(
            code("2.1"),
            "Foundation",
            false,
            date(2025, 8, 20),
            date(2025, 8, 1),
        );
        assert!(matches!(
            node.validate(),
            Err(ItemLineValidationError::DatesReversed { .. })
        ));
    }

    #[test]
    fn test_negative_money_rejected() {
        let mut node = leaf();
        node.invoiced = Money::from_cents(-100);
        assert_eq!(
            node.validate(),
            Err(ItemLineValidationError::NegativeAmount { field: "invoiced" })
        );
    }

    #[test]
    fn test_root_must_be_category() {
        let node = ItemLineNode::new(
            code("2"),
            "Concrete Works",
            false,
            date(2025, 8, 1),
            date(2025, 9, 30),
        );
        assert_eq!(
            node.validate(),
            Err(ItemLineValidationError::RootMustBeCategory)
        );
    }

    #[test]
    fn test_level_four_cannot_be_category() {
        let node = ItemLineNode::new(
            code("1.1.1.2"),
            "Rebar supply",
            true,
            date(2025, 8, 1),
            date(2025, 8, 20),
        );
        assert_eq!(
            node.validate(),
            Err(ItemLineValidationError::CategoryTooDeep)
        );
    }

    #[test]
    fn test_self_dependency_rejected() {
        let mut node = leaf();
        node.depends_on = Some(node.code.clone());
        assert_eq!(
            node.validate(),
            Err(ItemLineValidationError::SelfDependency)
        );
    }

    #[test]
    fn test_cost_variance() {
        let mut node = leaf();
        node.estimated_cost = Money::from_cents(600_000);
        node.actual_cost = Money::from_cents(650_000);
        assert_eq!(node.cost_variance(), Money::from_cents(50_000));

        node.actual_cost = Money::from_cents(550_000);
        assert_eq!(node.cost_variance(), Money::from_cents(-50_000));
    }

    #[test]
    fn test_schedule_status_delegates() {
        let node = leaf();
        assert_eq!(
            node.schedule_status(date(2025, 7, 31)),
            ScheduleStatus::Planned
        );
        assert_eq!(
            node.schedule_status(date(2025, 8, 21)),
            ScheduleStatus::AlreadyDue
        );
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut node = leaf();
        node.vendor = Some("Acme Concrete".into());
        node.estimated_cost = Money::from_cents(600_000);

        let json = serde_json::to_string(&node).unwrap();
        let back: ItemLineNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, node.code);
        assert_eq!(back.vendor, node.vendor);
        assert_eq!(back.estimated_cost, node.estimated_cost);
    }
}
