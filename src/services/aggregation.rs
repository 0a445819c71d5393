//! Ledger aggregation
//!
//! Rolls the eight money fields up from vendor leaves through every category
//! level. The pass runs inside the same write-lock section as the mutation
//! that made it necessary (see `LedgerRepository::with_mut`), so readers only
//! ever observe fully-aggregated snapshots.

use crate::models::{Hierarchy, IntegrityIssue, Money};

/// Re-derive every category's money fields from its direct children.
///
/// Walks the hierarchy post-order so each category sums children that are
/// already resolved. Structural problems (dangling parents, cycles) abort
/// the pass before any node is modified.
pub fn aggregate(hierarchy: &mut Hierarchy) -> Result<(), Vec<IntegrityIssue>> {
    let issues = hierarchy.integrity_issues();
    if !issues.is_empty() {
        return Err(issues);
    }

    for code in hierarchy.post_order_codes() {
        let is_category = match hierarchy.get(&code) {
            Some(node) => node.is_category,
            None => continue,
        };
        if !is_category {
            continue;
        }

        let children = hierarchy.children_of(&code);
        let estimated_cost: Money = children.iter().map(|c| c.estimated_cost).sum();
        let actual_cost: Money = children.iter().map(|c| c.actual_cost).sum();
        let estimated_revenue: Money = children.iter().map(|c| c.estimated_revenue).sum();
        let actual_revenue: Money = children.iter().map(|c| c.actual_revenue).sum();
        let invoiced: Money = children.iter().map(|c| c.invoiced).sum();
        let paid: Money = children.iter().map(|c| c.paid).sum();
        let billed: Money = children.iter().map(|c| c.billed).sum();
        let payments: Money = children.iter().map(|c| c.payments).sum();

        if let Some(node) = hierarchy.get_mut(&code) {
            node.estimated_cost = estimated_cost;
            node.actual_cost = actual_cost;
            node.estimated_revenue = estimated_revenue;
            node.actual_revenue = actual_revenue;
            node.invoiced = invoiced;
            node.paid = paid;
            node.billed = billed;
            node.payments = payments;
        }
    }

    Ok(())
}

/// Join integrity issues into the detail line of an integrity error
pub fn describe_issues(issues: &[IntegrityIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Whole-project totals: the level-zero rollup over root categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectTotals {
    pub estimated_cost: Money,
    pub actual_cost: Money,
    pub estimated_revenue: Money,
    pub actual_revenue: Money,
    pub invoiced: Money,
    pub paid: Money,
    pub billed: Money,
    pub payments: Money,
}

impl ProjectTotals {
    pub fn estimated_profit(&self) -> Money {
        self.estimated_revenue - self.estimated_cost
    }

    pub fn actual_profit(&self) -> Money {
        self.actual_revenue - self.actual_cost
    }

    /// Cash position: payments received minus payments made
    pub fn net_cash(&self) -> Money {
        self.paid - self.payments
    }

    /// Billed to the client but not yet paid by them
    pub fn outstanding_receivable(&self) -> Money {
        self.billed - self.paid
    }

    /// Invoiced by vendors but not yet paid to them
    pub fn outstanding_payable(&self) -> Money {
        self.invoiced - self.payments
    }

    /// Actual profit over actual revenue, in basis points
    pub fn margin_bps(&self) -> Option<i64> {
        self.actual_profit().ratio_bps(self.actual_revenue)
    }

    /// Actual cost over estimated cost, in basis points
    pub fn cost_ratio_bps(&self) -> Option<i64> {
        self.actual_cost.ratio_bps(self.estimated_cost)
    }

    /// Payments received over invoiced total, in basis points
    pub fn cash_coverage_bps(&self) -> Option<i64> {
        self.paid.ratio_bps(self.invoiced)
    }
}

/// Sum the rollup fields over root categories. Expects an aggregated tree;
/// run after [`aggregate`], never in the middle of a mutation.
pub fn project_totals(hierarchy: &Hierarchy) -> ProjectTotals {
    let roots = hierarchy.roots();
    ProjectTotals {
        estimated_cost: roots.iter().map(|n| n.estimated_cost).sum(),
        actual_cost: roots.iter().map(|n| n.actual_cost).sum(),
        estimated_revenue: roots.iter().map(|n| n.estimated_revenue).sum(),
        actual_revenue: roots.iter().map(|n| n.actual_revenue).sum(),
        invoiced: roots.iter().map(|n| n.invoiced).sum(),
        paid: roots.iter().map(|n| n.paid).sum(),
        billed: roots.iter().map(|n| n.billed).sum(),
        payments: roots.iter().map(|n| n.payments).sum(),
    }
}
