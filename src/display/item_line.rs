//! Item line display formatting
//!
//! Formats the cost hierarchy and its financial events for terminal output.

use chrono::NaiveDate;

use crate::models::{FinancialEvent, ItemLineNode};

/// Format item lines as an indented hierarchy table
pub fn format_item_line_list(nodes: &[ItemLineNode], today: NaiveDate) -> String {
    if nodes.is_empty() {
        return "No item lines found.\n\nAdd one with 'costbook item add-category'.".to_string();
    }

    let name_width = nodes
        .iter()
        .map(|n| n.name.len() + (n.level as usize - 1) * 2)
        .max()
        .unwrap_or(4)
        .max(4);
    let code_width = nodes
        .iter()
        .map(|n| n.code.to_string().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<code_width$}  {:<name_width$}  {:>12}  {:>12}  {:>12}  {}\n",
        "Code", "Name", "Est. Cost", "Actual", "Variance", "Schedule"
    ));
    output.push_str(&format!(
        "{:-<code_width$}  {:-<name_width$}  {:->12}  {:->12}  {:->12}  {:-<12}\n",
        "", "", "", "", "", ""
    ));

    for node in nodes {
        let indent = "  ".repeat(node.level as usize - 1);
        let name = format!("{}{}", indent, node.name);
        let variance = node.cost_variance();
        let marker = if variance.is_positive() { " *" } else { "" };

        output.push_str(&format!(
            "{:<code_width$}  {:<name_width$}  {:>12}  {:>12}  {:>12}  {}{}\n",
            node.code.to_string(),
            name,
            node.estimated_cost.to_string(),
            node.actual_cost.to_string(),
            variance.to_string(),
            node.schedule_status(today),
            marker
        ));
    }

    output.push_str("\n  * actual cost over estimate\n");
    output
}

/// Format full details for one item line
pub fn format_item_line_details(node: &ItemLineNode, today: NaiveDate) -> String {
    let mut output = String::new();

    output.push_str(&format!("Item Line: {}\n", node.name));
    output.push_str(&format!("  Code:          {}\n", node.code));
    output.push_str(&format!(
        "  Type:          {}\n",
        if node.is_category { "Category" } else { "Vendor line" }
    ));

    if let Some(vendor) = &node.vendor {
        output.push_str(&format!("  Vendor:        {}\n", vendor));
    }
    if !node.unit.is_empty() {
        output.push_str(&format!(
            "  Quantity:      {} {} @ {}\n",
            node.quantity, node.unit, node.unit_price
        ));
    }

    output.push('\n');
    output.push_str(&format!("  Est. Cost:     {}\n", node.estimated_cost));
    output.push_str(&format!("  Actual Cost:   {}\n", node.actual_cost));
    output.push_str(&format!("  Cost Variance: {}\n", node.cost_variance()));
    output.push_str(&format!("  Est. Revenue:  {}\n", node.estimated_revenue));
    output.push_str(&format!("  Actual Rev.:   {}\n", node.actual_revenue));

    output.push('\n');
    output.push_str(&format!("  Invoiced:      {}\n", node.invoiced));
    output.push_str(&format!("  Payments Made: {}\n", node.payments));
    output.push_str(&format!("  Billed:        {}\n", node.billed));
    output.push_str(&format!("  Paid:          {}\n", node.paid));

    output.push('\n');
    output.push_str(&format!(
        "  Schedule:      {} to {} ({})\n",
        node.start_date,
        node.due_date,
        node.schedule_status(today)
    ));
    output.push_str(&format!("  Status:        {}\n", node.status));
    if let Some(dep) = &node.depends_on {
        output.push_str(&format!("  Depends On:    {}\n", dep));
    }
    if node.change_orders > 0 {
        output.push_str(&format!("  Change Orders: {}\n", node.change_orders));
    }

    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        node.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        node.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

/// Format a list of financial events, newest last
pub fn format_event_list(events: &[FinancialEvent]) -> String {
    if events.is_empty() {
        return "No events recorded.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<16}  {:<8}  {:>12}  {}\n",
        "Date", "Kind", "Node", "Amount", "Memo"
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<16}  {:-<8}  {:->12}  {:-<20}\n",
        "", "", "", "", ""
    ));

    for event in events {
        let mut detail = event.memo.clone();
        if let Some(method) = &event.method {
            if detail.is_empty() {
                detail = format!("via {}", method);
            } else {
                detail = format!("{} (via {})", detail, method);
            }
        }
        if let Some(doc) = &event.document {
            if !detail.is_empty() {
                detail.push_str("; ");
            }
            detail.push_str(&format!("doc: {}", doc.name));
        }

        output.push_str(&format!(
            "{:<12}  {:<16}  {:<8}  {:>12}  {}\n",
            event.date.to_string(),
            event.kind.to_string(),
            event.node.to_string(),
            event.amount.to_string(),
            detail
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CostCode, EventKind, Money, ProjectId};

    fn code(s: &str) -> CostCode {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_empty_list() {
        let output = format_item_line_list(&[], date(2025, 8, 20));
        assert!(output.contains("No item lines found"));
    }

    #[test]
    fn test_format_list_indents_by_level() {
        let root = ItemLineNode::new(
            code("1"),
            "Groundwork",
            true,
            date(2025, 8, 1),
            date(2025, 9, 30),
        );
        let mut leaf = ItemLineNode::new(
            code("1.1"),
            "Excavation",
            false,
            date(2025, 8, 1),
            date(2025, 8, 15),
        );
        leaf.estimated_cost = Money::from_cents(100_000);
        leaf.actual_cost = Money::from_cents(120_000);

        let output = format_item_line_list(&[root, leaf], date(2025, 8, 20));
        assert!(output.contains("Groundwork"));
        assert!(output.contains("  Excavation"));
        assert!(output.contains("$1200.00"));
        // Over estimate earns the marker
        assert!(output.contains("*"));
        assert!(output.contains("Already due"));
    }

    #[test]
    fn test_format_details() {
        let mut node = ItemLineNode::new(
            code("1.1"),
            "Excavation",
            false,
            date(2025, 8, 1),
            date(2025, 8, 15),
        );
        node.vendor = Some("DigCo".to_string());
        node.unit = "m3".to_string();
        node.quantity = 40;
        node.unit_price = Money::from_cents(2_500);
        node.depends_on = Some(code("1.2"));

        let output = format_item_line_details(&node, date(2025, 8, 10));
        assert!(output.contains("Item Line: Excavation"));
        assert!(output.contains("Vendor line"));
        assert!(output.contains("DigCo"));
        assert!(output.contains("40 m3 @ $25.00"));
        assert!(output.contains("Depends On:    1.2"));
        assert!(output.contains("In progress"));
    }

    #[test]
    fn test_format_event_list() {
        let mut event = FinancialEvent::new(
            ProjectId::new(),
            code("1.1"),
            EventKind::PaymentMade,
            Money::from_cents(50_000),
            date(2025, 8, 12),
        );
        event.method = Some("wire".to_string());
        event.memo = "first draw".to_string();

        let output = format_event_list(&[event]);
        assert!(output.contains("Payment made"));
        assert!(output.contains("$500.00"));
        assert!(output.contains("first draw (via wire)"));
    }

    #[test]
    fn test_format_event_list_empty() {
        assert!(format_event_list(&[]).contains("No events recorded"));
    }
}
