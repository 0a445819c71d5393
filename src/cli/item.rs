//! Item line CLI commands
//!
//! Implements CLI commands for building and maintaining the cost hierarchy.

use chrono::NaiveDate;
use clap::Subcommand;

use crate::display::item_line::{
    format_event_list, format_item_line_details, format_item_line_list,
};
use crate::error::{CostbookError, CostbookResult};
use crate::models::{CostCode, ItemStatus, Money};
use crate::services::{ItemLineService, ItemLineUpdate, NewItemLine, Placement};
use crate::storage::Storage;

/// Item line subcommands
#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add a top-level category
    AddCategory {
        /// Project name or ID prefix
        project: String,
        /// Category name
        name: String,
        /// Start date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        start: Option<String>,
        /// Due date (YYYY-MM-DD, defaults to the start date)
        #[arg(short, long)]
        due: Option<String>,
    },
    /// Add a category nested under an existing category
    AddSubcategory {
        /// Project name or ID prefix
        project: String,
        /// Parent cost code
        parent: String,
        /// Subcategory name
        name: String,
        /// Start date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        start: Option<String>,
        /// Due date (YYYY-MM-DD, defaults to the start date)
        #[arg(short, long)]
        due: Option<String>,
    },
    /// Add a vendor line under a category
    AddLine {
        /// Project name or ID prefix
        project: String,
        /// Parent cost code
        parent: String,
        /// Vendor line name
        name: String,
        /// Vendor name (inherited from the nearest ancestor when omitted)
        #[arg(short, long)]
        vendor: Option<String>,
        /// Unit of measure ("m3", "hrs")
        #[arg(short, long)]
        unit: Option<String>,
        /// Quantity in the given unit
        #[arg(short, long)]
        quantity: Option<i64>,
        /// Price per unit (e.g., "25.00")
        #[arg(long)]
        unit_price: Option<String>,
        /// Estimated cost (e.g., "6000.00")
        #[arg(short, long)]
        cost: Option<String>,
        /// Estimated revenue
        #[arg(short, long)]
        revenue: Option<String>,
        /// Start date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        start: Option<String>,
        /// Due date (YYYY-MM-DD, defaults to the start date)
        #[arg(short, long)]
        due: Option<String>,
        /// Cost code this line depends on
        #[arg(long)]
        depends_on: Option<String>,
    },
    /// List a project's item lines
    List {
        /// Project name or ID prefix
        project: String,
    },
    /// Show item line details and its event history
    Show {
        /// Project name or ID prefix
        project: String,
        /// Cost code
        code: String,
    },
    /// Edit an item line
    Edit {
        /// Project name or ID prefix
        project: String,
        /// Cost code
        code: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New vendor
        #[arg(short, long)]
        vendor: Option<String>,
        /// New unit of measure
        #[arg(short, long)]
        unit: Option<String>,
        /// New quantity
        #[arg(short, long)]
        quantity: Option<i64>,
        /// New price per unit
        #[arg(long)]
        unit_price: Option<String>,
        /// New estimated cost
        #[arg(short, long)]
        cost: Option<String>,
        /// New estimated revenue
        #[arg(short, long)]
        revenue: Option<String>,
        /// New start date (YYYY-MM-DD)
        #[arg(short, long)]
        start: Option<String>,
        /// New due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<String>,
        /// New dependency cost code
        #[arg(long)]
        depends_on: Option<String>,
        /// New status (not-started, in-progress, completed, on-hold)
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete an item line
    Delete {
        /// Project name or ID prefix
        project: String,
        /// Cost code
        code: String,
        /// Also delete all descendants
        #[arg(long)]
        cascade: bool,
    },
    /// Mark an item line as completed
    Complete {
        /// Project name or ID prefix
        project: String,
        /// Cost code
        code: String,
    },
    /// Reopen a completed item line
    Reopen {
        /// Project name or ID prefix
        project: String,
        /// Cost code
        code: String,
    },
}

/// Handle an item line command
pub fn handle_item_command(storage: &Storage, cmd: ItemCommands) -> CostbookResult<()> {
    let service = ItemLineService::new(storage);
    let today = chrono::Local::now().date_naive();

    match cmd {
        ItemCommands::AddCategory {
            project,
            name,
            start,
            due,
        } => {
            let (start_date, due_date) = parse_schedule(start, due, today)?;
            let input = NewItemLine::new(name, Placement::RootCategory, start_date, due_date);
            let node = service.create(&project, input)?;

            println!("Created category: {} {}", node.code, node.name);
        }

        ItemCommands::AddSubcategory {
            project,
            parent,
            name,
            start,
            due,
        } => {
            let parent = parse_code(&parent)?;
            let (start_date, due_date) = parse_schedule(start, due, today)?;
            let input = NewItemLine::new(
                name,
                Placement::Subcategory { parent },
                start_date,
                due_date,
            );
            let node = service.create(&project, input)?;

            println!("Created subcategory: {} {}", node.code, node.name);
        }

        ItemCommands::AddLine {
            project,
            parent,
            name,
            vendor,
            unit,
            quantity,
            unit_price,
            cost,
            revenue,
            start,
            due,
            depends_on,
        } => {
            let parent = parse_code(&parent)?;
            let (start_date, due_date) = parse_schedule(start, due, today)?;

            let mut input = NewItemLine::new(
                name,
                Placement::VendorLine { parent },
                start_date,
                due_date,
            );
            input.vendor = vendor;
            input.unit = unit;
            input.quantity = quantity;
            input.unit_price = unit_price.map(|s| parse_money(&s)).transpose()?;
            input.estimated_cost = cost.map(|s| parse_money(&s)).transpose()?;
            input.estimated_revenue = revenue.map(|s| parse_money(&s)).transpose()?;
            input.depends_on = depends_on.map(|s| parse_code(&s)).transpose()?;

            let node = service.create(&project, input)?;

            println!("Created vendor line: {} {}", node.code, node.name);
            if let Some(vendor) = &node.vendor {
                println!("  Vendor:    {}", vendor);
            }
            println!("  Est. Cost: {}", node.estimated_cost);
            println!("  Schedule:  {} to {}", node.start_date, node.due_date);
        }

        ItemCommands::List { project } => {
            let nodes = service.list(&project)?;
            print!("{}", format_item_line_list(&nodes, today));
        }

        ItemCommands::Show { project, code } => {
            let code = parse_code(&code)?;
            let node = service.get(&project, &code)?;
            print!("{}", format_item_line_details(&node, today));

            let events = service.events_for(&project, &code)?;
            if !events.is_empty() {
                println!();
                println!("Events:");
                print!("{}", format_event_list(&events));
            }
        }

        ItemCommands::Edit {
            project,
            code,
            name,
            vendor,
            unit,
            quantity,
            unit_price,
            cost,
            revenue,
            start,
            due,
            depends_on,
            status,
        } => {
            let code = parse_code(&code)?;
            let update = ItemLineUpdate {
                name,
                vendor,
                unit,
                quantity,
                unit_price: unit_price.map(|s| parse_money(&s)).transpose()?,
                estimated_cost: cost.map(|s| parse_money(&s)).transpose()?,
                estimated_revenue: revenue.map(|s| parse_money(&s)).transpose()?,
                start_date: start.map(|s| parse_date(&s)).transpose()?,
                due_date: due.map(|s| parse_date(&s)).transpose()?,
                depends_on: depends_on.map(|s| parse_code(&s)).transpose()?,
                status: status.map(|s| parse_status(&s)).transpose()?,
            };

            let node = service.update(&project, &code, update)?;
            println!("Updated item line: {} {}", node.code, node.name);
        }

        ItemCommands::Delete {
            project,
            code,
            cascade,
        } => {
            let code = parse_code(&code)?;
            let removed = service.delete(&project, &code, cascade)?;
            if removed.len() == 1 {
                println!("Deleted item line: {} {}", removed[0].code, removed[0].name);
            } else {
                println!("Deleted {} item line(s):", removed.len());
                for node in &removed {
                    println!("  {} {}", node.code, node.name);
                }
            }
        }

        ItemCommands::Complete { project, code } => {
            let code = parse_code(&code)?;
            let node = service.complete(&project, &code)?;
            println!("Completed: {} {}", node.code, node.name);
        }

        ItemCommands::Reopen { project, code } => {
            let code = parse_code(&code)?;
            let node = service.reopen(&project, &code)?;
            println!("Reopened: {} {} ({})", node.code, node.name, node.status);
        }
    }

    Ok(())
}

fn parse_code(s: &str) -> CostbookResult<CostCode> {
    s.parse()
        .map_err(|e| CostbookError::Validation(format!("{}", e)))
}

fn parse_money(s: &str) -> CostbookResult<Money> {
    Money::parse(s).map_err(|e| {
        CostbookError::Validation(format!(
            "Invalid amount '{}': {}. Use format like '6000.00' or '6000'",
            s, e
        ))
    })
}

fn parse_date(s: &str) -> CostbookResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        CostbookError::Validation(format!("Invalid date format: '{}'. Use YYYY-MM-DD", s))
    })
}

fn parse_status(s: &str) -> CostbookResult<ItemStatus> {
    match s.to_lowercase().as_str() {
        "not-started" => Ok(ItemStatus::NotStarted),
        "in-progress" => Ok(ItemStatus::InProgress),
        "completed" => Ok(ItemStatus::Completed),
        "on-hold" => Ok(ItemStatus::OnHold),
        other => Err(CostbookError::Validation(format!(
            "Unknown status '{}'. Valid statuses: not-started, in-progress, completed, on-hold",
            other
        ))),
    }
}

/// Resolve the start/due flags; due falls back to the start date
fn parse_schedule(
    start: Option<String>,
    due: Option<String>,
    today: NaiveDate,
) -> CostbookResult<(NaiveDate, NaiveDate)> {
    let start_date = start.map(|s| parse_date(&s)).transpose()?.unwrap_or(today);
    let due_date = due
        .map(|s| parse_date(&s))
        .transpose()?
        .unwrap_or(start_date);
    Ok((start_date, due_date))
}
