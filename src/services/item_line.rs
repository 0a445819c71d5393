//! Item line service
//!
//! Business logic for the cost hierarchy: creating item lines (with code
//! allocation and vendor inheritance), partial edits, completion, and
//! deletion. Every mutation runs inside one ledger write-lock section and
//! re-aggregates before it becomes visible.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::audit::{generate_diff, EntityType};
use crate::error::{CostbookError, CostbookResult};
use crate::models::{CostCode, FinancialEvent, ItemLineNode, ItemStatus, Money, Project};
use crate::services::aggregation;
use crate::services::allocation::{self, Placement};
use crate::storage::Storage;

/// Service for item line management
pub struct ItemLineService<'a> {
    storage: &'a Storage,
}

/// Input for creating an item line
#[derive(Debug, Clone)]
pub struct NewItemLine {
    pub name: String,
    pub placement: Placement,
    pub vendor: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<Money>,
    pub estimated_cost: Option<Money>,
    pub estimated_revenue: Option<Money>,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub depends_on: Option<CostCode>,
}

impl NewItemLine {
    /// A bare item line; callers fill in the optional fields
    pub fn new(
        name: impl Into<String>,
        placement: Placement,
        start_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            placement,
            vendor: None,
            unit: None,
            quantity: None,
            unit_price: None,
            estimated_cost: None,
            estimated_revenue: None,
            start_date,
            due_date,
            depends_on: None,
        }
    }
}

/// Partial update for an item line; None leaves the field alone
#[derive(Debug, Clone, Default)]
pub struct ItemLineUpdate {
    pub name: Option<String>,
    pub vendor: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<Money>,
    pub estimated_cost: Option<Money>,
    pub estimated_revenue: Option<Money>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub depends_on: Option<CostCode>,
    pub status: Option<ItemStatus>,
}

impl ItemLineUpdate {
    fn touches_derived_figures(&self) -> bool {
        self.quantity.is_some()
            || self.unit_price.is_some()
            || self.estimated_cost.is_some()
            || self.estimated_revenue.is_some()
    }
}

impl<'a> ItemLineService<'a> {
    /// Create a new item line service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn find_project(&self, project: &str) -> CostbookResult<Project> {
        self.storage
            .projects
            .find(project)?
            .ok_or_else(|| CostbookError::project_not_found(project))
    }

    /// Create an item line at the placement the intent describes
    ///
    /// The cost code is allocated inside the write-lock section, the vendor
    /// is snapshotted from the nearest ancestor when absent, and the whole
    /// tree is re-aggregated before the new node becomes visible.
    pub fn create(&self, project: &str, input: NewItemLine) -> CostbookResult<ItemLineNode> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CostbookError::Validation(
                "Item line name cannot be empty".into(),
            ));
        }

        if input.placement.is_category()
            && (input.estimated_cost.is_some()
                || input.estimated_revenue.is_some()
                || input.quantity.is_some()
                || input.unit_price.is_some())
        {
            return Err(CostbookError::Validation(
                "Category figures are derived from children and cannot be set directly".into(),
            ));
        }

        let mut project = self.find_project(project)?;
        let project_name = project.name.clone();
        let baselined = project.is_baselined();

        let node = self.storage.ledgers.with_mut(project.id, |hierarchy| {
            let resolved = allocation::allocate(hierarchy, &input.placement)?;

            let mut node = ItemLineNode::new(
                resolved.code.clone(),
                name,
                resolved.is_category,
                input.start_date,
                input.due_date,
            );

            // Explicit vendor wins; otherwise snapshot the nearest ancestor's
            node.vendor = match &input.vendor {
                Some(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
                _ => resolved
                    .parent
                    .as_ref()
                    .and_then(|p| hierarchy.inherited_vendor(p)),
            };

            if let Some(unit) = &input.unit {
                node.unit = unit.trim().to_string();
            }
            if let Some(quantity) = input.quantity {
                node.quantity = quantity;
            }
            if let Some(unit_price) = input.unit_price {
                node.unit_price = unit_price;
            }
            if let Some(estimated_cost) = input.estimated_cost {
                node.estimated_cost = estimated_cost;
            }
            if let Some(estimated_revenue) = input.estimated_revenue {
                node.estimated_revenue = estimated_revenue;
            }

            if let Some(dep) = &input.depends_on {
                if !hierarchy.contains(dep) {
                    return Err(CostbookError::item_line_not_found(dep.to_string()));
                }
                node.depends_on = Some(dep.clone());
            }

            node.validate()
                .map_err(|e| CostbookError::Validation(e.to_string()))?;

            hierarchy
                .insert(node.clone())
                .map_err(|e| CostbookError::Ledger(e.to_string()))?;

            // Additions after the baseline are change orders on the parent
            if baselined {
                if let Some(parent_code) = &node.parent {
                    if let Some(parent) = hierarchy.get_mut(parent_code) {
                        parent.change_orders += 1;
                        parent.touch();
                    }
                }
            }

            aggregation::aggregate(hierarchy).map_err(|issues| {
                CostbookError::integrity(
                    project_name.clone(),
                    aggregation::describe_issues(&issues),
                )
            })?;

            Ok(node)
        })?;

        self.storage.ledgers.save()?;

        // Post-baseline root additions count against the project itself
        if baselined && node.parent.is_none() {
            project.record_change_order();
            self.storage.projects.upsert(project)?;
            self.storage.projects.save()?;
        }

        self.storage.log_create(
            EntityType::ItemLine,
            node.code.to_string(),
            Some(node.name.clone()),
            &node,
        )?;

        Ok(node)
    }

    /// Get one item line
    pub fn get(&self, project: &str, code: &CostCode) -> CostbookResult<ItemLineNode> {
        let project = self.find_project(project)?;
        let hierarchy = self.storage.ledgers.get_required(project.id)?;
        hierarchy
            .get(code)
            .cloned()
            .ok_or_else(|| CostbookError::item_line_not_found(code.to_string()))
    }

    /// Every item line depth-first in code order
    pub fn list(&self, project: &str) -> CostbookResult<Vec<ItemLineNode>> {
        let project = self.find_project(project)?;
        let hierarchy = self.storage.ledgers.get_required(project.id)?;
        Ok(hierarchy.walk().into_iter().cloned().collect())
    }

    /// Events recorded against one item line, in recording order. For a
    /// category code this is the subtree's history.
    pub fn events_for(
        &self,
        project: &str,
        code: &CostCode,
    ) -> CostbookResult<Vec<FinancialEvent>> {
        let project = self.find_project(project)?;
        self.storage.events.for_node(project.id, code)
    }

    /// Apply a partial update to an item line
    pub fn update(
        &self,
        project: &str,
        code: &CostCode,
        update: ItemLineUpdate,
    ) -> CostbookResult<ItemLineNode> {
        let project = self.find_project(project)?;
        let project_name = project.name.clone();

        let (before, after) = self.storage.ledgers.with_mut(project.id, |hierarchy| {
            if let Some(dep) = &update.depends_on {
                if !hierarchy.contains(dep) {
                    return Err(CostbookError::item_line_not_found(dep.to_string()));
                }
            }

            let node = hierarchy
                .get_mut(code)
                .ok_or_else(|| CostbookError::item_line_not_found(code.to_string()))?;

            if node.is_category && update.touches_derived_figures() {
                return Err(CostbookError::Validation(format!(
                    "{} is a category; its figures are derived from children",
                    code
                )));
            }

            let before = node.clone();

            if let Some(name) = &update.name {
                let name = name.trim();
                if name.is_empty() {
                    return Err(CostbookError::Validation(
                        "Item line name cannot be empty".into(),
                    ));
                }
                node.name = name.to_string();
            }
            if let Some(vendor) = &update.vendor {
                let vendor = vendor.trim();
                node.vendor = if vendor.is_empty() {
                    None
                } else {
                    Some(vendor.to_string())
                };
            }
            if let Some(unit) = &update.unit {
                node.unit = unit.trim().to_string();
            }
            if let Some(quantity) = update.quantity {
                node.quantity = quantity;
            }
            if let Some(unit_price) = update.unit_price {
                node.unit_price = unit_price;
            }
            if let Some(estimated_cost) = update.estimated_cost {
                node.estimated_cost = estimated_cost;
            }
            if let Some(estimated_revenue) = update.estimated_revenue {
                node.estimated_revenue = estimated_revenue;
            }
            if let Some(start_date) = update.start_date {
                node.start_date = start_date;
            }
            if let Some(due_date) = update.due_date {
                node.due_date = due_date;
            }
            if let Some(dep) = &update.depends_on {
                node.depends_on = Some(dep.clone());
            }
            if let Some(status) = update.status {
                node.set_status(status);
            }

            node.touch();
            node.validate()
                .map_err(|e| CostbookError::Validation(e.to_string()))?;
            let after = node.clone();

            aggregation::aggregate(hierarchy).map_err(|issues| {
                CostbookError::integrity(
                    project_name.clone(),
                    aggregation::describe_issues(&issues),
                )
            })?;

            Ok((before, after))
        })?;

        self.storage.ledgers.save()?;

        let diff = generate_diff(
            &serde_json::to_value(&before)?,
            &serde_json::to_value(&after)?,
        );
        self.storage.log_update(
            EntityType::ItemLine,
            after.code.to_string(),
            Some(after.name.clone()),
            &before,
            &after,
            diff,
        )?;

        Ok(after)
    }

    /// Delete an item line
    ///
    /// A node with children is rejected unless `cascade` is set; the cascade
    /// removes children before parents so no dangling parent is ever stored.
    /// Returns the removed nodes, target first.
    pub fn delete(
        &self,
        project: &str,
        code: &CostCode,
        cascade: bool,
    ) -> CostbookResult<Vec<ItemLineNode>> {
        let project = self.find_project(project)?;
        let project_name = project.name.clone();

        let removed = self.storage.ledgers.with_mut(project.id, |hierarchy| {
            if !hierarchy.contains(code) {
                return Err(CostbookError::item_line_not_found(code.to_string()));
            }

            let codes = hierarchy.subtree_codes(code);
            if codes.len() > 1 && !cascade {
                return Err(CostbookError::Validation(format!(
                    "Cannot delete {} - it has {} descendant item line(s). Use --cascade to delete them too.",
                    code,
                    codes.len() - 1
                )));
            }

            let mut removed = Vec::with_capacity(codes.len());
            for c in codes.iter().rev() {
                if let Some(node) = hierarchy.remove(c) {
                    removed.push(node);
                }
            }
            removed.reverse();

            // Scheduling references into the removed subtree would dangle
            let gone: HashSet<CostCode> = codes.into_iter().collect();
            let stale: Vec<CostCode> = hierarchy
                .iter()
                .filter(|n| n.depends_on.as_ref().is_some_and(|d| gone.contains(d)))
                .map(|n| n.code.clone())
                .collect();
            for c in stale {
                if let Some(node) = hierarchy.get_mut(&c) {
                    node.depends_on = None;
                    node.touch();
                }
            }

            aggregation::aggregate(hierarchy).map_err(|issues| {
                CostbookError::integrity(
                    project_name.clone(),
                    aggregation::describe_issues(&issues),
                )
            })?;

            Ok(removed)
        })?;

        self.storage.ledgers.save()?;

        for node in &removed {
            self.storage.log_delete(
                EntityType::ItemLine,
                node.code.to_string(),
                Some(node.name.clone()),
                node,
            )?;
        }

        Ok(removed)
    }

    /// Mark an item line completed
    pub fn complete(&self, project: &str, code: &CostCode) -> CostbookResult<ItemLineNode> {
        self.set_completion(project, code, true)
    }

    /// Reopen a completed item line
    pub fn reopen(&self, project: &str, code: &CostCode) -> CostbookResult<ItemLineNode> {
        self.set_completion(project, code, false)
    }

    fn set_completion(
        &self,
        project: &str,
        code: &CostCode,
        completed: bool,
    ) -> CostbookResult<ItemLineNode> {
        let project = self.find_project(project)?;

        let (before, after) = self.storage.ledgers.with_mut(project.id, |hierarchy| {
            let node = hierarchy
                .get_mut(code)
                .ok_or_else(|| CostbookError::item_line_not_found(code.to_string()))?;

            let before = node.clone();
            if completed {
                node.complete();
            } else {
                node.reopen();
            }

            Ok((before, node.clone()))
        })?;

        self.storage.ledgers.save()?;

        if before.status != after.status {
            self.storage.log_update(
                EntityType::ItemLine,
                after.code.to_string(),
                Some(after.name.clone()),
                &before,
                &after,
                Some(format!("status: {} -> {}", before.status, after.status)),
            )?;
        }

        Ok(after)
    }
}
