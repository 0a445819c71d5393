//! Cost hierarchy arena
//!
//! One per project: every item line keyed by cost code, with parent/child
//! relations expressed as code references rather than pointers. The arena
//! also owns the per-parent allocation marks, so cost codes stay monotonic
//! and are never reused after a deletion.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::cost_code::CostCode;
use super::item_line::ItemLineNode;

/// All item lines of one project plus the code allocation state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hierarchy {
    nodes: HashMap<CostCode, ItemLineNode>,

    /// Highest root segment ever issued
    #[serde(default)]
    root_high_water: u32,

    /// Highest child suffix ever issued, per parent
    #[serde(default)]
    child_high_water: HashMap<CostCode, u32>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, code: &CostCode) -> bool {
        self.nodes.contains_key(code)
    }

    pub fn get(&self, code: &CostCode) -> Option<&ItemLineNode> {
        self.nodes.get(code)
    }

    pub fn get_mut(&mut self, code: &CostCode) -> Option<&mut ItemLineNode> {
        self.nodes.get_mut(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemLineNode> {
        self.nodes.values()
    }

    /// Issue the next root code (single integer, counts up from 1)
    pub fn allocate_root(&mut self) -> CostCode {
        self.root_high_water += 1;
        CostCode::root(self.root_high_water)
    }

    /// Issue the next code under `parent`; first child gets suffix 1
    pub fn allocate_child(&mut self, parent: &CostCode) -> Result<CostCode, HierarchyError> {
        if !self.nodes.contains_key(parent) {
            return Err(HierarchyError::UnknownParent(parent.clone()));
        }
        let mark = self.child_high_water.entry(parent.clone()).or_insert(0);
        *mark += 1;
        Ok(parent.child(*mark))
    }

    /// Current allocation mark (None for the root level)
    pub fn high_water(&self, parent: Option<&CostCode>) -> u32 {
        match parent {
            None => self.root_high_water,
            Some(p) => self.child_high_water.get(p).copied().unwrap_or(0),
        }
    }

    /// Insert a node. The code must be unused and the parent present.
    pub fn insert(&mut self, node: ItemLineNode) -> Result<(), HierarchyError> {
        if self.nodes.contains_key(&node.code) {
            return Err(HierarchyError::DuplicateCode(node.code.clone()));
        }
        if let Some(parent) = &node.parent {
            if !self.nodes.contains_key(parent) {
                return Err(HierarchyError::UnknownParent(parent.clone()));
            }
        }
        self.raise_mark(&node.code);
        self.nodes.insert(node.code.clone(), node);
        Ok(())
    }

    /// Remove one node. Allocation marks are untouched, so the code is
    /// burned for good. Child policy is the caller's problem.
    pub fn remove(&mut self, code: &CostCode) -> Option<ItemLineNode> {
        self.nodes.remove(code)
    }

    /// Raise allocation marks to cover every stored code. Run after loading
    /// data written before the marks were persisted.
    pub fn rebuild_marks(&mut self) {
        let codes: Vec<CostCode> = self.nodes.keys().cloned().collect();
        for code in codes {
            self.raise_mark(&code);
        }
    }

    fn raise_mark(&mut self, code: &CostCode) {
        let suffix = code.last_segment();
        match code.parent() {
            None => {
                if suffix > self.root_high_water {
                    self.root_high_water = suffix;
                }
            }
            Some(parent) => {
                let mark = self.child_high_water.entry(parent).or_insert(0);
                if suffix > *mark {
                    *mark = suffix;
                }
            }
        }
    }

    /// Root nodes in code order
    pub fn roots(&self) -> Vec<&ItemLineNode> {
        let mut roots: Vec<&ItemLineNode> =
            self.nodes.values().filter(|n| n.parent.is_none()).collect();
        roots.sort_by(|a, b| a.code.cmp(&b.code));
        roots
    }

    /// Direct children of `parent` in code order
    pub fn children_of(&self, parent: &CostCode) -> Vec<&ItemLineNode> {
        let mut children: Vec<&ItemLineNode> = self
            .nodes
            .values()
            .filter(|n| n.parent.as_ref() == Some(parent))
            .collect();
        children.sort_by(|a, b| a.code.cmp(&b.code));
        children
    }

    pub fn has_children(&self, parent: &CostCode) -> bool {
        self.nodes
            .values()
            .any(|n| n.parent.as_ref() == Some(parent))
    }

    /// `root` plus every descendant, parents before children
    pub fn subtree_codes(&self, root: &CostCode) -> Vec<CostCode> {
        let children = self.child_index();
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(code) = stack.pop() {
            if !self.nodes.contains_key(code) {
                continue;
            }
            out.push(code.clone());
            if let Some(kids) = children.get(code) {
                for kid in kids.iter().rev() {
                    stack.push(kid);
                }
            }
        }
        out
    }

    /// Every node depth-first in code order, parents before children
    pub fn walk(&self) -> Vec<&ItemLineNode> {
        let children = self.child_index();
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&CostCode> = self.roots().into_iter().rev().map(|n| &n.code).collect();
        while let Some(code) = stack.pop() {
            if let Some(node) = self.nodes.get(code) {
                out.push(node);
            }
            if let Some(kids) = children.get(code) {
                for kid in kids.iter().rev() {
                    stack.push(kid);
                }
            }
        }
        out
    }

    /// Every code with children listed before their parent. Aggregation
    /// resolves leaves first so each category sums fully-resolved children.
    pub fn post_order_codes(&self) -> Vec<CostCode> {
        let children = self.child_index();
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(&CostCode, bool)> = self
            .roots()
            .into_iter()
            .rev()
            .map(|n| (&n.code, false))
            .collect();
        while let Some((code, expanded)) = stack.pop() {
            if expanded {
                out.push(code.clone());
                continue;
            }
            stack.push((code, true));
            if let Some(kids) = children.get(code) {
                for kid in kids.iter().rev() {
                    stack.push((kid, false));
                }
            }
        }
        out
    }

    /// Nearest vendor walking up from `from` (inclusive) along stored
    /// parent links. Returns None when no ancestor carries one.
    pub fn inherited_vendor(&self, from: &CostCode) -> Option<String> {
        let mut seen = HashSet::new();
        let mut current = Some(from.clone());
        while let Some(code) = current {
            if !seen.insert(code.clone()) {
                // Corrupt parent links; the integrity pass reports these
                return None;
            }
            let node = self.nodes.get(&code)?;
            if let Some(vendor) = &node.vendor {
                if !vendor.trim().is_empty() {
                    return Some(vendor.clone());
                }
            }
            current = node.parent.clone();
        }
        None
    }

    /// Find dangling parent references and cycles among stored parent links.
    /// An empty result means the tree is sound for aggregation.
    pub fn integrity_issues(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        let mut codes: Vec<&CostCode> = self.nodes.keys().collect();
        codes.sort();

        for code in &codes {
            let node = &self.nodes[*code];
            if let Some(parent) = &node.parent {
                if !self.nodes.contains_key(parent) {
                    issues.push(IntegrityIssue::DanglingParent {
                        code: node.code.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        // Walk parent chains; a code revisited within one walk is a cycle.
        let mut resolved: HashSet<CostCode> = HashSet::new();
        for start in codes {
            if resolved.contains(start) {
                continue;
            }
            let mut path: Vec<CostCode> = Vec::new();
            let mut on_path: HashSet<CostCode> = HashSet::new();
            let mut current = Some(start.clone());
            while let Some(code) = current {
                if resolved.contains(&code) {
                    break;
                }
                if on_path.contains(&code) {
                    let at = path.iter().position(|c| *c == code).unwrap_or(0);
                    issues.push(IntegrityIssue::Cycle {
                        codes: path[at..].to_vec(),
                    });
                    break;
                }
                on_path.insert(code.clone());
                path.push(code.clone());
                current = self.nodes.get(&code).and_then(|n| n.parent.clone());
            }
            for code in path {
                resolved.insert(code);
            }
        }

        issues
    }

    fn child_index(&self) -> HashMap<&CostCode, Vec<&CostCode>> {
        let mut children: HashMap<&CostCode, Vec<&CostCode>> = HashMap::new();
        for node in self.nodes.values() {
            if let Some(parent) = &node.parent {
                if self.nodes.contains_key(parent) {
                    children.entry(parent).or_default().push(&node.code);
                }
            }
        }
        for kids in children.values_mut() {
            kids.sort();
        }
        children
    }
}

/// Structural problems found in a hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    DanglingParent { code: CostCode, parent: CostCode },
    Cycle { codes: Vec<CostCode> },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingParent { code, parent } => {
                write!(f, "item {} references missing parent {}", code, parent)
            }
            Self::Cycle { codes } => {
                let chain: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
                write!(f, "parent links form a cycle: {}", chain.join(" -> "))
            }
        }
    }
}

/// Errors from arena mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    DuplicateCode(CostCode),
    UnknownParent(CostCode),
}

impl fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateCode(code) => write!(f, "Cost code {} is already in use", code),
            Self::UnknownParent(code) => write!(f, "Parent {} does not exist", code),
        }
    }
}

impl std::error::Error for HierarchyError {}
