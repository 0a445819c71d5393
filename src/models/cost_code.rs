//! Cost codes: dotted-path identifiers for item lines
//!
//! A cost code like "1.1.1.2" encodes a node's position in the project
//! hierarchy. The segment count is the node's level; dropping the last
//! segment yields the parent. Codes are system-assigned, never user input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hierarchical cost code ("2", "2.1", "2.1.3", ...)
///
/// Serialized as its dotted string form, so it can key JSON maps directly.
/// Ordering is numeric segment by segment, which matches the order rows
/// appear in the estimates-vs-actuals table ("2.9" sorts before "2.10").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CostCode(Vec<u32>);

impl CostCode {
    /// Create a root-level code from a single segment
    pub fn root(segment: u32) -> Self {
        Self(vec![segment])
    }

    /// Create the code for this node's nth child
    pub fn child(&self, suffix: u32) -> Self {
        let mut segments = self.0.clone();
        segments.push(suffix);
        Self(segments)
    }

    /// The parent code, or None for root categories
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Hierarchy level: 1 for roots, parent level + 1 below
    pub fn level(&self) -> u8 {
        self.0.len() as u8
    }

    /// The final segment (the suffix assigned under the parent)
    pub fn last_segment(&self) -> u32 {
        // Parsing rejects empty codes, so the vec is never empty
        *self.0.last().unwrap_or(&0)
    }

    /// True when `self` is a strict ancestor of `other`
    pub fn is_ancestor_of(&self, other: &CostCode) -> bool {
        other.0.len() > self.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

impl fmt::Display for CostCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for CostCode {
    type Err = CostCodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CostCodeParseError::Empty);
        }
        let segments = s
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| CostCodeParseError::InvalidSegment(s.to_string()))
            })
            .collect::<Result<Vec<u32>, _>>()?;
        Ok(Self(segments))
    }
}

impl TryFrom<String> for CostCode {
    type Error = CostCodeParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CostCode> for String {
    fn from(code: CostCode) -> String {
        code.to_string()
    }
}

/// Error type for cost code parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostCodeParseError {
    Empty,
    InvalidSegment(String),
}

impl fmt::Display for CostCodeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostCodeParseError::Empty => write!(f, "Cost code cannot be empty"),
            CostCodeParseError::InvalidSegment(s) => {
                write!(f, "Invalid cost code '{}': segments must be numbers >= 1", s)
            }
        }
    }
}

impl std::error::Error for CostCodeParseError {}
