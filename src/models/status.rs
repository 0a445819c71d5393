//! Item line status types
//!
//! Two distinct notions of status live here. `ItemStatus` is the lifecycle
//! the user drives (not-started, in-progress, completed, on-hold).
//! `ScheduleStatus` is derived from dates plus the completion flag and is
//! never stored, only computed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-driven lifecycle status of an item line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    /// Work has not begun
    #[default]
    NotStarted,
    /// Work is underway
    InProgress,
    /// Work is done; the completion flag mirrors this
    Completed,
    /// Work is paused
    OnHold,
}

impl ItemStatus {
    /// Check if this status means the item is complete
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "Not started"),
            Self::InProgress => write!(f, "In progress"),
            Self::Completed => write!(f, "Completed"),
            Self::OnHold => write!(f, "On hold"),
        }
    }
}

/// Schedule status derived from the item's dates and completion flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleStatus {
    /// Start date is still in the future
    Planned,
    /// Between start and due, not complete
    InProgress,
    /// Complete
    Finished,
    /// Past due and not complete
    AlreadyDue,
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planned => write!(f, "Planned"),
            Self::InProgress => write!(f, "In progress"),
            Self::Finished => write!(f, "Finished"),
            Self::AlreadyDue => write!(f, "Already due"),
        }
    }
}

/// Derive the schedule status for a pair of dates and a completion flag
///
/// Day granularity. The start day counts as started; the due day counts as
/// not yet overdue. Precedence: a future start wins over everything, being
/// past due beats completion checks for incomplete items, completion beats
/// the in-progress default.
pub fn schedule_status(
    start: NaiveDate,
    due: NaiveDate,
    completed: bool,
    today: NaiveDate,
) -> ScheduleStatus {
    if today < start {
        ScheduleStatus::Planned
    } else if today > due && !completed {
        ScheduleStatus::AlreadyDue
    } else if completed {
        ScheduleStatus::Finished
    } else {
        ScheduleStatus::InProgress
    }
}
