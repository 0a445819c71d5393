//! Append-only audit trail
//!
//! Every create, update, and delete on a project, item line, financial
//! event, or backstop lands in `audit.log` as one JSON line, carrying
//! snapshots from before and after the change. `Storage` owns the logger
//! and writes entries as part of each mutating operation; nothing in the
//! crate ever rewrites or truncates the log.
//!
//! # Example
//!
//! ```rust,ignore
//! use costbook::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//!
//! // A new item line: after-snapshot only
//! let entry = AuditEntry::create(
//!     EntityType::ItemLine,
//!     "2.1",
//!     Some("Foundation".to_string()),
//!     &node,
//! );
//! logger.log(&entry)?;
//!
//! // An edit: both snapshots plus a one-line field summary
//! let summary = generate_diff(&before_json, &after_json);
//! let entry = AuditEntry::update(
//!     EntityType::ItemLine,
//!     "2.1",
//!     Some("Foundation".to_string()),
//!     &before,
//!     &after,
//!     summary,
//! );
//! logger.log(&entry)?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::{generate_detailed_diff, generate_diff};
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
