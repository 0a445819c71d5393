//! Shape of a single audit log line.
//!
//! Every mutation lands in the log as an operation tag, the affected
//! entity, and JSON snapshots taken on either side of the change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        };
        f.write_str(tag)
    }
}

/// Which kind of record changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Project,
    ItemLine,
    FinancialEvent,
    Backstop,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityType::Project => "Project",
            EntityType::ItemLine => "ItemLine",
            EntityType::FinancialEvent => "FinancialEvent",
            EntityType::Backstop => "Backstop",
        };
        f.write_str(name)
    }
}

/// One line of the audit log.
///
/// Updates carry both snapshots; creates carry only `after` and deletes
/// only `before`. Empty optional fields are omitted from the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// UTC instant at which the change was applied
    pub timestamp: DateTime<Utc>,

    /// Operation tag
    pub operation: Operation,

    /// Kind of record affected
    pub entity_type: EntityType,

    /// Cost code or prefixed id of the affected record
    pub entity_id: String,

    /// Display name at the time of the change, when the record had one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// Snapshot taken before the change (updates and deletes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    /// Snapshot taken after the change (creates and updates)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// One-line summary of the fields that changed (updates only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    fn stamped(
        operation: Operation,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before: None,
            after: None,
            diff_summary: None,
        }
    }

    // A snapshot that fails to serialize is dropped; the entry itself
    // still records that the operation happened.
    fn snapshot<T: Serialize>(entity: &T) -> Option<serde_json::Value> {
        serde_json::to_value(entity).ok()
    }

    /// Entry for a newly created entity, carrying an after-snapshot only.
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::stamped(Operation::Create, entity_type, entity_id, entity_name);
        entry.after = Self::snapshot(entity);
        entry
    }

    /// Entry for a modified entity, carrying both snapshots and an
    /// optional field-level summary.
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> Self {
        let mut entry = Self::stamped(Operation::Update, entity_type, entity_id, entity_name);
        entry.before = Self::snapshot(before);
        entry.after = Self::snapshot(after);
        entry.diff_summary = diff_summary;
        entry
    }

    /// Entry for a removed entity, carrying a before-snapshot only.
    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::stamped(Operation::Delete, entity_type, entity_id, entity_name);
        entry.before = Self::snapshot(entity);
        entry
    }

    /// Render the entry as a single log line, with the diff summary
    /// indented below it when present.
    pub fn format_human_readable(&self) -> String {
        let stamp = self.timestamp.format("%Y-%m-%d %H:%M:%S UTC");
        let mut line = format!(
            "[{}] {} {} {}",
            stamp, self.operation, self.entity_type, self.entity_id
        );

        if let Some(name) = &self.entity_name {
            line.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            line.push_str(&format!("\n  Changes: {}", diff));
        }

        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_tags() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(Operation::Update.to_string(), "UPDATE");
        assert_eq!(Operation::Delete.to_string(), "DELETE");
        assert_eq!(EntityType::Project.to_string(), "Project");
        assert_eq!(EntityType::ItemLine.to_string(), "ItemLine");
        assert_eq!(EntityType::FinancialEvent.to_string(), "FinancialEvent");
        assert_eq!(EntityType::Backstop.to_string(), "Backstop");
    }

    #[test]
    fn test_create_carries_after_snapshot_only() {
        let line = json!({"code": "2.1", "name": "Foundation", "estimated_cost": 600000});
        let entry = AuditEntry::create(
            EntityType::ItemLine,
            "2.1",
            Some("Foundation".to_string()),
            &line,
        );

        assert_eq!(entry.operation, Operation::Create);
        assert_eq!(entry.entity_type, EntityType::ItemLine);
        assert_eq!(entry.entity_id, "2.1");
        assert!(entry.before.is_none());
        assert_eq!(entry.after, Some(line));
        assert!(entry.diff_summary.is_none());
    }

    #[test]
    fn test_update_carries_both_snapshots() {
        let before = json!({"code": "2.1", "invoiced": 620000});
        let after = json!({"code": "2.1", "invoiced": 650000});

        let entry = AuditEntry::update(
            EntityType::ItemLine,
            "2.1",
            Some("Foundation".to_string()),
            &before,
            &after,
            Some("invoiced: 620000 -> 650000".to_string()),
        );

        assert_eq!(entry.operation, Operation::Update);
        assert_eq!(entry.before, Some(before));
        assert_eq!(entry.after, Some(after));
        assert_eq!(
            entry.diff_summary.as_deref(),
            Some("invoiced: 620000 -> 650000")
        );
    }

    #[test]
    fn test_delete_carries_before_snapshot_only() {
        let line = json!({"code": "3.4", "name": "Temporary fencing"});
        let entry = AuditEntry::delete(
            EntityType::ItemLine,
            "3.4",
            Some("Temporary fencing".to_string()),
            &line,
        );

        assert_eq!(entry.operation, Operation::Delete);
        assert_eq!(entry.before, Some(line));
        assert!(entry.after.is_none());
    }

    #[test]
    fn test_wire_format_skips_empty_fields() {
        let project = json!({"name": "Riverside build"});
        let entry = AuditEntry::create(EntityType::Project, "prj-12345678", None, &project);

        let wire = serde_json::to_string(&entry).unwrap();
        assert!(wire.contains("\"operation\":\"create\""));
        assert!(wire.contains("\"entity_type\":\"project\""));
        assert!(!wire.contains("\"before\""));
        assert!(!wire.contains("\"entity_name\""));
        assert!(!wire.contains("\"diff_summary\""));

        let back: AuditEntry = serde_json::from_str(&wire).unwrap();
        assert_eq!(back.operation, Operation::Create);
        assert_eq!(back.entity_type, EntityType::Project);
        assert_eq!(back.entity_id, "prj-12345678");
    }

    #[test]
    fn test_human_readable_line() {
        let before = json!({"status": "active"});
        let after = json!({"status": "done"});
        let entry = AuditEntry::update(
            EntityType::ItemLine,
            "2.1",
            Some("Foundation".to_string()),
            &before,
            &after,
            Some("status: active -> done".to_string()),
        );

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("UPDATE ItemLine 2.1 (Foundation)"));
        assert!(formatted.ends_with("\n  Changes: status: active -> done"));
    }
}
