//! Append-only audit log
//!
//! One JSON object per line (JSONL). All appends go through a single
//! serialize-then-write path, so a torn write can lose at most the final
//! batch and never corrupts earlier lines.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::error::{CostbookError, CostbookResult};

use super::entry::AuditEntry;

/// Writes audit entries to the log file and reads them back
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create a logger for the given log file
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append one entry and flush
    pub fn log(&self, entry: &AuditEntry) -> CostbookResult<()> {
        self.log_batch(std::slice::from_ref(entry))
    }

    /// Append several entries with one open and one flush
    pub fn log_batch(&self, entries: &[AuditEntry]) -> CostbookResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        // Serialize everything before touching the file
        let mut lines = String::new();
        for entry in entries {
            let json = serde_json::to_string(entry).map_err(|e| {
                CostbookError::Json(format!("Failed to serialize audit entry: {}", e))
            })?;
            lines.push_str(&json);
            lines.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| CostbookError::Io(format!("Failed to open audit log: {}", e)))?;
        file.write_all(lines.as_bytes())
            .map_err(|e| CostbookError::Io(format!("Failed to write audit log: {}", e)))?;
        file.flush()
            .map_err(|e| CostbookError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// All entries, oldest first
    pub fn read_all(&self) -> CostbookResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.log_path)
            .map_err(|e| CostbookError::Io(format!("Failed to read audit log: {}", e)))?;

        let mut entries = Vec::new();
        for (line_num, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: AuditEntry = serde_json::from_str(line).map_err(|e| {
                CostbookError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// The most recent `count` entries, oldest of those first
    pub fn read_recent(&self, count: usize) -> CostbookResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        let skip = entries.len().saturating_sub(count);
        Ok(entries.split_off(skip))
    }

    /// Number of entries in the log
    pub fn entry_count(&self) -> CostbookResult<usize> {
        Ok(self.read_all()?.len())
    }

    /// Check if the audit log file exists
    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::{EntityType, Operation};
    use serde_json::json;
    use tempfile::TempDir;

    fn temp_logger() -> (AuditLogger, TempDir) {
        let dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(dir.path().join("audit.log"));
        (logger, dir)
    }

    fn created_line(code: &str, name: &str) -> AuditEntry {
        AuditEntry::create(
            EntityType::ItemLine,
            code,
            Some(name.to_string()),
            &json!({"code": code, "name": name}),
        )
    }

    #[test]
    fn test_append_then_read_back() {
        let (logger, _dir) = temp_logger();

        logger.log(&created_line("2.1", "Foundation")).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Create);
        assert_eq!(entries[0].entity_type, EntityType::ItemLine);
        assert_eq!(entries[0].entity_name.as_deref(), Some("Foundation"));
    }

    #[test]
    fn test_batch_lands_in_order() {
        let (logger, _dir) = temp_logger();

        let batch = vec![
            created_line("2.1", "Foundation"),
            created_line("2.2", "Framing"),
            created_line("2.3", "Roofing"),
        ];
        logger.log_batch(&batch).unwrap();

        let codes: Vec<String> = logger
            .read_all()
            .unwrap()
            .into_iter()
            .map(|e| e.entity_id)
            .collect();
        assert_eq!(codes, ["2.1", "2.2", "2.3"]);
    }

    #[test]
    fn test_empty_batch_creates_nothing() {
        let (logger, _dir) = temp_logger();

        logger.log_batch(&[]).unwrap();

        assert!(!logger.exists());
    }

    #[test]
    fn test_recent_returns_tail_in_order() {
        let (logger, _dir) = temp_logger();

        for i in 1..=10 {
            let code = format!("5.{}", i);
            logger.log(&created_line(&code, "Sitework")).unwrap();
        }
        assert_eq!(logger.entry_count().unwrap(), 10);

        let recent = logger.read_recent(3).unwrap();
        let codes: Vec<String> = recent.into_iter().map(|e| e.entity_id).collect();
        assert_eq!(codes, ["5.8", "5.9", "5.10"]);
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let (logger, _dir) = temp_logger();

        assert!(!logger.exists());
        assert_eq!(logger.entry_count().unwrap(), 0);
        assert!(logger.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_mixed_operations_round_trip() {
        let (logger, _dir) = temp_logger();

        let before = json!({"name": "Framing", "estimated_cost": 450000});
        let after = json!({"name": "Framing", "estimated_cost": 480000});
        logger.log(&created_line("2.2", "Framing")).unwrap();
        logger
            .log(&AuditEntry::update(
                EntityType::ItemLine,
                "2.2",
                Some("Framing".to_string()),
                &before,
                &after,
                Some("estimated_cost: 450000 -> 480000".to_string()),
            ))
            .unwrap();
        logger
            .log(&AuditEntry::delete(
                EntityType::ItemLine,
                "2.2",
                Some("Framing".to_string()),
                &after,
            ))
            .unwrap();

        let entries = logger.read_all().unwrap();
        let ops: Vec<Operation> = entries.iter().map(|e| e.operation).collect();
        assert_eq!(
            ops,
            [Operation::Create, Operation::Update, Operation::Delete]
        );
        assert!(entries[1].before.is_some());
        assert!(entries[1].after.is_some());
        assert!(entries[2].before.is_some());
        assert!(entries[2].after.is_none());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let (logger, dir) = temp_logger();
        let path = dir.path().join("audit.log");

        logger.log(&created_line("2.1", "Foundation")).unwrap();
        let mut raw = fs::read_to_string(&path).unwrap();
        raw.push('\n');
        fs::write(&path, raw).unwrap();
        logger.log(&created_line("2.2", "Framing")).unwrap();

        assert_eq!(logger.entry_count().unwrap(), 2);
    }

    #[test]
    fn test_corrupt_line_reports_position() {
        let (logger, dir) = temp_logger();
        let path = dir.path().join("audit.log");

        logger.log(&created_line("2.1", "Foundation")).unwrap();
        let mut raw = fs::read_to_string(&path).unwrap();
        raw.push_str("not json\n");
        fs::write(&path, raw).unwrap();

        let err = logger.read_all().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_reopened_log_keeps_existing_entries() {
        let (logger, dir) = temp_logger();
        logger.log(&created_line("2.1", "Foundation")).unwrap();

        let reopened = AuditLogger::new(dir.path().join("audit.log"));
        reopened.log(&created_line("2.2", "Framing")).unwrap();

        let entries = reopened.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entity_id, "2.1");
    }
}
