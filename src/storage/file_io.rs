//! Atomic JSON file helpers
//!
//! Every data file under the costbook directory goes through
//! [`write_json_atomic`]: serialize, write to a sibling temp file, sync,
//! rename. A crash mid-write leaves the previous file intact. Reads treat
//! a missing file as empty data so commands work before `costbook init`.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::CostbookError;

/// Read JSON from a file, returning `T::default()` when the file is missing
pub fn read_json<T, P>(path: P) -> Result<T, CostbookError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Ok(T::default());
    }

    let bytes = fs::read(path)
        .map_err(|e| CostbookError::Storage(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| CostbookError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically
///
/// The rename is atomic on one filesystem, so readers observe either the
/// old file or the new one, never a half-written mix.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), CostbookError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CostbookError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let json = serde_json::to_vec_pretty(data).map_err(|e| {
        CostbookError::Storage(format!("Failed to serialize {}: {}", path.display(), e))
    })?;

    // Temp file sits next to the target so the rename never crosses filesystems
    let temp_path = path.with_extension("json.tmp");
    let mut file = File::create(&temp_path).map_err(|e| {
        CostbookError::Storage(format!("Failed to create {}: {}", temp_path.display(), e))
    })?;
    file.write_all(&json).map_err(|e| {
        CostbookError::Storage(format!("Failed to write {}: {}", temp_path.display(), e))
    })?;
    file.sync_all().map_err(|e| {
        CostbookError::Storage(format!("Failed to sync {}: {}", temp_path.display(), e))
    })?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        CostbookError::Storage(format!("Failed to replace {}: {}", path.display(), e))
    })
}
