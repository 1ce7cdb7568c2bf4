//! Line-delimited record store
//!
//! One file per (account, listing) pair, named `<account>-<kind>.txt`,
//! holding one JSON record per line. Saves replace the whole file through
//! an atomic temp-file + rename so a crash mid-write never leaves a
//! half-written listing behind.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::query::QueryKind;
use crate::wire::UserRecord;

/// On-disk store for fetched user listings.
pub struct RecordStore {
    data_dir: PathBuf,
}

impl RecordStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path the listing for `account` and `kind` lives at.
    pub fn file_path(&self, account: &str, kind: QueryKind) -> PathBuf {
        self.data_dir.join(format!("{account}-{}.txt", kind.as_str()))
    }

    /// Write `records` as the complete listing for `account` and `kind`,
    /// replacing any previous file. Creates the data directory on first
    /// use. Returns the path written for logging.
    pub async fn save(
        &self,
        account: &str,
        kind: QueryKind,
        records: &[UserRecord],
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| {
                Error::Store(format!(
                    "creating data directory {}: {e}",
                    self.data_dir.display()
                ))
            })?;

        let mut contents = String::new();
        for record in records {
            let line = serde_json::to_string(record)
                .map_err(|e| Error::Store(format!("serializing record {}: {e}", record.id)))?;
            contents.push_str(&line);
            contents.push('\n');
        }

        let path = self.file_path(account, kind);
        write_atomic(&path, contents.as_bytes()).await?;
        debug!(path = %path.display(), records = records.len(), "listing saved");
        Ok(path)
    }

    /// Read the listing for `account` and `kind`, skipping blank lines.
    pub async fn load(&self, account: &str, kind: QueryKind) -> Result<Vec<UserRecord>> {
        let path = self.file_path(account, kind);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::Store(format!("reading {}: {e}", path.display())))?;

        let mut records = Vec::new();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(line)
                .map_err(|e| Error::Store(format!("malformed record in {}: {e}", path.display())))?;
            records.push(record);
        }
        Ok(records)
    }
}

/// Write to a temporary file in the same directory, then rename it over
/// the target.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::Store("listing path has no parent directory".into()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Store(format!("unusable listing path {}", path.display())))?;
    let tmp_path = dir.join(format!(".{file_name}.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, data)
        .await
        .map_err(|e| Error::Store(format!("writing temp listing file: {e}")))?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Store(format!("renaming temp listing file: {e}")))?;

    Ok(())
}
