//! JSON file dump store
//!
//! A save never leaves a half-written file at the dump path: the dump is
//! written to `<path>.tmp`, synced, and then renamed over the target.

use crate::storage::traits::{DumpStorage, StorageError, StorageResult};
use crate::storage::{DatabaseDump, DumpMetadata};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Borrowed dump layout, so saving does not clone the item list
#[derive(Serialize)]
struct DumpView<'a, T> {
    items: &'a [T],
    metadata: &'a DumpMetadata,
}

/// Dump store backed by a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonDumpStore {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl JsonDumpStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tmp_path = tmp_path_for(&path);
        Self { path, tmp_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tmp_path(&self) -> &Path {
        &self.tmp_path
    }
}

impl DumpStorage for JsonDumpStore {
    fn load<T: DeserializeOwned>(&self) -> Option<DatabaseDump<T>> {
        load_dump(&self.path)
    }

    fn save<T: Serialize>(
        &self,
        items: &[T],
        last_data_offset: u64,
    ) -> StorageResult<DumpMetadata> {
        let metadata = DumpMetadata::now(items.len(), last_data_offset);
        let view = DumpView {
            items,
            metadata: &metadata,
        };
        write_atomic(&self.path, &self.tmp_path, &view)?;
        tracing::info!("Saved {} items to {}", items.len(), self.path.display());
        Ok(metadata)
    }
}

/// Reads the dump at `path`
///
/// A missing file and a file that does not parse both yield `None`.
pub fn load_dump<T: DeserializeOwned>(path: &Path) -> Option<DatabaseDump<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No dump at {}", path.display());
            return None;
        }
        Err(e) => {
            tracing::warn!("Cannot read dump {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(dump) => Some(dump),
        Err(e) => {
            tracing::warn!(
                "Ignoring unreadable dump {} ({}); it will be replaced on the next save",
                path.display(),
                e
            );
            None
        }
    }
}

/// Writes `dump` to `path` atomically
pub fn save_dump<T: Serialize>(dump: &DatabaseDump<T>, path: &Path) -> StorageResult<()> {
    write_atomic(path, &tmp_path_for(path), dump)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => return Ok(()),
    };

    if !parent.exists() {
        fs::create_dir_all(parent)?;
        tracing::info!("Created directory: {}", parent.display());
    }
    Ok(())
}

fn write_atomic<V: Serialize>(path: &Path, tmp_path: &Path, value: &V) -> StorageResult<()> {
    if path.file_name().is_none() {
        return Err(StorageError::InvalidPath(path.to_path_buf()));
    }
    ensure_parent_dir(path)?;

    let result = write_file(tmp_path, value)
        .and_then(|()| fs::rename(tmp_path, path).map_err(StorageError::from));

    if result.is_err() {
        // The target is untouched; only the temp file can be partial.
        let _ = fs::remove_file(tmp_path);
    }
    result
}

fn write_file<V: Serialize>(path: &Path, value: &V) -> StorageResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}
