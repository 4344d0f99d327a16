//! Line-delimited and whole-file primitives behind the persisted stores.

use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;

pub const ITEM_SEPARATOR: &str = "\n";

/// Reads a file, treating a missing file as `None`.
pub async fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Splits content into non-empty lines; tolerates CRLF endings.
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .split(ITEM_SEPARATOR)
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn read_lines(path: &Path) -> Result<Option<Vec<String>>, StoreError> {
    Ok(read_optional(path).await?.map(|content| split_lines(&content)))
}

/// Appends one line per item and syncs before returning. Prior content is never rewritten.
pub async fn append_lines(path: &Path, items: &[String]) -> Result<(), StoreError> {
    if items.is_empty() {
        return Ok(());
    }
    ensure_parent(path).await?;

    let mut buffer = String::new();
    for item in items {
        buffer.push_str(item);
        buffer.push_str(ITEM_SEPARATOR);
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    file.write_all(buffer.as_bytes())
        .await
        .map_err(|e| StoreError::io(path, e))?;
    file.sync_all().await.map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

/// Replaces the whole file: writes a sibling temp file, syncs it, then renames over the target.
pub async fn write_atomic(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    ensure_parent(path).await?;
    let tmp = temp_path(path);

    let mut file = fs::File::create(&tmp)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    file.write_all(content)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    file.sync_all().await.map_err(|e| StoreError::io(&tmp, e))?;
    drop(file);

    fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))
}

pub async fn write_lines(path: &Path, items: &[String]) -> Result<(), StoreError> {
    let content = items.join(ITEM_SEPARATOR);
    write_atomic(path, content.as_bytes()).await
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

async fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e)),
        _ => Ok(()),
    }
}
