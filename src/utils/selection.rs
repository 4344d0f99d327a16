//! Picks the conversations to poll.

use std::path::Path;

use anyhow::{Context as _, Result, bail};
use tracing::info;

use crate::client::ChatApi;
use crate::utils::file;

/// Reads the conversation-id file, seeding it from every group the account belongs to when missing.
pub async fn select_conversations(chat: &dyn ChatApi, path: &Path) -> Result<Vec<String>> {
    if let Some(ids) = file::read_lines(path).await? {
        return require_some(ids, path);
    }

    let groups = chat
        .list_groups()
        .await
        .context("no conversation list on disk and listing groups failed")?;
    let ids: Vec<String> = groups.into_iter().map(|group| group.id).collect();
    if ids.is_empty() {
        bail!("account belongs to no groups, nothing to poll");
    }
    file::write_lines(path, &ids).await?;
    info!(count = ids.len(), path = %path.display(), "saved conversation ids");

    let ids = file::read_lines(path).await?.unwrap_or_default();
    require_some(ids, path)
}

fn require_some(ids: Vec<String>, path: &Path) -> Result<Vec<String>> {
    let ids: Vec<String> = ids.into_iter().map(|id| id.trim().to_string()).collect();
    if ids.is_empty() {
        bail!("no conversations to poll (checked {})", path.display());
    }
    Ok(ids)
}
