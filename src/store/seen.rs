use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::ImageText;
use crate::utils::file;

/// Append-only record of links and OCR texts that were already emitted.
#[derive(Debug, Clone)]
pub struct SeenStore {
    links_path: PathBuf,
    texts_path: PathBuf,
}

impl SeenStore {
    pub fn new(links_path: impl Into<PathBuf>, texts_path: impl Into<PathBuf>) -> Self {
        Self {
            links_path: links_path.into(),
            texts_path: texts_path.into(),
        }
    }

    pub async fn load_links(&self) -> HashSet<String> {
        load_set(&self.links_path).await
    }

    pub async fn load_texts(&self) -> HashSet<String> {
        load_set(&self.texts_path).await
    }

    pub async fn append_links(&self, values: &[String]) -> Result<(), StoreError> {
        file::append_lines(&self.links_path, values).await?;
        debug!(count = values.len(), path = %self.links_path.display(), "appended seen links");
        Ok(())
    }

    pub async fn append_texts(&self, values: &[String]) -> Result<(), StoreError> {
        file::append_lines(&self.texts_path, values).await?;
        debug!(count = values.len(), path = %self.texts_path.display(), "appended seen texts");
        Ok(())
    }
}

async fn load_set(path: &Path) -> HashSet<String> {
    match file::read_lines(path).await {
        Ok(Some(lines)) => lines.into_iter().collect(),
        Ok(None) => HashSet::new(),
        Err(e) => {
            warn!(error = %e, "could not read seen set, starting empty");
            HashSet::new()
        }
    }
}

/// Keeps the first occurrence of every value not already in `seen`.
pub fn filter_unseen_links(candidates: &[String], seen: &HashSet<String>) -> Vec<String> {
    let mut emitted = HashSet::new();
    candidates
        .iter()
        .filter(|link| !seen.contains(*link) && emitted.insert(link.as_str()))
        .cloned()
        .collect()
}

/// Same as [`filter_unseen_links`], keyed by OCR text.
pub fn filter_unseen_texts(items: Vec<ImageText>, seen: &HashSet<String>) -> Vec<ImageText> {
    let mut emitted = HashSet::new();
    items
        .into_iter()
        .filter(|item| !seen.contains(&item.text) && emitted.insert(item.text.clone()))
        .collect()
}
