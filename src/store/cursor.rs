use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StoreError;
use crate::utils::file;

/// Last processed message id per conversation. Ids are opaque and never compared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CursorMap(BTreeMap<String, String>);

impl CursorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, conversation_id: &str) -> Option<&str> {
        self.0.get(conversation_id).map(String::as_str)
    }

    /// Moves the cursor to the last id of a fetched batch. `None` (empty batch) leaves it untouched.
    pub fn advance(&mut self, conversation_id: &str, last_message_id: Option<&str>) -> bool {
        match last_message_id {
            Some(id) => {
                self.0.insert(conversation_id.to_string(), id.to_string());
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for CursorMap {
    fn from(entries: [(&str, &str); N]) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Older state files stored the map as an array of `[conversation, message]` pairs.
#[derive(Deserialize)]
#[serde(untagged)]
enum CursorFile {
    Object(BTreeMap<String, String>),
    Pairs(Vec<(String, String)>),
}

#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> CursorMap {
        let content = match file::read_optional(&self.path).await {
            Ok(Some(content)) => content,
            Ok(None) => return CursorMap::new(),
            Err(e) => {
                warn!(error = %e, "could not read cursor map, starting from scratch");
                return CursorMap::new();
            }
        };

        match serde_json::from_str::<CursorFile>(&content) {
            Ok(CursorFile::Object(map)) => CursorMap(map),
            Ok(CursorFile::Pairs(pairs)) => CursorMap(pairs.into_iter().collect()),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "corrupt cursor map, starting from scratch");
                CursorMap::new()
            }
        }
    }

    /// Overwrites the whole map atomically.
    pub async fn persist(&self, map: &CursorMap) -> Result<(), StoreError> {
        let json = serde_json::to_vec(map).map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })?;
        file::write_atomic(&self.path, &json).await
    }
}
