use std::path::Path;

use tracing::{info, warn};

use crate::error::StoreError;
use crate::processing::normalize_text;
use crate::utils::file;

/// Normalized keyword list. Matching is substring search over normalized OCR text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords(Vec<String>);

impl Keywords {
    /// Normalizes each keyword the same way OCR text is normalized; blanks are dropped.
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = Vec::new();
        for keyword in raw {
            let normalized = normalize_text(keyword.as_ref());
            if !normalized.is_empty() && !keywords.contains(&normalized) {
                keywords.push(normalized);
            }
        }
        Self(keywords)
    }

    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        match file::read_lines(path).await? {
            Some(lines) => {
                let keywords = Self::new(lines);
                info!(count = keywords.len(), path = %path.display(), "loaded keywords");
                Ok(keywords)
            }
            None => {
                warn!(path = %path.display(), "keyword file missing, no image will pass");
                Ok(Self::default())
            }
        }
    }

    pub fn matches(&self, normalized_text: &str) -> bool {
        self.0.iter().any(|keyword| normalized_text.contains(keyword.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
