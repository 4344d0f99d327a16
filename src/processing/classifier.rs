use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::client::TextDetector;
use crate::utils::keywords::Keywords;

/// Lowercases and drops everything that is not a letter or digit, spaces included.
pub fn normalize_text(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    pub passed: bool,
    pub normalized_text: String,
}

/// OCRs image links and tests the result against keywords.
#[derive(Clone)]
pub struct ImageTextClassifier {
    detector: Arc<dyn TextDetector>,
    concurrency: usize,
}

impl ImageTextClassifier {
    pub fn new(detector: Arc<dyn TextDetector>, concurrency: usize) -> Self {
        Self {
            detector,
            concurrency: concurrency.max(1),
        }
    }

    /// Never fails: an OCR error classifies as not passed with empty text.
    pub async fn classify(&self, url: &str, keywords: &Keywords) -> Classification {
        let raw = match self.detector.detect_text(url).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(url, error = %e, "text detection failed");
                return Classification::default();
            }
        };

        let normalized_text = normalize_text(&raw);
        let passed = keywords.matches(&normalized_text);
        debug!(url, passed, "classified image");
        Classification {
            passed,
            normalized_text,
        }
    }

    /// Classifies every url with at most `concurrency` OCR calls in flight. Results keep input order.
    pub async fn classify_all(
        &self,
        urls: Vec<String>,
        keywords: &Keywords,
    ) -> Vec<(String, Classification)> {
        stream::iter(urls)
            .map(|url| async move {
                let classification = self.classify(&url, keywords).await;
                (url, classification)
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
