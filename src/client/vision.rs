use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::TextDetector;
use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

/// Google Cloud Vision `images:annotate` client doing TEXT_DETECTION on remote images.
#[derive(Debug, Clone)]
pub struct VisionClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }
}

#[async_trait]
impl TextDetector for VisionClient {
    async fn detect_text(&self, image_url: &str) -> Result<String, ClientError> {
        let url = format!("{}/images:annotate", self.base_url);
        let body = json!({
            "requests": [{
                "image": { "source": { "imageUri": image_url } },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let annotated: AnnotateResponse = response.json().await?;
        let image = annotated
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Payload("annotate response without entries".into()))?;

        if let Some(error) = image.error {
            return Err(ClientError::Api {
                status: error.code,
                message: error.message,
            });
        }

        let text: String = image
            .text_annotations
            .iter()
            .map(|annotation| annotation.description.as_str())
            .collect();
        if text.is_empty() {
            return Err(ClientError::NoText(image_url.to_string()));
        }
        Ok(text)
    }
}
