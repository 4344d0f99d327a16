use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::client::{GroupMeConfig, VisionConfig};
use crate::error::ConfigError;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Relays event links found in GroupMe chats", long_about = None)]
pub struct Config {
    /// GroupMe access token
    #[arg(long, env = "GROUPME_TOKEN", hide_env_values = true)]
    pub groupme_token: String,

    /// Bot that reposts discovered links
    #[arg(long, env = "GROUPME_BOT_ID")]
    pub bot_id: String,

    #[arg(long, env = "GROUPME_API_URL", default_value = "https://api.groupme.com/v3")]
    pub groupme_api_url: String,

    /// Google Cloud Vision API key; image links are ignored without it
    #[arg(long, env = "VISION_API_KEY", hide_env_values = true)]
    pub vision_api_key: Option<String>,

    #[arg(long, env = "VISION_API_URL", default_value = "https://vision.googleapis.com/v1")]
    pub vision_api_url: String,

    /// Seconds to wait between polling cycles
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value = "60")]
    pub poll_interval_secs: u64,

    /// Messages requested per conversation per cycle
    #[arg(long, env = "PAGE_LIMIT", default_value = "100")]
    pub page_limit: u32,

    /// Maximum OCR requests in flight
    #[arg(long, env = "OCR_CONCURRENCY", default_value = "4")]
    pub ocr_concurrency: usize,

    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "30")]
    pub http_timeout_secs: u64,

    /// Directory holding conversation ids, cursors and seen sets
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[arg(long, env = "KEYWORDS_PATH", default_value = "keywords.txt")]
    pub keywords_path: PathBuf,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.groupme_token.trim().is_empty() {
            return Err(ConfigError::Empty { name: "GROUPME_TOKEN" });
        }
        if self.bot_id.trim().is_empty() {
            return Err(ConfigError::Empty { name: "GROUPME_BOT_ID" });
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Zero { name: "POLL_INTERVAL_SECS" });
        }
        if self.page_limit == 0 {
            return Err(ConfigError::Zero { name: "PAGE_LIMIT" });
        }
        if self.ocr_concurrency == 0 {
            return Err(ConfigError::Zero { name: "OCR_CONCURRENCY" });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn group_ids_path(&self) -> PathBuf {
        self.data_dir.join("group_ids.txt")
    }

    pub fn cursors_path(&self) -> PathBuf {
        self.data_dir.join("last_message_ids.json")
    }

    pub fn seen_links_path(&self) -> PathBuf {
        self.data_dir.join("seen_links.txt")
    }

    pub fn seen_texts_path(&self) -> PathBuf {
        self.data_dir.join("seen_texts.txt")
    }

    pub fn groupme(&self) -> GroupMeConfig {
        GroupMeConfig {
            base_url: self.groupme_api_url.clone(),
            token: self.groupme_token.clone(),
            bot_id: self.bot_id.clone(),
            page_limit: self.page_limit,
            timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }

    /// `None` when no (non-blank) API key is configured.
    pub fn vision(&self) -> Option<VisionConfig> {
        let api_key = self.vision_api_key.as_deref()?.trim();
        if api_key.is_empty() {
            return None;
        }
        Some(VisionConfig {
            base_url: self.vision_api_url.clone(),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(self.http_timeout_secs),
        })
    }
}
