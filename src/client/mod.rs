//! Narrow interfaces to the external collaborators, plus their HTTP adapters.

mod groupme;
mod vision;

pub use groupme::{GroupMeClient, GroupMeConfig};
pub use vision::{VisionClient, VisionConfig};

use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::{Group, Message};

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<Group>, ClientError>;

    /// Messages strictly after `after_id`, oldest first. `None` fetches from the beginning.
    async fn fetch_messages_after(
        &self,
        conversation_id: &str,
        after_id: Option<&str>,
    ) -> Result<Vec<Message>, ClientError>;

    async fn post_text(&self, text: &str) -> Result<(), ClientError>;
}

#[async_trait]
pub trait TextDetector: Send + Sync {
    /// Raw text recognised in the image at `image_url`.
    async fn detect_text(&self, image_url: &str) -> Result<String, ClientError>;
}
