use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A group chat as listed by the chat API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "group_id")]
    pub conversation_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(rename = "created_at", with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Location,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    #[serde(default)]
    pub url: Option<String>,
}

impl Attachment {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: AttachmentKind::Image,
            url: Some(url.into()),
        }
    }

    /// Url of an image attachment; `None` for every other kind.
    pub fn image_url(&self) -> Option<&str> {
        match self.kind {
            AttachmentKind::Image => self.url.as_deref(),
            _ => None,
        }
    }
}

impl Message {
    pub fn new(id: impl Into<String>, conversation_id: impl Into<String>, text: Option<&str>) -> Self {
        Self {
            id: id.into(),
            conversation_id: conversation_id.into(),
            text: text.map(str::to_string),
            attachments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_groupme_message() {
        let raw = r#"{
            "id": "1700000000123",
            "group_id": "g1",
            "name": "someone",
            "text": null,
            "created_at": 1700000000,
            "attachments": [
                {"type": "location", "lat": "44.9", "lng": "-93.2", "name": "here"},
                {"type": "image", "url": "https://i.groupme.com/640x480.png.abc"},
                {"type": "emoji", "placeholder": "x", "charmap": [[1, 2]]}
            ]
        }"#;

        let message: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(message.id, "1700000000123");
        assert_eq!(message.conversation_id, "g1");
        assert_eq!(message.text, None);
        assert_eq!(message.created_at.timestamp(), 1_700_000_000);
        assert_eq!(message.attachments[0].kind, AttachmentKind::Location);
        assert_eq!(message.attachments[0].image_url(), None);
        assert_eq!(
            message.attachments[1].image_url(),
            Some("https://i.groupme.com/640x480.png.abc")
        );
        assert_eq!(message.attachments[2].kind, AttachmentKind::Other);
    }

    #[test]
    fn missing_attachments_default_to_empty() {
        let raw = r#"{"id": "1", "group_id": "g", "text": "hi", "created_at": 0}"#;
        let message: Message = serde_json::from_str(raw).unwrap();
        assert!(message.attachments.is_empty());
    }
}
