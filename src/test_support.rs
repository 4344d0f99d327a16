//! In-memory collaborators for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::client::{ChatApi, TextDetector};
use crate::error::ClientError;
use crate::models::{Group, Message};

#[derive(Default)]
pub struct MockChat {
    groups: Vec<Group>,
    batches: Mutex<HashMap<String, VecDeque<Vec<Message>>>>,
    requests: Mutex<Vec<(String, Option<String>)>>,
    posted: Mutex<Vec<String>>,
    failing_fetches: Mutex<HashSet<String>>,
    fail_posts: AtomicBool,
    pub fetch_calls: AtomicUsize,
}

impl MockChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups(ids: &[&str]) -> Self {
        Self {
            groups: ids
                .iter()
                .map(|id| Group {
                    id: id.to_string(),
                    name: None,
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Queues the batch returned by the next fetch for `conversation_id`.
    pub fn push_batch(&self, conversation_id: &str, messages: Vec<Message>) {
        self.batches
            .lock()
            .unwrap()
            .entry(conversation_id.to_string())
            .or_default()
            .push_back(messages);
    }

    pub fn fail_fetches_for(&self, conversation_id: &str) {
        self.failing_fetches
            .lock()
            .unwrap()
            .insert(conversation_id.to_string());
    }

    pub fn fail_posts(&self) {
        self.fail_posts.store(true, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn posted(&self) -> Vec<String> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatApi for MockChat {
    async fn list_groups(&self) -> Result<Vec<Group>, ClientError> {
        Ok(self.groups.clone())
    }

    async fn fetch_messages_after(
        &self,
        conversation_id: &str,
        after_id: Option<&str>,
    ) -> Result<Vec<Message>, ClientError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((conversation_id.to_string(), after_id.map(str::to_string)));

        if self.failing_fetches.lock().unwrap().contains(conversation_id) {
            return Err(ClientError::Api {
                status: 503,
                message: "unavailable".into(),
            });
        }

        Ok(self
            .batches
            .lock()
            .unwrap()
            .get_mut(conversation_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_default())
    }

    async fn post_text(&self, text: &str) -> Result<(), ClientError> {
        if self.fail_posts.load(Ordering::SeqCst) {
            return Err(ClientError::Api {
                status: 500,
                message: "post failed".into(),
            });
        }
        self.posted.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub struct MockDetector {
    texts: HashMap<String, String>,
}

impl MockDetector {
    pub fn new(texts: &[(&str, &str)]) -> Self {
        Self {
            texts: texts
                .iter()
                .map(|(url, text)| (url.to_string(), text.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl TextDetector for MockDetector {
    async fn detect_text(&self, image_url: &str) -> Result<String, ClientError> {
        self.texts
            .get(image_url)
            .cloned()
            .ok_or_else(|| ClientError::NoText(image_url.to_string()))
    }
}
