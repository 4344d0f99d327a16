use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use link_scraper::client::{ChatApi, TextDetector};
use link_scraper::error::ClientError;
use link_scraper::models::{Attachment, Group, Message};
use link_scraper::processing::ImageTextClassifier;
use link_scraper::store::{CursorMap, CursorStore, SeenStore};
use link_scraper::utils::keywords::Keywords;
use link_scraper::{DiscoveryPipeline, PipelineState};
use tempfile::TempDir;

const EVENT: &str = "https://www.eventbrite.com/e/rooftop-mixer-123";

// Mock chat API serving one scripted page per conversation
struct ScriptedChat {
    pages: Mutex<HashMap<String, Vec<Message>>>,
    posted: Mutex<Vec<String>>,
}

impl ScriptedChat {
    fn new(pages: Vec<(&str, Vec<Message>)>) -> Self {
        Self {
            pages: Mutex::new(
                pages
                    .into_iter()
                    .map(|(id, messages)| (id.to_string(), messages))
                    .collect(),
            ),
            posted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatApi for ScriptedChat {
    async fn list_groups(&self) -> Result<Vec<Group>, ClientError> {
        Ok(Vec::new())
    }

    async fn fetch_messages_after(
        &self,
        conversation_id: &str,
        _after_id: Option<&str>,
    ) -> Result<Vec<Message>, ClientError> {
        Ok(self
            .pages
            .lock()
            .unwrap()
            .remove(conversation_id)
            .unwrap_or_default())
    }

    async fn post_text(&self, text: &str) -> Result<(), ClientError> {
        self.posted.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

struct FlyerReader;

#[async_trait]
impl TextDetector for FlyerReader {
    async fn detect_text(&self, image_url: &str) -> Result<String, ClientError> {
        if image_url.ends_with("flyer.png") {
            Ok("LADIES FREE before 11".to_string())
        } else {
            Err(ClientError::NoText(image_url.to_string()))
        }
    }
}

fn stores(dir: &TempDir) -> (CursorStore, SeenStore) {
    (
        CursorStore::new(dir.path().join("last_message_ids.json")),
        SeenStore::new(dir.path().join("seen_links.txt"), dir.path().join("seen_texts.txt")),
    )
}

#[tokio::test]
async fn one_cycle_publishes_new_link_and_advances_only_active_cursor() {
    let dir = TempDir::new().unwrap();
    let (cursor_store, seen_store) = stores(&dir);
    cursor_store
        .persist(&CursorMap::from([("g1", "100"), ("g2", "200")]))
        .await
        .unwrap();

    let chat = Arc::new(ScriptedChat::new(vec![(
        "g1",
        vec![Message::new("101", "g1", Some(&format!("party {EVENT}")))],
    )]));
    let pipeline = DiscoveryPipeline::new(
        chat.clone(),
        vec!["g1".to_string(), "g2".to_string()],
        cursor_store.clone(),
        seen_store.clone(),
    );

    let mut state = PipelineState::load(&cursor_store, &seen_store).await;
    let stats = pipeline.run_cycle(&mut state).await.unwrap();

    assert_eq!(stats.published, vec![EVENT.to_string()]);
    assert_eq!(*chat.posted.lock().unwrap(), vec![EVENT.to_string()]);

    // State reloaded from disk matches what the cycle committed.
    let reloaded = PipelineState::load(&cursor_store, &seen_store).await;
    assert_eq!(reloaded.cursors, CursorMap::from([("g1", "101"), ("g2", "200")]));
    assert_eq!(reloaded.seen_links.len(), 1);
    assert!(reloaded.seen_links.contains(EVENT));
}

#[tokio::test]
async fn restart_does_not_republish_after_redelivery() {
    let dir = TempDir::new().unwrap();
    let (cursor_store, seen_store) = stores(&dir);
    let flyer = "https://i.groupme.com/1080x1350.png.flyer.png";
    let batch = || {
        vec![
            Message::new("1", "g1", Some(EVENT)),
            Message::new("2", "g1", None).with_attachment(Attachment::image(flyer)),
        ]
    };
    let build = |chat: Arc<ScriptedChat>| {
        DiscoveryPipeline::new(
            chat,
            vec!["g1".to_string()],
            cursor_store.clone(),
            seen_store.clone(),
        )
        .with_image_scan(
            ImageTextClassifier::new(Arc::new(FlyerReader), 2),
            Keywords::new(["ladies free"]),
        )
    };

    let first_chat = Arc::new(ScriptedChat::new(vec![("g1", batch())]));
    let mut state = PipelineState::load(&cursor_store, &seen_store).await;
    let first = build(first_chat.clone()).run_cycle(&mut state).await.unwrap();
    assert_eq!(first.published, vec![EVENT.to_string(), flyer.to_string()]);

    // Same messages delivered again after a simulated restart.
    let second_chat = Arc::new(ScriptedChat::new(vec![("g1", batch())]));
    let mut restarted = PipelineState::load(&cursor_store, &seen_store).await;
    assert!(restarted.seen_texts.contains("ladiesfreebefore11"));
    let second = build(second_chat.clone()).run_cycle(&mut restarted).await.unwrap();

    assert!(second.published.is_empty());
    assert!(second_chat.posted.lock().unwrap().is_empty());
    assert!(restarted.seen_links.len() >= state.seen_links.len());
}
