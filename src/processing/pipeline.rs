//! One polling cycle: fetch, advance cursors, extract, classify, dedup, commit, publish.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::classifier::ImageTextClassifier;
use super::extractor::extract_with;
use crate::client::ChatApi;
use crate::models::{ConversationStats, CycleStats, ImageText, Message, Strategy};
use crate::store::{CursorMap, CursorStore, SeenStore, filter_unseen_links, filter_unseen_texts};
use crate::utils::keywords::Keywords;

const LINK_STRATEGIES: [Strategy; 1] = [Strategy::EventbriteText];
const IMAGE_STRATEGIES: [Strategy; 2] = [Strategy::DirectImageText, Strategy::AttachmentImage];

/// Durable state carried from one cycle to the next. Owned by the scheduler.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub cursors: CursorMap,
    pub seen_links: HashSet<String>,
    pub seen_texts: HashSet<String>,
}

impl PipelineState {
    pub async fn load(cursor_store: &CursorStore, seen_store: &SeenStore) -> Self {
        let state = Self {
            cursors: cursor_store.load().await,
            seen_links: seen_store.load_links().await,
            seen_texts: seen_store.load_texts().await,
        };
        info!(
            cursors = state.cursors.len(),
            seen_links = state.seen_links.len(),
            seen_texts = state.seen_texts.len(),
            "loaded pipeline state"
        );
        state
    }
}

struct ImageScan {
    classifier: ImageTextClassifier,
    keywords: Keywords,
}

pub struct DiscoveryPipeline {
    chat: Arc<dyn ChatApi>,
    conversation_ids: Vec<String>,
    cursor_store: CursorStore,
    seen_store: SeenStore,
    image_scan: Option<ImageScan>,
}

impl DiscoveryPipeline {
    /// Conversations are polled in the order given here, every cycle.
    pub fn new(
        chat: Arc<dyn ChatApi>,
        conversation_ids: Vec<String>,
        cursor_store: CursorStore,
        seen_store: SeenStore,
    ) -> Self {
        Self {
            chat,
            conversation_ids,
            cursor_store,
            seen_store,
            image_scan: None,
        }
    }

    /// Enables OCR keyword gating of image links. Without it image candidates are ignored.
    pub fn with_image_scan(mut self, classifier: ImageTextClassifier, keywords: Keywords) -> Self {
        self.image_scan = Some(ImageScan {
            classifier,
            keywords,
        });
        self
    }

    pub fn conversation_ids(&self) -> &[String] {
        &self.conversation_ids
    }

    /// Runs one cycle against `state`.
    ///
    /// Returns an error only when durable state could not be written; in that
    /// case nothing from the cycle is published. Cursors are written last, so a
    /// failed seen-state flush leaves them in place and the batch is fetched again.
    pub async fn run_cycle(&self, state: &mut PipelineState) -> Result<CycleStats> {
        let mut stats = CycleStats::new();

        let batches = self.fetch_all(&state.cursors, &mut stats).await;
        let next_cursors = advance_cursors(&state.cursors, &batches);

        let messages: Vec<Message> = batches
            .into_iter()
            .flat_map(|(_, messages)| messages)
            .collect();
        if messages.is_empty() {
            stats.finish();
            return Ok(stats);
        }

        let link_candidates: Vec<String> = extract_with(&messages, &LINK_STRATEGIES)
            .into_iter()
            .inspect(|c| stats.count_candidate(c.strategy))
            .map(|c| c.value)
            .collect();
        let eventbrite_links = filter_unseen_links(&link_candidates, &state.seen_links);

        let image_items = self.qualify_images(&messages, &state.seen_texts, &mut stats).await;

        let union: Vec<String> = eventbrite_links
            .into_iter()
            .chain(image_items.iter().map(|item| item.link.clone()))
            .collect();
        let publish_set = filter_unseen_links(&union, &state.seen_links);
        let new_texts: Vec<String> = image_items.into_iter().map(|item| item.text).collect();

        self.commit_seen(state, new_texts, &publish_set).await?;
        if let Some(next) = next_cursors {
            self.commit_cursors(state, next).await?;
        }
        self.publish(&publish_set, &mut stats).await;

        stats.published = publish_set;
        stats.finish();
        Ok(stats)
    }

    async fn fetch_all(&self, cursors: &CursorMap, stats: &mut CycleStats) -> Vec<(String, Vec<Message>)> {
        let fetches = self.conversation_ids.iter().map(|conversation_id| async move {
            let after_id = cursors.get(conversation_id);
            let result = self.chat.fetch_messages_after(conversation_id, after_id).await;
            (conversation_id.clone(), result)
        });

        let mut batches = Vec::with_capacity(self.conversation_ids.len());
        for (conversation_id, result) in join_all(fetches).await {
            let (messages, fetch_failed) = match result {
                Ok(messages) => (messages, false),
                Err(e) => {
                    warn!(conversation_id = %conversation_id, error = %e, "failed to fetch messages");
                    (Vec::new(), true)
                }
            };
            stats.add_conversation_stats(ConversationStats {
                conversation_id: conversation_id.clone(),
                messages_fetched: messages.len(),
                fetch_failed,
            });
            batches.push((conversation_id, messages));
        }
        batches
    }

    /// Replaces the in-memory cursors only once the advanced map is on disk.
    async fn commit_cursors(&self, state: &mut PipelineState, next: CursorMap) -> Result<()> {
        self.cursor_store
            .persist(&next)
            .await
            .context("failed to persist cursor map")?;
        state.cursors = next;
        Ok(())
    }

    async fn qualify_images(
        &self,
        messages: &[Message],
        seen_texts: &HashSet<String>,
        stats: &mut CycleStats,
    ) -> Vec<ImageText> {
        let mut unique = HashSet::new();
        let urls: Vec<String> = extract_with(messages, &IMAGE_STRATEGIES)
            .into_iter()
            .inspect(|c| stats.count_candidate(c.strategy))
            .map(|c| c.value)
            .filter(|url| unique.insert(url.clone()))
            .collect();
        if urls.is_empty() {
            return Vec::new();
        }

        let Some(scan) = &self.image_scan else {
            debug!(count = urls.len(), "image scan disabled, skipping image links");
            return Vec::new();
        };

        let passed: Vec<ImageText> = scan
            .classifier
            .classify_all(urls, &scan.keywords)
            .await
            .into_iter()
            .filter(|(_, classification)| classification.passed)
            .map(|(link, classification)| ImageText {
                text: classification.normalized_text,
                link,
            })
            .collect();
        stats.images_passed = passed.len();

        filter_unseen_texts(passed, seen_texts)
    }

    /// Each batch is flushed before it joins the in-memory set.
    async fn commit_seen(
        &self,
        state: &mut PipelineState,
        texts: Vec<String>,
        links: &[String],
    ) -> Result<()> {
        self.seen_store
            .append_texts(&texts)
            .await
            .context("failed to persist seen texts")?;
        state.seen_texts.extend(texts);

        self.seen_store
            .append_links(links)
            .await
            .context("failed to persist seen links")?;
        state.seen_links.extend(links.iter().cloned());
        Ok(())
    }

    async fn publish(&self, links: &[String], stats: &mut CycleStats) {
        let posts = links.iter().map(|link| async move {
            let result = self.chat.post_text(link).await;
            (link, result)
        });

        for (link, result) in join_all(posts).await {
            match result {
                Ok(()) => info!(link = %link, "published link"),
                Err(e) => {
                    stats.publish_failures += 1;
                    warn!(link = %link, error = %e, "could not publish link");
                }
            }
        }
    }
}

/// Cursor map moved to the tail of every non-empty batch; `None` when nothing advanced.
fn advance_cursors(cursors: &CursorMap, batches: &[(String, Vec<Message>)]) -> Option<CursorMap> {
    let mut next = cursors.clone();
    let mut advanced = false;
    for (conversation_id, messages) in batches {
        let last_id = messages.last().map(|m| m.id.as_str());
        advanced |= next.advance(conversation_id, last_id);
    }
    advanced.then_some(next)
}
