use std::time::{Duration, Instant};

use tracing::info;

use super::Strategy;

#[derive(Debug, Default, Clone)]
pub struct ConversationStats {
    pub conversation_id: String,
    pub messages_fetched: usize,
    pub fetch_failed: bool,
}

/// What one discovery cycle saw and did.
#[derive(Debug)]
pub struct CycleStats {
    pub conversations: Vec<ConversationStats>,
    pub total_messages: usize,
    pub eventbrite_candidates: usize,
    pub image_candidates: usize,
    pub images_passed: usize,
    pub published: Vec<String>,
    pub publish_failures: usize,
    pub start_time: Instant,
    pub time_taken: Duration,
}

impl CycleStats {
    pub fn new() -> Self {
        Self {
            conversations: Vec::new(),
            total_messages: 0,
            eventbrite_candidates: 0,
            image_candidates: 0,
            images_passed: 0,
            published: Vec::new(),
            publish_failures: 0,
            start_time: Instant::now(),
            time_taken: Duration::default(),
        }
    }

    pub fn add_conversation_stats(&mut self, stats: ConversationStats) {
        self.total_messages += stats.messages_fetched;
        self.conversations.push(stats);
    }

    pub fn count_candidate(&mut self, strategy: Strategy) {
        if strategy.is_image() {
            self.image_candidates += 1;
        } else {
            self.eventbrite_candidates += 1;
        }
    }

    pub fn finish(&mut self) {
        self.time_taken = self.start_time.elapsed();
    }

    pub fn log_summary(&self) {
        info!(
            messages = self.total_messages,
            eventbrite_candidates = self.eventbrite_candidates,
            image_candidates = self.image_candidates,
            images_passed = self.images_passed,
            published = self.published.len(),
            publish_failures = self.publish_failures,
            time_taken = ?self.time_taken,
            "cycle finished"
        );

        for stats in self.conversations.iter().filter(|s| s.messages_fetched > 0 || s.fetch_failed) {
            info!(
                conversation_id = %stats.conversation_id,
                messages = stats.messages_fetched,
                fetch_failed = stats.fetch_failed,
                "conversation breakdown"
            );
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}
