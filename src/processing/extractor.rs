//! Pulls candidate links out of chat messages.
//!
//! Pure and deterministic: candidates come out in input message order, and
//! within a message in [`Strategy::ALL`] order.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{CandidateLink, Message, Strategy};

const HTTP_MARKER: &str = "http";
const EVENTBRITE_MARKER: &str = "eventbrite";

static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://i\.groupme\.com/\d{1,5}x\d{1,5}\.(?:jpeg|png)\.[A-Za-z0-9]+")
        .expect("image URL pattern is valid")
});

impl Strategy {
    /// Candidates this strategy finds in one message.
    pub fn extract(self, message: &Message) -> Vec<String> {
        match self {
            Strategy::EventbriteText => eventbrite_links(message.text.as_deref()),
            Strategy::DirectImageText => direct_image_link(message.text.as_deref())
                .into_iter()
                .collect(),
            Strategy::AttachmentImage => attachment_image_link(message).into_iter().collect(),
        }
    }
}

pub fn extract_candidates(messages: &[Message]) -> Vec<CandidateLink> {
    extract_with(messages, &Strategy::ALL)
}

/// Runs only the given strategies, keeping their relative order per message.
pub fn extract_with(messages: &[Message], strategies: &[Strategy]) -> Vec<CandidateLink> {
    messages
        .iter()
        .flat_map(|message| {
            strategies.iter().flat_map(move |&strategy| {
                strategy
                    .extract(message)
                    .into_iter()
                    .map(move |value| CandidateLink::new(value, strategy))
            })
        })
        .collect()
}

fn eventbrite_links(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };
    text.split_whitespace()
        .filter(|token| token.contains(HTTP_MARKER) && token.contains(EVENTBRITE_MARKER))
        .map(str::to_string)
        .collect()
}

fn direct_image_link(text: Option<&str>) -> Option<String> {
    IMAGE_URL.find(text?).map(|m| m.as_str().to_string())
}

/// Urls spanning a line break are skipped; seen links are stored one per line.
fn attachment_image_link(message: &Message) -> Option<String> {
    message
        .attachments
        .iter()
        .filter_map(|attachment| attachment.image_url())
        .find(|url| !url.contains(['\n', '\r']))
        .map(str::to_string)
}
