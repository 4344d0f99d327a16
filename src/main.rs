use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use tokio::signal::ctrl_c;
use tracing::{info, warn};

use link_scraper::client::{ChatApi, GroupMeClient, VisionClient};
use link_scraper::processing::ImageTextClassifier;
use link_scraper::store::{CursorStore, SeenStore};
use link_scraper::utils::keywords::Keywords;
use link_scraper::utils::selection::select_conversations;
use link_scraper::{Config, DiscoveryPipeline, PipelineState, Scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;
    link_scraper::logging::init_tracing(&config.log_level, config.log_json)?;

    let chat: Arc<dyn ChatApi> =
        Arc::new(GroupMeClient::new(config.groupme()).context("failed to build GroupMe client")?);

    let conversation_ids = select_conversations(chat.as_ref(), &config.group_ids_path()).await?;
    info!(count = conversation_ids.len(), "tracking conversations");

    let cursor_store = CursorStore::new(config.cursors_path());
    let seen_store = SeenStore::new(config.seen_links_path(), config.seen_texts_path());
    let state = PipelineState::load(&cursor_store, &seen_store).await;

    let mut pipeline = DiscoveryPipeline::new(chat, conversation_ids, cursor_store, seen_store);
    match config.vision() {
        Some(vision) => {
            let detector = Arc::new(VisionClient::new(vision).context("failed to build Vision client")?);
            let keywords = Keywords::load(&config.keywords_path).await?;
            pipeline = pipeline.with_image_scan(
                ImageTextClassifier::new(detector, config.ocr_concurrency),
                keywords,
            );
        }
        None => warn!("VISION_API_KEY not set, only eventbrite links will be relayed"),
    }

    let scheduler = Scheduler::new(pipeline, state, config.poll_interval());

    tokio::select! {
        _ = scheduler.run() => {}
        result = ctrl_c() => {
            result.context("failed to listen for Ctrl+C")?;
            info!("received Ctrl+C, stopping");
        }
    }

    Ok(())
}
