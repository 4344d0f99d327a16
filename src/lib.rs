//! Polls GroupMe conversations for event links and flyer images, filters out
//! anything already relayed, and reposts the rest through a bot.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod processing;
pub mod store;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use processing::{DiscoveryPipeline, PipelineState, Scheduler};
