use std::time::Duration;

use tracing::{error, info};

use super::pipeline::{DiscoveryPipeline, PipelineState};
use crate::models::CycleStats;

/// Drives the pipeline forever: one full cycle, then a fixed sleep. Cycles never overlap.
pub struct Scheduler {
    pipeline: DiscoveryPipeline,
    state: PipelineState,
    interval: Duration,
    cycles: u64,
}

impl Scheduler {
    pub fn new(pipeline: DiscoveryPipeline, state: PipelineState, interval: Duration) -> Self {
        Self {
            pipeline,
            state,
            interval,
            cycles: 0,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Runs a single cycle. A failed cycle is logged and reported as `None`.
    pub async fn tick(&mut self) -> Option<CycleStats> {
        self.cycles += 1;
        match self.pipeline.run_cycle(&mut self.state).await {
            Ok(stats) => {
                stats.log_summary();
                Some(stats)
            }
            Err(e) => {
                error!(cycle = self.cycles, error = ?e, "cycle failed, retrying after the next interval");
                None
            }
        }
    }

    pub async fn run(mut self) {
        info!(
            conversations = self.pipeline.conversation_ids().len(),
            interval = ?self.interval,
            "starting poll loop"
        );
        loop {
            self.tick().await;
            tokio::time::sleep(self.interval).await;
        }
    }
}
