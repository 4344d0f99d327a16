pub mod classifier;
pub mod extractor;
pub mod pipeline;
pub mod scheduler;

pub use classifier::{Classification, ImageTextClassifier, normalize_text};
pub use extractor::{extract_candidates, extract_with};
pub use pipeline::{DiscoveryPipeline, PipelineState};
pub use scheduler::Scheduler;
