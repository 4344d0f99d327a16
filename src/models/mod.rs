mod candidate;
mod message;
mod stats;

pub use candidate::{CandidateLink, ImageText, Strategy};
pub use message::{Attachment, AttachmentKind, Group, Message};
pub use stats::{ConversationStats, CycleStats};
