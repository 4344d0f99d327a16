mod cursor;
mod seen;

pub use cursor::{CursorMap, CursorStore};
pub use seen::{SeenStore, filter_unseen_links, filter_unseen_texts};
