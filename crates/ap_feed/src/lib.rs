pub mod images;
pub mod reader;
pub mod selection;

pub use images::FeedImageResolver;
pub use reader::HttpFeedSource;
pub use selection::{next_entry, pending_entries};

pub mod prelude {
    pub use super::images::{is_probably_content_image, FeedImageResolver};
    pub use super::reader::{order_oldest_first, parse_feed, HttpFeedSource};
    pub use super::selection::{next_entry, pending_entries};
    pub use ap_core::{Error, FeedEntry, FeedSource, ImageResolver, Result};
}
