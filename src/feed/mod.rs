pub mod client;
pub mod error;
pub mod types;

pub use client::{FeedClient, FeedSource};
pub use error::FeedError;
pub use types::{FEED_PAGE_SIZE, FeedItem, FeedPage};
