//! Wire types for the rss2json feed document.

use serde::{Deserialize, Serialize};

/// Number of items the feed provider returns at most for one author.
pub const FEED_PAGE_SIZE: usize = 10;

/// One page of the author's most recent items, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub items: Vec<FeedItem>,
}

/// A single feed entry. Only the fields reconciliation needs are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Permalink such as `https://medium.com/p/1f2e3d4c5b6a`.
    pub guid: String,
    /// Display name of the author (not the `@slug`).
    #[serde(default)]
    pub author: String,
}

impl FeedItem {
    /// The article identifier: the final path segment of `guid`.
    pub fn identifier(&self) -> &str {
        self.guid
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.guid)
    }
}
