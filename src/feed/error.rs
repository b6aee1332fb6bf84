//! Error types for the lightweight article feed.
//!
//! Any non-success status is fatal for the run: reconciliation cannot
//! proceed without a trustworthy "what's new" signal.

use thiserror::Error;

/// Errors that can occur while querying the author's feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed endpoint answered with a non-2xx status.
    #[error("feed returned HTTP {status}")]
    Status { status: u16 },

    /// Transport failure (DNS, refused connection, the fixed timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The body was not the expected `{ "items": [...] }` document.
    #[error("failed to decode feed body: {0}")]
    Decode(String),
}
