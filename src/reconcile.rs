//! Incremental reconciliation of a known queue against the author's feed.
//!
//! The feed only reports the last [`FEED_PAGE_SIZE`] items. When that window
//! is saturated the true number of new articles may be larger, and the run
//! escalates to a full profile discovery.

use std::collections::HashSet;

use crate::discovery::Discovery;
use crate::error::ClapperError;
use crate::feed::{FEED_PAGE_SIZE, FeedPage, FeedSource};
use crate::store::{ArticleQueue, ArticleRecord, ExcludedAuthors};

/// What to do with one feed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcilePlan {
    /// Nothing in the feed is new.
    UpToDate,
    /// The diff is trustworthy; append these identifiers.
    Accept(Vec<String>),
    /// The window is saturated; `reported` new items were visible in it.
    Escalate { reported: usize },
}

/// Result of [`reconcile_new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// New records in discovery order, none engaged.
    pub records: Vec<ArticleRecord>,
    /// New items the feed itself showed.
    pub reported: usize,
    pub escalated: bool,
}

/// Decide how far to trust a feed page.
///
/// The page is saturated when the provider returned a full window and the
/// oldest surviving item is not already known: with no overlap at the tail,
/// more new articles may sit just past the window.
pub fn plan_reconciliation(
    existing: &ArticleQueue,
    page: &FeedPage,
    excluded: &ExcludedAuthors,
    page_size: usize,
) -> ReconcilePlan {
    let mut seen = HashSet::new();
    let visible: Vec<&str> = page
        .items
        .iter()
        .filter(|item| !excluded.contains_name(&item.author))
        .map(|item| item.identifier())
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .collect();

    let fresh: Vec<String> = visible
        .iter()
        .filter(|id| !existing.contains(id))
        .map(|id| id.to_string())
        .collect();
    if fresh.is_empty() {
        return ReconcilePlan::UpToDate;
    }

    let full_window = page.items.len() >= page_size;
    let anchored = visible.last().is_some_and(|oldest| existing.contains(oldest));
    if full_window && !anchored {
        ReconcilePlan::Escalate {
            reported: fresh.len(),
        }
    } else {
        ReconcilePlan::Accept(fresh)
    }
}

/// Find the articles of `author` that `existing` does not know yet.
pub async fn reconcile_new(
    author: &str,
    existing: &ArticleQueue,
    feed: &impl FeedSource,
    discovery: &mut impl Discovery,
    excluded: &ExcludedAuthors,
) -> Result<Reconciliation, ClapperError> {
    let page = feed.latest(author).await?;
    let plan = plan_reconciliation(existing, &page, excluded, FEED_PAGE_SIZE);
    tracing::debug!(author, items = page.items.len(), ?plan, "reconciliation planned");

    let reconciliation = match plan {
        ReconcilePlan::UpToDate => Reconciliation {
            records: Vec::new(),
            reported: 0,
            escalated: false,
        },
        ReconcilePlan::Accept(ids) => Reconciliation {
            reported: ids.len(),
            records: ids.into_iter().map(ArticleRecord::new).collect(),
            escalated: false,
        },
        ReconcilePlan::Escalate { reported } => {
            tracing::info!(author, reported, "feed window saturated; running full discovery");
            let records = discovery
                .discover_all()
                .await?
                .into_iter()
                .filter(|record| !existing.contains(record.identifier()))
                .collect();
            Reconciliation {
                records,
                reported,
                escalated: true,
            }
        }
    };

    Ok(reconciliation)
}
