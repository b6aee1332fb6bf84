//! Full profile discovery: scroll the author's profile to convergence and
//! pull every rendered article out of the markup.
//!
//! Expensive but complete for whatever the platform currently renders. An
//! extraction miss on every layout yields an empty list rather than an error.

use std::collections::HashSet;

use crate::browser::PageDriver;
use crate::context::RunContext;
use crate::error::ClapperError;
use crate::extract::extract_articles;
use crate::scroll::scroll_to_stable;
use crate::store::{ArticleRecord, ExcludedAuthors};

/// Source of the complete, ordered article list of the target author.
pub trait Discovery {
    async fn discover_all(&mut self) -> Result<Vec<ArticleRecord>, ClapperError>;
}

/// Discovery through the author's rendered profile page.
pub struct ProfileDiscovery<'a, P> {
    page: &'a mut P,
    ctx: &'a RunContext,
    excluded: &'a ExcludedAuthors,
}

impl<'a, P: PageDriver> ProfileDiscovery<'a, P> {
    pub fn new(page: &'a mut P, ctx: &'a RunContext, excluded: &'a ExcludedAuthors) -> Self {
        Self {
            page,
            ctx,
            excluded,
        }
    }
}

impl<P: PageDriver> Discovery for ProfileDiscovery<'_, P> {
    async fn discover_all(&mut self) -> Result<Vec<ArticleRecord>, ClapperError> {
        self.page.goto(&self.ctx.profile_url()).await?;
        scroll_to_stable(&mut *self.page, self.ctx.settings.profile_scroll).await?;
        let markup = self.page.content().await?;
        Ok(records_from_markup(&markup, self.excluded))
    }
}

/// Extract, filter excluded authors and de-duplicate, keeping first-seen order.
pub fn records_from_markup(markup: &str, excluded: &ExcludedAuthors) -> Vec<ArticleRecord> {
    let Some((layout, links)) = extract_articles(markup) else {
        tracing::warn!("no profile layout matched; nothing discovered");
        return Vec::new();
    };

    let found = links.len();
    let mut seen = HashSet::new();
    let records: Vec<ArticleRecord> = links
        .iter()
        .filter(|link| !excluded.contains_identifier(&link.author_slug))
        .map(|link| link.identifier())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .map(ArticleRecord::new)
        .collect();

    tracing::info!(%layout, found, kept = records.len(), "profile articles extracted");
    records
}
