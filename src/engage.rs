//! Engagement executor: read and clap every pending article of the queue.
//!
//! Each record is persisted the moment it is handled, so an interrupted run
//! loses at most the article in flight and the next run resumes after the
//! last persisted one.

use chrono::Utc;
use tokio::time::sleep;

use crate::browser::PageDriver;
use crate::context::RunContext;
use crate::error::ClapperError;
use crate::extract::{byline, parse_clap_count};
use crate::scroll::scroll_to_stable;
use crate::store::{ArticleQueue, QueueStore};

/// Platform maximum of claps one account can give an article.
pub const CLAP_CEILING: u32 = 50;

pub const HEADER_CLAP_BUTTON: &str = "button[data-testid='headerClapButton']";
pub const FOOTER_CLAP_BUTTON: &str = "button[data-testid='footerClapButton']";

/// Inline style carried by the counter that pops up after a clap.
pub const CLAP_COUNT_ANIMATION: &str = "animation: 400ms ease-out 500ms 1 normal none running k";

/// Extra clicks to issue after the first clap, given the counter rendered after it.
///
/// Whether or not `rendered` already reflects the first click, the total
/// never exceeds [`CLAP_CEILING`].
pub fn remaining_claps(target: u32, rendered: u32) -> u32 {
    target
        .saturating_sub(1)
        .min((CLAP_CEILING - 1).saturating_sub(rendered))
}

/// How one article was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleOutcome {
    Clapped { clicks: u32, rendered: u32 },
    /// Written by the logged-in account; no interaction.
    OwnArticle,
}

/// Receives per-article progress from [`engage_pending`].
pub trait EngagementProgress {
    fn begin(&self, _pending: usize) {}
    fn advance(&self, _identifier: &str, _outcome: &ArticleOutcome) {}
    fn finish(&self) {}
}

impl EngagementProgress for () {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngagementReport {
    pub pending_before: usize,
    pub engaged: usize,
    pub skipped_own: usize,
    pub clicks: u64,
}

/// Engage every record with `engaged = false`, in queue order.
pub async fn engage_pending(
    page: &mut impl PageDriver,
    ctx: &RunContext,
    store: &QueueStore,
    queue: &mut ArticleQueue,
    progress: &impl EngagementProgress,
) -> Result<EngagementReport, ClapperError> {
    let pending = queue.pending();
    let mut report = EngagementReport {
        pending_before: pending.len(),
        ..EngagementReport::default()
    };
    if pending.is_empty() {
        tracing::info!(author = %ctx.author, "no pending articles");
        return Ok(report);
    }

    progress.begin(pending.len());
    for index in pending {
        let identifier = queue.records()[index].identifier().to_string();
        let outcome = engage_article(&mut *page, ctx, &identifier).await?;

        queue.mark_engaged(index, Utc::now());
        store.save(&ctx.author, queue)?;

        match outcome {
            ArticleOutcome::Clapped { clicks, .. } => report.clicks += u64::from(clicks),
            ArticleOutcome::OwnArticle => report.skipped_own += 1,
        }
        report.engaged += 1;
        progress.advance(&identifier, &outcome);
    }
    progress.finish();

    Ok(report)
}

async fn engage_article(
    page: &mut impl PageDriver,
    ctx: &RunContext,
    identifier: &str,
) -> Result<ArticleOutcome, ClapperError> {
    page.goto(&ctx.article_url(identifier)).await?;

    let markup = page.content().await?;
    match byline(&markup) {
        Some(author) if ctx.is_own(&author) => {
            tracing::info!(identifier, "own article; not clapping");
            return Ok(ArticleOutcome::OwnArticle);
        }
        Some(_) => {}
        None => tracing::warn!(identifier, "byline not found; treating as someone else's"),
    }

    page.click(HEADER_CLAP_BUTTON).await?;
    let rendered = page
        .styled_text("div", CLAP_COUNT_ANIMATION)
        .await?
        .as_deref()
        .and_then(parse_clap_count)
        .unwrap_or(0);
    let extra = remaining_claps(ctx.settings.claps, rendered);
    for _ in 0..extra {
        page.click(HEADER_CLAP_BUTTON).await?;
    }
    tracing::debug!(identifier, rendered, clicks = extra + 1, "clapped");

    scroll_to_stable(&mut *page, ctx.settings.article_scroll).await?;
    page.reveal_visible(FOOTER_CLAP_BUTTON).await?;
    sleep(ctx.settings.read_time).await;

    Ok(ArticleOutcome::Clapped {
        clicks: extra + 1,
        rendered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakePage;
    use crate::config::{RunSettings, SiteUrls};
    use crate::state_machine::ScrollParams;
    use crate::store::ArticleRecord;
    use std::cell::RefCell;
    use std::time::Duration;
    use tempfile::TempDir;

    const OTHER_BYLINE: &str = "<footer><span>Written by <!-- -->Jane Doe</span></footer>";
    const OWN_BYLINE: &str = "<footer><span>Written by <!-- -->Sam Reader</span></footer>";

    fn context(claps: u32) -> RunContext {
        let mut ctx = RunContext::new(
            "@jane",
            RunSettings {
                profile_scroll: ScrollParams::new(0.0, 1),
                article_scroll: ScrollParams::new(0.0, 1),
                claps,
                read_time: Duration::ZERO,
            },
            SiteUrls::new("https://medium.com"),
        );
        ctx.display_name = Some("Sam Reader".into());
        ctx
    }

    fn url(id: &str) -> String {
        format!("https://medium.com/@jane/{id}")
    }

    fn queue(ids: &[&str]) -> ArticleQueue {
        ids.iter().map(|id| ArticleRecord::new(*id)).collect()
    }

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl EngagementProgress for Recorder {
        fn begin(&self, pending: usize) {
            self.events.borrow_mut().push(format!("begin {pending}"));
        }
        fn advance(&self, identifier: &str, _outcome: &ArticleOutcome) {
            self.events.borrow_mut().push(identifier.to_string());
        }
        fn finish(&self) {
            self.events.borrow_mut().push("finish".into());
        }
    }

    #[test]
    fn budget_is_clamped_at_the_ceiling() {
        let remaining: Vec<u32> = [0, 10, 49, 50].iter().map(|&c| remaining_claps(50, c)).collect();
        assert_eq!(remaining, vec![49, 39, 0, 0]);
    }

    #[test]
    fn budget_respects_smaller_targets() {
        assert_eq!(remaining_claps(10, 0), 9);
        assert_eq!(remaining_claps(10, 45), 4);
        assert_eq!(remaining_claps(1, 0), 0);
        assert_eq!(remaining_claps(50, 120), 0);
    }

    #[tokio::test]
    async fn claps_up_to_target_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = QueueStore::new(dir.path());
        let mut page = FakePage::new()
            .with_page(&url("aaa111"), OTHER_BYLINE)
            .with_page(&url("bbb222"), OTHER_BYLINE)
            .with_styled_text(&url("bbb222"), "+11");
        let mut queue = queue(&["aaa111", "bbb222"]);

        let report = engage_pending(&mut page, &context(50), &store, &mut queue, &())
            .await
            .unwrap();

        assert_eq!(report.engaged, 2);
        assert_eq!(report.skipped_own, 0);
        // 1 + 49 with no rendered counter, 1 + 38 once 11 are shown.
        assert_eq!(report.clicks, 50 + 39);
        assert_eq!(page.clicks_on(HEADER_CLAP_BUTTON), 89);
        assert_eq!(page.revealed, vec![FOOTER_CLAP_BUTTON.to_string(); 2]);
        let saved = store.load("@jane").unwrap().unwrap();
        assert!(saved.records().iter().all(ArticleRecord::is_engaged));
        assert!(saved.records().iter().all(|r| r.engaged_at().is_some()));
    }

    #[tokio::test]
    async fn own_articles_are_marked_without_clicks() {
        let dir = TempDir::new().unwrap();
        let store = QueueStore::new(dir.path());
        let mut page = FakePage::new().with_page(&url("own999"), OWN_BYLINE);
        let mut queue = queue(&["own999"]);

        let report = engage_pending(&mut page, &context(50), &store, &mut queue, &())
            .await
            .unwrap();

        assert_eq!(report.skipped_own, 1);
        assert_eq!(report.engaged, 1);
        assert_eq!(page.clicks_on(HEADER_CLAP_BUTTON), 0);
        assert_eq!(page.scroll_commands, 0);
        assert!(store.load("@jane").unwrap().unwrap().records()[0].is_engaged());
    }

    #[tokio::test]
    async fn nothing_pending_does_nothing() {
        let dir = TempDir::new().unwrap();
        let store = QueueStore::new(dir.path());
        let mut queue = queue(&["a"]);
        queue.mark_engaged(0, Utc::now());
        let mut page = FakePage::new();
        let recorder = Recorder::default();

        let report = engage_pending(&mut page, &context(50), &store, &mut queue, &recorder)
            .await
            .unwrap();

        assert_eq!(report, EngagementReport::default());
        assert!(page.visits.is_empty());
        assert!(recorder.events.borrow().is_empty());
        assert!(store.load("@jane").unwrap().is_none());
    }

    #[tokio::test]
    async fn interrupted_run_resumes_after_last_persisted_article() {
        let dir = TempDir::new().unwrap();
        let store = QueueStore::new(dir.path());
        let ids = ["a1", "b2", "c3", "d4"];
        store.save("@jane", &queue(&ids)).unwrap();

        let mut crashing = FakePage::new().failing_on(&url("c3"));
        let mut first = store.load("@jane").unwrap().unwrap();
        let err = engage_pending(&mut crashing, &context(5), &store, &mut first, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ClapperError::Driver(_)));

        let persisted = store.load("@jane").unwrap().unwrap();
        let engaged: Vec<bool> = persisted.records().iter().map(|r| r.is_engaged()).collect();
        assert_eq!(engaged, vec![true, true, false, false]);
        let first_stamp = persisted.records()[0].engaged_at();

        let mut page = FakePage::new();
        let mut resumed = persisted;
        let recorder = Recorder::default();
        let report = engage_pending(&mut page, &context(5), &store, &mut resumed, &recorder)
            .await
            .unwrap();

        assert_eq!(report.pending_before, 2);
        assert_eq!(page.visits, vec![url("c3"), url("d4")]);
        assert_eq!(
            *recorder.events.borrow(),
            vec!["begin 2".to_string(), "c3".into(), "d4".into(), "finish".into()]
        );
        let done = store.load("@jane").unwrap().unwrap();
        assert!(done.records().iter().all(ArticleRecord::is_engaged));
        assert_eq!(done.records()[0].engaged_at(), first_stamp);
    }
}
