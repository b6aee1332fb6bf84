use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::browser::PageDriver;
use crate::context::RunContext;
use crate::discovery::{Discovery, ProfileDiscovery};
use crate::engage::{EngagementProgress, engage_pending};
use crate::error::ClapperError;
use crate::feed::FeedSource;
use crate::reconcile::reconcile_new;
use crate::session::{CookieJar, OperatorSignal, ensure_authenticated};
use crate::store::{ArticleQueue, ExcludedAuthors, QueueStore};

/// Operator-facing notifications of one run, on top of per-article progress.
pub trait RunReporter: EngagementProgress {
    fn status(&self, _message: &str) {}
    fn new_articles(&self, _reported: usize, _saturated: bool) {}
    fn caught_up(&self) {}
}

impl RunReporter for () {}

/// What one run did, printed as JSON with `--verbose`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub author: String,
    pub display_name: String,
    pub first_run: bool,
    /// Queue length after discovery or reconciliation.
    pub known: usize,
    pub discovered: usize,
    /// New items the feed reported; 0 on a first run.
    pub reported: usize,
    pub escalated: bool,
    pub appended: usize,
    pub pending_before: usize,
    pub engaged: usize,
    pub skipped_own: usize,
    pub clicks: u64,
    pub login_prompts: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

/// Drives one author through session gate, discovery or reconciliation, and engagement.
pub struct Orchestrator<'a, F, O> {
    pub feed: &'a F,
    pub store: &'a QueueStore,
    pub jar: &'a CookieJar,
    pub operator: &'a O,
    pub excluded_path: PathBuf,
}

/// How the queue was brought up to date before engagement.
#[derive(Debug, Default)]
struct QueueUpdate {
    first_run: bool,
    discovered: usize,
    reported: usize,
    escalated: bool,
    appended: usize,
}

impl<'a, F: FeedSource, O: OperatorSignal> Orchestrator<'a, F, O> {
    pub async fn run(
        &self,
        page: &mut impl PageDriver,
        mut ctx: RunContext,
        reporter: &impl RunReporter,
    ) -> Result<RunSummary, ClapperError> {
        let started_at = Utc::now();

        reporter.status("Checking credentials");
        let entry_url = ctx.profile_url();
        let session =
            ensure_authenticated(&mut *page, &ctx.urls, &entry_url, self.jar, self.operator).await?;
        ctx.display_name = Some(session.display_name.clone());

        let excluded = ExcludedAuthors::load(&self.excluded_path)?;
        tracing::debug!(count = excluded.len(), "excluded authors loaded");

        let (mut queue, update) = self
            .refresh_queue(&mut *page, &ctx, &excluded, reporter)
            .await?;

        reporter.status("Reading articles");
        let report = engage_pending(&mut *page, &ctx, self.store, &mut queue, reporter).await?;
        if report.pending_before == 0 {
            reporter.caught_up();
        }

        let completed_at = Utc::now();
        let summary = RunSummary {
            author: ctx.author.clone(),
            display_name: session.display_name,
            first_run: update.first_run,
            known: queue.len(),
            discovered: update.discovered,
            reported: update.reported,
            escalated: update.escalated,
            appended: update.appended,
            pending_before: report.pending_before,
            engaged: report.engaged,
            skipped_own: report.skipped_own,
            clicks: report.clicks,
            login_prompts: session.prompts,
            started_at,
            completed_at,
            duration_ms: (completed_at - started_at).num_milliseconds(),
        };
        tracing::info!(
            author = %summary.author,
            known = summary.known,
            engaged = summary.engaged,
            skipped_own = summary.skipped_own,
            "run complete"
        );

        Ok(summary)
    }

    /// Full discovery on the first run, feed reconciliation afterwards.
    /// The queue is saved before engagement starts.
    async fn refresh_queue(
        &self,
        page: &mut impl PageDriver,
        ctx: &RunContext,
        excluded: &ExcludedAuthors,
        reporter: &impl RunReporter,
    ) -> Result<(ArticleQueue, QueueUpdate), ClapperError> {
        let mut discovery = ProfileDiscovery::new(page, ctx, excluded);

        let Some(mut queue) = self.store.load(&ctx.author)? else {
            reporter.status("Discovering articles");
            let queue: ArticleQueue = discovery.discover_all().await?.into_iter().collect();
            self.store.save(&ctx.author, &queue)?;
            tracing::info!(author = %ctx.author, count = queue.len(), "first run discovery saved");

            let update = QueueUpdate {
                first_run: true,
                discovered: queue.len(),
                ..QueueUpdate::default()
            };
            return Ok((queue, update));
        };

        reporter.status("Checking for new articles");
        let reconciliation =
            reconcile_new(&ctx.author, &queue, self.feed, &mut discovery, excluded).await?;
        if reconciliation.reported > 0 {
            reporter.new_articles(reconciliation.reported, reconciliation.escalated);
        }

        let discovered = if reconciliation.escalated {
            reconciliation.records.len()
        } else {
            0
        };
        let appended = queue.extend(reconciliation.records);
        if appended > 0 {
            self.store.save(&ctx.author, &queue)?;
            tracing::info!(
                author = %ctx.author,
                appended,
                pending = queue.pending_count(),
                "new articles queued"
            );
        }

        Ok((
            queue,
            QueueUpdate {
                first_run: false,
                discovered,
                reported: reconciliation.reported,
                escalated: reconciliation.escalated,
                appended,
            },
        ))
    }
}
