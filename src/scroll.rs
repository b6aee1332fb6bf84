//! Scroll-until-stable over any [`PageDriver`].
//!
//! Profile and article pages mount content lazily as the viewport nears the
//! bottom and never signal "load complete", so exhaustion is inferred with a
//! [`ConvergenceTracker`].

use tokio::time::sleep;

use crate::browser::{DriverError, PageDriver};
use crate::state_machine::{ConvergenceTracker, ScrollParams, ScrollStep};

/// Scroll to the bottom until the page stops growing. Returns the number of
/// scroll commands issued.
pub async fn scroll_to_stable(
    page: &mut impl PageDriver,
    params: ScrollParams,
) -> Result<u32, DriverError> {
    let mut tracker = ConvergenceTracker::new(params);

    while !tracker.is_converged() {
        let before = page.scroll_extent().await?;
        page.scroll_to_bottom().await?;
        sleep(tracker.next_delay()).await;
        let after = page.scroll_extent().await?;

        match tracker.observe(after != before) {
            ScrollStep::Grew => tracing::trace!(extent = after, "page grew"),
            ScrollStep::Stalled { attempt } => {
                tracing::trace!(attempt, retry_budget = params.retry_budget, "scroll stalled")
            }
            ScrollStep::Converged => {}
        }
    }

    tracing::debug!(
        steps = tracker.steps(),
        retry_budget = params.retry_budget,
        "scroll converged"
    );
    Ok(tracker.steps())
}
