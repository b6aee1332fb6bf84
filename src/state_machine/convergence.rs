use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delay and retry budget for one scroll-to-stable pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollParams {
    /// Base pause in seconds after each scroll command.
    pub delay_base: f64,
    /// Stalled attempts tolerated before the page counts as exhausted.
    pub retry_budget: u32,
}

impl ScrollParams {
    pub fn new(delay_base: f64, retry_budget: u32) -> Self {
        Self {
            delay_base,
            retry_budget,
        }
    }

    /// Pause after a scroll command on the given attempt.
    /// delay = max(0, delay_base - attempt / 5)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let secs = (self.delay_base - f64::from(attempt) / 5.0).max(0.0);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }
}

/// What a single observation did to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollStep {
    /// New content mounted; the attempt counter was reset.
    Grew,
    /// Nothing mounted; `attempt` stalls so far, still within budget.
    Stalled { attempt: u32 },
    /// The budget is spent. Terminal.
    Converged,
}

/// Reset-on-progress / increment-on-stall detector for lazily mounted pages.
///
/// Driver-agnostic: feed it one `offset_changed` flag per scroll command.
#[derive(Debug, Clone)]
pub struct ConvergenceTracker {
    params: ScrollParams,
    attempt: u32,
    steps: u32,
    converged: bool,
}

impl ConvergenceTracker {
    pub fn new(params: ScrollParams) -> Self {
        Self {
            params,
            attempt: 0,
            steps: 0,
            converged: false,
        }
    }

    /// Scroll commands observed so far.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Pause to apply after the next scroll command.
    pub fn next_delay(&self) -> Duration {
        self.params.delay_for_attempt(self.attempt)
    }

    pub fn observe(&mut self, offset_changed: bool) -> ScrollStep {
        if self.converged {
            return ScrollStep::Converged;
        }
        self.steps += 1;

        if offset_changed {
            self.attempt = 0;
            return ScrollStep::Grew;
        }

        self.attempt += 1;
        if self.attempt > self.params.retry_budget {
            self.converged = true;
            ScrollStep::Converged
        } else {
            ScrollStep::Stalled {
                attempt: self.attempt,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps_until_converged(growth_steps: u32, retry_budget: u32) -> u32 {
        let mut tracker = ConvergenceTracker::new(ScrollParams::new(0.0, retry_budget));
        let mut step = 0;
        loop {
            step += 1;
            let changed = step <= growth_steps;
            if tracker.observe(changed) == ScrollStep::Converged {
                return step;
            }
        }
    }

    #[test]
    fn terminates_exactly_retry_budget_plus_one_after_last_growth() {
        for k in 0..6 {
            for r in 0..5 {
                assert_eq!(steps_until_converged(k, r), k + r + 1, "k={k} r={r}");
            }
        }
    }

    #[test]
    fn growth_resets_the_attempt_counter() {
        let mut tracker = ConvergenceTracker::new(ScrollParams::new(0.0, 3));
        assert_eq!(tracker.observe(false), ScrollStep::Stalled { attempt: 1 });
        assert_eq!(tracker.observe(false), ScrollStep::Stalled { attempt: 2 });
        assert_eq!(tracker.observe(true), ScrollStep::Grew);
        assert_eq!(tracker.observe(false), ScrollStep::Stalled { attempt: 1 });
    }

    #[test]
    fn converged_is_terminal() {
        let mut tracker = ConvergenceTracker::new(ScrollParams::new(0.0, 0));
        assert_eq!(tracker.observe(false), ScrollStep::Converged);
        assert_eq!(tracker.observe(true), ScrollStep::Converged);
        assert_eq!(tracker.steps(), 1);
    }

    #[test]
    fn delay_decays_linearly_and_floors_at_zero() {
        let params = ScrollParams::new(0.85, 3);
        assert_eq!(params.delay_for_attempt(0), Duration::from_secs_f64(0.85));
        let second = params.delay_for_attempt(2).as_secs_f64();
        assert!((second - 0.45).abs() < 1e-9);
        assert_eq!(params.delay_for_attempt(5), Duration::ZERO);
        assert_eq!(params.delay_for_attempt(40), Duration::ZERO);
    }
}
