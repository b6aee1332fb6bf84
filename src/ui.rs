//! Terminal output for a run: spinner, per-article progress bar and the
//! operator login prompt.
//!
//! Uses `indicatif` for the spinner/bar and `console` for colours. Log
//! events go through `tracing`; this module only talks to the operator.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::engage::{ArticleOutcome, EngagementProgress};
use crate::error::ClapperError;
use crate::orchestrator::{RunReporter, RunSummary};
use crate::session::OperatorSignal;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const BAR_TEMPLATE: &str =
    "{spinner:.cyan} Reading and clapping articles ({pos} of {len}) [{bar:30.cyan/blue}] {elapsed}";

/// Operator-facing progress of one run.
pub struct RunProgress {
    pb: ProgressBar,
    green: Style,
    yellow: Style,
    cyan: Style,
}

impl RunProgress {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            yellow: Style::new().yellow(),
            cyan: Style::new().cyan(),
        }
    }

    /// Login prompt that draws around this spinner.
    pub fn login_prompt(&self, interactive: bool) -> ConsolePrompt {
        ConsolePrompt::new(interactive, self.pb.clone())
    }

    /// Clear the bar without a closing line, after a failed run.
    pub fn abandon(&self) {
        self.pb.finish_and_clear();
    }

    /// Clear the bar and print the closing line.
    pub fn complete(&self, summary: &RunSummary) {
        self.pb.finish_and_clear();
        println!(
            "  {} Done: {} engaged, {} own skipped, {} articles known for {}",
            self.green.apply_to("✓"),
            summary.engaged,
            summary.skipped_own,
            summary.known,
            summary.author
        );
    }

    pub fn print_summary(&self, summary: &RunSummary) {
        println!();
        println!("{}", self.cyan.apply_to("─── Run Summary ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(summary).unwrap_or_default()
        );
    }
}

impl EngagementProgress for RunProgress {
    fn begin(&self, pending: usize) {
        self.pb.set_style(bar_style());
        self.pb.set_length(pending as u64);
        self.pb.set_position(0);
        self.pb.set_message(String::new());
    }

    fn advance(&self, identifier: &str, outcome: &ArticleOutcome) {
        if let ArticleOutcome::OwnArticle = outcome {
            self.pb.println(format!(
                "  {} Skipped your own article {identifier}",
                self.yellow.apply_to("↷")
            ));
        }
        self.pb.inc(1);
    }

    fn finish(&self) {
        self.pb.set_style(spinner_style());
        self.pb.set_message("Finishing up");
    }
}

impl RunReporter for RunProgress {
    fn status(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    /// `+` marks a saturated feed window.
    fn new_articles(&self, reported: usize, saturated: bool) {
        let suffix = if saturated { "+" } else { "" };
        self.pb.println(format!(
            "  {} New articles have been found ({reported}{suffix})",
            self.cyan.apply_to("●")
        ));
    }

    fn caught_up(&self) {
        self.pb.println(format!(
            "  {} Great, you're all caught up!",
            self.green.apply_to("✓")
        ));
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// Asks the operator to log in through the browser window and waits for Enter.
pub struct ConsolePrompt {
    interactive: bool,
    pb: ProgressBar,
    yellow: Style,
}

impl ConsolePrompt {
    /// A non-interactive prompt (headless run) abandons immediately.
    pub fn new(interactive: bool, pb: ProgressBar) -> Self {
        Self {
            interactive,
            pb,
            yellow: Style::new().yellow().bold(),
        }
    }
}

impl OperatorSignal for ConsolePrompt {
    async fn await_login(&self) -> Result<(), ClapperError> {
        if !self.interactive {
            tracing::error!("login required but the browser is headless; run once without --headless");
            return Err(ClapperError::LoginAbandoned);
        }

        self.pb.suspend(|| {
            println!(
                "  {} Login is required. Sign in in the browser window and press [Enter] to continue...",
                self.yellow.apply_to("🔑")
            );
        });
        self.pb.set_message("Waiting for login");
        let read = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)
        })
        .await;

        match read {
            Ok(Ok(0)) => Err(ClapperError::LoginAbandoned),
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(ClapperError::Io(e)),
            Err(e) => {
                tracing::error!(error = %e, "login prompt task failed");
                Err(ClapperError::LoginAbandoned)
            }
        }
    }
}
