mod browser;
mod cli;
mod config;
mod context;
mod discovery;
mod engage;
mod error;
mod extract;
mod feed;
mod orchestrator;
mod reconcile;
mod scroll;
mod session;
mod state_machine;
mod store;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use browser::WebDriverPage;
use cli::Cli;
use config::{ClapperConfig, RunSettings};
use context::RunContext;
use feed::FeedClient;
use orchestrator::Orchestrator;
use session::CookieJar;
use store::QueueStore;
use ui::RunProgress;

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "medium_clapper=debug"
    } else {
        "medium_clapper=warn"
    };
    // RUST_LOG, when set, replaces the default filter entirely.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ClapperConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(url) = &cli.webdriver {
        config.webdriver_url = url.clone();
    }

    let settings = RunSettings::resolve(&cli, &config);
    let ctx = RunContext::new(cli.target.as_str(), settings, config.urls());
    let feed = FeedClient::with_urls(
        config.feed_url.clone(),
        config.site_url.clone(),
        config.feed_timeout(),
    )?;
    let store = QueueStore::new(config.data_dir.clone());
    let jar = CookieJar::new(&config.data_dir);

    let progress = RunProgress::start("Starting browser");
    let mut page = match WebDriverPage::connect(&config.webdriver_url, cli.headless).await {
        Ok(page) => page,
        Err(e) => {
            progress.abandon();
            return Err(e).with_context(|| {
                format!("connecting to WebDriver at {}", config.webdriver_url)
            });
        }
    };

    let prompt = progress.login_prompt(!cli.headless);
    let orchestrator = Orchestrator {
        feed: &feed,
        store: &store,
        jar: &jar,
        operator: &prompt,
        excluded_path: config.excluded_path.clone(),
    };
    let result = orchestrator.run(&mut page, ctx, &progress).await;

    if let Err(e) = page.close().await {
        tracing::warn!(error = %e, "failed to close the browser session");
    }

    match result {
        Ok(summary) => {
            progress.complete(&summary);
            if cli.verbose {
                progress.print_summary(&summary);
            }
            Ok(())
        }
        Err(e) => {
            progress.abandon();
            Err(e.into())
        }
    }
}
