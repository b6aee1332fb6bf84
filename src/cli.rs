//! Command-line interface for medium-clapper, built on clap.
//!
//! A single invocation targets one author. Scroll, clap and reading-time
//! knobs keep their short historical aliases (`--sd`, `--sr`, `-c`, `--rt`).

use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_SCROLL_DELAY: f64 = 0.85;
pub const DEFAULT_SCROLL_RETRIES: u32 = 3;
pub const DEFAULT_CLAPS: u32 = 50;
pub const DEFAULT_READ_TIME: f64 = 10.0;

/// Read and clap every article published by a Medium author.
#[derive(Debug, Parser)]
#[command(name = "medium-clapper", version, about)]
pub struct Cli {
    /// Target username (including '@' if needed).
    #[arg(short = 't', long = "target", value_name = "USERNAME")]
    pub target: String,

    /// Delay in seconds between profile scrolls.
    #[arg(long = "scroll-delay", visible_alias = "sd", value_name = "SECS", default_value_t = DEFAULT_SCROLL_DELAY)]
    pub scroll_delay: f64,

    /// Stalled scroll attempts tolerated before the profile counts as fully loaded.
    #[arg(long = "scroll-retries", visible_alias = "sr", value_name = "N", default_value_t = DEFAULT_SCROLL_RETRIES)]
    pub scroll_retries: u32,

    /// Claps to give on each article (the platform caps at 50).
    #[arg(
        short = 'c',
        long = "claps",
        value_name = "N",
        default_value_t = DEFAULT_CLAPS,
        value_parser = clap::value_parser!(u32).range(1..=50)
    )]
    pub claps: u32,

    /// Seconds to stay on each article to emulate reading.
    #[arg(long = "read-time", visible_alias = "rt", value_name = "SECS", default_value_t = DEFAULT_READ_TIME)]
    pub read_time: f64,

    /// Run the browser without a window. Requires a cached login.
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// WebDriver endpoint (geckodriver) to drive the browser through.
    #[arg(long, value_name = "URL")]
    pub webdriver: Option<String>,

    /// Path to the TOML configuration file.
    #[arg(long, value_name = "PATH", default_value = "clapper.toml")]
    pub config: PathBuf,

    /// Debug logging and a JSON run summary at the end.
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}
