//! Configuration loaded from `clapper.toml`, plus the effective run settings.
//!
//! [`ClapperConfig`] holds endpoints, paths and the article scroll parameters.
//! Values missing from the file fall back to defaults. The
//! `CLAPPER_WEBDRIVER_URL` environment variable takes precedence over the file,
//! and `--webdriver` over both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::cli::{Cli, DEFAULT_SCROLL_DELAY, DEFAULT_SCROLL_RETRIES};
use crate::state_machine::ScrollParams;

/// How a non-default `--scroll-delay` / `--scroll-retries` is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollOverride {
    /// A value different from the default is added on top of the default.
    Additive,
    /// The given value is used as-is.
    Replace,
}

/// Top-level configuration read from `clapper.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClapperConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Root of the platform, used for profile, article and RSS URLs.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// rss2json endpoint that serves the author's last items as JSON.
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    #[serde(default = "default_feed_timeout_secs")]
    pub feed_timeout_secs: u64,

    /// Per-author queues and the saved session live here.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_excluded_path")]
    pub excluded_path: PathBuf,

    #[serde(default = "default_article_scroll_delay")]
    pub article_scroll_delay: f64,

    #[serde(default = "default_article_scroll_retries")]
    pub article_scroll_retries: u32,

    #[serde(default = "default_scroll_override")]
    pub scroll_override: ScrollOverride,
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_site_url() -> String {
    "https://medium.com".to_string()
}

fn default_feed_url() -> String {
    "https://api.rss2json.com/v1/api.json".to_string()
}

fn default_feed_timeout_secs() -> u64 {
    10
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_excluded_path() -> PathBuf {
    PathBuf::from("config/excluded")
}

fn default_article_scroll_delay() -> f64 {
    0.5
}

fn default_article_scroll_retries() -> u32 {
    3
}

fn default_scroll_override() -> ScrollOverride {
    ScrollOverride::Additive
}

impl Default for ClapperConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            site_url: default_site_url(),
            feed_url: default_feed_url(),
            feed_timeout_secs: default_feed_timeout_secs(),
            data_dir: default_data_dir(),
            excluded_path: default_excluded_path(),
            article_scroll_delay: default_article_scroll_delay(),
            article_scroll_retries: default_article_scroll_retries(),
            scroll_override: default_scroll_override(),
        }
    }
}

impl ClapperConfig {
    /// Load from `path`, using defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<ClapperConfig>(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("CLAPPER_WEBDRIVER_URL")
            && !url.is_empty()
        {
            config.webdriver_url = url;
        }

        Ok(config)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    pub fn urls(&self) -> SiteUrls {
        SiteUrls::new(&self.site_url)
    }
}

/// Page addresses on the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    root: String,
}

impl SiteUrls {
    pub fn new(root: &str) -> Self {
        Self {
            root: root.trim_end_matches('/').to_string(),
        }
    }

    pub fn profile(&self, author: &str) -> String {
        format!("{}/{author}", self.root)
    }

    /// The logged-in account's own profile.
    pub fn own_profile(&self) -> String {
        self.profile("me")
    }

    pub fn article(&self, author: &str, identifier: &str) -> String {
        format!("{}/{author}/{identifier}", self.root)
    }
}

/// Effective knobs for one run, after applying the scroll override policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub profile_scroll: ScrollParams,
    pub article_scroll: ScrollParams,
    pub claps: u32,
    pub read_time: Duration,
}

impl RunSettings {
    pub fn resolve(cli: &Cli, config: &ClapperConfig) -> Self {
        let delay = resolve_scroll_value(
            "scroll delay",
            cli.scroll_delay,
            DEFAULT_SCROLL_DELAY,
            config.scroll_override,
        );
        let retries = resolve_scroll_value(
            "scroll retries",
            f64::from(cli.scroll_retries),
            f64::from(DEFAULT_SCROLL_RETRIES),
            config.scroll_override,
        );

        Self {
            profile_scroll: ScrollParams::new(delay, retries.max(0.0) as u32),
            article_scroll: ScrollParams::new(
                config.article_scroll_delay,
                config.article_scroll_retries,
            ),
            claps: cli.claps,
            read_time: Duration::try_from_secs_f64(cli.read_time.max(0.0))
                .unwrap_or(Duration::ZERO),
        }
    }
}

/// Apply the scroll override policy to one knob.
///
/// Under `Additive`, passing exactly the default is indistinguishable from
/// not passing the flag, and any other value is added to the default rather
/// than replacing it. The additive path always logs the effective value.
pub fn resolve_scroll_value(
    knob: &str,
    given: f64,
    default: f64,
    policy: ScrollOverride,
) -> f64 {
    match policy {
        ScrollOverride::Replace => given,
        ScrollOverride::Additive if given != default => {
            let effective = default + given;
            tracing::warn!(
                knob,
                given,
                effective,
                "non-default scroll value added to the default; set scroll_override = \"replace\" to use it as-is"
            );
            effective
        }
        ScrollOverride::Additive => default,
    }
}
