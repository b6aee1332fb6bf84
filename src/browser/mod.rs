//! Seam between the engagement engine and the driven browser page.
//!
//! Everything the engine needs from the platform goes through [`PageDriver`]:
//! navigation, the rendered markup, scroll extent, clicks and cookies.
//! [`WebDriverPage`] drives a real browser over WebDriver; tests use an
//! in-memory page.

#[cfg(test)]
pub mod fake;
mod webdriver;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use webdriver::WebDriverPage;

/// Failures reported by the page driver.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to start browser session: {0}")]
    Session(String),

    #[error("webdriver command failed: {0}")]
    Command(String),

    #[error("unexpected script result: {0}")]
    Script(String),
}

/// A browser cookie in the shape persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

/// One exclusively owned, driven browser page.
pub trait PageDriver {
    /// Navigate and block until the document has loaded.
    async fn goto(&mut self, url: &str) -> Result<(), DriverError>;

    /// Rendered markup of the current page.
    async fn content(&mut self) -> Result<String, DriverError>;

    async fn has_element(&mut self, css: &str) -> Result<bool, DriverError>;

    /// Maximum vertical scroll offset of the current document.
    async fn scroll_extent(&mut self) -> Result<f64, DriverError>;

    async fn scroll_to_bottom(&mut self) -> Result<(), DriverError>;

    /// Wait for the first element matching `css`, scroll it into view and click it.
    async fn click(&mut self, css: &str) -> Result<(), DriverError>;

    /// Text of the first `tag` element whose inline `style` contains `style_fragment`.
    async fn styled_text(
        &mut self,
        tag: &str,
        style_fragment: &str,
    ) -> Result<Option<String>, DriverError>;

    /// Scroll every displayed element matching `css` into view.
    async fn reveal_visible(&mut self, css: &str) -> Result<(), DriverError>;

    async fn cookies(&mut self) -> Result<Vec<SessionCookie>, DriverError>;

    async fn add_cookies(&mut self, cookies: &[SessionCookie]) -> Result<(), DriverError>;
}
