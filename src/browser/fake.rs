//! In-memory page used by unit tests.

use std::collections::{HashMap, VecDeque};

use super::{DriverError, PageDriver, SessionCookie};

#[derive(Debug, Default)]
pub struct FakePage {
    markup: HashMap<String, String>,
    styled: HashMap<String, String>,
    elements: HashMap<String, VecDeque<bool>>,
    growth: VecDeque<f64>,
    extent: f64,
    fail_on: Option<String>,
    current: Option<String>,
    pub visits: Vec<String>,
    pub scroll_commands: u32,
    pub clicks: HashMap<String, u32>,
    pub revealed: Vec<String>,
    pub cookies: Vec<SessionCookie>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, markup: &str) -> Self {
        self.markup.insert(url.to_string(), markup.to_string());
        self
    }

    /// Text returned by `styled_text` while `url` is the current page.
    pub fn with_styled_text(mut self, url: &str, text: &str) -> Self {
        self.styled.insert(url.to_string(), text.to_string());
        self
    }

    /// Successive answers to `has_element(css)`; the last one sticks.
    pub fn with_element_sequence(mut self, css: &str, answers: Vec<bool>) -> Self {
        self.elements.insert(css.to_string(), answers.into());
        self
    }

    /// Extent added by each successive scroll command; once drained the page stops growing.
    pub fn with_scroll_growth(mut self, growth: Vec<f64>) -> Self {
        self.growth = growth.into();
        self
    }

    pub fn failing_on(mut self, url: &str) -> Self {
        self.fail_on = Some(url.to_string());
        self
    }

    pub fn clicks_on(&self, css: &str) -> u32 {
        self.clicks.get(css).copied().unwrap_or(0)
    }

    fn current_url(&self) -> &str {
        self.current.as_deref().unwrap_or("about:blank")
    }
}

impl PageDriver for FakePage {
    async fn goto(&mut self, url: &str) -> Result<(), DriverError> {
        if self.fail_on.as_deref() == Some(url) {
            return Err(DriverError::Command(format!("navigation to {url} failed")));
        }
        self.visits.push(url.to_string());
        self.current = Some(url.to_string());
        self.extent = 0.0;
        Ok(())
    }

    async fn content(&mut self) -> Result<String, DriverError> {
        Ok(self
            .markup
            .get(self.current_url())
            .cloned()
            .unwrap_or_default())
    }

    async fn has_element(&mut self, css: &str) -> Result<bool, DriverError> {
        let Some(answers) = self.elements.get_mut(css) else {
            return Ok(false);
        };
        let answer = if answers.len() > 1 {
            answers.pop_front()
        } else {
            answers.front().copied()
        };
        Ok(answer.unwrap_or(false))
    }

    async fn scroll_extent(&mut self) -> Result<f64, DriverError> {
        Ok(self.extent)
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), DriverError> {
        self.scroll_commands += 1;
        self.extent += self.growth.pop_front().unwrap_or(0.0);
        Ok(())
    }

    async fn click(&mut self, css: &str) -> Result<(), DriverError> {
        *self.clicks.entry(css.to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn styled_text(
        &mut self,
        _tag: &str,
        _style_fragment: &str,
    ) -> Result<Option<String>, DriverError> {
        Ok(self.styled.get(self.current_url()).cloned())
    }

    async fn reveal_visible(&mut self, css: &str) -> Result<(), DriverError> {
        self.revealed.push(css.to_string());
        Ok(())
    }

    async fn cookies(&mut self) -> Result<Vec<SessionCookie>, DriverError> {
        Ok(self.cookies.clone())
    }

    async fn add_cookies(&mut self, cookies: &[SessionCookie]) -> Result<(), DriverError> {
        self.cookies.extend_from_slice(cookies);
        Ok(())
    }
}
