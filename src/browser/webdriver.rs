use std::time::Duration;

use fantoccini::cookies::Cookie;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};

use super::{DriverError, PageDriver, SessionCookie};

const ELEMENT_WAIT: Duration = Duration::from_secs(30);

const SCROLL_EXTENT_JS: &str = "const root = document.scrollingElement || document.documentElement; \
     return Math.max(0, root.scrollHeight - window.innerHeight);";
const SCROLL_BOTTOM_JS: &str = "const root = document.scrollingElement || document.documentElement; \
     window.scrollTo(0, root.scrollHeight);";
const SCROLL_INTO_VIEW_JS: &str = "arguments[0].scrollIntoView({block: 'center'});";
const STYLED_TEXT_JS: &str = "const [tag, fragment] = arguments; \
     for (const el of document.querySelectorAll(tag)) { \
         const style = el.getAttribute('style'); \
         if (style && style.includes(fragment)) { return el.textContent; } \
     } \
     return null;";

impl From<fantoccini::error::CmdError> for DriverError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        DriverError::Command(err.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for DriverError {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        DriverError::Session(err.to_string())
    }
}

/// A Firefox page driven through a WebDriver server (geckodriver).
pub struct WebDriverPage {
    client: Client,
}

impl WebDriverPage {
    /// Open a new browser session. A headed window is needed for the
    /// operator to log in on the first run.
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self, DriverError> {
        let mut caps = Map::new();
        caps.insert("browserName".into(), json!("firefox"));
        if headless {
            caps.insert("moz:firefoxOptions".into(), json!({ "args": ["-headless"] }));
        }

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await?;
        tracing::debug!(webdriver_url, headless, "browser session started");
        Ok(Self { client })
    }

    /// End the session and close the browser window.
    pub async fn close(self) -> Result<(), DriverError> {
        self.client.close().await?;
        Ok(())
    }
}

impl PageDriver for WebDriverPage {
    async fn goto(&mut self, url: &str) -> Result<(), DriverError> {
        tracing::debug!(url, "navigating");
        self.client.goto(url).await?;
        Ok(())
    }

    async fn content(&mut self) -> Result<String, DriverError> {
        Ok(self.client.source().await?)
    }

    async fn has_element(&mut self, css: &str) -> Result<bool, DriverError> {
        let found = self.client.find_all(Locator::Css(css)).await?;
        Ok(!found.is_empty())
    }

    async fn scroll_extent(&mut self) -> Result<f64, DriverError> {
        let value = self.client.execute(SCROLL_EXTENT_JS, Vec::new()).await?;
        value
            .as_f64()
            .ok_or_else(|| DriverError::Script(format!("scroll extent was {value}")))
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), DriverError> {
        self.client.execute(SCROLL_BOTTOM_JS, Vec::new()).await?;
        Ok(())
    }

    async fn click(&mut self, css: &str) -> Result<(), DriverError> {
        let element = self
            .client
            .wait()
            .at_most(ELEMENT_WAIT)
            .for_element(Locator::Css(css))
            .await?;
        let handle = serde_json::to_value(&element)
            .map_err(|e| DriverError::Script(e.to_string()))?;
        self.client.execute(SCROLL_INTO_VIEW_JS, vec![handle]).await?;
        element.click().await?;
        Ok(())
    }

    async fn styled_text(
        &mut self,
        tag: &str,
        style_fragment: &str,
    ) -> Result<Option<String>, DriverError> {
        let value = self
            .client
            .execute(STYLED_TEXT_JS, vec![json!(tag), json!(style_fragment)])
            .await?;
        match value {
            Value::Null => Ok(None),
            Value::String(text) => Ok(Some(text)),
            other => Err(DriverError::Script(format!("styled text was {other}"))),
        }
    }

    async fn reveal_visible(&mut self, css: &str) -> Result<(), DriverError> {
        for element in self.client.find_all(Locator::Css(css)).await? {
            if element.is_displayed().await? {
                let handle = serde_json::to_value(&element)
                    .map_err(|e| DriverError::Script(e.to_string()))?;
                self.client.execute(SCROLL_INTO_VIEW_JS, vec![handle]).await?;
            }
        }
        Ok(())
    }

    async fn cookies(&mut self) -> Result<Vec<SessionCookie>, DriverError> {
        let cookies = self.client.get_all_cookies().await?;
        Ok(cookies
            .iter()
            .map(|c| SessionCookie {
                name: c.name().to_string(),
                value: c.value().to_string(),
                domain: c.domain().map(str::to_string),
                path: c.path().map(str::to_string),
                secure: c.secure().unwrap_or(false),
                http_only: c.http_only().unwrap_or(false),
            })
            .collect())
    }

    async fn add_cookies(&mut self, cookies: &[SessionCookie]) -> Result<(), DriverError> {
        for stored in cookies {
            let mut cookie = Cookie::new(stored.name.clone(), stored.value.clone());
            if let Some(domain) = &stored.domain {
                cookie.set_domain(domain.clone());
            }
            if let Some(path) = &stored.path {
                cookie.set_path(path.clone());
            }
            cookie.set_secure(stored.secure);
            cookie.set_http_only(stored.http_only);
            // Cookies for another domain are rejected by the browser; skip them.
            if let Err(e) = self.client.add_cookie(cookie).await {
                tracing::debug!(name = %stored.name, error = %e, "cookie not restored");
            }
        }
        Ok(())
    }
}
