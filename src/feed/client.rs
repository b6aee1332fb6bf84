use std::time::Duration;

use reqwest::Client;

use super::error::FeedError;
use super::types::FeedPage;

/// Anything that can list an author's most recent items.
pub trait FeedSource {
    async fn latest(&self, author: &str) -> Result<FeedPage, FeedError>;
}

pub struct FeedClient {
    client: Client,
    feed_url: String,
    site_url: String,
}

impl FeedClient {
    /// `feed_url` is the rss2json endpoint, `site_url` the platform root
    /// whose `/feed/<author>` RSS document it converts.
    pub fn with_urls(
        feed_url: String,
        site_url: String,
        timeout: Duration,
    ) -> Result<Self, FeedError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            feed_url,
            site_url: site_url.trim_end_matches('/').to_string(),
        })
    }

    fn rss_url(&self, author: &str) -> String {
        format!("{}/feed/{author}", self.site_url)
    }
}

impl FeedSource for FeedClient {
    async fn latest(&self, author: &str) -> Result<FeedPage, FeedError> {
        let rss_url = self.rss_url(author);
        tracing::debug!(author, rss_url = %rss_url, "querying feed");

        let response = self
            .client
            .get(&self.feed_url)
            .query(&[("rss_url", rss_url.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let page: FeedPage =
            serde_json::from_str(&body).map_err(|e| FeedError::Decode(e.to_string()))?;
        tracing::debug!(author, items = page.items.len(), "feed page received");
        Ok(page)
    }
}
