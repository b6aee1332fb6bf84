use crate::config::{RunSettings, SiteUrls};

/// State shared by every component of one run, passed by reference.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Target author handle, e.g. `@jane`.
    pub author: String,
    /// Display name of the logged-in account, known once the session gate passed.
    pub display_name: Option<String>,
    pub settings: RunSettings,
    pub urls: SiteUrls,
}

impl RunContext {
    pub fn new(author: impl Into<String>, settings: RunSettings, urls: SiteUrls) -> Self {
        Self {
            author: author.into(),
            display_name: None,
            settings,
            urls,
        }
    }

    pub fn profile_url(&self) -> String {
        self.urls.profile(&self.author)
    }

    pub fn article_url(&self, identifier: &str) -> String {
        self.urls.article(&self.author, identifier)
    }

    /// Whether `byline` names the logged-in account.
    pub fn is_own(&self, byline: &str) -> bool {
        self.display_name.as_deref() == Some(byline)
    }
}
