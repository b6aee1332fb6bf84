//! Pattern extraction over rendered platform markup.
//!
//! The profile page has no declared schema; these patterns are the only
//! contract with it and must be revisited when the platform's layout changes.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static COLLECTION_HOME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"rel="noopener follow" href="/(@[^?]+)\?source=collection_home-"#,
        r"[^>]+>[^>]+>[^>]+>[^>]+>[^>]+>[^>]+>[^>]+>[^>]+>",
        r"[^>]+>[^>]+>[^>]+>[^>]+><a[^/]+([^?]+)\?",
    ))
    .expect("collection_home pattern")
});

static USER_PROFILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"rel="noopener follow" href="/([^/]+)/([^?]+)\?source=user_profile-"#,
        r"[^>]+><div[^>]+><h2",
    ))
    .expect("user_profile pattern")
});

static PAGE_TITLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>([^-]+) – Medium<").expect("title pattern"));

static WRITTEN_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Written by <!--.*?-->(.*?)</span>").expect("byline pattern"));

/// An article link found on a profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    /// `@handle` of the article's author.
    pub author_slug: String,
    /// Path or slug of the article, e.g. `/@jane/my-post-1f2e3d4c5b6a`.
    pub article_slug: String,
}

impl ArticleLink {
    pub fn identifier(&self) -> String {
        article_identifier(&self.article_slug)
    }
}

/// The profile layouts observed in practice, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileLayout {
    CollectionHome,
    UserProfile,
}

impl ProfileLayout {
    pub const ALL: [ProfileLayout; 2] = [ProfileLayout::CollectionHome, ProfileLayout::UserProfile];

    fn pattern(self) -> &'static Regex {
        match self {
            ProfileLayout::CollectionHome => &COLLECTION_HOME,
            ProfileLayout::UserProfile => &USER_PROFILE,
        }
    }

    pub fn extract(self, markup: &str) -> Vec<ArticleLink> {
        self.pattern()
            .captures_iter(markup)
            .map(|caps| ArticleLink {
                author_slug: caps[1].to_string(),
                article_slug: caps[2].to_string(),
            })
            .collect()
    }
}

impl fmt::Display for ProfileLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileLayout::CollectionHome => write!(f, "collection_home"),
            ProfileLayout::UserProfile => write!(f, "user_profile"),
        }
    }
}

/// Try each layout in order; the first one with matches wins.
pub fn extract_articles(markup: &str) -> Option<(ProfileLayout, Vec<ArticleLink>)> {
    ProfileLayout::ALL.into_iter().find_map(|layout| {
        let links = layout.extract(markup);
        (!links.is_empty()).then_some((layout, links))
    })
}

/// Normalize an article slug to its trailing hash, dropping any path prefix.
pub fn article_identifier(slug: &str) -> String {
    let tail = slug.rsplit('-').next().unwrap_or(slug);
    tail.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(tail)
        .to_string()
}

/// Display name from an account page `<title>NAME – Medium</title>`.
pub fn display_name_from_title(markup: &str) -> Option<String> {
    PAGE_TITLE_NAME
        .captures(markup)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Author name from the "Written by" footer of an article.
pub fn byline(markup: &str) -> Option<String> {
    WRITTEN_BY
        .captures(markup)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Parse the rendered clap counter (`+12`).
pub fn parse_clap_count(text: &str) -> Option<u32> {
    text.trim().trim_start_matches('+').trim().parse().ok()
}
