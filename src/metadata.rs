//! Metadata extraction from fetched HTML
//!
//! Every field is looked up independently with a CSS selector. A missing
//! element or attribute leaves the field empty; malformed markup is parsed
//! best-effort and never fails the extraction.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[name="description"]"#));
static AUTHOR: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[name="author"]"#));
static OG_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:image"]"#));
static OG_TYPE: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:type"]"#));
static CANONICAL: LazyLock<Selector> = LazyLock::new(|| selector(r#"link[rel="canonical"]"#));
static ROOT: LazyLock<Selector> = LazyLock::new(|| selector("html"));
static PUBLISHED: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="article:published_time"]"#));
static OG_PUBLISHED: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="og:article:published_time"]"#));

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector '{css}': {e:?}"))
}

/// Descriptive fields of a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMetadata {
    /// Text of the first `<title>`; empty string when the element is empty
    pub title: Option<String>,

    pub description: Option<String>,

    pub author: Option<String>,

    /// Social preview image (`og:image`)
    pub image: Option<String>,

    /// `og:type`
    #[serde(rename = "type")]
    pub page_type: Option<String>,

    pub canonical_url: Option<String>,

    /// `lang` of the root element
    pub locale: Option<String>,

    /// Raw publish timestamp as written in the page
    pub published_date: Option<String>,
}

impl SiteMetadata {
    /// Publish date parsed as RFC 3339, when the page uses that format
    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.published_date
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
    }
}

/// Extract page metadata from HTML.
///
/// `publishedDate` prefers `article:published_time` and falls back to
/// `og:article:published_time` when the first is missing or empty.
pub fn extract_metadata(html: &str) -> SiteMetadata {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(|element| element.text().collect::<String>());

    let published_date = match attr(&document, &PUBLISHED, "content") {
        Some(value) if !value.is_empty() => Some(value),
        _ => attr(&document, &OG_PUBLISHED, "content"),
    };

    let metadata = SiteMetadata {
        title,
        description: attr(&document, &DESCRIPTION, "content"),
        author: attr(&document, &AUTHOR, "content"),
        image: attr(&document, &OG_IMAGE, "content"),
        page_type: attr(&document, &OG_TYPE, "content"),
        canonical_url: attr(&document, &CANONICAL, "href"),
        locale: attr(&document, &ROOT, "lang"),
        published_date,
    };

    debug!(
        has_title = metadata.title.is_some(),
        has_description = metadata.description.is_some(),
        has_image = metadata.image.is_some(),
        "extracted page metadata"
    );

    metadata
}

/// Attribute of the first element matching `selector`
fn attr(document: &Html, selector: &Selector, name: &str) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|element| element.value().attr(name))
        .map(str::to_string)
}
