use crate::article::ArticleReference;
use crate::fetch::{ForwardTarget, Forwarder};
use async_trait::async_trait;
use encoding_rs::Encoding;
use scraper::{ElementRef, Html, Selector};
use talkback_common::{Comment, CommentList};
use talkback_config::ExtractionVariant;
use talkback_http::HttpError;

/// Text the legacy layout leaves behind each comment once the reply counters
/// (nested `<span>`s) are dropped: `(<span>3</span>, <span>1</span>)`.
pub const LEGACY_REPLY_MARKER: &str = "(, )";

#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("no article reference in URL: {0}")]
    InvalidUrl(String),

    #[error("could not fetch comments: {0}")]
    Fetch(#[from] HttpError),

    #[error("invalid selector {selector:?}: {message}")]
    Selector {
        selector: &'static str,
        message: String,
    },
}

/// Everything that differs between the two layout families.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionProfile {
    pub name: &'static str,
    pub charset: &'static Encoding,
    /// CSS selector matching one node per comment.
    pub selector: &'static str,
    pub build_target: fn(&str) -> Result<ForwardTarget, ExtractError>,
    pub node_to_text: fn(ElementRef<'_>) -> Comment,
}

impl ExtractionProfile {
    /// Comments endpoint: UTF-8 HTML fragment, one `<p>` per comment.
    pub fn api() -> Self {
        Self {
            name: "api",
            charset: encoding_rs::UTF_8,
            selector: "div.comment-content p",
            build_target: api_target,
            node_to_text: all_text,
        }
    }

    /// Legacy article page: windows-1250, one `<li>` per comment.
    pub fn scrape() -> Self {
        Self {
            name: "scrape",
            charset: encoding_rs::WINDOWS_1250,
            selector: "div#comments ol li",
            build_target: scrape_target,
            node_to_text: own_text_without_marker,
        }
    }

    pub fn for_variant(variant: ExtractionVariant) -> Self {
        match variant {
            ExtractionVariant::Api => Self::api(),
            ExtractionVariant::Scrape => Self::scrape(),
        }
    }
}

fn api_target(article_url: &str) -> Result<ForwardTarget, ExtractError> {
    ArticleReference::article_id(article_url)
        .and_then(|r| r.comments_api_url())
        .map(ForwardTarget::Relay)
        .ok_or_else(|| ExtractError::InvalidUrl(article_url.to_string()))
}

fn scrape_target(article_url: &str) -> Result<ForwardTarget, ExtractError> {
    match ArticleReference::relative_path(article_url) {
        Some(ArticleReference::RelativePath(path)) => Ok(ForwardTarget::Path(path)),
        _ => Err(ExtractError::InvalidUrl(article_url.to_string())),
    }
}

/// Full descendant text of the node.
fn all_text(node: ElementRef<'_>) -> Comment {
    let text: String = node.text().collect();
    Comment::from_raw(&text)
}

/// Direct text children only, so reply links and counters are skipped.
///
/// Trailing whitespace is trimmed only so the marker can be found at the end of
/// the text; it sits between the marker and the closing tag in the markup.
fn own_text_without_marker(node: ElementRef<'_>) -> Comment {
    let mut text = String::new();
    for child in node.children() {
        if let Some(t) = child.value().as_text() {
            text.push_str(t);
        }
    }
    let trimmed = text.trim_end();
    Comment::from_raw(trimmed.strip_suffix(LEGACY_REPLY_MARKER).unwrap_or(trimmed))
}

/// Select comment nodes in document order and clean each one.
///
/// A selector that matches nothing yields an empty list.
pub fn extract_comments(
    html: &str,
    profile: &ExtractionProfile,
) -> Result<CommentList, ExtractError> {
    let selector = Selector::parse(profile.selector).map_err(|e| ExtractError::Selector {
        selector: profile.selector,
        message: e.to_string(),
    })?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .map(profile.node_to_text)
        .collect())
}

/// Anything that can turn an article URL into its comment list.
#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn extract(&self, article_url: &str) -> Result<CommentList, ExtractError>;

    /// Short label used in logs.
    fn name(&self) -> &str;
}

/// Runs one [`ExtractionProfile`] against the forwarding relay.
#[derive(Clone)]
pub struct ProfileSource {
    profile: ExtractionProfile,
    forwarder: Forwarder,
}

impl ProfileSource {
    pub fn new(profile: ExtractionProfile, forwarder: Forwarder) -> Self {
        Self { profile, forwarder }
    }

    pub fn profile(&self) -> &ExtractionProfile {
        &self.profile
    }
}

#[async_trait]
impl CommentSource for ProfileSource {
    async fn extract(&self, article_url: &str) -> Result<CommentList, ExtractError> {
        let target = (self.profile.build_target)(article_url)?;
        let document = self
            .forwarder
            .fetch(&target, self.profile.charset)
            .await
            .map_err(|e| {
                tracing::warn!(
                    profile = self.profile.name,
                    url = %article_url,
                    error = %e,
                    "comments.fetch_failed"
                );
                ExtractError::Fetch(e)
            })?;

        let html = document.decode();
        let comments = extract_comments(&html, &self.profile)?;
        if comments.is_empty() {
            tracing::info!(
                profile = self.profile.name,
                url = %article_url,
                "comments.none_matched"
            );
        } else {
            tracing::info!(
                profile = self.profile.name,
                count = comments.len(),
                "comments.extracted"
            );
        }
        Ok(comments)
    }

    fn name(&self) -> &str {
        self.profile.name
    }
}
