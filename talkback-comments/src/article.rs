use url::Url;

/// Origin every article URL on the site starts with.
pub const SITE_ORIGIN: &str = "https://www.b92.net";

/// Backend endpoint that returns the comments of one article as an HTML fragment.
pub const COMMENTS_API: &str = "https://www.b92.net/ajax/get_comments";

/// Site identifier the comments endpoint expects.
const SITE_ID: &str = "3";

/// Identifies which article's comments to retrieve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleReference {
    /// Article id taken from the last path segment.
    Id(String),
    /// Path (and query) relative to [`SITE_ORIGIN`].
    RelativePath(String),
}

impl ArticleReference {
    /// Take the final non-empty path segment of `url` as the article id.
    ///
    /// ```
    /// use talkback_comments::ArticleReference;
    ///
    /// let r = ArticleReference::article_id("https://www.b92.net/info/komentari/2398712").unwrap();
    /// assert_eq!(r, ArticleReference::Id("2398712".into()));
    /// ```
    pub fn article_id(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        parsed
            .path_segments()?
            .filter(|s| !s.is_empty())
            .last()
            .map(|s| Self::Id(s.to_string()))
    }

    /// Strip the site origin from `url`, keeping the rest verbatim.
    ///
    /// ```
    /// use talkback_comments::ArticleReference;
    ///
    /// let r = ArticleReference::relative_path("https://www.b92.net/info/vesti/index.php?nav_id=1").unwrap();
    /// assert_eq!(r, ArticleReference::RelativePath("/info/vesti/index.php?nav_id=1".into()));
    /// ```
    pub fn relative_path(url: &str) -> Option<Self> {
        let rest = url.trim().strip_prefix(SITE_ORIGIN)?;
        if rest.is_empty() || rest == "/" {
            return None;
        }
        Some(Self::RelativePath(rest.to_string()))
    }

    /// Comments endpoint URL for an [`ArticleReference::Id`].
    pub fn comments_api_url(&self) -> Option<Url> {
        match self {
            Self::Id(id) => Url::parse_with_params(
                COMMENTS_API,
                [
                    ("article_id", id.as_str()),
                    ("order", "time"),
                    ("site_id", SITE_ID),
                ],
            )
            .ok(),
            Self::RelativePath(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_does_not_hide_the_id() {
        assert_eq!(
            ArticleReference::article_id("https://www.b92.net/komentari/2398712/"),
            Some(ArticleReference::Id("2398712".into()))
        );
    }

    #[test]
    fn bare_origin_has_no_article() {
        assert_eq!(ArticleReference::article_id("https://www.b92.net/"), None);
        assert_eq!(ArticleReference::relative_path("https://www.b92.net"), None);
        assert_eq!(ArticleReference::article_id("not a url"), None);
    }

    #[test]
    fn foreign_origin_has_no_relative_path() {
        assert_eq!(
            ArticleReference::relative_path("https://example.com/info/vesti"),
            None
        );
    }

    #[test]
    fn api_url_carries_fixed_params() {
        let url = ArticleReference::Id("2398712".into())
            .comments_api_url()
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.b92.net/ajax/get_comments?article_id=2398712&order=time&site_id=3"
        );
        assert!(ArticleReference::RelativePath("/x".into())
            .comments_api_url()
            .is_none());
    }
}
