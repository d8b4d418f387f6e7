//! Retrieval through the cross-origin forwarding relay.
//!
//! The relay hands back the target's bytes untouched, so decoding happens here
//! with the charset the active layout declares rather than whatever the
//! transport guesses.
use encoding_rs::Encoding;
use std::borrow::Cow;
use talkback_http::{HttpClient, HttpError, RequestOpts};
use url::Url;

/// Relay path that accepts the target as a `url` query parameter.
const FORWARD_PATH: &str = "api/forward";

/// What to ask the relay for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardTarget {
    /// `GET <relay>/api/forward?url=<target>`
    Relay(Url),
    /// `GET <relay><path>`, the relay rewriting the path onto the site.
    Path(String),
}

/// Bytes of a fetched document plus the charset they are encoded in.
///
/// Decoding consumes the document; it is read exactly once.
#[derive(Debug)]
pub struct RawDocument {
    bytes: Vec<u8>,
    charset: &'static Encoding,
}

impl RawDocument {
    pub fn new(bytes: Vec<u8>, charset: &'static Encoding) -> Self {
        Self { bytes, charset }
    }

    pub fn charset(&self) -> &'static Encoding {
        self.charset
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode with the declared charset; malformed sequences become U+FFFD.
    ///
    /// ```
    /// use talkback_comments::RawDocument;
    ///
    /// let doc = RawDocument::new(vec![0x8A, b'u', b'm', b'a'], encoding_rs::WINDOWS_1250);
    /// assert_eq!(doc.decode(), "Šuma");
    /// ```
    pub fn decode(self) -> String {
        let (text, _, had_errors) = self.charset.decode(&self.bytes);
        if had_errors {
            tracing::debug!(
                charset = self.charset.name(),
                bytes = self.bytes.len(),
                "fetch.decode.replacement_chars"
            );
        }
        match text {
            Cow::Borrowed(s) => s.to_string(),
            Cow::Owned(s) => s,
        }
    }
}

/// Client for the forwarding relay.
#[derive(Clone)]
pub struct Forwarder {
    http: HttpClient,
}

impl Forwarder {
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
        })
    }

    pub fn base(&self) -> &Url {
        self.http.base()
    }

    /// Fetch `target` through the relay and tag the body with `charset`.
    pub async fn fetch(
        &self,
        target: &ForwardTarget,
        charset: &'static Encoding,
    ) -> Result<RawDocument, HttpError> {
        let resp = match target {
            ForwardTarget::Relay(url) => {
                let opts = RequestOpts {
                    query: Some(vec![("url", Cow::Borrowed(url.as_str()))]),
                    ..Default::default()
                };
                self.http.get_raw(FORWARD_PATH, opts).await?
            }
            ForwardTarget::Path(path) => self.http.get_raw(path, RequestOpts::default()).await?,
        };

        // The relay may relabel the content type; the layout's charset wins.
        if let Some(declared) = resp.declared_charset() {
            if Encoding::for_label(declared.as_bytes()) != Some(charset) {
                tracing::debug!(
                    declared = %declared,
                    using = charset.name(),
                    "fetch.charset_mismatch"
                );
            }
        }

        let bytes = resp.body;
        tracing::debug!(
            target_kind = match target {
                ForwardTarget::Relay(_) => "relay",
                ForwardTarget::Path(_) => "path",
            },
            bytes = bytes.len(),
            charset = charset.name(),
            "fetch.document"
        );
        Ok(RawDocument::new(bytes, charset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_document_decodes_verbatim() {
        let doc = RawDocument::new("Čestitke, odličan tekst".as_bytes().to_vec(), encoding_rs::UTF_8);
        assert_eq!(doc.len(), "Čestitke, odličan tekst".len());
        assert_eq!(doc.decode(), "Čestitke, odličan tekst");
    }

    #[test]
    fn legacy_charset_is_honoured() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1250.encode("Žalosno, ćuti");
        let doc = RawDocument::new(bytes.into_owned(), encoding_rs::WINDOWS_1250);
        assert_eq!(doc.decode(), "Žalosno, ćuti");
    }

    #[test]
    fn legacy_bytes_misread_as_utf8_are_replaced() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1250.encode("Ž");
        let doc = RawDocument::new(bytes.into_owned(), encoding_rs::UTF_8);
        assert_eq!(doc.decode(), "\u{FFFD}");
    }
}
