use talkback_comments::{source_for, CommentSource, ExtractError, Forwarder};
use talkback_config::ExtractionVariant;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE_URL: &str = "https://www.b92.net/info/komentari/2398712";
const LEGACY_URL: &str = "https://www.b92.net/info/vesti/index.php?yyyy=2014&nav_id=123";

fn api_fragment(k: usize) -> String {
    let mut html = String::from("<div class=\"comments\">");
    for i in 0..k {
        html.push_str(&format!(
            "<div class=\"comment\"><div class=\"comment-content\"><p>\n\tkomentar {i}\t\n</p></div></div>"
        ));
    }
    html.push_str("</div>");
    html
}

fn legacy_page_bytes() -> Vec<u8> {
    let page = r#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=windows-1250"></head>
<body><div id="comments"><ol>
<li>Čast izuzecima(<span>4</span>, <span>1</span>)<a class="reply">Odgovori</a></li>
<li>	Šta reći...
(<span>0</span>, <span>9</span>)</li>
</ol></div></body></html>"#;
    let (bytes, _, had_errors) = encoding_rs::WINDOWS_1250.encode(page);
    assert!(!had_errors);
    bytes.into_owned()
}

#[tokio::test]
async fn api_variant_goes_through_relay_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/forward"))
        .and(query_param(
            "url",
            "https://www.b92.net/ajax/get_comments?article_id=2398712&order=time&site_id=3",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(api_fragment(7)))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(ExtractionVariant::Api, Forwarder::new(&server.uri()).unwrap());
    let comments = source.extract(ARTICLE_URL).await.unwrap();

    assert_eq!(source.name(), "api");
    assert_eq!(comments.len(), 7);
    assert_eq!(comments[0].as_str(), "komentar 0");
    assert!(comments
        .iter()
        .all(|c| !c.as_str().contains(['\t', '\n'])));
}

#[tokio::test]
async fn scrape_variant_rewrites_path_and_decodes_legacy_charset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/info/vesti/index.php"))
        .and(query_param("nav_id", "123"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(legacy_page_bytes()))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(ExtractionVariant::Scrape, Forwarder::new(&server.uri()).unwrap());
    let comments = source.extract(LEGACY_URL).await.unwrap();

    let texts: Vec<&str> = comments.iter().map(|c| c.as_str()).collect();
    assert_eq!(texts, vec!["Čast izuzecima", "Šta reći..."]);
}

#[tokio::test]
async fn relay_failure_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("HTTP error! status: 404"))
        .mount(&server)
        .await;

    let source = source_for(ExtractionVariant::Api, Forwarder::new(&server.uri()).unwrap());
    let err = source.extract(ARTICLE_URL).await.unwrap_err();
    assert!(matches!(err, ExtractError::Fetch(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_relay_is_a_fetch_error() {
    // Nothing listens on the discard port.
    let source = source_for(
        ExtractionVariant::Api,
        Forwarder::new("http://127.0.0.1:9").unwrap(),
    );
    let err = source.extract(ARTICLE_URL).await.unwrap_err();
    assert!(matches!(err, ExtractError::Fetch(_)), "got {err:?}");
}

#[tokio::test]
async fn changed_layout_is_an_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<section class=\"discussion\"><article>novo</article></section>"),
        )
        .mount(&server)
        .await;

    let source = source_for(ExtractionVariant::Api, Forwarder::new(&server.uri()).unwrap());
    let comments = source.extract(ARTICLE_URL).await.unwrap();
    assert!(comments.is_empty());
}

#[tokio::test]
async fn url_without_article_is_rejected_before_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let source = source_for(ExtractionVariant::Scrape, Forwarder::new(&server.uri()).unwrap());
    let err = source.extract("https://example.org/vesti/1").await.unwrap_err();
    assert!(matches!(err, ExtractError::InvalidUrl(_)));
}

#[tokio::test]
async fn repeated_extraction_is_identical() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/forward"))
        .respond_with(ResponseTemplate::new(200).set_body_string(api_fragment(25)))
        .expect(2)
        .mount(&server)
        .await;

    let source = source_for(ExtractionVariant::Api, Forwarder::new(&server.uri()).unwrap());
    let first = source.extract(ARTICLE_URL).await.unwrap();
    let second = source.extract(ARTICLE_URL).await.unwrap();
    assert_eq!(first, second);
}
