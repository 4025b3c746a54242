use std::time::Duration;

use banner_client::fetch::ACCEPT_ANY;
use banner_client::{FetchClient, FetchConfig};
use banner_core::Error;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> FetchClient {
    FetchClient::new(FetchConfig::default()).expect("client builds")
}

#[tokio::test]
async fn fetch_returns_body_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wall.png"))
        .and(header("accept", ACCEPT_ANY))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"pixels".to_vec(), "image/png"))
        .mount(&server)
        .await;

    let url = format!("{}/wall.png", server.uri());
    let response = client().fetch(&url, ACCEPT_ANY).await.expect("fetch ok");

    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.url.as_str(), url);
    assert_eq!(response.final_url, response.url);
    assert_eq!(response.content_type.as_deref(), Some("image/png"));
    assert_eq!(&response.bytes[..], b"pixels");
}

#[tokio::test]
async fn fetch_reports_final_url_after_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/random"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", format!("{}/img/42.jpg", server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/42.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg".to_vec()))
        .mount(&server)
        .await;

    let response = client().fetch(&format!("{}/random", server.uri()), ACCEPT_ANY).await.expect("fetch ok");

    assert!(response.url.as_str().ends_with("/random"));
    assert!(response.final_url.as_str().ends_with("/img/42.jpg"));
    assert_eq!(&response.bytes[..], b"jpeg");
}

#[tokio::test]
async fn fetch_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client().fetch(&format!("{}/missing", server.uri()), ACCEPT_ANY).await.unwrap_err();
    match err {
        Error::Network(message) => assert!(message.contains("404")),
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_rejects_oversized_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/huge"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4096]))
        .mount(&server)
        .await;

    let client = FetchClient::new(FetchConfig { max_bytes: 1024, ..FetchConfig::default() }).unwrap();
    let err = client.fetch(&format!("{}/huge", server.uri()), ACCEPT_ANY).await.unwrap_err();
    assert!(matches!(err, Error::Network(message) if message.contains("exceeds")));
}

#[tokio::test]
async fn fetch_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = FetchConfig {
        timeout: Duration::from_millis(100),
        connect_timeout: Duration::from_millis(100),
        ..FetchConfig::default()
    };
    let client = FetchClient::new(config).unwrap();
    let err = client.fetch(&format!("{}/slow", server.uri()), ACCEPT_ANY).await.unwrap_err();
    assert!(matches!(err, Error::Network(message) if message.contains("timed out")));
}

#[tokio::test]
async fn fetch_rejects_relative_location() {
    let err = client().fetch("/just/a/path", ACCEPT_ANY).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn fetch_claimed_sees_final_url_and_skips_declined_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/random"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", format!("{}/img/7.png", server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/7.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"seven".to_vec()))
        .mount(&server)
        .await;

    let client = client();
    let draw_url = format!("{}/random", server.uri());
    let seen = std::sync::Mutex::new(Vec::new());
    let claim = |final_url: &url::Url| {
        let mut seen = seen.lock().unwrap();
        let fresh = !seen.contains(&final_url.to_string());
        seen.push(final_url.to_string());
        fresh
    };

    let first = client.fetch_claimed(&draw_url, ACCEPT_ANY, &claim).await.expect("first draw");
    let first = first.expect("new candidate is kept");
    assert!(first.final_url.as_str().ends_with("/img/7.png"));
    assert_eq!(&first.bytes[..], b"seven");

    let second = client.fetch_claimed(&draw_url, ACCEPT_ANY, &claim).await.expect("second draw");
    assert!(second.is_none());
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn fetch_claimed_reports_status_before_claiming() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let claimed = std::sync::atomic::AtomicBool::new(false);
    let claim = |_: &url::Url| {
        claimed.store(true, std::sync::atomic::Ordering::SeqCst);
        true
    };

    let err = client().fetch_claimed(&format!("{}/broken", server.uri()), ACCEPT_ANY, &claim).await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert!(!claimed.load(std::sync::atomic::Ordering::SeqCst));
}
