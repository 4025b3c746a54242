use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use banner_client::{AcquisitionPipeline, DirectoryListing, FetchClient, FetchConfig, ListingConfig, Mode, Stage};
use banner_core::{DedupTracker, Error, ListingCache, RandomSelector};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Pipeline = AcquisitionPipeline<FetchClient, DirectoryListing<FetchClient>>;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]));
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
    out
}

fn pipeline(server: &MockServer, attempts: usize) -> Pipeline {
    let http = Arc::new(FetchClient::new(FetchConfig::default()).unwrap());
    let listing = DirectoryListing::new(
        Arc::clone(&http),
        ListingConfig {
            listing_base_url: format!("{}/contents", server.uri()),
            raw_base_url: format!("{}/raw", server.uri()),
            general_dir: "Normal".into(),
            restricted_dir: "R18".into(),
        },
    );
    AcquisitionPipeline::new(
        http,
        ListingCache::new(listing, Duration::from_secs(300)),
        RandomSelector::new(),
        DedupTracker::new(),
    )
    .with_max_catalog_attempts(attempts)
}

async fn mount_image(server: &MockServer, at: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn listing_run_downloads_and_decodes() {
    let server = MockServer::start().await;
    let listing = json!([
        { "name": "a.png", "type": "file", "download_url": format!("{}/raw/Normal/a.png", server.uri()) },
        { "name": "nested", "type": "dir" }
    ]);
    Mock::given(method("GET"))
        .and(path("/contents/Normal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing))
        .expect(1)
        .mount(&server)
        .await;
    mount_image(&server, "/raw/Normal/a.png", png(6, 4)).await;

    let pipeline = pipeline(&server, 10);
    let cancel = CancellationToken::new();

    for _ in 0..2 {
        let result = pipeline.fetch_from_listing(false, &cancel).await.expect("listing run");
        assert_eq!(result.selected_index, 1);
        assert_eq!(result.total_count, 1);
        assert_eq!(result.display_name, "a.png");
        assert_eq!((result.image.width(), result.image.height()), (6, 4));
    }
}

#[tokio::test]
async fn extended_listing_merges_and_derives_missing_locations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contents/Normal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "a.png", "type": "file", "path": "Normal/a.png" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contents/R18"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "b.png", "type": "file" }
        ])))
        .mount(&server)
        .await;
    mount_image(&server, "/raw/Normal/a.png", png(2, 2)).await;
    mount_image(&server, "/raw/R18/b.png", png(3, 3)).await;

    let pipeline = pipeline(&server, 10);
    let result = pipeline.fetch_from_listing(true, &CancellationToken::new()).await.expect("extended run");

    assert_eq!(result.total_count, 2);
    let expected = if result.selected_index == 1 { "a.png" } else { "b.png" };
    assert_eq!(result.display_name, expected);
    assert_eq!(result.mode, Mode::Listing { extended: true });
}

#[tokio::test]
async fn extended_listing_degrades_when_restricted_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contents/Normal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "a.png", "type": "file", "path": "Normal/a.png" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contents/R18"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_image(&server, "/raw/Normal/a.png", png(2, 2)).await;

    let pipeline = pipeline(&server, 10);
    let result = pipeline.fetch_from_listing(true, &CancellationToken::new()).await.expect("degraded run");
    assert_eq!(result.total_count, 1);
}

#[tokio::test]
async fn listing_unavailable_without_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contents/Normal"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let pipeline = pipeline(&server, 10);
    let failure = pipeline.fetch_from_listing(false, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(failure.stage, Stage::Fetching);
    assert!(matches!(failure.error, Error::CatalogUnavailable(_)));
}

#[tokio::test]
async fn catalog_serves_each_redirect_target_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("Anime | {}/random\n", server.uri())))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/random"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", format!("{}/img/1.png", server.uri())))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/random"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", format!("{}/img/2.png", server.uri())))
        .mount(&server)
        .await;
    mount_image(&server, "/img/1.png", png(1, 1)).await;
    mount_image(&server, "/img/2.png", png(1, 1)).await;

    let pipeline = pipeline(&server, 3);
    let endpoint = format!("{}/api.php", server.uri());
    let cancel = CancellationToken::new();

    let first = pipeline.fetch_from_catalog(&endpoint, 0, &cancel).await.expect("first draw");
    let second = pipeline.fetch_from_catalog(&endpoint, 0, &cancel).await.expect("second draw");
    assert!(first.source_location.as_str().ends_with("/img/1.png"));
    assert!(second.source_location.as_str().ends_with("/img/2.png"));
    assert_eq!(first.display_name, "Anime");

    let failure = pipeline.fetch_from_catalog(&endpoint, 0, &cancel).await.unwrap_err();
    assert!(matches!(failure.error, Error::ExhaustedRetries { attempts: 3 }));
    assert_eq!(pipeline.dedup().len(), 2);
}
