//! # Fear & Greed Service Mock Test Suite
//!
//! Runs the full fetch → extract → validate pipeline and the image download
//! against a local mock server standing in for money.cnn.com.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use chrono_tz::US::Eastern;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use fng_scrape_ng::configs::ScrapeConfig;
use fng_scrape_ng::core::error::NgError;
use fng_scrape_ng::loggers::{LogTarget, LoggerBuilder};
use fng_scrape_ng::markets::cnn::extract::Extractor;
use fng_scrape_ng::markets::cnn::fearandgreed::FearAndGreed;
use fng_scrape_ng::markets::cnn::model::{FearAndGreedResult, PartialResult, ValueText};
use fng_scrape_ng::markets::cnn::page::RawDocument;

const PAGE: &str = include_str!("fixtures/page.html");
const PAGE_PATH: &str = "/data/fear-and-greed/";

/// Helper to initialize the FearAndGreed service pointed at a mock server.
///
/// # Returns
/// A tuple containing the initialized [`FearAndGreed`] service and the [`MockServer`].
async fn setup_fng_test() -> (FearAndGreed, MockServer) {
    let server = MockServer::start().await;

    let logger = LoggerBuilder::new("fng_test")
        .with_target(LogTarget::Discard)
        .build()
        .expect("Failed to build test logger");

    let config = ScrapeConfig {
        page_url: format!("{}{}", server.uri(), PAGE_PATH),
        ..ScrapeConfig::default()
    };
    let service = FearAndGreed::with_config(logger, &config).expect("Default zone should resolve");
    (service, server)
}

fn snapshot_now() -> DateTime<Utc> {
    Eastern.with_ymd_and_hms(2021, 3, 29, 18, 0, 0).unwrap().with_timezone(&Utc)
}

#[tokio::test]
async fn test_parse_page_snapshot() {
    //! Scenario: the page serves the saved snapshot.
    //! Goal: every field is extracted and the marker lands on Mar 29 2021.
    let (service, server) = setup_fng_test().await;

    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let result = service.parse_at(snapshot_now()).await.expect("Snapshot should parse");

    assert_eq!(
        result.image_url,
        "http://markets.money.cnn.com/Marketsdata/uploadhandler/z6f8f7d0az4c46c1b6d9644447a6d8829abaa17ece.png"
    );
    assert_eq!(result.now, ValueText::new(44, "Fear"));
    assert_eq!(result.previous_close, ValueText::new(52, "Neutral"));
    assert_eq!(result.one_week_ago, ValueText::new(54, "Neutral"));
    assert_eq!(result.one_month_ago, ValueText::new(48, "Neutral"));
    assert_eq!(result.one_year_ago, ValueText::new(23, "Extreme Fear"));
    assert_eq!(result.last_update_date, Eastern.with_ymd_and_hms(2021, 3, 29, 16, 59, 0).unwrap());
}

#[tokio::test]
async fn test_non_200_status_is_http_error() {
    //! Scenario: the page answers 503.
    //! Goal: HttpStatusError carries the status and reason.
    let (service, server) = setup_fng_test().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>Maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    match service.parse().await {
        Err(NgError::HttpStatusError { status, reason, url }) => {
            assert_eq!(status, 503);
            assert_eq!(reason, "Service Unavailable");
            assert!(url.ends_with(PAGE_PATH));
        }
        other => panic!("Expected HttpStatusError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_other_success_codes_are_rejected() {
    //! Scenario: 204 is a success code but not 200.
    //! Goal: only 200 is accepted.
    let (service, server) = setup_fng_test().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let result = service.parse().await;
    assert!(matches!(result, Err(NgError::HttpStatusError { status: 204, .. })));
}

#[tokio::test]
async fn test_stray_invalid_byte_does_not_fail_scrape() {
    //! Scenario: the page carries one byte that is not valid UTF-8.
    //! Goal: the byte is replaced and every field still extracts.
    let (service, server) = setup_fng_test().await;

    let mut body = PAGE.replace("All times are ET.", "All times are ET.\u{0}").into_bytes();
    let pos = body.iter().position(|b| *b == 0).unwrap();
    body[pos] = 0xff;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;

    let result = service.parse_at(snapshot_now()).await.expect("Lossy body should still parse");
    assert_eq!(result.now, ValueText::new(44, "Fear"));
}

#[tokio::test]
async fn test_empty_body_is_document_error() {
    let (service, server) = setup_fng_test().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = service.parse().await;
    assert!(matches!(result, Err(NgError::DocumentParseError(_))), "got {:?}", result);
}

#[tokio::test]
async fn test_changed_markup_is_empty_field_error() {
    //! Scenario: the page layout changed and the container is gone.
    //! Goal: validation reports every field, no partial result escapes.
    let (service, server) = setup_fng_test().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body><div id=\"app\"></div></body></html>"))
        .mount(&server)
        .await;

    match service.parse().await {
        Err(NgError::EmptyFieldError { fields }) => assert_eq!(fields.len(), 7),
        other => panic!("Expected EmptyFieldError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let logger = LoggerBuilder::new("fng_test").with_target(LogTarget::Discard).build().unwrap();
    let config = ScrapeConfig {
        page_url: "http://127.0.0.1:1/data/fear-and-greed/".to_string(),
        ..ScrapeConfig::default()
    };
    let service = FearAndGreed::with_config(logger, &config).unwrap();

    let result = service.parse().await;
    assert!(matches!(result, Err(NgError::TransportError(_))), "got {:?}", result);
}

#[tokio::test]
async fn test_malformed_url_is_request_build_error() {
    let logger = LoggerBuilder::new("fng_test").with_target(LogTarget::Discard).build().unwrap();
    let config = ScrapeConfig {
        page_url: "not a url".to_string(),
        ..ScrapeConfig::default()
    };
    let service = FearAndGreed::with_config(logger, &config).unwrap();

    let result = service.parse().await;
    assert!(matches!(result, Err(NgError::RequestBuildError(_))), "got {:?}", result);
}

#[tokio::test]
async fn test_unknown_zone_is_config_error() {
    let logger = LoggerBuilder::new("fng_test").with_target(LogTarget::Discard).build().unwrap();
    let config = ScrapeConfig {
        time_zone: "Mars/Olympus_Mons".to_string(),
        ..ScrapeConfig::default()
    };

    assert!(matches!(FearAndGreed::with_config(logger, &config), Err(NgError::ConfigError(_))));
}

#[tokio::test]
async fn test_extract_offline_document() {
    //! Scenario: extraction from a document obtained without the service's fetcher.
    //! Goal: same result as the online path, twice in a row.
    let (service, _server) = setup_fng_test().await;
    let doc = RawDocument::from_html("file://snapshot", PAGE);

    let first = service.extract(&doc, snapshot_now()).unwrap();
    let second = service.extract(&doc, snapshot_now()).unwrap();
    assert_eq!(serde_json::to_string(&first).unwrap(), serde_json::to_string(&second).unwrap());
}

/// Extractor that ignores the markup and returns a fixed reading.
struct FixedExtractor;

impl Extractor for FixedExtractor {
    fn extract(&self, _html: &str, zone: Tz, now: DateTime<Utc>) -> Result<PartialResult, NgError> {
        Ok(PartialResult {
            image_url: "http://markets.money.cnn.com/Marketsdata/uploadhandler/fixed.png".to_string(),
            readings: [
                ValueText::new(90, "Extreme Greed"),
                ValueText::new(80, "Greed"),
                ValueText::new(70, "Greed"),
                ValueText::new(60, "Greed"),
                ValueText::new(50, "Neutral"),
            ],
            last_update_date: Some(now.with_timezone(&zone).fixed_offset()),
        })
    }
}

#[tokio::test]
async fn test_custom_extractor_replaces_page_layout() {
    //! Scenario: a different page layout is handled by a plugged-in extractor.
    //! Goal: its output flows through validation unchanged.
    let (service, _server) = setup_fng_test().await;
    let service = service.with_extractor(FixedExtractor);
    let doc = RawDocument::from_html("file://other-layout", "<html><body>new layout</body></html>");

    let result = service.extract(&doc, snapshot_now()).expect("Fixed extractor output is complete");
    assert_eq!(result.now, ValueText::new(90, "Extreme Greed"));
    assert_eq!(result.one_year_ago, ValueText::new(50, "Neutral"));
    assert_eq!(result.last_update_date, snapshot_now());
}

#[tokio::test]
async fn test_page_headers_set_through_service() {
    let (mut service, server) = setup_fng_test().await;
    service.page_mut().set_header("user-agent", "Mozilla/5.0");

    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .and(header("user-agent", "Mozilla/5.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&server)
        .await;

    assert!(service.parse_at(snapshot_now()).await.is_ok());
}

// =========================================================================
// IMAGE DOWNLOAD
// =========================================================================

fn result_with_image(image_url: String) -> FearAndGreedResult {
    FearAndGreedResult {
        image_url,
        now: ValueText::new(44, "Fear"),
        previous_close: ValueText::new(52, "Neutral"),
        one_week_ago: ValueText::new(54, "Neutral"),
        one_month_ago: ValueText::new(48, "Neutral"),
        one_year_ago: ValueText::new(23, "Extreme Fear"),
        last_update_date: Eastern.with_ymd_and_hms(2021, 3, 29, 16, 59, 0).unwrap().fixed_offset(),
    }
}

#[tokio::test]
async fn test_get_image_bytes_success() {
    let (service, server) = setup_fng_test().await;
    let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    Mock::given(method("GET"))
        .and(path("/Marketsdata/uploadhandler/needle.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let result = result_with_image(format!("{}/Marketsdata/uploadhandler/needle.png", server.uri()));
    let bytes = service.get_image_bytes(&result).await.expect("Image should download");
    assert_eq!(bytes, png);
}

#[tokio::test]
async fn test_get_image_bytes_non_200() {
    let (service, server) = setup_fng_test().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = result_with_image(format!("{}/Marketsdata/uploadhandler/gone.png", server.uri()));
    match service.get_image_bytes(&result).await {
        Err(NgError::ImageDownloadError { status, url, .. }) => {
            assert_eq!(status, Some(404));
            assert!(url.ends_with("gone.png"));
        }
        other => panic!("Expected ImageDownloadError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_image_bytes_unreachable() {
    let (service, _server) = setup_fng_test().await;

    let result = result_with_image("http://127.0.0.1:1/needle.png".to_string());
    let outcome = service.get_image_bytes(&result).await;
    assert!(
        matches!(outcome, Err(NgError::ImageDownloadError { status: None, .. })),
        "got {:?}",
        outcome
    );
}
