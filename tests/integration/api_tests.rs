//! API integration tests for palette retrieval and error handling.
//!
//! Tests verify:
//! - Palette and single-color responses for generated images
//! - Validation failures (missing image, bad URL, host, count)
//! - Upstream, decode and empty-sample failures
//! - HTTP response codes and headers

use axum::http::StatusCode;

use palette_server::cache::DurableStore;

use super::test_utils::{
    body_json, create_red_blue_png, create_solid_png, create_transparent_padded_png, image_url,
    other_image_url, palette_uri, TestApp, TrackingMockFetcher, SLUG,
};

fn red_blue_app() -> TestApp {
    TestApp::new(TrackingMockFetcher::new(create_red_blue_png()))
}

// =============================================================================
// Successful Requests
// =============================================================================

#[tokio::test]
async fn test_palette_red_blue_two_colors() {
    let app = red_blue_app();

    let response = app.get(&palette_uri("/", &image_url(), Some("2"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let mut palette: Vec<Vec<u8>> = serde_json::from_value(json["palette"].clone()).unwrap();
    palette.sort();
    assert_eq!(palette, vec![vec![0, 0, 255], vec![255, 0, 0]]);
}

#[tokio::test]
async fn test_palette_response_headers() {
    let app = red_blue_app();

    let response = app.get(&palette_uri("/", &image_url(), None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, s-maxage=2592000"
    );
    assert_eq!(
        response.headers().get("x-palette-cache-hit").unwrap(),
        "false"
    );
}

#[tokio::test]
async fn test_palette_alias_route() {
    let app = red_blue_app();

    let response = app.get(&palette_uri("/palette", &image_url(), Some("3"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    // Only two distinct colors: no padding up to three.
    assert_eq!(json["palette"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_default_count_is_four() {
    let app = red_blue_app();

    let response = app.get(&palette_uri("/", &image_url(), None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    app.wait_for_durable_entries(1).await;
    let key = format!("4:{}", SLUG);
    assert!(app.durable.get(&key).await.unwrap().is_some());
}

#[tokio::test]
async fn test_transparent_pixels_ignored() {
    let app = TestApp::new(TrackingMockFetcher::new(create_transparent_padded_png()));

    let response = app.get(&palette_uri("/", &image_url(), Some("4"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["palette"], serde_json::json!([[200, 20, 20]]));
}

#[tokio::test]
async fn test_color_endpoint() {
    let app = TestApp::new(TrackingMockFetcher::new(create_solid_png(
        8,
        8,
        [10, 120, 200, 255],
    )));

    let response = app.get(&palette_uri("/color", &image_url(), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, s-maxage=2592000"
    );

    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({ "color": [10, 120, 200] }));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = red_blue_app();

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// Validation Errors
// =============================================================================

#[tokio::test]
async fn test_missing_image_param() {
    let app = red_blue_app();

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "missing image url. specify with ?image=");
    assert_eq!(app.fetcher.request_count(), 0);
}

#[tokio::test]
async fn test_invalid_image_url() {
    let app = red_blue_app();

    let response = app.get(&palette_uri("/", "not a url", None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid image url");
}

#[tokio::test]
async fn test_disallowed_host() {
    let app = red_blue_app();
    let url = format!("https://images.example.com/{}", SLUG);

    let response = app.get(&palette_uri("/", &url, None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "image host not allowed");
    assert_eq!(app.fetcher.request_count(), 0);
}

#[tokio::test]
async fn test_invalid_counts_rejected() {
    let app = red_blue_app();

    for count in ["0", "11", "-3", "many"] {
        let response = app.get(&palette_uri("/", &image_url(), Some(count))).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "count {count:?} should be rejected"
        );

        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid color count specified.");
    }

    assert_eq!(app.fetcher.request_count(), 0);
}

#[tokio::test]
async fn test_repeated_params_use_first_value() {
    let app = red_blue_app();
    let uri = format!(
        "{}&image={}&count=9",
        palette_uri("/", &image_url(), Some("2")),
        url::form_urlencoded::byte_serialize(other_image_url().as_bytes()).collect::<String>()
    );

    let response = app.get(&uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );

    let json = body_json(response).await;
    assert_eq!(json["palette"].as_array().unwrap().len(), 2);
    assert_eq!(app.fetcher.get_requests().await, vec![image_url()]);
}

#[tokio::test]
async fn test_repeated_invalid_image_is_json_error() {
    let app = red_blue_app();

    let response = app.get("/color?image=a&image=b").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid image url");
    assert_eq!(app.fetcher.request_count(), 0);
}

#[tokio::test]
async fn test_count_one_rejected_before_fetch() {
    let app = red_blue_app();

    let response = app.get(&palette_uri("/", &image_url(), Some("1"))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("single-color"));

    assert_eq!(app.fetcher.request_count(), 0);
    assert!(app.durable.is_empty().await);
}

// =============================================================================
// Pipeline Errors
// =============================================================================

#[tokio::test]
async fn test_upstream_status_passed_through() {
    for status in [404u16, 403, 500] {
        let app = TestApp::new(TrackingMockFetcher::with_status(status));

        let response = app.get(&palette_uri("/", &image_url(), None)).await;
        assert_eq!(response.status().as_u16(), status);

        let json = body_json(response).await;
        assert_eq!(json["error"], "image fetch failed");
        assert_eq!(app.fetcher.request_count(), 1);
    }
}

#[tokio::test]
async fn test_transport_failure_is_bad_gateway() {
    let app = TestApp::new(TrackingMockFetcher::unreachable());

    let response = app.get(&palette_uri("/", &image_url(), None)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(response).await;
    assert_eq!(json["error"], "image fetch failed");
}

#[tokio::test]
async fn test_undecodable_image() {
    let app = TestApp::new(TrackingMockFetcher::new(b"<html>not an image</html>".to_vec()));

    let response = app.get(&palette_uri("/", &image_url(), None)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["error"], "failed to decode image");
}

#[tokio::test]
async fn test_all_white_image_has_no_colors() {
    let app = TestApp::new(TrackingMockFetcher::new(create_solid_png(
        6,
        6,
        [255, 255, 255, 255],
    )));

    let response = app.get(&palette_uri("/", &image_url(), None)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["error"], "no representative colors found");
    assert!(app.durable.is_empty().await);
}

#[tokio::test]
async fn test_error_responses_are_json() {
    let app = TestApp::new(TrackingMockFetcher::with_status(404));

    let response = app.get(&palette_uri("/", &image_url(), None)).await;
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert!(response.headers().get("x-palette-cache-hit").is_none());
}
