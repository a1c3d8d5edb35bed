// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /analyze endpoint tests
//!
//! The router is driven in-process with stub detectors so no model file
//! is needed.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use people_counter::api::{create_router, AppState};
use people_counter::config::ServerConfig;
use people_counter::vision::ObjectDetector;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use crate::common::{
    bmp_bytes, file_part, jpeg_bytes, multipart_body, multipart_content_type, png_bytes, FailingDetector,
    FixedDetector, Part, RecordingDetector,
};

fn app_with(detector: Arc<dyn ObjectDetector>) -> Router {
    create_router(AppState::from_detector(detector), &ServerConfig::default())
}

fn analyze_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_counts_people_in_upload() {
    let app = app_with(Arc::new(FixedDetector::with_counts(3, 0)));
    let image = png_bytes(64, 48);

    let (status, body) = send(app, analyze_request(multipart_body(&[file_part(&image)]))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"peopleCount": 3}));
}

#[tokio::test]
async fn test_ignores_non_person_detections() {
    let app = app_with(Arc::new(FixedDetector::with_counts(2, 5)));
    let image = jpeg_bytes(32, 32);

    let (status, body) = send(app, analyze_request(multipart_body(&[file_part(&image)]))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["peopleCount"], 2);
}

#[tokio::test]
async fn test_empty_scene_returns_zero() {
    let app = app_with(Arc::new(FixedDetector::with_counts(0, 0)));
    let image = png_bytes(16, 16);

    let (status, body) = send(app, analyze_request(multipart_body(&[file_part(&image)]))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"peopleCount": 0}));
}

#[tokio::test]
async fn test_repeated_uploads_give_same_count() {
    let app = app_with(Arc::new(FixedDetector::with_counts(4, 1)));
    let image = png_bytes(40, 30);

    for _ in 0..3 {
        let (status, body) = send(
            app.clone(),
            analyze_request(multipart_body(&[file_part(&image)])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["peopleCount"], 4);
    }
}

#[tokio::test]
async fn test_missing_file_part() {
    let app = app_with(Arc::new(FixedDetector::with_counts(1, 0)));

    let (status, body) = send(
        app,
        analyze_request(multipart_body(&[Part::Text {
            name: "caption",
            value: "hello",
        }])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No file uploaded"}));
}

#[tokio::test]
async fn test_empty_multipart_body() {
    let app = app_with(Arc::new(FixedDetector::with_counts(1, 0)));

    let (status, body) = send(app, analyze_request(multipart_body(&[]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No file uploaded"}));
}

#[tokio::test]
async fn test_wrong_field_name() {
    let app = app_with(Arc::new(FixedDetector::with_counts(1, 0)));
    let image = png_bytes(8, 8);

    let (status, body) = send(
        app,
        analyze_request(multipart_body(&[Part::File {
            name: "image",
            filename: "photo.png",
            content_type: "image/png",
            data: &image,
        }])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn test_plain_text_file_field_is_not_an_upload() {
    let app = app_with(Arc::new(FixedDetector::with_counts(1, 0)));

    let (status, body) = send(
        app,
        analyze_request(multipart_body(&[Part::Text {
            name: "file",
            value: "not really a file",
        }])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn test_json_body_is_rejected() {
    let app = app_with(Arc::new(FixedDetector::with_counts(1, 0)));

    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"file":"abc"}"#))
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No file uploaded"}));
}

#[tokio::test]
async fn test_file_part_selected_among_other_fields() {
    let detector = Arc::new(RecordingDetector::default());
    let app = app_with(detector.clone());
    let image = png_bytes(50, 20);

    let (status, body) = send(
        app,
        analyze_request(multipart_body(&[
            Part::Text {
                name: "note",
                value: "first",
            },
            file_part(&image),
        ])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["peopleCount"], 1);
    assert_eq!(detector.calls(), 1);
    assert_eq!(detector.sizes(), vec![(50, 20)]);
}

#[tokio::test]
async fn test_first_file_part_wins() {
    let detector = Arc::new(RecordingDetector::default());
    let app = app_with(detector.clone());
    let first = png_bytes(50, 20);
    let second = png_bytes(10, 10);

    let (status, body) = send(
        app,
        analyze_request(multipart_body(&[file_part(&first), file_part(&second)])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["peopleCount"], 1);
    assert_eq!(detector.sizes(), vec![(50, 20)]);
}

#[tokio::test]
async fn test_empty_file_input() {
    // What a browser sends for a file input left blank
    let detector = Arc::new(RecordingDetector::default());
    let app = app_with(detector.clone());

    let (status, body) = send(
        app,
        analyze_request(multipart_body(&[Part::File {
            name: "file",
            filename: "",
            content_type: "application/octet-stream",
            data: &[],
        }])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid image"));
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_undecodable_image() {
    let detector = Arc::new(RecordingDetector::default());
    let app = app_with(detector.clone());

    let (status, body) = send(
        app,
        analyze_request(multipart_body(&[file_part(b"definitely not an image")])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid image"));
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_detector_failure() {
    let app = app_with(Arc::new(FailingDetector));
    let image = png_bytes(8, 8);

    let (status, body) = send(app, analyze_request(multipart_body(&[file_part(&image)]))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Detection failed"));
    assert!(message.contains("session exploded"));
}

#[tokio::test]
async fn test_get_not_allowed() {
    let app = app_with(Arc::new(FixedDetector::with_counts(1, 0)));

    let request = Request::builder()
        .method("GET")
        .uri("/analyze")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = app_with(Arc::new(FixedDetector::with_counts(1, 0)));

    let request = Request::builder()
        .method("POST")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_limit_enforced() {
    let config = ServerConfig {
        max_upload_bytes: Some(64),
        ..Default::default()
    };
    let app = create_router(
        AppState::from_detector(Arc::new(FixedDetector::with_counts(1, 0))),
        &config,
    );
    let image = png_bytes(128, 128);

    let (status, body) = send(app, analyze_request(multipart_body(&[file_part(&image)]))).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Upload too large"));
}

#[tokio::test]
async fn test_large_upload_accepted_without_limit() {
    let app = app_with(Arc::new(FixedDetector::with_counts(2, 0)));
    // Uncompressed, larger than axum's 2 MiB default body limit
    let image = bmp_bytes(1000, 800);
    assert!(image.len() > 2 * 1024 * 1024);

    let (status, body) = send(
        app,
        analyze_request(multipart_body(&[Part::File {
            name: "file",
            filename: "large.bmp",
            content_type: "image/bmp",
            data: &image,
        }])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["peopleCount"], 2);
}
