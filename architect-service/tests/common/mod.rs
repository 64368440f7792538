#![allow(dead_code)]

use architect_service::services::providers::mock::{MockImageProvider, MockTextProvider};
use architect_service::services::{Analyzer, BannedTermList, ImageFetcher};
use architect_service::startup::{build_router, AppState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const BOUNDARY: &str = "architect-test-boundary";

/// Upload limit the test router is built with.
pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// One part of a hand-built multipart body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn analyze_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub text: Arc<MockTextProvider>,
    pub image: Arc<MockImageProvider>,
}

impl TestApp {
    pub fn new(text: MockTextProvider, image: MockImageProvider) -> Self {
        let text = Arc::new(text);
        let image = Arc::new(image);

        let state = AppState {
            analyzer: Analyzer::new(
                text.clone(),
                image.clone(),
                ImageFetcher::new(Duration::from_secs(5)).expect("Failed to build fetcher"),
            ),
            content_filter: Arc::new(BannedTermList::default()),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        };

        Self {
            router: build_router(state),
            text,
            image,
        }
    }

    /// App whose image provider should never be reached.
    pub fn with_text(reply: &str) -> Self {
        Self::new(
            MockTextProvider::new(reply),
            MockImageProvider::new("http://127.0.0.1:9/unused.png"),
        )
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();
        (status, bytes)
    }

    pub async fn analyze(&self, parts: &[Part<'_>]) -> (StatusCode, serde_json::Value) {
        let (status, bytes) = self.send(analyze_request(parts)).await;
        let body = serde_json::from_slice(&bytes).expect("Response was not JSON");
        (status, body)
    }
}

/// Serve stand-in image URLs on a random local port and return its base URL.
pub async fn spawn_image_host() -> String {
    let app = Router::new()
        .route(
            "/villa.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], b"PNGDATA".to_vec()) }),
        )
        .route(
            "/villa.webp",
            get(|| async { ([(header::CONTENT_TYPE, "image/webp")], b"WEBPDATA".to_vec()) }),
        )
        .route(
            "/villa-binary.png",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "image/png; charset=binary")],
                    b"PNGDATA".to_vec(),
                )
            }),
        )
        .route(
            "/expired.png",
            get(|| async { (StatusCode::FORBIDDEN, "expired").into_response() }),
        );

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind image host");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://{}", addr)
}
