#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sarathi_api::auth::jwt::{generate_access_token, JwtConfig};
use sarathi_api::config::{ServerConfig, DEFAULT_IMAGE_FOLDER};
use sarathi_api::router::build_app_router;
use sarathi_api::state::AppState;
use sarathi_cloud::cloudinary::{CloudinaryConfig, DEFAULT_BASE_URL};
use sarathi_cloud::{CloudError, ImageStore, UploadRequest, UploadedImage};
use sarathi_core::seed::SPECIAL_STAFF_EMAIL;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";

/// Build a test `ServerConfig` with safe defaults.
///
/// Image host credentials are left empty; tests plug in
/// [`RecordingImageStore`] instead.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            expiry_hours: 24,
        },
        cloudinary: CloudinaryConfig {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            folder: DEFAULT_IMAGE_FOLDER.to_string(),
        },
        special_staff_email: SPECIAL_STAFF_EMAIL.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Image store double
// ---------------------------------------------------------------------------

/// In-memory [`ImageStore`] that records every call.
#[derive(Default)]
pub struct RecordingImageStore {
    pub uploads: Mutex<Vec<UploadRequest>>,
    pub destroyed: Mutex<Vec<String>>,
}

impl RecordingImageStore {
    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn destroyed_ids(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }

    /// Poll until a destroy call arrives; cleanup runs on a spawned task.
    pub async fn wait_for_destroy(&self) -> Vec<String> {
        for _ in 0..50 {
            let ids = self.destroyed_ids();
            if !ids.is_empty() {
                return ids;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        self.destroyed_ids()
    }
}

#[async_trait]
impl ImageStore for RecordingImageStore {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedImage, CloudError> {
        let stem = request
            .filename
            .rsplit_once('.')
            .map(|(stem, _)| stem.to_string())
            .unwrap_or_else(|| request.filename.clone());
        let public_id = format!("{DEFAULT_IMAGE_FOLDER}/{stem}");
        let secure_url = format!(
            "https://res.cloudinary.com/test/image/upload/v1/{public_id}.jpg"
        );
        self.uploads.lock().unwrap().push(request);
        Ok(UploadedImage {
            secure_url,
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), CloudError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        Ok(())
    }

    fn folder(&self) -> &str {
        DEFAULT_IMAGE_FOLDER
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the full application router against `pool`, with a fresh
/// recording image store.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_images(pool, Arc::new(RecordingImageStore::default()))
}

/// Like [`build_test_app`] but with a caller-held image store so tests can
/// inspect uploads and deletions.
pub fn build_test_app_with_images(pool: PgPool, images: Arc<RecordingImageStore>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        images,
    };
    build_app_router(state, &config)
}

/// Sign a token for an arbitrary staff id and role.
pub fn token_for(staff_id: i64, role: &str) -> String {
    generate_access_token(staff_id, "9000000000", role, &test_config().jwt)
        .expect("token generation should succeed")
}

pub fn admin_token() -> String {
    token_for(1, "admin")
}

pub fn staff_token() -> String {
    token_for(2, "staff")
}

pub fn executive_token() -> String {
    token_for(3, "executive")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should complete")
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

/// Send a body verbatim, for payloads `serde_json::Value` cannot express.
pub async fn send_raw_auth(
    app: Router,
    method: Method,
    uri: &str,
    content_type: &str,
    body: &str,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, content_type)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// One part of a hand-built multipart body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

const BOUNDARY: &str = "sarathi-test-boundary";

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn send_multipart(
    app: Router,
    method: Method,
    uri: &str,
    parts: &[Part<'_>],
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}
