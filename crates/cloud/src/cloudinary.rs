//! Cloudinary REST client.
//!
//! Uploads go to `POST {base}/v1_1/{cloud}/image/upload` as multipart forms
//! and deletions to `.../image/destroy`. Every call is signed with SHA-256
//! over the sorted request parameters followed by the API secret.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::format::{ALLOWED_FORMATS, ORDER_IMAGE_TRANSFORMATION};
use crate::{CloudError, ImageStore, UploadRequest, UploadedImage};

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudinary.com";

/// Credentials and placement for a Cloudinary account.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// API host without a trailing slash.
    pub base_url: String,
    /// Folder uploads are placed under and deletions are resolved against.
    pub folder: String,
}

impl CloudinaryConfig {
    /// `true` when all three credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// [`ImageStore`] backed by the Cloudinary upload API.
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{action}",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    fn ensure_configured(&self) -> Result<(), CloudError> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(CloudError::NotConfigured)
        }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`CloudError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CloudError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CloudError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CloudError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl ImageStore for CloudinaryStore {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedImage, CloudError> {
        self.ensure_configured()?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let allowed_formats = ALLOWED_FORMATS.join(",");
        let params = [
            ("allowed_formats", allowed_formats.as_str()),
            ("folder", self.config.folder.as_str()),
            ("timestamp", timestamp.as_str()),
            ("transformation", ORDER_IMAGE_TRANSFORMATION),
        ];
        let signature = sign_params(&params, &self.config.api_secret);

        let mut file = Part::bytes(request.bytes).file_name(request.filename.clone());
        if let Some(content_type) = request.content_type.as_deref() {
            file = file.mime_str(content_type)?;
        }

        let mut form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key.to_string(), value.to_string());
        }

        tracing::debug!(filename = %request.filename, folder = %self.config.folder, "Uploading image");
        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadResponse = Self::parse_response(response).await?;

        tracing::info!(public_id = %uploaded.public_id, "Image uploaded");
        Ok(UploadedImage {
            secure_url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), CloudError> {
        self.ensure_configured()?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let params = [("public_id", public_id), ("timestamp", timestamp.as_str())];
        let signature = sign_params(&params, &self.config.api_secret);

        let form = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];
        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&form)
            .send()
            .await?;
        let outcome: DestroyResponse = Self::parse_response(response).await?;

        match outcome.result.as_str() {
            "ok" | "not found" => {
                tracing::debug!(public_id, result = %outcome.result, "Image destroyed");
                Ok(())
            }
            other => Err(CloudError::Rejected(other.to_string())),
        }
    }

    fn folder(&self) -> &str {
        &self.config.folder
    }
}

/// Compute the request signature: parameters sorted by name, joined as
/// `k=v&k=v`, with the API secret appended, hashed with SHA-256 (lowercase hex).
///
/// `file`, `api_key`, and the signature fields themselves must not be passed in.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
