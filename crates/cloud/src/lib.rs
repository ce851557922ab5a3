//! Image host adapter for order attachments.
//!
//! - [`ImageStore`] -- the seam handlers talk to.
//! - [`cloudinary::CloudinaryStore`] -- the production implementation.
//! - [`format`] -- upload format checks and public-id derivation.

pub mod cloudinary;
pub mod format;

/// Errors from the image host layer.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The image host returned a non-2xx status code.
    #[error("Image host error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The image host answered 2xx but reported a failed operation.
    #[error("Image host rejected the request: {0}")]
    Rejected(String),

    /// Credentials are missing from the environment.
    #[error("Image host is not configured")]
    NotConfigured,
}

/// A file received from a client, ready to be forwarded to the image host.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: Option<String>,
}

/// Where an uploaded file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// HTTPS URL stored on the order.
    pub secure_url: String,
    /// Host-side identifier, `<folder>/<stem>`.
    pub public_id: String,
}

/// Storage backend for order images.
///
/// Implementations must be shareable across request handlers.
#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload a file into the configured folder.
    async fn upload(&self, request: UploadRequest) -> Result<UploadedImage, CloudError>;

    /// Delete a previously uploaded file. Deleting a missing file is not an error.
    async fn destroy(&self, public_id: &str) -> Result<(), CloudError>;

    /// Folder every upload is placed under.
    fn folder(&self) -> &str;
}
