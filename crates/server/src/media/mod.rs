//! Third-party media hosting for uploaded resource files.

pub mod cloudinary;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media host request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("media host rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Clone, Debug)]
pub struct MediaUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub folder: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
}

/// Object-safe so the server can hold an `Arc<dyn MediaHost>`.
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, upload: MediaUpload) -> Result<UploadedMedia, MediaError>;

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError>;

    /// URL that makes the host serve `file_url` as a download. Foreign URLs are returned as is.
    fn attachment_url(&self, file_url: &str) -> String;

    /// Whether `file_url` points at a file this host stores for us.
    fn is_hosted(&self, file_url: &str) -> bool;
}
