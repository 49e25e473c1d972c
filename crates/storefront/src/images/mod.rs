//! Product image hosting.
//!
//! Uploads go through the [`ImageHost`] trait, treated as an opaque remote
//! call that may fail. [`LocalImageHost`] writes files to a directory that the
//! public server exposes under `/images`.

mod local;

pub use local::{IMAGES_URL_PREFIX, LocalImageHost};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Content types accepted for product images.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Errors that can occur when uploading an image.
#[derive(Debug, Error)]
pub enum ImageHostError {
    /// The upload has no content.
    #[error("image is empty")]
    Empty,

    /// The upload is larger than the configured limit.
    #[error("image exceeds {max} bytes")]
    TooLarge {
        /// Maximum accepted size.
        max: usize,
    },

    /// The content type is not an accepted image type.
    #[error("unsupported content type: {0}")]
    UnsupportedType(String),

    /// Writing the image failed.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    /// URL the image is served from.
    pub url: String,
    /// Host-side identifier of the stored file.
    pub public_id: String,
}

/// Destination for uploaded product images.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Store `bytes` and return where they can be fetched.
    async fn upload(
        &self,
        file_name: Option<&str>,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<UploadedImage, ImageHostError>;
}
