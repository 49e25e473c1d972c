//! Image host backed by a local directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use super::{ALLOWED_CONTENT_TYPES, ImageHost, ImageHostError, UploadedImage};
use crate::config::UploadConfig;

/// URL prefix the public server serves uploads under.
pub const IMAGES_URL_PREFIX: &str = "/images";

/// Stores uploads as `<uuid>.<ext>` files in a directory.
#[derive(Debug, Clone)]
pub struct LocalImageHost {
    dir: PathBuf,
    max_bytes: usize,
}

impl LocalImageHost {
    #[must_use]
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            max_bytes: config.max_bytes,
        }
    }

    /// Directory files are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// File extension for a stored upload, taken from its validated content type.
///
/// The client's file name is ignored.
fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "png",
    }
}

#[async_trait]
impl ImageHost for LocalImageHost {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        file_name: Option<&str>,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<UploadedImage, ImageHostError> {
        if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
            return Err(ImageHostError::UnsupportedType(content_type.to_string()));
        }
        if bytes.is_empty() {
            return Err(ImageHostError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(ImageHostError::TooLarge {
                max: self.max_bytes,
            });
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let public_id = Uuid::new_v4().to_string();
        let stored_name = format!("{public_id}.{}", extension_for(content_type));
        tokio::fs::write(self.dir.join(&stored_name), bytes).await?;

        tracing::info!(public_id = %public_id, file_name = ?file_name, "Image stored");
        Ok(UploadedImage {
            url: format!("{IMAGES_URL_PREFIX}/{stored_name}"),
            public_id,
        })
    }
}
