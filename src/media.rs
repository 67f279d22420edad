use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::error::ApiError;

const RECIPE_IMAGE_DIR: &str = "uploads/recipe";
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Upload a valid image. The file you uploaded was either not an image or a corrupted image.")]
    NotAnImage,

    #[error("The submitted file is empty.")]
    Empty,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Io(e) => {
                tracing::error!("Media storage error: {}", e);
                ApiError::internal_server_error("Failed to store uploaded file")
            }
            other => ApiError::field_error("image", other.to_string()),
        }
    }
}

/// Uploaded files on local disk, served back under `url_prefix`.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into(),
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.root.clone(), config.url_prefix.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Public URL path for a stored file
    pub fn url(&self, relative: &str) -> String {
        format!("{}/{}", self.url_prefix.trim_end_matches('/'), relative)
    }

    /// Store a recipe image under a fresh uuid name. Both the file name and the
    /// leading bytes must denote an accepted image format; the stored extension
    /// is the one of the detected format. Returns the path relative to the media root.
    pub async fn save_recipe_image(&self, original_name: &str, bytes: &[u8]) -> Result<String, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        image_extension(original_name).ok_or(MediaError::NotAnImage)?;
        let extension = sniff_image(bytes).ok_or(MediaError::NotAnImage)?;

        let relative = format!("{}/{}.{}", RECIPE_IMAGE_DIR, Uuid::new_v4(), extension);
        let path = self.root.join(&relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!("Stored recipe image at {}", path.display());
        Ok(relative)
    }

    /// Best effort; a missing file is not an error.
    pub async fn remove(&self, relative: &str) {
        let path = self.root.join(relative);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!("Removed media file {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove media file {}: {}", path.display(), e),
        }
    }
}

/// Lowercased extension of `name` if it names an image type.
fn image_extension(name: &str) -> Option<String> {
    let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&extension.as_str()).then_some(extension)
}

/// Extension of the image format the content starts with, if accepted
fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    let kind = infer::get(bytes)?;
    (kind.matcher_type() == infer::MatcherType::Image && IMAGE_EXTENSIONS.contains(&kind.extension()))
        .then(|| kind.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

    #[test]
    fn recognises_image_extensions() {
        assert_eq!(image_extension("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(image_extension("dish.png").as_deref(), Some("png"));
        assert_eq!(image_extension("notes.txt"), None);
        assert_eq!(image_extension("noextension"), None);
    }

    #[test]
    fn sniffs_image_content() {
        assert_eq!(sniff_image(PNG), Some("png"));
        assert_eq!(sniff_image(b"\xff\xd8\xff\xe0\x00\x10JFIF"), Some("jpg"));
        assert_eq!(sniff_image(b"GIF89a\x01\x00"), Some("gif"));
        assert_eq!(sniff_image(b"#!/bin/sh\nrm -rf /\n"), None);
        assert_eq!(sniff_image(b"%PDF-1.7"), None);
    }

    #[tokio::test]
    async fn saves_and_removes_recipe_image() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStorage::new(dir.path(), "/media");

        let relative = media.save_recipe_image("dish.jpeg", b"\xff\xd8\xff\xe0\x00\x10JFIF").await.unwrap();
        assert!(relative.starts_with("uploads/recipe/"));
        assert!(relative.ends_with(".jpg"));
        assert!(dir.path().join(&relative).exists());
        assert_eq!(media.url(&relative), format!("/media/{}", relative));

        media.remove(&relative).await;
        assert!(!dir.path().join(&relative).exists());
    }

    #[tokio::test]
    async fn rejects_non_images_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStorage::new(dir.path(), "/media");

        assert!(matches!(media.save_recipe_image("notimage", PNG).await, Err(MediaError::NotAnImage)));
        assert!(matches!(media.save_recipe_image("empty.png", b"").await, Err(MediaError::Empty)));
        assert!(matches!(
            media.save_recipe_image("evil.png", b"#!/bin/sh\nrm -rf /\n").await,
            Err(MediaError::NotAnImage)
        ));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
