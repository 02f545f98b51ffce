use async_trait::async_trait;

use crate::domain::image::DecodedImage;

/// Where an uploaded image belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Recipe,
    Avatar,
}

/// Output port: persistent storage for uploaded images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store the image and return its path relative to the media root.
    async fn save(&self, kind: ImageKind, image: DecodedImage) -> anyhow::Result<String>;

    /// Remove a stored image. Missing files are not an error.
    async fn remove(&self, path: &str) -> anyhow::Result<()>;

    /// Public URL of a stored image.
    fn url(&self, path: &str) -> String;
}
