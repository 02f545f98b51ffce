//! Filesystem-backed image storage under the configured media root.

use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context};
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::domain::image::DecodedImage;
use crate::domain::ports::{ImageKind, ImageStore};

const RECIPE_DIR: &str = "recipes/images";
const AVATAR_DIR: &str = "users";

pub struct FsImageStore {
    root: PathBuf,
    base_url: String,
}

impl FsImageStore {
    /// `base_url` is the URL prefix the media root is served under, e.g. `/media/`.
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Self {
            root: root.into(),
            base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stored paths are relative and may not climb out of the root.
    fn resolve(&self, path: &str) -> anyhow::Result<PathBuf> {
        let rel = Path::new(path);
        if !rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            bail!("refusing media path outside the root: {path}");
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(&self, kind: ImageKind, image: DecodedImage) -> anyhow::Result<String> {
        let dir = match kind {
            ImageKind::Recipe => RECIPE_DIR,
            ImageKind::Avatar => AVATAR_DIR,
        };
        let rel = format!("{dir}/{}.{}", Uuid::new_v4(), image.extension);
        let full = self.root.join(&rel);

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create media dir {}", parent.display()))?;
        }
        tokio::fs::write(&full, &image.bytes)
            .await
            .with_context(|| format!("write image {}", full.display()))?;

        debug!(path = %rel, bytes = image.bytes.len(), "Stored image");
        Ok(rel)
    }

    async fn remove(&self, path: &str) -> anyhow::Result<()> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove image {}", full.display())),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tracing_test::traced_test;

    fn png() -> DecodedImage {
        DecodedImage {
            extension: "png",
            bytes: vec![0x89, b'P', b'N', b'G', 1, 2, 3],
        }
    }

    #[tokio::test]
    async fn save_then_remove() {
        let tmp = tempdir().unwrap();
        let store = FsImageStore::new(tmp.path(), "/media");

        let path = store.save(ImageKind::Recipe, png()).await.unwrap();
        assert!(path.starts_with("recipes/images/"));
        assert!(path.ends_with(".png"));
        assert!(tmp.path().join(&path).is_file());
        assert_eq!(store.url(&path), format!("/media/{path}"));

        store.remove(&path).await.unwrap();
        assert!(!tmp.path().join(&path).exists());
        // Second removal is a no-op.
        store.remove(&path).await.unwrap();
    }

    #[tokio::test]
    #[traced_test]
    async fn avatars_go_to_users_dir() {
        let tmp = tempdir().unwrap();
        let store = FsImageStore::new(tmp.path(), "http://cdn.local/m/");
        let path = store.save(ImageKind::Avatar, png()).await.unwrap();
        assert!(path.starts_with("users/"));
        assert!(store.url(&path).starts_with("http://cdn.local/m/users/"));
        assert!(logs_contain("Stored image"));
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let tmp = tempdir().unwrap();
        let store = FsImageStore::new(tmp.path(), "/media/");
        assert!(store.remove("../etc/passwd").await.is_err());
        assert!(store.remove("/etc/passwd").await.is_err());
    }
}
