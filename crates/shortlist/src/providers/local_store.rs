use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use logo_kit_common::{ContentType, ImageRef};
use tracing::debug;
use uuid::Uuid;

use crate::{error::PersistError, traits::ArtifactStore};

const DEFAULT_PREFIX: &str = "logos";

/// Filesystem-backed artifact store.
///
/// Objects land at `<root>/<prefix>/<unix-millis>-<uuid>.<ext>` and are
/// addressed publicly as `<public_base_url>/<key>`.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
    public_base_url: String,
    prefix: String,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    /// Fresh object key for a content type
    pub fn object_key(&self, content_type: ContentType) -> String {
        let name = format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4(),
            content_type.extension()
        );
        if self.prefix.is_empty() {
            name
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn persist(&self, bytes: &[u8], content_type: ContentType) -> Result<ImageRef, PersistError> {
        if bytes.is_empty() {
            return Err(PersistError::Rejected("empty object".to_string()));
        }
        let key = self.object_key(content_type);
        let path = self.path_for(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        debug!(%key, size = bytes.len(), "persisted artifact");
        Ok(ImageRef::stored(self.public_url(&key), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_persist_writes_under_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path(), "https://cdn.example.com/");
        let image_ref = store.persist(b"png-bytes", ContentType::Png).await.unwrap();

        let key = image_ref.storage_key.clone().unwrap();
        assert!(key.starts_with("logos/"));
        assert!(key.ends_with(".png"));
        assert_eq!(image_ref.public_url, format!("https://cdn.example.com/{key}"));
        assert_eq!(std::fs::read(store.path_for(&key)).unwrap(), b"png-bytes");
    }

    #[test]
    fn test_keys_are_unique() {
        let store = LocalArtifactStore::new("/tmp", "http://localhost").with_prefix("/brand/");
        let a = store.object_key(ContentType::Svg);
        let b = store.object_key(ContentType::Svg);
        assert_ne!(a, b);
        assert!(a.starts_with("brand/") && a.ends_with(".svg"));
    }

    #[tokio::test]
    async fn test_empty_object_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path(), "http://localhost");
        assert!(matches!(
            store.persist(&[], ContentType::Png).await,
            Err(PersistError::Rejected(_))
        ));
    }
}
