use std::path::PathBuf;

use async_trait::async_trait;
use logo_kit_common::{ContentType, utils};

use crate::{error::FetchError, traits::ImageFetcher};

/// Resolves `file://` URLs and bare filesystem paths
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl FileFetcher {
    fn path_of(url: &str) -> Result<PathBuf, FetchError> {
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        if url.contains("://") {
            return Err(FetchError::Unsupported(url.to_string()));
        }
        Ok(PathBuf::from(url))
    }
}

#[async_trait]
impl ImageFetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<(Vec<u8>, ContentType), FetchError> {
        let path = Self::path_of(url)?;
        let content_type = utils::get_file_extension(&path.to_string_lossy())
            .and_then(|ext| ContentType::from_extension(&ext))
            .unwrap_or(ContentType::Png);
        let data = tokio::fs::read(&path).await?;
        Ok((data, content_type))
    }
}
