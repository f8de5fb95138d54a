use std::path::{Path, PathBuf};

use async_trait::async_trait;
use logo_kit_common::{ContentType, ImagePayload, utils};
use tracing::debug;

use crate::{
    error::GenerationError,
    traits::ImageGenerator,
    types::{GeneratedImage, GenerationHints},
};

/// Replays image files from a directory, one per attempt.
///
/// The file is picked by the attempt's issue index, so concurrent attempts
/// always see the same assignment.
pub struct DirectoryGenerator {
    files: Vec<PathBuf>,
}

impl DirectoryGenerator {
    /// Collect image files under `dir` in lexical order
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, GenerationError> {
        let dir = dir.as_ref();
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(utils::is_image_file)
            })
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(GenerationError::NoSources(format!(
                "no image files in {}",
                dir.display()
            )));
        }
        debug!(count = files.len(), dir = %dir.display(), "loaded replay images");
        Ok(Self { files })
    }

    pub fn from_files(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl ImageGenerator for DirectoryGenerator {
    fn name(&self) -> &str {
        "directory"
    }

    async fn generate(
        &self,
        _prompt: &str,
        hints: &GenerationHints,
    ) -> Result<GeneratedImage, GenerationError> {
        if self.files.is_empty() {
            return Err(GenerationError::NoSources("replay list is empty".to_string()));
        }
        let path = &self.files[hints.attempt as usize % self.files.len()];
        let content_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ContentType::from_extension(&ext.to_lowercase()))
            .unwrap_or(ContentType::Png);
        let data = tokio::fs::read(path).await?;
        if data.is_empty() {
            return Err(GenerationError::EmptyOutput);
        }
        Ok(GeneratedImage::new(
            ImagePayload::bytes(data, content_type),
            format!("directory:{}", path.display()),
            "replay",
        ))
    }
}
