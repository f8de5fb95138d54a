use async_trait::async_trait;
use logo_kit_common::{ContentType, CreativeBrief, ImageRef};

use crate::{
    error::{FetchError, GenerationError, JudgeError, PersistError, RasterizeError},
    types::{GeneratedImage, GenerationHints, JudgeHints},
    verdict::JudgeVerdict,
};

/// Produces one image per call from a prompt
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &str {
        "generator"
    }

    async fn generate(
        &self,
        prompt: &str,
        hints: &GenerationHints,
    ) -> Result<GeneratedImage, GenerationError>;
}

/// Durable storage for generated artwork
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn persist(&self, bytes: &[u8], content_type: ContentType) -> Result<ImageRef, PersistError>;
}

/// Semantic compliance evaluation of a persisted image.
///
/// Implementations return a verdict or an error; the pipeline treats every
/// error as a failed candidate.
#[async_trait]
pub trait ComplianceJudge: Send + Sync {
    async fn judge(
        &self,
        image: &ImageRef,
        brief: &CreativeBrief,
        hints: &JudgeHints,
    ) -> Result<JudgeVerdict, JudgeError>;
}

/// Resolves a generator URL to bytes
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<(Vec<u8>, ContentType), FetchError>;
}

/// Converts SVG markup to PNG bytes
pub trait SvgRasterizer: Send + Sync {
    fn rasterize(&self, svg: &[u8], size: u32) -> Result<Vec<u8>, RasterizeError>;
}
