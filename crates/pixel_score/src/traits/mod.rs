use image::{DynamicImage, GrayImage, RgbImage};
use crate::{error::Result, types::EdgeStatistics};

/// Trait for reducing a decoded image to the thumbnail that gets scored
pub trait ThumbnailSampler: Send + Sync {
    /// Produce an RGB thumbnail (alpha is discarded)
    fn sample(&self, image: &DynamicImage) -> Result<RgbImage>;
}

/// Trait for gradient/edge analysis of a grayscale thumbnail
pub trait EdgeAnalyzer: Send + Sync {
    fn analyze(&self, image: &GrayImage) -> Result<EdgeStatistics>;
}
