pub mod builder;

use image::{DynamicImage, RgbImage, imageops};
use tracing::debug;
use crate::{
    algorithms::{brightness_penalty, clamp01},
    error::{Result, ScoreError},
    traits::{EdgeAnalyzer, ThumbnailSampler},
    types::{ColorStatistics, EdgeStatistics, PixelMetrics, PixelScore, ScoreComponents},
};

const CONTRAST_SCALE: f64 = 128.0;
const COLORFULNESS_SCALE: f64 = 96.0;
const CLARITY_SCALE: f64 = 120.0;
const CENTER_EDGE_SCALE: f64 = 140.0;
const TARGET_EDGE_DENSITY: f64 = 0.12;

/// Deterministic visual-quality heuristic over raw pixels.
///
/// The score rewards strong, legible silhouettes with moderate detail
/// density and penalises washed-out or near-black images.
pub struct PixelScorer {
    sampler: Box<dyn ThumbnailSampler>,
    analyzer: Box<dyn EdgeAnalyzer>,
}

impl PixelScorer {
    /// Create a new scorer builder
    pub fn builder() -> builder::PixelScorerBuilder {
        builder::PixelScorerBuilder::new()
    }

    pub fn new(sampler: Box<dyn ThumbnailSampler>, analyzer: Box<dyn EdgeAnalyzer>) -> Self {
        Self { sampler, analyzer }
    }

    /// Decode encoded image bytes (PNG, JPEG, WebP) and score them
    pub fn score_bytes(&self, bytes: &[u8]) -> Result<PixelScore> {
        let image = image::load_from_memory(bytes)?;
        self.score_image(&image)
    }

    /// Thumbnail a decoded image, then score it
    pub fn score_image(&self, image: &DynamicImage) -> Result<PixelScore> {
        let thumbnail = self.sampler.sample(image)?;
        self.score_thumbnail(&thumbnail)
    }

    /// Score raw interleaved RGB/RGBA pixels that are already thumbnail-sized
    pub fn score_pixels(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        channels: usize,
    ) -> Result<PixelScore> {
        if !(3..=4).contains(&channels) {
            return Err(ScoreError::UnsupportedChannels(channels));
        }
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(ScoreError::BufferMismatch {
                len: data.len(),
                width,
                height,
                channels,
            });
        }
        let rgb: Vec<u8> = data
            .chunks_exact(channels)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        let thumbnail = RgbImage::from_raw(width, height, rgb).ok_or(ScoreError::EmptyImage)?;
        self.score_thumbnail(&thumbnail)
    }

    /// Score an RGB thumbnail without resampling
    pub fn score_thumbnail(&self, thumbnail: &RgbImage) -> Result<PixelScore> {
        let color = ColorStatistics::from_pixels(thumbnail.as_raw(), 3)?;
        let gray = imageops::grayscale(thumbnail);
        let edges = self.analyzer.analyze(&gray)?;
        let score = compose_score(&color, &edges);
        debug!(
            score = score.score,
            contrast = color.contrast,
            edge_density = edges.edge_density,
            "scored thumbnail {}x{}",
            thumbnail.width(),
            thumbnail.height()
        );
        Ok(score)
    }
}

impl Default for PixelScorer {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Blend colour and edge statistics into the final 0-100 score
pub fn compose_score(color: &ColorStatistics, edges: &EdgeStatistics) -> PixelScore {
    let contrast = clamp01(color.contrast / CONTRAST_SCALE);
    let colorfulness = clamp01(color.colorfulness / COLORFULNESS_SCALE);
    let penalty = brightness_penalty(color.mean_luminance);
    let base = clamp01(contrast * 0.6 + colorfulness * 0.4 - penalty * 0.3);

    let clarity = clamp01(edges.mean_edge / CLARITY_SCALE);
    let edge_density =
        clamp01(1.0 - (edges.edge_density - TARGET_EDGE_DENSITY).abs() / TARGET_EDGE_DENSITY);
    let center = clamp01(edges.center_edge / CENTER_EDGE_SCALE);
    let readability = clamp01(clarity * 0.35 + edge_density * 0.35 + center * 0.20 + contrast * 0.10);

    let blended = clamp01(base * 0.55 + clarity * 0.20 + edge_density * 0.15 + readability * 0.10);

    PixelScore {
        score: (blended * 100.0).round() as u8,
        metrics: PixelMetrics {
            mean_luminance: color.mean_luminance,
            contrast: color.contrast,
            colorfulness: color.colorfulness,
            edge_strength: edges.mean_edge,
            edge_density: edges.edge_density,
            center_edge_strength: edges.center_edge,
            readability,
        },
        components: ScoreComponents {
            base,
            contrast,
            color: colorfulness,
            brightness_penalty: penalty,
            clarity,
            edge_density,
            readability,
        },
    }
}
