use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Luminance and colour statistics over a thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColorStatistics {
    /// Mean Rec.709 luminance (0-255)
    pub mean_luminance: f64,
    /// Population standard deviation of luminance
    pub contrast: f64,
    /// Mean of the per-channel standard deviations
    pub colorfulness: f64,
}

/// Gradient statistics over the interior pixels of a grayscale thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStatistics {
    /// Mean gradient magnitude
    pub mean_edge: f64,
    /// Fraction of pixels above the magnitude threshold
    pub edge_density: f64,
    /// Mean gradient magnitude inside the central region
    pub center_edge: f64,
}

/// Diagnostic metrics reported alongside a pixel score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PixelMetrics {
    pub mean_luminance: f64,
    pub contrast: f64,
    pub colorfulness: f64,
    pub edge_strength: f64,
    pub edge_density: f64,
    pub center_edge_strength: f64,
    /// Readability proxy (0-1)
    pub readability: f64,
}

/// Normalised sub-scores (each 0-1) the final score is blended from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    pub base: f64,
    pub contrast: f64,
    pub color: f64,
    pub brightness_penalty: f64,
    pub clarity: f64,
    pub edge_density: f64,
    pub readability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PixelScore {
    /// Overall visual-quality score, 0-100
    pub score: u8,
    pub metrics: PixelMetrics,
    pub components: ScoreComponents,
}
