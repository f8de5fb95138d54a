use image::imageops::FilterType;
use crate::{
    algorithms::{FitInsideSampler, SobelEdgeAnalyzer},
    scorer::PixelScorer,
    traits::{EdgeAnalyzer, ThumbnailSampler},
};

/// Builder for configuring a [`PixelScorer`] with a fluent API
pub struct PixelScorerBuilder {
    thumbnail_size: u32,
    filter: FilterType,
    edge_threshold: f64,
    center_fraction: f64,
    sampler: Option<Box<dyn ThumbnailSampler>>,
    analyzer: Option<Box<dyn EdgeAnalyzer>>,
}

impl PixelScorerBuilder {
    /// Create a new builder with the default 64px thumbnail and Sobel settings
    pub fn new() -> Self {
        let sobel = SobelEdgeAnalyzer::default();
        Self {
            thumbnail_size: 64,
            filter: FilterType::Lanczos3,
            edge_threshold: sobel.magnitude_threshold,
            center_fraction: sobel.center_fraction,
            sampler: None,
            analyzer: None,
        }
    }

    /// Side length of the square the thumbnail must fit inside
    pub fn thumbnail_size(mut self, size: u32) -> Self {
        self.thumbnail_size = size.max(1);
        self
    }

    /// Resampling filter used when building the thumbnail
    pub fn filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Gradient magnitude above which a pixel counts as an edge
    pub fn edge_threshold(mut self, threshold: f64) -> Self {
        self.edge_threshold = threshold;
        self
    }

    /// Side fraction of the central region used for centre-edge strength
    pub fn center_fraction(mut self, fraction: f64) -> Self {
        self.center_fraction = fraction;
        self
    }

    /// Replace the thumbnail sampler
    pub fn set_sampler<S>(mut self, sampler: S) -> Self
    where
        S: ThumbnailSampler + 'static,
    {
        self.sampler = Some(Box::new(sampler));
        self
    }

    /// Replace the edge analyzer
    pub fn set_edge_analyzer<A>(mut self, analyzer: A) -> Self
    where
        A: EdgeAnalyzer + 'static,
    {
        self.analyzer = Some(Box::new(analyzer));
        self
    }

    pub fn build(self) -> PixelScorer {
        let sampler = self.sampler.unwrap_or_else(|| {
            Box::new(FitInsideSampler {
                max_side: self.thumbnail_size,
                filter: self.filter,
            })
        });
        let analyzer = self.analyzer.unwrap_or_else(|| {
            Box::new(SobelEdgeAnalyzer::new(self.edge_threshold, self.center_fraction))
        });
        PixelScorer::new(sampler, analyzer)
    }
}

impl Default for PixelScorerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
