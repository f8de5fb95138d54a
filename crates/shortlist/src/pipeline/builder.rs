use std::sync::Arc;

use pixel_score::PixelScorer;
use tracing::debug;

use crate::{
    config::PipelineConfig,
    error::{PipelineError, Result},
    pipeline::{CandidatePipeline, attempt::Collaborators},
    retry::Retrying,
    traits::{ArtifactStore, ComplianceJudge, ImageFetcher, ImageGenerator, SvgRasterizer},
};

/// Builder for wiring a [`CandidatePipeline`] with a fluent API
pub struct CandidatePipelineBuilder {
    config: PipelineConfig,
    generator: Option<Arc<dyn ImageGenerator>>,
    store: Option<Arc<dyn ArtifactStore>>,
    judge: Option<Arc<dyn ComplianceJudge>>,
    fetcher: Option<Arc<dyn ImageFetcher>>,
    rasterizer: Option<Arc<dyn SvgRasterizer>>,
    scorer: Option<PixelScorer>,
    retries: bool,
}

impl CandidatePipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            generator: None,
            store: None,
            judge: None,
            fetcher: None,
            rasterizer: None,
            scorer: None,
            retries: true,
        }
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Image provider (required)
    pub fn generator<G>(mut self, generator: G) -> Self
    where
        G: ImageGenerator + 'static,
    {
        self.generator = Some(Arc::new(generator));
        self
    }

    pub fn shared_generator(mut self, generator: Arc<dyn ImageGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Artifact store (required)
    pub fn store<S>(mut self, store: S) -> Self
    where
        S: ArtifactStore + 'static,
    {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn shared_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Compliance judge; without one every run is rule-only
    pub fn judge<J>(mut self, judge: J) -> Self
    where
        J: ComplianceJudge + 'static,
    {
        self.judge = Some(Arc::new(judge));
        self
    }

    pub fn shared_judge(mut self, judge: Arc<dyn ComplianceJudge>) -> Self {
        self.judge = Some(judge);
        self
    }

    /// Downloader for generators that answer with remote URLs
    pub fn fetcher<F>(mut self, fetcher: F) -> Self
    where
        F: ImageFetcher + 'static,
    {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    pub fn rasterizer<R>(mut self, rasterizer: R) -> Self
    where
        R: SvgRasterizer + 'static,
    {
        self.rasterizer = Some(Arc::new(rasterizer));
        self
    }

    /// Replace the pixel scorer built from `config.thumbnail_size`
    pub fn scorer(mut self, scorer: PixelScorer) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Call collaborators directly instead of through the retry policy
    pub fn without_retries(mut self) -> Self {
        self.retries = false;
        self
    }

    pub fn build(self) -> Result<CandidatePipeline> {
        self.config.validate()?;
        let generator = self
            .generator
            .ok_or(PipelineError::MissingCollaborator("generator"))?;
        let store = self
            .store
            .ok_or(PipelineError::MissingCollaborator("artifact store"))?;

        let policy = self.config.retry.clone();
        let wrap = self.retries && !policy.is_noop();
        debug!(retries = wrap, max_retries = policy.max_retries, "building pipeline");

        let collaborators = if wrap {
            Collaborators {
                generator: Arc::new(Retrying::new(generator, policy.clone())),
                store: Arc::new(Retrying::new(store, policy.clone())),
                judge: self
                    .judge
                    .map(|j| Arc::new(Retrying::new(j, policy.clone())) as Arc<dyn ComplianceJudge>),
                fetcher: self
                    .fetcher
                    .map(|f| Arc::new(Retrying::new(f, policy.clone())) as Arc<dyn ImageFetcher>),
                rasterizer: self.rasterizer,
                scorer: Arc::new(self.scorer.unwrap_or_else(|| scorer_for(&self.config))),
            }
        } else {
            Collaborators {
                generator,
                store,
                judge: self.judge,
                fetcher: self.fetcher,
                rasterizer: self.rasterizer,
                scorer: Arc::new(self.scorer.unwrap_or_else(|| scorer_for(&self.config))),
            }
        };

        Ok(CandidatePipeline {
            collaborators: Arc::new(collaborators),
            config: self.config,
        })
    }
}

impl Default for CandidatePipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn scorer_for(config: &PipelineConfig) -> PixelScorer {
    PixelScorer::builder()
        .thumbnail_size(config.thumbnail_size)
        .build()
}
