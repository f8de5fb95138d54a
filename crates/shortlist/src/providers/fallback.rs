use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::{
    error::GenerationError,
    traits::ImageGenerator,
    types::{GeneratedImage, GenerationHints},
};

/// Tries each provider in order and returns the first success
pub struct FallbackGenerator {
    providers: Vec<Arc<dyn ImageGenerator>>,
}

impl FallbackGenerator {
    pub fn new(providers: Vec<Arc<dyn ImageGenerator>>) -> Self {
        Self { providers }
    }

    pub fn push<G>(mut self, provider: G) -> Self
    where
        G: ImageGenerator + 'static,
    {
        self.providers.push(Arc::new(provider));
        self
    }
}

#[async_trait]
impl ImageGenerator for FallbackGenerator {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn generate(
        &self,
        prompt: &str,
        hints: &GenerationHints,
    ) -> Result<GeneratedImage, GenerationError> {
        let mut last_error = None;
        for provider in &self.providers {
            match provider.generate(prompt, hints).await {
                Ok(image) => return Ok(image),
                Err(err) => {
                    warn!(provider = provider.name(), error = %err, "provider failed, trying next");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| GenerationError::NoSources("no providers configured".to_string())))
    }
}
