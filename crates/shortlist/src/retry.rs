use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use logo_kit_common::{ContentType, CreativeBrief, ImageRef};
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::{FetchError, GenerationError, JudgeError, PersistError, Retryable},
    traits::{ArtifactStore, ComplianceJudge, ImageFetcher, ImageGenerator},
    types::{GeneratedImage, GenerationHints, JudgeHints},
    verdict::JudgeVerdict,
};

/// Bounded exponential backoff for collaborator calls.
///
/// Only errors classified as retryable are retried. Each attempt may carry
/// its own timeout; a timed-out attempt counts as retryable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Upper bound of the random delay added to each backoff
    pub jitter_ms: u64,
    pub attempt_timeout_ms: Option<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 1200,
            max_delay_ms: 30_000,
            jitter_ms: 250,
            attempt_timeout_ms: Some(120_000),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no timeout
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
            jitter_ms: 0,
            attempt_timeout_ms: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.max_retries == 0 && self.attempt_timeout_ms.is_none()
    }

    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout_ms.map(Duration::from_millis)
    }

    /// Backoff before retry number `retry` (0-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponential = self
            .base_delay_ms
            .saturating_mul(1u64 << retry.min(20))
            .min(self.max_delay_ms);
        let jitter = if self.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        Duration::from_millis(exponential.saturating_add(jitter))
    }

    /// Run `op` until it succeeds, fails permanently or retries run out
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, E>
    where
        E: Retryable + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retry = 0;
        loop {
            let outcome = match self.attempt_timeout() {
                Some(limit) => match tokio::time::timeout(limit, op()).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(E::timed_out(limit)),
                },
                None => op().await,
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retry < self.max_retries => {
                    let delay = self.delay_for(retry);
                    warn!(
                        operation,
                        retry = retry + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Wraps a collaborator so every call goes through a [`RetryPolicy`]
pub struct Retrying<T: ?Sized> {
    inner: Arc<T>,
    policy: RetryPolicy,
}

impl<T: ?Sized> Retrying<T> {
    pub fn new(inner: Arc<T>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<T> ImageGenerator for Retrying<T>
where
    T: ImageGenerator + ?Sized,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(
        &self,
        prompt: &str,
        hints: &GenerationHints,
    ) -> Result<GeneratedImage, GenerationError> {
        self.policy
            .run("generate", || self.inner.generate(prompt, hints))
            .await
    }
}

#[async_trait]
impl<T> ArtifactStore for Retrying<T>
where
    T: ArtifactStore + ?Sized,
{
    async fn persist(&self, bytes: &[u8], content_type: ContentType) -> Result<ImageRef, PersistError> {
        self.policy
            .run("persist", || self.inner.persist(bytes, content_type))
            .await
    }
}

#[async_trait]
impl<T> ComplianceJudge for Retrying<T>
where
    T: ComplianceJudge + ?Sized,
{
    async fn judge(
        &self,
        image: &ImageRef,
        brief: &CreativeBrief,
        hints: &JudgeHints,
    ) -> Result<JudgeVerdict, JudgeError> {
        self.policy
            .run("judge", || self.inner.judge(image, brief, hints))
            .await
    }
}

#[async_trait]
impl<T> ImageFetcher for Retrying<T>
where
    T: ImageFetcher + ?Sized,
{
    async fn fetch(&self, url: &str) -> Result<(Vec<u8>, ContentType), FetchError> {
        self.policy.run("fetch", || self.inner.fetch(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay_ms: 1,
            max_delay_ms: 2,
            jitter_ms: 0,
            attempt_timeout_ms: None,
        }
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy {
            jitter_ms: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(1200));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2400));
        assert_eq!(policy.delay_for(10), Duration::from_millis(30_000));
        assert_eq!(policy.delay_for(63), Duration::from_millis(30_000));
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let policy = RetryPolicy {
            base_delay_ms: 100,
            jitter_ms: 50,
            ..RetryPolicy::default()
        };
        for _ in 0..20 {
            let delay = policy.delay_for(0).as_millis();
            assert!((100..=150).contains(&delay));
        }
    }

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, GenerationError> = fast(2)
            .run("generate", || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(GenerationError::RateLimited { provider: "p".into() })
                } else {
                    Ok(n)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), GenerationError> = fast(2)
            .run("generate", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GenerationError::Transient("flaky".into()))
            })
            .await;
        assert!(matches!(result, Err(GenerationError::Transient(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), JudgeError> = fast(5)
            .run("judge", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(JudgeError::MalformedVerdict("prose".into()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempt_timeout() {
        let policy = RetryPolicy {
            attempt_timeout_ms: Some(10),
            ..fast(0)
        };
        let result: Result<(), PersistError> = policy
            .run("persist", || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(PersistError::Timeout(_))));
    }
}
