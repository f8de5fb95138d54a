use logo_kit_common::{CreativeBrief, LogoType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    config::PipelineConfig,
    error::{PipelineError, Result},
};

/// Per-run knobs. Unset values fall back to [`PipelineConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    pub requested_count: usize,
    pub top_n: usize,
    #[serde(default)]
    pub logo_type: LogoType,
    #[serde(default)]
    pub max_parallel: Option<usize>,
    #[serde(default)]
    pub max_attempts: Option<usize>,
    /// Force the compliance gate on or off for this run
    #[serde(default)]
    pub use_compliance_gate: Option<bool>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new(3, 3)
    }
}

impl RunOptions {
    pub fn new(requested_count: usize, top_n: usize) -> Self {
        Self {
            requested_count,
            top_n,
            logo_type: LogoType::default(),
            max_parallel: None,
            max_attempts: None,
            use_compliance_gate: None,
        }
    }

    pub fn with_logo_type(mut self, logo_type: LogoType) -> Self {
        self.logo_type = logo_type;
        self
    }

    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = Some(max_parallel);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_compliance_gate(mut self, enabled: bool) -> Self {
        self.use_compliance_gate = Some(enabled);
        self
    }
}

/// Options resolved against config and the available collaborators
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RunPlan {
    pub base_prompt: String,
    pub requested_count: usize,
    pub top_n: usize,
    pub max_parallel: usize,
    pub max_attempts: usize,
    pub logo_type: LogoType,
    pub gate: bool,
}

fn invalid(reason: impl Into<String>) -> PipelineError {
    PipelineError::InvalidOptions {
        reason: reason.into(),
    }
}

impl RunPlan {
    pub fn resolve(
        brief: &CreativeBrief,
        options: &RunOptions,
        config: &PipelineConfig,
        judge_available: bool,
    ) -> Result<Self> {
        let base_prompt = brief.prompt.trim();
        if base_prompt.is_empty() {
            return Err(invalid("brief prompt is empty"));
        }
        if options.requested_count == 0 {
            return Err(invalid("requestedCount must be at least 1"));
        }
        if options.top_n == 0 {
            return Err(invalid("topN must be at least 1"));
        }
        if options.top_n > options.requested_count {
            return Err(invalid(format!(
                "topN ({}) exceeds requestedCount ({})",
                options.top_n, options.requested_count
            )));
        }

        let max_parallel = options.max_parallel.unwrap_or(config.max_parallel);
        if max_parallel == 0 {
            return Err(invalid("maxParallel must be at least 1"));
        }
        let max_attempts = options
            .max_attempts
            .or(config.max_attempts)
            .unwrap_or_else(|| PipelineConfig::default_max_attempts(options.requested_count));
        if max_attempts == 0 {
            return Err(invalid("maxAttempts must be at least 1"));
        }

        let gate = match options.use_compliance_gate {
            Some(true) if !judge_available => {
                return Err(invalid("compliance gate requested but no judge is configured"));
            }
            Some(enabled) => enabled,
            None => match config.use_compliance_judge {
                Some(true) if !judge_available => {
                    warn!("compliance judge enabled in config but none configured, ranking by rule score only");
                    false
                }
                Some(enabled) => enabled,
                None => judge_available,
            },
        };

        Ok(Self {
            base_prompt: base_prompt.to_string(),
            requested_count: options.requested_count,
            top_n: options.top_n,
            max_parallel,
            max_attempts,
            logo_type: options.logo_type,
            gate,
        })
    }
}
