use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{PipelineError, Result},
    retry::RetryPolicy,
};

pub const ENV_MAX_PARALLEL: &str = "PIPELINE_MAX_PARALLEL";
pub const ENV_MAX_ATTEMPTS: &str = "PIPELINE_MAX_ATTEMPTS";
pub const ENV_USE_COMPLIANCE_JUDGE: &str = "USE_COMPLIANCE_JUDGE";

const MIN_DEFAULT_ATTEMPTS: usize = 6;
const ATTEMPTS_PER_REQUESTED: usize = 6;

/// Weights used to blend rule and judge scores in gated runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScoreBlend {
    pub rule_weight: f64,
    pub judge_weight: f64,
}

impl Default for ScoreBlend {
    fn default() -> Self {
        Self {
            rule_weight: 0.6,
            judge_weight: 0.4,
        }
    }
}

impl ScoreBlend {
    /// Weighted mean of the two scores, rounded; stays within 0-100
    pub fn combine(&self, rule_score: u8, judge_score: u8) -> i32 {
        let total = self.rule_weight + self.judge_weight;
        if total <= 0.0 {
            return i32::from(rule_score);
        }
        let blended = (f64::from(rule_score) * self.rule_weight
            + f64::from(judge_score) * self.judge_weight)
            / total;
        blended.round().clamp(0.0, 100.0) as i32
    }

    fn validate(&self) -> Result<()> {
        let valid = |w: f64| w.is_finite() && w >= 0.0;
        if !valid(self.rule_weight) || !valid(self.judge_weight) {
            return Err(PipelineError::InvalidConfig {
                key: "blend".to_string(),
                value: format!("{}/{}", self.rule_weight, self.judge_weight),
                reason: "weights must be finite and non-negative".to_string(),
            });
        }
        if self.rule_weight + self.judge_weight <= 0.0 {
            return Err(PipelineError::InvalidConfig {
                key: "blend".to_string(),
                value: format!("{}/{}", self.rule_weight, self.judge_weight),
                reason: "at least one weight must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Process-wide pipeline defaults. Per-run [`crate::RunOptions`] override
/// the parallelism, attempt budget and gate switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_parallel: usize,
    /// `None` derives the budget from the requested count
    pub max_attempts: Option<usize>,
    /// `None` enables the gate whenever a judge is configured
    pub use_compliance_judge: Option<bool>,
    /// Commercial gate: candidates scoring below this are disqualified
    pub min_rule_score: Option<u8>,
    /// Longest thumbnail side used for pixel scoring
    pub thumbnail_size: u32,
    /// PNG side length used when rasterizing SVG output
    pub raster_size: u32,
    pub blend: ScoreBlend,
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_parallel: 2,
            max_attempts: None,
            use_compliance_judge: None,
            min_rule_score: None,
            thumbnail_size: 64,
            raster_size: 1024,
            blend: ScoreBlend::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env()
    }

    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary lookup, e.g. a map in tests
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(value) = read(ENV_MAX_PARALLEL) {
            self.max_parallel = parse_positive(ENV_MAX_PARALLEL, &value)?;
        }
        if let Some(value) = read(ENV_MAX_ATTEMPTS) {
            self.max_attempts = Some(parse_positive(ENV_MAX_ATTEMPTS, &value)?);
        }
        if let Some(value) = read(ENV_USE_COMPLIANCE_JUDGE) {
            self.use_compliance_judge = Some(parse_flag(ENV_USE_COMPLIANCE_JUDGE, &value)?);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_parallel == 0 {
            return Err(invalid("max_parallel", "0", "must be at least 1"));
        }
        if self.max_attempts == Some(0) {
            return Err(invalid("max_attempts", "0", "must be at least 1"));
        }
        if self.thumbnail_size == 0 {
            return Err(invalid("thumbnail_size", "0", "must be at least 1"));
        }
        if self.raster_size == 0 {
            return Err(invalid("raster_size", "0", "must be at least 1"));
        }
        if let Some(min) = self.min_rule_score.filter(|min| *min > 100) {
            return Err(invalid("min_rule_score", &min.to_string(), "must be within 0-100"));
        }
        self.blend.validate()
    }

    /// Attempt budget used when neither options nor config set one
    pub fn default_max_attempts(requested_count: usize) -> usize {
        MIN_DEFAULT_ATTEMPTS.max(requested_count.saturating_mul(ATTEMPTS_PER_REQUESTED))
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> PipelineError {
    PipelineError::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_positive(key: &str, value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(key, value, "expected a positive integer")),
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "expected true/false")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_parallel, 2);
        assert_eq!(config.max_attempts, None);
        assert_eq!(config.thumbnail_size, 64);
        assert!(config.validate().is_ok());
        assert_eq!(PipelineConfig::default_max_attempts(1), 6);
        assert_eq!(PipelineConfig::default_max_attempts(3), 18);
    }

    #[test]
    fn test_env_overlay() {
        let config = PipelineConfig::default()
            .apply_env_with(env(&[
                (ENV_MAX_PARALLEL, "4"),
                (ENV_MAX_ATTEMPTS, " 9 "),
                (ENV_USE_COMPLIANCE_JUDGE, "off"),
            ]))
            .unwrap();
        assert_eq!(config.max_parallel, 4);
        assert_eq!(config.max_attempts, Some(9));
        assert_eq!(config.use_compliance_judge, Some(false));
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let config = PipelineConfig::default()
            .apply_env_with(env(&[(ENV_MAX_PARALLEL, "  ")]))
            .unwrap();
        assert_eq!(config.max_parallel, 2);
    }

    #[test]
    fn test_bad_env_values_are_rejected() {
        for (key, value) in [
            (ENV_MAX_PARALLEL, "0"),
            (ENV_MAX_ATTEMPTS, "lots"),
            (ENV_USE_COMPLIANCE_JUDGE, "maybe"),
        ] {
            let err = PipelineConfig::default()
                .apply_env_with(env(&[(key, value)]))
                .unwrap_err();
            assert!(matches!(err, PipelineError::InvalidConfig { key: ref k, .. } if k == key));
        }
    }

    #[test]
    fn test_blend() {
        let blend = ScoreBlend::default();
        assert_eq!(blend.combine(70, 90), 78);
        assert_eq!(blend.combine(0, 0), 0);
        assert_eq!(blend.combine(100, 100), 100);
        let heavy = ScoreBlend {
            rule_weight: 3.0,
            judge_weight: 1.0,
        };
        assert_eq!(heavy.combine(80, 40), 70);
        let bad = PipelineConfig {
            blend: ScoreBlend {
                rule_weight: -1.0,
                judge_weight: 0.4,
            },
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_partial_document() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"max_parallel": 3, "retry": {"max_retries": 0}}"#).unwrap();
        assert_eq!(config.max_parallel, 3);
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.retry.base_delay_ms, 1200);
        assert_eq!(config.blend, ScoreBlend::default());
    }
}
