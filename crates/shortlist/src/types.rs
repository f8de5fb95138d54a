use std::collections::BTreeMap;

use logo_kit_common::{ImagePayload, ImageRef, LogoType};
use pixel_score::PixelScore;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::verdict::RubricCriterion;

/// Final score assigned to every disqualified candidate. It sorts below any
/// achievable blended score.
pub const DISQUALIFIED_SCORE: i32 = -9999;

/// Semantic compliance flags reported by the judge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Violations {
    pub has_people: bool,
    pub has_mascot: bool,
    pub has_scene: bool,
    pub too_illustrative: bool,
}

impl Violations {
    pub fn any(&self) -> bool {
        self.has_people || self.has_mascot || self.has_scene || self.too_illustrative
    }

    /// Names of the flags that are set, in declaration order
    pub fn flagged(&self) -> Vec<&'static str> {
        [
            (self.has_people, "hasPeople"),
            (self.has_mascot, "hasMascot"),
            (self.has_scene, "hasScene"),
            (self.too_illustrative, "tooIllustrative"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

/// Why a candidate was excluded from `passing`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, IntoStaticStr)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DisqualifyReason {
    /// Rule score under the configured commercial minimum
    #[serde(rename_all = "camelCase")]
    CommercialGate { rule_score: u8, min_rule_score: u8 },
    /// The judge flagged at least one violation
    SemanticViolation { violations: Violations },
    /// The judge errored, timed out or returned an unusable verdict
    JudgeFailed { message: String },
    /// Generation produced nothing usable
    NoImage { message: String },
}

impl DisqualifyReason {
    /// Stable snake_case tag, e.g. `judge_failed`
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

/// One generation attempt and everything learned about it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// 1-based issue order within the run
    pub id: u32,
    pub prompt_used: String,
    pub style_variant: String,
    pub image_ref: Option<ImageRef>,
    /// Original vector artwork when the generator produced SVG
    pub svg_ref: Option<ImageRef>,
    pub pixel_score: Option<PixelScore>,
    pub judge_score: Option<u8>,
    pub judge_breakdown: Option<BTreeMap<RubricCriterion, f64>>,
    pub judge_notes: Option<String>,
    pub violations: Option<Violations>,
    pub disqualified: bool,
    pub disqualify_reason: Option<DisqualifyReason>,
    pub final_score: i32,
    pub model: Option<String>,
    pub mode: Option<String>,
}

impl Candidate {
    pub fn new(id: u32, prompt_used: impl Into<String>, style_variant: impl Into<String>) -> Self {
        Self {
            id,
            prompt_used: prompt_used.into(),
            style_variant: style_variant.into(),
            image_ref: None,
            svg_ref: None,
            pixel_score: None,
            judge_score: None,
            judge_breakdown: None,
            judge_notes: None,
            violations: None,
            disqualified: false,
            disqualify_reason: None,
            final_score: 0,
            model: None,
            mode: None,
        }
    }

    /// Candidate for an attempt that never produced an image
    pub fn no_image(
        id: u32,
        prompt_used: impl Into<String>,
        style_variant: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut candidate = Self::new(id, prompt_used, style_variant);
        candidate.disqualify(DisqualifyReason::NoImage {
            message: message.into(),
        });
        candidate
    }

    /// Pixel score, or 0 when the image could not be scored
    pub fn rule_score(&self) -> u8 {
        self.pixel_score.as_ref().map_or(0, |score| score.score)
    }

    /// Ranking key in rule-only mode; unscored candidates sort last
    pub fn rule_rank_key(&self) -> i32 {
        self.pixel_score.as_ref().map_or(-1, |score| i32::from(score.score))
    }

    pub fn is_passing(&self) -> bool {
        !self.disqualified
    }

    pub fn disqualify(&mut self, reason: DisqualifyReason) {
        self.disqualified = true;
        self.disqualify_reason = Some(reason);
        self.final_score = DISQUALIFIED_SCORE;
    }
}

/// Hints handed to an [`crate::ImageGenerator`] alongside the prompt
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationHints {
    pub style_variant: String,
    pub logo_type: LogoType,
    /// Reference image for image-to-image providers
    pub input_image: Option<String>,
    /// 0-based issue index within the run
    pub attempt: u32,
}

/// What a generator hands back for one attempt
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub payload: ImagePayload,
    pub model: String,
    pub mode: String,
}

impl GeneratedImage {
    pub fn new(payload: ImagePayload, model: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            payload,
            model: model.into(),
            mode: mode.into(),
        }
    }
}

/// Context handed to a [`crate::ComplianceJudge`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeHints {
    pub candidate_id: u32,
    pub storage_key: Option<String>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RankingMethod {
    RuleOnly,
    RulePlusLlmHardGate,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StopReason {
    EnoughPassing,
    MaxAttempts,
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub requested_count: usize,
    pub top_n: usize,
    pub max_attempts: usize,
    pub max_parallel: usize,
    pub attempted: usize,
    pub batches: usize,
    /// Every candidate in issue order
    pub candidates: Vec<Candidate>,
    /// Non-disqualified candidates in issue order
    pub passing: Vec<Candidate>,
    /// Passing candidates best-first, followed by the disqualified ones
    pub ranked: Vec<Candidate>,
    pub top: Vec<Candidate>,
    pub ranking_method: RankingMethod,
    pub stopped_because: StopReason,
}

impl PipelineRun {
    pub fn summary(&self) -> RunSummary {
        let mut disqualified_by = BTreeMap::new();
        for reason in self.candidates.iter().filter_map(|c| c.disqualify_reason.as_ref()) {
            *disqualified_by.entry(reason.kind().to_string()).or_insert(0) += 1;
        }
        RunSummary {
            attempted: self.attempted,
            batches: self.batches,
            passing: self.passing.len(),
            disqualified: self.candidates.len() - self.passing.len(),
            disqualified_by,
            top_ids: self.top.iter().map(|c| c.id).collect(),
            best_final_score: self.top.first().map(|c| c.final_score),
            ranking_method: self.ranking_method,
            stopped_because: self.stopped_because,
        }
    }
}

/// Compact run report for logs and CLI output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub attempted: usize,
    pub batches: usize,
    pub passing: usize,
    pub disqualified: usize,
    pub disqualified_by: BTreeMap<String, usize>,
    pub top_ids: Vec<u32>,
    pub best_final_score: Option<i32>,
    pub ranking_method: RankingMethod,
    pub stopped_because: StopReason,
}
