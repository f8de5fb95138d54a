//! Strict parsing of compliance-judge output.
//!
//! A verdict either matches the documented shape exactly or is rejected;
//! rejection is reported as [`JudgeError::MalformedVerdict`] so the pipeline
//! fails the candidate closed.

use std::collections::BTreeMap;

use schemars::{JsonSchema, schema::RootSchema, schema_for};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{error::JudgeError, types::Violations};

const MAX_SCORE: f64 = 100.0;
const MAX_CRITERION: f64 = 10.0;

/// Rubric axes a judge may score, each on a 0-10 scale
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RubricCriterion {
    BrandConsistency,
    Legibility,
    TrademarkViability,
    Originality,
    Simplicity,
    Scalability,
    Versatility,
    TextRendering,
    PromptAlignment,
    ImageCoherence,
    CompositionBalance,
}

/// Violation flags as a judge reports them. `hasHuman` is accepted as an
/// alias signal and folded into `hasPeople`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ViolationsDocument {
    pub has_people: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_human: Option<bool>,
    pub has_mascot: bool,
    pub has_scene: bool,
    pub too_illustrative: bool,
}

/// The JSON document a judge must produce
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct VerdictDocument {
    /// Overall score, 0-100
    pub score: f64,
    #[serde(default)]
    pub breakdown: BTreeMap<RubricCriterion, f64>,
    pub violations: ViolationsDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A validated judge verdict
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeVerdict {
    pub score: u8,
    pub breakdown: BTreeMap<RubricCriterion, f64>,
    pub violations: Violations,
    pub notes: Option<String>,
}

impl JudgeVerdict {
    /// A clean verdict with the given score and no breakdown
    pub fn new(score: u8) -> Self {
        Self {
            score: score.min(MAX_SCORE as u8),
            breakdown: BTreeMap::new(),
            violations: Violations::default(),
            notes: None,
        }
    }

    pub fn with_violations(mut self, violations: Violations) -> Self {
        self.violations = violations;
        self
    }

    pub fn with_criterion(mut self, criterion: RubricCriterion, value: f64) -> Self {
        self.breakdown.insert(criterion, value.clamp(0.0, MAX_CRITERION));
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_clean(&self) -> bool {
        !self.violations.any()
    }

    /// Parse a bare JSON verdict document
    pub fn from_json(json: &str) -> Result<Self, JudgeError> {
        let document: VerdictDocument = serde_json::from_str(json)
            .map_err(|e| JudgeError::MalformedVerdict(e.to_string()))?;
        Self::try_from(document)
    }

    /// Parse free-form model output, taking the outermost `{...}` span
    pub fn from_model_output(text: &str) -> Result<Self, JudgeError> {
        let start = text.find('{');
        let end = text.rfind('}');
        match (start, end) {
            (Some(start), Some(end)) if start < end => Self::from_json(&text[start..=end]),
            _ => Err(JudgeError::MalformedVerdict(
                "no JSON object in judge output".to_string(),
            )),
        }
    }

    /// JSON schema of the document a judge must return
    pub fn schema() -> RootSchema {
        schema_for!(VerdictDocument)
    }
}

impl TryFrom<VerdictDocument> for JudgeVerdict {
    type Error = JudgeError;

    fn try_from(document: VerdictDocument) -> Result<Self, Self::Error> {
        if !document.score.is_finite() || !(0.0..=MAX_SCORE).contains(&document.score) {
            return Err(JudgeError::MalformedVerdict(format!(
                "score {} outside 0-100",
                document.score
            )));
        }
        for (criterion, value) in &document.breakdown {
            if !value.is_finite() || !(0.0..=MAX_CRITERION).contains(value) {
                return Err(JudgeError::MalformedVerdict(format!(
                    "{criterion} value {value} outside 0-10"
                )));
            }
        }

        let flags = document.violations;
        Ok(Self {
            score: document.score.round() as u8,
            breakdown: document.breakdown,
            violations: Violations {
                has_people: flags.has_people || flags.has_human.unwrap_or(false),
                has_mascot: flags.has_mascot,
                has_scene: flags.has_scene,
                too_illustrative: flags.too_illustrative,
            },
            notes: document.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

impl From<&JudgeVerdict> for VerdictDocument {
    fn from(verdict: &JudgeVerdict) -> Self {
        Self {
            score: f64::from(verdict.score),
            breakdown: verdict.breakdown.clone(),
            violations: ViolationsDocument {
                has_people: verdict.violations.has_people,
                has_human: None,
                has_mascot: verdict.violations.has_mascot,
                has_scene: verdict.violations.has_scene,
                too_illustrative: verdict.violations.too_illustrative,
            },
            notes: verdict.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN: &str = r#"{
        "score": 82.4,
        "breakdown": {"legibility": 8, "simplicity": 9.5},
        "violations": {"hasPeople": false, "hasMascot": false, "hasScene": false, "tooIllustrative": false},
        "notes": "strong silhouette"
    }"#;

    #[test]
    fn test_parse_clean_verdict() {
        let verdict = JudgeVerdict::from_json(CLEAN).unwrap();
        assert_eq!(verdict.score, 82);
        assert!(verdict.is_clean());
        assert_eq!(verdict.breakdown[&RubricCriterion::Simplicity], 9.5);
        assert_eq!(verdict.notes.as_deref(), Some("strong silhouette"));
    }

    #[test]
    fn test_model_output_with_prose() {
        let text = format!("Here is my assessment:\n```json\n{CLEAN}\n```\nThanks.");
        let verdict = JudgeVerdict::from_model_output(&text).unwrap();
        assert_eq!(verdict.score, 82);
        assert!(matches!(
            JudgeVerdict::from_model_output("I cannot evaluate this image."),
            Err(JudgeError::MalformedVerdict(_))
        ));
    }

    #[test]
    fn test_has_human_folds_into_has_people() {
        let json = r#"{"score": 70, "violations": {"hasPeople": false, "hasHuman": true,
            "hasMascot": false, "hasScene": false, "tooIllustrative": false}}"#;
        let verdict = JudgeVerdict::from_json(json).unwrap();
        assert!(verdict.violations.has_people);
        assert!(!verdict.is_clean());
    }

    #[test]
    fn test_rejects_malformed_documents() {
        let cases = [
            // missing violation flag
            r#"{"score": 70, "violations": {"hasPeople": false, "hasMascot": false, "hasScene": false}}"#,
            // unknown top-level key
            r#"{"score": 70, "extra": 1, "violations": {"hasPeople": false, "hasMascot": false, "hasScene": false, "tooIllustrative": false}}"#,
            // unknown rubric criterion
            r#"{"score": 70, "breakdown": {"vibes": 3}, "violations": {"hasPeople": false, "hasMascot": false, "hasScene": false, "tooIllustrative": false}}"#,
            // score out of range
            r#"{"score": 140, "violations": {"hasPeople": false, "hasMascot": false, "hasScene": false, "tooIllustrative": false}}"#,
            // criterion out of range
            r#"{"score": 70, "breakdown": {"legibility": 11}, "violations": {"hasPeople": false, "hasMascot": false, "hasScene": false, "tooIllustrative": false}}"#,
            // flag with wrong type
            r#"{"score": 70, "violations": {"hasPeople": "no", "hasMascot": false, "hasScene": false, "tooIllustrative": false}}"#,
        ];
        for case in cases {
            assert!(
                matches!(JudgeVerdict::from_json(case), Err(JudgeError::MalformedVerdict(_))),
                "accepted {case}"
            );
        }
    }

    #[test]
    fn test_document_round_trip_keeps_flags() {
        let verdict = JudgeVerdict::new(55)
            .with_criterion(RubricCriterion::Originality, 6.0)
            .with_violations(Violations {
                has_scene: true,
                ..Default::default()
            });
        let json = serde_json::to_string(&VerdictDocument::from(&verdict)).unwrap();
        assert_eq!(JudgeVerdict::from_json(&json).unwrap(), verdict);
    }

    #[test]
    fn test_schema_lists_required_flags() {
        let schema = serde_json::to_value(JudgeVerdict::schema()).unwrap();
        let required = &schema["definitions"]["ViolationsDocument"]["required"];
        assert!(required.as_array().unwrap().iter().any(|v| v == "tooIllustrative"));
    }
}
