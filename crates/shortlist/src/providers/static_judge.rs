use std::{collections::BTreeMap, path::Path};

use async_trait::async_trait;
use logo_kit_common::{CreativeBrief, ImageRef};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{JudgeError, PipelineError},
    traits::ComplianceJudge,
    types::JudgeHints,
    verdict::{JudgeVerdict, VerdictDocument},
};

/// One scripted judge answer: a verdict or a failure message
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ScriptedVerdict {
    Failure { error: String },
    Verdict(VerdictDocument),
}

/// On-disk form of a [`StaticJudge`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VerdictScript {
    /// Answer for candidates without their own entry
    pub default: Option<ScriptedVerdict>,
    /// Answers keyed by candidate id
    pub candidates: BTreeMap<u32, ScriptedVerdict>,
}

#[derive(Debug, Clone)]
enum Answer {
    Verdict(JudgeVerdict),
    Failure(String),
}

impl TryFrom<ScriptedVerdict> for Answer {
    type Error = JudgeError;

    fn try_from(scripted: ScriptedVerdict) -> Result<Self, Self::Error> {
        match scripted {
            ScriptedVerdict::Failure { error } => Ok(Self::Failure(error)),
            ScriptedVerdict::Verdict(document) => Ok(Self::Verdict(JudgeVerdict::try_from(document)?)),
        }
    }
}

/// Judge that answers from a fixed script.
///
/// Candidates with no scripted answer and no default fail, which keeps the
/// gate closed for anything the script does not cover.
#[derive(Debug, Clone, Default)]
pub struct StaticJudge {
    by_candidate: BTreeMap<u32, Answer>,
    default: Option<Answer>,
}

impl StaticJudge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verdict(mut self, candidate_id: u32, verdict: JudgeVerdict) -> Self {
        self.by_candidate.insert(candidate_id, Answer::Verdict(verdict));
        self
    }

    pub fn with_failure(mut self, candidate_id: u32, message: impl Into<String>) -> Self {
        self.by_candidate.insert(candidate_id, Answer::Failure(message.into()));
        self
    }

    pub fn with_default(mut self, verdict: JudgeVerdict) -> Self {
        self.default = Some(Answer::Verdict(verdict));
        self
    }

    pub fn from_script(script: VerdictScript) -> Result<Self, JudgeError> {
        let default = script.default.map(Answer::try_from).transpose()?;
        let by_candidate = script
            .candidates
            .into_iter()
            .map(|(id, scripted)| Ok((id, Answer::try_from(scripted)?)))
            .collect::<Result<_, JudgeError>>()?;
        Ok(Self {
            by_candidate,
            default,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        let script: VerdictScript = serde_json::from_str(json)?;
        Self::from_script(script).map_err(|e| PipelineError::InvalidConfig {
            key: "judge.verdicts".to_string(),
            value: "<script>".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[async_trait]
impl ComplianceJudge for StaticJudge {
    async fn judge(
        &self,
        _image: &ImageRef,
        _brief: &CreativeBrief,
        hints: &JudgeHints,
    ) -> Result<JudgeVerdict, JudgeError> {
        match self.by_candidate.get(&hints.candidate_id).or(self.default.as_ref()) {
            Some(Answer::Verdict(verdict)) => Ok(verdict.clone()),
            Some(Answer::Failure(message)) => Err(JudgeError::Failed(message.clone())),
            None => Err(JudgeError::NoVerdict(hints.candidate_id)),
        }
    }
}
