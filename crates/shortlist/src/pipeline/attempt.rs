use std::sync::Arc;

use logo_kit_common::{ContentType, CreativeBrief, ImagePayload, ImageRef, utils};
use pixel_score::{PixelScore, PixelScorer};
use tracing::{debug, warn};

use crate::{
    config::ScoreBlend,
    traits::{ArtifactStore, ComplianceJudge, ImageFetcher, ImageGenerator, SvgRasterizer},
    types::{Candidate, DisqualifyReason, GenerationHints, JudgeHints},
};

use super::RunPhase;

/// Everything an attempt needs to talk to the outside world
pub(crate) struct Collaborators {
    pub generator: Arc<dyn ImageGenerator>,
    pub store: Arc<dyn ArtifactStore>,
    pub judge: Option<Arc<dyn ComplianceJudge>>,
    pub fetcher: Option<Arc<dyn ImageFetcher>>,
    pub rasterizer: Option<Arc<dyn SvgRasterizer>>,
    pub scorer: Arc<PixelScorer>,
}

/// Run-wide settings shared by every attempt
pub(crate) struct AttemptContext {
    pub brief: CreativeBrief,
    pub gate: bool,
    pub min_rule_score: Option<u8>,
    pub blend: ScoreBlend,
    pub raster_size: u32,
}

/// One issued attempt
pub(crate) struct AttemptTicket {
    pub id: u32,
    pub prompt: String,
    pub hints: GenerationHints,
}

impl AttemptTicket {
    pub fn placeholder(&self, message: &str) -> Candidate {
        Candidate::no_image(self.id, &self.prompt, &self.hints.style_variant, message)
    }
}

/// Image bytes resolved from a generator payload
struct Materialized {
    bytes: Option<(Vec<u8>, ContentType)>,
    source_url: Option<String>,
}

/// Generate, persist, score and (optionally) judge one candidate.
///
/// Never fails: every collaborator error ends up on the returned candidate.
pub(crate) async fn run_attempt(
    collaborators: Arc<Collaborators>,
    context: Arc<AttemptContext>,
    ticket: AttemptTicket,
) -> Candidate {
    let mut candidate = Candidate::new(ticket.id, &ticket.prompt, &ticket.hints.style_variant);

    debug!(candidate_id = ticket.id, phase = %RunPhase::Generating, "generating candidate");
    let generated = match collaborators.generator.generate(&ticket.prompt, &ticket.hints).await {
        Ok(generated) => generated,
        Err(err) => {
            warn!(candidate_id = ticket.id, error = %err, "generation failed");
            return ticket.placeholder(&err.to_string());
        }
    };
    candidate.model = Some(generated.model);
    candidate.mode = Some(generated.mode);

    let materialized = match materialize(&collaborators, generated.payload).await {
        Ok(materialized) => materialized,
        Err(message) => {
            warn!(candidate_id = ticket.id, %message, "generator output unusable");
            candidate.disqualify(DisqualifyReason::NoImage { message });
            return candidate;
        }
    };

    debug!(candidate_id = ticket.id, phase = %RunPhase::Scoring, "scoring candidate");
    let Some((bytes, content_type)) = materialized.bytes else {
        let url = materialized.source_url.unwrap_or_default();
        warn!(candidate_id = ticket.id, %url, "generated image could not be downloaded");
        candidate.disqualify(DisqualifyReason::NoImage {
            message: format!("could not download {url}"),
        });
        return candidate;
    };

    let mut source_url = materialized.source_url;
    let (bytes, content_type) = if content_type.is_vector() {
        let svg_ref =
            persist_or_fallback(&collaborators, &bytes, content_type, source_url.take().as_deref()).await;
        candidate.svg_ref = Some(svg_ref);
        match rasterize(&collaborators, bytes, context.raster_size).await {
            Ok(png) => (png, ContentType::Png),
            Err(message) => {
                warn!(candidate_id = ticket.id, %message, "SVG has no usable raster");
                candidate.disqualify(DisqualifyReason::NoImage { message });
                return candidate;
            }
        }
    } else {
        (bytes, content_type)
    };

    let (bytes, pixel_score) = match score(&collaborators, bytes).await {
        (bytes, Ok(pixel_score)) => (bytes, pixel_score),
        (_, Err(message)) => {
            warn!(candidate_id = ticket.id, %message, "generated image is not decodable");
            candidate.disqualify(DisqualifyReason::NoImage { message });
            return candidate;
        }
    };
    let image_ref =
        persist_or_fallback(&collaborators, &bytes, content_type, source_url.as_deref()).await;
    candidate.image_ref = Some(image_ref.clone());
    candidate.pixel_score = Some(pixel_score);

    let rule_score = candidate.rule_score();
    if let Some(min_rule_score) = context.min_rule_score {
        if rule_score < min_rule_score {
            debug!(candidate_id = ticket.id, rule_score, min_rule_score, "below commercial minimum");
            candidate.disqualify(DisqualifyReason::CommercialGate {
                rule_score,
                min_rule_score,
            });
            return candidate;
        }
    }

    if context.gate {
        debug!(candidate_id = ticket.id, phase = %RunPhase::Judging, "judging candidate");
        judge(&collaborators, &context, &mut candidate, &image_ref).await;
        if candidate.disqualified {
            return candidate;
        }
    }

    let judge_score = candidate.judge_score.unwrap_or(rule_score);
    candidate.final_score = context.blend.combine(rule_score, judge_score);
    candidate
}

async fn materialize(
    collaborators: &Collaborators,
    payload: ImagePayload,
) -> Result<Materialized, String> {
    match payload {
        ImagePayload::Bytes { data, content_type } => {
            if data.is_empty() {
                return Err("generator returned an empty image".to_string());
            }
            Ok(Materialized {
                bytes: Some((data, content_type)),
                source_url: None,
            })
        }
        ImagePayload::Url(url) => {
            let url = url.trim().to_string();
            if url.is_empty() {
                return Err("generator returned an empty URL".to_string());
            }
            if utils::is_data_url(&url) {
                let (content_type, data) =
                    utils::decode_data_url(&url).map_err(|e| format!("undecodable data URL: {e}"))?;
                return Ok(Materialized {
                    bytes: Some((data, content_type)),
                    source_url: None,
                });
            }

            let bytes = match &collaborators.fetcher {
                Some(fetcher) => match fetcher.fetch(&url).await {
                    Ok((data, _)) if data.is_empty() => None,
                    Ok(fetched) => Some(fetched),
                    Err(err) => {
                        warn!(%url, error = %err, "could not download generated image");
                        None
                    }
                },
                None => None,
            };
            Ok(Materialized {
                bytes,
                source_url: Some(url),
            })
        }
    }
}

/// Persist bytes, falling back to the source URL or an inline data URL
async fn persist_or_fallback(
    collaborators: &Collaborators,
    bytes: &[u8],
    content_type: ContentType,
    source_url: Option<&str>,
) -> ImageRef {
    match collaborators.store.persist(bytes, content_type).await {
        Ok(image_ref) => image_ref,
        Err(err) => {
            warn!(error = %err, %content_type, "persist failed, keeping unpersisted reference");
            match source_url {
                Some(url) => ImageRef::ephemeral(url),
                None => ImageRef::ephemeral(utils::encode_data_url(content_type, bytes)),
            }
        }
    }
}

async fn rasterize(collaborators: &Collaborators, svg: Vec<u8>, size: u32) -> Result<Vec<u8>, String> {
    let Some(rasterizer) = collaborators.rasterizer.as_ref().map(Arc::clone) else {
        return Err("no SVG rasterizer configured".to_string());
    };
    match tokio::task::spawn_blocking(move || rasterizer.rasterize(&svg, size)).await {
        Ok(Ok(png)) if png.is_empty() => Err("SVG rasterizer returned no pixels".to_string()),
        Ok(Ok(png)) => Ok(png),
        Ok(Err(err)) => Err(err.to_string()),
        Err(err) => Err(format!("SVG rasterization task aborted: {err}")),
    }
}

/// Score on the blocking pool, handing the bytes back for persisting
async fn score(collaborators: &Collaborators, bytes: Vec<u8>) -> (Vec<u8>, Result<PixelScore, String>) {
    let scorer = Arc::clone(&collaborators.scorer);
    let task = tokio::task::spawn_blocking(move || {
        let result = scorer.score_bytes(&bytes).map_err(|e| format!("undecodable image: {e}"));
        (bytes, result)
    });
    match task.await {
        Ok(scored) => scored,
        Err(err) => (Vec::new(), Err(format!("pixel scoring task aborted: {err}"))),
    }
}

/// Apply the judge's verdict; any failure disqualifies the candidate
async fn judge(
    collaborators: &Collaborators,
    context: &AttemptContext,
    candidate: &mut Candidate,
    image_ref: &ImageRef,
) {
    let Some(judge) = &collaborators.judge else {
        candidate.judge_score = Some(0);
        candidate.disqualify(DisqualifyReason::JudgeFailed {
            message: "no compliance judge configured".to_string(),
        });
        return;
    };

    let hints = JudgeHints {
        candidate_id: candidate.id,
        storage_key: image_ref.storage_key.clone(),
    };
    match judge.judge(image_ref, &context.brief, &hints).await {
        Ok(verdict) => {
            candidate.judge_breakdown = Some(verdict.breakdown);
            candidate.judge_notes = verdict.notes;
            candidate.violations = Some(verdict.violations);
            if verdict.violations.any() {
                debug!(
                    candidate_id = candidate.id,
                    flags = ?verdict.violations.flagged(),
                    "semantic violation"
                );
                candidate.judge_score = Some(0);
                candidate.disqualify(DisqualifyReason::SemanticViolation {
                    violations: verdict.violations,
                });
            } else {
                candidate.judge_score = Some(verdict.score);
            }
        }
        Err(err) => {
            warn!(candidate_id = candidate.id, error = %err, "compliance judge failed");
            candidate.judge_score = Some(0);
            candidate.disqualify(DisqualifyReason::JudgeFailed {
                message: err.to_string(),
            });
        }
    }
}
