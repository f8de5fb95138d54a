pub mod builder;
mod attempt;

use std::sync::Arc;

use logo_kit_common::CreativeBrief;
use strum::{Display, IntoStaticStr};
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{
    config::PipelineConfig,
    error::Result,
    options::{RunOptions, RunPlan},
    ranking::rank,
    styles::StyleRotation,
    types::{Candidate, GenerationHints, PipelineRun, RankingMethod, StopReason},
};

use attempt::{AttemptContext, AttemptTicket, Collaborators, run_attempt};

/// Lifecycle of a run. Attempts inside a batch move through
/// `Generating -> Scoring -> Judging` independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Generating,
    Scoring,
    Judging,
    Accumulating,
    Done,
}

/// Batched generate -> score -> judge -> gate -> rank loop.
///
/// Attempts are issued in batches of at most `max_parallel`. A batch is
/// sized so the run never exceeds `max_attempts` and never issues more
/// attempts than are still needed to reach `top_n` passing candidates.
pub struct CandidatePipeline {
    collaborators: Arc<Collaborators>,
    config: PipelineConfig,
}

impl CandidatePipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::CandidatePipelineBuilder {
        builder::CandidatePipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn has_judge(&self) -> bool {
        self.collaborators.judge.is_some()
    }

    /// Run the pipeline for one brief.
    ///
    /// Only invalid options fail the run. Collaborator failures are
    /// recorded on the candidate they affected.
    pub async fn run(&self, brief: &CreativeBrief, options: &RunOptions) -> Result<PipelineRun> {
        let plan = RunPlan::resolve(brief, options, &self.config, self.has_judge())?;
        let span = info_span!(
            "pipeline_run",
            brand = %brief.brand_name,
            requested_count = plan.requested_count,
            top_n = plan.top_n,
            max_parallel = plan.max_parallel,
            max_attempts = plan.max_attempts,
            gate = plan.gate,
        );
        Ok(self.execute(brief, plan).instrument(span).await)
    }

    async fn execute(&self, brief: &CreativeBrief, plan: RunPlan) -> PipelineRun {
        let rotation = StyleRotation::for_logo_type(plan.logo_type);
        let context = Arc::new(AttemptContext {
            brief: brief.clone(),
            gate: plan.gate,
            min_rule_score: self.config.min_rule_score,
            blend: self.config.blend,
            raster_size: self.config.raster_size,
        });

        let mut phase = RunPhase::Idle;
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut passing: Vec<Candidate> = Vec::new();
        let mut attempted = 0usize;
        let mut batches = 0usize;

        info!(phase = %phase, "starting run");
        while attempted < plan.max_attempts && passing.len() < plan.top_n {
            let batch_size = plan
                .max_parallel
                .min(plan.max_attempts - attempted)
                .min(plan.top_n - passing.len());

            phase = RunPhase::Generating;
            debug!(phase = %phase, batch = batches + 1, batch_size, "issuing batch");
            let tickets = (attempted..attempted + batch_size)
                .map(|index| {
                    let style_variant = rotation.variant(index).to_string();
                    AttemptTicket {
                        id: index as u32 + 1,
                        prompt: rotation.prompt(&plan.base_prompt, index),
                        hints: GenerationHints {
                            style_variant,
                            logo_type: plan.logo_type,
                            input_image: brief.reference_image.clone(),
                            attempt: index as u32,
                        },
                    }
                })
                .collect();

            let results = self.run_batch(&context, tickets).await;
            attempted += batch_size;
            batches += 1;

            phase = RunPhase::Accumulating;
            for candidate in results {
                if candidate.is_passing() {
                    passing.push(candidate.clone());
                }
                candidates.push(candidate);
            }
            info!(
                phase = %phase,
                batch = batches,
                attempted,
                passing = passing.len(),
                "batch complete"
            );
        }

        let stopped_because = if passing.len() >= plan.top_n {
            StopReason::EnoughPassing
        } else {
            StopReason::MaxAttempts
        };
        let ranking_method = if plan.gate {
            RankingMethod::RulePlusLlmHardGate
        } else {
            RankingMethod::RuleOnly
        };
        let ranking = rank(&candidates, ranking_method, plan.top_n);

        phase = RunPhase::Done;
        info!(
            phase = %phase,
            attempted,
            batches,
            passing = passing.len(),
            top = ranking.top.len(),
            %stopped_because,
            %ranking_method,
            "run finished"
        );

        PipelineRun {
            requested_count: plan.requested_count,
            top_n: plan.top_n,
            max_attempts: plan.max_attempts,
            max_parallel: plan.max_parallel,
            attempted,
            batches,
            candidates,
            passing,
            ranked: ranking.ordered,
            top: ranking.top,
            ranking_method,
            stopped_because,
        }
    }

    /// Run one batch concurrently; results come back in issue order
    async fn run_batch(
        &self,
        context: &Arc<AttemptContext>,
        tickets: Vec<AttemptTicket>,
    ) -> Vec<Candidate> {
        let placeholders: Vec<Candidate> = tickets
            .iter()
            .map(|ticket| ticket.placeholder("attempt task aborted"))
            .collect();
        let mut slots: Vec<Option<Candidate>> = vec![None; tickets.len()];

        let mut tasks = JoinSet::new();
        for (slot, ticket) in tickets.into_iter().enumerate() {
            let collaborators = Arc::clone(&self.collaborators);
            let context = Arc::clone(context);
            tasks.spawn(
                async move { (slot, run_attempt(collaborators, context, ticket).await) }
                    .in_current_span(),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, candidate)) => slots[slot] = Some(candidate),
                Err(err) => warn!(error = %err, "attempt task did not complete"),
            }
        }

        slots
            .into_iter()
            .zip(placeholders)
            .map(|(slot, placeholder)| slot.unwrap_or(placeholder))
            .collect()
    }
}
