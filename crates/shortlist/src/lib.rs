//! # Logo Shortlisting Pipeline
//!
//! Generates logo candidates in bounded concurrent batches, scores each one
//! with a deterministic pixel heuristic, optionally gates them through a
//! fail-closed compliance judge, and ranks the survivors.
//!
//! ## Core Features
//!
//! - **Attempt budget**: batches never exceed `max_parallel`, runs never exceed `max_attempts`
//! - **Early stop**: no attempt is issued once `top_n` candidates are passing
//! - **Fail-closed gate**: judge errors and malformed verdicts disqualify, never pass
//! - **Style rotation**: each attempt's prompt carries a style variant for its logo type
//! - **Pluggable collaborators**: generators, stores, judges and fetchers are traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use logo_kit_common::CreativeBrief;
//! use shortlist::{CandidatePipeline, RunOptions};
//! use shortlist::providers::{DirectoryGenerator, LocalArtifactStore};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = CandidatePipeline::builder()
//!     .generator(DirectoryGenerator::from_dir("renders")?)
//!     .store(LocalArtifactStore::new("out", "http://localhost:8080"))
//!     .build()?;
//!
//! let brief = CreativeBrief::new("Acme", "Minimal vector logo for Acme, a coffee roaster");
//! let run = pipeline.run(&brief, &RunOptions::new(3, 2)).await?;
//! for candidate in &run.top {
//!     println!("#{} {} -> {}", candidate.id, candidate.style_variant, candidate.final_score);
//! }
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod providers;
pub mod ranking;
pub mod retry;
pub mod styles;
pub mod traits;
pub mod types;
pub mod verdict;

// Re-exports for convenience
pub use config::{PipelineConfig, ScoreBlend};
pub use error::{
    FetchError, GenerationError, JudgeError, PersistError, PipelineError, RasterizeError, Result,
    Retryable,
};
pub use options::RunOptions;
pub use pipeline::{CandidatePipeline, RunPhase, builder::CandidatePipelineBuilder};
pub use ranking::{Ranking, rank};
pub use retry::{RetryPolicy, Retrying};
pub use styles::{StyleRotation, style_pool};
pub use traits::*;
pub use types::*;
pub use verdict::{JudgeVerdict, RubricCriterion, VerdictDocument, ViolationsDocument};
