//! # Pixel Quality Scoring Library
//!
//! A deterministic, trait-based heuristic for triaging generated logo images
//! before any paid semantic evaluation. The score is a pure function of the
//! pixel bytes: no network, no disk, no randomness.
//!
//! ## Core Features
//!
//! - **Colour statistics**: Rec.709 luminance mean/contrast and per-channel colourfulness
//! - **Edge analysis**: 3x3 Sobel gradients, edge density and centre-weighted edge strength
//! - **Readability proxy**: blend of clarity, edge-density closeness, centre edges and contrast
//! - **Trait-based Architecture**: swap the thumbnail sampler or the edge analyzer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pixel_score::PixelScorer;
//!
//! let scorer = PixelScorer::builder().build();
//! let bytes = std::fs::read("logo.png")?;
//! let result = scorer.score_bytes(&bytes)?;
//! println!("score {} (readability {:.2})", result.score, result.metrics.readability);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Scorer
//!
//! ```rust
//! use pixel_score::{PixelScorer, SobelEdgeAnalyzer};
//!
//! let scorer = PixelScorer::builder()
//!     .thumbnail_size(96)
//!     .set_edge_analyzer(SobelEdgeAnalyzer::new(48.0, 0.5))
//!     .build();
//! # let _ = scorer;
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod scorer;

// Re-exports for convenience
pub use error::{Result, ScoreError};
pub use types::{ColorStatistics, EdgeStatistics, PixelMetrics, PixelScore, ScoreComponents};
pub use traits::*;
pub use algorithms::*;
pub use scorer::{PixelScorer, builder::PixelScorerBuilder, compose_score};
