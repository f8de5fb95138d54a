//! Bundled collaborators for local and offline runs

pub mod directory;
pub mod fallback;
pub mod file_fetch;
#[cfg(feature = "http")]
pub mod http_fetch;
pub mod local_store;
#[cfg(feature = "svg")]
pub mod resvg_rasterizer;
pub mod static_judge;

pub use directory::DirectoryGenerator;
pub use fallback::FallbackGenerator;
pub use file_fetch::FileFetcher;
#[cfg(feature = "http")]
pub use http_fetch::HttpFetcher;
pub use local_store::LocalArtifactStore;
#[cfg(feature = "svg")]
pub use resvg_rasterizer::ResvgRasterizer;
pub use static_judge::{ScriptedVerdict, StaticJudge, VerdictScript};
