use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;
use logo_kit_common::CreativeBrief;
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use shortlist::{
    CandidatePipeline, FetchError, GenerationError, ImageGenerator, JudgeVerdict, PipelineConfig,
    PipelineError, RunOptions,
    providers::{
        DirectoryGenerator, FallbackGenerator, LocalArtifactStore, ResvgRasterizer, StaticJudge,
        VerdictScript,
    },
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Run file must list at least one generator directory")]
    NoGeneratorSources,
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Where replayed renders come from. More than one directory forms a
/// fallback chain tried in order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GeneratorSection {
    pub directories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StoreSection {
    pub root: String,
    pub public_base_url: String,
    #[serde(default)]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct JudgeSection {
    /// JSON verdict script, see `logo-cli schema script`
    pub verdicts: String,
}

/// Everything needed for one pipeline run from the command line
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RunFile {
    /// Overlay PIPELINE_* / USE_COMPLIANCE_JUDGE from the environment
    #[serde(default = "default_apply_env")]
    pub apply_env: bool,
    pub brief: CreativeBrief,
    #[serde(default)]
    pub options: RunOptions,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub generator: GeneratorSection,
    pub store: StoreSection,
    #[serde(default)]
    pub judge: Option<JudgeSection>,
}

fn default_apply_env() -> bool {
    true
}

impl RunFile {
    /// Load RunFile configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Load RunFile configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration. Relative paths
    /// inside the file resolve against the file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        let parsed = match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&fs::read_to_string(path_ref)?)?,
            Some("json") => Self::from_json(&fs::read_to_string(path_ref)?)?,
            _ => return Err(CliError::UnsupportedFileFormat),
        };
        let base = path_ref.parent().unwrap_or_else(|| Path::new("."));
        Ok(parsed.rebase(base))
    }

    /// Convert RunFile to TOML string
    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert RunFile to JSON string
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    fn rebase(mut self, base: &Path) -> Self {
        let resolve = |p: &str| -> String {
            let path = Path::new(p);
            if path.is_absolute() {
                p.to_string()
            } else {
                base.join(path).to_string_lossy().to_string()
            }
        };
        self.generator.directories = self.generator.directories.iter().map(|d| resolve(d)).collect();
        self.store.root = resolve(&self.store.root);
        if let Some(judge) = self.judge.as_mut() {
            judge.verdicts = resolve(&judge.verdicts);
        }
        self
    }

    /// Pipeline config with the environment overlay applied if requested
    pub fn pipeline_config(&self) -> Result<PipelineConfig, CliError> {
        let config = self.pipeline.clone();
        Ok(if self.apply_env {
            config.apply_env()?
        } else {
            config
        })
    }

    /// Wire the offline collaborators described by this file
    pub fn build_pipeline(&self) -> Result<CandidatePipeline, CliError> {
        let mut sources = self
            .generator
            .directories
            .iter()
            .map(|dir| DirectoryGenerator::from_dir(dir).map(|g| Arc::new(g) as Arc<dyn ImageGenerator>))
            .collect::<Result<Vec<_>, _>>()?;
        let generator: Arc<dyn ImageGenerator> = match sources.len() {
            0 => return Err(CliError::NoGeneratorSources),
            1 => sources.remove(0),
            _ => Arc::new(FallbackGenerator::new(sources)),
        };

        let mut store = LocalArtifactStore::new(&self.store.root, &self.store.public_base_url);
        if let Some(prefix) = &self.store.prefix {
            store = store.with_prefix(prefix);
        }

        let mut builder = CandidatePipeline::builder()
            .config(self.pipeline_config()?)
            .shared_generator(generator)
            .store(store)
            .rasterizer(ResvgRasterizer::new());
        if let Some(judge) = &self.judge {
            builder = builder.judge(StaticJudge::from_file(&judge.verdicts)?);
        }
        // HttpFetcher also resolves file:// URLs and bare paths
        #[cfg(feature = "http")]
        {
            let fetcher = shortlist::providers::HttpFetcher::new(std::time::Duration::from_secs(60))?;
            builder = builder.fetcher(fetcher);
        }
        #[cfg(not(feature = "http"))]
        {
            builder = builder.fetcher(shortlist::providers::FileFetcher);
        }
        Ok(builder.build()?)
    }

    /// Resolved output directory for persisted artwork
    pub fn store_root(&self) -> PathBuf {
        PathBuf::from(&self.store.root)
    }
}

/// Documents `logo-cli schema` can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaKind {
    /// The run file itself
    Run,
    /// What a compliance judge must return
    Verdict,
    /// The `[judge] verdicts` script file
    Script,
    /// The `[pipeline]` section
    Config,
}

impl SchemaKind {
    pub fn schema_json(self) -> Result<String, CliError> {
        let schema = match self {
            Self::Run => schema_for!(RunFile),
            Self::Verdict => JudgeVerdict::schema(),
            Self::Script => schema_for!(VerdictScript),
            Self::Config => schema_for!(PipelineConfig),
        };
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use logo_kit_common::LogoType;
    use shortlist::{RankingMethod, StopReason};

    const RUN_TOML: &str = r#"
apply_env = false

[brief]
brandName = "Acme"
prompt = "Minimal vector logo for Acme roasters"
keywords = ["coffee", "roast"]

[options]
requestedCount = 2
topN = 1
logoType = "monogram"

[pipeline]
max_parallel = 1

[pipeline.retry]
max_retries = 0
attempt_timeout_ms = 5000

[generator]
directories = ["renders"]

[store]
root = "out"
public_base_url = "http://localhost:8080/"
prefix = "acme"
"#;

    fn write_render(dir: &Path, name: &str) {
        let image = RgbImage::from_fn(64, 64, |x, y| {
            if (16..48).contains(&x) && (16..48).contains(&y) {
                Rgb([30, 30, 30])
            } else {
                Rgb([240, 240, 240])
            }
        });
        DynamicImage::ImageRgb8(image)
            .save_with_format(dir.join(name), ImageFormat::Png)
            .unwrap();
    }

    #[test]
    fn test_parse_toml_run_file() {
        let run_file = RunFile::from_toml(RUN_TOML).unwrap();
        assert_eq!(run_file.brief.brand_name, "Acme");
        assert_eq!(run_file.options.requested_count, 2);
        assert_eq!(run_file.options.logo_type, LogoType::Monogram);
        assert_eq!(run_file.pipeline.max_parallel, 1);
        assert_eq!(run_file.pipeline.retry.max_retries, 0);
        assert!(run_file.judge.is_none());
        assert!(!run_file.apply_env);
    }

    #[test]
    fn test_json_round_trip() {
        let run_file = RunFile::from_toml(RUN_TOML).unwrap();
        let json = run_file.to_json().unwrap();
        assert_eq!(RunFile::from_json(&json).unwrap(), run_file);
        let toml = run_file.to_toml().unwrap();
        assert_eq!(RunFile::from_toml(&toml).unwrap(), run_file);
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            RunFile::from_file("run.yaml"),
            Err(CliError::UnsupportedFileFormat)
        ));
    }

    #[test]
    fn test_relative_paths_resolve_against_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, RUN_TOML).unwrap();

        let run_file = RunFile::from_file(&path).unwrap();
        assert_eq!(
            PathBuf::from(&run_file.generator.directories[0]),
            dir.path().join("renders")
        );
        assert_eq!(run_file.store_root(), dir.path().join("out"));
    }

    #[tokio::test]
    async fn test_run_from_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let renders = dir.path().join("renders");
        fs::create_dir_all(&renders).unwrap();
        write_render(&renders, "a.png");
        let path = dir.path().join("run.toml");
        fs::write(&path, RUN_TOML).unwrap();

        let run_file = RunFile::from_file(&path).unwrap();
        let pipeline = run_file.build_pipeline().unwrap();
        let run = pipeline.run(&run_file.brief, &run_file.options).await.unwrap();

        assert_eq!(run.ranking_method, RankingMethod::RuleOnly);
        assert_eq!(run.stopped_because, StopReason::EnoughPassing);
        assert_eq!(run.top.len(), 1);
        let key = run.top[0].image_ref.as_ref().unwrap().storage_key.clone().unwrap();
        assert!(key.starts_with("acme/"));
        assert!(dir.path().join("out").join(&key).exists());
    }

    #[tokio::test]
    async fn test_run_with_scripted_judge() {
        let dir = tempfile::tempdir().unwrap();
        let renders = dir.path().join("renders");
        fs::create_dir_all(&renders).unwrap();
        write_render(&renders, "a.png");
        fs::write(
            dir.path().join("verdicts.json"),
            r#"{"candidates": {"1": {"score": 30, "violations": {"hasPeople": false, "hasMascot": true, "hasScene": false, "tooIllustrative": false}}},
                "default": {"score": 81, "violations": {"hasPeople": false, "hasMascot": false, "hasScene": false, "tooIllustrative": false}}}"#,
        )
        .unwrap();
        let content = format!("{RUN_TOML}\n[judge]\nverdicts = \"verdicts.json\"\n");
        let path = dir.path().join("run.toml");
        fs::write(&path, content).unwrap();

        let run_file = RunFile::from_file(&path).unwrap();
        let pipeline = run_file.build_pipeline().unwrap();
        let run = pipeline.run(&run_file.brief, &run_file.options).await.unwrap();

        assert_eq!(run.ranking_method, RankingMethod::RulePlusLlmHardGate);
        assert_eq!(run.attempted, 2);
        assert_eq!(run.top.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(run.summary().disqualified_by.get("semantic_violation"), Some(&1));
    }

    #[tokio::test]
    async fn test_svg_renders_are_rasterized_and_scored() {
        let dir = tempfile::tempdir().unwrap();
        let renders = dir.path().join("renders");
        fs::create_dir_all(&renders).unwrap();
        fs::write(
            renders.join("mark.svg"),
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64">
                <circle cx="32" cy="32" r="20" fill="#202020"/>
            </svg>"##,
        )
        .unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, RUN_TOML.replace("max_parallel = 1", "max_parallel = 1\nraster_size = 256")).unwrap();

        let run_file = RunFile::from_file(&path).unwrap();
        assert_eq!(run_file.pipeline.raster_size, 256);
        let pipeline = run_file.build_pipeline().unwrap();
        let run = pipeline.run(&run_file.brief, &run_file.options).await.unwrap();

        assert_eq!(run.attempted, 1);
        let candidate = &run.top[0];
        assert!(candidate.pixel_score.as_ref().unwrap().score > 0);
        let svg_key = candidate.svg_ref.as_ref().unwrap().storage_key.clone().unwrap();
        let png_key = candidate.image_ref.as_ref().unwrap().storage_key.clone().unwrap();
        assert!(svg_key.ends_with(".svg"));
        assert!(png_key.ends_with(".png"));
        let png = image::open(dir.path().join("out").join(&png_key)).unwrap();
        assert_eq!((png.width(), png.height()), (256, 256));
    }

    #[test]
    fn test_schema_kinds_describe_their_documents() {
        let script: serde_json::Value =
            serde_json::from_str(&SchemaKind::Script.schema_json().unwrap()).unwrap();
        assert!(script["properties"]["candidates"].is_object());
        assert!(script["properties"]["default"].is_object());

        let verdict: serde_json::Value =
            serde_json::from_str(&SchemaKind::Verdict.schema_json().unwrap()).unwrap();
        assert!(verdict["properties"]["violations"].is_object());
        assert!(verdict["properties"].get("candidates").is_none());
    }

    #[test]
    fn test_missing_generator_directory() {
        let mut run_file = RunFile::from_toml(RUN_TOML).unwrap();
        run_file.generator.directories.clear();
        assert!(matches!(run_file.build_pipeline(), Err(CliError::NoGeneratorSources)));
    }
}
