use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use logo_cli::{RunFile, SchemaKind};
use pixel_score::PixelScorer;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single image with the pixel heuristic
    Score {
        /// Path to a PNG, JPEG or WebP image
        image: PathBuf,
        /// Thumbnail edge length used for analysis
        #[arg(long, default_value = "64")]
        size: u32,
    },
    /// Run the candidate pipeline from a TOML or JSON run file
    Run {
        /// Path to the run file
        #[arg(short, long)]
        config: PathBuf,
        /// Write the full run result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a JSON schema
    Schema {
        #[arg(value_enum, default_value = "run")]
        kind: SchemaKind,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Score { image, size } => score_image(image, *size)?,
        Commands::Run { config, output } => run_pipeline(config, output.as_deref()).await?,
        Commands::Schema { kind } => print_schema(*kind)?,
    }

    Ok(())
}

fn score_image(image: &Path, size: u32) -> Result<()> {
    let bytes = std::fs::read(image)
        .wrap_err_with(|| format!("Failed to read image {}", image.display()))?;
    let scorer = PixelScorer::builder().thumbnail_size(size).build();
    let score = scorer.score_bytes(&bytes)?;
    info!(image = %image.display(), score = score.score, "scored image");
    println!("{}", serde_json::to_string_pretty(&score)?);
    Ok(())
}

async fn run_pipeline(config: &Path, output: Option<&Path>) -> Result<()> {
    info!("Loading run file: {}", config.display());
    let run_file = RunFile::from_file(config)
        .wrap_err_with(|| format!("Failed to load run file {}", config.display()))?;
    let pipeline = run_file.build_pipeline()?;

    info!(
        brand = %run_file.brief.brand_name,
        requested = run_file.options.requested_count,
        top_n = run_file.options.top_n,
        "Starting pipeline run"
    );
    let run = pipeline.run(&run_file.brief, &run_file.options).await?;
    let summary = run.summary();

    if run.top.len() < run.top_n {
        warn!(
            passing = summary.passing,
            top_n = run.top_n,
            "Attempt budget exhausted before enough candidates passed"
        );
    }
    info!(
        attempted = summary.attempted,
        batches = summary.batches,
        passing = summary.passing,
        disqualified = summary.disqualified,
        stopped_because = %summary.stopped_because,
        "Run complete: {}",
        serde_json::to_string(&summary)?
    );

    let json = serde_json::to_string_pretty(&run)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!("Run written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn print_schema(kind: SchemaKind) -> Result<()> {
    println!("{}", kind.schema_json()?);
    Ok(())
}
