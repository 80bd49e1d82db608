use std::path::PathBuf;

use anyhow::{Context, Result};
use burn_dataset::{summarize_with_thresholds, ClassMap, ValidationOutcome, ValidationThresholds};
use clap::Parser;
use data_contracts::AnnotationTable;
use tracing::{info, warn};
use visionlab_tools::{init_tracing, ToolConfig};

#[derive(Parser, Debug)]
#[command(
    name = "dataset_report",
    about = "Summarize a detection annotation table and check it against thresholds"
)]
struct Args {
    /// Annotation CSV (defaults to the tools config).
    #[arg(long)]
    annotations: Option<PathBuf>,
    /// Image folder (defaults to the tools config).
    #[arg(long)]
    images: Option<PathBuf>,
    /// JSON class list starting with "background"; without it every label is accepted.
    #[arg(long)]
    classes: Option<PathBuf>,
    /// Thresholds fall back to the VISIONLAB_MAX_* environment variables.
    #[arg(long)]
    max_invalid: Option<usize>,
    #[arg(long)]
    max_missing: Option<usize>,
    #[arg(long)]
    max_invalid_ratio: Option<f32>,
    #[arg(long)]
    max_missing_ratio: Option<f32>,
}

fn main() -> Result<()> {
    init_tracing();
    let cfg = ToolConfig::load();
    let args = Args::parse();
    let annotations = args.annotations.unwrap_or(cfg.annotations_csv);
    let images = args.images.unwrap_or(cfg.images_dir);

    let table = AnnotationTable::from_csv_path(&annotations)
        .with_context(|| format!("load annotations from {}", annotations.display()))?;
    let classes: Option<ClassMap> = match &args.classes {
        Some(path) => {
            let raw = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
            Some(serde_json::from_slice(&raw).with_context(|| format!("parse {}", path.display()))?)
        }
        None => None,
    };
    let env = ValidationThresholds::from_env();
    let thresholds = ValidationThresholds {
        max_invalid: args.max_invalid.or(env.max_invalid),
        max_missing: args.max_missing.or(env.max_missing),
        max_invalid_ratio: args.max_invalid_ratio.or(env.max_invalid_ratio),
        max_missing_ratio: args.max_missing_ratio.or(env.max_missing_ratio),
    };

    let report = summarize_with_thresholds(&table, &images, classes.as_ref(), &thresholds)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    match report.outcome {
        ValidationOutcome::Pass => info!("dataset check passed"),
        ValidationOutcome::Warn => warn!(reasons = ?report.reasons, "dataset check warned"),
        ValidationOutcome::Fail => {
            anyhow::bail!("dataset check failed: {}", report.reasons.join("; "))
        }
    }
    Ok(())
}
