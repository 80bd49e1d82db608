use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use burn_dataset::resize_images_in_folder;
use clap::Parser;
use tracing::info;
use visionlab_tools::{init_tracing, ToolConfig};

#[derive(Parser, Debug)]
#[command(
    name = "resize_images",
    about = "Resize every image in a folder (Lanczos) into an output folder"
)]
struct Args {
    /// Source image folder (defaults to the tools config).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Destination folder; created if missing.
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
}

fn main() -> Result<()> {
    init_tracing();
    let cfg = ToolConfig::load();
    let args = Args::parse();
    let input = args.input.unwrap_or(cfg.images_dir);
    let output = args.output.unwrap_or(cfg.resized_dir);
    let size = (
        args.width.unwrap_or(cfg.resize_size.0),
        args.height.unwrap_or(cfg.resize_size.1),
    );
    if size.0 == 0 || size.1 == 0 {
        bail!("resize size must be non-zero, got {}x{}", size.0, size.1);
    }

    let written = resize_images_in_folder(&input, &output, size)
        .with_context(|| format!("resize images from {}", input.display()))?;
    info!(
        written,
        width = size.0,
        height = size.1,
        dir = %output.display(),
        "resize finished"
    );
    Ok(())
}
