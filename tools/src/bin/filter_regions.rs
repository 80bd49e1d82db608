use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::Rgb;
use serde::Deserialize;
use tracing::info;
use vision_core::overlay::draw_box;
use vision_core::{label_candidates, BoundingBox, CandidateFilter, RawRegion};
use visionlab_tools::init_tracing;

#[derive(Parser, Debug)]
#[command(
    name = "filter_regions",
    about = "Filter segmentation regions into candidate boxes and optionally label them"
)]
struct Args {
    /// JSON array of `{"rect": {x1, y1, x2, y2}, "size": n}` regions.
    #[arg(long)]
    regions: PathBuf,
    /// Source image; provides the image area and the overlay background.
    #[arg(long)]
    image: Option<PathBuf>,
    /// Image width when no image is given.
    #[arg(long)]
    width: Option<u32>,
    /// Image height when no image is given.
    #[arg(long)]
    height: Option<u32>,
    #[arg(long, default_value_t = 0.05)]
    min_area_fraction: f64,
    #[arg(long, default_value_t = 1.0)]
    max_area_fraction: f64,
    /// JSON array of `{"bbox": [x1, y1, x2, y2], "class": n}` ground-truth boxes.
    #[arg(long)]
    ground_truth: Option<PathBuf>,
    #[arg(long, default_value_t = 0.3)]
    iou_threshold: f32,
    /// Write the image with candidate boxes drawn on it.
    #[arg(long)]
    overlay: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct GroundTruth {
    bbox: [f32; 4],
    class: usize,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let raw = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parse {}", path.display()))
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let regions: Vec<RawRegion> = read_json(&args.regions)?;

    let image = match &args.image {
        Some(path) => Some(
            image::open(path)
                .with_context(|| format!("open image {}", path.display()))?
                .to_rgb8(),
        ),
        None => None,
    };
    let dims = match (&image, args.width, args.height) {
        (Some(img), _, _) => img.dimensions(),
        (None, Some(w), Some(h)) => (w, h),
        _ => bail!("pass --image or both --width and --height"),
    };
    let area = u64::from(dims.0) * u64::from(dims.1);

    let filter = CandidateFilter::new(args.min_area_fraction, args.max_area_fraction);
    let candidates = filter.apply(&regions, area);
    info!(raw = regions.len(), kept = candidates.len(), area, "filtered regions");

    match &args.ground_truth {
        Some(path) => {
            let gt: Vec<GroundTruth> = read_json(path)?;
            let gt: Vec<(BoundingBox, usize)> = gt
                .into_iter()
                .map(|g| (BoundingBox::from_array(g.bbox), g.class))
                .collect();
            let labels = label_candidates(&candidates, &gt, dims, args.iou_threshold);
            println!("{}", serde_json::to_string_pretty(&labels)?);
        }
        None => println!("{}", serde_json::to_string_pretty(&candidates)?),
    }

    if let Some(out) = &args.overlay {
        let Some(mut img) = image else {
            bail!("--overlay needs --image");
        };
        for cand in &candidates {
            draw_box(&mut img, cand, Rgb([255, 64, 192]), 2);
        }
        img.save(out)
            .with_context(|| format!("write overlay {}", out.display()))?;
        info!(path = %out.display(), "overlay written");
    }
    Ok(())
}
