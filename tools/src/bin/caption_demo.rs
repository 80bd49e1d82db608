use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::tensor::{Tensor, TensorData};
use burn_dataset::TransformPipeline;
use burn_ndarray::NdArray;
use clap::Parser;
use image::{Rgb, RgbImage};
use models::{
    token_rows, CaptionDecoder, CaptionDecoderConfig, CaptionEncoder, CaptionEncoderConfig,
    NextTokenLstm, NextTokenLstmConfig,
};
use text_vocab::{caption_text, tokenize, truncate_at_end, Vocabulary};
use tracing::info;
use visionlab_tools::{init_tracing, ToolConfig};

type Backend = NdArray<f32>;

#[derive(Parser, Debug)]
#[command(
    name = "caption_demo",
    about = "Wire the caption encoder/decoder (random weights) and print sampled tokens"
)]
struct Args {
    /// Vocabulary JSON (defaults to the tools config).
    #[arg(long)]
    vocab: Option<PathBuf>,
    /// Image to caption; a flat grey image is used when omitted.
    #[arg(long)]
    image: Option<PathBuf>,
    /// Tokens to sample (defaults to the tools config).
    #[arg(long)]
    max_seq_len: Option<usize>,
    /// Also run the next-token model on this prompt.
    #[arg(long)]
    prompt: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cfg = ToolConfig::load();
    let args = Args::parse();
    let device = Default::default();

    let vocab_path = args.vocab.unwrap_or(cfg.vocab_path);
    let vocab = Vocabulary::load(&vocab_path)
        .with_context(|| format!("load vocabulary from {}", vocab_path.display()))?;

    let rgb = match &args.image {
        Some(path) => image::open(path)
            .with_context(|| format!("open image {}", path.display()))?
            .to_rgb8(),
        None => RgbImage::from_pixel(224, 224, Rgb([128, 128, 128])),
    };
    let transform = TransformPipeline {
        seed: cfg.seed,
        ..TransformPipeline::caption_eval()
    };
    info!(transform = %transform.describe(), "caption transform");
    let chw = transform.apply(rgb, 0)?;
    let [c, h, w] = chw.shape();
    let images = Tensor::<Backend, 4>::from_data(TensorData::new(chw.data, [1, c, h, w]), &device);

    let encoder = CaptionEncoder::<Backend>::new(CaptionEncoderConfig::default(), &device);
    let decoder = CaptionDecoder::<Backend>::new(
        CaptionDecoderConfig {
            max_seq_len: args.max_seq_len.unwrap_or(cfg.max_seq_len),
            ..CaptionDecoderConfig::new(vocab.len())
        },
        &device,
    );
    let features = encoder.forward(images);
    let rows = token_rows(decoder.sample(features, None))?;
    for row in &rows {
        info!(sampled = row.len(), kept = truncate_at_end(row).len(), "sampled caption");
        println!("tokens: {row:?}");
        println!("caption: {}", caption_text(&vocab, row));
    }

    if let Some(prompt) = &args.prompt {
        let prompt_ids: Vec<usize> = tokenize(prompt).iter().map(|t| vocab.lookup(t)).collect();
        let lm = NextTokenLstm::<Backend>::new(NextTokenLstmConfig::new(vocab.len()), &device);
        let generated = lm.generate(&prompt_ids, decoder.max_seq_len(), &device)?;
        println!("continuation: {}", caption_text(&vocab, &generated));
    }
    Ok(())
}
