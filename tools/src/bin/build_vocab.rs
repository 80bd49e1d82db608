use std::path::PathBuf;

use anyhow::{Context, Result};
use burn_dataset::build_token_counter;
use clap::{Parser, ValueEnum};
use data_contracts::CaptionCorpus;
use text_vocab::{VocabOrder, Vocabulary};
use tracing::info;
use visionlab_tools::{init_tracing, ToolConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    FirstSeen,
    Frequency,
}

impl From<OrderArg> for VocabOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::FirstSeen => VocabOrder::FirstSeen,
            OrderArg::Frequency => VocabOrder::Frequency,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "build_vocab",
    about = "Count caption tokens and write the vocabulary as a JSON token list"
)]
struct Args {
    /// COCO-style caption JSON (defaults to the tools config).
    #[arg(long)]
    captions: Option<PathBuf>,
    /// Output vocabulary path (defaults to the tools config).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Minimum count for a token to be kept.
    #[arg(long)]
    threshold: Option<usize>,
    /// Order of kept tokens after the reserved ones.
    #[arg(long, value_enum)]
    order: Option<OrderArg>,
}

fn main() -> Result<()> {
    init_tracing();
    let cfg = ToolConfig::load();
    let args = Args::parse();
    let captions = args.captions.unwrap_or(cfg.captions_json);
    let output = args.output.unwrap_or(cfg.vocab_path);
    let threshold = args.threshold.unwrap_or(cfg.vocab_threshold);
    let order = args.order.map(VocabOrder::from).unwrap_or(cfg.vocab_order);

    let corpus = CaptionCorpus::from_path(&captions)
        .with_context(|| format!("load captions from {}", captions.display()))?;
    let counter = build_token_counter(&corpus);
    let vocab = Vocabulary::build(&counter, threshold, order);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    vocab
        .save(&output)
        .with_context(|| format!("write vocabulary to {}", output.display()))?;
    info!(
        tokens = vocab.len(),
        captions = corpus.len(),
        path = %output.display(),
        "vocabulary written"
    );
    Ok(())
}
