//! Image-caption dataset over a COCO-style caption corpus.

use crate::aug::TransformPipeline;
use crate::detection::load_rgb;
use crate::types::{CaptionSample, Dataset, DatasetError, DatasetResult};
use data_contracts::CaptionCorpus;
use std::path::{Path, PathBuf};
use text_vocab::{encode_caption, TokenCounter, Vocabulary};
use tracing::info;

/// Count tokens across every caption of the corpus.
pub fn build_token_counter(corpus: &CaptionCorpus) -> TokenCounter {
    let counter = TokenCounter::from_texts(corpus.captions());
    info!(
        captions = corpus.len(),
        distinct = counter.len(),
        "counted caption tokens"
    );
    counter
}

/// One item per caption annotation, in corpus order.
#[derive(Debug, Clone)]
pub struct CaptionDataset {
    corpus: CaptionCorpus,
    image_dir: PathBuf,
    vocab: Vocabulary,
    transform: TransformPipeline,
}

impl CaptionDataset {
    pub fn new(
        corpus: CaptionCorpus,
        image_dir: &Path,
        vocab: Vocabulary,
        transform: TransformPipeline,
    ) -> Self {
        Self {
            corpus,
            image_dir: image_dir.to_path_buf(),
            vocab,
            transform,
        }
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn corpus(&self) -> &CaptionCorpus {
        &self.corpus
    }
}

impl Dataset for CaptionDataset {
    type Item = CaptionSample;

    fn len(&self) -> usize {
        self.corpus.len()
    }

    fn get(&self, index: usize) -> DatasetResult<CaptionSample> {
        let annotation =
            self.corpus
                .annotations
                .get(index)
                .ok_or(DatasetError::IndexOutOfRange {
                    index,
                    len: self.corpus.len(),
                })?;
        let file_name = self.corpus.file_name_for(annotation)?;
        let rgb = load_rgb(&self.image_dir.join(file_name))?;
        let image = self.transform.apply(rgb, annotation.id)?;
        Ok(CaptionSample {
            annotation_id: annotation.id,
            image,
            caption: encode_caption(&self.vocab, &annotation.caption),
        })
    }
}
