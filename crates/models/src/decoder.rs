use crate::greedy::{greedy_decode, RecurrentStep};
use crate::lstm::{StackedLstm, StackedLstmState};
use burn::module::Module;
use burn::nn;
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor, TensorData};

#[derive(Debug, Clone)]
pub struct CaptionDecoderConfig {
    pub embed_size: usize,
    pub hidden_size: usize,
    pub vocab_size: usize,
    pub num_layers: usize,
    /// Tokens produced by `sample`.
    pub max_seq_len: usize,
}

impl CaptionDecoderConfig {
    pub fn new(vocab_size: usize) -> Self {
        Self {
            embed_size: 256,
            hidden_size: 512,
            vocab_size,
            num_layers: 1,
            max_seq_len: 20,
        }
    }
}

/// LSTM caption decoder. The image embedding is fed as the first time step,
/// followed by the embedded caption tokens.
#[derive(Debug, Module)]
pub struct CaptionDecoder<B: Backend> {
    embedding: nn::Embedding<B>,
    lstm: StackedLstm<B>,
    linear: nn::Linear<B>,
    max_seq_len: usize,
}

impl<B: Backend> CaptionDecoder<B> {
    pub fn new(cfg: CaptionDecoderConfig, device: &B::Device) -> Self {
        Self {
            embedding: nn::EmbeddingConfig::new(cfg.vocab_size, cfg.embed_size).init(device),
            lstm: StackedLstm::new(cfg.embed_size, cfg.hidden_size, cfg.num_layers, 0.0, device),
            linear: nn::LinearConfig::new(cfg.hidden_size, cfg.vocab_size).init(device),
            max_seq_len: cfg.max_seq_len,
        }
    }

    pub fn max_seq_len(&self) -> usize {
        self.max_seq_len
    }

    /// Ground-truth-fed pass: `features` `[B, E]`, `captions` `[B, T]`, returns
    /// logits `[B, T + 1, V]`.
    pub fn forward(&self, features: Tensor<B, 2>, captions: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let embeds = self.embedding.forward(captions);
        let inputs = Tensor::cat(vec![features.unsqueeze_dim::<3>(1), embeds], 1);
        let (hidden, _) = self.lstm.forward(inputs, None);
        self.linear.forward(hidden)
    }

    /// Greedy caption for each image: `[B, max_seq_len]` token indices.
    pub fn sample(
        &self,
        features: Tensor<B, 2>,
        state: Option<StackedLstmState<B>>,
    ) -> Tensor<B, 2, Int> {
        greedy_decode(self, features.unsqueeze_dim::<3>(1), state, self.max_seq_len)
    }
}

impl<B: Backend> RecurrentStep<B> for CaptionDecoder<B> {
    type State = StackedLstmState<B>;

    fn embed(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        self.embedding.forward(tokens)
    }

    fn step(&self, input: Tensor<B, 3>, state: Option<Self::State>) -> (Tensor<B, 2>, Self::State) {
        let (hidden, state) = self.lstm.forward(input, state);
        let [batch, _, width] = hidden.dims();
        (self.linear.forward(hidden.reshape([batch, width])), state)
    }
}

/// Flat row indices of the valid time steps, time-major. `lengths` must be sorted
/// in descending order, as produced by caption collation.
fn packed_indices(steps: usize, lengths: &[usize]) -> Vec<i64> {
    let mut indices = Vec::with_capacity(lengths.iter().sum());
    for t in 0..steps {
        for (b, &len) in lengths.iter().enumerate() {
            if t < len {
                indices.push((b * steps + t) as i64);
            }
        }
    }
    indices
}

/// Logits `[B, T, V]` at each row's first `lengths[b]` steps, as `[sum(lengths), V]`.
pub fn pack_logits<B: Backend>(logits: Tensor<B, 3>, lengths: &[usize]) -> Tensor<B, 2> {
    let [batch, steps, vocab] = logits.dims();
    let indices = packed_indices(steps, &lengths[..batch.min(lengths.len())]);
    let n = indices.len();
    let index = Tensor::<B, 1, Int>::from_data(TensorData::new(indices, [n]), &logits.device());
    logits.reshape([batch * steps, vocab]).select(0, index)
}

/// Caption targets `[B, T]` packed in the same order as `pack_logits`.
pub fn pack_targets<B: Backend>(captions: Tensor<B, 2, Int>, lengths: &[usize]) -> Tensor<B, 1, Int> {
    let [batch, steps] = captions.dims();
    let indices = packed_indices(steps, &lengths[..batch.min(lengths.len())]);
    let n = indices.len();
    let index = Tensor::<B, 1, Int>::from_data(TensorData::new(indices, [n]), &captions.device());
    captions.reshape([batch * steps]).select(0, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::greedy::token_rows;
    use burn_ndarray::NdArray;

    type B = NdArray<f32>;

    fn small() -> CaptionDecoderConfig {
        CaptionDecoderConfig {
            embed_size: 8,
            hidden_size: 10,
            vocab_size: 15,
            num_layers: 2,
            max_seq_len: 5,
        }
    }

    #[test]
    fn forward_prepends_image_step() {
        let device = Default::default();
        let decoder = CaptionDecoder::<B>::new(small(), &device);
        let features = Tensor::<B, 2>::ones([3, 8], &device);
        let captions = Tensor::<B, 2, Int>::from_data(TensorData::new(vec![2i64; 12], [3, 4]), &device);
        assert_eq!(decoder.forward(features, captions).dims(), [3, 5, 15]);
    }

    #[test]
    fn sample_emits_max_seq_len_tokens() {
        let device = Default::default();
        let decoder = CaptionDecoder::<B>::new(small(), &device);
        let features = Tensor::<B, 2>::random(
            [2, 8],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let tokens = decoder.sample(features, None);
        assert_eq!(tokens.dims(), [2, 5]);
        let rows = token_rows(tokens).unwrap();
        assert!(rows.iter().flatten().all(|&t| t < 15));
    }

    #[test]
    fn default_config_samples_twenty_tokens() {
        assert_eq!(CaptionDecoderConfig::new(100).max_seq_len, 20);
    }

    #[test]
    fn packing_is_time_major() {
        assert_eq!(packed_indices(3, &[3, 2, 1]), vec![0, 3, 6, 1, 4, 2]);

        let device = Default::default();
        let captions = Tensor::<B, 2, Int>::from_data(
            TensorData::new(vec![2i64, 7, 3, 2, 3, 0], [2, 3]),
            &device,
        );
        let packed = pack_targets(captions, &[3, 2]);
        let values = packed.into_data().convert::<i64>().to_vec::<i64>().unwrap();
        assert_eq!(values, vec![2, 2, 7, 3, 3]);

        let logits = Tensor::<B, 3>::zeros([2, 3, 4], &device);
        assert_eq!(pack_logits(logits, &[3, 2]).dims(), [5, 4]);
    }
}
