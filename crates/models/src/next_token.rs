use crate::greedy::{greedy_decode, token_rows, RecurrentStep};
use crate::lstm::{StackedLstm, StackedLstmState};
use burn::module::Module;
use burn::nn;
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor, TensorData};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct NextTokenLstmConfig {
    pub vocab_size: usize,
    /// Embedding width. It is also the LSTM input and hidden width and the head's
    /// input width, so the model has no separate input-size knob.
    pub embed_size: usize,
    pub num_layers: usize,
    pub dropout: f64,
}

impl NextTokenLstmConfig {
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            embed_size: 128,
            num_layers: 3,
            dropout: 0.2,
        }
    }
}

/// Stacked LSTM language model predicting the next token at every position.
#[derive(Debug, Module)]
pub struct NextTokenLstm<B: Backend> {
    embedding: nn::Embedding<B>,
    lstm: StackedLstm<B>,
    head: nn::Linear<B>,
}

impl<B: Backend> NextTokenLstm<B> {
    pub fn new(cfg: NextTokenLstmConfig, device: &B::Device) -> Self {
        Self {
            embedding: nn::EmbeddingConfig::new(cfg.vocab_size, cfg.embed_size).init(device),
            lstm: StackedLstm::new(
                cfg.embed_size,
                cfg.embed_size,
                cfg.num_layers,
                cfg.dropout,
                device,
            ),
            head: nn::LinearConfig::new(cfg.embed_size, cfg.vocab_size).init(device),
        }
    }

    /// `tokens` `[B, T]` to logits `[B, T, V]` and the final state.
    pub fn forward(
        &self,
        tokens: Tensor<B, 2, Int>,
        state: Option<StackedLstmState<B>>,
    ) -> (Tensor<B, 3>, StackedLstmState<B>) {
        let (hidden, state) = self.lstm.forward(self.embedding.forward(tokens), state);
        (self.head.forward(hidden), state)
    }

    pub fn init_hidden(&self, batch: usize, device: &B::Device) -> StackedLstmState<B> {
        self.lstm.zero_state(batch, device)
    }

    /// Feed `prompt` through the model, then decode `max_steps` tokens greedily.
    /// The returned tokens exclude the prompt.
    pub fn generate(
        &self,
        prompt: &[usize],
        max_steps: usize,
        device: &B::Device,
    ) -> anyhow::Result<Vec<usize>> {
        let Some((&last, context)) = prompt.split_last() else {
            anyhow::bail!("generation needs a non-empty prompt");
        };
        let mut state = self.init_hidden(1, device);
        if !context.is_empty() {
            let (_, primed) = self.forward(token_tensor(context, device), Some(state));
            state = primed;
        }
        let first = self.embedding.forward(token_tensor(&[last], device));
        let tokens = greedy_decode(self, first, Some(state), max_steps);
        let mut rows = token_rows(tokens)?;
        debug!(prompt = prompt.len(), max_steps, "generated tokens");
        Ok(rows.pop().unwrap_or_default())
    }
}

impl<B: Backend> RecurrentStep<B> for NextTokenLstm<B> {
    type State = StackedLstmState<B>;

    fn embed(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        self.embedding.forward(tokens)
    }

    fn step(&self, input: Tensor<B, 3>, state: Option<Self::State>) -> (Tensor<B, 2>, Self::State) {
        let (hidden, state) = self.lstm.forward(input, state);
        let [batch, _, width] = hidden.dims();
        (self.head.forward(hidden.reshape([batch, width])), state)
    }
}

fn token_tensor<B: Backend>(tokens: &[usize], device: &B::Device) -> Tensor<B, 2, Int> {
    let values: Vec<i64> = tokens.iter().map(|&t| t as i64).collect();
    Tensor::from_data(TensorData::new(values, [1, tokens.len()]), device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type B = NdArray<f32>;

    fn model() -> NextTokenLstm<B> {
        let cfg = NextTokenLstmConfig {
            embed_size: 16,
            ..NextTokenLstmConfig::new(30)
        };
        NextTokenLstm::new(cfg, &Default::default())
    }

    #[test]
    fn defaults_follow_three_layer_layout() {
        let cfg = NextTokenLstmConfig::new(50);
        assert_eq!(cfg.embed_size, 128);
        assert_eq!(cfg.num_layers, 3);
        assert_eq!(cfg.dropout, 0.2);
    }

    #[test]
    fn forward_returns_logits_per_position() {
        let device = Default::default();
        let model = model();
        let tokens = Tensor::<B, 2, Int>::from_data(TensorData::new(vec![1i64; 8], [2, 4]), &device);
        let hidden = model.init_hidden(2, &device);
        assert_eq!(hidden.len(), 3);
        assert_eq!(hidden[0].cell.dims(), [2, 16]);
        let (logits, state) = model.forward(tokens, Some(hidden));
        assert_eq!(logits.dims(), [2, 4, 30]);
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn embed_width_sets_lstm_and_head_widths() {
        let device = Default::default();
        let model = NextTokenLstm::<B>::new(
            NextTokenLstmConfig {
                embed_size: 12,
                num_layers: 2,
                ..NextTokenLstmConfig::new(9)
            },
            &device,
        );
        let state = model.init_hidden(3, &device);
        assert!(state.iter().all(|s| s.hidden.dims() == [3, 12] && s.cell.dims() == [3, 12]));
        let tokens = Tensor::<B, 2, Int>::from_data(TensorData::new(vec![2i64; 3], [3, 1]), &device);
        let (logits, _) = model.forward(tokens, Some(state));
        assert_eq!(logits.dims(), [3, 1, 9]);
    }

    #[test]
    fn generate_is_step_bounded() {
        let device = Default::default();
        let model = model();
        let out = model.generate(&[4, 5, 6], 7, &device).unwrap();
        assert_eq!(out.len(), 7);
        assert!(out.iter().all(|&t| t < 30));
        // single-token prompt skips priming
        assert_eq!(model.generate(&[4], 2, &device).unwrap().len(), 2);
        assert!(model.generate(&[], 3, &device).is_err());
    }
}
