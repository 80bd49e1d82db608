use burn::module::Module;
use burn::nn;
use burn::nn::LstmState;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Per-layer recurrent state, bottom layer first.
pub type StackedLstmState<B> = Vec<LstmState<B, 2>>;

/// Batch-first LSTM layers applied in sequence, with dropout between layers.
#[derive(Debug, Module)]
pub struct StackedLstm<B: Backend> {
    layers: Vec<nn::Lstm<B>>,
    dropout: nn::Dropout,
    hidden_size: usize,
}

impl<B: Backend> StackedLstm<B> {
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        num_layers: usize,
        dropout: f64,
        device: &B::Device,
    ) -> Self {
        let num_layers = num_layers.max(1);
        let layers = (0..num_layers)
            .map(|i| {
                let d_in = if i == 0 { input_size } else { hidden_size };
                nn::LstmConfig::new(d_in, hidden_size, true).init(device)
            })
            .collect();
        Self {
            layers,
            dropout: nn::DropoutConfig::new(dropout).init(),
            hidden_size,
        }
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Zero cell and hidden state for every layer.
    pub fn zero_state(&self, batch: usize, device: &B::Device) -> StackedLstmState<B> {
        (0..self.layers.len())
            .map(|_| {
                LstmState::new(
                    Tensor::zeros([batch, self.hidden_size], device),
                    Tensor::zeros([batch, self.hidden_size], device),
                )
            })
            .collect()
    }

    /// `input` is `[batch, seq, features]`; returns the top layer's outputs
    /// `[batch, seq, hidden]` and the final state of every layer.
    ///
    /// Missing layer states (or `None`) start from zeros.
    pub fn forward(
        &self,
        input: Tensor<B, 3>,
        state: Option<StackedLstmState<B>>,
    ) -> (Tensor<B, 3>, StackedLstmState<B>) {
        let mut incoming = state.unwrap_or_default().into_iter();
        let last = self.layers.len() - 1;
        let mut x = input;
        let mut states = Vec::with_capacity(self.layers.len());
        for (i, layer) in self.layers.iter().enumerate() {
            let (out, s) = layer.forward(x, incoming.next());
            x = if i < last { self.dropout.forward(out) } else { out };
            states.push(s);
        }
        (x, states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type B = NdArray<f32>;

    #[test]
    fn stacked_forward_shapes() {
        let device = Default::default();
        let lstm = StackedLstm::<B>::new(6, 5, 3, 0.2, &device);
        let input = Tensor::<B, 3>::zeros([2, 4, 6], &device);
        let (out, states) = lstm.forward(input, None);
        assert_eq!(out.dims(), [2, 4, 5]);
        assert_eq!(states.len(), 3);
        assert_eq!(states[2].hidden.dims(), [2, 5]);
    }

    #[test]
    fn zero_state_matches_none() {
        let device = Default::default();
        let lstm = StackedLstm::<B>::new(3, 4, 2, 0.0, &device);
        let input = Tensor::<B, 3>::ones([1, 2, 3], &device);
        let (a, _) = lstm.forward(input.clone(), None);
        let (b, _) = lstm.forward(input, Some(lstm.zero_state(1, &device)));
        let a = a.into_data().to_vec::<f32>().unwrap();
        let b = b.into_data().to_vec::<f32>().unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }
    }
}
