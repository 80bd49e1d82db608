//! Greedy arg-max decoding over a recurrent cell.
//!
//! Decoding runs for exactly `max_steps` steps. An end token does not stop the
//! loop; callers cut sequences with `text_vocab::truncate_at_end`.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor, TensorData};

/// One step of a recurrent model plus the embedding used to feed its own
/// predictions back in.
pub trait RecurrentStep<B: Backend> {
    type State;

    /// `[batch, 1]` token indices to `[batch, 1, embed]`.
    fn embed(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 3>;

    /// `[batch, 1, embed]` input to `[batch, vocab]` logits and the next state.
    fn step(&self, input: Tensor<B, 3>, state: Option<Self::State>) -> (Tensor<B, 2>, Self::State);
}

/// Decode `max_steps` tokens per row, starting from `first_input`
/// (`[batch, 1, embed]`). Returns `[batch, max_steps]` indices.
pub fn greedy_decode<B, C>(
    cell: &C,
    first_input: Tensor<B, 3>,
    state: Option<C::State>,
    max_steps: usize,
) -> Tensor<B, 2, Int>
where
    B: Backend,
    C: RecurrentStep<B>,
{
    let [batch, _, _] = first_input.dims();
    let device = first_input.device();
    if max_steps == 0 {
        return Tensor::from_data(TensorData::new(Vec::<i64>::new(), [batch, 0]), &device);
    }

    let mut tokens = Vec::with_capacity(max_steps);
    let mut input = first_input;
    let mut state = state;
    for step in 0..max_steps {
        let (logits, next_state) = cell.step(input, state);
        let predicted = logits.argmax(1);
        state = Some(next_state);
        tokens.push(predicted.clone());
        if step + 1 == max_steps {
            break;
        }
        input = cell.embed(predicted);
    }
    Tensor::cat(tokens, 1)
}

/// Copy decoded indices to the host, one `Vec` per batch row.
pub fn token_rows<B: Backend>(tokens: Tensor<B, 2, Int>) -> anyhow::Result<Vec<Vec<usize>>> {
    let [batch, steps] = tokens.dims();
    if steps == 0 {
        return Ok(vec![Vec::new(); batch]);
    }
    let values = tokens
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| anyhow::anyhow!("failed to read decoded tokens: {e:?}"))?;
    Ok(values
        .chunks(steps)
        .map(|row| row.iter().map(|&v| v.max(0) as usize).collect())
        .collect())
}
