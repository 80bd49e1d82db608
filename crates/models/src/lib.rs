//! Burn models for image captioning and next-token text generation.
//!
//! - `CaptionEncoder`: convolutional image encoder producing one embedding per image.
//! - `CaptionDecoder`: LSTM caption decoder conditioned on the image embedding.
//! - `NextTokenLstm`: stacked LSTM language model.
//! - `greedy`: step-bounded arg-max decoding shared by the recurrent models.
//!
//! These are pure Burn modules; vocabulary handling lives in `text_vocab`.

pub mod decoder;
pub mod encoder;
pub mod greedy;
pub mod lstm;
pub mod next_token;

pub use decoder::{pack_logits, pack_targets, CaptionDecoder, CaptionDecoderConfig};
pub use encoder::{CaptionEncoder, CaptionEncoderConfig};
pub use greedy::{greedy_decode, token_rows, RecurrentStep};
pub use lstm::{StackedLstm, StackedLstmState};
pub use next_token::{NextTokenLstm, NextTokenLstmConfig};

pub mod prelude {
    pub use super::{
        greedy_decode, token_rows, CaptionDecoder, CaptionDecoderConfig, CaptionEncoder,
        CaptionEncoderConfig, NextTokenLstm, NextTokenLstmConfig, RecurrentStep,
    };
}
