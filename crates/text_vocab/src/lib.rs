//! Tokenization, token counting and the token/index vocabulary used by caption and text models.
//!
//! A [`Vocabulary`] always holds the reserved tokens `<pad>`, `<unk>`, `<start>` and `<end>`
//! at indices 0..=3; lookups of unseen tokens fall back to `<unk>`.

pub mod caption;
pub mod counter;
pub mod error;
pub mod tokenize;
pub mod vocabulary;

pub use caption::{caption_text, decode_tokens, encode_caption, truncate_at_end};
pub use counter::{TokenCounter, VocabOrder};
pub use error::{VocabError, VocabResult};
pub use tokenize::tokenize;
pub use vocabulary::{
    Vocabulary, END_INDEX, END_TOKEN, PAD_INDEX, PAD_TOKEN, RESERVED_TOKENS, START_INDEX,
    START_TOKEN, UNK_INDEX, UNK_TOKEN,
};
