//! Converting captions to index sequences and back.

use crate::tokenize::tokenize;
use crate::vocabulary::{Vocabulary, END_INDEX, PAD_INDEX, START_INDEX};

/// `[<start>, tokens..., <end>]` with unknown words mapped to `<unk>`.
pub fn encode_caption(vocab: &Vocabulary, text: &str) -> Vec<usize> {
    let words = tokenize(text);
    let mut ids = Vec::with_capacity(words.len() + 2);
    ids.push(START_INDEX);
    ids.extend(words.iter().map(|w| vocab.lookup(w)));
    ids.push(END_INDEX);
    ids
}

/// Prefix of `indices` before the first `<end>`.
///
/// The greedy decoder always emits its full step budget, so generated sequences are
/// cut here before being shown.
pub fn truncate_at_end(indices: &[usize]) -> &[usize] {
    match indices.iter().position(|&i| i == END_INDEX) {
        Some(pos) => &indices[..pos],
        None => indices,
    }
}

/// Map each index to its token; indices outside the table map to `<unk>`.
pub fn decode_tokens<'a>(vocab: &'a Vocabulary, indices: &[usize]) -> Vec<&'a str> {
    indices
        .iter()
        .map(|&i| vocab.token(i).unwrap_or(crate::vocabulary::UNK_TOKEN))
        .collect()
}

/// Readable caption: stops at `<end>`, drops `<start>` and `<pad>`.
pub fn caption_text(vocab: &Vocabulary, indices: &[usize]) -> String {
    let kept: Vec<usize> = truncate_at_end(indices)
        .iter()
        .copied()
        .filter(|&i| i != START_INDEX && i != PAD_INDEX)
        .collect();
    decode_tokens(vocab, &kept).join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::UNK_INDEX;

    fn vocab() -> Vocabulary {
        let mut v = Vocabulary::new();
        for t in ["a", "cat", "sits", "."] {
            v.add_token(t);
        }
        v
    }

    #[test]
    fn encode_wraps_with_start_and_end() {
        let v = vocab();
        assert_eq!(
            encode_caption(&v, "A cat sits on a mat."),
            vec![START_INDEX, 4, 5, 6, UNK_INDEX, 4, UNK_INDEX, 7, END_INDEX]
        );
    }

    #[test]
    fn truncation_stops_at_first_end() {
        assert_eq!(truncate_at_end(&[4, 5, END_INDEX, 6, END_INDEX]), &[4, 5]);
        assert_eq!(truncate_at_end(&[4, 5]), &[4, 5]);
        assert!(truncate_at_end(&[END_INDEX, 4]).is_empty());
    }

    #[test]
    fn caption_text_round_trip() {
        let v = vocab();
        let ids = encode_caption(&v, "a cat sits .");
        assert_eq!(caption_text(&v, &ids), "a cat sits .");
        assert_eq!(decode_tokens(&v, &[999]), vec!["<unk>"]);
    }
}
