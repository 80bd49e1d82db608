//! Append-only token <-> index table.

use crate::counter::{TokenCounter, VocabOrder};
use crate::error::{VocabError, VocabResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub const PAD_TOKEN: &str = "<pad>";
pub const UNK_TOKEN: &str = "<unk>";
pub const START_TOKEN: &str = "<start>";
pub const END_TOKEN: &str = "<end>";

pub const PAD_INDEX: usize = 0;
pub const UNK_INDEX: usize = 1;
pub const START_INDEX: usize = 2;
pub const END_INDEX: usize = 3;

/// Reserved tokens in index order.
pub const RESERVED_TOKENS: [&str; 4] = [PAD_TOKEN, UNK_TOKEN, START_TOKEN, END_TOKEN];

/// Serialized as a JSON array of tokens in index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    token_to_index: HashMap<String, usize>,
    index_to_token: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl Vocabulary {
    /// A vocabulary holding only the reserved tokens.
    pub fn new() -> Self {
        let mut vocab = Self {
            token_to_index: HashMap::new(),
            index_to_token: Vec::new(),
        };
        for token in RESERVED_TOKENS {
            vocab.add_token(token);
        }
        vocab
    }

    /// Reserved tokens followed by every counted token with `count >= threshold`.
    pub fn build(counter: &TokenCounter, threshold: usize, order: VocabOrder) -> Self {
        let mut vocab = Self::new();
        for token in counter.kept(threshold, order) {
            vocab.add_token(token);
        }
        info!(
            size = vocab.len(),
            counted = counter.len(),
            threshold,
            "built vocabulary"
        );
        vocab
    }

    /// Insert `token` with the next free index. Existing tokens keep their index.
    pub fn add_token(&mut self, token: &str) -> usize {
        if let Some(&idx) = self.token_to_index.get(token) {
            return idx;
        }
        let idx = self.index_to_token.len();
        self.token_to_index.insert(token.to_string(), idx);
        self.index_to_token.push(token.to_string());
        idx
    }

    /// Index of `token`, or the `<unk>` index when it was never inserted.
    pub fn lookup(&self, token: &str) -> usize {
        self.get(token).unwrap_or(UNK_INDEX)
    }

    pub fn get(&self, token: &str) -> Option<usize> {
        self.token_to_index.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.token_to_index.contains_key(token)
    }

    pub fn token(&self, index: usize) -> Option<&str> {
        self.index_to_token.get(index).map(String::as_str)
    }

    /// Distinct tokens, reserved ones included.
    pub fn len(&self) -> usize {
        self.index_to_token.len()
    }

    /// Always false: reserved tokens are present from construction.
    pub fn is_empty(&self) -> bool {
        self.index_to_token.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.index_to_token
    }

    /// Rebuild from tokens in index order. The first four must be the reserved tokens.
    pub fn from_tokens(tokens: Vec<String>) -> VocabResult<Self> {
        for (index, expected) in RESERVED_TOKENS.into_iter().enumerate() {
            let found = tokens.get(index);
            if found.map(String::as_str) != Some(expected) {
                return Err(VocabError::MissingReserved {
                    index,
                    expected,
                    found: found.cloned(),
                });
            }
        }
        let mut token_to_index = HashMap::with_capacity(tokens.len());
        for (idx, token) in tokens.iter().enumerate() {
            if token_to_index.insert(token.clone(), idx).is_some() {
                return Err(VocabError::DuplicateToken(token.clone()));
            }
        }
        Ok(Self {
            token_to_index,
            index_to_token: tokens,
        })
    }

    pub fn save(&self, path: &Path) -> VocabResult<()> {
        let raw = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, raw).map_err(|e| VocabError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn load(path: &Path) -> VocabResult<Self> {
        let raw = std::fs::read(path).map_err(|e| VocabError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = VocabError;

    fn try_from(tokens: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_tokens(tokens)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.index_to_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_tokens_take_low_indices() {
        let vocab = Vocabulary::new();
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.lookup(PAD_TOKEN), PAD_INDEX);
        assert_eq!(vocab.lookup(UNK_TOKEN), UNK_INDEX);
        assert_eq!(vocab.lookup(START_TOKEN), START_INDEX);
        assert_eq!(vocab.lookup(END_TOKEN), END_INDEX);
    }

    #[test]
    fn add_token_is_idempotent() {
        let mut vocab = Vocabulary::new();
        let before = vocab.len();
        let first = vocab.add_token("cat");
        let second = vocab.add_token("cat");
        assert_eq!(first, second);
        assert_eq!(vocab.len(), before + 1);
        assert_eq!(vocab.token(first), Some("cat"));
    }

    #[test]
    fn unseen_token_maps_to_unk() {
        let vocab = Vocabulary::new();
        assert_eq!(vocab.lookup("never-seen"), vocab.lookup(UNK_TOKEN));
        assert_eq!(vocab.get("never-seen"), None);
    }

    #[test]
    fn build_appends_kept_tokens_after_reserved() {
        let mut counter = TokenCounter::new();
        counter.update(["dog", "cat", "dog", "bird", "cat", "cat"]);
        let vocab = Vocabulary::build(&counter, 2, VocabOrder::FirstSeen);
        assert_eq!(
            vocab.tokens(),
            &["<pad>", "<unk>", "<start>", "<end>", "dog", "cat"]
        );
        assert_eq!(vocab.lookup("bird"), UNK_INDEX);
    }

    #[test]
    fn reserved_tokens_in_corpus_are_not_reindexed() {
        let mut counter = TokenCounter::new();
        counter.update(["<end>", "sky"]);
        let vocab = Vocabulary::build(&counter, 1, VocabOrder::FirstSeen);
        assert_eq!(vocab.lookup("<end>"), END_INDEX);
        assert_eq!(vocab.lookup("sky"), 4);
        assert_eq!(vocab.len(), 5);
    }

    #[test]
    fn from_tokens_requires_reserved_prefix() {
        let err = Vocabulary::from_tokens(vec!["<unk>".into(), "<pad>".into()]).unwrap_err();
        assert!(matches!(err, VocabError::MissingReserved { index: 0, .. }));
    }

    #[test]
    fn from_tokens_rejects_duplicates() {
        let mut tokens: Vec<String> = RESERVED_TOKENS.iter().map(|t| t.to_string()).collect();
        tokens.push("a".into());
        tokens.push("a".into());
        assert!(matches!(
            Vocabulary::from_tokens(tokens),
            Err(VocabError::DuplicateToken(t)) if t == "a"
        ));
    }
}
