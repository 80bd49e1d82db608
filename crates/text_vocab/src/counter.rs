//! Token frequency counting with first-seen iteration order.

use crate::tokenize::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

const PROGRESS_EVERY: usize = 10_000;

/// Order in which kept tokens are appended to a vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabOrder {
    /// Order in which tokens were first counted.
    #[default]
    FirstSeen,
    /// Descending count, ties broken lexicographically.
    Frequency,
}

#[derive(Debug, Clone, Default)]
pub struct TokenCounter {
    counts: Vec<(String, usize)>,
    positions: HashMap<String, usize>,
}

impl TokenCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize and count every text, logging progress periodically.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counter = Self::new();
        let mut seen = 0usize;
        for text in texts {
            counter.update(tokenize(text.as_ref()));
            seen += 1;
            if seen % PROGRESS_EVERY == 0 {
                info!(texts = seen, distinct = counter.len(), "tokenized captions");
            }
        }
        counter
    }

    pub fn add(&mut self, token: &str) {
        match self.positions.get(token) {
            Some(&pos) => self.counts[pos].1 += 1,
            None => {
                self.positions.insert(token.to_string(), self.counts.len());
                self.counts.push((token.to_string(), 1));
            }
        }
    }

    pub fn update<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            self.add(token.as_ref());
        }
    }

    pub fn count(&self, token: &str) -> usize {
        self.positions
            .get(token)
            .map(|&pos| self.counts[pos].1)
            .unwrap_or(0)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    /// `(token, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(t, c)| (t.as_str(), *c))
    }

    /// Tokens whose count is at least `threshold`, in the requested order.
    pub fn kept(&self, threshold: usize, order: VocabOrder) -> Vec<&str> {
        let mut kept: Vec<(&str, usize)> = self.iter().filter(|(_, c)| *c >= threshold).collect();
        if order == VocabOrder::Frequency {
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        }
        kept.into_iter().map(|(t, _)| t).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_in_first_seen_order() {
        let mut counter = TokenCounter::new();
        counter.update(["b", "a", "b", "c", "a", "b"]);
        assert_eq!(
            counter.iter().collect::<Vec<_>>(),
            vec![("b", 3), ("a", 2), ("c", 1)]
        );
        assert_eq!(counter.count("missing"), 0);
        assert_eq!(counter.total(), 6);
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut counter = TokenCounter::new();
        counter.update(["x", "y", "y", "z", "z", "z"]);
        assert_eq!(counter.kept(2, VocabOrder::FirstSeen), vec!["y", "z"]);
        assert_eq!(counter.kept(2, VocabOrder::Frequency), vec!["z", "y"]);
    }

    #[test]
    fn frequency_ties_break_lexicographically() {
        let mut counter = TokenCounter::new();
        counter.update(["pear", "apple", "fig", "fig"]);
        assert_eq!(counter.kept(1, VocabOrder::Frequency), vec!["fig", "apple", "pear"]);
    }

    #[test]
    fn from_texts_tokenizes() {
        let counter = TokenCounter::from_texts(["A cat.", "a dog"]);
        assert_eq!(counter.count("a"), 2);
        assert_eq!(counter.count("."), 1);
    }
}
