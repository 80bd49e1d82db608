use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"'[\p{L}]+|\p{N}+(?:[.,]\p{N}+)+|[\p{L}\p{N}]+(?:-[\p{L}\p{N}]+)*|[^\s\p{L}\p{N}]")
        .unwrap_or_else(|e| panic!("Failed to compile token pattern: {e}"))
});

/// Lowercase word tokenizer.
///
/// Punctuation becomes its own token, hyphenated words and decimals like `3.5` stay
/// whole, and clitics split
/// off the way treebank tokenizers do: `dog's` -> `dog`, `'s` and `don't` -> `do`, `n't`.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut tokens: Vec<String> = Vec::new();
    let mut last_end = usize::MAX;
    for m in TOKEN_REGEX.find_iter(&lowered) {
        let tok = m.as_str();
        let adjacent = m.start() == last_end;
        last_end = m.end();
        if tok == "'t" && adjacent {
            if let Some(prev) = tokens.last_mut() {
                if prev.len() > 1 && prev.ends_with('n') {
                    prev.pop();
                    tokens.push("n't".to_string());
                    continue;
                }
            }
        }
        tokens.push(tok.to_string());
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::tokenize;

    #[test]
    fn splits_punctuation_and_lowercases() {
        assert_eq!(
            tokenize("A man riding a Wave on top of a surfboard."),
            vec!["a", "man", "riding", "a", "wave", "on", "top", "of", "a", "surfboard", "."]
        );
    }

    #[test]
    fn splits_clitics() {
        assert_eq!(tokenize("The dog's bowl"), vec!["the", "dog", "'s", "bowl"]);
        assert_eq!(tokenize("Don't stop"), vec!["do", "n't", "stop"]);
    }

    #[test]
    fn keeps_hyphenated_words() {
        assert_eq!(tokenize("a double-decker bus,"), vec!["a", "double-decker", "bus", ","]);
    }

    #[test]
    fn keeps_decimal_numbers() {
        assert_eq!(tokenize("3.5 inches"), vec!["3.5", "inches"]);
        assert_eq!(tokenize("1,000 birds."), vec!["1,000", "birds", "."]);
        assert_eq!(tokenize("2 dogs"), vec!["2", "dogs"]);
    }

    #[test]
    fn empty_and_whitespace_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \n\t ").is_empty());
    }
}
