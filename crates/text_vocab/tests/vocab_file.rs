use text_vocab::{
    caption_text, encode_caption, TokenCounter, VocabError, VocabOrder, Vocabulary, END_INDEX,
    UNK_INDEX,
};

#[test]
fn build_save_load_preserves_indices() -> anyhow::Result<()> {
    let captions = [
        "A man riding a horse.",
        "A man walking a dog.",
        "Two dogs play in the snow.",
    ];
    let counter = TokenCounter::from_texts(captions);
    let vocab = Vocabulary::build(&counter, 2, VocabOrder::FirstSeen);
    assert_eq!(&vocab.tokens()[4..], &["a", "man", "."]);

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("vocab.json");
    vocab.save(&path)?;
    let loaded = Vocabulary::load(&path)?;
    assert_eq!(loaded, vocab);
    assert_eq!(loaded.lookup("horse"), UNK_INDEX);
    Ok(())
}

#[test]
fn corrupted_file_is_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("vocab.json");
    std::fs::write(&path, r#"["<pad>", "<start>", "<unk>", "<end>"]"#)?;
    assert!(matches!(Vocabulary::load(&path), Err(VocabError::Json(_))));
    Ok(())
}

#[test]
fn generated_sequence_reads_until_end() {
    let mut vocab = Vocabulary::new();
    let cat = vocab.add_token("cat");
    let sleeps = vocab.add_token("sleeps");
    let generated = [cat, sleeps, END_INDEX, cat, cat];
    assert_eq!(caption_text(&vocab, &generated), "cat sleeps");
    assert_eq!(encode_caption(&vocab, "Cat sleeps").len(), 4);
}
