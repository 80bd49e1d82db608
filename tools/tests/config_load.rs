use std::fs;
use std::path::PathBuf;

use text_vocab::VocabOrder;
use visionlab_tools::ToolConfig;

#[test]
fn defaults_live_under_data_root() {
    let cfg = ToolConfig::default();
    assert_eq!(cfg.data_root, PathBuf::from("data"));
    assert_eq!(cfg.images_dir, PathBuf::from("data/images"));
    assert_eq!(cfg.vocab_path, PathBuf::from("data/vocab.json"));
    assert_eq!(cfg.vocab_threshold, 4);
    assert_eq!(cfg.vocab_order, VocabOrder::FirstSeen);
    assert_eq!(cfg.resize_size, (256, 256));
    assert_eq!(cfg.max_seq_len, 20);
    assert_eq!(cfg.seed, None);
}

#[test]
fn loads_minimal_config() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("visionlab.toml");
    fs::write(
        &path,
        r#"
data_root = "/srv/coco"
captions_json = "/srv/coco/annotations/captions_train2014.json"

[vocab]
threshold = 5
order = "frequency"

[resize]
width = 224

[caption]
max_seq_len = 12
seed = 7
"#,
    )?;
    let cfg = ToolConfig::from_path(&path).expect("load config");
    assert_eq!(cfg.images_dir, PathBuf::from("/srv/coco/images"));
    assert_eq!(
        cfg.captions_json,
        PathBuf::from("/srv/coco/annotations/captions_train2014.json")
    );
    assert_eq!(cfg.vocab_threshold, 5);
    assert_eq!(cfg.vocab_order, VocabOrder::Frequency);
    assert_eq!(cfg.resize_size, (224, 256));
    assert_eq!(cfg.max_seq_len, 12);
    assert_eq!(cfg.seed, Some(7));
    Ok(())
}

#[test]
fn missing_or_broken_file_yields_none() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    assert!(ToolConfig::from_path(&dir.path().join("absent.toml")).is_none());
    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "data_root = [")?;
    assert!(ToolConfig::from_path(&broken).is_none());
    Ok(())
}
