use std::path::{Path, PathBuf};

use serde::Deserialize;
use text_vocab::VocabOrder;
use tracing::warn;

pub const DEFAULT_CONFIG_NAME: &str = "visionlab.toml";
pub const CONFIG_ENV: &str = "VISIONLAB_CONFIG";

#[derive(Debug, Clone, PartialEq)]
pub struct ToolConfig {
    pub data_root: PathBuf,
    pub images_dir: PathBuf,
    pub resized_dir: PathBuf,
    pub annotations_csv: PathBuf,
    pub captions_json: PathBuf,
    pub vocab_path: PathBuf,
    pub vocab_threshold: usize,
    pub vocab_order: VocabOrder,
    pub resize_size: (u32, u32),
    pub max_seq_len: usize,
    pub seed: Option<u64>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self::from_file(ToolConfigFile::default())
    }
}

#[derive(Debug, Deserialize, Default)]
struct ToolConfigFile {
    data_root: Option<String>,
    images_dir: Option<String>,
    resized_dir: Option<String>,
    annotations_csv: Option<String>,
    captions_json: Option<String>,
    vocab: Option<VocabSection>,
    resize: Option<ResizeSection>,
    caption: Option<CaptionSection>,
}

#[derive(Debug, Deserialize, Default)]
struct VocabSection {
    path: Option<String>,
    threshold: Option<usize>,
    order: Option<VocabOrder>,
}

#[derive(Debug, Deserialize, Default)]
struct ResizeSection {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct CaptionSection {
    max_seq_len: Option<usize>,
    seed: Option<u64>,
}

impl ToolConfig {
    /// `$VISIONLAB_CONFIG` if set, else `visionlab.toml` in the working directory,
    /// else defaults.
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_NAME));
        let cfg = Self::from_path(&path).unwrap_or_default();
        cfg.warn_if_invalid();
        cfg
    }

    /// None when the file is missing or does not parse.
    pub fn from_path(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let raw = std::fs::read_to_string(path).ok()?;
        match Self::from_toml(&raw) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unparsable tools config");
                None
            }
        }
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        let file: ToolConfigFile = toml::from_str(raw)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: ToolConfigFile) -> Self {
        let data_root = file
            .data_root
            .map(|v| expand_path(&v))
            .unwrap_or_else(|| PathBuf::from("data"));
        let under_root = |value: Option<String>, default: &str| {
            value
                .map(|v| expand_path(&v))
                .unwrap_or_else(|| data_root.join(default))
        };
        let images_dir = under_root(file.images_dir, "images");
        let resized_dir = under_root(file.resized_dir, "resized");
        let annotations_csv = under_root(file.annotations_csv, "annotations.csv");
        let captions_json = under_root(file.captions_json, "captions.json");
        let vocab = file.vocab.unwrap_or_default();
        let vocab_path = under_root(vocab.path, "vocab.json");
        let resize = file.resize.unwrap_or_default();
        let caption = file.caption.unwrap_or_default();

        ToolConfig {
            data_root,
            images_dir,
            resized_dir,
            annotations_csv,
            captions_json,
            vocab_path,
            vocab_threshold: vocab.threshold.unwrap_or(4),
            vocab_order: vocab.order.unwrap_or_default(),
            resize_size: (resize.width.unwrap_or(256), resize.height.unwrap_or(256)),
            max_seq_len: caption.max_seq_len.unwrap_or(20),
            seed: caption.seed,
        }
    }

    fn warn_if_invalid(&self) {
        if self.vocab_threshold == 0 {
            warn!("tools config: vocab.threshold is 0; every counted token will be kept");
        }
        if self.resize_size.0 == 0 || self.resize_size.1 == 0 {
            warn!(
                width = self.resize_size.0,
                height = self.resize_size.1,
                "tools config: resize size has a zero side; resize_images will fail"
            );
        }
        if self.max_seq_len == 0 {
            warn!("tools config: caption.max_seq_len is 0; sampled captions will be empty");
        }
        if !self.data_root.exists() {
            warn!(path = %self.data_root.display(), "tools config: data_root does not exist");
        }
    }
}

/// Expand a leading `~` to `$HOME` and `${VAR}` references. Unknown variables are
/// left as written.
pub fn expand_path(raw: &str) -> PathBuf {
    let mut out = raw.to_string();
    if let Some(stripped) = out.strip_prefix('~') {
        if let Ok(home) = std::env::var("HOME") {
            out = format!("{home}{stripped}");
        }
    }
    PathBuf::from(expand_env(&out))
}

fn expand_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match std::env::var(key) {
                    Ok(val) => out.push_str(&val),
                    Err(_) => {
                        out.push_str("${");
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_variables_are_kept() {
        assert_eq!(
            expand_env("a/${VISIONLAB_SURELY_UNSET_VAR}/b"),
            "a/${VISIONLAB_SURELY_UNSET_VAR}/b"
        );
        assert_eq!(expand_env("no vars"), "no vars");
        assert_eq!(expand_env("dangling ${oops"), "dangling ${oops");
    }

    #[test]
    fn known_variables_are_substituted() {
        let path = std::env::var("PATH").unwrap_or_default();
        assert_eq!(expand_env("${PATH}/x"), format!("{path}/x"));
    }
}
