//! Offline image resizing for a folder of images.

use crate::detection::{list_files, load_rgb};
use crate::types::{DatasetError, DatasetResult};
use image::imageops::FilterType;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const PROGRESS_EVERY: usize = 2_000;

/// Resize every image in `input` to `size` (Lanczos) and save it under `output`
/// with the same file name. Returns the number of images written.
///
/// Files that do not decode as images are skipped with a warning.
pub fn resize_images_in_folder(input: &Path, output: &Path, size: (u32, u32)) -> DatasetResult<usize> {
    fs::create_dir_all(output).map_err(|e| DatasetError::Io {
        path: output.to_path_buf(),
        source: e,
    })?;
    let files = list_files(input)?;
    let total = files.len();
    let mut written = 0usize;
    for (i, path) in files.iter().enumerate() {
        let Some(name) = path.file_name() else {
            continue;
        };
        let rgb = match load_rgb(path) {
            Ok(img) => img,
            Err(DatasetError::Image { path, source }) => {
                warn!(path = %path.display(), error = %source, "skipping unreadable image");
                continue;
            }
            Err(e) => return Err(e),
        };
        let resized = image::imageops::resize(&rgb, size.0, size.1, FilterType::Lanczos3);
        let dest = output.join(name);
        resized.save(&dest).map_err(|e| DatasetError::Image {
            path: dest.clone(),
            source: e,
        })?;
        written += 1;
        if (i + 1) % PROGRESS_EVERY == 0 {
            info!(done = i + 1, total, dir = %output.display(), "resized images");
        }
    }
    Ok(written)
}
