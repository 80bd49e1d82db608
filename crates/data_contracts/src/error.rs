use std::path::PathBuf;
use thiserror::Error;

pub type ContractResult<T> = Result<T, ContractError>;

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("annotation table parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("caption corpus parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("annotation for image {image_id} has empty label name")]
    EmptyLabel { image_id: String },
    #[error("annotation row has empty image id")]
    EmptyImageId,
    #[error("bbox out of range for image {image_id}: {bbox:?}")]
    InvalidBbox { image_id: String, bbox: [f32; 4] },
    #[error("caption annotation {annotation_id} references unknown image {image_id}")]
    UnknownImage { annotation_id: u64, image_id: u64 },
    #[error("caption corpus has duplicate image id {0}")]
    DuplicateImage(u64),
}
