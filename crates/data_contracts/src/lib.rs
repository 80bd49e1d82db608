//! Shared data contracts for detection annotation tables and caption corpora.

pub mod annotations;
pub mod captions;
pub mod error;

pub use annotations::{AnnotationTable, DetectionAnnotation};
pub use captions::{CaptionAnnotation, CaptionCorpus, CaptionImage};
pub use error::{ContractError, ContractResult};
