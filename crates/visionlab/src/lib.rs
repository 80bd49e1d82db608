//! visionlab umbrella crate: re-export the workspace crates with feature wiring.
//!
//! Default features re-export every library crate and leave the backend choice to
//! the caller. `wgpu` additionally exposes the GPU backend alias.

#[cfg(feature = "vision-core")]
pub use vision_core;

#[cfg(feature = "data-contracts")]
pub use data_contracts;

#[cfg(feature = "text-vocab")]
pub use text_vocab;

#[cfg(feature = "burn-dataset")]
pub use burn_dataset;

#[cfg(feature = "models")]
pub use models;

/// GPU backend alias, available with the `wgpu` feature.
#[cfg(feature = "wgpu")]
pub type WgpuBackend = burn_wgpu::Wgpu;
