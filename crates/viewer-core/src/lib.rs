//! GLB Viewer Core
//!
//! This crate contains the GPU-free parts of the viewer:
//! - ViewerConfig: immutable startup configuration
//! - ViewerState: grid / auto-rotate toggles driven by the UI
//! - BoundingBox and the fit functions that place camera, grid and axes
//! - Model: decoded GLB geometry and the load pipeline events

pub mod bounds;
pub mod config;
pub mod fit;
pub mod glb;
pub mod input;
pub mod labels;
pub mod load;
pub mod model;
pub mod state;

pub use bounds::*;
pub use config::*;
pub use fit::*;
pub use glb::*;
pub use input::*;
pub use load::*;
pub use model::*;
pub use state::*;
