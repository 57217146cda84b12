//! GLB Viewer Renderer
//!
//! WGPU-based 3D rendering for the GLB viewer: the model with a small
//! lighting rig and key-light shadows, a ground grid and an axes helper.

pub mod axis;
pub mod camera;
pub mod constants;
pub mod controls;
pub mod gpu_resources;
pub mod grid;
pub mod light;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod vertex;

pub use camera::*;
pub use controls::OrbitControls;
pub use renderer::*;
