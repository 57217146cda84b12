//! Perspective camera

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use viewer_core::CameraConfig;

/// Camera uniform buffer data sent to GPU (112 bytes)
///
/// Fog and output settings ride along so every pipeline can share group 0.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Eye position (xyz), w unused
    pub position: [f32; 4],
    /// Fog color (linear RGB), w = 1.0 when fog is enabled
    pub fog_color: [f32; 4],
    /// x = fog near, y = fog far, z = tone mapping exposure, w = 1.0 to gamma-encode output
    pub fog_params: [f32; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0, 0.0, 0.0, 1.0],
            fog_color: [1.0, 1.0, 1.0, 0.0],
            fog_params: [0.0, 1.0, 1.0, 0.0],
        }
    }
}

/// Perspective camera looking at a target, Y up
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self::from_config(&CameraConfig::default(), aspect)
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: config.initial_position,
            target: config.target,
            up: Vec3::Y,
            fov_y: config.fov_degrees.to_radians(),
            aspect,
            near: config.near_plane,
            far: config.far_plane,
        }
    }

    /// Match the aspect ratio to a viewport.
    ///
    /// A viewport with a zero dimension (hidden tab, collapsed panel) leaves
    /// the previous aspect in place and returns `false`.
    pub fn set_viewport(&mut self, width: f32, height: f32) -> bool {
        if width <= 0.0 || height <= 0.0 {
            return false;
        }
        self.aspect = width / height;
        true
    }

    /// Distance from the eye to the target
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Uniform data with default fog and output settings
    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection().to_cols_array_2d(),
            position: [self.position.x, self.position.y, self.position.z, 1.0],
            ..Default::default()
        }
    }
}
