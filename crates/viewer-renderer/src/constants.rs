//! Renderer constants

/// Depth buffer format shared by all pipelines
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub mod shadow {
    pub const SHADOW_MAP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    pub const MIN_MAP_SIZE: u32 = 256;
    pub const MAX_MAP_SIZE: u32 = 8192;
}

pub mod controls {
    /// Radians per frame at auto-rotate speed 1.0 (one turn per 60s at 60fps)
    pub const AUTO_ROTATE_STEP: f32 = 2.0 * std::f32::consts::PI / 60.0 / 60.0;
    /// Keeps the polar angle away from the poles
    pub const POLAR_EPSILON: f32 = 0.000_001;
    /// Dolly scale for one wheel notch at zoom speed 1.0
    pub const WHEEL_ZOOM_BASE: f32 = 0.95;
}

pub mod axis {
    pub const X_COLOR: [f32; 3] = [1.0, 0.0, 0.0];
    pub const Y_COLOR: [f32; 3] = [0.0, 1.0, 0.0];
    pub const Z_COLOR: [f32; 3] = [0.0, 0.0, 1.0];
}
