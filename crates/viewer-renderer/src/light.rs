//! Lighting rig for the viewer: ambient, a shadow-casting key light, two
//! directional fills and a point light.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use viewer_core::{DirectionalLightConfig, LightsConfig, hex_to_linear};

/// Number of fill lights the shader handles
pub const MAX_FILL_LIGHTS: usize = 2;

/// Light uniform buffer data sent to GPU (208 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightUniform {
    /// Key light view-projection matrix for shadow mapping
    pub light_view_proj: [[f32; 4]; 4],
    /// Direction toward the key light (xyz), w unused
    pub key_direction: [f32; 4],
    /// Key light color (RGB) and intensity (A)
    pub key_color: [f32; 4],
    pub fill_directions: [[f32; 4]; MAX_FILL_LIGHTS],
    /// Fill colors (RGB) and intensities (A); unused slots have zero intensity
    pub fill_colors: [[f32; 4]; MAX_FILL_LIGHTS],
    /// Point light position (xyz), w unused
    pub point_position: [f32; 4],
    /// Point light color (RGB) and intensity (A)
    pub point_color: [f32; 4],
    /// Ambient color (RGB) and intensity (A)
    pub ambient: [f32; 4],
    /// x = bias, y = normal bias, z = shadow map texel size, w = enabled (1.0 or 0.0)
    pub shadow_params: [f32; 4],
}

/// Directional light shining from `position` toward the origin
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl DirectionalLight {
    pub fn from_config(config: &DirectionalLightConfig) -> Self {
        Self {
            position: config.position,
            color: Vec3::from(hex_to_linear(config.color)),
            intensity: config.intensity,
        }
    }

    /// Unit vector pointing from the scene toward the light
    pub fn direction(&self) -> Vec3 {
        self.position.try_normalize().unwrap_or(Vec3::Y)
    }

    fn color_intensity(&self) -> [f32; 4] {
        self.color.extend(self.intensity).to_array()
    }
}

/// Orthographic shadow camera attached to the key light
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowCamera {
    pub enabled: bool,
    pub map_size: u32,
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
    pub bias: f32,
    pub normal_bias: f32,
}

/// All lights of the scene
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub key: DirectionalLight,
    pub fills: Vec<DirectionalLight>,
    pub point_position: Vec3,
    pub point_color: Vec3,
    pub point_intensity: f32,
    pub shadow: ShadowCamera,
}

impl LightRig {
    pub fn from_config(config: &LightsConfig) -> Self {
        if config.fills.len() > MAX_FILL_LIGHTS {
            tracing::warn!(
                "{} fill lights configured, only the first {} are used",
                config.fills.len(),
                MAX_FILL_LIGHTS
            );
        }
        Self {
            ambient_color: Vec3::from(hex_to_linear(config.ambient_color)),
            ambient_intensity: config.ambient_intensity,
            key: DirectionalLight::from_config(&config.key),
            fills: config
                .fills
                .iter()
                .take(MAX_FILL_LIGHTS)
                .map(DirectionalLight::from_config)
                .collect(),
            point_position: config.point.position,
            point_color: Vec3::from(hex_to_linear(config.point.color)),
            point_intensity: config.point.intensity,
            shadow: ShadowCamera {
                enabled: config.shadow.enabled,
                map_size: config.shadow.map_size,
                half_extent: config.shadow.half_extent,
                near: config.shadow.near,
                far: config.shadow.far,
                bias: config.shadow.bias,
                normal_bias: config.shadow.normal_bias,
            },
        }
    }

    /// The key light's view, from its position toward the origin
    pub fn shadow_view(&self) -> Mat4 {
        let up = if self.key.direction().abs().y > 0.99 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.key.position, Vec3::ZERO, up)
    }

    pub fn shadow_projection(&self) -> Mat4 {
        let e = self.shadow.half_extent;
        Mat4::orthographic_rh(-e, e, -e, e, self.shadow.near, self.shadow.far)
    }

    pub fn shadow_view_projection(&self) -> Mat4 {
        self.shadow_projection() * self.shadow_view()
    }

    /// Get the uniform data for GPU
    pub fn uniform(&self) -> LightUniform {
        let mut fill_directions = [[0.0; 4]; MAX_FILL_LIGHTS];
        let mut fill_colors = [[0.0; 4]; MAX_FILL_LIGHTS];
        for (i, fill) in self.fills.iter().take(MAX_FILL_LIGHTS).enumerate() {
            fill_directions[i] = fill.direction().extend(0.0).to_array();
            fill_colors[i] = fill.color_intensity();
        }

        let map_size = self.shadow.map_size.max(1) as f32;

        LightUniform {
            light_view_proj: self.shadow_view_projection().to_cols_array_2d(),
            key_direction: self.key.direction().extend(0.0).to_array(),
            key_color: self.key.color_intensity(),
            fill_directions,
            fill_colors,
            point_position: self.point_position.extend(1.0).to_array(),
            point_color: self.point_color.extend(self.point_intensity).to_array(),
            ambient: self.ambient_color.extend(self.ambient_intensity).to_array(),
            shadow_params: [
                self.shadow.bias,
                self.shadow.normal_bias,
                1.0 / map_size,
                if self.shadow.enabled { 1.0 } else { 0.0 },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_size() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 208);
    }

    #[test]
    fn test_default_rig() {
        let rig = LightRig::from_config(&LightsConfig::default());
        assert_eq!(rig.fills.len(), 2);
        assert_relative_eq!(rig.key.intensity, 1.2);
        assert_relative_eq!(rig.ambient_intensity, 0.8);

        let uniform = rig.uniform();
        assert_relative_eq!(uniform.fill_colors[0][3], 0.6);
        assert_relative_eq!(uniform.fill_colors[1][3], 0.4);
        assert_relative_eq!(uniform.point_color[3], 0.3);
        assert_eq!(uniform.shadow_params[3], 1.0);
    }

    #[test]
    fn test_key_direction_points_at_light() {
        let rig = LightRig::from_config(&LightsConfig::default());
        let dir = rig.key.direction();
        assert_relative_eq!(dir.length(), 1.0, epsilon = 1e-6);
        assert!(dir.dot(Vec3::new(5.0, 10.0, 7.0)) > 0.0);
    }

    #[test]
    fn test_origin_inside_shadow_frustum() {
        let rig = LightRig::from_config(&LightsConfig::default());
        let clip = rig.shadow_view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn test_extra_fills_are_dropped() {
        let mut config = LightsConfig::default();
        config.fills.push(config.key.clone());
        let rig = LightRig::from_config(&config);
        assert_eq!(rig.fills.len(), MAX_FILL_LIGHTS);
    }
}
