//! Viewer configuration
//!
//! All tunables of the viewer live here. The configuration is built once at
//! startup (defaults or a RON file) and is read-only afterwards.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Convert a `0xRRGGBB` color to linear RGB
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let [r, g, b] = hex_to_srgb(hex);
    [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b)]
}

/// Convert a `0xRRGGBB` color to sRGB-encoded components in `0.0..=1.0`
pub fn hex_to_srgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Scene background and fog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub background: u32,
    pub fog_color: u32,
    pub fog_near: f32,
    pub fog_far: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: 0xf8f9fa,
            fog_color: 0xf8f9fa,
            fog_near: 20.0,
            fog_far: 100.0,
        }
    }
}

/// Perspective camera
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view
    pub fov_degrees: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub initial_position: Vec3,
    /// Default orbit target, restored on reset
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            initial_position: Vec3::new(0.0, 5.0, 15.0),
            target: Vec3::ZERO,
        }
    }
}

/// Orbit controls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub screen_space_panning: bool,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Fraction of the orbit radius removed/added by one zoom button press
    pub zoom_step: f32,
    pub auto_rotate_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            screen_space_panning: true,
            min_distance: 0.5,
            max_distance: 100.0,
            min_polar_angle: 0.0,
            max_polar_angle: std::f32::consts::PI,
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: true,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            zoom_step: 0.2,
            auto_rotate_speed: 0.5,
        }
    }
}

/// Ground reference grid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub size: f32,
    pub divisions: u32,
    pub center_line_color: u32,
    pub line_color: u32,
    /// Height of the grid before a model has been placed
    pub initial_y: f32,
    /// Distance kept between the model's lowest point and the grid
    pub margin: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 50.0,
            divisions: 25,
            center_line_color: 0xcccccc,
            line_color: 0x888888,
            initial_y: -10.0,
            margin: 0.5,
        }
    }
}

/// Axes helper
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AxesConfig {
    pub size: f32,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self { size: 5.0 }
    }
}

/// A directional light shining from `position` toward the origin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectionalLightConfig {
    pub color: u32,
    pub intensity: f32,
    pub position: Vec3,
}

/// A point light
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointLightConfig {
    pub color: u32,
    pub intensity: f32,
    pub position: Vec3,
}

/// Shadow camera for the key light
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShadowConfig {
    pub enabled: bool,
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    /// Half extent of the orthographic shadow frustum
    pub half_extent: f32,
    pub bias: f32,
    pub normal_bias: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            map_size: 2048,
            near: 0.5,
            far: 500.0,
            half_extent: 50.0,
            bias: 0.0005,
            normal_bias: 0.02,
        }
    }
}

/// Lighting rig
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightsConfig {
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    /// Key light, the only shadow caster
    pub key: DirectionalLightConfig,
    pub fills: Vec<DirectionalLightConfig>,
    pub point: PointLightConfig,
    pub shadow: ShadowConfig,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            ambient_color: 0xffffff,
            ambient_intensity: 0.8,
            key: DirectionalLightConfig {
                color: 0xffffff,
                intensity: 1.2,
                position: Vec3::new(5.0, 10.0, 7.0),
            },
            fills: vec![
                DirectionalLightConfig {
                    color: 0xffffff,
                    intensity: 0.6,
                    position: Vec3::new(-5.0, 5.0, 5.0),
                },
                DirectionalLightConfig {
                    color: 0xffffff,
                    intensity: 0.4,
                    position: Vec3::new(0.0, -5.0, 5.0),
                },
            ],
            point: PointLightConfig {
                color: 0xffffff,
                intensity: 0.3,
                position: Vec3::new(0.0, 0.0, 10.0),
            },
            shadow: ShadowConfig::default(),
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RendererConfig {
    pub max_pixel_ratio: f32,
    pub tone_mapping_exposure: f32,
    pub msaa_samples: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_pixel_ratio: 2.0,
            tone_mapping_exposure: 1.2,
            msaa_samples: 4,
        }
    }
}

/// Model asset location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Path of the GLB file, relative to the page (web) or working directory
    pub model_path: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            model_path: "model.glb".to_string(),
        }
    }
}

/// Complete viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ViewerConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub axes: AxesConfig,
    #[serde(default)]
    pub lights: LightsConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub asset: AssetConfig,
}

impl ViewerConfig {
    /// Current configuration version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Default::default()
        }
    }

    /// Parse a configuration from RON text
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Serialize to pretty RON text
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Vertical field of view in radians
    pub fn fov_radians(&self) -> f32 {
        self.camera.fov_degrees.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_viewer_setup() {
        let config = ViewerConfig::new();
        assert_eq!(config.version, ViewerConfig::CURRENT_VERSION);
        assert_eq!(config.camera.fov_degrees, 45.0);
        assert_eq!(config.camera.initial_position, Vec3::new(0.0, 5.0, 15.0));
        assert_eq!(config.grid.divisions, 25);
        assert_eq!(config.grid.margin, 0.5);
        assert_eq!(config.controls.auto_rotate_speed, 0.5);
        assert_eq!(config.lights.fills.len(), 2);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = ViewerConfig::from_ron("(asset: (model_path: \"robot.glb\"))").unwrap();
        assert_eq!(config.asset.model_path, "robot.glb");
        assert_eq!(config.scene, SceneConfig::default());
        assert_eq!(config.controls.max_distance, 100.0);
    }

    #[test]
    fn test_ron_round_trip() {
        let mut config = ViewerConfig::new();
        config.grid.initial_y = -3.0;
        let text = config.to_ron().unwrap();
        assert_eq!(ViewerConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(hex_to_srgb(0xff0000), [1.0, 0.0, 0.0]);
        let linear = hex_to_linear(0x808080);
        assert!((linear[0] - 0.2158).abs() < 1e-3);
    }
}
