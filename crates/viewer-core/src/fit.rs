//! Camera and helper placement derived from a model's bounding box
//!
//! These functions are pure: they take the configuration and a bounding box
//! and return where things go. The controller applies the results.

use glam::Vec3;

use crate::bounds::BoundingBox;
use crate::config::ViewerConfig;

/// Models larger than this are viewed from further away
pub const LARGE_MODEL_DIMENSION: f32 = 10.0;
/// Models smaller than this are viewed from closer
pub const SMALL_MODEL_DIMENSION: f32 = 1.0;

pub const LARGE_MODEL_MULTIPLIER: f32 = 2.0;
pub const SMALL_MODEL_MULTIPLIER: f32 = 0.5;
pub const DEFAULT_MULTIPLIER: f32 = 1.5;

/// Height of the camera above the model center after a fit
pub const CAMERA_HEIGHT_OFFSET: f32 = 2.0;

/// Camera position and orbit target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

/// Vertical placement of the grid and axes helpers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelperPlacement {
    pub grid_y: f32,
    pub axes_y: f32,
}

impl HelperPlacement {
    /// Placement before any model is loaded
    pub fn initial(config: &ViewerConfig) -> Self {
        Self {
            grid_y: config.grid.initial_y,
            axes_y: 0.0,
        }
    }
}

/// Everything that changes when a freshly loaded model is placed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelFit {
    /// Position to assign to the model so its center sits at the origin
    pub model_position: Vec3,
    /// Bounds before centering
    pub original_bounds: BoundingBox,
    /// Bounds after centering
    pub bounds: BoundingBox,
    pub helpers: HelperPlacement,
    pub camera: CameraPose,
}

/// Size-dependent distance multiplier.
///
/// Both thresholds are exclusive: a largest dimension of exactly 10 or 1
/// uses the default multiplier.
pub fn distance_multiplier(max_dimension: f32) -> f32 {
    if max_dimension > LARGE_MODEL_DIMENSION {
        LARGE_MODEL_MULTIPLIER
    } else if max_dimension < SMALL_MODEL_DIMENSION {
        SMALL_MODEL_MULTIPLIER
    } else {
        DEFAULT_MULTIPLIER
    }
}

/// Distance at which a sphere-ish object of `max_dimension` fills the
/// vertical field of view, before any multiplier.
pub fn base_camera_distance(max_dimension: f32, fov_y_radians: f32) -> f32 {
    (max_dimension / 2.0 / (fov_y_radians / 2.0).tan()).abs()
}

/// Camera Z used right after loading: base distance with the size multiplier
pub fn fitted_camera_distance(max_dimension: f32, fov_y_radians: f32) -> f32 {
    base_camera_distance(max_dimension, fov_y_radians) * distance_multiplier(max_dimension)
}

/// Grid and axes heights for a model with the given (centered) bounds
pub fn place_helpers(bounds: &BoundingBox, grid_margin: f32) -> HelperPlacement {
    HelperPlacement {
        grid_y: bounds.min.y - grid_margin,
        axes_y: bounds.min.y,
    }
}

/// Camera pose looking at `bounds` from `distance` along +Z
pub fn camera_pose(bounds: &BoundingBox, distance: f32) -> CameraPose {
    let center = bounds.center();
    CameraPose {
        position: Vec3::new(0.0, center.y + CAMERA_HEIGHT_OFFSET, distance),
        target: center,
    }
}

/// Place a freshly loaded model.
///
/// `current_position` is the model's position at load time and
/// `world_bounds` its bounds at that position. The returned position puts
/// the bounding-box center at the origin.
pub fn fit_model(
    config: &ViewerConfig,
    world_bounds: &BoundingBox,
    current_position: Vec3,
) -> ModelFit {
    let original_center = world_bounds.center();
    let size = world_bounds.size();
    let model_position = -original_center;

    // Re-derive bounds at the new position rather than assuming a perfect center
    let bounds = world_bounds.translated(model_position - current_position);
    let helpers = place_helpers(&bounds, config.grid.margin);

    let max_dimension = size.max_element();
    let distance = fitted_camera_distance(max_dimension, config.fov_radians());
    let camera = camera_pose(&bounds, distance);

    tracing::debug!(
        ?original_center,
        ?size,
        new_min_y = bounds.min.y,
        grid_y = helpers.grid_y,
        camera_z = distance,
        "Fitted model to view"
    );

    ModelFit {
        model_position,
        original_bounds: *world_bounds,
        bounds,
        helpers,
        camera,
    }
}

/// Camera pose for a view reset.
///
/// Uses the current (already centered) bounds and always the default
/// multiplier; the orbit target goes back to the configured default.
pub fn reset_pose(config: &ViewerConfig, bounds: Option<&BoundingBox>) -> CameraPose {
    match bounds {
        Some(bounds) => {
            let distance = base_camera_distance(bounds.max_dimension(), config.fov_radians())
                * DEFAULT_MULTIPLIER;
            CameraPose {
                position: camera_pose(bounds, distance).position,
                target: config.camera.target,
            }
        }
        None => CameraPose {
            position: config.camera.initial_position,
            target: config.camera.target,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance_multiplier_boundaries() {
        assert_eq!(distance_multiplier(10.5), 2.0);
        assert_eq!(distance_multiplier(10.0), 1.5);
        assert_eq!(distance_multiplier(5.0), 1.5);
        assert_eq!(distance_multiplier(1.0), 1.5);
        assert_eq!(distance_multiplier(0.99), 0.5);
        assert_eq!(distance_multiplier(0.0), 0.5);
    }

    #[test]
    fn test_place_helpers() {
        let bounds = BoundingBox::new(Vec3::new(-1.0, -3.25, -1.0), Vec3::new(1.0, 3.25, 1.0));
        let helpers = place_helpers(&bounds, 0.5);
        assert_eq!(helpers.grid_y, -3.75);
        assert_eq!(helpers.axes_y, -3.25);
    }

    #[test]
    fn test_fit_model_reference_box() {
        let config = ViewerConfig::new();
        let bounds = BoundingBox::new(Vec3::new(-2.0, 0.0, -1.0), Vec3::new(2.0, 4.0, 1.0));

        let fit = fit_model(&config, &bounds, Vec3::ZERO);

        assert_eq!(fit.model_position, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(fit.bounds.min.y, -2.0);
        assert_eq!(fit.helpers.grid_y, -2.5);
        assert_eq!(fit.helpers.axes_y, -2.0);

        let expected_z = (4.0 / 2.0 / (45.0_f32.to_radians() / 2.0).tan()) * 1.5;
        assert_relative_eq!(fit.camera.position.z, expected_z, epsilon = 1e-5);
        assert_relative_eq!(fit.camera.position.z, 7.2426, epsilon = 1e-3);
        assert_eq!(fit.camera.position.x, 0.0);
        assert_relative_eq!(fit.camera.position.y, 2.0, epsilon = 1e-6);
        assert_eq!(fit.camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_fit_model_large_and_small() {
        let config = ViewerConfig::new();
        let fov = config.fov_radians();

        let large = BoundingBox::new(Vec3::splat(-10.0), Vec3::splat(10.0));
        let fit = fit_model(&config, &large, Vec3::ZERO);
        assert_relative_eq!(
            fit.camera.position.z,
            base_camera_distance(20.0, fov) * 2.0,
            epsilon = 1e-4
        );

        let small = BoundingBox::new(Vec3::splat(0.0), Vec3::splat(0.4));
        let fit = fit_model(&config, &small, Vec3::ZERO);
        assert_relative_eq!(
            fit.camera.position.z,
            base_camera_distance(0.4, fov) * 0.5,
            epsilon = 1e-6
        );
        assert_relative_eq!(fit.bounds.center().x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_fit_model_accounts_for_existing_position() {
        let config = ViewerConfig::new();
        // Model already shifted by +1 on X; its world bounds include that shift
        let bounds = BoundingBox::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0));
        let fit = fit_model(&config, &bounds, Vec3::new(1.0, 0.0, 0.0));
        // The position is assigned, not accumulated
        assert_eq!(fit.model_position, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(fit.bounds.center(), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(fit.helpers.axes_y, fit.bounds.min.y);
    }

    #[test]
    fn test_reset_pose_uses_default_multiplier() {
        let config = ViewerConfig::new();
        let bounds = BoundingBox::new(Vec3::splat(-20.0), Vec3::splat(20.0));
        let pose = reset_pose(&config, Some(&bounds));
        assert_relative_eq!(
            pose.position.z,
            base_camera_distance(40.0, config.fov_radians()) * 1.5,
            epsilon = 1e-4
        );
        assert_eq!(pose.target, config.camera.target);
    }

    #[test]
    fn test_reset_pose_without_model() {
        let config = ViewerConfig::new();
        let pose = reset_pose(&config, None);
        assert_eq!(pose.position, config.camera.initial_position);
        assert_eq!(pose.target, Vec3::ZERO);
    }
}
