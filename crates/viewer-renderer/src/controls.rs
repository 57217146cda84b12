//! Orbit-style camera controls
//!
//! The camera orbits `target` on a sphere. Input accumulates into pending
//! rotation / pan / dolly deltas that `update` applies once per frame,
//! easing them out when damping is enabled.

use glam::{Vec2, Vec3};

use viewer_core::ControlsConfig;

use crate::camera::Camera;
use crate::constants::controls::{AUTO_ROTATE_STEP, POLAR_EPSILON, WHEEL_ZOOM_BASE};

/// Spherical coordinates around the Y axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y
    phi: f32,
    /// Azimuth around +Y, measured from +Z
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Orbit controls driving a [`Camera`]
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
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
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,

    spherical_delta: Spherical,
    pan_offset: Vec3,
    scale: f32,
}

impl OrbitControls {
    /// Create controls orbiting `camera`'s current target
    pub fn new(config: &ControlsConfig, camera: &Camera) -> Self {
        Self {
            target: camera.target,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            screen_space_panning: config.screen_space_panning,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            min_polar_angle: config.min_polar_angle,
            max_polar_angle: config.max_polar_angle,
            enable_rotate: config.enable_rotate,
            enable_zoom: config.enable_zoom,
            enable_pan: config.enable_pan,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            auto_rotate: false,
            auto_rotate_speed: config.auto_rotate_speed,
            spherical_delta: Spherical::default(),
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }

    /// Drop pending rotation, pan and dolly
    pub fn stop(&mut self) {
        self.spherical_delta = Spherical::default();
        self.pan_offset = Vec3::ZERO;
        self.scale = 1.0;
    }

    /// Whether there is motion left to apply
    pub fn is_moving(&self) -> bool {
        self.spherical_delta.theta.abs() > f32::EPSILON
            || self.spherical_delta.phi.abs() > f32::EPSILON
            || self.pan_offset.length_squared() > f32::EPSILON
            || (self.scale - 1.0).abs() > f32::EPSILON
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Move closer: the orbit radius is multiplied by `dolly_scale` (< 1)
    pub fn dolly_in(&mut self, dolly_scale: f32) {
        if dolly_scale > 0.0 {
            self.scale *= dolly_scale;
        }
    }

    /// Move away: the orbit radius is divided by `dolly_scale` (< 1)
    pub fn dolly_out(&mut self, dolly_scale: f32) {
        if dolly_scale > 0.0 {
            self.scale /= dolly_scale;
        }
    }

    /// Pan by a world-space distance along the camera's right / up vectors
    pub fn pan(&mut self, camera: &Camera, right: f32, up: f32) {
        let view = camera.view_matrix().inverse();
        let x_axis = view.x_axis.truncate();
        let up_axis = if self.screen_space_panning {
            view.y_axis.truncate()
        } else {
            Vec3::Y.cross(x_axis)
        };
        self.pan_offset += x_axis * -right + up_axis * up;
    }

    /// Rotate from a pointer drag in pixels
    pub fn handle_rotate_drag(&mut self, delta: Vec2, viewport_height: f32) {
        if !self.enable_rotate || viewport_height <= 0.0 {
            return;
        }
        let scale = 2.0 * std::f32::consts::PI * self.rotate_speed / viewport_height;
        self.rotate_left(delta.x * scale);
        self.rotate_up(delta.y * scale);
    }

    /// Pan from a pointer drag in pixels
    pub fn handle_pan_drag(&mut self, camera: &Camera, delta: Vec2, viewport_height: f32) {
        if !self.enable_pan || viewport_height <= 0.0 {
            return;
        }
        // Half the visible height at the target distance
        let target_distance = camera.distance() * (camera.fov_y / 2.0).tan();
        let per_pixel = 2.0 * target_distance / viewport_height * self.pan_speed;
        self.pan(camera, delta.x * per_pixel, delta.y * per_pixel);
    }

    /// Dolly from a wheel/scroll delta (positive = scroll up = zoom in)
    pub fn handle_wheel(&mut self, delta: f32) {
        if !self.enable_zoom || delta == 0.0 {
            return;
        }
        let zoom_scale = WHEEL_ZOOM_BASE.powf(self.zoom_speed);
        if delta > 0.0 {
            self.dolly_in(zoom_scale);
        } else {
            self.dolly_out(zoom_scale);
        }
    }

    fn auto_rotation_angle(&self) -> f32 {
        AUTO_ROTATE_STEP * self.auto_rotate_speed
    }

    /// Apply one frame of pending motion to `camera`
    pub fn update(&mut self, camera: &mut Camera) {
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(offset);

        if self.auto_rotate {
            self.rotate_left(self.auto_rotation_angle());
        }

        if self.enable_damping {
            spherical.theta += self.spherical_delta.theta * self.damping_factor;
            spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }

        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON);

        spherical.radius =
            (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        camera.position = self.target + spherical.to_offset();
        camera.target = self.target;

        if self.enable_damping {
            self.spherical_delta.theta *= 1.0 - self.damping_factor;
            self.spherical_delta.phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }

        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn setup(damping: bool) -> (OrbitControls, Camera) {
        let camera = Camera::new(1.0);
        let config = ControlsConfig {
            enable_damping: damping,
            ..ControlsConfig::default()
        };
        (OrbitControls::new(&config, &camera), camera)
    }

    #[test]
    fn test_spherical_round_trip() {
        let offset = Vec3::new(3.0, 4.0, -2.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert_relative_eq!(back.x, offset.x, epsilon = 1e-5);
        assert_relative_eq!(back.y, offset.y, epsilon = 1e-5);
        assert_relative_eq!(back.z, offset.z, epsilon = 1e-5);
    }

    #[test]
    fn test_update_without_input_keeps_pose() {
        let (mut controls, mut camera) = setup(true);
        let before = camera.position;
        controls.update(&mut camera);
        assert_relative_eq!(camera.position.distance(before), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_dolly_in_moves_closer() {
        let (mut controls, mut camera) = setup(false);
        let before = camera.distance();
        controls.dolly_in(0.8);
        controls.update(&mut camera);
        assert_relative_eq!(camera.distance(), before * 0.8, epsilon = 1e-4);

        controls.dolly_out(0.8);
        controls.update(&mut camera);
        assert_relative_eq!(camera.distance(), before, epsilon = 1e-4);
    }

    #[test]
    fn test_distance_is_clamped() {
        let (mut controls, mut camera) = setup(false);
        controls.dolly_out(0.01);
        controls.update(&mut camera);
        assert_relative_eq!(camera.distance(), 100.0, epsilon = 1e-3);

        controls.dolly_in(0.0001);
        controls.update(&mut camera);
        assert_relative_eq!(camera.distance(), 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_auto_rotate_keeps_radius_and_height() {
        let (mut controls, mut camera) = setup(true);
        controls.auto_rotate = true;
        let radius = camera.distance();
        let height = camera.position.y;
        for _ in 0..120 {
            controls.update(&mut camera);
        }
        assert_relative_eq!(camera.distance(), radius, epsilon = 1e-3);
        assert_relative_eq!(camera.position.y, height, epsilon = 1e-3);
        assert!(camera.position.x.abs() > 1e-3);
    }

    #[test]
    fn test_damping_eases_out() {
        let (mut controls, mut camera) = setup(true);
        controls.rotate_left(1.0);
        controls.update(&mut camera);
        assert!(controls.is_moving());
        for _ in 0..1000 {
            controls.update(&mut camera);
        }
        assert!(!controls.is_moving());
    }

    #[test]
    fn test_polar_angle_stays_off_the_pole() {
        let (mut controls, mut camera) = setup(false);
        controls.rotate_up(10.0);
        controls.update(&mut camera);
        assert!(camera.position.is_finite());
        assert!(camera.position.y > 0.0);
        assert_relative_eq!(camera.distance(), 15.811388, epsilon = 1e-3);
    }

    #[test]
    fn test_stop_drops_pending_motion() {
        let (mut controls, mut camera) = setup(true);
        controls.rotate_left(0.7);
        controls.handle_wheel(1.0);
        assert!(controls.is_moving());

        controls.stop();
        let before = camera.position;
        controls.update(&mut camera);
        assert!(!controls.is_moving());
        assert_relative_eq!(camera.position.distance(before), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_pan_moves_target() {
        let (mut controls, mut camera) = setup(false);
        controls.handle_pan_drag(&camera, Vec2::new(100.0, 0.0), 600.0);
        controls.update(&mut camera);
        assert!(controls.target.x < 0.0);
        assert_eq!(camera.target, controls.target);
    }
}
