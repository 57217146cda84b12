//! Viewer controller
//!
//! Owns the view state, the camera, the orbit controls and the loaded model.
//! Everything here runs on the UI thread and touches no GPU resources; the
//! viewport reads the controller each frame and mirrors it into the renderer.

use glam::Vec2;

use viewer_core::{
    BoundingBox, HelperPlacement, LoadError, LoadEvent, LoadStatus, Model, ViewerAction,
    ViewerConfig, ViewerState, fit_model, format_percent, reset_pose,
};
use viewer_renderer::{Camera, OrbitControls};

pub struct ViewerController {
    config: ViewerConfig,
    state: ViewerState,
    camera: Camera,
    controls: OrbitControls,
    model: Option<Model>,
    bounds: Option<BoundingBox>,
    helpers: HelperPlacement,
    status: LoadStatus,
    model_changed: bool,
}

impl ViewerController {
    pub fn new(config: ViewerConfig) -> Self {
        let camera = Camera::from_config(&config.camera, 1.0);
        let mut controls = OrbitControls::new(&config.controls, &camera);
        let state = ViewerState::new(config.controls.auto_rotate_speed);
        controls.auto_rotate = state.auto_rotating;
        controls.auto_rotate_speed = state.auto_rotate_speed;
        let helpers = HelperPlacement::initial(&config);

        Self {
            config,
            state,
            camera,
            controls,
            model: None,
            bounds: None,
            helpers,
            status: LoadStatus::Loading,
            model_changed: false,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Bounds of the placed model
    pub fn bounds(&self) -> Option<&BoundingBox> {
        self.bounds.as_ref()
    }

    pub fn helpers(&self) -> HelperPlacement {
        self.helpers
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Whether a new model was placed since the last call
    pub fn take_model_changed(&mut self) -> bool {
        std::mem::take(&mut self.model_changed)
    }

    pub fn handle_action(&mut self, action: ViewerAction) {
        match action {
            ViewerAction::ToggleGrid => {
                let visible = self.state.toggle_grid();
                tracing::debug!("Grid visible: {}", visible);
            }
            ViewerAction::ToggleAutoRotate => {
                let rotating = self.state.toggle_auto_rotate();
                self.controls.auto_rotate = rotating;
                self.controls.auto_rotate_speed = self.state.auto_rotate_speed;
                tracing::debug!("Auto-rotate: {}", rotating);
            }
            ViewerAction::ResetView => self.reset_view(),
            ViewerAction::ZoomIn => self.controls.dolly_in(self.zoom_scale()),
            ViewerAction::ZoomOut => self.controls.dolly_out(self.zoom_scale()),
        }
    }

    /// Dolly scale of one zoom step
    fn zoom_scale(&self) -> f32 {
        (1.0 - self.config.controls.zoom_step).clamp(0.05, 1.0)
    }

    /// Refit the camera to the current bounds and stop all motion
    pub fn reset_view(&mut self) {
        let pose = reset_pose(&self.config, self.bounds.as_ref());
        self.camera.position = pose.position;
        self.camera.target = pose.target;
        self.controls.target = pose.target;
        self.controls.stop();

        self.state.reset();
        self.controls.auto_rotate = false;
        tracing::debug!("View reset, camera at {:?}", pose.position);
    }

    pub fn handle_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Progress(fraction) => {
                tracing::debug!("Loading model: {}", format_percent(fraction));
                if self.status.is_pending() {
                    self.status = LoadStatus::Progress(fraction);
                }
            }
            LoadEvent::Loaded(model) => self.place_model(model),
            LoadEvent::Failed(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: LoadError) {
        let message = err.user_message();
        tracing::error!("{}", message);
        self.status = LoadStatus::Failed(message);
    }

    fn place_model(&mut self, mut model: Model) {
        model.prepare_for_display();

        let world_bounds = match model.bounds() {
            Some(bounds) if !model.is_empty() => bounds,
            _ => {
                self.fail(LoadError::EmptyModel);
                return;
            }
        };

        let fit = fit_model(&self.config, &world_bounds, model.position);
        model.position = fit.model_position;

        self.camera.position = fit.camera.position;
        self.camera.target = fit.camera.target;
        self.controls.target = fit.camera.target;
        self.controls.stop();

        tracing::info!(
            "Model loaded: {} meshes, {} triangles",
            model.meshes.len(),
            model.triangle_count()
        );

        self.bounds = Some(fit.bounds);
        self.helpers = fit.helpers;
        self.model = Some(model);
        self.model_changed = true;
        self.status = LoadStatus::Ready;
    }

    /// Match the camera to a new viewport size. Zero sizes are ignored.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        self.camera.set_viewport(width, height)
    }

    pub fn rotate_drag(&mut self, delta: Vec2, viewport_height: f32) {
        self.controls.handle_rotate_drag(delta, viewport_height);
    }

    pub fn pan_drag(&mut self, delta: Vec2, viewport_height: f32) {
        self.controls
            .handle_pan_drag(&self.camera, delta, viewport_height);
    }

    pub fn wheel(&mut self, delta: f32) {
        self.controls.handle_wheel(delta);
    }

    /// Advance controls by one frame
    pub fn update(&mut self) {
        self.controls.update(&mut self.camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec3;
    use viewer_core::ModelMesh;

    fn reference_model() -> Model {
        Model::new(vec![ModelMesh::new(
            "reference",
            vec![[-2.0, 0.0, -1.0], [2.0, 4.0, 1.0], [2.0, 0.0, -1.0]],
            vec![0, 1, 2],
        )])
    }

    fn loaded_controller() -> ViewerController {
        let mut controller = ViewerController::new(ViewerConfig::new());
        controller.handle_load_event(LoadEvent::Loaded(reference_model()));
        controller
    }

    #[test]
    fn test_initial_state() {
        let controller = ViewerController::new(ViewerConfig::new());
        assert!(controller.state().grid_visible);
        assert!(!controller.state().auto_rotating);
        assert_eq!(controller.helpers().grid_y, -10.0);
        assert_eq!(controller.helpers().axes_y, 0.0);
        assert_eq!(controller.camera().position, Vec3::new(0.0, 5.0, 15.0));
        assert!(controller.status().is_pending());
    }

    #[test]
    fn test_load_fits_reference_model() {
        let mut controller = loaded_controller();

        let model = controller.model().expect("model placed");
        assert_eq!(model.position, Vec3::new(0.0, -2.0, 0.0));

        let bounds = controller.bounds().expect("bounds");
        assert_relative_eq!(bounds.min.y, -2.0, epsilon = 1e-5);

        assert_relative_eq!(controller.helpers().grid_y, -2.5, epsilon = 1e-5);
        assert_relative_eq!(controller.helpers().axes_y, -2.0, epsilon = 1e-5);

        let expected_z = (4.0 / 2.0 / (45f32.to_radians() / 2.0).tan()) * 1.5;
        let camera = controller.camera();
        assert_relative_eq!(camera.position.z, expected_z, epsilon = 1e-4);
        assert_relative_eq!(camera.position.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(camera.position.x, 0.0);
        assert_relative_eq!(controller.controls().target.length(), 0.0, epsilon = 1e-5);

        assert_eq!(controller.status(), &LoadStatus::Ready);
        assert!(controller.take_model_changed());
        assert!(!controller.take_model_changed());
    }

    #[test]
    fn test_load_prepares_meshes() {
        let controller = loaded_controller();
        let mesh = &controller.model().expect("model").meshes[0];
        assert!(mesh.material.double_sided);
        assert!(mesh.material.transparent);
        assert_eq!(mesh.material.opacity, 1.0);
        assert!(mesh.cast_shadow && mesh.receive_shadow);
    }

    #[test]
    fn test_grid_toggle_parity() {
        for n in 0..7 {
            let mut controller = ViewerController::new(ViewerConfig::new());
            for _ in 0..n {
                controller.handle_action(ViewerAction::ToggleGrid);
            }
            assert_eq!(controller.state().grid_visible, n % 2 == 0);
        }
    }

    #[test]
    fn test_auto_rotate_drives_controls() {
        let mut controller = ViewerController::new(ViewerConfig::new());
        controller.handle_action(ViewerAction::ToggleAutoRotate);
        assert!(controller.state().auto_rotating);
        assert!(controller.controls().auto_rotate);
        assert_eq!(controller.controls().auto_rotate_speed, 0.5);

        let before = controller.camera().position;
        controller.update();
        assert!(controller.camera().position.distance(before) > 0.0);

        controller.handle_action(ViewerAction::ToggleAutoRotate);
        assert!(!controller.controls().auto_rotate);
    }

    #[test]
    fn test_reset_stops_rotation() {
        let mut controller = loaded_controller();
        controller.handle_action(ViewerAction::ToggleAutoRotate);
        controller.rotate_drag(Vec2::new(200.0, 50.0), 600.0);
        controller.update();

        controller.handle_action(ViewerAction::ResetView);
        assert!(!controller.state().auto_rotating);
        assert!(!controller.controls().auto_rotate);
        assert!(!controller.controls().is_moving());

        let expected_z = (4.0 / 2.0 / (45f32.to_radians() / 2.0).tan()) * 1.5;
        assert_relative_eq!(controller.camera().position.z, expected_z, epsilon = 1e-4);
        assert_eq!(controller.camera().target, Vec3::ZERO);
    }

    #[test]
    fn test_reset_without_model_returns_to_initial_pose() {
        let mut controller = ViewerController::new(ViewerConfig::new());
        controller.wheel(1.0);
        controller.update();
        controller.handle_action(ViewerAction::ResetView);
        assert_eq!(controller.camera().position, Vec3::new(0.0, 5.0, 15.0));
        assert!(!controller.state().auto_rotating);
    }

    #[test]
    fn test_zoom_steps() {
        let mut controller = ViewerController::new(ViewerConfig::new());
        let start = controller.camera().distance();

        controller.handle_action(ViewerAction::ZoomIn);
        controller.update();
        assert_relative_eq!(controller.camera().distance(), start * 0.8, epsilon = 1e-3);

        controller.handle_action(ViewerAction::ZoomOut);
        controller.update();
        assert_relative_eq!(controller.camera().distance(), start, epsilon = 1e-3);
    }

    #[test]
    fn test_resize_sets_aspect() {
        let mut controller = ViewerController::new(ViewerConfig::new());
        assert!(controller.resize(1200.0, 800.0));
        assert_relative_eq!(controller.camera().aspect, 1.5);
        assert!(!controller.resize(0.0, 800.0));
        assert_relative_eq!(controller.camera().aspect, 1.5);
    }

    #[test]
    fn test_progress_then_failure() {
        let mut controller = ViewerController::new(ViewerConfig::new());
        controller.handle_load_event(LoadEvent::Progress(0.25));
        assert_eq!(controller.status(), &LoadStatus::Progress(0.25));

        controller.handle_load_event(LoadEvent::Failed(LoadError::Fetch("404".into())));
        match controller.status() {
            LoadStatus::Failed(message) => assert!(message.starts_with("Failed to load model: ")),
            other => panic!("unexpected status {:?}", other),
        }
        assert!(controller.model().is_none());
        assert_eq!(controller.helpers().grid_y, -10.0);
    }

    #[test]
    fn test_setup_failure_message() {
        let mut controller = ViewerController::new(ViewerConfig::new());
        controller.handle_load_event(LoadEvent::Failed(LoadError::Setup("no window".into())));
        assert_eq!(
            controller.status(),
            &LoadStatus::Failed("Load error: no window".into())
        );
    }

    #[test]
    fn test_empty_model_fails() {
        let mut controller = ViewerController::new(ViewerConfig::new());
        controller.handle_load_event(LoadEvent::Loaded(Model::default()));
        assert!(matches!(controller.status(), LoadStatus::Failed(_)));
        assert!(!controller.take_model_changed());
    }
}
