//! Viewport rendering state

use std::sync::Arc;

use viewer_core::ViewerConfig;
use viewer_renderer::Renderer;
use viewer_renderer::gpu_resources::create_color_target;

use crate::controller::ViewerController;

/// Render texture for viewport
struct RenderTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    egui_texture_id: egui::TextureId,
    width: u32,
    height: u32,
}

/// Physical pixel size of a viewport, with the pixel ratio capped
pub fn render_size(
    size_points: egui::Vec2,
    pixels_per_point: f32,
    max_pixel_ratio: f32,
) -> (u32, u32) {
    let ratio = pixels_per_point.min(max_pixel_ratio).max(0.0);
    (
        (size_points.x * ratio).round().max(0.0) as u32,
        (size_points.y * ratio).round().max(0.0) as u32,
    )
}

/// Viewport rendering state
pub struct ViewportState {
    pub renderer: Renderer,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    render_texture: Option<RenderTexture>,
}

impl ViewportState {
    /// Create a new viewport state
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        config: &ViewerConfig,
    ) -> Self {
        let renderer = Renderer::new(&device, format, 800, 600, config);
        Self {
            renderer,
            device,
            queue,
            render_texture: None,
        }
    }

    /// Ensure the render texture matches the requested size.
    ///
    /// Returns `None` for a zero-sized viewport, keeping the previous texture.
    pub fn ensure_texture(
        &mut self,
        width: u32,
        height: u32,
        egui_renderer: &mut egui_wgpu::Renderer,
    ) -> Option<egui::TextureId> {
        if width == 0 || height == 0 {
            return None;
        }

        let needs_recreate = self
            .render_texture
            .as_ref()
            .is_none_or(|t| t.width != width || t.height != height);

        if needs_recreate {
            if let Some(old) = self.render_texture.take() {
                egui_renderer.free_texture(&old.egui_texture_id);
            }

            let (texture, view) =
                create_color_target(&self.device, self.renderer.format(), width, height);

            let egui_texture_id = egui_renderer.register_native_texture(
                &self.device,
                &view,
                wgpu::FilterMode::Linear,
            );

            self.renderer.resize(&self.device, width, height);
            tracing::debug!("Viewport resized to {}x{}", width, height);

            self.render_texture = Some(RenderTexture {
                _texture: texture,
                view,
                egui_texture_id,
                width,
                height,
            });
        }

        self.render_texture.as_ref().map(|t| t.egui_texture_id)
    }

    /// Upload a newly placed model
    pub fn set_model(&mut self, model: &viewer_core::Model) {
        self.renderer.set_model(&self.device, &self.queue, model);
    }

    /// Mirror the controller's camera, helpers and model placement
    pub fn sync(&mut self, controller: &ViewerController) {
        let queue = self.queue.clone();
        let helpers = controller.helpers();
        self.renderer.update_camera(&queue, controller.camera());
        self.renderer
            .set_grid(&queue, helpers.grid_y, controller.state().grid_visible);
        self.renderer.set_axes_height(&queue, helpers.axes_y);
        if let Some(model) = controller.model() {
            self.renderer.set_model_position(&queue, model.position);
        }
    }

    /// Render the 3D scene to the texture
    pub fn render(&mut self) {
        let Some(ref rt) = self.render_texture else {
            return;
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewport Render Encoder"),
            });

        self.renderer.render(&mut encoder, &rt.view);

        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_size_caps_pixel_ratio() {
        let size = egui::vec2(400.0, 300.0);
        assert_eq!(render_size(size, 1.0, 2.0), (400, 300));
        assert_eq!(render_size(size, 2.0, 2.0), (800, 600));
        assert_eq!(render_size(size, 3.0, 2.0), (800, 600));
    }

    #[test]
    fn test_render_size_zero() {
        assert_eq!(render_size(egui::vec2(0.0, 300.0), 2.0, 2.0), (0, 600));
        assert_eq!(render_size(egui::vec2(0.0, 300.0), 1.0, 2.0), (0, 300));
    }
}
