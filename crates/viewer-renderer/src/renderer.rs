//! Main renderer

use glam::Vec3;
use wgpu::util::DeviceExt;

use viewer_core::{Model, ViewerConfig, hex_to_linear, hex_to_srgb};

use crate::axis::{AxisInstance, AxisRenderer};
use crate::camera::{Camera, CameraUniform};
use crate::constants::DEPTH_FORMAT;
use crate::gpu_resources::{
    create_camera_bind_group_layout, create_depth_texture, create_light_bind_group,
    create_light_bind_group_layout, create_msaa_texture, create_shadow_sampler,
    create_shadow_texture, create_transform_bind_group_layout, create_uniform_bind_group,
};
use crate::grid::GridRenderer;
use crate::light::LightRig;
use crate::mesh::ModelRenderer;

/// Sample counts every backend (including WebGL2) accepts are 1 and 4
pub fn supported_sample_count(requested: u32) -> u32 {
    if requested > 1 { 4 } else { 1 }
}

/// Clear color for the background.
///
/// Clears bypass the shaders, so a non-sRGB target gets the encoded value
/// directly and an sRGB target gets the linear one.
pub fn background_clear_color(hex: u32, gamma_encode: bool) -> wgpu::Color {
    let [r, g, b] = if gamma_encode {
        hex_to_srgb(hex)
    } else {
        hex_to_linear(hex)
    };
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

/// Scene-wide shading settings carried by the camera uniform
#[derive(Debug, Clone, Copy, PartialEq)]
struct OutputSettings {
    fog_color: [f32; 3],
    fog_near: f32,
    fog_far: f32,
    exposure: f32,
    gamma_encode: bool,
}

/// Main renderer for the model viewer
pub struct Renderer {
    format: wgpu::TextureFormat,
    sample_count: u32,
    width: u32,
    height: u32,

    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    msaa_texture: Option<(wgpu::Texture, wgpu::TextureView)>,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    output: OutputSettings,
    clear_color: wgpu::Color,

    _light_buffer: wgpu::Buffer,
    light_bind_group: wgpu::BindGroup,
    shadow_light_bind_group: wgpu::BindGroup,
    _shadow_texture: wgpu::Texture,
    shadow_view: wgpu::TextureView,
    shadows_enabled: bool,

    grid: GridRenderer,
    axis: AxisRenderer,
    model: ModelRenderer,
}

impl Renderer {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: &ViewerConfig,
    ) -> Self {
        let sample_count = supported_sample_count(config.renderer.msaa_samples);
        let gamma_encode = !format.is_srgb();

        let camera_bind_group_layout = create_camera_bind_group_layout(device);
        let transform_bind_group_layout = create_transform_bind_group_layout(device);
        let light_bind_group_layout = create_light_bind_group_layout(device);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(&CameraUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = create_uniform_bind_group(
            device,
            "Camera Bind Group",
            &camera_bind_group_layout,
            &camera_buffer,
        );

        let lights = LightRig::from_config(&config.lights);
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::bytes_of(&lights.uniform()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let (shadow_texture, shadow_view) = create_shadow_texture(device, lights.shadow.map_size);
        let shadow_sampler = create_shadow_sampler(device);
        let light_bind_group = create_light_bind_group(
            device,
            &light_bind_group_layout,
            &light_buffer,
            &shadow_view,
            &shadow_sampler,
        );
        let shadow_light_bind_group = create_uniform_bind_group(
            device,
            "Shadow Light Bind Group",
            &transform_bind_group_layout,
            &light_buffer,
        );

        let (depth_texture, depth_view) = create_depth_texture(device, width, height, sample_count);
        let msaa_texture = create_msaa_texture(device, format, width, height, sample_count);

        let grid = GridRenderer::new(
            device,
            format,
            DEPTH_FORMAT,
            sample_count,
            &camera_bind_group_layout,
            &camera_buffer,
            &transform_bind_group_layout,
            &config.grid,
        );

        let axis = AxisRenderer::new(
            device,
            format,
            DEPTH_FORMAT,
            sample_count,
            &camera_bind_group_layout,
            &camera_buffer,
            AxisInstance::at_height(0.0, config.axes.size),
        );

        let model = ModelRenderer::new(
            device,
            format,
            DEPTH_FORMAT,
            sample_count,
            &camera_bind_group_layout,
            &light_bind_group_layout,
            &transform_bind_group_layout,
        );

        tracing::info!(
            "Renderer created: {:?}, {}x{}, {}x MSAA",
            format,
            width,
            height,
            sample_count
        );

        Self {
            format,
            sample_count,
            width: width.max(1),
            height: height.max(1),
            _depth_texture: depth_texture,
            depth_view,
            msaa_texture,
            camera_buffer,
            camera_bind_group,
            output: OutputSettings {
                fog_color: hex_to_linear(config.scene.fog_color),
                fog_near: config.scene.fog_near,
                fog_far: config.scene.fog_far,
                exposure: config.renderer.tone_mapping_exposure,
                gamma_encode,
            },
            clear_color: background_clear_color(config.scene.background, gamma_encode),
            _light_buffer: light_buffer,
            light_bind_group,
            shadow_light_bind_group,
            _shadow_texture: shadow_texture,
            shadow_view,
            shadows_enabled: lights.shadow.enabled,
            grid,
            axis,
            model,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        let (depth_texture, depth_view) =
            create_depth_texture(device, width, height, self.sample_count);
        self._depth_texture = depth_texture;
        self.depth_view = depth_view;
        self.msaa_texture =
            create_msaa_texture(device, self.format, width, height, self.sample_count);
    }

    /// Camera uniform including fog and output settings
    pub fn camera_uniform(&self, camera: &Camera) -> CameraUniform {
        let output = &self.output;
        CameraUniform {
            fog_color: [
                output.fog_color[0],
                output.fog_color[1],
                output.fog_color[2],
                1.0,
            ],
            fog_params: [
                output.fog_near,
                output.fog_far,
                output.exposure,
                if output.gamma_encode { 1.0 } else { 0.0 },
            ],
            ..camera.uniform()
        }
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &Camera) {
        let uniform = self.camera_uniform(camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// Replace the displayed model
    pub fn set_model(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, model: &Model) {
        self.model.set_model(device, queue, model);
    }

    pub fn set_model_position(&mut self, queue: &wgpu::Queue, position: Vec3) {
        self.model.set_position(queue, position);
    }

    /// Move the grid to `y` and show or hide it
    pub fn set_grid(&mut self, queue: &wgpu::Queue, y: f32, visible: bool) {
        if self.grid.height() != y {
            self.grid.set_height(queue, y);
        }
        self.grid.set_visible(visible);
    }

    pub fn set_axes_height(&mut self, queue: &wgpu::Queue, y: f32) {
        if self.axis.instance().transform[3][1] != y {
            self.axis.set_height(queue, y);
        }
    }

    fn render_shadow_pass(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.shadow_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        if self.shadows_enabled {
            self.model
                .render_shadow(&mut shadow_pass, &self.shadow_light_bind_group);
        }
    }

    /// Render the scene into `view`, which must match `format()` and the last resize
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        self.render_shadow_pass(encoder);

        let (color_view, resolve_target) = match &self.msaa_texture {
            Some((_, msaa_view)) => (msaa_view, Some(view)),
            None => (view, None),
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Main Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.grid.render(&mut render_pass);
        self.axis.render(&mut render_pass);
        self.model
            .render(&mut render_pass, &self.camera_bind_group, &self.light_bind_group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_supported_sample_count() {
        assert_eq!(supported_sample_count(0), 1);
        assert_eq!(supported_sample_count(1), 1);
        assert_eq!(supported_sample_count(4), 4);
        assert_eq!(supported_sample_count(8), 4);
    }

    #[test]
    fn test_background_clear_color() {
        let encoded = background_clear_color(0xf8f9fa, true);
        assert_relative_eq!(encoded.r, 248.0 / 255.0, epsilon = 1e-6);
        assert_relative_eq!(encoded.b, 250.0 / 255.0, epsilon = 1e-6);
        assert_eq!(encoded.a, 1.0);

        let linear = background_clear_color(0xf8f9fa, false);
        assert!(linear.r < encoded.r);
        assert!(linear.r > 0.9);
    }
}
