//! Ground grid renderer

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use viewer_core::{GridConfig, hex_to_linear};

use crate::gpu_resources::create_uniform_bind_group;
use crate::pipeline::PipelineConfig;
use crate::vertex::PositionColorVertex;

const SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    "\n",
    include_str!("shaders/grid.wgsl")
);

/// Placement of a helper object
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct HelperUniform {
    pub transform: [[f32; 4]; 4],
}

impl HelperUniform {
    pub fn at_height(y: f32) -> Self {
        Self {
            transform: Mat4::from_translation(Vec3::new(0.0, y, 0.0)).to_cols_array_2d(),
        }
    }
}

/// Grid renderer: a square of lines on the XZ plane, moved vertically as
/// models are placed.
pub struct GridRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    camera_bind_group: wgpu::BindGroup,
    transform_buffer: wgpu::Buffer,
    transform_bind_group: wgpu::BindGroup,
    height: f32,
    visible: bool,
}

impl GridRenderer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        sample_count: u32,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        transform_bind_group_layout: &wgpu::BindGroupLayout,
        config: &GridConfig,
    ) -> Self {
        let pipeline = PipelineConfig::new(
            "Grid",
            SHADER,
            format,
            depth_format,
            &[camera_bind_group_layout, transform_bind_group_layout],
        )
        .with_vertex_layouts(vec![PositionColorVertex::layout()])
        .with_topology(wgpu::PrimitiveTopology::LineList)
        .with_sample_count(sample_count)
        .build(device);

        let vertices = generate_grid_vertices(
            config.size,
            config.divisions,
            hex_to_linear(config.center_line_color),
            hex_to_linear(config.line_color),
        );

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Grid Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let camera_bind_group = create_uniform_bind_group(
            device,
            "Grid Camera Bind Group",
            camera_bind_group_layout,
            camera_buffer,
        );

        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Grid Transform Buffer"),
            contents: bytemuck::bytes_of(&HelperUniform::at_height(config.initial_y)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let transform_bind_group = create_uniform_bind_group(
            device,
            "Grid Transform Bind Group",
            transform_bind_group_layout,
            &transform_buffer,
        );

        Self {
            pipeline,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            camera_bind_group,
            transform_buffer,
            transform_bind_group,
            height: config.initial_y,
            visible: true,
        }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn set_height(&mut self, queue: &wgpu::Queue, y: f32) {
        self.height = y;
        queue.write_buffer(
            &self.transform_buffer,
            0,
            bytemuck::bytes_of(&HelperUniform::at_height(y)),
        );
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if !self.visible {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_bind_group(1, &self.transform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..self.vertex_count, 0..1);
    }
}

/// Generate grid line vertices on the XZ plane, centered on the origin.
///
/// The center lines only exist when `divisions` is even; otherwise every
/// line gets `line_color`.
pub fn generate_grid_vertices(
    size: f32,
    divisions: u32,
    center_color: [f32; 3],
    line_color: [f32; 3],
) -> Vec<PositionColorVertex> {
    let divisions = divisions.max(1);
    let step = size / divisions as f32;
    let half_size = size / 2.0;
    let center = (divisions % 2 == 0).then_some(divisions / 2);

    let mut vertices = Vec::with_capacity((divisions as usize + 1) * 4);
    for i in 0..=divisions {
        let k = -half_size + i as f32 * step;
        let color = if Some(i) == center {
            center_color
        } else {
            line_color
        };

        // Parallel to X
        vertices.push(PositionColorVertex {
            position: [-half_size, 0.0, k],
            color,
        });
        vertices.push(PositionColorVertex {
            position: [half_size, 0.0, k],
            color,
        });
        // Parallel to Z
        vertices.push(PositionColorVertex {
            position: [k, 0.0, -half_size],
            color,
        });
        vertices.push(PositionColorVertex {
            position: [k, 0.0, half_size],
            color,
        });
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CENTER: [f32; 3] = [1.0, 0.0, 0.0];
    const LINE: [f32; 3] = [0.5, 0.5, 0.5];

    #[test]
    fn test_default_grid_extent() {
        let vertices = generate_grid_vertices(50.0, 25, CENTER, LINE);
        assert_eq!(vertices.len(), 26 * 4);
        for v in &vertices {
            assert_eq!(v.position[1], 0.0);
            assert!(v.position[0].abs() <= 25.0 + 1e-4);
            assert!(v.position[2].abs() <= 25.0 + 1e-4);
        }
        assert_relative_eq!(vertices[0].position[2], -25.0);
        assert_relative_eq!(vertices[4].position[2], -23.0, epsilon = 1e-5);
    }

    #[test]
    fn test_odd_divisions_have_no_center_line() {
        let vertices = generate_grid_vertices(50.0, 25, CENTER, LINE);
        assert!(vertices.iter().all(|v| v.color == LINE));
    }

    #[test]
    fn test_even_divisions_color_center_line() {
        let vertices = generate_grid_vertices(10.0, 10, CENTER, LINE);
        let center: Vec<_> = vertices.iter().filter(|v| v.color == CENTER).collect();
        assert_eq!(center.len(), 4);
        assert!(center.iter().any(|v| v.position[2] == 0.0 && v.position[0] == 5.0));
    }

    #[test]
    fn test_helper_uniform_height() {
        let uniform = HelperUniform::at_height(-2.5);
        assert_eq!(uniform.transform[3], [0.0, -2.5, 0.0, 1.0]);
    }
}
