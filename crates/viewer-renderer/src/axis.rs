//! Axes helper renderer

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::constants::axis::{X_COLOR, Y_COLOR, Z_COLOR};
use crate::gpu_resources::create_uniform_bind_group;
use crate::pipeline::PipelineConfig;
use crate::vertex::PositionColorVertex;

const SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    "\n",
    include_str!("shaders/axis.wgsl")
);

/// Axis instance data - passed as vertex instance
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct AxisInstance {
    pub transform: [[f32; 4]; 4],
    pub scale: f32,
    pub _padding: [f32; 3],
}

impl Default for AxisInstance {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY.to_cols_array_2d(),
            scale: 1.0,
            _padding: [0.0; 3],
        }
    }
}

impl AxisInstance {
    /// Axes of length `size` rooted at height `y` on the world Y axis
    pub fn at_height(y: f32, size: f32) -> Self {
        Self {
            transform: Mat4::from_translation(Vec3::new(0.0, y, 0.0)).to_cols_array_2d(),
            scale: size,
            _padding: [0.0; 3],
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Axes helper: red X, green Y, blue Z
pub struct AxisRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    instance_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    instance: AxisInstance,
}

impl AxisRenderer {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        sample_count: u32,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        instance: AxisInstance,
    ) -> Self {
        let pipeline = PipelineConfig::new(
            "Axis",
            SHADER,
            format,
            depth_format,
            &[camera_bind_group_layout],
        )
        .with_vertex_layouts(vec![PositionColorVertex::layout(), AxisInstance::layout()])
        .with_topology(wgpu::PrimitiveTopology::LineList)
        .with_sample_count(sample_count)
        .build(device);

        let bind_group = create_uniform_bind_group(
            device,
            "Axis Camera Bind Group",
            camera_bind_group_layout,
            camera_buffer,
        );

        let vertices = generate_axis_vertices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Axis Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Axis Instance Buffer"),
            contents: bytemuck::bytes_of(&instance),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            pipeline,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            instance_buffer,
            bind_group,
            instance,
        }
    }

    pub fn instance(&self) -> &AxisInstance {
        &self.instance
    }

    /// Move the axes to height `y`, keeping their size
    pub fn set_height(&mut self, queue: &wgpu::Queue, y: f32) {
        self.instance = AxisInstance::at_height(y, self.instance.scale);
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::bytes_of(&self.instance));
    }

    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        render_pass.draw(0..self.vertex_count, 0..1);
    }
}

/// Unit-length axis lines from the origin
pub fn generate_axis_vertices() -> Vec<PositionColorVertex> {
    [
        ([1.0, 0.0, 0.0], X_COLOR),
        ([0.0, 1.0, 0.0], Y_COLOR),
        ([0.0, 0.0, 1.0], Z_COLOR),
    ]
    .into_iter()
    .flat_map(|(tip, color)| {
        [
            PositionColorVertex {
                position: [0.0; 3],
                color,
            },
            PositionColorVertex {
                position: tip,
                color,
            },
        ]
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_layout_size() {
        assert_eq!(std::mem::size_of::<AxisInstance>(), 80);
    }

    #[test]
    fn test_axis_vertices() {
        let vertices = generate_axis_vertices();
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[1].color, X_COLOR);
        assert_eq!(vertices[5].color, Z_COLOR);
        assert!(vertices.iter().step_by(2).all(|v| v.position == [0.0; 3]));
    }

    #[test]
    fn test_instance_at_height() {
        let instance = AxisInstance::at_height(-2.0, 5.0);
        assert_eq!(instance.scale, 5.0);
        assert_eq!(instance.transform[3], [0.0, -2.0, 0.0, 1.0]);
    }
}
