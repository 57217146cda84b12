//! Model mesh upload and drawing

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use viewer_core::{Model, ModelMesh};

use crate::constants::shadow::SHADOW_MAP_FORMAT;
use crate::gpu_resources::create_uniform_bind_group;
use crate::pipeline::PipelineConfig;
use crate::vertex::MeshVertex;

const SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    "\n",
    include_str!("shaders/mesh.wgsl")
);
const SHADOW_SHADER: &str = include_str!("shaders/shadow.wgsl");

/// Model uniform (80 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ModelUniform {
    pub transform: [[f32; 4]; 4],
    /// x = receive shadows (1.0 or 0.0)
    pub flags: [f32; 4],
}

impl ModelUniform {
    pub fn new(position: Vec3, receive_shadow: bool) -> Self {
        Self {
            transform: Mat4::from_translation(position).to_cols_array_2d(),
            flags: [if receive_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// GPU copy of one [`ModelMesh`]
pub struct GpuMesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub double_sided: bool,
    pub cast_shadow: bool,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, mesh: &ModelMesh) -> Self {
        let vertices = build_vertices(mesh);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Mesh Vertex Buffer ({})", mesh.name)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Mesh Index Buffer ({})", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            name: mesh.name.clone(),
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            double_sided: mesh.material.double_sided,
            cast_shadow: mesh.cast_shadow,
        }
    }

    fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Interleave a mesh's positions and normals with its material color.
///
/// Missing normals fall back to +Y. The alpha channel is the material
/// opacity for transparent materials and 1.0 otherwise; the base color's
/// own alpha is never used.
pub fn build_vertices(mesh: &ModelMesh) -> Vec<MeshVertex> {
    let material = &mesh.material;
    let alpha = if material.transparent {
        material.opacity
    } else {
        1.0
    };
    let color = [
        material.base_color[0],
        material.base_color[1],
        material.base_color[2],
        alpha,
    ];

    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, position)| MeshVertex {
            position: *position,
            normal: mesh.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            color,
        })
        .collect()
}

/// Draws the loaded model in the main and shadow passes
pub struct ModelRenderer {
    double_sided_pipeline: wgpu::RenderPipeline,
    single_sided_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    meshes: Vec<GpuMesh>,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    position: Vec3,
    receive_shadow: bool,
}

impl ModelRenderer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        sample_count: u32,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light_bind_group_layout: &wgpu::BindGroupLayout,
        transform_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let layouts = [
            camera_bind_group_layout,
            light_bind_group_layout,
            transform_bind_group_layout,
        ];
        let main_pipeline = |label: &str, cull_mode: Option<wgpu::Face>| {
            PipelineConfig::new(label, SHADER, format, depth_format, &layouts)
                .with_vertex_layouts(vec![MeshVertex::layout()])
                .with_cull_mode(cull_mode)
                .with_sample_count(sample_count)
                .build(device)
        };
        let double_sided_pipeline = main_pipeline("Mesh Double Sided", None);
        let single_sided_pipeline = main_pipeline("Mesh", Some(wgpu::Face::Back));

        // The light uniform and the model uniform share the single-buffer layout
        let shadow_pipeline = PipelineConfig::depth_only(
            "Shadow",
            SHADOW_SHADER,
            SHADOW_MAP_FORMAT,
            &[transform_bind_group_layout, transform_bind_group_layout],
        )
        .with_vertex_layouts(vec![MeshVertex::layout()])
        .with_depth_bias(wgpu::DepthBiasState {
            constant: 2,
            slope_scale: 2.0,
            clamp: 0.0,
        })
        .build(device);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Uniform Buffer"),
            contents: bytemuck::bytes_of(&ModelUniform::new(Vec3::ZERO, true)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = create_uniform_bind_group(
            device,
            "Model Bind Group",
            transform_bind_group_layout,
            &uniform_buffer,
        );

        Self {
            double_sided_pipeline,
            single_sided_pipeline,
            shadow_pipeline,
            meshes: Vec::new(),
            uniform_buffer,
            bind_group,
            position: Vec3::ZERO,
            receive_shadow: true,
        }
    }

    /// Replace the drawn model
    pub fn set_model(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, model: &Model) {
        self.meshes = model
            .meshes
            .iter()
            .filter(|mesh| !mesh.indices.is_empty())
            .map(|mesh| GpuMesh::upload(device, mesh))
            .collect();
        self.receive_shadow = model.meshes.iter().any(|mesh| mesh.receive_shadow);
        self.position = model.position;
        self.write_uniform(queue);
        tracing::debug!("Uploaded {} meshes", self.meshes.len());
    }

    /// Move the model. Unchanged positions skip the upload.
    pub fn set_position(&mut self, queue: &wgpu::Queue, position: Vec3) {
        if self.position != position {
            self.position = position;
            self.write_uniform(queue);
        }
    }

    fn write_uniform(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&ModelUniform::new(self.position, self.receive_shadow)),
        );
    }

    pub fn render(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        if self.meshes.is_empty() {
            return;
        }
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_bind_group(1, light_bind_group, &[]);
        render_pass.set_bind_group(2, &self.bind_group, &[]);
        for mesh in &self.meshes {
            let pipeline = if mesh.double_sided {
                &self.double_sided_pipeline
            } else {
                &self.single_sided_pipeline
            };
            render_pass.set_pipeline(pipeline);
            mesh.draw(render_pass);
        }
    }

    pub fn render_shadow(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        shadow_light_bind_group: &wgpu::BindGroup,
    ) {
        render_pass.set_pipeline(&self.shadow_pipeline);
        render_pass.set_bind_group(0, shadow_light_bind_group, &[]);
        render_pass.set_bind_group(1, &self.bind_group, &[]);
        for mesh in self.meshes.iter().filter(|mesh| mesh.cast_shadow) {
            mesh.draw(render_pass);
        }
    }
}
