//! Binary glTF decoding
//!
//! Parsing is delegated to the `gltf` crate; this module flattens the default
//! scene's node hierarchy into world-space triangle meshes.

use glam::{Mat3, Mat4, Vec3};

use crate::load::LoadError;
use crate::model::{MaterialSettings, Model, ModelMesh};

/// Decode a `.glb` (or embedded `.gltf`) byte buffer into a Model
pub fn decode_glb(bytes: &[u8]) -> Result<Model, LoadError> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).map_err(|e| LoadError::Decode(e.to_string()))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(LoadError::EmptyModel)?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        collect_node(&node, Mat4::IDENTITY, &buffers, &mut meshes);
    }

    let model = Model::new(meshes);
    if model.is_empty() {
        return Err(LoadError::EmptyModel);
    }

    tracing::debug!(
        meshes = model.meshes.len(),
        triangles = model.triangle_count(),
        "Decoded GLB"
    );
    Ok(model)
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<ModelMesh>,
) {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let world = parent * local;

    if let Some(mesh) = node.mesh() {
        let name = mesh
            .name()
            .or(node.name())
            .unwrap_or("unnamed")
            .to_string();
        for primitive in mesh.primitives() {
            if let Some(m) = read_primitive(&name, &primitive, world, buffers) {
                out.push(m);
            }
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, out);
    }
}

fn read_primitive(
    name: &str,
    primitive: &gltf::Primitive,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Option<ModelMesh> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        tracing::debug!(mesh = name, mode = ?primitive.mode(), "Skipping non-triangle primitive");
        return None;
    }

    let reader = primitive.reader(|b| buffers.get(b.index()).map(|data| data.0.as_slice()));
    let positions: Vec<[f32; 3]> = reader
        .read_positions()?
        .map(|p| world.transform_point3(Vec3::from(p)).to_array())
        .collect();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    // Mirroring transforms flip the winding
    let indices = if Mat3::from_mat4(world).determinant() < 0.0 {
        indices
            .chunks_exact(3)
            .flat_map(|t| [t[0], t[2], t[1]])
            .collect()
    } else {
        indices
    };

    let material = primitive.material();
    let mut mesh = ModelMesh::new(name, positions, indices);
    mesh.material = MaterialSettings {
        base_color: material.pbr_metallic_roughness().base_color_factor(),
        double_sided: material.double_sided(),
        transparent: material.alpha_mode() == gltf::material::AlphaMode::Blend,
        opacity: material.pbr_metallic_roughness().base_color_factor()[3],
    };
    Some(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal GLB holding one triangle under a translated node
    fn triangle_glb(translation: [f32; 3]) -> Vec<u8> {
        let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0]];
        let indices: [u16; 3] = [0, 1, 2];

        let mut bin: Vec<u8> = Vec::new();
        for p in positions {
            for c in p {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        let index_offset = bin.len();
        for i in indices {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        let bin_len = bin.len();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let json = format!(
            r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[0]}}],"nodes":[{{"mesh":0,"translation":[{},{},{}]}}],"meshes":[{{"name":"tri","primitives":[{{"attributes":{{"POSITION":0}},"indices":1,"material":0}}]}}],"materials":[{{"pbrMetallicRoughness":{{"baseColorFactor":[1.0,0.5,0.25,1.0]}}}}],"buffers":[{{"byteLength":{}}}],"bufferViews":[{{"buffer":0,"byteOffset":0,"byteLength":36}},{{"buffer":0,"byteOffset":{},"byteLength":6}}],"accessors":[{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0.0,0.0,0.0],"max":[1.0,2.0,0.0]}},{{"bufferView":1,"componentType":5123,"count":3,"type":"SCALAR"}}]}}"#,
            translation[0], translation[1], translation[2], bin_len, index_offset
        );
        let mut json = json.into_bytes();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json);
        glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"BIN\0");
        glb.extend_from_slice(&bin);
        glb
    }

    #[test]
    fn test_decode_triangle() {
        let model = decode_glb(&triangle_glb([0.0, 0.0, 0.0])).unwrap();
        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.name, "tri");
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.material.base_color, [1.0, 0.5, 0.25, 1.0]);
        assert_eq!(mesh.normals.len(), 3);
    }

    #[test]
    fn test_decode_applies_node_transform() {
        let model = decode_glb(&triangle_glb([2.0, -1.0, 3.0])).unwrap();
        let bounds = model.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(2.0, -1.0, 3.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 1.0, 3.0));
    }

    #[test]
    fn test_decode_garbage() {
        let result = decode_glb(b"definitely not a model");
        assert!(matches!(result, Err(LoadError::Decode(_))));
    }
}
