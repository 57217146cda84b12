//! Decoded model geometry

use glam::Vec3;

use crate::bounds::BoundingBox;

/// Material flags relevant to the viewer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialSettings {
    pub base_color: [f32; 4],
    pub double_sided: bool,
    pub transparent: bool,
    /// Alpha used when `transparent`; decoded from the base color factor
    pub opacity: f32,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            base_color: [0.8, 0.8, 0.8, 1.0],
            double_sided: false,
            transparent: false,
            opacity: 1.0,
        }
    }
}

/// A triangle mesh with node transforms already applied
#[derive(Debug, Clone)]
pub struct ModelMesh {
    pub name: String,
    /// Positions in model space
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Triangle list indices
    pub indices: Vec<u32>,
    pub material: MaterialSettings,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    /// Bounds in model space
    pub bounds: BoundingBox,
}

impl ModelMesh {
    /// Create a mesh from positions and triangle indices
    pub fn new(name: impl Into<String>, positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        let bounds = BoundingBox::from_points(&positions).unwrap_or_default();
        let mut mesh = Self {
            name: name.into(),
            positions,
            normals: Vec::new(),
            indices,
            material: MaterialSettings::default(),
            cast_shadow: false,
            receive_shadow: false,
            bounds,
        };
        mesh.compute_vertex_normals();
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Recompute smooth vertex normals from the triangle list (area weighted)
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(pa), Some(pb), Some(pc)) = (
                self.positions.get(a),
                self.positions.get(b),
                self.positions.get(c),
            ) else {
                continue;
            };
            let (pa, pb, pc) = (Vec3::from(*pa), Vec3::from(*pb), Vec3::from(*pc));
            let face = (pb - pa).cross(pc - pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }

        self.normals = normals
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }
}

/// A loaded model: meshes plus the position of the model root
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub meshes: Vec<ModelMesh>,
    /// Translation applied to every mesh
    pub position: Vec3,
}

impl Model {
    pub fn new(meshes: Vec<ModelMesh>) -> Self {
        Self {
            meshes,
            position: Vec3::ZERO,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.iter().all(|m| m.triangle_count() == 0)
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.triangle_count()).sum()
    }

    /// World-space bounds at the current position
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.meshes
            .iter()
            .filter(|m| !m.bounds.is_empty())
            .map(|m| m.bounds)
            .reduce(|a, b| a.union(&b))
            .map(|b| b.translated(self.position))
    }

    /// Prepare every mesh for display: double-sided, shadow casting and
    /// receiving, fully opaque blending and fresh vertex normals.
    pub fn prepare_for_display(&mut self) {
        for mesh in &mut self.meshes {
            mesh.material.double_sided = true;
            mesh.material.transparent = true;
            mesh.material.opacity = 1.0;
            mesh.cast_shadow = true;
            mesh.receive_shadow = true;
            mesh.compute_vertex_normals();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(y: f32) -> ModelMesh {
        ModelMesh::new(
            "quad",
            vec![[0.0, y, 0.0], [1.0, y, 0.0], [1.0, y, 1.0], [0.0, y, 1.0]],
            vec![0, 2, 1, 0, 3, 2],
        )
    }

    #[test]
    fn test_vertex_normals_face_up() {
        let mesh = quad(0.0);
        for n in &mesh.normals {
            assert!((n[1] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_model_bounds_follow_position() {
        let mut model = Model::new(vec![quad(0.0), quad(3.0)]);
        let bounds = model.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 3.0, 1.0));

        model.position = Vec3::new(0.0, -1.5, 0.0);
        let bounds = model.bounds().unwrap();
        assert_eq!(bounds.min.y, -1.5);
        assert_eq!(bounds.max.y, 1.5);
    }

    #[test]
    fn test_prepare_for_display() {
        let mut model = Model::new(vec![quad(0.0)]);
        model.prepare_for_display();
        let mesh = &model.meshes[0];
        assert!(mesh.material.double_sided);
        assert!(mesh.material.transparent);
        assert_eq!(mesh.material.opacity, 1.0);
        assert!(mesh.cast_shadow && mesh.receive_shadow);
    }

    #[test]
    fn test_empty_model() {
        let model = Model::new(vec![ModelMesh::new("points", vec![[0.0; 3]], Vec::new())]);
        assert!(model.is_empty());
        assert!(Model::default().bounds().is_none());
    }

    #[test]
    fn test_out_of_range_indices_are_skipped() {
        let mesh = ModelMesh::new("broken", vec![[0.0; 3], [1.0, 0.0, 0.0]], vec![0, 1, 7]);
        assert_eq!(mesh.normals.len(), 2);
    }
}
