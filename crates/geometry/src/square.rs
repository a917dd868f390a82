use crate::builder::GeometryBuilder;
use crate::mesh::InstancedMesh;
use dicefield_common::{Face, TextureImage};
use glam::{Vec2, Vec3};

/// A single unit quad facing +z with a full [0,1]x[0,1] uv mapping.
///
/// Intended for billboard-like flat sprites, oriented per instance by the
/// same six-way rotation code as the cube.
pub struct InstancedSquare {
    geometry: GeometryBuilder,
    texture_images: Vec<TextureImage>,
    instance_positions: Vec<f32>,
    instance_rotations: Vec<u32>,
    instance_texture_ids: Vec<u32>,
}

impl InstancedSquare {
    pub fn new() -> Self {
        // A------B     uv: (0,0)---(1,0)
        // |      |           |       |
        // D------C         (0,1)---(1,1)
        let a = Vec3::new(-0.5, 0.5, 0.5);
        let b = Vec3::new(0.5, 0.5, 0.5);
        let c = Vec3::new(0.5, -0.5, 0.5);
        let d = Vec3::new(-0.5, -0.5, 0.5);

        let ul = Vec2::new(0.0, 0.0);
        let ur = Vec2::new(1.0, 0.0);
        let ll = Vec2::new(0.0, 1.0);
        let lr = Vec2::new(1.0, 1.0);

        let mut geometry = GeometryBuilder::new();
        // Counter-clockwise from the +z side, for back-face culling.
        geometry
            .add_face(&[a, d, c, b], Some(&[ul, ll, lr, ur]))
            .expect("square face is a fixed convex quad");

        Self {
            geometry,
            texture_images: Vec::new(),
            instance_positions: Vec::new(),
            instance_rotations: Vec::new(),
            instance_texture_ids: Vec::new(),
        }
    }

    /// Append one placement of the square as a single unit.
    pub fn add_instance(&mut self, position: Vec3, texture_id: u32, face: Face) {
        self.instance_positions
            .extend_from_slice(&[position.x, position.y, position.z]);
        self.instance_texture_ids.push(texture_id);
        self.instance_rotations.push(face.code());
    }

    pub fn set_texture_images(&mut self, texture_images: Vec<TextureImage>) {
        self.texture_images = texture_images;
    }
}

impl Default for InstancedSquare {
    fn default() -> Self {
        Self::new()
    }
}

impl InstancedMesh for InstancedSquare {
    fn offsets(&self) -> &[f32] {
        self.geometry.positions()
    }

    fn normals(&self) -> &[f32] {
        self.geometry.normals()
    }

    fn uv_coords(&self) -> &[f32] {
        self.geometry.uv_coords()
    }

    fn instance_positions(&self) -> &[f32] {
        &self.instance_positions
    }

    fn instance_rotations(&self) -> &[u32] {
        &self.instance_rotations
    }

    fn instance_texture_ids(&self) -> &[u32] {
        &self.instance_texture_ids
    }

    fn texture_images(&self) -> &[TextureImage] {
        &self.texture_images
    }
}
