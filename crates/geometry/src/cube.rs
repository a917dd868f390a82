use crate::builder::GeometryBuilder;
use crate::mesh::InstancedMesh;
use dicefield_common::{Face, TextureImage};
use glam::{Vec2, Vec3};

/// A unit cube with per-face uv quadrants of a cross-style texture atlas
/// (4 columns, 3 rows).
///
/// Corner layout, +y up, +z toward the viewer, +x right:
///
/// ```text
///   B------C
///  /|     /|
/// A------D |
/// | F----|-G
/// |/     |/
/// E------H
/// ```
pub struct InstancedCube {
    geometry: GeometryBuilder,
    texture_images: Vec<TextureImage>,
    instance_positions: Vec<f32>,
    instance_rotations: Vec<u32>,
    instance_texture_ids: Vec<u32>,
}

impl InstancedCube {
    pub fn new() -> Self {
        let a = Vec3::new(-0.5, 0.5, 0.5);
        let b = Vec3::new(-0.5, 0.5, -0.5);
        let c = Vec3::new(0.5, 0.5, -0.5);
        let d = Vec3::new(0.5, 0.5, 0.5);
        let e = Vec3::new(-0.5, -0.5, 0.5);
        let f = Vec3::new(-0.5, -0.5, -0.5);
        let g = Vec3::new(0.5, -0.5, -0.5);
        let h = Vec3::new(0.5, -0.5, 0.5);

        let uv = |col: f32, row: f32| Vec2::new(col / 4.0, row / 3.0);

        // All faces wound counter-clockwise from outside, for back-face culling.
        let faces: [([Vec3; 4], [Vec2; 4]); 6] = [
            // top
            (
                [a, d, c, b],
                [uv(1.0, 1.0), uv(2.0, 1.0), uv(2.0, 0.0), uv(1.0, 0.0)],
            ),
            // bottom
            (
                [e, f, g, h],
                [uv(1.0, 2.0), uv(1.0, 3.0), uv(2.0, 3.0), uv(2.0, 2.0)],
            ),
            // left
            (
                [a, b, f, e],
                [uv(1.0, 1.0), uv(0.0, 1.0), uv(0.0, 2.0), uv(1.0, 2.0)],
            ),
            // right
            (
                [d, h, g, c],
                [uv(2.0, 1.0), uv(2.0, 2.0), uv(3.0, 2.0), uv(3.0, 1.0)],
            ),
            // front
            (
                [a, e, h, d],
                [uv(1.0, 1.0), uv(1.0, 2.0), uv(2.0, 2.0), uv(2.0, 1.0)],
            ),
            // back
            (
                [b, c, g, f],
                [uv(4.0, 1.0), uv(3.0, 1.0), uv(3.0, 2.0), uv(4.0, 2.0)],
            ),
        ];

        let mut geometry = GeometryBuilder::new();
        for (verts, uvs) in &faces {
            geometry
                .add_face(verts, Some(uvs))
                .expect("cube faces are fixed convex quads");
        }

        Self {
            geometry,
            texture_images: Vec::new(),
            instance_positions: Vec::new(),
            instance_rotations: Vec::new(),
            instance_texture_ids: Vec::new(),
        }
    }

    /// Append one placement of the cube. The three per-instance values are
    /// appended together; a partial instance never exists.
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

impl Default for InstancedCube {
    fn default() -> Self {
        Self::new()
    }
}

impl InstancedMesh for InstancedCube {
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn cube_has_36_vertices() {
        let cube = InstancedCube::new();
        // 6 faces x 2 triangles x 3 vertices
        assert_eq!(cube.vertex_count(), 36);
        assert_eq!(cube.offsets().len(), 36 * 3);
        assert_eq!(cube.normals().len(), 36 * 3);
        assert_eq!(cube.uv_coords().len(), 36 * 2);
    }

    #[test]
    fn cube_has_six_distinct_normals_each_repeated_six_times() {
        let cube = InstancedCube::new();
        let mut counts = std::collections::BTreeMap::new();
        for v in 0..36 {
            let n = &cube.normals()[v * 3..v * 3 + 3];
            // Axis-aligned normals are bit-exact, modulo negative zero.
            let key: Vec<u32> = n.iter().map(|c| (c + 0.0).to_bits()).collect();
            *counts.entry(key).or_insert(0u32) += 1;
        }
        assert_eq!(counts.len(), 6);
        assert!(counts.values().all(|&c| c == 6));
    }

    #[test]
    fn cube_normals_point_outward() {
        let cube = InstancedCube::new();
        let sign = |c: f32| {
            if c > 0.0 {
                1
            } else if c < 0.0 {
                -1
            } else {
                0
            }
        };
        let axes: BTreeSet<[i32; 3]> = (0..36)
            .map(|v| {
                let n = &cube.normals()[v * 3..v * 3 + 3];
                [sign(n[0]), sign(n[1]), sign(n[2])]
            })
            .collect();
        let expected: BTreeSet<[i32; 3]> = [
            [0, 1, 0],
            [0, -1, 0],
            [-1, 0, 0],
            [1, 0, 0],
            [0, 0, 1],
            [0, 0, -1],
        ]
        .into_iter()
        .collect();
        assert_eq!(axes, expected);
    }

    #[test]
    fn uv_coords_stay_inside_the_atlas() {
        let cube = InstancedCube::new();
        assert!(cube.uv_coords().iter().all(|&c| (0.0..=1.0).contains(&c)));
    }

    #[test]
    fn add_instance_appends_atomically() {
        let mut cube = InstancedCube::new();
        cube.add_instance(Vec3::new(0.0, 0.0, 0.0), 0, Face::South);
        assert_eq!(cube.instance_count(), 1);
        assert_eq!(cube.instance_positions(), &[0.0, 0.0, 0.0]);
        assert_eq!(cube.instance_rotations(), &[Face::South.code()]);
        assert_eq!(cube.instance_texture_ids(), &[0]);

        cube.add_instance(Vec3::new(1.0, 2.0, 3.0), 4, Face::West);
        assert_eq!(cube.instance_count(), 2);
        assert_eq!(cube.instance_positions().len(), 6);
        assert_eq!(cube.instance_rotations(), &[2, 5]);
        assert_eq!(cube.instance_texture_ids(), &[0, 4]);
    }
}
