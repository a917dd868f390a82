use glam::{Vec2, Vec3};

/// Errors from geometry construction.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("a face needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("face has {vertices} vertices but {uvs} uv coordinates")]
    UvCountMismatch { vertices: usize, uvs: usize },
    #[error("face references out-of-range {kind} index {index} ({count} available)")]
    IndexOutOfRange {
        kind: &'static str,
        index: u32,
        count: usize,
    },
}

/// Accumulates triangle-list geometry as three parallel flat arrays.
///
/// Faces are triangulated by fan expansion and shaded flat: each triangle
/// gets one face normal duplicated across its three vertices. Nothing is
/// deduplicated; every triangle contributes three fresh vertex entries.
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    positions: Vec<f32>,
    normals: Vec<f32>,
    uv_coords: Vec<f32>,
}

impl GeometryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a planar convex polygon, wound counter-clockwise as seen from the
    /// visible side. When `uv_coords` is absent every vertex of the face gets
    /// (0, 0).
    ///
    /// Validation happens before anything is appended, so a failed call
    /// leaves previously added faces untouched.
    pub fn add_face(
        &mut self,
        vertices: &[Vec3],
        uv_coords: Option<&[Vec2]>,
    ) -> Result<(), GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }
        if let Some(uvs) = uv_coords {
            if uvs.len() != vertices.len() {
                return Err(GeometryError::UvCountMismatch {
                    vertices: vertices.len(),
                    uvs: uvs.len(),
                });
            }
        }
        for i in 1..vertices.len() - 1 {
            let (uv0, uv1, uv2) = match uv_coords {
                Some(uvs) => (uvs[0], uvs[i], uvs[i + 1]),
                None => (Vec2::ZERO, Vec2::ZERO, Vec2::ZERO),
            };
            self.add_triangle(vertices[0], vertices[i], vertices[i + 1], uv0, uv1, uv2);
        }
        Ok(())
    }

    fn add_triangle(&mut self, v0: Vec3, v1: Vec3, v2: Vec3, uv0: Vec2, uv1: Vec2, uv2: Vec2) {
        let normal = surface_normal(v0, v1, v2);
        for (v, uv) in [(v0, uv0), (v1, uv1), (v2, uv2)] {
            self.positions.extend_from_slice(&[v.x, v.y, v.z]);
            self.normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
            self.uv_coords.extend_from_slice(&[uv.x, uv.y]);
        }
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn uv_coords(&self) -> &[f32] {
        &self.uv_coords
    }

    pub fn vertex_count(&self) -> u32 {
        (self.positions.len() / 3) as u32
    }
}

/// Face normal of a counter-clockwise triangle: (v1−v0) × (v2−v0).
///
/// Left unnormalized; the shader normalizes per vertex.
fn surface_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v1 - v0).cross(v2 - v0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_verts() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn fan_triangulation_emits_n_minus_2_triangles() {
        for n in 3..8 {
            let verts: Vec<Vec3> = (0..n)
                .map(|i| {
                    let a = i as f32 / n as f32 * std::f32::consts::TAU;
                    Vec3::new(a.cos(), a.sin(), 0.0)
                })
                .collect();
            let mut g = GeometryBuilder::new();
            g.add_face(&verts, None).unwrap();
            assert_eq!(g.vertex_count() as usize, (n - 2) * 3);
        }
    }

    #[test]
    fn parallel_arrays_stay_in_step() {
        let mut g = GeometryBuilder::new();
        g.add_face(&square_verts(), None).unwrap();
        assert_eq!(g.positions().len() / 3, g.normals().len() / 3);
        assert_eq!(g.positions().len() / 3, g.uv_coords().len() / 2);
        assert_eq!(g.positions().len() % 9, 0);
    }

    #[test]
    fn flat_normal_is_cross_product() {
        let mut g = GeometryBuilder::new();
        // CCW square in the xy plane, visible from +z.
        g.add_face(&square_verts(), None).unwrap();
        // Both triangles face +z; the cross product of unit edges has length 1
        // here, duplicated across all six vertices.
        for v in 0..6 {
            assert_eq!(&g.normals()[v * 3..v * 3 + 3], &[0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn normal_direction_matches_emitted_triangles() {
        let verts = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
        ];
        let mut g = GeometryBuilder::new();
        g.add_face(&verts, None).unwrap();
        for tri in 0..2 {
            let base = tri * 9;
            let p = |i: usize| {
                Vec3::new(
                    g.positions()[base + i * 3],
                    g.positions()[base + i * 3 + 1],
                    g.positions()[base + i * 3 + 2],
                )
            };
            let expected = (p(1) - p(0)).cross(p(2) - p(0));
            let got = Vec3::new(g.normals()[base], g.normals()[base + 1], g.normals()[base + 2]);
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn too_few_vertices_is_rejected() {
        let mut g = GeometryBuilder::new();
        let err = g
            .add_face(&[Vec3::ZERO, Vec3::X], None)
            .unwrap_err();
        assert!(matches!(err, GeometryError::TooFewVertices(2)));
        assert_eq!(g.vertex_count(), 0);
    }

    #[test]
    fn uv_count_mismatch_is_rejected() {
        let mut g = GeometryBuilder::new();
        let err = g
            .add_face(&square_verts(), Some(&[Vec2::ZERO, Vec2::ONE]))
            .unwrap_err();
        assert!(matches!(
            err,
            GeometryError::UvCountMismatch { vertices: 4, uvs: 2 }
        ));
    }

    #[test]
    fn failed_face_does_not_corrupt_earlier_faces() {
        let mut g = GeometryBuilder::new();
        g.add_face(&square_verts(), None).unwrap();
        let before = g.positions().to_vec();
        assert!(g.add_face(&square_verts(), Some(&[Vec2::ZERO])).is_err());
        assert_eq!(g.positions(), &before[..]);
    }

    #[test]
    fn missing_uvs_default_to_origin() {
        let mut g = GeometryBuilder::new();
        g.add_face(&square_verts(), None).unwrap();
        assert!(g.uv_coords().iter().all(|&c| c == 0.0));
    }
}
