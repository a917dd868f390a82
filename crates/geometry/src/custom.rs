use crate::builder::GeometryError;
use crate::mesh::InstancedMesh;
use dicefield_common::{Face, TextureImage};

/// Indexed face data as produced by an asset loader (OBJ-style).
///
/// All indices are 1-based, matching the text format they come from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedFaceSet {
    /// Vertex positions, one `[x, y, z]` per entry.
    pub positions: Vec<[f32; 3]>,
    /// Normals, one `[x, y, z]` per entry.
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates, one `[u, v]` per entry.
    pub uvs: Vec<[f32; 2]>,
    /// Faces as ordered lists of (position, uv, normal) index triples.
    pub faces: Vec<Vec<VertexRef>>,
}

/// One corner of a face: 1-based indices into the three attribute lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexRef {
    pub position: u32,
    pub uv: u32,
    pub normal: u32,
}

/// A mesh built once from externally loaded indexed face data.
///
/// Faces are fan-triangulated like procedural geometry, but normals come from
/// the source data instead of being computed, and the V coordinate is flipped
/// (`1 - v`) to match the sampler's top-left origin. Exposes exactly one
/// synthetic instance at a fixed offset; there is no real multi-instancing
/// for loaded meshes.
#[derive(Debug)]
pub struct InstancedCustomMesh {
    positions: Vec<f32>,
    normals: Vec<f32>,
    uv_coords: Vec<f32>,
    texture_images: Vec<TextureImage>,
    instance_positions: [f32; 3],
    instance_rotations: [u32; 1],
    instance_texture_ids: [u32; 1],
}

impl InstancedCustomMesh {
    /// Resolve the index triples and triangulate. Fails with
    /// `GeometryError::IndexOutOfRange` on a dangling index and
    /// `GeometryError::TooFewVertices` on a degenerate face.
    pub fn from_face_set(source: &IndexedFaceSet) -> Result<Self, GeometryError> {
        let mut mesh = Self {
            positions: Vec::new(),
            normals: Vec::new(),
            uv_coords: Vec::new(),
            texture_images: Vec::new(),
            instance_positions: [0.0, 20.0, 0.0],
            instance_rotations: [Face::Top.code()],
            instance_texture_ids: [0],
        };

        for face in &source.faces {
            if face.len() < 3 {
                return Err(GeometryError::TooFewVertices(face.len()));
            }
            let corners: Vec<ResolvedVertex> = face
                .iter()
                .map(|r| resolve(source, *r))
                .collect::<Result<_, _>>()?;
            for i in 1..corners.len() - 1 {
                for corner in [&corners[0], &corners[i], &corners[i + 1]] {
                    mesh.positions.extend_from_slice(&corner.position);
                    mesh.normals.extend_from_slice(&corner.normal);
                    // Flip V to the sampler's top-left origin.
                    mesh.uv_coords
                        .extend_from_slice(&[corner.uv[0], 1.0 - corner.uv[1]]);
                }
            }
        }
        Ok(mesh)
    }

    pub fn set_texture_images(&mut self, texture_images: Vec<TextureImage>) {
        self.texture_images = texture_images;
    }
}

struct ResolvedVertex {
    position: [f32; 3],
    uv: [f32; 2],
    normal: [f32; 3],
}

fn resolve(source: &IndexedFaceSet, r: VertexRef) -> Result<ResolvedVertex, GeometryError> {
    let lookup = |kind: &'static str, index: u32, count: usize| {
        if index == 0 || index as usize > count {
            Err(GeometryError::IndexOutOfRange { kind, index, count })
        } else {
            Ok(index as usize - 1)
        }
    };
    Ok(ResolvedVertex {
        position: source.positions[lookup("position", r.position, source.positions.len())?],
        uv: source.uvs[lookup("uv", r.uv, source.uvs.len())?],
        normal: source.normals[lookup("normal", r.normal, source.normals.len())?],
    })
}

impl InstancedMesh for InstancedCustomMesh {
    fn offsets(&self) -> &[f32] {
        &self.positions
    }

    fn normals(&self) -> &[f32] {
        &self.normals
    }

    fn uv_coords(&self) -> &[f32] {
        &self.uv_coords
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

    fn triangle_source() -> IndexedFaceSet {
        IndexedFaceSet {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            faces: vec![vec![
                VertexRef { position: 1, uv: 1, normal: 1 },
                VertexRef { position: 2, uv: 2, normal: 1 },
                VertexRef { position: 3, uv: 3, normal: 1 },
            ]],
        }
    }

    #[test]
    fn resolves_one_based_indices() {
        let mesh = InstancedCustomMesh::from_face_set(&triangle_source()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(&mesh.offsets()[0..3], &[0.0, 0.0, 0.0]);
        assert_eq!(&mesh.offsets()[3..6], &[1.0, 0.0, 0.0]);
        assert_eq!(&mesh.normals()[0..3], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn flips_the_v_coordinate() {
        let mesh = InstancedCustomMesh::from_face_set(&triangle_source()).unwrap();
        // Source uvs (0,0), (1,0), (0,1) become (0,1), (1,1), (0,0).
        assert_eq!(mesh.uv_coords(), &[0.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn quad_faces_fan_triangulate() {
        let source = IndexedFaceSet {
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            normals: vec![[0.0, 0.0, 1.0]],
            uvs: vec![[0.0, 0.0]],
            faces: vec![(1..=4)
                .map(|i| VertexRef { position: i, uv: 1, normal: 1 })
                .collect()],
        };
        let mesh = InstancedCustomMesh::from_face_set(&source).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
    }

    #[test]
    fn exposes_one_fixed_instance() {
        let mesh = InstancedCustomMesh::from_face_set(&triangle_source()).unwrap();
        assert_eq!(mesh.instance_count(), 1);
        assert_eq!(mesh.instance_positions(), &[0.0, 20.0, 0.0]);
        assert_eq!(mesh.instance_rotations(), &[Face::Top.code()]);
        assert_eq!(mesh.instance_texture_ids(), &[0]);
    }

    #[test]
    fn dangling_index_is_rejected() {
        let mut source = triangle_source();
        source.faces[0][2].position = 9;
        let err = InstancedCustomMesh::from_face_set(&source).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::IndexOutOfRange { kind: "position", index: 9, .. }
        ));
    }

    #[test]
    fn zero_index_is_rejected() {
        let mut source = triangle_source();
        source.faces[0][0].normal = 0;
        assert!(InstancedCustomMesh::from_face_set(&source).is_err());
    }

    #[test]
    fn degenerate_face_is_rejected() {
        let mut source = triangle_source();
        source.faces[0].truncate(2);
        assert!(matches!(
            InstancedCustomMesh::from_face_set(&source).unwrap_err(),
            GeometryError::TooFewVertices(2)
        ));
    }
}
