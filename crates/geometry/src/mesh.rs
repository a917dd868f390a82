use dicefield_common::TextureImage;
use std::sync::Arc;

/// A mesh shared between the application and the renderer.
///
/// Finalize a mesh (geometry, instances, textures) before wrapping it; the
/// renderer builds GPU buffers from these arrays exactly once per mesh and
/// never rebuilds them.
pub type SharedMesh = Arc<dyn InstancedMesh>;

/// The capability contract shared by every mesh variant.
///
/// Per-vertex arrays (`offsets`, `normals`, `uv_coords`) describe the shape
/// once; per-instance arrays describe each placement of it. An instanced draw
/// consumes both: `vertex_count()` vertices times `instance_count()`
/// instances.
pub trait InstancedMesh {
    /// Vertex positions relative to the mesh origin, flattened triples.
    fn offsets(&self) -> &[f32];

    /// Per-vertex normals, flattened triples, same order as `offsets`.
    fn normals(&self) -> &[f32];

    /// Per-vertex uv coordinates, flattened pairs.
    fn uv_coords(&self) -> &[f32];

    /// Per-instance world positions, flattened triples.
    fn instance_positions(&self) -> &[f32];

    /// Per-instance rotation codes (see `dicefield_common::Face`).
    fn instance_rotations(&self) -> &[u32];

    /// Per-instance indices into the mesh's texture array.
    fn instance_texture_ids(&self) -> &[u32];

    /// Texture images in texture-id order. All must share dimensions.
    fn texture_images(&self) -> &[TextureImage];

    fn vertex_count(&self) -> u32 {
        (self.offsets().len() / 3) as u32
    }

    fn instance_count(&self) -> u32 {
        self.instance_rotations().len() as u32
    }
}
