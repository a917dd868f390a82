//! Procedural geometry and instanced meshes.
//!
//! All meshes expose the same contract: shared per-vertex geometry (offsets,
//! normals, uv coordinates) stored once, plus per-instance arrays (position,
//! rotation code, texture id) consumed by an instanced draw.
//!
//! # Invariants
//! - The three per-vertex arrays always describe the same vertex count, and
//!   that count is a multiple of 3 (pure triangle list, no index buffer).
//! - The three per-instance arrays always have equal length; an instance is
//!   appended as one unit, partial instances never exist.

mod builder;
mod cube;
mod custom;
mod mesh;
mod square;

pub use builder::{GeometryBuilder, GeometryError};
pub use cube::InstancedCube;
pub use custom::{IndexedFaceSet, InstancedCustomMesh, VertexRef};
pub use mesh::{InstancedMesh, SharedMesh};
pub use square::InstancedSquare;
