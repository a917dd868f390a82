//! Shared types and utilities for the dicefield renderer.

mod types;

pub use types::{Face, FaceCodeError, LightId, MeshId, TextureImage};
