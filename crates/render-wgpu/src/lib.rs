//! wgpu render backend for dicefield.
//!
//! Renders a scene of instanced meshes under a first-person perspective
//! camera, with per-vertex lighting from the scene's light list and
//! per-instance texture selection from a texture array.
//!
//! # Invariants
//! - The renderer never mutates the scene.
//! - GPU resources for a mesh are built on the first frame that renders it
//!   and are never rebuilt; instance arrays are frozen at that point.
//! - Per-frame uniforms are written once per frame, before any draw, so all
//!   meshes observe the same camera and light snapshot.

mod camera;
mod gpu;
mod shaders;

pub use camera::PerspectiveCamera;
pub use gpu::{RenderError, WgpuRenderer, MAX_LIGHTS};
