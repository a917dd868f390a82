//! Scene container for the dicefield renderer.
//!
//! A scene is two duplicate-free, insertion-ordered collections: meshes and
//! lights. The application mutates it between frames; the renderer only
//! reads it. Not thread-safe by design (single writer, single reader per
//! frame).

mod scene;

pub use scene::{Light, Scene};
