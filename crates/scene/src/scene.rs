use dicefield_common::{LightId, MeshId};
use dicefield_geometry::SharedMesh;
use glam::Vec3;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A point-direction light. Direction only; no color, intensity, or type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub direction: Vec3,
}

impl Light {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            direction: Vec3::new(x, y, z),
        }
    }
}

/// Unordered mesh and light collections with set-like add/remove semantics.
///
/// Entries are keyed by monotonically increasing handles, so BTreeMap
/// iteration order equals insertion order and stays deterministic until the
/// scene is mutated. The renderer keys its GPU resource cache by these
/// handles.
#[derive(Default)]
pub struct Scene {
    meshes: BTreeMap<MeshId, SharedMesh>,
    lights: BTreeMap<LightId, Light>,
    next_mesh_id: u64,
    next_light_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh and return its handle. Adding a mesh that is already
    /// present (same `Arc`) is a no-op returning the existing handle.
    pub fn add_mesh(&mut self, mesh: SharedMesh) -> MeshId {
        if let Some((&id, _)) = self
            .meshes
            .iter()
            .find(|(_, existing)| Arc::ptr_eq(existing, &mesh))
        {
            return id;
        }
        let id = MeshId(self.next_mesh_id);
        self.next_mesh_id += 1;
        self.meshes.insert(id, mesh);
        id
    }

    /// Remove a mesh. A no-op returning `None` if the handle is absent.
    pub fn remove_mesh(&mut self, id: MeshId) -> Option<SharedMesh> {
        self.meshes.remove(&id)
    }

    /// Add a light and return its handle. Adding an equal light is a no-op
    /// returning the existing handle.
    pub fn add_light(&mut self, light: Light) -> LightId {
        if let Some((&id, _)) = self.lights.iter().find(|(_, existing)| **existing == light) {
            return id;
        }
        let id = LightId(self.next_light_id);
        self.next_light_id += 1;
        self.lights.insert(id, light);
        id
    }

    /// Remove a light. A no-op returning `None` if the handle is absent.
    pub fn remove_light(&mut self, id: LightId) -> Option<Light> {
        self.lights.remove(&id)
    }

    /// Meshes in insertion order (BTreeMap over increasing handles).
    pub fn meshes(&self) -> &BTreeMap<MeshId, SharedMesh> {
        &self.meshes
    }

    /// Lights in insertion order.
    pub fn lights(&self) -> &BTreeMap<LightId, Light> {
        &self.lights
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicefield_geometry::InstancedCube;

    fn cube() -> SharedMesh {
        Arc::new(InstancedCube::new())
    }

    #[test]
    fn scene_starts_empty() {
        let scene = Scene::new();
        assert_eq!(scene.mesh_count(), 0);
        assert_eq!(scene.light_count(), 0);
    }

    #[test]
    fn adding_the_same_mesh_twice_is_a_noop() {
        let mut scene = Scene::new();
        let mesh = cube();
        let id1 = scene.add_mesh(mesh.clone());
        let id2 = scene.add_mesh(mesh);
        assert_eq!(id1, id2);
        assert_eq!(scene.mesh_count(), 1);
    }

    #[test]
    fn distinct_meshes_get_distinct_handles() {
        let mut scene = Scene::new();
        let id1 = scene.add_mesh(cube());
        let id2 = scene.add_mesh(cube());
        assert_ne!(id1, id2);
        assert_eq!(scene.mesh_count(), 2);
    }

    #[test]
    fn removing_an_absent_mesh_is_a_noop() {
        let mut scene = Scene::new();
        let id = scene.add_mesh(cube());
        assert!(scene.remove_mesh(MeshId(99)).is_none());
        assert_eq!(scene.mesh_count(), 1);
        assert!(scene.remove_mesh(id).is_some());
        assert!(scene.remove_mesh(id).is_none());
        assert_eq!(scene.mesh_count(), 0);
    }

    #[test]
    fn removed_handles_are_not_reused() {
        let mut scene = Scene::new();
        let id1 = scene.add_mesh(cube());
        scene.remove_mesh(id1);
        let id2 = scene.add_mesh(cube());
        assert_ne!(id1, id2);
    }

    #[test]
    fn equal_lights_are_deduplicated() {
        let mut scene = Scene::new();
        let id1 = scene.add_light(Light::new(1.0, 2.0, 3.0));
        let id2 = scene.add_light(Light::new(1.0, 2.0, 3.0));
        assert_eq!(id1, id2);
        assert_eq!(scene.light_count(), 1);

        let id3 = scene.add_light(Light::new(-1.0, -2.0, -3.0));
        assert_ne!(id1, id3);
        assert_eq!(scene.light_count(), 2);
    }

    #[test]
    fn iteration_order_is_insertion_order() {
        let mut scene = Scene::new();
        let a = scene.add_mesh(cube());
        let b = scene.add_mesh(cube());
        let c = scene.add_mesh(cube());
        let order: Vec<MeshId> = scene.meshes().keys().copied().collect();
        assert_eq!(order, vec![a, b, c]);
    }
}
