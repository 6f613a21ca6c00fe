use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use log::{debug, trace};

use crate::rendering::backend::{
    DeferredResource, ManualResourceLoader, MaterialHandle, MeshHandle, ResourceManager, SkeletonHandle,
};
use crate::rendering::common::types::Material;

/// A [`ResourceManager`] that keeps everything in memory. It backs the command line tool and the
/// tests, a real renderer would implement [`ResourceManager`] on top of its own managers.
pub struct MemoryResourceManager {
    meshes: DashMap<String, MeshHandle>,
    skeletons: DashMap<String, SkeletonHandle>,
    materials: DashMap<String, MaterialHandle>,
    /// Resource group -> file names (normalized) that can be found within that group
    group_files: DashMap<String, DashSet<String>>,
}

/// Resource files are looked up case insensitive and regardless of the path separator.
fn normalize_file_name(name: &str) -> String {
    name.to_ascii_lowercase().replace('/', "\\")
}

impl MemoryResourceManager {
    pub fn new() -> Self {
        Self {
            meshes: DashMap::with_capacity(100),
            skeletons: DashMap::new(),
            materials: DashMap::with_capacity(100),
            group_files: DashMap::new(),
        }
    }

    /// Makes a file (e.g. `textures\\tx_wood.tga`) known to be available in the given group.
    pub fn declare_resource(&self, group: &str, name: &str) {
        self.group_files
            .entry(group.to_string())
            .or_default()
            .insert(normalize_file_name(name));
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn skeleton_count(&self) -> usize {
        self.skeletons.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn material_names(&self) -> Vec<String> {
        self.materials.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl Default for MemoryResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceManager for MemoryResourceManager {
    fn mesh(&self, name: &str) -> Option<MeshHandle> {
        self.meshes.get(name).map(|mesh| mesh.value().clone())
    }

    fn create_manual_mesh(&self, name: &str, group: &str, loader: Arc<dyn ManualResourceLoader>) -> MeshHandle {
        match self.meshes.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                trace!("Mesh {} has been declared already", name);
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                debug!("Declaring mesh {} in group {}", name, group);
                entry
                    .insert(Arc::new(DeferredResource::new(name, group, loader)))
                    .clone()
            }
        }
    }

    fn skeleton(&self, name: &str) -> Option<SkeletonHandle> {
        self.skeletons
            .get(name)
            .map(|skeleton| skeleton.value().clone())
    }

    fn create_manual_skeleton(
        &self,
        name: &str,
        group: &str,
        loader: Arc<dyn ManualResourceLoader>,
    ) -> SkeletonHandle {
        self.skeletons
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("Declaring skeleton {} in group {}", name, group);
                Arc::new(DeferredResource::new(name, group, loader))
            })
            .clone()
    }

    fn material(&self, name: &str) -> Option<MaterialHandle> {
        self.materials
            .get(name)
            .map(|material| material.value().clone())
    }

    fn add_material(&self, material: Material) -> MaterialHandle {
        match self.materials.entry(material.name.clone()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                debug!("Creating material {} in group {}", material.name, material.group);
                entry.insert(Arc::new(material)).clone()
            }
        }
    }

    fn resource_exists_in_any_group(&self, name: &str) -> bool {
        let name = normalize_file_name(name);
        self.group_files
            .iter()
            .any(|group| group.value().contains(&name))
    }
}

#[cfg(test)]
mod tests {
    use crate::rendering::LoadError;
    use crate::rendering::backend::memory::MemoryResourceManager;
    use crate::rendering::backend::{ManualResourceLoader, Resource, ResourceManager};
    use std::sync::Arc;

    struct NoopLoader;

    impl ManualResourceLoader for NoopLoader {
        fn load_resource(&self, _resource: &mut Resource) -> Result<(), LoadError> {
            Ok(())
        }
    }

    #[test]
    fn create_is_insert_if_absent() {
        let resources = MemoryResourceManager::new();
        let first = resources.create_manual_mesh("a@shape", "General", Arc::new(NoopLoader));
        let second = resources.create_manual_mesh("a@shape", "Other", Arc::new(NoopLoader));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.group(), "General");
        assert_eq!(resources.mesh_count(), 1);
        assert!(resources.mesh("a@other").is_none());
    }

    #[test]
    fn resource_lookup_is_case_and_separator_insensitive() {
        let resources = MemoryResourceManager::new();
        resources.declare_resource("Textures", "textures/TX_Wood.tga");

        assert!(resources.resource_exists_in_any_group("Textures\\tx_wood.TGA"));
        assert!(!resources.resource_exists_in_any_group("textures\\tx_wood.dds"));
    }
}
