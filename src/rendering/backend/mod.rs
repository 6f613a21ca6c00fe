//! The renderer side of the conversion. The renderer owns its resources (meshes, skeletons,
//! materials) and only knows them by name and resource group; the conversion pipeline merely
//! declares them and provides [`ManualResourceLoader`]s that fill them once they are first used.

use std::fmt::{Debug, Formatter};
use std::ops::DerefMut;
use std::sync::{Arc, RwLock};

use log::trace;

use crate::rendering::LoadError;
use crate::rendering::common::types::{Material, MeshData, Skeleton};

pub mod memory;

pub type MeshHandle = Arc<DeferredResource<MeshData>>;
pub type SkeletonHandle = Arc<DeferredResource<Skeleton>>;
pub type MaterialHandle = Arc<Material>;

/// A resource in the state it is handed to a loader: created, but still empty.
#[derive(Debug)]
pub enum Resource {
    Mesh(MeshData),
    Skeleton(Skeleton),
}

impl Resource {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Resource::Mesh(_) => MeshData::KIND_NAME,
            Resource::Skeleton(_) => Skeleton::KIND_NAME,
        }
    }
}

/// Connects the concrete resource types to [`Resource`].
pub trait ResourceKind: Sized {
    const KIND_NAME: &'static str;

    fn empty_resource(name: &str, group: &str) -> Resource;
    fn from_resource(resource: Resource) -> Option<Self>;
}

impl ResourceKind for MeshData {
    const KIND_NAME: &'static str = "Mesh";

    fn empty_resource(name: &str, group: &str) -> Resource {
        Resource::Mesh(MeshData::new(name, group))
    }

    fn from_resource(resource: Resource) -> Option<Self> {
        match resource {
            Resource::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

impl ResourceKind for Skeleton {
    const KIND_NAME: &'static str = "Skeleton";

    fn empty_resource(name: &str, group: &str) -> Resource {
        Resource::Skeleton(Skeleton::new(name, group))
    }

    fn from_resource(resource: Resource) -> Option<Self> {
        match resource {
            Resource::Skeleton(skeleton) => Some(skeleton),
            _ => None,
        }
    }
}

/// Populates a declared resource on demand.
pub trait ManualResourceLoader: Send + Sync {
    /// Receives the empty resource that has been declared. A loader that is handed a resource of
    /// a kind it can't produce has to fail with [`LoadError::ResourceTypeMismatch`].
    fn load_resource(&self, resource: &mut Resource) -> Result<(), LoadError>;
}

/// A named resource that has been declared, but is only loaded on first access.
pub struct DeferredResource<T> {
    name: String,
    group: String,
    loader: Arc<dyn ManualResourceLoader>,
    loaded: RwLock<Option<Arc<T>>>,
}

impl<T: ResourceKind> DeferredResource<T> {
    pub fn new(name: &str, group: &str, loader: Arc<dyn ManualResourceLoader>) -> Self {
        Self {
            name: name.to_string(),
            group: group.to_string(),
            loader,
            loaded: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn loader(&self) -> &Arc<dyn ManualResourceLoader> {
        &self.loader
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
            .read()
            .map(|loaded| loaded.is_some())
            .unwrap_or(false)
    }

    /// Returns the loaded resource, invoking the loader if this is the first access.
    pub fn load(&self) -> Result<Arc<T>, LoadError> {
        {
            if let Some(resource) = self.loaded.read().expect("Resource Read Lock").as_ref() {
                return Ok(resource.clone());
            }
        }

        let mut loaded = self.loaded.write().expect("Resource Write Lock");
        if let Some(resource) = loaded.as_ref() {
            // maybe we have been raced
            return Ok(resource.clone());
        }

        trace!("Loading {} {} ({})", T::KIND_NAME, self.name, self.group);
        let mut resource = T::empty_resource(&self.name, &self.group);
        self.loader.load_resource(&mut resource)?;

        let found = resource.kind_name();
        let data = Arc::new(T::from_resource(resource).ok_or(LoadError::ResourceTypeMismatch {
            name: self.name.clone(),
            expected: T::KIND_NAME,
            found,
        })?);
        *loaded.deref_mut() = Some(data.clone());
        Ok(data)
    }
}

impl<T> Debug for DeferredResource<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let loaded = self
            .loaded
            .read()
            .map(|loaded| loaded.is_some())
            .unwrap_or(false);
        write!(
            f,
            "{{ name: {}, group: {}, loaded: {} }}",
            self.name, self.group, loaded
        )
    }
}

/// The resource managers of the renderer. Lookups are by name, creation is insert-if-absent:
/// when a resource of that name already exists, the existing one is returned instead.
pub trait ResourceManager: Send + Sync {
    fn mesh(&self, name: &str) -> Option<MeshHandle>;
    fn create_manual_mesh(&self, name: &str, group: &str, loader: Arc<dyn ManualResourceLoader>) -> MeshHandle;

    fn skeleton(&self, name: &str) -> Option<SkeletonHandle>;
    fn create_manual_skeleton(
        &self,
        name: &str,
        group: &str,
        loader: Arc<dyn ManualResourceLoader>,
    ) -> SkeletonHandle;

    fn material(&self, name: &str) -> Option<MaterialHandle>;
    fn add_material(&self, material: Material) -> MaterialHandle;

    /// Whether any resource group can provide a file of that name (e.g. a texture)
    fn resource_exists_in_any_group(&self, name: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use crate::rendering::LoadError;
    use crate::rendering::backend::{DeferredResource, ManualResourceLoader, Resource};
    use crate::rendering::common::types::{MeshData, Skeleton};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingMeshLoader {
        calls: AtomicUsize,
    }

    impl ManualResourceLoader for CountingMeshLoader {
        fn load_resource(&self, resource: &mut Resource) -> Result<(), LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let Resource::Mesh(mesh) = resource else {
                return Err(LoadError::ResourceTypeMismatch {
                    name: "test".to_string(),
                    expected: "Mesh",
                    found: resource.kind_name(),
                });
            };
            mesh.bounding_radius = 42.0;
            Ok(())
        }
    }

    #[test]
    fn loads_only_once() -> Result<(), anyhow::Error> {
        let loader = Arc::new(CountingMeshLoader {
            calls: AtomicUsize::new(0),
        });
        let resource = DeferredResource::<MeshData>::new("a@b", "General", loader.clone());
        assert!(!resource.is_loaded());

        let first = resource.load()?;
        let second = resource.load()?;

        assert!(resource.is_loaded());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.bounding_radius, 42.0);
        assert_eq!(first.name, "a@b");
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn loading_into_the_wrong_kind_fails() {
        let loader = Arc::new(CountingMeshLoader {
            calls: AtomicUsize::new(0),
        });
        let resource = DeferredResource::<Skeleton>::new("a", "General", loader);

        let result = resource.load();
        assert!(matches!(
            result,
            Err(LoadError::ResourceTypeMismatch {
                expected: "Mesh",
                found: "Skeleton",
                ..
            })
        ));
        assert!(!resource.is_loaded());
    }
}
