use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use log::trace;

/// Remembers which material has been created for a (resolved) texture path, so that every shape
/// using that texture shares one material.
pub struct MaterialRegistry {
    by_texture: DashMap<String, String>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self {
            by_texture: DashMap::with_capacity(100),
        }
    }

    pub fn material_for_texture(&self, texture_name: &str) -> Option<String> {
        self.by_texture
            .get(texture_name)
            .map(|entry| entry.value().clone())
    }

    /// Registers `material_name` for `texture_name`, unless another material has been registered
    /// first. Returns the name of the material that is registered afterward.
    pub fn register(&self, texture_name: &str, material_name: &str) -> String {
        self.by_texture
            .entry(texture_name.to_string())
            .or_insert_with(|| material_name.to_string())
            .value()
            .clone()
    }

    pub fn len(&self) -> usize {
        self.by_texture.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_texture.is_empty()
    }
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the deferred loaders of every declared mesh alive, keyed by mesh name. Keys are
/// compared case insensitive, as asset names are.
pub struct LoaderRegistry<T> {
    loaders: DashMap<String, Arc<T>>,
}

impl<T> LoaderRegistry<T> {
    pub fn new() -> Self {
        Self {
            loaders: DashMap::with_capacity(100),
        }
    }

    fn key(name: &str) -> String {
        name.to_lowercase()
    }

    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.loaders
            .get(&Self::key(name))
            .map(|entry| entry.value().clone())
    }

    /// Returns the loader registered for `name`, or registers the one built by `create`.
    /// The check and the insertion happen atomically, so only one loader per name ever exists.
    pub fn get_or_try_insert_with<E, F>(&self, name: &str, create: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        match self.loaders.entry(Self::key(name)) {
            Entry::Occupied(entry) => {
                trace!("Reusing the loader for {}", name);
                Ok(entry.get().clone())
            }
            Entry::Vacant(entry) => {
                let loader = Arc::new(create()?);
                Ok(entry.insert(loader).clone())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl<T> Default for LoaderRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
