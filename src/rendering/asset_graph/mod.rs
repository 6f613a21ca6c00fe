//! Deduplication of the resources that are derived from NIF files.
//!
//! Every load request consults the same registries, so they are passed around explicitly instead of
//! being global. Both registries guarantee that at most one entry exists per key: the check and the
//! insertion are a single atomic operation on the underlying [`dashmap::DashMap`], which means
//! concurrent loads of the same asset can't create the same material or mesh loader twice.
//!
//! Materials are keyed by their resolved texture path: two shapes (even of different files) that
//! use the same texture share one material. Mesh loaders are keyed by `asset@shape`, they keep the
//! deferred loaders alive for as long as the registry lives, so a mesh that is looked up again is
//! reused instead of being converted again.

use crate::rendering::asset_graph::registry::{LoaderRegistry, MaterialRegistry};
use crate::rendering::loader::nif_loader::NifMeshLoader;

pub mod registry;

pub type MeshLoaderRegistry = LoaderRegistry<NifMeshLoader>;

#[derive(Default)]
pub struct AssetRegistries {
    pub materials: MaterialRegistry,
    pub mesh_loaders: MeshLoaderRegistry,
}

impl AssetRegistries {
    pub fn new() -> Self {
        Self::default()
    }
}
