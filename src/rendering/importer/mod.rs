/// This module handles converting the records of nif-files into the intermediate representation
/// (see [`crate::rendering::common::types`]), that the renderer then builds its actual resources
/// from. Importers don't know about resource deduplication or deferred loading, that's up to the
/// loaders.
pub mod material_importer;
pub mod mesh_importer;
pub mod skeleton_importer;
