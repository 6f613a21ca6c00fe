use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use log::{debug, trace, warn};
use nif_files::NifError;
use nif_files::nif::graph::NifFile;
use nif_files::nif::types::{ExtraDataKind, NiTriShape, Node, NodeFlags, NodeKind, Record, RecordLink};

use crate::rendering::LoadError;
use crate::rendering::asset_graph::AssetRegistries;
use crate::rendering::backend::{ManualResourceLoader, MeshHandle, Resource, ResourceManager, SkeletonHandle};
use crate::rendering::importer::material_importer::MaterialImporter;
use crate::rendering::importer::mesh_importer::{MeshBinding, MeshImporter};
use crate::rendering::importer::skeleton_importer::SkeletonImporter;
use crate::settings::RenderSettings;

/// Extra data string that marks editor-only objects.
pub const MARKER_STRING: &str = "MRK";

const ROOT: RecordLink = RecordLink(0);

#[derive(Debug, Default)]
pub struct LoadedNif {
    /// Only present when the scene is skinned
    pub skeleton: Option<SkeletonHandle>,
    /// Every mesh with the name of the node its shape is attached to
    pub meshes: Vec<(MeshHandle, String)>,
}

pub struct NifLoader<'a> {
    resources: &'a dyn ResourceManager,
    registries: &'a AssetRegistries,
    settings: &'a RenderSettings,
}

impl<'a> NifLoader<'a> {
    pub fn new(resources: &'a dyn ResourceManager, registries: &'a AssetRegistries, settings: &'a RenderSettings) -> Self {
        Self {
            resources,
            registries,
            settings,
        }
    }

    /// Declares the skeleton and the meshes of `nif`. Their contents are only converted once the
    /// renderer loads them.
    pub fn load(&self, nif: Arc<NifFile>, group: &str) -> Result<LoadedNif, LoadError> {
        profiling::scope!("NifLoader::load");

        let Ok(root) = nif.root() else {
            warn!("Found no records in NIF {}", nif.name);
            return Ok(LoadedNif::default());
        };

        if !matches!(root, Record::Node(_)) {
            warn!(
                "First record in {} was not a node, but a {}. Skipping file.",
                nif.name,
                root.record_name()
            );
            return Ok(LoadedNif::default());
        }

        let skeleton = if SkeletonImporter::is_skinned(&nif, ROOT)? {
            Some(self.declare_skeleton(&nif, group))
        } else {
            None
        };

        let mut walker = SceneWalker {
            loader: self,
            nif: &nif,
            group,
            skeleton: skeleton.as_ref(),
            ancestors: vec![],
            meshes: vec![],
        };
        walker.create_meshes(ROOT, NodeFlags::empty())?;
        let meshes = walker.meshes;

        debug!(
            "Loaded {}: {} meshes, skeleton: {}",
            nif.name,
            meshes.len(),
            skeleton.is_some()
        );
        Ok(LoadedNif { skeleton, meshes })
    }

    fn declare_skeleton(&self, nif: &Arc<NifFile>, group: &str) -> SkeletonHandle {
        if let Some(skeleton) = self.resources.skeleton(&nif.name) {
            return skeleton;
        }

        self.resources
            .create_manual_skeleton(&nif.name, group, Arc::new(NifSkeletonLoader::new(nif.clone())))
    }
}

/// The state of one walk over the scene graph.
struct SceneWalker<'l, 'a> {
    loader: &'l NifLoader<'a>,
    nif: &'l Arc<NifFile>,
    group: &'l str,
    skeleton: Option<&'l SkeletonHandle>,
    /// The path from the root to the current node, to not loop on malformed graphs
    ancestors: Vec<RecordLink>,
    meshes: Vec<(MeshHandle, String)>,
}

impl SceneWalker<'_, '_> {
    /// Visits the node and its descendants in pre-order. The flags of the ancestors are inherited.
    fn create_meshes(&mut self, link: RecordLink, mut flags: NodeFlags) -> Result<(), LoadError> {
        let nif = self.nif;
        let node = nif.node(link)?;
        flags |= node.flags;

        for extra in nif.extra_data_chain(node) {
            let extra = extra?;
            match &extra.kind {
                // String markers may affect the entire subtree
                ExtraDataKind::String(marker) if marker == MARKER_STRING => flags |= NodeFlags::HIDDEN,
                ExtraDataKind::String(_) => {}
                _ => warn!("Unhandled extra data type {}", extra.record_name()),
            }
        }

        match &node.kind {
            NodeKind::NiTriShape(shape) => {
                let mesh = self.declare_mesh(node, shape, flags)?;
                // instanced shapes report the parent they have been reached through
                let parent_name = match self.ancestors.last().copied().or(node.parent) {
                    Some(parent) => nif.node(parent)?.name.clone(),
                    None => String::new(),
                };
                self.meshes.push((mesh, parent_name));
            }
            NodeKind::NiNode { .. } | NodeKind::RootCollisionNode { .. } | NodeKind::NiRotatingParticles => {}
            _ => warn!("Unhandled mesh node type: {}", node.record_name()),
        }

        self.ancestors.push(link);
        for &child in node.children().iter().flatten() {
            if self.ancestors.contains(&child) {
                warn!("Node {} is its own ancestor, skipping it", nif.node(child)?.name);
                continue;
            }
            self.create_meshes(child, flags)?;
        }
        self.ancestors.pop();

        Ok(())
    }

    fn declare_mesh(&self, node: &Node, shape: &NiTriShape, flags: NodeFlags) -> Result<MeshHandle, LoadError> {
        let resources = self.loader.resources;
        let full_name = format!("{}@{}", self.nif.name, node.name);

        if let Some(mesh) = resources.mesh(&full_name) {
            trace!("Reusing mesh {}", full_name);
            return Ok(mesh);
        }

        let mesh_loader = self
            .loader
            .registries
            .mesh_loaders
            .get_or_try_insert_with(&full_name, || -> Result<NifMeshLoader, LoadError> {
                let mut mesh_loader = NifMeshLoader::new(&self.nif.name, self.group, self.skeleton.cloned());

                // Hidden shapes still get a mesh, but it stays empty
                if !flags.contains(NodeFlags::HIDDEN) {
                    let materials = MaterialImporter::new(
                        resources,
                        &self.loader.registries.materials,
                        self.loader.settings,
                    );
                    let material_name = materials.resolve(self.nif, shape, &full_name, self.group)?;
                    mesh_loader = mesh_loader.with_shape(&node.name, material_name, self.nif.clone());
                }

                Ok(mesh_loader)
            })?;

        Ok(resources.create_manual_mesh(&full_name, self.group, mesh_loader))
    }
}

/// Converts one shape of a NIF into the mesh it has been declared as.
pub struct NifMeshLoader {
    name: String,
    group: String,
    shape_name: Option<String>,
    material_name: Option<String>,
    skeleton: Option<SkeletonHandle>,
    /// Released once the mesh has been built
    source: ArcSwapOption<NifFile>,
}

impl NifMeshLoader {
    pub fn new(name: &str, group: &str, skeleton: Option<SkeletonHandle>) -> Self {
        Self {
            name: name.to_string(),
            group: group.to_string(),
            shape_name: None,
            material_name: None,
            skeleton,
            source: ArcSwapOption::empty(),
        }
    }

    pub fn with_shape(mut self, shape_name: &str, material_name: Option<String>, source: Arc<NifFile>) -> Self {
        self.shape_name = Some(shape_name.to_string());
        self.material_name = material_name;
        self.source = ArcSwapOption::new(Some(source));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn shape_name(&self) -> Option<&str> {
        self.shape_name.as_deref()
    }

    pub fn material_name(&self) -> Option<&str> {
        self.material_name.as_deref()
    }

    pub fn holds_source(&self) -> bool {
        self.source.load().is_some()
    }

    /// Depth first search for the NiTriShape named `shape_name`. The first match wins.
    pub fn find_tri_shape(nif: &NifFile, root: RecordLink, shape_name: &str) -> Result<Option<RecordLink>, NifError> {
        let mut visited = HashSet::new();
        let mut stack = vec![root];

        while let Some(link) = stack.pop() {
            if !visited.insert(link) {
                continue;
            }

            let node = nif.node(link)?;
            if node.tri_shape().is_some() && node.name == shape_name {
                return Ok(Some(link));
            }

            stack.extend(node.children().iter().rev().flatten().copied());
        }

        Ok(None)
    }
}

impl ManualResourceLoader for NifMeshLoader {
    fn load_resource(&self, resource: &mut Resource) -> Result<(), LoadError> {
        let found = resource.kind_name();
        let Resource::Mesh(mesh) = resource else {
            return Err(LoadError::ResourceTypeMismatch {
                name: self.name.clone(),
                expected: "Mesh",
                found,
            });
        };

        let skeleton = self
            .skeleton
            .as_ref()
            .map(|skeleton| skeleton.load())
            .transpose()?;

        let Some(shape_name) = &self.shape_name else {
            // placeholders only carry the skeleton
            mesh.skeleton_name = skeleton.map(|skeleton| skeleton.name.clone());
            return Ok(());
        };

        let nif = self.source.load_full().ok_or_else(|| LoadError::SourceReleased {
            name: mesh.name.clone(),
        })?;

        let link = Self::find_tri_shape(&nif, ROOT, shape_name)?.ok_or_else(|| LoadError::ShapeNotFound {
            asset: self.name.clone(),
            shape: shape_name.clone(),
        })?;

        let binding = match skeleton.as_deref() {
            Some(skeleton) => MeshBinding::Skeleton(skeleton),
            None => MeshBinding::Static,
        };
        MeshImporter::create_sub_mesh(&nif, link, mesh, binding, self.material_name.as_deref())?;

        self.source.store(None);
        Ok(())
    }
}

/// Builds the skeleton of a skinned NIF, starting at its root node.
pub struct NifSkeletonLoader {
    name: String,
    source: ArcSwapOption<NifFile>,
}

impl NifSkeletonLoader {
    pub fn new(source: Arc<NifFile>) -> Self {
        Self {
            name: source.name.clone(),
            source: ArcSwapOption::new(Some(source)),
        }
    }
}

impl ManualResourceLoader for NifSkeletonLoader {
    fn load_resource(&self, resource: &mut Resource) -> Result<(), LoadError> {
        let found = resource.kind_name();
        let Resource::Skeleton(skeleton) = resource else {
            return Err(LoadError::ResourceTypeMismatch {
                name: self.name.clone(),
                expected: "Skeleton",
                found,
            });
        };

        let nif = self.source.load_full().ok_or_else(|| LoadError::SourceReleased {
            name: self.name.clone(),
        })?;

        SkeletonImporter::build_bones(&nif, ROOT, skeleton)?;
        debug!("Built skeleton {} with {} bones", self.name, skeleton.bones().len());

        self.source.store(None);
        Ok(())
    }
}
