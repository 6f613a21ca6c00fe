use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use nif_files::nif::graph::NifFile;

use nifrend::rendering::asset_graph::AssetRegistries;
use nifrend::rendering::backend::memory::MemoryResourceManager;
use nifrend::rendering::backend::ResourceManager;
use nifrend::rendering::importer::material_importer::TEXTURE_DIRECTORY;
use nifrend::rendering::loader::nif_loader::NifLoader;
use nifrend::settings::{CliArgs, RenderSettings};

const TEXTURE_GROUP: &str = "Textures";

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    let settings = RenderSettings::from_args(&args)?;
    let resources = MemoryResourceManager::new();
    if let Some(texture_dir) = &args.texture_dir {
        declare_textures(&resources, Path::new(texture_dir))?;
    }

    let json = std::fs::read_to_string(&args.file).with_context(|| format!("Reading {}", args.file))?;
    let mut nif: NifFile = serde_json::from_str(&json).with_context(|| format!("Parsing {}", args.file))?;
    if let Some(name) = &args.name {
        nif.name = name.clone();
    } else if nif.name.is_empty() {
        nif.name = args.file.clone();
    }
    nif.mark_skin_bones()?;

    let registries = AssetRegistries::new();
    let loader = NifLoader::new(&resources, &registries, &settings);
    let loaded = loader.load(Arc::new(nif), &args.group)?;

    if let Some(skeleton) = &loaded.skeleton {
        let skeleton = skeleton.load()?;
        info!("Skeleton {}: {} bones", skeleton.name, skeleton.bones().len());
    }

    for (mesh, parent) in &loaded.meshes {
        let mesh = mesh.load()?;
        info!(
            "Mesh {} (attached to {:?}): {} sub meshes, bounding radius {}",
            mesh.name,
            parent,
            mesh.sub_meshes.len(),
            mesh.bounding_radius
        );

        for sub_mesh in &mesh.sub_meshes {
            let material = sub_mesh
                .material_name
                .as_deref()
                .and_then(|name| resources.material(name));
            info!(
                "  {}: {} vertices, {} indices, {} bone assignments, texture {:?}",
                sub_mesh.name,
                sub_mesh.vertex_data.vertex_count,
                sub_mesh.index_data.index_count,
                sub_mesh.bone_assignments.len(),
                material.as_ref().and_then(|material| material.texture_name())
            );
        }
    }

    info!(
        "{} meshes, {} materials, {} skeletons",
        resources.mesh_count(),
        resources.material_count(),
        resources.skeleton_count()
    );
    Ok(())
}

/// Makes the files of `dir` known to the texture lookup, so that references to them are not
/// redirected to their dds variant.
fn declare_textures(resources: &MemoryResourceManager, dir: &Path) -> Result<(), anyhow::Error> {
    for entry in std::fs::read_dir(dir).with_context(|| format!("Reading texture directory {:?}", dir))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        match entry.file_name().to_str() {
            Some(file_name) => resources.declare_resource(TEXTURE_GROUP, &format!("{}{}", TEXTURE_DIRECTORY, file_name)),
            None => warn!("Skipping texture with non UTF-8 name {:?}", entry.file_name()),
        }
    }
    Ok(())
}
