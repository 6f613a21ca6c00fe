use glam::Vec4;
use log::{debug, trace, warn};
use nif_files::nif::graph::NifFile;
use nif_files::nif::types::{
    AlphaFlags, NiAlphaProperty, NiMaterialProperty, NiTexturingProperty, NiTriShape, PropertyKind, TextureSource,
};

use crate::rendering::LoadError;
use crate::rendering::asset_graph::registry::MaterialRegistry;
use crate::rendering::backend::ResourceManager;
use crate::rendering::common::nif_conversions::vec3;
use crate::rendering::common::types::{Material, Pass, Technique, TextureUnit, TransparencyType};
use crate::settings::RenderSettings;

pub const TEXTURE_DIRECTORY: &str = "textures\\";
pub const FALLBACK_SCHEME: &str = "Fallback";
pub const NO_ALPHA_SHADOW_CASTER: &str = "depth_shadow_caster_noalpha";

/// The properties of a shape that are relevant for its material. When a kind of property occurs
/// more than once, the last one wins.
#[derive(Debug, Default)]
struct ShapeProperties<'a> {
    texturing: Option<&'a NiTexturingProperty>,
    material: Option<&'a NiMaterialProperty>,
    alpha: Option<&'a NiAlphaProperty>,
}

impl<'a> ShapeProperties<'a> {
    fn collect(nif: &'a NifFile, shape: &NiTriShape) -> Result<Self, LoadError> {
        let mut properties = ShapeProperties::default();

        for &link in shape.properties.iter().flatten() {
            let property = nif.property(link)?;
            match &property.kind {
                PropertyKind::Texturing(texturing) => properties.texturing = Some(texturing),
                PropertyKind::Material(material) => properties.material = Some(material),
                PropertyKind::Alpha(alpha) => properties.alpha = Some(alpha),
                PropertyKind::Other { record_name } => warn!("Skipped property type: {}", record_name),
            }
        }

        Ok(properties)
    }
}

/// Derives the materials of shapes, creating each material only once per texture.
pub struct MaterialImporter<'a> {
    resources: &'a dyn ResourceManager,
    registry: &'a MaterialRegistry,
    settings: &'a RenderSettings,
}

impl<'a> MaterialImporter<'a> {
    pub fn new(resources: &'a dyn ResourceManager, registry: &'a MaterialRegistry, settings: &'a RenderSettings) -> Self {
        Self {
            resources,
            registry,
            settings,
        }
    }

    /// Returns the name of the material to render `shape` with, creating it as `name` if needed.
    /// `None` means that the shape has nothing that warrants a material and the renderer's default
    /// should be used.
    pub fn resolve(&self, nif: &NifFile, shape: &NiTriShape, name: &str, group: &str) -> Result<Option<String>, LoadError> {
        if self.resources.material(name).is_some() {
            return Ok(Some(name.to_string()));
        }

        let properties = ShapeProperties::collect(nif, shape)?;
        let texture_name = self.texture_name(nif, properties.texturing)?;

        if properties.material.is_none() && texture_name.is_none() {
            trace!("{} has neither a material nor a texture", name);
            return Ok(None);
        }

        if let Some(existing) = texture_name
            .as_deref()
            .and_then(|texture_name| self.registry.material_for_texture(texture_name))
        {
            trace!("Reusing material {} for {}", existing, name);
            return Ok(Some(existing));
        }

        let material = self.create_material(name, group, texture_name.as_deref(), &properties);
        let material_name = match &texture_name {
            Some(texture_name) => self.registry.register(texture_name, &material.name),
            None => material.name.clone(),
        };

        // if another load has registered a material for this texture in the meantime, we don't
        // need ours.
        if material_name == material.name {
            self.resources.add_material(material);
        }
        Ok(Some(material_name))
    }

    /// Rewrites the path of the base texture into the path the renderer knows it under.
    fn texture_name(
        &self,
        nif: &NifFile,
        texturing: Option<&NiTexturingProperty>,
    ) -> Result<Option<String>, LoadError> {
        let Some(slot) = texturing.and_then(NiTexturingProperty::base_texture) else {
            return Ok(None);
        };

        let Some(texture) = slot.texture else {
            return Ok(None);
        };

        match &nif.source_texture(texture)?.source {
            TextureSource::External { filename } => Ok(Some(self.resolve_texture_path(filename))),
            TextureSource::Internal { .. } => {
                warn!("Found internal texture, ignoring.");
                Ok(None)
            }
        }
    }

    /// The textures have been converted from tga to dds at some point, without updating the
    /// references to them. When the referenced file doesn't exist, the dds one is used instead.
    pub fn resolve_texture_path(&self, filename: &str) -> String {
        let texture_name = format!("{}{}", TEXTURE_DIRECTORY, filename);
        if self.resources.resource_exists_in_any_group(&texture_name) {
            return texture_name;
        }

        // only a dot within the file name starts an extension, not one in a directory name
        let file_start = texture_name.rfind(['\\', '/']).map_or(0, |pos| pos + 1);
        let stem = match texture_name[file_start..].rfind('.') {
            Some(pos) => &texture_name[..file_start + pos],
            None => texture_name.as_str(),
        };
        format!("{}.dds", stem)
    }

    fn create_material(
        &self,
        name: &str,
        group: &str,
        texture_name: Option<&str>,
        properties: &ShapeProperties,
    ) -> Material {
        debug!("Creating material {} (texture: {:?})", name, texture_name);
        let colours = properties.material.copied().unwrap_or_default();

        let mut technique = Technique::default();
        let mut pass = Pass::default();

        if let Some(texture_name) = texture_name {
            pass.texture_units.push(TextureUnit::Texture {
                texture_name: texture_name.to_string(),
            });
            pass.diffuse_vertex_colour_tracking = true;

            match properties.alpha {
                Some(alpha) => pass.transparency = self.transparency(alpha, texture_name),
                None => technique.shadow_caster_material = Some(NO_ALPHA_SHADOW_CASTER.to_string()),
            }
        }

        for split in 0..self.settings.shadow_map_count() {
            pass.texture_units.push(TextureUnit::Shadow {
                name: format!("shadowMap{}", split),
                border_colour: Vec4::ONE,
            });
        }

        if self.settings.object_shaders {
            pass.vertex_program = Some("main_vp".to_string());
            pass.fragment_program = Some("main_fp".to_string());
            pass.shader_fog = true;
        }
        technique.passes.push(pass);

        Material {
            name: name.to_string(),
            group: group.to_string(),
            ambient: vec3(&colours.ambient),
            diffuse: vec3(&colours.diffuse).extend(colours.alpha),
            specular: vec3(&colours.specular).extend(colours.alpha),
            self_illumination: vec3(&colours.emissive),
            shininess: colours.glossiness,
            techniques: vec![technique, self.fallback_technique(texture_name)],
        }
    }

    /// Only the most common flags (237, src alpha / one minus src alpha blending) are understood.
    /// For those, an artist may override the blending with an alpha cutout.
    fn transparency(&self, alpha: &NiAlphaProperty, texture_name: &str) -> TransparencyType {
        let flags = alpha.flags;
        if flags.bits() != NiAlphaProperty::DEFAULT_TRANSPARENCY || !flags.contains(AlphaFlags::BLEND) {
            warn!("Unhandled alpha setting for texture {}", texture_name);
            return TransparencyType::Opaque;
        }

        match self
            .settings
            .transparency_overrides
            .transparency_override(texture_name)
        {
            Some(threshold) => TransparencyType::Cutout { threshold },
            None => TransparencyType::Blend {
                source: flags.source_blend(),
                destination: flags.destination_blend(),
            },
        }
    }

    /// A technique without shadows, for hardware that can't do the primary one.
    fn fallback_technique(&self, texture_name: Option<&str>) -> Technique {
        let mut pass = Pass {
            diffuse_vertex_colour_tracking: true,
            ..Default::default()
        };

        if let Some(texture_name) = texture_name {
            pass.texture_units.push(TextureUnit::Texture {
                texture_name: texture_name.to_string(),
            });
        }

        if self.settings.object_shaders {
            pass.vertex_program = Some("main_fallback_vp".to_string());
            pass.fragment_program = Some("main_fallback_fp".to_string());
            pass.shader_fog = true;
        }

        Technique {
            scheme: Some(FALLBACK_SCHEME.to_string()),
            shadow_caster_material: None,
            passes: vec![pass],
        }
    }
}
