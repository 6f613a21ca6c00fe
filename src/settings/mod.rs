use std::collections::HashMap;
use std::path::Path;

use clap::Parser;
use log::debug;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "nifrend")]
#[command(version)]
#[command(about = "Converts a (JSON serialized) NIF record graph into renderer resources")]
pub struct CliArgs {
    /// The record graph, as written by the serde representation of nif-files
    pub file: String,

    /// The asset name the graph is registered under, defaults to the file name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, default_value = "General", env = "NIFREND_GROUP")]
    pub group: String,

    #[arg(long, env = "NIFREND_SHADOWS")]
    pub shadows: bool,

    #[arg(long, env = "NIFREND_SPLIT_SHADOWS")]
    pub split_shadows: bool,

    #[arg(long, env = "NIFREND_SHADERS")]
    pub shaders: bool,

    /// JSON object of texture path to alpha cutout threshold
    #[arg(long, env = "NIFREND_OVERRIDES")]
    pub overrides: Option<String>,

    /// Directory whose files are known to the texture lookup (as `textures\<file name>`)
    #[arg(long, env = "NIFREND_TEXTURE_DIR")]
    pub texture_dir: Option<String>,
}

/// Artist supplied alpha cutout thresholds. Textures listed here are rendered with alpha rejection
/// instead of alpha blending. Keys are texture paths, compared case insensitive.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "HashMap<String, u8>")]
pub struct TransparencyOverrides {
    thresholds: HashMap<String, u8>,
}

impl TransparencyOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let json = std::fs::read_to_string(path)?;
        let overrides = Self::from_json(&json)?;
        debug!("Read {} transparency overrides from {:?}", overrides.len(), path);
        Ok(overrides)
    }

    pub fn insert(&mut self, texture: &str, threshold: u8) {
        self.thresholds.insert(texture.to_lowercase(), threshold);
    }

    pub fn transparency_override(&self, texture: &str) -> Option<u8> {
        self.thresholds.get(&texture.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}

impl From<HashMap<String, u8>> for TransparencyOverrides {
    fn from(thresholds: HashMap<String, u8>) -> Self {
        let mut overrides = Self::new();
        for (texture, threshold) in thresholds {
            overrides.insert(&texture, threshold);
        }
        overrides
    }
}

/// The parts of the renderer configuration that influence how materials are built.
#[derive(Debug, Clone, Default)]
pub struct RenderSettings {
    pub shadows_enabled: bool,
    /// Use parallel split shadow maps (3 instead of 1 shadow texture)
    pub shadows_split: bool,
    /// Use the object shaders instead of the fixed function pipeline
    pub object_shaders: bool,
    pub transparency_overrides: TransparencyOverrides,
}

impl RenderSettings {
    pub const SHADOW_SPLITS: usize = 3;

    pub fn from_args(args: &CliArgs) -> Result<Self, anyhow::Error> {
        let transparency_overrides = match &args.overrides {
            Some(path) => TransparencyOverrides::from_file(Path::new(path))?,
            None => TransparencyOverrides::new(),
        };

        Ok(Self {
            shadows_enabled: args.shadows,
            shadows_split: args.split_shadows,
            object_shaders: args.shaders,
            transparency_overrides,
        })
    }

    pub fn shadow_map_count(&self) -> usize {
        match (self.shadows_enabled, self.shadows_split) {
            (false, _) => 0,
            (true, false) => 1,
            (true, true) => Self::SHADOW_SPLITS,
        }
    }
}
