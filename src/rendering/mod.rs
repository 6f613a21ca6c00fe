use nif_files::NifError;
use thiserror::Error;

pub mod asset_graph;
pub mod backend;
pub mod common;
pub mod importer;
pub mod loader;

/// Errors that abort the conversion of an asset. They all mean that the record graph (or the
/// resource setup) breaks a contract the conversion relies on, things that merely degrade the
/// result are logged as warnings instead.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Resource {name} was requested as {expected}, but is a {found}")]
    ResourceTypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Nif(#[from] NifError),

    #[error("Skeleton {skeleton} has no bone named {bone}")]
    MissingBone { skeleton: String, bone: String },

    /// Bone handles are 16 bit
    #[error("Skeleton {skeleton} exceeds the limit of {limit} bones")]
    TooManyBones { skeleton: String, limit: usize },

    #[error("Mesh {mesh} is skinned, but there is no skeleton to bind it to")]
    MissingSkeleton { mesh: String },

    #[error("Could not find shape {shape} in {asset}")]
    ShapeNotFound { asset: String, shape: String },

    #[error("Invalid geometry in shape {shape}: {reason}")]
    InvalidGeometry { shape: String, reason: String },

    /// The source graph has already been released after a previous load
    #[error("The source of {name} is no longer available")]
    SourceReleased { name: String },
}
