pub mod bounds;
/// Converts the plain value types of nif-files into glam types.
pub mod nif_conversions;
/// basic types (e.g. mesh) to abstract away from both the asset format and the render backend.
pub mod types;
