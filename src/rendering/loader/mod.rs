/// Contrasting to the importers, that convert single records into our rendering IR, loaders are a
/// lot more high level. They walk whole files, deduplicate through the registries and declare the
/// resulting resources, handing the importers to the renderer as deferred loaders.
pub mod nif_loader;
