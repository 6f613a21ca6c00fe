/// The record arena and the helpers to link records into a graph.
pub mod graph;
/// The records themselves, named after their on-disk counterparts.
pub mod types;
