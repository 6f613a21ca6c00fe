use thiserror::Error;

/// Errors raised when the record graph does not look like what a consumer expects.
/// The binary parser lives elsewhere, these are all about links between already parsed records.
#[derive(Error, Debug)]
pub enum NifError {
    #[error("Record link {index} is out of range, the file only has {count} records")]
    InvalidRecordLink { index: usize, count: usize },

    #[error("Record {index} is a {found}, but a {expected} was expected")]
    RecordTypeMismatch {
        index: usize,
        expected: &'static str,
        found: String,
    },

    #[error("The record {record} is missing its mandatory {field}")]
    MissingRecord { record: String, field: &'static str },

    /// The node can't take children (e.g. a NiTriShape)
    #[error("Node {name} ({record}) can't have children")]
    NotAParent { name: String, record: &'static str },

    #[error("The parent links of node {name} form a cycle")]
    ParentCycle { name: String },

    #[error("The file contains no records")]
    EmptyFile,
}

pub mod common;
pub mod nif;
