#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::nif::types::{
    NiExtraData, NiProperty, NiSkinData, NiSkinInstance, NiSourceTexture, NiTriShapeData, Node, Record, RecordLink,
};
use crate::NifError;

/// All records of one NIF file. Records reference each other by [`RecordLink`], which keeps
/// shared (instanced) sub graphs cheap, but also means consumers have to guard against walking
/// the same node twice. The first record is the root of the scene.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NifFile {
    /// The asset name the file has been loaded from, e.g. `meshes\\r\\xcliffracer.nif`
    pub name: String,
    records: Vec<Record>,
}

macro_rules! typed_accessor {
    ($fn_name:ident, $variant:ident, $ty:ty, $expected:literal) => {
        pub fn $fn_name(&self, link: RecordLink) -> Result<&$ty, NifError> {
            match self.record(link)? {
                Record::$variant(inner) => Ok(inner),
                other => Err(NifError::RecordTypeMismatch {
                    index: link.0,
                    expected: $expected,
                    found: other.record_name().to_string(),
                }),
            }
        }
    };
}

impl NifFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn push(&mut self, record: Record) -> RecordLink {
        self.records.push(record);
        RecordLink(self.records.len() - 1)
    }

    pub fn root(&self) -> Result<&Record, NifError> {
        self.records.first().ok_or(NifError::EmptyFile)
    }

    pub fn record(&self, link: RecordLink) -> Result<&Record, NifError> {
        self.records
            .get(link.0)
            .ok_or(NifError::InvalidRecordLink {
                index: link.0,
                count: self.records.len(),
            })
    }

    fn record_mut(&mut self, link: RecordLink) -> Result<&mut Record, NifError> {
        let count = self.records.len();
        self.records
            .get_mut(link.0)
            .ok_or(NifError::InvalidRecordLink { index: link.0, count })
    }

    typed_accessor!(node, Node, Node, "Node");
    typed_accessor!(tri_shape_data, TriShapeData, NiTriShapeData, "NiTriShapeData");
    typed_accessor!(skin_instance, SkinInstance, NiSkinInstance, "NiSkinInstance");
    typed_accessor!(skin_data, SkinData, NiSkinData, "NiSkinData");
    typed_accessor!(property, Property, NiProperty, "NiProperty");
    typed_accessor!(source_texture, SourceTexture, NiSourceTexture, "NiSourceTexture");
    typed_accessor!(extra_data, ExtraData, NiExtraData, "NiExtraData");

    pub fn node_mut(&mut self, link: RecordLink) -> Result<&mut Node, NifError> {
        match self.record_mut(link)? {
            Record::Node(node) => Ok(node),
            other => Err(NifError::RecordTypeMismatch {
                index: link.0,
                expected: "Node",
                found: other.record_name().to_string(),
            }),
        }
    }

    /// Appends `child` to the children of `parent`. The first parent a node is attached to
    /// becomes its [`Node::parent`].
    pub fn add_child(&mut self, parent: RecordLink, child: RecordLink) -> Result<(), NifError> {
        // validate the child first, so we don't leave a dangling link behind.
        self.node(child)?;

        let parent_node = self.node_mut(parent)?;
        let name = parent_node.name.clone();
        let record = parent_node.record_name();
        parent_node
            .children_mut()
            .ok_or(NifError::NotAParent { name, record })?
            .push(Some(child));

        let child_node = self.node_mut(child)?;
        if child_node.parent.is_none() {
            child_node.parent = Some(parent);
        }
        Ok(())
    }

    /// Appends `extra` to the end of the extra data list of `node`.
    pub fn attach_extra_data(&mut self, node: RecordLink, extra: RecordLink) -> Result<(), NifError> {
        self.extra_data(extra)?;

        let mut tail = match self.node(node)?.extra {
            None => {
                self.node_mut(node)?.extra = Some(extra);
                return Ok(());
            }
            Some(head) => head,
        };

        let mut steps = 0;
        while let Some(next) = self.extra_data(tail)?.next {
            tail = next;
            steps += 1;
            if steps > self.records.len() {
                // the chain loops, appending would never be reached when walking it anyway
                return Ok(());
            }
        }

        if let Record::ExtraData(last) = self.record_mut(tail)? {
            last.next = Some(extra);
        }
        Ok(())
    }

    /// Walks the extra data list starting at `node`, stopping early if the list is cyclic.
    pub fn extra_data_chain(&self, node: &Node) -> ExtraDataChain<'_> {
        ExtraDataChain {
            file: self,
            next: node.extra,
            remaining: self.records.len(),
        }
    }

    /// Stamps every node that is used as bone by a skin instance with the bind transform of that
    /// bone (and its index), which is what makes a scene count as skinned.
    pub fn mark_skin_bones(&mut self) -> Result<(), NifError> {
        let mut stamps = Vec::new();
        for (index, record) in self.records.iter().enumerate() {
            let Record::SkinInstance(skin) = record else {
                continue;
            };

            let data = self.skin_data(skin.data)?;
            for (bone_index, bone) in skin.bones.iter().enumerate() {
                let Some(bone) = bone else {
                    continue;
                };

                let bone_data = data.bones.get(bone_index).ok_or(NifError::MissingRecord {
                    record: format!("NiSkinInstance {}", index),
                    field: "bone data",
                })?;
                stamps.push((*bone, bone_index, bone_data.transform));
            }
        }

        for (link, bone_index, transform) in stamps {
            let node = self.node_mut(link)?;
            node.bone_transform = Some(transform);
            node.bone_index = Some(bone_index);
        }
        Ok(())
    }
}

pub struct ExtraDataChain<'a> {
    file: &'a NifFile,
    next: Option<RecordLink>,
    remaining: usize,
}

impl<'a> Iterator for ExtraDataChain<'a> {
    type Item = Result<&'a NiExtraData, NifError>;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.next.take()?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        match self.file.record(link) {
            Ok(Record::ExtraData(extra)) => {
                self.next = extra.next;
                Some(Ok(extra))
            }
            Ok(other) => Some(Err(NifError::RecordTypeMismatch {
                index: link.0,
                expected: "NiExtraData",
                found: other.record_name().to_string(),
            })),
            Err(err) => Some(Err(err)),
        }
    }
}
