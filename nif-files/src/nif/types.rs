use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::common::types::{Color4, NiTransform, Vector2, Vector3};

/// Index of a record inside of [`crate::nif::graph::NifFile`]. Links between records are always
/// expressed as these indices, so the same record may be referenced from multiple places.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecordLink(pub usize);

/// Lists of links may contain empty entries (a `-1` on disk).
pub type RecordList = Vec<Option<RecordLink>>;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Record {
    Node(Node),
    TriShapeData(NiTriShapeData),
    SkinInstance(NiSkinInstance),
    SkinData(NiSkinData),
    Property(NiProperty),
    SourceTexture(NiSourceTexture),
    ExtraData(NiExtraData),
    /// Anything the consumers don't care about (controllers, keyframe data, ...)
    Other { record_name: String },
}

impl Record {
    pub fn record_name(&self) -> &str {
        match self {
            Record::Node(node) => node.record_name(),
            Record::TriShapeData(_) => "NiTriShapeData",
            Record::SkinInstance(_) => "NiSkinInstance",
            Record::SkinData(_) => "NiSkinData",
            Record::Property(prop) => prop.record_name(),
            Record::SourceTexture(_) => "NiSourceTexture",
            Record::ExtraData(extra) => extra.record_name(),
            Record::Other { record_name } => record_name,
        }
    }
}

bitflags! {
    /// The flags of NiAVObject. Only a few bits are understood, unknown bits are retained.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct NodeFlags: u16 {
        /// Also used for editor-only marker objects
        const HIDDEN = 0x0001;
        const MESH_COLLISION = 0x0002;
        const BBOX_COLLISION = 0x0004;

        const _ = !0;
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    pub name: String,
    pub flags: NodeFlags,
    pub transform: NiTransform,
    /// Head of the singly linked extra data list
    pub extra: Option<RecordLink>,
    /// The node this node has been attached to. With instancing there can be more than one node
    /// referencing this one as child, this is the first one.
    pub parent: Option<RecordLink>,
    /// Set on nodes that are used as bones by any skin instance: the bind transformation from
    /// the skin data.
    pub bone_transform: Option<NiTransform>,
    pub bone_index: Option<usize>,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            flags: NodeFlags::empty(),
            transform: NiTransform::IDENTITY,
            extra: None,
            parent: None,
            bone_transform: None,
            bone_index: None,
            kind,
        }
    }

    pub fn with_transform(mut self, transform: NiTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn record_name(&self) -> &'static str {
        self.kind.record_name()
    }

    /// The children of any NiNode-derived node, empty for leaves.
    pub fn children(&self) -> &[Option<RecordLink>] {
        match &self.kind {
            NodeKind::NiNode { children }
            | NodeKind::RootCollisionNode { children }
            | NodeKind::NiBSAnimationNode { children }
            | NodeKind::NiBSParticleNode { children } => children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut RecordList> {
        match &mut self.kind {
            NodeKind::NiNode { children }
            | NodeKind::RootCollisionNode { children }
            | NodeKind::NiBSAnimationNode { children }
            | NodeKind::NiBSParticleNode { children } => Some(children),
            _ => None,
        }
    }

    /// Whether this is a NiNode (or derived from it), independent of whether it has any children.
    pub fn can_have_children(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::NiNode { .. }
                | NodeKind::RootCollisionNode { .. }
                | NodeKind::NiBSAnimationNode { .. }
                | NodeKind::NiBSParticleNode { .. }
        )
    }

    pub fn tri_shape(&self) -> Option<&NiTriShape> {
        match &self.kind {
            NodeKind::NiTriShape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn is_bone(&self) -> bool {
        self.bone_transform.is_some()
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeKind {
    NiNode { children: RecordList },
    RootCollisionNode { children: RecordList },
    NiBSAnimationNode { children: RecordList },
    NiBSParticleNode { children: RecordList },
    NiTriShape(NiTriShape),
    NiRotatingParticles,
    NiAutoNormalParticles,
    NiCamera,
}

impl NodeKind {
    pub fn node() -> Self {
        NodeKind::NiNode { children: vec![] }
    }

    pub fn record_name(&self) -> &'static str {
        match self {
            NodeKind::NiNode { .. } => "NiNode",
            NodeKind::RootCollisionNode { .. } => "RootCollisionNode",
            NodeKind::NiBSAnimationNode { .. } => "NiBSAnimationNode",
            NodeKind::NiBSParticleNode { .. } => "NiBSParticleNode",
            NodeKind::NiTriShape(_) => "NiTriShape",
            NodeKind::NiRotatingParticles => "NiRotatingParticles",
            NodeKind::NiAutoNormalParticles => "NiAutoNormalParticles",
            NodeKind::NiCamera => "NiCamera",
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NiTriShape {
    /// Link to a [`NiTriShapeData`]
    pub data: RecordLink,
    /// Link to a [`NiSkinInstance`]
    pub skin: Option<RecordLink>,
    pub properties: RecordList,
}

impl NiTriShape {
    pub fn new(data: RecordLink) -> Self {
        Self {
            data,
            skin: None,
            properties: vec![],
        }
    }
}

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NiTriShapeData {
    pub vertices: Vec<Vector3>,
    /// Either empty or one per vertex
    pub normals: Vec<Vector3>,
    pub colors: Vec<Color4>,
    /// Every set has one entry per vertex
    pub uv_sets: Vec<Vec<Vector2>>,
    /// Triangle list, three indices per face
    pub triangles: Vec<u16>,
}

impl NiTriShapeData {
    pub fn new(vertices: Vec<Vector3>, triangles: Vec<u16>) -> Self {
        Self {
            vertices,
            triangles,
            ..Default::default()
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NiSkinInstance {
    /// Link to a [`NiSkinData`]
    pub data: RecordLink,
    pub root: Option<RecordLink>,
    /// One node per entry in [`NiSkinData::bones`], in the same order
    pub bones: RecordList,
}

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NiSkinData {
    pub transform: NiTransform,
    pub bones: Vec<SkinBoneData>,
}

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SkinBoneData {
    /// Transforms from skin (mesh) space into bone space at bind time
    pub transform: NiTransform,
    pub bounding_sphere_offset: Vector3,
    pub bounding_sphere_radius: f32,
    /// Sparse, not every vertex is influenced by every bone
    pub weights: Vec<VertexWeight>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexWeight {
    pub vertex: u16,
    pub weight: f32,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NiProperty {
    pub name: String,
    pub flags: u16,
    pub kind: PropertyKind,
}

impl NiProperty {
    pub fn new(kind: PropertyKind) -> Self {
        Self {
            name: String::new(),
            flags: 0,
            kind,
        }
    }

    pub fn record_name(&self) -> &str {
        match &self.kind {
            PropertyKind::Texturing(_) => "NiTexturingProperty",
            PropertyKind::Material(_) => "NiMaterialProperty",
            PropertyKind::Alpha(_) => "NiAlphaProperty",
            PropertyKind::Other { record_name } => record_name,
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PropertyKind {
    Texturing(NiTexturingProperty),
    Material(NiMaterialProperty),
    Alpha(NiAlphaProperty),
    /// e.g. NiZBufferProperty, NiVertexColorProperty, NiSpecularProperty, NiWireframeProperty
    Other { record_name: String },
}

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NiTexturingProperty {
    pub apply_mode: u32,
    /// base, dark, detail, gloss, glow, bump map, decal. Only the first one (base) is really used.
    pub textures: Vec<TextureSlot>,
}

impl NiTexturingProperty {
    pub const BASE_TEXTURE: usize = 0;

    pub fn with_base_texture(texture: RecordLink) -> Self {
        Self {
            apply_mode: 2,
            textures: vec![TextureSlot::new(texture)],
        }
    }

    pub fn base_texture(&self) -> Option<&TextureSlot> {
        self.textures
            .get(Self::BASE_TEXTURE)
            .filter(|slot| slot.in_use)
    }
}

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextureSlot {
    pub in_use: bool,
    /// Link to a [`NiSourceTexture`]
    pub texture: Option<RecordLink>,
    pub clamp: u32,
    pub filter: u32,
    pub uv_set: u32,
}

impl TextureSlot {
    pub fn new(texture: RecordLink) -> Self {
        Self {
            in_use: true,
            texture: Some(texture),
            clamp: 3,
            filter: 2,
            uv_set: 0,
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NiSourceTexture {
    pub source: TextureSource,
}

impl NiSourceTexture {
    pub fn external(filename: impl Into<String>) -> Self {
        Self {
            source: TextureSource::External {
                filename: filename.into(),
            },
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TextureSource {
    /// A path relative to the textures directory
    External { filename: String },
    /// Pixel data embedded into the file, link to the NiPixelData
    Internal { data: Option<RecordLink> },
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NiMaterialProperty {
    pub ambient: Vector3,
    pub diffuse: Vector3,
    pub specular: Vector3,
    pub emissive: Vector3,
    pub glossiness: f32,
    pub alpha: f32,
}

impl Default for NiMaterialProperty {
    fn default() -> Self {
        Self {
            ambient: Vector3::new(1.0, 1.0, 1.0),
            diffuse: Vector3::new(1.0, 1.0, 1.0),
            specular: Vector3::ZERO,
            emissive: Vector3::ZERO,
            glossiness: 0.0,
            alpha: 1.0,
        }
    }
}

bitflags! {
    /// The partially understood bit layout of NiAlphaProperty flags:
    /// bit 0 blending, bits 1-4 source factor, bits 5-8 destination factor. The remaining bits
    /// (alpha test, test function, sorting) are kept as they are.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct AlphaFlags: u16 {
        const BLEND = 1;

        const _ = !0;
    }
}

/// Blend factors as they appear in [`AlphaFlags`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlendFactor {
    One,
    Zero,
    SrcColor,
    OneMinusSrcColor,
    DestColor,
    OneMinusDestColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DestAlpha,
    OneMinusDestAlpha,
    SrcAlphaSaturate,
    Unknown(u8),
}

impl From<u8> for BlendFactor {
    fn from(value: u8) -> Self {
        match value {
            0 => BlendFactor::One,
            1 => BlendFactor::Zero,
            2 => BlendFactor::SrcColor,
            3 => BlendFactor::OneMinusSrcColor,
            4 => BlendFactor::DestColor,
            5 => BlendFactor::OneMinusDestColor,
            6 => BlendFactor::SrcAlpha,
            7 => BlendFactor::OneMinusSrcAlpha,
            8 => BlendFactor::DestAlpha,
            9 => BlendFactor::OneMinusDestAlpha,
            10 => BlendFactor::SrcAlphaSaturate,
            other => BlendFactor::Unknown(other),
        }
    }
}

impl AlphaFlags {
    pub fn source_blend(&self) -> BlendFactor {
        BlendFactor::from(((self.bits() >> 1) & 0xF) as u8)
    }

    pub fn destination_blend(&self) -> BlendFactor {
        BlendFactor::from(((self.bits() >> 5) & 0xF) as u8)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NiAlphaProperty {
    pub flags: AlphaFlags,
    pub threshold: u8,
}

impl NiAlphaProperty {
    /// By far the most common value: blending with src alpha / one minus src alpha.
    pub const DEFAULT_TRANSPARENCY: u16 = 237;

    pub fn new(flags: u16, threshold: u8) -> Self {
        Self {
            flags: AlphaFlags::from_bits_retain(flags),
            threshold,
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NiExtraData {
    /// The next entry of the extra data list
    pub next: Option<RecordLink>,
    pub kind: ExtraDataKind,
}

impl NiExtraData {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            next: None,
            kind: ExtraDataKind::String(value.into()),
        }
    }

    pub fn record_name(&self) -> &str {
        match &self.kind {
            ExtraDataKind::String(_) => "NiStringExtraData",
            ExtraDataKind::TextKeys(_) => "NiTextKeyExtraData",
            ExtraDataKind::Other { record_name } => record_name,
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExtraDataKind {
    String(String),
    TextKeys(Vec<TextKey>),
    Other { record_name: String },
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextKey {
    pub time: f32,
    pub text: String,
}
