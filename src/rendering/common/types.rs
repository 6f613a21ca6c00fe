use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use glam::{Quat, Vec2, Vec3, Vec4};
use nif_files::nif::types::BlendFactor;

use crate::rendering::LoadError;

/// Axis aligned bounding box
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufferUsage {
    StaticWriteOnly,
    /// Buffers that are expected to be re-written (e.g. by software skinning)
    DynamicWriteOnly,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VertexElementSemantic {
    Position,
    Normal,
    Diffuse,
    TextureCoordinates,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VertexElementType {
    Float2,
    Float3,
    /// 8 bit per channel RGBA
    Colour,
}

impl VertexElementType {
    pub fn size(&self) -> usize {
        match self {
            VertexElementType::Float2 => 2 * size_of::<f32>(),
            VertexElementType::Float3 => 3 * size_of::<f32>(),
            VertexElementType::Colour => 4,
        }
    }
}

/// Describes where in which buffer to find a specific vertex attribute
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexElement {
    /// The binding index of the buffer
    pub source: usize,
    /// In bytes, from the start of the buffer
    pub offset: usize,
    pub element_type: VertexElementType,
    pub semantic: VertexElementSemantic,
    /// Distinguishes multiple elements of the same semantic (e.g. UV sets)
    pub index: u16,
}

#[derive(Clone, PartialEq)]
pub enum VertexBufferData {
    Float3(Vec<Vec3>),
    Float2(Vec<Vec2>),
    Colour(Vec<[u8; 4]>),
}

#[derive(Clone, PartialEq)]
pub struct VertexBuffer {
    pub usage: BufferUsage,
    pub data: VertexBufferData,
}

impl VertexBuffer {
    pub fn new(usage: BufferUsage, data: VertexBufferData) -> Self {
        Self { usage, data }
    }

    pub fn element_type(&self) -> VertexElementType {
        match &self.data {
            VertexBufferData::Float3(_) => VertexElementType::Float3,
            VertexBufferData::Float2(_) => VertexElementType::Float2,
            VertexBufferData::Colour(_) => VertexElementType::Colour,
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            VertexBufferData::Float3(data) => data.len(),
            VertexBufferData::Float2(data) => data.len(),
            VertexBufferData::Colour(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn size_in_bytes(&self) -> usize {
        self.len() * self.element_type().size()
    }

    pub fn as_float3(&self) -> Option<&[Vec3]> {
        match &self.data {
            VertexBufferData::Float3(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_float2(&self) -> Option<&[Vec2]> {
        match &self.data {
            VertexBufferData::Float2(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_colour(&self) -> Option<&[[u8; 4]]> {
        match &self.data {
            VertexBufferData::Colour(data) => Some(data),
            _ => None,
        }
    }
}

impl Debug for VertexBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ usage: {:?}, ", self.usage)?;
        write!(f, "{:?}: [{}] }}", self.element_type(), self.len())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexData {
    pub vertex_start: usize,
    pub vertex_count: usize,
    pub declaration: Vec<VertexElement>,
    /// The binding index of a buffer is its position in this list
    pub bindings: Vec<VertexBuffer>,
}

impl VertexData {
    pub fn element(&self, semantic: VertexElementSemantic, index: u16) -> Option<&VertexElement> {
        self.declaration
            .iter()
            .find(|element| element.semantic == semantic && element.index == index)
    }

    pub fn buffer_for(&self, semantic: VertexElementSemantic) -> Option<&VertexBuffer> {
        self.element(semantic, 0)
            .and_then(|element| self.bindings.get(element.source))
    }

    pub fn positions(&self) -> Option<&[Vec3]> {
        self.buffer_for(VertexElementSemantic::Position)
            .and_then(VertexBuffer::as_float3)
    }

    pub fn normals(&self) -> Option<&[Vec3]> {
        self.buffer_for(VertexElementSemantic::Normal)
            .and_then(VertexBuffer::as_float3)
    }

    pub fn colours(&self) -> Option<&[[u8; 4]]> {
        self.buffer_for(VertexElementSemantic::Diffuse)
            .and_then(VertexBuffer::as_colour)
    }

    pub fn texture_coordinates(&self, set: u16) -> Option<&[Vec2]> {
        self.element(VertexElementSemantic::TextureCoordinates, set)
            .and_then(|element| self.bindings.get(element.source))
            .and_then(VertexBuffer::as_float2)
    }
}

#[derive(Clone, Default, PartialEq)]
pub struct IndexData {
    /// 16 bit indices, three per triangle
    pub index_buffer: Vec<u16>,
    pub index_start: usize,
    pub index_count: usize,
}

impl Debug for IndexData {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ index_buffer: [{}], ", self.index_buffer.len())?;
        write!(
            f,
            "index_start: {}, index_count: {} }}",
            self.index_start, self.index_count
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoneAssignment {
    pub vertex_index: u32,
    pub bone_handle: u16,
    pub weight: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubMesh {
    pub name: String,
    pub vertex_data: VertexData,
    pub index_data: IndexData,
    pub bone_assignments: Vec<BoneAssignment>,
    pub material_name: Option<String>,
}

/// The renderer side of a mesh resource, after its geometry has been loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub group: String,
    pub sub_meshes: Vec<SubMesh>,
    pub skeleton_name: Option<String>,
    pub bounds: Option<Aabb>,
    pub bounding_radius: f32,
}

impl MeshData {
    pub fn new(name: &str, group: &str) -> Self {
        Self {
            name: name.to_string(),
            group: group.to_string(),
            ..Default::default()
        }
    }

    pub fn sub_mesh(&self, name: &str) -> Option<&SubMesh> {
        self.sub_meshes.iter().find(|sub| sub.name == name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompareFunction {
    GreaterEqual,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TransparencyType {
    Opaque,
    /// Alpha rejection, fragments pass when their alpha is >= the threshold.
    Cutout { threshold: u8 },
    /// Alpha blending with the factors of the source flags, without writing depth.
    Blend {
        source: BlendFactor,
        destination: BlendFactor,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextureUnit {
    Texture { texture_name: String },
    /// Receives the shadow map of the given split. Addressing is clamped to a white border.
    Shadow { name: String, border_colour: Vec4 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    pub texture_units: Vec<TextureUnit>,
    /// Whether the vertex colour is used as diffuse colour
    pub diffuse_vertex_colour_tracking: bool,
    pub transparency: TransparencyType,
    pub vertex_program: Option<String>,
    pub fragment_program: Option<String>,
    /// Fog is computed by the shader programs, the fixed function fog is disabled
    pub shader_fog: bool,
}

impl Default for Pass {
    fn default() -> Self {
        Self {
            texture_units: vec![],
            diffuse_vertex_colour_tracking: false,
            transparency: TransparencyType::Opaque,
            vertex_program: None,
            fragment_program: None,
            shader_fog: false,
        }
    }
}

impl Pass {
    pub fn depth_write_enabled(&self) -> bool {
        !matches!(self.transparency, TransparencyType::Blend { .. })
    }

    pub fn alpha_reject(&self) -> Option<(CompareFunction, u8)> {
        match self.transparency {
            TransparencyType::Cutout { threshold } => Some((CompareFunction::GreaterEqual, threshold)),
            _ => None,
        }
    }

    pub fn texture_name(&self) -> Option<&str> {
        self.texture_units.iter().find_map(|unit| match unit {
            TextureUnit::Texture { texture_name } => Some(texture_name.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Technique {
    /// `None` is the default scheme
    pub scheme: Option<String>,
    pub shadow_caster_material: Option<String>,
    pub passes: Vec<Pass>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub group: String,
    pub ambient: Vec3,
    /// rgb and alpha
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub self_illumination: Vec3,
    pub shininess: f32,
    pub techniques: Vec<Technique>,
}

impl Material {
    pub fn technique(&self, scheme: Option<&str>) -> Option<&Technique> {
        self.techniques
            .iter()
            .find(|technique| technique.scheme.as_deref() == scheme)
    }

    pub fn texture_name(&self) -> Option<&str> {
        self.techniques
            .first()
            .and_then(|technique| technique.passes.first())
            .and_then(Pass::texture_name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BonePose {
    pub orientation: Quat,
    pub position: Vec3,
    pub scale: Vec3,
}

impl Default for BonePose {
    fn default() -> Self {
        Self {
            orientation: Quat::IDENTITY,
            position: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub handle: u16,
    pub name: String,
    pub parent: Option<u16>,
    pub children: Vec<u16>,
    pub pose: BonePose,
    pub binding_pose: BonePose,
    pub initial_state: BonePose,
}

impl Bone {
    pub fn set_binding_pose(&mut self) {
        self.binding_pose = self.pose;
    }

    pub fn set_initial_state(&mut self) {
        self.initial_state = self.pose;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    pub name: String,
    pub group: String,
    bones: Vec<Bone>,
    bones_by_name: HashMap<String, u16>,
}

impl Skeleton {
    pub fn new(name: &str, group: &str) -> Self {
        Self {
            name: name.to_string(),
            group: group.to_string(),
            ..Default::default()
        }
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn has_bone(&self, name: &str) -> bool {
        self.bones_by_name.contains_key(name)
    }

    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bones_by_name
            .get(name)
            .and_then(|&handle| self.bone_by_handle(handle))
    }

    pub fn bone_by_handle(&self, handle: u16) -> Option<&Bone> {
        self.bones.get(handle as usize)
    }

    pub fn bone_by_handle_mut(&mut self, handle: u16) -> Option<&mut Bone> {
        self.bones.get_mut(handle as usize)
    }

    /// Creates a bone with the given name, or an automatically named one for `None`.
    /// The caller has to make sure the name isn't taken yet, see [`Skeleton::has_bone`].
    pub fn create_bone(&mut self, name: Option<&str>) -> Result<u16, LoadError> {
        let handle = u16::try_from(self.bones.len()).map_err(|_| LoadError::TooManyBones {
            skeleton: self.name.clone(),
            limit: u16::MAX as usize + 1,
        })?;
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("Unnamed_{}", handle),
        };

        self.bones_by_name.entry(name.clone()).or_insert(handle);
        self.bones.push(Bone {
            handle,
            name,
            parent: None,
            children: vec![],
            pose: BonePose::default(),
            binding_pose: BonePose::default(),
            initial_state: BonePose::default(),
        });
        Ok(handle)
    }

    pub fn add_child(&mut self, parent: u16, child: u16) {
        if let Some(bone) = self.bone_by_handle_mut(child) {
            bone.parent = Some(parent);
        }
        if let Some(bone) = self.bone_by_handle_mut(parent) {
            bone.children.push(child);
        }
    }
}
