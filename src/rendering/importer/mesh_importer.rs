use glam::Vec3;
use itertools::Itertools;
use log::trace;
use nif_files::NifError;
use nif_files::nif::graph::NifFile;
use nif_files::nif::types::{NiSkinData, NiSkinInstance, NiTriShapeData, RecordLink, SkinBoneData};

use crate::rendering::LoadError;
use crate::rendering::common::bounds::BoundsFinder;
use crate::rendering::common::nif_conversions::{affine, pack_color, vec2, vec3, world_transform};
use crate::rendering::common::types::{
    BoneAssignment, BufferUsage, IndexData, MeshData, Skeleton, SubMesh, VertexBuffer, VertexBufferData, VertexData,
    VertexElement, VertexElementSemantic,
};

/// Added to every side of the bounding box.
pub const BOUNDS_PADDING: f32 = 0.5;

/// What the mesh of a shape is going to be attached to, which decides the space its vertices end
/// up in.
#[derive(Debug, Copy, Clone)]
pub enum MeshBinding<'a> {
    /// There is no skeleton, the vertices are baked into world space.
    Static,
    /// The scene has a skeleton. Unskinned shapes are kept in local space (and attached to their
    /// bone later on), skinned shapes are moved into bone space.
    Skeleton(&'a Skeleton),
}

pub struct MeshImporter {}

impl MeshImporter {
    /// Converts the NiTriShape at `link` into a sub mesh of `mesh`, named after the shape.
    pub fn create_sub_mesh(
        nif: &NifFile,
        link: RecordLink,
        mesh: &mut MeshData,
        binding: MeshBinding,
        material_name: Option<&str>,
    ) -> Result<(), LoadError> {
        profiling::scope!("MeshImporter::create_sub_mesh");

        let node = nif.node(link)?;
        let shape = node.tri_shape().ok_or_else(|| NifError::RecordTypeMismatch {
            index: link.0,
            expected: "NiTriShape",
            found: node.record_name().to_string(),
        })?;

        let data = nif.tri_shape_data(shape.data)?;
        Self::validate(&node.name, data)?;

        let mut vertices = data.vertices.iter().map(vec3).collect_vec();
        let mut normals = data.normals.iter().map(vec3).collect_vec();

        let mut bone_assignments = vec![];
        if let Some(skin_link) = shape.skin {
            let MeshBinding::Skeleton(skeleton) = binding else {
                return Err(LoadError::MissingSkeleton {
                    mesh: mesh.name.clone(),
                });
            };

            // Only skinned meshes get a skeleton, the others are attached to their bone later.
            mesh.skeleton_name = Some(skeleton.name.clone());

            let skin = nif.skin_instance(skin_link)?;
            let skin_data = nif.skin_data(skin.data)?;
            Self::validate_weights(&node.name, skin_data, vertices.len())?;

            (vertices, normals) = Self::skin_vertices(nif, &node.name, skin, skin_data, &vertices, &normals)?;
            bone_assignments = Self::bone_assignments(nif, &node.name, skin, skin_data, skeleton)?;
        } else if let MeshBinding::Static = binding {
            let world = world_transform(nif, link)?;
            vertices
                .iter_mut()
                .for_each(|vertex| *vertex = world.transform_point3(*vertex));
            normals
                .iter_mut()
                .for_each(|normal| *normal = world.transform_vector3(*normal));
        }

        let mut bounds = BoundsFinder::new();
        bounds.add(&vertices);
        mesh.bounds = bounds.aabb().map(|aabb| aabb.expanded(BOUNDS_PADDING));
        mesh.bounding_radius = bounds.radius().unwrap_or(0.0);

        let vertex_data = Self::create_vertex_data(data, vertices, normals);
        let index_data = IndexData {
            index_buffer: data.triangles.clone(),
            index_start: 0,
            index_count: data.triangles.len(),
        };

        trace!(
            "Created sub mesh {} of {}: {} vertices, {} triangles, {} bone assignments",
            node.name,
            mesh.name,
            vertex_data.vertex_count,
            data.triangle_count(),
            bone_assignments.len()
        );

        mesh.sub_meshes.push(SubMesh {
            name: node.name.clone(),
            vertex_data,
            index_data,
            bone_assignments,
            material_name: material_name.map(str::to_string),
        });
        Ok(())
    }

    fn validate(shape: &str, data: &NiTriShapeData) -> Result<(), LoadError> {
        let vertex_count = data.vertices.len();
        let invalid = |reason: String| LoadError::InvalidGeometry {
            shape: shape.to_string(),
            reason,
        };

        if data.normals.len() > vertex_count {
            return Err(invalid(format!("{} normals for {} vertices", data.normals.len(), vertex_count)));
        }

        if data.colors.len() > vertex_count {
            return Err(invalid(format!("{} colors for {} vertices", data.colors.len(), vertex_count)));
        }

        if let Some((set, uvs)) = data
            .uv_sets
            .iter()
            .find_position(|uvs| uvs.len() != vertex_count)
        {
            return Err(invalid(format!(
                "UV set {} has {} entries for {} vertices",
                set,
                uvs.len(),
                vertex_count
            )));
        }

        if let Some(index) = data.triangles.iter().find(|&&index| index as usize >= vertex_count) {
            return Err(invalid(format!("triangle index {} out of {} vertices", index, vertex_count)));
        }

        if data.triangles.len() % 3 != 0 {
            return Err(invalid(format!("{} indices are no triangle list", data.triangles.len())));
        }

        Ok(())
    }

    fn validate_weights(shape: &str, skin_data: &NiSkinData, vertex_count: usize) -> Result<(), LoadError> {
        let out_of_range = skin_data
            .bones
            .iter()
            .flat_map(|bone| bone.weights.iter())
            .find(|weight| weight.vertex as usize >= vertex_count);

        match out_of_range {
            Some(weight) => Err(LoadError::InvalidGeometry {
                shape: shape.to_string(),
                reason: format!("skin weight for vertex {} out of {} vertices", weight.vertex, vertex_count),
            }),
            None => Ok(()),
        }
    }

    /// Resolves the bone nodes of a skin along with their skin data.
    fn skin_bones<'a>(
        shape: &str,
        skin: &NiSkinInstance,
        skin_data: &'a NiSkinData,
    ) -> Result<Vec<(RecordLink, &'a SkinBoneData)>, NifError> {
        skin.bones
            .iter()
            .enumerate()
            .map(|(index, &bone)| {
                let missing = |field: &'static str| NifError::MissingRecord {
                    record: format!("NiSkinInstance of {} (bone {})", shape, index),
                    field,
                };
                let bone = bone.ok_or_else(|| missing("bone node"))?;
                let bone_data = skin_data.bones.get(index).ok_or_else(|| missing("bone data"))?;
                Ok((bone, bone_data))
            })
            .collect()
    }

    /// Moves the vertices from their bind position into the current pose of their bones, by
    /// accumulating the weighted contribution of every bone. Vertices that no bone has a weight for
    /// end up at the origin.
    fn skin_vertices(
        nif: &NifFile,
        shape: &str,
        skin: &NiSkinInstance,
        skin_data: &NiSkinData,
        vertices: &[Vec3],
        normals: &[Vec3],
    ) -> Result<(Vec<Vec3>, Vec<Vec3>), LoadError> {
        let mut skinned_vertices = vec![Vec3::ZERO; vertices.len()];
        let mut skinned_normals = vec![Vec3::ONE; normals.len()];

        for (bone, bone_data) in Self::skin_bones(shape, skin, skin_data)? {
            let transform = world_transform(nif, bone)? * affine(&bone_data.transform);

            for weight in &bone_data.weights {
                let index = weight.vertex as usize;
                skinned_vertices[index] += transform.transform_point3(vertices[index]) * weight.weight;
                if index < normals.len() {
                    skinned_normals[index] += transform.transform_vector3(normals[index]) * weight.weight;
                }
            }
        }

        Ok((skinned_vertices, skinned_normals))
    }

    fn bone_assignments(
        nif: &NifFile,
        shape: &str,
        skin: &NiSkinInstance,
        skin_data: &NiSkinData,
        skeleton: &Skeleton,
    ) -> Result<Vec<BoneAssignment>, LoadError> {
        let mut assignments = vec![];

        for (bone, bone_data) in Self::skin_bones(shape, skin, skin_data)? {
            let bone_name = &nif.node(bone)?.name;
            let bone_handle = skeleton
                .bone(bone_name)
                .ok_or_else(|| LoadError::MissingBone {
                    skeleton: skeleton.name.clone(),
                    bone: bone_name.clone(),
                })?
                .handle;

            assignments.extend(bone_data.weights.iter().map(|weight| BoneAssignment {
                vertex_index: weight.vertex as u32,
                bone_handle,
                weight: weight.weight,
            }));
        }

        Ok(assignments)
    }

    /// Positions and normals get a buffer each (they are rewritten when skinning in software),
    /// colors are packed into their own buffer and every UV set gets a buffer of its own.
    fn create_vertex_data(data: &NiTriShapeData, vertices: Vec<Vec3>, normals: Vec<Vec3>) -> VertexData {
        let vertex_count = vertices.len();
        let mut vertex_data = VertexData {
            vertex_start: 0,
            vertex_count,
            ..Default::default()
        };

        let mut add_buffer = |buffer: VertexBuffer, elements: Vec<(usize, VertexElementSemantic, u16)>| {
            let source = vertex_data.bindings.len();
            let element_type = buffer.element_type();
            vertex_data
                .declaration
                .extend(elements.into_iter().map(|(offset, semantic, index)| VertexElement {
                    source,
                    offset,
                    element_type,
                    semantic,
                    index,
                }));
            vertex_data.bindings.push(buffer);
        };

        if !vertices.is_empty() {
            add_buffer(
                VertexBuffer::new(BufferUsage::DynamicWriteOnly, VertexBufferData::Float3(vertices)),
                vec![(0, VertexElementSemantic::Position, 0)],
            );
        }

        if !normals.is_empty() {
            add_buffer(
                VertexBuffer::new(BufferUsage::DynamicWriteOnly, VertexBufferData::Float3(normals)),
                vec![(0, VertexElementSemantic::Normal, 0)],
            );
        }

        if !data.colors.is_empty() {
            let colours = data.colors.iter().map(pack_color).collect_vec();
            add_buffer(
                VertexBuffer::new(BufferUsage::StaticWriteOnly, VertexBufferData::Colour(colours)),
                vec![(0, VertexElementSemantic::Diffuse, 0)],
            );
        }

        for (set, uv_set) in data.uv_sets.iter().enumerate() {
            let uvs = uv_set.iter().map(vec2).collect_vec();
            add_buffer(
                VertexBuffer::new(BufferUsage::StaticWriteOnly, VertexBufferData::Float2(uvs)),
                vec![(0, VertexElementSemantic::TextureCoordinates, set as u16)],
            );
        }

        vertex_data
    }
}

#[cfg(test)]
mod tests {
    use crate::rendering::LoadError;
    use crate::rendering::common::types::{
        BoneAssignment, BufferUsage, MeshData, Skeleton, VertexElementSemantic,
    };
    use crate::rendering::importer::mesh_importer::{MeshBinding, MeshImporter};
    use crate::rendering::importer::skeleton_importer::SkeletonImporter;
    use glam::{Vec2, Vec3};
    use nif_files::common::types::{Color4, Matrix3, NiTransform, Vector2, Vector3};
    use nif_files::nif::graph::NifFile;
    use nif_files::nif::types::{
        NiSkinData, NiSkinInstance, NiTriShape, NiTriShapeData, Node, NodeKind, Record, RecordLink, SkinBoneData,
        VertexWeight,
    };

    fn translation(x: f32, y: f32, z: f32) -> NiTransform {
        NiTransform::from_translation(Vector3::new(x, y, z))
    }

    fn triangle() -> NiTriShapeData {
        NiTriShapeData::new(
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
        )
    }

    /// Root (translated by +10 on x) -> Shape
    fn scene(data: NiTriShapeData) -> Result<(NifFile, RecordLink, RecordLink), anyhow::Error> {
        let mut nif = NifFile::new("meshes\\test.nif");
        let root = nif.push(Record::Node(
            Node::new("Root", NodeKind::node()).with_transform(translation(10.0, 0.0, 0.0)),
        ));
        let data = nif.push(Record::TriShapeData(data));
        let shape = nif.push(Record::Node(Node::new(
            "Tri Shape",
            NodeKind::NiTriShape(NiTriShape::new(data)),
        )));
        nif.add_child(root, shape)?;
        Ok((nif, root, shape))
    }

    #[test]
    fn static_meshes_are_baked_into_world_space() -> Result<(), anyhow::Error> {
        let mut data = triangle();
        data.normals = vec![Vector3::new(0.0, 0.0, 1.0); 3];
        let (mut nif, root, shape) = scene(data)?;
        nif.node_mut(root)?.transform.rotation = Matrix3 {
            m: [[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]],
        };

        let mut mesh = MeshData::new("meshes\\test.nif@Tri Shape", "General");
        MeshImporter::create_sub_mesh(&nif, shape, &mut mesh, MeshBinding::Static, Some("material"))?;

        let sub_mesh = mesh.sub_mesh("Tri Shape").expect("sub mesh named after the shape");
        let positions = sub_mesh.vertex_data.positions().expect("positions");
        assert!(positions[1].abs_diff_eq(Vec3::new(11.0, 0.0, 0.0), 1e-5));
        assert!(positions[2].abs_diff_eq(Vec3::new(10.0, 0.0, 1.0), 1e-5));

        // normals are rotated, but not translated
        let normals = sub_mesh.vertex_data.normals().expect("normals");
        assert!(normals[0].abs_diff_eq(Vec3::new(0.0, -1.0, 0.0), 1e-5));

        let bounds = mesh.bounds.expect("bounds");
        assert!(bounds.min.abs_diff_eq(Vec3::new(9.5, -0.5, -0.5), 1e-5));
        assert!(bounds.max.abs_diff_eq(Vec3::new(11.5, 0.5, 1.5), 1e-5));
        assert!((mesh.bounding_radius - (121.0f32 + 1.0).sqrt()).abs() < 1e-4);

        assert_eq!(sub_mesh.material_name.as_deref(), Some("material"));
        assert_eq!(mesh.skeleton_name, None);
        Ok(())
    }

    #[test]
    fn unskinned_meshes_stay_local_with_a_skeleton() -> Result<(), anyhow::Error> {
        let (nif, root, shape) = scene(triangle())?;
        let mut skeleton = Skeleton::new("meshes\\test.nif", "General");
        SkeletonImporter::build_bones(&nif, root, &mut skeleton)?;

        let mut mesh = MeshData::new("meshes\\test.nif@Tri Shape", "General");
        MeshImporter::create_sub_mesh(&nif, shape, &mut mesh, MeshBinding::Skeleton(&skeleton), None)?;

        let positions = mesh.sub_meshes[0].vertex_data.positions().expect("positions");
        assert_eq!(positions[1], Vec3::X);
        assert_eq!(mesh.skeleton_name, None);
        assert!(mesh.sub_meshes[0].bone_assignments.is_empty());
        Ok(())
    }

    /// Root -> {Bone A (+x 2), Bone B (+y 4), Shape}. The bind transforms are identities, so every
    /// vertex is moved by the translation of its bones.
    fn skinned_scene(weights_a: Vec<VertexWeight>, weights_b: Vec<VertexWeight>) -> Result<(NifFile, RecordLink, RecordLink), anyhow::Error> {
        let mut data = triangle();
        data.normals = vec![Vector3::new(0.0, 0.0, 1.0); 2];

        let mut nif = NifFile::new("meshes\\skinned.nif");
        let root = nif.push(Record::Node(Node::new("Root", NodeKind::node())));
        let bone_a = nif.push(Record::Node(
            Node::new("Bone A", NodeKind::node()).with_transform(translation(2.0, 0.0, 0.0)),
        ));
        let bone_b = nif.push(Record::Node(
            Node::new("Bone B", NodeKind::node()).with_transform(translation(0.0, 4.0, 0.0)),
        ));
        let skin_data = nif.push(Record::SkinData(NiSkinData {
            transform: NiTransform::IDENTITY,
            bones: vec![
                SkinBoneData {
                    weights: weights_a,
                    ..Default::default()
                },
                SkinBoneData {
                    weights: weights_b,
                    ..Default::default()
                },
            ],
        }));
        let skin = nif.push(Record::SkinInstance(NiSkinInstance {
            data: skin_data,
            root: Some(root),
            bones: vec![Some(bone_a), Some(bone_b)],
        }));
        let data = nif.push(Record::TriShapeData(data));
        let mut tri_shape = NiTriShape::new(data);
        tri_shape.skin = Some(skin);
        let shape = nif.push(Record::Node(Node::new("Body", NodeKind::NiTriShape(tri_shape))));

        nif.add_child(root, bone_a)?;
        nif.add_child(root, bone_b)?;
        nif.add_child(root, shape)?;
        nif.mark_skin_bones()?;
        Ok((nif, root, shape))
    }

    #[test]
    fn skinning_accumulates_weighted_contributions() -> Result<(), anyhow::Error> {
        let (nif, root, shape) = skinned_scene(
            vec![
                VertexWeight { vertex: 1, weight: 0.6 },
                VertexWeight { vertex: 0, weight: 1.0 },
            ],
            vec![VertexWeight { vertex: 1, weight: 0.4 }],
        )?;
        let mut skeleton = Skeleton::new("meshes\\skinned.nif", "General");
        SkeletonImporter::build_bones(&nif, root, &mut skeleton)?;

        let mut mesh = MeshData::new("meshes\\skinned.nif@Body", "General");
        MeshImporter::create_sub_mesh(&nif, shape, &mut mesh, MeshBinding::Skeleton(&skeleton), None)?;
        assert_eq!(mesh.skeleton_name.as_deref(), Some("meshes\\skinned.nif"));

        let sub_mesh = &mesh.sub_meshes[0];
        let positions = sub_mesh.vertex_data.positions().expect("positions");
        // (1, 0, 0) moved by bone A: (3, 0, 0), by bone B: (1, 4, 0)
        let expected = Vec3::new(3.0, 0.0, 0.0) * 0.6 + Vec3::new(1.0, 4.0, 0.0) * 0.4;
        assert!(positions[1].abs_diff_eq(expected, 1e-5));
        assert!(positions[0].abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
        // nobody has a weight for the last vertex
        assert_eq!(positions[2], Vec3::ZERO);

        // directions ignore the translation, the accumulation starts at one
        let normals = sub_mesh.vertex_data.normals().expect("normals");
        assert!(normals[1].abs_diff_eq(Vec3::new(1.0, 1.0, 2.0), 1e-5));

        let bone_a = skeleton.bone("Bone A").expect("bone a").handle;
        let bone_b = skeleton.bone("Bone B").expect("bone b").handle;
        assert_eq!(
            sub_mesh.bone_assignments,
            vec![
                BoneAssignment {
                    vertex_index: 1,
                    bone_handle: bone_a,
                    weight: 0.6
                },
                BoneAssignment {
                    vertex_index: 0,
                    bone_handle: bone_a,
                    weight: 1.0
                },
                BoneAssignment {
                    vertex_index: 1,
                    bone_handle: bone_b,
                    weight: 0.4
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn skinning_without_skeleton_fails() -> Result<(), anyhow::Error> {
        let (nif, _, shape) = skinned_scene(vec![], vec![])?;
        let mut mesh = MeshData::new("meshes\\skinned.nif@Body", "General");

        let result = MeshImporter::create_sub_mesh(&nif, shape, &mut mesh, MeshBinding::Static, None);
        assert!(matches!(result, Err(LoadError::MissingSkeleton { .. })));
        Ok(())
    }

    #[test]
    fn missing_bones_are_fatal() -> Result<(), anyhow::Error> {
        let (nif, _, shape) = skinned_scene(vec![VertexWeight { vertex: 0, weight: 1.0 }], vec![])?;
        let skeleton = Skeleton::new("meshes\\skinned.nif", "General");
        let mut mesh = MeshData::new("meshes\\skinned.nif@Body", "General");

        let result = MeshImporter::create_sub_mesh(&nif, shape, &mut mesh, MeshBinding::Skeleton(&skeleton), None);
        match result {
            Err(LoadError::MissingBone { bone, .. }) => assert_eq!(bone, "Bone A"),
            other => panic!("Expected a missing bone, got {:?}", other),
        }
        assert!(mesh.sub_meshes.is_empty());
        Ok(())
    }

    #[test]
    fn out_of_range_weights_are_rejected() -> Result<(), anyhow::Error> {
        let (nif, root, shape) = skinned_scene(vec![VertexWeight { vertex: 3, weight: 1.0 }], vec![])?;
        let mut skeleton = Skeleton::new("meshes\\skinned.nif", "General");
        SkeletonImporter::build_bones(&nif, root, &mut skeleton)?;
        let mut mesh = MeshData::new("meshes\\skinned.nif@Body", "General");

        let result = MeshImporter::create_sub_mesh(&nif, shape, &mut mesh, MeshBinding::Skeleton(&skeleton), None);
        assert!(matches!(result, Err(LoadError::InvalidGeometry { .. })));
        Ok(())
    }

    #[test]
    fn vertex_streams_are_laid_out_per_attribute() -> Result<(), anyhow::Error> {
        let mut data = triangle();
        data.colors = vec![Color4::new(1.0, 0.0, 0.0, 1.0); 3];
        data.uv_sets = vec![
            vec![Vector2 { x: 0.0, y: 0.0 }; 3],
            vec![Vector2 { x: 1.0, y: 0.5 }; 3],
        ];
        let (nif, _, shape) = scene(data)?;

        let mut mesh = MeshData::new("meshes\\test.nif@Tri Shape", "General");
        MeshImporter::create_sub_mesh(&nif, shape, &mut mesh, MeshBinding::Static, None)?;
        let vertex_data = &mesh.sub_meshes[0].vertex_data;

        assert_eq!(vertex_data.vertex_count, 3);
        // positions, colours, one buffer per uv set (no normals)
        assert_eq!(vertex_data.bindings.len(), 4);
        assert_eq!(vertex_data.bindings[0].usage, BufferUsage::DynamicWriteOnly);
        assert!(vertex_data.normals().is_none());
        assert_eq!(vertex_data.colours(), Some(&[[255u8, 0, 0, 255]; 3][..]));
        assert_eq!(vertex_data.bindings[1].usage, BufferUsage::StaticWriteOnly);

        let second_set = vertex_data
            .element(VertexElementSemantic::TextureCoordinates, 1)
            .expect("second uv set");
        assert_eq!(second_set.source, 3);
        assert_eq!(second_set.offset, 0);
        assert_eq!(vertex_data.bindings[2].len(), 3);
        assert_eq!(vertex_data.bindings[3].len(), 3);
        assert_eq!(vertex_data.bindings[3].usage, BufferUsage::StaticWriteOnly);
        assert_eq!(vertex_data.texture_coordinates(1), Some(&[Vec2::new(1.0, 0.5); 3][..]));
        assert_eq!(vertex_data.texture_coordinates(0), Some(&[Vec2::ZERO; 3][..]));

        let index_data = &mesh.sub_meshes[0].index_data;
        assert_eq!(index_data.index_buffer, vec![0, 1, 2]);
        assert_eq!(index_data.index_count, 3);
        Ok(())
    }

    #[test]
    fn empty_geometry_is_valid() -> Result<(), anyhow::Error> {
        let (nif, _, shape) = scene(NiTriShapeData::default())?;

        let mut mesh = MeshData::new("meshes\\test.nif@Tri Shape", "General");
        MeshImporter::create_sub_mesh(&nif, shape, &mut mesh, MeshBinding::Static, None)?;

        assert_eq!(mesh.sub_meshes.len(), 1);
        assert_eq!(mesh.sub_meshes[0].index_data.index_count, 0);
        assert!(mesh.sub_meshes[0].vertex_data.bindings.is_empty());
        assert_eq!(mesh.bounds, None);
        assert_eq!(mesh.bounding_radius, 0.0);
        Ok(())
    }

    #[test]
    fn invalid_indices_are_rejected() -> Result<(), anyhow::Error> {
        let mut data = triangle();
        data.triangles = vec![0, 1, 3];
        let (nif, _, shape) = scene(data)?;

        let mut mesh = MeshData::new("meshes\\test.nif@Tri Shape", "General");
        let result = MeshImporter::create_sub_mesh(&nif, shape, &mut mesh, MeshBinding::Static, None);
        assert!(matches!(result, Err(LoadError::InvalidGeometry { .. })));
        Ok(())
    }

    #[test]
    fn only_shapes_can_be_converted() -> Result<(), anyhow::Error> {
        let (nif, root, _) = scene(triangle())?;

        let mut mesh = MeshData::new("meshes\\test.nif@Root", "General");
        let result = MeshImporter::create_sub_mesh(&nif, root, &mut mesh, MeshBinding::Static, None);
        assert!(matches!(result, Err(LoadError::Nif(_))));
        Ok(())
    }
}
