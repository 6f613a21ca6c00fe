use std::collections::HashSet;

use glam::Vec3;
use log::warn;
use nif_files::NifError;
use nif_files::nif::graph::NifFile;
use nif_files::nif::types::RecordLink;

use crate::rendering::LoadError;
use crate::rendering::common::nif_conversions::{rotation, vec3};
use crate::rendering::common::types::{BonePose, Skeleton};

pub struct SkeletonImporter {}

impl SkeletonImporter {
    /// Searches the graph in pre-order for the first node that is used as bone by any skin.
    pub fn find_first_bone(nif: &NifFile, root: RecordLink) -> Result<Option<RecordLink>, NifError> {
        let mut visited = HashSet::new();
        let mut stack = vec![root];

        while let Some(link) = stack.pop() {
            if !visited.insert(link) {
                continue;
            }

            let node = nif.node(link)?;
            if node.is_bone() {
                return Ok(Some(link));
            }

            // reversed, so that the first child is popped first.
            stack.extend(node.children().iter().rev().flatten().copied());
        }

        Ok(None)
    }

    /// A scene needs a skeleton as soon as any of its nodes is a bone.
    pub fn is_skinned(nif: &NifFile, root: RecordLink) -> Result<bool, NifError> {
        Ok(Self::find_first_bone(nif, root)?.is_some())
    }

    /// Creates one bone per NiNode below (and including) `root`, mirroring the hierarchy.
    /// Nodes that are instanced in multiple places produce one bone per occurrence.
    pub fn build_bones(nif: &NifFile, root: RecordLink, skeleton: &mut Skeleton) -> Result<(), LoadError> {
        let mut ancestors = Vec::new();
        Self::build_bone(nif, root, None, skeleton, &mut ancestors)
    }

    fn build_bone(
        nif: &NifFile,
        link: RecordLink,
        parent: Option<u16>,
        skeleton: &mut Skeleton,
        ancestors: &mut Vec<RecordLink>,
    ) -> Result<(), LoadError> {
        let node = nif.node(link)?;

        // first come, first serve: a name that is taken results in an anonymous bone.
        let name = (!skeleton.has_bone(&node.name)).then_some(node.name.as_str());
        let handle = skeleton.create_bone(name)?;
        if let Some(parent) = parent {
            skeleton.add_child(parent, handle);
        }

        if let Some(bone) = skeleton.bone_by_handle_mut(handle) {
            bone.pose = BonePose {
                orientation: rotation(&node.transform.rotation),
                position: vec3(&node.transform.translation),
                scale: Vec3::splat(node.transform.scale),
            };
            bone.set_binding_pose();
            bone.set_initial_state();
        }

        ancestors.push(link);
        for &child in node.children().iter().flatten() {
            if ancestors.contains(&child) {
                warn!("Node {} is its own ancestor, skipping it", nif.node(child)?.name);
                continue;
            }

            if nif.node(child)?.can_have_children() {
                Self::build_bone(nif, child, Some(handle), skeleton, ancestors)?;
            }
        }
        ancestors.pop();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::rendering::LoadError;
    use crate::rendering::common::types::Skeleton;
    use crate::rendering::importer::skeleton_importer::SkeletonImporter;
    use glam::{Quat, Vec3};
    use nif_files::common::types::{Matrix3, NiTransform, Vector3};
    use nif_files::nif::graph::NifFile;
    use nif_files::nif::types::{NiTriShape, NiTriShapeData, Node, NodeKind, Record, RecordLink};

    fn node(nif: &mut NifFile, name: &str) -> RecordLink {
        nif.push(Record::Node(Node::new(name, NodeKind::node())))
    }

    fn shape(nif: &mut NifFile, name: &str) -> RecordLink {
        let data = nif.push(Record::TriShapeData(NiTriShapeData::default()));
        nif.push(Record::Node(Node::new(name, NodeKind::NiTriShape(NiTriShape::new(data)))))
    }

    #[test]
    fn bones_mirror_the_node_hierarchy() -> Result<(), anyhow::Error> {
        let mut nif = NifFile::new("skeleton.nif");
        let root = node(&mut nif, "Root");
        let pelvis = node(&mut nif, "Bip01 Pelvis");
        let spine = node(&mut nif, "Bip01 Spine");
        let mesh = shape(&mut nif, "Tri Body");
        nif.add_child(root, pelvis)?;
        nif.add_child(pelvis, spine)?;
        nif.add_child(pelvis, mesh)?;

        nif.node_mut(spine)?.transform = NiTransform {
            translation: Vector3::new(0.0, 0.0, 5.0),
            rotation: Matrix3 {
                m: [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            },
            scale: 2.0,
        };

        let mut skeleton = Skeleton::new("skeleton.nif", "General");
        SkeletonImporter::build_bones(&nif, root, &mut skeleton)?;

        // shapes are no bones
        assert_eq!(skeleton.bones().len(), 3);
        assert!(!skeleton.has_bone("Tri Body"));

        let pelvis_bone = skeleton.bone("Bip01 Pelvis").expect("pelvis");
        let spine_bone = skeleton.bone("Bip01 Spine").expect("spine");
        assert_eq!(pelvis_bone.parent, Some(0));
        assert_eq!(spine_bone.parent, Some(pelvis_bone.handle));
        assert_eq!(pelvis_bone.children, vec![spine_bone.handle]);

        assert_eq!(spine_bone.pose.position, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(spine_bone.pose.scale, Vec3::splat(2.0));
        assert!(
            spine_bone
                .pose
                .orientation
                .abs_diff_eq(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2), 1e-5)
        );
        assert_eq!(spine_bone.binding_pose, spine_bone.pose);
        assert_eq!(spine_bone.initial_state, spine_bone.pose);
        Ok(())
    }

    #[test]
    fn duplicate_names_become_anonymous_bones() -> Result<(), anyhow::Error> {
        let mut nif = NifFile::new("dup.nif");
        let root = node(&mut nif, "Root");
        let first = node(&mut nif, "Arm");
        let second = node(&mut nif, "Arm");
        nif.add_child(root, first)?;
        nif.add_child(root, second)?;

        let mut skeleton = Skeleton::new("dup.nif", "General");
        SkeletonImporter::build_bones(&nif, root, &mut skeleton)?;

        assert_eq!(skeleton.bones().len(), 3);
        assert_eq!(skeleton.bone("Arm").map(|bone| bone.handle), Some(1));
        assert_eq!(skeleton.bone_by_handle(2).map(|bone| bone.name.as_str()), Some("Unnamed_2"));
        Ok(())
    }

    #[test]
    fn instanced_nodes_are_built_per_occurrence() -> Result<(), anyhow::Error> {
        let mut nif = NifFile::new("instanced.nif");
        let root = node(&mut nif, "Root");
        let left = node(&mut nif, "Left");
        let right = node(&mut nif, "Right");
        let shared = node(&mut nif, "Shared");
        nif.add_child(root, left)?;
        nif.add_child(root, right)?;
        nif.add_child(left, shared)?;
        nif.add_child(right, shared)?;

        let mut skeleton = Skeleton::new("instanced.nif", "General");
        SkeletonImporter::build_bones(&nif, root, &mut skeleton)?;
        assert_eq!(skeleton.bones().len(), 5);
        Ok(())
    }

    #[test]
    fn cycles_are_cut() -> Result<(), anyhow::Error> {
        let mut nif = NifFile::new("cycle.nif");
        let root = node(&mut nif, "Root");
        let child = node(&mut nif, "Child");
        nif.add_child(root, child)?;
        nif.add_child(child, root)?;

        let mut skeleton = Skeleton::new("cycle.nif", "General");
        SkeletonImporter::build_bones(&nif, root, &mut skeleton)?;
        assert_eq!(skeleton.bones().len(), 2);
        assert!(!SkeletonImporter::is_skinned(&nif, root)?);
        Ok(())
    }

    #[test]
    fn bone_handles_do_not_overflow() -> Result<(), anyhow::Error> {
        let mut nif = NifFile::new("crowd.nif");
        let root = node(&mut nif, "Root");
        for index in 0..=u16::MAX as usize {
            let child = node(&mut nif, &format!("N{}", index));
            nif.add_child(root, child)?;
        }

        let mut skeleton = Skeleton::new("crowd.nif", "General");
        let result = SkeletonImporter::build_bones(&nif, root, &mut skeleton);
        assert!(matches!(result, Err(LoadError::TooManyBones { limit: 65536, .. })));

        // every bone that was created still resolves to itself
        assert_eq!(skeleton.bones().len(), 65536);
        let last = skeleton.bone("N65534").expect("last bone");
        assert_eq!(last.handle, u16::MAX);
        assert_eq!(skeleton.bone_by_handle(last.handle).map(|bone| bone.name.as_str()), Some("N65534"));
        Ok(())
    }

    #[test]
    fn first_bone_is_found_in_pre_order() -> Result<(), anyhow::Error> {
        let mut nif = NifFile::new("skinned.nif");
        let root = node(&mut nif, "Root");
        let a = node(&mut nif, "A");
        let a_child = node(&mut nif, "A Child");
        let b = node(&mut nif, "B");
        nif.add_child(root, a)?;
        nif.add_child(a, a_child)?;
        nif.add_child(root, b)?;

        assert_eq!(SkeletonImporter::find_first_bone(&nif, root)?, None);

        nif.node_mut(b)?.bone_transform = Some(NiTransform::IDENTITY);
        nif.node_mut(a_child)?.bone_transform = Some(NiTransform::IDENTITY);
        assert_eq!(SkeletonImporter::find_first_bone(&nif, root)?, Some(a_child));
        assert!(SkeletonImporter::is_skinned(&nif, root)?);
        Ok(())
    }
}
