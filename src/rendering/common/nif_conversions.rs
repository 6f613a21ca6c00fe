use glam::{Affine3A, Mat3, Quat, Vec2, Vec3, Vec4};
use nif_files::NifError;
use nif_files::common::types::{Color4, Matrix3, NiTransform, Vector2, Vector3};
use nif_files::nif::graph::NifFile;
use nif_files::nif::types::RecordLink;

#[inline]
pub fn vec3(v: &Vector3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
pub fn vec2(v: &Vector2) -> Vec2 {
    Vec2::new(v.x, v.y)
}

#[inline]
pub fn mat3(m: &Matrix3) -> Mat3 {
    // stored row-major, glam is column-major
    Mat3::from_cols_array_2d(&m.m).transpose()
}

#[inline]
pub fn rotation(m: &Matrix3) -> Quat {
    Quat::from_mat3(&mat3(m)).normalize()
}

/// Translation * Rotation * uniform Scale
pub fn affine(transform: &NiTransform) -> Affine3A {
    Affine3A::from_mat3_translation(
        mat3(&transform.rotation) * transform.scale,
        vec3(&transform.translation),
    )
}

/// Packs floating point RGBA into 8 bit per channel, clamping to [0, 1].
pub fn pack_color(color: &Color4) -> [u8; 4] {
    let packed = Vec4::new(color.r, color.g, color.b, color.a).clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
    [
        packed.x.round() as u8,
        packed.y.round() as u8,
        packed.z.round() as u8,
        packed.w.round() as u8,
    ]
}

/// Composes the local transforms from the node up to the root, following the [`Parent`] links.
///
/// [`Parent`]: nif_files::nif::types::Node::parent
pub fn world_transform(nif: &NifFile, link: RecordLink) -> Result<Affine3A, NifError> {
    let mut world = Affine3A::IDENTITY;
    let mut current = Some(link);
    let mut depth = 0;

    while let Some(link) = current {
        let node = nif.node(link)?;
        world = affine(&node.transform) * world;
        current = node.parent;

        depth += 1;
        if depth > nif.len() {
            return Err(NifError::ParentCycle {
                name: node.name.clone(),
            });
        }
    }

    Ok(world)
}

#[cfg(test)]
mod tests {
    use crate::rendering::common::nif_conversions::{affine, pack_color, world_transform};
    use glam::Vec3;
    use nif_files::NifError;
    use nif_files::common::types::{Color4, Matrix3, NiTransform, Vector3};
    use nif_files::nif::graph::NifFile;
    use nif_files::nif::types::{Node, NodeKind, Record};

    fn rotation_z_90() -> Matrix3 {
        // rotates +X onto +Y
        Matrix3 {
            m: [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    #[test]
    fn affine_applies_scale_rotation_translation() {
        let transform = NiTransform {
            translation: Vector3::new(0.0, 0.0, 10.0),
            rotation: rotation_z_90(),
            scale: 2.0,
        };

        let point = affine(&transform).transform_point3(Vec3::X);
        assert!(point.abs_diff_eq(Vec3::new(0.0, 2.0, 10.0), 1e-5));
    }

    #[test]
    fn world_transform_composes_parents() -> Result<(), anyhow::Error> {
        let mut nif = NifFile::new("test.nif");
        let root = nif.push(Record::Node(
            Node::new("Root", NodeKind::node()).with_transform(NiTransform::from_translation(Vector3::new(
                5.0, 0.0, 0.0,
            ))),
        ));
        let child = nif.push(Record::Node(Node::new("Child", NodeKind::node()).with_transform(
            NiTransform {
                translation: Vector3::new(1.0, 0.0, 0.0),
                rotation: rotation_z_90(),
                scale: 1.0,
            },
        )));
        nif.add_child(root, child)?;

        let point = world_transform(&nif, child)?.transform_point3(Vec3::X);
        assert!(point.abs_diff_eq(Vec3::new(6.0, 1.0, 0.0), 1e-5));
        Ok(())
    }

    #[test]
    fn world_transform_rejects_parent_cycles() -> Result<(), anyhow::Error> {
        let mut nif = NifFile::new("test.nif");
        let a = nif.push(Record::Node(Node::new("A", NodeKind::node())));
        let b = nif.push(Record::Node(Node::new("B", NodeKind::node())));
        nif.node_mut(a)?.parent = Some(b);
        nif.node_mut(b)?.parent = Some(a);

        assert!(matches!(world_transform(&nif, a), Err(NifError::ParentCycle { .. })));
        Ok(())
    }

    #[test]
    fn colors_are_clamped_and_packed() {
        assert_eq!(pack_color(&Color4::new(1.0, 0.0, 0.5, 2.0)), [255, 0, 128, 255]);
        assert_eq!(pack_color(&Color4::new(-1.0, 0.2, 1.0, 0.0)), [0, 51, 255, 0]);
    }
}
