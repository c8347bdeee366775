//! Property tests for the refine pipeline

use glam::{Vec2, Vec3};
use meshsync_core::{GeometryError, MeshData, MeshRefineFlags, MeshRefineSettings};
use proptest::prelude::*;

/// Random polygon soup: 3..=6 sided polygons over `point_count` points
fn polygon_mesh() -> impl Strategy<Value = MeshData> {
    (4usize..40).prop_flat_map(|point_count| {
        let points = prop::collection::vec(
            (-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0).prop_map(|(x, y, z)| Vec3::new(x, y, z)),
            point_count,
        );
        let polygons = prop::collection::vec(
            (3usize..=6).prop_flat_map(move |sides| {
                prop::collection::vec(0..point_count as i32, sides)
            }),
            1..30,
        );
        (points, polygons).prop_map(|(points, polygons)| {
            let mut mesh = MeshData::new("/Scene/Random");
            mesh.points = points;
            mesh.counts = polygons.iter().map(|p| p.len() as i32).collect();
            mesh.indices = polygons.into_iter().flatten().collect();
            mesh
        })
    })
}

fn flat_triangles(mesh: &MeshData) -> Vec<[Vec3; 3]> {
    mesh.indices
        .chunks(3)
        .map(|tri| [0, 1, 2].map(|k| mesh.points[tri[k] as usize]))
        .collect()
}

fn submesh_triangles(mesh: &MeshData) -> Vec<[Vec3; 3]> {
    mesh.submeshes
        .iter()
        .flat_map(|sub| {
            sub.indices
                .chunks(3)
                .map(|tri| [0, 1, 2].map(|k| sub.points[tri[k] as usize]))
                .collect::<Vec<_>>()
        })
        .collect()
}

proptest! {
    #[test]
    fn split_respects_unit_and_preserves_triangles(mesh in polygon_mesh(), split_unit in 3u32..40) {
        let mut mesh = mesh;
        let expected_triangles: usize = mesh.counts.iter().map(|&c| c as usize - 2).sum();

        let settings = MeshRefineSettings::default()
            .with_flags(MeshRefineFlags::SPLIT)
            .with_split_unit(split_unit);
        let report = mesh.refine(&settings).unwrap();

        prop_assert!(report.is_clean());
        prop_assert_eq!(report.triangle_count, expected_triangles);
        prop_assert_eq!(mesh.counts.len(), expected_triangles);
        prop_assert!(mesh.counts.iter().all(|&c| c == 3));

        for sub in &mesh.submeshes {
            prop_assert!(sub.indices.len() <= split_unit as usize);
            prop_assert!(sub.indices.len() >= 3);
            prop_assert!(sub.is_valid());
        }

        let total: usize = mesh.submeshes.iter().map(|s| s.triangle_count()).sum();
        prop_assert_eq!(total, expected_triangles);
        prop_assert_eq!(submesh_triangles(&mesh), flat_triangles(&mesh));
    }

    #[test]
    fn generated_normals_are_unit_or_zero(mesh in polygon_mesh()) {
        let mut mesh = mesh;
        let settings = MeshRefineSettings::default().with_flags(MeshRefineFlags::GEN_NORMALS);
        mesh.refine(&settings).unwrap();

        prop_assert_eq!(mesh.normals.len(), mesh.points.len());
        for n in &mesh.normals {
            let len = n.length();
            prop_assert!(len < 1e-6 || (len - 1.0).abs() < 1e-3, "normal length {}", len);
        }
    }
}

#[test]
fn degenerate_polygons_are_skipped() {
    let mut mesh = MeshData::new("/Scene/Mixed");
    mesh.points = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
    mesh.counts = vec![3, 2, 3];
    mesh.indices = vec![0, 1, 2, 0, 1, 1, 2, 3];

    let report = mesh.refine(&MeshRefineSettings::default()).unwrap();

    assert_eq!(report.triangle_count, 2);
    assert_eq!(report.skipped_polygons(), 1);
    assert_eq!(
        report.issues,
        vec![GeometryError::DegeneratePolygon {
            polygon: 1,
            count: 2
        }]
    );
    assert_eq!(mesh.indices, vec![0, 1, 2, 1, 2, 3]);
}

#[test]
fn out_of_range_polygon_is_skipped() {
    let mut mesh = MeshData::new("/Scene/Broken");
    mesh.points = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
    mesh.counts = vec![3, 3];
    mesh.indices = vec![0, 1, 2, 0, 1, 7];

    let report = mesh.refine(&MeshRefineSettings::default()).unwrap();

    assert_eq!(report.triangle_count, 1);
    assert!(matches!(
        report.issues.as_slice(),
        [GeometryError::IndexOutOfRange { polygon: 1, index: 7, .. }]
    ));
}

#[test]
fn split_unit_below_three_is_rejected() {
    let mut mesh = MeshData::new("/Scene/Tri");
    mesh.points = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
    mesh.counts = vec![3];
    mesh.indices = vec![0, 1, 2];
    let before = mesh.clone();

    let settings = MeshRefineSettings::default()
        .with_flags(MeshRefineFlags::SPLIT)
        .with_split_unit(2);
    assert!(mesh.refine(&settings).is_err());
    assert_eq!(mesh, before);
}

#[test]
fn tangents_follow_uv_direction() {
    let mut mesh = MeshData::new("/Scene/Quad");
    mesh.points = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];
    mesh.uv = vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
    mesh.counts = vec![4];
    mesh.indices = vec![0, 1, 2, 3];

    let settings = MeshRefineSettings::default()
        .with_flags(MeshRefineFlags::GEN_NORMALS | MeshRefineFlags::GEN_TANGENTS);
    let report = mesh.refine(&settings).unwrap();

    assert!(report.generated_tangents);
    assert_eq!(mesh.tangents.len(), 4);
    for t in &mesh.tangents {
        assert!((t.truncate() - Vec3::X).length() < 1e-4);
        assert_eq!(t.w.abs(), 1.0);
    }
    assert_eq!(mesh.submeshes[0].tangents.len(), 4);
}
