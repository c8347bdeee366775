//! File-level tests for the CLI helpers

use meshsync_binary::Message;
use meshsync_cli::{
    MessageSummary, SampleShape, load_messages, load_settings, refine_messages, sample_mesh,
    save_messages,
};
use meshsync_core::{DeleteData, GetData, MeshRefineFlags, MeshRefineSettings};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_save_and_load_messages() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("session.msg");
    let messages = vec![
        Message::from(GetData::default()),
        Message::from(sample_mesh(SampleShape::Cube, "/Cube")),
        Message::from(DeleteData::new("/Old")),
    ];

    save_messages(&path, &messages).unwrap();
    let loaded = load_messages(&path).unwrap();
    assert_eq!(loaded, messages);
}

#[test]
fn test_refine_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.msg");
    let output = dir.path().join("out.msg");
    save_messages(
        &input,
        &[Message::from(sample_mesh(SampleShape::Grid { size: 4 }, "/Grid"))],
    )
    .unwrap();

    let settings = MeshRefineSettings::default()
        .with_flags(MeshRefineFlags::SPLIT | MeshRefineFlags::GEN_NORMALS | MeshRefineFlags::GEN_TANGENTS)
        .with_split_unit(12);
    let mut messages = load_messages(&input).unwrap();
    let outcomes = refine_messages(&mut messages, &settings).unwrap();
    save_messages(&output, &messages).unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].report.triangle_count, 32);
    assert!(outcomes[0].report.is_clean());

    let reloaded = load_messages(&output).unwrap();
    let Message::Mesh(mesh) = &reloaded[0] else {
        panic!("expected a mesh message");
    };
    assert_eq!(mesh.num_submeshes(), 8);
    assert!(mesh.submeshes.iter().all(|s| s.indices.len() <= 12));
    assert_eq!(mesh.tangents.len(), mesh.points.len());
}

#[test]
fn test_load_settings_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("refine.yaml");
    fs::write(&path, "scale: 0.01\nsplit_unit: 300\n").unwrap();

    let settings = load_settings(&path).unwrap();
    assert_eq!(settings.scale, 0.01);
    assert_eq!(settings.split_unit, 300);
    assert!(settings.flags.is_empty());
}

#[test]
fn test_load_settings_rejects_small_split_unit() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("refine.yaml");
    fs::write(&path, "split_unit: 2\n").unwrap();
    assert!(load_settings(&path).is_err());
}

#[test]
fn test_corrupt_file_reports_message_index() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.msg");
    let mut bytes = Message::from(DeleteData::new("/A")).to_bytes();
    bytes.extend_from_slice(&[42, 0, 0, 0]);
    fs::write(&path, bytes).unwrap();

    let err = load_messages(&path).unwrap_err();
    assert!(format!("{err:#}").contains("message #1"));
}

#[test]
fn test_summary_yaml() {
    let message = Message::from(sample_mesh(SampleShape::Cube, "/Cube"));
    let text = serde_yaml::to_string(&MessageSummary::new(&message)).unwrap();
    assert!(text.contains("type: Mesh"));
    assert!(text.contains("point_count: 8"));
}
