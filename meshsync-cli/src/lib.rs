//! Helpers behind the `meshsync` command-line tool
//!
//! Message files are plain concatenations of framed messages, exactly as
//! they travel on the wire.

use anyhow::{Context, Result, bail};
use glam::{Vec2, Vec3};
use meshsync_binary::{Message, MessageStream, write_messages};
use meshsync_core::{MeshData, MeshInfo, MeshRefineSettings, RefineReport};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Read every message from a message file
pub fn load_messages(path: &Path) -> Result<Vec<Message>> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let messages = MessageStream::new(&data)
        .enumerate()
        .map(|(i, m)| m.with_context(|| format!("Failed to decode message #{i} in {}", path.display())))
        .collect::<Result<Vec<_>>>()?;
    debug!(path = %path.display(), count = messages.len(), "loaded messages");
    Ok(messages)
}

/// Write messages back to back into `path`, replacing it
pub fn save_messages(path: &Path, messages: &[Message]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    let bytes = write_messages(messages).context("Failed to encode messages")?;
    fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = bytes.len(), "saved messages");
    Ok(())
}

/// Load refine settings from a YAML file; missing keys take their defaults
pub fn load_settings(path: &Path) -> Result<MeshRefineSettings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings {}", path.display()))?;
    let settings: MeshRefineSettings = serde_yaml::from_str(&text)
        .with_context(|| format!("Invalid refine settings in {}", path.display()))?;
    settings.validate()?;
    Ok(settings)
}

/// Outcome of refining one mesh message
#[derive(Debug, Clone)]
pub struct RefineOutcome {
    pub path: String,
    pub report: RefineReport,
}

/// Refine every mesh message in place; other messages pass through
pub fn refine_messages(
    messages: &mut [Message],
    settings: &MeshRefineSettings,
) -> Result<Vec<RefineOutcome>> {
    let mut outcomes = Vec::new();
    for message in messages.iter_mut() {
        if let Message::Mesh(mesh) = message {
            let report = mesh
                .refine(settings)
                .with_context(|| format!("Failed to refine {}", mesh.path))?;
            info!(
                path = %mesh.path,
                triangles = report.triangle_count,
                submeshes = report.submesh_count,
                "refined mesh"
            );
            outcomes.push(RefineOutcome {
                path: mesh.path.clone(),
                report,
            });
        }
    }
    Ok(outcomes)
}

/// Printable description of one message
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum MessageSummary {
    Get { flags: String, scale: f32 },
    Delete { path: String },
    Mesh(MeshInfo),
}

impl MessageSummary {
    pub fn new(message: &Message) -> Self {
        match message {
            Message::Get(get) => MessageSummary::Get {
                flags: format!("{:?}", get.flags),
                scale: get.scale,
            },
            Message::Delete(delete) => MessageSummary::Delete {
                path: delete.path.clone(),
            },
            Message::Mesh(mesh) => MessageSummary::Mesh(mesh.get_info()),
        }
    }

    /// One-line form used by the summary output
    pub fn line(&self) -> String {
        match self {
            MessageSummary::Get { flags, scale } => format!("Get {flags} (scale {scale})"),
            MessageSummary::Delete { path } => format!("Delete {path}"),
            MessageSummary::Mesh(info) => format!(
                "Mesh {} points={} polygons={} triangles={} submeshes={}",
                info.path, info.point_count, info.polygon_count, info.triangle_count, info.submesh_count
            ),
        }
    }
}

/// Built-in meshes for producing test input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleShape {
    /// Unit cube made of six quads sharing eight points
    Cube,
    /// Flat `size` x `size` grid of quads with per-point uv
    Grid { size: u32 },
}

impl SampleShape {
    pub fn parse(name: &str, size: u32) -> Result<Self> {
        match name {
            "cube" => Ok(SampleShape::Cube),
            "grid" if size == 0 => bail!("Grid size must be at least 1"),
            "grid" => Ok(SampleShape::Grid { size }),
            other => bail!("Unknown sample shape: {other}. Supported shapes: cube, grid"),
        }
    }
}

/// Build an unrefined sample mesh at `path`
pub fn sample_mesh(shape: SampleShape, path: &str) -> MeshData {
    let mut mesh = MeshData::new(path);
    match shape {
        SampleShape::Cube => {
            mesh.points = (0..8)
                .map(|i| {
                    Vec3::new(
                        (i & 1) as f32 - 0.5,
                        ((i >> 1) & 1) as f32 - 0.5,
                        ((i >> 2) & 1) as f32 - 0.5,
                    )
                })
                .collect();
            let faces: [[i32; 4]; 6] = [
                [0, 2, 3, 1],
                [4, 5, 7, 6],
                [0, 1, 5, 4],
                [2, 6, 7, 3],
                [0, 4, 6, 2],
                [1, 3, 7, 5],
            ];
            mesh.counts = vec![4; faces.len()];
            mesh.indices = faces.iter().flatten().copied().collect();
        }
        SampleShape::Grid { size } => {
            let row = size + 1;
            for y in 0..row {
                for x in 0..row {
                    let u = x as f32 / size as f32;
                    let v = y as f32 / size as f32;
                    mesh.points.push(Vec3::new(u, 0.0, v));
                    mesh.uv.push(Vec2::new(u, v));
                }
            }
            for y in 0..size {
                for x in 0..size {
                    let i = (y * row + x) as i32;
                    let row = row as i32;
                    mesh.indices.extend_from_slice(&[i, i + row, i + row + 1, i + 1]);
                    mesh.counts.push(4);
                }
            }
        }
    }
    mesh.sync_flags();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_sample_is_valid() {
        let cube = sample_mesh(SampleShape::Cube, "/Cube");
        assert!(cube.validate().is_ok());
        assert_eq!(cube.polygon_count(), 6);
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn test_grid_sample_is_valid() {
        let grid = sample_mesh(SampleShape::Grid { size: 3 }, "/Grid");
        assert!(grid.validate().is_ok());
        assert_eq!(grid.points.len(), 16);
        assert_eq!(grid.uv.len(), 16);
        assert_eq!(grid.triangle_count(), 18);
    }

    #[test]
    fn test_shape_parsing() {
        assert_eq!(SampleShape::parse("cube", 0).unwrap(), SampleShape::Cube);
        assert_eq!(
            SampleShape::parse("grid", 4).unwrap(),
            SampleShape::Grid { size: 4 }
        );
        assert!(SampleShape::parse("grid", 0).is_err());
        assert!(SampleShape::parse("sphere", 1).is_err());
    }

    #[test]
    fn test_summary_line() {
        let message = Message::from(meshsync_core::DeleteData::new("/Scene/Cube"));
        assert_eq!(MessageSummary::new(&message).line(), "Delete /Scene/Cube");
    }
}
