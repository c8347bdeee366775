//! Mesh data structures
//!
//! This module defines the mesh message entity, its submesh partitions and
//! the settings/result types of the refine pipeline.

use crate::client_data::ClientSpecificData;
use crate::constants::{DEFAULT_SPLIT_UNIT, MIN_SPLIT_UNIT};
use crate::error::{GeometryError, MeshSyncError, Result};
use crate::flags::{MeshDataFlags, MeshRefineFlags};
use crate::transform::Transform;
use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// One bounded triangle partition of a mesh
///
/// Attribute arrays are parallel (one entry per vertex) and `indices` is a
/// triangle list into this submesh's own vertex range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submesh {
    pub points: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec4>,
    pub uv: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl Submesh {
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check submesh invariants: parallel attributes, triangle list, local indices
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.points.len();
        let attributes = [
            ("normals", self.normals.len()),
            ("tangents", self.tangents.len()),
            ("uv", self.uv.len()),
        ];
        for (name, len) in attributes {
            if len != 0 && len != vertex_count {
                return Err(MeshSyncError::invalid_data(format!(
                    "submesh {} has {} elements for {} vertices",
                    name, len, vertex_count
                )));
            }
        }

        if self.indices.len() % 3 != 0 {
            return Err(MeshSyncError::invalid_data(format!(
                "submesh index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }

        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshSyncError::invalid_data(format!(
                "submesh index {} out of range for {} vertices",
                bad, vertex_count
            )));
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Mesh message: raw per-polygon geometry plus its refined submeshes
///
/// `counts` holds the number of corners of each polygon and `indices` the
/// flattened corner indices into `points`. Normals, tangents and uv are
/// either per point or per corner (see [`AttributeDomain`](super::AttributeDomain)).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    /// Scene path identifying the object
    pub path: String,
    pub flags: MeshDataFlags,
    pub points: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec4>,
    pub uv: Vec<Vec2>,
    pub counts: Vec<i32>,
    pub indices: Vec<i32>,
    pub transform: Transform,
    pub csd: ClientSpecificData,
    pub submeshes: Vec<Submesh>,
}

impl MeshData {
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Reset to the empty state, keeping buffer capacity for reuse
    pub fn clear(&mut self) {
        self.path.clear();
        self.flags = MeshDataFlags::empty();
        self.points.clear();
        self.normals.clear();
        self.tangents.clear();
        self.uv.clear();
        self.counts.clear();
        self.indices.clear();
        self.transform = Transform::IDENTITY;
        self.csd = ClientSpecificData::NoData;
        self.submeshes.clear();
    }

    /// Exchange every buffer, flag and submesh with `other` without copying
    pub fn swap(&mut self, other: &mut MeshData) {
        std::mem::swap(self, other);
    }

    pub fn num_submeshes(&self) -> usize {
        self.submeshes.len()
    }

    /// Flags as implied by buffer emptiness; `HAS_TRANSFORM` is taken from `flags`
    pub fn effective_flags(&self) -> MeshDataFlags {
        let mut flags = MeshDataFlags::empty();
        flags.set(
            MeshDataFlags::HAS_TRANSFORM,
            self.flags.contains(MeshDataFlags::HAS_TRANSFORM),
        );
        flags.set(MeshDataFlags::HAS_INDICES, !self.indices.is_empty());
        flags.set(MeshDataFlags::HAS_COUNTS, !self.counts.is_empty());
        flags.set(MeshDataFlags::HAS_POINTS, !self.points.is_empty());
        flags.set(MeshDataFlags::HAS_NORMALS, !self.normals.is_empty());
        flags.set(MeshDataFlags::HAS_TANGENTS, !self.tangents.is_empty());
        flags.set(MeshDataFlags::HAS_UV, !self.uv.is_empty());
        flags
    }

    /// Bring `flags` in line with the populated buffers
    pub fn sync_flags(&mut self) {
        self.flags = self.effective_flags();
    }

    /// Number of polygons described by `counts` (or implied triangles)
    pub fn polygon_count(&self) -> usize {
        if self.counts.is_empty() {
            self.indices.len() / 3
        } else {
            self.counts.len()
        }
    }

    /// Triangles the raw polygons produce once fan-triangulated
    pub fn triangle_count(&self) -> usize {
        if self.counts.is_empty() {
            return self.indices.len() / 3;
        }
        self.counts
            .iter()
            .filter(|&&c| c >= 3)
            .map(|&c| c as usize - 2)
            .sum()
    }

    /// Check the raw polygon invariants without modifying anything
    ///
    /// Returns the first anomaly found; refine would skip the same polygons.
    pub fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();
        super::geometry::scan_polygons(&self.counts, &self.indices, self.points.len(), &mut issues);
        let corners = self.indices.len();
        super::geometry::attribute_domain("normals", self.normals.len(), self.points.len(), corners, &mut issues);
        super::geometry::attribute_domain("tangents", self.tangents.len(), self.points.len(), corners, &mut issues);
        super::geometry::attribute_domain("uv", self.uv.len(), self.points.len(), corners, &mut issues);

        match issues.into_iter().next() {
            Some(issue) => Err(issue.into()),
            None => Ok(()),
        }
    }

    /// Get a mesh information summary
    pub fn get_info(&self) -> MeshInfo {
        MeshInfo {
            path: self.path.clone(),
            flags: self.flags,
            point_count: self.points.len(),
            index_count: self.indices.len(),
            polygon_count: self.polygon_count(),
            triangle_count: self.triangle_count(),
            submesh_count: self.submeshes.len(),
            has_normals: !self.normals.is_empty(),
            has_tangents: !self.tangents.is_empty(),
            has_uv: !self.uv.is_empty(),
        }
    }
}

/// Configuration consumed by [`MeshData::refine`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshRefineSettings {
    pub flags: MeshRefineFlags,
    /// Uniform scale applied to positions and the transform's translation
    pub scale: f32,
    /// Maximum number of indices per submesh when splitting
    pub split_unit: u32,
}

impl Default for MeshRefineSettings {
    fn default() -> Self {
        Self {
            flags: MeshRefineFlags::empty(),
            scale: 1.0,
            split_unit: DEFAULT_SPLIT_UNIT,
        }
    }
}

impl MeshRefineSettings {
    pub fn with_flags(mut self, flags: MeshRefineFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_split_unit(mut self, split_unit: u32) -> Self {
        self.split_unit = split_unit;
        self
    }

    /// Reject settings refine cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.split_unit < MIN_SPLIT_UNIT {
            return Err(MeshSyncError::configuration(format!(
                "split_unit must be at least {}, got {}",
                MIN_SPLIT_UNIT, self.split_unit
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(MeshSyncError::configuration(format!(
                "scale must be a positive finite number, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Outcome of a refine pass
///
/// Geometry anomalies do not abort refine; the offending polygon is skipped
/// (or the attribute dropped) and recorded in `issues`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefineReport {
    /// Polygons in the input
    pub polygon_count: usize,
    /// Triangles emitted
    pub triangle_count: usize,
    /// Vertices in the refined flat buffers
    pub vertex_count: usize,
    pub submesh_count: usize,
    pub generated_normals: bool,
    pub generated_tangents: bool,
    pub issues: Vec<GeometryError>,
    pub warnings: Vec<String>,
}

impl RefineReport {
    /// Aggregate number of geometry errors recovered from
    pub fn error_count(&self) -> usize {
        self.issues.len()
    }

    /// Number of polygons dropped from the output
    pub fn skipped_polygons(&self) -> usize {
        self.issues.iter().filter(|i| i.polygon().is_some()).count()
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.warnings.is_empty()
    }
}

/// Mesh information summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshInfo {
    pub path: String,
    pub flags: MeshDataFlags,
    pub point_count: usize,
    pub index_count: usize,
    pub polygon_count: usize,
    pub triangle_count: usize,
    pub submesh_count: usize,
    pub has_normals: bool,
    pub has_tangents: bool,
    pub has_uv: bool,
}
