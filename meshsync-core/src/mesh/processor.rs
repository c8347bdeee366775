//! Mesh refine pipeline
//!
//! Converts the raw per-polygon representation of a [`MeshData`] into a
//! triangulated mesh and a list of bounded [`Submesh`](super::Submesh)
//! partitions. Steps run in a fixed order:
//!
//! 1. transform bake (`APPLY_TRANSFORM`)
//! 2. handedness swap (`SWAP_HANDEDNESS`) and winding reversal (`SWAP_FACES`)
//! 3. fan triangulation
//! 4. vertex domain resolution (unweld when an attribute is per corner)
//! 5. normal and tangent synthesis (`GEN_NORMALS`, `GEN_TANGENTS`)
//! 6. uniform scale
//! 7. partitioning (`SPLIT`)

use super::geometry::{self, AttributeDomain, VertexStreams};
use super::types::{MeshData, MeshRefineSettings, RefineReport};
use crate::error::Result;
use crate::flags::MeshRefineFlags;
use crate::transform::Transform;
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use tracing::{debug, warn};

/// Triangle mesh in its resolved vertex domain
#[derive(Default)]
struct WorkingMesh {
    points: Vec<Vec3>,
    normals: Vec<Vec3>,
    tangents: Vec<Vec4>,
    uv: Vec<Vec2>,
    /// Source point of each vertex when unwelded
    source: Option<Vec<u32>>,
    triangles: Vec<[u32; 3]>,
}

impl WorkingMesh {
    fn streams(&self) -> VertexStreams<'_> {
        VertexStreams {
            points: &self.points,
            normals: &self.normals,
            tangents: &self.tangents,
            uv: &self.uv,
        }
    }
}

struct Domains {
    normals: AttributeDomain,
    tangents: AttributeDomain,
    uv: AttributeDomain,
}

impl Domains {
    fn any_corner(&self) -> bool {
        [self.normals, self.tangents, self.uv].contains(&AttributeDomain::Corner)
    }
}

fn keep_point_attribute<T>(values: Vec<T>, domain: AttributeDomain) -> Vec<T> {
    match domain {
        AttributeDomain::Point => values,
        _ => Vec::new(),
    }
}

fn pick<T: Copy>(values: &[T], domain: AttributeDomain, point: usize, corner: usize, out: &mut Vec<T>) {
    match domain {
        AttributeDomain::Point => out.push(values[point]),
        AttributeDomain::Corner => out.push(values[corner]),
        AttributeDomain::Absent | AttributeDomain::Invalid => {}
    }
}

impl MeshData {
    /// Run the refine pipeline in place.
    ///
    /// Settings are validated before anything is touched. Malformed polygons
    /// are skipped and reported in the returned [`RefineReport`]; they never
    /// abort the pass. Afterwards the flat buffers hold the triangulated mesh
    /// (`counts` all 3), `submeshes` holds its partitions and `flags`
    /// matches the populated buffers.
    pub fn refine(&mut self, settings: &MeshRefineSettings) -> Result<RefineReport> {
        settings.validate()?;
        let flags = settings.flags;
        let mut report = RefineReport {
            polygon_count: self.polygon_count(),
            ..RefineReport::default()
        };

        if flags.contains(MeshRefineFlags::APPLY_TRANSFORM) {
            let local2world = self.transform.local2world;
            self.apply_transform(&local2world);
            self.transform = Transform::IDENTITY;
        }

        if flags.contains(MeshRefineFlags::SWAP_HANDEDNESS) {
            self.swap_handedness();
        }

        let spans = geometry::scan_polygons(
            &self.counts,
            &self.indices,
            self.points.len(),
            &mut report.issues,
        );
        let corner_triangles =
            geometry::triangulate(&spans, flags.contains(MeshRefineFlags::SWAP_FACES));

        let (point_count, corner_count) = (self.points.len(), self.indices.len());
        let domains = Domains {
            normals: geometry::attribute_domain(
                "normals",
                self.normals.len(),
                point_count,
                corner_count,
                &mut report.issues,
            ),
            tangents: geometry::attribute_domain(
                "tangents",
                self.tangents.len(),
                point_count,
                corner_count,
                &mut report.issues,
            ),
            uv: geometry::attribute_domain(
                "uv",
                self.uv.len(),
                point_count,
                corner_count,
                &mut report.issues,
            ),
        };

        let mut working = if domains.any_corner() {
            self.unweld(&corner_triangles, &domains)
        } else {
            self.weld(&corner_triangles, &domains)
        };

        if flags.contains(MeshRefineFlags::GEN_NORMALS) && working.normals.is_empty() {
            working.normals = geometry::generate_normals(
                &working.points,
                &working.triangles,
                working.source.as_deref(),
                point_count.max(working.points.len()),
            );
            report.generated_normals = true;
        }

        if flags.contains(MeshRefineFlags::GEN_TANGENTS) && working.tangents.is_empty() {
            if working.uv.is_empty() {
                report.add_warning("tangents requested but the mesh has no uv".to_string());
            } else if working.normals.is_empty() {
                report.add_warning("tangents requested but the mesh has no normals".to_string());
            } else {
                working.tangents = geometry::generate_tangents(
                    &working.points,
                    &working.normals,
                    &working.uv,
                    &working.triangles,
                );
                report.generated_tangents = true;
            }
        }

        if settings.scale != 1.0 {
            let scale = settings.scale;
            working.points.iter_mut().for_each(|p| *p *= scale);
            if self.transform.position != Vec3::ZERO {
                self.transform.position *= scale;
                self.transform.update_matrices();
            }
        }

        let split_unit = flags
            .contains(MeshRefineFlags::SPLIT)
            .then_some(settings.split_unit as usize);
        self.submeshes = geometry::partition(&working.triangles, &working.streams(), split_unit);

        self.indices.clear();
        self.indices
            .extend(working.triangles.iter().flatten().map(|&v| v as i32));
        self.counts.clear();
        self.counts.resize(working.triangles.len(), 3);
        self.points = working.points;
        self.normals = working.normals;
        self.tangents = working.tangents;
        self.uv = working.uv;
        self.sync_flags();

        report.triangle_count = working.triangles.len();
        report.vertex_count = self.points.len();
        report.submesh_count = self.submeshes.len();

        for issue in &report.issues {
            warn!(path = %self.path, "refine skipped data: {}", issue);
        }
        for warning in &report.warnings {
            warn!(path = %self.path, "{}", warning);
        }
        debug!(
            path = %self.path,
            polygons = report.polygon_count,
            triangles = report.triangle_count,
            vertices = report.vertex_count,
            submeshes = report.submesh_count,
            errors = report.error_count(),
            "mesh refined"
        );

        Ok(report)
    }

    /// Transform positions by `matrix` and normals/tangents by its upper 3x3.
    ///
    /// Only the flat buffers are touched; `transform` and existing submeshes
    /// are left as they are.
    pub fn apply_transform(&mut self, matrix: &Mat4) {
        let rotation = Mat3::from_mat4(*matrix);
        for point in &mut self.points {
            *point = matrix.transform_point3(*point);
        }
        for normal in &mut self.normals {
            *normal = (rotation * *normal).normalize_or_zero();
        }
        for tangent in &mut self.tangents {
            let direction = (rotation * tangent.truncate()).normalize_or_zero();
            *tangent = direction.extend(tangent.w);
        }
    }

    /// Mirror the X axis of positions, normals and tangents
    pub fn swap_handedness(&mut self) {
        for point in &mut self.points {
            point.x = -point.x;
        }
        for normal in &mut self.normals {
            normal.x = -normal.x;
        }
        for tangent in &mut self.tangents {
            tangent.x = -tangent.x;
        }
    }

    /// Keep points as vertices; triangles index points directly
    fn weld(&mut self, corner_triangles: &[[u32; 3]], domains: &Domains) -> WorkingMesh {
        let triangles = corner_triangles
            .iter()
            .map(|tri| tri.map(|c| self.indices[c as usize] as u32))
            .collect();

        WorkingMesh {
            points: std::mem::take(&mut self.points),
            normals: keep_point_attribute(std::mem::take(&mut self.normals), domains.normals),
            tangents: keep_point_attribute(std::mem::take(&mut self.tangents), domains.tangents),
            uv: keep_point_attribute(std::mem::take(&mut self.uv), domains.uv),
            source: None,
            triangles,
        }
    }

    /// One vertex per referenced corner, in first-reference order
    fn unweld(&self, corner_triangles: &[[u32; 3]], domains: &Domains) -> WorkingMesh {
        const UNMAPPED: u32 = u32::MAX;
        let mut corner_vertex = vec![UNMAPPED; self.indices.len()];
        let mut working = WorkingMesh::default();
        let mut source = Vec::new();
        let mut triangles = Vec::with_capacity(corner_triangles.len());

        for tri in corner_triangles {
            let mut mapped = [0u32; 3];
            for (slot, &corner) in mapped.iter_mut().zip(tri) {
                let corner = corner as usize;
                if corner_vertex[corner] == UNMAPPED {
                    let point = self.indices[corner] as usize;
                    corner_vertex[corner] = working.points.len() as u32;
                    source.push(point as u32);
                    working.points.push(self.points[point]);
                    pick(&self.normals, domains.normals, point, corner, &mut working.normals);
                    pick(&self.tangents, domains.tangents, point, corner, &mut working.tangents);
                    pick(&self.uv, domains.uv, point, corner, &mut working.uv);
                }
                *slot = corner_vertex[corner];
            }
            triangles.push(mapped);
        }

        working.source = Some(source);
        working.triangles = triangles;
        working
    }
}
