//! Geometry helpers used by the refine pipeline
//!
//! Triangles are passed around as `[u32; 3]`. Before the vertex domain is
//! resolved they hold corner positions (offsets into the mesh's `indices`),
//! afterwards they hold vertex ids.

use super::types::Submesh;
use crate::error::GeometryError;
use glam::{Vec2, Vec3, Vec4};

/// UV-space determinant below which a triangle contributes no tangent
const UV_AREA_EPSILON: f32 = 1e-12;

/// Where an attribute buffer's elements belong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeDomain {
    /// Buffer is empty
    Absent,
    /// One element per point
    Point,
    /// One element per polygon corner
    Corner,
    /// Length matches neither; the buffer is dropped
    Invalid,
}

/// Classify an attribute buffer by its length.
///
/// When the point count equals the corner count the buffer is taken as per
/// point.
pub fn attribute_domain(
    attribute: &'static str,
    len: usize,
    points: usize,
    corners: usize,
    issues: &mut Vec<GeometryError>,
) -> AttributeDomain {
    if len == 0 {
        AttributeDomain::Absent
    } else if len == points {
        AttributeDomain::Point
    } else if len == corners {
        AttributeDomain::Corner
    } else {
        issues.push(GeometryError::AttributeLength {
            attribute,
            len,
            points,
            corners,
        });
        AttributeDomain::Invalid
    }
}

/// A well-formed polygon: `count` corners starting at `start` in `indices`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolygonSpan {
    pub polygon: usize,
    pub start: usize,
    pub count: usize,
}

/// Walk `counts` over `indices`, returning the polygons that can be
/// triangulated and recording every one that cannot.
///
/// With empty `counts` the indices are read as a triangle list.
pub fn scan_polygons(
    counts: &[i32],
    indices: &[i32],
    point_count: usize,
    issues: &mut Vec<GeometryError>,
) -> Vec<PolygonSpan> {
    let check = |polygon: usize, start: usize, count: usize, issues: &mut Vec<GeometryError>| {
        let bad = indices[start..start + count]
            .iter()
            .find(|&&i| i < 0 || i as usize >= point_count);
        match bad {
            Some(&index) => {
                issues.push(GeometryError::IndexOutOfRange {
                    polygon,
                    index,
                    point_count,
                });
                None
            }
            None => Some(PolygonSpan {
                polygon,
                start,
                count,
            }),
        }
    };

    let mut spans = Vec::new();

    if counts.is_empty() {
        let full = indices.len() / 3;
        spans.reserve(full);
        for polygon in 0..full {
            spans.extend(check(polygon, polygon * 3, 3, issues));
        }
        let remainder = indices.len() % 3;
        if remainder > 0 {
            issues.push(GeometryError::TruncatedPolygon {
                polygon: full,
                expected: 3,
                available: remainder,
            });
        }
        return spans;
    }

    spans.reserve(counts.len());
    let mut offset = 0usize;
    for (polygon, &count) in counts.iter().enumerate() {
        let available = indices.len() - offset;
        if count < 3 {
            issues.push(GeometryError::DegeneratePolygon { polygon, count });
            offset += (count.max(0) as usize).min(available);
            continue;
        }

        let count = count as usize;
        if count > available {
            issues.push(GeometryError::TruncatedPolygon {
                polygon,
                expected: count,
                available,
            });
            offset = indices.len();
            continue;
        }

        spans.extend(check(polygon, offset, count, issues));
        offset += count;
    }

    if offset < indices.len() {
        issues.push(GeometryError::TrailingIndices {
            count: indices.len() - offset,
        });
    }

    spans
}

/// Fan-triangulate one polygon into corner triangles sharing its first corner.
///
/// `reverse` walks the corners backwards, flipping the winding.
pub fn fan_triangulate(span: &PolygonSpan, reverse: bool) -> impl Iterator<Item = [u32; 3]> + '_ {
    let corner = move |k: usize| -> u32 {
        if reverse {
            (span.start + span.count - 1 - k) as u32
        } else {
            (span.start + k) as u32
        }
    };
    (1..span.count - 1).map(move |k| [corner(0), corner(k), corner(k + 1)])
}

/// Triangulate every polygon, producing corner triangles in polygon order
pub fn triangulate(spans: &[PolygonSpan], reverse: bool) -> Vec<[u32; 3]> {
    let total = spans.iter().map(|s| s.count - 2).sum();
    let mut triangles = Vec::with_capacity(total);
    for span in spans {
        triangles.extend(fan_triangulate(span, reverse));
    }
    triangles
}

/// Normal of a triangle scaled by twice its area; zero for degenerate triangles
pub fn triangle_area_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a)
}

/// Area-weighted smooth normals.
///
/// Face normals are accumulated into `slot_count` slots; `slots` maps each
/// vertex to its slot (identity when `None`), so unwelded vertices sharing a
/// source point are smoothed together.
pub fn generate_normals(
    positions: &[Vec3],
    triangles: &[[u32; 3]],
    slots: Option<&[u32]>,
    slot_count: usize,
) -> Vec<Vec3> {
    let slot = |v: u32| -> usize {
        match slots {
            Some(map) => map[v as usize] as usize,
            None => v as usize,
        }
    };

    let mut accumulated = vec![Vec3::ZERO; slot_count];
    for &[a, b, c] in triangles {
        let normal = triangle_area_normal(
            positions[a as usize],
            positions[b as usize],
            positions[c as usize],
        );
        if !normal.is_finite() {
            continue;
        }
        for v in [a, b, c] {
            accumulated[slot(v)] += normal;
        }
    }

    (0..positions.len() as u32)
        .map(|v| accumulated[slot(v)].normalize_or_zero())
        .collect()
}

/// Per-vertex tangents from UV derivatives, orthonormalized against `normals`.
///
/// `w` carries the bitangent sign. Triangles with no UV area contribute
/// nothing; vertices left without a usable direction get an arbitrary unit
/// vector perpendicular to their normal.
pub fn generate_tangents(
    positions: &[Vec3],
    normals: &[Vec3],
    uv: &[Vec2],
    triangles: &[[u32; 3]],
) -> Vec<Vec4> {
    let mut sdir_sum = vec![Vec3::ZERO; positions.len()];
    let mut tdir_sum = vec![Vec3::ZERO; positions.len()];

    for &[a, b, c] in triangles {
        let (a, b, c) = (a as usize, b as usize, c as usize);
        let e1 = positions[b] - positions[a];
        let e2 = positions[c] - positions[a];
        let d1 = uv[b] - uv[a];
        let d2 = uv[c] - uv[a];

        let det = d1.x * d2.y - d2.x * d1.y;
        if det.abs() < UV_AREA_EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let sdir = (e1 * d2.y - e2 * d1.y) * r;
        let tdir = (e2 * d1.x - e1 * d2.x) * r;
        if !sdir.is_finite() || !tdir.is_finite() {
            continue;
        }

        for v in [a, b, c] {
            sdir_sum[v] += sdir;
            tdir_sum[v] += tdir;
        }
    }

    normals
        .iter()
        .zip(sdir_sum.iter().zip(tdir_sum.iter()))
        .map(|(&normal, (&s, &t))| {
            let n = normal.normalize_or_zero();
            let mut tangent = (s - n * n.dot(s)).normalize_or_zero();
            if tangent == Vec3::ZERO {
                tangent = if n == Vec3::ZERO {
                    Vec3::X
                } else {
                    n.any_orthonormal_vector()
                };
            }
            let w = if n.cross(tangent).dot(t) < 0.0 { -1.0 } else { 1.0 };
            tangent.extend(w)
        })
        .collect()
}

/// Borrowed per-vertex attribute streams; empty slices are absent attributes
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexStreams<'a> {
    pub points: &'a [Vec3],
    pub normals: &'a [Vec3],
    pub tangents: &'a [Vec4],
    pub uv: &'a [Vec2],
}

/// Accumulates triangles into one submesh with a compact local index space
struct SubmeshBuilder {
    local: Vec<u32>,
    touched: Vec<u32>,
    current: Submesh,
}

impl SubmeshBuilder {
    const UNMAPPED: u32 = u32::MAX;

    fn new(vertex_count: usize) -> Self {
        Self {
            local: vec![Self::UNMAPPED; vertex_count],
            touched: Vec::new(),
            current: Submesh::default(),
        }
    }

    fn index_count(&self) -> usize {
        self.current.indices.len()
    }

    fn push_triangle(&mut self, triangle: &[u32; 3], streams: &VertexStreams<'_>) {
        for &v in triangle {
            let vi = v as usize;
            if self.local[vi] == Self::UNMAPPED {
                self.local[vi] = self.current.points.len() as u32;
                self.touched.push(v);
                self.current.points.push(streams.points[vi]);
                if !streams.normals.is_empty() {
                    self.current.normals.push(streams.normals[vi]);
                }
                if !streams.tangents.is_empty() {
                    self.current.tangents.push(streams.tangents[vi]);
                }
                if !streams.uv.is_empty() {
                    self.current.uv.push(streams.uv[vi]);
                }
            }
            self.current.indices.push(self.local[vi]);
        }
    }

    fn finish(&mut self) -> Submesh {
        for &v in &self.touched {
            self.local[v as usize] = Self::UNMAPPED;
        }
        self.touched.clear();
        std::mem::take(&mut self.current)
    }
}

/// Partition a triangle list into submeshes.
///
/// With `split_unit` set, a submesh is closed as soon as the next triangle
/// would push its index count past the limit. Each submesh holds only the
/// vertices it references, in first-reference order.
pub fn partition(
    triangles: &[[u32; 3]],
    streams: &VertexStreams<'_>,
    split_unit: Option<usize>,
) -> Vec<Submesh> {
    let mut submeshes = Vec::new();
    let mut builder = SubmeshBuilder::new(streams.points.len());

    for triangle in triangles {
        if let Some(limit) = split_unit {
            if builder.index_count() > 0 && builder.index_count() + 3 > limit {
                submeshes.push(builder.finish());
            }
        }
        builder.push_triangle(triangle, streams);
    }

    if builder.index_count() > 0 {
        submeshes.push(builder.finish());
    }
    submeshes
}
