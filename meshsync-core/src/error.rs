//! Error types for MeshSync data and geometry processing

use thiserror::Error;

/// Result type alias for MeshSync core operations
pub type Result<T> = std::result::Result<T, MeshSyncError>;

/// Main error type for MeshSync core operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshSyncError {
    /// Refine settings rejected before any processing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed polygon or attribute data
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Data that cannot be represented (e.g. buffers too large for the wire)
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl MeshSyncError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an invalid data error
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData(message.into())
    }
}

/// A single geometry anomaly found while refining or validating a mesh.
///
/// Refine recovers from every variant locally by skipping the offending
/// polygon (or dropping the attribute) and reports it in the
/// [`RefineReport`](crate::mesh::RefineReport).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Polygon with fewer than three corners
    #[error("polygon {polygon} has {count} vertices, at least 3 are required")]
    DegeneratePolygon { polygon: usize, count: i32 },

    /// Polygon referencing a point that does not exist
    #[error("polygon {polygon} references point {index}, but only {point_count} points exist")]
    IndexOutOfRange {
        polygon: usize,
        index: i32,
        point_count: usize,
    },

    /// Polygon whose corners run past the end of the index buffer
    #[error("polygon {polygon} needs {expected} indices, only {available} remain")]
    TruncatedPolygon {
        polygon: usize,
        expected: usize,
        available: usize,
    },

    /// Indices left over after the last polygon described by `counts`
    #[error("{count} indices are not covered by any polygon")]
    TrailingIndices { count: usize },

    /// Attribute buffer matching neither the point count nor the index count
    #[error("{attribute} has {len} elements, expected {points} (per point) or {corners} (per corner)")]
    AttributeLength {
        attribute: &'static str,
        len: usize,
        points: usize,
        corners: usize,
    },
}

impl GeometryError {
    /// Index of the polygon this error refers to, if any
    pub fn polygon(&self) -> Option<usize> {
        match self {
            GeometryError::DegeneratePolygon { polygon, .. }
            | GeometryError::IndexOutOfRange { polygon, .. }
            | GeometryError::TruncatedPolygon { polygon, .. } => Some(*polygon),
            GeometryError::TrailingIndices { .. } | GeometryError::AttributeLength { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = MeshSyncError::configuration("split_unit must be at least 3");
        assert!(matches!(err, MeshSyncError::Configuration(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: split_unit must be at least 3"
        );
    }

    #[test]
    fn test_geometry_error_display() {
        let err = GeometryError::DegeneratePolygon {
            polygon: 4,
            count: 2,
        };
        assert_eq!(err.polygon(), Some(4));
        let wrapped: MeshSyncError = err.into();
        assert!(wrapped.to_string().contains("polygon 4 has 2 vertices"));
    }

    #[test]
    fn test_attribute_error_has_no_polygon() {
        let err = GeometryError::AttributeLength {
            attribute: "normals",
            len: 5,
            points: 4,
            corners: 6,
        };
        assert_eq!(err.polygon(), None);
        assert!(err.to_string().starts_with("normals has 5 elements"));
    }
}
