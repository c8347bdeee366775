//! Mesh message entity and refine pipeline
//!
//! # Architecture
//!
//! - `types` - Core data structures (MeshData, Submesh, MeshRefineSettings, RefineReport)
//! - `geometry` - Triangulation, attribute synthesis and partitioning helpers
//! - `processor` - The refine pipeline and transform baking on [`MeshData`]
//!
//! # Examples
//!
//! ```rust
//! use glam::Vec3;
//! use meshsync_core::{MeshData, MeshRefineFlags, MeshRefineSettings};
//!
//! let mut mesh = MeshData::new("/Scene/Quad");
//! mesh.points = vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];
//! mesh.counts = vec![4];
//! mesh.indices = vec![0, 1, 2, 3];
//!
//! let settings = MeshRefineSettings::default()
//!     .with_flags(MeshRefineFlags::SPLIT | MeshRefineFlags::GEN_NORMALS);
//! let report = mesh.refine(&settings)?;
//!
//! assert_eq!(report.triangle_count, 2);
//! assert_eq!(mesh.num_submeshes(), 1);
//! # Ok::<(), meshsync_core::MeshSyncError>(())
//! ```

pub mod geometry;
pub mod processor;
pub mod types;

pub use geometry::{AttributeDomain, PolygonSpan, VertexStreams};
pub use types::{MeshData, MeshInfo, MeshRefineSettings, RefineReport, Submesh};
