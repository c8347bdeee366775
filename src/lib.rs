//! MeshSync
//!
//! Mesh message layer for real-time scene synchronization between a
//! content-creation tool and a game engine.
//!
//! This crate re-exports the data model and refine pipeline from
//! `meshsync-core` and the wire format from `meshsync-binary`.
//!
//! # Examples
//!
//! ```rust
//! use glam::Vec3;
//! use mesh_sync::{GetData, GetFlags, MeshData, Message};
//!
//! // Consumer asks for geometry
//! let request = Message::from_bytes(
//!     &Message::from(GetData::new(GetFlags::GET_POINTS | GetFlags::GET_INDICES, 1.0)).to_bytes(),
//! )?;
//! let Message::Get(get) = request else { unreachable!() };
//!
//! // Producer answers with a refined mesh
//! let mut mesh = MeshData::new("/Scene/Quad");
//! mesh.points = vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];
//! mesh.counts = vec![4];
//! mesh.indices = vec![0, 1, 2, 3];
//! let report = mesh.refine(&get.refine_settings())?;
//! assert_eq!(report.triangle_count, 2);
//!
//! let reply = Message::from(mesh).to_bytes();
//! assert!(matches!(Message::from_bytes(&reply)?, Message::Mesh(_)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export from core and binary crates
pub use meshsync_core::{
    ClientSpecificData, ClientType, DeleteData, DeleteDataCS, GeometryError, GetData, GetDataCS,
    GetFlags, MeshData, MeshDataCS, MeshDataFlags, MeshInfo, MeshRefineFlags, MeshRefineSettings,
    MeshSyncError, MessageType, RefineReport, Result, Submesh, SubmeshDataCS, Transform,
    TransformCS, constants,
};

pub use meshsync_binary::{
    BinaryError, BinaryReader, BinaryWriter, Message, MessageData, MessageStream, write_messages,
};

/// Lower-level geometry helpers used by the refine pipeline
pub mod geometry {
    pub use meshsync_core::mesh::geometry::*;
}
