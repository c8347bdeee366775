//! MeshSync Core
//!
//! Data model shared by both ends of a mesh synchronization session:
//! request messages, the mesh payload and the geometry pipeline that turns
//! raw polygon soup into engine-ready submeshes.
//!
//! # Features
//!
//! - **Message entities**: [`GetData`], [`DeleteData`] and [`MeshData`]
//! - **Refine pipeline**: triangulation, normal/tangent generation,
//!   handedness/winding fixes, transform baking and index-bounded splitting
//! - **Interop views**: `#[repr(C)]` views over borrowed messages for
//!   host-language bindings
//!
//! The wire codec lives in the `meshsync-binary` crate.

pub mod client_data;
pub mod constants;
pub mod error;
pub mod flags;
pub mod interop;
pub mod mesh;
pub mod request;
pub mod transform;

pub use client_data::{ClientSpecificData, ClientType};
pub use constants::MessageType;
pub use error::{GeometryError, MeshSyncError, Result};
pub use flags::{GetFlags, MeshDataFlags, MeshRefineFlags};
pub use interop::{DeleteDataCS, GetDataCS, MeshDataCS, SubmeshDataCS, TransformCS};
pub use mesh::{MeshData, MeshInfo, MeshRefineSettings, RefineReport, Submesh};
pub use request::{DeleteData, GetData};
pub use transform::Transform;
