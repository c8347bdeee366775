//! Flag words carried by requests, meshes and refine settings
//!
//! Each bit is independently settable and the raw `u32` is exactly the
//! value written on the wire. Bits not named here are retained when read
//! back with `from_bits_retain`, so foreign producers round-trip unchanged.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Attributes and behaviors requested by a [`GetData`](crate::GetData) message.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct GetFlags: u32 {
        const GET_TRANSFORM = 1 << 0;
        const GET_POINTS = 1 << 1;
        const GET_NORMALS = 1 << 2;
        const GET_TANGENTS = 1 << 3;
        const GET_UV = 1 << 4;
        const GET_INDICES = 1 << 5;
        const GET_BONES = 1 << 6;
        const SWAP_HANDEDNESS = 1 << 7;
        const SWAP_FACES = 1 << 8;
        const APPLY_TRANSFORM = 1 << 9;
        const BAKE_SKIN = 1 << 10;
    }
}

bitflags! {
    /// Steps enabled in [`MeshData::refine`](crate::MeshData::refine).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MeshRefineFlags: u32 {
        /// Partition triangles into submeshes bounded by `split_unit`
        const SPLIT = 1 << 0;
        /// Synthesize normals when none were supplied
        const GEN_NORMALS = 1 << 1;
        /// Synthesize tangents when none were supplied
        const GEN_TANGENTS = 1 << 2;
        /// Negate the X axis of positions, normals and tangents
        const SWAP_HANDEDNESS = 1 << 3;
        /// Reverse the corner order of every polygon
        const SWAP_FACES = 1 << 4;
        /// Bake `transform.local2world` into the geometry
        const APPLY_TRANSFORM = 1 << 5;
    }
}

bitflags! {
    /// Which [`MeshData`](crate::MeshData) buffers are populated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MeshDataFlags: u32 {
        const HAS_TRANSFORM = 1 << 0;
        const HAS_INDICES = 1 << 1;
        const HAS_COUNTS = 1 << 2;
        const HAS_POINTS = 1 << 3;
        const HAS_NORMALS = 1 << 4;
        const HAS_TANGENTS = 1 << 5;
        const HAS_UV = 1 << 6;
    }
}

impl GetFlags {
    /// Refine steps implied by this request
    pub fn refine_flags(&self) -> MeshRefineFlags {
        let mut flags = MeshRefineFlags::empty();
        flags.set(
            MeshRefineFlags::SWAP_HANDEDNESS,
            self.contains(GetFlags::SWAP_HANDEDNESS),
        );
        flags.set(MeshRefineFlags::SWAP_FACES, self.contains(GetFlags::SWAP_FACES));
        flags.set(
            MeshRefineFlags::APPLY_TRANSFORM,
            self.contains(GetFlags::APPLY_TRANSFORM),
        );
        flags
    }
}
