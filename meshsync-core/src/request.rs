//! Lightweight request messages

use crate::flags::GetFlags;
use crate::mesh::MeshRefineSettings;
use serde::{Deserialize, Serialize};

/// Request for mesh data with the attributes selected by `flags`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GetData {
    pub flags: GetFlags,
    /// Uniform scale applied to returned geometry
    pub scale: f32,
}

impl Default for GetData {
    fn default() -> Self {
        Self {
            flags: GetFlags::empty(),
            scale: 1.0,
        }
    }
}

impl GetData {
    pub fn new(flags: GetFlags, scale: f32) -> Self {
        Self { flags, scale }
    }

    /// Refine settings a producer should use to answer this request
    pub fn refine_settings(&self) -> MeshRefineSettings {
        MeshRefineSettings {
            flags: self.flags.refine_flags(),
            scale: self.scale,
            ..MeshRefineSettings::default()
        }
    }
}

/// Request to remove the object at `path`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteData {
    pub path: String,
}

impl DeleteData {
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self { path: path.into() }
    }
}
