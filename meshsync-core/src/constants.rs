//! Constants shared by the data model and the wire format
//!
//! Element sizes describe the packed on-wire representation; they are not
//! tied to the in-memory layout of the glam types.

/// Default maximum number of indices per submesh
pub const DEFAULT_SPLIT_UNIT: u32 = 65000;

/// Smallest usable split unit (one triangle)
pub const MIN_SPLIT_UNIT: u32 = 3;

/// Size of a length prefix for strings and arrays
pub const LENGTH_PREFIX_SIZE: u32 = 4;

/// Size of a flags word
pub const FLAGS_SIZE: u32 = 4;

/// Packed sizes of array elements
pub const INDEX_SIZE: u32 = 4;
pub const FLOAT2_SIZE: u32 = 8;
pub const FLOAT3_SIZE: u32 = 12;
pub const FLOAT4_SIZE: u32 = 16;

/// position(3) + rotation(4) + euler(3) + scale(3) + two 4x4 matrices
pub const TRANSFORM_FLOATS: u32 = 3 + 4 + 3 + 3 + 16 + 16;

/// Packed size of a [`Transform`](crate::Transform)
pub const TRANSFORM_SIZE: u32 = TRANSFORM_FLOATS * 4;

/// Type tag plus a four byte payload
pub const CLIENT_DATA_SIZE: u32 = 8;

/// Size of the leading message type tag
pub const MESSAGE_TYPE_SIZE: u32 = 4;

/// Message kinds as they appear in the leading tag of every message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageType {
    Unknown = 0,
    Get = 1,
    Delete = 2,
    Mesh = 3,
}

impl MessageType {
    /// Decode a wire tag; unrecognized values map to `Unknown`
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => MessageType::Get,
            2 => MessageType::Delete,
            3 => MessageType::Mesh,
            _ => MessageType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Unknown => "Unknown",
            MessageType::Get => "Get",
            MessageType::Delete => "Delete",
            MessageType::Mesh => "Mesh",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_size() {
        assert_eq!(TRANSFORM_SIZE, 180);
    }

    #[test]
    fn test_message_type_tags() {
        assert_eq!(MessageType::from_u32(1), MessageType::Get);
        assert_eq!(MessageType::from_u32(3), MessageType::Mesh);
        assert_eq!(MessageType::from_u32(42), MessageType::Unknown);
        assert_eq!(MessageType::Delete as u32, 2);
        assert_eq!(MessageType::Mesh.to_string(), "Mesh");
    }
}
