//! Producer-specific extension payload
//!
//! The payload is carried, never interpreted. On the wire it is a `u32` tag
//! followed by four payload bytes. Every record survives a decode and
//! re-encode bit for bit: tags this crate does not know, and a NoData tag
//! whose payload is not zero, keep their raw bytes.

use serde::{Deserialize, Serialize};

/// Tag values for [`ClientSpecificData`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ClientType {
    NoData = 0,
    Metasequoia = 1,
}

/// Tagged extension data attached to a mesh
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ClientSpecificData {
    #[default]
    NoData,
    /// Metasequoia: smoothing angle in degrees used by the modeler
    Metasequoia { smooth_angle: f32 },
    /// Raw record: a tag from another producer, or tag 0 with non-zero bytes
    Opaque { tag: u32, payload: [u8; 4] },
}

impl ClientSpecificData {
    /// The wire tag of this variant
    pub fn tag(&self) -> u32 {
        match self {
            ClientSpecificData::NoData => ClientType::NoData as u32,
            ClientSpecificData::Metasequoia { .. } => ClientType::Metasequoia as u32,
            ClientSpecificData::Opaque { tag, .. } => *tag,
        }
    }

    /// The four payload bytes (little endian for typed variants)
    pub fn payload(&self) -> [u8; 4] {
        match self {
            ClientSpecificData::NoData => [0; 4],
            ClientSpecificData::Metasequoia { smooth_angle } => smooth_angle.to_le_bytes(),
            ClientSpecificData::Opaque { payload, .. } => *payload,
        }
    }

    /// Rebuild from a wire tag and payload
    pub fn from_parts(tag: u32, payload: [u8; 4]) -> Self {
        match tag {
            t if t == ClientType::NoData as u32 && payload == [0; 4] => {
                ClientSpecificData::NoData
            }
            t if t == ClientType::Metasequoia as u32 => ClientSpecificData::Metasequoia {
                smooth_angle: f32::from_le_bytes(payload),
            },
            tag => ClientSpecificData::Opaque { tag, payload },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ClientSpecificData::NoData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metasequoia_parts() {
        let csd = ClientSpecificData::Metasequoia { smooth_angle: 59.5 };
        assert_eq!(csd.tag(), 1);
        let rebuilt = ClientSpecificData::from_parts(csd.tag(), csd.payload());
        assert_eq!(rebuilt, csd);
    }

    #[test]
    fn test_unknown_tag_is_opaque() {
        let csd = ClientSpecificData::from_parts(7, [1, 2, 3, 4]);
        assert_eq!(
            csd,
            ClientSpecificData::Opaque {
                tag: 7,
                payload: [1, 2, 3, 4]
            }
        );
        assert_eq!(csd.tag(), 7);
        assert_eq!(csd.payload(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_no_data_default() {
        let csd = ClientSpecificData::default();
        assert!(csd.is_empty());
        assert_eq!(csd.payload(), [0; 4]);
        assert_eq!(ClientSpecificData::from_parts(0, [0; 4]), csd);
    }

    #[test]
    fn test_no_data_tag_keeps_payload_bytes() {
        let csd = ClientSpecificData::from_parts(0, [1, 2, 3, 4]);
        assert!(!csd.is_empty());
        assert_eq!(csd.tag(), 0);
        assert_eq!(csd.payload(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_metasequoia_payload_bits_preserved() {
        // signalling NaN with a payload
        let bytes = [0x01, 0x00, 0x80, 0x7f];
        let csd = ClientSpecificData::from_parts(1, bytes);
        assert_eq!(csd.payload(), bytes);
    }
}
