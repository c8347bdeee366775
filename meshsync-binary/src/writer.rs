//! Binary data writer for MeshSync messages

use crate::error::{BinaryError, Result};
use byteorder::{ByteOrder, LittleEndian};
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// Little-endian writer appending to an owned buffer
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    buffer: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, value);
        self.buffer.extend_from_slice(&bytes);
    }

    pub fn write_i32(&mut self, value: i32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_i32(&mut bytes, value);
        self.buffer.extend_from_slice(&bytes);
    }

    pub fn write_f32(&mut self, value: f32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_f32(&mut bytes, value);
        self.buffer.extend_from_slice(&bytes);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Write an element count.
    ///
    /// Lengths past `u32::MAX` cannot be represented; encoders run
    /// [`MessageData::check_size`](crate::MessageData::check_size) first.
    pub fn write_len(&mut self, len: usize) {
        debug_assert!(len <= u32::MAX as usize, "length {len} exceeds the wire limit");
        self.write_u32(len as u32);
    }

    /// Write a string with a length prefix (32-bit)
    pub fn write_string(&mut self, value: &str) {
        self.write_len(value.len());
        self.write_bytes(value.as_bytes());
    }

    pub fn write_vec2(&mut self, value: Vec2) {
        self.write_f32(value.x);
        self.write_f32(value.y);
    }

    pub fn write_vec3(&mut self, value: Vec3) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
    }

    pub fn write_vec4(&mut self, value: Vec4) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
        self.write_f32(value.w);
    }

    /// Write a quaternion as x, y, z, w
    pub fn write_quat(&mut self, value: Quat) {
        self.write_vec4(Vec4::from(value));
    }

    /// Write a 4x4 matrix column-major
    pub fn write_mat4(&mut self, value: &Mat4) {
        for v in value.to_cols_array() {
            self.write_f32(v);
        }
    }

    /// Write a length-prefixed array
    pub fn write_array<T>(&mut self, values: &[T], mut write: impl FnMut(&mut Self, &T)) {
        self.write_len(values.len());
        for value in values {
            write(self, value);
        }
    }
}

/// Convert a byte or element count to its `u32` wire value
pub fn wire_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| BinaryError::too_large(len))
}

/// Encoded size of a length-prefixed array
pub(crate) fn array_size(len: usize, element_size: u32) -> usize {
    4 + len * element_size as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_output() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(0x0403_0201);
        writer.write_f32(2.0);
        assert_eq!(writer.as_slice(), &[1, 2, 3, 4, 0, 0, 0, 0x40]);
    }

    #[test]
    fn test_string_prefix() {
        let mut writer = BinaryWriter::new();
        writer.write_string("abc");
        assert_eq!(writer.into_inner(), vec![3, 0, 0, 0, b'a', b'b', b'c']);
    }

    #[test]
    fn test_array_size_matches_output() {
        let values = [Vec3::ONE, Vec3::ZERO];
        let mut writer = BinaryWriter::new();
        writer.write_array(&values, |w, v| w.write_vec3(*v));
        assert_eq!(writer.len(), array_size(values.len(), 12));
    }

    #[test]
    fn test_wire_len_limit() {
        assert_eq!(wire_len(7).unwrap(), 7);
        assert_eq!(wire_len(u32::MAX as usize).unwrap(), u32::MAX);
        let err = wire_len(u32::MAX as usize + 1).unwrap_err();
        assert!(matches!(err, BinaryError::TooLarge(n) if n == u32::MAX as usize + 1));
    }
}
