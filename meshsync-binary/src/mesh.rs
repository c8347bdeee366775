//! Wire encoding of [`MeshData`]
//!
//! Layout, in order: path, flags word, transform (if `HAS_TRANSFORM`),
//! counts, indices, points, normals, tangents and uv (each only if its bit
//! is set), client-specific data, then the submesh count and every submesh
//! with all five of its arrays.

use crate::error::{BinaryError, Result};
use crate::message::MessageData;
use crate::reader::BinaryReader;
use crate::writer::{BinaryWriter, array_size};
use meshsync_core::constants::{
    CLIENT_DATA_SIZE, FLAGS_SIZE, FLOAT2_SIZE, FLOAT3_SIZE, FLOAT4_SIZE, INDEX_SIZE,
    LENGTH_PREFIX_SIZE, TRANSFORM_SIZE,
};
use meshsync_core::{ClientSpecificData, MeshData, MeshDataFlags, MessageType, Submesh, Transform};

/// Smallest possible submesh: five empty arrays
const EMPTY_SUBMESH_SIZE: usize = 5 * LENGTH_PREFIX_SIZE as usize;

fn write_transform(writer: &mut BinaryWriter, t: &Transform) {
    writer.write_vec3(t.position);
    writer.write_quat(t.rotation);
    writer.write_vec3(t.rotation_euler_zxy);
    writer.write_vec3(t.scale);
    writer.write_mat4(&t.local2world);
    writer.write_mat4(&t.world2local);
}

fn read_transform(reader: &mut BinaryReader<'_>) -> Result<Transform> {
    Ok(Transform {
        position: reader.read_vec3()?,
        rotation: reader.read_quat()?,
        rotation_euler_zxy: reader.read_vec3()?,
        scale: reader.read_vec3()?,
        local2world: reader.read_mat4()?,
        world2local: reader.read_mat4()?,
    })
}

fn write_client_data(writer: &mut BinaryWriter, csd: &ClientSpecificData) {
    writer.write_u32(csd.tag());
    writer.write_bytes(&csd.payload());
}

fn read_client_data(reader: &mut BinaryReader<'_>) -> Result<ClientSpecificData> {
    let tag = reader.read_u32()?;
    let payload = reader.read_array_bytes::<4>()?;
    Ok(ClientSpecificData::from_parts(tag, payload))
}

fn submesh_size(sub: &Submesh) -> usize {
    array_size(sub.points.len(), FLOAT3_SIZE)
        + array_size(sub.normals.len(), FLOAT3_SIZE)
        + array_size(sub.tangents.len(), FLOAT4_SIZE)
        + array_size(sub.uv.len(), FLOAT2_SIZE)
        + array_size(sub.indices.len(), INDEX_SIZE)
}

fn write_submesh(writer: &mut BinaryWriter, sub: &Submesh) {
    writer.write_array(&sub.points, |w, v| w.write_vec3(*v));
    writer.write_array(&sub.normals, |w, v| w.write_vec3(*v));
    writer.write_array(&sub.tangents, |w, v| w.write_vec4(*v));
    writer.write_array(&sub.uv, |w, v| w.write_vec2(*v));
    writer.write_array(&sub.indices, |w, v| w.write_u32(*v));
}

fn read_submesh(reader: &mut BinaryReader<'_>) -> Result<Submesh> {
    Ok(Submesh {
        points: reader.read_array(FLOAT3_SIZE as usize, |r| r.read_vec3())?,
        normals: reader.read_array(FLOAT3_SIZE as usize, |r| r.read_vec3())?,
        tangents: reader.read_array(FLOAT4_SIZE as usize, |r| r.read_vec4())?,
        uv: reader.read_array(FLOAT2_SIZE as usize, |r| r.read_vec2())?,
        indices: reader.read_array(INDEX_SIZE as usize, |r| r.read_u32())?,
    })
}

/// Read an array whose presence bit is set; it must not be empty
fn read_flagged<T>(
    reader: &mut BinaryReader<'_>,
    field: &'static str,
    element_size: u32,
    read: impl FnMut(&mut BinaryReader<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let values = reader.read_array(element_size as usize, read)?;
    if values.is_empty() {
        return Err(BinaryError::flag_mismatch(field));
    }
    Ok(values)
}

/// Flags word as written: presence bits derived from the buffers plus any
/// bits this version does not know about.
fn wire_flags(mesh: &MeshData) -> MeshDataFlags {
    mesh.effective_flags() | mesh.flags.difference(MeshDataFlags::all())
}

impl MessageData for MeshData {
    const MESSAGE_TYPE: MessageType = MessageType::Mesh;

    fn encoded_len(&self) -> usize {
        let flags = wire_flags(self);
        let mut size = LENGTH_PREFIX_SIZE as usize + self.path.len() + FLAGS_SIZE as usize;

        if flags.contains(MeshDataFlags::HAS_TRANSFORM) {
            size += TRANSFORM_SIZE as usize;
        }
        if flags.contains(MeshDataFlags::HAS_COUNTS) {
            size += array_size(self.counts.len(), INDEX_SIZE);
        }
        if flags.contains(MeshDataFlags::HAS_INDICES) {
            size += array_size(self.indices.len(), INDEX_SIZE);
        }
        if flags.contains(MeshDataFlags::HAS_POINTS) {
            size += array_size(self.points.len(), FLOAT3_SIZE);
        }
        if flags.contains(MeshDataFlags::HAS_NORMALS) {
            size += array_size(self.normals.len(), FLOAT3_SIZE);
        }
        if flags.contains(MeshDataFlags::HAS_TANGENTS) {
            size += array_size(self.tangents.len(), FLOAT4_SIZE);
        }
        if flags.contains(MeshDataFlags::HAS_UV) {
            size += array_size(self.uv.len(), FLOAT2_SIZE);
        }

        size += CLIENT_DATA_SIZE as usize + LENGTH_PREFIX_SIZE as usize;
        size += self.submeshes.iter().map(submesh_size).sum::<usize>();

        size
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        let flags = wire_flags(self);
        writer.write_string(&self.path);
        writer.write_u32(flags.bits());

        if flags.contains(MeshDataFlags::HAS_TRANSFORM) {
            write_transform(writer, &self.transform);
        }
        if flags.contains(MeshDataFlags::HAS_COUNTS) {
            writer.write_array(&self.counts, |w, v| w.write_i32(*v));
        }
        if flags.contains(MeshDataFlags::HAS_INDICES) {
            writer.write_array(&self.indices, |w, v| w.write_i32(*v));
        }
        if flags.contains(MeshDataFlags::HAS_POINTS) {
            writer.write_array(&self.points, |w, v| w.write_vec3(*v));
        }
        if flags.contains(MeshDataFlags::HAS_NORMALS) {
            writer.write_array(&self.normals, |w, v| w.write_vec3(*v));
        }
        if flags.contains(MeshDataFlags::HAS_TANGENTS) {
            writer.write_array(&self.tangents, |w, v| w.write_vec4(*v));
        }
        if flags.contains(MeshDataFlags::HAS_UV) {
            writer.write_array(&self.uv, |w, v| w.write_vec2(*v));
        }

        write_client_data(writer, &self.csd);
        writer.write_array(&self.submeshes, write_submesh);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let mut mesh = MeshData::new(reader.read_string()?);
        let flags = MeshDataFlags::from_bits_retain(reader.read_u32()?);
        mesh.flags = flags;

        if flags.contains(MeshDataFlags::HAS_TRANSFORM) {
            mesh.transform = read_transform(reader)?;
        }
        if flags.contains(MeshDataFlags::HAS_COUNTS) {
            mesh.counts = read_flagged(reader, "counts", INDEX_SIZE, |r| r.read_i32())?;
        }
        if flags.contains(MeshDataFlags::HAS_INDICES) {
            mesh.indices = read_flagged(reader, "indices", INDEX_SIZE, |r| r.read_i32())?;
        }
        if flags.contains(MeshDataFlags::HAS_POINTS) {
            mesh.points = read_flagged(reader, "points", FLOAT3_SIZE, |r| r.read_vec3())?;
        }
        if flags.contains(MeshDataFlags::HAS_NORMALS) {
            mesh.normals = read_flagged(reader, "normals", FLOAT3_SIZE, |r| r.read_vec3())?;
        }
        if flags.contains(MeshDataFlags::HAS_TANGENTS) {
            mesh.tangents = read_flagged(reader, "tangents", FLOAT4_SIZE, |r| r.read_vec4())?;
        }
        if flags.contains(MeshDataFlags::HAS_UV) {
            mesh.uv = read_flagged(reader, "uv", FLOAT2_SIZE, |r| r.read_vec2())?;
        }

        mesh.csd = read_client_data(reader)?;
        mesh.submeshes = reader.read_array(EMPTY_SUBMESH_SIZE, read_submesh)?;
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec2, Vec3, Vec4};
    use meshsync_core::MeshRefineSettings;

    fn quad() -> MeshData {
        let mut mesh = MeshData::new("/Scene/Quad");
        mesh.points = vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];
        mesh.uv = vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
        mesh.counts = vec![4];
        mesh.indices = vec![0, 1, 2, 3];
        mesh.sync_flags();
        mesh
    }

    #[test]
    fn test_empty_mesh_size() {
        let mesh = MeshData::default();
        let bytes = mesh.to_payload();
        // path length, flags, csd, submesh count
        assert_eq!(bytes.len(), 4 + 4 + 8 + 4);
        assert_eq!(mesh.serialized_size() as usize, bytes.len());
        assert_eq!(MeshData::from_payload(&bytes).unwrap(), mesh);
    }

    #[test]
    fn test_quad_layout_and_round_trip() {
        let mesh = quad();
        let bytes = mesh.to_payload();
        assert_eq!(mesh.serialized_size() as usize, bytes.len());

        let path_end = 4 + mesh.path.len();
        let flags = u32::from_le_bytes(bytes[path_end..path_end + 4].try_into().unwrap());
        assert_eq!(flags, mesh.flags.bits());
        // counts come first after the flags word when there is no transform
        assert_eq!(&bytes[path_end + 4..path_end + 12], &[1, 0, 0, 0, 4, 0, 0, 0]);

        assert_eq!(MeshData::from_payload(&bytes).unwrap(), mesh);
    }

    #[test]
    fn test_refined_round_trip() {
        let mut mesh = quad();
        mesh.flags |= MeshDataFlags::HAS_TRANSFORM;
        mesh.transform = Transform::from_trs(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(0.5),
            Vec3::splat(2.0),
        );
        mesh.csd = ClientSpecificData::Metasequoia { smooth_angle: 45.0 };
        mesh.refine(&MeshRefineSettings::default()).unwrap();
        mesh.flags |= MeshDataFlags::HAS_TRANSFORM;

        let bytes = mesh.to_payload();
        assert_eq!(mesh.serialized_size() as usize, bytes.len());
        let decoded = MeshData::from_payload(&bytes).unwrap();
        assert_eq!(decoded, mesh);
        assert_eq!(decoded.submeshes[0].indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_flags_derived_from_buffers() {
        let mut mesh = quad();
        mesh.flags = MeshDataFlags::HAS_NORMALS;
        let decoded = MeshData::from_payload(&mesh.to_payload()).unwrap();
        assert!(!decoded.flags.contains(MeshDataFlags::HAS_NORMALS));
        assert!(decoded.flags.contains(MeshDataFlags::HAS_UV));
    }

    #[test]
    fn test_flagged_empty_array_rejected() {
        let mut writer = BinaryWriter::new();
        writer.write_string("/A");
        writer.write_u32(MeshDataFlags::HAS_NORMALS.bits());
        writer.write_u32(0);
        let err = MeshData::from_payload(writer.as_slice()).unwrap_err();
        assert!(matches!(err, BinaryError::FlagMismatch { field: "normals" }));
    }

    #[test]
    fn test_oversized_array_rejected() {
        let mut writer = BinaryWriter::new();
        writer.write_string("/A");
        writer.write_u32(MeshDataFlags::HAS_TANGENTS.bits());
        writer.write_u32(1_000_000);
        writer.write_vec4(Vec4::ONE);
        let err = MeshData::from_payload(writer.as_slice()).unwrap_err();
        assert!(err.is_truncation());
    }

    #[test]
    fn test_every_truncation_fails() {
        let mut mesh = quad();
        mesh.refine(&MeshRefineSettings::default()).unwrap();
        let bytes = mesh.to_payload();
        for len in 0..bytes.len() {
            assert!(
                MeshData::from_payload(&bytes[..len]).is_err(),
                "prefix of {len} bytes decoded"
            );
        }
    }

    #[test]
    fn test_opaque_client_data_passes_through() {
        let mut mesh = MeshData::new("/A");
        mesh.csd = ClientSpecificData::Opaque {
            tag: 77,
            payload: [1, 2, 3, 4],
        };
        let decoded = MeshData::from_payload(&mesh.to_payload()).unwrap();
        assert_eq!(decoded.csd, mesh.csd);
    }

    #[test]
    fn test_no_data_client_bytes_preserved() {
        let mut writer = BinaryWriter::new();
        writer.write_string("/A");
        writer.write_u32(0);
        writer.write_u32(0);
        writer.write_bytes(&[1, 2, 3, 4]);
        writer.write_u32(0);
        let input = writer.into_inner();

        let mesh = MeshData::from_payload(&input).unwrap();
        assert_eq!(mesh.csd.tag(), 0);
        assert_eq!(mesh.to_payload(), input);
    }
}
