//! Flattened views for host-language bindings
//!
//! Each view borrows its source and exposes the buffers as raw pointer and
//! length pairs with a C layout. Empty buffers are exposed as null. A view
//! is valid only while the borrow it was built from is alive, which the
//! lifetime parameter enforces on the Rust side.
//!
//! Vector buffers hold glam `Vec2`/`Vec3`/`Vec4`, which are plain packed
//! floats (8, 12 and 16 bytes). The transform is carried as [`TransformCS`],
//! 45 packed floats, since glam's SIMD `Quat` and `Mat4` are 16-byte aligned.

use crate::client_data::ClientSpecificData;
use crate::mesh::{MeshData, Submesh};
use crate::request::{DeleteData, GetData};
use crate::transform::Transform;
use crate::flags::MeshDataFlags;
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use std::marker::PhantomData;
use std::ptr;

fn buffer_ptr<T>(values: &[T]) -> *const T {
    if values.is_empty() {
        ptr::null()
    } else {
        values.as_ptr()
    }
}

fn buffer_len<T>(values: &[T]) -> i32 {
    values.len().min(i32::MAX as usize) as i32
}

/// Copy `len` elements out of a foreign buffer; null or non-positive lengths yield an empty vector.
///
/// # Safety
/// When non-null, `data` must point to at least `len` initialized elements.
unsafe fn copy_buffer<T: Copy>(data: *const T, len: i32) -> Vec<T> {
    if data.is_null() || len <= 0 {
        return Vec::new();
    }
    // SAFETY: guaranteed by the caller
    unsafe { std::slice::from_raw_parts(data, len as usize) }.to_vec()
}

/// [`Transform`] as 45 consecutive `f32`, matrices column-major
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformCS {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub rotation_euler_zxy: [f32; 3],
    pub scale: [f32; 3],
    pub local2world: [f32; 16],
    pub world2local: [f32; 16],
}

impl From<&Transform> for TransformCS {
    fn from(t: &Transform) -> Self {
        Self {
            position: t.position.to_array(),
            rotation: t.rotation.to_array(),
            rotation_euler_zxy: t.rotation_euler_zxy.to_array(),
            scale: t.scale.to_array(),
            local2world: t.local2world.to_cols_array(),
            world2local: t.world2local.to_cols_array(),
        }
    }
}

impl From<&TransformCS> for Transform {
    fn from(t: &TransformCS) -> Self {
        Self {
            position: Vec3::from_array(t.position),
            rotation: Quat::from_array(t.rotation),
            rotation_euler_zxy: Vec3::from_array(t.rotation_euler_zxy),
            scale: Vec3::from_array(t.scale),
            local2world: Mat4::from_cols_array(&t.local2world),
            world2local: Mat4::from_cols_array(&t.world2local),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GetDataCS {
    pub flags: u32,
    pub scale: f32,
}

impl GetDataCS {
    pub fn new(v: &GetData) -> Self {
        Self {
            flags: v.flags.bits(),
            scale: v.scale,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DeleteDataCS<'a> {
    /// UTF-8 bytes, not NUL terminated
    pub obj_path: *const u8,
    pub obj_path_len: i32,
    _source: PhantomData<&'a DeleteData>,
}

impl<'a> DeleteDataCS<'a> {
    pub fn new(v: &'a DeleteData) -> Self {
        Self {
            obj_path: buffer_ptr(v.path.as_bytes()),
            obj_path_len: buffer_len(v.path.as_bytes()),
            _source: PhantomData,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MeshDataCS<'a> {
    pub flags: u32,
    cpp: Option<&'a MeshData>,
    pub path: *const u8,
    pub path_len: i32,
    pub points: *const Vec3,
    pub normals: *const Vec3,
    pub tangents: *const Vec4,
    pub uv: *const Vec2,
    pub counts: *const i32,
    pub indices: *const i32,
    pub num_points: i32,
    pub num_normals: i32,
    pub num_tangents: i32,
    pub num_uv: i32,
    pub num_counts: i32,
    pub num_indices: i32,
    pub num_submeshes: i32,
    pub transform: TransformCS,
}

impl<'a> MeshDataCS<'a> {
    pub fn new(v: &'a MeshData) -> Self {
        Self {
            flags: v.flags.bits(),
            cpp: Some(v),
            path: buffer_ptr(v.path.as_bytes()),
            path_len: buffer_len(v.path.as_bytes()),
            points: buffer_ptr(&v.points),
            normals: buffer_ptr(&v.normals),
            tangents: buffer_ptr(&v.tangents),
            uv: buffer_ptr(&v.uv),
            counts: buffer_ptr(&v.counts),
            indices: buffer_ptr(&v.indices),
            num_points: buffer_len(&v.points),
            num_normals: buffer_len(&v.normals),
            num_tangents: buffer_len(&v.tangents),
            num_uv: buffer_len(&v.uv),
            num_counts: buffer_len(&v.counts),
            num_indices: buffer_len(&v.indices),
            num_submeshes: buffer_len(&v.submeshes),
            transform: TransformCS::from(&v.transform),
        }
    }

    /// View of the `index`-th submesh of the source mesh
    pub fn submesh(&self, index: usize) -> Option<SubmeshDataCS<'a>> {
        self.cpp
            .and_then(|mesh| mesh.submeshes.get(index))
            .map(SubmeshDataCS::new)
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SubmeshDataCS<'a> {
    pub points: *const Vec3,
    pub normals: *const Vec3,
    pub tangents: *const Vec4,
    pub uv: *const Vec2,
    pub indices: *const u32,
    pub num_points: i32,
    pub num_indices: i32,
    _source: PhantomData<&'a Submesh>,
}

impl Default for SubmeshDataCS<'_> {
    fn default() -> Self {
        Self {
            points: ptr::null(),
            normals: ptr::null(),
            tangents: ptr::null(),
            uv: ptr::null(),
            indices: ptr::null(),
            num_points: 0,
            num_indices: 0,
            _source: PhantomData,
        }
    }
}

impl<'a> SubmeshDataCS<'a> {
    pub fn new(v: &'a Submesh) -> Self {
        Self {
            points: buffer_ptr(&v.points),
            normals: buffer_ptr(&v.normals),
            tangents: buffer_ptr(&v.tangents),
            uv: buffer_ptr(&v.uv),
            indices: buffer_ptr(&v.indices),
            num_points: buffer_len(&v.points),
            num_indices: buffer_len(&v.indices),
            _source: PhantomData,
        }
    }
}

impl MeshData {
    /// Build an owned mesh by copying every buffer a view points at.
    ///
    /// Submeshes are not carried by the view and come back empty; call
    /// [`MeshData::refine`] to rebuild them.
    ///
    /// # Safety
    /// Every non-null pointer in `cs` must reference at least as many
    /// initialized elements as its matching length field says.
    pub unsafe fn from_cs(cs: &MeshDataCS<'_>) -> MeshData {
        // SAFETY: pointer/length pairs are valid per this function's contract
        let (path, points, normals, tangents, uv, counts, indices) = unsafe {
            (
                copy_buffer(cs.path, cs.path_len),
                copy_buffer(cs.points, cs.num_points),
                copy_buffer(cs.normals, cs.num_normals),
                copy_buffer(cs.tangents, cs.num_tangents),
                copy_buffer(cs.uv, cs.num_uv),
                copy_buffer(cs.counts, cs.num_counts),
                copy_buffer(cs.indices, cs.num_indices),
            )
        };

        MeshData {
            path: String::from_utf8_lossy(&path).into_owned(),
            flags: MeshDataFlags::from_bits_retain(cs.flags),
            points,
            normals,
            tangents,
            uv,
            counts,
            indices,
            transform: Transform::from(&cs.transform),
            csd: ClientSpecificData::NoData,
            submeshes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::GetFlags;
    use crate::mesh::MeshRefineSettings;

    fn triangle() -> MeshData {
        let mut mesh = MeshData::new("/Scene/Tri");
        mesh.points = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        mesh.uv = vec![Vec2::ZERO, Vec2::X, Vec2::Y];
        mesh.counts = vec![3];
        mesh.indices = vec![0, 1, 2];
        mesh.sync_flags();
        mesh
    }

    #[test]
    fn test_get_view() {
        let get = GetData::new(GetFlags::GET_POINTS | GetFlags::GET_UV, 2.0);
        let cs = GetDataCS::new(&get);
        assert_eq!(cs.flags, 0b1_0010);
        assert_eq!(cs.scale, 2.0);
    }

    #[test]
    fn test_delete_view() {
        let delete = DeleteData::new("/Scene/Cube");
        let cs = DeleteDataCS::new(&delete);
        assert_eq!(cs.obj_path_len, 11);
        assert_eq!(cs.obj_path, delete.path.as_ptr());
    }

    #[test]
    fn test_mesh_view_points_at_buffers() {
        let mesh = triangle();
        let cs = MeshDataCS::new(&mesh);
        assert_eq!(cs.points, mesh.points.as_ptr());
        assert_eq!(cs.num_points, 3);
        assert_eq!(cs.num_indices, 3);
        assert!(cs.normals.is_null());
        assert_eq!(cs.num_normals, 0);
        assert!(cs.submesh(0).is_none());
    }

    #[test]
    fn test_submesh_view() {
        let mut mesh = triangle();
        mesh.refine(&MeshRefineSettings::default()).unwrap();
        let cs = MeshDataCS::new(&mesh);
        assert_eq!(cs.num_submeshes, 1);

        let sub = cs.submesh(0).unwrap();
        assert_eq!(sub.num_points, 3);
        assert_eq!(sub.num_indices, 3);
        assert_eq!(sub.indices, mesh.submeshes[0].indices.as_ptr());
        assert!(SubmeshDataCS::default().points.is_null());
    }

    #[test]
    fn test_transform_view_is_packed() {
        assert_eq!(
            std::mem::size_of::<TransformCS>(),
            crate::constants::TRANSFORM_SIZE as usize
        );
        assert_eq!(std::mem::align_of::<TransformCS>(), 4);

        let transform = Transform::from_trs(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(0.5),
            Vec3::splat(2.0),
        );
        let cs = TransformCS::from(&transform);
        assert_eq!(cs.position, [1.0, 2.0, 3.0]);
        assert_eq!(cs.local2world[12..15], [1.0, 2.0, 3.0]);
        assert_eq!(Transform::from(&cs), transform);
    }

    #[test]
    fn test_from_cs_copies() {
        let mesh = triangle();
        let cs = MeshDataCS::new(&mesh);
        let copy = unsafe { MeshData::from_cs(&cs) };
        assert_eq!(copy, mesh);
    }
}
