/// Vector and matrix types used for uniform values, re-exported from [`glam`].
///
/// # Examples
///
/// ```
/// use glsim_core::math::{Mat4, Vec3};
///
/// let transform = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
/// assert_eq!(transform.w_axis.z, -5.0);
/// ```
///
/// [`glam`]: https://docs.rs/glam
pub mod fast {
    pub use glam::*;
}

/// Packed `#[repr(C)]` vertex types for filling emulated buffers.
///
/// These are [`bytemuck::Pod`] so a slice of them can be handed to a buffer
/// update without manual byte packing.
///
/// ```
/// use glsim_core::math::PackedVec2;
///
/// let vertices = [PackedVec2 { x: -1.0, y: -1.0 }, PackedVec2 { x: 1.0, y: -1.0 }];
/// let bytes: &[u8] = bytemuck::cast_slice(&vertices);
/// assert_eq!(bytes.len(), 16);
/// ```
pub mod packed {
    use bytemuck::{Pod, Zeroable};

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
    pub struct Vec2 {
        pub x: f32,
        pub y: f32,
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
    pub struct Vec3 {
        pub x: f32,
        pub y: f32,
        pub z: f32,
    }

    /// Natural 16-byte layout, matching a `vec4` attribute.
    #[repr(C)]
    #[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
    pub struct Vec4 {
        pub x: f32,
        pub y: f32,
        pub z: f32,
        pub w: f32,
    }
}

pub use fast::*;
pub use packed::{Vec2 as PackedVec2, Vec3 as PackedVec3, Vec4 as PackedVec4};
