//! Array and index buffer lifecycles, byte-range updates and mappings.

use glsim::{BufferUpdate, ByteRange, GlErrorKind, MapAccess, UnsignedType, UsageHint};
use glsim_core::math::PackedVec3;
use glsim_test_utils::fixtures;

#[test]
fn test_update_touches_only_its_range() {
    let mut context = fixtures::context();
    let mut buffers = context.array_buffers();
    let buffer = buffers.allocate(16, UsageHint::DynamicDraw).unwrap();

    let range = ByteRange::new(4, 7).unwrap();
    buffers
        .update(buffer, &BufferUpdate::new(range, vec![0xaa, 0xbb, 0xcc, 0xdd]))
        .unwrap();

    let bytes = buffers.read(&buffer).unwrap();
    assert_eq!(&bytes[0..4], &[0; 4]);
    assert_eq!(&bytes[4..8], &[0xaa, 0xbb, 0xcc, 0xdd]);
    assert_eq!(&bytes[8..16], &[0; 8]);
}

#[test]
fn test_update_requires_binding() {
    let mut context = fixtures::context();
    let mut buffers = context.array_buffers();
    let buffer = buffers.allocate(16, UsageHint::StaticDraw).unwrap();
    buffers.unbind().unwrap();

    let update = BufferUpdate::at_offset(0, [1u8, 2]).unwrap();
    assert_eq!(
        buffers.update(buffer, &update).unwrap_err().kind(),
        GlErrorKind::BufferNotBound
    );
    assert_eq!(
        buffers.read(&buffer).unwrap_err().kind(),
        GlErrorKind::BufferNotBound
    );
}

#[test]
fn test_update_out_of_range_writes_nothing() {
    let mut context = fixtures::context();
    let mut buffers = context.array_buffers();
    let buffer = buffers.allocate(8, UsageHint::StaticDraw).unwrap();

    let update = BufferUpdate::at_offset(6, [1u8, 2, 3]).unwrap();
    assert_eq!(
        buffers.update(buffer, &update).unwrap_err().kind(),
        GlErrorKind::RangeCheck
    );
    assert_eq!(buffers.read(&buffer).unwrap(), vec![0; 8]);
}

#[test]
fn test_update_from_pod() {
    let mut context = fixtures::context();
    let mut buffers = context.array_buffers();
    let buffer = buffers.allocate(24, UsageHint::StaticDraw).unwrap();

    let vertices = [
        PackedVec3 { x: 1.0, y: 0.0, z: 0.0 },
        PackedVec3 { x: 0.0, y: 1.0, z: 0.0 },
    ];
    buffers
        .update(buffer, &BufferUpdate::from_pod(0, &vertices).unwrap())
        .unwrap();
    let bytes = buffers.read(&buffer).unwrap();
    assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes());
    assert_eq!(&bytes[16..20], &1.0f32.to_ne_bytes());
}

#[test]
fn test_bind_and_unbind_are_idempotent() {
    let mut context = fixtures::context();
    let mut buffers = context.array_buffers();
    let buffer = buffers.allocate(4, UsageHint::StaticDraw).unwrap();

    buffers.bind(buffer).unwrap();
    buffers.bind(buffer).unwrap();
    assert_eq!(buffers.bound().unwrap(), Some(buffer));

    buffers.unbind().unwrap();
    buffers.unbind().unwrap();
    assert_eq!(buffers.bound().unwrap(), None);
    assert!(!buffers.any_bound().unwrap());
}

#[test]
fn test_deleted_buffer_stays_deleted() {
    let mut context = fixtures::context();
    let mut buffers = context.array_buffers();
    let buffer = buffers.allocate(4, UsageHint::StaticDraw).unwrap();

    buffers.delete(buffer).unwrap();
    assert_eq!(buffers.bound().unwrap(), None);

    let update = BufferUpdate::at_offset(0, [1u8]).unwrap();
    assert_eq!(buffers.bind(buffer).unwrap_err().kind(), GlErrorKind::Deleted);
    assert_eq!(
        buffers.update(buffer, &update).unwrap_err().kind(),
        GlErrorKind::Deleted
    );
    assert_eq!(buffers.delete(buffer).unwrap_err().kind(), GlErrorKind::Deleted);

    let replacement = buffers.allocate(4, UsageHint::StaticDraw).unwrap();
    assert_ne!(replacement, buffer);
    assert_eq!(buffers.bind(buffer).unwrap_err().kind(), GlErrorKind::Deleted);
}

#[test]
fn test_deletion_through_shared_context_hides_binding() {
    let (mut a, mut b) = fixtures::shared_pair();
    let buffer = a.array_buffers().allocate(4, UsageHint::StaticDraw).unwrap();
    assert_eq!(a.array_buffers().bound().unwrap(), Some(buffer));

    b.array_buffers().delete(buffer).unwrap();
    assert_eq!(a.array_buffers().bound().unwrap(), None);
    assert_eq!(
        a.array_buffers().bind(buffer).unwrap_err().kind(),
        GlErrorKind::Deleted
    );
}

#[test]
fn test_map_discipline() {
    let mut context = fixtures::context();
    let mut buffers = context.array_buffers();
    let buffer = buffers.allocate(4, UsageHint::DynamicDraw).unwrap();

    let mut map = buffers.map(buffer, MapAccess::ReadWrite).unwrap();
    assert!(buffers.is_mapped(&buffer).unwrap());
    assert_eq!(
        buffers.map(buffer, MapAccess::ReadOnly).unwrap_err().kind(),
        GlErrorKind::BufferMappedMultiple
    );

    map.bytes_mut().copy_from_slice(&[4, 3, 2, 1]);
    buffers.unmap(map).unwrap();
    assert!(!buffers.is_mapped(&buffer).unwrap());
    assert_eq!(buffers.read(&buffer).unwrap(), vec![4, 3, 2, 1]);

    let stale = buffers.map(buffer, MapAccess::WriteOnly).unwrap();
    buffers.reallocate(buffer, UsageHint::StreamDraw).unwrap();
    assert_eq!(
        buffers.unmap(stale).unwrap_err().kind(),
        GlErrorKind::BufferMappedNot
    );
    assert_eq!(buffers.read(&buffer).unwrap(), vec![0; 4]);
    assert_eq!(buffers.usage(&buffer).unwrap(), UsageHint::StreamDraw);
}

#[test]
fn test_map_dropped_by_reallocate_cannot_end_a_later_map() {
    let mut context = fixtures::context();
    let mut buffers = context.array_buffers();
    let buffer = buffers.allocate(4, UsageHint::DynamicDraw).unwrap();

    let mut stale = buffers.map(buffer, MapAccess::WriteOnly).unwrap();
    stale.bytes_mut().copy_from_slice(&[9, 9, 9, 9]);
    buffers.reallocate(buffer, UsageHint::DynamicDraw).unwrap();
    let fresh = buffers.map(buffer, MapAccess::ReadOnly).unwrap();

    assert_eq!(
        buffers.unmap(stale).unwrap_err().kind(),
        GlErrorKind::BufferMappedNot
    );
    assert!(buffers.is_mapped(&buffer).unwrap());
    buffers.unmap(fresh).unwrap();
    assert!(!buffers.is_mapped(&buffer).unwrap());
    assert_eq!(buffers.read(&buffer).unwrap(), vec![0; 4]);
}

#[test]
fn test_read_only_map_does_not_write_back() {
    let mut context = fixtures::context();
    let mut buffers = context.array_buffers();
    let buffer = buffers.allocate(2, UsageHint::StaticRead).unwrap();

    let mut map = buffers.map(buffer, MapAccess::ReadOnly).unwrap();
    map.bytes_mut().copy_from_slice(&[7, 7]);
    buffers.unmap(map).unwrap();
    assert_eq!(buffers.read(&buffer).unwrap(), vec![0, 0]);
}

#[test]
fn test_index_buffer_update() {
    let mut context = fixtures::context();
    let mut indices = context.index_buffers();
    let buffer = indices
        .allocate(3, UnsignedType::UnsignedShort, UsageHint::StaticDraw)
        .unwrap();
    assert_eq!(indices.indices(&buffer).unwrap(), 3);
    assert_eq!(indices.index_type(&buffer).unwrap(), UnsignedType::UnsignedShort);

    let values: [u16; 3] = [0, 1, 2];
    indices
        .update(buffer, &BufferUpdate::from_pod(0, &values).unwrap())
        .unwrap();
    assert_eq!(
        indices.read(&buffer).unwrap(),
        bytemuck::cast_slice::<u16, u8>(&values).to_vec()
    );

    indices.unbind().unwrap();
    assert_eq!(
        indices.read(&buffer).unwrap_err().kind(),
        GlErrorKind::BufferNotBound
    );
}
