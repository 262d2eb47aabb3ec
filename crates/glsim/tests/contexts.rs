//! Context sharing and the compatibility checker.
//!
//! Shared kinds may cross between contexts of one share group; per-context
//! kinds and pseudo-objects may not.

use glsim::{
    Context, ContextDescriptor, GlErrorKind, Texture2DDescriptor, TextureFormat, UsageHint,
};
use glsim_test_utils::fixtures;
use glsim_test_utils::{HiddenExtensions, TextureUnitLimit};

#[test]
fn test_sharing_is_symmetric() {
    let (a, b) = fixtures::shared_pair();

    assert!(a.is_shared_with(b.id()));
    assert!(b.is_shared_with(a.id()));
    assert_eq!(a.shared_with(), vec![b.id()]);
    assert_eq!(b.shared_with(), vec![a.id()]);
}

#[test]
fn test_shared_objects_cross_contexts() {
    let (mut a, mut b) = fixtures::shared_pair();

    let from_a = a.array_buffers().allocate(8, UsageHint::StaticDraw).unwrap();
    let from_b = b.array_buffers().allocate(8, UsageHint::StaticDraw).unwrap();

    a.check(&from_b).unwrap();
    b.check(&from_a).unwrap();
    b.array_buffers().bind(from_a).unwrap();
    a.array_buffers().bind(from_b).unwrap();
    assert_eq!(b.array_buffers().bound().unwrap(), Some(from_a));
}

#[test]
fn test_shared_kinds_draw_from_one_name_space() {
    let (mut a, mut b) = fixtures::shared_pair();

    let first = a.array_buffers().allocate(4, UsageHint::StaticDraw).unwrap();
    let second = b.array_buffers().allocate(4, UsageHint::StaticDraw).unwrap();
    assert_ne!(first.name(), second.name());
}

#[test]
fn test_unshared_objects_stay_private() {
    let (mut a, mut b) = fixtures::shared_pair();

    let builder = a.array_objects().new_builder().unwrap();
    let array_object = a.array_objects().allocate(&builder).unwrap();
    let query = a.timer_queries().allocate().unwrap();

    assert_eq!(b.check(&array_object).unwrap_err().kind(), GlErrorKind::WrongContext);
    assert_eq!(
        b.array_objects().bind(array_object).unwrap_err().kind(),
        GlErrorKind::WrongContext
    );
    assert_eq!(
        b.timer_queries().begin(&query).unwrap_err().kind(),
        GlErrorKind::WrongContext
    );
    a.array_objects().bind(array_object).unwrap();
}

#[test]
fn test_unrelated_contexts_reject_everything() {
    let mut a = fixtures::context();
    let mut c = fixtures::context();

    let buffer = a.array_buffers().allocate(8, UsageHint::StaticDraw).unwrap();
    assert_eq!(
        c.array_buffers().bind(buffer).unwrap_err().kind(),
        GlErrorKind::WrongContext
    );
    assert_eq!(
        c.array_buffers().delete(buffer).unwrap_err().kind(),
        GlErrorKind::WrongContext
    );
}

#[test]
fn test_texture_units_are_per_context() {
    let (mut a, mut b) = fixtures::shared_pair();

    let units = a.textures().texture_units().unwrap();
    let error = b
        .textures()
        .texture_2d_allocate(units[0], &Texture2DDescriptor::new(4, 4, TextureFormat::Rgba8))
        .unwrap_err();
    assert_eq!(error.kind(), GlErrorKind::WrongContext);
}

#[test]
fn test_wrong_context_is_checked_before_deleted() {
    let mut a = fixtures::context();
    let mut c = fixtures::context();

    let buffer = a.array_buffers().allocate(8, UsageHint::StaticDraw).unwrap();
    a.array_buffers().delete(buffer).unwrap();
    assert_eq!(
        c.array_buffers().bind(buffer).unwrap_err().kind(),
        GlErrorKind::WrongContext
    );
    assert_eq!(
        a.array_buffers().bind(buffer).unwrap_err().kind(),
        GlErrorKind::Deleted
    );
}

#[test]
fn test_destroyed_context_rejects_operations() {
    let mut context = fixtures::context();
    let buffer = context
        .array_buffers()
        .allocate(8, UsageHint::StaticDraw)
        .unwrap();
    context.destroy().unwrap();

    assert_eq!(
        context.array_buffers().bind(buffer).unwrap_err().kind(),
        GlErrorKind::ContextDestroyed
    );
    assert_eq!(
        context.textures().texture_units().unwrap_err().kind(),
        GlErrorKind::ContextDestroyed
    );
    assert_eq!(
        context.timer_queries().allocate().unwrap_err().kind(),
        GlErrorKind::ContextDestroyed
    );
    assert!(Context::new_shared_with(&context, ContextDescriptor::default()).is_err());
}

#[test]
fn test_soft_restrictions_clamp_texture_units() {
    let mut context = Context::new(ContextDescriptor::default().with_restrictions(TextureUnitLimit(3)));
    assert_eq!(context.limits().max_texture_units, 3);
    assert_eq!(context.textures().texture_units().unwrap().len(), 3);

    let context = Context::new(ContextDescriptor::default().with_restrictions(TextureUnitLimit(1000)));
    assert_eq!(context.limits().max_texture_units, 16);
}

#[test]
fn test_hidden_extensions() {
    let context = Context::new(
        ContextDescriptor::default().with_restrictions(HiddenExtensions::new(["GL_KHR_debug"])),
    );
    assert!(!context.extension_visible("GL_KHR_debug"));
    assert!(context.extension_visible("GL_EXT_texture_filter_anisotropic"));
}
