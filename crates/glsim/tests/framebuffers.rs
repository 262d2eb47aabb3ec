//! Framebuffer completeness, attachment bookkeeping, feedback loops and blits.

use glsim::{
    Area, Attachment, BlitBuffers, BlitFilter, Context, DepthStencilAttachment, Framebuffer,
    FramebufferStatus, GlErrorKind, RenderbufferFormat, Texture2D, Texture2DDescriptor,
    TextureFormat,
};
use glsim_test_utils::fixtures;

/// Allocate an unbound 2D color texture.
fn color_texture(context: &mut Context) -> Texture2D {
    let mut textures = context.textures();
    let unit = textures.texture_units().unwrap()[0];
    let texture = textures
        .texture_2d_allocate(unit, &Texture2DDescriptor::new(32, 32, TextureFormat::Rgba8))
        .unwrap();
    textures.unit_unbind(unit).unwrap();
    texture
}

fn color_framebuffer(context: &mut Context, texture: Texture2D) -> Framebuffer {
    let points = context.framebuffers().color_attachment_points().unwrap();
    let draw_buffers = context.framebuffers().draw_buffers().unwrap();
    let mut builder = context.framebuffers().new_builder().unwrap();
    builder
        .attach_color_texture_2d_at(context, points[0], draw_buffers[0], texture)
        .unwrap();
    context.framebuffers().allocate(&builder).unwrap()
}

#[test]
fn test_empty_framebuffer_is_incomplete() {
    let mut context = fixtures::context();
    let builder = context.framebuffers().new_builder().unwrap();
    assert_eq!(builder.status(), FramebufferStatus::ErrorMissingImageAttachment);

    let error = context.framebuffers().allocate(&builder).unwrap_err();
    assert_eq!(error.kind(), GlErrorKind::FramebufferInvalid);
    assert_eq!(context.framebuffers().draw_bound().unwrap(), None);
}

#[test]
fn test_allocate_binds_for_drawing() {
    let mut context = fixtures::context();
    let texture = color_texture(&mut context);
    let framebuffer = color_framebuffer(&mut context, texture);

    let framebuffers = context.framebuffers();
    assert!(framebuffers.draw_is_bound(&framebuffer).unwrap());
    assert!(!framebuffers.read_is_bound(&framebuffer).unwrap());
    assert_eq!(framebuffers.draw_validate().unwrap(), FramebufferStatus::Complete);
    assert_eq!(
        framebuffers.read_validate().unwrap_err().kind(),
        GlErrorKind::FramebufferNotBound
    );

    let points = framebuffers.color_attachment_points().unwrap();
    let draw_buffers = framebuffers.draw_buffers().unwrap();
    assert_eq!(
        framebuffers.color_attachment(&framebuffer, &points[0]).unwrap(),
        Some(Attachment::Texture2D(texture))
    );
    assert_eq!(
        framebuffers.draw_buffer_target(&framebuffer, &draw_buffers[0]).unwrap(),
        Some(points[0])
    );
    assert_eq!(framebuffers.draw_buffer_target(&framebuffer, &draw_buffers[1]).unwrap(), None);
}

#[test]
fn test_depth_and_stencil_are_exclusive() {
    let mut context = fixtures::context();
    let depth = context
        .renderbuffers()
        .allocate(RenderbufferFormat::Depth24, 32, 32)
        .unwrap();
    let stencil = context
        .renderbuffers()
        .allocate(RenderbufferFormat::Stencil8, 32, 32)
        .unwrap();
    let combined = context
        .renderbuffers()
        .allocate(RenderbufferFormat::Depth24Stencil8, 32, 32)
        .unwrap();

    let mut builder = context.framebuffers().new_builder().unwrap();
    builder.attach_stencil_renderbuffer(&context, stencil).unwrap();
    assert_eq!(builder.stencil_attachment(), Some(Attachment::Renderbuffer(stencil)));

    builder.attach_depth_renderbuffer(&context, depth).unwrap();
    assert_eq!(builder.depth_attachment(), Some(Attachment::Renderbuffer(depth)));
    assert_eq!(builder.stencil_attachment(), None);

    builder.attach_depth_stencil_renderbuffer(&context, combined).unwrap();
    assert_eq!(
        builder.depth_stencil(),
        DepthStencilAttachment::DepthStencil(Attachment::Renderbuffer(combined))
    );

    builder.detach_stencil();
    assert_eq!(builder.depth_stencil(), DepthStencilAttachment::None);

    builder.attach_depth_stencil_renderbuffer(&context, combined).unwrap();
    let framebuffer = context.framebuffers().allocate(&builder).unwrap();
    assert_eq!(context.framebuffers().depth_bits(&framebuffer).unwrap(), 24);
    assert_eq!(context.framebuffers().stencil_bits(&framebuffer).unwrap(), 8);
    assert_eq!(context.depth_buffers().bits().unwrap(), 24);
    assert_eq!(context.stencil_buffers().bits().unwrap(), 8);
}

#[test]
fn test_depth_stencil_image_fills_both_points() {
    let mut context = fixtures::context();
    let combined = context
        .renderbuffers()
        .allocate(RenderbufferFormat::Depth24Stencil8, 32, 32)
        .unwrap();
    let depth = context
        .renderbuffers()
        .allocate(RenderbufferFormat::Depth16, 32, 32)
        .unwrap();

    let mut builder = context.framebuffers().new_builder().unwrap();
    builder.attach_depth_stencil_renderbuffer(&context, combined).unwrap();
    assert_eq!(builder.depth_attachment(), builder.stencil_attachment());
    assert_eq!(builder.depth_attachment(), Some(Attachment::Renderbuffer(combined)));

    builder.attach_depth_renderbuffer(&context, depth).unwrap();
    assert_eq!(builder.depth_attachment(), Some(Attachment::Renderbuffer(depth)));
    assert_eq!(builder.stencil_attachment(), None);
}

#[test]
fn test_attachment_formats_are_checked() {
    let mut context = fixtures::context();
    let depth = context
        .renderbuffers()
        .allocate(RenderbufferFormat::Depth16, 8, 8)
        .unwrap();
    let color = context
        .renderbuffers()
        .allocate(RenderbufferFormat::Rgba8, 8, 8)
        .unwrap();
    let points = context.framebuffers().color_attachment_points().unwrap();
    let draw_buffers = context.framebuffers().draw_buffers().unwrap();

    let mut builder = context.framebuffers().new_builder().unwrap();
    assert_eq!(
        builder
            .attach_color_renderbuffer_at(&context, points[0], draw_buffers[0], depth)
            .unwrap_err()
            .kind(),
        GlErrorKind::FormatNotRenderable
    );
    assert_eq!(
        builder.attach_stencil_renderbuffer(&context, depth).unwrap_err().kind(),
        GlErrorKind::FormatNotRenderable
    );
    assert_eq!(
        builder.attach_depth_renderbuffer(&context, color).unwrap_err().kind(),
        GlErrorKind::FormatNotRenderable
    );
    assert_eq!(builder.status(), FramebufferStatus::ErrorMissingImageAttachment);
}

#[test]
fn test_detaching_a_color_point_clears_its_draw_buffers() {
    let mut context = fixtures::context();
    let texture = color_texture(&mut context);
    let points = context.framebuffers().color_attachment_points().unwrap();
    let draw_buffers = context.framebuffers().draw_buffers().unwrap();

    let mut builder = context.framebuffers().new_builder().unwrap();
    builder
        .attach_color_texture_2d_at(&context, points[1], draw_buffers[2], texture)
        .unwrap();
    assert_eq!(builder.draw_buffer_target(&draw_buffers[2]), Some(points[1]));

    builder.detach_color_attachment(points[1]).unwrap();
    assert_eq!(builder.color_attachment(&points[1]), None);
    assert_eq!(builder.draw_buffer_target(&draw_buffers[2]), None);
}

#[test]
fn test_allocating_with_a_bound_texture_is_a_feedback_loop() {
    let mut context = fixtures::context();
    let unit = context.textures().texture_units().unwrap()[0];
    let texture = context
        .textures()
        .texture_2d_allocate(unit, &Texture2DDescriptor::new(16, 16, TextureFormat::Rgba8))
        .unwrap();
    let points = context.framebuffers().color_attachment_points().unwrap();
    let draw_buffers = context.framebuffers().draw_buffers().unwrap();

    let mut builder = context.framebuffers().new_builder().unwrap();
    builder
        .attach_color_texture_2d_at(&context, points[0], draw_buffers[0], texture)
        .unwrap();
    assert_eq!(
        context.framebuffers().allocate(&builder).unwrap_err().kind(),
        GlErrorKind::FeedbackLoop
    );

    context.textures().unit_unbind(unit).unwrap();
    context.framebuffers().allocate(&builder).unwrap();
}

#[test]
fn test_binding_an_attached_texture_is_a_feedback_loop() {
    let mut context = fixtures::context();
    let texture = color_texture(&mut context);
    let framebuffer = color_framebuffer(&mut context, texture);
    let unit = context.textures().texture_units().unwrap()[1];

    assert_eq!(
        context.textures().texture_2d_bind(unit, texture).unwrap_err().kind(),
        GlErrorKind::FeedbackLoop
    );

    context.framebuffers().draw_unbind().unwrap();
    context.textures().texture_2d_bind(unit, texture).unwrap();
    assert_eq!(
        context.framebuffers().draw_bind(framebuffer).unwrap_err().kind(),
        GlErrorKind::FeedbackLoop
    );
}

#[test]
fn test_blit_preconditions() {
    let mut context = fixtures::context();
    let first_texture = color_texture(&mut context);
    let first = color_framebuffer(&mut context, first_texture);
    let second_texture = color_texture(&mut context);
    let second = color_framebuffer(&mut context, second_texture);
    let area = Area::new(0, 0, 16, 16);

    let mut framebuffers = context.framebuffers();
    framebuffers.draw_unbind().unwrap();
    assert_eq!(
        framebuffers
            .blit(area, area, BlitBuffers::COLOR, BlitFilter::Nearest)
            .unwrap_err()
            .kind(),
        GlErrorKind::FramebufferNotBound
    );

    framebuffers.read_bind(first).unwrap();
    framebuffers.draw_bind(first).unwrap();
    assert_eq!(
        framebuffers
            .blit(area, area, BlitBuffers::COLOR, BlitFilter::Nearest)
            .unwrap_err()
            .kind(),
        GlErrorKind::FramebufferReadDrawSame
    );

    framebuffers.draw_bind(second).unwrap();
    assert_eq!(
        framebuffers
            .blit(area, area, BlitBuffers::COLOR | BlitBuffers::DEPTH, BlitFilter::Linear)
            .unwrap_err()
            .kind(),
        GlErrorKind::WrongBlitFilter
    );
    framebuffers
        .blit(area, area, BlitBuffers::COLOR, BlitFilter::Linear)
        .unwrap();
    framebuffers
        .blit(area, area, BlitBuffers::all(), BlitFilter::Nearest)
        .unwrap();
}

#[test]
fn test_deleting_attached_images_detaches_them() {
    let mut context = fixtures::context();
    let texture = color_texture(&mut context);
    let framebuffer = color_framebuffer(&mut context, texture);
    let points = context.framebuffers().color_attachment_points().unwrap();

    context.textures().texture_2d_delete(texture).unwrap();
    assert_eq!(
        context.framebuffers().color_attachment(&framebuffer, &points[0]).unwrap(),
        None
    );
    assert_eq!(
        context.framebuffers().draw_validate().unwrap(),
        FramebufferStatus::ErrorMissingImageAttachment
    );

    let depth = context
        .renderbuffers()
        .allocate(RenderbufferFormat::Depth32F, 8, 8)
        .unwrap();
    let mut builder = context.framebuffers().new_builder().unwrap();
    builder.attach_depth_renderbuffer(&context, depth).unwrap();
    let framebuffer = context.framebuffers().allocate(&builder).unwrap();
    assert_eq!(context.depth_buffers().bits().unwrap(), 32);

    context.renderbuffers().delete(depth).unwrap();
    assert_eq!(
        context.framebuffers().depth_stencil_attachment(&framebuffer).unwrap(),
        DepthStencilAttachment::None
    );
    assert_eq!(context.depth_buffers().bits().unwrap(), 0);
    assert_eq!(
        context.depth_buffers().clear(1.0).unwrap_err().kind(),
        GlErrorKind::NoDepthBuffer
    );
}

#[test]
fn test_deleted_framebuffer_is_unbound() {
    let mut context = fixtures::context();
    let texture = color_texture(&mut context);
    let framebuffer = color_framebuffer(&mut context, texture);

    let mut framebuffers = context.framebuffers();
    framebuffers.read_bind(framebuffer).unwrap();
    framebuffers.delete(framebuffer).unwrap();
    assert_eq!(framebuffers.draw_bound().unwrap(), None);
    assert_eq!(framebuffers.read_bound().unwrap(), None);
    assert_eq!(
        framebuffers.draw_bind(framebuffer).unwrap_err().kind(),
        GlErrorKind::Deleted
    );
}

#[test]
fn test_default_framebuffer_depth() {
    let mut context = fixtures::context();
    assert_eq!(context.depth_buffers().bits().unwrap(), 24);
    context.depth_buffers().clear(0.5).unwrap();
    assert_eq!(context.depth_buffers().clear_value().unwrap(), 0.5);
    assert_eq!(
        context.depth_buffers().clear(1.5).unwrap_err().kind(),
        GlErrorKind::RangeCheck
    );
}
