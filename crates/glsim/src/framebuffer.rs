//! Framebuffers, their builders and blitting.
//!
//! A framebuffer is described by a [`FramebufferBuilder`] and validated as a
//! whole by [`Framebuffers::allocate`]: attachment formats, feedback loops
//! against textures bound to units, and completeness. Depth and stencil
//! attachments form a single [`DepthStencilAttachment`] so a combined
//! attachment can never coexist with a separate depth or stencil one.

use crate::context::{Context, Objects};
use crate::error::{GlError, GlResult};
use crate::format::FormatInfo;
use crate::object::{
    ColorAttachmentPoint, ContextBound, ContextId, DrawBuffer, Framebuffer, Renderbuffer, Sharing,
    Texture2D, TextureCube, kind,
};
use crate::texture::{
    CubeMapFace, UnitBinding, is_texture_2d_bound_anywhere, is_texture_cube_bound_anywhere,
};
use bitflags::bitflags;
use glsim_core::alloc::{HashSet, Slot};
use glsim_core::geometry::Area;
use glsim_core::profiling::profile_function;
use std::fmt;

/// An image attached to a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    Texture2D(Texture2D),
    TextureCubeFace(TextureCube, CubeMapFace),
    Renderbuffer(Renderbuffer),
}

/// The depth and stencil attachments of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthStencilAttachment {
    #[default]
    None,
    Depth(Attachment),
    Stencil(Attachment),
    /// One image providing both depth and stencil.
    DepthStencil(Attachment),
}

impl DepthStencilAttachment {
    pub fn depth(&self) -> Option<&Attachment> {
        match self {
            DepthStencilAttachment::Depth(attachment)
            | DepthStencilAttachment::DepthStencil(attachment) => Some(attachment),
            _ => None,
        }
    }

    pub fn stencil(&self) -> Option<&Attachment> {
        match self {
            DepthStencilAttachment::Stencil(attachment)
            | DepthStencilAttachment::DepthStencil(attachment) => Some(attachment),
            _ => None,
        }
    }

    fn attachment(&self) -> Option<&Attachment> {
        match self {
            DepthStencilAttachment::None => None,
            DepthStencilAttachment::Depth(attachment)
            | DepthStencilAttachment::Stencil(attachment)
            | DepthStencilAttachment::DepthStencil(attachment) => Some(attachment),
        }
    }
}

/// Completeness of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    Complete,
    ErrorIncompleteAttachment,
    ErrorMissingImageAttachment,
    ErrorIncompleteDrawBuffer,
    ErrorIncompleteReadBuffer,
    ErrorUnsupported,
    ErrorUnknown,
}

bitflags! {
    /// Buffers copied by a blit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BlitBuffers: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlitFilter {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Color,
    Depth,
    Stencil,
    DepthStencil,
}

impl Role {
    fn required(self) -> &'static str {
        match self {
            Role::Color => "color-renderable",
            Role::Depth => "depth-renderable without stencil",
            Role::Stencil => "stencil-renderable without depth",
            Role::DepthStencil => "depth-stencil-renderable",
        }
    }

    fn accepts(self, info: &FormatInfo) -> bool {
        match self {
            Role::Color => info.is_color_renderable(),
            Role::Depth => info.is_depth_only(),
            Role::Stencil => info.is_stencil_only(),
            Role::DepthStencil => info.is_depth_stencil(),
        }
    }
}

/// Check that an attachment names a usable object whose format suits `role`.
fn check_attachment(context: &Context, attachment: &Attachment, role: Role) -> GlResult<FormatInfo> {
    let objects = context.objects();
    let (format, info) = match attachment {
        Attachment::Texture2D(texture) => {
            context.check_usable(texture)?;
            let format = objects.get(texture)?.descriptor.format;
            (format!("{:?}", format), format.info())
        }
        Attachment::TextureCubeFace(texture, _) => {
            context.check_usable(texture)?;
            let format = objects.get(texture)?.descriptor.format;
            (format!("{:?}", format), format.info())
        }
        Attachment::Renderbuffer(renderbuffer) => {
            context.check_usable(renderbuffer)?;
            let format = objects.get(renderbuffer)?.format;
            (format!("{:?}", format), format.info())
        }
    };
    if !role.accepts(&info) {
        return Err(GlError::FormatNotRenderable {
            format,
            required: role.required(),
        });
    }
    Ok(info)
}

fn status_of(colors: &[Option<Attachment>], depth_stencil: &DepthStencilAttachment) -> FramebufferStatus {
    if colors.iter().any(Option::is_some) || depth_stencil.attachment().is_some() {
        FramebufferStatus::Complete
    } else {
        FramebufferStatus::ErrorMissingImageAttachment
    }
}

pub(crate) struct FramebufferRecord {
    colors: Vec<Option<Attachment>>,
    draw_buffers: Vec<Option<ColorAttachmentPoint>>,
    depth_stencil: DepthStencilAttachment,
    depth_bits: u32,
    stencil_bits: u32,
}

impl FramebufferRecord {
    fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.colors
            .iter()
            .flatten()
            .chain(self.depth_stencil.attachment())
    }

    pub(crate) fn references_texture_2d(&self, texture: &Texture2D) -> bool {
        self.attachments()
            .any(|attachment| matches!(attachment, Attachment::Texture2D(attached) if attached == texture))
    }

    pub(crate) fn references_texture_cube(&self, texture: &TextureCube) -> bool {
        self.attachments().any(
            |attachment| matches!(attachment, Attachment::TextureCubeFace(attached, _) if attached == texture),
        )
    }

    pub(crate) fn depth_bits(&self) -> u32 {
        self.depth_bits
    }

    pub(crate) fn stencil_bits(&self) -> u32 {
        self.stencil_bits
    }

    fn status(&self) -> FramebufferStatus {
        status_of(&self.colors, &self.depth_stencil)
    }

    fn detach_matching(&mut self, matches: &impl Fn(&Attachment) -> bool) {
        for (index, color) in self.colors.iter_mut().enumerate() {
            if color.as_ref().is_some_and(matches) {
                *color = None;
                for target in self.draw_buffers.iter_mut() {
                    if target.is_some_and(|point| point.index() as usize == index) {
                        *target = None;
                    }
                }
            }
        }
        if self.depth_stencil.attachment().is_some_and(matches) {
            self.depth_stencil = DepthStencilAttachment::None;
            self.depth_bits = 0;
            self.stencil_bits = 0;
        }
    }
}

fn referring_framebuffers<'o>(objects: &'o mut Objects, attachment: &Attachment) -> Option<&'o mut HashSet<Slot>> {
    match attachment {
        Attachment::Texture2D(texture) => objects
            .textures_2d
            .get_mut(texture.slot())
            .map(|record| &mut record.referring_framebuffers),
        Attachment::TextureCubeFace(texture, _) => objects
            .textures_cube
            .get_mut(texture.slot())
            .map(|record| &mut record.referring_framebuffers),
        Attachment::Renderbuffer(renderbuffer) => objects
            .renderbuffers
            .get_mut(renderbuffer.slot())
            .map(|record| &mut record.referring_framebuffers),
    }
}

/// Detach every attachment selected by `matches` from the given framebuffers.
pub(crate) fn detach_from_framebuffers(
    objects: &mut Objects,
    framebuffers: &HashSet<Slot>,
    matches: impl Fn(&Attachment) -> bool,
) {
    for slot in framebuffers {
        if let Some(record) = objects.framebuffers.get_mut(*slot) {
            record.detach_matching(&matches);
            tracing::trace!("detach from framebuffer slot {:?}", slot);
        }
    }
}

fn feedback_texture<'r>(units: &[UnitBinding], mut attachments: impl Iterator<Item = &'r Attachment>) -> Option<String> {
    attachments.find_map(|attachment| match attachment {
        Attachment::Texture2D(texture) if is_texture_2d_bound_anywhere(units, texture) => {
            Some(texture.to_string())
        }
        Attachment::TextureCubeFace(texture, _) if is_texture_cube_bound_anywhere(units, texture) => {
            Some(texture.to_string())
        }
        _ => None,
    })
}

/// A mutable description of a framebuffer, owned by the context that
/// created it.
#[derive(Debug, Clone)]
pub struct FramebufferBuilder {
    owner: ContextId,
    colors: Vec<Option<Attachment>>,
    draw_buffers: Vec<Option<ColorAttachmentPoint>>,
    depth_stencil: DepthStencilAttachment,
}

impl FramebufferBuilder {
    fn check_point(&self, point: &ColorAttachmentPoint) -> GlResult<()> {
        if point.index() as usize >= self.colors.len() {
            return Err(GlError::range(
                "color attachment point",
                format!("{} is not below {}", point.index(), self.colors.len()),
            ));
        }
        Ok(())
    }

    fn attach_color(
        &mut self,
        context: &Context,
        point: ColorAttachmentPoint,
        draw_buffer: DrawBuffer,
        attachment: Attachment,
    ) -> GlResult<()> {
        context.check_bound_to(self)?;
        context.check(&point)?;
        context.check(&draw_buffer)?;
        self.check_point(&point)?;
        if draw_buffer.index() as usize >= self.draw_buffers.len() {
            return Err(GlError::range(
                "draw buffer",
                format!("{} is not below {}", draw_buffer.index(), self.draw_buffers.len()),
            ));
        }
        check_attachment(context, &attachment, Role::Color)?;

        for target in self.draw_buffers.iter_mut() {
            if target.is_some_and(|target| target.index() == point.index()) {
                *target = None;
            }
        }
        self.colors[point.index() as usize] = Some(attachment);
        self.draw_buffers[draw_buffer.index() as usize] = Some(point);
        Ok(())
    }

    /// Attach a color-renderable 2D texture at `point`, drawn to through
    /// `draw_buffer`.
    pub fn attach_color_texture_2d_at(
        &mut self,
        context: &Context,
        point: ColorAttachmentPoint,
        draw_buffer: DrawBuffer,
        texture: Texture2D,
    ) -> GlResult<()> {
        self.attach_color(context, point, draw_buffer, Attachment::Texture2D(texture))
    }

    pub fn attach_color_texture_cube_at(
        &mut self,
        context: &Context,
        point: ColorAttachmentPoint,
        draw_buffer: DrawBuffer,
        texture: TextureCube,
        face: CubeMapFace,
    ) -> GlResult<()> {
        self.attach_color(
            context,
            point,
            draw_buffer,
            Attachment::TextureCubeFace(texture, face),
        )
    }

    pub fn attach_color_renderbuffer_at(
        &mut self,
        context: &Context,
        point: ColorAttachmentPoint,
        draw_buffer: DrawBuffer,
        renderbuffer: Renderbuffer,
    ) -> GlResult<()> {
        self.attach_color(
            context,
            point,
            draw_buffer,
            Attachment::Renderbuffer(renderbuffer),
        )
    }

    /// Remove the color attachment at `point` and every draw buffer that
    /// targets it.
    pub fn detach_color_attachment(&mut self, point: ColorAttachmentPoint) -> GlResult<()> {
        self.check_point(&point)?;
        self.colors[point.index() as usize] = None;
        for target in self.draw_buffers.iter_mut() {
            if target.is_some_and(|target| target.index() == point.index()) {
                *target = None;
            }
        }
        Ok(())
    }

    fn attach_depth_stencil(
        &mut self,
        context: &Context,
        attachment: Attachment,
        role: Role,
    ) -> GlResult<()> {
        context.check_bound_to(self)?;
        check_attachment(context, &attachment, role)?;
        self.depth_stencil = match role {
            Role::Depth => DepthStencilAttachment::Depth(attachment),
            Role::Stencil => DepthStencilAttachment::Stencil(attachment),
            Role::DepthStencil => DepthStencilAttachment::DepthStencil(attachment),
            Role::Color => unreachable!("color attachments are not depth or stencil attachments"),
        };
        Ok(())
    }

    /// Attach a depth-only texture, replacing any depth or stencil attachment.
    pub fn attach_depth_texture_2d(&mut self, context: &Context, texture: Texture2D) -> GlResult<()> {
        self.attach_depth_stencil(context, Attachment::Texture2D(texture), Role::Depth)
    }

    pub fn attach_depth_renderbuffer(
        &mut self,
        context: &Context,
        renderbuffer: Renderbuffer,
    ) -> GlResult<()> {
        self.attach_depth_stencil(context, Attachment::Renderbuffer(renderbuffer), Role::Depth)
    }

    /// Attach a combined depth and stencil texture, replacing any depth or
    /// stencil attachment.
    pub fn attach_depth_stencil_texture_2d(
        &mut self,
        context: &Context,
        texture: Texture2D,
    ) -> GlResult<()> {
        self.attach_depth_stencil(context, Attachment::Texture2D(texture), Role::DepthStencil)
    }

    pub fn attach_depth_stencil_renderbuffer(
        &mut self,
        context: &Context,
        renderbuffer: Renderbuffer,
    ) -> GlResult<()> {
        self.attach_depth_stencil(
            context,
            Attachment::Renderbuffer(renderbuffer),
            Role::DepthStencil,
        )
    }

    pub fn attach_stencil_renderbuffer(
        &mut self,
        context: &Context,
        renderbuffer: Renderbuffer,
    ) -> GlResult<()> {
        self.attach_depth_stencil(context, Attachment::Renderbuffer(renderbuffer), Role::Stencil)
    }

    /// Remove a depth or combined depth-stencil attachment.
    pub fn detach_depth(&mut self) {
        if self.depth_stencil.depth().is_some() {
            self.depth_stencil = DepthStencilAttachment::None;
        }
    }

    /// Remove a stencil or combined depth-stencil attachment.
    pub fn detach_stencil(&mut self) {
        if self.depth_stencil.stencil().is_some() {
            self.depth_stencil = DepthStencilAttachment::None;
        }
    }

    pub fn color_attachment(&self, point: &ColorAttachmentPoint) -> Option<Attachment> {
        self.colors.get(point.index() as usize).copied().flatten()
    }

    pub fn draw_buffer_target(&self, draw_buffer: &DrawBuffer) -> Option<ColorAttachmentPoint> {
        self.draw_buffers
            .get(draw_buffer.index() as usize)
            .copied()
            .flatten()
    }

    pub fn depth_attachment(&self) -> Option<Attachment> {
        self.depth_stencil.depth().copied()
    }

    pub fn stencil_attachment(&self) -> Option<Attachment> {
        self.depth_stencil.stencil().copied()
    }

    pub fn depth_stencil(&self) -> DepthStencilAttachment {
        self.depth_stencil
    }

    /// Completeness of the attachments described so far.
    pub fn status(&self) -> FramebufferStatus {
        status_of(&self.colors, &self.depth_stencil)
    }
}

impl ContextBound for FramebufferBuilder {
    fn owner(&self) -> ContextId {
        self.owner
    }

    fn sharing(&self) -> Sharing {
        Sharing::BoundToSingleContext
    }
}

impl fmt::Display for FramebufferBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FramebufferBuilder {}]", self.owner)
    }
}

/// Framebuffer operations of one context.
pub struct Framebuffers<'a> {
    context: &'a mut Context,
}

impl<'a> Framebuffers<'a> {
    pub(crate) fn new(context: &'a mut Context) -> Self {
        Self { context }
    }

    pub fn color_attachment_points(&self) -> GlResult<Vec<ColorAttachmentPoint>> {
        self.context.check_live()?;
        let id = self.context.id();
        Ok((0..self.context.limits().max_color_attachments)
            .map(|index| ColorAttachmentPoint::new(id, index))
            .collect())
    }

    pub fn draw_buffers(&self) -> GlResult<Vec<DrawBuffer>> {
        self.context.check_live()?;
        let id = self.context.id();
        Ok((0..self.context.limits().max_draw_buffers)
            .map(|index| DrawBuffer::new(id, index))
            .collect())
    }

    pub fn new_builder(&self) -> GlResult<FramebufferBuilder> {
        self.context.check_live()?;
        let limits = self.context.limits();
        Ok(FramebufferBuilder {
            owner: self.context.id(),
            colors: vec![None; limits.max_color_attachments as usize],
            draw_buffers: vec![None; limits.max_draw_buffers as usize],
            depth_stencil: DepthStencilAttachment::None,
        })
    }

    /// Validate `builder` and create a framebuffer from it, binding it as the
    /// draw framebuffer.
    pub fn allocate(&mut self, builder: &FramebufferBuilder) -> GlResult<Framebuffer> {
        profile_function!();
        self.context.check_bound_to(builder)?;

        let (depth_bits, stencil_bits) = match &builder.depth_stencil {
            DepthStencilAttachment::None => (0, 0),
            DepthStencilAttachment::Depth(attachment) => {
                let info = check_attachment(self.context, attachment, Role::Depth)?;
                (info.depth_bits, 0)
            }
            DepthStencilAttachment::Stencil(attachment) => {
                let info = check_attachment(self.context, attachment, Role::Stencil)?;
                (0, info.stencil_bits)
            }
            DepthStencilAttachment::DepthStencil(attachment) => {
                let info = check_attachment(self.context, attachment, Role::DepthStencil)?;
                (info.depth_bits, info.stencil_bits)
            }
        };
        for attachment in builder.colors.iter().flatten() {
            check_attachment(self.context, attachment, Role::Color)?;
        }

        let attachments = builder
            .colors
            .iter()
            .flatten()
            .chain(builder.depth_stencil.attachment());
        if let Some(texture) = feedback_texture(&self.context.bindings.units, attachments) {
            return Err(GlError::FeedbackLoop {
                framebuffer: "[Framebuffer (new)]".to_string(),
                texture,
            });
        }

        let status = builder.status();
        if status != FramebufferStatus::Complete {
            return Err(GlError::FramebufferInvalid { status });
        }

        let framebuffer = self.context.insert::<kind::Framebuffer>(FramebufferRecord {
            colors: builder.colors.clone(),
            draw_buffers: builder.draw_buffers.clone(),
            depth_stencil: builder.depth_stencil,
            depth_bits,
            stencil_bits,
        });
        {
            let mut objects = self.context.objects_mut();
            let attachments = builder
                .colors
                .iter()
                .flatten()
                .chain(builder.depth_stencil.attachment());
            for attachment in attachments {
                if let Some(referring) = referring_framebuffers(&mut objects, attachment) {
                    referring.insert(framebuffer.slot());
                }
            }
        }
        tracing::debug!(
            "allocate {} (depth {}, stencil {})",
            framebuffer,
            depth_bits,
            stencil_bits
        );
        self.set_draw(Some(framebuffer));
        Ok(framebuffer)
    }

    /// Bind as the draw framebuffer. Fails if a texture attached to the
    /// framebuffer is bound to a texture unit.
    pub fn draw_bind(&mut self, framebuffer: Framebuffer) -> GlResult<()> {
        self.context.check_usable(&framebuffer)?;
        let feedback = {
            let objects = self.context.objects();
            let record = objects.get(&framebuffer)?;
            feedback_texture(&self.context.bindings.units, record.attachments())
        };
        if let Some(texture) = feedback {
            return Err(GlError::FeedbackLoop {
                framebuffer: framebuffer.to_string(),
                texture,
            });
        }
        self.set_draw(Some(framebuffer));
        Ok(())
    }

    pub fn draw_unbind(&mut self) -> GlResult<()> {
        self.context.check_live()?;
        self.set_draw(None);
        Ok(())
    }

    fn set_draw(&mut self, framebuffer: Option<Framebuffer>) {
        let bound = &mut self.context.bindings.draw_framebuffer;
        tracing::trace!("bind draw {:?} -> {:?}", bound, framebuffer);
        *bound = framebuffer;
    }

    pub fn draw_bound(&self) -> GlResult<Option<Framebuffer>> {
        self.context.check_live()?;
        Ok(self.context.bindings.draw_framebuffer)
    }

    pub fn draw_is_bound(&self, framebuffer: &Framebuffer) -> GlResult<bool> {
        self.context.check_usable(framebuffer)?;
        Ok(self.context.bindings.draw_framebuffer == Some(*framebuffer))
    }

    pub fn read_bind(&mut self, framebuffer: Framebuffer) -> GlResult<()> {
        self.context.check_usable(&framebuffer)?;
        self.set_read(Some(framebuffer));
        Ok(())
    }

    pub fn read_unbind(&mut self) -> GlResult<()> {
        self.context.check_live()?;
        self.set_read(None);
        Ok(())
    }

    fn set_read(&mut self, framebuffer: Option<Framebuffer>) {
        let bound = &mut self.context.bindings.read_framebuffer;
        tracing::trace!("bind read {:?} -> {:?}", bound, framebuffer);
        *bound = framebuffer;
    }

    pub fn read_bound(&self) -> GlResult<Option<Framebuffer>> {
        self.context.check_live()?;
        Ok(self.context.bindings.read_framebuffer)
    }

    pub fn read_is_bound(&self, framebuffer: &Framebuffer) -> GlResult<bool> {
        self.context.check_usable(framebuffer)?;
        Ok(self.context.bindings.read_framebuffer == Some(*framebuffer))
    }

    fn validate(&self, bound: Option<Framebuffer>, target: &'static str) -> GlResult<FramebufferStatus> {
        self.context.check_live()?;
        let framebuffer = bound.ok_or(GlError::FramebufferNotBound { target })?;
        self.context
            .objects()
            .get(&framebuffer)
            .map(FramebufferRecord::status)
    }

    /// Completeness of the bound draw framebuffer.
    pub fn draw_validate(&self) -> GlResult<FramebufferStatus> {
        self.validate(self.context.bindings.draw_framebuffer, "draw")
    }

    /// Completeness of the bound read framebuffer.
    pub fn read_validate(&self) -> GlResult<FramebufferStatus> {
        self.validate(self.context.bindings.read_framebuffer, "read")
    }

    /// Delete a framebuffer, unbinding it from both targets.
    pub fn delete(&mut self, framebuffer: Framebuffer) -> GlResult<()> {
        self.context.check_usable(&framebuffer)?;
        if self.context.bindings.draw_framebuffer == Some(framebuffer) {
            self.set_draw(None);
        }
        if self.context.bindings.read_framebuffer == Some(framebuffer) {
            self.set_read(None);
        }

        let mut objects = self.context.objects_mut();
        let record = objects.remove(&framebuffer)?;
        for attachment in record.attachments() {
            if let Some(referring) = referring_framebuffers(&mut objects, attachment) {
                referring.remove(&framebuffer.slot());
            }
        }
        tracing::debug!("delete {}", framebuffer);
        Ok(())
    }

    pub fn color_attachment(
        &self,
        framebuffer: &Framebuffer,
        point: &ColorAttachmentPoint,
    ) -> GlResult<Option<Attachment>> {
        self.context.check_usable(framebuffer)?;
        self.context.check(point)?;
        self.context
            .objects()
            .get(framebuffer)
            .map(|record| record.colors.get(point.index() as usize).copied().flatten())
    }

    pub fn draw_buffer_target(
        &self,
        framebuffer: &Framebuffer,
        draw_buffer: &DrawBuffer,
    ) -> GlResult<Option<ColorAttachmentPoint>> {
        self.context.check_usable(framebuffer)?;
        self.context.check(draw_buffer)?;
        self.context.objects().get(framebuffer).map(|record| {
            record
                .draw_buffers
                .get(draw_buffer.index() as usize)
                .copied()
                .flatten()
        })
    }

    pub fn depth_stencil_attachment(&self, framebuffer: &Framebuffer) -> GlResult<DepthStencilAttachment> {
        self.context.check_usable(framebuffer)?;
        self.context
            .objects()
            .get(framebuffer)
            .map(|record| record.depth_stencil)
    }

    pub fn depth_bits(&self, framebuffer: &Framebuffer) -> GlResult<u32> {
        self.context.check_usable(framebuffer)?;
        self.context
            .objects()
            .get(framebuffer)
            .map(|record| record.depth_bits)
    }

    pub fn stencil_bits(&self, framebuffer: &Framebuffer) -> GlResult<u32> {
        self.context.check_usable(framebuffer)?;
        self.context
            .objects()
            .get(framebuffer)
            .map(|record| record.stencil_bits)
    }

    /// Copy `source` of the read framebuffer to `target` of the draw
    /// framebuffer. Depth and stencil can only be blitted with
    /// [`BlitFilter::Nearest`].
    pub fn blit(
        &mut self,
        source: Area,
        target: Area,
        buffers: BlitBuffers,
        filter: BlitFilter,
    ) -> GlResult<()> {
        self.context.check_live()?;
        let read = self
            .context
            .bindings
            .read_framebuffer
            .ok_or(GlError::FramebufferNotBound { target: "read" })?;
        let draw = self
            .context
            .bindings
            .draw_framebuffer
            .ok_or(GlError::FramebufferNotBound { target: "draw" })?;
        if read == draw {
            return Err(GlError::FramebufferReadDrawSame);
        }
        if buffers.intersects(BlitBuffers::DEPTH | BlitBuffers::STENCIL) && filter != BlitFilter::Nearest {
            return Err(GlError::WrongBlitFilter { filter });
        }
        tracing::trace!(
            "blit {} {:?} -> {} {:?} ({:?}, {:?})",
            read,
            source,
            draw,
            target,
            buffers,
            filter
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_stencil_union() {
        let empty = DepthStencilAttachment::None;
        assert!(empty.depth().is_none());
        assert!(empty.stencil().is_none());
    }

    #[test]
    fn test_empty_status_is_missing_attachment() {
        assert_eq!(
            status_of(&[None, None], &DepthStencilAttachment::None),
            FramebufferStatus::ErrorMissingImageAttachment
        );
    }

    #[test]
    fn test_blit_buffers() {
        let buffers = BlitBuffers::COLOR | BlitBuffers::STENCIL;
        assert!(buffers.intersects(BlitBuffers::DEPTH | BlitBuffers::STENCIL));
        assert!(!BlitBuffers::COLOR.intersects(BlitBuffers::DEPTH | BlitBuffers::STENCIL));
    }
}
