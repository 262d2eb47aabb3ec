//! Renderbuffers.

use crate::context::Context;
use crate::error::{GlError, GlResult};
use crate::format::RenderbufferFormat;
use crate::framebuffer::{Attachment, detach_from_framebuffers};
use crate::object::{Renderbuffer, kind};
use glsim_core::alloc::{HashSet, Slot};
use glsim_core::geometry::Size;

pub(crate) struct RenderbufferRecord {
    pub(crate) format: RenderbufferFormat,
    size: Size<u32>,
    pub(crate) referring_framebuffers: HashSet<Slot>,
}

/// Renderbuffer operations of one context.
pub struct Renderbuffers<'a> {
    context: &'a mut Context,
}

impl<'a> Renderbuffers<'a> {
    pub(crate) fn new(context: &'a mut Context) -> Self {
        Self { context }
    }

    /// Allocate a renderbuffer and bind it.
    pub fn allocate(
        &mut self,
        format: RenderbufferFormat,
        width: u32,
        height: u32,
    ) -> GlResult<Renderbuffer> {
        self.context.check_live()?;
        let max = self.context.limits().max_texture_size;
        for (what, value) in [("renderbuffer width", width), ("renderbuffer height", height)] {
            if !(1..=max).contains(&value) {
                return Err(GlError::range(what, format!("{} is not in [1, {}]", value, max)));
            }
        }

        let renderbuffer = self.context.insert::<kind::Renderbuffer>(RenderbufferRecord {
            format,
            size: Size::new(width, height),
            referring_framebuffers: HashSet::default(),
        });
        tracing::debug!("allocate {} ({}x{} {:?})", renderbuffer, width, height, format);
        self.set_bound(Some(renderbuffer));
        Ok(renderbuffer)
    }

    pub fn bind(&mut self, renderbuffer: Renderbuffer) -> GlResult<()> {
        self.context.check_usable(&renderbuffer)?;
        self.set_bound(Some(renderbuffer));
        Ok(())
    }

    pub fn unbind(&mut self) -> GlResult<()> {
        self.context.check_live()?;
        self.set_bound(None);
        Ok(())
    }

    fn set_bound(&mut self, renderbuffer: Option<Renderbuffer>) {
        let bound = &mut self.context.bindings.renderbuffer;
        tracing::trace!("bind {:?} -> {:?}", bound, renderbuffer);
        *bound = renderbuffer;
    }

    pub fn bound(&self) -> GlResult<Option<Renderbuffer>> {
        self.context.check_live()?;
        Ok(self
            .context
            .bindings
            .renderbuffer
            .filter(|renderbuffer| self.context.is_live(renderbuffer)))
    }

    pub fn is_bound(&self, renderbuffer: &Renderbuffer) -> GlResult<bool> {
        self.context.check_usable(renderbuffer)?;
        Ok(self.context.bindings.renderbuffer == Some(*renderbuffer))
    }

    pub fn format(&self, renderbuffer: &Renderbuffer) -> GlResult<RenderbufferFormat> {
        self.context.check_usable(renderbuffer)?;
        self.context
            .objects()
            .get(renderbuffer)
            .map(|record| record.format)
    }

    pub fn size(&self, renderbuffer: &Renderbuffer) -> GlResult<Size<u32>> {
        self.context.check_usable(renderbuffer)?;
        self.context
            .objects()
            .get(renderbuffer)
            .map(|record| record.size)
    }

    /// Delete a renderbuffer, unbinding it and detaching it from every
    /// framebuffer.
    pub fn delete(&mut self, renderbuffer: Renderbuffer) -> GlResult<()> {
        self.context.check_usable(&renderbuffer)?;
        if self.context.bindings.renderbuffer == Some(renderbuffer) {
            self.set_bound(None);
        }

        let mut objects = self.context.objects_mut();
        let record = objects.remove(&renderbuffer)?;
        detach_from_framebuffers(
            &mut objects,
            &record.referring_framebuffers,
            |attachment| matches!(attachment, Attachment::Renderbuffer(attached) if *attached == renderbuffer),
        );
        tracing::debug!("delete {}", renderbuffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Context, ContextDescriptor, GlErrorKind, RenderbufferFormat};

    #[test]
    fn test_allocate_binds() {
        let mut context = Context::new(ContextDescriptor::default());
        let mut renderbuffers = context.renderbuffers();
        let renderbuffer = renderbuffers
            .allocate(RenderbufferFormat::Depth24Stencil8, 64, 32)
            .unwrap();
        assert_eq!(renderbuffers.bound().unwrap(), Some(renderbuffer));
        assert_eq!(renderbuffers.size(&renderbuffer).unwrap().width, 64);

        renderbuffers.unbind().unwrap();
        renderbuffers.unbind().unwrap();
        assert_eq!(renderbuffers.bound().unwrap(), None);
    }

    #[test]
    fn test_size_limits() {
        let mut context = Context::new(ContextDescriptor::default());
        let error = context
            .renderbuffers()
            .allocate(RenderbufferFormat::Rgba8, 0, 1)
            .unwrap_err();
        assert_eq!(error.kind(), GlErrorKind::RangeCheck);
        let error = context
            .renderbuffers()
            .allocate(RenderbufferFormat::Rgba8, 1, 4096)
            .unwrap_err();
        assert_eq!(error.kind(), GlErrorKind::RangeCheck);
    }

    #[test]
    fn test_delete_unbinds() {
        let mut context = Context::new(ContextDescriptor::default());
        let mut renderbuffers = context.renderbuffers();
        let renderbuffer = renderbuffers
            .allocate(RenderbufferFormat::Rgba8, 4, 4)
            .unwrap();
        renderbuffers.delete(renderbuffer).unwrap();
        assert_eq!(renderbuffers.bound().unwrap(), None);
        assert_eq!(
            renderbuffers.delete(renderbuffer).unwrap_err().kind(),
            GlErrorKind::Deleted
        );
    }
}
