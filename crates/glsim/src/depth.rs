//! Depth and stencil buffers of the current draw framebuffer.
//!
//! Both facades consult the bound draw framebuffer, or the default
//! framebuffer when none is bound.

use crate::context::Context;
use crate::error::{GlError, GlResult};
use crate::framebuffer::FramebufferRecord;

/// Comparison used by the depth test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthFunction {
    Never,
    #[default]
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct DepthState {
    test: Option<DepthFunction>,
    write: bool,
    clear: f32,
}

fn current_bits(
    context: &Context,
    bits: impl Fn(&FramebufferRecord) -> u32,
    default: u32,
) -> GlResult<u32> {
    match context.bindings.draw_framebuffer {
        Some(framebuffer) => context.objects().get(&framebuffer).map(bits),
        None => Ok(default),
    }
}

/// Depth buffer operations of one context.
pub struct DepthBuffers<'a> {
    context: &'a mut Context,
}

impl<'a> DepthBuffers<'a> {
    pub(crate) fn new(context: &'a mut Context) -> Self {
        Self { context }
    }

    /// Depth bits of the current draw framebuffer. Zero if it has no depth
    /// buffer.
    pub fn bits(&self) -> GlResult<u32> {
        self.context.check_live()?;
        current_bits(
            self.context,
            |record| record.depth_bits(),
            self.context.default_framebuffer.depth_bits,
        )
    }

    fn check_present(&self) -> GlResult<()> {
        if self.bits()? == 0 {
            return Err(GlError::NoDepthBuffer);
        }
        Ok(())
    }

    /// Clear the depth buffer to `depth`, which must lie in `[0, 1]`.
    pub fn clear(&mut self, depth: f32) -> GlResult<()> {
        self.check_present()?;
        if !(0.0..=1.0).contains(&depth) {
            return Err(GlError::range("depth", format!("{} is not in [0, 1]", depth)));
        }
        self.context.bindings.depth.clear = depth;
        tracing::trace!("clear depth {}", depth);
        Ok(())
    }

    /// The value of the last successful [`clear`](Self::clear).
    pub fn clear_value(&self) -> GlResult<f32> {
        self.context.check_live()?;
        Ok(self.context.bindings.depth.clear)
    }

    pub fn test_enable(&mut self, function: DepthFunction) -> GlResult<()> {
        self.check_present()?;
        let test = &mut self.context.bindings.depth.test;
        tracing::trace!("depth test {:?} -> {:?}", test, function);
        *test = Some(function);
        Ok(())
    }

    pub fn test_disable(&mut self) -> GlResult<()> {
        self.context.check_live()?;
        self.context.bindings.depth.test = None;
        Ok(())
    }

    pub fn is_test_enabled(&self) -> GlResult<bool> {
        self.context.check_live()?;
        Ok(self.context.bindings.depth.test.is_some())
    }

    /// The function of the enabled depth test.
    pub fn test_function(&self) -> GlResult<Option<DepthFunction>> {
        self.context.check_live()?;
        Ok(self.context.bindings.depth.test)
    }

    pub fn write_enable(&mut self) -> GlResult<()> {
        self.check_present()?;
        self.context.bindings.depth.write = true;
        Ok(())
    }

    pub fn write_disable(&mut self) -> GlResult<()> {
        self.context.check_live()?;
        self.context.bindings.depth.write = false;
        Ok(())
    }

    pub fn is_write_enabled(&self) -> GlResult<bool> {
        self.context.check_live()?;
        Ok(self.context.bindings.depth.write)
    }
}

/// Stencil buffer operations of one context.
pub struct StencilBuffers<'a> {
    context: &'a mut Context,
}

impl<'a> StencilBuffers<'a> {
    pub(crate) fn new(context: &'a mut Context) -> Self {
        Self { context }
    }

    pub fn bits(&self) -> GlResult<u32> {
        self.context.check_live()?;
        current_bits(
            self.context,
            |record| record.stencil_bits(),
            self.context.default_framebuffer.stencil_bits,
        )
    }

    pub fn clear(&mut self, index: i32) -> GlResult<()> {
        if self.bits()? == 0 {
            return Err(GlError::NoStencilBuffer);
        }
        tracing::trace!("clear stencil {}", index);
        Ok(())
    }
}
