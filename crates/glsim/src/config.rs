//! Context configuration: implementation limits, the default framebuffer and
//! soft restrictions.

use crate::listener::{NullShaderListener, ShaderListener};
use std::fmt;

/// Implementation maxima of the emulated driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_vertex_attributes: u32,
    pub max_color_attachments: u32,
    pub max_draw_buffers: u32,
    pub max_texture_units: u32,
    /// Maximum width and height of textures and renderbuffers.
    pub max_texture_size: u32,
    /// Maximum capacity of a single buffer in bytes.
    pub max_buffer_size: u64,
}

impl Limits {
    pub const IMPLEMENTATION: Limits = Limits {
        max_vertex_attributes: 16,
        max_color_attachments: 8,
        max_draw_buffers: 8,
        max_texture_units: 16,
        max_texture_size: 1024,
        max_buffer_size: i32::MAX as u64,
    };
}

impl Default for Limits {
    fn default() -> Self {
        Self::IMPLEMENTATION
    }
}

/// Description of the window-system framebuffer that is used whenever no
/// framebuffer is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultFramebuffer {
    pub width: u32,
    pub height: u32,
    pub red_bits: u32,
    pub green_bits: u32,
    pub blue_bits: u32,
    pub depth_bits: u32,
    pub stencil_bits: u32,
}

impl DefaultFramebuffer {
    /// A framebuffer with color only.
    pub fn color_only(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth_bits: 0,
            stencil_bits: 0,
            ..Self::default()
        }
    }
}

impl Default for DefaultFramebuffer {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
        }
    }
}

/// Restrictions applied on top of the implementation limits, used to
/// simulate weaker hardware.
pub trait SoftRestrictions {
    /// Given the implementation's texture unit count, return the count to
    /// advertise. Values above the implementation count are ignored.
    fn restrict_texture_unit_count(&self, count: u32) -> u32 {
        count
    }

    /// Whether the named extension is visible.
    fn restrict_extension_visibility(&self, _name: &str) -> bool {
        true
    }
}

/// No restrictions.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRestrictions;

impl SoftRestrictions for DefaultRestrictions {}

/// Everything needed to create a [`Context`](crate::Context).
///
/// # Example
///
/// ```
/// use glsim::{Context, ContextDescriptor, DefaultFramebuffer};
///
/// let context = Context::new(
///     ContextDescriptor::default()
///         .with_label("offscreen")
///         .with_default_framebuffer(DefaultFramebuffer::color_only(256, 256)),
/// );
/// assert_eq!(context.label(), Some("offscreen"));
/// ```
pub struct ContextDescriptor {
    pub label: Option<String>,
    pub default_framebuffer: DefaultFramebuffer,
    pub listener: Box<dyn ShaderListener>,
    pub restrictions: Box<dyn SoftRestrictions>,
}

impl ContextDescriptor {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_default_framebuffer(mut self, framebuffer: DefaultFramebuffer) -> Self {
        self.default_framebuffer = framebuffer;
        self
    }

    pub fn with_listener(mut self, listener: impl ShaderListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    pub fn with_restrictions(mut self, restrictions: impl SoftRestrictions + 'static) -> Self {
        self.restrictions = Box::new(restrictions);
        self
    }
}

impl Default for ContextDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            default_framebuffer: DefaultFramebuffer::default(),
            listener: Box::new(NullShaderListener),
            restrictions: Box::new(DefaultRestrictions),
        }
    }
}

impl fmt::Debug for ContextDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextDescriptor")
            .field("label", &self.label)
            .field("default_framebuffer", &self.default_framebuffer)
            .finish_non_exhaustive()
    }
}
