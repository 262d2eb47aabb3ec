//! Error types for the emulated API.

use crate::framebuffer::{BlitFilter, FramebufferStatus};
use crate::object::ContextId;
use std::fmt;

/// Errors raised by emulated operations.
///
/// An operation that returns an error has not mutated any state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlError {
    /// The context has been destroyed.
    ContextDestroyed { context: ContextId },

    /// The object belongs to a context that is neither the current context
    /// nor shared with it, or it is a per-context object used from another
    /// context.
    WrongContext {
        object: String,
        owner: ContextId,
        current: ContextId,
    },

    /// The object has been deleted.
    Deleted { object: String },

    /// An operation required a buffer to be bound and it was not.
    BufferNotBound {
        required: String,
        bound: Option<String>,
    },

    /// The buffer is already mapped.
    BufferMappedMultiple { buffer: String },

    /// The buffer is not mapped.
    BufferMappedNot { buffer: String },

    /// The attachments given for a framebuffer do not form a complete set.
    FramebufferInvalid { status: FramebufferStatus },

    /// No framebuffer is bound to the required target.
    FramebufferNotBound { target: &'static str },

    /// Blitting requires distinct read and draw framebuffers.
    FramebufferReadDrawSame,

    /// The blit filter cannot be used with the requested buffers.
    WrongBlitFilter { filter: BlitFilter },

    /// A texture attached to the draw framebuffer is also bound to a texture
    /// unit.
    FeedbackLoop { framebuffer: String, texture: String },

    /// The current framebuffer has no depth buffer.
    NoDepthBuffer,

    /// The current framebuffer has no stencil buffer.
    NoStencilBuffer,

    /// A value was outside of its permitted range.
    RangeCheck { what: &'static str, detail: String },

    /// The format cannot be used for the requested attachment.
    FormatNotRenderable { format: String, required: &'static str },

    /// The object may not be deleted.
    ObjectNotDeletable { object: String },

    /// An array object builder attribute index was assigned twice while
    /// strict checking was enabled.
    AttributeAlreadyAssigned { index: u32 },

    /// The operation required a texture to be bound to a unit.
    TextureNotBound { kind: &'static str, unit: u32 },

    /// Shader compilation or program linking failed.
    ProgramCompileError { name: String, message: String },

    /// A uniform was written while its program was not active.
    ProgramNotActive {
        required: String,
        active: Option<String>,
    },

    /// A uniform was written with a value of the wrong type.
    ProgramTypeError {
        uniform: String,
        expected: String,
        actual: String,
    },

    /// A timer query is already running in this context.
    QueryAlreadyRunning { running: String },

    /// The timer query is not running.
    QueryNotRunning { query: String },

    /// The timer query has never completed.
    QueryResultUnavailable { query: String },
}

/// The kind of a [`GlError`], without any detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlErrorKind {
    ContextDestroyed,
    WrongContext,
    Deleted,
    BufferNotBound,
    BufferMappedMultiple,
    BufferMappedNot,
    FramebufferInvalid,
    FramebufferNotBound,
    FramebufferReadDrawSame,
    WrongBlitFilter,
    FeedbackLoop,
    NoDepthBuffer,
    NoStencilBuffer,
    RangeCheck,
    FormatNotRenderable,
    ObjectNotDeletable,
    AttributeAlreadyAssigned,
    TextureNotBound,
    ProgramCompileError,
    ProgramNotActive,
    ProgramTypeError,
    QueryAlreadyRunning,
    QueryNotRunning,
    QueryResultUnavailable,
}

impl GlError {
    pub fn kind(&self) -> GlErrorKind {
        match self {
            GlError::ContextDestroyed { .. } => GlErrorKind::ContextDestroyed,
            GlError::WrongContext { .. } => GlErrorKind::WrongContext,
            GlError::Deleted { .. } => GlErrorKind::Deleted,
            GlError::BufferNotBound { .. } => GlErrorKind::BufferNotBound,
            GlError::BufferMappedMultiple { .. } => GlErrorKind::BufferMappedMultiple,
            GlError::BufferMappedNot { .. } => GlErrorKind::BufferMappedNot,
            GlError::FramebufferInvalid { .. } => GlErrorKind::FramebufferInvalid,
            GlError::FramebufferNotBound { .. } => GlErrorKind::FramebufferNotBound,
            GlError::FramebufferReadDrawSame => GlErrorKind::FramebufferReadDrawSame,
            GlError::WrongBlitFilter { .. } => GlErrorKind::WrongBlitFilter,
            GlError::FeedbackLoop { .. } => GlErrorKind::FeedbackLoop,
            GlError::NoDepthBuffer => GlErrorKind::NoDepthBuffer,
            GlError::NoStencilBuffer => GlErrorKind::NoStencilBuffer,
            GlError::RangeCheck { .. } => GlErrorKind::RangeCheck,
            GlError::FormatNotRenderable { .. } => GlErrorKind::FormatNotRenderable,
            GlError::ObjectNotDeletable { .. } => GlErrorKind::ObjectNotDeletable,
            GlError::AttributeAlreadyAssigned { .. } => GlErrorKind::AttributeAlreadyAssigned,
            GlError::TextureNotBound { .. } => GlErrorKind::TextureNotBound,
            GlError::ProgramCompileError { .. } => GlErrorKind::ProgramCompileError,
            GlError::ProgramNotActive { .. } => GlErrorKind::ProgramNotActive,
            GlError::ProgramTypeError { .. } => GlErrorKind::ProgramTypeError,
            GlError::QueryAlreadyRunning { .. } => GlErrorKind::QueryAlreadyRunning,
            GlError::QueryNotRunning { .. } => GlErrorKind::QueryNotRunning,
            GlError::QueryResultUnavailable { .. } => GlErrorKind::QueryResultUnavailable,
        }
    }

    pub(crate) fn range(what: &'static str, detail: impl Into<String>) -> Self {
        GlError::RangeCheck {
            what,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlError::ContextDestroyed { context } => {
                write!(f, "{} has been destroyed", context)
            }
            GlError::WrongContext {
                object,
                owner,
                current,
            } => write!(
                f,
                "{} belongs to {}, which is not usable from the current {}",
                object, owner, current
            ),
            GlError::Deleted { object } => write!(f, "{} has been deleted", object),
            GlError::BufferNotBound { required, bound } => match bound {
                Some(bound) => write!(f, "{} is not bound (bound: {})", required, bound),
                None => write!(f, "{} is not bound (nothing bound)", required),
            },
            GlError::BufferMappedMultiple { buffer } => {
                write!(f, "{} is already mapped", buffer)
            }
            GlError::BufferMappedNot { buffer } => write!(f, "{} is not mapped", buffer),
            GlError::FramebufferInvalid { status } => {
                write!(f, "Framebuffer is incomplete: {:?}", status)
            }
            GlError::FramebufferNotBound { target } => {
                write!(f, "No framebuffer is bound to the {} target", target)
            }
            GlError::FramebufferReadDrawSame => {
                write!(f, "The read and draw framebuffers must be different")
            }
            GlError::WrongBlitFilter { filter } => write!(
                f,
                "Filter {:?} cannot be used when blitting depth or stencil buffers",
                filter
            ),
            GlError::FeedbackLoop {
                framebuffer,
                texture,
            } => write!(
                f,
                "Feedback loop: {} is attached to {} and bound to a texture unit",
                texture, framebuffer
            ),
            GlError::NoDepthBuffer => write!(f, "The current framebuffer has no depth buffer"),
            GlError::NoStencilBuffer => {
                write!(f, "The current framebuffer has no stencil buffer")
            }
            GlError::RangeCheck { what, detail } => {
                write!(f, "Range check failed for {}: {}", what, detail)
            }
            GlError::FormatNotRenderable { format, required } => {
                write!(f, "Format {} is not {}", format, required)
            }
            GlError::ObjectNotDeletable { object } => {
                write!(f, "{} cannot be deleted", object)
            }
            GlError::AttributeAlreadyAssigned { index } => {
                write!(f, "Attribute {} has already been assigned", index)
            }
            GlError::TextureNotBound { kind, unit } => {
                write!(f, "No {} is bound to texture unit {}", kind, unit)
            }
            GlError::ProgramCompileError { name, message } => {
                write!(f, "Failed to compile '{}': {}", name, message)
            }
            GlError::ProgramNotActive { required, active } => match active {
                Some(active) => write!(f, "{} is not active (active: {})", required, active),
                None => write!(f, "{} is not active (no program active)", required),
            },
            GlError::ProgramTypeError {
                uniform,
                expected,
                actual,
            } => write!(
                f,
                "Uniform '{}' has type {} but was given {}",
                uniform, expected, actual
            ),
            GlError::QueryAlreadyRunning { running } => {
                write!(f, "{} is already running", running)
            }
            GlError::QueryNotRunning { query } => write!(f, "{} is not running", query),
            GlError::QueryResultUnavailable { query } => {
                write!(f, "{} has not produced a result", query)
            }
        }
    }
}

impl std::error::Error for GlError {}

pub type GlResult<T> = Result<T, GlError>;
