//! glsim - a software emulation of a stateful OpenGL-style resource API
//!
//! Nothing is rendered. glsim tracks the bookkeeping a driver would do and
//! raises the same errors a driver would raise:
//! - Contexts, share groups and the compatibility checker that decides
//!   which context may use which object
//! - Buffers, array objects, textures, renderbuffers and framebuffers with
//!   their binding state
//! - Deletion that unbinds and detaches objects everywhere they are referenced
//! - Framebuffer completeness, feedback-loop detection and blit preconditions
//! - Shaders, uniform uploads and timer queries
//!
//! ## Quick Start
//!
//! ```rust
//! use glsim::{BufferUpdate, Context, ContextDescriptor, UsageHint};
//!
//! let mut context = Context::new(ContextDescriptor::default());
//! let mut buffers = context.array_buffers();
//!
//! let buffer = buffers.allocate(16, UsageHint::StaticDraw)?;
//! buffers.update(buffer, &BufferUpdate::at_offset(4, [1u8, 2, 3, 4])?)?;
//! assert_eq!(&buffers.read(&buffer)?[4..8], &[1, 2, 3, 4]);
//!
//! buffers.delete(buffer)?;
//! assert!(buffers.bind(buffer).is_err());
//! # Ok::<(), glsim::GlError>(())
//! ```

pub mod array_buffer;
pub mod array_object;
pub mod buffer;
pub mod compat;
pub mod config;
pub mod context;
pub mod depth;
pub mod error;
pub mod format;
pub mod framebuffer;
pub mod index_buffer;
pub mod listener;
pub mod object;
pub mod renderbuffer;
pub mod shader;
pub mod texture;
pub mod timer;

pub use array_buffer::ArrayBuffers;
pub use array_object::{
    ArrayObjectBuilder, ArrayObjects, FloatingAttribute, IntegralAttribute, ScalarIntegralType,
    ScalarType, VertexAttribute,
};
pub use buffer::{BufferMap, BufferUpdate, MapAccess, UsageHint};
pub use config::{ContextDescriptor, DefaultFramebuffer, DefaultRestrictions, Limits, SoftRestrictions};
pub use context::{Context, SUPPORTED_EXTENSIONS};
pub use depth::{DepthBuffers, DepthFunction, StencilBuffers};
pub use error::{GlError, GlErrorKind, GlResult};
pub use format::{FormatCapabilities, FormatInfo, RenderbufferFormat, TextureFormat};
pub use framebuffer::{
    Attachment, BlitBuffers, BlitFilter, DepthStencilAttachment, FramebufferBuilder,
    FramebufferStatus, Framebuffers,
};
pub use index_buffer::{IndexBuffers, UnsignedType};
pub use listener::{NullShaderListener, ProgramAttributes, ProgramUniforms, ShaderListener};
pub use object::{
    ArrayBuffer, ArrayObject, ColorAttachmentPoint, ContextBound, ContextId, DrawBuffer,
    FragmentShader, Framebuffer, GeometryShader, Handle, IndexBuffer, ObjectKind, ProgramShader,
    Renderbuffer, Sharing, Texture2D, TextureCube, TextureUnit, TimerQuery, VertexShader,
};
pub use renderbuffer::Renderbuffers;
pub use shader::{GlslType, ProgramAttribute, ProgramUniform, Shaders, UniformValue};
pub use texture::{
    CubeMapFace, Texture2DDescriptor, Texture2DUpdate, TextureCubeDescriptor, TextureCubeUpdate,
    TextureMagFilter, TextureMinFilter, TextureWrap, Textures,
};
pub use timer::TimerQueries;

pub use glsim_core::geometry::{Area, ByteRange, Size};
