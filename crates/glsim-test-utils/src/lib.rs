//! Test utilities for glsim.
//!
//! - [`RecordingShaderListener`] records shader events and supplies the
//!   attributes and uniforms of linked programs
//! - [`TextureUnitLimit`] and [`HiddenExtensions`] simulate constrained
//!   hardware through soft restrictions
//! - [`fixtures`] builds contexts and sharing pairs

pub mod fixtures;
pub mod restrictions;
pub mod shader_control;

pub use restrictions::{HiddenExtensions, TextureUnitLimit};
pub use shader_control::{RecordingShaderListener, ShaderCall};
