//! Hooks for supplying compiled-shader metadata.
//!
//! No GLSL is ever compiled. Instead, a [`ShaderListener`] is told about every
//! compilation and fills in the attributes and uniforms of each linked
//! program, which is how tests describe the programs they expect.

use crate::error::GlResult;
use crate::object::{ContextId, ProgramShader};
use crate::shader::{ProgramAttribute, ProgramUniform};
use glsim_core::alloc::HashMap;

/// Attributes of a program, keyed by name.
pub type ProgramAttributes = HashMap<String, ProgramAttribute>;

/// Uniforms of a program, keyed by name.
pub type ProgramUniforms = HashMap<String, ProgramUniform>;

/// Receives shader compilation and program link events.
///
/// Every method has an empty default, so implementors only override the
/// events they care about.
pub trait ShaderListener {
    fn on_compile_vertex_shader_start(&mut self, context: ContextId, name: &str, lines: &[String]) {
        let _ = (context, name, lines);
    }

    fn on_compile_fragment_shader_start(&mut self, context: ContextId, name: &str, lines: &[String]) {
        let _ = (context, name, lines);
    }

    fn on_compile_geometry_shader_start(&mut self, context: ContextId, name: &str, lines: &[String]) {
        let _ = (context, name, lines);
    }

    /// Called once `program` exists. Entries added to `attributes` and
    /// `uniforms` become the program's interface; returning an error fails
    /// the link and discards the program.
    fn on_link_program(
        &mut self,
        context: ContextId,
        program: ProgramShader,
        name: &str,
        attributes: &mut ProgramAttributes,
        uniforms: &mut ProgramUniforms,
    ) -> GlResult<()> {
        let _ = (context, program, name, attributes, uniforms);
        Ok(())
    }
}

/// A listener that ignores every event. Programs linked with it have no
/// attributes or uniforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullShaderListener;

impl ShaderListener for NullShaderListener {}
