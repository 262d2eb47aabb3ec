//! A scriptable [`ShaderListener`] that records every event.

use glsim::{
    ContextId, GlError, GlResult, GlslType, ProgramAttribute, ProgramAttributes, ProgramShader,
    ProgramUniform, ProgramUniforms, ShaderListener,
};
use glsim_core::alloc::HashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Records a listener callback for verification in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderCall {
    CompileVertex {
        context: ContextId,
        name: String,
        lines: usize,
    },
    CompileFragment {
        context: ContextId,
        name: String,
        lines: usize,
    },
    CompileGeometry {
        context: ContextId,
        name: String,
        lines: usize,
    },
    LinkProgram {
        context: ContextId,
        program: ProgramShader,
        name: String,
    },
}

#[derive(Debug, Clone)]
struct DeclaredUniform {
    name: String,
    glsl_type: GlslType,
    size: u32,
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<ShaderCall>,
    attributes: HashMap<String, Vec<(String, GlslType)>>,
    uniforms: HashMap<String, Vec<DeclaredUniform>>,
    link_failures: HashMap<String, String>,
}

/// Records compile and link events and supplies the interface of linked
/// programs from declarations made up front.
///
/// Clones share their state, so a test can keep one clone and hand another
/// to the context.
///
/// # Example
///
/// ```rust
/// use glsim::{Context, ContextDescriptor, GlslType};
/// use glsim_test_utils::RecordingShaderListener;
///
/// let listener = RecordingShaderListener::new();
/// listener.declare_uniform("basic", "color", GlslType::FloatVector4);
///
/// let mut context = Context::new(ContextDescriptor::default().with_listener(listener.clone()));
/// let mut shaders = context.shaders();
/// let vertex = shaders.compile_vertex("basic.vert", ["void main() {}"])?;
/// let fragment = shaders.compile_fragment("basic.frag", ["void main() {}"])?;
/// let program = shaders.link_program("basic", &vertex, None, &fragment)?;
///
/// assert!(shaders.program_uniform(&program, "color")?.is_some());
/// assert_eq!(listener.count_links(), 1);
/// # Ok::<(), glsim::GlError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingShaderListener {
    state: Arc<Mutex<State>>,
}

impl RecordingShaderListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give every program linked under `program` an attribute. Locations are
    /// assigned in declaration order.
    pub fn declare_attribute(&self, program: &str, name: &str, glsl_type: GlslType) {
        self.state
            .lock()
            .attributes
            .entry(program.to_string())
            .or_default()
            .push((name.to_string(), glsl_type));
    }

    pub fn declare_uniform(&self, program: &str, name: &str, glsl_type: GlslType) {
        self.declare_uniform_array(program, name, glsl_type, 1);
    }

    pub fn declare_uniform_array(&self, program: &str, name: &str, glsl_type: GlslType, size: u32) {
        self.state
            .lock()
            .uniforms
            .entry(program.to_string())
            .or_default()
            .push(DeclaredUniform {
                name: name.to_string(),
                glsl_type,
                size,
            });
    }

    /// Make linking a program named `program` fail with `message`.
    pub fn fail_link(&self, program: &str, message: &str) {
        self.state
            .lock()
            .link_failures
            .insert(program.to_string(), message.to_string());
    }

    /// Get a copy of all recorded calls.
    pub fn calls(&self) -> Vec<ShaderCall> {
        self.state.lock().calls.clone()
    }

    pub fn count_compiles(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| !matches!(call, ShaderCall::LinkProgram { .. }))
            .count()
    }

    pub fn count_links(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| matches!(call, ShaderCall::LinkProgram { .. }))
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    fn record(&self, call: ShaderCall) {
        self.state.lock().calls.push(call);
    }
}

impl ShaderListener for RecordingShaderListener {
    fn on_compile_vertex_shader_start(&mut self, context: ContextId, name: &str, lines: &[String]) {
        self.record(ShaderCall::CompileVertex {
            context,
            name: name.to_string(),
            lines: lines.len(),
        });
    }

    fn on_compile_fragment_shader_start(&mut self, context: ContextId, name: &str, lines: &[String]) {
        self.record(ShaderCall::CompileFragment {
            context,
            name: name.to_string(),
            lines: lines.len(),
        });
    }

    fn on_compile_geometry_shader_start(&mut self, context: ContextId, name: &str, lines: &[String]) {
        self.record(ShaderCall::CompileGeometry {
            context,
            name: name.to_string(),
            lines: lines.len(),
        });
    }

    fn on_link_program(
        &mut self,
        context: ContextId,
        program: ProgramShader,
        name: &str,
        attributes: &mut ProgramAttributes,
        uniforms: &mut ProgramUniforms,
    ) -> GlResult<()> {
        let mut state = self.state.lock();
        state.calls.push(ShaderCall::LinkProgram {
            context,
            program,
            name: name.to_string(),
        });

        if let Some(message) = state.link_failures.get(name) {
            return Err(GlError::ProgramCompileError {
                name: name.to_string(),
                message: message.clone(),
            });
        }

        for (location, (attribute, glsl_type)) in state
            .attributes
            .get(name)
            .into_iter()
            .flatten()
            .enumerate()
        {
            attributes.insert(
                attribute.clone(),
                ProgramAttribute {
                    program,
                    name: attribute.clone(),
                    location: location as u32,
                    glsl_type: *glsl_type,
                },
            );
        }
        for (location, uniform) in state.uniforms.get(name).into_iter().flatten().enumerate() {
            uniforms.insert(
                uniform.name.clone(),
                ProgramUniform {
                    program,
                    name: uniform.name.clone(),
                    location: location as u32,
                    glsl_type: uniform.glsl_type,
                    size: uniform.size,
                },
            );
        }
        Ok(())
    }
}
