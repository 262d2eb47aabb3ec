//! Shaders, programs and uniform uploads.
//!
//! Compilation only rejects empty sources. The interface of a linked program
//! (its attributes and uniforms) comes from the context's
//! [`ShaderListener`](crate::ShaderListener).

use crate::context::{Context, Objects, Stores};
use crate::error::{GlError, GlResult};
use crate::listener::{ProgramAttributes, ProgramUniforms};
use crate::object::{
    FragmentShader, GeometryShader, Handle, ObjectKind, ProgramShader, TextureUnit, VertexShader,
    kind,
};
use glsim_core::math::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};
use glsim_core::profiling::profile_function;
use std::fmt;

/// Types a program attribute or uniform can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlslType {
    Float,
    FloatVector2,
    FloatVector3,
    FloatVector4,
    Integer,
    IntegerVector2,
    IntegerVector3,
    IntegerVector4,
    UnsignedInteger,
    UnsignedIntegerVector2,
    UnsignedIntegerVector3,
    UnsignedIntegerVector4,
    Boolean,
    FloatMatrix2,
    FloatMatrix3,
    FloatMatrix4,
    Sampler2D,
    SamplerCube,
}

impl GlslType {
    /// Number of scalar elements in a value of this type.
    pub fn element_count(self) -> usize {
        use GlslType::*;
        match self {
            Float | Integer | UnsignedInteger | Boolean | Sampler2D | SamplerCube => 1,
            FloatVector2 | IntegerVector2 | UnsignedIntegerVector2 => 2,
            FloatVector3 | IntegerVector3 | UnsignedIntegerVector3 => 3,
            FloatVector4 | IntegerVector4 | UnsignedIntegerVector4 | FloatMatrix2 => 4,
            FloatMatrix3 => 9,
            FloatMatrix4 => 16,
        }
    }

    pub fn is_floating_point(self) -> bool {
        use GlslType::*;
        matches!(
            self,
            Float | FloatVector2 | FloatVector3 | FloatVector4 | FloatMatrix2 | FloatMatrix3 | FloatMatrix4
        )
    }
}

impl fmt::Display for GlslType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use GlslType::*;
        let name = match self {
            Float => "float",
            FloatVector2 => "vec2",
            FloatVector3 => "vec3",
            FloatVector4 => "vec4",
            Integer => "int",
            IntegerVector2 => "ivec2",
            IntegerVector3 => "ivec3",
            IntegerVector4 => "ivec4",
            UnsignedInteger => "uint",
            UnsignedIntegerVector2 => "uvec2",
            UnsignedIntegerVector3 => "uvec3",
            UnsignedIntegerVector4 => "uvec4",
            Boolean => "bool",
            FloatMatrix2 => "mat2",
            FloatMatrix3 => "mat3",
            FloatMatrix4 => "mat4",
            Sampler2D => "sampler2D",
            SamplerCube => "samplerCube",
        };
        f.write_str(name)
    }
}

/// A value written to a uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Integer(i32),
    IVec2(IVec2),
    IVec3(IVec3),
    IVec4(IVec4),
    UnsignedInteger(u32),
    UVec2(UVec2),
    UVec3(UVec3),
    UVec4(UVec4),
    Boolean(bool),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
    Sampler2D(TextureUnit),
    SamplerCube(TextureUnit),
}

impl UniformValue {
    pub fn glsl_type(&self) -> GlslType {
        match self {
            UniformValue::Float(_) => GlslType::Float,
            UniformValue::Vec2(_) => GlslType::FloatVector2,
            UniformValue::Vec3(_) => GlslType::FloatVector3,
            UniformValue::Vec4(_) => GlslType::FloatVector4,
            UniformValue::Integer(_) => GlslType::Integer,
            UniformValue::IVec2(_) => GlslType::IntegerVector2,
            UniformValue::IVec3(_) => GlslType::IntegerVector3,
            UniformValue::IVec4(_) => GlslType::IntegerVector4,
            UniformValue::UnsignedInteger(_) => GlslType::UnsignedInteger,
            UniformValue::UVec2(_) => GlslType::UnsignedIntegerVector2,
            UniformValue::UVec3(_) => GlslType::UnsignedIntegerVector3,
            UniformValue::UVec4(_) => GlslType::UnsignedIntegerVector4,
            UniformValue::Boolean(_) => GlslType::Boolean,
            UniformValue::Mat2(_) => GlslType::FloatMatrix2,
            UniformValue::Mat3(_) => GlslType::FloatMatrix3,
            UniformValue::Mat4(_) => GlslType::FloatMatrix4,
            UniformValue::Sampler2D(_) => GlslType::Sampler2D,
            UniformValue::SamplerCube(_) => GlslType::SamplerCube,
        }
    }
}

/// An active attribute of a linked program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramAttribute {
    pub program: ProgramShader,
    pub name: String,
    pub location: u32,
    pub glsl_type: GlslType,
}

/// An active uniform of a linked program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramUniform {
    pub program: ProgramShader,
    pub name: String,
    pub location: u32,
    pub glsl_type: GlslType,
    /// Array length, 1 for non-arrays.
    pub size: u32,
}

/// Which uniform checks run on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UniformChecking {
    pub(crate) types: bool,
    pub(crate) activity: bool,
}

impl Default for UniformChecking {
    fn default() -> Self {
        Self {
            types: true,
            activity: true,
        }
    }
}

pub(crate) struct ShaderRecord {
    name: String,
    lines: Vec<String>,
}

pub(crate) struct ProgramRecord {
    name: String,
    vertex: VertexShader,
    geometry: Option<GeometryShader>,
    fragment: FragmentShader,
    attributes: ProgramAttributes,
    uniforms: ProgramUniforms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Vertex,
    Fragment,
    Geometry,
}

fn is_blank(lines: &[String]) -> bool {
    lines.iter().all(|line| line.trim().is_empty())
}

/// Shader and program operations of one context.
pub struct Shaders<'a> {
    context: &'a mut Context,
}

impl<'a> Shaders<'a> {
    pub(crate) fn new(context: &'a mut Context) -> Self {
        Self { context }
    }

    fn compile<K, I, S>(&mut self, stage: Stage, name: &str, lines: I) -> GlResult<Handle<K>>
    where
        K: ObjectKind,
        Objects: Stores<K, Record = ShaderRecord>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        profile_function!();
        self.context.check_live()?;
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        tracing::debug!("compile {:?} shader {} ({} lines)", stage, name, lines.len());
        if is_blank(&lines) {
            return Err(GlError::ProgramCompileError {
                name: name.to_string(),
                message: "Empty program".to_string(),
            });
        }

        let id = self.context.id();
        let listener = &mut self.context.listener;
        match stage {
            Stage::Vertex => listener.on_compile_vertex_shader_start(id, name, &lines),
            Stage::Fragment => listener.on_compile_fragment_shader_start(id, name, &lines),
            Stage::Geometry => listener.on_compile_geometry_shader_start(id, name, &lines),
        }
        Ok(self.context.insert::<K>(ShaderRecord {
            name: name.to_string(),
            lines,
        }))
    }

    /// Compile a vertex shader. Fails if every line is blank.
    pub fn compile_vertex<I, S>(&mut self, name: &str, lines: I) -> GlResult<VertexShader>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compile::<kind::VertexShader, _, _>(Stage::Vertex, name, lines)
    }

    pub fn compile_fragment<I, S>(&mut self, name: &str, lines: I) -> GlResult<FragmentShader>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compile::<kind::FragmentShader, _, _>(Stage::Fragment, name, lines)
    }

    pub fn compile_geometry<I, S>(&mut self, name: &str, lines: I) -> GlResult<GeometryShader>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compile::<kind::GeometryShader, _, _>(Stage::Geometry, name, lines)
    }

    /// Source lines of a compiled vertex shader.
    pub fn vertex_source(&self, shader: &VertexShader) -> GlResult<Vec<String>> {
        self.context.check_usable(shader)?;
        self.context
            .objects()
            .get(shader)
            .map(|record| record.lines.clone())
    }

    /// Link a program. The listener decides which attributes and uniforms the
    /// program exposes.
    pub fn link_program(
        &mut self,
        name: &str,
        vertex: &VertexShader,
        geometry: Option<&GeometryShader>,
        fragment: &FragmentShader,
    ) -> GlResult<ProgramShader> {
        profile_function!();
        self.context.check_usable(vertex)?;
        if let Some(geometry) = geometry {
            self.context.check_usable(geometry)?;
        }
        self.context.check_usable(fragment)?;

        tracing::debug!("link program {}", name);
        {
            let objects = self.context.objects();
            tracing::debug!("[{}] vertex {}", name, objects.get(vertex)?.name);
            if let Some(geometry) = geometry {
                tracing::debug!("[{}] geometry {}", name, objects.get(geometry)?.name);
            }
            tracing::debug!("[{}] fragment {}", name, objects.get(fragment)?.name);
        }

        let program = self.context.insert::<kind::ProgramShader>(ProgramRecord {
            name: name.to_string(),
            vertex: *vertex,
            geometry: geometry.copied(),
            fragment: *fragment,
            attributes: ProgramAttributes::default(),
            uniforms: ProgramUniforms::default(),
        });

        let mut attributes = ProgramAttributes::default();
        let mut uniforms = ProgramUniforms::default();
        let id = self.context.id();
        if let Err(error) =
            self.context
                .listener
                .on_link_program(id, program, name, &mut attributes, &mut uniforms)
        {
            self.context.objects_mut().remove(&program)?;
            tracing::debug!("link program {} failed: {}", name, error);
            return Err(error);
        }

        for attribute in attributes.values() {
            tracing::trace!(
                "[{}] attribute {} {} {}",
                name,
                attribute.name,
                attribute.location,
                attribute.glsl_type
            );
        }
        for uniform in uniforms.values() {
            tracing::trace!(
                "[{}] uniform {} {} {}",
                name,
                uniform.name,
                uniform.location,
                uniform.glsl_type
            );
        }

        let mut objects = self.context.objects_mut();
        let record = objects.get_mut(&program)?;
        record.attributes = attributes;
        record.uniforms = uniforms;
        Ok(program)
    }

    pub fn program_name(&self, program: &ProgramShader) -> GlResult<String> {
        self.context.check_usable(program)?;
        self.context
            .objects()
            .get(program)
            .map(|record| record.name.clone())
    }

    /// The shaders a program was linked from.
    pub fn program_shaders(
        &self,
        program: &ProgramShader,
    ) -> GlResult<(VertexShader, Option<GeometryShader>, FragmentShader)> {
        self.context.check_usable(program)?;
        self.context
            .objects()
            .get(program)
            .map(|record| (record.vertex, record.geometry, record.fragment))
    }

    pub fn program_attributes(&self, program: &ProgramShader) -> GlResult<ProgramAttributes> {
        self.context.check_usable(program)?;
        self.context
            .objects()
            .get(program)
            .map(|record| record.attributes.clone())
    }

    pub fn program_uniforms(&self, program: &ProgramShader) -> GlResult<ProgramUniforms> {
        self.context.check_usable(program)?;
        self.context
            .objects()
            .get(program)
            .map(|record| record.uniforms.clone())
    }

    /// Look up a single uniform by name.
    pub fn program_uniform(&self, program: &ProgramShader, name: &str) -> GlResult<Option<ProgramUniform>> {
        self.context.check_usable(program)?;
        self.context
            .objects()
            .get(program)
            .map(|record| record.uniforms.get(name).cloned())
    }

    pub fn activate(&mut self, program: &ProgramShader) -> GlResult<()> {
        self.context.check_usable(program)?;
        let active = &mut self.context.bindings.program;
        tracing::trace!("activate {:?} -> {}", active, program);
        *active = Some(*program);
        Ok(())
    }

    pub fn deactivate(&mut self) -> GlResult<()> {
        self.context.check_live()?;
        tracing::trace!("deactivate {:?}", self.context.bindings.program);
        self.context.bindings.program = None;
        Ok(())
    }

    /// The active program, if it has not been deleted.
    pub fn activated(&self) -> GlResult<Option<ProgramShader>> {
        self.context.check_live()?;
        Ok(self
            .context
            .bindings
            .program
            .filter(|program| self.context.is_live(program)))
    }

    /// Delete a program, deactivating it if it is active.
    pub fn delete_program(&mut self, program: ProgramShader) -> GlResult<()> {
        self.context.check_usable(&program)?;
        if self.context.bindings.program == Some(program) {
            self.context.bindings.program = None;
        }
        self.context.objects_mut().remove(&program)?;
        tracing::debug!("delete {}", program);
        Ok(())
    }

    pub fn delete_vertex(&mut self, shader: VertexShader) -> GlResult<()> {
        self.delete_shader(shader)
    }

    pub fn delete_fragment(&mut self, shader: FragmentShader) -> GlResult<()> {
        self.delete_shader(shader)
    }

    pub fn delete_geometry(&mut self, shader: GeometryShader) -> GlResult<()> {
        self.delete_shader(shader)
    }

    fn delete_shader<K>(&mut self, shader: Handle<K>) -> GlResult<()>
    where
        K: ObjectKind,
        Objects: Stores<K, Record = ShaderRecord>,
    {
        self.context.check_usable(&shader)?;
        self.context.objects_mut().remove(&shader)?;
        tracing::debug!("delete {}", shader);
        Ok(())
    }

    /// Enable or disable the uniform type check. Enabled by default.
    pub fn set_type_checking(&mut self, enabled: bool) -> GlResult<()> {
        self.context.check_live()?;
        self.context.bindings.uniform_checking.types = enabled;
        Ok(())
    }

    /// Enable or disable the check that a uniform's program is active.
    /// Enabled by default.
    pub fn set_activity_checking(&mut self, enabled: bool) -> GlResult<()> {
        self.context.check_live()?;
        self.context.bindings.uniform_checking.activity = enabled;
        Ok(())
    }

    fn check_active(&self, uniform: &ProgramUniform) -> GlResult<()> {
        self.context.check_usable(&uniform.program)?;
        let active = self.activated()?;
        if self.context.bindings.uniform_checking.activity && active != Some(uniform.program) {
            return Err(GlError::ProgramNotActive {
                required: uniform.program.to_string(),
                active: active.map(|program| program.to_string()),
            });
        }
        Ok(())
    }

    fn type_error(uniform: &ProgramUniform, actual: impl fmt::Display) -> GlError {
        GlError::ProgramTypeError {
            uniform: uniform.name.clone(),
            expected: uniform.glsl_type.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Write `value` to `uniform`.
    pub fn put_uniform(&mut self, uniform: &ProgramUniform, value: UniformValue) -> GlResult<()> {
        self.check_active(uniform)?;
        if let UniformValue::Sampler2D(unit) | UniformValue::SamplerCube(unit) = &value {
            self.context.check(unit)?;
        }
        let actual = value.glsl_type();
        if self.context.bindings.uniform_checking.types && actual != uniform.glsl_type {
            return Err(Self::type_error(uniform, actual));
        }
        tracing::trace!("put {} {} = {:?}", uniform.program, uniform.name, value);
        Ok(())
    }

    /// Write raw floats to a floating point uniform. At least as many values
    /// as the uniform has elements must be given.
    pub fn put_floats(&mut self, uniform: &ProgramUniform, values: &[f32]) -> GlResult<()> {
        self.check_active(uniform)?;
        if self.context.bindings.uniform_checking.types && !uniform.glsl_type.is_floating_point() {
            return Err(Self::type_error(uniform, "a floating point type"));
        }
        let required = uniform.glsl_type.element_count() * uniform.size.max(1) as usize;
        if values.len() < required {
            return Err(GlError::ProgramTypeError {
                uniform: uniform.name.clone(),
                expected: format!("at least {} floating point values", required),
                actual: format!("{} floating point values", values.len()),
            });
        }
        tracing::trace!("put {} {} ({} floats)", uniform.program, uniform.name, values.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_sources() {
        assert!(is_blank(&[]));
        assert!(is_blank(&["  ".to_string(), "\t".to_string()]));
        assert!(!is_blank(&["void main() {}".to_string()]));
    }

    #[test]
    fn test_element_counts() {
        assert_eq!(GlslType::FloatMatrix4.element_count(), 16);
        assert_eq!(GlslType::IntegerVector3.element_count(), 3);
        assert!(GlslType::FloatMatrix2.is_floating_point());
        assert!(!GlslType::Sampler2D.is_floating_point());
    }

    #[test]
    fn test_uniform_value_types() {
        assert_eq!(UniformValue::Mat4(Mat4::IDENTITY).glsl_type(), GlslType::FloatMatrix4);
        assert_eq!(UniformValue::UVec2(UVec2::ZERO).glsl_type(), GlslType::UnsignedIntegerVector2);
        assert_eq!(GlslType::SamplerCube.to_string(), "samplerCube");
    }
}
