//! Contexts, share groups and the object tables they own.
//!
//! Every context belongs to exactly one [`ShareGroup`]. Contexts created with
//! [`Context::new_shared_with`] join the group of the context they share
//! with, which makes sharing symmetric and transitive. The group owns the
//! records of all objects created by its members, including per-context
//! kinds: the compatibility checker is what keeps those private, and keeping
//! them in one place lets deletion reach every container that references a
//! deleted object.

use crate::array_buffer::ArrayBuffers;
use crate::array_object::{ArrayObjectRecord, ArrayObjects};
use crate::buffer::BufferStorage;
use crate::compat;
use crate::config::{ContextDescriptor, DefaultFramebuffer, Limits, SoftRestrictions};
use crate::depth::{DepthBuffers, DepthState, StencilBuffers};
use crate::error::{GlError, GlResult};
use crate::framebuffer::{FramebufferRecord, Framebuffers};
use crate::index_buffer::{IndexBufferRecord, IndexBuffers};
use crate::listener::ShaderListener;
use crate::object::{
    ArrayBuffer, ArrayObject, ContextBound, ContextId, Framebuffer, Handle, Namespace, ObjectKind,
    ProgramShader, Renderbuffer, TimerQuery, kind,
};
use crate::renderbuffer::{RenderbufferRecord, Renderbuffers};
use crate::shader::{ProgramRecord, ShaderRecord, Shaders, UniformChecking};
use crate::texture::{Texture2DRecord, TextureCubeRecord, Textures, UnitBinding};
use crate::timer::{TimerQueries, TimerQueryRecord};
use glsim_core::alloc::ObjectTable;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Extensions the emulated driver can expose.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["GL_EXT_texture_filter_anisotropic", "GL_KHR_debug"];

#[derive(Debug, Clone, Copy)]
pub(crate) struct NameCounters([u32; Namespace::COUNT]);

impl NameCounters {
    fn new() -> Self {
        Self([1; Namespace::COUNT])
    }

    fn next(&mut self, namespace: Namespace) -> u32 {
        let counter = &mut self.0[namespace.index()];
        let name = *counter;
        *counter += 1;
        name
    }
}

#[derive(Default)]
pub(crate) struct Objects {
    pub(crate) array_buffers: ObjectTable<BufferStorage>,
    pub(crate) index_buffers: ObjectTable<IndexBufferRecord>,
    pub(crate) array_objects: ObjectTable<ArrayObjectRecord>,
    pub(crate) textures_2d: ObjectTable<Texture2DRecord>,
    pub(crate) textures_cube: ObjectTable<TextureCubeRecord>,
    pub(crate) renderbuffers: ObjectTable<RenderbufferRecord>,
    pub(crate) framebuffers: ObjectTable<FramebufferRecord>,
    pub(crate) vertex_shaders: ObjectTable<ShaderRecord>,
    pub(crate) fragment_shaders: ObjectTable<ShaderRecord>,
    pub(crate) geometry_shaders: ObjectTable<ShaderRecord>,
    pub(crate) programs: ObjectTable<ProgramRecord>,
    pub(crate) timer_queries: ObjectTable<TimerQueryRecord>,
}

/// Maps an object kind to the table holding its records.
pub(crate) trait Stores<K: ObjectKind> {
    type Record;

    fn table(&self) -> &ObjectTable<Self::Record>;
    fn table_mut(&mut self) -> &mut ObjectTable<Self::Record>;
}

macro_rules! stores {
    ($($kind:ident => $record:ty, $field:ident;)*) => {
        $(
            impl Stores<kind::$kind> for Objects {
                type Record = $record;

                fn table(&self) -> &ObjectTable<$record> {
                    &self.$field
                }

                fn table_mut(&mut self) -> &mut ObjectTable<$record> {
                    &mut self.$field
                }
            }
        )*
    };
}

stores! {
    ArrayBuffer => BufferStorage, array_buffers;
    IndexBuffer => IndexBufferRecord, index_buffers;
    ArrayObject => ArrayObjectRecord, array_objects;
    Texture2D => Texture2DRecord, textures_2d;
    TextureCube => TextureCubeRecord, textures_cube;
    Renderbuffer => RenderbufferRecord, renderbuffers;
    Framebuffer => FramebufferRecord, framebuffers;
    VertexShader => ShaderRecord, vertex_shaders;
    FragmentShader => ShaderRecord, fragment_shaders;
    GeometryShader => ShaderRecord, geometry_shaders;
    ProgramShader => ProgramRecord, programs;
    TimerQuery => TimerQueryRecord, timer_queries;
}

impl Objects {
    pub(crate) fn get<K: ObjectKind>(
        &self,
        handle: &Handle<K>,
    ) -> GlResult<&<Self as Stores<K>>::Record>
    where
        Self: Stores<K>,
    {
        <Self as Stores<K>>::table(self)
            .get(handle.slot())
            .ok_or_else(|| deleted(handle))
    }

    pub(crate) fn get_mut<K: ObjectKind>(
        &mut self,
        handle: &Handle<K>,
    ) -> GlResult<&mut <Self as Stores<K>>::Record>
    where
        Self: Stores<K>,
    {
        <Self as Stores<K>>::table_mut(self)
            .get_mut(handle.slot())
            .ok_or_else(|| deleted(handle))
    }

    pub(crate) fn remove<K: ObjectKind>(
        &mut self,
        handle: &Handle<K>,
    ) -> GlResult<<Self as Stores<K>>::Record>
    where
        Self: Stores<K>,
    {
        <Self as Stores<K>>::table_mut(self)
            .remove(handle.slot())
            .ok_or_else(|| deleted(handle))
    }

    pub(crate) fn is_live<K: ObjectKind>(&self, handle: &Handle<K>) -> bool
    where
        Self: Stores<K>,
    {
        <Self as Stores<K>>::table(self).contains(handle.slot())
    }
}

fn deleted<K: ObjectKind>(handle: &Handle<K>) -> GlError {
    GlError::Deleted {
        object: handle.to_string(),
    }
}

/// State shared by every context of a share group.
pub(crate) struct ShareGroup {
    members: RefCell<Vec<ContextId>>,
    names: RefCell<NameCounters>,
    objects: RefCell<Objects>,
}

impl ShareGroup {
    fn new(founder: ContextId) -> Self {
        Self {
            members: RefCell::new(vec![founder]),
            names: RefCell::new(NameCounters::new()),
            objects: RefCell::new(Objects::default()),
        }
    }
}

/// Binding state of a single context.
pub(crate) struct Bindings {
    pub(crate) array_buffer: Option<ArrayBuffer>,
    /// `None` while the default array object is bound.
    pub(crate) array_object: Option<ArrayObject>,
    pub(crate) default_array_object: ArrayObject,
    pub(crate) renderbuffer: Option<Renderbuffer>,
    pub(crate) draw_framebuffer: Option<Framebuffer>,
    pub(crate) read_framebuffer: Option<Framebuffer>,
    pub(crate) units: Vec<UnitBinding>,
    pub(crate) program: Option<ProgramShader>,
    pub(crate) uniform_checking: UniformChecking,
    pub(crate) running_query: Option<TimerQuery>,
    pub(crate) depth: DepthState,
}

impl Bindings {
    /// The array object whose state index buffer operations act on.
    pub(crate) fn current_array_object(&self) -> ArrayObject {
        self.array_object.unwrap_or(self.default_array_object)
    }
}

/// An emulated rendering context.
///
/// Contexts are single-threaded: they are neither `Send` nor `Sync`, and
/// every operation runs to completion before returning.
///
/// # Example
///
/// ```
/// use glsim::{Context, ContextDescriptor, UsageHint};
///
/// let mut context = Context::new(ContextDescriptor::default());
/// let buffer = context.array_buffers().allocate(16, UsageHint::StaticDraw)?;
/// assert!(context.array_buffers().is_bound(&buffer)?);
/// # Ok::<(), glsim::GlError>(())
/// ```
pub struct Context {
    id: ContextId,
    label: Option<String>,
    destroyed: bool,
    group: Rc<ShareGroup>,
    names: NameCounters,
    limits: Limits,
    pub(crate) default_framebuffer: DefaultFramebuffer,
    restrictions: Box<dyn SoftRestrictions>,
    pub(crate) listener: Box<dyn ShaderListener>,
    pub(crate) bindings: Bindings,
}

impl Context {
    pub fn new(descriptor: ContextDescriptor) -> Self {
        let id = ContextId::fresh();
        Self::create(id, Rc::new(ShareGroup::new(id)), descriptor)
    }

    /// Create a context that shares objects with `other` and every context
    /// `other` already shares with.
    pub fn new_shared_with(other: &Context, descriptor: ContextDescriptor) -> GlResult<Self> {
        other.check_live()?;
        let id = ContextId::fresh();
        other.group.members.borrow_mut().push(id);
        tracing::debug!("{} shares with {}", id, other.id);
        Ok(Self::create(id, Rc::clone(&other.group), descriptor))
    }

    fn create(id: ContextId, group: Rc<ShareGroup>, descriptor: ContextDescriptor) -> Self {
        let ContextDescriptor {
            label,
            default_framebuffer,
            listener,
            restrictions,
        } = descriptor;

        let mut limits = Limits::IMPLEMENTATION;
        let units = restrictions
            .restrict_texture_unit_count(limits.max_texture_units)
            .min(limits.max_texture_units);
        if units < limits.max_texture_units {
            tracing::warn!(
                "{}: texture units restricted from {} to {}",
                id,
                limits.max_texture_units,
                units
            );
        }
        limits.max_texture_units = units;

        let default_array_object = {
            let mut objects = group.objects.borrow_mut();
            let slot = objects
                .array_objects
                .insert(ArrayObjectRecord::empty(limits.max_vertex_attributes));
            Handle::new(id, 0, slot)
        };

        tracing::debug!("create {} ({:?})", id, label);
        Self {
            id,
            label,
            destroyed: false,
            group,
            names: NameCounters::new(),
            limits,
            default_framebuffer,
            restrictions,
            listener,
            bindings: Bindings {
                array_buffer: None,
                array_object: None,
                default_array_object,
                renderbuffer: None,
                draw_framebuffer: None,
                read_framebuffer: None,
                units: vec![UnitBinding::default(); units as usize],
                program: None,
                uniform_checking: UniformChecking::default(),
                running_query: None,
                depth: DepthState::default(),
            },
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Whether this context shares objects with `other`. A context never
    /// shares with itself.
    pub fn is_shared_with(&self, other: ContextId) -> bool {
        other != self.id && self.group.members.borrow().contains(&other)
    }

    /// Every other context in this context's share group.
    pub fn shared_with(&self) -> Vec<ContextId> {
        self.group
            .members
            .borrow()
            .iter()
            .copied()
            .filter(|member| *member != self.id)
            .collect()
    }

    /// Destroy the context. Every later operation fails with
    /// [`GlError::ContextDestroyed`], including a second `destroy`.
    pub fn destroy(&mut self) -> GlResult<()> {
        self.check_live()?;
        self.destroyed = true;
        tracing::debug!("destroy {}", self.id);
        Ok(())
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Implementation limits, after soft restrictions.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn default_framebuffer(&self) -> &DefaultFramebuffer {
        &self.default_framebuffer
    }

    /// Whether an extension is both supported and not hidden by soft
    /// restrictions.
    pub fn extension_visible(&self, name: &str) -> bool {
        SUPPORTED_EXTENSIONS.contains(&name) && self.restrictions.restrict_extension_visibility(name)
    }

    /// Run the compatibility checker for `object` against this context.
    pub fn check<T>(&self, object: &T) -> GlResult<()>
    where
        T: ContextBound + fmt::Display + ?Sized,
    {
        compat::check(self.id, object, |owner| self.is_shared_with(owner))
    }

    pub fn array_buffers(&mut self) -> ArrayBuffers<'_> {
        ArrayBuffers::new(self)
    }

    pub fn index_buffers(&mut self) -> IndexBuffers<'_> {
        IndexBuffers::new(self)
    }

    pub fn array_objects(&mut self) -> ArrayObjects<'_> {
        ArrayObjects::new(self)
    }

    pub fn textures(&mut self) -> Textures<'_> {
        Textures::new(self)
    }

    pub fn renderbuffers(&mut self) -> Renderbuffers<'_> {
        Renderbuffers::new(self)
    }

    pub fn framebuffers(&mut self) -> Framebuffers<'_> {
        Framebuffers::new(self)
    }

    pub fn depth_buffers(&mut self) -> DepthBuffers<'_> {
        DepthBuffers::new(self)
    }

    pub fn stencil_buffers(&mut self) -> StencilBuffers<'_> {
        StencilBuffers::new(self)
    }

    pub fn shaders(&mut self) -> Shaders<'_> {
        Shaders::new(self)
    }

    pub fn timer_queries(&mut self) -> TimerQueries<'_> {
        TimerQueries::new(self)
    }

    pub(crate) fn check_live(&self) -> GlResult<()> {
        if self.destroyed {
            Err(GlError::ContextDestroyed { context: self.id })
        } else {
            Ok(())
        }
    }

    /// The full precondition chain for operating on an object: live context,
    /// compatible owner, not deleted.
    pub(crate) fn check_usable<K: ObjectKind>(&self, handle: &Handle<K>) -> GlResult<()>
    where
        Objects: Stores<K>,
    {
        self.check_live()?;
        self.check(handle)?;
        self.objects().get(handle).map(|_| ())
    }

    /// Live context and compatible owner, for pseudo-objects.
    pub(crate) fn check_bound_to<T>(&self, object: &T) -> GlResult<()>
    where
        T: ContextBound + fmt::Display,
    {
        self.check_live()?;
        self.check(object)
    }

    pub(crate) fn objects(&self) -> Ref<'_, Objects> {
        self.group.objects.borrow()
    }

    pub(crate) fn objects_mut(&self) -> RefMut<'_, Objects> {
        self.group.objects.borrow_mut()
    }

    /// Whether `handle` still refers to a live object. Used to hide bindings
    /// to objects deleted through another context of the share group.
    pub(crate) fn is_live<K: ObjectKind>(&self, handle: &Handle<K>) -> bool
    where
        Objects: Stores<K>,
    {
        self.objects().is_live(handle)
    }

    /// Store a new record and hand out a handle with a fresh name.
    pub(crate) fn insert<K: ObjectKind>(&mut self, record: <Objects as Stores<K>>::Record) -> Handle<K>
    where
        Objects: Stores<K>,
    {
        let name = match K::SHARING {
            crate::object::Sharing::SharedAcrossContexts => {
                self.group.names.borrow_mut().next(K::NAMESPACE)
            }
            crate::object::Sharing::BoundToSingleContext => self.names.next(K::NAMESPACE),
        };
        let slot = {
            let mut objects = self.objects_mut();
            <Objects as Stores<K>>::table_mut(&mut objects).insert(record)
        };
        Handle::new(self.id, name, slot)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("destroyed", &self.destroyed)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}
