//! Object identities: contexts, typed handles and context-bound pseudo-objects.
//!
//! Callers only ever hold opaque handles. The mutable record behind a handle
//! lives in a table owned by the context's share group and is addressed by
//! the handle's [`Slot`]; once the record is removed the handle can never
//! resolve again, which is how deletion stays terminal.

use glsim_core::alloc::Slot;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one emulated context. Unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(u64);

impl ContextId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context {}", self.0)
    }
}

/// Which contexts may use an object.
///
/// Assigned per object kind, never per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sharing {
    /// The owning context and every context it shares with.
    SharedAcrossContexts,
    /// Only the owning context.
    BoundToSingleContext,
}

/// Name spaces from which object names are drawn.
///
/// Kinds that share a name space never receive the same name, mirroring how
/// 2D and cube textures share texture names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Buffer,
    Texture,
    Renderbuffer,
    Shader,
    ArrayObject,
    Framebuffer,
    Query,
}

impl Namespace {
    pub(crate) const COUNT: usize = 7;

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Static description of an object kind.
pub trait ObjectKind: 'static {
    const LABEL: &'static str;
    const SHARING: Sharing;
    const NAMESPACE: Namespace;
}

/// Anything that belongs to a context and therefore has to pass the
/// compatibility check before use.
pub trait ContextBound {
    fn owner(&self) -> ContextId;
    fn sharing(&self) -> Sharing;
}

/// Marker types for every object kind.
pub mod kind {
    use super::{Namespace, ObjectKind, Sharing};

    macro_rules! object_kinds {
        ($($(#[$meta:meta])* $kind:ident => $label:literal, $sharing:ident, $namespace:ident;)*) => {
            $(
                $(#[$meta])*
                #[derive(Debug)]
                pub enum $kind {}

                impl ObjectKind for $kind {
                    const LABEL: &'static str = $label;
                    const SHARING: Sharing = Sharing::$sharing;
                    const NAMESPACE: Namespace = Namespace::$namespace;
                }
            )*
        };
    }

    object_kinds! {
        ArrayBuffer => "ArrayBuffer", SharedAcrossContexts, Buffer;
        IndexBuffer => "IndexBuffer", SharedAcrossContexts, Buffer;
        /// Container object; never shared.
        ArrayObject => "ArrayObject", BoundToSingleContext, ArrayObject;
        Texture2D => "Texture2D", SharedAcrossContexts, Texture;
        TextureCube => "TextureCube", SharedAcrossContexts, Texture;
        Renderbuffer => "Renderbuffer", SharedAcrossContexts, Renderbuffer;
        /// Container object; never shared.
        Framebuffer => "Framebuffer", BoundToSingleContext, Framebuffer;
        VertexShader => "VertexShader", SharedAcrossContexts, Shader;
        FragmentShader => "FragmentShader", SharedAcrossContexts, Shader;
        GeometryShader => "GeometryShader", SharedAcrossContexts, Shader;
        ProgramShader => "ProgramShader", SharedAcrossContexts, Shader;
        TimerQuery => "TimerQuery", BoundToSingleContext, Query;
    }
}

/// An opaque reference to an emulated object of kind `K`.
pub struct Handle<K: ObjectKind> {
    owner: ContextId,
    name: u32,
    slot: Slot,
    kind: PhantomData<fn() -> K>,
}

impl<K: ObjectKind> Handle<K> {
    pub(crate) fn new(owner: ContextId, name: u32, slot: Slot) -> Self {
        Self {
            owner,
            name,
            slot,
            kind: PhantomData,
        }
    }

    /// The emulated object name.
    pub fn name(&self) -> u32 {
        self.name
    }

    pub fn context(&self) -> ContextId {
        self.owner
    }

    pub(crate) fn slot(&self) -> Slot {
        self.slot
    }
}

impl<K: ObjectKind> ContextBound for Handle<K> {
    fn owner(&self) -> ContextId {
        self.owner
    }

    fn sharing(&self) -> Sharing {
        K::SHARING
    }
}

impl<K: ObjectKind> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: ObjectKind> Copy for Handle<K> {}

impl<K: ObjectKind> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.name == other.name && self.slot == other.slot
    }
}

impl<K: ObjectKind> Eq for Handle<K> {}

impl<K: ObjectKind> Hash for Handle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.name.hash(state);
        self.slot.hash(state);
    }
}

impl<K: ObjectKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", K::LABEL, self.name, self.owner)
    }
}

impl<K: ObjectKind> fmt::Display for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", K::LABEL, self.name)
    }
}

pub type ArrayBuffer = Handle<kind::ArrayBuffer>;
pub type IndexBuffer = Handle<kind::IndexBuffer>;
pub type ArrayObject = Handle<kind::ArrayObject>;
pub type Texture2D = Handle<kind::Texture2D>;
pub type TextureCube = Handle<kind::TextureCube>;
pub type Renderbuffer = Handle<kind::Renderbuffer>;
pub type Framebuffer = Handle<kind::Framebuffer>;
pub type VertexShader = Handle<kind::VertexShader>;
pub type FragmentShader = Handle<kind::FragmentShader>;
pub type GeometryShader = Handle<kind::GeometryShader>;
pub type ProgramShader = Handle<kind::ProgramShader>;
pub type TimerQuery = Handle<kind::TimerQuery>;

macro_rules! indexed_pseudo_object {
    ($(#[$meta:meta])* $name:ident, $label:literal, $sharing:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            owner: ContextId,
            index: u32,
        }

        impl $name {
            pub(crate) fn new(owner: ContextId, index: u32) -> Self {
                Self { owner, index }
            }

            pub fn index(&self) -> u32 {
                self.index
            }
        }

        impl ContextBound for $name {
            fn owner(&self) -> ContextId {
                self.owner
            }

            fn sharing(&self) -> Sharing {
                Sharing::$sharing
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "[{} {}]", $label, self.index)
            }
        }
    };
}

indexed_pseudo_object!(
    /// A texture unit of one context.
    TextureUnit,
    "TextureUnit",
    BoundToSingleContext
);

indexed_pseudo_object!(
    /// A framebuffer color attachment point. Attachment points are numbered
    /// identically in every context, so sharing contexts may exchange them.
    ColorAttachmentPoint,
    "ColorAttachmentPoint",
    SharedAcrossContexts
);

indexed_pseudo_object!(
    /// A framebuffer draw buffer.
    DrawBuffer,
    "DrawBuffer",
    SharedAcrossContexts
);

#[cfg(test)]
mod tests {
    use super::*;
    use glsim_core::alloc::ObjectTable;

    #[test]
    fn test_context_ids_are_unique() {
        let a = ContextId::fresh();
        let b = ContextId::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn test_handle_identity_includes_slot() {
        let mut table = ObjectTable::new();
        let owner = ContextId::fresh();
        let first = table.insert(());
        table.remove(first);
        let second = table.insert(());

        let old = ArrayBuffer::new(owner, 1, first);
        let new = ArrayBuffer::new(owner, 1, second);
        assert_ne!(old, new);
        let copy = old;
        assert_eq!(old, copy);
    }

    #[test]
    fn test_handle_formatting() {
        let mut table = ObjectTable::new();
        let owner = ContextId::fresh();
        let buffer = ArrayBuffer::new(owner, 3, table.insert(()));
        assert_eq!(buffer.to_string(), "[ArrayBuffer 3]");
        assert!(format!("{:?}", buffer).starts_with("ArrayBuffer(3, context "));
    }

    #[test]
    fn test_sharing_per_kind() {
        assert_eq!(ArrayBuffer::new(ContextId::fresh(), 1, Slot::new(0, 0)).sharing(), Sharing::SharedAcrossContexts);
        assert_eq!(<kind::Framebuffer as ObjectKind>::SHARING, Sharing::BoundToSingleContext);
        assert_eq!(<kind::ArrayObject as ObjectKind>::SHARING, Sharing::BoundToSingleContext);
        assert_eq!(TextureUnit::new(ContextId::fresh(), 0).sharing(), Sharing::BoundToSingleContext);
    }
}
