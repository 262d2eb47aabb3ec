//! Array buffers: a single bind target per context.

use crate::buffer::{BufferMap, BufferStorage, BufferUpdate, MapAccess, UsageHint, check_buffer_size};
use crate::context::Context;
use crate::error::{GlError, GlResult};
use crate::object::{ArrayBuffer, kind};

/// Array buffer operations of one context.
pub struct ArrayBuffers<'a> {
    context: &'a mut Context,
}

impl<'a> ArrayBuffers<'a> {
    pub(crate) fn new(context: &'a mut Context) -> Self {
        Self { context }
    }

    /// Allocate a zero-filled buffer of `size` bytes and bind it.
    pub fn allocate(&mut self, size: u64, usage: UsageHint) -> GlResult<ArrayBuffer> {
        self.context.check_live()?;
        check_buffer_size(self.context.limits(), size)?;

        let buffer = self
            .context
            .insert::<kind::ArrayBuffer>(BufferStorage::zeroed(size, usage));
        tracing::debug!("allocate {} ({} bytes, {:?})", buffer, size, usage);
        self.set_bound(Some(buffer));
        Ok(buffer)
    }

    pub fn bind(&mut self, buffer: ArrayBuffer) -> GlResult<()> {
        self.context.check_usable(&buffer)?;
        self.set_bound(Some(buffer));
        Ok(())
    }

    pub fn unbind(&mut self) -> GlResult<()> {
        self.context.check_live()?;
        self.set_bound(None);
        Ok(())
    }

    fn set_bound(&mut self, buffer: Option<ArrayBuffer>) {
        let bound = &mut self.context.bindings.array_buffer;
        tracing::trace!("bind {:?} -> {:?}", bound, buffer);
        *bound = buffer;
    }

    pub fn bound(&self) -> GlResult<Option<ArrayBuffer>> {
        self.context.check_live()?;
        Ok(self
            .context
            .bindings
            .array_buffer
            .filter(|buffer| self.context.is_live(buffer)))
    }

    pub fn is_bound(&self, buffer: &ArrayBuffer) -> GlResult<bool> {
        self.context.check_usable(buffer)?;
        Ok(self.context.bindings.array_buffer == Some(*buffer))
    }

    pub fn any_bound(&self) -> GlResult<bool> {
        self.bound().map(|bound| bound.is_some())
    }

    /// Delete a buffer, unbinding it first if it is bound.
    pub fn delete(&mut self, buffer: ArrayBuffer) -> GlResult<()> {
        self.context.check_usable(&buffer)?;
        if self.context.bindings.array_buffer == Some(buffer) {
            self.set_bound(None);
        }
        self.context.objects_mut().remove(&buffer)?;
        tracing::debug!("delete {}", buffer);
        Ok(())
    }

    pub fn size(&self, buffer: &ArrayBuffer) -> GlResult<u64> {
        self.context.check_usable(buffer)?;
        self.context.objects().get(buffer).map(|storage| storage.size())
    }

    pub fn usage(&self, buffer: &ArrayBuffer) -> GlResult<UsageHint> {
        self.context.check_usable(buffer)?;
        self.context.objects().get(buffer).map(|storage| storage.usage())
    }

    /// Write into a bound buffer.
    pub fn update(&mut self, buffer: ArrayBuffer, update: &BufferUpdate) -> GlResult<()> {
        self.context.check_usable(&buffer)?;
        self.check_bound(&buffer)?;
        self.context.objects_mut().get_mut(&buffer)?.apply(update)?;
        tracing::trace!("update {} {}", buffer, update.range());
        Ok(())
    }

    /// A copy of the whole contents of a bound buffer.
    pub fn read(&self, buffer: &ArrayBuffer) -> GlResult<Vec<u8>> {
        self.context.check_usable(buffer)?;
        self.check_bound(buffer)?;
        self.context
            .objects()
            .get(buffer)
            .map(|storage| storage.bytes().to_vec())
    }

    /// Re-specify the storage of a bound buffer: contents are zeroed, the
    /// size is kept and any outstanding mapping is dropped.
    pub fn reallocate(&mut self, buffer: ArrayBuffer, usage: UsageHint) -> GlResult<()> {
        self.context.check_usable(&buffer)?;
        self.check_bound(&buffer)?;
        self.context.objects_mut().get_mut(&buffer)?.reallocate(usage);
        tracing::debug!("reallocate {} ({:?})", buffer, usage);
        Ok(())
    }

    /// Map a bound buffer. A buffer has at most one outstanding mapping.
    pub fn map(&mut self, buffer: ArrayBuffer, access: MapAccess) -> GlResult<BufferMap> {
        self.context.check_usable(&buffer)?;
        self.check_bound(&buffer)?;

        let mut objects = self.context.objects_mut();
        let storage = objects.get_mut(&buffer)?;
        if storage.mapped.is_some() {
            return Err(GlError::BufferMappedMultiple {
                buffer: buffer.to_string(),
            });
        }
        let mapping = storage.begin_map(access);
        tracing::trace!("map {} ({:?}, epoch {})", buffer, access, mapping.epoch);
        Ok(BufferMap::new(buffer, mapping, storage.bytes().to_vec()))
    }

    /// End a mapping, copying its bytes back if it was writable. A map whose
    /// mapping was already dropped by [`reallocate`](Self::reallocate) is
    /// rejected even if the buffer has been mapped again since.
    pub fn unmap(&mut self, map: BufferMap) -> GlResult<()> {
        let buffer = map.buffer();
        self.context.check_usable(&buffer)?;
        self.check_bound(&buffer)?;

        let mut objects = self.context.objects_mut();
        let storage = objects.get_mut(&buffer)?;
        let access = match storage.mapped {
            Some(mapping) if mapping.epoch == map.epoch() => mapping.access,
            _ => {
                return Err(GlError::BufferMappedNot {
                    buffer: buffer.to_string(),
                });
            }
        };
        if access.writes() {
            storage.write_back(&map.into_bytes());
        }
        storage.mapped = None;
        tracing::trace!("unmap {}", buffer);
        Ok(())
    }

    pub fn is_mapped(&self, buffer: &ArrayBuffer) -> GlResult<bool> {
        self.context.check_usable(buffer)?;
        self.context
            .objects()
            .get(buffer)
            .map(|storage| storage.mapped.is_some())
    }

    fn check_bound(&self, buffer: &ArrayBuffer) -> GlResult<()> {
        match self.context.bindings.array_buffer {
            Some(bound) if bound == *buffer => Ok(()),
            bound => Err(GlError::BufferNotBound {
                required: buffer.to_string(),
                bound: bound.map(|bound| bound.to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Context, ContextDescriptor, GlErrorKind, MapAccess, UsageHint};

    #[test]
    fn test_allocate_binds() {
        let mut context = Context::new(ContextDescriptor::default());
        let mut buffers = context.array_buffers();
        let buffer = buffers.allocate(16, UsageHint::StaticDraw).unwrap();
        assert_eq!(buffers.bound().unwrap(), Some(buffer));
        assert_eq!(buffers.size(&buffer).unwrap(), 16);
        assert_eq!(buffers.read(&buffer).unwrap(), vec![0; 16]);
    }

    #[test]
    fn test_names_are_monotonic() {
        let mut context = Context::new(ContextDescriptor::default());
        let mut buffers = context.array_buffers();
        let a = buffers.allocate(1, UsageHint::StaticDraw).unwrap();
        let b = buffers.allocate(1, UsageHint::StaticDraw).unwrap();
        assert_eq!(a.name(), 1);
        assert_eq!(b.name(), 2);
    }

    #[test]
    fn test_oversized_allocation() {
        let mut context = Context::new(ContextDescriptor::default());
        let error = context
            .array_buffers()
            .allocate(u64::MAX, UsageHint::StaticDraw)
            .unwrap_err();
        assert_eq!(error.kind(), GlErrorKind::RangeCheck);
        assert_eq!(context.array_buffers().bound().unwrap(), None);
    }

    #[test]
    fn test_map_twice() {
        let mut context = Context::new(ContextDescriptor::default());
        let mut buffers = context.array_buffers();
        let buffer = buffers.allocate(4, UsageHint::StaticDraw).unwrap();
        let _map = buffers.map(buffer, MapAccess::ReadOnly).unwrap();
        let error = buffers.map(buffer, MapAccess::ReadOnly).unwrap_err();
        assert_eq!(error.kind(), GlErrorKind::BufferMappedMultiple);
        assert!(buffers.is_mapped(&buffer).unwrap());
    }
}
