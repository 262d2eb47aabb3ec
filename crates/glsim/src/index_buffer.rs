//! Index buffers.
//!
//! There is no context-wide index buffer target: the bound index buffer is
//! part of the state of the currently bound array object, so binding an
//! index buffer writes into that array object and switching array objects
//! switches the visible index buffer.

use crate::buffer::{BufferStorage, BufferUpdate, UsageHint, check_buffer_size};
use crate::context::{Context, Objects};
use crate::error::{GlError, GlResult};
use crate::object::{ArrayObject, IndexBuffer, kind};
use glsim_core::alloc::{HashSet, Slot};

/// Type of the indices stored in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsignedType {
    UnsignedByte,
    UnsignedShort,
    UnsignedInt,
}

impl UnsignedType {
    pub fn size_bytes(self) -> u64 {
        match self {
            UnsignedType::UnsignedByte => 1,
            UnsignedType::UnsignedShort => 2,
            UnsignedType::UnsignedInt => 4,
        }
    }
}

pub(crate) struct IndexBufferRecord {
    storage: BufferStorage,
    indices: u64,
    index_type: UnsignedType,
    /// Array objects whose index buffer slot holds this buffer.
    referring_array_objects: HashSet<Slot>,
}

impl IndexBufferRecord {
    pub(crate) fn forget_array_object(&mut self, array_object: Slot) {
        self.referring_array_objects.remove(&array_object);
    }
}

/// Point `array_object` at `index_buffer`, keeping the reference sets of the
/// old and new index buffers in step. Returns the previous index buffer.
pub(crate) fn set_array_object_index_buffer(
    objects: &mut Objects,
    array_object: &ArrayObject,
    index_buffer: Option<IndexBuffer>,
) -> GlResult<Option<IndexBuffer>> {
    let record = objects.get_mut(array_object)?;
    let previous = std::mem::replace(&mut record.index_buffer, index_buffer);
    if previous == index_buffer {
        return Ok(previous);
    }

    let slot = array_object.slot();
    if let Some(previous) = previous
        && let Some(previous) = objects.index_buffers.get_mut(previous.slot())
    {
        previous.referring_array_objects.remove(&slot);
    }
    if let Some(current) = index_buffer
        && let Some(current) = objects.index_buffers.get_mut(current.slot())
    {
        current.referring_array_objects.insert(slot);
    }
    Ok(previous)
}

/// Index buffer operations of one context.
pub struct IndexBuffers<'a> {
    context: &'a mut Context,
}

impl<'a> IndexBuffers<'a> {
    pub(crate) fn new(context: &'a mut Context) -> Self {
        Self { context }
    }

    /// Allocate a zero-filled buffer holding `indices` indices of
    /// `index_type` and bind it to the current array object.
    pub fn allocate(
        &mut self,
        indices: u64,
        index_type: UnsignedType,
        usage: UsageHint,
    ) -> GlResult<IndexBuffer> {
        self.context.check_live()?;
        let size = indices
            .checked_mul(index_type.size_bytes())
            .ok_or_else(|| GlError::range("index count", format!("{} indices overflow", indices)))?;
        check_buffer_size(self.context.limits(), size)?;

        let buffer = self.context.insert::<kind::IndexBuffer>(IndexBufferRecord {
            storage: BufferStorage::zeroed(size, usage),
            indices,
            index_type,
            referring_array_objects: HashSet::default(),
        });
        tracing::debug!(
            "allocate {} ({} x {:?}, {:?})",
            buffer,
            indices,
            index_type,
            usage
        );
        self.set_bound(Some(buffer))?;
        Ok(buffer)
    }

    /// Bind to the currently bound array object.
    pub fn bind(&mut self, buffer: IndexBuffer) -> GlResult<()> {
        self.context.check_usable(&buffer)?;
        self.set_bound(Some(buffer))
    }

    pub fn unbind(&mut self) -> GlResult<()> {
        self.context.check_live()?;
        self.set_bound(None)
    }

    fn set_bound(&mut self, buffer: Option<IndexBuffer>) -> GlResult<()> {
        let array_object = self.context.bindings.current_array_object();
        let previous = set_array_object_index_buffer(
            &mut self.context.objects_mut(),
            &array_object,
            buffer,
        )?;
        tracing::trace!("bind {:?} -> {:?} on {}", previous, buffer, array_object);
        Ok(())
    }

    /// The index buffer of the currently bound array object.
    pub fn bound(&self) -> GlResult<Option<IndexBuffer>> {
        self.context.check_live()?;
        let array_object = self.context.bindings.current_array_object();
        self.context
            .objects()
            .get(&array_object)
            .map(|record| record.index_buffer)
    }

    pub fn is_bound(&self, buffer: &IndexBuffer) -> GlResult<bool> {
        self.context.check_usable(buffer)?;
        Ok(self.bound()? == Some(*buffer))
    }

    pub fn any_bound(&self) -> GlResult<bool> {
        self.bound().map(|bound| bound.is_some())
    }

    /// Delete a buffer, clearing it from every array object that refers to it.
    pub fn delete(&mut self, buffer: IndexBuffer) -> GlResult<()> {
        self.context.check_usable(&buffer)?;
        let mut objects = self.context.objects_mut();
        let record = objects.remove(&buffer)?;
        for slot in record.referring_array_objects {
            if let Some(array_object) = objects.array_objects.get_mut(slot)
                && array_object.index_buffer == Some(buffer)
            {
                array_object.index_buffer = None;
            }
        }
        tracing::debug!("delete {}", buffer);
        Ok(())
    }

    pub fn indices(&self, buffer: &IndexBuffer) -> GlResult<u64> {
        self.context.check_usable(buffer)?;
        self.context.objects().get(buffer).map(|record| record.indices)
    }

    pub fn index_type(&self, buffer: &IndexBuffer) -> GlResult<UnsignedType> {
        self.context.check_usable(buffer)?;
        self.context
            .objects()
            .get(buffer)
            .map(|record| record.index_type)
    }

    pub fn size(&self, buffer: &IndexBuffer) -> GlResult<u64> {
        self.context.check_usable(buffer)?;
        self.context
            .objects()
            .get(buffer)
            .map(|record| record.storage.size())
    }

    /// Write into an index buffer bound to the current array object.
    pub fn update(&mut self, buffer: IndexBuffer, update: &BufferUpdate) -> GlResult<()> {
        self.context.check_usable(&buffer)?;
        self.check_bound(&buffer)?;
        self.context
            .objects_mut()
            .get_mut(&buffer)?
            .storage
            .apply(update)?;
        tracing::trace!("update {} {}", buffer, update.range());
        Ok(())
    }

    pub fn read(&self, buffer: &IndexBuffer) -> GlResult<Vec<u8>> {
        self.context.check_usable(buffer)?;
        self.check_bound(buffer)?;
        self.context
            .objects()
            .get(buffer)
            .map(|record| record.storage.bytes().to_vec())
    }

    pub fn reallocate(&mut self, buffer: IndexBuffer, usage: UsageHint) -> GlResult<()> {
        self.context.check_usable(&buffer)?;
        self.check_bound(&buffer)?;
        self.context
            .objects_mut()
            .get_mut(&buffer)?
            .storage
            .reallocate(usage);
        tracing::debug!("reallocate {} ({:?})", buffer, usage);
        Ok(())
    }

    fn check_bound(&self, buffer: &IndexBuffer) -> GlResult<()> {
        match self.bound()? {
            Some(bound) if bound == *buffer => Ok(()),
            bound => Err(GlError::BufferNotBound {
                required: buffer.to_string(),
                bound: bound.map(|bound| bound.to_string()),
            }),
        }
    }
}
