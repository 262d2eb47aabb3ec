//! Storage, updates and mappings common to array and index buffers.

use crate::config::Limits;
use crate::error::{GlError, GlResult};
use crate::object::ArrayBuffer;
use glsim_core::geometry::ByteRange;
use glsim_core::profiling::profile_function;

/// How the application intends to use a buffer's contents. Recorded but
/// otherwise opaque to the emulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UsageHint {
    StreamDraw,
    StreamRead,
    StreamCopy,
    #[default]
    StaticDraw,
    StaticRead,
    StaticCopy,
    DynamicDraw,
    DynamicRead,
    DynamicCopy,
}

/// A contiguous write into a buffer.
///
/// # Example
///
/// ```
/// use glsim::BufferUpdate;
/// use glsim_core::math::PackedVec2;
///
/// let update = BufferUpdate::from_pod(8, &[PackedVec2 { x: 1.0, y: 2.0 }])?;
/// assert_eq!(update.range().lower(), 8);
/// assert_eq!(update.range().upper(), 15);
/// # Ok::<(), glsim::GlError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferUpdate {
    range: ByteRange,
    data: Vec<u8>,
}

impl BufferUpdate {
    /// An update writing `data` to `range`. The length of `data` must equal
    /// the range interval; a mismatch is reported when the update is applied.
    pub fn new(range: ByteRange, data: impl Into<Vec<u8>>) -> Self {
        Self {
            range,
            data: data.into(),
        }
    }

    /// An update writing all of `data` starting at `offset`.
    pub fn at_offset(offset: u64, data: impl Into<Vec<u8>>) -> GlResult<Self> {
        let data = data.into();
        let range = ByteRange::from_offset_len(offset, data.len() as u64).ok_or_else(|| {
            GlError::range(
                "buffer update",
                format!("{} bytes at offset {} is not a valid range", data.len(), offset),
            )
        })?;
        Ok(Self { range, data })
    }

    pub fn from_pod<T: bytemuck::Pod>(offset: u64, values: &[T]) -> GlResult<Self> {
        Self::at_offset(offset, bytemuck::cast_slice::<T, u8>(values))
    }

    pub fn range(&self) -> ByteRange {
        self.range
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Access requested when mapping a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapAccess {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl MapAccess {
    pub fn writes(self) -> bool {
        matches!(self, MapAccess::WriteOnly | MapAccess::ReadWrite)
    }
}

/// An outstanding mapping of an array buffer. Writes are copied back into the
/// buffer when the mapping is handed to
/// [`ArrayBuffers::unmap`](crate::ArrayBuffers::unmap) with a writable access.
#[derive(Debug)]
pub struct BufferMap {
    buffer: ArrayBuffer,
    access: MapAccess,
    epoch: u64,
    bytes: Vec<u8>,
}

impl BufferMap {
    pub(crate) fn new(buffer: ArrayBuffer, mapping: Mapping, bytes: Vec<u8>) -> Self {
        Self {
            buffer,
            access: mapping.access,
            epoch: mapping.epoch,
            bytes,
        }
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn buffer(&self) -> ArrayBuffer {
        self.buffer
    }

    pub fn access(&self) -> MapAccess {
        self.access
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// The outstanding mapping of a store. Each mapping gets a fresh epoch so a
/// [`BufferMap`] outliving its mapping is never mistaken for a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mapping {
    pub(crate) access: MapAccess,
    pub(crate) epoch: u64,
}

/// The zero-initialized backing store of a buffer.
#[derive(Debug, Clone)]
pub(crate) struct BufferStorage {
    data: Vec<u8>,
    usage: UsageHint,
    pub(crate) mapped: Option<Mapping>,
    maps: u64,
}

impl BufferStorage {
    pub(crate) fn zeroed(size: u64, usage: UsageHint) -> Self {
        Self {
            data: vec![0; size as usize],
            usage,
            mapped: None,
            maps: 0,
        }
    }

    /// Start a new mapping. The caller checks that none is outstanding.
    pub(crate) fn begin_map(&mut self, access: MapAccess) -> Mapping {
        self.maps += 1;
        let mapping = Mapping {
            access,
            epoch: self.maps,
        };
        self.mapped = Some(mapping);
        mapping
    }

    pub(crate) fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub(crate) fn usage(&self) -> UsageHint {
        self.usage
    }

    /// The valid byte range, `None` for an empty buffer.
    pub(crate) fn range(&self) -> Option<ByteRange> {
        ByteRange::from_offset_len(0, self.size())
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Copy an update into the store. Nothing is written unless the whole
    /// update fits.
    pub(crate) fn apply(&mut self, update: &BufferUpdate) -> GlResult<()> {
        profile_function!();
        let target = update.range();
        if !self.range().is_some_and(|range| range.includes_range(&target)) {
            return Err(GlError::range(
                "buffer update",
                format!("{} is outside of a {} byte buffer", target, self.size()),
            ));
        }
        if update.data().len() as u64 != target.interval() {
            return Err(GlError::range(
                "buffer update",
                format!(
                    "{} bytes of data for a {} byte range",
                    update.data().len(),
                    target.interval()
                ),
            ));
        }
        let start = target.lower() as usize;
        self.data[start..start + update.data().len()].copy_from_slice(update.data());
        Ok(())
    }

    /// Replace the contents of a mapped region.
    pub(crate) fn write_back(&mut self, bytes: &[u8]) {
        let len = bytes.len().min(self.data.len());
        self.data[..len].copy_from_slice(&bytes[..len]);
    }

    /// Re-specify the store with its current size and a new usage, dropping
    /// its contents and any mapping.
    pub(crate) fn reallocate(&mut self, usage: UsageHint) {
        self.data.iter_mut().for_each(|byte| *byte = 0);
        self.usage = usage;
        self.mapped = None;
    }
}

pub(crate) fn check_buffer_size(limits: &Limits, size: u64) -> GlResult<()> {
    if size > limits.max_buffer_size {
        return Err(GlError::range(
            "buffer size",
            format!("{} exceeds the maximum of {}", size, limits.max_buffer_size),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_update_exact_range() {
        let mut storage = BufferStorage::zeroed(16, UsageHint::StaticDraw);
        let update = BufferUpdate::at_offset(4, vec![1, 2, 3, 4]).unwrap();
        storage.apply(&update).unwrap();
        assert_eq!(&storage.bytes()[..4], &[0; 4]);
        assert_eq!(&storage.bytes()[4..8], &[1, 2, 3, 4]);
        assert_eq!(&storage.bytes()[8..], &[0; 8]);
    }

    #[test]
    fn test_apply_rejects_out_of_range_without_writing() {
        let mut storage = BufferStorage::zeroed(8, UsageHint::StaticDraw);
        let update = BufferUpdate::at_offset(6, vec![9, 9, 9]).unwrap();
        assert!(storage.apply(&update).is_err());
        assert_eq!(storage.bytes(), &[0; 8]);
    }

    #[test]
    fn test_apply_rejects_length_mismatch() {
        let mut storage = BufferStorage::zeroed(8, UsageHint::StaticDraw);
        let range = ByteRange::new(0, 3).unwrap();
        let update = BufferUpdate::new(range, vec![1, 2]);
        assert!(storage.apply(&update).is_err());
    }

    #[test]
    fn test_empty_update_is_rejected() {
        assert!(BufferUpdate::at_offset(0, Vec::new()).is_err());
    }

    #[test]
    fn test_from_pod() {
        let update = BufferUpdate::from_pod(0, &[1u16, 2u16]).unwrap();
        assert_eq!(update.range().interval(), 4);
        assert_eq!(update.data(), bytemuck::cast_slice::<u16, u8>(&[1, 2]));
    }

    #[test]
    fn test_reallocate_clears_contents_and_mapping() {
        let mut storage = BufferStorage::zeroed(4, UsageHint::StaticDraw);
        storage
            .apply(&BufferUpdate::at_offset(0, vec![1, 1, 1, 1]).unwrap())
            .unwrap();
        storage.begin_map(MapAccess::ReadOnly);
        storage.reallocate(UsageHint::DynamicDraw);
        assert_eq!(storage.bytes(), &[0; 4]);
        assert_eq!(storage.usage(), UsageHint::DynamicDraw);
        assert!(storage.mapped.is_none());
    }

    #[test]
    fn test_each_mapping_has_a_new_epoch() {
        let mut storage = BufferStorage::zeroed(4, UsageHint::StaticDraw);
        let first = storage.begin_map(MapAccess::WriteOnly);
        storage.reallocate(UsageHint::StaticDraw);
        let second = storage.begin_map(MapAccess::WriteOnly);
        assert_ne!(first.epoch, second.epoch);
        assert_eq!(storage.mapped, Some(second));
    }
}
