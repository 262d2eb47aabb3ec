//! Array objects and their builders.
//!
//! An array object is assembled in an [`ArrayObjectBuilder`] and frozen by
//! [`ArrayObjects::allocate`]. Each context has a default array object with
//! name 0, which is bound whenever no other array object is and cannot be
//! deleted.

use crate::context::Context;
use crate::error::{GlError, GlResult};
use crate::index_buffer::set_array_object_index_buffer;
use crate::object::{
    ArrayBuffer, ArrayObject, ContextBound, ContextId, IndexBuffer, Sharing, kind,
};
use std::fmt;

/// Component types accepted by floating point attributes. Integer types are
/// converted to floats, optionally normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    HalfFloat,
    Float,
    Double,
}

impl ScalarType {
    pub fn size_bytes(self) -> u32 {
        match self {
            ScalarType::Byte | ScalarType::UnsignedByte => 1,
            ScalarType::Short | ScalarType::UnsignedShort | ScalarType::HalfFloat => 2,
            ScalarType::Int | ScalarType::UnsignedInt | ScalarType::Float => 4,
            ScalarType::Double => 8,
        }
    }
}

/// Component types accepted by integral attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarIntegralType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
}

impl ScalarIntegralType {
    pub fn size_bytes(self) -> u32 {
        match self {
            ScalarIntegralType::Byte | ScalarIntegralType::UnsignedByte => 1,
            ScalarIntegralType::Short | ScalarIntegralType::UnsignedShort => 2,
            ScalarIntegralType::Int | ScalarIntegralType::UnsignedInt => 4,
        }
    }
}

/// A floating point vertex attribute sourced from an array buffer.
///
/// ```
/// use glsim::{Context, ContextDescriptor, FloatingAttribute, ScalarType, UsageHint};
///
/// let mut context = Context::new(ContextDescriptor::default());
/// let buffer = context.array_buffers().allocate(64, UsageHint::StaticDraw)?;
/// let attribute = FloatingAttribute::new(buffer, 3, ScalarType::Float)
///     .with_stride(16)
///     .with_offset(4);
///
/// let mut builder = context.array_objects().new_builder()?;
/// builder.set_attribute_floating(&context, 0, attribute)?;
/// # Ok::<(), glsim::GlError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatingAttribute {
    pub buffer: ArrayBuffer,
    pub elements: u32,
    pub scalar: ScalarType,
    pub stride: i32,
    pub offset: u64,
    pub normalized: bool,
    pub divisor: u32,
}

impl FloatingAttribute {
    pub fn new(buffer: ArrayBuffer, elements: u32, scalar: ScalarType) -> Self {
        Self {
            buffer,
            elements,
            scalar,
            stride: 0,
            offset: 0,
            normalized: false,
            divisor: 0,
        }
    }

    pub fn with_stride(mut self, stride: i32) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    /// Advance the attribute once per `divisor` instances instead of once
    /// per vertex.
    pub fn with_divisor(mut self, divisor: u32) -> Self {
        self.divisor = divisor;
        self
    }
}

/// An integral vertex attribute sourced from an array buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegralAttribute {
    pub buffer: ArrayBuffer,
    pub elements: u32,
    pub scalar: ScalarIntegralType,
    pub stride: i32,
    pub offset: u64,
    pub divisor: u32,
}

impl IntegralAttribute {
    pub fn new(buffer: ArrayBuffer, elements: u32, scalar: ScalarIntegralType) -> Self {
        Self {
            buffer,
            elements,
            scalar,
            stride: 0,
            offset: 0,
            divisor: 0,
        }
    }

    pub fn with_stride(mut self, stride: i32) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_divisor(mut self, divisor: u32) -> Self {
        self.divisor = divisor;
        self
    }
}

/// The contents of an attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexAttribute {
    Floating(FloatingAttribute),
    Integral(IntegralAttribute),
}

impl VertexAttribute {
    pub fn buffer(&self) -> ArrayBuffer {
        match self {
            VertexAttribute::Floating(attribute) => attribute.buffer,
            VertexAttribute::Integral(attribute) => attribute.buffer,
        }
    }

    pub fn elements(&self) -> u32 {
        match self {
            VertexAttribute::Floating(attribute) => attribute.elements,
            VertexAttribute::Integral(attribute) => attribute.elements,
        }
    }

    pub fn stride(&self) -> i32 {
        match self {
            VertexAttribute::Floating(attribute) => attribute.stride,
            VertexAttribute::Integral(attribute) => attribute.stride,
        }
    }

    pub fn offset(&self) -> u64 {
        match self {
            VertexAttribute::Floating(attribute) => attribute.offset,
            VertexAttribute::Integral(attribute) => attribute.offset,
        }
    }

    pub fn divisor(&self) -> u32 {
        match self {
            VertexAttribute::Floating(attribute) => attribute.divisor,
            VertexAttribute::Integral(attribute) => attribute.divisor,
        }
    }
}

pub(crate) struct ArrayObjectRecord {
    attributes: Vec<Option<VertexAttribute>>,
    pub(crate) index_buffer: Option<IndexBuffer>,
}

impl ArrayObjectRecord {
    pub(crate) fn empty(max_attributes: u32) -> Self {
        Self {
            attributes: vec![None; max_attributes as usize],
            index_buffer: None,
        }
    }
}

/// A mutable description of an array object, owned by the context that
/// created it.
#[derive(Debug, Clone)]
pub struct ArrayObjectBuilder {
    owner: ContextId,
    attributes: Vec<Option<VertexAttribute>>,
    index_buffer: Option<IndexBuffer>,
    strict: bool,
}

impl ArrayObjectBuilder {
    fn new(owner: ContextId, attributes: Vec<Option<VertexAttribute>>) -> Self {
        Self {
            owner,
            attributes,
            index_buffer: None,
            strict: false,
        }
    }

    /// With strict checking enabled, assigning an attribute index that is
    /// already assigned fails instead of replacing it.
    pub fn set_strict_checking(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn max_attributes(&self) -> u32 {
        self.attributes.len() as u32
    }

    pub fn attribute_at(&self, index: u32) -> Option<&VertexAttribute> {
        self.attributes.get(index as usize).and_then(Option::as_ref)
    }

    pub fn set_attribute_floating(
        &mut self,
        context: &Context,
        index: u32,
        attribute: FloatingAttribute,
    ) -> GlResult<()> {
        self.validate(
            context,
            index,
            attribute.buffer,
            attribute.elements,
            attribute.stride,
            attribute.offset,
        )?;
        self.assign(index, VertexAttribute::Floating(attribute));
        Ok(())
    }

    pub fn set_attribute_integral(
        &mut self,
        context: &Context,
        index: u32,
        attribute: IntegralAttribute,
    ) -> GlResult<()> {
        self.validate(
            context,
            index,
            attribute.buffer,
            attribute.elements,
            attribute.stride,
            attribute.offset,
        )?;
        self.assign(index, VertexAttribute::Integral(attribute));
        Ok(())
    }

    /// Clear an attribute slot.
    pub fn disable_attribute(&mut self, index: u32) -> GlResult<()> {
        self.check_index(index)?;
        self.attributes[index as usize] = None;
        Ok(())
    }

    pub fn set_index_buffer(&mut self, context: &Context, buffer: IndexBuffer) -> GlResult<()> {
        context.check_bound_to(self)?;
        context.check_usable(&buffer)?;
        self.index_buffer = Some(buffer);
        Ok(())
    }

    pub fn set_no_index_buffer(&mut self) {
        self.index_buffer = None;
    }

    pub fn index_buffer(&self) -> Option<IndexBuffer> {
        self.index_buffer
    }

    /// Clear every attribute and the index buffer. Strict checking is kept.
    pub fn reset(&mut self) {
        self.attributes.iter_mut().for_each(|slot| *slot = None);
        self.index_buffer = None;
    }

    fn check_index(&self, index: u32) -> GlResult<()> {
        if index >= self.max_attributes() {
            return Err(GlError::range(
                "attribute index",
                format!("{} is not below {}", index, self.max_attributes()),
            ));
        }
        Ok(())
    }

    fn validate(
        &self,
        context: &Context,
        index: u32,
        buffer: ArrayBuffer,
        elements: u32,
        stride: i32,
        offset: u64,
    ) -> GlResult<()> {
        context.check_bound_to(self)?;
        self.check_index(index)?;
        if !(1..=4).contains(&elements) {
            return Err(GlError::range(
                "attribute elements",
                format!("{} is not in [1, 4]", elements),
            ));
        }
        if stride < 0 {
            return Err(GlError::range(
                "attribute stride",
                format!("{} is negative", stride),
            ));
        }
        context.check_usable(&buffer)?;

        let range = context.objects().get(&buffer).map(|storage| storage.range())?;
        if !range.is_some_and(|range| range.includes(offset)) {
            return Err(GlError::range(
                "attribute offset",
                match range {
                    Some(range) => format!("{} is outside of {} for {}", offset, range, buffer),
                    None => format!("{} is empty", buffer),
                },
            ));
        }

        if self.strict && self.attributes[index as usize].is_some() {
            return Err(GlError::AttributeAlreadyAssigned { index });
        }
        Ok(())
    }

    fn assign(&mut self, index: u32, attribute: VertexAttribute) {
        self.attributes[index as usize] = Some(attribute);
    }
}

impl ContextBound for ArrayObjectBuilder {
    fn owner(&self) -> ContextId {
        self.owner
    }

    fn sharing(&self) -> Sharing {
        Sharing::BoundToSingleContext
    }
}

impl fmt::Display for ArrayObjectBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ArrayObjectBuilder {}]", self.owner)
    }
}

/// Array object operations of one context.
pub struct ArrayObjects<'a> {
    context: &'a mut Context,
}

impl<'a> ArrayObjects<'a> {
    pub(crate) fn new(context: &'a mut Context) -> Self {
        Self { context }
    }

    pub fn new_builder(&self) -> GlResult<ArrayObjectBuilder> {
        self.context.check_live()?;
        let max = self.context.limits().max_vertex_attributes as usize;
        Ok(ArrayObjectBuilder::new(self.context.id(), vec![None; max]))
    }

    /// A builder holding the attributes and index buffer of an existing
    /// array object.
    pub fn new_builder_from_object(&self, array_object: &ArrayObject) -> GlResult<ArrayObjectBuilder> {
        self.context.check_usable(array_object)?;
        let objects = self.context.objects();
        let record = objects.get(array_object)?;
        let mut builder = ArrayObjectBuilder::new(self.context.id(), record.attributes.clone());
        builder.index_buffer = record.index_buffer;
        Ok(builder)
    }

    /// Create an array object from a snapshot of `builder` and bind it.
    ///
    /// Configuring the attributes binds each source buffer in turn, so no
    /// array buffer is bound afterwards.
    pub fn allocate(&mut self, builder: &ArrayObjectBuilder) -> GlResult<ArrayObject> {
        self.context.check_bound_to(builder)?;
        for attribute in builder.attributes.iter().flatten() {
            self.context.check_usable(&attribute.buffer())?;
        }
        if let Some(index_buffer) = &builder.index_buffer {
            self.context.check_usable(index_buffer)?;
        }

        let array_object = self.context.insert::<kind::ArrayObject>(ArrayObjectRecord {
            attributes: builder.attributes.clone(),
            index_buffer: None,
        });
        tracing::debug!(
            "allocate {} ({} attributes)",
            array_object,
            builder.attributes.iter().flatten().count()
        );

        self.set_bound(Some(array_object));
        set_array_object_index_buffer(
            &mut self.context.objects_mut(),
            &array_object,
            builder.index_buffer,
        )?;
        for attribute in builder.attributes.iter().flatten() {
            tracing::trace!("configure {} from {}", array_object, attribute.buffer());
        }
        if let Some(previous) = self.context.bindings.array_buffer.take() {
            tracing::trace!("bind {:?} -> None", previous);
        }
        Ok(array_object)
    }

    pub fn bind(&mut self, array_object: ArrayObject) -> GlResult<()> {
        self.context.check_usable(&array_object)?;
        if array_object == self.context.bindings.default_array_object {
            self.set_bound(None);
        } else {
            self.set_bound(Some(array_object));
        }
        Ok(())
    }

    /// Bind the default array object.
    pub fn unbind(&mut self) -> GlResult<()> {
        self.context.check_live()?;
        self.set_bound(None);
        Ok(())
    }

    fn set_bound(&mut self, array_object: Option<ArrayObject>) {
        let bound = &mut self.context.bindings.array_object;
        tracing::trace!("bind {:?} -> {:?}", bound, array_object);
        *bound = array_object;
    }

    /// The bound array object; the default array object if no other is bound.
    pub fn bound(&self) -> GlResult<ArrayObject> {
        self.context.check_live()?;
        Ok(self.context.bindings.current_array_object())
    }

    pub fn is_bound(&self, array_object: &ArrayObject) -> GlResult<bool> {
        self.context.check_usable(array_object)?;
        Ok(self.context.bindings.current_array_object() == *array_object)
    }

    pub fn default_array_object(&self) -> GlResult<ArrayObject> {
        self.context.check_live()?;
        Ok(self.context.bindings.default_array_object)
    }

    /// Delete an array object, binding the default array object if it was
    /// bound.
    pub fn delete(&mut self, array_object: ArrayObject) -> GlResult<()> {
        self.context.check_usable(&array_object)?;
        if array_object == self.context.bindings.default_array_object {
            return Err(GlError::ObjectNotDeletable {
                object: array_object.to_string(),
            });
        }
        if self.context.bindings.array_object == Some(array_object) {
            self.set_bound(None);
        }

        let mut objects = self.context.objects_mut();
        let record = objects.remove(&array_object)?;
        if let Some(index_buffer) = record.index_buffer
            && let Some(index_buffer) = objects.index_buffers.get_mut(index_buffer.slot())
        {
            index_buffer.forget_array_object(array_object.slot());
        }
        tracing::debug!("delete {}", array_object);
        Ok(())
    }

    pub fn attribute_at(
        &self,
        array_object: &ArrayObject,
        index: u32,
    ) -> GlResult<Option<VertexAttribute>> {
        self.context.check_usable(array_object)?;
        let objects = self.context.objects();
        let record = objects.get(array_object)?;
        if index as usize >= record.attributes.len() {
            return Err(GlError::range(
                "attribute index",
                format!("{} is not below {}", index, record.attributes.len()),
            ));
        }
        Ok(record.attributes[index as usize])
    }

    pub fn index_buffer(&self, array_object: &ArrayObject) -> GlResult<Option<IndexBuffer>> {
        self.context.check_usable(array_object)?;
        self.context
            .objects()
            .get(array_object)
            .map(|record| record.index_buffer)
    }
}
