//! Texture units, 2D textures and cube map textures.
//!
//! Each unit caches one bound texture per dimensionality. Binding a texture
//! that the bound draw framebuffer renders into is rejected as a feedback
//! loop, and deleting a texture unbinds it from every unit of the deleting
//! context and detaches it from every framebuffer.

use crate::context::Context;
use crate::error::{GlError, GlResult};
use crate::format::TextureFormat;
use crate::framebuffer::{Attachment, FramebufferRecord, detach_from_framebuffers};
use crate::object::{Texture2D, TextureCube, TextureUnit, kind};
use glsim_core::alloc::{HashSet, Slot};
use glsim_core::geometry::{Area, Size};
use glsim_core::profiling::profile_function;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeMapFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeMapFace {
    pub const ALL: [CubeMapFace; 6] = [
        CubeMapFace::PositiveX,
        CubeMapFace::NegativeX,
        CubeMapFace::PositiveY,
        CubeMapFace::NegativeY,
        CubeMapFace::PositiveZ,
        CubeMapFace::NegativeZ,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureWrap {
    #[default]
    Repeat,
    ClampToEdge,
    MirroredRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureMinFilter {
    Nearest,
    #[default]
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl TextureMinFilter {
    pub fn uses_mipmaps(self) -> bool {
        !matches!(self, TextureMinFilter::Nearest | TextureMinFilter::Linear)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureMagFilter {
    Nearest,
    #[default]
    Linear,
}

/// Parameters of a 2D texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture2DDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
    pub min_filter: TextureMinFilter,
    pub mag_filter: TextureMagFilter,
}

impl Texture2DDescriptor {
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            wrap_s: TextureWrap::default(),
            wrap_t: TextureWrap::default(),
            min_filter: TextureMinFilter::default(),
            mag_filter: TextureMagFilter::default(),
        }
    }

    pub fn size(&self) -> Size<u32> {
        Size::new(self.width, self.height)
    }
}

/// Parameters of a cube map texture. Every face is `size` x `size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureCubeDescriptor {
    pub size: u32,
    pub format: TextureFormat,
    pub wrap_r: TextureWrap,
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
    pub min_filter: TextureMinFilter,
    pub mag_filter: TextureMagFilter,
}

impl TextureCubeDescriptor {
    pub fn new(size: u32, format: TextureFormat) -> Self {
        Self {
            size,
            format,
            wrap_r: TextureWrap::ClampToEdge,
            wrap_s: TextureWrap::ClampToEdge,
            wrap_t: TextureWrap::ClampToEdge,
            min_filter: TextureMinFilter::default(),
            mag_filter: TextureMagFilter::default(),
        }
    }
}

/// Row-major texel data for an area of a 2D texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture2DUpdate {
    pub texture: Texture2D,
    pub area: Area,
    pub data: Vec<u8>,
}

impl Texture2DUpdate {
    pub fn new(texture: Texture2D, area: Area, data: impl Into<Vec<u8>>) -> Self {
        Self {
            texture,
            area,
            data: data.into(),
        }
    }
}

/// Row-major texel data for an area of one face of a cube map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureCubeUpdate {
    pub texture: TextureCube,
    pub face: CubeMapFace,
    pub area: Area,
    pub data: Vec<u8>,
}

impl TextureCubeUpdate {
    pub fn new(texture: TextureCube, face: CubeMapFace, area: Area, data: impl Into<Vec<u8>>) -> Self {
        Self {
            texture,
            face,
            area,
            data: data.into(),
        }
    }
}

pub(crate) struct Texture2DRecord {
    pub(crate) descriptor: Texture2DDescriptor,
    data: Vec<u8>,
    pub(crate) referring_framebuffers: HashSet<Slot>,
}

pub(crate) struct TextureCubeRecord {
    pub(crate) descriptor: TextureCubeDescriptor,
    faces: [Vec<u8>; 6],
    pub(crate) referring_framebuffers: HashSet<Slot>,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct UnitBinding {
    texture_2d: Option<Texture2D>,
    texture_cube: Option<TextureCube>,
}

impl UnitBinding {
    pub(crate) fn texture_2d(&self) -> Option<Texture2D> {
        self.texture_2d
    }

    pub(crate) fn texture_cube(&self) -> Option<TextureCube> {
        self.texture_cube
    }
}

fn check_dimension(what: &'static str, value: u32, max: u32) -> GlResult<()> {
    if !(2..=max).contains(&value) {
        return Err(GlError::range(what, format!("{} is not in [2, {}]", value, max)));
    }
    Ok(())
}

fn check_texel_data(bounds: Size<u32>, area: &Area, format: TextureFormat, data: &[u8]) -> GlResult<()> {
    if !bounds.area().contains(area) {
        return Err(GlError::range(
            "texture update area",
            format!(
                "{:?} is not inside a {}x{} texture",
                area, bounds.width, bounds.height
            ),
        ));
    }
    let expected = area.texel_count() * format.bytes_per_pixel() as u64;
    if data.len() as u64 != expected {
        return Err(GlError::range(
            "texture update data",
            format!("expected {} bytes, got {}", expected, data.len()),
        ));
    }
    Ok(())
}

/// Copy row-major `source` texels into `area` of a texture `target_width`
/// texels wide.
fn copy_texels(bytes_per_pixel: u32, target_width: u32, area: &Area, source: &[u8], target: &mut [u8]) {
    profile_function!();
    let bytes_per_pixel = bytes_per_pixel as usize;
    let row = area.width as usize * bytes_per_pixel;
    for y in 0..area.height as usize {
        let from = y * row;
        let to = ((area.y as usize + y) * target_width as usize + area.x as usize) * bytes_per_pixel;
        target[to..to + row].copy_from_slice(&source[from..from + row]);
    }
}

/// Texture operations of one context.
pub struct Textures<'a> {
    context: &'a mut Context,
}

impl<'a> Textures<'a> {
    pub(crate) fn new(context: &'a mut Context) -> Self {
        Self { context }
    }

    /// Every texture unit of the context, after soft restrictions.
    pub fn texture_units(&self) -> GlResult<Vec<TextureUnit>> {
        self.context.check_live()?;
        let id = self.context.id();
        Ok((0..self.context.bindings.units.len() as u32)
            .map(|index| TextureUnit::new(id, index))
            .collect())
    }

    fn check_unit(&self, unit: &TextureUnit) -> GlResult<()> {
        self.context.check_bound_to(unit)?;
        let count = self.context.bindings.units.len() as u32;
        if unit.index() >= count {
            return Err(GlError::range(
                "texture unit",
                format!("{} is not below {}", unit.index(), count),
            ));
        }
        Ok(())
    }

    fn unit(&self, unit: &TextureUnit) -> &UnitBinding {
        &self.context.bindings.units[unit.index() as usize]
    }

    fn unit_mut(&mut self, unit: &TextureUnit) -> &mut UnitBinding {
        &mut self.context.bindings.units[unit.index() as usize]
    }

    fn check_feedback(&self, references: impl Fn(&FramebufferRecord) -> bool, texture: String) -> GlResult<()> {
        let Some(framebuffer) = self.context.bindings.draw_framebuffer else {
            return Ok(());
        };
        let objects = self.context.objects();
        if objects.get(&framebuffer).is_ok_and(references) {
            return Err(GlError::FeedbackLoop {
                framebuffer: framebuffer.to_string(),
                texture,
            });
        }
        Ok(())
    }

    pub fn texture_2d_allocate(
        &mut self,
        unit: TextureUnit,
        descriptor: &Texture2DDescriptor,
    ) -> GlResult<Texture2D> {
        self.check_unit(&unit)?;
        let max = self.context.limits().max_texture_size;
        check_dimension("texture width", descriptor.width, max)?;
        check_dimension("texture height", descriptor.height, max)?;

        let size = descriptor.size().area().texel_count() * descriptor.format.bytes_per_pixel() as u64;
        let texture = self.context.insert::<kind::Texture2D>(Texture2DRecord {
            descriptor: *descriptor,
            data: vec![0; size as usize],
            referring_framebuffers: HashSet::default(),
        });
        tracing::debug!(
            "allocate {} ({}x{} {:?})",
            texture,
            descriptor.width,
            descriptor.height,
            descriptor.format
        );
        self.set_bound_2d(&unit, Some(texture));
        Ok(texture)
    }

    pub fn texture_2d_bind(&mut self, unit: TextureUnit, texture: Texture2D) -> GlResult<()> {
        self.check_unit(&unit)?;
        self.context.check_usable(&texture)?;
        self.check_feedback(
            |framebuffer| framebuffer.references_texture_2d(&texture),
            texture.to_string(),
        )?;
        self.set_bound_2d(&unit, Some(texture));
        Ok(())
    }

    fn set_bound_2d(&mut self, unit: &TextureUnit, texture: Option<Texture2D>) {
        let binding = self.unit_mut(unit);
        tracing::trace!("bind {:?} -> {:?} on {}", binding.texture_2d, texture, unit);
        binding.texture_2d = texture;
    }

    /// Write texels into a 2D texture, binding it to `unit` first.
    pub fn texture_2d_update(&mut self, unit: TextureUnit, update: &Texture2DUpdate) -> GlResult<()> {
        profile_function!();
        let texture = update.texture;
        self.check_unit(&unit)?;
        self.context.check_usable(&texture)?;
        {
            let objects = self.context.objects();
            let record = objects.get(&texture)?;
            check_texel_data(
                record.descriptor.size(),
                &update.area,
                record.descriptor.format,
                &update.data,
            )?;
        }
        self.texture_2d_bind(unit, texture)?;

        let mut objects = self.context.objects_mut();
        let record = objects.get_mut(&texture)?;
        copy_texels(
            record.descriptor.format.bytes_per_pixel(),
            record.descriptor.width,
            &update.area,
            &update.data,
            &mut record.data,
        );
        tracing::trace!("update {} {:?}", texture, update.area);
        Ok(())
    }

    /// A copy of the texels of a 2D texture, row-major.
    pub fn texture_2d_get_image(&self, texture: &Texture2D) -> GlResult<Vec<u8>> {
        self.context.check_usable(texture)?;
        self.context
            .objects()
            .get(texture)
            .map(|record| record.data.clone())
    }

    pub fn texture_2d_descriptor(&self, texture: &Texture2D) -> GlResult<Texture2DDescriptor> {
        self.context.check_usable(texture)?;
        self.context
            .objects()
            .get(texture)
            .map(|record| record.descriptor)
    }

    /// Regenerate the mipmaps of the 2D texture bound to `unit`.
    pub fn texture_2d_regenerate_mipmaps(&mut self, unit: TextureUnit) -> GlResult<()> {
        self.check_unit(&unit)?;
        match self.unit_bound_2d(unit)? {
            Some(texture) => {
                tracing::trace!("regenerate mipmaps of {}", texture);
                Ok(())
            }
            None => Err(GlError::TextureNotBound {
                kind: "Texture2D",
                unit: unit.index(),
            }),
        }
    }

    pub fn texture_2d_is_bound(&self, unit: TextureUnit, texture: &Texture2D) -> GlResult<bool> {
        self.check_unit(&unit)?;
        self.context.check_usable(texture)?;
        Ok(self.unit(&unit).texture_2d == Some(*texture))
    }

    pub fn texture_2d_is_bound_anywhere(&self, texture: &Texture2D) -> GlResult<bool> {
        self.context.check_usable(texture)?;
        Ok(is_texture_2d_bound_anywhere(&self.context.bindings.units, texture))
    }

    /// Delete a 2D texture, unbinding it from every unit and detaching it
    /// from every framebuffer.
    pub fn texture_2d_delete(&mut self, texture: Texture2D) -> GlResult<()> {
        self.context.check_usable(&texture)?;
        for binding in self.context.bindings.units.iter_mut() {
            if binding.texture_2d == Some(texture) {
                binding.texture_2d = None;
            }
        }

        let mut objects = self.context.objects_mut();
        let record = objects.remove(&texture)?;
        detach_from_framebuffers(
            &mut objects,
            &record.referring_framebuffers,
            |attachment| matches!(attachment, Attachment::Texture2D(attached) if *attached == texture),
        );
        tracing::debug!("delete {}", texture);
        Ok(())
    }

    pub fn texture_cube_allocate(
        &mut self,
        unit: TextureUnit,
        descriptor: &TextureCubeDescriptor,
    ) -> GlResult<TextureCube> {
        self.check_unit(&unit)?;
        check_dimension("cube texture size", descriptor.size, self.context.limits().max_texture_size)?;

        let face_size = descriptor.size as usize
            * descriptor.size as usize
            * descriptor.format.bytes_per_pixel() as usize;
        let texture = self.context.insert::<kind::TextureCube>(TextureCubeRecord {
            descriptor: *descriptor,
            faces: std::array::from_fn(|_| vec![0; face_size]),
            referring_framebuffers: HashSet::default(),
        });
        tracing::debug!(
            "allocate {} ({}x{} {:?})",
            texture,
            descriptor.size,
            descriptor.size,
            descriptor.format
        );
        self.set_bound_cube(&unit, Some(texture));
        Ok(texture)
    }

    pub fn texture_cube_bind(&mut self, unit: TextureUnit, texture: TextureCube) -> GlResult<()> {
        self.check_unit(&unit)?;
        self.context.check_usable(&texture)?;
        self.check_feedback(
            |framebuffer| framebuffer.references_texture_cube(&texture),
            texture.to_string(),
        )?;
        self.set_bound_cube(&unit, Some(texture));
        Ok(())
    }

    fn set_bound_cube(&mut self, unit: &TextureUnit, texture: Option<TextureCube>) {
        let binding = self.unit_mut(unit);
        tracing::trace!("bind {:?} -> {:?} on {}", binding.texture_cube, texture, unit);
        binding.texture_cube = texture;
    }

    /// Write texels into one face of a cube map, binding it to `unit` first.
    pub fn texture_cube_update(&mut self, unit: TextureUnit, update: &TextureCubeUpdate) -> GlResult<()> {
        profile_function!();
        let texture = update.texture;
        self.check_unit(&unit)?;
        self.context.check_usable(&texture)?;
        {
            let objects = self.context.objects();
            let record = objects.get(&texture)?;
            let size = record.descriptor.size;
            check_texel_data(
                Size::new(size, size),
                &update.area,
                record.descriptor.format,
                &update.data,
            )?;
        }
        self.texture_cube_bind(unit, texture)?;

        let mut objects = self.context.objects_mut();
        let record = objects.get_mut(&texture)?;
        copy_texels(
            record.descriptor.format.bytes_per_pixel(),
            record.descriptor.size,
            &update.area,
            &update.data,
            &mut record.faces[update.face.index()],
        );
        tracing::trace!("update {} {:?} {:?}", texture, update.face, update.area);
        Ok(())
    }

    pub fn texture_cube_get_image(&self, texture: &TextureCube, face: CubeMapFace) -> GlResult<Vec<u8>> {
        self.context.check_usable(texture)?;
        self.context
            .objects()
            .get(texture)
            .map(|record| record.faces[face.index()].clone())
    }

    pub fn texture_cube_descriptor(&self, texture: &TextureCube) -> GlResult<TextureCubeDescriptor> {
        self.context.check_usable(texture)?;
        self.context
            .objects()
            .get(texture)
            .map(|record| record.descriptor)
    }

    pub fn texture_cube_regenerate_mipmaps(&mut self, unit: TextureUnit) -> GlResult<()> {
        self.check_unit(&unit)?;
        match self.unit_bound_cube(unit)? {
            Some(texture) => {
                tracing::trace!("regenerate mipmaps of {}", texture);
                Ok(())
            }
            None => Err(GlError::TextureNotBound {
                kind: "TextureCube",
                unit: unit.index(),
            }),
        }
    }

    pub fn texture_cube_is_bound(&self, unit: TextureUnit, texture: &TextureCube) -> GlResult<bool> {
        self.check_unit(&unit)?;
        self.context.check_usable(texture)?;
        Ok(self.unit(&unit).texture_cube == Some(*texture))
    }

    pub fn texture_cube_is_bound_anywhere(&self, texture: &TextureCube) -> GlResult<bool> {
        self.context.check_usable(texture)?;
        Ok(is_texture_cube_bound_anywhere(&self.context.bindings.units, texture))
    }

    pub fn texture_cube_delete(&mut self, texture: TextureCube) -> GlResult<()> {
        self.context.check_usable(&texture)?;
        for binding in self.context.bindings.units.iter_mut() {
            if binding.texture_cube == Some(texture) {
                binding.texture_cube = None;
            }
        }

        let mut objects = self.context.objects_mut();
        let record = objects.remove(&texture)?;
        detach_from_framebuffers(
            &mut objects,
            &record.referring_framebuffers,
            |attachment| matches!(attachment, Attachment::TextureCubeFace(attached, _) if *attached == texture),
        );
        tracing::debug!("delete {}", texture);
        Ok(())
    }

    /// Unbind every texture from `unit`.
    pub fn unit_unbind(&mut self, unit: TextureUnit) -> GlResult<()> {
        self.check_unit(&unit)?;
        self.set_bound_2d(&unit, None);
        self.set_bound_cube(&unit, None);
        Ok(())
    }

    pub fn unit_is_bound(&self, unit: TextureUnit) -> GlResult<bool> {
        Ok(self.unit_bound_2d(unit)?.is_some() || self.unit_bound_cube(unit)?.is_some())
    }

    pub fn unit_bound_2d(&self, unit: TextureUnit) -> GlResult<Option<Texture2D>> {
        self.check_unit(&unit)?;
        Ok(self
            .unit(&unit)
            .texture_2d
            .filter(|texture| self.context.is_live(texture)))
    }

    pub fn unit_bound_cube(&self, unit: TextureUnit) -> GlResult<Option<TextureCube>> {
        self.check_unit(&unit)?;
        Ok(self
            .unit(&unit)
            .texture_cube
            .filter(|texture| self.context.is_live(texture)))
    }
}

pub(crate) fn is_texture_2d_bound_anywhere(units: &[UnitBinding], texture: &Texture2D) -> bool {
    units.iter().any(|unit| unit.texture_2d() == Some(*texture))
}

pub(crate) fn is_texture_cube_bound_anywhere(units: &[UnitBinding], texture: &TextureCube) -> bool {
    units.iter().any(|unit| unit.texture_cube() == Some(*texture))
}
