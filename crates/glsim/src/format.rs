//! Pixel formats of textures and renderbuffers.

use bitflags::bitflags;

bitflags! {
    /// What a format may be used for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FormatCapabilities: u8 {
        /// May be attached as a framebuffer color attachment.
        const COLOR_RENDERABLE = 1 << 0;
        /// Has depth bits.
        const DEPTH_RENDERABLE = 1 << 1;
        /// Has stencil bits.
        const STENCIL_RENDERABLE = 1 << 2;
        /// May be sampled with linear filtering.
        const FILTERABLE = 1 << 3;
    }
}

/// Properties shared by every format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub bytes_per_pixel: u32,
    pub components: u32,
    pub depth_bits: u32,
    pub stencil_bits: u32,
    pub capabilities: FormatCapabilities,
}

impl FormatInfo {
    const fn color(bytes_per_pixel: u32, components: u32, filterable: bool) -> Self {
        let capabilities = if filterable {
            FormatCapabilities::COLOR_RENDERABLE.union(FormatCapabilities::FILTERABLE)
        } else {
            FormatCapabilities::COLOR_RENDERABLE
        };
        Self {
            bytes_per_pixel,
            components,
            depth_bits: 0,
            stencil_bits: 0,
            capabilities,
        }
    }

    const fn depth_stencil(bytes_per_pixel: u32, depth_bits: u32, stencil_bits: u32) -> Self {
        let mut capabilities = FormatCapabilities::empty();
        if depth_bits > 0 {
            capabilities = capabilities.union(FormatCapabilities::DEPTH_RENDERABLE);
        }
        if stencil_bits > 0 {
            capabilities = capabilities.union(FormatCapabilities::STENCIL_RENDERABLE);
        }
        Self {
            bytes_per_pixel,
            components: if depth_bits > 0 && stencil_bits > 0 { 2 } else { 1 },
            depth_bits,
            stencil_bits,
            capabilities,
        }
    }

    pub fn is_color_renderable(&self) -> bool {
        self.capabilities.contains(FormatCapabilities::COLOR_RENDERABLE)
    }

    /// Depth bits and no stencil bits.
    pub fn is_depth_only(&self) -> bool {
        self.depth_bits > 0 && self.stencil_bits == 0
    }

    /// Stencil bits and no depth bits.
    pub fn is_stencil_only(&self) -> bool {
        self.stencil_bits > 0 && self.depth_bits == 0
    }

    pub fn is_depth_stencil(&self) -> bool {
        self.depth_bits > 0 && self.stencil_bits > 0
    }
}

/// Sized texture formats of at most four bytes per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8,
    R8I,
    R8UI,
    R16F,
    R16I,
    R16UI,
    R32F,
    R32I,
    R32UI,
    Rg8,
    Rg8I,
    Rg8UI,
    Rg16F,
    Rg16I,
    Rg16UI,
    Rgb565,
    Rgb8,
    Rgba4,
    Rgb5A1,
    Rgba8,
    Rgba8I,
    Rgba8UI,
    Rgb10A2,
    R11fG11fB10f,
    Srgb8Alpha8,
    Depth16,
    Depth24,
    Depth32F,
    Depth24Stencil8,
}

impl TextureFormat {
    pub fn info(self) -> FormatInfo {
        use TextureFormat::*;
        match self {
            R8 => FormatInfo::color(1, 1, true),
            R8I | R8UI => FormatInfo::color(1, 1, false),
            R16F => FormatInfo::color(2, 1, true),
            R16I | R16UI => FormatInfo::color(2, 1, false),
            R32F | R32I | R32UI => FormatInfo::color(4, 1, false),
            Rg8 => FormatInfo::color(2, 2, true),
            Rg8I | Rg8UI => FormatInfo::color(2, 2, false),
            Rg16F => FormatInfo::color(4, 2, true),
            Rg16I | Rg16UI => FormatInfo::color(4, 2, false),
            Rgb565 => FormatInfo::color(2, 3, true),
            Rgb8 => FormatInfo::color(3, 3, true),
            Rgba4 | Rgb5A1 => FormatInfo::color(2, 4, true),
            Rgba8 | Rgb10A2 | Srgb8Alpha8 => FormatInfo::color(4, 4, true),
            Rgba8I | Rgba8UI => FormatInfo::color(4, 4, false),
            R11fG11fB10f => FormatInfo::color(4, 3, true),
            Depth16 => FormatInfo::depth_stencil(2, 16, 0),
            Depth24 => FormatInfo::depth_stencil(4, 24, 0),
            Depth32F => FormatInfo::depth_stencil(4, 32, 0),
            Depth24Stencil8 => FormatInfo::depth_stencil(4, 24, 8),
        }
    }

    pub fn bytes_per_pixel(self) -> u32 {
        self.info().bytes_per_pixel
    }

    pub fn depth_bits(self) -> u32 {
        self.info().depth_bits
    }

    pub fn stencil_bits(self) -> u32 {
        self.info().stencil_bits
    }

    pub fn capabilities(self) -> FormatCapabilities {
        self.info().capabilities
    }
}

/// Renderbuffer formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderbufferFormat {
    Rgb565,
    Rgba4,
    Rgb5A1,
    Rgb8,
    Rgba8,
    Depth16,
    Depth24,
    Depth32F,
    Depth24Stencil8,
    Stencil8,
}

impl RenderbufferFormat {
    pub fn info(self) -> FormatInfo {
        use RenderbufferFormat::*;
        match self {
            Rgb565 => FormatInfo::color(2, 3, false),
            Rgba4 | Rgb5A1 => FormatInfo::color(2, 4, false),
            Rgb8 => FormatInfo::color(3, 3, false),
            Rgba8 => FormatInfo::color(4, 4, false),
            Depth16 => FormatInfo::depth_stencil(2, 16, 0),
            Depth24 => FormatInfo::depth_stencil(4, 24, 0),
            Depth32F => FormatInfo::depth_stencil(4, 32, 0),
            Depth24Stencil8 => FormatInfo::depth_stencil(4, 24, 8),
            Stencil8 => FormatInfo::depth_stencil(1, 0, 8),
        }
    }

    pub fn depth_bits(self) -> u32 {
        self.info().depth_bits
    }

    pub fn stencil_bits(self) -> u32 {
        self.info().stencil_bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_formats_fit_in_four_bytes() {
        use TextureFormat::*;
        for format in [R8, Rg16F, Rgb8, Rgba8, Depth16, Depth24Stencil8] {
            assert!((1..=4).contains(&format.bytes_per_pixel()));
        }
    }

    #[test]
    fn test_depth_stencil_classification() {
        let info = TextureFormat::Depth24Stencil8.info();
        assert!(info.is_depth_stencil());
        assert!(!info.is_depth_only());
        assert!(!info.is_color_renderable());

        assert!(TextureFormat::Depth32F.info().is_depth_only());
        assert!(RenderbufferFormat::Stencil8.info().is_stencil_only());
        assert!(
            RenderbufferFormat::Depth24Stencil8
                .info()
                .capabilities
                .contains(FormatCapabilities::DEPTH_RENDERABLE | FormatCapabilities::STENCIL_RENDERABLE)
        );
    }

    #[test]
    fn test_color_formats() {
        assert!(TextureFormat::Rgba8.info().is_color_renderable());
        assert!(!TextureFormat::Rgba8I.capabilities().contains(FormatCapabilities::FILTERABLE));
        assert_eq!(RenderbufferFormat::Rgba8.depth_bits(), 0);
    }
}
