/// Texture and sampler traits, texture descriptor, decoded-image input

/// Texture pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    /// 24-bit RGB; rejected by many devices, triggers the fallback path
    R8G8B8_UNORM,
    D16_UNORM,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
}

impl TextureFormat {
    /// Bytes per pixel for color formats (used to re-pack fallback uploads)
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8G8B8_UNORM => 3,
            TextureFormat::D16_UNORM => 2,
            TextureFormat::D32_FLOAT => 4,
            TextureFormat::D24_UNORM_S8_UINT => 4,
            _ => 4,
        }
    }

    /// Whether this is a depth (or depth/stencil) format
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::D16_UNORM | TextureFormat::D32_FLOAT | TextureFormat::D24_UNORM_S8_UINT
        )
    }
}

/// Texture usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    /// Texture can be sampled in shaders
    Sampled,
    /// Texture can be used as a color render target
    RenderTarget,
    /// Texture can be used as depth attachment only
    DepthStencil,
    /// Depth attachment that is also sampled in shaders (shadow maps)
    DepthStencilSampled,
}

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
    /// Optional initial pixel data, uploaded via an internal staging buffer
    /// before the call returns (synchronous, waits for the copy queue)
    pub data: Option<Vec<u8>>,
}

/// Read-only properties of a created texture.
///
/// Returned by `Texture::info()` to query texture properties
/// without exposing backend-specific details.
#[derive(Debug, Clone)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
}

/// Texture resource trait
///
/// Implemented by backend-specific texture types (e.g., VulkanTexture).
/// The texture is automatically destroyed when dropped.
pub trait Texture: Send + Sync {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;
}

// ===== DECODED IMAGE =====

/// Pixel data handed over by the image-decoding collaborator.
///
/// This layer never touches image files; a decoder (stb-style, `image`
/// crate, procedural generator, ...) produces one of these.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Raw pixel bytes, tightly packed rows
    pub pixels: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Source pixel format
    pub format: TextureFormat,
}

// ===== SAMPLER =====

/// Texture filtering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Texture addressing mode outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Repeat,
    ClampToEdge,
    ClampToBorder,
}

/// Descriptor for creating a sampler
#[derive(Debug, Clone, Copy)]
pub struct SamplerDesc {
    /// Magnification/minification filter
    pub filter: FilterMode,
    /// Addressing mode for all axes
    pub address_mode: AddressMode,
    /// Enable depth-compare sampling (shadow maps)
    pub compare_enable: bool,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            filter: FilterMode::Linear,
            address_mode: AddressMode::Repeat,
            compare_enable: false,
        }
    }
}

/// Sampler resource trait
///
/// Destroyed when dropped.
pub trait Sampler: Send + Sync {}
