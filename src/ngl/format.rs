//! Pixel, vertex and index formats plus the sampling parameters of textures.

/// Data formats shared by textures, vertex attributes and index buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    Undefined,
    R8Uint,
    R8G8Uint,
    R8G8B8Uint,
    R8G8B8A8Uint,
    R10G10B10A2Uint,
    R8Unorm,
    R8G8Unorm,
    R8G8B8Unorm,
    R8G8B8UnormSrgb,
    R8G8B8A8Unorm,
    R8G8B8A8UnormSrgb,
    R10G10B10A2Unorm,
    R16Uint,
    R32Uint,
    R32Float,
    R16Float,
    R32G32Float,
    R32G32B32Float,
    R32G32B32A32Float,
    R16G16Float,
    R16G16B16Float,
    R16G16B16A16Float,
    R11G11B10Float,
    D16Unorm,
    D24Unorm,
    D32Unorm,
    R9G9B9E5SharedExp,
    R8G8B8Etc2Unorm,
    R8G8B8Etc2UnormSrgb,
    R8G8B8A1Etc2Unorm,
    R8G8B8A1Etc2UnormSrgb,
    R8G8B8A8Etc2Unorm,
    R8G8B8A8Etc2UnormSrgb,
    R8G8B8Dxt1Unorm,
    R8G8B8A1Dxt1Unorm,
    R8G8B8Dxt1UnormSrgb,
    R8G8B8A1Dxt1UnormSrgb,
    R8G8B8A8Dxt5Unorm,
    R8G8B8A8Dxt5UnormSrgb,
    R8G8B8A8Astc4x4Unorm,
    R8G8B8A8Astc4x4UnormSrgb,
    R8G8B8A8Astc6x6Unorm,
    R8G8B8A8Astc6x6UnormSrgb,
}

impl Default for Format {
    fn default() -> Self {
        Format::Undefined
    }
}

impl Format {
    /// Returns true if this is a depth format.
    pub fn is_depth(self) -> bool {
        match self {
            Format::D16Unorm | Format::D24Unorm | Format::D32Unorm => true,
            _ => false,
        }
    }

    /// Returns true if this is a block compressed format.
    pub fn is_compressed(self) -> bool {
        match self {
            Format::R8G8B8Etc2Unorm
            | Format::R8G8B8Etc2UnormSrgb
            | Format::R8G8B8A1Etc2Unorm
            | Format::R8G8B8A1Etc2UnormSrgb
            | Format::R8G8B8A8Etc2Unorm
            | Format::R8G8B8A8Etc2UnormSrgb
            | Format::R8G8B8Dxt1Unorm
            | Format::R8G8B8A1Dxt1Unorm
            | Format::R8G8B8Dxt1UnormSrgb
            | Format::R8G8B8A1Dxt1UnormSrgb
            | Format::R8G8B8A8Dxt5Unorm
            | Format::R8G8B8A8Dxt5UnormSrgb
            | Format::R8G8B8A8Astc4x4Unorm
            | Format::R8G8B8A8Astc4x4UnormSrgb
            | Format::R8G8B8A8Astc6x6Unorm
            | Format::R8G8B8A8Astc6x6UnormSrgb => true,
            _ => false,
        }
    }

    /// Returns the number of components of a vertex attribute in this format.
    pub fn components(self) -> Option<u32> {
        match self {
            Format::R32Float | Format::R8Uint => Some(1),
            Format::R32G32Float | Format::R8G8Uint => Some(2),
            Format::R32G32B32Float | Format::R8G8B8Uint => Some(3),
            Format::R32G32B32A32Float | Format::R8G8B8A8Uint => Some(4),
            _ => None,
        }
    }

    /// Returns the size in bytes of a single index in this format.
    pub fn index_stride(self) -> Option<u32> {
        match self {
            Format::R16Uint => Some(2),
            Format::R32Uint => Some(4),
            _ => None,
        }
    }
}

/// The kind of storage backing a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureType {
    Texture2D,
    Cube,
    Texture2DArray,
    Renderbuffer,
}

impl Default for TextureType {
    fn default() -> Self {
        TextureType::Texture2D
    }
}

impl TextureType {
    /// Number of faces addressed by subresources of this type.
    #[inline]
    pub fn faces(self) -> u32 {
        match self {
            TextureType::Cube => 6,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFilter {
    Nearest,
    Linear,
    NearestMipmapped,
    LinearMipmapped,
    Aniso4,
}

impl Default for TextureFilter {
    fn default() -> Self {
        TextureFilter::Nearest
    }
}

impl TextureFilter {
    #[inline]
    pub fn is_mipmapped(self) -> bool {
        match self {
            TextureFilter::Nearest | TextureFilter::Linear => false,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureWrap {
    RepeatAll,
    ClampAll,
}

impl Default for TextureWrap {
    fn default() -> Self {
        TextureWrap::RepeatAll
    }
}
