use gl::types::*;

use crate::ngl::format::{Format, TextureFilter, TextureType, TextureWrap};
use crate::ngl::shader::{ShaderStage, UniformFormat};
use crate::ngl::state::{BlendFunc, CullMode, DepthFunc, PrimitiveType};

pub const TEXTURE_MAX_ANISOTROPY_EXT: GLenum = 0x84FE;

pub const COMPRESSED_RGB_S3TC_DXT1_EXT: GLenum = 0x83F0;
pub const COMPRESSED_RGBA_S3TC_DXT1_EXT: GLenum = 0x83F1;
pub const COMPRESSED_RGBA_S3TC_DXT5_EXT: GLenum = 0x83F3;
pub const COMPRESSED_SRGB_S3TC_DXT1_EXT: GLenum = 0x8C4C;
pub const COMPRESSED_SRGB_ALPHA_S3TC_DXT1_EXT: GLenum = 0x8C4D;
pub const COMPRESSED_SRGB_ALPHA_S3TC_DXT5_EXT: GLenum = 0x8C4F;
pub const COMPRESSED_RGBA_ASTC_4X4_KHR: GLenum = 0x93B0;
pub const COMPRESSED_RGBA_ASTC_6X6_KHR: GLenum = 0x93B4;
pub const COMPRESSED_SRGB8_ALPHA8_ASTC_4X4_KHR: GLenum = 0x93D0;
pub const COMPRESSED_SRGB8_ALPHA8_ASTC_6X6_KHR: GLenum = 0x93D4;

/// The GL description of a texture format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureFormat {
    pub internal: GLenum,
    pub format: GLenum,
    pub ty: GLenum,
    pub compressed: bool,
    /// False for depth formats.
    pub color: bool,
}

impl TextureFormat {
    fn color(internal: GLenum, format: GLenum, ty: GLenum) -> Self {
        TextureFormat {
            internal,
            format,
            ty,
            compressed: false,
            color: true,
        }
    }

    fn depth(internal: GLenum, ty: GLenum) -> Self {
        TextureFormat {
            internal,
            format: gl::DEPTH_COMPONENT,
            ty,
            compressed: false,
            color: false,
        }
    }

    fn compressed(internal: GLenum, format: GLenum) -> Self {
        TextureFormat {
            internal,
            format,
            ty: gl::UNSIGNED_BYTE,
            compressed: true,
            color: true,
        }
    }

    /// Returns the number of bytes `glTexSubImage*` reads for a surface with
    /// `extent`. Compressed uploads pass their size explicitly, so `None` is
    /// returned for them.
    pub fn surface_size(&self, extent: [GLsizei; 2]) -> Option<usize> {
        if self.compressed {
            return None;
        }

        let components = match self.format {
            gl::RED | gl::DEPTH_COMPONENT => 1,
            gl::RG => 2,
            gl::RGB => 3,
            _ => 4,
        };

        let bpp = match self.ty {
            gl::UNSIGNED_BYTE => components,
            gl::UNSIGNED_SHORT => components * 2,
            gl::UNSIGNED_INT_2_10_10_10_REV | gl::UNSIGNED_INT_5_9_9_9_REV => 4,
            _ => components * 4,
        };

        Some(extent[0].max(0) as usize * extent[1].max(0) as usize * bpp)
    }
}

pub fn texture_format(format: Format) -> Option<TextureFormat> {
    let v = match format {
        Format::R8Unorm => TextureFormat::color(gl::R8, gl::RED, gl::UNSIGNED_BYTE),
        Format::R8G8Unorm => TextureFormat::color(gl::RG8, gl::RG, gl::UNSIGNED_BYTE),
        Format::R8G8B8Unorm => TextureFormat::color(gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
        Format::R8G8B8UnormSrgb => TextureFormat::color(gl::SRGB8, gl::RGB, gl::UNSIGNED_BYTE),
        Format::R8G8B8A8Unorm => TextureFormat::color(gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
        Format::R8G8B8A8UnormSrgb => {
            TextureFormat::color(gl::SRGB8_ALPHA8, gl::RGBA, gl::UNSIGNED_BYTE)
        }
        Format::R8G8B8A8Uint => {
            TextureFormat::color(gl::RGBA8UI, gl::RGBA_INTEGER, gl::UNSIGNED_BYTE)
        }
        Format::R10G10B10A2Unorm => {
            TextureFormat::color(gl::RGB10_A2, gl::RGBA, gl::UNSIGNED_INT_2_10_10_10_REV)
        }
        Format::R32Float => TextureFormat::color(gl::R32F, gl::RED, gl::FLOAT),
        Format::R16Float => TextureFormat::color(gl::R16F, gl::RED, gl::FLOAT),
        Format::R16G16Float => TextureFormat::color(gl::RG16F, gl::RG, gl::FLOAT),
        Format::R16G16B16Float => TextureFormat::color(gl::RGB16F, gl::RGB, gl::FLOAT),
        Format::R16G16B16A16Float => TextureFormat::color(gl::RGBA16F, gl::RGBA, gl::FLOAT),
        Format::R32G32B32Float => TextureFormat::color(gl::RGB32F, gl::RGB, gl::FLOAT),
        Format::R32G32B32A32Float => TextureFormat::color(gl::RGBA32F, gl::RGBA, gl::FLOAT),
        Format::R11G11B10Float => TextureFormat::color(gl::R11F_G11F_B10F, gl::RGB, gl::FLOAT),
        Format::R9G9B9E5SharedExp => {
            TextureFormat::color(gl::RGB9_E5, gl::RGB, gl::UNSIGNED_INT_5_9_9_9_REV)
        }
        Format::D16Unorm => TextureFormat::depth(gl::DEPTH_COMPONENT16, gl::UNSIGNED_SHORT),
        Format::D24Unorm => TextureFormat::depth(gl::DEPTH_COMPONENT24, gl::UNSIGNED_INT),
        Format::D32Unorm => TextureFormat::depth(gl::DEPTH_COMPONENT32, gl::UNSIGNED_INT),
        Format::R8G8B8Etc2Unorm => TextureFormat::compressed(gl::COMPRESSED_RGB8_ETC2, gl::RGB),
        Format::R8G8B8Etc2UnormSrgb => {
            TextureFormat::compressed(gl::COMPRESSED_SRGB8_ETC2, gl::RGB)
        }
        Format::R8G8B8A1Etc2Unorm => {
            TextureFormat::compressed(gl::COMPRESSED_RGB8_PUNCHTHROUGH_ALPHA1_ETC2, gl::RGBA)
        }
        Format::R8G8B8A1Etc2UnormSrgb => {
            TextureFormat::compressed(gl::COMPRESSED_SRGB8_PUNCHTHROUGH_ALPHA1_ETC2, gl::RGBA)
        }
        Format::R8G8B8A8Etc2Unorm => {
            TextureFormat::compressed(gl::COMPRESSED_RGBA8_ETC2_EAC, gl::RGBA)
        }
        Format::R8G8B8A8Etc2UnormSrgb => {
            TextureFormat::compressed(gl::COMPRESSED_SRGB8_ALPHA8_ETC2_EAC, gl::RGBA)
        }
        Format::R8G8B8Dxt1Unorm => TextureFormat::compressed(COMPRESSED_RGB_S3TC_DXT1_EXT, gl::RGB),
        Format::R8G8B8A1Dxt1Unorm => {
            TextureFormat::compressed(COMPRESSED_RGBA_S3TC_DXT1_EXT, gl::RGBA)
        }
        Format::R8G8B8Dxt1UnormSrgb => {
            TextureFormat::compressed(COMPRESSED_SRGB_S3TC_DXT1_EXT, gl::RGB)
        }
        Format::R8G8B8A1Dxt1UnormSrgb => {
            TextureFormat::compressed(COMPRESSED_SRGB_ALPHA_S3TC_DXT1_EXT, gl::RGBA)
        }
        Format::R8G8B8A8Dxt5Unorm => {
            TextureFormat::compressed(COMPRESSED_RGBA_S3TC_DXT5_EXT, gl::RGBA)
        }
        Format::R8G8B8A8Dxt5UnormSrgb => {
            TextureFormat::compressed(COMPRESSED_SRGB_ALPHA_S3TC_DXT5_EXT, gl::RGBA)
        }
        Format::R8G8B8A8Astc4x4Unorm => {
            TextureFormat::compressed(COMPRESSED_RGBA_ASTC_4X4_KHR, gl::RGBA)
        }
        Format::R8G8B8A8Astc4x4UnormSrgb => {
            TextureFormat::compressed(COMPRESSED_SRGB8_ALPHA8_ASTC_4X4_KHR, gl::RGBA)
        }
        Format::R8G8B8A8Astc6x6Unorm => {
            TextureFormat::compressed(COMPRESSED_RGBA_ASTC_6X6_KHR, gl::RGBA)
        }
        Format::R8G8B8A8Astc6x6UnormSrgb => {
            TextureFormat::compressed(COMPRESSED_SRGB8_ALPHA8_ASTC_6X6_KHR, gl::RGBA)
        }
        _ => return None,
    };

    Some(v)
}

/// The internal formats a renderbuffer could be created with.
pub fn renderbuffer_format(format: Format) -> Option<GLenum> {
    match format {
        Format::D16Unorm => Some(gl::DEPTH_COMPONENT16),
        Format::D24Unorm => Some(gl::DEPTH_COMPONENT24),
        Format::D32Unorm => Some(gl::DEPTH_COMPONENT32),
        Format::R8G8B8A8Unorm => Some(gl::RGBA8),
        _ => None,
    }
}

impl From<TextureType> for GLenum {
    fn from(ty: TextureType) -> Self {
        match ty {
            TextureType::Texture2D => gl::TEXTURE_2D,
            TextureType::Texture2DArray => gl::TEXTURE_2D_ARRAY,
            TextureType::Cube => gl::TEXTURE_CUBE_MAP,
            TextureType::Renderbuffer => gl::RENDERBUFFER,
        }
    }
}

/// Returns the `(min, mag)` filters of `filter`.
pub fn texture_filter(filter: TextureFilter) -> (GLenum, GLenum) {
    match filter {
        TextureFilter::Nearest => (gl::NEAREST, gl::NEAREST),
        TextureFilter::Linear => (gl::LINEAR, gl::LINEAR),
        TextureFilter::NearestMipmapped => (gl::NEAREST_MIPMAP_NEAREST, gl::NEAREST),
        TextureFilter::LinearMipmapped | TextureFilter::Aniso4 => {
            (gl::LINEAR_MIPMAP_LINEAR, gl::LINEAR)
        }
    }
}

impl From<TextureWrap> for GLenum {
    fn from(wrap: TextureWrap) -> Self {
        match wrap {
            TextureWrap::RepeatAll => gl::REPEAT,
            TextureWrap::ClampAll => gl::CLAMP_TO_EDGE,
        }
    }
}

/// The blend factors of a `BlendFunc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactors {
    Disabled,
    Func(GLenum, GLenum),
    /// Separate `(src_rgb, dst_rgb, src_alpha, dst_alpha)` factors.
    Separate([GLenum; 4]),
}

impl From<BlendFunc> for BlendFactors {
    fn from(func: BlendFunc) -> Self {
        match func {
            BlendFunc::Disabled => BlendFactors::Disabled,
            BlendFunc::Additive => BlendFactors::Func(gl::ONE, gl::ONE),
            BlendFunc::Alfa => BlendFactors::Func(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA),
            BlendFunc::AdditiveAlfa => BlendFactors::Func(gl::ONE, gl::SRC_ALPHA),
            BlendFunc::AdditiveInverseAlfa => BlendFactors::Func(gl::ONE, gl::ONE_MINUS_SRC_ALPHA),
            BlendFunc::Decal => BlendFactors::Func(gl::DST_COLOR, gl::SRC_COLOR),
            BlendFunc::Modulative => BlendFactors::Func(gl::DST_COLOR, gl::ZERO),
            BlendFunc::TransparentAccumulation => BlendFactors::Separate([
                gl::ONE,
                gl::ONE_MINUS_SRC_ALPHA,
                gl::ZERO,
                gl::ONE_MINUS_SRC_ALPHA,
            ]),
        }
    }
}

/// Returns the comparison function of a enabled depth test.
pub fn depth_func(func: DepthFunc) -> Option<GLenum> {
    match func {
        DepthFunc::Disabled => None,
        DepthFunc::Less | DepthFunc::LessWithOffset => Some(gl::LESS),
        DepthFunc::LessOrEqual | DepthFunc::ToFar => Some(gl::LEQUAL),
        DepthFunc::Equal => Some(gl::EQUAL),
        DepthFunc::Greater => Some(gl::GREATER),
        DepthFunc::Always => Some(gl::ALWAYS),
    }
}

/// Returns the faces to cull, `None` if culling is disabled.
pub fn cull_face(mode: CullMode) -> Option<GLenum> {
    match mode {
        CullMode::FrontSided => Some(gl::BACK),
        CullMode::BackSided => Some(gl::FRONT),
        CullMode::TwoSided => None,
    }
}

impl From<PrimitiveType> for GLenum {
    fn from(primitive: PrimitiveType) -> Self {
        match primitive {
            PrimitiveType::Points => gl::POINTS,
            PrimitiveType::Lines => gl::LINES,
            PrimitiveType::Triangles => gl::TRIANGLES,
            PrimitiveType::Patch3 | PrimitiveType::Patch4 | PrimitiveType::Patch16 => gl::PATCHES,
        }
    }
}

/// The layout of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribFormat {
    pub size: GLint,
    pub ty: GLenum,
    pub normalized: bool,
}

pub fn attrib_format(format: Format) -> Option<AttribFormat> {
    let (size, ty) = match format {
        Format::R32Float => (1, gl::FLOAT),
        Format::R32G32Float => (2, gl::FLOAT),
        Format::R32G32B32Float => (3, gl::FLOAT),
        Format::R32G32B32A32Float => (4, gl::FLOAT),
        Format::R8Uint => (1, gl::UNSIGNED_BYTE),
        Format::R8G8Uint => (2, gl::UNSIGNED_BYTE),
        Format::R8G8B8A8Uint => (4, gl::UNSIGNED_BYTE),
        _ => return None,
    };

    Some(AttribFormat {
        size,
        ty,
        normalized: false,
    })
}

/// Returns the component count of a vertex input type. Only float inputs
/// could be fed from vertex buffers.
pub fn attrib_components(ty: GLenum) -> Option<u32> {
    match ty {
        gl::FLOAT => Some(1),
        gl::FLOAT_VEC2 => Some(2),
        gl::FLOAT_VEC3 => Some(3),
        gl::FLOAT_VEC4 => Some(4),
        _ => None,
    }
}

/// Returns the index type and size in bytes of an index format.
pub fn index_format(format: Format) -> Option<(GLenum, u32)> {
    match format {
        Format::R16Uint => Some((gl::UNSIGNED_SHORT, 2)),
        Format::R32Uint => Some((gl::UNSIGNED_INT, 4)),
        _ => None,
    }
}

/// Returns the `(format, type, bytes per pixel)` used to read back pixels.
pub fn readback_format(format: Format) -> Option<(GLenum, GLenum, u32)> {
    match format {
        Format::R8G8B8Unorm => Some((gl::RGB, gl::UNSIGNED_BYTE, 3)),
        Format::R8G8B8A8Unorm => Some((gl::RGBA, gl::UNSIGNED_BYTE, 4)),
        Format::R16G16B16A16Float | Format::R32G32B32A32Float => Some((gl::RGBA, gl::FLOAT, 16)),
        Format::R32G32B32Float => Some((gl::RGB, gl::FLOAT, 12)),
        _ => None,
    }
}

impl From<ShaderStage> for GLenum {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
            ShaderStage::Geometry => gl::GEOMETRY_SHADER,
            ShaderStage::TessControl => gl::TESS_CONTROL_SHADER,
            ShaderStage::TessEvaluation => gl::TESS_EVALUATION_SHADER,
            ShaderStage::Compute => gl::COMPUTE_SHADER,
        }
    }
}

/// Maps the type of a reflected resource onto its uniform format and the
/// GL binding type of resources that are not plain values.
pub fn uniform_format(ty: GLenum) -> Option<(UniformFormat, GLenum)> {
    let v = match ty {
        gl::FLOAT_MAT4 => (UniformFormat::Mat4, 0),
        gl::FLOAT_VEC4 => (UniformFormat::Float4, 0),
        gl::FLOAT_VEC2 => (UniformFormat::Float2, 0),
        gl::FLOAT => (UniformFormat::Float, 0),
        gl::INT => (UniformFormat::Int, 0),
        gl::INT_VEC2 => (UniformFormat::Int2, 0),
        gl::INT_VEC4 => (UniformFormat::Int4, 0),
        gl::UNSIGNED_INT => (UniformFormat::UInt, 0),
        gl::UNSIGNED_INT_VEC2 => (UniformFormat::UInt2, 0),
        gl::UNSIGNED_INT_VEC4 => (UniformFormat::UInt4, 0),
        gl::SAMPLER_2D
        | gl::SAMPLER_2D_ARRAY
        | gl::SAMPLER_CUBE
        | gl::SAMPLER_2D_SHADOW
        | gl::SAMPLER_2D_ARRAY_SHADOW
        | gl::SAMPLER_CUBE_SHADOW
        | gl::IMAGE_2D => (UniformFormat::Texture, ty),
        gl::SHADER_STORAGE_BLOCK => (UniformFormat::Buffer, gl::SHADER_STORAGE_BUFFER),
        gl::UNIFORM_BLOCK => (UniformFormat::Buffer, gl::UNIFORM_BUFFER),
        gl::ATOMIC_COUNTER_BUFFER => (UniformFormat::Buffer, gl::ATOMIC_COUNTER_BUFFER),
        _ => return None,
    };

    Some(v)
}

#[inline]
pub fn is_sampler(binding: GLenum) -> bool {
    match binding {
        gl::SAMPLER_2D | gl::SAMPLER_2D_ARRAY | gl::SAMPLER_CUBE => true,
        _ => is_shadow_sampler(binding),
    }
}

#[inline]
pub fn is_shadow_sampler(binding: GLenum) -> bool {
    match binding {
        gl::SAMPLER_2D_SHADOW | gl::SAMPLER_2D_ARRAY_SHADOW | gl::SAMPLER_CUBE_SHADOW => true,
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn formats() {
        let v = texture_format(Format::D24Unorm).unwrap();
        assert_eq!(v.internal, gl::DEPTH_COMPONENT24);
        assert!(!v.color);

        let v = texture_format(Format::R8G8B8A8Astc4x4Unorm).unwrap();
        assert!(v.compressed);
        assert_eq!(v.internal, 0x93B0);

        assert!(texture_format(Format::Undefined).is_none());
        assert!(texture_format(Format::R16Uint).is_none());
        assert_eq!(renderbuffer_format(Format::D32Unorm), Some(0x81A7));
    }

    #[test]
    fn surface_sizes() {
        let size = |f, extent| texture_format(f).unwrap().surface_size(extent);
        assert_eq!(size(Format::R8G8B8A8Unorm, [4, 4]), Some(64));
        assert_eq!(size(Format::R8G8B8Unorm, [3, 1]), Some(9));
        assert_eq!(size(Format::R32G32B32A32Float, [2, 2]), Some(64));
        assert_eq!(size(Format::R10G10B10A2Unorm, [8, 1]), Some(32));
        assert_eq!(size(Format::D16Unorm, [4, 4]), Some(32));
        assert_eq!(size(Format::R8G8B8A8Dxt5Unorm, [4, 4]), None);
    }

    #[test]
    fn blending() {
        assert_eq!(BlendFactors::from(BlendFunc::Disabled), BlendFactors::Disabled);
        assert_eq!(
            BlendFactors::from(BlendFunc::Alfa),
            BlendFactors::Func(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA)
        );

        match BlendFactors::from(BlendFunc::TransparentAccumulation) {
            BlendFactors::Separate(v) => assert_eq!(v[2], gl::ZERO),
            _ => unreachable!(),
        }
    }

    #[test]
    fn uniforms() {
        assert_eq!(
            uniform_format(gl::SAMPLER_2D_SHADOW),
            Some((UniformFormat::Texture, gl::SAMPLER_2D_SHADOW))
        );
        assert_eq!(
            uniform_format(gl::UNIFORM_BLOCK),
            Some((UniformFormat::Buffer, gl::UNIFORM_BUFFER))
        );
        assert_eq!(uniform_format(gl::FLOAT_MAT3), None);

        assert!(is_sampler(gl::SAMPLER_CUBE));
        assert!(is_sampler(gl::SAMPLER_2D_SHADOW));
        assert!(!is_shadow_sampler(gl::SAMPLER_2D));
        assert!(!is_sampler(gl::IMAGE_2D));
    }

    #[test]
    fn misc() {
        assert_eq!(depth_func(DepthFunc::ToFar), Some(gl::LEQUAL));
        assert_eq!(depth_func(DepthFunc::Disabled), None);
        assert_eq!(cull_face(CullMode::BackSided), Some(gl::FRONT));
        assert_eq!(GLenum::from(PrimitiveType::Patch4), gl::PATCHES);
        assert_eq!(index_format(Format::R16Uint), Some((gl::UNSIGNED_SHORT, 2)));
        assert_eq!(attrib_components(gl::INT_VEC2), None);
        assert_eq!(readback_format(Format::R32G32B32Float).unwrap().2, 12);
    }
}
