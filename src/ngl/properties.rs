//! Backend properties queried by scenes through `get_integer`/`get_string`.

use crate::backend::capabilities::{Capabilities, SwapchainColor, SwapchainDepth};
use crate::settings::ContextDescriptor;
use crate::utils::hash::FastHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Api {
    OpenGL,
    OpenGLES,
    Direct3D11,
    Direct3D12,
    MetalIOS,
    MetalMacOS,
    Vulkan,
    NullDriver,
}

impl Default for Api {
    fn default() -> Self {
        Api::OpenGL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RasterizationControlMode {
    OriginLowerLeft,
    OriginUpperLeft,
    OriginUpperLeftAndNdcFlip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepthMode {
    ZeroToOne,
    NegativeOneToOne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    Api,
    MajorVersion,
    MinorVersion,
    Vendor,
    Renderer,
    Version,
    RasterizationControlMode,
    DepthMode,
    NeedSwapbuffers,
    Tessellation,
    PipelineStatistics,
    FloatingPointRendertarget,
    TextureCompressionAstc,
    TextureCompressionDxt1,
    TextureCompressionDxt5,
    TextureCompressionEtc1,
    TextureCompressionEtc2,
    TextureMaxAnisotropy,
    TextureMaxSize2D,
    TextureMaxSizeCube,
    MaxComputeWorkGroupSizeX,
    MaxComputeWorkGroupSizeY,
    MaxComputeWorkGroupSizeZ,
    MaxComputeWorkGroupInvocations,
    MaxComputeSharedMemorySize,
    SubpassEnabled,
    D16LinearShadowFilter,
    D24LinearShadowFilter,
    PipelineMaxPushConstantSize,
    /// `-1` if the format is unknown, the string property describes it then.
    SwapchainColorFormat,
    SwapchainDepthFormat,
}

impl Property {
    pub const COUNT: usize = 31;
}

/// The integer and string properties of a backend. Integer properties that
/// were never set read as `0`.
#[derive(Debug, Clone)]
pub struct Properties {
    integers: [i32; Property::COUNT],
    strings: FastHashMap<Property, String>,
}

impl Default for Properties {
    fn default() -> Self {
        Properties {
            integers: [0; Property::COUNT],
            strings: FastHashMap::default(),
        }
    }
}

impl Properties {
    pub fn new(descriptor: &ContextDescriptor, caps: &Capabilities) -> Self {
        let mut props = Properties::default();
        let es = descriptor.api == Api::OpenGLES;

        props.set_string(Property::Vendor, caps.vendor.clone());
        props.set_string(Property::Renderer, caps.renderer.clone());
        props.set_string(Property::Version, caps.version_string.clone());

        props.set_integer(Property::Api, descriptor.api as i32);
        props.set_integer(Property::MajorVersion, descriptor.major_version as i32);
        props.set_integer(Property::MinorVersion, descriptor.minor_version as i32);
        props.set_integer(
            Property::RasterizationControlMode,
            RasterizationControlMode::OriginLowerLeft as i32,
        );
        props.set_integer(Property::DepthMode, DepthMode::NegativeOneToOne as i32);
        props.set_integer(Property::NeedSwapbuffers, 1);
        props.set_flag(Property::TextureCompressionDxt5, !es);
        props.set_flag(Property::TextureCompressionEtc2, es);
        props.set_flag(
            Property::TextureCompressionAstc,
            caps.has_extension("texture_compression_astc_ldr"),
        );
        props.set_flag(Property::Tessellation, !es);
        props.set_flag(
            Property::PipelineStatistics,
            caps.has_extension("pipeline_statistics_query"),
        );

        if es {
            props.set_flag(
                Property::FloatingPointRendertarget,
                caps.has_extension("texture_float"),
            );
        } else {
            props.set_integer(Property::FloatingPointRendertarget, 1);
        }

        props.set_integer(Property::TextureMaxAnisotropy, caps.max_anisotropy);
        props.set_integer(Property::TextureMaxSize2D, caps.max_texture_size);
        props.set_integer(Property::TextureMaxSizeCube, caps.max_cube_map_texture_size);

        let [x, y, z] = caps.max_compute_work_group_size;
        props.set_integer(Property::MaxComputeWorkGroupSizeX, x);
        props.set_integer(Property::MaxComputeWorkGroupSizeY, y);
        props.set_integer(Property::MaxComputeWorkGroupSizeZ, z);
        props.set_integer(
            Property::MaxComputeWorkGroupInvocations,
            caps.max_compute_work_group_invocations,
        );
        props.set_integer(
            Property::MaxComputeSharedMemorySize,
            caps.max_compute_shared_memory_size,
        );

        props.set_integer(Property::SubpassEnabled, 0);
        props.set_integer(Property::D16LinearShadowFilter, 1);
        props.set_integer(Property::D24LinearShadowFilter, 1);
        props.set_integer(Property::PipelineMaxPushConstantSize, 0);

        if let Some(depth) = caps.swapchain_depth {
            props.set_swapchain_depth(depth);
        }

        if let Some(color) = caps.swapchain_color {
            props.set_swapchain_color(color);
        }

        props
    }

    #[inline]
    pub fn get_integer(&self, property: Property) -> i32 {
        self.integers[property as usize]
    }

    /// Returns the string value of `property`, or `None` if the backend
    /// never set it.
    #[inline]
    pub fn get_string(&self, property: Property) -> Option<&str> {
        self.strings.get(&property).map(|v| v.as_str())
    }

    #[inline]
    pub fn set_integer(&mut self, property: Property, v: i32) {
        self.integers[property as usize] = v;
    }

    #[inline]
    pub fn set_string<T: Into<String>>(&mut self, property: Property, v: T) {
        self.strings.insert(property, v.into());
    }

    #[inline]
    fn set_flag(&mut self, property: Property, v: bool) {
        self.set_integer(property, if v { 1 } else { 0 });
    }

    fn set_swapchain_depth(&mut self, depth: SwapchainDepth) {
        match depth.bits {
            16 | 24 | 32 => {
                self.set_integer(Property::SwapchainDepthFormat, depth.bits);
                if depth.normalized {
                    self.set_string(Property::SwapchainDepthFormat, "unorm");
                }
            }
            bits => {
                self.set_integer(Property::SwapchainDepthFormat, -1);
                self.set_string(Property::SwapchainDepthFormat, bits.to_string());
            }
        }
    }

    fn set_swapchain_color(&mut self, color: SwapchainColor) {
        let (format, suffix) = match color.bits {
            [8, 8, 8, 8] => (8888, if color.srgb { "_srgba" } else { "_rgba" }),
            [8, 8, 8, 0] => (888, if color.srgb { "_srgb" } else { "_rgb" }),
            [r, g, b, a] => {
                self.set_integer(Property::SwapchainColorFormat, -1);
                self.set_string(
                    Property::SwapchainColorFormat,
                    format!("{}{}{}{}", r, g, b, a),
                );
                return;
            }
        };

        let prefix = if color.normalized { "unorm" } else { "" };
        self.set_integer(Property::SwapchainColorFormat, format);
        self.set_string(Property::SwapchainColorFormat, format!("{}{}", prefix, suffix));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::capabilities::Version;

    fn caps() -> Capabilities {
        let mut caps = Capabilities::default();
        caps.version = Version::GL(4, 5);
        caps.vendor = "ngl".into();
        caps.max_texture_size = 16384;
        caps.extensions = vec![
            "GL_KHR_texture_compression_astc_ldr".into(),
            "GL_EXT_texture_filter_anisotropic".into(),
        ];
        caps
    }

    #[test]
    fn desktop() {
        let props = Properties::new(&ContextDescriptor::gl(4, 5, 1920, 1080), &caps());

        assert_eq!(props.get_integer(Property::Api), Api::OpenGL as i32);
        assert_eq!(props.get_integer(Property::NeedSwapbuffers), 1);
        assert_eq!(props.get_integer(Property::TextureCompressionDxt5), 1);
        assert_eq!(props.get_integer(Property::TextureCompressionEtc2), 0);
        assert_eq!(props.get_integer(Property::TextureCompressionAstc), 1);
        assert_eq!(props.get_integer(Property::Tessellation), 1);
        assert_eq!(props.get_integer(Property::PipelineStatistics), 0);
        assert_eq!(props.get_integer(Property::FloatingPointRendertarget), 1);
        assert_eq!(props.get_integer(Property::TextureMaxSize2D), 16384);
        assert_eq!(
            props.get_integer(Property::DepthMode),
            DepthMode::NegativeOneToOne as i32
        );
        assert_eq!(props.get_string(Property::Vendor), Some("ngl"));
        assert_eq!(props.get_string(Property::Api), None);
    }

    #[test]
    fn embedded() {
        let mut descriptor = ContextDescriptor::gl(3, 2, 1920, 1080);
        descriptor.api = Api::OpenGLES;

        let props = Properties::new(&descriptor, &caps());
        assert_eq!(props.get_integer(Property::TextureCompressionDxt5), 0);
        assert_eq!(props.get_integer(Property::TextureCompressionEtc2), 1);
        assert_eq!(props.get_integer(Property::Tessellation), 0);
        assert_eq!(props.get_integer(Property::FloatingPointRendertarget), 0);
        assert_eq!(props.get_integer(Property::MinorVersion), 2);
    }

    #[test]
    fn swapchain_formats() {
        let mut caps = caps();
        caps.swapchain_depth = Some(SwapchainDepth {
            bits: 24,
            normalized: true,
        });
        caps.swapchain_color = Some(SwapchainColor {
            bits: [8, 8, 8, 8],
            normalized: true,
            srgb: false,
        });

        let props = Properties::new(&ContextDescriptor::gl(4, 5, 1920, 1080), &caps);
        assert_eq!(props.get_integer(Property::SwapchainDepthFormat), 24);
        assert_eq!(props.get_string(Property::SwapchainDepthFormat), Some("unorm"));
        assert_eq!(props.get_integer(Property::SwapchainColorFormat), 8888);
        assert_eq!(
            props.get_string(Property::SwapchainColorFormat),
            Some("unorm_rgba")
        );

        caps.swapchain_color = Some(SwapchainColor {
            bits: [10, 10, 10, 2],
            normalized: true,
            srgb: false,
        });
        let props = Properties::new(&ContextDescriptor::gl(4, 5, 1920, 1080), &caps);
        assert_eq!(props.get_integer(Property::SwapchainColorFormat), -1);
        assert_eq!(
            props.get_string(Property::SwapchainColorFormat),
            Some("1010102")
        );
    }
}
