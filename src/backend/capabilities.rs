use gl::types::*;
use std::cmp;

use super::Device;
use crate::errors::*;

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same API.
/// For example, both `Version::GL(3, 0) >= Version::ES(3, 0)` and `Version::ES(3, 0) >=
/// Version::GL(3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl Default for Version {
    fn default() -> Self {
        Version::GL(4, 3)
    }
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        let (es1, major1, minor1) = match *self {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        let (es2, major2, minor2) = match *other {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        if es1 != es2 {
            None
        } else {
            match major1.cmp(&major2) {
                cmp::Ordering::Equal => Some(minor1.cmp(&minor2)),
                v => Some(v),
            }
        }
    }
}

impl Version {
    /// Parses the `GL_VERSION` string of a context, e.g. `4.5.0 NVIDIA 390.77`
    /// or `OpenGL ES 3.2 build 1.10`.
    pub fn parse(desc: &str) -> Result<Version> {
        let (es, desc) = if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else if desc.starts_with("OpenGL ES-") {
            (true, &desc[13..])
        } else {
            (false, desc)
        };

        let desc = desc
            .split(' ')
            .next()
            .ok_or_else(|| format_err!("[GL] Version string is unformaled."))?;

        let mut iter = desc.split(move |c: char| c == '.');
        let major = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| format_err!("[GL] Failed to parse major version of {}.", desc))?;
        let minor = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| format_err!("[GL] Failed to parse minor version of {}.", desc))?;

        if es {
            Ok(Version::ES(major, minor))
        } else {
            Ok(Version::GL(major, minor))
        }
    }
}

/// The depth attachment of the default framebuffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SwapchainDepth {
    pub bits: i32,
    pub normalized: bool,
}

/// The color attachment of the default framebuffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SwapchainColor {
    pub bits: [i32; 4],
    pub normalized: bool,
    pub srgb: bool,
}

/// Represents the capabilities of the context.
///
/// Contrary to the state, these values never change.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    /// Returns a version or release number. Vendor-specific information may follow the version
    /// number.
    pub version: Version,
    pub version_string: String,

    /// The company responsible for this GL implementation.
    pub vendor: String,

    /// The name of the renderer. This name is typically specific to a particular
    /// configuration of a hardware platform.
    pub renderer: String,

    /// The list of OpenGL extensions support by this implementation.
    pub extensions: Vec<String>,

    pub max_texture_size: i32,
    pub max_cube_map_texture_size: i32,
    /// Maximum number of color attachment bind points.
    pub max_color_attachments: i32,
    /// Maximum number of textures that can be bound to a program.
    pub max_combined_texture_image_units: i32,
    pub max_vertex_attribs: i32,
    /// `0` if anisotropic filtering is not supported.
    pub max_anisotropy: i32,

    pub max_compute_work_group_size: [i32; 3],
    pub max_compute_work_group_invocations: i32,
    pub max_compute_shared_memory_size: i32,

    pub swapchain_depth: Option<SwapchainDepth>,
    pub swapchain_color: Option<SwapchainColor>,
}

const MAX_TEXTURE_MAX_ANISOTROPY: GLenum = 0x84FF;

impl Capabilities {
    pub fn parse(device: &mut dyn Device) -> Result<Capabilities> {
        let version_string = Capabilities::parse_str(device, gl::VERSION)?;
        let version = Version::parse(&version_string)?;
        let extensions = device.extensions();

        let mut caps = Capabilities {
            version,
            version_string,
            vendor: Capabilities::parse_str(device, gl::VENDOR)?,
            renderer: Capabilities::parse_str(device, gl::RENDERER)?,
            extensions,
            ..Default::default()
        };

        if caps.has_extension("texture_filter_anisotropic") {
            caps.max_anisotropy = device.get_integer(MAX_TEXTURE_MAX_ANISOTROPY);
        }

        caps.max_texture_size = device.get_integer(gl::MAX_TEXTURE_SIZE);
        caps.max_cube_map_texture_size = device.get_integer(gl::MAX_CUBE_MAP_TEXTURE_SIZE);
        caps.max_color_attachments = device.get_integer(gl::MAX_COLOR_ATTACHMENTS);
        caps.max_combined_texture_image_units =
            device.get_integer(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS);
        caps.max_vertex_attribs = device.get_integer(gl::MAX_VERTEX_ATTRIBS);

        for i in 0..3 {
            caps.max_compute_work_group_size[i] =
                device.get_integer_i(gl::MAX_COMPUTE_WORK_GROUP_SIZE, i as GLuint);
        }

        caps.max_compute_work_group_invocations =
            device.get_integer(gl::MAX_COMPUTE_WORK_GROUP_INVOCATIONS);
        caps.max_compute_shared_memory_size =
            device.get_integer(gl::MAX_COMPUTE_SHARED_MEMORY_SIZE);

        caps.swapchain_depth = Capabilities::parse_swapchain_depth(device);
        caps.swapchain_color = Capabilities::parse_swapchain_color(device);

        info!("GL_RENDERER: {}", caps.renderer);
        info!("GL_VERSION: {}", caps.version_string);
        info!("GL max. aniso: {}", caps.max_anisotropy);
        info!("GL max. 2D texture size: {}", caps.max_texture_size);
        info!("GL max. cube texture size: {}", caps.max_cube_map_texture_size);
        info!("GL max. vertex shader attribs: {}", caps.max_vertex_attribs);

        Ok(caps)
    }

    /// Returns true if any extension name contains `name`.
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|v| v.contains(name))
    }

    #[inline]
    fn parse_str(device: &mut dyn Device, id: GLenum) -> Result<String> {
        device
            .get_string(id)
            .ok_or_else(|| format_err!("[GL] String of {} is null.", id))
    }

    fn parse_swapchain_depth(device: &mut dyn Device) -> Option<SwapchainDepth> {
        let object = device.get_framebuffer_attachment_parameter(
            gl::FRAMEBUFFER,
            gl::DEPTH,
            gl::FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE,
        );

        if object == 0 {
            return None;
        }

        let bits = device.get_framebuffer_attachment_parameter(
            gl::FRAMEBUFFER,
            gl::DEPTH,
            gl::FRAMEBUFFER_ATTACHMENT_DEPTH_SIZE,
        );

        let ty = device.get_framebuffer_attachment_parameter(
            gl::FRAMEBUFFER,
            gl::DEPTH,
            gl::FRAMEBUFFER_ATTACHMENT_COMPONENT_TYPE,
        );

        Some(SwapchainDepth {
            bits,
            normalized: ty as GLenum == gl::UNSIGNED_NORMALIZED,
        })
    }

    fn parse_swapchain_color(device: &mut dyn Device) -> Option<SwapchainColor> {
        let object = device.get_framebuffer_attachment_parameter(
            gl::FRAMEBUFFER,
            gl::BACK,
            gl::FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE,
        );

        if object == 0 {
            return None;
        }

        let mut query = |pname| {
            device.get_framebuffer_attachment_parameter(gl::FRAMEBUFFER, gl::BACK, pname)
        };

        let bits = [
            query(gl::FRAMEBUFFER_ATTACHMENT_RED_SIZE),
            query(gl::FRAMEBUFFER_ATTACHMENT_GREEN_SIZE),
            query(gl::FRAMEBUFFER_ATTACHMENT_BLUE_SIZE),
            query(gl::FRAMEBUFFER_ATTACHMENT_ALPHA_SIZE),
        ];

        let ty = query(gl::FRAMEBUFFER_ATTACHMENT_COMPONENT_TYPE) as GLenum;
        let encoding = query(gl::FRAMEBUFFER_ATTACHMENT_COLOR_ENCODING) as GLenum;

        Some(SwapchainColor {
            bits,
            normalized: ty == gl::UNSIGNED_NORMALIZED,
            srgb: encoding == gl::SRGB,
        })
    }
}

#[cfg(test)]
mod test {
    use super::super::headless::HeadlessDevice;
    use super::*;

    #[test]
    fn version() {
        assert_eq!(
            Version::parse("4.5.0 NVIDIA 390.77").unwrap(),
            Version::GL(4, 5)
        );
        assert_eq!(
            Version::parse("OpenGL ES 3.2 build 1.10").unwrap(),
            Version::ES(3, 2)
        );
        assert!(Version::parse("unknown").is_err());

        assert!(Version::GL(4, 5) >= Version::GL(4, 3));
        assert!(Version::ES(3, 0) < Version::ES(3, 1));
        assert!(!(Version::GL(3, 0) >= Version::ES(3, 0)));
        assert!(!(Version::ES(3, 0) >= Version::GL(3, 0)));
    }

    #[test]
    fn parse() {
        let mut device = HeadlessDevice::new();
        let caps = Capabilities::parse(&mut device).unwrap();
        assert_eq!(caps.version, Version::GL(4, 5));
        assert!(caps.max_texture_size > 0);
        assert!(caps.max_compute_work_group_size.iter().all(|v| *v > 0));
        assert!(caps.has_extension("texture_filter_anisotropic"));
        assert_eq!(caps.max_anisotropy, 16);

        let depth = caps.swapchain_depth.unwrap();
        assert_eq!(depth.bits, 24);
        assert!(depth.normalized);
    }
}
