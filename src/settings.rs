//! Functions for loading context settings.

use crate::errors::*;
use crate::ngl::properties::Api;

/// A structure containing configuration data of the backend context, which
/// is used to validate the created GL context and to seed the backend
/// properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextDescriptor {
    pub selected_device_id: String,
    pub api: Api,
    pub major_version: u32,
    pub minor_version: u32,
    /// Attaches debug labels to every GL object.
    pub enable_validation: bool,
    pub enable_vsync: bool,
    pub system_attachment_is_transfer_source: bool,
    /// Sets the size in pixels of the default framebuffer.
    pub display_width: u32,
    pub display_height: u32,
}

impl Default for ContextDescriptor {
    fn default() -> Self {
        ContextDescriptor {
            selected_device_id: String::new(),
            api: Api::NullDriver,
            major_version: 1,
            minor_version: 0,
            enable_validation: false,
            enable_vsync: false,
            system_attachment_is_transfer_source: false,
            display_width: 0,
            display_height: 0,
        }
    }
}

impl ContextDescriptor {
    /// Creates a descriptor of a desktop OpenGL context.
    pub fn gl(major: u32, minor: u32, width: u32, height: u32) -> Self {
        ContextDescriptor {
            api: Api::OpenGL,
            major_version: major,
            minor_version: minor,
            display_width: width,
            display_height: height,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let descriptor = serde_json::from_str(json)
            .map_err(|err| format_err!("Failed to parse context descriptor: {}", err))?;
        Ok(descriptor)
    }

    /// Checks that the context could run this backend. Program interface
    /// queries are required, which means GL 4.3 or ES 3.1.
    pub fn validate(&self) -> Result<()> {
        if self.display_width == 0 || self.display_height == 0 {
            bail!(
                "Invalid display size {}x{}.",
                self.display_width,
                self.display_height
            );
        }

        let version = (self.major_version, self.minor_version);
        match self.api {
            Api::OpenGL if version < (4, 3) => bail!(
                "OpenGL {}.{} is not supported, 4.3 is required.",
                version.0,
                version.1
            ),
            Api::OpenGLES if version < (3, 1) => bail!(
                "OpenGL ES {}.{} is not supported, 3.1 is required.",
                version.0,
                version.1
            ),
            Api::OpenGL | Api::OpenGLES | Api::NullDriver => Ok(()),
            api => bail!("{:?} is not served by the OpenGL backend.", api),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let descriptor = ContextDescriptor::default();
        assert_eq!(descriptor.api, Api::NullDriver);
        assert_eq!(descriptor.major_version, 1);
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn from_json() {
        let descriptor = ContextDescriptor::from_json(
            r#"{ "api": "OpenGLES", "major_version": 3, "minor_version": 2,
                 "display_width": 1920, "display_height": 1080 }"#,
        )
        .unwrap();

        assert_eq!(descriptor.api, Api::OpenGLES);
        assert_eq!(descriptor.display_width, 1920);
        assert!(!descriptor.enable_validation);
        assert!(descriptor.validate().is_ok());

        assert!(ContextDescriptor::from_json("{ \"api\": 3 ").is_err());
    }

    #[test]
    fn validate() {
        assert!(ContextDescriptor::gl(4, 3, 640, 480).validate().is_ok());
        assert!(ContextDescriptor::gl(4, 1, 640, 480).validate().is_err());
        assert!(ContextDescriptor::gl(4, 5, 0, 480).validate().is_err());

        let mut descriptor = ContextDescriptor::gl(3, 0, 640, 480);
        descriptor.api = Api::OpenGLES;
        assert!(descriptor.validate().is_err());

        descriptor.api = Api::Vulkan;
        descriptor.major_version = 1;
        assert!(descriptor.validate().is_err());
    }
}
