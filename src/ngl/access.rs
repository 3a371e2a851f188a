use std::fmt;

/// The access state of a texture subresource or buffer on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceState {
    ColorAttachment,
    ColorAttachmentAndInputAttachmentAndShaderResource,
    ColorAttachmentAndPreservedAttachment,
    DepthAttachment,
    ReadOnlyDepthAttachment,
    ReadOnlyDepthAttachmentAndShaderResource,
    ShaderResource,
    ShaderResourceAndUnorderedAccess,
    ShaderResourceAndNonFragmentShaderResource,
    ShaderResourceAndUnorderedAccessAndNonFragmentShaderResource,
}

impl ResourceState {
    /// Returns true for the states that allow shader writes. A transition
    /// into one of them is always recorded since prior writes might not be
    /// visible yet.
    #[inline]
    pub fn is_read_write(self) -> bool {
        match self {
            ResourceState::ShaderResourceAndUnorderedAccess
            | ResourceState::ShaderResourceAndUnorderedAccessAndNonFragmentShaderResource => true,
            _ => false,
        }
    }

    /// Returns true for the states of a depth attachment usage.
    #[inline]
    pub fn is_depth_attachment(self) -> bool {
        match self {
            ResourceState::DepthAttachment
            | ResourceState::ReadOnlyDepthAttachment
            | ResourceState::ReadOnlyDepthAttachmentAndShaderResource => true,
            _ => false,
        }
    }

    /// Returns true for the states of a color attachment usage.
    #[inline]
    pub fn is_color_attachment(self) -> bool {
        match self {
            ResourceState::ColorAttachment
            | ResourceState::ColorAttachmentAndInputAttachmentAndShaderResource
            | ResourceState::ColorAttachmentAndPreservedAttachment => true,
            _ => false,
        }
    }

    /// The canonical name of this state.
    pub fn name(self) -> &'static str {
        match self {
            ResourceState::ColorAttachment => "NGL_COLOR_ATTACHMENT",
            ResourceState::ColorAttachmentAndInputAttachmentAndShaderResource => {
                "NGL_COLOR_ATTACHMENT_AND_INPUT_ATTACHMENT_AND_SHADER_RESOURCE"
            }
            ResourceState::ColorAttachmentAndPreservedAttachment => {
                "NGL_COLOR_ATTACHMENT_AND_PRESERVED_ATTACHMENT"
            }
            ResourceState::DepthAttachment => "NGL_DEPTH_ATTACHMENT",
            ResourceState::ReadOnlyDepthAttachment => "NGL_READ_ONLY_DEPTH_ATTACHMENT",
            ResourceState::ReadOnlyDepthAttachmentAndShaderResource => {
                "NGL_READ_ONLY_DEPTH_ATTACHMENT_AND_SHADER_RESOURCE"
            }
            ResourceState::ShaderResource => "NGL_SHADER_RESOURCE",
            ResourceState::ShaderResourceAndUnorderedAccess => {
                "NGL_SHADER_RESOURCE_AND_UNORDERED_ACCESS"
            }
            ResourceState::ShaderResourceAndNonFragmentShaderResource => {
                "NGL_SHADER_RESOURCE_AND_NON_FRAGMENT_SHADER_RESOURCE"
            }
            ResourceState::ShaderResourceAndUnorderedAccessAndNonFragmentShaderResource => {
                "NGL_SHADER_RESOURCE_AND_UNORDERED_ACCESS_AND_NON_FRAGMENT_SHADER_RESOURCE"
            }
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classes() {
        assert!(ResourceState::ShaderResourceAndUnorderedAccess.is_read_write());
        assert!(!ResourceState::ShaderResourceAndNonFragmentShaderResource.is_read_write());
        assert!(ResourceState::ReadOnlyDepthAttachment.is_depth_attachment());
        assert!(!ResourceState::ReadOnlyDepthAttachment.is_color_attachment());
        assert!(ResourceState::ColorAttachmentAndPreservedAttachment.is_color_attachment());
    }

    #[test]
    fn names() {
        assert_eq!(
            format!("{}", ResourceState::ShaderResource),
            "NGL_SHADER_RESOURCE"
        );
        assert_eq!(
            ResourceState::ReadOnlyDepthAttachmentAndShaderResource.name(),
            "NGL_READ_ONLY_DEPTH_ATTACHMENT_AND_SHADER_RESOURCE"
        );
    }
}
