//! The API independent vocabulary of NGL: formats, descriptors, pipeline
//! state, shader sources, draw parameters and backend properties.

pub mod access;
pub mod descriptor;
pub mod format;
pub mod parameter;
pub mod properties;
pub mod shader;
pub mod state;

impl_handle!(TextureHandle);
impl_handle!(VertexBufferHandle);
impl_handle!(IndexBufferHandle);
impl_handle!(JobHandle);

pub mod prelude {
    pub use super::access::ResourceState;
    pub use super::descriptor::{
        AttachmentDescriptor, BufferSubresource, JobDescriptor, LoadOp, StoreOp,
        SubpassDescriptor, TextureDescriptor, TextureSubresource, VertexAttrib, VertexDescriptor,
    };
    pub use super::format::{Format, TextureFilter, TextureType, TextureWrap};
    pub use super::parameter::Parameter;
    pub use super::properties::{Api, DepthMode, Property, RasterizationControlMode};
    pub use super::shader::{
        ShaderLoader, ShaderSourceDescriptor, ShaderSources, ShaderStage, ShaderUniform,
        UniformFormat, UniformGroups,
    };
    pub use super::state::{
        BlendFunc, ColorMask, CullMode, DepthFunc, PipelineState, PrimitiveType, StateChanges,
    };
    pub use super::{IndexBufferHandle, JobHandle, TextureHandle, VertexBufferHandle};
}
