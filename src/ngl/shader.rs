//! Shader sources and the application side uniform table of a program.

use super::descriptor::JobDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
    Compute,
}

impl ShaderStage {
    pub const COUNT: usize = 6;

    pub const ALL: [ShaderStage; ShaderStage::COUNT] = [
        ShaderStage::Vertex,
        ShaderStage::Fragment,
        ShaderStage::Geometry,
        ShaderStage::TessControl,
        ShaderStage::TessEvaluation,
        ShaderStage::Compute,
    ];
}

/// The data format of a uniform slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UniformFormat {
    /// A 4x4 float matrix.
    Mat4,
    Float4,
    Texture,
    /// A single level, layer or face of a texture.
    TextureSubresource,
    Float2,
    Float,
    Int,
    Int2,
    Int4,
    UInt,
    UInt2,
    UInt4,
    Buffer,
    /// A byte range of a buffer.
    BufferSubresource,
    Undefined,
}

impl Default for UniformFormat {
    fn default() -> Self {
        UniformFormat::Undefined
    }
}

bitflags! {
    /// The update frequency groups a uniform belongs to. Only the groups that
    /// might have changed are rebound before a draw.
    #[derive(Serialize, Deserialize)]
    pub struct UniformGroups: u8 {
        const PER_DRAW = 1 << 0;
        const PER_RENDERER_CHANGE = 1 << 1;
        const MANUAL = 1 << 2;
        const OTHER = 1 << 3;
    }
}

impl UniformGroups {
    pub const COUNT: usize = 4;

    /// Returns true if the group with `index` (0 for per-draw, 3 for other)
    /// is part of this set.
    #[inline]
    pub fn has_index(self, index: usize) -> bool {
        index < UniformGroups::COUNT && (self.bits() & (1 << index)) != 0
    }
}

impl Default for UniformGroups {
    fn default() -> Self {
        UniformGroups::PER_DRAW
    }
}

/// A uniform declared by the application. Its position in the uniform table
/// is the index of its parameter at draw time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderUniform {
    pub name: String,
    pub format: UniformFormat,
    pub size: u32,
    pub group: UniformGroups,
}

impl ShaderUniform {
    pub fn new<T: Into<String>>(name: T, group: UniformGroups, format: UniformFormat) -> Self {
        ShaderUniform {
            name: name.into(),
            format,
            size: 0,
            group,
        }
    }
}

/// The source of one shader stage. An empty `source` disables the stage.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderSourceDescriptor {
    pub source: String,
    pub entry_point: String,
    pub version: String,
    /// Free form description used in diagnostics and debug labels.
    pub info_string: String,
    pub work_group_size: [u32; 3],
    /// Storage buffers the stage only reads.
    pub readonly_buffers: Vec<String>,
    /// Images the stage only reads.
    pub readonly_images: Vec<String>,
}

/// Everything needed to build the program of a draw or dispatch.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderSources {
    pub stages: [ShaderSourceDescriptor; ShaderStage::COUNT],
    pub uniforms: Vec<ShaderUniform>,
}

impl ShaderSources {
    #[inline]
    pub fn stage(&self, stage: ShaderStage) -> &ShaderSourceDescriptor {
        &self.stages[stage as usize]
    }

    #[inline]
    pub fn stage_mut(&mut self, stage: ShaderStage) -> &mut ShaderSourceDescriptor {
        &mut self.stages[stage as usize]
    }

    pub fn is_readonly_buffer(&self, name: &str) -> bool {
        self.stages
            .iter()
            .any(|v| v.readonly_buffers.iter().any(|b| b == name))
    }

    pub fn is_readonly_image(&self, name: &str) -> bool {
        self.stages
            .iter()
            .any(|v| v.readonly_images.iter().any(|b| b == name))
    }
}

/// Provides the shader sources of a job. Called once per program, the first
/// time a `(subpass, shader code)` pair is drawn with a new vertex layout.
pub trait ShaderLoader {
    fn load(&self, job: &JobDescriptor, subpass: u32, shader_code: u32) -> ShaderSources;
}

impl<F> ShaderLoader for F
where
    F: Fn(&JobDescriptor, u32, u32) -> ShaderSources,
{
    fn load(&self, job: &JobDescriptor, subpass: u32, shader_code: u32) -> ShaderSources {
        (self)(job, subpass, shader_code)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn groups() {
        let groups = UniformGroups::PER_DRAW | UniformGroups::MANUAL;
        assert!(groups.has_index(0));
        assert!(!groups.has_index(1));
        assert!(groups.has_index(2));
        assert!(!groups.has_index(4));
        assert!(UniformGroups::all().contains(groups));
        assert!(!groups.contains(UniformGroups::OTHER));
    }

    #[test]
    fn readonly_lookup() {
        let mut sources = ShaderSources::default();
        sources
            .stage_mut(ShaderStage::Compute)
            .readonly_buffers
            .push("particles_in".into());
        sources
            .stage_mut(ShaderStage::Fragment)
            .readonly_images
            .push("history".into());

        assert!(sources.is_readonly_buffer("particles_in"));
        assert!(!sources.is_readonly_buffer("particles_out"));
        assert!(sources.is_readonly_image("history"));
        assert!(!sources.is_readonly_image("particles_in"));
    }

    #[test]
    fn closure_loader() {
        let loader = |_: &JobDescriptor, subpass: u32, code: u32| {
            let mut sources = ShaderSources::default();
            sources.stage_mut(ShaderStage::Vertex).info_string = format!("{}:{}", subpass, code);
            sources
        };

        let sources = loader.load(&JobDescriptor::default(), 1, 7);
        assert_eq!(sources.stage(ShaderStage::Vertex).info_string, "1:7");
    }
}
