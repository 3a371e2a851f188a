//! Descriptors of the resources and jobs that are submitted to the backend.

use std::fmt;
use std::rc::Rc;

use super::access::ResourceState;
use super::format::{Format, TextureFilter, TextureType, TextureWrap};
use super::shader::ShaderLoader;
use super::{TextureHandle, VertexBufferHandle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexAttrib {
    pub semantic: String,
    pub format: Format,
    pub offset: u32,
}

impl VertexAttrib {
    pub fn new<T: Into<String>>(semantic: T, format: Format, offset: u32) -> Self {
        VertexAttrib {
            semantic: semantic.into(),
            format,
            offset,
        }
    }
}

/// The layout of a vertex buffer.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VertexDescriptor {
    pub attribs: Vec<VertexAttrib>,
    pub stride: u32,
    /// The buffer could also be bound as a read/write storage buffer.
    pub unordered_access: bool,
}

impl VertexDescriptor {
    /// Returns a cheap fingerprint of this layout. Programs are cached per
    /// (shader code, sum of the fingerprints of the bound vertex buffers).
    pub fn layout_hash(&self) -> u32 {
        self.attribs.iter().fold(self.stride, |acc, v| {
            acc.wrapping_add(v.offset).wrapping_add(v.format as u32)
        })
    }

    /// Returns the attribute with `semantic` if its component count is
    /// `components`.
    pub fn find_attrib(&self, semantic: &str, components: u32) -> Option<&VertexAttrib> {
        self.attribs.iter().find(|v| {
            v.semantic == semantic && v.format.components() == Some(components)
        })
    }
}

/// Describes a texture or a renderbuffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureDescriptor {
    pub name: String,
    pub ty: TextureType,
    pub format: Format,
    pub wrap: TextureWrap,
    pub filter: TextureFilter,
    pub shadow_filter: TextureFilter,
    /// Number of mip levels, `1` is the base level only.
    pub num_levels: u32,
    /// Number of layers of a array texture.
    pub num_array: u32,
    pub is_renderable: bool,
    pub size: [u32; 3],
    pub clear_value: [f32; 4],
    pub unordered_access: bool,
    pub input_attachment: bool,
    pub memoryless: bool,
    pub samples: u32,
    pub is_transfer_source: bool,
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        TextureDescriptor {
            name: String::new(),
            ty: TextureType::Texture2D,
            format: Format::Undefined,
            wrap: TextureWrap::RepeatAll,
            filter: TextureFilter::Nearest,
            shadow_filter: TextureFilter::Nearest,
            num_levels: 1,
            num_array: 1,
            is_renderable: false,
            size: [1, 1, 1],
            clear_value: [0.0, 0.0, 0.0, 1.0],
            unordered_access: false,
            input_attachment: false,
            memoryless: false,
            samples: 1,
            is_transfer_source: false,
        }
    }
}

impl TextureDescriptor {
    /// Creates a descriptor of a renderable 2D texture.
    pub fn render_target<T: Into<String>>(name: T, format: Format, width: u32, height: u32) -> Self {
        TextureDescriptor {
            name: name.into(),
            format,
            is_renderable: true,
            size: [width, height, 1],
            ..Default::default()
        }
    }

    pub fn set_all_clear_value(&mut self, v: f32) {
        self.clear_value = [v; 4];
    }

    /// Number of array layers addressed by subresources.
    #[inline]
    pub fn layers(&self) -> u32 {
        match self.ty {
            TextureType::Texture2DArray => self.num_array.max(1),
            _ => 1,
        }
    }

    /// Number of mip levels addressed by subresources.
    #[inline]
    pub fn levels(&self) -> u32 {
        self.num_levels.max(1)
    }
}

/// A single (level, layer, face) surface of a texture.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
pub struct TextureSubresource {
    pub texture: TextureHandle,
    pub level: u32,
    pub layer: u32,
    pub face: u32,
}

impl TextureSubresource {
    pub fn new(texture: TextureHandle, level: u32, layer: u32, face: u32) -> Self {
        TextureSubresource {
            texture,
            level,
            layer,
            face,
        }
    }
}

impl From<TextureHandle> for TextureSubresource {
    fn from(texture: TextureHandle) -> Self {
        TextureSubresource::new(texture, 0, 0, 0)
    }
}

impl fmt::Display for TextureSubresource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} level {} layer {} face {}",
            self.texture, self.level, self.layer, self.face
        )
    }
}

/// A byte range of a buffer. `size` of `None` spans to the end.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferSubresource {
    pub buffer: VertexBufferHandle,
    pub offset: u32,
    pub size: Option<u32>,
}

impl BufferSubresource {
    pub fn new(buffer: VertexBufferHandle, offset: u32, size: Option<u32>) -> Self {
        BufferSubresource {
            buffer,
            offset,
            size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadOp {
    Load,
    Clear,
    DontCare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreOp {
    Store,
    DontCare,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    pub attachment: TextureSubresource,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
}

impl Default for AttachmentDescriptor {
    fn default() -> Self {
        AttachmentDescriptor {
            attachment: TextureSubresource::default(),
            load_op: LoadOp::DontCare,
            store_op: StoreOp::DontCare,
        }
    }
}

impl AttachmentDescriptor {
    pub fn new<T>(attachment: T, load_op: LoadOp, store_op: StoreOp) -> Self
    where
        T: Into<TextureSubresource>,
    {
        AttachmentDescriptor {
            attachment: attachment.into(),
            load_op,
            store_op,
        }
    }
}

/// One ordered stage of a job. `usages` holds the usage of every attachment
/// of the job, in attachment order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubpassDescriptor {
    pub name: String,
    pub usages: Vec<ResourceState>,
}

impl SubpassDescriptor {
    pub fn new<T: Into<String>>(name: T, usages: Vec<ResourceState>) -> Self {
        SubpassDescriptor {
            name: name.into(),
            usages,
        }
    }
}

/// Describes a render pass or a compute job.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDescriptor {
    pub is_compute: bool,
    pub attachments: Vec<AttachmentDescriptor>,
    pub subpasses: Vec<SubpassDescriptor>,
    /// Provides the shader sources of the programs used by this job.
    #[serde(skip)]
    pub loader: Option<Rc<dyn ShaderLoader>>,
}

impl fmt::Debug for JobDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("JobDescriptor")
            .field("is_compute", &self.is_compute)
            .field("attachments", &self.attachments)
            .field("subpasses", &self.subpasses)
            .field("loader", &self.loader.is_some())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layout_hash() {
        let mut vd = VertexDescriptor::default();
        vd.stride = 20;
        vd.attribs.push(VertexAttrib::new("in_position", Format::R32G32B32Float, 0));
        vd.attribs.push(VertexAttrib::new("in_texcoord0", Format::R32G32Float, 12));

        let expected = 20 + (Format::R32G32B32Float as u32) + 12 + (Format::R32G32Float as u32);
        assert_eq!(vd.layout_hash(), expected);

        let mut other = vd.clone();
        other.attribs[1].offset = 16;
        assert_ne!(vd.layout_hash(), other.layout_hash());
    }

    #[test]
    fn find_attrib() {
        let mut vd = VertexDescriptor::default();
        vd.attribs.push(VertexAttrib::new("in_position", Format::R32G32B32Float, 0));
        vd.attribs.push(VertexAttrib::new("in_color", Format::R8G8B8A8Uint, 12));

        assert!(vd.find_attrib("in_position", 3).is_some());
        assert!(vd.find_attrib("in_position", 4).is_none());
        assert!(vd.find_attrib("in_color", 4).is_some());
        assert!(vd.find_attrib("in_normal", 3).is_none());
    }

    #[test]
    fn texture_defaults() {
        let td = TextureDescriptor::default();
        assert_eq!(td.clear_value, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(td.levels(), 1);
        assert_eq!(td.layers(), 1);

        let td = TextureDescriptor::render_target("color", Format::R8G8B8A8Unorm, 256, 128);
        assert!(td.is_renderable);
        assert_eq!(td.size, [256, 128, 1]);
    }

    #[test]
    fn from_json() {
        let td: TextureDescriptor = serde_json::from_str(
            r#"{ "name": "shadow", "format": "D24Unorm", "is_renderable": true, "size": [1024, 1024, 1] }"#,
        )
        .unwrap();

        assert_eq!(td.format, Format::D24Unorm);
        assert_eq!(td.num_levels, 1);
        assert_eq!(td.clear_value, [0.0, 0.0, 0.0, 1.0]);
    }
}
