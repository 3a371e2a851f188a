//! The texture, vertex buffer and index buffer tables of a instance.

use gl::types::*;

use super::label;
use crate::backend::gl::types::{self, TextureFormat};
use crate::backend::Device;
use crate::errors::*;
use crate::ngl::descriptor::{TextureDescriptor, TextureSubresource, VertexDescriptor};
use crate::ngl::format::{Format, TextureFilter, TextureType};
use crate::ngl::{IndexBufferHandle, TextureHandle, VertexBufferHandle};
use crate::utils::arena::Arena;

#[derive(Debug, Clone)]
pub struct TextureRecord {
    pub descriptor: TextureDescriptor,
    /// The GL texture or renderbuffer name, `0` for the default framebuffer.
    pub object: GLuint,
    pub target: GLenum,
    pub internal_format: GLenum,
    pub is_color: bool,
    /// True if the texture is currently set up for depth comparison.
    pub shadow_sampler: bool,
}

impl TextureRecord {
    /// The record of the default framebuffer.
    pub fn display(width: u32, height: u32) -> Self {
        TextureRecord {
            descriptor: TextureDescriptor {
                name: "display".into(),
                is_renderable: true,
                size: [width, height, 1],
                ..Default::default()
            },
            object: 0,
            target: gl::TEXTURE_2D,
            internal_format: 0,
            is_color: true,
            shadow_sampler: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VertexBufferRecord {
    pub descriptor: VertexDescriptor,
    pub vbo: GLuint,
    pub hash: u32,
    /// Size of the buffer in bytes.
    pub datasize: usize,
}

#[derive(Debug, Clone)]
pub struct IndexBufferRecord {
    pub format: Format,
    pub ty: GLenum,
    pub num_indices: u32,
    pub ebo: GLuint,
}

/// The pixels of a texture level read back from the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureContent {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

pub struct Resources {
    pub textures: Arena<TextureHandle, TextureRecord>,
    pub vertex_buffers: Arena<VertexBufferHandle, VertexBufferRecord>,
    pub index_buffers: Arena<IndexBufferHandle, IndexBufferRecord>,
    /// Largest width or height of a 2D texture.
    pub max_texture_size: u32,
    pub labels: bool,
}

impl Resources {
    pub fn new(display_width: u32, display_height: u32) -> Self {
        Resources {
            textures: Arena::with_reserved(TextureRecord::display(display_width, display_height)),
            vertex_buffers: Arena::new(),
            index_buffers: Arena::new(),
            max_texture_size: ::std::u32::MAX,
            labels: false,
        }
    }

    /// Creates a texture if `handle` is nil, or respecifies the texture
    /// addressed by `handle` in place. `data` holds one surface per level
    /// (and per layer or face, layer/face minor).
    pub fn try_gen_texture(
        &mut self,
        device: &mut dyn Device,
        handle: TextureHandle,
        descriptor: &TextureDescriptor,
        data: Option<&[Vec<u8>]>,
    ) -> Result<TextureHandle> {
        let [width, height, _] = descriptor.size;
        if width > self.max_texture_size || height > self.max_texture_size {
            return Err(
                ResourceError::TextureTooLarge(width, height, self.max_texture_size).into(),
            );
        }

        if descriptor.is_renderable && data.is_some() {
            return Err(ResourceError::RenderableWithData(descriptor.name.clone()).into());
        }

        if !descriptor.is_renderable && !descriptor.unordered_access && data.is_none() {
            return Err(ResourceError::MissingPixelData(descriptor.name.clone()).into());
        }

        if !handle.is_nil() && !self.textures.contains(handle) {
            return Err(ResourceError::IllegalHandle("texture", handle.to_string()).into());
        }

        let mut record = if descriptor.ty == TextureType::Renderbuffer {
            let internal = types::renderbuffer_format(descriptor.format)
                .ok_or(ResourceError::UnsupportedFormat(descriptor.format, "renderbuffer"))?;
            self.create_renderbuffer(device, descriptor, internal)
        } else {
            let format = types::texture_format(descriptor.format)
                .ok_or(ResourceError::UnsupportedFormat(descriptor.format, "texture"))?;
            check_surfaces(descriptor, &format, data.unwrap_or(&[]))?;
            self.create_texture(device, descriptor, format, data)
        };

        if handle.is_nil() {
            return Ok(self.textures.insert(record));
        }

        if let Some(v) = self.textures.get_mut(handle) {
            delete_texture(device, v);
            record.shadow_sampler = false;
            *v = record;
        }

        Ok(handle)
    }

    fn create_renderbuffer(
        &mut self,
        device: &mut dyn Device,
        descriptor: &TextureDescriptor,
        internal: GLenum,
    ) -> TextureRecord {
        let size = [descriptor.size[0] as GLsizei, descriptor.size[1] as GLsizei];

        let rbo = device.gen_renderbuffer();
        device.bind_renderbuffer(rbo);
        label(device, self.labels, gl::RENDERBUFFER, rbo, &descriptor.name);

        if descriptor.samples < 2 {
            device.renderbuffer_storage(internal, size);
        } else {
            device.renderbuffer_storage_multisample(descriptor.samples as GLsizei, internal, size);
        }

        device.bind_renderbuffer(0);

        TextureRecord {
            descriptor: descriptor.clone(),
            object: rbo,
            target: gl::RENDERBUFFER,
            internal_format: internal,
            is_color: !descriptor.format.is_depth(),
            shadow_sampler: false,
        }
    }

    fn create_texture(
        &mut self,
        device: &mut dyn Device,
        descriptor: &TextureDescriptor,
        format: TextureFormat,
        data: Option<&[Vec<u8>]>,
    ) -> TextureRecord {
        let target = GLenum::from(descriptor.ty);
        let levels = descriptor.levels() as GLsizei;
        let (w, h) = (descriptor.size[0], descriptor.size[1]);

        let object = device.gen_texture();
        device.bind_texture(target, object);
        label(device, self.labels, gl::TEXTURE, object, &descriptor.name);

        let (min, mag) = types::texture_filter(descriptor.filter);
        device.tex_parameter_i(target, gl::TEXTURE_MIN_FILTER, min as GLint);
        device.tex_parameter_i(target, gl::TEXTURE_MAG_FILTER, mag as GLint);
        if descriptor.filter == TextureFilter::Aniso4 {
            device.tex_parameter_i(target, types::TEXTURE_MAX_ANISOTROPY_EXT, 4);
        }

        let wrap = GLenum::from(descriptor.wrap) as GLint;
        device.tex_parameter_i(target, gl::TEXTURE_WRAP_S, wrap);
        device.tex_parameter_i(target, gl::TEXTURE_WRAP_T, wrap);
        device.tex_parameter_i(target, gl::TEXTURE_WRAP_R, wrap);

        let size = [w as GLsizei, h as GLsizei];
        let surfaces = data.unwrap_or(&[]);
        let mut uploaded_levels = 0;

        match descriptor.ty {
            TextureType::Texture2DArray => {
                let layers = descriptor.layers();
                device.tex_storage_3d(
                    target,
                    levels,
                    format.internal,
                    [size[0], size[1], layers as GLsizei],
                );

                for (i, v) in surfaces.iter().enumerate() {
                    let (level, layer) = (i as u32 / layers, i as u32 % layers);
                    let extent = mip_extent(w, h, level);

                    if format.compressed {
                        device.compressed_tex_sub_image_3d(
                            target,
                            level as GLint,
                            layer as GLint,
                            extent,
                            format.internal,
                            v,
                        );
                    } else {
                        device.tex_sub_image_3d(
                            target,
                            level as GLint,
                            layer as GLint,
                            extent,
                            format.format,
                            format.ty,
                            v,
                        );
                    }

                    uploaded_levels = uploaded_levels.max(level + 1);
                }
            }
            TextureType::Cube => {
                device.tex_storage_2d(target, levels, format.internal, size);

                for (i, v) in surfaces.iter().enumerate() {
                    let (level, face) = (i as u32 / 6, i as u32 % 6);
                    let face_target = gl::TEXTURE_CUBE_MAP_POSITIVE_X + face;
                    let extent = mip_extent(w, h, level);

                    if format.compressed {
                        device.compressed_tex_sub_image_2d(
                            face_target,
                            level as GLint,
                            extent,
                            format.internal,
                            v,
                        );
                    } else {
                        device.tex_sub_image_2d(
                            face_target,
                            level as GLint,
                            extent,
                            format.format,
                            format.ty,
                            v,
                        );
                    }

                    uploaded_levels = uploaded_levels.max(level + 1);
                }
            }
            _ => {
                device.tex_storage_2d(target, levels, format.internal, size);

                for (level, v) in surfaces.iter().enumerate() {
                    let level = level as u32;
                    let extent = mip_extent(w, h, level);

                    if format.compressed {
                        device.compressed_tex_sub_image_2d(
                            target,
                            level as GLint,
                            extent,
                            format.internal,
                            v,
                        );
                    } else {
                        device.tex_sub_image_2d(
                            target,
                            level as GLint,
                            extent,
                            format.format,
                            format.ty,
                            v,
                        );
                    }

                    uploaded_levels = level + 1;
                }
            }
        }

        if descriptor.filter.is_mipmapped()
            && !format.compressed
            && descriptor.levels() > uploaded_levels.max(1)
        {
            device.generate_mipmap(target);
        }

        device.bind_texture(target, 0);

        TextureRecord {
            descriptor: descriptor.clone(),
            object,
            target,
            internal_format: format.internal,
            is_color: format.color,
            shadow_sampler: false,
        }
    }

    /// Creates a vertex buffer of `num` vertices if `handle` is nil, or
    /// respecifies the buffer addressed by `handle`.
    pub fn try_gen_vertex_buffer(
        &mut self,
        device: &mut dyn Device,
        handle: VertexBufferHandle,
        descriptor: &VertexDescriptor,
        num: u32,
        data: Option<&[u8]>,
    ) -> Result<VertexBufferHandle> {
        let size = num as usize * descriptor.stride as usize;
        check_data("Vertex buffer", size, data)?;

        let vbo = if handle.is_nil() {
            device.gen_buffer()
        } else {
            match self.vertex_buffers.get(handle) {
                Some(v) => v.vbo,
                None => {
                    return Err(
                        ResourceError::IllegalHandle("vertex buffer", handle.to_string()).into(),
                    );
                }
            }
        };

        let record = VertexBufferRecord {
            descriptor: descriptor.clone(),
            vbo,
            hash: descriptor.layout_hash(),
            datasize: size,
        };

        device.bind_buffer(gl::ARRAY_BUFFER, vbo);
        device.buffer_data(gl::ARRAY_BUFFER, record.datasize, data, gl::STATIC_DRAW);
        device.bind_buffer(gl::ARRAY_BUFFER, 0);
        label(device, self.labels, gl::BUFFER, vbo, "vertex_buffer");

        if handle.is_nil() {
            Ok(self.vertex_buffers.insert(record))
        } else {
            if let Some(v) = self.vertex_buffers.get_mut(handle) {
                *v = record;
            }

            Ok(handle)
        }
    }

    /// Creates a index buffer of `num` indices if `handle` is nil, or
    /// respecifies the buffer addressed by `handle`.
    pub fn try_gen_index_buffer(
        &mut self,
        device: &mut dyn Device,
        handle: IndexBufferHandle,
        format: Format,
        num: u32,
        data: Option<&[u8]>,
    ) -> Result<IndexBufferHandle> {
        let (ty, stride) = types::index_format(format)
            .ok_or(ResourceError::UnsupportedFormat(format, "index buffer"))?;

        let size = num as usize * stride as usize;
        check_data("Index buffer", size, data)?;

        let ebo = if handle.is_nil() {
            device.gen_buffer()
        } else {
            match self.index_buffers.get(handle) {
                Some(v) => v.ebo,
                None => {
                    return Err(
                        ResourceError::IllegalHandle("index buffer", handle.to_string()).into(),
                    );
                }
            }
        };

        let record = IndexBufferRecord {
            format,
            ty,
            num_indices: num,
            ebo,
        };

        device.bind_buffer(gl::ARRAY_BUFFER, ebo);
        device.buffer_data(gl::ARRAY_BUFFER, size, data, gl::STATIC_DRAW);
        device.bind_buffer(gl::ARRAY_BUFFER, 0);
        label(device, self.labels, gl::BUFFER, ebo, "index_buffer");

        if handle.is_nil() {
            Ok(self.index_buffers.insert(record))
        } else {
            if let Some(v) = self.index_buffers.get_mut(handle) {
                *v = record;
            }

            Ok(handle)
        }
    }

    /// Reads back a level of a texture, or the visible area of the default
    /// framebuffer if the texture is nil. This stalls the pipeline.
    pub fn get_texture_content(
        &self,
        device: &mut dyn Device,
        subresource: TextureSubresource,
        format: Format,
    ) -> Option<TextureContent> {
        let (fmt, ty, bpp) = match types::readback_format(format) {
            Some(v) => v,
            None => {
                error!("Texture readback with unsupported format {:?}.", format);
                return None;
            }
        };

        if subresource.texture.is_nil() {
            device.bind_framebuffer(gl::FRAMEBUFFER, 0);

            let vp = device.get_viewport();
            let (width, height) = (vp[2].max(0) as u32, vp[3].max(0) as u32);

            let mut data = vec![0; (width * height * bpp) as usize];
            device.read_pixels([vp[0], vp[1], width as i32, height as i32], fmt, ty, &mut data);

            return Some(TextureContent {
                width,
                height,
                data,
            });
        }

        let texture = match self.textures.get(subresource.texture) {
            Some(v) => v,
            None => {
                error!("Texture readback of illegal {}.", subresource.texture);
                return None;
            }
        };

        let level = subresource.level;
        let fbo = device.gen_framebuffer();
        device.bind_framebuffer(gl::READ_FRAMEBUFFER, fbo);

        match texture.descriptor.ty {
            TextureType::Texture2D => device.framebuffer_texture_2d(
                gl::READ_FRAMEBUFFER,
                gl::COLOR_ATTACHMENT0,
                gl::TEXTURE_2D,
                texture.object,
                level as GLint,
            ),
            TextureType::Texture2DArray => device.framebuffer_texture_layer(
                gl::READ_FRAMEBUFFER,
                gl::COLOR_ATTACHMENT0,
                texture.object,
                level as GLint,
                subresource.layer as GLint,
            ),
            TextureType::Cube => device.framebuffer_texture_2d(
                gl::READ_FRAMEBUFFER,
                gl::COLOR_ATTACHMENT0,
                gl::TEXTURE_CUBE_MAP_POSITIVE_X + subresource.face,
                texture.object,
                level as GLint,
            ),
            TextureType::Renderbuffer => {
                error!("Texture readback of renderbuffer {}.", texture.descriptor.name);
                device.delete_framebuffer(fbo);
                return None;
            }
        }

        let width = texture.descriptor.size[0] >> level;
        let height = texture.descriptor.size[1] >> level;
        let mut data = vec![0; (width * height * bpp) as usize];

        device.read_buffer(gl::COLOR_ATTACHMENT0);
        device.read_pixels([0, 0, width as i32, height as i32], fmt, ty, &mut data);
        device.delete_framebuffer(fbo);

        Some(TextureContent {
            width,
            height,
            data,
        })
    }

    /// Copies the content of a vertex buffer. This waits for every pending
    /// GPU command.
    pub fn get_vertex_buffer_content(
        &self,
        device: &mut dyn Device,
        buffer: VertexBufferHandle,
    ) -> Option<Vec<u8>> {
        let v = match self.vertex_buffers.get(buffer) {
            Some(v) => v,
            None => {
                error!("Readback of illegal {}.", buffer);
                return None;
            }
        };

        if v.datasize == 0 {
            warn!("Readback of {} with zero size.", buffer);
            return Some(Vec::new());
        }

        device.memory_barrier(gl::ALL_BARRIER_BITS);
        device.finish();

        device.bind_buffer(gl::ARRAY_BUFFER, v.vbo);
        let data = device.read_buffer_data(gl::ARRAY_BUFFER, v.datasize);
        device.bind_buffer(gl::ARRAY_BUFFER, 0);

        if data.is_none() {
            error!("Can not map {} (GL name {}).", buffer, v.vbo);
        }

        data
    }

    /// Deletes every GL object of the tables.
    pub fn clear(&mut self, device: &mut dyn Device) {
        for v in self.textures.drain() {
            delete_texture(device, &v);
        }

        for v in self.vertex_buffers.drain() {
            device.delete_buffer(v.vbo);
        }

        for v in self.index_buffers.drain() {
            device.delete_buffer(v.ebo);
        }
    }
}

fn delete_texture(device: &mut dyn Device, texture: &TextureRecord) {
    if texture.object == 0 {
        return;
    }

    if texture.target == gl::RENDERBUFFER {
        device.delete_renderbuffer(texture.object);
    } else {
        device.delete_texture(texture.object);
    }
}

#[inline]
/// Fails if `data` holds less than the `size` bytes `glBufferData` reads.
fn check_data(name: &str, size: usize, data: Option<&[u8]>) -> Result<()> {
    match data {
        Some(v) if v.len() < size => {
            Err(ResourceError::InsufficientData(name.into(), size, v.len()).into())
        }
        _ => Ok(()),
    }
}

/// Fails if any surface of `surfaces` is shorter than its level extent.
fn check_surfaces(
    descriptor: &TextureDescriptor,
    format: &TextureFormat,
    surfaces: &[Vec<u8>],
) -> Result<()> {
    let per_level = match descriptor.ty {
        TextureType::Texture2DArray => descriptor.layers().max(1),
        TextureType::Cube => 6,
        _ => 1,
    };

    for (i, v) in surfaces.iter().enumerate() {
        let level = i as u32 / per_level;
        let extent = mip_extent(descriptor.size[0], descriptor.size[1], level);

        if let Some(size) = format.surface_size(extent) {
            if v.len() < size {
                let name = format!("Surface {} of texture '{}'", i, descriptor.name);
                return Err(ResourceError::InsufficientData(name, size, v.len()).into());
            }
        }
    }

    Ok(())
}

fn mip_extent(width: u32, height: u32, level: u32) -> [GLsizei; 2] {
    [
        (width >> level).max(1) as GLsizei,
        (height >> level).max(1) as GLsizei,
    ]
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::headless::{Call, HeadlessDevice};

    fn setup() -> (HeadlessDevice, Resources) {
        let mut resources = Resources::new(1280, 720);
        resources.max_texture_size = 4096;
        (HeadlessDevice::new(), resources)
    }

    fn sampled(name: &str) -> TextureDescriptor {
        TextureDescriptor {
            name: name.into(),
            format: Format::R8G8B8A8Unorm,
            size: [4, 4, 1],
            ..Default::default()
        }
    }

    #[test]
    fn configuration_errors() {
        let (mut device, mut resources) = setup();
        let log = device.calls();

        let mut td = TextureDescriptor::render_target("huge", Format::R8G8B8A8Unorm, 8192, 16);
        let err = resources
            .try_gen_texture(&mut device, TextureHandle::nil(), &td, None)
            .unwrap_err();
        match err.downcast_ref::<ResourceError>() {
            Some(ResourceError::TextureTooLarge(8192, 16, 4096)) => {}
            v => panic!("unexpected {:?}", v),
        }

        td.size = [16, 16, 1];
        let data = vec![vec![0; 16 * 16 * 4]];
        let err = resources
            .try_gen_texture(&mut device, TextureHandle::nil(), &td, Some(&data))
            .unwrap_err();
        match err.downcast_ref::<ResourceError>() {
            Some(ResourceError::RenderableWithData(_)) => {}
            v => panic!("unexpected {:?}", v),
        }

        let err = resources
            .try_gen_texture(&mut device, TextureHandle::nil(), &sampled("empty"), None)
            .unwrap_err();
        match err.downcast_ref::<ResourceError>() {
            Some(ResourceError::MissingPixelData(_)) => {}
            v => panic!("unexpected {:?}", v),
        }

        let stale = TextureHandle::from(crate::utils::handle::Handle::new(7, 1));
        let err = resources
            .try_gen_texture(&mut device, stale, &td, None)
            .unwrap_err();
        match err.downcast_ref::<ResourceError>() {
            Some(ResourceError::IllegalHandle("texture", _)) => {}
            v => panic!("unexpected {:?}", v),
        }

        assert!(log.borrow().iter().all(|v| match *v {
            Call::GenTexture(_) | Call::GenRenderbuffer(_) => false,
            _ => true,
        }));
    }

    #[test]
    fn short_data() {
        let (mut device, mut resources) = setup();
        let log = device.calls();

        let insufficient = |err: Error| match err.downcast_ref::<ResourceError>() {
            Some(ResourceError::InsufficientData(_, expected, provided)) => (*expected, *provided),
            v => panic!("unexpected {:?}", v),
        };

        let vd = VertexDescriptor {
            stride: 20,
            ..Default::default()
        };
        let err = resources
            .try_gen_vertex_buffer(&mut device, VertexBufferHandle::nil(), &vd, 4, Some(&[0; 4]))
            .unwrap_err();
        assert_eq!(insufficient(err), (80, 4));

        let err = resources
            .try_gen_index_buffer(
                &mut device,
                IndexBufferHandle::nil(),
                Format::R32Uint,
                3,
                Some(&[0; 8]),
            )
            .unwrap_err();
        assert_eq!(insufficient(err), (12, 8));

        let err = resources
            .try_gen_texture(
                &mut device,
                TextureHandle::nil(),
                &sampled("albedo"),
                Some(&[vec![0; 4]]),
            )
            .unwrap_err();
        assert_eq!(insufficient(err), (64, 4));

        // The second level of a 4x4 cube is 2x2 per face.
        let mut td = sampled("sky");
        td.ty = TextureType::Cube;
        td.num_levels = 2;
        let mut data = vec![vec![0; 64]; 6];
        data.push(vec![0; 15]);
        let err = resources
            .try_gen_texture(&mut device, TextureHandle::nil(), &td, Some(&data))
            .unwrap_err();
        assert_eq!(insufficient(err), (16, 15));

        assert!(log.borrow().iter().all(|v| match *v {
            Call::GenTexture(_) | Call::GenBuffer(_) | Call::BufferData { .. } => false,
            _ => true,
        }));
    }

    #[test]
    fn texture_uploads() {
        let (mut device, mut resources) = setup();
        let log = device.calls();

        let mut td = sampled("albedo");
        td.num_levels = 3;
        td.filter = TextureFilter::LinearMipmapped;
        let data = vec![vec![0; 4 * 4 * 4]];

        let handle = resources
            .try_gen_texture(&mut device, TextureHandle::nil(), &td, Some(&data))
            .unwrap();
        assert_eq!(handle.index(), 1);

        let log = log.borrow();
        assert!(log.contains(&Call::TexStorage2D {
            target: gl::TEXTURE_2D,
            levels: 3,
            internal_format: gl::RGBA8,
            size: [4, 4],
        }));
        assert!(log.contains(&Call::GenerateMipmap(gl::TEXTURE_2D)));
        assert_eq!(log.last(), Some(&Call::BindTexture(gl::TEXTURE_2D, 0)));

        let record = resources.textures.get(handle).unwrap();
        assert!(record.is_color);
        assert_eq!(record.internal_format, gl::RGBA8);
    }

    #[test]
    fn cube_faces() {
        let (mut device, mut resources) = setup();
        let log = device.calls();

        let mut td = sampled("sky");
        td.ty = TextureType::Cube;
        let data = vec![vec![0; 4 * 4 * 4]; 6];

        resources
            .try_gen_texture(&mut device, TextureHandle::nil(), &td, Some(&data))
            .unwrap();

        let faces: Vec<_> = log
            .borrow()
            .iter()
            .filter_map(|v| match *v {
                Call::TexSubImage { target, .. } => Some(target),
                _ => None,
            })
            .collect();

        let expected: Vec<_> = (0..6).map(|v| gl::TEXTURE_CUBE_MAP_POSITIVE_X + v).collect();
        assert_eq!(faces, expected);
    }

    #[test]
    fn renderbuffers() {
        let (mut device, mut resources) = setup();
        let log = device.calls();

        let mut td = TextureDescriptor::render_target("depth", Format::D24Unorm, 64, 64);
        td.ty = TextureType::Renderbuffer;
        td.samples = 4;

        let handle = resources
            .try_gen_texture(&mut device, TextureHandle::nil(), &td, None)
            .unwrap();
        assert!(!resources.textures.get(handle).unwrap().is_color);
        assert!(log.borrow().contains(&Call::RenderbufferStorage {
            samples: 4,
            internal_format: gl::DEPTH_COMPONENT24,
            size: [64, 64],
        }));

        td.format = Format::R32Float;
        let err = resources
            .try_gen_texture(&mut device, TextureHandle::nil(), &td, None)
            .unwrap_err();
        match err.downcast_ref::<ResourceError>() {
            Some(ResourceError::UnsupportedFormat(Format::R32Float, _)) => {}
            v => panic!("unexpected {:?}", v),
        }
    }

    #[test]
    fn respecify_in_place() {
        let (mut device, mut resources) = setup();
        let log = device.calls();

        let td = TextureDescriptor::render_target("color", Format::R8G8B8A8Unorm, 32, 32);
        let handle = resources
            .try_gen_texture(&mut device, TextureHandle::nil(), &td, None)
            .unwrap();
        let object = resources.textures.get(handle).unwrap().object;

        let td = TextureDescriptor::render_target("color", Format::R8G8B8A8Unorm, 64, 64);
        let again = resources
            .try_gen_texture(&mut device, handle, &td, None)
            .unwrap();

        assert_eq!(again, handle);
        assert!(log.borrow().contains(&Call::DeleteTexture(object)));
        assert_eq!(resources.textures.get(handle).unwrap().descriptor.size, [64, 64, 1]);
    }

    #[test]
    fn buffers() {
        let (mut device, mut resources) = setup();
        let log = device.calls();

        let mut vd = VertexDescriptor::default();
        vd.stride = 12;
        let vb = resources
            .try_gen_vertex_buffer(&mut device, VertexBufferHandle::nil(), &vd, 10, None)
            .unwrap();
        assert_eq!(resources.vertex_buffers.get(vb).unwrap().datasize, 120);

        let ib = resources
            .try_gen_index_buffer(&mut device, IndexBufferHandle::nil(), Format::R16Uint, 6, None)
            .unwrap();
        let record = resources.index_buffers.get(ib).unwrap();
        assert_eq!(record.ty, gl::UNSIGNED_SHORT);
        assert_eq!(record.num_indices, 6);

        assert!(log.borrow().contains(&Call::BufferData {
            target: gl::ARRAY_BUFFER,
            size: 12,
            usage: gl::STATIC_DRAW,
        }));

        assert!(resources
            .try_gen_index_buffer(&mut device, IndexBufferHandle::nil(), Format::R8Uint, 6, None)
            .is_err());

        let stale = VertexBufferHandle::from(crate::utils::handle::Handle::new(3, 1));
        assert!(resources
            .try_gen_vertex_buffer(&mut device, stale, &vd, 1, None)
            .is_err());
    }

    #[test]
    fn readback() {
        let (mut device, mut resources) = setup();

        let td = TextureDescriptor::render_target("color", Format::R8G8B8A8Unorm, 32, 16);
        let handle = resources
            .try_gen_texture(&mut device, TextureHandle::nil(), &td, None)
            .unwrap();

        let content = resources
            .get_texture_content(
                &mut device,
                TextureSubresource::new(handle, 1, 0, 0),
                Format::R8G8B8A8Unorm,
            )
            .unwrap();
        assert_eq!((content.width, content.height), (16, 8));
        assert_eq!(content.data.len(), 16 * 8 * 4);

        assert!(resources
            .get_texture_content(&mut device, handle.into(), Format::D24Unorm)
            .is_none());

        // The viewport is (x, y, width, height).
        device.viewport([10, 10, 100, 50]);
        let log = device.calls();
        let content = resources
            .get_texture_content(&mut device, TextureHandle::nil().into(), Format::R8G8B8A8Unorm)
            .unwrap();
        assert_eq!((content.width, content.height), (100, 50));
        assert_eq!(content.data.len(), 100 * 50 * 4);
        assert!(log.borrow().contains(&Call::ReadPixels(
            [10, 10, 100, 50],
            gl::RGBA,
            gl::UNSIGNED_BYTE
        )));

        let mut vd = VertexDescriptor::default();
        vd.stride = 4;
        let vb = resources
            .try_gen_vertex_buffer(&mut device, VertexBufferHandle::nil(), &vd, 4, Some(&[7; 16]))
            .unwrap();
        assert_eq!(
            resources.get_vertex_buffer_content(&mut device, vb),
            Some(vec![7; 16])
        );
    }
}
