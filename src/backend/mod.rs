//! The backend of the instance, which should be responsible for only one
//! thing: issuing the low-level OpenGL calls the instance decided on.
//!
//! Every GL entry point used by the instance is a method of `Device`, which
//! is implemented by the real `gl::GLDevice` and by the recording
//! `headless::HeadlessDevice`.

pub mod capabilities;
pub mod gl;
pub mod headless;

use ::gl::types::{GLbitfield, GLenum, GLint, GLsizei, GLuint};

/// A vertex input of a linked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveAttribute {
    pub name: String,
    pub ty: GLenum,
    pub size: GLint,
    pub location: GLint,
}

/// A resource of a program interface. `location` is the uniform location or,
/// for blocks, the buffer binding point. The `ty` of a block is the
/// interface it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveResource {
    pub name: String,
    pub ty: GLenum,
    pub size: GLint,
    pub location: GLint,
}

/// The values of a `glUniform*v` call. The number of array elements is
/// derived from the length of the slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformData<'a> {
    Float(&'a [f32]),
    Float2(&'a [f32]),
    Float4(&'a [f32]),
    Mat4(&'a [f32]),
    Int(&'a [i32]),
    Int2(&'a [i32]),
    Int4(&'a [i32]),
    UInt(&'a [u32]),
    UInt2(&'a [u32]),
    UInt4(&'a [u32]),
}

impl<'a> UniformData<'a> {
    /// Returns the number of array elements.
    pub fn count(&self) -> GLsizei {
        let (len, components) = match *self {
            UniformData::Float(v) => (v.len(), 1),
            UniformData::Float2(v) => (v.len(), 2),
            UniformData::Float4(v) => (v.len(), 4),
            UniformData::Mat4(v) => (v.len(), 16),
            UniformData::Int(v) => (v.len(), 1),
            UniformData::Int2(v) => (v.len(), 2),
            UniformData::Int4(v) => (v.len(), 4),
            UniformData::UInt(v) => (v.len(), 1),
            UniformData::UInt2(v) => (v.len(), 2),
            UniformData::UInt4(v) => (v.len(), 4),
        };

        (len / components) as GLsizei
    }
}

pub trait Device {
    fn get_error(&mut self) -> GLenum;
    fn get_integer(&mut self, pname: GLenum) -> GLint;
    fn get_integer_i(&mut self, pname: GLenum, index: GLuint) -> GLint;
    fn get_string(&mut self, name: GLenum) -> Option<String>;
    fn get_viewport(&mut self) -> [i32; 4];
    fn get_framebuffer_attachment_parameter(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        pname: GLenum,
    ) -> GLint;
    fn extensions(&mut self) -> Vec<String>;

    fn enable(&mut self, cap: GLenum);
    fn disable(&mut self, cap: GLenum);
    fn enable_i(&mut self, cap: GLenum, index: GLuint);
    fn disable_i(&mut self, cap: GLenum, index: GLuint);
    fn viewport(&mut self, rect: [i32; 4]);
    fn scissor(&mut self, rect: [i32; 4]);
    fn cull_face(&mut self, mode: GLenum);
    fn blend_func(&mut self, src: GLenum, dst: GLenum);
    fn blend_func_i(&mut self, buf: GLuint, src: GLenum, dst: GLenum);
    fn blend_func_separate(
        &mut self,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    );
    fn blend_func_separate_i(
        &mut self,
        buf: GLuint,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    );
    fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool);
    fn color_mask_i(&mut self, buf: GLuint, r: bool, g: bool, b: bool, a: bool);
    fn depth_func(&mut self, func: GLenum);
    fn depth_mask(&mut self, flag: bool);
    fn depth_range(&mut self, near: f32, far: f32);
    fn polygon_offset(&mut self, factor: f32, units: f32);
    fn line_width(&mut self, width: f32);
    fn patch_vertices(&mut self, count: GLint);
    fn pixel_store(&mut self, pname: GLenum, param: GLint);

    fn clear_color(&mut self, color: [f32; 4]);
    fn clear_depth(&mut self, depth: f32);
    fn clear(&mut self, mask: GLbitfield);
    fn clear_buffer_fv(&mut self, buffer: GLenum, draw_buffer: GLint, value: [f32; 4]);
    fn invalidate_framebuffer(&mut self, target: GLenum, attachments: &[GLenum]);

    fn gen_framebuffer(&mut self) -> GLuint;
    fn delete_framebuffer(&mut self, fbo: GLuint);
    fn bind_framebuffer(&mut self, target: GLenum, fbo: GLuint);
    fn framebuffer_texture_2d(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    );
    fn framebuffer_texture_layer(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture: GLuint,
        level: GLint,
        layer: GLint,
    );
    fn framebuffer_renderbuffer(&mut self, target: GLenum, attachment: GLenum, rbo: GLuint);
    fn check_framebuffer_status(&mut self, target: GLenum) -> GLenum;
    fn draw_buffers(&mut self, buffers: &[GLenum]);
    fn read_buffer(&mut self, mode: GLenum);
    fn read_pixels(&mut self, rect: [i32; 4], format: GLenum, ty: GLenum, pixels: &mut [u8]);

    fn gen_texture(&mut self) -> GLuint;
    fn delete_texture(&mut self, texture: GLuint);
    fn bind_texture(&mut self, target: GLenum, texture: GLuint);
    fn active_texture(&mut self, unit: GLenum);
    fn tex_parameter_i(&mut self, target: GLenum, pname: GLenum, param: GLint);
    fn tex_storage_2d(
        &mut self,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        size: [GLsizei; 2],
    );
    fn tex_storage_3d(
        &mut self,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        size: [GLsizei; 3],
    );
    fn tex_sub_image_2d(
        &mut self,
        target: GLenum,
        level: GLint,
        size: [GLsizei; 2],
        format: GLenum,
        ty: GLenum,
        data: &[u8],
    );
    fn tex_sub_image_3d(
        &mut self,
        target: GLenum,
        level: GLint,
        layer: GLint,
        size: [GLsizei; 2],
        format: GLenum,
        ty: GLenum,
        data: &[u8],
    );
    fn compressed_tex_sub_image_2d(
        &mut self,
        target: GLenum,
        level: GLint,
        size: [GLsizei; 2],
        internal_format: GLenum,
        data: &[u8],
    );
    fn compressed_tex_sub_image_3d(
        &mut self,
        target: GLenum,
        level: GLint,
        layer: GLint,
        size: [GLsizei; 2],
        internal_format: GLenum,
        data: &[u8],
    );
    fn generate_mipmap(&mut self, target: GLenum);

    fn gen_renderbuffer(&mut self) -> GLuint;
    fn delete_renderbuffer(&mut self, rbo: GLuint);
    fn bind_renderbuffer(&mut self, rbo: GLuint);
    fn renderbuffer_storage(&mut self, internal_format: GLenum, size: [GLsizei; 2]);
    fn renderbuffer_storage_multisample(
        &mut self,
        samples: GLsizei,
        internal_format: GLenum,
        size: [GLsizei; 2],
    );

    fn gen_buffer(&mut self) -> GLuint;
    fn delete_buffer(&mut self, buffer: GLuint);
    fn bind_buffer(&mut self, target: GLenum, buffer: GLuint);
    fn buffer_data(&mut self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum);
    fn bind_buffer_base(&mut self, target: GLenum, index: GLuint, buffer: GLuint);
    fn bind_buffer_range(
        &mut self,
        target: GLenum,
        index: GLuint,
        buffer: GLuint,
        offset: isize,
        size: isize,
    );
    /// Maps the first `size` bytes of the buffer bound to `target` and
    /// returns a copy of them.
    fn read_buffer_data(&mut self, target: GLenum, size: usize) -> Option<Vec<u8>>;

    fn create_shader(&mut self, ty: GLenum) -> GLuint;
    fn shader_source(&mut self, shader: GLuint, source: &str);
    /// Compiles the shader and returns the compile status.
    fn compile_shader(&mut self, shader: GLuint) -> bool;
    fn shader_info_log(&mut self, shader: GLuint) -> String;
    fn delete_shader(&mut self, shader: GLuint);
    fn create_program(&mut self) -> GLuint;
    fn attach_shader(&mut self, program: GLuint, shader: GLuint);
    fn detach_shader(&mut self, program: GLuint, shader: GLuint);
    /// Links the program and returns the link status.
    fn link_program(&mut self, program: GLuint) -> bool;
    fn program_info_log(&mut self, program: GLuint) -> String;
    fn delete_program(&mut self, program: GLuint);
    fn use_program(&mut self, program: GLuint);
    fn active_attributes(&mut self, program: GLuint) -> Vec<ActiveAttribute>;
    fn active_resources(&mut self, program: GLuint, interface: GLenum) -> Vec<ActiveResource>;

    fn uniform(&mut self, location: GLint, data: UniformData);
    fn bind_image_texture(
        &mut self,
        unit: GLuint,
        texture: GLuint,
        level: GLint,
        layered: bool,
        layer: GLint,
        access: GLenum,
        format: GLenum,
    );
    fn memory_barrier(&mut self, barriers: GLbitfield);

    fn gen_vertex_array(&mut self) -> GLuint;
    fn delete_vertex_array(&mut self, vao: GLuint);
    fn bind_vertex_array(&mut self, vao: GLuint);
    fn enable_vertex_attrib_array(&mut self, index: GLuint);
    fn disable_vertex_attrib_array(&mut self, index: GLuint);
    fn vertex_attrib_pointer(
        &mut self,
        index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    );

    fn draw_elements(&mut self, mode: GLenum, count: GLsizei, ty: GLenum);
    fn draw_elements_instanced(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        ty: GLenum,
        instances: GLsizei,
    );
    fn draw_elements_indirect(&mut self, mode: GLenum, ty: GLenum, offset: usize);
    fn dispatch_compute(&mut self, x: GLuint, y: GLuint, z: GLuint);
    fn dispatch_compute_indirect(&mut self, offset: usize);

    fn object_label(&mut self, identifier: GLenum, name: GLuint, label: &str);
    fn flush(&mut self);
    fn finish(&mut self);
}

/// Checks the GL error flag and maps a raised error onto a `failure` error.
pub fn check(device: &mut dyn Device) -> crate::errors::Result<()> {
    match device.get_error() {
        ::gl::NO_ERROR => Ok(()),
        ::gl::INVALID_ENUM => {
            bail!("[GL] An unacceptable value is specified for an enumerated argument.")
        }
        ::gl::INVALID_VALUE => bail!("[GL] A numeric argument is out of range."),
        ::gl::INVALID_OPERATION => {
            bail!("[GL] The specified operation is not allowed in the current state.")
        }
        ::gl::INVALID_FRAMEBUFFER_OPERATION => {
            bail!("[GL] The framebuffer object is not complete.")
        }
        ::gl::OUT_OF_MEMORY => bail!("[GL] There is not enough memory left to execute the command."),
        code => bail!("[GL] Unknown error code {:#x}.", code),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn uniform_count() {
        let m = [0.0; 32];
        assert_eq!(UniformData::Mat4(&m).count(), 2);
        assert_eq!(UniformData::Float4(&m).count(), 8);
        assert_eq!(UniformData::Int2(&[1, 2]).count(), 1);
        assert_eq!(UniformData::UInt(&[]).count(), 0);
    }

    #[test]
    fn check_errors() {
        let mut device = headless::HeadlessDevice::new();
        assert!(check(&mut device).is_ok());

        device.raise_error(::gl::INVALID_OPERATION);
        let err = check(&mut device).unwrap_err();
        assert!(format!("{}", err).starts_with("[GL]"));
        assert!(check(&mut device).is_ok());
    }
}
