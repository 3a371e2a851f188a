use std::ffi::{CStr, CString};
use std::os::raw::c_void;
use std::ptr;

use gl::types::*;

use super::super::{ActiveAttribute, ActiveResource, Device, UniformData};
use crate::errors::*;

const MAX_NAME_LENGTH: usize = 512;

/// The `Device` that issues its commands through the loaded GL entry points.
pub struct GLDevice {
    _private: (),
}

impl GLDevice {
    /// Loads the GL entry points with `loader`.
    ///
    /// # Safety
    ///
    /// The context the functions are loaded from must be current on the calling
    /// thread for the whole lifetime of the device.
    pub unsafe fn new<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        if !gl::CreateProgram::is_loaded() || !gl::GetProgramResourceiv::is_loaded() {
            bail!("[GL] Failed to load the program interface entry points.");
        }

        Ok(GLDevice { _private: () })
    }

    unsafe fn gen(f: unsafe fn(GLsizei, *mut GLuint)) -> GLuint {
        let mut v = 0;
        f(1, &mut v);
        v
    }

    unsafe fn program_iv(program: GLuint, pname: GLenum) -> GLint {
        let mut v = 0;
        gl::GetProgramiv(program, pname, &mut v);
        v
    }

    unsafe fn resource_name(program: GLuint, interface: GLenum, index: GLuint) -> String {
        let mut buf = vec![0u8; MAX_NAME_LENGTH];
        let mut len = 0;
        gl::GetProgramResourceName(
            program,
            interface,
            index,
            MAX_NAME_LENGTH as GLsizei,
            &mut len,
            buf.as_mut_ptr() as *mut GLchar,
        );

        buf.truncate(len.max(0) as usize);
        String::from_utf8_lossy(&buf).into_owned()
    }

    unsafe fn resource_props(
        program: GLuint,
        interface: GLenum,
        index: GLuint,
        props: &[GLenum],
    ) -> Vec<GLint> {
        let mut params = vec![0; props.len()];
        let mut len = 0;
        gl::GetProgramResourceiv(
            program,
            interface,
            index,
            props.len() as GLsizei,
            props.as_ptr(),
            params.len() as GLsizei,
            &mut len,
            params.as_mut_ptr(),
        );

        params
    }
}

impl Device for GLDevice {
    fn get_error(&mut self) -> GLenum {
        unsafe { gl::GetError() }
    }

    fn get_integer(&mut self, pname: GLenum) -> GLint {
        let mut v = 0;
        unsafe { gl::GetIntegerv(pname, &mut v) };
        v
    }

    fn get_integer_i(&mut self, pname: GLenum, index: GLuint) -> GLint {
        let mut v = 0;
        unsafe { gl::GetIntegeri_v(pname, index, &mut v) };
        v
    }

    fn get_string(&mut self, name: GLenum) -> Option<String> {
        unsafe {
            let v = gl::GetString(name);
            if v.is_null() {
                None
            } else {
                Some(
                    CStr::from_ptr(v as *const _)
                        .to_string_lossy()
                        .into_owned(),
                )
            }
        }
    }

    fn get_viewport(&mut self) -> [i32; 4] {
        let mut v = [0; 4];
        unsafe { gl::GetIntegerv(gl::VIEWPORT, v.as_mut_ptr()) };
        v
    }

    fn get_framebuffer_attachment_parameter(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        pname: GLenum,
    ) -> GLint {
        let mut v = 0;
        unsafe { gl::GetFramebufferAttachmentParameteriv(target, attachment, pname, &mut v) };
        // The query raises a error if the attachment does not exist.
        unsafe { gl::GetError() };
        v
    }

    fn extensions(&mut self) -> Vec<String> {
        unsafe {
            let num = self.get_integer(gl::NUM_EXTENSIONS);
            (0..num.max(0) as GLuint)
                .filter_map(|i| {
                    let v = gl::GetStringi(gl::EXTENSIONS, i);
                    if v.is_null() {
                        None
                    } else {
                        Some(
                            CStr::from_ptr(v as *const _)
                                .to_string_lossy()
                                .into_owned(),
                        )
                    }
                })
                .collect()
        }
    }

    fn enable(&mut self, cap: GLenum) {
        unsafe { gl::Enable(cap) }
    }

    fn disable(&mut self, cap: GLenum) {
        unsafe { gl::Disable(cap) }
    }

    fn enable_i(&mut self, cap: GLenum, index: GLuint) {
        unsafe { gl::Enablei(cap, index) }
    }

    fn disable_i(&mut self, cap: GLenum, index: GLuint) {
        unsafe { gl::Disablei(cap, index) }
    }

    fn viewport(&mut self, rect: [i32; 4]) {
        unsafe { gl::Viewport(rect[0], rect[1], rect[2], rect[3]) }
    }

    fn scissor(&mut self, rect: [i32; 4]) {
        unsafe { gl::Scissor(rect[0], rect[1], rect[2], rect[3]) }
    }

    fn cull_face(&mut self, mode: GLenum) {
        unsafe { gl::CullFace(mode) }
    }

    fn blend_func(&mut self, src: GLenum, dst: GLenum) {
        unsafe { gl::BlendFunc(src, dst) }
    }

    fn blend_func_i(&mut self, buf: GLuint, src: GLenum, dst: GLenum) {
        unsafe { gl::BlendFunci(buf, src, dst) }
    }

    fn blend_func_separate(
        &mut self,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    ) {
        unsafe { gl::BlendFuncSeparate(src_rgb, dst_rgb, src_alpha, dst_alpha) }
    }

    fn blend_func_separate_i(
        &mut self,
        buf: GLuint,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    ) {
        unsafe { gl::BlendFuncSeparatei(buf, src_rgb, dst_rgb, src_alpha, dst_alpha) }
    }

    fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        unsafe { gl::ColorMask(r as GLboolean, g as GLboolean, b as GLboolean, a as GLboolean) }
    }

    fn color_mask_i(&mut self, buf: GLuint, r: bool, g: bool, b: bool, a: bool) {
        unsafe {
            gl::ColorMaski(
                buf,
                r as GLboolean,
                g as GLboolean,
                b as GLboolean,
                a as GLboolean,
            )
        }
    }

    fn depth_func(&mut self, func: GLenum) {
        unsafe { gl::DepthFunc(func) }
    }

    fn depth_mask(&mut self, flag: bool) {
        unsafe { gl::DepthMask(flag as GLboolean) }
    }

    fn depth_range(&mut self, near: f32, far: f32) {
        unsafe { gl::DepthRangef(near, far) }
    }

    fn polygon_offset(&mut self, factor: f32, units: f32) {
        unsafe { gl::PolygonOffset(factor, units) }
    }

    fn line_width(&mut self, width: f32) {
        unsafe { gl::LineWidth(width) }
    }

    fn patch_vertices(&mut self, count: GLint) {
        unsafe { gl::PatchParameteri(gl::PATCH_VERTICES, count) }
    }

    fn pixel_store(&mut self, pname: GLenum, param: GLint) {
        unsafe { gl::PixelStorei(pname, param) }
    }

    fn clear_color(&mut self, color: [f32; 4]) {
        unsafe { gl::ClearColor(color[0], color[1], color[2], color[3]) }
    }

    fn clear_depth(&mut self, depth: f32) {
        unsafe { gl::ClearDepthf(depth) }
    }

    fn clear(&mut self, mask: GLbitfield) {
        unsafe { gl::Clear(mask) }
    }

    fn clear_buffer_fv(&mut self, buffer: GLenum, draw_buffer: GLint, value: [f32; 4]) {
        unsafe { gl::ClearBufferfv(buffer, draw_buffer, value.as_ptr()) }
    }

    fn invalidate_framebuffer(&mut self, target: GLenum, attachments: &[GLenum]) {
        unsafe {
            gl::InvalidateFramebuffer(target, attachments.len() as GLsizei, attachments.as_ptr())
        }
    }

    fn gen_framebuffer(&mut self) -> GLuint {
        unsafe { GLDevice::gen(gl::GenFramebuffers) }
    }

    fn delete_framebuffer(&mut self, fbo: GLuint) {
        unsafe { gl::DeleteFramebuffers(1, &fbo) }
    }

    fn bind_framebuffer(&mut self, target: GLenum, fbo: GLuint) {
        unsafe { gl::BindFramebuffer(target, fbo) }
    }

    fn framebuffer_texture_2d(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    ) {
        unsafe { gl::FramebufferTexture2D(target, attachment, textarget, texture, level) }
    }

    fn framebuffer_texture_layer(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture: GLuint,
        level: GLint,
        layer: GLint,
    ) {
        unsafe { gl::FramebufferTextureLayer(target, attachment, texture, level, layer) }
    }

    fn framebuffer_renderbuffer(&mut self, target: GLenum, attachment: GLenum, rbo: GLuint) {
        unsafe { gl::FramebufferRenderbuffer(target, attachment, gl::RENDERBUFFER, rbo) }
    }

    fn check_framebuffer_status(&mut self, target: GLenum) -> GLenum {
        unsafe { gl::CheckFramebufferStatus(target) }
    }

    fn draw_buffers(&mut self, buffers: &[GLenum]) {
        unsafe { gl::DrawBuffers(buffers.len() as GLsizei, buffers.as_ptr()) }
    }

    fn read_buffer(&mut self, mode: GLenum) {
        unsafe { gl::ReadBuffer(mode) }
    }

    fn read_pixels(&mut self, rect: [i32; 4], format: GLenum, ty: GLenum, pixels: &mut [u8]) {
        unsafe {
            gl::ReadPixels(
                rect[0],
                rect[1],
                rect[2],
                rect[3],
                format,
                ty,
                pixels.as_mut_ptr() as *mut c_void,
            )
        }
    }

    fn gen_texture(&mut self) -> GLuint {
        unsafe { GLDevice::gen(gl::GenTextures) }
    }

    fn delete_texture(&mut self, texture: GLuint) {
        unsafe { gl::DeleteTextures(1, &texture) }
    }

    fn bind_texture(&mut self, target: GLenum, texture: GLuint) {
        unsafe { gl::BindTexture(target, texture) }
    }

    fn active_texture(&mut self, unit: GLenum) {
        unsafe { gl::ActiveTexture(unit) }
    }

    fn tex_parameter_i(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        unsafe { gl::TexParameteri(target, pname, param) }
    }

    fn tex_storage_2d(
        &mut self,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        size: [GLsizei; 2],
    ) {
        unsafe { gl::TexStorage2D(target, levels, internal_format, size[0], size[1]) }
    }

    fn tex_storage_3d(
        &mut self,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        size: [GLsizei; 3],
    ) {
        unsafe { gl::TexStorage3D(target, levels, internal_format, size[0], size[1], size[2]) }
    }

    fn tex_sub_image_2d(
        &mut self,
        target: GLenum,
        level: GLint,
        size: [GLsizei; 2],
        format: GLenum,
        ty: GLenum,
        data: &[u8],
    ) {
        unsafe {
            gl::TexSubImage2D(
                target,
                level,
                0,
                0,
                size[0],
                size[1],
                format,
                ty,
                data.as_ptr() as *const c_void,
            )
        }
    }

    fn tex_sub_image_3d(
        &mut self,
        target: GLenum,
        level: GLint,
        layer: GLint,
        size: [GLsizei; 2],
        format: GLenum,
        ty: GLenum,
        data: &[u8],
    ) {
        unsafe {
            gl::TexSubImage3D(
                target,
                level,
                0,
                0,
                layer,
                size[0],
                size[1],
                1,
                format,
                ty,
                data.as_ptr() as *const c_void,
            )
        }
    }

    fn compressed_tex_sub_image_2d(
        &mut self,
        target: GLenum,
        level: GLint,
        size: [GLsizei; 2],
        internal_format: GLenum,
        data: &[u8],
    ) {
        unsafe {
            gl::CompressedTexSubImage2D(
                target,
                level,
                0,
                0,
                size[0],
                size[1],
                internal_format,
                data.len() as GLsizei,
                data.as_ptr() as *const c_void,
            )
        }
    }

    fn compressed_tex_sub_image_3d(
        &mut self,
        target: GLenum,
        level: GLint,
        layer: GLint,
        size: [GLsizei; 2],
        internal_format: GLenum,
        data: &[u8],
    ) {
        unsafe {
            gl::CompressedTexSubImage3D(
                target,
                level,
                0,
                0,
                layer,
                size[0],
                size[1],
                1,
                internal_format,
                data.len() as GLsizei,
                data.as_ptr() as *const c_void,
            )
        }
    }

    fn generate_mipmap(&mut self, target: GLenum) {
        unsafe { gl::GenerateMipmap(target) }
    }

    fn gen_renderbuffer(&mut self) -> GLuint {
        unsafe { GLDevice::gen(gl::GenRenderbuffers) }
    }

    fn delete_renderbuffer(&mut self, rbo: GLuint) {
        unsafe { gl::DeleteRenderbuffers(1, &rbo) }
    }

    fn bind_renderbuffer(&mut self, rbo: GLuint) {
        unsafe { gl::BindRenderbuffer(gl::RENDERBUFFER, rbo) }
    }

    fn renderbuffer_storage(&mut self, internal_format: GLenum, size: [GLsizei; 2]) {
        unsafe { gl::RenderbufferStorage(gl::RENDERBUFFER, internal_format, size[0], size[1]) }
    }

    fn renderbuffer_storage_multisample(
        &mut self,
        samples: GLsizei,
        internal_format: GLenum,
        size: [GLsizei; 2],
    ) {
        unsafe {
            gl::RenderbufferStorageMultisample(
                gl::RENDERBUFFER,
                samples,
                internal_format,
                size[0],
                size[1],
            )
        }
    }

    fn gen_buffer(&mut self) -> GLuint {
        unsafe { GLDevice::gen(gl::GenBuffers) }
    }

    fn delete_buffer(&mut self, buffer: GLuint) {
        unsafe { gl::DeleteBuffers(1, &buffer) }
    }

    fn bind_buffer(&mut self, target: GLenum, buffer: GLuint) {
        unsafe { gl::BindBuffer(target, buffer) }
    }

    fn buffer_data(&mut self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum) {
        let ptr = data.map(|v| v.as_ptr()).unwrap_or(ptr::null()) as *const c_void;
        unsafe { gl::BufferData(target, size as GLsizeiptr, ptr, usage) }
    }

    fn bind_buffer_base(&mut self, target: GLenum, index: GLuint, buffer: GLuint) {
        unsafe { gl::BindBufferBase(target, index, buffer) }
    }

    fn bind_buffer_range(
        &mut self,
        target: GLenum,
        index: GLuint,
        buffer: GLuint,
        offset: isize,
        size: isize,
    ) {
        unsafe { gl::BindBufferRange(target, index, buffer, offset, size) }
    }

    fn read_buffer_data(&mut self, target: GLenum, size: usize) -> Option<Vec<u8>> {
        unsafe {
            let src = gl::MapBufferRange(target, 0, size as GLsizeiptr, gl::MAP_READ_BIT);
            if src.is_null() {
                return None;
            }

            let mut bytes = vec![0u8; size];
            ptr::copy_nonoverlapping(src as *const u8, bytes.as_mut_ptr(), size);
            gl::UnmapBuffer(target);
            Some(bytes)
        }
    }

    fn create_shader(&mut self, ty: GLenum) -> GLuint {
        unsafe { gl::CreateShader(ty) }
    }

    fn shader_source(&mut self, shader: GLuint, source: &str) {
        let ptr = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        unsafe { gl::ShaderSource(shader, 1, &ptr, &len) }
    }

    fn compile_shader(&mut self, shader: GLuint) -> bool {
        let mut status = 0;
        unsafe {
            gl::CompileShader(shader);
            gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
        }

        status == GLint::from(gl::TRUE)
    }

    fn shader_info_log(&mut self, shader: GLuint) -> String {
        unsafe {
            let mut len = 0;
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);

            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetShaderInfoLog(
                shader,
                buf.len() as GLsizei,
                &mut len,
                buf.as_mut_ptr() as *mut GLchar,
            );

            buf.truncate(len.max(0) as usize);
            String::from_utf8_lossy(&buf).into_owned()
        }
    }

    fn delete_shader(&mut self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&mut self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&mut self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn detach_shader(&mut self, program: GLuint, shader: GLuint) {
        unsafe { gl::DetachShader(program, shader) }
    }

    fn link_program(&mut self, program: GLuint) -> bool {
        unsafe {
            gl::LinkProgram(program);
            GLDevice::program_iv(program, gl::LINK_STATUS) == GLint::from(gl::TRUE)
        }
    }

    fn program_info_log(&mut self, program: GLuint) -> String {
        unsafe {
            let mut len = GLDevice::program_iv(program, gl::INFO_LOG_LENGTH);
            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetProgramInfoLog(
                program,
                buf.len() as GLsizei,
                &mut len,
                buf.as_mut_ptr() as *mut GLchar,
            );

            buf.truncate(len.max(0) as usize);
            String::from_utf8_lossy(&buf).into_owned()
        }
    }

    fn delete_program(&mut self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn use_program(&mut self, program: GLuint) {
        unsafe { gl::UseProgram(program) }
    }

    fn active_attributes(&mut self, program: GLuint) -> Vec<ActiveAttribute> {
        unsafe {
            let mut num = 0;
            gl::GetProgramInterfaceiv(program, gl::PROGRAM_INPUT, gl::ACTIVE_RESOURCES, &mut num);

            (0..num.max(0) as GLuint)
                .map(|i| {
                    let name = GLDevice::resource_name(program, gl::PROGRAM_INPUT, i);
                    let props = GLDevice::resource_props(
                        program,
                        gl::PROGRAM_INPUT,
                        i,
                        &[gl::TYPE, gl::ARRAY_SIZE, gl::LOCATION],
                    );

                    ActiveAttribute {
                        name,
                        ty: props[0] as GLenum,
                        size: props[1],
                        location: props[2],
                    }
                })
                .collect()
        }
    }

    fn active_resources(&mut self, program: GLuint, interface: GLenum) -> Vec<ActiveResource> {
        unsafe {
            let mut num = 0;
            gl::GetProgramInterfaceiv(program, interface, gl::ACTIVE_RESOURCES, &mut num);

            (0..num.max(0) as GLuint)
                .map(|i| {
                    if interface == gl::UNIFORM {
                        let props = GLDevice::resource_props(
                            program,
                            interface,
                            i,
                            &[gl::LOCATION, gl::TYPE, gl::ARRAY_SIZE],
                        );

                        ActiveResource {
                            name: GLDevice::resource_name(program, interface, i),
                            ty: props[1] as GLenum,
                            size: props[2],
                            location: props[0],
                        }
                    } else {
                        let props = GLDevice::resource_props(
                            program,
                            interface,
                            i,
                            &[gl::BUFFER_BINDING],
                        );

                        // Atomic counter buffers have no names.
                        let name = if interface == gl::ATOMIC_COUNTER_BUFFER {
                            String::new()
                        } else {
                            GLDevice::resource_name(program, interface, i)
                        };

                        ActiveResource {
                            name,
                            ty: interface,
                            size: 1,
                            location: props[0],
                        }
                    }
                })
                .collect()
        }
    }

    fn uniform(&mut self, location: GLint, data: UniformData) {
        let count = data.count();
        unsafe {
            match data {
                UniformData::Float(v) => gl::Uniform1fv(location, count, v.as_ptr()),
                UniformData::Float2(v) => gl::Uniform2fv(location, count, v.as_ptr()),
                UniformData::Float4(v) => gl::Uniform4fv(location, count, v.as_ptr()),
                UniformData::Mat4(v) => {
                    gl::UniformMatrix4fv(location, count, gl::FALSE, v.as_ptr())
                }
                UniformData::Int(v) => gl::Uniform1iv(location, count, v.as_ptr()),
                UniformData::Int2(v) => gl::Uniform2iv(location, count, v.as_ptr()),
                UniformData::Int4(v) => gl::Uniform4iv(location, count, v.as_ptr()),
                UniformData::UInt(v) => gl::Uniform1uiv(location, count, v.as_ptr()),
                UniformData::UInt2(v) => gl::Uniform2uiv(location, count, v.as_ptr()),
                UniformData::UInt4(v) => gl::Uniform4uiv(location, count, v.as_ptr()),
            }
        }
    }

    fn bind_image_texture(
        &mut self,
        unit: GLuint,
        texture: GLuint,
        level: GLint,
        layered: bool,
        layer: GLint,
        access: GLenum,
        format: GLenum,
    ) {
        unsafe {
            gl::BindImageTexture(
                unit,
                texture,
                level,
                layered as GLboolean,
                layer,
                access,
                format,
            )
        }
    }

    fn memory_barrier(&mut self, barriers: GLbitfield) {
        unsafe { gl::MemoryBarrier(barriers) }
    }

    fn gen_vertex_array(&mut self) -> GLuint {
        unsafe { GLDevice::gen(gl::GenVertexArrays) }
    }

    fn delete_vertex_array(&mut self, vao: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, &vao) }
    }

    fn bind_vertex_array(&mut self, vao: GLuint) {
        unsafe { gl::BindVertexArray(vao) }
    }

    fn enable_vertex_attrib_array(&mut self, index: GLuint) {
        unsafe { gl::EnableVertexAttribArray(index) }
    }

    fn disable_vertex_attrib_array(&mut self, index: GLuint) {
        unsafe { gl::DisableVertexAttribArray(index) }
    }

    fn vertex_attrib_pointer(
        &mut self,
        index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        unsafe {
            gl::VertexAttribPointer(
                index,
                size,
                ty,
                normalized as GLboolean,
                stride,
                offset as *const c_void,
            )
        }
    }

    fn draw_elements(&mut self, mode: GLenum, count: GLsizei, ty: GLenum) {
        unsafe { gl::DrawElements(mode, count, ty, ptr::null()) }
    }

    fn draw_elements_instanced(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        ty: GLenum,
        instances: GLsizei,
    ) {
        unsafe { gl::DrawElementsInstanced(mode, count, ty, ptr::null(), instances) }
    }

    fn draw_elements_indirect(&mut self, mode: GLenum, ty: GLenum, offset: usize) {
        unsafe { gl::DrawElementsIndirect(mode, ty, offset as *const c_void) }
    }

    fn dispatch_compute(&mut self, x: GLuint, y: GLuint, z: GLuint) {
        unsafe { gl::DispatchCompute(x, y, z) }
    }

    fn dispatch_compute_indirect(&mut self, offset: usize) {
        unsafe { gl::DispatchComputeIndirect(offset as GLintptr) }
    }

    fn object_label(&mut self, identifier: GLenum, name: GLuint, label: &str) {
        if !gl::ObjectLabel::is_loaded() {
            return;
        }

        match CString::new(label) {
            Ok(v) => unsafe { gl::ObjectLabel(identifier, name, -1, v.as_ptr()) },
            Err(_) => warn!("[GL] Label {:?} contains a nul byte.", label),
        }
    }

    fn flush(&mut self) {
        unsafe { gl::Flush() }
    }

    fn finish(&mut self) {
        unsafe { gl::Finish() }
    }
}
