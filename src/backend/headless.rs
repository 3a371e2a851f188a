//! A `Device` without GPU. It records every command into a shared call log,
//! hands out fake object names and simulates compile, link and program
//! interface reflection by scanning the GLSL declarations of the sources.

use std::cell::RefCell;
use std::rc::Rc;

use gl::types::*;

use super::{ActiveAttribute, ActiveResource, Device, UniformData};
use crate::utils::hash::FastHashMap;

/// The recorded values of a `glUniform*v` call.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValues {
    Floats(Vec<f32>),
    Ints(Vec<i32>),
    UInts(Vec<u32>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Enable(GLenum),
    Disable(GLenum),
    EnableI(GLenum, GLuint),
    DisableI(GLenum, GLuint),
    Viewport([i32; 4]),
    Scissor([i32; 4]),
    CullFace(GLenum),
    BlendFunc(GLenum, GLenum),
    BlendFuncI(GLuint, GLenum, GLenum),
    BlendFuncSeparate([GLenum; 4]),
    BlendFuncSeparateI(GLuint, [GLenum; 4]),
    ColorMask([bool; 4]),
    ColorMaskI(GLuint, [bool; 4]),
    DepthFunc(GLenum),
    DepthMask(bool),
    DepthRange(f32, f32),
    PolygonOffset(f32, f32),
    LineWidth(f32),
    PatchVertices(GLint),
    PixelStore(GLenum, GLint),

    ClearColor([f32; 4]),
    ClearDepth(f32),
    Clear(GLbitfield),
    ClearBufferFv(GLenum, GLint, [f32; 4]),
    InvalidateFramebuffer(GLenum, Vec<GLenum>),

    GenFramebuffer(GLuint),
    DeleteFramebuffer(GLuint),
    BindFramebuffer(GLenum, GLuint),
    FramebufferTexture2D {
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    },
    FramebufferTextureLayer {
        attachment: GLenum,
        texture: GLuint,
        level: GLint,
        layer: GLint,
    },
    FramebufferRenderbuffer {
        attachment: GLenum,
        renderbuffer: GLuint,
    },
    DrawBuffers(Vec<GLenum>),
    ReadBuffer(GLenum),
    ReadPixels([i32; 4], GLenum, GLenum),

    GenTexture(GLuint),
    DeleteTexture(GLuint),
    BindTexture(GLenum, GLuint),
    ActiveTexture(GLenum),
    TexParameter(GLenum, GLenum, GLint),
    TexStorage2D {
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        size: [GLsizei; 2],
    },
    TexStorage3D {
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        size: [GLsizei; 3],
    },
    TexSubImage {
        target: GLenum,
        level: GLint,
        layer: GLint,
        size: [GLsizei; 2],
        bytes: usize,
        compressed: bool,
    },
    GenerateMipmap(GLenum),

    GenRenderbuffer(GLuint),
    DeleteRenderbuffer(GLuint),
    BindRenderbuffer(GLuint),
    RenderbufferStorage {
        samples: GLsizei,
        internal_format: GLenum,
        size: [GLsizei; 2],
    },

    GenBuffer(GLuint),
    DeleteBuffer(GLuint),
    BindBuffer(GLenum, GLuint),
    BufferData {
        target: GLenum,
        size: usize,
        usage: GLenum,
    },
    BindBufferBase(GLenum, GLuint, GLuint),
    BindBufferRange {
        target: GLenum,
        index: GLuint,
        buffer: GLuint,
        offset: isize,
        size: isize,
    },
    ReadBufferData(GLenum, usize),

    CreateShader(GLenum, GLuint),
    ShaderSource(GLuint),
    CompileShader(GLuint),
    DeleteShader(GLuint),
    CreateProgram(GLuint),
    AttachShader(GLuint, GLuint),
    DetachShader(GLuint, GLuint),
    LinkProgram(GLuint),
    DeleteProgram(GLuint),
    UseProgram(GLuint),

    Uniform(GLint, UniformValues),
    BindImageTexture {
        unit: GLuint,
        texture: GLuint,
        access: GLenum,
        format: GLenum,
    },
    MemoryBarrier(GLbitfield),

    GenVertexArray(GLuint),
    DeleteVertexArray(GLuint),
    BindVertexArray(GLuint),
    EnableVertexAttribArray(GLuint),
    DisableVertexAttribArray(GLuint),
    VertexAttribPointer {
        index: GLuint,
        size: GLint,
        ty: GLenum,
        stride: GLsizei,
        offset: usize,
    },

    DrawElements {
        mode: GLenum,
        count: GLsizei,
        ty: GLenum,
    },
    DrawElementsInstanced {
        mode: GLenum,
        count: GLsizei,
        ty: GLenum,
        instances: GLsizei,
    },
    DrawElementsIndirect {
        mode: GLenum,
        ty: GLenum,
        offset: usize,
    },
    DispatchCompute(GLuint, GLuint, GLuint),
    DispatchComputeIndirect(usize),

    ObjectLabel(GLenum, GLuint, String),
    Flush,
    Finish,
}

impl Call {
    /// Returns true for the calls that bind a value or resource to a
    /// reflected uniform slot.
    pub fn is_uniform_binding(&self) -> bool {
        match *self {
            Call::Uniform(..)
            | Call::BindImageTexture { .. }
            | Call::BindBufferBase(..)
            | Call::BindBufferRange { .. }
            | Call::ActiveTexture(..) => true,
            _ => false,
        }
    }

    /// Returns true for the calls that submit GPU work.
    pub fn is_draw(&self) -> bool {
        match *self {
            Call::DrawElements { .. }
            | Call::DrawElementsInstanced { .. }
            | Call::DrawElementsIndirect { .. }
            | Call::DispatchCompute(..)
            | Call::DispatchComputeIndirect(..) => true,
            _ => false,
        }
    }
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

#[derive(Debug)]
struct Shader {
    ty: GLenum,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct Program {
    shaders: Vec<GLuint>,
    linked: bool,
    log: String,
    attributes: Vec<ActiveAttribute>,
    resources: FastHashMap<GLenum, Vec<ActiveResource>>,
}

const MAX_TEXTURE_MAX_ANISOTROPY: GLenum = 0x84FF;

pub struct HeadlessDevice {
    log: CallLog,
    names: GLuint,
    errors: Vec<GLenum>,
    version: String,
    extensions: Vec<String>,
    limits: FastHashMap<GLenum, GLint>,
    viewport: [i32; 4],
    shaders: FastHashMap<GLuint, Shader>,
    programs: FastHashMap<GLuint, Program>,
    buffers: FastHashMap<GLuint, Vec<u8>>,
    bindings: FastHashMap<GLenum, GLuint>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        HeadlessDevice::new()
    }
}

impl HeadlessDevice {
    /// Creates a device that pretends to be a desktop GL 4.5 context.
    pub fn new() -> Self {
        HeadlessDevice::with_version(
            "4.5.0 NGL Headless",
            &[
                "GL_EXT_texture_filter_anisotropic",
                "GL_KHR_texture_compression_astc_ldr",
            ],
        )
    }

    pub fn with_version(version: &str, extensions: &[&str]) -> Self {
        let mut limits = FastHashMap::default();
        limits.insert(gl::MAX_TEXTURE_SIZE, 16384);
        limits.insert(gl::MAX_CUBE_MAP_TEXTURE_SIZE, 16384);
        limits.insert(gl::MAX_COLOR_ATTACHMENTS, 8);
        limits.insert(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS, 80);
        limits.insert(gl::MAX_VERTEX_ATTRIBS, 16);
        limits.insert(gl::MAX_COMPUTE_WORK_GROUP_INVOCATIONS, 1024);
        limits.insert(gl::MAX_COMPUTE_SHARED_MEMORY_SIZE, 32768);
        limits.insert(MAX_TEXTURE_MAX_ANISOTROPY, 16);

        HeadlessDevice {
            log: Rc::new(RefCell::new(Vec::new())),
            names: 0,
            errors: Vec::new(),
            version: version.to_owned(),
            extensions: extensions.iter().map(|v| (*v).to_owned()).collect(),
            limits,
            viewport: [0; 4],
            shaders: FastHashMap::default(),
            programs: FastHashMap::default(),
            buffers: FastHashMap::default(),
            bindings: FastHashMap::default(),
        }
    }

    /// Returns the shared log every command is recorded into.
    pub fn calls(&self) -> CallLog {
        self.log.clone()
    }

    /// Overrides the value `get_integer` reports for `pname`.
    pub fn set_limit(&mut self, pname: GLenum, v: GLint) {
        self.limits.insert(pname, v);
    }

    /// Raises `code`, which is reported by the next `get_error`.
    pub fn raise_error(&mut self, code: GLenum) {
        self.errors.push(code);
    }

    #[inline]
    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }

    #[inline]
    fn gen_name(&mut self) -> GLuint {
        self.names += 1;
        self.names
    }

    fn link(&mut self, program: GLuint) -> bool {
        let sources = match self.programs.get(&program) {
            Some(v) => v
                .shaders
                .iter()
                .filter_map(|s| self.shaders.get(s))
                .map(|s| (s.ty, s.source.clone(), s.compiled))
                .collect::<Vec<_>>(),
            None => return false,
        };

        let (linked, log) = if sources.is_empty() {
            (false, "error: no shaders attached to the program.".to_owned())
        } else if sources.iter().any(|v| !v.2) {
            (false, "error: some shaders failed to compile.".to_owned())
        } else {
            (true, String::new())
        };

        let reflection = if linked {
            let stages: Vec<_> = sources.iter().map(|v| (v.0, v.1.as_str())).collect();
            reflect(&stages)
        } else {
            Reflection::default()
        };

        if let Some(v) = self.programs.get_mut(&program) {
            v.linked = linked;
            v.log = log;
            v.attributes = reflection.attributes;
            v.resources = reflection.resources;
        }

        linked
    }
}

impl Device for HeadlessDevice {
    fn get_error(&mut self) -> GLenum {
        if self.errors.is_empty() {
            gl::NO_ERROR
        } else {
            self.errors.remove(0)
        }
    }

    fn get_integer(&mut self, pname: GLenum) -> GLint {
        self.limits.get(&pname).cloned().unwrap_or(0)
    }

    fn get_integer_i(&mut self, pname: GLenum, index: GLuint) -> GLint {
        match (pname, index) {
            (gl::MAX_COMPUTE_WORK_GROUP_SIZE, 0) | (gl::MAX_COMPUTE_WORK_GROUP_SIZE, 1) => 1024,
            (gl::MAX_COMPUTE_WORK_GROUP_SIZE, 2) => 64,
            _ => 0,
        }
    }

    fn get_string(&mut self, name: GLenum) -> Option<String> {
        match name {
            gl::VENDOR => Some("NGL".to_owned()),
            gl::RENDERER => Some("Headless".to_owned()),
            gl::VERSION => Some(self.version.clone()),
            _ => None,
        }
    }

    fn get_viewport(&mut self) -> [i32; 4] {
        self.viewport
    }

    fn get_framebuffer_attachment_parameter(
        &mut self,
        _: GLenum,
        attachment: GLenum,
        pname: GLenum,
    ) -> GLint {
        match (attachment, pname) {
            (_, gl::FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE) => gl::FRAMEBUFFER_DEFAULT as GLint,
            (_, gl::FRAMEBUFFER_ATTACHMENT_COMPONENT_TYPE) => gl::UNSIGNED_NORMALIZED as GLint,
            (_, gl::FRAMEBUFFER_ATTACHMENT_COLOR_ENCODING) => gl::LINEAR as GLint,
            (gl::DEPTH, gl::FRAMEBUFFER_ATTACHMENT_DEPTH_SIZE) => 24,
            (gl::BACK, gl::FRAMEBUFFER_ATTACHMENT_RED_SIZE)
            | (gl::BACK, gl::FRAMEBUFFER_ATTACHMENT_GREEN_SIZE)
            | (gl::BACK, gl::FRAMEBUFFER_ATTACHMENT_BLUE_SIZE)
            | (gl::BACK, gl::FRAMEBUFFER_ATTACHMENT_ALPHA_SIZE) => 8,
            _ => 0,
        }
    }

    fn extensions(&mut self) -> Vec<String> {
        self.extensions.clone()
    }

    fn enable(&mut self, cap: GLenum) {
        self.record(Call::Enable(cap));
    }

    fn disable(&mut self, cap: GLenum) {
        self.record(Call::Disable(cap));
    }

    fn enable_i(&mut self, cap: GLenum, index: GLuint) {
        self.record(Call::EnableI(cap, index));
    }

    fn disable_i(&mut self, cap: GLenum, index: GLuint) {
        self.record(Call::DisableI(cap, index));
    }

    fn viewport(&mut self, rect: [i32; 4]) {
        self.viewport = rect;
        self.record(Call::Viewport(rect));
    }

    fn scissor(&mut self, rect: [i32; 4]) {
        self.record(Call::Scissor(rect));
    }

    fn cull_face(&mut self, mode: GLenum) {
        self.record(Call::CullFace(mode));
    }

    fn blend_func(&mut self, src: GLenum, dst: GLenum) {
        self.record(Call::BlendFunc(src, dst));
    }

    fn blend_func_i(&mut self, buf: GLuint, src: GLenum, dst: GLenum) {
        self.record(Call::BlendFuncI(buf, src, dst));
    }

    fn blend_func_separate(&mut self, sc: GLenum, dc: GLenum, sa: GLenum, da: GLenum) {
        self.record(Call::BlendFuncSeparate([sc, dc, sa, da]));
    }

    fn blend_func_separate_i(&mut self, buf: GLuint, sc: GLenum, dc: GLenum, sa: GLenum, da: GLenum) {
        self.record(Call::BlendFuncSeparateI(buf, [sc, dc, sa, da]));
    }

    fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        self.record(Call::ColorMask([r, g, b, a]));
    }

    fn color_mask_i(&mut self, buf: GLuint, r: bool, g: bool, b: bool, a: bool) {
        self.record(Call::ColorMaskI(buf, [r, g, b, a]));
    }

    fn depth_func(&mut self, func: GLenum) {
        self.record(Call::DepthFunc(func));
    }

    fn depth_mask(&mut self, flag: bool) {
        self.record(Call::DepthMask(flag));
    }

    fn depth_range(&mut self, near: f32, far: f32) {
        self.record(Call::DepthRange(near, far));
    }

    fn polygon_offset(&mut self, factor: f32, units: f32) {
        self.record(Call::PolygonOffset(factor, units));
    }

    fn line_width(&mut self, width: f32) {
        self.record(Call::LineWidth(width));
    }

    fn patch_vertices(&mut self, count: GLint) {
        self.record(Call::PatchVertices(count));
    }

    fn pixel_store(&mut self, pname: GLenum, param: GLint) {
        self.record(Call::PixelStore(pname, param));
    }

    fn clear_color(&mut self, color: [f32; 4]) {
        self.record(Call::ClearColor(color));
    }

    fn clear_depth(&mut self, depth: f32) {
        self.record(Call::ClearDepth(depth));
    }

    fn clear(&mut self, mask: GLbitfield) {
        self.record(Call::Clear(mask));
    }

    fn clear_buffer_fv(&mut self, buffer: GLenum, draw_buffer: GLint, value: [f32; 4]) {
        self.record(Call::ClearBufferFv(buffer, draw_buffer, value));
    }

    fn invalidate_framebuffer(&mut self, target: GLenum, attachments: &[GLenum]) {
        self.record(Call::InvalidateFramebuffer(target, attachments.to_vec()));
    }

    fn gen_framebuffer(&mut self) -> GLuint {
        let name = self.gen_name();
        self.record(Call::GenFramebuffer(name));
        name
    }

    fn delete_framebuffer(&mut self, fbo: GLuint) {
        self.record(Call::DeleteFramebuffer(fbo));
    }

    fn bind_framebuffer(&mut self, target: GLenum, fbo: GLuint) {
        self.record(Call::BindFramebuffer(target, fbo));
    }

    fn framebuffer_texture_2d(
        &mut self,
        _: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    ) {
        self.record(Call::FramebufferTexture2D {
            attachment,
            textarget,
            texture,
            level,
        });
    }

    fn framebuffer_texture_layer(
        &mut self,
        _: GLenum,
        attachment: GLenum,
        texture: GLuint,
        level: GLint,
        layer: GLint,
    ) {
        self.record(Call::FramebufferTextureLayer {
            attachment,
            texture,
            level,
            layer,
        });
    }

    fn framebuffer_renderbuffer(&mut self, _: GLenum, attachment: GLenum, rbo: GLuint) {
        self.record(Call::FramebufferRenderbuffer {
            attachment,
            renderbuffer: rbo,
        });
    }

    fn check_framebuffer_status(&mut self, _: GLenum) -> GLenum {
        gl::FRAMEBUFFER_COMPLETE
    }

    fn draw_buffers(&mut self, buffers: &[GLenum]) {
        self.record(Call::DrawBuffers(buffers.to_vec()));
    }

    fn read_buffer(&mut self, mode: GLenum) {
        self.record(Call::ReadBuffer(mode));
    }

    fn read_pixels(&mut self, rect: [i32; 4], format: GLenum, ty: GLenum, _: &mut [u8]) {
        self.record(Call::ReadPixels(rect, format, ty));
    }

    fn gen_texture(&mut self) -> GLuint {
        let name = self.gen_name();
        self.record(Call::GenTexture(name));
        name
    }

    fn delete_texture(&mut self, texture: GLuint) {
        self.record(Call::DeleteTexture(texture));
    }

    fn bind_texture(&mut self, target: GLenum, texture: GLuint) {
        self.record(Call::BindTexture(target, texture));
    }

    fn active_texture(&mut self, unit: GLenum) {
        self.record(Call::ActiveTexture(unit));
    }

    fn tex_parameter_i(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        self.record(Call::TexParameter(target, pname, param));
    }

    fn tex_storage_2d(&mut self, target: GLenum, levels: GLsizei, fmt: GLenum, size: [GLsizei; 2]) {
        self.record(Call::TexStorage2D {
            target,
            levels,
            internal_format: fmt,
            size,
        });
    }

    fn tex_storage_3d(&mut self, target: GLenum, levels: GLsizei, fmt: GLenum, size: [GLsizei; 3]) {
        self.record(Call::TexStorage3D {
            target,
            levels,
            internal_format: fmt,
            size,
        });
    }

    fn tex_sub_image_2d(
        &mut self,
        target: GLenum,
        level: GLint,
        size: [GLsizei; 2],
        _: GLenum,
        _: GLenum,
        data: &[u8],
    ) {
        self.record(Call::TexSubImage {
            target,
            level,
            layer: 0,
            size,
            bytes: data.len(),
            compressed: false,
        });
    }

    fn tex_sub_image_3d(
        &mut self,
        target: GLenum,
        level: GLint,
        layer: GLint,
        size: [GLsizei; 2],
        _: GLenum,
        _: GLenum,
        data: &[u8],
    ) {
        self.record(Call::TexSubImage {
            target,
            level,
            layer,
            size,
            bytes: data.len(),
            compressed: false,
        });
    }

    fn compressed_tex_sub_image_2d(
        &mut self,
        target: GLenum,
        level: GLint,
        size: [GLsizei; 2],
        _: GLenum,
        data: &[u8],
    ) {
        self.record(Call::TexSubImage {
            target,
            level,
            layer: 0,
            size,
            bytes: data.len(),
            compressed: true,
        });
    }

    fn compressed_tex_sub_image_3d(
        &mut self,
        target: GLenum,
        level: GLint,
        layer: GLint,
        size: [GLsizei; 2],
        _: GLenum,
        data: &[u8],
    ) {
        self.record(Call::TexSubImage {
            target,
            level,
            layer,
            size,
            bytes: data.len(),
            compressed: true,
        });
    }

    fn generate_mipmap(&mut self, target: GLenum) {
        self.record(Call::GenerateMipmap(target));
    }

    fn gen_renderbuffer(&mut self) -> GLuint {
        let name = self.gen_name();
        self.record(Call::GenRenderbuffer(name));
        name
    }

    fn delete_renderbuffer(&mut self, rbo: GLuint) {
        self.record(Call::DeleteRenderbuffer(rbo));
    }

    fn bind_renderbuffer(&mut self, rbo: GLuint) {
        self.record(Call::BindRenderbuffer(rbo));
    }

    fn renderbuffer_storage(&mut self, internal_format: GLenum, size: [GLsizei; 2]) {
        self.record(Call::RenderbufferStorage {
            samples: 1,
            internal_format,
            size,
        });
    }

    fn renderbuffer_storage_multisample(
        &mut self,
        samples: GLsizei,
        internal_format: GLenum,
        size: [GLsizei; 2],
    ) {
        self.record(Call::RenderbufferStorage {
            samples,
            internal_format,
            size,
        });
    }

    fn gen_buffer(&mut self) -> GLuint {
        let name = self.gen_name();
        self.buffers.insert(name, Vec::new());
        self.record(Call::GenBuffer(name));
        name
    }

    fn delete_buffer(&mut self, buffer: GLuint) {
        self.buffers.remove(&buffer);
        self.record(Call::DeleteBuffer(buffer));
    }

    fn bind_buffer(&mut self, target: GLenum, buffer: GLuint) {
        self.bindings.insert(target, buffer);
        self.record(Call::BindBuffer(target, buffer));
    }

    fn buffer_data(&mut self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum) {
        if let Some(v) = data {
            assert!(
                v.len() >= size,
                "glBufferData reads {} bytes from a slice of {}.",
                size,
                v.len()
            );
        }

        if let Some(buffer) = self.bindings.get(&target) {
            let bytes = match data {
                Some(v) => v[..size].to_vec(),
                None => vec![0; size],
            };

            self.buffers.insert(*buffer, bytes);
        }

        self.record(Call::BufferData {
            target,
            size,
            usage,
        });
    }

    fn bind_buffer_base(&mut self, target: GLenum, index: GLuint, buffer: GLuint) {
        self.record(Call::BindBufferBase(target, index, buffer));
    }

    fn bind_buffer_range(
        &mut self,
        target: GLenum,
        index: GLuint,
        buffer: GLuint,
        offset: isize,
        size: isize,
    ) {
        self.record(Call::BindBufferRange {
            target,
            index,
            buffer,
            offset,
            size,
        });
    }

    fn read_buffer_data(&mut self, target: GLenum, size: usize) -> Option<Vec<u8>> {
        self.record(Call::ReadBufferData(target, size));

        let buffer = self.bindings.get(&target)?;
        let bytes = self.buffers.get(buffer)?;
        Some(bytes[..size.min(bytes.len())].to_vec())
    }

    fn create_shader(&mut self, ty: GLenum) -> GLuint {
        let name = self.gen_name();
        self.shaders.insert(
            name,
            Shader {
                ty,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );

        self.record(Call::CreateShader(ty, name));
        name
    }

    fn shader_source(&mut self, shader: GLuint, source: &str) {
        if let Some(v) = self.shaders.get_mut(&shader) {
            v.source = source.to_owned();
        }

        self.record(Call::ShaderSource(shader));
    }

    fn compile_shader(&mut self, shader: GLuint) -> bool {
        self.record(Call::CompileShader(shader));

        match self.shaders.get_mut(&shader) {
            Some(v) => {
                let error = v.source.lines().position(|l| l.trim().starts_with("#error"));
                v.compiled = error.is_none();
                v.log = match error {
                    Some(line) => format!("ERROR: 0:{}: '#error' : user defined error", line + 1),
                    None => String::new(),
                };
                v.compiled
            }
            None => false,
        }
    }

    fn shader_info_log(&mut self, shader: GLuint) -> String {
        self.shaders
            .get(&shader)
            .map(|v| v.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: GLuint) {
        self.shaders.remove(&shader);
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&mut self) -> GLuint {
        let name = self.gen_name();
        self.programs.insert(name, Program::default());
        self.record(Call::CreateProgram(name));
        name
    }

    fn attach_shader(&mut self, program: GLuint, shader: GLuint) {
        if let Some(v) = self.programs.get_mut(&program) {
            v.shaders.push(shader);
        }

        self.record(Call::AttachShader(program, shader));
    }

    fn detach_shader(&mut self, program: GLuint, shader: GLuint) {
        if let Some(v) = self.programs.get_mut(&program) {
            v.shaders.retain(|s| *s != shader);
        }

        self.record(Call::DetachShader(program, shader));
    }

    fn link_program(&mut self, program: GLuint) -> bool {
        self.record(Call::LinkProgram(program));
        self.link(program)
    }

    fn program_info_log(&mut self, program: GLuint) -> String {
        self.programs
            .get(&program)
            .map(|v| v.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&mut self, program: GLuint) {
        self.programs.remove(&program);
        self.record(Call::DeleteProgram(program));
    }

    fn use_program(&mut self, program: GLuint) {
        self.record(Call::UseProgram(program));
    }

    fn active_attributes(&mut self, program: GLuint) -> Vec<ActiveAttribute> {
        match self.programs.get(&program) {
            Some(v) if v.linked => v.attributes.clone(),
            _ => Vec::new(),
        }
    }

    fn active_resources(&mut self, program: GLuint, interface: GLenum) -> Vec<ActiveResource> {
        match self.programs.get(&program) {
            Some(v) if v.linked => v.resources.get(&interface).cloned().unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn uniform(&mut self, location: GLint, data: UniformData) {
        let values = match data {
            UniformData::Float(v)
            | UniformData::Float2(v)
            | UniformData::Float4(v)
            | UniformData::Mat4(v) => UniformValues::Floats(v.to_vec()),
            UniformData::Int(v) | UniformData::Int2(v) | UniformData::Int4(v) => {
                UniformValues::Ints(v.to_vec())
            }
            UniformData::UInt(v) | UniformData::UInt2(v) | UniformData::UInt4(v) => {
                UniformValues::UInts(v.to_vec())
            }
        };

        self.record(Call::Uniform(location, values));
    }

    fn bind_image_texture(
        &mut self,
        unit: GLuint,
        texture: GLuint,
        _: GLint,
        _: bool,
        _: GLint,
        access: GLenum,
        format: GLenum,
    ) {
        self.record(Call::BindImageTexture {
            unit,
            texture,
            access,
            format,
        });
    }

    fn memory_barrier(&mut self, barriers: GLbitfield) {
        self.record(Call::MemoryBarrier(barriers));
    }

    fn gen_vertex_array(&mut self) -> GLuint {
        let name = self.gen_name();
        self.record(Call::GenVertexArray(name));
        name
    }

    fn delete_vertex_array(&mut self, vao: GLuint) {
        self.record(Call::DeleteVertexArray(vao));
    }

    fn bind_vertex_array(&mut self, vao: GLuint) {
        self.record(Call::BindVertexArray(vao));
    }

    fn enable_vertex_attrib_array(&mut self, index: GLuint) {
        self.record(Call::EnableVertexAttribArray(index));
    }

    fn disable_vertex_attrib_array(&mut self, index: GLuint) {
        self.record(Call::DisableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(
        &mut self,
        index: GLuint,
        size: GLint,
        ty: GLenum,
        _: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        self.record(Call::VertexAttribPointer {
            index,
            size,
            ty,
            stride,
            offset,
        });
    }

    fn draw_elements(&mut self, mode: GLenum, count: GLsizei, ty: GLenum) {
        self.record(Call::DrawElements { mode, count, ty });
    }

    fn draw_elements_instanced(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        ty: GLenum,
        instances: GLsizei,
    ) {
        self.record(Call::DrawElementsInstanced {
            mode,
            count,
            ty,
            instances,
        });
    }

    fn draw_elements_indirect(&mut self, mode: GLenum, ty: GLenum, offset: usize) {
        self.record(Call::DrawElementsIndirect { mode, ty, offset });
    }

    fn dispatch_compute(&mut self, x: GLuint, y: GLuint, z: GLuint) {
        self.record(Call::DispatchCompute(x, y, z));
    }

    fn dispatch_compute_indirect(&mut self, offset: usize) {
        self.record(Call::DispatchComputeIndirect(offset));
    }

    fn object_label(&mut self, identifier: GLenum, name: GLuint, label: &str) {
        self.record(Call::ObjectLabel(identifier, name, label.to_owned()));
    }

    fn flush(&mut self) {
        self.record(Call::Flush);
    }

    fn finish(&mut self) {
        self.record(Call::Finish);
    }
}

#[derive(Debug, Default)]
struct Reflection {
    attributes: Vec<ActiveAttribute>,
    resources: FastHashMap<GLenum, Vec<ActiveResource>>,
}

impl Reflection {
    fn contains(&self, interface: GLenum, name: &str) -> bool {
        self.resources
            .get(&interface)
            .map(|v| v.iter().any(|r| r.name == name))
            .unwrap_or(false)
    }

    fn push(&mut self, interface: GLenum, resource: ActiveResource) {
        if !self.contains(interface, &resource.name) {
            self.resources
                .entry(interface)
                .or_insert_with(Vec::new)
                .push(resource);
        }
    }
}

const QUALIFIERS: &[&str] = &[
    "highp",
    "mediump",
    "lowp",
    "readonly",
    "writeonly",
    "coherent",
    "restrict",
    "volatile",
    "flat",
    "smooth",
];

/// Scans the global declarations of the stages the way a driver reports the
/// active resources of a linked program.
fn reflect(stages: &[(GLenum, &str)]) -> Reflection {
    let mut reflection = Reflection::default();
    let mut next_location = 0;

    for &(stage, source) in stages {
        for line in source.lines() {
            let line = match line.find("//") {
                Some(pos) => &line[..pos],
                None => line,
            };

            let (line, layout) = strip_layout(line);
            let line = line.trim();
            let tokens: Vec<_> = line
                .split_whitespace()
                .filter(|v| !QUALIFIERS.contains(v))
                .collect();

            match tokens.first().cloned() {
                Some("in") if stage == gl::VERTEX_SHADER && tokens.len() >= 3 => {
                    let name = tokens[2].trim_end_matches(';');
                    if reflection.attributes.iter().any(|v| v.name == name) {
                        continue;
                    }

                    let location = layout
                        .location
                        .unwrap_or_else(|| reflection.attributes.len() as GLint);

                    reflection.attributes.push(ActiveAttribute {
                        name: name.to_owned(),
                        ty: glsl_type(tokens[1]),
                        size: 1,
                        location,
                    });
                }
                Some("uniform") if tokens.len() >= 2 && !line.ends_with(';') => {
                    let name = tokens[1].trim_end_matches('{');
                    reflection.push(
                        gl::UNIFORM_BLOCK,
                        ActiveResource {
                            name: name.to_owned(),
                            ty: gl::UNIFORM_BLOCK,
                            size: 1,
                            location: layout.binding.unwrap_or(0),
                        },
                    );
                }
                Some("uniform") if tokens.len() >= 3 => {
                    if tokens[1] == "atomic_uint" {
                        continue;
                    }

                    let declarator = tokens[2].trim_end_matches(';');
                    let (name, size) = match declarator.find('[') {
                        Some(pos) => {
                            let size = declarator[pos + 1..]
                                .trim_end_matches(']')
                                .parse()
                                .unwrap_or(1);
                            (format!("{}[0]", &declarator[..pos]), size)
                        }
                        None => (declarator.to_owned(), 1),
                    };

                    if reflection.contains(gl::UNIFORM, &name) {
                        continue;
                    }

                    let location = layout.location.unwrap_or(next_location);
                    next_location = location + size;

                    reflection.push(
                        gl::UNIFORM,
                        ActiveResource {
                            name,
                            ty: glsl_type(tokens[1]),
                            size,
                            location,
                        },
                    );
                }
                Some("buffer") if tokens.len() >= 2 => {
                    let name = tokens[1].trim_end_matches('{');
                    reflection.push(
                        gl::SHADER_STORAGE_BLOCK,
                        ActiveResource {
                            name: name.to_owned(),
                            ty: gl::SHADER_STORAGE_BLOCK,
                            size: 1,
                            location: layout.binding.unwrap_or(0),
                        },
                    );
                }
                _ => {}
            }
        }
    }

    reflection
}

#[derive(Debug, Default, Clone, Copy)]
struct Layout {
    binding: Option<GLint>,
    location: Option<GLint>,
}

fn strip_layout(line: &str) -> (String, Layout) {
    let mut layout = Layout::default();

    let begin = match line.find("layout") {
        Some(v) => v,
        None => return (line.to_owned(), layout),
    };

    let open = match line[begin..].find('(') {
        Some(v) => begin + v,
        None => return (line.to_owned(), layout),
    };

    let close = match line[open..].find(')') {
        Some(v) => open + v,
        None => return (line.to_owned(), layout),
    };

    for qualifier in line[open + 1..close].split(',') {
        let mut kv = qualifier.split('=').map(|v| v.trim());
        match (kv.next(), kv.next()) {
            (Some("binding"), Some(v)) => layout.binding = v.parse().ok(),
            (Some("location"), Some(v)) => layout.location = v.parse().ok(),
            _ => {}
        }
    }

    (format!("{} {}", &line[..begin], &line[close + 1..]), layout)
}

fn glsl_type(ty: &str) -> GLenum {
    match ty {
        "float" => gl::FLOAT,
        "vec2" => gl::FLOAT_VEC2,
        "vec3" => gl::FLOAT_VEC3,
        "vec4" => gl::FLOAT_VEC4,
        "mat4" => gl::FLOAT_MAT4,
        "int" => gl::INT,
        "ivec2" => gl::INT_VEC2,
        "ivec4" => gl::INT_VEC4,
        "uint" => gl::UNSIGNED_INT,
        "uvec2" => gl::UNSIGNED_INT_VEC2,
        "uvec4" => gl::UNSIGNED_INT_VEC4,
        "sampler2D" => gl::SAMPLER_2D,
        "sampler2DArray" => gl::SAMPLER_2D_ARRAY,
        "sampler2DShadow" => gl::SAMPLER_2D_SHADOW,
        "sampler2DArrayShadow" => gl::SAMPLER_2D_ARRAY_SHADOW,
        "samplerCube" => gl::SAMPLER_CUBE,
        "samplerCubeShadow" => gl::SAMPLER_CUBE_SHADOW,
        "image2D" => gl::IMAGE_2D,
        _ => 0,
    }
}
