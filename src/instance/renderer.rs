//! A renderer is a linked program plus everything reflected from it: the
//! vertex inputs fed from the bound vertex buffers, and the active resources
//! that are mapped onto the application declared uniform table.

use std::collections::BTreeMap;

use gl::types::*;

use super::label;
use super::resources::Resources;
use crate::backend::gl::types;
use crate::backend::{Device, UniformData};
use crate::ngl::descriptor::{JobDescriptor, VertexDescriptor};
use crate::ngl::parameter::{BoundValue, Parameter};
use crate::ngl::shader::{ShaderSources, ShaderStage, ShaderUniform, UniformFormat, UniformGroups};
use crate::ngl::state::ShaderKey;
use crate::ngl::format::TextureFilter;

/// The program interfaces whose active resources are reflected.
const RESOURCE_INTERFACES: [GLenum; 4] = [
    gl::UNIFORM_BLOCK,
    gl::UNIFORM,
    gl::SHADER_STORAGE_BLOCK,
    gl::ATOMIC_COUNTER_BUFFER,
];

/// A vertex input of the program and where it reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribBinding {
    pub location: GLuint,
    pub size: GLint,
    pub ty: GLenum,
    pub normalized: bool,
    pub stride: GLsizei,
    pub offset: usize,
}

/// A active resource of the program that matches a application uniform.
#[derive(Debug, Clone)]
pub struct UsedUniform {
    pub uniform: ShaderUniform,
    /// Index of the parameter that feeds this uniform.
    pub application_location: usize,
    /// The uniform location, or the buffer binding point of blocks.
    pub location: GLint,
    /// The GL type of samplers and images, the buffer target of blocks and
    /// `0` for plain values.
    pub binding: GLenum,
    /// Index of this binding inside the renderer.
    pub index: usize,
    pub sampler_slot: GLuint,
    pub image_slot: GLuint,
    pub readonly: bool,
}

/// What is needed to build the program of a `(subpass, shader)` pair.
pub struct RendererDescriptor<'a> {
    pub job: &'a JobDescriptor,
    pub job_name: &'a str,
    pub subpass: u32,
    pub subpass_name: &'a str,
    pub shader: ShaderKey,
    pub vertex_buffers: &'a [&'a VertexDescriptor],
    pub labels: bool,
}

pub struct Renderer {
    pub subpass: u32,
    pub shader: ShaderKey,
    pub program: GLuint,
    /// Vertex inputs grouped by the index of the vertex buffer they read.
    pub layouts: BTreeMap<usize, Vec<VertexAttribBinding>>,
    /// The used uniforms of each update frequency group.
    pub uniforms: [Vec<UsedUniform>; UniformGroups::COUNT],
    /// Memory barrier bits required by the writes of the last draw.
    pub barriers: GLbitfield,
    num_used: usize,
    bound: Vec<Option<BoundValue>>,
}

impl Renderer {
    /// Compiles and links the program of `desc` and reflects it. Returns
    /// `None` if no loader is set or the program does not link.
    pub fn create(device: &mut dyn Device, desc: &RendererDescriptor) -> Option<Renderer> {
        let loader = match desc.job.loader {
            Some(ref v) => v.clone(),
            None => {
                error!("Shader loader of job {} is not set.", desc.job_name);
                return None;
            }
        };

        let program = device.create_program();
        label(
            device,
            desc.labels,
            gl::PROGRAM,
            program,
            &format!("{}_gl_program", desc.subpass_name),
        );

        let sources = loader.load(desc.job, desc.subpass, desc.shader.shader_code);

        let mut shaders = Vec::new();
        let mut compiled = true;
        for &stage in &ShaderStage::ALL {
            let src = sources.stage(stage);
            if src.source.is_empty() {
                continue;
            }

            if stage == ShaderStage::Compute && !desc.job.is_compute {
                error!(
                    "Job {} is not a compute job but has a compute shader.",
                    desc.job_name
                );
            }

            match compile(device, stage, &src.source, &src.info_string, desc.labels) {
                Some(shader) => {
                    device.attach_shader(program, shader);
                    shaders.push(shader);
                }
                None => compiled = false,
            }
        }

        let linked = compiled && device.link_program(program);
        if compiled && !linked {
            error!(
                "Failed to link program of {}:\n{}",
                desc.subpass_name,
                device.program_info_log(program)
            );
        }

        for shader in shaders {
            device.detach_shader(program, shader);
            device.delete_shader(shader);
        }

        if !linked {
            device.delete_program(program);
            return None;
        }

        let mut renderer = Renderer {
            subpass: desc.subpass,
            shader: desc.shader,
            program,
            layouts: BTreeMap::new(),
            uniforms: Default::default(),
            barriers: 0,
            num_used: 0,
            bound: Vec::new(),
        };

        if !desc.job.is_compute {
            renderer.reflect_attributes(device, desc);
        }

        renderer.reflect_resources(device, &sources);

        if renderer.uniforms.iter().all(|v| v.is_empty()) {
            warn!("No uniforms in renderer of pass {}.", desc.subpass_name);
        }

        renderer.bound = vec![None; renderer.num_used];
        Some(renderer)
    }

    fn reflect_attributes(&mut self, device: &mut dyn Device, desc: &RendererDescriptor) {
        for attr in device.active_attributes(self.program) {
            if attr.location < 0 || attr.name.starts_with("gl_") {
                continue;
            }

            let components = match types::attrib_components(attr.ty) {
                Some(v) => v,
                None => {
                    warn!("Unsupported type {:#x} of vertex input {}.", attr.ty, attr.name);
                    continue;
                }
            };

            let found = desc
                .vertex_buffers
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.find_attrib(&attr.name, components).map(|a| (i, *v, a)))
                .next();

            let (buffer, vd, attrib) = match found {
                Some(v) => v,
                None => {
                    error!(
                        "Shader-mesh mismatch in job {}: {} is not provided by the vertex buffers.",
                        desc.job_name, attr.name
                    );
                    continue;
                }
            };

            let format = match types::attrib_format(attrib.format) {
                Some(v) => v,
                None => {
                    warn!("Unsupported format {:?} of vertex input {}.", attrib.format, attr.name);
                    continue;
                }
            };

            self.layouts
                .entry(buffer)
                .or_insert_with(Vec::new)
                .push(VertexAttribBinding {
                    location: attr.location as GLuint,
                    size: format.size,
                    ty: format.ty,
                    normalized: format.normalized,
                    stride: vd.stride as GLsizei,
                    offset: attrib.offset as usize,
                });
        }
    }

    fn reflect_resources(&mut self, device: &mut dyn Device, sources: &ShaderSources) {
        let mut sampler_slot = 0;
        let mut image_slot = 0;

        for &interface in &RESOURCE_INTERFACES {
            for resource in device.active_resources(self.program, interface) {
                if interface == gl::UNIFORM && resource.location < 0 {
                    continue;
                }

                let name = resource.name.trim_end_matches("[0]");
                let (format, binding) = match types::uniform_format(resource.ty) {
                    Some(v) => v,
                    None => {
                        warn!("Unhandled type {:#x} of uniform {}.", resource.ty, name);
                        continue;
                    }
                };

                let position = match sources.uniforms.iter().position(|v| v.name == name) {
                    Some(v) => v,
                    None => {
                        trace!("Uniform {} is not declared by the application.", name);
                        continue;
                    }
                };

                let app = &sources.uniforms[position];
                let mut uniform = ShaderUniform::new(name, app.group, format);
                uniform.size = resource.size.max(1) as u32;

                match app.format {
                    UniformFormat::TextureSubresource | UniformFormat::BufferSubresource => {
                        uniform.format = app.format;
                    }
                    _ => {}
                }

                let mut used = UsedUniform {
                    uniform,
                    application_location: position,
                    location: resource.location,
                    binding,
                    index: self.num_used,
                    sampler_slot,
                    image_slot,
                    readonly: true,
                };

                if types::is_sampler(binding) {
                    sampler_slot += 1;
                } else if binding == gl::IMAGE_2D {
                    used.readonly = sources.is_readonly_image(name);
                    image_slot += 1;
                } else if binding == gl::SHADER_STORAGE_BUFFER {
                    used.readonly = sources.is_readonly_buffer(name);
                }

                for group in 0..UniformGroups::COUNT {
                    if app.group.has_index(group) {
                        self.uniforms[group].push(used.clone());
                    }
                }

                self.num_used += 1;
            }
        }
    }

    /// Returns true if this renderer serves `shader` in `subpass`.
    #[inline]
    pub fn matches(&self, subpass: u32, shader: ShaderKey) -> bool {
        self.subpass == subpass && self.shader == shader
    }

    /// Binds the uniforms of the groups in `groups` from `parameters`.
    /// Values that are already set in the program are skipped.
    pub fn bind_uniforms(
        &mut self,
        device: &mut dyn Device,
        resources: &mut Resources,
        groups: UniformGroups,
        parameters: &[Option<Parameter>],
        subpass_name: &str,
    ) {
        for group in 0..UniformGroups::COUNT {
            if !groups.has_index(group) {
                continue;
            }

            for i in 0..self.uniforms[group].len() {
                let (location, index) = {
                    let v = &self.uniforms[group][i];
                    (v.application_location, v.index)
                };

                let param = match parameters.get(location).and_then(|v| v.as_ref()) {
                    Some(v) => v,
                    None => {
                        warn!(
                            "Not set uniform: {} in {}.",
                            self.uniforms[group][i].uniform.name, subpass_name
                        );
                        continue;
                    }
                };

                if let Some(ref bound) = self.bound[index] {
                    if bound.is_program_local() && bound.matches(param) {
                        continue;
                    }
                }

                let used = self.uniforms[group][i].clone();
                if self.bind_uniform(device, resources, &used, param) {
                    self.bound[index] = Some(BoundValue::from(param));
                }
            }
        }
    }

    /// Issues the GL calls that bind `param` to `used`. Returns false if
    /// the parameter does not fit the uniform.
    pub fn bind_uniform(
        &mut self,
        device: &mut dyn Device,
        resources: &mut Resources,
        used: &UsedUniform,
        param: &Parameter,
    ) -> bool {
        let location = used.location;

        match (used.uniform.format, *param) {
            (UniformFormat::Mat4, Parameter::Floats(v)) => {
                device.uniform(location, UniformData::Mat4(v))
            }
            (UniformFormat::Float4, Parameter::Floats(v)) => {
                device.uniform(location, UniformData::Float4(v))
            }
            (UniformFormat::Float2, Parameter::Floats(v)) => {
                device.uniform(location, UniformData::Float2(v))
            }
            (UniformFormat::Float, Parameter::Floats(v)) => {
                device.uniform(location, UniformData::Float(v))
            }
            (UniformFormat::Int, Parameter::Ints(v)) => {
                device.uniform(location, UniformData::Int(v))
            }
            (UniformFormat::Int2, Parameter::Ints(v)) => {
                device.uniform(location, UniformData::Int2(v))
            }
            (UniformFormat::Int4, Parameter::Ints(v)) => {
                device.uniform(location, UniformData::Int4(v))
            }
            (UniformFormat::UInt, Parameter::UInts(v)) => {
                device.uniform(location, UniformData::UInt(v))
            }
            (UniformFormat::UInt2, Parameter::UInts(v)) => {
                device.uniform(location, UniformData::UInt2(v))
            }
            (UniformFormat::UInt4, Parameter::UInts(v)) => {
                device.uniform(location, UniformData::UInt4(v))
            }
            (UniformFormat::Texture, Parameter::Texture(texture))
            | (UniformFormat::TextureSubresource, Parameter::Texture(texture)) => {
                return self.bind_texture(device, resources, used, texture);
            }
            (UniformFormat::Texture, Parameter::TextureSubresource(v))
            | (UniformFormat::TextureSubresource, Parameter::TextureSubresource(v)) => {
                return self.bind_texture(device, resources, used, v.texture);
            }
            (UniformFormat::Buffer, Parameter::Buffer(buffer)) => {
                let vbo = match resources.vertex_buffers.get(buffer) {
                    Some(v) => v.vbo,
                    None => {
                        error!("Uniform {} refers to illegal {}.", used.uniform.name, buffer);
                        return false;
                    }
                };

                device.bind_buffer_base(used.binding, location as GLuint, vbo);
                self.storage_written(used);
            }
            (UniformFormat::BufferSubresource, Parameter::BufferSubresource(v))
            | (UniformFormat::Buffer, Parameter::BufferSubresource(v)) => {
                let (vbo, datasize) = match resources.vertex_buffers.get(v.buffer) {
                    Some(record) => (record.vbo, record.datasize),
                    None => {
                        error!("Uniform {} refers to illegal {}.", used.uniform.name, v.buffer);
                        return false;
                    }
                };

                let size = v.size.map(|s| s as usize).unwrap_or(datasize);
                device.bind_buffer_range(
                    used.binding,
                    location as GLuint,
                    vbo,
                    v.offset as isize,
                    size as isize,
                );
                self.storage_written(used);
            }
            (format, _) => {
                warn!(
                    "Unhandled parameter {:?} of uniform {} ({:?}).",
                    param, used.uniform.name, format
                );
                return false;
            }
        }

        true
    }

    fn bind_texture(
        &mut self,
        device: &mut dyn Device,
        resources: &mut Resources,
        used: &UsedUniform,
        handle: crate::ngl::TextureHandle,
    ) -> bool {
        let texture = match resources.textures.get_mut(handle) {
            Some(v) => v,
            None => {
                error!("Uniform {} refers to illegal {}.", used.uniform.name, handle);
                return false;
            }
        };

        let linear_shadow = texture.descriptor.shadow_filter == TextureFilter::Linear;

        if types::is_shadow_sampler(used.binding) {
            device.active_texture(gl::TEXTURE0 + used.sampler_slot);
            device.bind_texture(texture.target, texture.object);

            if !texture.shadow_sampler {
                device.tex_parameter_i(
                    texture.target,
                    gl::TEXTURE_COMPARE_MODE,
                    gl::COMPARE_REF_TO_TEXTURE as GLint,
                );

                if linear_shadow {
                    device.tex_parameter_i(texture.target, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
                    device.tex_parameter_i(texture.target, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
                }

                texture.shadow_sampler = true;
            }

            device.uniform(used.location, UniformData::Int(&[used.sampler_slot as i32]));
        } else if types::is_sampler(used.binding) {
            device.active_texture(gl::TEXTURE0 + used.sampler_slot);
            device.bind_texture(texture.target, texture.object);
            device.uniform(used.location, UniformData::Int(&[used.sampler_slot as i32]));

            if !texture.is_color && texture.shadow_sampler {
                device.tex_parameter_i(texture.target, gl::TEXTURE_COMPARE_MODE, gl::NONE as GLint);

                if linear_shadow {
                    device.tex_parameter_i(texture.target, gl::TEXTURE_MIN_FILTER, gl::NEAREST as GLint);
                    device.tex_parameter_i(texture.target, gl::TEXTURE_MAG_FILTER, gl::NEAREST as GLint);
                }

                texture.shadow_sampler = false;
            }
        } else if used.binding == gl::IMAGE_2D {
            let access = if used.readonly {
                gl::READ_ONLY
            } else {
                gl::WRITE_ONLY
            };

            device.bind_image_texture(
                used.image_slot,
                texture.object,
                0,
                false,
                0,
                access,
                texture.internal_format,
            );

            if !used.readonly {
                self.barriers |= gl::TEXTURE_FETCH_BARRIER_BIT;
            }
        }

        true
    }

    #[inline]
    fn storage_written(&mut self, used: &UsedUniform) {
        if !used.readonly {
            self.barriers |= gl::SHADER_STORAGE_BARRIER_BIT | gl::UNIFORM_BARRIER_BIT;
        }
    }

    /// Forgets the values bound to the program, every uniform is issued
    /// again by the next bind.
    pub fn reset_bindings(&mut self) {
        for v in &mut self.bound {
            *v = None;
        }
    }

    /// Issues the memory barriers required by the writes of the last draw.
    pub fn flush_barriers(&mut self, device: &mut dyn Device) {
        if self.barriers != 0 {
            device.memory_barrier(self.barriers);
            self.barriers = 0;
        }
    }
}

fn compile(
    device: &mut dyn Device,
    stage: ShaderStage,
    source: &str,
    info: &str,
    labels: bool,
) -> Option<GLuint> {
    let shader = device.create_shader(stage.into());
    label(device, labels, gl::SHADER, shader, info);

    device.shader_source(shader, source);
    if device.compile_shader(shader) {
        return Some(shader);
    }

    let numbered: Vec<_> = source
        .lines()
        .enumerate()
        .map(|(i, v)| format!("{}: {}", i + 1, v))
        .collect();

    error!(
        "Failed to compile {:?} shader:\n{}\nshader log: {}\napp. info: {}",
        stage,
        numbered.join("\n"),
        device.shader_info_log(shader),
        info
    );

    device.delete_shader(shader);
    None
}

#[cfg(test)]
mod test {
    use std::rc::Rc;

    use super::*;
    use crate::backend::headless::{Call, HeadlessDevice, UniformValues};
    use crate::ngl::descriptor::VertexAttrib;
    use crate::ngl::format::Format;
    use crate::ngl::shader::ShaderLoader;
    use crate::ngl::VertexBufferHandle;

    const VS: &str = "#version 430 core
in vec3 in_position;
in vec2 in_texcoord0;
uniform mat4 mvp;
void main() {}
";

    const FS: &str = "#version 430 core
uniform vec4 color;
uniform sampler2D albedo;
uniform float unused;
layout(std430, binding = 4) buffer Lights
{
    vec4 lights[];
};
void main() {}
";

    fn loader(vs: &'static str) -> Rc<dyn ShaderLoader> {
        Rc::new(move |_: &JobDescriptor, _: u32, _: u32| {
            let mut sources = ShaderSources::default();
            sources.stage_mut(ShaderStage::Vertex).source = vs.into();
            sources.stage_mut(ShaderStage::Fragment).source = FS.into();
            sources.stage_mut(ShaderStage::Fragment).readonly_buffers = vec!["Lights".into()];
            sources.uniforms = vec![
                ShaderUniform::new("mvp", UniformGroups::PER_DRAW, UniformFormat::Mat4),
                ShaderUniform::new("albedo", UniformGroups::PER_RENDERER_CHANGE, UniformFormat::Texture),
                ShaderUniform::new("color", UniformGroups::PER_DRAW | UniformGroups::MANUAL, UniformFormat::Float4),
                ShaderUniform::new("Lights", UniformGroups::OTHER, UniformFormat::Buffer),
            ];
            sources
        })
    }

    fn mesh() -> VertexDescriptor {
        VertexDescriptor {
            attribs: vec![
                VertexAttrib::new("in_position", Format::R32G32B32Float, 0),
                VertexAttrib::new("in_texcoord0", Format::R32G32Float, 12),
            ],
            stride: 20,
            unordered_access: false,
        }
    }

    fn create(device: &mut HeadlessDevice, job: &JobDescriptor, vd: &VertexDescriptor) -> Option<Renderer> {
        let vbs = [vd];
        let desc = RendererDescriptor {
            job,
            job_name: "test",
            subpass: 0,
            subpass_name: "main",
            shader: ShaderKey {
                shader_code: 1,
                vbo_hash: vd.layout_hash(),
            },
            vertex_buffers: &vbs,
            labels: false,
        };

        Renderer::create(device, &desc)
    }

    #[test]
    fn reflection() {
        let mut device = HeadlessDevice::new();
        let job = JobDescriptor {
            loader: Some(loader(VS)),
            ..Default::default()
        };

        let renderer = create(&mut device, &job, &mesh()).unwrap();

        let layout = &renderer.layouts[&0];
        assert_eq!(layout.len(), 2);
        assert_eq!(layout[1].offset, 12);
        assert_eq!(layout[1].size, 2);
        assert_eq!(layout[0].stride, 20);

        let names = |group: usize| -> Vec<String> {
            renderer.uniforms[group]
                .iter()
                .map(|v| v.uniform.name.clone())
                .collect()
        };

        assert_eq!(names(0), vec!["mvp", "color"]);
        assert_eq!(names(1), vec!["albedo"]);
        assert_eq!(names(2), vec!["color"]);
        assert_eq!(names(3), vec!["Lights"]);

        let lights = &renderer.uniforms[3][0];
        assert_eq!(lights.binding, gl::SHADER_STORAGE_BUFFER);
        assert_eq!(lights.location, 4);
        assert!(lights.readonly);
        assert_eq!(lights.application_location, 3);

        let albedo = &renderer.uniforms[1][0];
        assert_eq!(albedo.binding, gl::SAMPLER_2D);
        assert_eq!(albedo.sampler_slot, 0);
    }

    #[test]
    fn link_failure() {
        let mut device = HeadlessDevice::new();
        let log = device.calls();
        let job = JobDescriptor {
            loader: Some(loader("#error broken\n")),
            ..Default::default()
        };

        assert!(create(&mut device, &job, &mesh()).is_none());
        assert!(log.borrow().iter().any(|v| match *v {
            Call::DeleteProgram(_) => true,
            _ => false,
        }));

        let job = JobDescriptor::default();
        assert!(create(&mut device, &job, &mesh()).is_none());
    }

    #[test]
    fn mesh_mismatch() {
        let mut device = HeadlessDevice::new();
        let job = JobDescriptor {
            loader: Some(loader(VS)),
            ..Default::default()
        };

        let mut vd = mesh();
        vd.attribs.pop();

        // The draw goes on without the missing input.
        let renderer = create(&mut device, &job, &vd).unwrap();
        assert_eq!(renderer.layouts.len(), 1);
        assert_eq!(renderer.layouts[&0].len(), 1);
        assert!(!renderer.uniforms[0].is_empty());
        assert!(!device.calls().borrow().iter().any(|c| match *c {
            Call::DeleteProgram(_) => true,
            _ => false,
        }));
    }

    #[test]
    fn value_cache() {
        let mut device = HeadlessDevice::new();
        let log = device.calls();
        let mut resources = Resources::new(64, 64);
        let job = JobDescriptor {
            loader: Some(loader(VS)),
            ..Default::default()
        };

        let mut renderer = create(&mut device, &job, &mesh()).unwrap();

        let mvp = [1.0; 16];
        let color = [0.5; 4];
        let params = [
            Some(Parameter::Floats(&mvp)),
            None,
            Some(Parameter::Floats(&color)),
        ];

        log.borrow_mut().clear();
        renderer.bind_uniforms(&mut device, &mut resources, UniformGroups::PER_DRAW, &params, "main");
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(log.borrow()[0], Call::Uniform(0, UniformValues::Floats(mvp.to_vec())));

        log.borrow_mut().clear();
        renderer.bind_uniforms(&mut device, &mut resources, UniformGroups::all(), &params, "main");
        assert!(log.borrow().is_empty());

        let color = [0.25; 4];
        let params = [
            Some(Parameter::Floats(&mvp)),
            None,
            Some(Parameter::Floats(&color)),
        ];
        renderer.bind_uniforms(&mut device, &mut resources, UniformGroups::PER_DRAW, &params, "main");
        assert_eq!(log.borrow().len(), 1);

        renderer.reset_bindings();
        log.borrow_mut().clear();
        renderer.bind_uniforms(&mut device, &mut resources, UniformGroups::PER_DRAW, &params, "main");
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn storage_barriers() {
        let mut device = HeadlessDevice::new();
        let log = device.calls();
        let mut resources = Resources::new(64, 64);

        let vd = VertexDescriptor {
            stride: 16,
            unordered_access: true,
            ..Default::default()
        };
        let buffer = resources
            .try_gen_vertex_buffer(&mut device, VertexBufferHandle::nil(), &vd, 4, None)
            .unwrap();

        let mut renderer = Renderer {
            subpass: 0,
            shader: ShaderKey::default(),
            program: 1,
            layouts: BTreeMap::new(),
            uniforms: Default::default(),
            barriers: 0,
            num_used: 0,
            bound: Vec::new(),
        };

        let mut used = UsedUniform {
            uniform: ShaderUniform::new("Particles", UniformGroups::PER_DRAW, UniformFormat::Buffer),
            application_location: 0,
            location: 2,
            binding: gl::SHADER_STORAGE_BUFFER,
            index: 0,
            sampler_slot: 0,
            image_slot: 0,
            readonly: true,
        };

        assert!(renderer.bind_uniform(&mut device, &mut resources, &used, &Parameter::Buffer(buffer)));
        assert_eq!(renderer.barriers, 0);

        used.readonly = false;
        assert!(renderer.bind_uniform(&mut device, &mut resources, &used, &Parameter::Buffer(buffer)));
        assert_eq!(
            renderer.barriers,
            gl::SHADER_STORAGE_BARRIER_BIT | gl::UNIFORM_BARRIER_BIT
        );

        log.borrow_mut().clear();
        renderer.flush_barriers(&mut device);
        renderer.flush_barriers(&mut device);
        assert_eq!(
            *log.borrow(),
            vec![Call::MemoryBarrier(
                gl::SHADER_STORAGE_BARRIER_BIT | gl::UNIFORM_BARRIER_BIT
            )]
        );

        assert!(!renderer.bind_uniform(&mut device, &mut resources, &used, &Parameter::Ints(&[1])));
    }
}
