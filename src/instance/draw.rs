//! The per draw state diff. Before every draw the pipeline state of the job
//! is compared with the state applied by the last draw, and only the GL
//! calls of the changed categories are issued.

use gl::types::*;

use super::job::Job;
use super::renderer::{Renderer, RendererDescriptor};
use super::resources::Resources;
use crate::backend::gl::types::{self, BlendFactors};
use crate::backend::Device;
use crate::ngl::parameter::Parameter;
use crate::ngl::shader::UniformGroups;
use crate::ngl::state::{
    BlendFunc, ColorMask, CullMode, DepthFunc, PrimitiveType, ShaderKey, StateChanges,
};
use crate::ngl::{IndexBufferHandle, VertexBufferHandle};

/// The arguments of a draw.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub shader_code: u32,
    pub primitive: PrimitiveType,
    pub vertex_buffers: &'a [VertexBufferHandle],
    pub index_buffer: IndexBufferHandle,
    pub cull_mode: CullMode,
    /// The values of the application declared uniforms, indexed by their
    /// position in the uniform table.
    pub parameters: &'a [Option<Parameter<'a>>],
}

impl<'a> DrawCall<'a> {
    pub fn new(
        shader_code: u32,
        vertex_buffers: &'a [VertexBufferHandle],
        index_buffer: IndexBufferHandle,
        parameters: &'a [Option<Parameter<'a>>],
    ) -> Self {
        DrawCall {
            shader_code,
            primitive: PrimitiveType::Triangles,
            vertex_buffers,
            index_buffer,
            cull_mode: CullMode::TwoSided,
            parameters,
        }
    }
}

/// The arguments of a compute dispatch.
#[derive(Debug, Clone, Copy)]
pub struct DispatchCall<'a> {
    pub shader_code: u32,
    pub parameters: &'a [Option<Parameter<'a>>],
}

impl<'a> DispatchCall<'a> {
    pub fn new(shader_code: u32, parameters: &'a [Option<Parameter<'a>>]) -> Self {
        DispatchCall {
            shader_code,
            parameters,
        }
    }
}

impl Job {
    /// Applies the state of `call` and binds its program, uniforms and
    /// buffers. Returns false if the draw must be skipped, in which case the
    /// applied state is left untouched.
    pub fn predraw(
        &mut self,
        device: &mut dyn Device,
        resources: &mut Resources,
        call: &DrawCall,
    ) -> bool {
        if !self.is_started {
            error!("Draw on job {} which is not started.", self.name);
        }

        if self.descriptor.is_compute {
            error!("Draw on compute job {}.", self.name);
            return false;
        }

        let mut vbo_hash = 0u32;
        for &v in call.vertex_buffers {
            match resources.vertex_buffers.get(v) {
                Some(record) => vbo_hash = vbo_hash.wrapping_add(record.hash),
                None => {
                    error!("Draw in job {} with illegal {}.", self.name, v);
                    return false;
                }
            }
        }

        let ebo = match resources.index_buffers.get(call.index_buffer) {
            Some(v) => v.ebo,
            None => {
                error!("Draw in job {} with illegal {}.", self.name, call.index_buffer);
                return false;
            }
        };

        self.current.cull_mode = call.cull_mode;
        self.current.primitive_type = call.primitive;
        self.current.shader = ShaderKey {
            shader_code: call.shader_code,
            vbo_hash,
        };

        let changes = self.current.changes_since(self.previous.as_ref());

        if changes.contains(StateChanges::VIEWPORT) {
            device.viewport(self.current.viewport);
        }

        if changes.contains(StateChanges::SCISSOR) {
            let scissor = self.current.scissor;
            if scissor[2] > 0 && scissor[3] > 0 {
                device.enable(gl::SCISSOR_TEST);
                device.scissor(scissor);
            } else {
                device.disable(gl::SCISSOR_TEST);
            }
        }

        let mut groups = UniformGroups::PER_DRAW;
        if changes.contains(StateChanges::SHADER)
            || changes.contains(StateChanges::SUBPASS)
            || self.active_renderer.is_none()
        {
            let index = match self.find_or_create_renderer(device, resources, call) {
                Some(v) => v,
                None => return false,
            };

            self.active_renderer = Some(index);
            device.use_program(self.renderers[index].program);
            groups = UniformGroups::all();
        }

        if changes.contains(StateChanges::CULL_MODE) {
            match types::cull_face(self.current.cull_mode) {
                Some(face) => {
                    device.enable(gl::CULL_FACE);
                    device.cull_face(face);
                }
                None => device.disable(gl::CULL_FACE),
            }
        }

        if changes.contains(StateChanges::COLOR_BLEND_FUNCS) {
            self.apply_blend_funcs(device);
        }

        if changes.contains(StateChanges::COLOR_MASKS) {
            self.apply_color_masks(device);
        }

        let has_depth = self.subpass().depth_attachment.is_some();

        if changes.contains(StateChanges::DEPTH_FUNC) {
            if let Some(ref previous) = self.previous {
                match previous.depth_func {
                    DepthFunc::Disabled => {}
                    DepthFunc::ToFar => device.depth_range(0.0, 1.0),
                    DepthFunc::LessWithOffset => device.disable(gl::POLYGON_OFFSET_FILL),
                    _ => {}
                }

                if previous.depth_func != DepthFunc::Disabled && !has_depth {
                    device.disable(gl::DEPTH_TEST);
                }
            }

            if has_depth {
                match types::depth_func(self.current.depth_func) {
                    Some(func) => {
                        device.enable(gl::DEPTH_TEST);
                        device.depth_func(func);
                    }
                    None => device.disable(gl::DEPTH_TEST),
                }

                match self.current.depth_func {
                    DepthFunc::ToFar => device.depth_range(1.0, 1.0),
                    DepthFunc::LessWithOffset => {
                        device.enable(gl::POLYGON_OFFSET_FILL);
                        device.polygon_offset(1.0, 200.0);
                    }
                    _ => {}
                }
            }
        }

        if changes.contains(StateChanges::DEPTH_MASK) && has_depth {
            device.depth_mask(self.current.depth_mask);
        }

        if changes.contains(StateChanges::PRIMITIVE_TYPE) {
            if let Some(n) = self.current.primitive_type.patch_vertices() {
                device.patch_vertices(n as GLint);
            }
        }

        let index = match self.active_renderer {
            Some(v) => v,
            None => return false,
        };

        let subpass_name = self.subpass().name.clone();
        let renderer = &mut self.renderers[index];
        renderer.barriers = 0;
        renderer.bind_uniforms(device, resources, groups, call.parameters, &subpass_name);

        for (&buffer, bindings) in &renderer.layouts {
            let vbo = match call
                .vertex_buffers
                .get(buffer)
                .and_then(|v| resources.vertex_buffers.get(*v))
            {
                Some(v) => v.vbo,
                None => continue,
            };

            device.bind_buffer(gl::ARRAY_BUFFER, vbo);
            for v in bindings {
                device.enable_vertex_attrib_array(v.location);
                device.vertex_attrib_pointer(
                    v.location,
                    v.size,
                    v.ty,
                    v.normalized,
                    v.stride,
                    v.offset,
                );
            }
        }

        device.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, ebo);

        self.previous = Some(self.current);
        true
    }

    /// Disables the vertex inputs of the last draw and flushes the memory
    /// barriers required by the writes of the last draw or dispatch.
    pub fn postdraw(&mut self, device: &mut dyn Device) {
        if let Some(index) = self.active_renderer {
            let renderer = &mut self.renderers[index];
            for v in renderer.layouts.values().flat_map(|v| v.iter()) {
                device.disable_vertex_attrib_array(v.location);
            }

            renderer.flush_barriers(device);
        }
    }

    /// Binds the program and uniforms of a compute dispatch. Returns false if
    /// the dispatch must be skipped.
    pub fn predispatch(
        &mut self,
        device: &mut dyn Device,
        resources: &mut Resources,
        call: &DispatchCall,
    ) -> bool {
        if !self.is_started {
            error!("Dispatch on job {} which is not started.", self.name);
        }

        if !self.descriptor.is_compute {
            error!("Dispatch on render job {}.", self.name);
            return false;
        }

        self.current.shader = ShaderKey {
            shader_code: call.shader_code,
            vbo_hash: 0,
        };

        let changes = self.current.changes_since(self.previous.as_ref());

        let mut groups = UniformGroups::PER_DRAW;
        if changes.contains(StateChanges::SHADER)
            || changes.contains(StateChanges::SUBPASS)
            || self.active_renderer.is_none()
        {
            let draw = DrawCall {
                shader_code: call.shader_code,
                primitive: PrimitiveType::Points,
                vertex_buffers: &[],
                index_buffer: IndexBufferHandle::nil(),
                cull_mode: CullMode::TwoSided,
                parameters: call.parameters,
            };

            let index = match self.find_or_create_renderer(device, resources, &draw) {
                Some(v) => v,
                None => return false,
            };

            self.active_renderer = Some(index);
            device.use_program(self.renderers[index].program);
            groups = UniformGroups::all();
        }

        let index = match self.active_renderer {
            Some(v) => v,
            None => return false,
        };

        let subpass_name = self.subpass().name.clone();
        let renderer = &mut self.renderers[index];
        renderer.barriers = 0;
        renderer.bind_uniforms(device, resources, groups, call.parameters, &subpass_name);

        self.previous = Some(self.current);
        true
    }

    fn find_or_create_renderer(
        &mut self,
        device: &mut dyn Device,
        resources: &Resources,
        call: &DrawCall,
    ) -> Option<usize> {
        let subpass = self.current.subpass;
        let shader = self.current.shader;

        if let Some(index) = self
            .renderers
            .iter()
            .position(|v| v.matches(subpass, shader))
        {
            return Some(index);
        }

        let vertex_buffers: Vec<_> = call
            .vertex_buffers
            .iter()
            .filter_map(|v| resources.vertex_buffers.get(*v))
            .map(|v| &v.descriptor)
            .collect();

        let subpass_name = self.subpass().name.clone();
        let desc = RendererDescriptor {
            job: &self.descriptor,
            job_name: &self.name,
            subpass,
            subpass_name: &subpass_name,
            shader,
            vertex_buffers: &vertex_buffers,
            labels: resources.labels,
        };

        let renderer = Renderer::create(device, &desc)?;
        debug!(
            "Created renderer of shader {} (layout {:#x}) in {}.",
            shader.shader_code, shader.vbo_hash, subpass_name
        );

        self.renderers.push(renderer);
        Some(self.renderers.len() - 1)
    }

    fn apply_blend_funcs(&self, device: &mut dyn Device) {
        let subpass = self.subpass();
        let indexed = subpass.color_remap.len() > 1;

        for (j, &k) in subpass.color_remap.iter().enumerate() {
            let func = self
                .current
                .blend_funcs
                .get(k)
                .cloned()
                .unwrap_or(BlendFunc::Disabled);
            let j = j as GLuint;

            match (BlendFactors::from(func), indexed) {
                (BlendFactors::Disabled, false) => device.disable(gl::BLEND),
                (BlendFactors::Disabled, true) => device.disable_i(gl::BLEND, j),
                (BlendFactors::Func(src, dst), false) => {
                    device.enable(gl::BLEND);
                    device.blend_func(src, dst);
                }
                (BlendFactors::Func(src, dst), true) => {
                    device.enable_i(gl::BLEND, j);
                    device.blend_func_i(j, src, dst);
                }
                (BlendFactors::Separate(v), false) => {
                    device.enable(gl::BLEND);
                    device.blend_func_separate(v[0], v[1], v[2], v[3]);
                }
                (BlendFactors::Separate(v), true) => {
                    device.enable_i(gl::BLEND, j);
                    device.blend_func_separate_i(j, v[0], v[1], v[2], v[3]);
                }
            }
        }
    }

    fn apply_color_masks(&self, device: &mut dyn Device) {
        let subpass = self.subpass();
        let indexed = subpass.color_remap.len() > 1;

        for (j, &k) in subpass.color_remap.iter().enumerate() {
            let mask = self
                .current
                .color_masks
                .get(k)
                .cloned()
                .unwrap_or(ColorMask::all());
            let (r, g, b, a) = mask.channels();

            if indexed {
                device.color_mask_i(j as GLuint, r, g, b, a);
            } else {
                device.color_mask(r, g, b, a);
            }
        }
    }
}
