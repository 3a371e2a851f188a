//! # Instance
//!
//! `Instance` is the context object of the backend. It owns the GL device,
//! the resource tables, the render jobs and the transition tracker, and every
//! NGL operation is a method of it.
//!
//! ```rust,ignore
//! let device = Box::new(HeadlessDevice::new());
//! let mut instance = Instance::new(device, ContextDescriptor::gl(4, 5, 1280, 720))?;
//!
//! let mut texture = TextureHandle::nil();
//! instance.gen_texture(&mut texture, &descriptor, None);
//!
//! let job = instance.gen_job(&job_descriptor);
//! instance.begin(job, 0);
//! instance.draw(job, &DrawCall::new(shader_code, &[vertices], indices, &parameters));
//! instance.end(job);
//! ```
//!
//! Only one instance could be alive on a thread, since only one GL context
//! could be current on it.

pub mod draw;
pub mod job;
pub mod renderer;
pub mod resources;
pub mod submit;

use std::cell::Cell;
use std::collections::BTreeSet;

use gl::types::*;

use self::draw::{DispatchCall, DrawCall};
use self::job::Job;
use self::resources::{Resources, TextureContent};
use self::submit::{Command, PlainSubmitter, Statistic, StatisticsSubmitter, Submitter};
use crate::backend::capabilities::Capabilities;
use crate::backend::{self, Device};
use crate::errors::*;
use crate::ngl::descriptor::{JobDescriptor, TextureDescriptor, TextureSubresource, VertexDescriptor};
use crate::ngl::format::{Format, TextureType};
use crate::ngl::properties::{Api, Properties, Property};
use crate::ngl::state::{BlendFunc, ColorMask, DepthFunc};
use crate::ngl::{IndexBufferHandle, JobHandle, TextureHandle, VertexBufferHandle};
use crate::settings::ContextDescriptor;
use crate::transitions::{BufferTransition, TextureTransition, Transitions};
use crate::utils::arena::Arena;
use crate::utils::hash::FastHashSet;

thread_local! {
    static INSTANCE_ALIVE: Cell<bool> = Cell::new(false);
}

/// Actions that are not part of the pipeline of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomAction {
    SwapBuffers,
    /// Blocks until every issued command has completed.
    WaitFinish,
}

pub struct Instance {
    device: Box<dyn Device>,
    descriptor: ContextDescriptor,
    capabilities: Capabilities,
    properties: Properties,
    resources: Resources,
    jobs: Arena<JobHandle, Job>,
    transitions: Transitions,
    submitter: Box<dyn Submitter>,
    statistic: Option<Statistic>,
    recording: FastHashSet<u32>,
    vao: GLuint,
}

impl Instance {
    /// Creates the backend on the GL context wrapped by `device`, which must
    /// be current on this thread.
    pub fn new(mut device: Box<dyn Device>, descriptor: ContextDescriptor) -> Result<Instance> {
        descriptor.validate()?;

        if INSTANCE_ALIVE.with(|v| v.get()) {
            bail!("There is already a alive instance on this thread.");
        }

        let capabilities = Capabilities::parse(device.as_mut())?;
        let properties = Properties::new(&descriptor, &capabilities);

        let mut resources = Resources::new(descriptor.display_width, descriptor.display_height);
        resources.max_texture_size = capabilities.max_texture_size.max(0) as u32;
        resources.labels = descriptor.enable_validation;

        let vao = device.gen_vertex_array();
        device.bind_vertex_array(vao);
        label(
            device.as_mut(),
            descriptor.enable_validation,
            gl::VERTEX_ARRAY,
            vao,
            "global_vao",
        );

        device.pixel_store(gl::UNPACK_ALIGNMENT, 1);
        if descriptor.api == Api::OpenGL {
            device.enable(gl::TEXTURE_CUBE_MAP_SEAMLESS);
        }

        info!(
            "Created NGL instance on {} ({}x{}).",
            capabilities.renderer, descriptor.display_width, descriptor.display_height
        );

        INSTANCE_ALIVE.with(|v| v.set(true));

        Ok(Instance {
            device,
            descriptor,
            capabilities,
            properties,
            resources,
            jobs: Arena::new(),
            transitions: Transitions::new(),
            submitter: Box::new(PlainSubmitter),
            statistic: None,
            recording: FastHashSet::default(),
            vao,
        })
    }

    #[inline]
    pub fn descriptor(&self) -> &ContextDescriptor {
        &self.descriptor
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    #[inline]
    pub fn transitions(&mut self) -> &mut Transitions {
        &mut self.transitions
    }

    /// Gets the integer value of a backend property.
    #[inline]
    pub fn get_integer(&self, property: Property) -> i32 {
        self.properties.get_integer(property)
    }

    /// Gets the string value of a backend property, `None` if the property
    /// has no string value.
    #[inline]
    pub fn get_string(&self, property: Property) -> Option<&str> {
        self.properties.get_string(property)
    }

    fn log_gl_error(&mut self, operation: &str) {
        if let Err(err) = backend::check(self.device.as_mut()) {
            error!("GL error after {}: {}", operation, err);
        }
    }
}

impl Instance {
    /// Creates a texture if `handle` is nil, or respecifies the texture it
    /// addresses. On failure `handle` is set to the invalid handle and false
    /// is returned.
    pub fn gen_texture(
        &mut self,
        handle: &mut TextureHandle,
        descriptor: &TextureDescriptor,
        data: Option<&[Vec<u8>]>,
    ) -> bool {
        let is_new = handle.is_nil();
        match self
            .resources
            .try_gen_texture(self.device.as_mut(), *handle, descriptor, data)
        {
            Ok(v) => {
                if is_new {
                    self.transitions.register_texture(v, descriptor);
                }

                *handle = v;
                self.log_gl_error("gen_texture");
                true
            }
            Err(err) => {
                error!("Failed to create texture {}: {}", descriptor.name, err);
                *handle = TextureHandle::invalid();
                false
            }
        }
    }

    /// Creates a vertex buffer of `num` vertices if `handle` is nil, or
    /// respecifies the buffer it addresses.
    pub fn gen_vertex_buffer(
        &mut self,
        handle: &mut VertexBufferHandle,
        descriptor: &VertexDescriptor,
        num: u32,
        data: Option<&[u8]>,
    ) -> bool {
        let is_new = handle.is_nil();
        match self.resources.try_gen_vertex_buffer(
            self.device.as_mut(),
            *handle,
            descriptor,
            num,
            data,
        ) {
            Ok(v) => {
                if is_new {
                    self.transitions.register_buffer(v, descriptor);
                }

                *handle = v;
                true
            }
            Err(err) => {
                error!("Failed to create vertex buffer: {}", err);
                *handle = VertexBufferHandle::invalid();
                false
            }
        }
    }

    pub fn gen_index_buffer(
        &mut self,
        handle: &mut IndexBufferHandle,
        format: Format,
        num: u32,
        data: Option<&[u8]>,
    ) -> bool {
        match self
            .resources
            .try_gen_index_buffer(self.device.as_mut(), *handle, format, num, data)
        {
            Ok(v) => {
                *handle = v;
                true
            }
            Err(err) => {
                error!("Failed to create index buffer: {}", err);
                *handle = IndexBufferHandle::invalid();
                false
            }
        }
    }

    /// Resizes 2D textures in place, and rebuilds the framebuffers of every
    /// job that renders into any of them. Resizing the nil handle resizes
    /// the default framebuffer.
    pub fn resize_textures(&mut self, textures: &[TextureHandle], size: [u32; 3]) -> bool {
        let mut result = true;

        for &handle in textures {
            let mut descriptor = match self.resources.textures.get(handle) {
                Some(v) => v.descriptor.clone(),
                None => {
                    error!("Resize of illegal {}.", handle);
                    result = false;
                    continue;
                }
            };

            if descriptor.ty != TextureType::Texture2D {
                error!("Resize of {} which is not a 2D texture.", descriptor.name);
                result = false;
                continue;
            }

            descriptor.size = size;

            if handle.is_nil() {
                if let Some(v) = self.resources.textures.get_mut(handle) {
                    v.descriptor.size = size;
                }

                continue;
            }

            if let Err(err) =
                self.resources
                    .try_gen_texture(self.device.as_mut(), handle, &descriptor, None)
            {
                error!("Failed to resize texture {}: {}", descriptor.name, err);
                result = false;
            }
        }

        let affected: BTreeSet<JobHandle> = self
            .jobs
            .iter()
            .filter(|(_, job)| textures.iter().any(|v| job.references(*v)))
            .map(|(handle, _)| handle)
            .collect();

        for handle in affected {
            if let Some(job) = self.jobs.get_mut(handle) {
                if let Err(err) =
                    job.create_framebuffers(self.device.as_mut(), &self.resources, self.resources.labels)
                {
                    error!("Failed to rebuild framebuffers of job {}: {}", job.name, err);
                    result = false;
                }
            }
        }

        self.log_gl_error("resize_textures");
        result
    }

    /// Reads back a level of a texture, or the default framebuffer if
    /// `subresource` addresses the nil handle. This stalls the pipeline.
    pub fn get_texture_content(
        &mut self,
        subresource: TextureSubresource,
        format: Format,
    ) -> Option<TextureContent> {
        self.resources
            .get_texture_content(self.device.as_mut(), subresource, format)
    }

    /// Copies the content of a vertex buffer. This stalls the pipeline.
    pub fn get_vertex_buffer_content(&mut self, buffer: VertexBufferHandle) -> Option<Vec<u8>> {
        self.resources
            .get_vertex_buffer_content(self.device.as_mut(), buffer)
    }
}

impl Instance {
    /// Creates a render or compute job. Returns the invalid handle if the
    /// descriptor refers to illegal attachments or the framebuffers could
    /// not be created.
    pub fn gen_job(&mut self, descriptor: &JobDescriptor) -> JobHandle {
        match self.try_gen_job(descriptor) {
            Ok(v) => v,
            Err(err) => {
                error!("Failed to create job: {}", err);
                JobHandle::invalid()
            }
        }
    }

    fn try_gen_job(&mut self, descriptor: &JobDescriptor) -> Result<JobHandle> {
        let mut job = Job::new(descriptor, &self.resources)?;

        if let Err(err) =
            job.create_framebuffers(self.device.as_mut(), &self.resources, self.resources.labels)
        {
            job.destroy(self.device.as_mut());
            return Err(err);
        }

        debug!("Created job {} with {} subpasses.", job.name, job.subpasses.len());

        let handle = self.jobs.insert(job);
        self.log_gl_error("gen_job");
        Ok(handle)
    }

    pub fn begin(&mut self, job: JobHandle, command_buffer: u32) {
        if let Some(v) = self.jobs.get_mut(job) {
            v.begin(self.device.as_mut(), command_buffer);
        } else {
            error!("Begin of illegal {}.", job);
        }
    }

    pub fn next_subpass(&mut self, job: JobHandle) {
        if let Some(v) = self.jobs.get_mut(job) {
            v.next_subpass(self.device.as_mut());
        } else {
            error!("NextSubpass of illegal {}.", job);
        }
    }

    pub fn end(&mut self, job: JobHandle) {
        if let Some(v) = self.jobs.get_mut(job) {
            v.end(self.device.as_mut());
        } else {
            error!("End of illegal {}.", job);
        }

        self.log_gl_error("end");
    }

    /// Sets the blend function and color mask of the attachment with index
    /// `attachment` of the job.
    pub fn blend_state(&mut self, job: JobHandle, attachment: usize, func: BlendFunc, mask: ColorMask) {
        if let Some(v) = self.jobs.get_mut(job) {
            v.set_blend_state(attachment, func, mask);
        }
    }

    pub fn depth_state(&mut self, job: JobHandle, func: DepthFunc, mask: bool) {
        if let Some(v) = self.jobs.get_mut(job) {
            v.set_depth_state(func, mask);
        }
    }

    pub fn viewport_scissor(&mut self, job: JobHandle, viewport: [i32; 4], scissor: [i32; 4]) {
        if let Some(v) = self.jobs.get_mut(job) {
            v.set_viewport_scissor(viewport, scissor);
        }
    }

    /// Sets the rasterized width of lines. This is issued immediately.
    pub fn line_width(&mut self, job: JobHandle, width: f32) {
        if self.jobs.contains(job) {
            self.device.line_width(width);
        } else {
            error!("LineWidth of illegal {}.", job);
        }
    }

    /// Deletes every program of the job. They are created again by the next
    /// draws.
    pub fn delete_pipelines(&mut self, job: JobHandle) {
        if let Some(v) = self.jobs.get_mut(job) {
            v.delete_pipelines(self.device.as_mut());
        }
    }

    pub fn custom_action(&mut self, job: JobHandle, action: CustomAction) {
        if !self.jobs.contains(job) {
            error!("Custom action {:?} of illegal {}.", action, job);
            return;
        }

        match action {
            CustomAction::WaitFinish => self.device.finish(),
            CustomAction::SwapBuffers => {}
        }
    }
}

impl Instance {
    pub fn draw(&mut self, job: JobHandle, call: &DrawCall) -> bool {
        self.draw_with(job, call, |primitive, mode, count, ty| Command::Draw {
            primitive,
            mode,
            count,
            ty,
        })
    }

    pub fn draw_instanced(&mut self, job: JobHandle, call: &DrawCall, instances: u32) -> bool {
        self.draw_with(job, call, |primitive, mode, count, ty| {
            Command::DrawInstanced {
                primitive,
                mode,
                count,
                ty,
                instances,
            }
        })
    }

    /// Draws with the arguments stored in `buffer` at `offset`.
    pub fn draw_indirect(
        &mut self,
        job: JobHandle,
        call: &DrawCall,
        buffer: VertexBufferHandle,
        offset: usize,
    ) -> bool {
        let buffer = match self.resources.vertex_buffers.get(buffer) {
            Some(v) => v.vbo,
            None => {
                error!("Indirect draw with illegal {}.", buffer);
                return false;
            }
        };

        self.draw_with(job, call, |_, mode, _, ty| Command::DrawIndirect {
            mode,
            ty,
            buffer,
            offset,
        })
    }

    pub fn dispatch(&mut self, job: JobHandle, call: &DispatchCall, x: u32, y: u32, z: u32) -> bool {
        self.dispatch_with(job, call, Command::Dispatch([x, y, z]))
    }

    /// Dispatches with the group counts stored in `buffer` at `offset`.
    pub fn dispatch_indirect(
        &mut self,
        job: JobHandle,
        call: &DispatchCall,
        buffer: VertexBufferHandle,
        offset: usize,
    ) -> bool {
        let buffer = match self.resources.vertex_buffers.get(buffer) {
            Some(v) => v.vbo,
            None => {
                error!("Indirect dispatch with illegal {}.", buffer);
                return false;
            }
        };

        self.dispatch_with(job, call, Command::DispatchIndirect { buffer, offset })
    }

    fn draw_with<F>(&mut self, handle: JobHandle, call: &DrawCall, command: F) -> bool
    where
        F: FnOnce(crate::ngl::state::PrimitiveType, GLenum, u32, GLenum) -> Command,
    {
        let job = match self.jobs.get_mut(handle) {
            Some(v) => v,
            None => {
                error!("Draw with illegal {}.", handle);
                return false;
            }
        };

        let renderers = job.renderers.len();
        if !job.predraw(self.device.as_mut(), &mut self.resources, call) {
            return false;
        }

        if job.renderers.len() > renderers {
            self.submitter.renderer_created(handle);
        }

        let (count, ty) = match self.resources.index_buffers.get(call.index_buffer) {
            Some(v) => (v.num_indices, v.ty),
            None => return false,
        };

        let command = command(call.primitive, call.primitive.into(), count, ty);
        self.submitter.submit(self.device.as_mut(), handle, &command);
        job.postdraw(self.device.as_mut());
        true
    }

    fn dispatch_with(&mut self, handle: JobHandle, call: &DispatchCall, command: Command) -> bool {
        let job = match self.jobs.get_mut(handle) {
            Some(v) => v,
            None => {
                error!("Dispatch with illegal {}.", handle);
                return false;
            }
        };

        let renderers = job.renderers.len();
        if !job.predispatch(self.device.as_mut(), &mut self.resources, call) {
            return false;
        }

        if job.renderers.len() > renderers {
            self.submitter.renderer_created(handle);
        }

        self.submitter.submit(self.device.as_mut(), handle, &command);
        job.postdraw(self.device.as_mut());
        true
    }
}

impl Instance {
    pub fn begin_command_buffer(&mut self, command_buffer: u32) {
        if !self.recording.insert(command_buffer) {
            warn!("Command buffer {} is already recording.", command_buffer);
        }
    }

    pub fn end_command_buffer(&mut self, command_buffer: u32) {
        if !self.recording.remove(&command_buffer) {
            warn!("Command buffer {} is not recording.", command_buffer);
        }
    }

    /// Submits a command buffer. The commands have already been issued to
    /// the GL context, this only flushes them.
    pub fn submit_command_buffer(&mut self, command_buffer: u32) {
        if self.recording.contains(&command_buffer) {
            warn!("Submit of command buffer {} which is still recording.", command_buffer);
        }

        self.device.flush();
    }

    #[inline]
    pub fn flush(&mut self) {
        self.device.flush();
    }

    #[inline]
    pub fn finish(&mut self) {
        self.device.finish();
    }

    /// Issues resource barriers. The GL driver tracks these hazards itself.
    pub fn barrier(
        &mut self,
        command_buffer: u32,
        textures: &[TextureTransition],
        buffers: &[BufferTransition],
    ) {
        barrier(command_buffer, textures, buffers);
    }

    /// Hands the pending barriers of the transition tracker over to the
    /// backend.
    pub fn execute_transitions(&mut self, command_buffer: u32) {
        self.transitions.execute(command_buffer, barrier);
    }

    /// Starts to gather per job statistics of every submitted command.
    pub fn begin_statistic(&mut self) {
        self.statistic = None;
        self.submitter = Box::new(StatisticsSubmitter::new());
    }

    /// Stops gathering statistics. The gathered ones stay readable.
    pub fn end_statistic(&mut self) {
        self.statistic = self.submitter.statistic().cloned();
        self.submitter = Box::new(PlainSubmitter);
    }

    /// Gets the statistics of the running, or the last finished, gathering.
    pub fn get_statistic(&self) -> Option<&Statistic> {
        self.submitter.statistic().or_else(|| self.statistic.as_ref())
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        for mut job in self.jobs.drain() {
            job.destroy(self.device.as_mut());
        }

        self.resources.clear(self.device.as_mut());

        if self.vao != 0 {
            self.device.bind_vertex_array(0);
            self.device.delete_vertex_array(self.vao);
        }

        INSTANCE_ALIVE.with(|v| v.set(false));
    }
}

fn barrier(command_buffer: u32, textures: &[TextureTransition], buffers: &[BufferTransition]) {
    trace!(
        "Barrier on command buffer {}: {} texture and {} buffer transitions.",
        command_buffer,
        textures.len(),
        buffers.len()
    );

    for v in textures {
        trace!("    {}", v);
    }
}

/// Attaches a debug label to a GL object if `enabled`.
pub(crate) fn label(
    device: &mut dyn Device,
    enabled: bool,
    identifier: GLenum,
    name: GLuint,
    label: &str,
) {
    if enabled {
        device.object_label(identifier, name, label);
    }
}
