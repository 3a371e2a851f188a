//! Render jobs: the subpasses of a job, their framebuffers and the load and
//! store behaviour of their attachments.

use gl::types::*;

use super::label;
use super::renderer::Renderer;
use super::resources::{Resources, TextureRecord};
use crate::backend::Device;
use crate::errors::*;
use crate::ngl::access::ResourceState;
use crate::ngl::descriptor::{JobDescriptor, LoadOp, StoreOp, TextureSubresource};
use crate::ngl::format::TextureType;
use crate::ngl::state::{BlendFunc, ColorMask, DepthFunc, PipelineState, MAX_COLOR_ATTACHMENTS};
use crate::ngl::TextureHandle;

/// The clear value of a color attachment of a subpass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearData {
    /// The draw buffer index.
    pub index: u32,
    pub value: [f32; 4],
}

#[derive(Debug, Clone, Default)]
pub struct Subpass {
    pub name: String,
    pub fbo: GLuint,
    /// The size of the attachments at their bound level.
    pub size: [u32; 2],
    pub color_attachments: Vec<TextureSubresource>,
    /// The job attachment index of every color attachment.
    pub color_remap: Vec<usize>,
    pub depth_attachment: Option<TextureSubresource>,
    pub depth_remap: Option<usize>,
    pub color_clears: Vec<ClearData>,
    pub depth_clear: Option<f32>,
    /// Attachments whose content is undefined at the begin of the subpass.
    pub load_discards: Vec<GLenum>,
    /// Attachments whose content is not needed after the subpass.
    pub store_discards: Vec<GLenum>,
    /// Color attachments are cleared one by one with their own values.
    pub independent_clear: bool,
}

impl Subpass {
    /// Returns true if the subpass renders into the default framebuffer.
    #[inline]
    pub fn is_default(&self) -> bool {
        self.color_attachments
            .iter()
            .chain(self.depth_attachment.iter())
            .any(|v| v.texture.is_nil())
    }

    #[inline]
    pub fn references(&self, texture: TextureHandle) -> bool {
        self.color_attachments
            .iter()
            .chain(self.depth_attachment.iter())
            .any(|v| v.texture == texture)
    }
}

pub struct Job {
    pub descriptor: JobDescriptor,
    pub name: String,
    pub subpasses: Vec<Subpass>,
    /// The programs of this job, created on first use.
    pub renderers: Vec<Renderer>,
    pub current: PipelineState,
    /// The state that has been applied by the last draw. `None` forces every
    /// category to be applied again.
    pub previous: Option<PipelineState>,
    pub active_renderer: Option<usize>,
    pub current_subpass: usize,
    pub is_started: bool,
    pub command_buffer: u32,
}

impl Job {
    pub fn new(descriptor: &JobDescriptor, resources: &Resources) -> Result<Job> {
        let name = descriptor
            .subpasses
            .first()
            .map(|v| v.name.clone())
            .unwrap_or_else(|| "unnamed_job".to_owned());

        let subpasses = create_passes(descriptor, resources)?;

        Ok(Job {
            descriptor: descriptor.clone(),
            name,
            subpasses,
            renderers: Vec::new(),
            current: PipelineState::default(),
            previous: None,
            active_renderer: None,
            current_subpass: 0,
            is_started: false,
            command_buffer: 0,
        })
    }

    /// Returns true if any subpass renders into `texture`.
    pub fn references(&self, texture: TextureHandle) -> bool {
        self.subpasses.iter().any(|v| v.references(texture))
    }

    /// (Re)creates the framebuffer objects of every subpass, and resets the
    /// viewport and scissor of the job to the size of the first subpass.
    pub fn create_framebuffers(
        &mut self,
        device: &mut dyn Device,
        resources: &Resources,
        labels: bool,
    ) -> Result<()> {
        if self.descriptor.is_compute {
            return Ok(());
        }

        for (i, subpass) in self.subpasses.iter_mut().enumerate() {
            if subpass.fbo != 0 {
                device.delete_framebuffer(subpass.fbo);
                subpass.fbo = 0;
            }

            let first = subpass
                .color_attachments
                .first()
                .or_else(|| subpass.depth_attachment.as_ref())
                .cloned();

            if let Some(v) = first {
                let texture = match resources.textures.get(v.texture) {
                    Some(texture) => texture,
                    None => bail!("Attachment of {} refers to illegal {}.", subpass.name, v.texture),
                };

                subpass.size = [
                    (texture.descriptor.size[0] >> v.level).max(1),
                    (texture.descriptor.size[1] >> v.level).max(1),
                ];
            }

            if i == 0 {
                let rect = [0, 0, subpass.size[0] as i32, subpass.size[1] as i32];
                self.current.viewport = rect;
                self.current.scissor = rect;
            }

            if subpass.is_default() {
                continue;
            }

            subpass.fbo = device.gen_framebuffer();
            device.bind_framebuffer(gl::FRAMEBUFFER, subpass.fbo);
            label(
                device,
                labels,
                gl::FRAMEBUFFER,
                subpass.fbo,
                &format!("{}_fbo", subpass.name),
            );

            for (j, v) in subpass.color_attachments.iter().enumerate() {
                let texture = resources
                    .textures
                    .get(v.texture)
                    .ok_or_else(|| format_err!("Illegal color attachment {}.", v.texture))?;
                attach(device, gl::COLOR_ATTACHMENT0 + j as GLenum, texture, v);
            }

            if let Some(ref v) = subpass.depth_attachment {
                let texture = resources
                    .textures
                    .get(v.texture)
                    .ok_or_else(|| format_err!("Illegal depth attachment {}.", v.texture))?;
                attach(device, gl::DEPTH_ATTACHMENT, texture, v);
            }

            let status = device.check_framebuffer_status(gl::FRAMEBUFFER);

            if subpass.color_attachments.len() > 1 {
                let buffers: Vec<_> = (0..subpass.color_attachments.len())
                    .map(|j| gl::COLOR_ATTACHMENT0 + j as GLenum)
                    .collect();
                device.draw_buffers(&buffers);
            }

            device.bind_framebuffer(gl::FRAMEBUFFER, 0);

            if status != gl::FRAMEBUFFER_COMPLETE {
                bail!(
                    "Framebuffer of {} is incomplete (status {:#x}).",
                    subpass.name,
                    status
                );
            }
        }

        Ok(())
    }

    pub fn begin(&mut self, device: &mut dyn Device, command_buffer: u32) {
        if self.is_started {
            error!("Job {} is already started.", self.name);
            return;
        }

        if self.subpasses.is_empty() {
            error!("Job {} has no subpasses.", self.name);
            return;
        }

        self.is_started = true;
        self.command_buffer = command_buffer;
        self.current_subpass = 0;
        self.current.subpass = 0;
        self.previous = None;
        self.active_renderer = None;

        self.begin_subpass(device);
    }

    pub fn next_subpass(&mut self, device: &mut dyn Device) {
        if !self.is_started {
            error!("NextSubpass on job {} which is not started.", self.name);
            return;
        }

        if self.current_subpass + 1 >= self.subpasses.len() {
            error!("Job {} has no more subpasses.", self.name);
            return;
        }

        self.end_subpass(device);

        self.current_subpass += 1;
        self.current.subpass = self.current_subpass as u32;
        self.previous = None;
        self.active_renderer = None;

        self.begin_subpass(device);
    }

    /// Finishes the job and restores the global GL state every job starts
    /// from.
    pub fn end(&mut self, device: &mut dyn Device) {
        if !self.is_started {
            error!("End on job {} which is not started.", self.name);
            return;
        }

        self.end_subpass(device);

        device.disable(gl::DEPTH_TEST);
        device.disable(gl::BLEND);
        device.disable(gl::SCISSOR_TEST);
        device.disable(gl::CULL_FACE);
        device.disable(gl::POLYGON_OFFSET_FILL);
        device.color_mask(true, true, true, true);
        device.depth_mask(true);
        device.depth_func(gl::LESS);
        device.depth_range(0.0, 1.0);
        device.bind_framebuffer(gl::FRAMEBUFFER, 0);

        self.is_started = false;
        self.previous = None;
        self.active_renderer = None;
    }

    fn begin_subpass(&mut self, device: &mut dyn Device) {
        let subpass = &self.subpasses[self.current_subpass];

        if self.descriptor.is_compute {
            return;
        }

        device.bind_framebuffer(gl::FRAMEBUFFER, subpass.fbo);
        device.viewport(self.current.viewport);

        if !subpass.load_discards.is_empty() {
            device.invalidate_framebuffer(gl::FRAMEBUFFER, &subpass.load_discards);
        }

        if subpass.color_clears.is_empty() && subpass.depth_clear.is_none() {
            return;
        }

        device.disable(gl::SCISSOR_TEST);

        let mut mask = 0;

        if !subpass.color_clears.is_empty() {
            device.color_mask(true, true, true, true);

            if subpass.independent_clear {
                for v in &subpass.color_clears {
                    device.clear_buffer_fv(gl::COLOR, v.index as GLint, v.value);
                }
            } else {
                device.clear_color(subpass.color_clears[0].value);
                mask |= gl::COLOR_BUFFER_BIT;
            }
        }

        if let Some(depth) = subpass.depth_clear {
            device.depth_mask(true);
            device.clear_depth(depth);
            mask |= gl::DEPTH_BUFFER_BIT;
        }

        if mask != 0 {
            device.clear(mask);
        }
    }

    fn end_subpass(&mut self, device: &mut dyn Device) {
        let subpass = &self.subpasses[self.current_subpass];
        if !subpass.store_discards.is_empty() {
            device.invalidate_framebuffer(gl::FRAMEBUFFER, &subpass.store_discards);
        }
    }

    /// Sets the blend function and the color mask of the job attachment
    /// `attachment`.
    pub fn set_blend_state(&mut self, attachment: usize, func: BlendFunc, mask: ColorMask) {
        if attachment >= MAX_COLOR_ATTACHMENTS {
            error!(
                "Blend state of attachment {} of job {} is out of range.",
                attachment, self.name
            );
            return;
        }

        self.current.blend_funcs[attachment] = func;
        self.current.color_masks[attachment] = mask;
    }

    pub fn set_depth_state(&mut self, func: DepthFunc, mask: bool) {
        self.current.depth_func = func;
        self.current.depth_mask = mask;
    }

    pub fn set_viewport_scissor(&mut self, viewport: [i32; 4], scissor: [i32; 4]) {
        self.current.viewport = viewport;
        self.current.scissor = scissor;
    }

    /// Returns the subpass that is being recorded.
    #[inline]
    pub fn subpass(&self) -> &Subpass {
        &self.subpasses[self.current_subpass.min(self.subpasses.len().saturating_sub(1))]
    }

    /// Deletes every program of this job, they are created again on demand.
    pub fn delete_pipelines(&mut self, device: &mut dyn Device) {
        for v in self.renderers.drain(..) {
            device.delete_program(v.program);
        }

        self.active_renderer = None;
        self.previous = None;
    }

    /// Deletes every GL object owned by this job.
    pub fn destroy(&mut self, device: &mut dyn Device) {
        self.delete_pipelines(device);

        for v in &mut self.subpasses {
            if v.fbo != 0 {
                device.delete_framebuffer(v.fbo);
                v.fbo = 0;
            }
        }
    }
}

fn attach(device: &mut dyn Device, attachment: GLenum, texture: &TextureRecord, v: &TextureSubresource) {
    match texture.descriptor.ty {
        TextureType::Renderbuffer => {
            device.framebuffer_renderbuffer(gl::FRAMEBUFFER, attachment, texture.object);
        }
        TextureType::Texture2D => {
            device.framebuffer_texture_2d(
                gl::FRAMEBUFFER,
                attachment,
                gl::TEXTURE_2D,
                texture.object,
                v.level as GLint,
            );
        }
        TextureType::Cube => {
            device.framebuffer_texture_2d(
                gl::FRAMEBUFFER,
                attachment,
                gl::TEXTURE_CUBE_MAP_POSITIVE_X + v.face,
                texture.object,
                v.level as GLint,
            );
        }
        TextureType::Texture2DArray => {
            device.framebuffer_texture_layer(
                gl::FRAMEBUFFER,
                attachment,
                texture.object,
                v.level as GLint,
                v.layer as GLint,
            );
        }
    }
}

/// Splits the attachments of a job into the color and depth attachments of
/// every subpass, and works out which of them are cleared or discarded.
fn create_passes(descriptor: &JobDescriptor, resources: &Resources) -> Result<Vec<Subpass>> {
    for v in &descriptor.attachments {
        if !resources.textures.contains(v.attachment.texture) {
            return Err(
                ResourceError::IllegalHandle("attachment", v.attachment.texture.to_string()).into(),
            );
        }
    }

    let usage = |subpass: usize, attachment: usize| -> Option<ResourceState> {
        descriptor.subpasses[subpass].usages.get(attachment).cloned()
    };

    let is_attached = |v: Option<ResourceState>| match v {
        Some(v) => v.is_color_attachment() || v.is_depth_attachment(),
        None => false,
    };

    let last_uses: Vec<Option<usize>> = (0..descriptor.attachments.len())
        .map(|k| {
            (0..descriptor.subpasses.len())
                .rev()
                .find(|i| is_attached(usage(*i, k)))
        })
        .collect();

    let mut cleared = vec![false; descriptor.attachments.len()];
    let mut discarded = vec![false; descriptor.attachments.len()];
    let mut subpasses = Vec::with_capacity(descriptor.subpasses.len());

    for (i, sd) in descriptor.subpasses.iter().enumerate() {
        let mut subpass = Subpass {
            name: sd.name.clone(),
            ..Default::default()
        };

        for (k, attachment) in descriptor.attachments.iter().enumerate() {
            let state = match usage(i, k) {
                Some(v) => v,
                None => continue,
            };

            let is_default = attachment.attachment.texture.is_nil();
            let clear_value = resources
                .textures
                .get(attachment.attachment.texture)
                .map(|v| v.descriptor.clear_value)
                .unwrap_or([0.0, 0.0, 0.0, 1.0]);

            let target = if state.is_color_attachment() {
                let j = subpass.color_attachments.len();
                if j >= MAX_COLOR_ATTACHMENTS {
                    bail!("Subpass {} has too many color attachments.", sd.name);
                }

                if attachment.load_op == LoadOp::Clear && !cleared[k] {
                    subpass.color_clears.push(ClearData {
                        index: j as u32,
                        value: clear_value,
                    });
                }

                subpass.color_attachments.push(attachment.attachment);
                subpass.color_remap.push(k);

                if is_default {
                    gl::COLOR
                } else {
                    gl::COLOR_ATTACHMENT0 + j as GLenum
                }
            } else if state.is_depth_attachment() {
                if subpass.depth_attachment.is_some() {
                    bail!("Subpass {} has more than one depth attachment.", sd.name);
                }

                if attachment.load_op == LoadOp::Clear && !cleared[k] {
                    subpass.depth_clear = Some(clear_value[0]);
                }

                subpass.depth_attachment = Some(attachment.attachment);
                subpass.depth_remap = Some(k);

                if is_default {
                    gl::DEPTH
                } else {
                    gl::DEPTH_ATTACHMENT
                }
            } else {
                continue;
            };

            if attachment.load_op == LoadOp::Clear {
                cleared[k] = true;
            }

            if attachment.load_op == LoadOp::DontCare && !discarded[k] {
                subpass.load_discards.push(target);
                discarded[k] = true;
            }

            if attachment.store_op == StoreOp::DontCare && last_uses[k] == Some(i) {
                subpass.store_discards.push(target);
            }
        }

        subpass.independent_clear = match subpass.color_clears.first() {
            Some(first) => {
                subpass.color_clears.len() != subpass.color_attachments.len()
                    || subpass.color_clears.iter().any(|v| v.value != first.value)
            }
            None => false,
        };

        subpasses.push(subpass);
    }

    Ok(subpasses)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::headless::{Call, HeadlessDevice};
    use crate::ngl::descriptor::{AttachmentDescriptor, SubpassDescriptor, TextureDescriptor};
    use crate::ngl::format::Format;
    use crate::utils::handle::HandleLike;

    fn target(
        device: &mut HeadlessDevice,
        resources: &mut Resources,
        format: Format,
        clear: f32,
    ) -> TextureHandle {
        let mut td = TextureDescriptor::render_target("rt", format, 128, 64);
        td.set_all_clear_value(clear);
        resources
            .try_gen_texture(device, TextureHandle::nil(), &td, None)
            .unwrap()
    }

    #[test]
    fn passes() {
        let mut device = HeadlessDevice::new();
        let mut resources = Resources::new(640, 480);

        let color = target(&mut device, &mut resources, Format::R8G8B8A8Unorm, 0.0);
        let normal = target(&mut device, &mut resources, Format::R8G8B8A8Unorm, 0.5);
        let depth = target(&mut device, &mut resources, Format::D24Unorm, 1.0);

        let descriptor = JobDescriptor {
            attachments: vec![
                AttachmentDescriptor::new(color, LoadOp::Clear, StoreOp::Store),
                AttachmentDescriptor::new(normal, LoadOp::Clear, StoreOp::DontCare),
                AttachmentDescriptor::new(depth, LoadOp::DontCare, StoreOp::DontCare),
            ],
            subpasses: vec![
                SubpassDescriptor::new(
                    "gbuffer",
                    vec![
                        ResourceState::ColorAttachment,
                        ResourceState::ColorAttachment,
                        ResourceState::DepthAttachment,
                    ],
                ),
                SubpassDescriptor::new(
                    "lighting",
                    vec![
                        ResourceState::ColorAttachment,
                        ResourceState::ShaderResource,
                        ResourceState::ReadOnlyDepthAttachment,
                    ],
                ),
            ],
            ..Default::default()
        };

        let job = Job::new(&descriptor, &resources).unwrap();
        assert_eq!(job.name, "gbuffer");

        let gbuffer = &job.subpasses[0];
        assert_eq!(gbuffer.color_remap, vec![0, 1]);
        assert_eq!(gbuffer.depth_remap, Some(2));
        assert_eq!(gbuffer.color_clears.len(), 2);
        assert!(gbuffer.independent_clear);
        assert_eq!(gbuffer.load_discards, vec![gl::DEPTH_ATTACHMENT]);
        assert_eq!(gbuffer.store_discards, vec![gl::COLOR_ATTACHMENT1]);

        let lighting = &job.subpasses[1];
        assert_eq!(lighting.color_remap, vec![0]);
        assert!(lighting.color_clears.is_empty());
        assert!(lighting.depth_clear.is_none());
        assert!(lighting.load_discards.is_empty());
        assert_eq!(lighting.store_discards, vec![gl::DEPTH_ATTACHMENT]);

        assert!(job.references(normal));
        assert!(!job.references(TextureHandle::new(9, 1)));
    }

    #[test]
    fn illegal_attachment() {
        let resources = Resources::new(640, 480);
        let descriptor = JobDescriptor {
            attachments: vec![AttachmentDescriptor::new(
                TextureHandle::new(3, 1),
                LoadOp::Load,
                StoreOp::Store,
            )],
            subpasses: vec![SubpassDescriptor::new(
                "main",
                vec![ResourceState::ColorAttachment],
            )],
            ..Default::default()
        };

        let err = Job::new(&descriptor, &resources).err().unwrap();
        match err.downcast_ref::<ResourceError>() {
            Some(ResourceError::IllegalHandle(..)) => {}
            _ => panic!("unexpected error: {}", err),
        }
    }

    #[test]
    fn framebuffers() {
        let mut device = HeadlessDevice::new();
        let log = device.calls();
        let mut resources = Resources::new(640, 480);

        let color = target(&mut device, &mut resources, Format::R8G8B8A8Unorm, 0.0);
        let descriptor = JobDescriptor {
            attachments: vec![
                AttachmentDescriptor::new(
                    TextureSubresource::new(color, 1, 0, 0),
                    LoadOp::Clear,
                    StoreOp::Store,
                ),
                AttachmentDescriptor::new(TextureHandle::nil(), LoadOp::Load, StoreOp::Store),
            ],
            subpasses: vec![
                SubpassDescriptor::new(
                    "offscreen",
                    vec![ResourceState::ColorAttachment, ResourceState::ShaderResource],
                ),
                SubpassDescriptor::new(
                    "present",
                    vec![ResourceState::ShaderResource, ResourceState::ColorAttachment],
                ),
            ],
            ..Default::default()
        };

        let mut job = Job::new(&descriptor, &resources).unwrap();
        log.borrow_mut().clear();
        job.create_framebuffers(&mut device, &resources, false).unwrap();

        assert_ne!(job.subpasses[0].fbo, 0);
        assert_eq!(job.subpasses[0].size, [64, 32]);
        assert_eq!(job.subpasses[1].fbo, 0);
        assert_eq!(job.subpasses[1].size, [640, 480]);
        assert_eq!(job.current.viewport, [0, 0, 64, 32]);

        assert!(log.borrow().iter().any(|v| match *v {
            Call::FramebufferTexture2D { level, .. } => level == 1,
            _ => false,
        }));

        let fbo = job.subpasses[0].fbo;
        job.create_framebuffers(&mut device, &resources, false).unwrap();
        assert!(log.borrow().contains(&Call::DeleteFramebuffer(fbo)));

        job.destroy(&mut device);
        assert_eq!(job.subpasses[0].fbo, 0);
    }

    #[test]
    fn begin_end() {
        let mut device = HeadlessDevice::new();
        let log = device.calls();
        let mut resources = Resources::new(640, 480);

        let color = target(&mut device, &mut resources, Format::R8G8B8A8Unorm, 0.25);
        let descriptor = JobDescriptor {
            attachments: vec![AttachmentDescriptor::new(color, LoadOp::Clear, StoreOp::Store)],
            subpasses: vec![SubpassDescriptor::new(
                "main",
                vec![ResourceState::ColorAttachment],
            )],
            ..Default::default()
        };

        let mut job = Job::new(&descriptor, &resources).unwrap();
        job.create_framebuffers(&mut device, &resources, false).unwrap();
        let fbo = job.subpasses[0].fbo;

        log.borrow_mut().clear();
        job.begin(&mut device, 0);
        assert!(job.is_started);

        {
            let calls = log.borrow();
            assert_eq!(calls[0], Call::BindFramebuffer(gl::FRAMEBUFFER, fbo));
            assert!(calls.contains(&Call::ClearColor([0.25; 4])));
            assert_eq!(calls.last(), Some(&Call::Clear(gl::COLOR_BUFFER_BIT)));
        }

        log.borrow_mut().clear();
        job.begin(&mut device, 0);
        assert!(log.borrow().is_empty());

        job.next_subpass(&mut device);
        assert_eq!(job.current_subpass, 0);

        job.end(&mut device);
        assert!(!job.is_started);

        let calls = log.borrow();
        assert!(calls.contains(&Call::Disable(gl::DEPTH_TEST)));
        assert!(calls.contains(&Call::Disable(gl::BLEND)));
        assert!(calls.contains(&Call::Disable(gl::CULL_FACE)));
        assert!(calls.contains(&Call::Disable(gl::SCISSOR_TEST)));
        assert!(calls.contains(&Call::ColorMask([true; 4])));
    }
}
