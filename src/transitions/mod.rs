//! # Transitions
//!
//! `Transitions` remembers the last known GPU access state of every texture
//! subresource and buffer, and batches the barriers needed before a resource
//! is used in a new way.
//!
//! ```rust,ignore
//! transitions
//!     .texture_barrier(shadow_map, ResourceState::ShaderResource)
//!     .buffer_barrier(particles, ResourceState::ShaderResourceAndUnorderedAccess);
//!
//! instance.execute_transitions(command_buffer);
//! ```
//!
//! Every subresource must be registered exactly once before a barrier refers
//! to it. Misuse is a programming error and trips an assertion. The nil
//! texture handle addresses the default framebuffer, which is never tracked.

pub mod merger;
pub mod subpass;

use std::fmt;

use crate::ngl::access::ResourceState;
use crate::ngl::descriptor::{TextureDescriptor, TextureSubresource, VertexDescriptor};
use crate::ngl::format::Format;
use crate::ngl::{TextureHandle, VertexBufferHandle};
use crate::utils::hash::FastHashMap;

/// A state change of a texture subresource. `old_state` of `None` means the
/// old state is whatever the tracker knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureTransition {
    pub texture: TextureSubresource,
    pub old_state: Option<ResourceState>,
    pub new_state: ResourceState,
}

impl TextureTransition {
    pub fn new<T>(texture: T, old_state: Option<ResourceState>, new_state: ResourceState) -> Self
    where
        T: Into<TextureSubresource>,
    {
        TextureTransition {
            texture: texture.into(),
            old_state,
            new_state,
        }
    }
}

impl fmt::Display for TextureTransition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.old_state {
            Some(v) => write!(f, "{}: {} -> {}", self.texture, v, self.new_state),
            None => write!(f, "{}: ? -> {}", self.texture, self.new_state),
        }
    }
}

/// A state change of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferTransition {
    pub buffer: VertexBufferHandle,
    pub old_state: ResourceState,
    pub new_state: ResourceState,
}

#[derive(Debug, Default)]
pub struct Transitions {
    textures: FastHashMap<TextureSubresource, ResourceState>,
    names: FastHashMap<TextureHandle, String>,
    buffers: FastHashMap<VertexBufferHandle, ResourceState>,
    texture_barriers: Vec<TextureTransition>,
    buffer_barriers: Vec<BufferTransition>,
}

impl Transitions {
    pub fn new() -> Self {
        Transitions::default()
    }

    /// Establishes the initial state of every level, layer and face of a
    /// newly created texture.
    pub fn register_texture(
        &mut self,
        texture: TextureHandle,
        descriptor: &TextureDescriptor,
    ) -> &mut Self {
        if texture.is_nil() {
            return self;
        }

        let state = if descriptor.unordered_access {
            ResourceState::ShaderResourceAndUnorderedAccessAndNonFragmentShaderResource
        } else if descriptor.is_renderable {
            if Transitions::is_depth_texture(descriptor.format) {
                ResourceState::DepthAttachment
            } else {
                ResourceState::ColorAttachment
            }
        } else {
            ResourceState::ShaderResource
        };

        for level in 0..descriptor.levels() {
            for layer in 0..descriptor.layers() {
                for face in 0..descriptor.ty.faces() {
                    let subresource = TextureSubresource::new(texture, level, layer, face);
                    let prev = self.textures.insert(subresource, state);
                    assert!(prev.is_none(), "{} is registered twice.", subresource);
                }
            }
        }

        self.names.insert(texture, descriptor.name.clone());
        self
    }

    pub fn register_buffer(
        &mut self,
        buffer: VertexBufferHandle,
        descriptor: &VertexDescriptor,
    ) -> &mut Self {
        let state = if descriptor.unordered_access {
            ResourceState::ShaderResourceAndUnorderedAccessAndNonFragmentShaderResource
        } else {
            ResourceState::ShaderResource
        };

        let prev = self.buffers.insert(buffer, state);
        assert!(prev.is_none(), "{} is registered twice.", buffer);
        self
    }

    /// Requests `new_state` for a subresource. A barrier is recorded if the
    /// state changes, or unconditionally if `new_state` allows shader writes.
    pub fn texture_barrier<T>(&mut self, subresource: T, new_state: ResourceState) -> &mut Self
    where
        T: Into<TextureSubresource>,
    {
        let subresource = subresource.into();
        if subresource.texture.is_nil() {
            return self;
        }

        let old_state = match self.textures.get_mut(&subresource) {
            Some(v) => v,
            None => panic!("Barrier on unregistered {}.", subresource),
        };

        if *old_state != new_state || new_state.is_read_write() {
            self.texture_barriers.push(TextureTransition {
                texture: subresource,
                old_state: Some(*old_state),
                new_state,
            });

            *old_state = new_state;
        }

        self
    }

    pub fn texture_mip_level_barrier(
        &mut self,
        texture: TextureHandle,
        level: u32,
        new_state: ResourceState,
    ) -> &mut Self {
        self.texture_barrier(TextureSubresource::new(texture, level, 0, 0), new_state)
    }

    /// Requests the `new_state` of every transition in `barriers`.
    pub fn texture_barriers(&mut self, barriers: &[TextureTransition]) -> &mut Self {
        for v in barriers {
            self.texture_barrier(v.texture, v.new_state);
        }

        self
    }

    /// Requests `new_state` for every subresource in `textures`.
    pub fn textures_barrier(
        &mut self,
        textures: &[TextureSubresource],
        new_state: ResourceState,
    ) -> &mut Self {
        for v in textures {
            self.texture_barrier(*v, new_state);
        }

        self
    }

    pub fn buffer_barrier(&mut self, buffer: VertexBufferHandle, new_state: ResourceState) -> &mut Self {
        let old_state = match self.buffers.get_mut(&buffer) {
            Some(v) => v,
            None => panic!("Barrier on unregistered {}.", buffer),
        };

        if *old_state != new_state || new_state.is_read_write() {
            self.buffer_barriers.push(BufferTransition {
                buffer,
                old_state: *old_state,
                new_state,
            });

            *old_state = new_state;
        }

        self
    }

    /// Stores the new states of transitions that were performed elsewhere,
    /// e.g. by the implicit transitions of a render pass.
    pub fn update_texture_states(&mut self, states: &[TextureTransition]) -> &mut Self {
        for v in states {
            let state = match self.textures.get_mut(&v.texture) {
                Some(state) => state,
                None => panic!("Update of unregistered {}.", v.texture),
            };

            if let Some(old_state) = v.old_state {
                assert_eq!(
                    *state, old_state,
                    "{} is in {}, not in {}.",
                    v.texture, *state, old_state
                );
            }

            *state = v.new_state;
        }

        self
    }

    /// Hands the pending barriers over to `barrier` and clears them. Nothing
    /// is called if there are no pending barriers.
    pub fn execute<F>(&mut self, command_buffer: u32, barrier: F)
    where
        F: FnOnce(u32, &[TextureTransition], &[BufferTransition]),
    {
        if self.texture_barriers.is_empty() && self.buffer_barriers.is_empty() {
            return;
        }

        barrier(command_buffer, &self.texture_barriers, &self.buffer_barriers);

        self.texture_barriers.clear();
        self.buffer_barriers.clear();
    }

    #[inline]
    pub fn pending_texture_barriers(&self) -> &[TextureTransition] {
        &self.texture_barriers
    }

    #[inline]
    pub fn pending_buffer_barriers(&self) -> &[BufferTransition] {
        &self.buffer_barriers
    }

    /// Gets the state of a subresource. The default framebuffer is always a
    /// color attachment.
    pub fn get_texture_state<T>(&self, subresource: T) -> Option<ResourceState>
    where
        T: Into<TextureSubresource>,
    {
        let subresource = subresource.into();
        if subresource.texture.is_nil() {
            Some(ResourceState::ColorAttachment)
        } else {
            self.textures.get(&subresource).cloned()
        }
    }

    #[inline]
    pub fn get_buffer_state(&self, buffer: VertexBufferHandle) -> Option<ResourceState> {
        self.buffers.get(&buffer).cloned()
    }

    #[inline]
    pub fn is_depth_texture(format: Format) -> bool {
        format.is_depth()
    }

    pub fn dump_resource_states(&self) {
        let mut textures: Vec<_> = self.textures.iter().collect();
        textures.sort_by_key(|v| *v.0);

        info!("Textures:");
        for (subresource, state) in textures {
            let name = self
                .names
                .get(&subresource.texture)
                .map(|v| v.as_str())
                .unwrap_or("");
            info!("{} ({}): {}", subresource, name, state);
        }

        let mut buffers: Vec<_> = self.buffers.iter().collect();
        buffers.sort_by_key(|v| *v.0);

        info!("Buffers:");
        for (buffer, state) in buffers {
            info!("{}: {}", buffer, state);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ngl::format::TextureType;
    use crate::utils::handle::HandleLike;

    fn texture(index: u32) -> TextureHandle {
        HandleLike::new(index, 1)
    }

    fn rw_texture() -> TextureDescriptor {
        TextureDescriptor {
            name: "lighting".into(),
            format: Format::R16G16B16A16Float,
            unordered_access: true,
            ..Default::default()
        }
    }

    #[test]
    fn register() {
        let mut transitions = Transitions::new();
        let color = TextureDescriptor::render_target("color", Format::R8G8B8A8Unorm, 64, 64);
        let depth = TextureDescriptor::render_target("depth", Format::D24Unorm, 64, 64);

        let mut cube = TextureDescriptor::default();
        cube.ty = TextureType::Cube;
        cube.num_levels = 3;

        transitions
            .register_texture(texture(1), &color)
            .register_texture(texture(2), &depth)
            .register_texture(texture(3), &rw_texture())
            .register_texture(texture(4), &cube);

        assert_eq!(
            transitions.get_texture_state(texture(1)),
            Some(ResourceState::ColorAttachment)
        );
        assert_eq!(
            transitions.get_texture_state(texture(2)),
            Some(ResourceState::DepthAttachment)
        );
        assert_eq!(
            transitions.get_texture_state(texture(3)),
            Some(ResourceState::ShaderResourceAndUnorderedAccessAndNonFragmentShaderResource)
        );
        assert_eq!(
            transitions.get_texture_state(TextureSubresource::new(texture(4), 2, 0, 5)),
            Some(ResourceState::ShaderResource)
        );
        assert_eq!(
            transitions.get_texture_state(TextureSubresource::new(texture(4), 3, 0, 0)),
            None
        );
        assert_eq!(
            transitions.get_texture_state(TextureHandle::nil()),
            Some(ResourceState::ColorAttachment)
        );
    }

    #[test]
    #[should_panic]
    fn register_twice() {
        let mut transitions = Transitions::new();
        transitions
            .register_texture(texture(1), &rw_texture())
            .register_texture(texture(1), &rw_texture());
    }

    #[test]
    fn idempotent_barriers() {
        let color = TextureDescriptor::render_target("color", Format::R8G8B8A8Unorm, 64, 64);
        let mut transitions = Transitions::new();
        transitions.register_texture(texture(1), &color);

        transitions
            .texture_barrier(texture(1), ResourceState::ShaderResource)
            .texture_barrier(texture(1), ResourceState::ShaderResource);

        assert_eq!(
            transitions.pending_texture_barriers(),
            &[TextureTransition::new(
                texture(1),
                Some(ResourceState::ColorAttachment),
                ResourceState::ShaderResource
            )]
        );
    }

    #[test]
    fn read_write_barriers_are_always_recorded() {
        let mut transitions = Transitions::new();
        transitions.register_texture(texture(1), &rw_texture());

        let state = ResourceState::ShaderResourceAndUnorderedAccess;
        transitions
            .texture_barrier(texture(1), state)
            .texture_barrier(texture(1), state);
        assert_eq!(transitions.pending_texture_barriers().len(), 2);
        assert_eq!(
            transitions.pending_texture_barriers()[1].old_state,
            Some(state)
        );

        transitions.texture_barrier(texture(1), ResourceState::ShaderResource);
        let last = transitions.pending_texture_barriers()[2];
        assert_eq!(last.old_state, Some(state));
        assert_eq!(last.new_state, ResourceState::ShaderResource);
    }

    #[test]
    fn default_framebuffer_is_exempt() {
        let mut transitions = Transitions::new();
        transitions.texture_barrier(TextureHandle::nil(), ResourceState::ShaderResource);
        assert!(transitions.pending_texture_barriers().is_empty());
    }

    #[test]
    #[should_panic]
    fn unregistered_texture() {
        let mut transitions = Transitions::new();
        transitions.texture_barrier(texture(7), ResourceState::ShaderResource);
    }

    #[test]
    #[should_panic]
    fn unregistered_buffer() {
        let mut transitions = Transitions::new();
        transitions.buffer_barrier(HandleLike::new(1, 1), ResourceState::ShaderResource);
    }

    #[test]
    fn buffers() {
        let buffer: VertexBufferHandle = HandleLike::new(1, 1);
        let mut descriptor = VertexDescriptor::default();
        descriptor.unordered_access = true;

        let mut transitions = Transitions::new();
        transitions
            .register_buffer(buffer, &descriptor)
            .buffer_barrier(buffer, ResourceState::ShaderResource)
            .buffer_barrier(buffer, ResourceState::ShaderResource);

        assert_eq!(
            transitions.pending_buffer_barriers(),
            &[BufferTransition {
                buffer,
                old_state: ResourceState::ShaderResourceAndUnorderedAccessAndNonFragmentShaderResource,
                new_state: ResourceState::ShaderResource,
            }]
        );
        assert_eq!(
            transitions.get_buffer_state(buffer),
            Some(ResourceState::ShaderResource)
        );
    }

    #[test]
    fn execute() {
        let mut transitions = Transitions::new();
        transitions.register_texture(texture(1), &rw_texture());

        let mut calls = 0;
        transitions.execute(0, |_, _, _| calls += 1);
        assert_eq!(calls, 0);

        transitions.texture_mip_level_barrier(texture(1), 0, ResourceState::ShaderResource);
        transitions.execute(3, |cmd, textures, buffers| {
            assert_eq!(cmd, 3);
            assert_eq!(textures.len(), 1);
            assert!(buffers.is_empty());
            calls += 1;
        });

        assert_eq!(calls, 1);
        assert!(transitions.pending_texture_barriers().is_empty());
    }

    #[test]
    fn update_states() {
        let mut transitions = Transitions::new();
        transitions.register_texture(texture(1), &rw_texture());

        let state = ResourceState::ShaderResourceAndUnorderedAccessAndNonFragmentShaderResource;
        transitions.update_texture_states(&[TextureTransition::new(
            texture(1),
            Some(state),
            ResourceState::ShaderResource,
        )]);

        assert_eq!(
            transitions.get_texture_state(texture(1)),
            Some(ResourceState::ShaderResource)
        );
        assert!(transitions.pending_texture_barriers().is_empty());
    }

    #[test]
    #[should_panic]
    fn update_with_wrong_old_state() {
        let mut transitions = Transitions::new();
        transitions.register_texture(texture(1), &rw_texture());
        transitions.update_texture_states(&[TextureTransition::new(
            texture(1),
            Some(ResourceState::DepthAttachment),
            ResourceState::ShaderResource,
        )]);
    }
}
