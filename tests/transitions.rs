extern crate ngl;

use ngl::prelude::*;

fn create() -> Instance {
    let device = Box::new(HeadlessDevice::new());
    Instance::new(device, ContextDescriptor::gl(4, 5, 64, 64)).unwrap()
}

fn storage_texture(instance: &mut Instance, levels: u32) -> TextureHandle {
    let mut handle = TextureHandle::nil();
    let td = TextureDescriptor {
        name: "storage".into(),
        format: Format::R32G32B32A32Float,
        size: [64, 64, 1],
        num_levels: levels,
        unordered_access: true,
        ..Default::default()
    };

    assert!(instance.gen_texture(&mut handle, &td, None));
    handle
}

#[test]
fn composite_initial_state() {
    let mut instance = create();
    let texture = storage_texture(&mut instance, 1);

    let transitions = instance.transitions();
    assert_eq!(
        transitions.get_texture_state(texture),
        Some(ResourceState::ShaderResourceAndUnorderedAccessAndNonFragmentShaderResource)
    );

    transitions.texture_barrier(texture, ResourceState::ShaderResource);
    assert_eq!(
        transitions.pending_texture_barriers(),
        &[TextureTransition::new(
            texture,
            Some(ResourceState::ShaderResourceAndUnorderedAccessAndNonFragmentShaderResource),
            ResourceState::ShaderResource,
        )]
    );

    transitions.texture_barrier(texture, ResourceState::ShaderResource);
    assert_eq!(transitions.pending_texture_barriers().len(), 1);
}

#[test]
fn writes_are_always_fenced() {
    let mut instance = create();
    let texture = storage_texture(&mut instance, 1);

    let transitions = instance.transitions();
    for _ in 0..3 {
        transitions.texture_barrier(texture, ResourceState::ShaderResourceAndUnorderedAccess);
    }

    assert_eq!(transitions.pending_texture_barriers().len(), 3);
}

#[test]
#[should_panic]
fn unregistered_texture() {
    let mut instance = create();
    let texture: TextureHandle = HandleLike::new(7, 1);
    instance
        .transitions()
        .texture_barrier(texture, ResourceState::ShaderResource);
}

#[test]
fn levels_are_tracked_apart() {
    let mut instance = create();
    let texture = storage_texture(&mut instance, 4);

    let transitions = instance.transitions();
    for level in 0..4 {
        transitions.texture_mip_level_barrier(texture, level, ResourceState::ShaderResource);
    }

    transitions.texture_mip_level_barrier(texture, 2, ResourceState::ShaderResource);
    assert_eq!(transitions.pending_texture_barriers().len(), 4);

    let ranges = merge(transitions.pending_texture_barriers(), |_| {
        TextureType::Texture2D
    });
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].num_levels, 4);
}

#[test]
fn frame() {
    let mut instance = create();

    let mut color = TextureHandle::nil();
    let td = TextureDescriptor::render_target("color", Format::R8G8B8A8Unorm, 64, 64);
    assert!(instance.gen_texture(&mut color, &td, None));

    let mut depth = TextureHandle::nil();
    let td = TextureDescriptor::render_target("depth", Format::D24Unorm, 64, 64);
    assert!(instance.gen_texture(&mut depth, &td, None));

    let descriptor = JobDescriptor {
        is_compute: false,
        attachments: vec![
            AttachmentDescriptor::new(color, LoadOp::Clear, StoreOp::Store),
            AttachmentDescriptor::new(depth, LoadOp::Clear, StoreOp::Store),
        ],
        subpasses: vec![
            SubpassDescriptor::new(
                "opaque",
                vec![ResourceState::ColorAttachment, ResourceState::DepthAttachment],
            ),
            SubpassDescriptor::new(
                "decals",
                vec![
                    ResourceState::ColorAttachment,
                    ResourceState::ReadOnlyDepthAttachmentAndShaderResource,
                ],
            ),
        ],
        loader: None,
    };

    let job = instance.gen_job(&descriptor);
    assert!(!job.is_nil());

    let (begin, end) = create_subpass_transitions(&descriptor);

    // Both attachments are already in their first usage.
    instance.transitions().texture_barriers(&begin);
    assert!(instance.transitions().pending_texture_barriers().is_empty());

    instance.begin(job, 0);
    instance.next_subpass(job);
    instance.end(job);
    instance.transitions().update_texture_states(&end);

    assert_eq!(
        instance.transitions().get_texture_state(depth),
        Some(ResourceState::ReadOnlyDepthAttachmentAndShaderResource)
    );

    instance.transitions().texture_barrier(depth, ResourceState::ShaderResource);
    instance
        .transitions()
        .texture_barrier(TextureHandle::nil(), ResourceState::ShaderResource);
    assert_eq!(instance.transitions().pending_texture_barriers().len(), 1);

    instance.execute_transitions(0);
    assert!(instance.transitions().pending_texture_barriers().is_empty());

    // The next frame brings the depth buffer back.
    instance.transitions().texture_barriers(&begin);
    assert_eq!(
        instance.transitions().pending_texture_barriers()[0].new_state,
        ResourceState::DepthAttachment
    );
}

#[test]
fn buffers() {
    let mut instance = create();

    let mut buffer = VertexBufferHandle::nil();
    let vd = VertexDescriptor {
        stride: 16,
        ..Default::default()
    };
    assert!(instance.gen_vertex_buffer(&mut buffer, &vd, 4, None));

    // Respecification keeps the tracked state.
    assert!(instance.gen_vertex_buffer(&mut buffer, &vd, 8, None));

    let transitions = instance.transitions();
    assert_eq!(
        transitions.get_buffer_state(buffer),
        Some(ResourceState::ShaderResource)
    );

    transitions.buffer_barrier(buffer, ResourceState::ShaderResourceAndNonFragmentShaderResource);
    transitions.buffer_barrier(buffer, ResourceState::ShaderResourceAndNonFragmentShaderResource);
    assert_eq!(
        transitions.pending_buffer_barriers(),
        &[BufferTransition {
            buffer,
            old_state: ResourceState::ShaderResource,
            new_state: ResourceState::ShaderResourceAndNonFragmentShaderResource,
        }]
    );
}
