use super::TextureTransition;
use crate::ngl::descriptor::JobDescriptor;

/// Creates the transitions of the attachments of a job. The begin
/// transitions bring every attachment into its usage of the first subpass,
/// their old states are left to the tracker. If there are several subpasses,
/// the end transitions describe the implicit change from the first to the
/// last usage, and could be passed to `Transitions::update_texture_states`.
pub fn create_subpass_transitions(
    descriptor: &JobDescriptor,
) -> (Vec<TextureTransition>, Vec<TextureTransition>) {
    let mut begin = Vec::new();
    let mut end = Vec::new();

    let (first, last) = match (descriptor.subpasses.first(), descriptor.subpasses.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return (begin, end),
    };

    for (i, v) in descriptor.attachments.iter().enumerate() {
        let (first_usage, last_usage) = match (first.usages.get(i), last.usages.get(i)) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                warn!("Attachment {} has no usage in every subpass.", i);
                continue;
            }
        };

        begin.push(TextureTransition::new(v.attachment, None, first_usage));

        if descriptor.subpasses.len() > 1 {
            end.push(TextureTransition::new(
                v.attachment,
                Some(first_usage),
                last_usage,
            ));
        }
    }

    (begin, end)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ngl::access::ResourceState;
    use crate::ngl::descriptor::{AttachmentDescriptor, LoadOp, StoreOp, SubpassDescriptor};
    use crate::ngl::TextureHandle;
    use crate::utils::handle::HandleLike;

    fn job(subpasses: Vec<SubpassDescriptor>) -> JobDescriptor {
        let color: TextureHandle = HandleLike::new(1, 1);
        let depth: TextureHandle = HandleLike::new(2, 1);

        JobDescriptor {
            attachments: vec![
                AttachmentDescriptor::new(color, LoadOp::Clear, StoreOp::Store),
                AttachmentDescriptor::new(depth, LoadOp::Clear, StoreOp::DontCare),
            ],
            subpasses,
            ..Default::default()
        }
    }

    #[test]
    fn single_subpass() {
        let descriptor = job(vec![SubpassDescriptor::new(
            "main",
            vec![ResourceState::ColorAttachment, ResourceState::DepthAttachment],
        )]);

        let (begin, end) = create_subpass_transitions(&descriptor);
        assert_eq!(begin.len(), 2);
        assert!(begin.iter().all(|v| v.old_state.is_none()));
        assert_eq!(begin[1].new_state, ResourceState::DepthAttachment);
        assert!(end.is_empty());
    }

    #[test]
    fn multiple_subpasses() {
        let descriptor = job(vec![
            SubpassDescriptor::new(
                "gbuffer",
                vec![ResourceState::ColorAttachment, ResourceState::DepthAttachment],
            ),
            SubpassDescriptor::new(
                "lighting",
                vec![
                    ResourceState::ColorAttachmentAndInputAttachmentAndShaderResource,
                    ResourceState::ReadOnlyDepthAttachmentAndShaderResource,
                ],
            ),
        ]);

        let (begin, end) = create_subpass_transitions(&descriptor);
        assert_eq!(begin.len(), 2);
        assert_eq!(
            end[1],
            TextureTransition::new(
                descriptor.attachments[1].attachment,
                Some(ResourceState::DepthAttachment),
                ResourceState::ReadOnlyDepthAttachmentAndShaderResource
            )
        );
    }

    #[test]
    fn no_subpasses() {
        let (begin, end) = create_subpass_transitions(&job(Vec::new()));
        assert!(begin.is_empty() && end.is_empty());
    }
}
