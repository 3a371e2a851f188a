//! Coalesces the barriers of consecutive levels or faces of one texture into
//! ranges, for backends whose barrier calls take subresource ranges.

use super::TextureTransition;
use crate::ngl::format::TextureType;
use crate::ngl::TextureHandle;

/// A run of subresource transitions with identical states. `face` counts
/// array layers, or `layer * 6 + face` for cube textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRange {
    pub transition: TextureTransition,
    pub base_level: u32,
    pub base_face: u32,
    pub num_levels: u32,
    pub num_faces: u32,
}

impl TransitionRange {
    fn new(transition: TextureTransition, face: u32) -> Self {
        TransitionRange {
            transition,
            base_level: transition.texture.level,
            base_face: face,
            num_levels: 1,
            num_faces: 1,
        }
    }

    fn extends(&self, v: &TextureTransition) -> bool {
        self.transition.texture.texture == v.texture.texture
            && self.transition.old_state == v.old_state
            && self.transition.new_state == v.new_state
    }
}

/// Merges `barriers` in order. `texture_type` resolves the type of the
/// textures the barriers refer to.
pub fn merge<F>(barriers: &[TextureTransition], texture_type: F) -> Vec<TransitionRange>
where
    F: Fn(TextureHandle) -> TextureType,
{
    let mut ranges: Vec<TransitionRange> = Vec::with_capacity(barriers.len());

    for v in barriers {
        let face = match texture_type(v.texture.texture) {
            TextureType::Cube => v.texture.layer * 6 + v.texture.face,
            _ => v.texture.layer,
        };

        let level = v.texture.level;
        if let Some(last) = ranges.last_mut() {
            if last.extends(v) {
                if last.base_face == face
                    && last.num_faces == 1
                    && last.base_level + last.num_levels == level
                {
                    last.num_levels += 1;
                    continue;
                }

                if last.base_level == level
                    && last.num_levels == 1
                    && last.base_face + last.num_faces == face
                {
                    last.num_faces += 1;
                    continue;
                }
            }
        }

        ranges.push(TransitionRange::new(*v, face));
    }

    ranges
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ngl::access::ResourceState;
    use crate::ngl::descriptor::TextureSubresource;
    use crate::utils::handle::HandleLike;

    fn barrier(texture: TextureHandle, level: u32, layer: u32, face: u32) -> TextureTransition {
        TextureTransition::new(
            TextureSubresource::new(texture, level, layer, face),
            Some(ResourceState::ColorAttachment),
            ResourceState::ShaderResource,
        )
    }

    #[test]
    fn levels() {
        let t: TextureHandle = HandleLike::new(1, 1);
        let barriers: Vec<_> = (0..4).map(|level| barrier(t, level, 0, 0)).collect();

        let ranges = merge(&barriers, |_| TextureType::Texture2D);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].num_levels, 4);
        assert_eq!(ranges[0].num_faces, 1);
    }

    #[test]
    fn faces() {
        let t: TextureHandle = HandleLike::new(1, 1);
        let barriers: Vec<_> = (0..6).map(|face| barrier(t, 0, 0, face)).collect();

        let ranges = merge(&barriers, |_| TextureType::Cube);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].num_faces, 6);

        let ranges = merge(&barriers, |_| TextureType::Texture2D);
        assert_eq!(ranges.len(), 6);
    }

    #[test]
    fn breaks() {
        let a: TextureHandle = HandleLike::new(1, 1);
        let b: TextureHandle = HandleLike::new(2, 1);

        let mut other_state = barrier(a, 2, 0, 0);
        other_state.new_state = ResourceState::DepthAttachment;

        let barriers = vec![
            barrier(a, 0, 0, 0),
            barrier(a, 1, 0, 0),
            other_state,
            barrier(b, 0, 0, 0),
            barrier(b, 2, 0, 0),
        ];

        let ranges = merge(&barriers, |_| TextureType::Texture2D);
        let lens: Vec<_> = ranges.iter().map(|v| v.num_levels).collect();
        assert_eq!(lens, vec![2, 1, 1, 1]);
        assert_eq!(ranges[3].base_level, 2);
    }
}
