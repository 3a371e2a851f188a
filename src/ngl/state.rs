//! The pipeline state snapshot of a job and the categorical diff between two
//! snapshots.

/// Maximum number of color attachments a subpass could write to.
pub const MAX_COLOR_ATTACHMENTS: usize = 8;

/// Specify which polygons are culled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CullMode {
    /// Only front faces are drawn, back faces are culled.
    FrontSided,
    /// Only back faces are drawn, front faces are culled.
    BackSided,
    TwoSided,
}

impl Default for CullMode {
    fn default() -> Self {
        CullMode::TwoSided
    }
}

/// The blend equations supported by a color attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFunc {
    Disabled,
    Additive,
    Alfa,
    Decal,
    Modulative,
    AdditiveAlfa,
    AdditiveInverseAlfa,
    TransparentAccumulation,
}

impl Default for BlendFunc {
    fn default() -> Self {
        BlendFunc::Disabled
    }
}

bitflags! {
    /// A set of color channels that are written by a draw.
    #[derive(Serialize, Deserialize)]
    pub struct ColorMask: u8 {
        const R = 1 << 0;
        const G = 1 << 1;
        const B = 1 << 2;
        const A = 1 << 3;
    }
}

impl ColorMask {
    /// Returns the `(r, g, b, a)` write flags.
    #[inline]
    pub fn channels(self) -> (bool, bool, bool, bool) {
        (
            self.contains(ColorMask::R),
            self.contains(ColorMask::G),
            self.contains(ColorMask::B),
            self.contains(ColorMask::A),
        )
    }
}

impl Default for ColorMask {
    fn default() -> Self {
        ColorMask::all()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepthFunc {
    Disabled,
    Less,
    LessOrEqual,
    Equal,
    Greater,
    /// Depth test with `LEQUAL`, every fragment is forced onto the far plane.
    ToFar,
    /// Depth test with `LESS` plus a constant polygon offset.
    LessWithOffset,
    Always,
}

impl Default for DepthFunc {
    fn default() -> Self {
        DepthFunc::Disabled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Points,
    Lines,
    Triangles,
    Patch3,
    Patch4,
    Patch16,
}

impl Default for PrimitiveType {
    fn default() -> Self {
        PrimitiveType::Points
    }
}

impl PrimitiveType {
    /// Returns the number of control points if this is a patch primitive.
    #[inline]
    pub fn patch_vertices(self) -> Option<u32> {
        match self {
            PrimitiveType::Patch3 => Some(3),
            PrimitiveType::Patch4 => Some(4),
            PrimitiveType::Patch16 => Some(16),
            _ => None,
        }
    }

    /// Returns the number of primitives assembled from `len` indices.
    pub fn assemble(self, len: u32) -> u32 {
        match self {
            PrimitiveType::Points => len,
            PrimitiveType::Lines => len / 2,
            PrimitiveType::Triangles => len / 3,
            PrimitiveType::Patch3 => len / 3,
            PrimitiveType::Patch4 => len / 4,
            PrimitiveType::Patch16 => len / 16,
        }
    }
}

/// The shader selection of a draw. The same shader code used with a
/// different vertex layout needs a different program.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShaderKey {
    pub shader_code: u32,
    pub vbo_hash: u32,
}

/// Everything that participates in diffing consecutive draws of a job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub shader: ShaderKey,
    pub subpass: u32,
    pub primitive_type: PrimitiveType,
    pub cull_mode: CullMode,
    pub blend_funcs: [BlendFunc; MAX_COLOR_ATTACHMENTS],
    pub color_masks: [ColorMask; MAX_COLOR_ATTACHMENTS],
    pub depth_func: DepthFunc,
    pub depth_mask: bool,
    pub viewport: [i32; 4],
    pub scissor: [i32; 4],
}

impl Default for PipelineState {
    fn default() -> Self {
        PipelineState {
            shader: ShaderKey::default(),
            subpass: 0,
            primitive_type: PrimitiveType::default(),
            cull_mode: CullMode::TwoSided,
            blend_funcs: [BlendFunc::Disabled; MAX_COLOR_ATTACHMENTS],
            color_masks: [ColorMask::all(); MAX_COLOR_ATTACHMENTS],
            depth_func: DepthFunc::Disabled,
            depth_mask: true,
            viewport: [0; 4],
            scissor: [0; 4],
        }
    }
}

impl PipelineState {
    /// Returns the categories that differ from `previous`. Every category is
    /// reported if nothing has been applied yet.
    pub fn changes_since(&self, previous: Option<&PipelineState>) -> StateChanges {
        let previous = match previous {
            Some(v) => v,
            None => return StateChanges::all(),
        };

        let mut changes = StateChanges::empty();

        if self.shader != previous.shader {
            changes.insert(StateChanges::SHADER);
        }

        if self.subpass != previous.subpass {
            changes.insert(StateChanges::SUBPASS);
        }

        if self.primitive_type != previous.primitive_type {
            changes.insert(StateChanges::PRIMITIVE_TYPE);
        }

        if self.cull_mode != previous.cull_mode {
            changes.insert(StateChanges::CULL_MODE);
        }

        if self.blend_funcs != previous.blend_funcs {
            changes.insert(StateChanges::COLOR_BLEND_FUNCS);
        }

        if self.color_masks != previous.color_masks {
            changes.insert(StateChanges::COLOR_MASKS);
        }

        if self.depth_func != previous.depth_func {
            changes.insert(StateChanges::DEPTH_FUNC);
        }

        if self.depth_mask != previous.depth_mask {
            changes.insert(StateChanges::DEPTH_MASK);
        }

        if self.viewport != previous.viewport {
            changes.insert(StateChanges::VIEWPORT);
        }

        if self.scissor != previous.scissor {
            changes.insert(StateChanges::SCISSOR);
        }

        changes
    }
}

bitflags! {
    /// The logical groups of pipeline state that are diffed as a whole.
    pub struct StateChanges: u16 {
        const SHADER = 1 << 0;
        const SUBPASS = 1 << 1;
        const PRIMITIVE_TYPE = 1 << 2;
        const CULL_MODE = 1 << 3;
        const COLOR_BLEND_FUNCS = 1 << 4;
        const COLOR_MASKS = 1 << 5;
        const DEPTH_FUNC = 1 << 6;
        const DEPTH_MASK = 1 << 7;
        const VIEWPORT = 1 << 8;
        const SCISSOR = 1 << 9;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let state = PipelineState::default();
        assert_eq!(state.cull_mode, CullMode::TwoSided);
        assert_eq!(state.depth_func, DepthFunc::Disabled);
        assert!(state.depth_mask);
        assert!(state.color_masks.iter().all(|v| v.is_all()));
    }

    #[test]
    fn first_apply_changes_everything() {
        let state = PipelineState::default();
        let changes = state.changes_since(None);
        assert!(changes.is_all());
        assert_eq!(changes.bits().count_ones(), 10);
    }

    #[test]
    fn single_category() {
        let previous = PipelineState::default();
        assert!(previous.changes_since(Some(&previous)).is_empty());

        let mut state = previous;
        state.cull_mode = CullMode::FrontSided;
        let changes = state.changes_since(Some(&previous));
        assert_eq!(changes, StateChanges::CULL_MODE);

        let mut state = previous;
        state.blend_funcs[3] = BlendFunc::Additive;
        state.color_masks[3] = ColorMask::R | ColorMask::A;
        let changes = state.changes_since(Some(&previous));
        assert_eq!(changes, StateChanges::COLOR_BLEND_FUNCS | StateChanges::COLOR_MASKS);
    }

    #[test]
    fn shader_selection_includes_vertex_layout() {
        let previous = PipelineState::default();
        let mut state = previous;
        state.shader.vbo_hash = 42;
        assert!(state
            .changes_since(Some(&previous))
            .contains(StateChanges::SHADER));
    }

    #[test]
    fn color_mask() {
        let mask = ColorMask::R | ColorMask::B;
        assert_eq!(mask.channels(), (true, false, true, false));
        assert!(ColorMask::default().contains(mask));
        assert!(!mask.contains(ColorMask::G));
        assert_eq!(ColorMask::empty().channels(), (false, false, false, false));
        assert_eq!(format!("{:?}", mask), "R | B");
    }

    #[test]
    fn primitives() {
        assert_eq!(PrimitiveType::Triangles.assemble(9), 3);
        assert_eq!(PrimitiveType::Patch16.patch_vertices(), Some(16));
        assert_eq!(PrimitiveType::Lines.patch_vertices(), None);
    }
}
