//! Draw time values of the application declared uniforms.

use smallvec::SmallVec;

use super::descriptor::{BufferSubresource, TextureSubresource};
use super::{TextureHandle, VertexBufferHandle};

/// The value of a uniform slot at draw time. The variant must agree with the
/// `UniformFormat` the slot was declared with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parameter<'a> {
    /// Components of `Float`, `Float2`, `Float4` and `Mat4` uniforms, array
    /// elements tightly packed.
    Floats(&'a [f32]),
    Ints(&'a [i32]),
    UInts(&'a [u32]),
    Texture(TextureHandle),
    TextureSubresource(TextureSubresource),
    /// A vertex buffer bound as a uniform or storage buffer.
    Buffer(VertexBufferHandle),
    BufferSubresource(BufferSubresource),
}

impl<'a> From<&'a [f32]> for Parameter<'a> {
    fn from(v: &'a [f32]) -> Self {
        Parameter::Floats(v)
    }
}

impl<'a> From<&'a [i32]> for Parameter<'a> {
    fn from(v: &'a [i32]) -> Self {
        Parameter::Ints(v)
    }
}

impl<'a> From<&'a [u32]> for Parameter<'a> {
    fn from(v: &'a [u32]) -> Self {
        Parameter::UInts(v)
    }
}

impl<'a> From<TextureHandle> for Parameter<'a> {
    fn from(v: TextureHandle) -> Self {
        Parameter::Texture(v)
    }
}

impl<'a> From<TextureSubresource> for Parameter<'a> {
    fn from(v: TextureSubresource) -> Self {
        Parameter::TextureSubresource(v)
    }
}

impl<'a> From<VertexBufferHandle> for Parameter<'a> {
    fn from(v: VertexBufferHandle) -> Self {
        Parameter::Buffer(v)
    }
}

impl<'a> From<BufferSubresource> for Parameter<'a> {
    fn from(v: BufferSubresource) -> Self {
        Parameter::BufferSubresource(v)
    }
}

/// An owned copy of the last value a renderer bound to a uniform location.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Floats(SmallVec<[f32; 16]>),
    Ints(SmallVec<[i32; 4]>),
    UInts(SmallVec<[u32; 4]>),
    Texture(TextureHandle),
    TextureSubresource(TextureSubresource),
    Buffer(VertexBufferHandle),
    BufferSubresource(BufferSubresource),
}

impl<'a, 'b> From<&'b Parameter<'a>> for BoundValue {
    fn from(v: &'b Parameter<'a>) -> Self {
        match *v {
            Parameter::Floats(v) => BoundValue::Floats(SmallVec::from_slice(v)),
            Parameter::Ints(v) => BoundValue::Ints(SmallVec::from_slice(v)),
            Parameter::UInts(v) => BoundValue::UInts(SmallVec::from_slice(v)),
            Parameter::Texture(v) => BoundValue::Texture(v),
            Parameter::TextureSubresource(v) => BoundValue::TextureSubresource(v),
            Parameter::Buffer(v) => BoundValue::Buffer(v),
            Parameter::BufferSubresource(v) => BoundValue::BufferSubresource(v),
        }
    }
}

impl BoundValue {
    /// Returns true if binding `v` would leave the program state untouched.
    pub fn matches(&self, v: &Parameter) -> bool {
        match (self, v) {
            (BoundValue::Floats(lhs), Parameter::Floats(rhs)) => lhs.as_slice() == *rhs,
            (BoundValue::Ints(lhs), Parameter::Ints(rhs)) => lhs.as_slice() == *rhs,
            (BoundValue::UInts(lhs), Parameter::UInts(rhs)) => lhs.as_slice() == *rhs,
            (BoundValue::Texture(lhs), Parameter::Texture(rhs)) => lhs == rhs,
            (BoundValue::TextureSubresource(lhs), Parameter::TextureSubresource(rhs)) => {
                lhs == rhs
            }
            (BoundValue::Buffer(lhs), Parameter::Buffer(rhs)) => lhs == rhs,
            (BoundValue::BufferSubresource(lhs), Parameter::BufferSubresource(rhs)) => {
                lhs == rhs
            }
            _ => false,
        }
    }

    /// Returns true if this value lives in the program object rather than in
    /// context wide binding points.
    #[inline]
    pub fn is_program_local(&self) -> bool {
        match *self {
            BoundValue::Floats(_) | BoundValue::Ints(_) | BoundValue::UInts(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::handle::HandleLike;

    #[test]
    fn matches() {
        let v = [1.0, 2.0, 3.0, 4.0];
        let p = Parameter::Floats(&v);
        let bound = BoundValue::from(&p);
        assert!(bound.matches(&p));
        assert!(bound.is_program_local());

        let w = [1.0, 2.0, 3.0, 5.0];
        assert!(!bound.matches(&Parameter::Floats(&w)));
        assert!(!bound.matches(&Parameter::Ints(&[1, 2, 3, 4])));

        let t: TextureHandle = HandleLike::new(1, 1);
        let bound = BoundValue::from(&Parameter::from(t));
        assert!(bound.matches(&Parameter::Texture(t)));
        assert!(!bound.is_program_local());
    }
}
