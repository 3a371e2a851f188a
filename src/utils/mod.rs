//! Commonly used utilities like handles, arenas and hashers.

#[macro_use]
pub mod handle;
pub mod arena;
pub mod hash;

pub mod prelude {
    pub use super::arena::Arena;
    pub use super::handle::{Handle, HandleIndex, HandleLike};
    pub use super::hash::{FastHashMap, FastHashSet};
}
