//! The OpenGL implementation of `Device`, and the conversions from NGL enums
//! to GL enums.

pub mod device;
pub mod types;

pub use self::device::GLDevice;
