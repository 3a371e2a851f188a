//! # NGL
//!
//! The OpenGL backend of NGL, a graphics abstraction layer that lets scenes
//! describe render passes, draws and compute dispatches independently of
//! the graphics API.
//!
//! The interesting parts of the backend are:
//!
//! * The pipeline state diff of `instance::draw`, which issues only the GL
//! calls of the state categories that changed since the last draw of a job.
//! * The lazily created programs of `instance::renderer`, and the reflection
//! that maps their active resources onto the application declared uniforms.
//! * The resource transition tracker of `transitions`.
//!
//! Every GL call goes through the `backend::Device` trait. Besides the real
//! `backend::gl::GLDevice`, the `backend::headless::HeadlessDevice` records
//! the calls and simulates a context without a GPU.

#[macro_use]
extern crate log;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate serde;
#[macro_use]
extern crate bitflags;

#[macro_use]
pub mod utils;
pub mod errors;
pub mod settings;

pub mod ngl;

pub mod backend;
pub mod instance;
pub mod transitions;

pub mod prelude;
