pub use crate::errors::ResourceError;
pub use crate::settings::ContextDescriptor;

pub use crate::ngl::prelude::*;
pub use crate::ngl::state::ShaderKey;

pub use crate::backend::headless::{Call, CallLog, HeadlessDevice, UniformValues};
pub use crate::backend::Device;

pub use crate::instance::draw::{DispatchCall, DrawCall};
pub use crate::instance::resources::TextureContent;
pub use crate::instance::submit::{JobStatistic, Statistic};
pub use crate::instance::{CustomAction, Instance};

pub use crate::transitions::merger::{merge, TransitionRange};
pub use crate::transitions::subpass::create_subpass_transitions;
pub use crate::transitions::{BufferTransition, TextureTransition, Transitions};

pub use crate::utils::handle::{Handle, HandleLike};
