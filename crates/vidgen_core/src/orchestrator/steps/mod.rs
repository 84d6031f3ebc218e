//! Pipeline step implementations.
//!
//! Each step handles one phase of turning a topic into a published video.

mod captions;
mod footage;
mod narration;
mod publish;
mod render;
mod script;

pub use captions::CaptionsStep;
pub use footage::FootageStep;
pub use narration::NarrationStep;
pub use publish::PublishStep;
pub use render::RenderStep;
pub use script::ScriptStep;
