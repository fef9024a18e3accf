pub mod generate;
pub mod normalize;
pub mod orchestrator; // Conversation step: translate → normalize → resolve → generate
pub mod responder;
pub mod translate;

pub use orchestrator::{ChatOutcome, ChatPipeline, Degradation, ResponseSource};
