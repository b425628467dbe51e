pub mod prompt;
pub mod providers;
pub mod sse;

pub use prompt::PromptComposer;
pub use providers::groq::{GroqClient, DEFAULT_BASE_URL};
pub use providers::mock::MockClient;
