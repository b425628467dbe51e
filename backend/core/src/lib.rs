pub mod error;
pub mod event;
pub mod traits;
pub mod types;

pub use error::{Result, TriageError};
pub use event::TurnEvent;
pub use traits::{CompletionClient, CompletionRequest, FragmentStream};
pub use types::{ConversationTurn, ModelId, Role};
