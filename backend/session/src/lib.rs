//! Streaming session management.
//!
//! A [`ConversationSession`] owns the append-only history. The
//! [`SessionManager`] turns one user prompt into a [`TurnStream`] of
//! fragments and commits the assistant turn only when the stream completes.

pub mod history;
pub mod manager;
pub mod worker;

pub use history::{ConversationHistory, ConversationSession};
pub use manager::{SessionManager, TurnState, TurnStream};
pub use worker::{spawn_session_worker, SessionCommand, SessionWorker};
