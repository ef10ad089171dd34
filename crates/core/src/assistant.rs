//! AssistantBackend trait — the stateful remote assistant protocol.
//!
//! A remote assistant is driven through a thread (conversation context) and
//! runs against it:
//!
//! 1. `create_thread` opens a fresh context
//! 2. `add_user_message` submits the enriched question
//! 3. `create_run` starts the assistant on the thread
//! 4. `retrieve_run` is polled until the run leaves `queued`/`in_progress`
//! 5. `list_messages` returns the thread, newest message first

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Generation parameters for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// Remote assistant to run
    pub assistant_id: String,

    /// Generation budget for the reply
    pub max_completion_tokens: u32,

    pub temperature: f32,
}

/// Status reported by the remote side for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Whether the remote side is still working on the run.
    pub fn is_pending(&self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run as seen at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunHandle {
    pub id: String,
    pub status: RunStatus,
}

/// One content block of a thread message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessagePart {
    /// Plain text payload
    Text(String),
    /// Any non-text payload (images, files); carries the remote type tag
    Other(String),
}

/// A message stored on a remote thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub role: String,
    pub content: Vec<MessagePart>,
}

impl ThreadMessage {
    /// The text of the first content block, if that block is text.
    pub fn first_text(&self) -> Option<&str> {
        match self.content.first() {
            Some(MessagePart::Text(text)) => Some(text),
            _ => None,
        }
    }
}

/// Remote assistant protocol, implemented over HTTP in `sunbae-providers`.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// A human-readable name for this backend.
    fn name(&self) -> &str;

    /// Open a new conversation context and return its id.
    async fn create_thread(&self) -> Result<String, ProviderError>;

    /// Append a user message to the thread.
    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<(), ProviderError>;

    /// Start a run of the assistant against the thread.
    async fn create_run(&self, thread_id: &str, request: &RunRequest) -> Result<RunHandle, ProviderError>;

    /// Fetch the current state of a run.
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<RunHandle, ProviderError>;

    /// List the thread's messages, most recent first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, ProviderError>;
}
