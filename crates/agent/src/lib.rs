//! The chat turn pipeline.
//!
//! A turn flows through the pieces in this crate, leaves first:
//!
//! 1. **Classify** the message into retrieval directives ([`intent`])
//! 2. **Retrieve** calendar events and books, rendered as augmentation text
//!    ([`prompt`], backed by `sunbae-knowledge`)
//! 3. **Orchestrate** a remote assistant run or a fallback ([`orchestrator`])
//! 4. **Compose** the reply envelope ([`composer`])
//!
//! [`ChatPipeline`] wires the steps together.

pub mod composer;
pub mod intent;
pub mod orchestrator;
pub mod pipeline;
pub mod prompt;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use intent::{Intent, PromptTemplate, classify};
pub use orchestrator::{
    AssistantDirectory, CompletionSettings, Orchestrator, OrchestratorConfig, PollPolicy, Reply,
    ReplySource, RunSettings, RunState, RunTracker,
};
pub use pipeline::{ChatPipeline, TurnOutcome};
