//! # Sunbae Core
//!
//! Domain types, traits, and error definitions for the sunbae campus
//! assistant. This crate has **zero framework dependencies**: it defines the
//! domain model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Remote services (one-shot completions, stateful assistants) and time are
//! defined as traits here. Implementations live in their respective crates,
//! so the chat pipeline can be driven by scripted mocks and a frozen clock.

pub mod assistant;
pub mod calendar;
pub mod character;
pub mod clock;
pub mod error;
pub mod library;
pub mod message;
pub mod provider;
pub mod response;

// Re-export key types at crate root for ergonomics
pub use assistant::{AssistantBackend, MessagePart, RunHandle, RunRequest, RunStatus, ThreadMessage};
pub use calendar::{Event, Holiday};
pub use character::Character;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DatasetError, Error, OrchestrationError, ProviderError, Result};
pub use library::{Book, RecommendationSet, ResolvedRecommendation};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use response::{ConversationTurn, ResponseEnvelope, ResponseType};
