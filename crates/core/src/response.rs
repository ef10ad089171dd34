//! The inbound chat turn and the reply envelope returned to the caller.

use serde::{Deserialize, Serialize};

use crate::character::Character;

/// Which knowledge domain shaped the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Academic,
    Library,
}

/// One student message addressed to one persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub message: String,
    pub character: Character,
}

/// The reply object rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "message")]
    pub text: String,

    #[serde(rename = "type")]
    pub response_type: ResponseType,

    /// Display name of the persona that answered
    #[serde(rename = "character")]
    pub speaker: String,
}
