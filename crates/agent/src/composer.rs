//! Response Composer: the reply object handed back to the caller.

use sunbae_core::{Character, ResponseEnvelope};

use crate::intent::Intent;

/// Wrap reply text with the detected type and the persona's display name.
pub fn compose(text: String, intent: &Intent, character: &Character) -> ResponseEnvelope {
    ResponseEnvelope {
        text,
        response_type: intent.response_type(),
        speaker: character.name.clone(),
    }
}
