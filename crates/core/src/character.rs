//! AI senior personas.

use serde::{Deserialize, Serialize};

/// A selectable persona.
///
/// Only `id`, `name`, `personality` and `specialties` drive behaviour; every
/// other field (description, avatar, emoji, accent color, ...) is carried
/// through untouched for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub personality: String,
    pub specialties: Vec<String>,

    #[serde(flatten)]
    pub presentation: serde_json::Map<String, serde_json::Value>,
}

impl Character {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        personality: impl Into<String>,
        specialties: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            personality: personality.into(),
            specialties,
            presentation: serde_json::Map::new(),
        }
    }
}
