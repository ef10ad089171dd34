//! Intent Classifier.
//!
//! A plain keyword scan: case-sensitive substring containment, no
//! tokenization or negation handling. Kept behind [`classify`] so a better
//! classifier can replace it without touching retrieval or orchestration.

use serde::Serialize;
use sunbae_core::{Character, ResponseType};

/// Tokens that trigger a calendar search.
pub const CALENDAR_KEYWORDS: [&str; 6] = ["학사일정", "시험", "수강신청", "개강", "방학", "졸업식"];

/// Tokens that trigger a book search.
pub const LIBRARY_KEYWORDS: [&str; 5] = ["도서", "책", "도서관", "추천", "전공"];

/// Token that additionally asks for a reading list.
pub const RECOMMEND_KEYWORD: &str = "추천";

/// Secondary keywords mapped to reading-list hints, checked in order.
const CATEGORY_HINTS: &[(&[&str], &str)] = &[
    (&["컴퓨터", "프로그래밍"], "컴퓨터공학과"),
    (&["신입생", "새내기"], "신입생"),
    (&["인문", "철학"], "인문학"),
    (&["이공계", "과학"], "이공계"),
];

/// Persona id that gets the librarian template.
pub const LIBRARIAN_ID: &str = "spark";

/// Retrieval directives derived from one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Intent {
    /// Calendar keywords found in the message.
    pub calendar: Vec<&'static str>,
    /// Library keywords found in the message.
    pub library: Vec<&'static str>,
    /// Set when the library directive fired and a reading list was asked for.
    pub recommendation: Option<RecommendationRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationRequest {
    /// `None` resolves to the new-student list.
    pub category_hint: Option<&'static str>,
}

impl Intent {
    pub fn wants_calendar(&self) -> bool {
        !self.calendar.is_empty()
    }

    pub fn wants_library(&self) -> bool {
        !self.library.is_empty()
    }

    /// Library wins over academic when both directives fire.
    pub fn response_type(&self) -> ResponseType {
        if self.wants_library() {
            ResponseType::Library
        } else if self.wants_calendar() {
            ResponseType::Academic
        } else {
            ResponseType::Text
        }
    }
}

pub fn classify(message: &str) -> Intent {
    let calendar: Vec<&'static str> = CALENDAR_KEYWORDS
        .into_iter()
        .filter(|keyword| message.contains(keyword))
        .collect();
    let library: Vec<&'static str> = LIBRARY_KEYWORDS
        .into_iter()
        .filter(|keyword| message.contains(keyword))
        .collect();

    let recommendation = (!library.is_empty() && message.contains(RECOMMEND_KEYWORD)).then(|| {
        RecommendationRequest {
            category_hint: category_hint(message),
        }
    });

    Intent {
        calendar,
        library,
        recommendation,
    }
}

/// First matching entry of the hint table.
pub fn category_hint(message: &str) -> Option<&'static str> {
    CATEGORY_HINTS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| message.contains(k)))
        .map(|(_, category)| *category)
}

/// Which system-prompt variant a persona uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptTemplate {
    Librarian,
    Counselor,
}

pub fn template_for(character: &Character) -> PromptTemplate {
    if character.id == LIBRARIAN_ID {
        PromptTemplate::Librarian
    } else {
        PromptTemplate::Counselor
    }
}
