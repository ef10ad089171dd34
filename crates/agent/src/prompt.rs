//! System prompts and augmentation text.
//!
//! Augmentation is the block of retrieved facts spliced into the prompt and
//! into the message handed to a remote assistant.

use chrono::{Datelike, NaiveDate};
use sunbae_core::{Book, Character, Event, ResolvedRecommendation};

use crate::intent::PromptTemplate;

const REFERENCE_HEADER: &str = "참고 정보:";

const LIBRARIAN_GUIDE: &str = "\
역할 및 지침:
1. 도서관 정보를 잘 알고 있는 똑똑한 친구로서 행동하세요
2. 지적이고 박학다식하며 정확하고 친절하게 정보를 제공하세요
3. 도서 검색, 자료 대출/반납, 열람실 이용 등 도서관 이용 안내를 전문으로 하세요
4. 학술 데이터베이스, 논문 검색 방법 등 정보 탐색 지원을 제공하세요
5. 도서관 행사, 새로운 자료 입수 등 최신 정보를 제공하세요

응답할 때 주의사항:
- \"도서관 이용에 궁금한 점이 있으신가요? 무엇이든 물어보세요.\"와 같은 친근한 톤으로 시작하세요
- \"이 자료는 도서관 몇 층에서 찾으실 수 있습니다.\"와 같이 구체적인 위치 정보를 제공하세요
- \"온라인 학술 데이터베이스를 활용하면 더 많은 정보를 얻을 수 있습니다.\"와 같이 추가 정보 탐색 방법을 제안하세요
- 📚 이모지를 적절히 사용하여 도서관 관련 정보임을 표현하세요
- 정확하고 상세한 정보를 제공하되, 이해하기 쉽게 설명하세요";

const COUNSELOR_GUIDE: &str = "\
역할 및 지침:
1. 대학생의 고민을 듣고 친근하게 상담해주세요
2. 학사일정, 학교생활, 진로 등에 대한 실용적인 조언을 제공하세요
3. 도서관 이용이나 도서 추천에 대한 질문에 답변하세요
4. 항상 긍정적이고 격려하는 톤으로 대화하세요
5. 대학생의 눈높이에 맞는 언어를 사용하세요
6. 구체적이고 실용적인 조언을 제공하세요

응답할 때 주의사항:
- 짧고 친근한 문장으로 답변하세요
- 이모지를 적절히 사용하여 친근함을 표현하세요
- 질문에 대한 구체적인 답변을 제공하세요
- 추가 질문이나 도움이 필요한지 물어보세요";

/// Render the persona's system prompt with the augmentation appended under
/// the reference header (nothing is appended when it is empty).
pub fn system_prompt(template: PromptTemplate, character: &Character, augmentation: &str) -> String {
    let guide = match template {
        PromptTemplate::Librarian => LIBRARIAN_GUIDE,
        PromptTemplate::Counselor => COUNSELOR_GUIDE,
    };
    let reference = if augmentation.is_empty() {
        String::new()
    } else {
        format!("\n{REFERENCE_HEADER}\n{augmentation}")
    };

    format!(
        "당신은 {name}이라는 이름의 대학생 AI 선배입니다.\n\n\
         성격 및 말투:\n{personality}\n\n\
         전문 분야:\n{specialties}\n\n\
         {guide}\n\n{reference}",
        name = character.name,
        personality = character.personality,
        specialties = character.specialties.join(", "),
    )
}

/// The user message submitted to a remote assistant thread.
pub fn run_message(message: &str, augmentation: &str) -> String {
    if augmentation.is_empty() {
        message.to_string()
    } else {
        format!("{message}\n\n{REFERENCE_HEADER}\n{augmentation}")
    }
}

/// `YYYY. M. D.`
pub fn format_date(date: NaiveDate) -> String {
    format!("{}. {}. {}.", date.year(), date.month(), date.day())
}

/// Calendar block; empty when there are no events.
pub fn calendar_section(events: &[Event]) -> String {
    if events.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n\n📅 관련 학사일정:\n");
    for event in events {
        let start = format_date(event.start_date);
        let range = if event.start_date == event.end_date {
            start
        } else {
            format!("{start} ~ {}", format_date(event.end_date))
        };
        out.push_str(&format!("• {}: {range}\n  {}\n", event.title, event.description));
    }
    out
}

/// Book block; empty when there are no books.
pub fn library_section(books: &[Book]) -> String {
    if books.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n\n📚 관련 도서:\n");
    for book in books {
        let availability = if book.is_available() { "가능" } else { "불가능" };
        out.push_str(&format!(
            "• {} ({})\n  {}\n  위치: {}, 대출가능: {availability}\n",
            book.title, book.author, book.description, book.location
        ));
    }
    out
}

pub fn recommendation_section(recommendation: &ResolvedRecommendation) -> String {
    let mut out = format!(
        "\n\n⭐ {} 추천:\n{}\n",
        recommendation.category, recommendation.description
    );
    for book in &recommendation.books {
        out.push_str(&format!("• {} ({})\n", book.title, book.author));
    }
    out
}
