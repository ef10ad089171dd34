//! Canned replies used when no remote client is configured, plus the fixed
//! apology and degraded-service texts.

use crate::intent::Intent;

/// Returned when a remote call succeeds but yields no usable text.
pub const APOLOGY: &str = "죄송합니다. 응답을 생성하는 중 오류가 발생했습니다.";

const CALENDAR_REPLY: &str = "학사일정에 대해 궁금하시군요! 현재 API 설정이 필요한 상태이지만, 실제 환경에서는 최신 학사일정 정보를 제공해드릴 수 있어요. 📅\n\n수강신청, 시험 일정, 방학 기간 등 궁금한 것이 있으시면 언제든지 물어보세요!";

const LIBRARY_REPLY: &str = "도서 관련 질문이시네요! 📚 실제 환경에서는 도서관의 모든 책 정보를 검색하고 추천해드릴 수 있어요.\n\n전공 관련 도서부터 교양 도서까지, 어떤 분야의 책을 찾고 계신가요?";

const GENERAL_REPLY: &str = "무엇을 도와드릴까요? 학교생활, 학사일정, 도서관 이용 등 궁금한 것이 있으시면 언제든지 말씀해주세요!\n\n실제 환경에서는 config.toml 또는 OPENAI_API_KEY 환경변수에 API 키를 설정해주세요. 🔧";

/// `"안녕하세요! 저는 <name>입니다. 😊\n\n"`
pub fn greeting(name: &str) -> String {
    format!("안녕하세요! 저는 {name}입니다. 😊\n\n")
}

/// The reply when the remote path failed.
pub fn degraded(name: &str) -> String {
    format!("{}API 연결에 문제가 있어 기본 응답을 드리고 있어요.", greeting(name))
}

/// A locally synthesised reply. Only the library variant splices in the
/// retrieved facts.
pub fn offline_reply(name: &str, intent: &Intent, augmentation: &str) -> String {
    let mut reply = greeting(name);
    if intent.wants_calendar() {
        reply.push_str(CALENDAR_REPLY);
    } else if intent.wants_library() {
        reply.push_str(LIBRARY_REPLY);
        reply.push_str(augmentation);
    } else {
        reply.push_str(GENERAL_REPLY);
    }
    reply
}
