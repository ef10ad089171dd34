//! One chat turn: classify → retrieve → orchestrate → compose.

use std::sync::Arc;

use serde::Serialize;
use sunbae_config::AppConfig;
use sunbae_core::{Clock, ConversationTurn, ResponseEnvelope, Result};
use sunbae_knowledge::calendar::{CalendarMode, CalendarQuery, search_events};
use sunbae_knowledge::{DatasetStore, library};
use tracing::{debug, info, warn};

use crate::composer::compose;
use crate::intent::{Intent, classify, template_for};
use crate::orchestrator::{Orchestrator, OrchestratorConfig, ReplyRequest, ReplySource};
use crate::prompt;

/// The envelope plus what produced it.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub envelope: ResponseEnvelope,
    /// Retrieved facts rendered as text; empty when nothing was retrieved.
    pub augmentation: String,
    pub intent: Intent,
    pub reply_source: ReplySource,
}

pub struct ChatPipeline {
    store: Arc<DatasetStore>,
    orchestrator: Orchestrator,
    clock: Arc<dyn Clock>,
    year: String,
}

impl ChatPipeline {
    /// Fails when `year` is not in the calendar dataset.
    pub fn new(
        store: Arc<DatasetStore>,
        orchestrator: Orchestrator,
        clock: Arc<dyn Clock>,
        year: impl Into<String>,
    ) -> Result<Self> {
        let year = year.into();
        store.events_for_year(&year)?;
        Ok(Self {
            store,
            orchestrator,
            clock,
            year,
        })
    }

    /// Remote clients are built from the config; without an API key the
    /// pipeline runs offline. Assistant mappings for characters the store
    /// does not know are dropped.
    pub fn from_config(config: &AppConfig, store: Arc<DatasetStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let remote = sunbae_providers::build_from_config(config);
        let mut orchestrator_config = OrchestratorConfig::from_app(config);
        let unknown = orchestrator_config
            .assistants
            .retain_known(|id| store.get_character(id).is_some());
        if !unknown.is_empty() {
            warn!(ids = ?unknown, "Ignoring assistant mappings for unknown characters");
        }
        let orchestrator = Orchestrator::new(orchestrator_config, remote, clock.clone());
        Self::new(store, orchestrator, clock, config.default_year.clone())
    }

    pub fn store(&self) -> &Arc<DatasetStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Calendar year searched by chat turns.
    pub fn year(&self) -> &str {
        &self.year
    }

    /// Run the retrievals the intent asks for and render them, calendar
    /// first.
    pub fn augment(&self, message: &str, intent: &Intent) -> Result<String> {
        let mut text = String::new();

        if intent.wants_calendar() {
            let query = CalendarQuery {
                terms: search_terms(message, &intent.calendar),
                category: None,
                mode: CalendarMode::Nearest,
            };
            let events = search_events(&self.store, &self.year, &query, self.clock.today())?;
            debug!(events = events.len(), "Calendar retrieval");
            text.push_str(&prompt::calendar_section(&events));
        }

        if intent.wants_library() {
            let books = library::search_for_chat(&self.store, &search_terms(message, &intent.library));
            debug!(books = books.len(), "Library retrieval");
            text.push_str(&prompt::library_section(&books));

            if let Some(request) = &intent.recommendation
                && let Some(recommendation) = library::recommend(&self.store, request.category_hint)
            {
                text.push_str(&prompt::recommendation_section(&recommendation));
            }
        }

        Ok(text)
    }

    pub async fn respond(&self, turn: &ConversationTurn) -> Result<TurnOutcome> {
        let character = &turn.character;
        let intent = classify(&turn.message);
        let augmentation = self.augment(&turn.message, &intent)?;
        let system_prompt = prompt::system_prompt(template_for(character), character, &augmentation);

        let reply = self
            .orchestrator
            .reply(&ReplyRequest {
                character,
                message: &turn.message,
                system_prompt: &system_prompt,
                augmentation: &augmentation,
                intent: &intent,
            })
            .await;

        let envelope = compose(reply.text, &intent, character);
        info!(
            character = %character.id,
            response_type = ?envelope.response_type,
            source = ?reply.source,
            "Chat turn answered"
        );

        Ok(TurnOutcome {
            envelope,
            augmentation,
            intent,
            reply_source: reply.source,
        })
    }
}

/// The whole message plus every keyword that fired.
fn search_terms(message: &str, keywords: &[&str]) -> Vec<String> {
    std::iter::once(message)
        .chain(keywords.iter().copied())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::{APOLOGY, AssistantDirectory};
    use crate::test_helpers::*;
    use chrono::NaiveDate;
    use sunbae_core::{FixedClock, ResponseType, RunStatus};
    use sunbae_providers::RemoteClients;

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()))
    }

    fn store() -> Arc<DatasetStore> {
        Arc::new(DatasetStore::embedded().unwrap())
    }

    fn offline_pipeline() -> ChatPipeline {
        let clock = clock();
        let orchestrator = Orchestrator::new(OrchestratorConfig::default(), None, clock.clone());
        ChatPipeline::new(store(), orchestrator, clock, "2024").unwrap()
    }

    fn turn(message: &str, character_id: &str) -> ConversationTurn {
        let character = store().get_character(character_id).unwrap().clone();
        ConversationTurn {
            message: message.into(),
            character,
        }
    }

    #[tokio::test]
    async fn exam_question_offline_is_academic_with_events() {
        let outcome = offline_pipeline()
            .respond(&turn("이번 학기 시험 언제예요", "sage"))
            .await
            .unwrap();

        assert_eq!(outcome.envelope.response_type, ResponseType::Academic);
        assert_eq!(outcome.envelope.speaker, "세이지");
        assert_eq!(outcome.reply_source, ReplySource::Offline);
        assert!(outcome.augmentation.starts_with("\n\n📅 관련 학사일정:\n"));
        // nearest to 2024-04-01 is the spring midterm
        assert!(outcome.augmentation.contains("• 1학기 중간고사: 2024. 4. 22. ~ 2024. 4. 26."));
        assert!(outcome.envelope.text.contains("학사일정에 대해 궁금하시군요!"));
    }

    #[tokio::test]
    async fn greeting_offline_is_plain_text() {
        let outcome = offline_pipeline().respond(&turn("안녕하세요", "sunny")).await.unwrap();
        assert_eq!(outcome.envelope.response_type, ResponseType::Text);
        assert!(outcome.augmentation.is_empty());
        assert!(outcome.envelope.text.starts_with("안녕하세요! 저는 써니입니다. 😊\n\n"));
    }

    #[tokio::test]
    async fn book_request_offline_splices_books_and_recommendation() {
        let outcome = offline_pipeline()
            .respond(&turn("전공 프로그래밍 책 추천해줘", "spark"))
            .await
            .unwrap();

        assert_eq!(outcome.envelope.response_type, ResponseType::Library);
        assert!(outcome.augmentation.contains("📚 관련 도서:"));
        assert!(outcome.augmentation.contains("⭐ 컴퓨터공학과 추천 도서 추천:"));
        assert!(outcome.envelope.text.ends_with(&outcome.augmentation));
    }

    #[test]
    fn both_domains_concatenate_calendar_first() {
        let pipeline = offline_pipeline();
        let message = "시험 기간에 읽을 전공 책";
        let text = pipeline.augment(message, &classify(message)).unwrap();
        let calendar = text.find("📅").unwrap();
        let library = text.find("📚").unwrap();
        assert!(calendar < library);
    }

    #[test]
    fn chat_augmentation_caps_results() {
        let pipeline = offline_pipeline();
        let message = "전공 프로그래밍 도서";
        let text = pipeline.augment(message, &classify(message)).unwrap();
        assert_eq!(text.matches("\n• ").count(), library::CHAT_LIMIT);
    }

    #[test]
    fn unknown_year_is_rejected_at_construction() {
        let clock = clock();
        let orchestrator = Orchestrator::new(OrchestratorConfig::default(), None, clock.clone());
        assert!(ChatPipeline::new(store(), orchestrator, clock, "1999").is_err());
    }

    #[tokio::test]
    async fn assistant_receives_augmented_message() {
        let clock = clock();
        let assistants = Arc::new(ScriptedAssistant::new(
            vec![RunStatus::Queued, RunStatus::Completed],
            vec![text_message("4월 22일부터 중간고사예요!")],
        ));
        let config = OrchestratorConfig {
            assistants: AssistantDirectory::default().with("sage", "asst_sage"),
            ..Default::default()
        };
        let remote = RemoteClients {
            completions: Arc::new(ScriptedProvider::new(vec![])),
            assistants: assistants.clone(),
        };
        let orchestrator = Orchestrator::new(config, Some(remote), clock.clone());
        let pipeline = ChatPipeline::new(store(), orchestrator, clock, "2024").unwrap();

        let outcome = pipeline.respond(&turn("시험 언제예요", "sage")).await.unwrap();
        assert_eq!(outcome.reply_source, ReplySource::Assistant);
        assert_eq!(outcome.envelope.text, "4월 22일부터 중간고사예요!");

        let posted = assistants.posted_messages();
        assert!(posted[0].starts_with("시험 언제예요\n\n참고 정보:\n\n\n📅 관련 학사일정:"));
    }

    #[tokio::test]
    async fn completion_gets_persona_prompt() {
        let clock = clock();
        let completions = Arc::new(ScriptedProvider::new(vec![Ok(String::new())]));
        let remote = RemoteClients {
            completions: completions.clone(),
            assistants: Arc::new(ScriptedAssistant::new(vec![], vec![])),
        };
        let orchestrator = Orchestrator::new(OrchestratorConfig::default(), Some(remote), clock.clone());
        let pipeline = ChatPipeline::new(store(), orchestrator, clock, "2024").unwrap();

        let outcome = pipeline.respond(&turn("도서관 위치 알려줘", "spark")).await.unwrap();
        assert_eq!(outcome.envelope.text, APOLOGY);
        assert_eq!(outcome.reply_source, ReplySource::Completion);

        let request = completions.last_request().unwrap();
        assert!(request.messages[0].content.contains("당신은 스파크이라는 이름의"));
        assert!(request.messages[0].content.contains("도서관 정보를 잘 알고 있는"));
        assert_eq!(request.messages[1].content, "도서관 위치 알려줘");
    }

    #[test]
    fn offline_pipeline_from_default_config() {
        let clock: Arc<dyn Clock> = clock();
        let pipeline = ChatPipeline::from_config(&AppConfig::default(), store(), clock).unwrap();
        assert!(!pipeline.orchestrator().is_online());
        assert_eq!(pipeline.year(), "2024");
    }

    #[test]
    fn stray_assistant_env_vars_map_no_character() {
        let mut config = AppConfig::default();
        config.apply_env([
            ("SAGE_ASSISTANT_ID".to_string(), "asst_sage".to_string()),
            ("OPENAI_ASSISTANT_ID".to_string(), "asst_stray".to_string()),
        ]);
        assert_eq!(config.assistant_for("openai"), Some("asst_stray"));

        let clock: Arc<dyn Clock> = clock();
        let pipeline = ChatPipeline::from_config(&config, store(), clock).unwrap();
        let assistants = &pipeline.orchestrator().config().assistants;
        assert_eq!(assistants.get("sage"), Some("asst_sage"));
        assert_eq!(assistants.get("openai"), None);
    }

    #[test]
    fn search_terms_lead_with_message() {
        assert_eq!(
            search_terms("시험 언제", &["시험"]),
            vec!["시험 언제".to_string(), "시험".to_string()]
        );
    }
}
