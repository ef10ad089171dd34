//! End-to-end integration tests for the sunbae campus assistant.
//!
//! These tests exercise the full pipeline from a user message to the
//! response envelope, including retrieval over the embedded datasets, the
//! assistant run protocol against a scripted backend, and the HTTP API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use sunbae_agent::{AssistantDirectory, ChatPipeline, Orchestrator, OrchestratorConfig, PollPolicy, ReplySource};
use sunbae_core::error::ProviderError;
use sunbae_core::{
    AssistantBackend, ConversationTurn, FixedClock, Message, MessagePart, Provider, ProviderRequest,
    ProviderResponse, ResponseType, RunHandle, RunRequest, RunStatus, ThreadMessage,
};
use sunbae_knowledge::DatasetStore;
use sunbae_providers::RemoteClients;

// ── Mock remote services ─────────────────────────────────────────────────

/// A completion provider that answers every call with the same text.
struct EchoProvider {
    reply: String,
    calls: Mutex<usize>,
}

impl EchoProvider {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.into(),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for EchoProvider {
    fn name(&self) -> &str {
        "e2e_echo"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        Ok(ProviderResponse {
            message: Message::assistant(self.reply.clone()),
            usage: None,
            model: "e2e-model".into(),
        })
    }
}

/// An assistant backend that steps through scripted run statuses; the last
/// status repeats.
struct ScriptedRuns {
    statuses: Mutex<Vec<RunStatus>>,
    content: Vec<MessagePart>,
    posted: Mutex<Vec<String>>,
}

impl ScriptedRuns {
    fn new(statuses: Vec<RunStatus>, reply: &str) -> Self {
        Self::with_content(statuses, vec![MessagePart::Text(reply.into())])
    }

    /// The latest thread message carries `content` verbatim.
    fn with_content(statuses: Vec<RunStatus>, content: Vec<MessagePart>) -> Self {
        Self {
            statuses: Mutex::new(statuses),
            content,
            posted: Mutex::new(Vec::new()),
        }
    }

    fn next_status(&self) -> RunStatus {
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.remove(0)
        } else {
            statuses[0]
        }
    }
}

#[async_trait::async_trait]
impl AssistantBackend for ScriptedRuns {
    fn name(&self) -> &str {
        "e2e_runs"
    }

    async fn create_thread(&self) -> Result<String, ProviderError> {
        Ok("thread_e2e".into())
    }

    async fn add_user_message(&self, _thread_id: &str, content: &str) -> Result<(), ProviderError> {
        self.posted.lock().unwrap().push(content.to_string());
        Ok(())
    }

    async fn create_run(&self, _thread_id: &str, _request: &RunRequest) -> Result<RunHandle, ProviderError> {
        Ok(RunHandle {
            id: "run_e2e".into(),
            status: self.next_status(),
        })
    }

    async fn retrieve_run(&self, _thread_id: &str, run_id: &str) -> Result<RunHandle, ProviderError> {
        Ok(RunHandle {
            id: run_id.into(),
            status: self.next_status(),
        })
    }

    async fn list_messages(&self, _thread_id: &str) -> Result<Vec<ThreadMessage>, ProviderError> {
        Ok(vec![ThreadMessage {
            role: "assistant".into(),
            content: self.content.clone(),
        }])
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn spring_midterm_eve() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()))
}

fn store() -> Arc<DatasetStore> {
    Arc::new(DatasetStore::embedded().unwrap())
}

fn turn(message: &str, character_id: &str) -> ConversationTurn {
    ConversationTurn {
        message: message.into(),
        character: store().get_character(character_id).unwrap().clone(),
    }
}

fn offline_pipeline(clock: Arc<FixedClock>) -> ChatPipeline {
    let orchestrator = Orchestrator::new(OrchestratorConfig::default(), None, clock.clone());
    ChatPipeline::new(store(), orchestrator, clock, "2024").unwrap()
}

fn online_pipeline(
    clock: Arc<FixedClock>,
    runs: Arc<ScriptedRuns>,
    completions: Arc<EchoProvider>,
    config: OrchestratorConfig,
) -> ChatPipeline {
    let remote = RemoteClients {
        completions,
        assistants: runs,
    };
    let orchestrator = Orchestrator::new(config, Some(remote), clock.clone());
    ChatPipeline::new(store(), orchestrator, clock, "2024").unwrap()
}

fn sage_config() -> OrchestratorConfig {
    OrchestratorConfig {
        assistants: AssistantDirectory::default().with("sage", "asst_sage"),
        ..Default::default()
    }
}

// ── E2E: Offline chat ────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_offline_exam_question_is_academic() {
    let outcome = offline_pipeline(spring_midterm_eve())
        .respond(&turn("이번 학기 시험 언제예요", "sage"))
        .await
        .unwrap();

    assert_eq!(outcome.envelope.response_type, ResponseType::Academic);
    assert_eq!(outcome.reply_source, ReplySource::Offline);
    assert!(!outcome.augmentation.is_empty());
    assert!(outcome.augmentation.contains("1학기 중간고사"));
    assert!(outcome.envelope.text.contains("학사일정에 대해 궁금하시군요!"));
}

#[tokio::test]
async fn e2e_offline_small_talk_is_text() {
    let outcome = offline_pipeline(spring_midterm_eve())
        .respond(&turn("오늘 기분이 좀 우울해", "calm"))
        .await
        .unwrap();

    assert_eq!(outcome.envelope.response_type, ResponseType::Text);
    assert!(outcome.augmentation.is_empty());
    assert!(outcome.envelope.text.starts_with("안녕하세요! 저는 캄입니다."));
}

// ── E2E: Assistant run protocol ──────────────────────────────────────────

#[tokio::test]
async fn e2e_assistant_run_polls_until_completed() {
    let clock = spring_midterm_eve();
    let runs = Arc::new(ScriptedRuns::new(
        vec![
            RunStatus::Queued,
            RunStatus::Queued,
            RunStatus::InProgress,
            RunStatus::Completed,
        ],
        "중간고사는 4월 22일부터예요. 화이팅!",
    ));
    let completions = Arc::new(EchoProvider::new("unused"));
    let pipeline = online_pipeline(clock.clone(), runs.clone(), completions.clone(), sage_config());

    let outcome = pipeline.respond(&turn("중간고사 시험 언제예요", "sage")).await.unwrap();

    assert_eq!(outcome.reply_source, ReplySource::Assistant);
    assert_eq!(outcome.envelope.text, "중간고사는 4월 22일부터예요. 화이팅!");
    assert_eq!(outcome.envelope.response_type, ResponseType::Academic);
    // create → Queued, first retrieve → Queued, then two polls
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(1); 2]);
    assert_eq!(completions.calls(), 0);

    let posted = runs.posted.lock().unwrap().clone();
    assert!(posted[0].contains("참고 정보:"));
}

#[tokio::test]
async fn e2e_failed_run_degrades_gracefully() {
    let runs = Arc::new(ScriptedRuns::new(vec![RunStatus::Queued, RunStatus::Failed], "unused"));
    let completions = Arc::new(EchoProvider::new("unused"));
    let pipeline = online_pipeline(spring_midterm_eve(), runs, completions.clone(), sage_config());

    let outcome = pipeline.respond(&turn("기말 시험 범위 알려줘", "sage")).await.unwrap();

    assert_eq!(outcome.reply_source, ReplySource::Degraded);
    assert_eq!(
        outcome.envelope.text,
        "안녕하세요! 저는 세이지입니다. 😊\n\nAPI 연결에 문제가 있어 기본 응답을 드리고 있어요."
    );
    assert_eq!(outcome.envelope.response_type, ResponseType::Academic);
    assert_eq!(completions.calls(), 0);
}

#[tokio::test]
async fn e2e_stuck_run_times_out_after_poll_budget() {
    let clock = spring_midterm_eve();
    let runs = Arc::new(ScriptedRuns::new(vec![RunStatus::InProgress], "unused"));
    let config = OrchestratorConfig {
        poll: PollPolicy {
            interval: Duration::from_millis(250),
            max_attempts: 3,
        },
        ..sage_config()
    };
    let pipeline = online_pipeline(clock.clone(), runs, Arc::new(EchoProvider::new("unused")), config);

    let outcome = pipeline.respond(&turn("시험 언제예요", "sage")).await.unwrap();

    assert_eq!(outcome.reply_source, ReplySource::Degraded);
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(250); 3]);
}

#[tokio::test]
async fn e2e_timed_out_run_can_fall_back_to_completion() {
    let runs = Arc::new(ScriptedRuns::new(vec![RunStatus::InProgress], "unused"));
    let completions = Arc::new(EchoProvider::new("도서관은 중앙광장 옆이에요."));
    let config = OrchestratorConfig {
        poll: PollPolicy {
            interval: Duration::from_millis(10),
            max_attempts: 1,
        },
        fallback_to_completion: true,
        ..sage_config()
    };
    let pipeline = online_pipeline(spring_midterm_eve(), runs, completions.clone(), config);

    let outcome = pipeline.respond(&turn("도서관 어디예요", "sage")).await.unwrap();

    assert_eq!(outcome.reply_source, ReplySource::Completion);
    assert_eq!(outcome.envelope.text, "도서관은 중앙광장 옆이에요.");
    assert_eq!(completions.calls(), 1);
}

#[tokio::test]
async fn e2e_unmapped_character_uses_completion() {
    let runs = Arc::new(ScriptedRuns::new(vec![RunStatus::Completed], "unused"));
    let completions = Arc::new(EchoProvider::new("같이 힘내봐요!"));
    let pipeline = online_pipeline(spring_midterm_eve(), runs.clone(), completions.clone(), sage_config());

    let outcome = pipeline.respond(&turn("요즘 너무 바빠요", "buddy")).await.unwrap();

    assert_eq!(outcome.reply_source, ReplySource::Completion);
    assert_eq!(outcome.envelope.text, "같이 힘내봐요!");
    assert!(runs.posted.lock().unwrap().is_empty());
}

// ── E2E: Gateway API (router only, no server) ───────────────────────────

mod gateway {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn router_for(pipeline: ChatPipeline) -> axum::Router {
        let state = Arc::new(sunbae_gateway::GatewayState {
            pipeline: Arc::new(pipeline),
        });
        sunbae_gateway::build_router(state, &["http://localhost:3000".to_string()])
    }

    fn app() -> axum::Router {
        router_for(offline_pipeline(spring_midterm_eve()))
    }

    async fn post(uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        post_to(app(), uri, body).await
    }

    async fn post_to(app: axum::Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn e2e_gateway_health() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn e2e_gateway_chat_round_trip() {
        let character = serde_json::to_value(store().get_character("spark").unwrap()).unwrap();
        let (status, json) = post(
            "/chat",
            serde_json::json!({ "message": "전공 프로그래밍 책 추천해줘", "character": character }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["type"], "library");
        assert_eq!(json["character"], "스파크");
        assert!(json["message"].as_str().unwrap().contains("📚 관련 도서:"));
    }

    fn sage_chat(message: &str) -> serde_json::Value {
        let character = serde_json::to_value(store().get_character("sage").unwrap()).unwrap();
        serde_json::json!({ "message": message, "character": character })
    }

    #[tokio::test]
    async fn e2e_gateway_non_text_reply_is_apology_with_200() {
        let runs = Arc::new(ScriptedRuns::with_content(
            vec![RunStatus::Completed],
            vec![MessagePart::Other("image_file".into())],
        ));
        let pipeline = online_pipeline(
            spring_midterm_eve(),
            runs,
            Arc::new(EchoProvider::new("unused")),
            sage_config(),
        );

        let (status, json) = post_to(router_for(pipeline), "/chat", sage_chat("시험 언제예요")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], sunbae_agent::orchestrator::APOLOGY);
        assert_eq!(json["type"], "academic");
        assert_eq!(json["character"], "세이지");
    }

    #[tokio::test]
    async fn e2e_gateway_failed_run_is_degraded_with_200() {
        let runs = Arc::new(ScriptedRuns::new(vec![RunStatus::Queued, RunStatus::Failed], "unused"));
        let pipeline = online_pipeline(
            spring_midterm_eve(),
            runs,
            Arc::new(EchoProvider::new("unused")),
            sage_config(),
        );

        let (status, json) = post_to(router_for(pipeline), "/chat", sage_chat("안녕하세요")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["message"],
            "안녕하세요! 저는 세이지입니다. 😊\n\nAPI 연결에 문제가 있어 기본 응답을 드리고 있어요."
        );
        assert_eq!(json["type"], "text");
    }

    #[tokio::test]
    async fn e2e_gateway_ranked_library_search() {
        let (status, json) = post("/library", serde_json::json!({ "query": "프로그래밍" })).await;
        assert_eq!(status, StatusCode::OK);

        let books = json["books"].as_array().unwrap();
        assert!(!books.is_empty());
        let scores: Vec<u64> = books
            .iter()
            .map(|b| b["relevanceScore"].as_u64().unwrap())
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        let rec = &json["recommendations"];
        assert!(rec.is_null() || !rec["description"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn e2e_gateway_rejects_blank_query() {
        let (status, json) = post("/library", serde_json::json!({ "query": "   " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }
}

// ── E2E: Configuration & datasets ────────────────────────────────────────

#[tokio::test]
async fn e2e_config_defaults_roundtrip() {
    let config = sunbae_config::AppConfig::default();
    assert!(config.validate().is_ok());
    assert!(!config.has_api_key());

    let toml_str = toml::to_string_pretty(&config).expect("Config should serialize");
    let reparsed: sunbae_config::AppConfig = toml::from_str(&toml_str).expect("Config should parse back");
    assert_eq!(reparsed.gateway.port, config.gateway.port);
    assert_eq!(reparsed.default_year, config.default_year);
}

#[tokio::test]
async fn e2e_pipeline_from_config_with_dataset_override() {
    let dir = tempfile::tempdir().unwrap();
    let calendar_path = dir.path().join("calendar.json");
    std::fs::write(
        &calendar_path,
        serde_json::json!({
            "2030": {
                "semester1": { "events": [{
                    "id": "2030_exam",
                    "title": "미래 중간고사",
                    "startDate": "2030-04-20",
                    "endDate": "2030-04-24",
                    "type": "exam",
                    "description": "2030학년도 시험"
                }]}
            },
            "holidays": []
        })
        .to_string(),
    )
    .unwrap();

    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "default_year = \"2030\"\n\n[datasets]\ncalendar_path = {:?}\n",
            calendar_path.display().to_string()
        ),
    )
    .unwrap();

    let config = sunbae_config::AppConfig::load_from(&config_path).unwrap();
    let store = Arc::new(DatasetStore::from_config(&config.datasets).unwrap());
    let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2030, 4, 1).unwrap()));
    let pipeline = ChatPipeline::from_config(&config, store, clock).unwrap();

    let outcome = pipeline.respond(&turn("시험 언제예요", "sage")).await.unwrap();
    assert!(outcome.augmentation.contains("미래 중간고사"));
}
