//! Campus API handlers.
//!
//! Endpoints:
//!
//! - `POST /chat`        — one chat turn, always 200 unless the input is bad
//! - `GET  /academic`    — calendar listing (`type=current|upcoming`, `year`, `category`)
//! - `POST /academic`    — calendar text search
//! - `GET  /library`     — book listing (`type=search|category|recommendations|available`)
//! - `POST /library`     — ranked book search with filters
//! - `GET  /characters`  — selectable personas
//! - `GET  /debug`       — configuration diagnostics

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::Router;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use sunbae_core::{Book, Character, ConversationTurn, Event, ResolvedRecommendation, ResponseEnvelope};
use sunbae_knowledge::DatasetStore;
use sunbae_knowledge::calendar::{CalendarMode, CalendarQuery, search_events};
use sunbae_knowledge::library::{self, BookFilters, DEFAULT_LIST_LIMIT, ScoredBook};
use tracing::info;

use crate::SharedState;
use crate::error::ApiError;

/// Routes for the campus API, before state is attached.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/academic", get(academic_list_handler).post(academic_search_handler))
        .route("/library", get(library_list_handler).post(library_search_handler))
        .route("/characters", get(characters_handler))
        .route("/debug", get(debug_handler))
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Validation(format!("잘못된 요청 형식입니다: {e}")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ── Chat ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    character: Option<Character>,
}

async fn chat_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let request: ChatRequest = parse_body(&body)?;
    let (Some(message), Some(character)) = (non_empty(request.message), request.character) else {
        return Err(ApiError::Validation("메시지와 캐릭터 정보가 필요합니다.".into()));
    };

    info!(character = %character.id, message_len = message.len(), "Chat request");

    let pipeline = state.pipeline.clone();
    let turn = ConversationTurn { message, character };
    let outcome = tokio::spawn(async move { pipeline.respond(&turn).await })
        .await
        .map_err(|e| ApiError::Internal(format!("chat task aborted: {e}")))??;

    Ok(Json(outcome.envelope))
}

// ── Academic calendar ─────────────────────────────────────────────────────

#[derive(Deserialize)]
struct AcademicParams {
    #[serde(rename = "type")]
    kind: Option<String>,
    year: Option<String>,
    category: Option<String>,
}

#[derive(Serialize)]
struct EventsResponse {
    success: bool,
    events: Vec<Event>,
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,
}

async fn academic_list_handler(
    State(state): State<SharedState>,
    Query(params): Query<AcademicParams>,
) -> Result<Json<EventsResponse>, ApiError> {
    let pipeline = &state.pipeline;
    let year = non_empty(params.year).unwrap_or_else(|| pipeline.year().to_string());
    let mode = match params.kind.as_deref() {
        Some("current") => CalendarMode::Current,
        Some("upcoming") => CalendarMode::Upcoming,
        _ => CalendarMode::All,
    };
    let query = CalendarQuery::default()
        .with_category(non_empty(params.category))
        .with_mode(mode);

    let events = search_events(pipeline.store(), &year, &query, pipeline.clock().today())?;
    Ok(Json(EventsResponse {
        success: true,
        total: events.len(),
        events,
        year: Some(year),
        query: None,
    }))
}

#[derive(Deserialize)]
struct AcademicSearch {
    #[serde(default)]
    query: Option<String>,
}

async fn academic_search_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<EventsResponse>, ApiError> {
    let request: AcademicSearch = parse_body(&body)?;
    let Some(query) = non_empty(request.query) else {
        return Err(ApiError::Validation("검색 쿼리가 필요합니다.".into()));
    };

    let pipeline = &state.pipeline;
    let events = search_events(
        pipeline.store(),
        pipeline.year(),
        &CalendarQuery::text(query.clone()),
        pipeline.clock().today(),
    )?;
    Ok(Json(EventsResponse {
        success: true,
        total: events.len(),
        events,
        year: None,
        query: Some(query),
    }))
}

// ── Library ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LibraryParams {
    #[serde(rename = "type")]
    kind: Option<String>,
    query: Option<String>,
    category: Option<String>,
    available: Option<String>,
    limit: Option<String>,
}

#[derive(Serialize)]
struct BooksResponse<'a> {
    success: bool,
    books: Vec<&'a Book>,
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<&'a [String]>,
}

impl<'a> BooksResponse<'a> {
    fn page(books: Vec<&'a Book>, limit: usize) -> Self {
        Self {
            success: true,
            total: books.len(),
            books: books.into_iter().take(limit).collect(),
            query: None,
            category: None,
            categories: None,
        }
    }
}

#[derive(Serialize)]
struct RecommendationsResponse {
    success: bool,
    recommendations: Vec<ResolvedRecommendation>,
}

fn parse_limit(raw: Option<&str>) -> Result<usize, ApiError> {
    match raw {
        None => Ok(DEFAULT_LIST_LIMIT),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ApiError::Validation(format!("limit은 0 이상의 정수여야 합니다: {raw}"))),
    }
}

async fn library_list_handler(
    State(state): State<SharedState>,
    Query(params): Query<LibraryParams>,
) -> Result<Response, ApiError> {
    let store: &DatasetStore = state.pipeline.store();
    let limit = parse_limit(params.limit.as_deref())?;
    let available_only = params.available.as_deref() == Some("true");

    let response = match params.kind.as_deref() {
        Some("search") => {
            let query = non_empty(params.query);
            let books = match &query {
                Some(q) => library::search_books(store, q),
                None => store.all_books().iter().collect(),
            };
            BooksResponse {
                query,
                ..BooksResponse::page(books, limit)
            }
        }
        Some("category") => {
            let category = non_empty(params.category);
            let books = library::books_in_category(store, category.as_deref());
            BooksResponse {
                category,
                categories: Some(store.categories()),
                ..BooksResponse::page(books, limit)
            }
        }
        Some("recommendations") => {
            return Ok(Json(RecommendationsResponse {
                success: true,
                recommendations: library::all_recommendations(store),
            })
            .into_response());
        }
        Some("available") => BooksResponse::page(library::available_books(store), limit),
        _ => {
            let books = if available_only {
                library::available_books(store)
            } else {
                store.all_books().iter().collect()
            };
            BooksResponse {
                categories: Some(store.categories()),
                ..BooksResponse::page(books, limit)
            }
        }
    };

    Ok(Json(response).into_response())
}

#[derive(Deserialize)]
struct LibrarySearch {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    filters: Option<BookFilters>,
}

#[derive(Serialize)]
struct RankedBooksResponse {
    success: bool,
    books: Vec<ScoredBook>,
    total: usize,
    query: String,
    recommendations: Option<ResolvedRecommendation>,
}

async fn library_search_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<RankedBooksResponse>, ApiError> {
    let request: LibrarySearch = parse_body(&body)?;
    let Some(query) = non_empty(request.query) else {
        return Err(ApiError::Validation("검색 쿼리가 필요합니다.".into()));
    };

    let store: &DatasetStore = state.pipeline.store();
    let filters = request.filters.unwrap_or_default();
    let (books, total) = library::search_scored(store, &query, &filters);
    let recommendations = library::recommendation_for_results(store, &books);

    Ok(Json(RankedBooksResponse {
        success: true,
        books,
        total,
        query,
        recommendations,
    }))
}

// ── Personas & diagnostics ────────────────────────────────────────────────

#[derive(Serialize)]
struct CharactersResponse<'a> {
    success: bool,
    characters: &'a [Character],
}

async fn characters_handler(State(state): State<SharedState>) -> Response {
    Json(CharactersResponse {
        success: true,
        characters: state.pipeline.store().characters(),
    })
    .into_response()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DebugResponse {
    has_api_key: bool,
    assistants: BTreeMap<String, String>,
}

async fn debug_handler(State(state): State<SharedState>) -> Json<DebugResponse> {
    let pipeline = &state.pipeline;
    let directory = &pipeline.orchestrator().config().assistants;
    let assistants = pipeline
        .store()
        .characters()
        .iter()
        .map(|c| {
            let assistant = directory.get(&c.id).unwrap_or("NOT_SET");
            (c.id.clone(), assistant.to_string())
        })
        .collect();

    Json(DebugResponse {
        has_api_key: pipeline.orchestrator().is_online(),
        assistants,
    })
}
