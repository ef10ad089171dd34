//! OpenAI Assistants backend (threads + runs, API v2).
//!
//! Each call maps to one REST request; polling and the reply ladder live in
//! the orchestrator, this client only speaks the protocol.

use async_trait::async_trait;
use serde::Deserialize;
use sunbae_core::assistant::*;
use sunbae_core::error::ProviderError;
use tracing::{debug, trace};

use crate::{check_status, http_client};

/// Header that opts into the Assistants API.
const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

pub struct OpenAiAssistants {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiAssistants {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: http_client(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER.0, BETA_HEADER.1)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        check_status(response).await
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER.0, BETA_HEADER.1)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        check_status(response).await
    }
}

async fn parse<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<T, ProviderError> {
    response
        .json()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("{what}: {e}")))
}

#[async_trait]
impl AssistantBackend for OpenAiAssistants {
    fn name(&self) -> &str {
        "openai-assistants"
    }

    async fn create_thread(&self) -> Result<String, ProviderError> {
        let response = self.post_json("threads", serde_json::json!({})).await?;
        let thread: ApiObject = parse(response, "thread").await?;
        debug!(thread_id = %thread.id, "Thread created");
        Ok(thread.id)
    }

    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<(), ProviderError> {
        let body = serde_json::json!({ "role": "user", "content": content });
        self.post_json(&format!("threads/{thread_id}/messages"), body)
            .await?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str, request: &RunRequest) -> Result<RunHandle, ProviderError> {
        let body = serde_json::json!({
            "assistant_id": request.assistant_id,
            "max_completion_tokens": request.max_completion_tokens,
            "temperature": request.temperature,
        });
        let response = self
            .post_json(&format!("threads/{thread_id}/runs"), body)
            .await?;
        let run: ApiRun = parse(response, "run").await?;
        debug!(thread_id, run_id = %run.id, status = %run.status, "Run created");
        Ok(run.into())
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<RunHandle, ProviderError> {
        let response = self
            .get(&format!("threads/{thread_id}/runs/{run_id}"))
            .await?;
        let run: ApiRun = parse(response, "run").await?;
        trace!(thread_id, run_id, status = %run.status, "Run status");
        Ok(run.into())
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, ProviderError> {
        let response = self
            .get(&format!("threads/{thread_id}/messages?order=desc"))
            .await?;
        let list: ApiMessageList = parse(response, "message list").await?;
        Ok(list.data.into_iter().map(ThreadMessage::from).collect())
    }
}

// --- Assistants API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiRun {
    id: String,
    status: RunStatus,
}

impl From<ApiRun> for RunHandle {
    fn from(run: ApiRun) -> Self {
        RunHandle {
            id: run.id,
            status: run.status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiMessageList {
    #[serde(default)]
    data: Vec<ApiThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiThreadMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: Vec<ApiContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ApiContentBlock {
    r#type: String,
    #[serde(default)]
    text: Option<ApiText>,
}

#[derive(Debug, Deserialize)]
struct ApiText {
    value: String,
}

impl From<ApiThreadMessage> for ThreadMessage {
    fn from(message: ApiThreadMessage) -> Self {
        let content = message
            .content
            .into_iter()
            .map(|block| match (block.r#type.as_str(), block.text) {
                ("text", Some(text)) => MessagePart::Text(text.value),
                _ => MessagePart::Other(block.r#type),
            })
            .collect();
        ThreadMessage {
            role: message.role,
            content,
        }
    }
}
