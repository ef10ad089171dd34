//! Remote service clients for sunbae.
//!
//! - [`OpenAiCompatProvider`] implements `sunbae_core::Provider` (one-shot
//!   chat completions)
//! - [`OpenAiAssistants`] implements `sunbae_core::AssistantBackend`
//!   (threads and runs)
//!
//! [`build_from_config`] wires both from the app config, or reports that no
//! remote client is available.

pub mod assistants;
pub mod openai_compat;

pub use assistants::OpenAiAssistants;
pub use openai_compat::OpenAiCompatProvider;

use std::sync::Arc;
use std::time::Duration;
use sunbae_core::error::ProviderError;
use sunbae_core::{AssistantBackend, Provider};
use tracing::warn;

/// Per-request ceiling for every remote call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The remote services the orchestrator talks to.
#[derive(Clone)]
pub struct RemoteClients {
    pub completions: Arc<dyn Provider>,
    pub assistants: Arc<dyn AssistantBackend>,
}

/// Build remote clients from configuration.
///
/// Returns `None` when no API key is configured; callers then run offline.
pub fn build_from_config(config: &sunbae_config::AppConfig) -> Option<RemoteClients> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())?;

    Some(RemoteClients {
        completions: Arc::new(OpenAiCompatProvider::new(
            "openai",
            &config.api_url,
            api_key,
        )),
        assistants: Arc::new(OpenAiAssistants::new(&config.api_url, api_key)),
    })
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Map non-success HTTP statuses to `ProviderError`.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();

    if status == 429 {
        return Err(ProviderError::RateLimited {
            retry_after_secs: 5,
        });
    }

    if status == 401 || status == 403 {
        return Err(ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ));
    }

    if !response.status().is_success() {
        let error_body = response.text().await.unwrap_or_default();
        warn!(status, body = %error_body, "Remote service returned error");
        return Err(ProviderError::ApiError {
            status_code: status,
            message: error_body,
        });
    }

    Ok(response)
}
