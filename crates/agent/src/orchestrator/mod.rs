//! Assistant Orchestrator.
//!
//! Chooses and drives one rung of the reply ladder for a chat turn:
//!
//! 1. **Assistant run**: thread → message → run → bounded polling → last message
//! 2. **One-shot completion**: when the persona has no assistant configured,
//!    or (opt-in) after a failed run
//! 3. **Degraded text**: any remote failure
//! 4. **Offline reply**: no remote client at all
//!
//! Remote failures never escape [`Orchestrator::reply`]; a turn always gets
//! text back.

pub mod offline;
pub mod run;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sunbae_config::AppConfig;
use sunbae_core::error::{OrchestrationError, ProviderError};
use sunbae_core::{AssistantBackend, Character, Clock, Message, Provider, ProviderRequest, RunRequest};
use sunbae_providers::RemoteClients;
use tracing::{debug, info, warn};

use crate::intent::Intent;
use crate::prompt;

pub use offline::APOLOGY;
pub use run::{PollPolicy, RunState, RunTracker};

/// Character id → remote assistant id. Absent means "use one-shot completion".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssistantDirectory {
    assistants: BTreeMap<String, String>,
}

impl AssistantDirectory {
    pub fn new(assistants: BTreeMap<String, String>) -> Self {
        Self { assistants }
    }

    pub fn with(mut self, character_id: impl Into<String>, assistant_id: impl Into<String>) -> Self {
        self.assistants.insert(character_id.into(), assistant_id.into());
        self
    }

    pub fn get(&self, character_id: &str) -> Option<&str> {
        self.assistants.get(character_id).map(String::as_str)
    }

    /// Drop mappings whose character id fails `known`, returning the dropped ids.
    pub fn retain_known(&mut self, known: impl Fn(&str) -> bool) -> Vec<String> {
        let unknown: Vec<String> = self.assistants.keys().filter(|id| !known(id)).cloned().collect();
        for id in &unknown {
            self.assistants.remove(id);
        }
        unknown
    }
}

/// Generation budget for assistant runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    pub max_completion_tokens: u32,
    pub temperature: f32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_completion_tokens: 600,
            temperature: 0.7,
        }
    }
}

/// Model and budget for one-shot completions.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".into(),
            max_tokens: 600,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub assistants: AssistantDirectory,
    pub run: RunSettings,
    pub completion: CompletionSettings,
    pub poll: PollPolicy,
    /// Retry a failed run once through one-shot completion before degrading.
    pub fallback_to_completion: bool,
}

impl OrchestratorConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            assistants: AssistantDirectory::new(config.assistants.clone()),
            run: RunSettings {
                max_completion_tokens: config.assistant.max_completion_tokens,
                temperature: config.assistant.temperature,
            },
            completion: CompletionSettings {
                model: config.completion.model.clone(),
                max_tokens: config.completion.max_tokens,
                temperature: config.completion.temperature,
            },
            poll: PollPolicy {
                interval: Duration::from_millis(config.assistant.poll_interval_ms),
                max_attempts: config.assistant.max_poll_attempts,
            },
            fallback_to_completion: config.assistant.fallback_to_completion,
        }
    }
}

/// Which ladder rung produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Assistant,
    Completion,
    Offline,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

impl Reply {
    fn new(text: impl Into<String>, source: ReplySource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// Everything the orchestrator needs for one turn.
#[derive(Debug, Clone, Copy)]
pub struct ReplyRequest<'a> {
    pub character: &'a Character,
    pub message: &'a str,
    pub system_prompt: &'a str,
    pub augmentation: &'a str,
    pub intent: &'a Intent,
}

pub struct Orchestrator {
    config: OrchestratorConfig,
    remote: Option<RemoteClients>,
    clock: Arc<dyn Clock>,
}

impl Orchestrator {
    /// `remote = None` builds an offline orchestrator.
    pub fn new(config: OrchestratorConfig, remote: Option<RemoteClients>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            remote,
            clock,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn is_online(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn reply(&self, request: &ReplyRequest<'_>) -> Reply {
        let character = request.character;

        let Some(remote) = &self.remote else {
            debug!(character = %character.id, "No remote client, replying offline");
            return Reply::new(
                offline::offline_reply(&character.name, request.intent, request.augmentation),
                ReplySource::Offline,
            );
        };

        let Some(assistant_id) = self.config.assistants.get(&character.id) else {
            return match self.complete_once(remote.completions.as_ref(), request).await {
                Ok(text) => Reply::new(text, ReplySource::Completion),
                Err(e) => {
                    warn!(character = %character.id, error = %e, "Completion failed");
                    Reply::new(offline::degraded(&character.name), ReplySource::Degraded)
                }
            };
        };

        let message = prompt::run_message(request.message, request.augmentation);
        match self
            .run_assistant(remote.assistants.as_ref(), assistant_id, &message)
            .await
        {
            Ok(text) => Reply::new(text, ReplySource::Assistant),
            Err(e) => {
                warn!(character = %character.id, assistant_id, error = %e, "Assistant run failed");
                if self.config.fallback_to_completion {
                    match self.complete_once(remote.completions.as_ref(), request).await {
                        Ok(text) => return Reply::new(text, ReplySource::Completion),
                        Err(e) => warn!(character = %character.id, error = %e, "Completion fallback failed"),
                    }
                }
                Reply::new(offline::degraded(&character.name), ReplySource::Degraded)
            }
        }
    }

    /// System prompt + raw message through the completion endpoint. Empty
    /// text becomes the apology.
    pub async fn complete_once(
        &self,
        provider: &dyn Provider,
        request: &ReplyRequest<'_>,
    ) -> Result<String, ProviderError> {
        let settings = &self.config.completion;
        let response = provider
            .complete(ProviderRequest {
                model: settings.model.clone(),
                messages: vec![
                    Message::system(request.system_prompt),
                    Message::user(request.message),
                ],
                temperature: settings.temperature,
                max_tokens: Some(settings.max_tokens),
            })
            .await?;

        if let Some(usage) = &response.usage {
            debug!(
                provider = provider.name(),
                model = %response.model,
                total_tokens = usage.total_tokens,
                "Completion received"
            );
        }

        let text = response.message.content;
        Ok(if text.trim().is_empty() {
            APOLOGY.to_string()
        } else {
            text
        })
    }

    /// Drive one assistant run to a terminal state and extract its answer.
    pub async fn run_assistant(
        &self,
        backend: &dyn AssistantBackend,
        assistant_id: &str,
        message: &str,
    ) -> Result<String, OrchestrationError> {
        let mut tracker = RunTracker::new();

        let thread_id = backend.create_thread().await?;
        backend.add_user_message(&thread_id, message).await?;

        let run = backend
            .create_run(
                &thread_id,
                &RunRequest {
                    assistant_id: assistant_id.to_string(),
                    max_completion_tokens: self.config.run.max_completion_tokens,
                    temperature: self.config.run.temperature,
                },
            )
            .await?;
        tracker.observe(run.status);

        let mut status = backend.retrieve_run(&thread_id, &run.id).await?.status;
        tracker.observe(status);

        let policy = self.config.poll;
        let mut attempts = 0;
        while status.is_pending() {
            if attempts >= policy.max_attempts {
                tracker.time_out();
                warn!(thread_id = %thread_id, run_id = %run.id, attempts, "Run polling budget exhausted");
                return Err(OrchestrationError::TimedOut { attempts });
            }
            self.clock.sleep(policy.interval).await;
            attempts += 1;
            status = backend.retrieve_run(&thread_id, &run.id).await?.status;
            debug!(run_id = %run.id, attempt = attempts, status = %status, "Polled run");
            tracker.observe(status);
        }

        if tracker.state() != RunState::Completed {
            return Err(OrchestrationError::RunFailed {
                status: status.to_string(),
            });
        }
        info!(run_id = %run.id, polls = attempts, "Run completed");

        let messages = backend.list_messages(&thread_id).await?;
        let text = messages
            .first()
            .and_then(|latest| latest.first_text())
            .map(str::to_string);
        Ok(text.unwrap_or_else(|| APOLOGY.to_string()))
    }
}
