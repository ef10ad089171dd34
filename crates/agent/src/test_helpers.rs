//! Scripted remote services for orchestrator and pipeline tests.

use std::sync::Mutex;

use sunbae_core::error::ProviderError;
use sunbae_core::{
    AssistantBackend, Message, MessagePart, Provider, ProviderRequest, ProviderResponse, RunHandle,
    RunRequest, RunStatus, ThreadMessage,
};

/// A completion provider that replays queued results in order.
///
/// Panics if more calls are made than results provided.
pub struct ScriptedProvider {
    results: Mutex<Vec<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(results: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            results: Mutex::new(results),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let mut results = self.results.lock().unwrap();
        assert!(!results.is_empty(), "ScriptedProvider: no more results");
        let text = results.remove(0)?;
        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: None,
            model: "scripted-model".into(),
        })
    }
}

/// An assistant backend that walks through a list of run statuses.
///
/// `create_run` reports the first status and each `retrieve_run` the next
/// one; the last status repeats forever.
pub struct ScriptedAssistant {
    statuses: Mutex<Vec<RunStatus>>,
    messages: Vec<ThreadMessage>,
    failure: Option<ProviderError>,
    posted: Mutex<Vec<String>>,
    run_request: Mutex<Option<RunRequest>>,
    retrieves: Mutex<usize>,
}

impl ScriptedAssistant {
    pub fn new(statuses: Vec<RunStatus>, messages: Vec<ThreadMessage>) -> Self {
        Self {
            statuses: Mutex::new(statuses),
            messages,
            failure: None,
            posted: Mutex::new(Vec::new()),
            run_request: Mutex::new(None),
            retrieves: Mutex::new(0),
        }
    }

    /// Every call fails with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(vec![], vec![])
        }
    }

    pub fn posted_messages(&self) -> Vec<String> {
        self.posted.lock().unwrap().clone()
    }

    pub fn run_request(&self) -> Option<RunRequest> {
        self.run_request.lock().unwrap().clone()
    }

    pub fn retrieve_calls(&self) -> usize {
        *self.retrieves.lock().unwrap()
    }

    fn check(&self) -> Result<(), ProviderError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn next_status(&self) -> RunStatus {
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.remove(0)
        } else {
            statuses.first().copied().unwrap_or(RunStatus::Completed)
        }
    }
}

#[async_trait::async_trait]
impl AssistantBackend for ScriptedAssistant {
    fn name(&self) -> &str {
        "scripted-assistant"
    }

    async fn create_thread(&self) -> Result<String, ProviderError> {
        self.check()?;
        Ok("thread_test".into())
    }

    async fn add_user_message(&self, _thread_id: &str, content: &str) -> Result<(), ProviderError> {
        self.check()?;
        self.posted.lock().unwrap().push(content.to_string());
        Ok(())
    }

    async fn create_run(&self, _thread_id: &str, request: &RunRequest) -> Result<RunHandle, ProviderError> {
        self.check()?;
        *self.run_request.lock().unwrap() = Some(request.clone());
        Ok(RunHandle {
            id: "run_test".into(),
            status: self.next_status(),
        })
    }

    async fn retrieve_run(&self, _thread_id: &str, run_id: &str) -> Result<RunHandle, ProviderError> {
        self.check()?;
        *self.retrieves.lock().unwrap() += 1;
        Ok(RunHandle {
            id: run_id.to_string(),
            status: self.next_status(),
        })
    }

    async fn list_messages(&self, _thread_id: &str) -> Result<Vec<ThreadMessage>, ProviderError> {
        self.check()?;
        Ok(self.messages.clone())
    }
}

pub fn text_message(text: &str) -> ThreadMessage {
    ThreadMessage {
        role: "assistant".into(),
        content: vec![MessagePart::Text(text.into())],
    }
}
