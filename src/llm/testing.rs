//! In-crate fakes for the inference backend, shared by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{CompletionParams, InferenceBackend};
use crate::error::TriageError;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
    pub params: CompletionParams,
}

/// Replays queued completions in order and records every request
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, TriageError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<Result<String, TriageError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn texts(responses: &[&str]) -> Self {
        Self::new(responses.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        params: CompletionParams,
    ) -> Result<String, TriageError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            user: user.to_string(),
            params,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TriageError::InferenceUnavailable("script exhausted".into())))
    }
}

/// Always fails as an unreachable backend would
pub struct FailingBackend;

#[async_trait]
impl InferenceBackend for FailingBackend {
    async fn complete(
        &self,
        _system: &str,
        _user: &str,
        _params: CompletionParams,
    ) -> Result<String, TriageError> {
        Err(TriageError::InferenceUnavailable("connection refused".into()))
    }
}

/// Sleeps before answering, for timeout tests
pub struct SlowBackend {
    delay: Duration,
}

impl SlowBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl InferenceBackend for SlowBackend {
    async fn complete(
        &self,
        _system: &str,
        _user: &str,
        _params: CompletionParams,
    ) -> Result<String, TriageError> {
        tokio::time::sleep(self.delay).await;
        Ok("{}".to_string())
    }
}

/// Panics on the given call number (0-based), answers from a script otherwise
pub struct PanickingBackend {
    inner: ScriptedBackend,
    panic_on: usize,
}

impl PanickingBackend {
    pub fn new(responses: &[&str], panic_on: usize) -> Self {
        Self {
            inner: ScriptedBackend::texts(responses),
            panic_on,
        }
    }
}

#[async_trait]
impl InferenceBackend for PanickingBackend {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        params: CompletionParams,
    ) -> Result<String, TriageError> {
        if self.inner.calls().len() == self.panic_on {
            panic!("backend exploded");
        }
        self.inner.complete(system, user, params).await
    }
}
