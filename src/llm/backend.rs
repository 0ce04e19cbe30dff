use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::TriageError;

/// Sampling settings for one inference call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in the completion
    pub max_tokens: u32,
}

impl CompletionParams {
    /// Severity classification: deterministic-leaning, short output
    pub const CLASSIFICATION: Self = Self {
        temperature: 0.1,
        max_tokens: 300,
    };
    pub const EMOTION: Self = Self {
        temperature: 0.2,
        max_tokens: 500,
    };
    pub const INCIDENT_ANALYSIS: Self = Self {
        temperature: 0.3,
        max_tokens: 1500,
    };
    pub const STANDARD_ANALYSIS: Self = Self {
        temperature: 0.5,
        max_tokens: 800,
    };
}

/// Hosted model that turns a prompt into free text
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        params: CompletionParams,
    ) -> Result<String, TriageError>;
}

/// Run one completion with an upper bound on wall time.
/// A timeout is reported the same way as any other backend failure.
pub async fn complete_within(
    backend: &dyn InferenceBackend,
    system: &str,
    user: &str,
    params: CompletionParams,
    limit: Duration,
) -> Result<String, TriageError> {
    debug!(
        "Inference call: temperature={}, max_tokens={}, prompt {} chars",
        params.temperature,
        params.max_tokens,
        user.len()
    );

    match tokio::time::timeout(limit, backend.complete(system, user, params)).await {
        Ok(result) => result,
        Err(_) => Err(TriageError::InferenceUnavailable(format!(
            "timed out after {}ms",
            limit.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::{ScriptedBackend, SlowBackend};

    #[tokio::test]
    async fn test_complete_within_passes_through() {
        let backend = ScriptedBackend::new(vec![Ok("hello".to_string())]);
        let text = complete_within(
            &backend,
            "sys",
            "user",
            CompletionParams::CLASSIFICATION,
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        assert_eq!(text, "hello");
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].params, CompletionParams::CLASSIFICATION);
    }

    #[tokio::test]
    async fn test_complete_within_times_out() {
        let backend = SlowBackend::new(Duration::from_secs(5));
        let err = complete_within(
            &backend,
            "sys",
            "user",
            CompletionParams::EMOTION,
            Duration::from_millis(20),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, TriageError::InferenceUnavailable(_)));
    }
}
