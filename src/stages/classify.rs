use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::TriageError;
use crate::llm::lenient;
use crate::llm::{
    build_classification_prompt, complete_within, parse_structured, CompletionParams,
    InferenceBackend, CLASSIFIER_SYSTEM_PROMPT,
};
use crate::models::{Classification, Route, Severity};

/// Configuration for the classifier stage
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub params: CompletionParams,
    /// Upper bound for the inference call
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            params: CompletionParams::CLASSIFICATION,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Severity classifier. Always yields a classification, so the pipeline
/// always has a route.
pub struct Classifier {
    backend: Arc<dyn InferenceBackend>,
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(backend: Arc<dyn InferenceBackend>, config: ClassifierConfig) -> Self {
        Self { backend, config }
    }

    /// Classify a full conversation transcript
    pub async fn classify(&self, transcript: &str) -> Classification {
        match self.try_classify(transcript).await {
            Ok(classification) => {
                info!(
                    "Classified as {} -> {} (confidence {:.2})",
                    classification.severity.label(),
                    classification.route.as_str(),
                    classification.confidence
                );
                classification
            }
            Err(e) => {
                warn!("Classification failed, using fallback: {}", e);
                Classification::fallback(format!("Error in classification: {}", e))
            }
        }
    }

    async fn try_classify(&self, transcript: &str) -> Result<Classification, TriageError> {
        let prompt = build_classification_prompt(transcript);
        let text = complete_within(
            self.backend.as_ref(),
            CLASSIFIER_SYSTEM_PROMPT,
            &prompt,
            self.config.params,
            self.config.timeout,
        )
        .await?;

        let payload: ClassificationPayload = parse_structured(&text)?;
        Ok(payload.into_classification())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClassificationPayload {
    severity: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    confidence: Option<f64>,
    reasoning: Option<String>,
    #[serde(alias = "route_to")]
    route: Option<String>,
}

impl ClassificationPayload {
    fn into_classification(self) -> Classification {
        let severity = self
            .severity
            .as_deref()
            .and_then(Severity::from_label)
            .unwrap_or(Severity::Standard);

        Classification {
            severity,
            confidence: self.confidence.unwrap_or(0.5).clamp(0.0, 1.0),
            reasoning: self
                .reasoning
                .unwrap_or_else(|| "No reasoning provided".to_string()),
            route: Route::from_label(self.route.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::{FailingBackend, ScriptedBackend};

    fn classifier(backend: Arc<dyn InferenceBackend>) -> Classifier {
        Classifier::new(backend, ClassifierConfig::default())
    }

    #[tokio::test]
    async fn test_classify_critical_call() {
        let backend = Arc::new(ScriptedBackend::texts(&[r#"```json
{"severity": "CRITICAL_EMERGENCY", "confidence": 0.97, "reasoning": "Active shooter", "route_to": "TRIAGE_AGENT"}
```"#]));
        let result = classifier(backend.clone())
            .classify("Caller: he's shooting people")
            .await;

        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.route, Route::DeepAnalysis);
        assert_eq!(result.confidence, 0.97);

        let calls = backend.calls();
        assert_eq!(calls[0].params, CompletionParams::CLASSIFICATION);
        assert!(calls[0].user.contains("he's shooting people"));
    }

    #[tokio::test]
    async fn test_missing_route_defaults_to_standard() {
        let backend = Arc::new(ScriptedBackend::texts(&[
            r#"{"severity": "CRITICAL", "confidence": 1.7}"#,
        ]));
        let result = classifier(backend).classify("Caller: fire").await;

        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.route, Route::StandardAnalysis);
        assert_eq!(result.confidence, 1.0);
    }

    #[tokio::test]
    async fn test_prose_response_falls_back() {
        let backend = Arc::new(ScriptedBackend::texts(&["I think this is a noise complaint."]));
        let result = classifier(backend).classify("Caller: loud music").await;

        assert_eq!(result, Classification {
            reasoning: result.reasoning.clone(),
            ..Classification::fallback("")
        });
        assert!(result.reasoning.contains("malformed response"));
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back() {
        let result = classifier(Arc::new(FailingBackend)).classify("Caller: help").await;

        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.severity, Severity::Standard);
        assert_eq!(result.route, Route::StandardAnalysis);
    }

    #[tokio::test]
    async fn test_confidence_given_as_text() {
        let backend = Arc::new(ScriptedBackend::texts(&[
            r#"{"severity": "STANDARD", "confidence": "0.7", "route": "STANDARD_ANALYSIS"}"#,
        ]));
        let result = classifier(backend).classify("Caller: minor crash").await;

        assert_eq!(result.severity, Severity::Standard);
        assert_eq!(result.confidence, 0.7);
    }
}
