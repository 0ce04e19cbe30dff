use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::task::{AbortHandle, JoinError};
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::error::TriageError;
use crate::llm::InferenceBackend;
use crate::location::Geocoder;
use crate::models::{Analysis, CallEnvelope, CallResult, Classification, Route, Severity};
use crate::stages::{Classifier, DeepAnalyzer, StandardAnalyzer};

/// Call-processing state machine: classify, branch on the route, analyze.
///
/// Stages are built once and shared; cloning a pipeline is cheap. Each stage
/// runs on its own task so a panicking stage becomes a recorded fault rather
/// than taking the caller down with it.
#[derive(Clone)]
pub struct Pipeline {
    classifier: Arc<Classifier>,
    deep: Arc<DeepAnalyzer>,
    standard: Arc<StandardAnalyzer>,
}

impl Pipeline {
    pub fn new(classifier: Classifier, deep: DeepAnalyzer, standard: StandardAnalyzer) -> Self {
        Self {
            classifier: Arc::new(classifier),
            deep: Arc::new(deep),
            standard: Arc::new(standard),
        }
    }

    /// Wire every stage to the same inference backend and geocoder
    pub fn with_collaborators(
        backend: Arc<dyn InferenceBackend>,
        geocoder: Arc<dyn Geocoder>,
        config: &PipelineConfig,
    ) -> Self {
        Self::new(
            Classifier::new(backend.clone(), config.classifier.clone()),
            DeepAnalyzer::new(backend.clone(), geocoder.clone(), config.deep.clone()),
            StandardAnalyzer::new(backend, geocoder, config.standard.clone()),
        )
    }

    /// Process one call transcript end to end. Never fails: stage failures
    /// degrade to fallbacks, and faults are reported on the result.
    pub async fn process_call(&self, call_id: &str, transcript: &str) -> CallResult {
        let started = Instant::now();
        let timestamp = Utc::now();
        let transcript: Arc<str> = Arc::from(transcript);
        let mut errors = Vec::new();

        info!("Processing call {} ({} chars)", call_id, transcript.len());

        let classifier = self.classifier.clone();
        let input = transcript.clone();
        let classification = match run_isolated(async move { classifier.classify(&input).await }).await {
            Ok(classification) => classification,
            Err(e) => {
                let fault = stage_fault("classifier", e);
                error!("Call {}: {}", call_id, fault);
                errors.push(fault.to_string());
                Classification::fallback("Error during routing - defaulting to standard")
            }
        };

        let route_taken = format!("router -> {}", classification.route.as_str());

        let analysis = match self
            .analyze(classification.route, classification.severity, transcript)
            .await
        {
            Ok(analysis) => Some(analysis),
            Err(fault) => {
                error!("Call {}: {}", call_id, fault);
                errors.push(fault.to_string());
                None
            }
        };

        let total_time_ms = started.elapsed().as_millis() as u64;
        let result = CallResult::new(
            call_id,
            Some(classification),
            analysis,
            route_taken,
            total_time_ms,
            errors,
            timestamp,
        );

        info!(
            "Call {} complete: status={:?}, route={}, {}ms",
            call_id, result.status, result.route_taken, result.total_time_ms
        );
        result
    }

    pub async fn process_envelope(&self, envelope: &CallEnvelope) -> CallResult {
        self.process_call(&envelope.call_id, &envelope.transcript).await
    }

    async fn analyze(
        &self,
        route: Route,
        severity: Severity,
        transcript: Arc<str>,
    ) -> Result<Analysis, TriageError> {
        match route {
            Route::DeepAnalysis => {
                let deep = self.deep.clone();
                run_isolated(async move { Analysis::Deep(deep.analyze(&transcript, severity).await) })
                    .await
                    .map_err(|e| stage_fault("deep analysis", e))
            }
            Route::StandardAnalysis => {
                let standard = self.standard.clone();
                run_isolated(async move {
                    Analysis::Standard(standard.analyze(&transcript, severity).await)
                })
                .await
                .map_err(|e| stage_fault("standard analysis", e))
            }
        }
    }
}

/// Aborts the wrapped task if the awaiting future is dropped first
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn run_isolated<F, T>(stage: F) -> Result<T, JoinError>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(stage);
    let _guard = AbortOnDrop(handle.abort_handle());
    handle.await
}

fn stage_fault(stage: &str, err: JoinError) -> TriageError {
    let detail = if err.is_panic() {
        panic_message(err.into_panic())
    } else {
        "task cancelled".to_string()
    };
    TriageError::PipelineFault(format!("{} stage failed: {}", stage, detail))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
