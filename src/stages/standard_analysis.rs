use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::TriageError;
use crate::llm::lenient;
use crate::llm::{
    audit_reply, build_standard_prompt, complete_within, parse_structured, CompletionParams,
    InferenceBackend, DISPATCHER_SYSTEM_PROMPT,
};
use crate::location::{locate, merge_reported_location, Geocoder};
use crate::models::{normalize_call_type, LocationInfo, Severity, StandardResponse};

const DEFAULT_STANDARD_REPLY: &str = "I understand. Can you please provide more details?";

/// Configuration for the standard-analysis stage
#[derive(Debug, Clone)]
pub struct StandardAnalysisConfig {
    pub params: CompletionParams,
    pub timeout: Duration,
}

impl Default for StandardAnalysisConfig {
    fn default() -> Self {
        Self {
            params: CompletionParams::STANDARD_ANALYSIS,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Single-call analysis for standard and non-emergency calls
pub struct StandardAnalyzer {
    backend: Arc<dyn InferenceBackend>,
    geocoder: Arc<dyn Geocoder>,
    config: StandardAnalysisConfig,
}

impl StandardAnalyzer {
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        geocoder: Arc<dyn Geocoder>,
        config: StandardAnalysisConfig,
    ) -> Self {
        Self {
            backend,
            geocoder,
            config,
        }
    }

    pub async fn analyze(&self, transcript: &str, severity: Severity) -> StandardResponse {
        let location = locate(self.geocoder.as_ref(), transcript).await;

        match self.try_analyze(transcript, severity, location.clone()).await {
            Ok(response) => {
                info!(
                    "Standard call: {} (followup={})",
                    response.call_type, response.requires_followup
                );
                audit_reply("Standard analysis", &response.dispatcher_reply);
                response
            }
            Err(e) => {
                warn!("Standard analysis failed, using fallback: {}", e);
                StandardResponse::fallback(location, &e.to_string())
            }
        }
    }

    async fn try_analyze(
        &self,
        transcript: &str,
        severity: Severity,
        location: Option<LocationInfo>,
    ) -> Result<StandardResponse, TriageError> {
        let prompt = build_standard_prompt(transcript, severity, location.as_ref());
        let text = complete_within(
            self.backend.as_ref(),
            DISPATCHER_SYSTEM_PROMPT,
            &prompt,
            self.config.params,
            self.config.timeout,
        )
        .await?;

        let payload: StandardPayload = parse_structured(&text)?;
        Ok(payload.into_response(location))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StandardPayload {
    call_type: Option<String>,
    summary: Option<String>,
    recommended_action: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    additional_info: Vec<String>,
    #[serde(alias = "requires_follow_up", deserialize_with = "lenient::bool_or_default")]
    requires_followup: bool,
    #[serde(alias = "response")]
    dispatcher_reply: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    address: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    postcode: Option<String>,
    caller_emotion: Option<String>,
    emotion_intensity: Option<String>,
}

impl StandardPayload {
    fn into_response(self, scanned: Option<LocationInfo>) -> StandardResponse {
        StandardResponse {
            call_type: normalize_call_type(self.call_type.as_deref().unwrap_or_default())
                .to_string(),
            summary: self.summary.unwrap_or_else(|| "Call processed".to_string()),
            recommended_action: self
                .recommended_action
                .unwrap_or_else(|| "Standard response".to_string()),
            additional_info: self.additional_info,
            requires_followup: self.requires_followup,
            location: merge_reported_location(
                scanned,
                self.address.as_deref(),
                self.postcode.as_deref(),
            ),
            dispatcher_reply: self
                .dispatcher_reply
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STANDARD_REPLY.to_string()),
            caller_emotion: self.caller_emotion.unwrap_or_else(|| "CALM".to_string()),
            emotion_intensity: self.emotion_intensity.unwrap_or_else(|| "LOW".to_string()),
        }
    }
}
