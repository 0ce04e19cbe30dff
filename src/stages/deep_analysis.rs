use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::TriageError;
use crate::llm::lenient;
use crate::llm::{
    audit_reply, build_emotion_prompt, build_incident_prompt, complete_within, parse_structured,
    CompletionParams, InferenceBackend, DISPATCHER_SYSTEM_PROMPT, EMOTION_SYSTEM_PROMPT,
};
use crate::location::{locate, merge_reported_location, Geocoder};
use crate::models::{
    EmotionAssessment, IncidentReport, Intensity, LocationInfo, PrimaryEmotion, Priority,
    ResourceRequirements, Severity, ThreatDetails, ThreatLevel,
};

const DEFAULT_INCIDENT_REPLY: &str = "Help is on the way to your location. I'm staying on the line with you. Can you describe what you see around you right now?";

/// Configuration for the deep-analysis stage
#[derive(Debug, Clone)]
pub struct DeepAnalysisConfig {
    pub emotion_params: CompletionParams,
    pub incident_params: CompletionParams,
    /// Upper bound for each of the two inference calls
    pub timeout: Duration,
}

impl Default for DeepAnalysisConfig {
    fn default() -> Self {
        Self {
            emotion_params: CompletionParams::EMOTION,
            incident_params: CompletionParams::INCIDENT_ANALYSIS,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Incident analysis for high-severity calls.
///
/// Runs two sequential inference calls:
/// 1. emotion assessment of the caller
/// 2. the main incident analysis, given the emotion and scanned location
///
/// The two calls fail independently; an emotion failure never blocks the
/// main analysis.
pub struct DeepAnalyzer {
    backend: Arc<dyn InferenceBackend>,
    geocoder: Arc<dyn Geocoder>,
    config: DeepAnalysisConfig,
}

impl DeepAnalyzer {
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        geocoder: Arc<dyn Geocoder>,
        config: DeepAnalysisConfig,
    ) -> Self {
        Self {
            backend,
            geocoder,
            config,
        }
    }

    pub async fn analyze(&self, transcript: &str, severity: Severity) -> IncidentReport {
        let emotion = self.assess_emotion(transcript).await;
        let location = locate(self.geocoder.as_ref(), transcript).await;

        let report = match self
            .analyze_incident(transcript, severity, &emotion, location.clone())
            .await
        {
            Ok(report) => {
                info!(
                    "Incident: {} (threat {:?}, priority {:?}, confidence {:.2})",
                    report.incident_type,
                    report.threat_details.threat_level,
                    report.resources.priority,
                    report.confidence
                );
                report
            }
            Err(e) => {
                warn!("Incident analysis failed, using fallback: {}", e);
                IncidentReport::fallback(location.unwrap_or_default(), emotion, &e.to_string())
            }
        };

        audit_reply("Deep analysis", &report.dispatcher_reply);
        report
    }

    /// Emotion sub-call; any failure yields the neutral fallback assessment
    pub async fn assess_emotion(&self, transcript: &str) -> EmotionAssessment {
        match self.try_assess_emotion(transcript).await {
            Ok(emotion) => emotion,
            Err(e) => {
                warn!("Emotion analysis failed, using fallback: {}", e);
                EmotionAssessment::fallback()
            }
        }
    }

    async fn try_assess_emotion(&self, transcript: &str) -> Result<EmotionAssessment, TriageError> {
        let prompt = build_emotion_prompt(transcript);
        let text = complete_within(
            self.backend.as_ref(),
            EMOTION_SYSTEM_PROMPT,
            &prompt,
            self.config.emotion_params,
            self.config.timeout,
        )
        .await?;

        let payload: EmotionPayload = parse_structured(&text)?;
        Ok(payload.into_assessment())
    }

    async fn analyze_incident(
        &self,
        transcript: &str,
        severity: Severity,
        emotion: &EmotionAssessment,
        location: Option<LocationInfo>,
    ) -> Result<IncidentReport, TriageError> {
        let scanned = location.clone().unwrap_or_default();
        let prompt = build_incident_prompt(transcript, emotion, severity, &scanned);
        let text = complete_within(
            self.backend.as_ref(),
            DISPATCHER_SYSTEM_PROMPT,
            &prompt,
            self.config.incident_params,
            self.config.timeout,
        )
        .await?;

        let payload: IncidentPayload = parse_structured(&text)?;
        Ok(payload.into_report(location, emotion.clone()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EmotionPayload {
    primary_emotion: Option<String>,
    intensity: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    indicators: Vec<String>,
    recommended_approach: Option<String>,
}

impl EmotionPayload {
    fn into_assessment(self) -> EmotionAssessment {
        let fallback = EmotionAssessment::fallback();
        EmotionAssessment {
            primary_emotion: self
                .primary_emotion
                .as_deref()
                .and_then(PrimaryEmotion::from_label)
                .unwrap_or(fallback.primary_emotion),
            intensity: self
                .intensity
                .as_deref()
                .and_then(Intensity::from_label)
                .unwrap_or(fallback.intensity),
            indicators: self.indicators,
            recommended_approach: self
                .recommended_approach
                .unwrap_or(fallback.recommended_approach),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IncidentPayload {
    incident_type: Option<String>,
    executive_summary: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    key_facts: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    recommended_actions: Vec<String>,
    #[serde(alias = "dispatcher_message")]
    dispatcher_reply: Option<String>,
    #[serde(alias = "incident_details")]
    threat_details: ThreatPayload,
    resources: ResourcesPayload,
    #[serde(deserialize_with = "lenient::opt_string")]
    address: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    postcode: Option<String>,
    #[serde(alias = "confidence_score", deserialize_with = "lenient::opt_f64")]
    confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThreatPayload {
    threat_level: Option<String>,
    #[serde(deserialize_with = "lenient::bool_or_default")]
    injuries_reported: bool,
    #[serde(deserialize_with = "lenient::opt_u32")]
    injury_count: Option<u32>,
    #[serde(deserialize_with = "lenient::bool_or_default")]
    weapons_involved: bool,
    #[serde(deserialize_with = "lenient::bool_or_default")]
    bystanders_at_risk: bool,
    suspect_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResourcesPayload {
    #[serde(deserialize_with = "lenient::opt_bool")]
    police: Option<bool>,
    #[serde(deserialize_with = "lenient::bool_or_default")]
    ambulance: bool,
    #[serde(deserialize_with = "lenient::bool_or_default")]
    fire: bool,
    #[serde(deserialize_with = "lenient::bool_or_default")]
    swat: bool,
    #[serde(deserialize_with = "lenient::bool_or_default")]
    negotiator: bool,
    #[serde(deserialize_with = "lenient::u32_or_default")]
    additional_units: u32,
    priority: Option<String>,
}

impl IncidentPayload {
    fn into_report(self, scanned: Option<LocationInfo>, emotion: EmotionAssessment) -> IncidentReport {
        let location =
            merge_reported_location(scanned, self.address.as_deref(), self.postcode.as_deref())
                .unwrap_or_default();

        let threat = self.threat_details;
        let resources = self.resources;

        IncidentReport {
            incident_type: self
                .incident_type
                .unwrap_or_else(|| "OTHER_CRITICAL".to_string()),
            location,
            threat_details: ThreatDetails {
                threat_level: threat
                    .threat_level
                    .as_deref()
                    .map(ThreatLevel::from_label)
                    .unwrap_or(ThreatLevel::Unknown),
                injuries_reported: threat.injuries_reported,
                injury_count: threat.injury_count,
                weapons_involved: threat.weapons_involved,
                bystanders_at_risk: threat.bystanders_at_risk,
                suspect_description: threat.suspect_description,
            },
            emotion,
            resources: ResourceRequirements {
                police: resources.police.unwrap_or(true),
                ambulance: resources.ambulance,
                fire: resources.fire,
                swat: resources.swat,
                negotiator: resources.negotiator,
                additional_units: resources.additional_units,
                priority: resources
                    .priority
                    .as_deref()
                    .and_then(Priority::from_label)
                    .unwrap_or(Priority::Immediate),
            },
            executive_summary: self
                .executive_summary
                .unwrap_or_else(|| "Critical incident".to_string()),
            recommended_actions: self.recommended_actions,
            key_facts: self.key_facts,
            confidence: self.confidence.unwrap_or(0.8).clamp(0.0, 1.0),
            dispatcher_reply: self
                .dispatcher_reply
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_INCIDENT_REPLY.to_string()),
        }
    }
}
