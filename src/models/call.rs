use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Classification, IncidentReport, StandardResponse};

/// Reply spoken when no analysis produced one
pub const GENERIC_FALLBACK_REPLY: &str = "I understand your situation. Can you please provide more details about your location and what's happening?";

/// Inbound call: an identifier plus the transcript (full or reconstructed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEnvelope {
    pub call_id: String,
    pub transcript: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatus {
    Complete,
    Error,
}

/// Output of whichever analysis stage the route selected
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Deep(IncidentReport),
    Standard(StandardResponse),
}

/// Uniform result envelope, one per `process_call` invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallResult {
    pub call_id: String,
    pub status: CallStatus,
    pub classification: Option<Classification>,
    pub incident_report: Option<IncidentReport>,
    pub standard_response: Option<StandardResponse>,
    pub route_taken: String,
    pub total_time_ms: u64,
    pub errors: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl CallResult {
    /// Assemble a result. Status is `Error` exactly when `errors` is non-empty.
    pub fn new(
        call_id: impl Into<String>,
        classification: Option<Classification>,
        analysis: Option<Analysis>,
        route_taken: String,
        total_time_ms: u64,
        errors: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let (incident_report, standard_response) = match analysis {
            Some(Analysis::Deep(report)) => (Some(report), None),
            Some(Analysis::Standard(response)) => (None, Some(response)),
            None => (None, None),
        };
        let status = if errors.is_empty() {
            CallStatus::Complete
        } else {
            CallStatus::Error
        };

        Self {
            call_id: call_id.into(),
            status,
            classification,
            incident_report,
            standard_response,
            route_taken,
            total_time_ms,
            errors,
            timestamp,
        }
    }

    /// The single line to speak back to the caller for this turn
    pub fn dispatcher_reply(&self) -> &str {
        let deep = self
            .incident_report
            .as_ref()
            .map(|r| r.dispatcher_reply.trim())
            .filter(|r| !r.is_empty());
        let standard = self
            .standard_response
            .as_ref()
            .map(|r| r.dispatcher_reply.trim())
            .filter(|r| !r.is_empty());

        deep.or(standard).unwrap_or(GENERIC_FALLBACK_REPLY)
    }

    pub fn is_error(&self) -> bool {
        self.status == CallStatus::Error
    }
}
