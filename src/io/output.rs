use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{CallResult, CallStatus, Classification, IncidentReport, StandardResponse};

/// Dashboard snapshot of a call after its latest turn
#[derive(Debug, Clone, Serialize)]
pub struct CallSnapshot {
    pub call_id: String,
    /// Reconstructed transcript including the latest reply
    pub transcript: String,
    pub latest_message: Option<String>,
    pub status: CallStatus,
    pub classification: Option<Classification>,
    pub incident_report: Option<IncidentReport>,
    pub standard_response: Option<StandardResponse>,
    pub processing_time_ms: u64,
    pub route_taken: String,
    pub dispatcher_reply: String,
    pub errors: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl CallSnapshot {
    pub fn new(result: &CallResult, transcript: &str, latest_message: Option<&str>) -> Self {
        Self {
            call_id: result.call_id.clone(),
            transcript: transcript.to_string(),
            latest_message: latest_message.map(str::to_string),
            status: result.status,
            classification: result.classification.clone(),
            incident_report: result.incident_report.clone(),
            standard_response: result.standard_response.clone(),
            processing_time_ms: result.total_time_ms,
            route_taken: result.route_taken.clone(),
            dispatcher_reply: result.dispatcher_reply().to_string(),
            errors: result.errors.clone(),
            timestamp: result.timestamp,
        }
    }

    /// Write to a JSON file, replacing any previous snapshot
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Human-readable summary of one processed call
pub fn format_summary(result: &CallResult) -> String {
    let mut output = String::new();

    let title = format!("Call {}", result.call_id);
    output.push_str(&format!("{}\n{}\n", title, "=".repeat(title.len())));
    output.push_str(&format!("Status: {:?}\n", result.status));
    output.push_str(&format!("Route: {}\n", result.route_taken));
    output.push_str(&format!("Time: {}ms\n", result.total_time_ms));

    if let Some(classification) = &result.classification {
        output.push_str(&format!(
            "Severity: {} (confidence {:.2})\n",
            classification.severity.label(),
            classification.confidence
        ));
        output.push_str(&wrap_text(&classification.reasoning, 80));
        output.push('\n');
    }

    if let Some(report) = &result.incident_report {
        output.push_str(&format!("\nIncident: {}\n", report.incident_type));
        output.push_str(&format!(
            "Threat: {:?}, priority {:?}\n",
            report.threat_details.threat_level, report.resources.priority
        ));
        output.push_str(&format!("Units: {}\n", units(report).join(", ")));

        let location = &report.location;
        if let Some(place) = location.address.as_ref().or(location.landmark.as_ref()) {
            let verified = if location.verified { "verified" } else { "unverified" };
            output.push_str(&format!("Location: {} ({})\n", place, verified));
        }
        output.push_str(&format!(
            "Caller: {} ({})\n",
            report.emotion.primary_emotion.label(),
            report.emotion.intensity.label()
        ));
        if !report.executive_summary.is_empty() {
            output.push_str(&wrap_text(&report.executive_summary, 80));
            output.push('\n');
        }
        for action in &report.recommended_actions {
            output.push_str(&format!("  - {}\n", action));
        }
    }

    if let Some(response) = &result.standard_response {
        output.push_str(&format!("\nCall type: {}\n", response.call_type));
        let followup = if response.requires_followup { "yes" } else { "no" };
        output.push_str(&format!("Follow-up: {}\n", followup));
        output.push_str(&format!("Action: {}\n", response.recommended_action));
        output.push_str(&wrap_text(&response.summary, 80));
        output.push('\n');
    }

    if result.is_error() {
        for error in &result.errors {
            output.push_str(&format!("Error: {}\n", error));
        }
    }

    output.push_str(&format!("\nDispatcher: {}", result.dispatcher_reply()));
    output
}

fn units(report: &IncidentReport) -> Vec<&'static str> {
    let resources = &report.resources;
    [
        (resources.police, "police"),
        (resources.ambulance, "ambulance"),
        (resources.fire, "fire"),
        (resources.swat, "swat"),
        (resources.negotiator, "negotiator"),
    ]
    .into_iter()
    .filter_map(|(needed, name)| needed.then_some(name))
    .collect()
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        if line_len + word.len() + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word.len();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Analysis, EmotionAssessment, LocationInfo, GENERIC_FALLBACK_REPLY,
    };

    fn deep_result() -> CallResult {
        let mut report = IncidentReport::fallback(
            LocationInfo::unverified("the corner of Mill Lane"),
            EmotionAssessment::fallback(),
            "offline",
        );
        report.executive_summary = "Reported stabbing outside a pub".to_string();
        CallResult::new(
            "call_9",
            Some(Classification::fallback("routing test")),
            Some(Analysis::Deep(report)),
            "router -> deep_analysis".to_string(),
            840,
            vec![],
            Utc::now(),
        )
    }

    #[test]
    fn test_snapshot_written_as_json() {
        let result = deep_result();
        let snapshot = CallSnapshot::new(&result, "Caller: help\n\nDispatcher: ok?", Some("help"));
        let file = tempfile::NamedTempFile::new().unwrap();
        snapshot.write_json(file.path()).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(written["call_id"], "call_9");
        assert_eq!(written["status"], "COMPLETE");
        assert_eq!(written["latest_message"], "help");
        assert_eq!(written["processing_time_ms"], 840);
        assert_eq!(written["route_taken"], "router -> deep_analysis");
        assert!(written["standard_response"].is_null());
        assert!(written["incident_report"]["resources"]["police"].as_bool().unwrap());
    }

    #[test]
    fn test_summary_lists_units_and_reply() {
        let summary = format_summary(&deep_result());

        assert!(summary.starts_with("Call call_9\n"));
        assert!(summary.contains("Route: router -> deep_analysis"));
        assert!(summary.contains("Units: police, ambulance"));
        assert!(summary.contains("Location: the corner of Mill Lane (unverified)"));
        assert!(summary.ends_with(&format!("Dispatcher: {}", deep_result().dispatcher_reply())));
    }

    #[test]
    fn test_summary_of_faulted_call() {
        let result = CallResult::new(
            "call_x",
            None,
            None,
            "router -> standard_analysis".to_string(),
            3,
            vec!["standard analysis stage failed: boom".to_string()],
            Utc::now(),
        );
        let summary = format_summary(&result);

        assert!(summary.contains("Status: Error"));
        assert!(summary.contains("Error: standard analysis stage failed: boom"));
        assert!(summary.ends_with(GENERIC_FALLBACK_REPLY));
    }

    #[test]
    fn test_wrap_text() {
        let text = "This is a test of the text wrapping function that should wrap at 20 chars";
        let wrapped = wrap_text(text, 20);
        for line in wrapped.lines() {
            assert!(line.len() <= 25);
        }
    }
}
