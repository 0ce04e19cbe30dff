use serde::{Deserialize, Serialize};

use super::LocationInfo;

/// Call categories the standard analysis may report
pub const CALL_TYPES: &[&str] = &[
    "Medical - Non-Life-Threatening",
    "Property Crime",
    "Traffic Accident",
    "Public Service",
    "Other",
];

/// Canonical spelling of a call type, or "Other" when it is not one of
/// [`CALL_TYPES`]
pub fn normalize_call_type(raw: &str) -> &'static str {
    let wanted = raw.trim();
    CALL_TYPES
        .iter()
        .find(|t| t.eq_ignore_ascii_case(wanted))
        .copied()
        .unwrap_or("Other")
}

/// Lighter structured response for lower-severity calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardResponse {
    pub call_type: String,
    pub summary: String,
    pub recommended_action: String,
    pub additional_info: Vec<String>,
    pub requires_followup: bool,
    pub location: Option<LocationInfo>,
    /// Line spoken back to the caller; may be empty on fallback
    pub dispatcher_reply: String,
    pub caller_emotion: String,
    pub emotion_intensity: String,
}

impl StandardResponse {
    pub fn fallback(location: Option<LocationInfo>, reason: &str) -> Self {
        Self {
            call_type: "Other".to_string(),
            summary: format!("Error processing call: {}", reason),
            recommended_action: "Manual review required".to_string(),
            additional_info: vec![format!("System error: {}", reason)],
            requires_followup: true,
            location,
            dispatcher_reply: String::new(),
            caller_emotion: "CALM".to_string(),
            emotion_intensity: "LOW".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_call_type() {
        assert_eq!(normalize_call_type("property crime"), "Property Crime");
        assert_eq!(normalize_call_type(" Traffic Accident "), "Traffic Accident");
        assert_eq!(normalize_call_type("Noise Complaint"), "Other");
    }

    #[test]
    fn test_fallback_requires_followup() {
        let response = StandardResponse::fallback(None, "no JSON");
        assert_eq!(response.call_type, "Other");
        assert!(response.requires_followup);
        assert!(response.additional_info[0].contains("no JSON"));
    }
}
