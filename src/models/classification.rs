use serde::{Deserialize, Serialize};

/// Three-level urgency classification that drives routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Active threat to life, requires immediate tactical or medical response
    #[serde(alias = "CRITICAL_EMERGENCY")]
    Critical,
    /// Needs police, fire or medical help without an immediate threat to life
    #[serde(alias = "STANDARD_ASSISTANCE")]
    Standard,
    /// Information requests, noise complaints, found property
    NonEmergency,
}

impl Severity {
    /// Map a model-produced label, accepting both short and long names
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "CRITICAL" | "CRITICAL_EMERGENCY" => Some(Self::Critical),
            "STANDARD" | "STANDARD_ASSISTANCE" => Some(Self::Standard),
            "NON_EMERGENCY" => Some(Self::NonEmergency),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Standard => "STANDARD",
            Self::NonEmergency => "NON_EMERGENCY",
        }
    }
}

/// Which analysis stage handles the call after classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Route {
    #[serde(alias = "TRIAGE_AGENT")]
    DeepAnalysis,
    #[serde(alias = "INFO_AGENT")]
    StandardAnalysis,
}

impl Route {
    /// Map a model-produced route label. Anything unrecognised goes to
    /// standard analysis.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return Self::StandardAnalysis;
        };
        match label.trim().to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "DEEP_ANALYSIS" | "TRIAGE_AGENT" => Self::DeepAnalysis,
            _ => Self::StandardAnalysis,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeepAnalysis => "deep_analysis",
            Self::StandardAnalysis => "standard_analysis",
        }
    }
}

/// Output of the classifier stage; produced once per turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub severity: Severity,
    /// Confidence in the classification (0.0 - 1.0)
    pub confidence: f64,
    pub reasoning: String,
    pub route: Route,
}

impl Classification {
    /// Classification used when the classifier could not produce one
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            severity: Severity::Standard,
            confidence: 0.0,
            reasoning: reason.into(),
            route: Route::StandardAnalysis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_accepts_long_labels() {
        assert_eq!(Severity::from_label("CRITICAL_EMERGENCY"), Some(Severity::Critical));
        assert_eq!(Severity::from_label("standard assistance"), Some(Severity::Standard));
        assert_eq!(Severity::from_label("non-emergency"), Some(Severity::NonEmergency));
        assert_eq!(Severity::from_label("URGENT"), None);
    }

    #[test]
    fn test_route_defaults_to_standard_analysis() {
        assert_eq!(Route::from_label(Some("TRIAGE_AGENT")), Route::DeepAnalysis);
        assert_eq!(Route::from_label(Some("deep_analysis")), Route::DeepAnalysis);
        assert_eq!(Route::from_label(Some("SOMEWHERE_ELSE")), Route::StandardAnalysis);
        assert_eq!(Route::from_label(None), Route::StandardAnalysis);
    }

    #[test]
    fn test_deserialize_with_aliases() {
        let json = r#"{
            "severity": "CRITICAL_EMERGENCY",
            "confidence": 0.9,
            "reasoning": "shots fired",
            "route": "TRIAGE_AGENT"
        }"#;
        let c: Classification = serde_json::from_str(json).unwrap();
        assert_eq!(c.severity, Severity::Critical);
        assert_eq!(c.route, Route::DeepAnalysis);
    }

    #[test]
    fn test_fallback_has_zero_confidence() {
        let c = Classification::fallback("backend down");
        assert_eq!(c.confidence, 0.0);
        assert_eq!(c.route, Route::StandardAnalysis);
        assert_eq!(c.severity, Severity::Standard);
    }
}
