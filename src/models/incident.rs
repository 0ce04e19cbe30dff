use serde::{Deserialize, Serialize};

use super::LocationInfo;

/// Primary emotional state of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimaryEmotion {
    Panic,
    Fear,
    Distress,
    Anger,
    Calm,
    Confused,
}

impl PrimaryEmotion {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "PANIC" | "PANICKED" => Some(Self::Panic),
            "FEAR" | "AFRAID" => Some(Self::Fear),
            "DISTRESS" | "DISTRESSED" => Some(Self::Distress),
            "ANGER" | "ANGRY" => Some(Self::Anger),
            "CALM" => Some(Self::Calm),
            "CONFUSED" | "CONFUSION" => Some(Self::Confused),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Panic => "PANIC",
            Self::Fear => "FEAR",
            Self::Distress => "DISTRESS",
            Self::Anger => "ANGER",
            Self::Calm => "CALM",
            Self::Confused => "CONFUSED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intensity {
    Low,
    Medium,
    High,
    Extreme,
}

impl Intensity {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            "EXTREME" => Some(Self::Extreme),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Extreme => "EXTREME",
        }
    }
}

/// Caller emotion assessment, produced before the main incident analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionAssessment {
    pub primary_emotion: PrimaryEmotion,
    pub intensity: Intensity,
    /// Phrases or patterns indicating this emotion
    pub indicators: Vec<String>,
    pub recommended_approach: String,
}

impl EmotionAssessment {
    pub fn fallback() -> Self {
        Self {
            primary_emotion: PrimaryEmotion::Calm,
            intensity: Intensity::Medium,
            indicators: vec![],
            recommended_approach: "Standard 911 protocol".to_string(),
        }
    }
}

/// Current threat status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatLevel {
    Active,
    Contained,
    Resolved,
    Unknown,
}

impl ThreatLevel {
    /// Unrecognised labels (models like to answer "URGENT") map to `Unknown`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Self::Active,
            "CONTAINED" => Self::Contained,
            "RESOLVED" => Self::Resolved,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Immediate,
    Urgent,
    Standard,
    Low,
}

impl Priority {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "IMMEDIATE" => Some(Self::Immediate),
            "URGENT" => Some(Self::Urgent),
            "STANDARD" => Some(Self::Standard),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatDetails {
    pub threat_level: ThreatLevel,
    pub injuries_reported: bool,
    pub injury_count: Option<u32>,
    pub weapons_involved: bool,
    pub bystanders_at_risk: bool,
    #[serde(default)]
    pub suspect_description: Option<String>,
}

/// Emergency resources to dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    pub police: bool,
    pub ambulance: bool,
    pub fire: bool,
    pub swat: bool,
    pub negotiator: bool,
    pub additional_units: u32,
    pub priority: Priority,
}

/// Structured report for a high-severity call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    pub incident_type: String,
    pub location: LocationInfo,
    pub threat_details: ThreatDetails,
    pub emotion: EmotionAssessment,
    pub resources: ResourceRequirements,
    pub executive_summary: String,
    pub recommended_actions: Vec<String>,
    pub key_facts: Vec<String>,
    /// Overall confidence in the analysis (0.0 - 1.0)
    pub confidence: f64,
    /// Line spoken back to the caller
    pub dispatcher_reply: String,
}

/// Reply used when the incident analysis could not be produced
pub const INCIDENT_FALLBACK_REPLY: &str = "I understand this is an emergency. All available units are being dispatched to your location. I'm staying on the line with you - can you tell me if you're in a safe spot right now?";

impl IncidentReport {
    /// Conservative report used when the main analysis call fails.
    /// Dispatches police and ambulance at immediate priority.
    pub fn fallback(location: LocationInfo, emotion: EmotionAssessment, reason: &str) -> Self {
        Self {
            incident_type: "OTHER_CRITICAL".to_string(),
            location,
            threat_details: ThreatDetails {
                threat_level: ThreatLevel::Unknown,
                injuries_reported: false,
                injury_count: None,
                weapons_involved: false,
                bystanders_at_risk: false,
                suspect_description: None,
            },
            emotion,
            resources: ResourceRequirements {
                police: true,
                ambulance: true,
                fire: false,
                swat: false,
                negotiator: false,
                additional_units: 2,
                priority: Priority::Immediate,
            },
            executive_summary: format!("Error in analysis: {}", reason),
            recommended_actions: vec!["Manual review required".to_string()],
            key_facts: vec!["Analysis error occurred".to_string()],
            confidence: 0.0,
            dispatcher_reply: INCIDENT_FALLBACK_REPLY.to_string(),
        }
    }
}
