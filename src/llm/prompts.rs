use crate::models::{EmotionAssessment, LocationInfo, Severity, CALL_TYPES};

/// System prompt for severity classification
pub const CLASSIFIER_SYSTEM_PROMPT: &str = r#"You route emergency calls. Classify the severity of the call from the FULL conversation between dispatcher and caller, not only the last line.

SEVERITY LEVELS:
- CRITICAL: active violence, life-threatening medical emergencies, major fires with people trapped, any ongoing threat to life. Route: DEEP_ANALYSIS.
- STANDARD: emergencies needing police, fire or medical help without an immediate threat to life. Route: STANDARD_ANALYSIS.
- NON_EMERGENCY: information requests, noise complaints, found property. Route: STANDARD_ANALYSIS.

Decide using: is there an active threat to life, are weapons involved, is the situation ongoing, how many people are at risk.
Anything mentioned earlier in the call still applies later in the call."#;

/// System prompt for the caller emotion sub-call
pub const EMOTION_SYSTEM_PROMPT: &str = r#"You assess the emotional state of callers on emergency lines.

Report:
- primary_emotion: PANIC, FEAR, DISTRESS, ANGER, CALM or CONFUSED
- intensity: LOW, MEDIUM, HIGH or EXTREME
- indicators: the phrases or patterns that show it
- recommended_approach: how the dispatcher should speak to this caller"#;

/// System prompt shared by both analysis stages. The reply rules keep the
/// live voice conversation open.
pub const DISPATCHER_SYSTEM_PROMPT: &str = r#"You are an emergency dispatcher in a LIVE VOICE CONVERSATION. You see the full conversation so far.

RULES:
- Only ask for information you do not already have. Never repeat a question the caller already answered.
- Ask one focused question at a time. Keep the reply to 2-3 short sentences.
- Do not promise help is on the way until the location is confirmed.
- NEVER say goodbye, take care, or anything that ends the call. Stay on the line.
- ALWAYS end the reply with a question.
- If the caller seems confused by a question, rephrase it and give concrete examples instead of asking it again.
- Lines in [SYSTEM ALERT: ...] brackets are instructions for you, not caller speech."#;

/// Build the user prompt for severity classification
pub fn build_classification_prompt(transcript: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("Classify the severity of this emergency call.\n\n");
    prompt.push_str("Return ONLY JSON in exactly this format:\n");
    prompt.push_str("```json\n");
    prompt.push_str(
        r#"{
  "severity": "CRITICAL | STANDARD | NON_EMERGENCY",
  "confidence": 0.95,
  "reasoning": "one sentence based on the full conversation",
  "route": "DEEP_ANALYSIS | STANDARD_ANALYSIS"
}"#,
    );
    prompt.push_str("\n```\n\n");
    push_transcript(&mut prompt, transcript);

    prompt
}

/// Build the user prompt for the emotion sub-call
pub fn build_emotion_prompt(transcript: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("Assess the caller's emotional state.\n\n");
    prompt.push_str("Return ONLY JSON:\n");
    prompt.push_str("```json\n");
    prompt.push_str(
        r#"{
  "primary_emotion": "PANIC | FEAR | DISTRESS | ANGER | CALM | CONFUSED",
  "intensity": "LOW | MEDIUM | HIGH | EXTREME",
  "indicators": ["indicator"],
  "recommended_approach": "how to speak to the caller"
}"#,
    );
    prompt.push_str("\n```\n\n");
    push_transcript(&mut prompt, transcript);

    prompt
}

/// Build the user prompt for the critical incident analysis
pub fn build_incident_prompt(
    transcript: &str,
    emotion: &EmotionAssessment,
    severity: Severity,
    location: &LocationInfo,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "# Critical incident analysis\nSeverity: {}\n",
        severity.label()
    ));
    prompt.push_str(&format!(
        "Caller emotion: {} ({}), approach: {}\n",
        emotion.primary_emotion.label(),
        emotion.intensity.label(),
        emotion.recommended_approach
    ));
    push_location_hint(&mut prompt, location);
    prompt.push('\n');

    prompt.push_str("Return ONLY JSON in exactly this format:\n");
    prompt.push_str("```json\n");
    prompt.push_str(
        r#"{
  "incident_type": "ACTIVE_SHOOTER | MEDICAL_CRITICAL | FIRE_MAJOR | VIOLENT_CRIME | OTHER_CRITICAL",
  "executive_summary": "2-3 sentence tactical summary",
  "key_facts": ["fact"],
  "recommended_actions": ["action, most urgent first"],
  "dispatcher_reply": "what to say to the caller next, ending with a question",
  "threat_details": {
    "threat_level": "ACTIVE | CONTAINED | RESOLVED | UNKNOWN",
    "injuries_reported": true,
    "injury_count": 1,
    "weapons_involved": true,
    "bystanders_at_risk": true,
    "suspect_description": "if known"
  },
  "resources": {
    "police": true,
    "ambulance": true,
    "fire": false,
    "swat": false,
    "negotiator": false,
    "additional_units": 0,
    "priority": "IMMEDIATE | URGENT | STANDARD | LOW"
  },
  "address": "street address if the caller gave one",
  "postcode": "postcode if the caller gave one",
  "confidence": 0.9
}"#,
    );
    prompt.push_str("\n```\n\n");
    push_transcript(&mut prompt, transcript);

    prompt
}

/// Build the user prompt for standard (non-critical) analysis
pub fn build_standard_prompt(
    transcript: &str,
    severity: Severity,
    location: Option<&LocationInfo>,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!("# Call analysis\nSeverity: {}\n", severity.label()));
    if let Some(location) = location {
        push_location_hint(&mut prompt, location);
    }
    prompt.push_str(&format!("Call types: {}\n\n", CALL_TYPES.join(" | ")));

    prompt.push_str("Return ONLY JSON in exactly this format:\n");
    prompt.push_str("```json\n");
    prompt.push_str(
        r#"{
  "call_type": "one of the call types above",
  "summary": "summary of the full conversation",
  "recommended_action": "specific recommendation",
  "additional_info": ["detail"],
  "requires_followup": true,
  "dispatcher_reply": "what to say to the caller next, ending with a question",
  "address": "street address if the caller gave one",
  "postcode": "postcode if the caller gave one",
  "caller_emotion": "CALM | CONCERNED | ANXIOUS | PANICKED | ANGRY",
  "emotion_intensity": "LOW | MEDIUM | HIGH"
}"#,
    );
    prompt.push_str("\n```\n\n");
    push_transcript(&mut prompt, transcript);

    prompt
}

fn push_location_hint(prompt: &mut String, location: &LocationInfo) {
    if location.is_empty() {
        prompt.push_str("Location: not yet known\n");
        return;
    }

    let text = location
        .address
        .as_deref()
        .or(location.landmark.as_deref())
        .unwrap_or_default();
    let status = if location.verified {
        "verified"
    } else {
        "unverified"
    };
    prompt.push_str(&format!("Location: {} ({})\n", text, status));
}

fn push_transcript(prompt: &mut String, transcript: &str) {
    prompt.push_str("## Full conversation\n");
    prompt.push_str(transcript.trim());
    prompt.push('\n');
}
