use tracing::warn;

/// Phrases that would end the conversation if spoken to the caller
pub const CALL_ENDING_PHRASES: &[&str] = &[
    "goodbye",
    "good bye",
    "bye now",
    "take care",
    "hang up",
    "ending the call",
    "have a good day",
    "have a nice day",
];

/// Result of checking a dispatcher reply against its content-shape contract
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ReplyValidation {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

/// Check that a reply keeps the conversation open: it must end with a
/// question and must not contain a call-ending phrase.
pub fn validate_reply(reply: &str) -> ReplyValidation {
    let mut errors = Vec::new();
    let trimmed = reply.trim();

    if trimmed.is_empty() {
        return ReplyValidation::invalid(vec!["Reply is empty".to_string()]);
    }

    if !trimmed.ends_with('?') {
        errors.push("Reply does not end with a question".to_string());
    }

    let lower = trimmed.to_lowercase();
    for phrase in CALL_ENDING_PHRASES {
        if lower.contains(phrase) {
            errors.push(format!("Reply contains call-ending phrase: {:?}", phrase));
        }
    }

    if errors.is_empty() {
        ReplyValidation::valid()
    } else {
        ReplyValidation::invalid(errors)
    }
}

/// Log contract violations for a generated reply. The reply is never altered.
pub fn audit_reply(stage: &str, reply: &str) {
    let validation = validate_reply(reply);
    if !validation.is_valid {
        warn!("{} reply violates shape contract: {:?}", stage, validation.errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_reply() {
        let result = validate_reply("Units are on the way. Are you somewhere safe?");
        assert!(result.is_valid);
    }

    #[test]
    fn test_reply_without_question() {
        let result = validate_reply("Units are on the way.");
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("question"));
    }

    #[test]
    fn test_reply_with_goodbye() {
        let result = validate_reply("Help is coming, goodbye. Anything else?");
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("goodbye")));
    }

    #[test]
    fn test_empty_reply() {
        assert!(!validate_reply("   ").is_valid);
    }
}
