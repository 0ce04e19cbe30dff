use tracing::debug;

const LOCATION_KEYWORDS: &[&str] = &["address", "location", "where", "street", "building"];
const CONFUSION_MARKERS: &[&str] = &["where", "location", "what", "?"];
const LOOP_ANNOTATION: &str = "[SYSTEM ALERT: Caller seems confused by the location question. \
Change approach: give concrete examples (e.g. a street address like 123 Main Street, or a \
building name) instead of asking again. Ask what they can see around them.]";

/// Tunable keyword lists for spotting a repeated location question
#[derive(Debug, Clone)]
pub struct LoopDetectionConfig {
    /// Words marking a dispatcher reply as a location question
    pub location_keywords: Vec<String>,
    /// Words marking the caller's answer as confused
    pub confusion_markers: Vec<String>,
    /// How many consecutive location questions count as a loop
    pub repeated_questions: usize,
    /// Directive appended to the transcript when a loop is found
    pub annotation: String,
}

impl Default for LoopDetectionConfig {
    fn default() -> Self {
        Self {
            location_keywords: LOCATION_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            confusion_markers: CONFUSION_MARKERS.iter().map(|s| s.to_string()).collect(),
            repeated_questions: 2,
            annotation: LOOP_ANNOTATION.to_string(),
        }
    }
}

impl LoopDetectionConfig {
    /// True when the latest replies all asked for a location and the
    /// caller's new utterance sounds confused
    pub fn detect_loop(&self, replies: &[String], utterance: &str) -> bool {
        if self.repeated_questions == 0 || replies.len() < self.repeated_questions {
            return false;
        }

        let recent = &replies[replies.len() - self.repeated_questions..];
        let asked_repeatedly = recent.iter().all(|reply| self.is_location_question(reply));
        if !asked_repeatedly {
            return false;
        }

        let utterance = utterance.to_lowercase();
        let confused = self
            .confusion_markers
            .iter()
            .any(|marker| utterance.contains(marker.as_str()));
        debug!("Location question repeated, caller confused: {}", confused);
        confused
    }

    /// Transcript decorated with the corrective directive
    pub fn annotate(&self, transcript: &str) -> String {
        format!("{}\n\n{}", transcript, self.annotation)
    }

    fn is_location_question(&self, reply: &str) -> bool {
        let reply = reply.to_lowercase();
        reply.contains('?')
            && self
                .location_keywords
                .iter()
                .any(|keyword| reply.contains(keyword.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replies(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_repeated_location_question_is_loop() {
        let config = LoopDetectionConfig::default();
        let history = replies(&[
            "Help is coming. What is your address?",
            "I need your exact location. Where are you?",
        ]);
        assert!(config.detect_loop(&history, "What do you mean where?"));
        assert!(config.detect_loop(&history, "I don't know the location"));
        assert!(!config.detect_loop(&history, "I'm scared, please hurry"));
    }

    #[test]
    fn test_single_question_is_not_loop() {
        let config = LoopDetectionConfig::default();
        let history = replies(&["Is anyone hurt?", "What is your address?"]);
        assert!(!config.detect_loop(&history, "what?"));
        assert!(!config.detect_loop(&replies(&["Where are you?"]), "where?"));
    }

    #[test]
    fn test_statement_without_question_mark_is_not_asked() {
        let config = LoopDetectionConfig::default();
        let history = replies(&["Tell me the address.", "Where are you?"]);
        assert!(!config.detect_loop(&history, "what"));
    }

    #[test]
    fn test_keywords_are_tunable() {
        let config = LoopDetectionConfig {
            location_keywords: vec!["postcode".to_string()],
            confusion_markers: vec!["huh".to_string()],
            repeated_questions: 1,
            ..Default::default()
        };
        assert!(config.detect_loop(&replies(&["What's your postcode?"]), "huh"));
        assert!(!config.detect_loop(&replies(&["Where are you?"]), "huh"));
    }

    #[test]
    fn test_annotate_appends_directive() {
        let config = LoopDetectionConfig::default();
        let annotated = config.annotate("Caller: what?");
        assert!(annotated.starts_with("Caller: what?\n\n[SYSTEM ALERT:"));
        assert!(annotated.contains("123 Main Street"));
    }
}
