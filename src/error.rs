use thiserror::Error;

/// Failure conditions inside the triage pipeline.
///
/// Only `PipelineFault` is ever visible on a `CallResult`; the other variants
/// are recovered at the stage boundary by substituting a fallback record.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TriageError {
    /// Completion text did not contain parseable structured output
    #[error("malformed response: {reason} (raw: {excerpt:?})")]
    MalformedResponse { reason: String, excerpt: String },

    /// The inference backend could not be reached or returned nothing usable
    #[error("inference unavailable: {0}")]
    InferenceUnavailable(String),

    /// Geocoding lookup failed or returned no result
    #[error("location enrichment failed: {0}")]
    EnrichmentFailed(String),

    /// Something unexpected escaped a stage
    #[error("pipeline fault: {0}")]
    PipelineFault(String),
}

impl TriageError {
    pub fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
            excerpt: excerpt(raw),
        }
    }
}

/// Maximum number of characters of raw model output kept for diagnosis
pub const EXCERPT_CHARS: usize = 200;

/// First `EXCERPT_CHARS` characters of `raw`, cut on a char boundary
pub fn excerpt(raw: &str) -> String {
    raw.chars().take(EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let raw = "é".repeat(300);
        let cut = excerpt(&raw);
        assert_eq!(cut.chars().count(), EXCERPT_CHARS);
    }

    #[test]
    fn test_malformed_display_includes_excerpt() {
        let err = TriageError::malformed("no JSON object found", "just prose");
        assert!(err.to_string().contains("just prose"));
    }
}
