use std::path::Path;

use anyhow::{Context, Result};

use crate::models::CallEnvelope;

/// Read a call from a file holding either a JSON call envelope or a plain
/// transcript. `call_id` overrides the envelope's id; a plain transcript
/// without one gets a generated id.
pub fn read_call_envelope(path: &Path, call_id: Option<String>) -> Result<CallEnvelope> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_call_envelope(&content, call_id)
}

/// Parse file content into a call envelope
pub fn parse_call_envelope(content: &str, call_id: Option<String>) -> Result<CallEnvelope> {
    let trimmed = content.trim();
    anyhow::ensure!(!trimmed.is_empty(), "Call input is empty");

    let mut envelope = if trimmed.starts_with('{') {
        serde_json::from_str::<CallEnvelope>(trimmed).context("Failed to parse call envelope JSON")?
    } else {
        CallEnvelope {
            call_id: String::new(),
            transcript: trimmed.to_string(),
            timestamp: None,
        }
    };

    if let Some(id) = call_id {
        envelope.call_id = id;
    }
    if envelope.call_id.trim().is_empty() {
        envelope.call_id = generate_call_id();
    }
    anyhow::ensure!(
        !envelope.transcript.trim().is_empty(),
        "Call {} has an empty transcript",
        envelope.call_id
    );

    Ok(envelope)
}

/// Fresh call identifier for calls that arrive without one
pub fn generate_call_id() -> String {
    format!("call_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_json_envelope() {
        let envelope = parse_call_envelope(
            r#"{"call_id": "call_42", "transcript": "Caller: fire!", "timestamp": "2024-05-01T12:00:00Z"}"#,
            None,
        )
        .unwrap();

        assert_eq!(envelope.call_id, "call_42");
        assert_eq!(envelope.transcript, "Caller: fire!");
        assert!(envelope.timestamp.is_some());
    }

    #[test]
    fn test_plain_text_gets_generated_id() {
        let envelope = parse_call_envelope("Caller: my car was broken into\n", None).unwrap();

        assert!(envelope.call_id.starts_with("call_"));
        assert_eq!(envelope.transcript, "Caller: my car was broken into");
        assert!(envelope.timestamp.is_none());
    }

    #[test]
    fn test_explicit_id_wins() {
        let envelope =
            parse_call_envelope(r#"{"call_id": "a", "transcript": "x"}"#, Some("b".to_string()))
                .unwrap();
        assert_eq!(envelope.call_id, "b");
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(parse_call_envelope("   \n", None).is_err());
        assert!(parse_call_envelope(r#"{"call_id": "a", "transcript": " "}"#, None).is_err());
        assert!(parse_call_envelope(r#"{"call_id": "a""#, None).is_err());
    }

    #[test]
    fn test_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Caller: there's smoke coming from the flat upstairs").unwrap();

        let envelope = read_call_envelope(file.path(), Some("call_file".to_string())).unwrap();
        assert_eq!(envelope.call_id, "call_file");
        assert!(envelope.transcript.contains("smoke"));
    }
}
