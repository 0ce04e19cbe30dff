use serde::Serialize;

/// Caller and dispatcher lines of one live call, in turn order.
///
/// `dispatcher_replies` never outgrows `caller_utterances`; both grow by one
/// only through `commit_turn`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationState {
    caller_utterances: Vec<String>,
    dispatcher_replies: Vec<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn caller_utterances(&self) -> &[String] {
        &self.caller_utterances
    }

    pub fn dispatcher_replies(&self) -> &[String] {
        &self.dispatcher_replies
    }

    /// Number of completed turns
    pub fn turns(&self) -> usize {
        self.caller_utterances.len()
    }

    pub fn latest_caller_message(&self) -> Option<&str> {
        self.caller_utterances.last().map(String::as_str)
    }

    /// Append a finished turn. Called only once the pipeline has produced the reply.
    pub fn commit_turn(&mut self, utterance: impl Into<String>, reply: impl Into<String>) {
        self.caller_utterances.push(utterance.into());
        self.dispatcher_replies.push(reply.into());
    }

    /// Reconstructed alternating transcript of the committed turns
    pub fn transcript(&self) -> String {
        self.lines().join("\n\n")
    }

    /// Committed history followed by a caller utterance not yet answered
    pub fn transcript_with(&self, pending: &str) -> String {
        let mut lines = self.lines();
        lines.push(format!("Caller: {}", pending));
        lines.join("\n\n")
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.caller_utterances.len() * 2);
        for (i, utterance) in self.caller_utterances.iter().enumerate() {
            lines.push(format!("Caller: {}", utterance));
            if let Some(reply) = self.dispatcher_replies.get(i) {
                lines.push(format!("Dispatcher: {}", reply));
            }
        }
        lines
    }
}
