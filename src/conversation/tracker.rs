use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{ConversationState, LoopDetectionConfig};
use crate::models::CallResult;
use crate::pipeline::Pipeline;

/// Result of one conversational turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Line to speak back to the caller
    pub reply: String,
    pub result: CallResult,
    /// Committed transcript, including this turn's reply
    pub transcript: String,
    pub loop_detected: bool,
}

type Session = Arc<Mutex<ConversationState>>;

/// Per-call conversation sessions.
///
/// Turns for one call id are serialized on that session's lock; different
/// calls only share the map lock, held for lookups.
pub struct ConversationTracker {
    sessions: Mutex<HashMap<String, Session>>,
    loop_detection: LoopDetectionConfig,
}

impl ConversationTracker {
    pub fn new(loop_detection: LoopDetectionConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            loop_detection,
        }
    }

    /// Open a session. Returns false if the call was already active.
    pub async fn start_call(&self, call_id: &str) -> bool {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(call_id) {
            return false;
        }
        sessions.insert(call_id.to_string(), Session::default());
        info!("Call {} started", call_id);
        true
    }

    /// Run one caller utterance through the pipeline with the full history.
    ///
    /// The turn is committed only after the pipeline returns, so a dropped
    /// future leaves the session as it was.
    pub async fn handle_turn(
        &self,
        pipeline: &Pipeline,
        call_id: &str,
        utterance: &str,
    ) -> TurnOutcome {
        let session = self.session(call_id).await;
        let mut state = session.lock().await;

        let mut transcript = state.transcript_with(utterance);
        let loop_detected = self
            .loop_detection
            .detect_loop(state.dispatcher_replies(), utterance);
        if loop_detected {
            info!("Call {}: location question loop detected, redirecting", call_id);
            transcript = self.loop_detection.annotate(&transcript);
        }

        let result = pipeline.process_call(call_id, &transcript).await;
        let reply = result.dispatcher_reply().to_string();

        state.commit_turn(utterance, reply.clone());
        debug!("Call {}: {} turns committed", call_id, state.turns());

        TurnOutcome {
            reply,
            result,
            transcript: state.transcript(),
            loop_detected,
        }
    }

    /// Close a session and hand back its final state
    pub async fn end_call(&self, call_id: &str) -> Option<ConversationState> {
        let session = self.sessions.lock().await.remove(call_id)?;
        let state = session.lock().await.clone();
        info!("Call {} ended after {} turns", call_id, state.turns());
        Some(state)
    }

    pub async fn active_calls(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Copy of a session's committed state
    pub async fn state(&self, call_id: &str) -> Option<ConversationState> {
        let session = self.sessions.lock().await.get(call_id).cloned()?;
        let state = session.lock().await.clone();
        Some(state)
    }

    async fn session(&self, call_id: &str) -> Session {
        self.sessions
            .lock()
            .await
            .entry(call_id.to_string())
            .or_default()
            .clone()
    }
}

impl Default for ConversationTracker {
    fn default() -> Self {
        Self::new(LoopDetectionConfig::default())
    }
}
