pub mod config;
pub mod conversation;
pub mod error;
pub mod io;
pub mod llm;
pub mod location;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use config::{PipelineConfig, TriageConfig};
pub use conversation::{
    ConversationState, ConversationTracker, LoopDetectionConfig, TurnOutcome, GREETING,
    REMINDER_LINE,
};
pub use error::TriageError;
pub use io::{format_summary, read_call_envelope, CallSnapshot};
pub use llm::{AnthropicClient, AnthropicConfig, CompletionParams, InferenceBackend};
pub use location::{DisabledGeocoder, GeocodeResult, Geocoder, MapsCoGeocoder};
pub use models::{
    CallEnvelope, CallResult, CallStatus, Classification, IncidentReport, LocationInfo, Route,
    Severity, StandardResponse,
};
pub use pipeline::Pipeline;
pub use stages::{
    Classifier, ClassifierConfig, DeepAnalysisConfig, DeepAnalyzer, StandardAnalysisConfig,
    StandardAnalyzer,
};
