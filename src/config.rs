use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::conversation::LoopDetectionConfig;
use crate::llm::{AnthropicClient, AnthropicConfig};
use crate::location::{DisabledGeocoder, Geocoder, MapsCoGeocoder};
use crate::pipeline::Pipeline;
use crate::stages::{ClassifierConfig, DeepAnalysisConfig, StandardAnalysisConfig};

const DEFAULT_INFERENCE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_GEOCODE_TIMEOUT_SECS: u64 = 5;

/// Per-stage settings for one pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub classifier: ClassifierConfig,
    pub deep: DeepAnalysisConfig,
    pub standard: StandardAnalysisConfig,
}

impl PipelineConfig {
    /// Stage defaults with every inference call bounded by `timeout`
    pub fn with_inference_timeout(timeout: Duration) -> Self {
        let mut config = Self::default();
        config.classifier.timeout = timeout;
        config.deep.timeout = timeout;
        config.standard.timeout = timeout;
        config
    }
}

/// Everything the host needs to assemble a pipeline and a tracker
#[derive(Debug, Clone)]
pub struct TriageConfig {
    pub anthropic: AnthropicConfig,
    /// Absent key disables geocoding; every lookup then reports failure
    pub geocode_api_key: Option<String>,
    pub inference_timeout: Duration,
    pub geocode_timeout: Duration,
    pub loop_detection: LoopDetectionConfig,
}

impl TriageConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let anthropic = AnthropicConfig::from_env()?;
        let geocode_api_key = std::env::var("GEOCODE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(Self {
            anthropic,
            geocode_api_key,
            inference_timeout: secs_from_env(
                "TRIAGE_INFERENCE_TIMEOUT_SECS",
                DEFAULT_INFERENCE_TIMEOUT_SECS,
            )?,
            geocode_timeout: secs_from_env(
                "TRIAGE_GEOCODE_TIMEOUT_SECS",
                DEFAULT_GEOCODE_TIMEOUT_SECS,
            )?,
            loop_detection: LoopDetectionConfig::default(),
        })
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::with_inference_timeout(self.inference_timeout)
    }

    pub fn geocoder(&self) -> Arc<dyn Geocoder> {
        match &self.geocode_api_key {
            Some(key) => Arc::new(MapsCoGeocoder::new(key.clone(), self.geocode_timeout)),
            None => {
                warn!("GEOCODE_API_KEY not set, locations will stay unverified");
                Arc::new(DisabledGeocoder)
            }
        }
    }

    /// Build the pipeline against the Anthropic backend
    pub fn build_pipeline(&self) -> Pipeline {
        info!(
            "Using model {} (inference timeout {}s)",
            self.anthropic.model,
            self.inference_timeout.as_secs()
        );
        let backend = Arc::new(AnthropicClient::new(self.anthropic.clone()));
        Pipeline::with_collaborators(backend, self.geocoder(), &self.pipeline_config())
    }
}

fn secs_from_env(name: &str, default: u64) -> Result<Duration> {
    match std::env::var(name) {
        Ok(raw) => parse_secs(name, &raw),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{} must be a whole number of seconds, got {:?}", name, raw))?;
    anyhow::ensure!(secs > 0, "{} must be greater than zero", name);
    Ok(Duration::from_secs(secs))
}
