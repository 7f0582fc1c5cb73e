use anyhow::Context;
use common::{env_optional, env_parse, env_string};
use preprocess::{DEFAULT_JPEG_QUALITY, DEFAULT_MAX_DIMENSION, ImageCodec};
use schema::ApiKey;
use std::env;

pub use common::Environment;

pub const DEFAULT_ENDPOINT: &str =
    "https://serverless.roboflow.com/infer/workflows/objectdetect-1phvw/detect-count-and-visualize";

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub environment: Environment,
    pub endpoint: String,
    /// Redacted in `Debug`, safe to log alongside the rest of the config.
    pub api_key: ApiKey,
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
    /// OTLP collector; telemetry export is off when unset.
    pub otel_endpoint: Option<String>,
}

impl InferenceConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// `INFERENCE_API_KEY` has no default and must be provided.
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let endpoint = env_string("INFERENCE_ENDPOINT", DEFAULT_ENDPOINT);

        let api_key = env::var("INFERENCE_API_KEY")
            .ok()
            .map(ApiKey::new)
            .filter(|key| !key.is_empty())
            .context("INFERENCE_API_KEY must be set to the inference service credential")?;

        let max_width = env_parse("MAX_IMAGE_WIDTH", DEFAULT_MAX_DIMENSION);
        let max_height = env_parse("MAX_IMAGE_HEIGHT", DEFAULT_MAX_DIMENSION);
        let jpeg_quality = env_parse("JPEG_QUALITY", DEFAULT_JPEG_QUALITY);
        let otel_endpoint = env_optional("OTEL_EXPORTER_OTLP_ENDPOINT");

        Ok(Self {
            environment,
            endpoint,
            api_key,
            max_width,
            max_height,
            jpeg_quality,
            otel_endpoint,
        })
    }

    pub fn codec(&self) -> ImageCodec {
        ImageCodec::new(self.max_width, self.max_height, self.jpeg_quality)
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            endpoint: "http://127.0.0.1:9001/infer/workflows/test/detect".to_string(),
            api_key: ApiKey::new("test-key"),
            max_width: DEFAULT_MAX_DIMENSION,
            max_height: DEFAULT_MAX_DIMENSION,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            otel_endpoint: None,
        }
    }
}
