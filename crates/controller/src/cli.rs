use crate::config::{ControllerConfig, OverlapPolicy};
use anyhow::Context;
use clap::Parser;
use schema::DetectionResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Run object detection on a photo through the remote inference service.
///
/// The service credential is read from INFERENCE_API_KEY.
#[derive(Debug, Parser)]
#[command(name = "detect", version)]
pub struct Args {
    /// Photo to analyse (JPEG or PNG)
    #[arg(long)]
    pub image: PathBuf,

    /// Where to write the annotated image returned by the service
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Workflow URL, overrides INFERENCE_ENDPOINT
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Overrides MAX_IMAGE_WIDTH
    #[arg(long)]
    pub max_width: Option<u32>,

    /// Overrides MAX_IMAGE_HEIGHT
    #[arg(long)]
    pub max_height: Option<u32>,

    /// JPEG quality 1-100, overrides JPEG_QUALITY
    #[arg(long)]
    pub quality: Option<u8>,

    /// last-completion-wins or cancel-previous, overrides OVERLAP_POLICY
    #[arg(long)]
    pub policy: Option<OverlapPolicy>,
}

impl Args {
    /// Layer command-line overrides on top of the environment configuration.
    pub fn apply_to(&self, config: &mut ControllerConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.inference.endpoint = endpoint.clone();
        }
        if let Some(max_width) = self.max_width {
            config.inference.max_width = max_width;
        }
        if let Some(max_height) = self.max_height {
            config.inference.max_height = max_height;
        }
        if let Some(quality) = self.quality {
            config.inference.jpeg_quality = quality;
        }
        if let Some(policy) = self.policy {
            config.overlap_policy = policy;
        }
    }
}

/// Write the service's annotated image to `path` as returned (no re-encoding).
/// Returns `false` when the result carries no image.
pub fn write_annotated_image(result: &DetectionResult, path: &Path) -> anyhow::Result<bool> {
    let Some(payload) = &result.annotated_image else {
        return Ok(false);
    };

    let bytes = preprocess::decode_bytes(payload).context("Annotated image is not valid base64")?;
    fs::write(path, &bytes)
        .with_context(|| format!("Failed to write annotated image to {}", path.display()))?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "Annotated image saved");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference::InferenceConfig;
    use schema::{ApiKey, EncodedImagePayload};

    fn config() -> ControllerConfig {
        ControllerConfig {
            inference: InferenceConfig {
                environment: common::Environment::Development,
                endpoint: "http://localhost/wf".to_string(),
                api_key: ApiKey::new("k"),
                max_width: 2048,
                max_height: 2048,
                jpeg_quality: 70,
                otel_endpoint: None,
            },
            overlap_policy: OverlapPolicy::LastCompletionWins,
        }
    }

    #[test]
    fn test_parses_all_flags() {
        let args = Args::try_parse_from([
            "detect",
            "--image",
            "photo.jpg",
            "--output",
            "out.jpg",
            "--endpoint",
            "http://127.0.0.1:9001/wf",
            "--max-width",
            "1024",
            "--max-height",
            "768",
            "--quality",
            "90",
            "--policy",
            "cancel-previous",
        ])
        .unwrap();

        let mut config = config();
        args.apply_to(&mut config);

        assert_eq!(args.image, PathBuf::from("photo.jpg"));
        assert_eq!(args.output, Some(PathBuf::from("out.jpg")));
        assert_eq!(config.inference.endpoint, "http://127.0.0.1:9001/wf");
        assert_eq!(config.inference.codec(), preprocess::ImageCodec::new(1024, 768, 90));
        assert_eq!(config.overlap_policy, OverlapPolicy::CancelPrevious);
    }

    #[test]
    fn test_absent_flags_keep_environment_values() {
        let args = Args::try_parse_from(["detect", "--image", "photo.jpg"]).unwrap();

        let mut config = config();
        args.apply_to(&mut config);

        assert_eq!(config.inference.endpoint, "http://localhost/wf");
        assert_eq!(config.inference.codec(), preprocess::ImageCodec::default());
        assert_eq!(config.overlap_policy, OverlapPolicy::LastCompletionWins);
    }

    #[test]
    fn test_image_is_required_and_key_is_not_a_flag() {
        assert!(Args::try_parse_from(["detect"]).is_err());
        assert!(Args::try_parse_from(["detect", "--image", "a.jpg", "--api-key", "x"]).is_err());
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(Args::try_parse_from(["detect", "--image", "a.jpg", "--policy", "fastest"]).is_err());
    }

    #[test]
    fn test_writes_decoded_annotated_image() {
        let path = std::env::temp_dir().join(format!("detect-annotated-{}.bin", std::process::id()));
        let result = DetectionResult {
            annotated_image: Some(EncodedImagePayload::jpeg_base64("aGVsbG8=")),
            ..Default::default()
        };

        assert!(write_annotated_image(&result, &path).unwrap());
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_annotated_image_writes_nothing() {
        let path = std::env::temp_dir().join("detect-never-written.bin");
        assert!(!write_annotated_image(&DetectionResult::empty(), &path).unwrap());
        assert!(!path.exists());
    }
}
