use anyhow::Context;
use clap::Parser;
use common::{TelemetryGuard, setup_logging};
use controller::{
    ControllerConfig, DetectionReport, DetectionState, DetectionStateStore,
    cli::{Args, write_annotated_image},
};
use inference::{DetectionService, HttpInferenceClient};
use preprocess::RawImage;
use tokio::runtime::Handle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ControllerConfig::from_env()?;
    args.apply_to(&mut config);

    let environment = config.inference.environment;
    let _telemetry = match config.inference.otel_endpoint.as_deref() {
        Some(endpoint) => Some(TelemetryGuard::init("detect", endpoint, environment)?),
        None => {
            setup_logging(environment);
            None
        }
    };

    tracing::info!("Detect starting with config: {:?}", config);

    let image = RawImage::open(&args.image)
        .with_context(|| format!("Failed to load image {}", args.image.display()))?;

    let client = HttpInferenceClient::new(&config.inference.endpoint)?;
    let service = DetectionService::new(
        client,
        config.inference.codec(),
        config.inference.api_key.clone(),
    );
    let store = DetectionStateStore::new(service, config.overlap_policy, Handle::current());

    let _subscription = store.subscribe(|state| {
        tracing::debug!(state = state.name(), "State changed");
    });

    store.detect(image).await.context("Detection task did not complete")?;

    let state = store.current_state();
    println!(
        "{}",
        serde_json::to_string_pretty(&DetectionReport::from_state(&state))?
    );

    match &state {
        DetectionState::Success(result) => {
            if let Some(path) = &args.output
                && !write_annotated_image(result, path)?
            {
                tracing::warn!("Service returned no annotated image, nothing written");
            }
            Ok(())
        }
        DetectionState::Failure(message) => anyhow::bail!("{}", message),
        other => anyhow::bail!("Detection ended in unexpected state '{}'", other.name()),
    }
}
