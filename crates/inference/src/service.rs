use crate::{client::InferenceClient, errors::DetectionError, postprocessing::extract_result};
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};
use preprocess::{ImageCodec, RawImage};
use schema::{ApiKey, DetectionResult};
use std::time::Instant;

const METER_NAME: &str = "inference";

struct DetectionMetrics {
    duration: Histogram<f64>,
    detections: Counter<u64>,
    failures: Counter<u64>,
}

impl DetectionMetrics {
    fn new(meter: &Meter) -> Self {
        // Remote round trips, so the buckets reach well past a second.
        let latency_buckets = [
            0.05, 0.1, 0.2, 0.3, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 5.0, 10.0, 30.0,
        ];
        let duration = meter
            .f64_histogram("detection_duration_seconds")
            .with_description("Time to run one image (prepare + request + extract)")
            .with_unit("s")
            .with_boundaries(latency_buckets.to_vec())
            .build();
        let detections = meter
            .u64_counter("detections_total")
            .with_description("Total detected objects returned by the service")
            .build();
        let failures = meter
            .u64_counter("detection_failures_total")
            .with_description("Total failed detection runs, by error kind")
            .build();

        Self {
            duration,
            detections,
            failures,
        }
    }
}

/// Runs one image through `resize -> encode -> detect -> extract`.
pub struct DetectionService<C: InferenceClient> {
    client: C,
    codec: ImageCodec,
    credential: ApiKey,
    metrics: DetectionMetrics,
}

impl<C: InferenceClient> DetectionService<C> {
    /// Metrics go to the global meter provider.
    pub fn new(client: C, codec: ImageCodec, credential: ApiKey) -> Self {
        Self::with_meter(client, codec, credential, &global::meter(METER_NAME))
    }

    pub fn with_meter(client: C, codec: ImageCodec, credential: ApiKey, meter: &Meter) -> Self {
        Self {
            client,
            codec,
            credential,
            metrics: DetectionMetrics::new(meter),
        }
    }

    pub fn codec(&self) -> &ImageCodec {
        &self.codec
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    #[tracing::instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub async fn run(&self, image: &RawImage) -> Result<DetectionResult, DetectionError> {
        let start = Instant::now();

        let outcome = self.run_once(image).await;
        let elapsed = start.elapsed();

        match &outcome {
            Ok(result) => {
                self.metrics.duration.record(elapsed.as_secs_f64(), &[]);
                self.metrics
                    .detections
                    .add(result.detections.len() as u64, &[]);

                tracing::info!(
                    detections = result.detections.len(),
                    annotated_image = result.annotated_image.is_some(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Detection completed"
                );
            }
            Err(e) => {
                self.metrics
                    .failures
                    .add(1, &[KeyValue::new("kind", e.kind().as_str())]);
            }
        }

        outcome
    }

    async fn run_once(&self, image: &RawImage) -> Result<DetectionResult, DetectionError> {
        let payload = self.codec.prepare(image)?;
        let response = self.client.detect(&payload, &self.credential).await?;
        Ok(extract_result(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, InferenceError};
    use async_trait::async_trait;
    use schema::{
        Base64Image, EncodedImagePayload, ModelPredictions, Prediction, WorkflowOutput,
        WorkflowOutputsResponse,
    };
    use opentelemetry::metrics::MeterProvider;
    use opentelemetry_sdk::metrics::{InMemoryMetricExporter, PeriodicReader, SdkMeterProvider};
    use std::sync::Mutex;

    /// Returns a canned response and remembers what it was asked.
    struct CannedClient {
        response: Mutex<Option<Result<WorkflowOutputsResponse, InferenceError>>>,
        seen: Mutex<Vec<(EncodedImagePayload, String)>>,
    }

    impl CannedClient {
        fn new(response: Result<WorkflowOutputsResponse, InferenceError>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InferenceClient for CannedClient {
        async fn detect(
            &self,
            payload: &EncodedImagePayload,
            credential: &ApiKey,
        ) -> Result<WorkflowOutputsResponse, InferenceError> {
            self.seen
                .lock()
                .unwrap()
                .push((payload.clone(), credential.expose().to_string()));
            self.response.lock().unwrap().take().expect("single call")
        }
    }

    fn image(width: u32, height: u32) -> RawImage {
        RawImage::from_rgb8(width, height, vec![64u8; (width * height * 3) as usize]).unwrap()
    }

    #[tokio::test]
    async fn test_sends_prepared_payload_with_injected_credential() {
        let client = CannedClient::new(Ok(WorkflowOutputsResponse { outputs: vec![] }));
        let codec = ImageCodec::new(32, 32, 70);
        let service = DetectionService::new(client, codec, ApiKey::new("injected"));

        let source = image(64, 16);
        service.run(&source).await.unwrap();

        let seen = service.client().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, codec.prepare(&source).unwrap());
        assert_eq!(seen[0].1, "injected");
    }

    #[tokio::test]
    async fn test_maps_predictions_to_boxes() {
        let response = WorkflowOutputsResponse {
            outputs: vec![WorkflowOutput {
                count_objects: Some(1),
                output_image: Some(Base64Image {
                    kind: Some("base64".into()),
                    value: "img".into(),
                }),
                output: None,
                model_predictions: Some(ModelPredictions {
                    image: None,
                    predictions: vec![Prediction {
                        x: 10.0,
                        y: 10.0,
                        width: 4.0,
                        height: 2.0,
                        confidence: 0.8,
                        label: "person".into(),
                    }],
                }),
            }],
        };
        let service = DetectionService::new(
            CannedClient::new(Ok(response)),
            ImageCodec::default(),
            ApiKey::new("k"),
        );

        let result = service.run(&image(8, 8)).await.unwrap();

        let bbox = result.detections[0].bounding_box;
        assert_eq!((bbox.left, bbox.top, bbox.right, bbox.bottom), (8.0, 9.0, 12.0, 11.0));
        assert_eq!(result.annotated_image.unwrap().data, "img");
    }

    #[tokio::test]
    async fn test_codec_failure_skips_network_call() {
        let service = DetectionService::new(
            CannedClient::new(Ok(WorkflowOutputsResponse { outputs: vec![] })),
            ImageCodec::default(),
            ApiKey::new("k"),
        );
        let empty = RawImage::from_rgb8(0, 0, Vec::new()).unwrap();

        let err = service.run(&empty).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Codec);
        assert!(service.client().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_client_errors_propagate_unchanged() {
        let service = DetectionService::new(
            CannedClient::new(Err(InferenceError::Status {
                status: 403,
                body: "forbidden".into(),
            })),
            ImageCodec::default(),
            ApiKey::new("k"),
        );

        let err = service.run(&image(4, 4)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.to_string(), "Inference service returned HTTP 403: forbidden");
    }

    fn exported_metric_names(
        provider: &SdkMeterProvider,
        exporter: &InMemoryMetricExporter,
    ) -> Vec<String> {
        provider.force_flush().unwrap();
        exporter
            .get_finished_metrics()
            .unwrap()
            .iter()
            .flat_map(|rm| rm.scope_metrics())
            .flat_map(|sm| sm.metrics())
            .map(|m| m.name().to_string())
            .collect()
    }

    fn in_memory_meter() -> (SdkMeterProvider, InMemoryMetricExporter) {
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder()
            .with_reader(PeriodicReader::builder(exporter.clone()).build())
            .build();
        (provider, exporter)
    }

    #[tokio::test]
    async fn test_success_records_duration_and_detections() {
        let (provider, exporter) = in_memory_meter();
        let service = DetectionService::with_meter(
            CannedClient::new(Ok(WorkflowOutputsResponse { outputs: vec![] })),
            ImageCodec::default(),
            ApiKey::new("k"),
            &provider.meter("test"),
        );

        service.run(&image(4, 4)).await.unwrap();

        let names = exported_metric_names(&provider, &exporter);
        assert!(names.contains(&"detection_duration_seconds".to_string()));
        assert!(names.contains(&"detections_total".to_string()));
        assert!(!names.contains(&"detection_failures_total".to_string()));
    }

    #[tokio::test]
    async fn test_failure_records_failure_counter() {
        let (provider, exporter) = in_memory_meter();
        let service = DetectionService::with_meter(
            CannedClient::new(Err(InferenceError::Status {
                status: 500,
                body: String::new(),
            })),
            ImageCodec::default(),
            ApiKey::new("k"),
            &provider.meter("test"),
        );

        service.run(&image(4, 4)).await.unwrap_err();

        let names = exported_metric_names(&provider, &exporter);
        assert!(names.contains(&"detection_failures_total".to_string()));
        assert!(!names.contains(&"detection_duration_seconds".to_string()));
    }
}
