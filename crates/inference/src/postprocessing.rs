use schema::{
    BoundingBox, DetectedObject, DetectionResult, EncodedImagePayload, ImageDimensions,
    Prediction, WorkflowOutputsResponse,
};

/// Map a workflow response onto the domain result.
///
/// Only the first output block is read. Missing outputs, images or
/// predictions resolve to `None` / empty rather than an error.
pub fn extract_result(response: WorkflowOutputsResponse) -> DetectionResult {
    let Some(output) = response.outputs.into_iter().next() else {
        tracing::debug!("Inference response carried no outputs");
        return DetectionResult::empty();
    };

    let annotated_image = output
        .output_image
        .or(output.output)
        .map(|image| {
            if let Some(kind) = image.kind.as_deref().filter(|k| *k != "base64") {
                tracing::warn!(kind, "Unexpected annotated image encoding, treating as base64");
            }
            EncodedImagePayload::jpeg_base64(image.value)
        });

    let (prediction_image, detections) = match output.model_predictions {
        Some(mp) => (
            mp.image.map(|img| ImageDimensions {
                width: img.width,
                height: img.height,
            }),
            mp.predictions.iter().map(to_detected_object).collect(),
        ),
        None => (None, Vec::new()),
    };

    DetectionResult {
        annotated_image,
        detections,
        object_count: output.count_objects,
        prediction_image,
    }
}

pub fn to_detected_object(prediction: &Prediction) -> DetectedObject {
    DetectedObject {
        label: prediction.label.clone(),
        confidence: prediction.confidence.clamp(0.0, 1.0),
        bounding_box: cxcywh_to_xyxy(
            prediction.x,
            prediction.y,
            prediction.width,
            prediction.height,
        ),
    }
}

/// Convert bounding box from center-width-height format to corner format
#[inline]
pub fn cxcywh_to_xyxy(cx: f32, cy: f32, w: f32, h: f32) -> BoundingBox {
    BoundingBox {
        left: cx - w / 2.0,
        top: cy - h / 2.0,
        right: cx + w / 2.0,
        bottom: cy + h / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::{Base64Image, ModelPredictions, PredictionImage, WorkflowOutput};

    fn prediction(x: f32, y: f32, width: f32, height: f32, confidence: f32) -> Prediction {
        Prediction {
            x,
            y,
            width,
            height,
            confidence,
            label: "dog".to_string(),
        }
    }

    fn image(value: &str) -> Base64Image {
        Base64Image {
            kind: Some("base64".to_string()),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_center_to_corner_conversion() {
        let bbox = cxcywh_to_xyxy(10.0, 10.0, 4.0, 2.0);
        assert_eq!(
            bbox,
            BoundingBox {
                left: 8.0,
                top: 9.0,
                right: 12.0,
                bottom: 11.0
            }
        );
    }

    #[test]
    fn test_corners_are_ordered_for_non_negative_extent() {
        for (w, h) in [(0.0, 0.0), (1.0, 0.0), (0.5, 300.25), (1920.0, 1080.0)] {
            let bbox = cxcywh_to_xyxy(100.0, 50.0, w, h);
            assert!(bbox.left <= bbox.right);
            assert!(bbox.top <= bbox.bottom);
        }
    }

    #[test]
    fn test_empty_outputs_give_empty_result() {
        let result = extract_result(WorkflowOutputsResponse { outputs: vec![] });
        assert_eq!(result, DetectionResult::empty());
    }

    #[test]
    fn test_simplified_variant_yields_image_only() {
        let response = WorkflowOutputsResponse {
            outputs: vec![WorkflowOutput {
                output: Some(image("abcd")),
                ..Default::default()
            }],
        };

        let result = extract_result(response);

        assert_eq!(result.annotated_image.unwrap().data, "abcd");
        assert!(result.detections.is_empty());
        assert!(result.object_count.is_none());
    }

    #[test]
    fn test_detailed_variant_maps_every_prediction() {
        let response = WorkflowOutputsResponse {
            outputs: vec![WorkflowOutput {
                count_objects: Some(2),
                output_image: Some(image("annotated")),
                output: None,
                model_predictions: Some(ModelPredictions {
                    image: Some(PredictionImage {
                        width: Some(640),
                        height: None,
                    }),
                    predictions: vec![
                        prediction(10.0, 10.0, 4.0, 2.0, 0.9),
                        prediction(100.0, 50.0, 20.0, 10.0, 0.25),
                    ],
                }),
            }],
        };

        let result = extract_result(response);

        assert_eq!(result.annotated_image.unwrap().data, "annotated");
        assert_eq!(result.object_count, Some(2));
        assert_eq!(
            result.prediction_image,
            Some(ImageDimensions {
                width: Some(640),
                height: None
            })
        );
        assert_eq!(result.detections.len(), 2);
        assert_eq!(result.detections[0].label, "dog");
        assert_eq!(result.detections[0].bounding_box.left, 8.0);
        assert_eq!(result.detections[1].bounding_box.right, 110.0);
        assert_eq!(result.detections[1].confidence, 0.25);
    }

    #[test]
    fn test_only_first_output_is_read() {
        let response = WorkflowOutputsResponse {
            outputs: vec![
                WorkflowOutput {
                    output: Some(image("first")),
                    ..Default::default()
                },
                WorkflowOutput {
                    output: Some(image("second")),
                    ..Default::default()
                },
            ],
        };

        assert_eq!(extract_result(response).annotated_image.unwrap().data, "first");
    }

    #[test]
    fn test_detailed_image_wins_over_simplified() {
        let response = WorkflowOutputsResponse {
            outputs: vec![WorkflowOutput {
                output_image: Some(image("detailed")),
                output: Some(image("simple")),
                ..Default::default()
            }],
        };

        assert_eq!(
            extract_result(response).annotated_image.unwrap().data,
            "detailed"
        );
    }

    #[test]
    fn test_confidence_is_clamped_to_unit_interval() {
        assert_eq!(to_detected_object(&prediction(0.0, 0.0, 1.0, 1.0, 1.7)).confidence, 1.0);
        assert_eq!(to_detected_object(&prediction(0.0, 0.0, 1.0, 1.0, -0.2)).confidence, 0.0);
    }

    #[test]
    fn test_output_without_anything_is_not_an_error() {
        let response = WorkflowOutputsResponse {
            outputs: vec![WorkflowOutput::default()],
        };
        let result = extract_result(response);

        assert!(result.annotated_image.is_none());
        assert!(result.detections.is_empty());
    }
}
