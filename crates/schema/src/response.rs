use serde::Deserialize;

/// Root of the workflow response. Unknown fields are ignored at every level;
/// `outputs` is the only required key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkflowOutputsResponse {
    pub outputs: Vec<WorkflowOutput>,
}

/// One workflow output block.
///
/// Two shapes are in use: the detailed one carries `count_objects`,
/// `output_image` and `model_predictions`; the simplified one only carries
/// `output`. Every field is optional so either shape decodes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WorkflowOutput {
    #[serde(default)]
    pub count_objects: Option<u32>,
    #[serde(default)]
    pub output_image: Option<Base64Image>,
    #[serde(default)]
    pub output: Option<Base64Image>,
    #[serde(default)]
    pub model_predictions: Option<ModelPredictions>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Base64Image {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelPredictions {
    #[serde(default)]
    pub image: Option<PredictionImage>,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PredictionImage {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Raw detection in centre/size convention, pixel space of the submitted image.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    #[serde(rename = "class")]
    pub label: String,
}

impl WorkflowOutput {
    /// Annotated image, whichever response shape carried it.
    pub fn annotated_image(&self) -> Option<&Base64Image> {
        self.output_image.as_ref().or(self.output.as_ref())
    }

    pub fn predictions(&self) -> &[Prediction] {
        self.model_predictions
            .as_ref()
            .map(|mp| mp.predictions.as_slice())
            .unwrap_or_default()
    }
}
