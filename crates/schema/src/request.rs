use crate::{ApiKey, EncodedImagePayload, PayloadEncoding};
use serde::Serialize;

/// Body of the outbound workflow request.
///
/// ```json
/// { "api_key": "...", "inputs": { "image": { "type": "base64", "value": "..." } } }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct InferenceRequest<'a> {
    pub api_key: &'a ApiKey,
    pub inputs: RequestInputs<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestInputs<'a> {
    pub image: ImageInput<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageInput<'a> {
    #[serde(rename = "type")]
    pub kind: PayloadEncoding,
    pub value: &'a str,
}

impl<'a> InferenceRequest<'a> {
    pub fn new(api_key: &'a ApiKey, payload: &'a EncodedImagePayload) -> Self {
        Self {
            api_key,
            inputs: RequestInputs {
                image: ImageInput {
                    kind: payload.encoding,
                    value: &payload.data,
                },
            },
        }
    }
}
