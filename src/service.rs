use serde::Serialize;

use crate::error::PredictError;
use crate::labels;
use crate::model::{argmax, to_input, Classifier};
use crate::utils::allowed_extension;

const SOIL_INPUT_SIDE: u32 = 224;
const PEST_INPUT_SIDE: u32 = 64;

/// One uploaded file: the client-supplied name (for the extension check)
/// and the raw bytes.
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionType {
    Soil,
    Pest,
}

impl DetectionType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "soil" => Some(DetectionType::Soil),
            "pest" => Some(DetectionType::Pest),
            _ => None,
        }
    }
}

/// Response body for a completed prediction, tagged by detection type.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Prediction {
    #[serde(rename = "soil")]
    Soil {
        predicted_class: usize,
        soil_type: String,
        recommendations: Vec<String>,
    },
    #[serde(rename = "pest")]
    Pest {
        predicted_class: usize,
        pest_name: String,
        confidence: f32,
    },
}

/// Immutable per-process state: the two classifiers, constructed once at
/// startup and shared read-only across requests.
pub struct ServiceContext {
    soil_model: Box<dyn Classifier>,
    pest_model: Box<dyn Classifier>,
}

impl ServiceContext {
    pub fn new(soil_model: Box<dyn Classifier>, pest_model: Box<dyn Classifier>) -> Self {
        ServiceContext {
            soil_model,
            pest_model,
        }
    }

    /// The whole request pipeline: validate, decode, preprocess, infer, map
    /// the winning index to a label. One shot, no retries.
    pub fn predict(
        &self,
        detection_type: Option<&str>,
        upload: Option<&UploadedImage>,
    ) -> Result<Prediction, PredictError> {
        let (raw_type, upload) = match (detection_type, upload) {
            (Some(raw_type), Some(upload)) => (raw_type, upload),
            _ => return Err(PredictError::MissingField),
        };

        if !allowed_extension(&upload.file_name) {
            return Err(PredictError::InvalidExtension);
        }

        // Cheap checks first: an unknown type is rejected before any decode.
        let detection =
            DetectionType::parse(raw_type).ok_or(PredictError::InvalidDetectionType)?;

        let decoded =
            image::load_from_memory(&upload.bytes).map_err(|_| PredictError::InvalidImage)?;

        match detection {
            DetectionType::Soil => {
                let input = to_input(&decoded, SOIL_INPUT_SIDE);
                let scores = self.soil_model.scores(&input, SOIL_INPUT_SIDE)?;
                let predicted_class = top_class(&scores, labels::SOIL_CLASSES.len())?;
                let soil_type = labels::SOIL_CLASSES[predicted_class].to_string();
                let recommendations = labels::recommendations_for(&soil_type);

                Ok(Prediction::Soil {
                    predicted_class,
                    soil_type,
                    recommendations,
                })
            }
            DetectionType::Pest => {
                let input = to_input(&decoded, PEST_INPUT_SIDE);
                let scores = self.pest_model.scores(&input, PEST_INPUT_SIDE)?;
                let predicted_class = top_class(&scores, labels::PEST_CLASSES.len())?;

                Ok(Prediction::Pest {
                    predicted_class,
                    pest_name: labels::PEST_CLASSES[predicted_class].to_string(),
                    confidence: scores[predicted_class] * 100.0,
                })
            }
        }
    }
}

// A score vector that does not line up with its label table means the wrong
// graph was loaded; surface that as a server fault rather than panicking on
// the index below.
fn top_class(scores: &[f32], class_count: usize) -> Result<usize, PredictError> {
    if scores.len() != class_count {
        return Err(PredictError::Internal(format!(
            "classifier produced {} outputs for {} classes",
            scores.len(),
            class_count
        )));
    }
    argmax(scores)
        .ok_or_else(|| PredictError::Internal("classifier produced no outputs".to_string()))
}
