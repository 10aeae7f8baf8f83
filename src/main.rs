use std::env;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod labels;
mod model;
mod service;
mod utils;

use error::PredictError;
use model::TfModel;
use service::{Prediction, ServiceContext, UploadedImage};

const SOIL_MODEL_PATH: &str = "./model/pso_optimized_model.pb";
const PEST_MODEL_PATH: &str = "./model/pest_detection_model.pb";
const BIND_ADDR: &str = "0.0.0.0:5000";
const ALLOWED_ORIGIN: &str = "http://localhost:5173";
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[tokio::main]
async fn main() {
    // Must be set before the inference runtime initializes.
    env::set_var("CUDA_VISIBLE_DEVICES", "-1");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let soil_model = TfModel::load(SOIL_MODEL_PATH).expect("Failed to load soil model");
    let pest_model = TfModel::load(PEST_MODEL_PATH).expect("Failed to load pest model");
    let context = Arc::new(ServiceContext::new(
        Box::new(soil_model),
        Box::new(pest_model),
    ));

    let cors = CorsLayer::new()
        .allow_origin(
            ALLOWED_ORIGIN
                .parse::<HeaderValue>()
                .expect("Invalid CORS origin"),
        )
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    let app = Router::new()
        .route("/predict", post(predict_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(context)
        .route("/health", get(health_check));

    info!("Listening on http://{BIND_ADDR}");
    axum::Server::bind(&BIND_ADDR.parse().unwrap())
        .serve(app.into_make_service())
        .await
        .unwrap();
}

async fn predict_handler(
    State(context): State<Arc<ServiceContext>>,
    mut multipart: Multipart,
) -> Result<Json<Prediction>, PredictError> {
    let mut detection_type: Option<String> = None;
    let mut upload: Option<UploadedImage> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| PredictError::Multipart(err.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("detection_type") => {
                detection_type = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| PredictError::Multipart(err.to_string()))?,
                );
            }
            Some("image") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| PredictError::Multipart(err.to_string()))?;
                upload = Some(UploadedImage {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let prediction = context.predict(detection_type.as_deref(), upload.as_ref())?;
    Ok(Json(prediction))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK" }))
}
