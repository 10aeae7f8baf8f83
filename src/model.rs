use std::fs::File;
use std::io::Read;

use image::imageops::FilterType;
use image::DynamicImage;
use tensorflow::{Graph, ImportGraphDefOptions, Session, SessionOptions, SessionRunArgs, Tensor};
use thiserror::Error;

const CHANNELS: u32 = 3;
const INPUT_OP: &str = "x";
const OUTPUT_OP: &str = "Identity";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("inference runtime error: {0}")]
    Runtime(#[from] tensorflow::Status),
}

/// Seam between the request pipeline and the inference runtime. The service
/// holds classifiers behind this trait so tests can substitute fixed-score
/// fakes for the real frozen graphs.
pub trait Classifier: Send + Sync {
    /// Runs the classifier on a `[1, side, side, 3]` NHWC float input and
    /// returns one activation per class.
    fn scores(&self, pixels: &[f32], side: u32) -> Result<Vec<f32>, ModelError>;
}

/// A frozen TensorFlow graph plus a session to run it. Loaded once at
/// startup; sessions support concurrent read-only runs, so no locking.
pub struct TfModel {
    graph: Graph,
    session: Session,
}

impl TfModel {
    pub fn load(model_path: &str) -> Result<Self, ModelError> {
        let mut graph = Graph::new();
        let mut model_file = File::open(model_path)?;
        let mut model_bytes = Vec::new();
        model_file.read_to_end(&mut model_bytes)?;

        graph.import_graph_def(&model_bytes, &ImportGraphDefOptions::new())?;
        let session = Session::new(&SessionOptions::new(), &graph)?;

        Ok(TfModel { graph, session })
    }
}

impl Classifier for TfModel {
    fn scores(&self, pixels: &[f32], side: u32) -> Result<Vec<f32>, ModelError> {
        let input = Tensor::new(&[1, side as u64, side as u64, CHANNELS as u64])
            .with_values(pixels)?;

        let input_op = self.graph.operation_by_name_required(INPUT_OP)?;
        let output_op = self.graph.operation_by_name_required(OUTPUT_OP)?;

        let mut args = SessionRunArgs::new();
        args.add_feed(&input_op, 0, &input);
        let fetch_token = args.request_fetch(&output_op, 0);
        self.session.run(&mut args)?;

        let output: Tensor<f32> = args.fetch(fetch_token)?;
        Ok(output.to_vec())
    }
}

/// Resizes to `side`×`side` (bilinear) and scales RGB intensities to [0,1],
/// flattened in NHWC order for a batch of one.
pub fn to_input(img: &DynamicImage, side: u32) -> Vec<f32> {
    let resized = img.resize_exact(side, side, FilterType::Triangle).to_rgb8();

    let mut pixels = Vec::with_capacity((side * side * CHANNELS) as usize);
    for pixel in resized.pixels() {
        pixels.push(pixel[0] as f32 / 255.0);
        pixels.push(pixel[1] as f32 / 255.0);
        pixels.push(pixel[2] as f32 / 255.0);
    }
    pixels
}

/// Index of the maximum activation; ties go to the lowest index.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}
