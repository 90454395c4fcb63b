pub mod classifier;
pub mod decode;
pub mod detection;
pub mod detector;
pub mod names;
pub mod nms;
#[cfg(feature = "opencv")]
pub mod opencv;

pub use classifier::{Classifier, ClassifierConfig, FeatureLayout};
pub use detection::Detection;
pub use detector::{DecoderKind, Detector, DetectorConfig};
pub use names::Names;
pub use nms::nms_boxes;

use std::path::PathBuf;

use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltwh};
use crate::error::Error;

/// Embedding of one image.
pub type FeatureVector = Array1<f32>;

/// Files of a pretrained network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelFiles {
    Onnx(PathBuf),
    Caffe { config: PathBuf, weights: PathBuf },
    Darknet { config: PathBuf, weights: PathBuf },
}

/// How an image becomes the network input tensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobParams {
    pub scale_factor: f64,
    pub width: i32,
    pub height: i32,
    /// Per-channel mean subtracted before scaling.
    pub mean: [f64; 3],
    pub swap_rb: bool,
    pub crop: bool,
}

impl BlobParams {
    pub fn new(scale_factor: f64, width: i32, height: i32, mean: [f64; 3]) -> Self {
        Self {
            scale_factor,
            width,
            height,
            mean,
            swap_rb: false,
            crop: false,
        }
    }

    pub fn swap_rb(mut self, swap_rb: bool) -> Self {
        self.swap_rb = swap_rb;
        self
    }
}

/// An inference engine executing one loaded network.
pub trait Network: Sized {
    type Image;
    type Blob;

    fn load(files: &ModelFiles) -> Result<Self, Error>;

    fn blob(&self, image: &Self::Image, params: &BlobParams) -> Result<Self::Blob, Error>;

    fn set_input(&mut self, blob: &Self::Blob) -> Result<(), Error>;

    /// Runs the forward pass and returns the outputs of `layers`, in order.
    /// No layers means the output of the last layer.
    fn forward(&mut self, layers: &[String]) -> Result<Vec<ArrayD<f32>>, Error>;

    fn layer_names(&self) -> Result<Vec<String>, Error>;

    fn unconnected_out_layers(&self) -> Result<Vec<String>, Error>;

    /// `(width, height)` of an image.
    fn image_size(image: &Self::Image) -> Result<(i32, i32), Error>;

    /// Non-max suppression over decoded boxes, returning the kept indices.
    /// Backends with their own implementation override it.
    fn suppress(
        &self,
        boxes: &[BBox<Ltwh>],
        scores: &[f32],
        score_threshold: f32,
        nms_threshold: f32,
    ) -> Result<Vec<usize>, Error> {
        nms_boxes(boxes, scores, score_threshold, nms_threshold)
    }
}
