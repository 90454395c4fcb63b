use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::deep::decode::{decode_ssd, decode_yolo};
use crate::deep::{BlobParams, Detection, ModelFiles, Names, Network};
use crate::error::Error;

/// Layout of the detection network output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecoderKind {
    /// Multi-scale grids of `[cx, cy, w, h, objectness, class scores...]`, needs NMS.
    Yolo,
    /// Fixed `[batch, class, confidence, x1, y1, x2, y2]` slots.
    Ssd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub model: ModelFiles,
    /// Newline separated class names in class index order.
    pub names: PathBuf,
    /// Output layers. Empty means all unconnected output layers.
    pub layers: Vec<String>,
    pub blob: BlobParams,
    pub decoder: DecoderKind,
    pub confidence_threshold: f32,
    /// IoU above which the weaker of two boxes is suppressed. Unused by `Ssd`.
    pub nms_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::yolov3()
    }
}

impl DetectorConfig {
    pub fn yolov3() -> Self {
        Self {
            model: ModelFiles::Darknet {
                config: PathBuf::from("../models/yolo-coco/yolov3.cfg"),
                weights: PathBuf::from("../models/yolo-coco/yolov3.weights"),
            },
            names: PathBuf::from("../models/yolo-coco/coco.names"),
            layers: vec![],
            blob: BlobParams::new(1.0 / 255.0, 416, 416, [0.0, 0.0, 0.0]).swap_rb(true),
            decoder: DecoderKind::Yolo,
            confidence_threshold: 0.5,
            nms_threshold: 0.3,
        }
    }

    pub fn mobilenet_ssd() -> Self {
        Self {
            model: ModelFiles::Caffe {
                config: PathBuf::from("../models/mobileNetSSD/MobileNetSSD_deploy.prototxt"),
                weights: PathBuf::from("../models/mobileNetSSD/MobileNetSSD_deploy.caffemodel"),
            },
            names: PathBuf::from("../models/mobileNetSSD/voc.names"),
            layers: vec![],
            blob: BlobParams::new(0.007843, 300, 300, [127.5, 127.5, 127.5]),
            decoder: DecoderKind::Ssd,
            confidence_threshold: 0.2,
            nms_threshold: 0.3,
        }
    }
}

/// An object detection network together with its class names.
pub struct Detector<N: Network> {
    config: DetectorConfig,
    names: Names,
    layers: Vec<String>,
    net: N,
}

impl<N: Network> Detector<N> {
    pub fn new(config: DetectorConfig) -> Result<Self, Error> {
        let net = N::load(&config.model)?;
        let names = Names::from_file(&config.names)?;

        Self::from_network(net, names, config)
    }

    pub fn from_network(net: N, names: Names, config: DetectorConfig) -> Result<Self, Error> {
        let layers = if config.layers.is_empty() {
            net.unconnected_out_layers()?
        } else {
            config.layers.clone()
        };

        tracing::debug!(?layers, classes = names.len(), "detector ready");

        Ok(Self {
            config,
            names,
            layers,
            net,
        })
    }

    #[inline]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    #[inline]
    pub fn names(&self) -> &Names {
        &self.names
    }

    /// Output layers read on every forward pass.
    #[inline]
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    #[inline]
    pub fn network(&self) -> &N {
        &self.net
    }

    pub fn blob(&self, image: &N::Image) -> Result<N::Blob, Error> {
        self.net.blob(image, &self.config.blob)
    }

    /// Blob, forward pass and decoding in one call. Boxes are in pixels of `image`.
    pub fn detect(&mut self, image: &N::Image) -> Result<Vec<Detection>, Error> {
        let (width, height) = N::image_size(image)?;

        let blob = self.blob(image)?;
        self.net.set_input(&blob)?;
        let outputs = self.net.forward(&self.layers)?;

        match self.config.decoder {
            DecoderKind::Yolo => {
                let net = &self.net;

                decode_yolo(
                    &outputs,
                    width,
                    height,
                    self.config.confidence_threshold,
                    self.config.nms_threshold,
                    &self.names,
                    |boxes, scores, score_threshold, nms_threshold| {
                        net.suppress(boxes, scores, score_threshold, nms_threshold)
                    },
                )
            }
            DecoderKind::Ssd => {
                let output = outputs
                    .first()
                    .ok_or_else(|| Error::UnexpectedOutput("network returned no outputs".into()))?;

                decode_ssd(output, width, height, self.config.confidence_threshold, &self.names)
            }
        }
    }
}
