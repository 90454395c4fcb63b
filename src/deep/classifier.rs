use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::deep::decode::decode_features;
use crate::deep::{BlobParams, FeatureVector, ModelFiles, Network};
use crate::error::Error;

/// How the outputs of the requested layers are laid out in the feature vector.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureLayout {
    /// The first output, flattened.
    Flat,
    /// Every requested output, concatenated row by row.
    Rows,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub model: ModelFiles,
    /// Layers where the network is cut. Empty means the last layer.
    pub layers: Vec<String>,
    pub blob: BlobParams,
    pub layout: FeatureLayout,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::resnet50()
    }
}

impl ClassifierConfig {
    fn imagenet_blob() -> BlobParams {
        BlobParams::new(1.0, 224, 224, [0.485, 0.456, 0.406])
    }

    pub fn resnet50() -> Self {
        Self {
            model: ModelFiles::Onnx(PathBuf::from("../models/resnet50-caffe2/resnet50-caffe2.onnx")),
            layers: vec!["OC2_DUMMY_0".into()],
            blob: Self::imagenet_blob(),
            layout: FeatureLayout::Flat,
        }
    }

    pub fn googlenet() -> Self {
        Self {
            model: ModelFiles::Caffe {
                config: PathBuf::from("../models/googleNet/bvlc_googlenet.prototxt"),
                weights: PathBuf::from("../models/googleNet/bvlc_googlenet.caffemodel"),
            },
            layers: vec!["pool5/7x7_s1".into()],
            blob: Self::imagenet_blob(),
            layout: FeatureLayout::Flat,
        }
    }
}

/// An image classification network cut at an inner layer and used as a
/// feature encoder for re-identification.
pub struct Classifier<N: Network> {
    config: ClassifierConfig,
    net: N,
}

impl<N: Network> Classifier<N> {
    pub fn new(config: ClassifierConfig) -> Result<Self, Error> {
        Ok(Self {
            net: N::load(&config.model)?,
            config,
        })
    }

    pub fn from_network(net: N, config: ClassifierConfig) -> Self {
        Self { config, net }
    }

    #[inline]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    #[inline]
    pub fn network(&self) -> &N {
        &self.net
    }

    pub fn set_network(&mut self, net: N) {
        self.net = net;
    }

    /// Sets the output layer, `None` for the last one.
    pub fn set_layer(&mut self, layer: Option<&str>) {
        self.config.layers = layer.into_iter().map(String::from).collect();
    }

    pub fn blob(&self, image: &N::Image) -> Result<N::Blob, Error> {
        self.net.blob(image, &self.config.blob)
    }

    pub fn set_input(&mut self, blob: &N::Blob) -> Result<(), Error> {
        self.net.set_input(blob)
    }

    /// Runs the network on the current input and returns the feature vector.
    pub fn forward(&mut self) -> Result<FeatureVector, Error> {
        let outputs = self.net.forward(&self.config.layers)?;

        decode_features(&outputs, self.config.layout)
    }

    /// Blob, input and forward pass in one call.
    pub fn feed(&mut self, image: &N::Image) -> Result<FeatureVector, Error> {
        let blob = self.blob(image)?;
        self.set_input(&blob)?;
        self.forward()
    }

    /// Layer names of the network, logged one per line when `show` is set.
    pub fn layer_names(&self, show: bool) -> Result<Vec<String>, Error> {
        let names = self.net.layer_names()?;

        if show {
            for (i, name) in names.iter().enumerate() {
                tracing::info!("{} -> {}", i, name);
            }
        }

        Ok(names)
    }
}
