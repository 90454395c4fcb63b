use std::path::Path;

use ::opencv::{
    core::{self, Mat, Scalar, Vector},
    dnn,
    imgcodecs,
    prelude::*,
};
use ndarray::prelude::*;

use crate::bbox::{BBox, Ltwh};
use crate::deep::{BlobParams, ModelFiles, Network};
use crate::error::Error;

fn path_str(path: &Path) -> Result<&str, Error> {
    path.to_str()
        .ok_or_else(|| Error::InvalidConfig(format!("non utf-8 path {:?}", path)))
}

/// Reads a BGR image from disk.
pub fn read_image<P: AsRef<Path>>(path: P) -> Result<Mat, Error> {
    let path = path.as_ref();
    let image = imgcodecs::imread(path_str(path)?, imgcodecs::IMREAD_COLOR)?;

    if image.empty() {
        return Err(Error::io(path, std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "can not decode image",
        )));
    }

    Ok(image)
}

/// Copies a continuous `CV_32F` blob into an n-dimensional array.
pub fn mat_to_array(mat: &Mat) -> Result<ArrayD<f32>, Error> {
    let dims: Vec<usize> = mat.mat_size().iter().map(|&d| d as usize).collect();
    let data = mat.data_typed::<f32>()?;

    Ok(ArrayD::from_shape_vec(IxDyn(&dims), data.to_vec())?)
}

/// `Network` over the OpenCV dnn module.
pub struct OpenCvNet {
    net: dnn::Net,
}

impl OpenCvNet {
    pub fn from_net(net: dnn::Net) -> Self {
        Self { net }
    }
}

impl Network for OpenCvNet {
    type Image = Mat;
    type Blob = Mat;

    fn load(files: &ModelFiles) -> Result<Self, Error> {
        let net = match files {
            ModelFiles::Onnx(model) => dnn::read_net_from_onnx(path_str(model)?)?,
            ModelFiles::Caffe { config, weights } => {
                dnn::read_net_from_caffe(path_str(config)?, path_str(weights)?)?
            }
            ModelFiles::Darknet { config, weights } => {
                dnn::read_net_from_darknet(path_str(config)?, path_str(weights)?)?
            }
        };

        tracing::debug!(?files, "network loaded");
        Ok(Self { net })
    }

    fn blob(&self, image: &Mat, params: &BlobParams) -> Result<Mat, Error> {
        Ok(dnn::blob_from_image(
            image,
            params.scale_factor,
            core::Size::new(params.width, params.height),
            Scalar::new(params.mean[0], params.mean[1], params.mean[2], 0.0),
            params.swap_rb,
            params.crop,
            core::CV_32F,
        )?)
    }

    fn set_input(&mut self, blob: &Mat) -> Result<(), Error> {
        Ok(self.net.set_input(blob, "", 1.0, Scalar::default())?)
    }

    fn forward(&mut self, layers: &[String]) -> Result<Vec<ArrayD<f32>>, Error> {
        if layers.is_empty() {
            let out = self.net.forward_single("")?;
            return Ok(vec![mat_to_array(&out)?]);
        }

        let mut names = Vector::<String>::new();
        for layer in layers {
            names.push(layer.as_str());
        }

        let mut outs = Vector::<Mat>::new();
        self.net.forward(&mut outs, &names)?;

        outs.iter().map(|m| mat_to_array(&m)).collect()
    }

    fn layer_names(&self) -> Result<Vec<String>, Error> {
        Ok(self.net.get_layer_names()?.to_vec())
    }

    fn unconnected_out_layers(&self) -> Result<Vec<String>, Error> {
        Ok(self.net.get_unconnected_out_layers_names()?.to_vec())
    }

    fn image_size(image: &Mat) -> Result<(i32, i32), Error> {
        let size = image.size()?;
        Ok((size.width, size.height))
    }

    fn suppress(
        &self,
        boxes: &[BBox<Ltwh>],
        scores: &[f32],
        score_threshold: f32,
        nms_threshold: f32,
    ) -> Result<Vec<usize>, Error> {
        let rects: Vector<core::Rect2d> = boxes
            .iter()
            .map(|b| core::Rect2d::new(b.left() as f64, b.top() as f64, b.width() as f64, b.height() as f64))
            .collect();
        let scores: Vector<f32> = scores.iter().copied().collect();

        let mut indices = Vector::<i32>::new();
        dnn::nms_boxes_f64(&rects, &scores, score_threshold, nms_threshold, &mut indices, 1.0, 0)?;

        Ok(indices.iter().map(|i| i as usize).collect())
    }
}
