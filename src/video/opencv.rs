use ::opencv::{
    core::Mat,
    prelude::*,
    videoio,
};

use crate::error::Error;
use crate::video::{Capture, VideoSource};

/// `Capture` over an OpenCV `VideoCapture`.
pub struct CvCapture {
    cam: videoio::VideoCapture,
}

impl CvCapture {
    #[inline]
    pub fn inner(&self) -> &videoio::VideoCapture {
        &self.cam
    }
}

impl Capture for CvCapture {
    type Frame = Mat;

    fn open(source: &VideoSource) -> Result<Self, Error> {
        let cam = match source {
            VideoSource::Camera(index) => videoio::VideoCapture::new(*index, videoio::CAP_ANY)?,
            VideoSource::File(path) => {
                let path = path.to_str()
                    .ok_or_else(|| Error::Capture(format!("non utf-8 path {:?}", path)))?;

                videoio::VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };

        if !cam.is_opened()? {
            return Err(Error::Capture(format!("unable to open {:?}", source)));
        }

        Ok(Self { cam })
    }

    fn read(&mut self) -> Result<Option<Mat>, Error> {
        let mut frame = Mat::default();

        if self.cam.read(&mut frame)? && !frame.empty() {
            Ok(Some(frame))
        } else {
            Ok(None)
        }
    }

    fn source_fps(&self) -> Result<f64, Error> {
        Ok(self.cam.get(videoio::CAP_PROP_FPS)?)
    }

    fn release(&mut self) -> Result<(), Error> {
        Ok(self.cam.release()?)
    }
}
