pub mod fps;
pub mod buffered;
#[cfg(feature = "opencv")]
pub mod opencv;

pub use buffered::BufferedCapture;
pub use fps::Fps;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Where frames come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    Camera(i32),
    File(PathBuf),
}

impl VideoSource {
    /// A purely numeric source selects a camera, `"-1"` meaning the default
    /// one; anything else is a file path. A camera index too large for the
    /// capture backend is an `InvalidConfig` error.
    pub fn parse(source: &str) -> Result<Self, Error> {
        if source == "-1" {
            return Ok(VideoSource::Camera(0));
        }

        if !source.is_empty() && source.bytes().all(|b| b.is_ascii_digit()) {
            return source
                .parse()
                .map(VideoSource::Camera)
                .map_err(|_| Error::InvalidConfig(format!("camera index {} is out of range", source)));
        }

        Ok(VideoSource::File(PathBuf::from(source)))
    }

    #[inline]
    pub fn is_realtime(&self) -> bool {
        matches!(self, VideoSource::Camera(_))
    }
}

/// A stream of frames from a camera or a video file.
pub trait Capture: Sized {
    type Frame;

    fn open(source: &VideoSource) -> Result<Self, Error>;

    /// Next frame, `None` at the end of the stream.
    fn read(&mut self) -> Result<Option<Self::Frame>, Error>;

    /// Nominal frame rate reported by the source.
    fn source_fps(&self) -> Result<f64, Error>;

    fn release(&mut self) -> Result<(), Error>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Pause after opening a camera.
    pub warm_up: Duration,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            warm_up: Duration::from_secs(1),
        }
    }
}

/// Reads frames from a webcam or a video file and measures the reading rate.
///
/// The underlying stream is released on drop.
pub struct LoadVideo<C: Capture> {
    source: VideoSource,
    stream: Option<C>,
    fps: Option<Fps>,
}

impl<C: Capture> LoadVideo<C> {
    pub fn open(source: &str, config: &VideoConfig) -> Result<Self, Error> {
        let source = VideoSource::parse(source)?;

        let stream = match &source {
            VideoSource::Camera(index) => {
                tracing::debug!(index, "opening camera");
                let stream = C::open(&source)?;
                std::thread::sleep(config.warm_up);
                Some(stream)
            }
            VideoSource::File(path) if path.exists() => Some(C::open(&source)?),
            VideoSource::File(path) => {
                tracing::warn!(?path, "missing source file");
                None
            }
        };

        Ok(Self {
            source,
            stream,
            fps: None,
        })
    }

    #[inline]
    pub fn source(&self) -> &VideoSource {
        &self.source
    }

    #[inline]
    pub fn is_realtime(&self) -> bool {
        self.source.is_realtime()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Returns the next frame. The first call starts the fps counter.
    pub fn read(&mut self) -> Result<Option<C::Frame>, Error> {
        match &mut self.fps {
            None => self.fps = Some(Fps::start()),
            Some(fps) => fps.update(),
        }

        match &mut self.stream {
            Some(stream) => stream.read(),
            None => Ok(None),
        }
    }

    /// Restarts the fps counter.
    pub fn fps_start(&mut self) {
        self.fps = Some(Fps::start());
    }

    /// Stops the counter and returns the reading rate.
    pub fn fps(&mut self) -> f64 {
        match &mut self.fps {
            Some(fps) => {
                fps.stop();
                fps.fps()
            }
            None => {
                tracing::warn!("fps calculator not initialized");
                0.0
            }
        }
    }

    /// Frame rate of the source itself, `None` without a stream.
    pub fn source_fps(&self) -> Result<Option<f64>, Error> {
        self.stream.as_ref().map(|s| s.source_fps()).transpose()
    }

    pub fn release(&mut self) -> Result<(), Error> {
        match self.stream.take() {
            Some(mut stream) => stream.release(),
            None => Ok(()),
        }
    }
}

impl<C: Capture> Drop for LoadVideo<C> {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            tracing::warn!(%err, "failed to release video source");
        }
    }
}
