use err_derive::Error;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum Error {
    #[error(display = "IO Error on {:?}: {}", path, source)]
    Io { path: PathBuf, source: std::io::Error },

    #[error(display = "Invalid config: {}", _0)]
    InvalidConfig(String),

    #[error(display = "Can not derive a label from {:?}", _0)]
    InvalidLabel(PathBuf),

    #[error(display = "Shape Error: {}", _0)]
    Shape(ndarray::ShapeError),

    #[error(display = "Unexpected network output: {}", _0)]
    UnexpectedOutput(String),

    #[error(display = "Class index {} is not in the names file", _0)]
    UnknownClass(usize),

    #[error(display = "Feature length mismatch: expected {}, found {}", expected, found)]
    FeatureLength { expected: usize, found: usize },

    #[error(display = "Capture Error: {}", _0)]
    Capture(String),

    #[error(display = "Json Error: {}", _0)]
    Json(serde_json::Error),

    #[cfg(feature = "opencv")]
    #[error(display = "OpenCV Error: {}", _0)]
    OpenCv(opencv::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

impl From<ndarray::ShapeError> for Error {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Shape(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

#[cfg(feature = "opencv")]
impl From<opencv::Error> for Error {
    fn from(err: opencv::Error) -> Self {
        Self::OpenCv(err)
    }
}
