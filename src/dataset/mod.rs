pub mod paths;
pub mod negative_people;
pub mod street_people;
pub mod m100;

pub use paths::list_images;
pub use negative_people::{NegativePeopleConfig, NegativePeopleDataset};
pub use street_people::{StreetPeopleConfig, StreetPeopleDataset};
pub use m100::{M100Config, M100Dataset};

use std::path::{Path, PathBuf};
use crate::error::Error;

/// An image path together with the identity of the person on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledSample {
    pub label: i32,
    pub path: PathBuf,
}

impl LabeledSample {
    #[inline]
    pub fn new(label: i32, path: PathBuf) -> Self {
        Self { label, path }
    }
}

/// The image picked for a similarity lookup.
///
/// `path` is `None` when the selected image does not exist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub index: usize,
    pub label: i32,
    pub path: Option<PathBuf>,
}

/// Requested vs. effective number of images of a dataset.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ImageCount {
    pub requested: usize,
    pub effective: usize,
}

impl ImageCount {
    /// Clamps `requested` to `capacity`, logging a warning when it does.
    pub(crate) fn clamp(requested: usize, capacity: usize) -> Self {
        let effective = requested.min(capacity);
        if effective < requested {
            tracing::warn!(requested, effective, "not enough images in the dataset");
        }

        Self { requested, effective }
    }

    #[inline]
    pub fn is_clamped(&self) -> bool {
        self.effective < self.requested
    }
}

pub trait Dataset {
    /// How many gallery images this dataset was asked for and will produce.
    fn image_count(&self) -> ImageCount;

    /// Lists the gallery as `(label, path)` pairs.
    fn labels_and_paths(&mut self) -> Result<Vec<LabeledSample>, Error>;

    /// Picks the query image, either the `query_num`-th one or a random one.
    ///
    /// A missing image is reported through `Query::path == None`, never as an error.
    fn query(&mut self, query_num: Option<usize>) -> Result<Query, Error>;
}

/// Parses the identity encoded in a file name like `0042.jpg`.
pub(crate) fn label_from_path(path: &Path) -> Result<i32, Error> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::InvalidLabel(path.to_path_buf()))
}

/// `Some(path)` if the file exists.
pub(crate) fn existing(path: PathBuf) -> Option<PathBuf> {
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

#[test]
fn clamp_to_capacity() {
    let c = ImageCount::clamp(100, 50);
    assert_eq!(c.effective, 50);
    assert!(c.is_clamped());

    let c = ImageCount::clamp(20, 50);
    assert_eq!(c.effective, 20);
    assert!(!c.is_clamped());
}

#[test]
fn label_parsing() {
    assert_eq!(label_from_path(Path::new("a/set0/0042.jpg")).unwrap(), 42);
    assert!(matches!(
        label_from_path(Path::new("a/set0/person.jpg")),
        Err(Error::InvalidLabel(_))
    ));
}
