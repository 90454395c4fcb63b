pub mod bbox;
pub mod config;
pub mod dataset;
pub mod deep;
pub mod error;
pub mod gallery;
pub mod matching;
pub mod video;

pub use bbox::{BBox, Ltwh};
pub use dataset::{Dataset, LabeledSample, Query};
pub use deep::{Classifier, ClassifierConfig, Detection, Detector, DetectorConfig, Network};
pub use gallery::{Gallery, Match};
pub use matching::MetricKind;
pub use video::{Capture, LoadVideo, VideoSource};

use std::path::Path;

use error::Error;

/// Re-identification by feature similarity: gallery images of a dataset are
/// encoded once, queries are ranked against them.
pub struct Reid<N: Network> {
    classifier: Classifier<N>,
    metric: MetricKind,
    gallery: Gallery,
}

impl<N: Network> Reid<N> {
    pub fn new(classifier: Classifier<N>, metric: MetricKind) -> Self {
        Self {
            classifier,
            metric,
            gallery: Gallery::default(),
        }
    }

    #[inline]
    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    #[inline]
    pub fn classifier_mut(&mut self) -> &mut Classifier<N> {
        &mut self.classifier
    }

    /// Encodes the gallery of `dataset`, replacing the current one.
    /// `load` reads an image file for the network.
    pub fn enroll<D, L>(&mut self, dataset: &mut D, mut load: L) -> Result<usize, Error>
    where
        D: Dataset,
        L: FnMut(&Path) -> Result<N::Image, Error>,
    {
        let samples = dataset.labels_and_paths()?;
        let classifier = &mut self.classifier;

        self.gallery = Gallery::build(samples, |sample| {
            let image = load(&sample.path)?;
            classifier.feed(&image)
        })?;

        tracing::info!(images = self.gallery.len(), "gallery encoded");
        Ok(self.gallery.len())
    }

    /// Ranks the gallery against one image.
    pub fn identify(&mut self, image: &N::Image) -> Result<Vec<Match>, Error> {
        let feature = self.classifier.feed(image)?;

        self.gallery.rank(feature.view(), self.metric)
    }

    /// Picks a query from `dataset` and ranks the gallery against it.
    /// The ranking is `None` when the query image does not exist.
    pub fn query<D, L>(&mut self, dataset: &mut D, query_num: Option<usize>, mut load: L) -> Result<(Query, Option<Vec<Match>>), Error>
    where
        D: Dataset,
        L: FnMut(&Path) -> Result<N::Image, Error>,
    {
        let query = dataset.query(query_num)?;

        let ranking = match &query.path {
            Some(path) => Some(self.identify(&load(path)?)?),
            None => {
                tracing::warn!(index = query.index, "query image is missing");
                None
            }
        };

        Ok((query, ranking))
    }
}
