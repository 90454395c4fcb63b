use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::dataset::{list_images, Dataset, ImageCount, LabeledSample, Query};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct M100Config {
    pub base_path: PathBuf,
    pub total_images: usize,
    pub images_per_identity: usize,
    pub n_images: usize,
}

impl Default for M100Config {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("../imagesIn/100m_dataset"),
            total_images: 80,
            images_per_identity: 10,
            n_images: 20,
        }
    }
}

impl M100Config {
    pub fn new(n_images: usize) -> Self {
        Self {
            n_images,
            ..Default::default()
        }
    }
}

/// One flat folder of sprinters, `images_per_identity` consecutive images
/// per athlete.
pub struct M100Dataset {
    config: M100Config,
    count: ImageCount,
    pending_query: Option<usize>,
    rng: StdRng,
}

impl M100Dataset {
    pub fn new(config: M100Config) -> Result<Self, Error> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: M100Config, seed: u64) -> Result<Self, Error> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: M100Config, rng: StdRng) -> Result<Self, Error> {
        if config.total_images == 0 || config.images_per_identity == 0 {
            return Err(Error::InvalidConfig(
                "total_images and images_per_identity must be at least 1".into(),
            ));
        }

        // one image always stays out of the gallery for the query
        let count = ImageCount::clamp(config.n_images, config.total_images - 1);

        Ok(Self {
            config,
            count,
            pending_query: None,
            rng,
        })
    }

    #[inline]
    pub fn config(&self) -> &M100Config {
        &self.config
    }

    /// The image index held back by the last `labels_and_paths` call.
    #[inline]
    pub fn pending_query(&self) -> Option<usize> {
        self.pending_query
    }

    #[inline]
    fn identity(&self, index: usize) -> i32 {
        (index / self.config.images_per_identity) as i32
    }
}

impl Dataset for M100Dataset {
    #[inline]
    fn image_count(&self) -> ImageCount {
        self.count
    }

    fn labels_and_paths(&mut self) -> Result<Vec<LabeledSample>, Error> {
        let samples = rand::seq::index::sample(
            &mut self.rng,
            self.config.total_images,
            self.count.effective + 1,
        )
        .into_vec();

        self.pending_query = samples.first().copied();

        let images = list_images(&self.config.base_path)?;
        let mut labeled = Vec::with_capacity(self.count.effective);

        // TODO: identities are `index / images_per_identity`; check the last
        // image of every identity (9, 19, 29, ...) against the real folder order.
        for &index in &samples[1..] {
            match images.get(index) {
                Some(path) => {
                    let label = self.identity(index);
                    tracing::debug!(index, label, ?path, "sampled");
                    labeled.push(LabeledSample::new(label, path.clone()));
                }
                None => tracing::warn!(index, found = images.len(), "sampled image is missing"),
            }
        }

        Ok(labeled)
    }

    fn query(&mut self, query_num: Option<usize>) -> Result<Query, Error> {
        let index = match query_num.or(self.pending_query) {
            Some(index) => index,
            None => self.rng.gen_range(0..self.config.total_images),
        };

        let path = list_images(&self.config.base_path)?.into_iter().nth(index);
        let label = self.identity(index);

        tracing::info!(index, label, ?path, "query");
        Ok(Query { index, label, path })
    }
}

#[test]
fn keeps_one_image_for_the_query() {
    let ds = M100Dataset::new(M100Config::new(80)).unwrap();

    assert_eq!(ds.image_count().effective, 79);
    assert!(ds.image_count().is_clamped());
}
