use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::dataset::{list_images, Dataset, ImageCount, LabeledSample, Query};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreetPeopleConfig {
    pub base_path: PathBuf,
    pub gallery_dir: String,
    pub query_dir: String,
    pub capacity: usize,
    pub n_images: usize,
}

impl Default for StreetPeopleConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("../imagesIn/streetPeople_dataset"),
            gallery_dir: String::from("cam_a"),
            query_dir: String::from("cam_b"),
            capacity: 50,
            n_images: 20,
        }
    }
}

impl StreetPeopleConfig {
    pub fn new(n_images: usize) -> Self {
        Self {
            n_images,
            ..Default::default()
        }
    }
}

/// Two cameras watching the same street: `cam_a` is the gallery and
/// the n-th image of `cam_b` shows the same person as the n-th of `cam_a`.
pub struct StreetPeopleDataset {
    config: StreetPeopleConfig,
    count: ImageCount,
    rng: StdRng,
}

impl StreetPeopleDataset {
    pub fn new(config: StreetPeopleConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: StreetPeopleConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: StreetPeopleConfig, rng: StdRng) -> Self {
        let count = ImageCount::clamp(config.n_images, config.capacity);

        Self { config, count, rng }
    }

    #[inline]
    pub fn config(&self) -> &StreetPeopleConfig {
        &self.config
    }
}

impl Dataset for StreetPeopleDataset {
    #[inline]
    fn image_count(&self) -> ImageCount {
        self.count
    }

    fn labels_and_paths(&mut self) -> Result<Vec<LabeledSample>, Error> {
        let camera = self.config.base_path.join(&self.config.gallery_dir);

        Ok(list_images(camera)?
            .into_iter()
            .take(self.count.effective)
            .enumerate()
            .map(|(label, path)| LabeledSample::new(label as i32, path))
            .collect())
    }

    fn query(&mut self, query_num: Option<usize>) -> Result<Query, Error> {
        let camera = self.config.base_path.join(&self.config.query_dir);
        let index = match query_num {
            Some(index) => index,
            None => self.rng.gen_range(0..=self.count.effective),
        };

        let path = list_images(camera)?.into_iter().nth(index);
        if path.is_none() {
            tracing::warn!(index, "query image is missing");
        }

        Ok(Query { index, label: index as i32, path })
    }
}

#[test]
fn clamps_to_fifty() {
    let ds = StreetPeopleDataset::new(StreetPeopleConfig::new(120));

    assert_eq!(ds.image_count(), ImageCount { requested: 120, effective: 50 });
}
