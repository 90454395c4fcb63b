use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::dataset::{existing, label_from_path, list_images, Dataset, ImageCount, LabeledSample, Query};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegativePeopleConfig {
    pub base_path: PathBuf,
    pub sub_folder: String,
    /// Images available in every `set<N>` folder.
    pub images_per_folder: usize,
    pub n_images: usize,
    /// Number of `set<N>` folders used for the gallery; the next one holds the queries.
    pub n_test_dir: usize,
}

impl Default for NegativePeopleConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("../imagesIn/negativePeople_dataset/repeatedPeople"),
            sub_folder: String::from("set"),
            images_per_folder: 518,
            n_images: 50,
            n_test_dir: 9,
        }
    }
}

impl NegativePeopleConfig {
    pub fn new(n_images: usize, n_test_dir: usize) -> Self {
        Self {
            n_images,
            n_test_dir,
            ..Default::default()
        }
    }
}

/// The same people photographed in `set0 .. set9`, one file per identity
/// named after its label (`0007.jpg`).
pub struct NegativePeopleDataset {
    config: NegativePeopleConfig,
    count: ImageCount,
    rng: StdRng,
}

impl NegativePeopleDataset {
    pub fn new(config: NegativePeopleConfig) -> Result<Self, Error> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: NegativePeopleConfig, seed: u64) -> Result<Self, Error> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: NegativePeopleConfig, rng: StdRng) -> Result<Self, Error> {
        if config.n_test_dir == 0 {
            return Err(Error::InvalidConfig("n_test_dir must be at least 1".into()));
        }

        let count = ImageCount::clamp(config.n_images, config.images_per_folder.saturating_mul(config.n_test_dir));

        Ok(Self { config, count, rng })
    }

    #[inline]
    pub fn config(&self) -> &NegativePeopleConfig {
        &self.config
    }

    /// Images taken from every gallery folder.
    #[inline]
    pub fn images_per_set(&self) -> usize {
        self.count.effective / self.config.n_test_dir
    }

    fn set_path(&self, idx: usize) -> PathBuf {
        self.config.base_path.join(format!("{}{}", self.config.sub_folder, idx))
    }

    fn labels_and_paths_from_folder(&self, idx: usize, n_images: usize) -> Result<Vec<LabeledSample>, Error> {
        list_images(self.set_path(idx))?
            .into_iter()
            .take(n_images)
            .map(|path| Ok(LabeledSample::new(label_from_path(&path)?, path)))
            .collect()
    }
}

impl Dataset for NegativePeopleDataset {
    #[inline]
    fn image_count(&self) -> ImageCount {
        self.count
    }

    fn labels_and_paths(&mut self) -> Result<Vec<LabeledSample>, Error> {
        let per_set = self.images_per_set();
        let mut samples = Vec::with_capacity(per_set * self.config.n_test_dir);

        for idx in 0..self.config.n_test_dir {
            samples.extend(self.labels_and_paths_from_folder(idx, per_set)?);
        }

        let labels: Vec<_> = samples.iter().take(per_set).map(|s| s.label).collect();
        tracing::info!(per_set, ?labels, "added images for each person");

        Ok(samples)
    }

    fn query(&mut self, query_num: Option<usize>) -> Result<Query, Error> {
        let query_set = self.set_path(self.config.n_test_dir);

        let query = match query_num {
            Some(index) => Query {
                index,
                label: index as i32,
                path: existing(query_set.join(format!("{:04}.jpg", index))),
            },
            None => {
                let index = self.rng.gen_range(0..=self.images_per_set());

                match list_images(&query_set)?.into_iter().nth(index) {
                    Some(path) => Query {
                        index,
                        label: label_from_path(&path)?,
                        path: existing(path),
                    },
                    None => Query { index, label: index as i32, path: None },
                }
            }
        };

        tracing::info!(index = query.index, label = query.label, path = ?query.path, "generated query");
        Ok(query)
    }
}

#[test]
fn clamps_to_folder_capacity() {
    let ds = NegativePeopleDataset::new(NegativePeopleConfig::new(10_000, 9)).unwrap();

    assert!(ds.image_count().is_clamped());
    assert_eq!(ds.image_count().effective, 518 * 9);
    assert_eq!(ds.images_per_set(), 518);
}

#[test]
fn huge_folder_capacity_saturates() {
    let config: NegativePeopleConfig = crate::config::from_json_str(&format!(
        r#"{{"images_per_folder": {}, "n_images": 5, "n_test_dir": 2}}"#,
        usize::MAX
    ))
    .unwrap();
    let ds = NegativePeopleDataset::new(config).unwrap();

    assert!(!ds.image_count().is_clamped());
    assert_eq!(ds.image_count().effective, 5);
    assert_eq!(ds.images_per_set(), 2);
}

#[test]
fn zero_test_dirs_is_rejected() {
    assert!(matches!(
        NegativePeopleDataset::new(NegativePeopleConfig::new(9, 0)),
        Err(Error::InvalidConfig(_))
    ));
}
