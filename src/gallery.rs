use std::path::PathBuf;

use ndarray::prelude::*;

use crate::dataset::LabeledSample;
use crate::deep::FeatureVector;
use crate::error::Error;
use crate::matching::MetricKind;

/// A gallery image ranked against a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub label: i32,
    pub path: PathBuf,
    pub distance: f32,
}

/// Encoded gallery images, one feature row per sample.
#[derive(Debug, Clone)]
pub struct Gallery {
    samples: Vec<LabeledSample>,
    features: Array2<f32>,
}

impl Default for Gallery {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            features: Array2::zeros((0, 0)),
        }
    }
}

impl Gallery {
    /// Encodes every sample with `encode`.
    pub fn build<F>(samples: Vec<LabeledSample>, mut encode: F) -> Result<Self, Error>
    where
        F: FnMut(&LabeledSample) -> Result<FeatureVector, Error>,
    {
        let features = samples
            .iter()
            .map(|s| encode(s))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_features(samples, features)
    }

    /// All features must have the same length.
    pub fn from_features(samples: Vec<LabeledSample>, features: Vec<FeatureVector>) -> Result<Self, Error> {
        if samples.len() != features.len() {
            return Err(Error::InvalidConfig(format!(
                "{} gallery samples but {} features",
                samples.len(),
                features.len()
            )));
        }

        let dim = match features.first() {
            Some(f) => f.len(),
            None => return Ok(Self::default()),
        };

        if let Some(bad) = features.iter().find(|f| f.len() != dim) {
            return Err(Error::FeatureLength { expected: dim, found: bad.len() });
        }

        let mut matrix = Array2::zeros((features.len(), dim));
        for (mut row, feature) in matrix.outer_iter_mut().zip(features.iter()) {
            row.assign(feature);
        }

        Ok(Self { samples, features: matrix })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn samples(&self) -> &[LabeledSample] {
        &self.samples
    }

    #[inline]
    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    /// Gallery images sorted by increasing distance to `query`.
    pub fn rank(&self, query: ArrayView1<'_, f32>, kind: MetricKind) -> Result<Vec<Match>, Error> {
        if self.is_empty() {
            return Ok(vec![]);
        }

        if query.len() != self.features.ncols() {
            return Err(Error::FeatureLength {
                expected: self.features.ncols(),
                found: query.len(),
            });
        }

        let distances = kind.distance(query.insert_axis(Axis(0)), self.features.view());

        let mut matches: Vec<Match> = self.samples
            .iter()
            .zip(distances.row(0).iter())
            .map(|(s, &distance)| Match {
                label: s.label,
                path: s.path.clone(),
                distance,
            })
            .collect();

        matches.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));

        Ok(matches)
    }

    #[inline]
    pub fn nearest(&self, query: ArrayView1<'_, f32>, kind: MetricKind) -> Result<Option<Match>, Error> {
        Ok(self.rank(query, kind)?.into_iter().next())
    }

    /// 0-based position of the first gallery image labelled `label`
    /// in the ranking, as used for CMC rank-k accuracy.
    pub fn rank_of(&self, query: ArrayView1<'_, f32>, label: i32, kind: MetricKind) -> Result<Option<usize>, Error> {
        Ok(self.rank(query, kind)?.iter().position(|m| m.label == label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(label: i32) -> LabeledSample {
        LabeledSample::new(label, PathBuf::from(format!("{:04}.jpg", label)))
    }

    fn gallery() -> Gallery {
        Gallery::from_features(
            vec![sample(0), sample(1), sample(2)],
            vec![arr1(&[1.0, 0.0]), arr1(&[0.0, 1.0]), arr1(&[0.7, 0.7])],
        ).unwrap()
    }

    #[test]
    fn ranks_by_cosine_distance() {
        let g = gallery();
        let ranked = g.rank(aview1(&[0.1, 1.0]), MetricKind::Cosine).unwrap();

        let labels: Vec<_> = ranked.iter().map(|m| m.label).collect();
        assert_eq!(labels, vec![1, 2, 0]);
        assert_eq!(g.rank_of(aview1(&[0.1, 1.0]), 0, MetricKind::Cosine).unwrap(), Some(2));
    }

    #[test]
    fn ranks_by_euclidean_distance() {
        let g = gallery();
        let best = g.nearest(aview1(&[0.9, 0.1]), MetricKind::Euclidean).unwrap().unwrap();

        assert_eq!(best.label, 0);
        assert_eq!(best.path, PathBuf::from("0000.jpg"));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let res = Gallery::from_features(vec![sample(0), sample(1)], vec![arr1(&[1.0]), arr1(&[1.0, 2.0])]);
        assert!(matches!(res, Err(Error::FeatureLength { expected: 1, found: 2 })));

        let g = gallery();
        assert!(g.rank(aview1(&[1.0, 2.0, 3.0]), MetricKind::Cosine).is_err());
    }

    #[test]
    fn build_encodes_every_sample() {
        let g = Gallery::build(vec![sample(3), sample(4)], |s| Ok(arr1(&[s.label as f32, 1.0]))).unwrap();

        assert_eq!(g.len(), 2);
        assert_eq!(g.features(), aview2(&[[3.0f32, 1.0], [4.0, 1.0]]));
    }

    #[test]
    fn empty_gallery_ranks_nothing() {
        let g = Gallery::default();
        assert!(g.nearest(aview1(&[1.0]), MetricKind::Cosine).unwrap().is_none());
    }
}
