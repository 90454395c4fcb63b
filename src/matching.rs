use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

/// Compute pair-wise squared distance between points in `a` and `b`.
///
/// Parameters
/// ----------
/// a : An NxM matrix of N samples of dimensionality M.
/// b : An LxM matrix of L samples of dimensionality M.
///
/// Returns
/// -------
/// A matrix of size len(a), len(b) such that element (i, j)
/// contains the squared distance between `a[i]` and `b[j]`.
///
pub fn pdist(a: ArrayView2<'_, f32>, b: ArrayView2<'_, f32>) -> Array2<f32> {
    if a.is_empty() || b.is_empty() {
        return Array2::zeros((a.nrows(), b.nrows()));
    }

    let (a2, b2) = (
        (&a * &a).sum_axis(Axis(1)).insert_axis(Axis(1)),
        (&b * &b).sum_axis(Axis(1)).insert_axis(Axis(0))
    );

    let mut r2 = -2.0 * a.dot(&b.t()) + a2 + b2;

    r2.mapv_inplace(|x| if x < 0.0 {
        0.0
    } else {
        x
    });

    r2
}

/// Compute pair-wise cosine distance between points in `a` and `b`.
///
/// Parameters
/// ----------
/// a : An NxM matrix of N samples of dimensionality M.
/// b : An LxM matrix of L samples of dimensionality M.
/// data_is_normalized : If true, assumes rows in a and b are unit length vectors.
///     Otherwise, a and b are explicitly normalized to length 1.
///
/// Returns
/// -------
/// A matrix of size len(a), len(b) such that element (i, j)
/// contains `1 - cos(a[i], b[j])`. Zero rows are left unnormalized.
///
pub fn cosine_distance(a: ArrayView2<'_, f32>, b: ArrayView2<'_, f32>, data_is_normalized: bool) -> Array2<f32> {
    if data_is_normalized {
        -a.dot(&b.t()) + 1.0
    } else {
        let norm = |x: ArrayView1<'_, f32>| {
            let len = x.fold(0.0, |a, x| a + x * x).sqrt();
            if len > 0.0 { len } else { 1.0 }
        };
        let length_a = a.map_axis(Axis(1), norm);
        let length_b = b.map_axis(Axis(1), norm);

        let a = &a / &length_a.insert_axis(Axis(1));
        let b = &b / &length_b.insert_axis(Axis(1));

        -a.dot(&b.t()) + 1.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKind {
    Euclidean,
    Cosine,
}

impl MetricKind {
    /// Distance matrix of shape len(a), len(b).
    pub fn distance(&self, a: ArrayView2<'_, f32>, b: ArrayView2<'_, f32>) -> Array2<f32> {
        match self {
            MetricKind::Euclidean => pdist(a, b).mapv_into(f32::sqrt),
            MetricKind::Cosine => cosine_distance(a, b, false),
        }
    }
}

#[test]
fn cosine_distance_test() {
    let d = cosine_distance(aview2(&[[1.0f32, 0.0], [0.0, 2.0]]), aview2(&[[3.0, 0.0]]), false);

    assert_eq!(d.shape(), &[2, 1]);
    assert!(d[[0, 0]].abs() < 1e-6);
    assert!((d[[1, 0]] - 1.0).abs() < 1e-6);
}

#[test]
fn pdist_test() {
    let d = pdist(aview2(&[[0.0f32, 0.0], [1.0, 1.0]]), aview2(&[[3.0, 4.0]]));

    assert!((d[[0, 0]] - 25.0).abs() < 1e-4);
    assert!((d[[1, 0]] - 13.0).abs() < 1e-4);
    assert!((MetricKind::Euclidean.distance(d.view(), d.view())[[0, 0]]).abs() < 1e-4);
}

#[test]
fn empty_inputs() {
    let a = Array2::<f32>::zeros((0, 4));
    let b = Array2::<f32>::zeros((3, 4));

    assert_eq!(pdist(a.view(), b.view()).shape(), &[0, 3]);
}
