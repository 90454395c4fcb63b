use std::cmp::Ordering;

use crate::bbox::{iou, BBox, Ltwh};
use crate::error::Error;

/// Greedy non-max suppression.
///
/// Boxes scoring above `score_threshold` are visited from the highest score
/// down (ties keep input order); a box is kept unless its IoU with an already
/// kept box exceeds `nms_threshold`. Returns the kept indices, best first.
pub fn nms_boxes(
    boxes: &[BBox<Ltwh>],
    scores: &[f32],
    score_threshold: f32,
    nms_threshold: f32,
) -> Result<Vec<usize>, Error> {
    if boxes.len() != scores.len() {
        return Err(Error::UnexpectedOutput(format!(
            "{} boxes but {} scores",
            boxes.len(),
            scores.len()
        )));
    }

    let mut order: Vec<usize> = (0..boxes.len())
        .filter(|&i| scores[i] > score_threshold)
        .collect();

    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

    let mut keep: Vec<usize> = Vec::with_capacity(order.len());
    for idx in order {
        if keep.iter().all(|&k| iou(&boxes[k], &boxes[idx]) <= nms_threshold) {
            keep.push(idx);
        }
    }

    Ok(keep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppresses_overlapping_lower_scores() {
        let boxes = vec![
            BBox::ltwh(0.0, 0.0, 100.0, 100.0),
            BBox::ltwh(5.0, 5.0, 100.0, 100.0),
            BBox::ltwh(300.0, 300.0, 50.0, 50.0),
        ];
        let scores = [0.8, 0.9, 0.7];

        assert_eq!(nms_boxes(&boxes, &scores, 0.5, 0.3).unwrap(), vec![1, 2]);
    }

    #[test]
    fn score_threshold_is_strict() {
        let boxes = vec![BBox::ltwh(0.0, 0.0, 10.0, 10.0)];

        assert!(nms_boxes(&boxes, &[0.5], 0.5, 0.3).unwrap().is_empty());
        assert_eq!(nms_boxes(&boxes, &[0.51], 0.5, 0.3).unwrap(), vec![0]);
    }

    #[test]
    fn ties_keep_input_order() {
        let boxes = vec![
            BBox::ltwh(0.0, 0.0, 10.0, 10.0),
            BBox::ltwh(0.0, 0.0, 10.0, 10.0),
        ];

        assert_eq!(nms_boxes(&boxes, &[0.9, 0.9], 0.0, 0.5).unwrap(), vec![0]);
    }

    #[test]
    fn kept_boxes_never_overlap_beyond_threshold() {
        let mut boxes = vec![];
        let mut scores = vec![];
        for i in 0..40 {
            let x = (i * 7 % 60) as f32;
            let y = (i * 13 % 45) as f32;
            boxes.push(BBox::ltwh(x, y, 30.0, 40.0));
            scores.push(0.3 + (i * 17 % 70) as f32 / 100.0);
        }

        let thr = 0.4;
        let keep = nms_boxes(&boxes, &scores, 0.0, thr).unwrap();

        assert!(!keep.is_empty());
        for (n, &a) in keep.iter().enumerate() {
            for &b in &keep[n + 1..] {
                assert!(iou(&boxes[a], &boxes[b]) <= thr);
            }
        }
        for w in keep.windows(2) {
            assert!(scores[w[0]] >= scores[w[1]]);
        }
    }

    #[test]
    fn mismatched_scores_are_an_error() {
        let boxes = vec![BBox::ltwh(0.0, 0.0, 10.0, 10.0)];

        assert!(matches!(
            nms_boxes(&boxes, &[0.9, 0.8], 0.5, 0.3),
            Err(Error::UnexpectedOutput(_))
        ));
    }
}
