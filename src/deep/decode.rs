//! Decoding of raw network outputs.
use ndarray::prelude::*;

use crate::bbox::{BBox, Ltwh};
use crate::deep::{Detection, FeatureLayout, FeatureVector, Names};
use crate::error::Error;

/// Index of the `[center_x, center_y, width, height, objectness]` prefix end
/// in a YOLO prediction row.
const YOLO_BOX_LEN: usize = 5;

/// `[batch, class, confidence, x1, y1, x2, y2]`
const SSD_ROW_LEN: usize = 7;

/// Views `output` as rows of its last dimension.
fn rows(output: &ArrayD<f32>, min_cols: usize) -> Result<ArrayView2<'_, f32>, Error> {
    let cols = output.shape().last().copied().unwrap_or(0);
    if cols < min_cols {
        return Err(Error::UnexpectedOutput(format!(
            "expected rows of at least {} values, got shape {:?}",
            min_cols,
            output.shape()
        )));
    }

    let nrows = output.len() / cols;
    Ok(output.view().into_shape((nrows, cols))?)
}

/// Turns the forward pass outputs of a classification network into a feature vector.
pub fn decode_features(outputs: &[ArrayD<f32>], layout: FeatureLayout) -> Result<FeatureVector, Error> {
    if outputs.is_empty() {
        return Err(Error::UnexpectedOutput("network returned no outputs".into()));
    }

    Ok(match layout {
        FeatureLayout::Flat => outputs[0].iter().copied().collect(),
        FeatureLayout::Rows => outputs
            .iter()
            .flat_map(|o| o.iter().copied())
            .collect(),
    })
}

/// Decodes multi-scale YOLO grids: rows of `[cx, cy, w, h, objectness, class scores...]`
/// with coordinates relative to the frame.
///
/// Candidates whose best class score is above `confidence_threshold` are
/// converted to pixel boxes and filtered by `suppress`, which returns the
/// indices to keep in output order (see `Network::suppress`).
pub fn decode_yolo<S>(
    outputs: &[ArrayD<f32>],
    frame_width: i32,
    frame_height: i32,
    confidence_threshold: f32,
    nms_threshold: f32,
    names: &Names,
    suppress: S,
) -> Result<Vec<Detection>, Error>
where
    S: FnOnce(&[BBox<Ltwh>], &[f32], f32, f32) -> Result<Vec<usize>, Error>,
{
    let (fw, fh) = (frame_width as f32, frame_height as f32);

    let mut boxes = vec![];
    let mut scores = vec![];
    let mut class_ids = vec![];

    for output in outputs {
        for pred in rows(output, YOLO_BOX_LEN + 1)?.outer_iter() {
            let classes = pred.slice(s![YOLO_BOX_LEN..]);

            let (class_id, &score) = classes
                .iter()
                .enumerate()
                .fold((0, &f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

            if score <= confidence_threshold {
                continue;
            }

            // Scaling is kept bit-compatible with the integer math of the
            // reference decoder, boundary rows included.
            let center_x = (pred[0] * fw) as i32;
            let center_y = (pred[1] * fh) as i32;
            let width = (pred[2] * fw) as i32;
            let height = (pred[3] * fh) as i32;
            let left = (center_x as f32 - width as f32 / 2.0) as i32;
            let top = (center_y as f32 - height as f32 / 2.0) as i32;

            boxes.push(BBox::ltwh(left as f32, top as f32, width as f32, height as f32));
            scores.push(score);
            class_ids.push(class_id);
        }
    }

    let keep = suppress(&boxes, &scores, confidence_threshold, nms_threshold)?;
    tracing::debug!(candidates = boxes.len(), kept = keep.len(), "yolo decoded");

    keep.into_iter()
        .map(|i| {
            if i >= boxes.len() {
                return Err(Error::UnexpectedOutput(format!("suppression kept unknown box {}", i)));
            }

            Ok(Detection {
                class_id: class_ids[i],
                label: names.get(class_ids[i])?.to_string(),
                confidence: scores[i],
                bbox: boxes[i].clone(),
            })
        })
        .collect()
}

/// Decodes the fixed detection slots of an SSD `DetectionOutput` layer:
/// rows of `[batch, class, confidence, x1, y1, x2, y2]` with corners relative
/// to the frame. Slots above `confidence_threshold` are kept in slot order.
pub fn decode_ssd(
    output: &ArrayD<f32>,
    frame_width: i32,
    frame_height: i32,
    confidence_threshold: f32,
    names: &Names,
) -> Result<Vec<Detection>, Error> {
    let (fw, fh) = (frame_width as f32, frame_height as f32);
    let mut detections = vec![];

    for slot in rows(output, SSD_ROW_LEN)?.outer_iter() {
        let confidence = slot[2];
        if confidence <= confidence_threshold {
            continue;
        }

        let class_id = slot[1] as usize;
        let start_x = (slot[3] * fw) as i32;
        let start_y = (slot[4] * fh) as i32;
        let end_x = (slot[5] * fw) as i32;
        let end_y = (slot[6] * fh) as i32;

        detections.push(Detection {
            class_id,
            label: names.get(class_id)?.to_string(),
            confidence,
            bbox: BBox::ltwh(
                start_x as f32,
                start_y as f32,
                (end_x - start_x) as f32,
                (end_y - start_y) as f32,
            ),
        });
    }

    Ok(detections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::iou;
    use crate::deep::nms_boxes;

    fn names() -> Names {
        vec!["person", "bicycle", "car"].into_iter().collect()
    }

    fn yolo_row(cx: f32, cy: f32, w: f32, h: f32, scores: [f32; 3]) -> Vec<f32> {
        let mut row = vec![cx, cy, w, h, 1.0];
        row.extend_from_slice(&scores);
        row
    }

    fn grid(rows: Vec<Vec<f32>>) -> ArrayD<f32> {
        let n = rows.len();
        let data: Vec<f32> = rows.into_iter().flatten().collect();
        let cols = data.len() / n;
        ArrayD::from_shape_vec(IxDyn(&[n, cols]), data).unwrap()
    }

    #[test]
    fn features_flat_and_rows() {
        let a = ArrayD::from_shape_vec(IxDyn(&[1, 2, 1, 1]), vec![1.0, 2.0]).unwrap();
        let b = ArrayD::from_shape_vec(IxDyn(&[1, 3]), vec![3.0, 4.0, 5.0]).unwrap();
        let outputs = vec![a, b];

        assert_eq!(decode_features(&outputs, FeatureLayout::Flat).unwrap(), arr1(&[1.0f32, 2.0]));
        assert_eq!(
            decode_features(&outputs, FeatureLayout::Rows).unwrap(),
            arr1(&[1.0f32, 2.0, 3.0, 4.0, 5.0])
        );
        assert!(decode_features(&[], FeatureLayout::Flat).is_err());
    }

    #[test]
    fn yolo_scales_and_thresholds() {
        let scale_a = grid(vec![
            yolo_row(0.5, 0.5, 0.2, 0.4, [0.1, 0.9, 0.0]),
            yolo_row(0.1, 0.1, 0.1, 0.1, [0.2, 0.1, 0.3]),
        ]);
        let scale_b = grid(vec![yolo_row(0.25, 0.75, 0.1, 0.2, [0.0, 0.0, 0.6])]);

        let dets = decode_yolo(&[scale_a, scale_b], 640, 480, 0.5, 0.3, &names(), nms_boxes).unwrap();

        assert_eq!(dets.len(), 2);

        assert_eq!(dets[0].label, "bicycle");
        assert_eq!(dets[0].class_id, 1);
        assert!((dets[0].confidence - 0.9).abs() < 1e-6);
        // center (320, 240), size (128, 192)
        assert_eq!(dets[0].bbox.to_array(), [256.0, 144.0, 128.0, 192.0]);

        assert_eq!(dets[1].label, "car");
        // center (160, 360), size (64, 96)
        assert_eq!(dets[1].bbox.to_array(), [128.0, 312.0, 64.0, 96.0]);
    }

    #[test]
    fn yolo_merges_duplicates_across_scales() {
        let scale_a = grid(vec![yolo_row(0.5, 0.5, 0.3, 0.3, [0.8, 0.0, 0.0])]);
        let scale_b = grid(vec![
            yolo_row(0.51, 0.5, 0.3, 0.3, [0.95, 0.0, 0.0]),
            yolo_row(0.9, 0.9, 0.05, 0.05, [0.7, 0.0, 0.0]),
        ]);

        let dets = decode_yolo(&[scale_a, scale_b], 100, 100, 0.5, 0.3, &names(), nms_boxes).unwrap();

        assert_eq!(dets.len(), 2);
        assert!((dets[0].confidence - 0.95).abs() < 1e-6);
        assert!(iou(&dets[0].bbox, &dets[1].bbox) <= 0.3);
    }

    #[test]
    fn yolo_rejects_short_rows() {
        let bad = ArrayD::zeros(IxDyn(&[3, 4]));
        assert!(matches!(
            decode_yolo(&[bad], 10, 10, 0.5, 0.3, &names(), nms_boxes),
            Err(Error::UnexpectedOutput(_))
        ));
    }

    #[test]
    fn yolo_unknown_class_is_an_error() {
        let out = grid(vec![vec![0.5, 0.5, 0.1, 0.1, 1.0, 0.0, 0.0, 0.0, 0.9]]);
        assert!(matches!(
            decode_yolo(&[out], 10, 10, 0.5, 0.3, &names(), nms_boxes),
            Err(Error::UnknownClass(3))
        ));
    }

    #[test]
    fn yolo_keeps_what_the_backend_suppression_returns() {
        let out = grid(vec![
            yolo_row(0.5, 0.5, 0.3, 0.3, [0.8, 0.0, 0.0]),
            yolo_row(0.5, 0.5, 0.3, 0.3, [0.0, 0.9, 0.0]),
        ]);

        let dets = decode_yolo(&[out.clone()], 100, 100, 0.5, 0.3, &names(), |boxes, scores, _, _| {
            assert_eq!(boxes.len(), 2);
            assert_eq!(scores.len(), 2);
            Ok(vec![0, 1])
        })
        .unwrap();
        assert_eq!(dets.iter().map(|d| d.class_id).collect::<Vec<_>>(), vec![0, 1]);

        assert!(matches!(
            decode_yolo(&[out], 100, 100, 0.5, 0.3, &names(), |_, _, _, _| Ok(vec![2])),
            Err(Error::UnexpectedOutput(_))
        ));
    }

    #[test]
    fn ssd_keeps_slots_in_order() {
        #[rustfmt::skip]
        let data = vec![
            0.0, 2.0, 0.30, 0.1, 0.1, 0.5, 0.5,
            0.0, 0.0, 0.95, 0.0, 0.0, 1.0, 1.0,
            0.0, 1.0, 0.10, 0.2, 0.2, 0.3, 0.3,
            0.0, 0.0, 0.50, 0.5, 0.25, 0.75, 1.0,
        ];
        let out = ArrayD::from_shape_vec(IxDyn(&[1, 1, 4, 7]), data).unwrap();

        let dets = decode_ssd(&out, 200, 100, 0.2, &names()).unwrap();

        assert_eq!(dets.len(), 3);
        assert_eq!(dets.iter().map(|d| d.class_id).collect::<Vec<_>>(), vec![2, 0, 0]);
        assert_eq!(dets[0].label, "car");
        assert_eq!(dets[0].bbox.to_array(), [20.0, 10.0, 80.0, 40.0]);
        assert_eq!(dets[1].bbox.to_array(), [0.0, 0.0, 200.0, 100.0]);
        assert_eq!(dets[2].bbox.to_array(), [100.0, 25.0, 50.0, 75.0]);
    }

    #[test]
    fn ssd_overlapping_slots_are_not_suppressed() {
        #[rustfmt::skip]
        let data = vec![
            0.0, 0.0, 0.9, 0.1, 0.1, 0.5, 0.5,
            0.0, 0.0, 0.8, 0.1, 0.1, 0.5, 0.5,
        ];
        let out = ArrayD::from_shape_vec(IxDyn(&[1, 1, 2, 7]), data).unwrap();

        assert_eq!(decode_ssd(&out, 100, 100, 0.5, &names()).unwrap().len(), 2);
    }
}
