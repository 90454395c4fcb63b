use crate::bbox::{BBox, Ltwh};

///
/// A detected object in a single image.
///
/// class_id : index into the names file.
/// label : the class name.
/// confidence : f32 - Detector confidence score in `[0, 1]`.
/// bbox : BBox in pixels, format `(x, y, w, h)`.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_id: usize,
    pub label: String,
    pub confidence: f32,
    pub bbox: BBox<Ltwh>,
}
