use core::marker::PhantomData;

pub trait BBoxFormat: std::fmt::Debug {}

/// `(left, top, width, height)`
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ltwh;
impl BBoxFormat for Ltwh {}

/// `(left, top, right, bottom)`
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ltrb;
impl BBoxFormat for Ltrb {}

#[derive(Debug, Clone, PartialEq)]
pub struct BBox<F: BBoxFormat>([f32; 4], PhantomData<F>);

impl<F: BBoxFormat> BBox<F> {
    #[inline]
    pub fn to_array(&self) -> [f32; 4] {
        self.0
    }
}

impl BBox<Ltwh> {
    #[inline]
    pub fn ltwh(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox([x1, x2, x3, x4], Default::default())
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.0[3]
    }

    #[inline(always)]
    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    #[inline]
    pub fn as_ltrb(&self) -> BBox<Ltrb> {
        self.into()
    }
}

impl BBox<Ltrb> {
    #[inline]
    pub fn ltrb(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox([x1, x2, x3, x4], Default::default())
    }

    #[inline]
    pub fn as_ltwh(&self) -> BBox<Ltwh> {
        self.into()
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.0[3]
    }
}

impl<'a> From<&'a BBox<Ltwh>> for BBox<Ltrb> {
    #[inline]
    fn from(v: &'a BBox<Ltwh>) -> Self {
        Self([
            v.0[0],
            v.0[1],
            v.0[2] + v.0[0],
            v.0[3] + v.0[1],
        ], Default::default())
    }
}

impl<'a> From<&'a BBox<Ltrb>> for BBox<Ltwh> {
    #[inline]
    fn from(v: &'a BBox<Ltrb>) -> Self {
        Self([
            v.0[0],
            v.0[1],
            v.0[2] - v.0[0],
            v.0[3] - v.0[1],
        ], Default::default())
    }
}

/// Intersection over union of two boxes, in `[0, 1]`.
///
/// Two empty boxes have an IoU of `0.0`.
pub fn iou(a: &BBox<Ltwh>, b: &BBox<Ltwh>) -> f32 {
    let b1 = a.as_ltrb();
    let b2 = b.as_ltrb();

    let i_xmin = b1.left().max(b2.left());
    let i_ymin = b1.top().max(b2.top());
    let i_xmax = b1.right().min(b2.right());
    let i_ymax = b1.bottom().min(b2.bottom());

    let intersection_area = (i_xmax - i_xmin).max(0.0) * (i_ymax - i_ymin).max(0.0);
    let union_area = a.area() + b.area() - intersection_area;

    if union_area <= 0.0 {
        0.0
    } else {
        intersection_area / union_area
    }
}

#[test]
fn iou_of_identical_boxes_is_one() {
    let b = BBox::ltwh(10.0, 10.0, 20.0, 40.0);
    assert!((iou(&b, &b) - 1.0).abs() < 1e-6);
}

#[test]
fn iou_of_disjoint_boxes_is_zero() {
    let a = BBox::ltwh(0.0, 0.0, 10.0, 10.0);
    let b = BBox::ltwh(20.0, 20.0, 10.0, 10.0);
    assert_eq!(iou(&a, &b), 0.0);
}

#[test]
fn iou_half_overlap() {
    let a = BBox::ltwh(0.0, 0.0, 10.0, 10.0);
    let b = BBox::ltwh(5.0, 0.0, 10.0, 10.0);

    // 50 / (100 + 100 - 50)
    let expected = 50.0 / 150.0;
    assert!((iou(&a, &b) - expected).abs() < 1e-6);
    assert_eq!(iou(&a, &b), iou(&b, &a));
}

#[test]
fn corner_conversion_roundtrip() {
    let l = BBox::ltwh(40.0, 35.0, 20.0, 10.0);
    let r = l.as_ltrb();
    assert_eq!(r.to_array(), [40.0, 35.0, 60.0, 45.0]);
    assert_eq!(r.as_ltwh(), l);
}
