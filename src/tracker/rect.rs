use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in integer pixel coordinates (TLBR format).
///
/// `x1 < x2` and `y1 < y2` are expected but not enforced; degenerate boxes
/// simply never overlap anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left x coordinate
    pub x1: i32,
    /// Top y coordinate
    pub y1: i32,
    /// Right x coordinate
    pub x2: i32,
    /// Bottom y coordinate
    pub y2: i32,
}

impl BoundingBox {
    #[inline]
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a box from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn from_tlwh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    /// Create a box from center coordinates and dimensions (XYWH format).
    #[inline]
    pub fn from_xywh(cx: i32, cy: i32, width: i32, height: i32) -> Self {
        let x1 = cx.saturating_sub(width / 2);
        let y1 = cy.saturating_sub(height / 2);
        Self::new(x1, y1, x1.saturating_add(width), y1.saturating_add(height))
    }

    /// Width in pixels. Computed in `i64` so extreme coordinates cannot overflow.
    #[inline]
    pub fn width(&self) -> i64 {
        self.x2 as i64 - self.x1 as i64
    }

    #[inline]
    pub fn height(&self) -> i64 {
        self.y2 as i64 - self.y1 as i64
    }

    /// Center x, rounded toward negative infinity.
    #[inline]
    pub fn center_x(&self) -> i32 {
        // The midpoint of two `i32` values always fits in `i32`.
        (self.x1 as i64 + self.x2 as i64).div_euclid(2) as i32
    }

    /// Center y, rounded toward negative infinity.
    #[inline]
    pub fn center_y(&self) -> i32 {
        (self.y1 as i64 + self.y2 as i64).div_euclid(2) as i32
    }

    /// Area in square pixels.
    #[inline]
    pub fn area(&self) -> i128 {
        self.width() as i128 * self.height() as i128
    }

    /// Whether the vertical line at `x` passes through the box.
    #[inline]
    pub fn intersects_x(&self, x: i32) -> bool {
        self.x1 <= x && x <= self.x2
    }

    /// Calculate Intersection over Union (IoU) with another bounding box.
    ///
    /// The intersection must have strictly positive width and height,
    /// otherwise the result is `0.0`. A zero union also yields `0.0`.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let inter_area = (x2 as i128 - x1 as i128) * (y2 as i128 - y1 as i128);
        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0 {
            (inter_area as f64 / union_area as f64) as f32
        } else {
            0.0
        }
    }
}

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// Returns a matrix of shape (M, N) where M is the length of `boxes_a`
/// and N is the length of `boxes_b`.
pub fn iou_batch(boxes_a: &[BoundingBox], boxes_b: &[BoundingBox]) -> Array2<f32> {
    let mut ious = Array2::zeros((boxes_a.len(), boxes_b.len()));
    for (i, a) in boxes_a.iter().enumerate() {
        for (j, b) in boxes_b.iter().enumerate() {
            ious[[i, j]] = a.iou(b);
        }
    }
    ious
}
