//! Builder for creating Detection objects from various input formats.

use crate::tracker::{BoundingBox, Detection};

/// Builder for creating `Detection` objects from various box formats.
#[derive(Debug, Clone)]
pub struct DetectionBuilder {
    frame_number: u64,
    bbox: BoundingBox,
    confidence: f32,
    class_id: u32,
    class_name: String,
}

impl Default for DetectionBuilder {
    fn default() -> Self {
        Self {
            frame_number: 0,
            bbox: BoundingBox::default(),
            confidence: 0.0,
            // COCO "car"
            class_id: 2,
            class_name: "car".to_string(),
        }
    }
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frame the detection belongs to.
    pub fn frame(mut self, frame_number: u64) -> Self {
        self.frame_number = frame_number;
        self
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        self.bbox = BoundingBox::new(x1, y1, x2, y2);
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: i32, cy: i32, w: i32, h: i32) -> Self {
        self.bbox = BoundingBox::from_xywh(cx, cy, w, h);
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, l: i32, t: i32, w: i32, h: i32) -> Self {
        self.bbox = BoundingBox::from_tlwh(l, t, w, h);
        self
    }

    /// Set the confidence score.
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the detector class.
    pub fn class(mut self, class_id: u32, class_name: impl Into<String>) -> Self {
        self.class_id = class_id;
        self.class_name = class_name.into();
        self
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Detection {
        Detection::new(
            self.frame_number,
            self.bbox,
            self.confidence,
            self.class_id,
            self.class_name,
        )
    }
}
