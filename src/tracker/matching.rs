//! Detection records and frame-to-frame association.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::tracker::rect::BoundingBox;

/// A single object detection in one frame, as produced by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Frame the detection belongs to
    pub frame_number: u64,
    /// Bounding box in TLBR format (x1, y1, x2, y2)
    pub bbox: BoundingBox,
    /// Detection confidence score in `[0, 1]`
    pub confidence: f32,
    /// Detector class ID
    pub class_id: u32,
    /// Detector class name, e.g. `"car"`
    pub class_name: String,
}

impl Detection {
    pub fn new(
        frame_number: u64,
        bbox: BoundingBox,
        confidence: f32,
        class_id: u32,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            frame_number,
            bbox,
            confidence,
            class_id,
            class_name: class_name.into(),
        }
    }

    /// Rightmost edge of the box, the signal used for line crossing.
    #[inline]
    pub fn rightmost_x(&self) -> i32 {
        self.bbox.x2
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentResult {
    /// `(detection index, track column)` pairs
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Greedy per-detection best-match over an IoU matrix of shape
/// (detections, tracks).
///
/// Rows are visited in order. Each row claims the unclaimed column with the
/// highest IoU, provided that IoU is positive and at least `thresh`. Ties go
/// to the lowest column index.
pub fn greedy_assignment(ious: &Array2<f32>, thresh: f32) -> AssignmentResult {
    let (num_rows, num_cols) = ious.dim();

    let mut matches = Vec::new();
    let mut unmatched_detections = Vec::new();
    let mut claimed = vec![false; num_cols];

    for row in 0..num_rows {
        let mut best: Option<(usize, f32)> = None;
        for col in 0..num_cols {
            if claimed[col] {
                continue;
            }
            let iou = ious[[row, col]];
            if iou <= 0.0 || iou < thresh {
                continue;
            }
            if best.is_none_or(|(_, best_iou)| iou > best_iou) {
                best = Some((col, iou));
            }
        }

        match best {
            Some((col, _)) => {
                claimed[col] = true;
                matches.push((row, col));
            }
            None => unmatched_detections.push(row),
        }
    }

    let unmatched_tracks = claimed
        .iter()
        .enumerate()
        .filter_map(|(i, &c)| if c { None } else { Some(i) })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_empty_tracks() {
        let ious = Array2::<f32>::zeros((2, 0));
        let result = greedy_assignment(&ious, 0.3);
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_detections, vec![0, 1]);
    }

    #[test]
    fn test_picks_best_column() {
        let ious = array![[0.4, 0.9, 0.5]];
        let result = greedy_assignment(&ious, 0.3);
        assert_eq!(result.matches, vec![(0, 1)]);
        assert_eq!(result.unmatched_tracks, vec![0, 2]);
    }

    #[test]
    fn test_below_threshold_unmatched() {
        let ious = array![[0.2, 0.29]];
        let result = greedy_assignment(&ious, 0.3);
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_detections, vec![0]);
    }

    #[test]
    fn test_first_row_locks_column() {
        // Both detections prefer column 0; the first one claims it.
        let ious = array![[0.6, 0.0], [0.9, 0.4]];
        let result = greedy_assignment(&ious, 0.3);
        assert_eq!(result.matches, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_tie_goes_to_lowest_column() {
        let ious = array![[0.5, 0.5]];
        let result = greedy_assignment(&ious, 0.3);
        assert_eq!(result.matches, vec![(0, 0)]);
    }

    #[test]
    fn test_zero_iou_never_matches() {
        let ious = array![[0.0]];
        let result = greedy_assignment(&ious, 0.0);
        assert!(result.matches.is_empty());
    }
}
