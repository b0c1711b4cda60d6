//! IoU tracker: greedy overlap association against each track's latest box.

use tracing::debug;

use crate::measurement::CrossingEvent;
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::rect::{BoundingBox, iou_batch};
use crate::tracker::tracked_object::TrackedObject;

/// Configuration for the [`IouTracker`].
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Minimum IoU for a detection to continue an existing track
    pub iou_threshold: f32,
    /// Drop tracks whose last detection is more than this many frames old.
    /// `None` keeps every track for the lifetime of the tracker.
    pub max_inactive_frames: Option<u64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.3,
            max_inactive_frames: None,
        }
    }
}

pub struct IouTracker {
    /// Arena of tracks, kept sorted by ascending `track_id`.
    tracks: Vec<TrackedObject>,
    next_track_id: u64,
    config: TrackerConfig,
}

impl Default for IouTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl IouTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracks: Vec::new(),
            next_track_id: 1,
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Associate one frame's detections with existing tracks.
    ///
    /// Each detection is compared against the latest box of every track not
    /// yet matched in this frame; ties go to the lowest track ID. Unmatched
    /// detections start new tracks. Returns every track currently held,
    /// not only those touched by this frame.
    pub fn update(&mut self, detections: Vec<Detection>, frame_number: u64) -> &[TrackedObject] {
        if !detections.is_empty() {
            let track_rects: Vec<BoundingBox> = self
                .tracks
                .iter()
                .map(|t| t.latest().map(|d| d.bbox).unwrap_or_default())
                .collect();
            let det_rects: Vec<BoundingBox> = detections.iter().map(|d| d.bbox).collect();
            let ious = iou_batch(&det_rects, &track_rects);

            let AssignmentResult {
                matches,
                unmatched_detections,
                ..
            } = matching::greedy_assignment(&ious, self.config.iou_threshold);

            let mut slots: Vec<Option<Detection>> = detections.into_iter().map(Some).collect();

            for (idet, itrack) in matches {
                if let Some(det) = slots[idet].take() {
                    self.tracks[itrack].add_detection(det);
                }
            }

            for idet in unmatched_detections {
                if let Some(det) = slots[idet].take() {
                    let track_id = self.next_track_id;
                    self.next_track_id += 1;
                    debug!(
                        track_id,
                        frame_number,
                        x1 = det.bbox.x1,
                        y1 = det.bbox.y1,
                        x2 = det.bbox.x2,
                        y2 = det.bbox.y2,
                        "New track created"
                    );
                    let mut track = TrackedObject::new(track_id);
                    track.add_detection(det);
                    // IDs increase monotonically, so pushing keeps the arena sorted.
                    self.tracks.push(track);
                }
            }
        }

        if let Some(max_inactive) = self.config.max_inactive_frames {
            self.evict_inactive(frame_number, max_inactive);
        }

        &self.tracks
    }

    fn evict_inactive(&mut self, frame_number: u64, max_inactive: u64) {
        let before = self.tracks.len();
        self.tracks.retain(|t| {
            t.last_frame()
                .is_some_and(|last| frame_number.saturating_sub(last) <= max_inactive)
        });
        let evicted = before - self.tracks.len();
        if evicted > 0 {
            debug!(frame_number, evicted, "Evicted inactive tracks");
        }
    }

    /// All tracks currently held, ordered by `track_id`.
    pub fn tracks(&self) -> &[TrackedObject] {
        &self.tracks
    }

    pub fn get(&self, track_id: u64) -> Option<&TrackedObject> {
        self.index_of(track_id).map(|i| &self.tracks[i])
    }

    /// Apply a crossing event to the track it belongs to.
    ///
    /// Returns `false` if the track is unknown or the side was already
    /// recorded (or is out of order).
    pub fn record_crossing(&mut self, event: &CrossingEvent) -> bool {
        match self.index_of(event.track_id) {
            Some(i) => self.tracks[i].record_crossing(event),
            None => false,
        }
    }

    /// ID that the next new track will receive.
    pub fn next_track_id(&self) -> u64 {
        self.next_track_id
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn index_of(&self, track_id: u64) -> Option<usize> {
        self.tracks
            .binary_search_by_key(&track_id, |t| t.track_id)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::LineSide;

    fn det(frame: u64, x1: i32, y1: i32, x2: i32, y2: i32) -> Detection {
        Detection::new(frame, BoundingBox::new(x1, y1, x2, y2), 0.9, 2, "car")
    }

    #[test]
    fn test_first_frame_creates_tracks() {
        let mut tracker = IouTracker::default();
        let tracks = tracker.update(
            vec![det(0, 0, 0, 100, 100), det(0, 300, 0, 400, 100)],
            0,
        );
        let ids: Vec<u64> = tracks.iter().map(|t| t.track_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_empty_frame_keeps_tracks() {
        let mut tracker = IouTracker::default();
        tracker.update(vec![det(0, 0, 0, 100, 100)], 0);
        let tracks = tracker.update(vec![], 1);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].detections().len(), 1);
        assert_eq!(tracker.next_track_id(), 2);
    }

    #[test]
    fn test_matches_latest_box_only() {
        let mut tracker = IouTracker::default();
        tracker.update(vec![det(0, 0, 0, 100, 100)], 0);
        tracker.update(vec![det(1, 40, 0, 140, 100)], 1);
        // Overlaps the first box well but not the latest one.
        let tracks = tracker.update(vec![det(2, -30, 0, 70, 100)], 2);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].detections().len(), 2);
        assert_eq!(tracks[1].track_id, 2);
    }

    #[test]
    fn test_one_detection_per_track_per_frame() {
        let mut tracker = IouTracker::default();
        tracker.update(vec![det(0, 0, 0, 100, 100)], 0);
        let tracks = tracker.update(
            vec![det(1, 0, 0, 100, 100), det(1, 2, 0, 102, 100)],
            1,
        );
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].detections().len(), 2);
        assert_eq!(tracks[1].detections().len(), 1);
    }

    #[test]
    fn test_tie_goes_to_lowest_track_id() {
        let mut tracker = IouTracker::default();
        // Two identical boxes become two tracks on the first frame.
        tracker.update(vec![det(0, 0, 0, 100, 100), det(0, 0, 0, 100, 100)], 0);
        let tracks = tracker.update(vec![det(1, 0, 0, 100, 100)], 1);
        assert_eq!(tracks[0].last_frame(), Some(1));
        assert_eq!(tracks[1].last_frame(), Some(0));
    }

    #[test]
    fn test_degenerate_box_never_matches() {
        let mut tracker = IouTracker::default();
        tracker.update(vec![det(0, 10, 10, 10, 10)], 0);
        let tracks = tracker.update(vec![det(1, 10, 10, 10, 10)], 1);
        assert_eq!(tracks.len(), 2);
    }

    #[test]
    fn test_extreme_boxes_match() {
        let mut tracker = IouTracker::default();
        tracker.update(vec![det(0, -2_000_000_000, 0, 2_000_000_000, 10)], 0);
        let tracks = tracker.update(vec![det(1, -1_999_999_000, 0, 2_000_000_010, 10)], 1);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].detections().len(), 2);
    }

    #[test]
    fn test_eviction() {
        let mut tracker = IouTracker::new(TrackerConfig {
            max_inactive_frames: Some(2),
            ..Default::default()
        });
        tracker.update(vec![det(0, 0, 0, 100, 100)], 0);
        tracker.update(vec![det(1, 500, 0, 600, 100)], 1);
        assert_eq!(tracker.update(vec![], 2).len(), 2);
        let tracks = tracker.update(vec![], 3);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].track_id, 2);
        assert!(tracker.get(1).is_none());
        // Evicted IDs are never reused.
        tracker.update(vec![det(4, 900, 0, 1000, 100)], 4);
        assert!(tracker.get(3).is_some());
    }

    #[test]
    fn test_record_crossing_unknown_track() {
        let mut tracker = IouTracker::default();
        let event = CrossingEvent {
            track_id: 42,
            frame_number: 0,
            side: LineSide::Left,
            coordinate_value: 100,
            rightmost_x: 120,
            confidence: 0.9,
        };
        assert!(!tracker.record_crossing(&event));
    }
}
