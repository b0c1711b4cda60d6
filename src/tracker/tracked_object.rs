//! A single tracked identity and its detection history.

use crate::measurement::{CrossingEvent, LineSide};
use crate::tracker::matching::Detection;
use crate::tracker::track_state::CrossingPhase;

/// An object followed across frames.
///
/// Owned by [`IouTracker`](crate::tracker::IouTracker); detections are only
/// ever appended and crossing frames are written at most once.
#[derive(Debug, Clone)]
pub struct TrackedObject {
    /// Unique track identifier, starting at 1
    pub track_id: u64,
    detections: Vec<Detection>,
    first_frame: Option<u64>,
    last_frame: Option<u64>,
    left_crossing_frame: Option<u64>,
    right_crossing_frame: Option<u64>,
}

impl TrackedObject {
    pub fn new(track_id: u64) -> Self {
        Self {
            track_id,
            detections: Vec::new(),
            first_frame: None,
            last_frame: None,
            left_crossing_frame: None,
            right_crossing_frame: None,
        }
    }

    /// Append a detection to the history.
    pub fn add_detection(&mut self, detection: Detection) {
        if self.first_frame.is_none() {
            self.first_frame = Some(detection.frame_number);
        }
        self.last_frame = Some(detection.frame_number);
        self.detections.push(detection);
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Most recent detection.
    pub fn latest(&self) -> Option<&Detection> {
        self.detections.last()
    }

    /// Detection immediately before the most recent one in this track's own
    /// history, regardless of how many video frames lie between them.
    pub fn previous(&self) -> Option<&Detection> {
        self.detections.len().checked_sub(2).map(|i| &self.detections[i])
    }

    pub fn first_frame(&self) -> Option<u64> {
        self.first_frame
    }

    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    pub fn left_crossing_frame(&self) -> Option<u64> {
        self.left_crossing_frame
    }

    pub fn right_crossing_frame(&self) -> Option<u64> {
        self.right_crossing_frame
    }

    /// Whether both reference lines have been crossed.
    pub fn is_complete(&self) -> bool {
        self.left_crossing_frame.is_some() && self.right_crossing_frame.is_some()
    }

    pub fn phase(&self) -> CrossingPhase {
        match (self.left_crossing_frame, self.right_crossing_frame) {
            (Some(_), Some(_)) => CrossingPhase::Complete,
            (Some(_), None) => CrossingPhase::BetweenLines,
            _ => CrossingPhase::Approaching,
        }
    }

    /// Mean confidence over all detections, `0.0` for an empty history.
    pub fn mean_confidence(&self) -> f32 {
        if self.detections.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.detections.iter().map(|d| d.confidence).sum();
        sum / self.detections.len() as f32
    }

    /// Apply a crossing event.
    ///
    /// Crossing frames are write-once, and the right side is only accepted
    /// after the left side. Returns whether the event changed the track.
    pub(crate) fn record_crossing(&mut self, event: &CrossingEvent) -> bool {
        if event.track_id != self.track_id {
            return false;
        }
        match event.side {
            LineSide::Left if self.left_crossing_frame.is_none() => {
                self.left_crossing_frame = Some(event.frame_number);
                true
            }
            LineSide::Right
                if self.left_crossing_frame.is_some() && self.right_crossing_frame.is_none() =>
            {
                self.right_crossing_frame = Some(event.frame_number);
                true
            }
            _ => false,
        }
    }
}
