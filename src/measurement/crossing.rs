//! Reference-line crossing detection.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Configuration;
use crate::tracker::TrackedObject;

/// Which reference line was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSide {
    Left,
    Right,
}

impl LineSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineSide::Left => "left",
            LineSide::Right => "right",
        }
    }
}

/// A track's rightmost edge traversed a reference line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossingEvent {
    pub track_id: u64,
    pub frame_number: u64,
    pub side: LineSide,
    /// Pixel x of the crossed line
    pub coordinate_value: i32,
    /// Rightmost edge (`x2`) of the box on the crossing frame
    pub rightmost_x: i32,
    /// Detection confidence on the crossing frame
    pub confidence: f32,
}

/// Detects left/right line crossings from a track's last two detections.
///
/// An event fires only on a transition: the previous detection's `x2` lies
/// strictly before the line and the current one at or past it. A track whose
/// first detection already sits past a line never gets credit for it.
///
/// The detector holds no per-track state. It reads the crossing frames
/// already recorded on the track and returns new events; the caller applies
/// them through [`IouTracker::record_crossing`](crate::tracker::IouTracker::record_crossing).
#[derive(Debug, Clone)]
pub struct CrossingDetector {
    left_coordinate: i32,
    right_coordinate: i32,
}

impl CrossingDetector {
    pub fn new(left_coordinate: i32, right_coordinate: i32) -> Self {
        Self {
            left_coordinate,
            right_coordinate,
        }
    }

    /// Build a detector from the (already scaled) configuration.
    pub fn from_config(config: &Configuration) -> Self {
        Self::new(config.left_coordinate, config.right_coordinate)
    }

    pub fn left_coordinate(&self) -> i32 {
        self.left_coordinate
    }

    pub fn right_coordinate(&self) -> i32 {
        self.right_coordinate
    }

    /// Events produced by the track's latest detection, at most one per side.
    ///
    /// The left line is checked first; the right line is only checked once
    /// the left one is (or has just been) crossed, so a single large step
    /// over both lines yields both events for the same frame.
    pub fn detect_crossings(&self, track: &TrackedObject, frame_number: u64) -> Vec<CrossingEvent> {
        let mut events = Vec::new();

        let (Some(previous), Some(current)) = (track.previous(), track.latest()) else {
            return events;
        };
        let prev_x = previous.rightmost_x();
        let curr_x = current.rightmost_x();

        let mut left_crossed = track.left_crossing_frame().is_some();

        if !left_crossed && prev_x < self.left_coordinate && curr_x >= self.left_coordinate {
            left_crossed = true;
            events.push(self.event(track, frame_number, LineSide::Left, curr_x, current.confidence));
        }

        if left_crossed
            && track.right_crossing_frame().is_none()
            && prev_x < self.right_coordinate
            && curr_x >= self.right_coordinate
        {
            events.push(self.event(track, frame_number, LineSide::Right, curr_x, current.confidence));
        }

        events
    }

    fn event(
        &self,
        track: &TrackedObject,
        frame_number: u64,
        side: LineSide,
        rightmost_x: i32,
        confidence: f32,
    ) -> CrossingEvent {
        let coordinate_value = match side {
            LineSide::Left => self.left_coordinate,
            LineSide::Right => self.right_coordinate,
        };
        info!(
            track_id = track.track_id,
            frame_number,
            side = side.as_str(),
            coordinate_value,
            rightmost_x,
            confidence,
            "Reference line crossed"
        );
        CrossingEvent {
            track_id: track.track_id,
            frame_number,
            side,
            coordinate_value,
            rightmost_x,
            confidence,
        }
    }
}
