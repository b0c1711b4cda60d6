//! Speed derivation from a pair of crossing frames.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Configuration;
use crate::error::MeasurementError;
use crate::tracker::TrackedObject;

const MS_TO_KMH: f64 = 3.6;

/// Speed of one track between the two reference lines.
///
/// A measurement returned by [`SpeedCalculator`] always has `is_valid` set,
/// with `frame_count > 0`, `time_seconds > 0` and `speed_kmh >= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedMeasurement {
    pub speed_kmh: f64,
    pub speed_ms: f64,
    pub frame_count: u64,
    pub time_seconds: f64,
    pub distance_meters: f64,
    pub left_crossing_frame: u64,
    pub right_crossing_frame: u64,
    pub track_id: u64,
    /// Mean detection confidence over the track
    pub confidence: f32,
    pub is_valid: bool,
}

/// Converts crossing frames into a constant-velocity speed estimate.
#[derive(Debug, Clone)]
pub struct SpeedCalculator {
    distance_meters: f64,
    fps: f64,
}

impl SpeedCalculator {
    pub fn new(config: &Configuration) -> Self {
        Self {
            distance_meters: config.distance_meters(),
            fps: config.fps,
        }
    }

    pub fn distance_meters(&self) -> f64 {
        self.distance_meters
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn calculate(
        &self,
        left_frame: u64,
        right_frame: u64,
        track_id: u64,
        confidence: f32,
    ) -> Result<SpeedMeasurement, MeasurementError> {
        if right_frame <= left_frame {
            return Err(MeasurementError::InvalidWindow {
                track_id,
                left_frame,
                right_frame,
            });
        }
        let frame_count = right_frame - left_frame;

        let time_seconds = frame_count as f64 / self.fps;
        if !(self.fps > 0.0) || !(time_seconds > 0.0) || !time_seconds.is_finite() {
            return Err(MeasurementError::NonPositiveTime {
                track_id,
                time_seconds,
            });
        }

        let speed_ms = self.distance_meters / time_seconds;
        let speed_kmh = speed_ms * MS_TO_KMH;

        info!(
            track_id,
            speed_kmh,
            speed_ms,
            frame_count,
            time_seconds,
            distance_meters = self.distance_meters,
            left_frame,
            right_frame,
            confidence,
            "Speed calculated"
        );

        Ok(SpeedMeasurement {
            speed_kmh,
            speed_ms,
            frame_count,
            time_seconds,
            distance_meters: self.distance_meters,
            left_crossing_frame: left_frame,
            right_crossing_frame: right_frame,
            track_id,
            confidence,
            is_valid: true,
        })
    }

    /// Measure a track that has crossed both lines, using the mean
    /// confidence of its detections.
    pub fn calculate_for_track(
        &self,
        track: &TrackedObject,
    ) -> Result<SpeedMeasurement, MeasurementError> {
        let (Some(left_frame), Some(right_frame)) =
            (track.left_crossing_frame(), track.right_crossing_frame())
        else {
            return Err(MeasurementError::Incomplete {
                track_id: track.track_id,
            });
        };
        self.calculate(left_frame, right_frame, track.track_id, track.mean_confidence())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::{CrossingEvent, LineSide};
    use crate::tracker::{BoundingBox, Detection};

    fn calculator() -> SpeedCalculator {
        SpeedCalculator::new(&Configuration::new(100, 500, 200.0, 30.0).unwrap())
    }

    fn crossing(track_id: u64, frame_number: u64, side: LineSide) -> CrossingEvent {
        CrossingEvent {
            track_id,
            frame_number,
            side,
            coordinate_value: 0,
            rightmost_x: 0,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_one_second_over_two_meters() {
        let m = calculator().calculate(0, 30, 1, 0.9).unwrap();
        assert_eq!(m.frame_count, 30);
        assert!((m.time_seconds - 1.0).abs() < 0.01);
        assert!((m.speed_ms - 2.0).abs() < 0.01);
        assert!((m.speed_kmh - 7.2).abs() < 0.01);
        assert!((m.distance_meters - 2.0).abs() < 1e-9);
        assert!(m.is_valid);
        assert_eq!(m.confidence, 0.9);
    }

    #[test]
    fn test_reversed_window_rejected() {
        let err = calculator().calculate(30, 0, 1, 0.9).unwrap_err();
        assert!(matches!(err, MeasurementError::InvalidWindow { .. }));
    }

    #[test]
    fn test_empty_window_rejected() {
        let err = calculator().calculate(10, 10, 1, 0.9).unwrap_err();
        assert_eq!(
            err,
            MeasurementError::InvalidWindow {
                track_id: 1,
                left_frame: 10,
                right_frame: 10
            }
        );
    }

    #[test]
    fn test_non_positive_fps_rejected() {
        // Bypass validation to exercise the time guard.
        let config = Configuration {
            left_coordinate: 100,
            right_coordinate: 500,
            distance_cm: 200.0,
            fps: 0.0,
            downsize_width: None,
        };
        let err = SpeedCalculator::new(&config).calculate(0, 30, 1, 0.9).unwrap_err();
        assert!(matches!(err, MeasurementError::NonPositiveTime { .. }));

        let negative = Configuration { fps: -30.0, ..config };
        let err = SpeedCalculator::new(&negative).calculate(0, 30, 1, 0.9).unwrap_err();
        assert!(matches!(err, MeasurementError::NonPositiveTime { .. }));
    }

    #[test]
    fn test_incomplete_track_rejected() {
        let mut track = TrackedObject::new(4);
        track.record_crossing(&crossing(4, 10, LineSide::Left));
        let err = calculator().calculate_for_track(&track).unwrap_err();
        assert_eq!(err, MeasurementError::Incomplete { track_id: 4 });
    }

    #[test]
    fn test_complete_track_uses_mean_confidence() {
        let mut track = TrackedObject::new(2);
        for (frame, confidence) in [(9, 0.6), (10, 0.8), (40, 1.0)] {
            track.add_detection(Detection::new(
                frame,
                BoundingBox::new(0, 0, 10, 10),
                confidence,
                2,
                "car",
            ));
        }
        track.record_crossing(&crossing(2, 10, LineSide::Left));
        track.record_crossing(&crossing(2, 40, LineSide::Right));

        let m = calculator().calculate_for_track(&track).unwrap();
        assert_eq!(m.track_id, 2);
        assert_eq!(m.frame_count, 30);
        assert!((m.confidence - 0.8).abs() < 1e-6);
        assert!((m.speed_kmh - 7.2).abs() < 0.01);
    }

    #[test]
    fn test_same_frame_crossings_rejected_for_track() {
        let mut track = TrackedObject::new(5);
        track.record_crossing(&crossing(5, 12, LineSide::Left));
        track.record_crossing(&crossing(5, 12, LineSide::Right));
        assert!(track.is_complete());
        let err = calculator().calculate_for_track(&track).unwrap_err();
        assert!(matches!(err, MeasurementError::InvalidWindow { .. }));
    }
}
