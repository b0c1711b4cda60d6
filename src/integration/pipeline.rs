//! Frame-by-frame glue: tracking, crossing detection and speed derivation.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Configuration;
use crate::error::{MeasurementError, PipelineError, ProcessError};
use crate::measurement::{CrossingDetector, CrossingEvent, LineSide, SpeedCalculator, SpeedMeasurement};
use crate::tracker::{Detection, IouTracker, TrackerConfig};

use super::DetectionSource;

/// A track that crossed both lines but produced no valid measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementFailure {
    pub track_id: u64,
    pub error: MeasurementError,
}

/// How a run ended, from the host's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// At least one valid speed measurement
    Measured,
    /// The detector never reported anything
    NoObjectDetected,
    /// Objects were seen but none yielded a valid measurement
    NoCompletedCrossing,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub measurements: Vec<SpeedMeasurement>,
    pub failures: Vec<MeasurementFailure>,
    /// Tracks that never crossed both lines
    pub incomplete_track_ids: Vec<u64>,
    pub frames_processed: u64,
    pub detections_count: u64,
}

impl PipelineReport {
    pub fn outcome(&self) -> Outcome {
        if !self.measurements.is_empty() {
            Outcome::Measured
        } else if self.detections_count == 0 {
            Outcome::NoObjectDetected
        } else {
            Outcome::NoCompletedCrossing
        }
    }

    /// Turn the two failure outcomes into errors.
    ///
    /// `NoCompletedCrossing` lists both incomplete tracks and tracks whose
    /// measurement failed, in ascending order.
    pub fn into_result(self) -> Result<Self, PipelineError> {
        match self.outcome() {
            Outcome::Measured => Ok(self),
            Outcome::NoObjectDetected => Err(PipelineError::NoObjectDetected),
            Outcome::NoCompletedCrossing => {
                let track_ids: BTreeSet<u64> = self
                    .incomplete_track_ids
                    .iter()
                    .copied()
                    .chain(self.failures.iter().map(|f| f.track_id))
                    .collect();
                Err(PipelineError::NoCompletedCrossing {
                    track_ids: track_ids.into_iter().collect(),
                })
            }
        }
    }
}

/// Tracking and measurement for a single video.
///
/// Frames must be fed in strictly increasing order. Gaps in frame numbers
/// are fine; a repeated or earlier frame number is rejected.
pub struct SpeedPipeline {
    tracker: IouTracker,
    crossing_detector: CrossingDetector,
    speed_calculator: SpeedCalculator,
    last_frame: Option<u64>,
    frames_processed: u64,
    detections_count: u64,
    seen_tracks: BTreeSet<u64>,
    measurements: Vec<SpeedMeasurement>,
    failures: Vec<MeasurementFailure>,
}

impl SpeedPipeline {
    /// `config` must already be in the pixel space of the detections (see
    /// [`Configuration::scaled_to_width`]).
    pub fn new(config: &Configuration, tracker_config: TrackerConfig) -> Self {
        Self {
            tracker: IouTracker::new(tracker_config),
            crossing_detector: CrossingDetector::from_config(config),
            speed_calculator: SpeedCalculator::new(config),
            last_frame: None,
            frames_processed: 0,
            detections_count: 0,
            seen_tracks: BTreeSet::new(),
            measurements: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn with_default_tracker(config: &Configuration) -> Self {
        Self::new(config, TrackerConfig::default())
    }

    /// Reject a frame number that does not advance past the last one.
    pub fn check_frame_order(&self, frame_number: u64) -> Result<(), PipelineError> {
        match self.last_frame {
            Some(previous) if frame_number <= previous => {
                warn!(previous, received = frame_number, "Out-of-order frame rejected");
                Err(PipelineError::OutOfOrderFrame {
                    previous,
                    received: frame_number,
                })
            }
            _ => Ok(()),
        }
    }

    /// Process one frame's detections and return the crossings it produced.
    ///
    /// Only tracks that received a detection in this frame are checked for
    /// crossings. A track completing both crossings is measured right away;
    /// a failed measurement is logged and kept for the report.
    pub fn process_detections(
        &mut self,
        frame_number: u64,
        detections: Vec<Detection>,
    ) -> Result<Vec<CrossingEvent>, PipelineError> {
        self.check_frame_order(frame_number)?;
        self.last_frame = Some(frame_number);
        self.frames_processed += 1;
        self.detections_count += detections.len() as u64;

        let stray = detections
            .iter()
            .filter(|d| d.frame_number != frame_number)
            .count();
        if stray > 0 {
            warn!(frame_number, stray, "Detections stamped with a different frame number");
        }

        let mut events = Vec::new();
        for track in self.tracker.update(detections, frame_number) {
            if track.last_frame() != Some(frame_number) {
                continue;
            }
            self.seen_tracks.insert(track.track_id);
            events.extend(self.crossing_detector.detect_crossings(track, frame_number));
        }

        for event in &events {
            if !self.tracker.record_crossing(event) {
                debug!(track_id = event.track_id, side = event.side.as_str(), "Crossing not applied");
                continue;
            }
            if event.side == LineSide::Right {
                self.measure(event.track_id);
            }
        }

        Ok(events)
    }

    fn measure(&mut self, track_id: u64) {
        let Some(track) = self.tracker.get(track_id) else {
            return;
        };
        match self.speed_calculator.calculate_for_track(track) {
            Ok(measurement) => self.measurements.push(measurement),
            Err(error) => {
                warn!(track_id, %error, "Speed measurement rejected");
                self.failures.push(MeasurementFailure { track_id, error });
            }
        }
    }

    pub fn tracker(&self) -> &IouTracker {
        &self.tracker
    }

    pub fn crossing_detector(&self) -> &CrossingDetector {
        &self.crossing_detector
    }

    /// Measurements completed so far.
    pub fn measurements(&self) -> &[SpeedMeasurement] {
        &self.measurements
    }

    pub fn failures(&self) -> &[MeasurementFailure] {
        &self.failures
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn detections_count(&self) -> u64 {
        self.detections_count
    }

    /// End the run.
    pub fn finish(self) -> PipelineReport {
        let finished: BTreeSet<u64> = self
            .measurements
            .iter()
            .map(|m| m.track_id)
            .chain(self.failures.iter().map(|f| f.track_id))
            .collect();
        let incomplete_track_ids = self
            .seen_tracks
            .difference(&finished)
            .copied()
            .collect();

        PipelineReport {
            measurements: self.measurements,
            failures: self.failures,
            incomplete_track_ids,
            frames_processed: self.frames_processed,
            detections_count: self.detections_count,
        }
    }
}

/// A pipeline that bundles a detector with [`SpeedPipeline`].
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    pipeline: SpeedPipeline,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    pub fn new(detector: D, config: &Configuration, tracker_config: TrackerConfig) -> Self {
        Self {
            detector,
            pipeline: SpeedPipeline::new(config, tracker_config),
        }
    }

    pub fn with_default_config(detector: D, config: &Configuration) -> Self {
        Self::new(detector, config, TrackerConfig::default())
    }

    /// Run detection on a frame and feed the result through the pipeline.
    pub fn process_frame(
        &mut self,
        frame_number: u64,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<CrossingEvent>, ProcessError<D::Error>> {
        self.pipeline.check_frame_order(frame_number)?;
        let detections = self
            .detector
            .detect(frame_number, input, width, height)
            .map_err(ProcessError::Detection)?;
        Ok(self.pipeline.process_detections(frame_number, detections)?)
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn pipeline(&self) -> &SpeedPipeline {
        &self.pipeline
    }

    pub fn finish(self) -> PipelineReport {
        self.pipeline.finish()
    }
}
