//! Vehicle speed measurement from fixed-camera detections.
//!
//! Detections are associated into tracks by IoU, each track's rightmost
//! box edge is watched for transitions across two calibrated vertical
//! lines, and the frame count between the two crossings is converted into
//! a speed.

pub mod config;
pub mod error;
pub mod integration;
pub mod measurement;
pub mod tracker;

pub use config::Configuration;
pub use error::{ConfigError, MeasurementError, PipelineError, ProcessError};
pub use integration::{
    DetectionBuilder, DetectionSource, Outcome, PipelineReport, SpeedPipeline, TrackerPipeline,
};
pub use measurement::{CrossingDetector, CrossingEvent, LineSide, SpeedCalculator, SpeedMeasurement};
pub use tracker::{BoundingBox, CrossingPhase, Detection, IouTracker, TrackedObject, TrackerConfig};
